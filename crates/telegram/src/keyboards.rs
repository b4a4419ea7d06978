//! Inline keyboard builders

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Cancel button attached to a job's status message
///
/// Callback data is `cancel:<job_id>`, parsed in `callbacks`.
pub fn job_status_keyboard(job_id: &str) -> InlineKeyboardMarkup {
    let buttons = vec![vec![InlineKeyboardButton::callback(
        "✖️ Cancel job",
        format!("cancel:{}", job_id),
    )]];

    InlineKeyboardMarkup::new(buttons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_keyboard_data() {
        let keyboard = job_status_keyboard("abc12345");
        let rows = &keyboard.inline_keyboard;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
    }
}
