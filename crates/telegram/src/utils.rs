//! Utility functions for formatting and parsing

use crate::constants::JOB_ID_LEN;

/// Format a byte count in human-readable form
///
/// Whole bytes below 1 KB, two decimals above.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in ["KB", "MB", "GB", "TB", "PB"] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }

    if unit == "B" {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, unit)
    }
}

/// Format a duration in seconds as H:MM:SS
pub fn format_hms(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Render a textual progress bar for a percentage
pub fn progress_bar(pct: f64, len: usize) -> String {
    let filled = ((len as f64) * pct.clamp(0.0, 100.0) / 100.0).round() as usize;
    let filled = filled.min(len);
    format!("{}{}", "▓".repeat(filled), "░".repeat(len - filled))
}

/// Parse command arguments from message text
pub fn parse_args(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Check if a string looks like a generated job id
pub fn is_valid_job_id(id: &str) -> bool {
    id.len() == JOB_ID_LEN && id.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate and extract the job id argument from a command
pub fn extract_job_arg<'a>(args: &'a [&str]) -> Result<&'a str, String> {
    match args.get(1) {
        Some(&id) if is_valid_job_id(id) => Ok(id),
        Some(_) => Err(format!(
            "Invalid job id. Must be {} hex characters",
            JOB_ID_LEN
        )),
        None => Err("Missing job id argument".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
        assert_eq!(format_size(1099511627776), "1.00 TB");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(60), "00:01:00");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(36000), "10:00:00");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(50.0, 4), "▓▓░░");
        assert_eq!(progress_bar(100.0, 4), "▓▓▓▓");
        // Out of range values clamp
        assert_eq!(progress_bar(-10.0, 4), "░░░░");
        assert_eq!(progress_bar(250.0, 4), "▓▓▓▓");
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(""), Vec::<&str>::new());
        assert_eq!(parse_args("/cancel"), vec!["/cancel"]);
        assert_eq!(parse_args("/cancel abc12345"), vec!["/cancel", "abc12345"]);
        assert_eq!(parse_args("  /cancel   abc12345  "), vec!["/cancel", "abc12345"]);
    }

    #[test]
    fn test_is_valid_job_id() {
        assert!(is_valid_job_id("abc12345"));
        assert!(is_valid_job_id("DEADBEEF"));
        // Wrong length
        assert!(!is_valid_job_id("abc1234"));
        assert!(!is_valid_job_id("abc123456"));
        assert!(!is_valid_job_id(""));
        // Non-hex characters
        assert!(!is_valid_job_id("zzzzzzzz"));
    }

    #[test]
    fn test_extract_job_arg() {
        assert!(extract_job_arg(&["/cancel"]).is_err());
        assert!(extract_job_arg(&["/cancel", "nope"]).is_err());
        assert_eq!(extract_job_arg(&["/cancel", "abc12345"]).unwrap(), "abc12345");
    }
}
