//! Media metadata probing via ffprobe

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    // ffprobe encodes the duration as a decimal string
    duration: Option<String>,
}

/// Probe a media file's duration in whole seconds
///
/// Best effort: a missing ffprobe binary, a timeout, or a file without
/// duration metadata all yield `None`.
pub async fn probe_duration(path: &Path) -> Option<u64> {
    let probe = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output();

    let output = match tokio::time::timeout(PROBE_TIMEOUT, probe).await {
        Ok(Ok(output)) if output.status.success() => output,
        Ok(Ok(_)) | Ok(Err(_)) => return None,
        Err(_) => {
            tracing::debug!("ffprobe timed out for {}", path.display());
            return None;
        }
    };

    parse_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the duration out of ffprobe's JSON output
fn parse_duration(json: &str) -> Option<u64> {
    let probe: ProbeOutput = serde_json::from_str(json).ok()?;
    let duration: f64 = probe.format?.duration?.parse().ok()?;
    if duration.is_finite() && duration > 0.0 {
        Some(duration.round() as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = r#"{"format":{"filename":"a.mp4","duration":"3671.4"}}"#;
        assert_eq!(parse_duration(json), Some(3671));
    }

    #[test]
    fn test_parse_duration_rounds() {
        let json = r#"{"format":{"duration":"59.6"}}"#;
        assert_eq!(parse_duration(json), Some(60));
    }

    #[test]
    fn test_parse_duration_missing_field() {
        assert_eq!(parse_duration(r#"{"format":{"filename":"a.mp4"}}"#), None);
        assert_eq!(parse_duration(r#"{}"#), None);
    }

    #[test]
    fn test_parse_duration_garbage() {
        assert_eq!(parse_duration("not json"), None);
        assert_eq!(parse_duration(r#"{"format":{"duration":"abc"}}"#), None);
        assert_eq!(parse_duration(r#"{"format":{"duration":"-5"}}"#), None);
        assert_eq!(parse_duration(r#"{"format":{"duration":"0"}}"#), None);
    }
}
