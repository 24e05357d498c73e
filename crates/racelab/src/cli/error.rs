//! Error formatting and exit codes

use std::error::Error as _;

/// Format an error for user display, with its cause when that adds anything.
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    match err.source() {
        Some(source) => {
            let source_msg = source.to_string();
            if msg.contains(&source_msg) || source_msg.is_empty() {
                msg
            } else {
                format!("{msg}\nCause: {source_msg}")
            }
        }
        None => msg,
    }
}

/// Extract appropriate exit code from an error
///
/// Downcasts to `racelab_core::Error` for semantic codes; anything else is
/// treated as an execution failure.
///
/// # Exit Codes
/// * 1 - Invalid input or configuration
/// * 2 - Execution failure
/// * 4 - Invalid lifecycle transition
pub fn get_exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<racelab_core::Error>()
        .map_or(2, racelab_core::Error::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_exit_code() {
        let err = anyhow::Error::new(racelab_core::Error::invalid_config("units must be at least 1"));
        assert_eq!(get_exit_code(&err), 1);
        assert!(format_error(&err).contains("units must be at least 1"));
    }

    #[test]
    fn test_context_does_not_hide_exit_code() {
        let err = anyhow::Error::new(racelab_core::Error::invalid_input("no units"))
            .context("run failed");
        assert_eq!(get_exit_code(&err), 1);
        let formatted = format_error(&err);
        assert!(formatted.contains("run failed"));
        assert!(formatted.contains("Cause:"));
    }

    #[test]
    fn test_foreign_errors_are_execution_failures() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(get_exit_code(&err), 2);
        assert_eq!(format_error(&err), "something else");
    }
}
