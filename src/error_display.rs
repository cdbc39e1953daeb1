//! User-facing error message formatting.
//!
//! Uses typed error matching (serde_json categories, io::ErrorKind) rather than
//! string parsing to produce actionable messages for the error modal.

use serde_json::error::Category;
use std::io;

/// Format a serde_json error as a user-facing message by matching on its category.
pub fn user_message_from_json(err: &serde_json::Error) -> String {
    match err.classify() {
        Category::Io => format!("Could not read JSON: {}", err),
        Category::Syntax => format!(
            "Invalid JSON at line {}, column {}.",
            err.line(),
            err.column()
        ),
        Category::Data => format!(
            "Unexpected JSON content at line {}, column {}. Expected an array of numbers \
             or an object with a \"scores\" array.",
            err.line(),
            err.column()
        ),
        Category::Eof => "JSON ended unexpectedly. Is the file truncated?".to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data. Score files must be UTF-8 text.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", ctx, base),
        _ => base,
    }
}

/// Walk an error report's chain and describe the most specific known cause.
pub fn user_message_from_report(report: &color_eyre::Report) -> String {
    let context = report.to_string();
    for cause in report.chain() {
        if let Some(e) = cause.downcast_ref::<io::Error>() {
            return user_message_from_io(e, Some(&format!("{}:", context)));
        }
        if let Some(e) = cause.downcast_ref::<serde_json::Error>() {
            return format!("{}: {}", context, user_message_from_json(e));
        }
    }

    let mut chain = report.chain().map(|c| c.to_string());
    let first = chain.next().unwrap_or_default();
    match chain.last() {
        Some(root) if root != first => format!("{}: {}", first, root),
        _ => first,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::{eyre, WrapErr};

    #[test]
    fn test_json_syntax_message() {
        let err = serde_json::from_str::<Vec<f64>>("[1, 2,").unwrap_err();
        assert!(user_message_from_json(&err).contains("ended unexpectedly"));

        let err = serde_json::from_str::<Vec<f64>>("[1, x]").unwrap_err();
        assert!(user_message_from_json(&err).starts_with("Invalid JSON at line 1"));
    }

    #[test]
    fn test_io_message_with_context() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(
            user_message_from_io(&err, Some("Failed to read x:")),
            "Failed to read x: File or directory not found."
        );
        assert_eq!(
            user_message_from_io(&err, None),
            "File or directory not found."
        );
    }

    #[test]
    fn test_report_message() {
        let io_err: Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        let report = io_err.wrap_err("Failed to read scores.txt").unwrap_err();
        assert_eq!(
            user_message_from_report(&report),
            "Failed to read scores.txt: Permission denied. Check read access."
        );

        let report = Err::<(), _>(eyre!("Line 3: 'abc' is not a number"))
            .wrap_err("Failed to load scores from s.txt")
            .unwrap_err();
        assert_eq!(
            user_message_from_report(&report),
            "Failed to load scores from s.txt: Line 3: 'abc' is not a number"
        );
    }
}
