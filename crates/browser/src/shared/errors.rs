use folio_core::FolioError;

pub fn to_folio_error(e: impl std::fmt::Display, action: &str) -> FolioError {
    let s = e.to_string();
    if s.contains("timeout") || s.contains("Timeout") {
        FolioError::timeout_error(format!("{} timed out: {}", action, s))
    } else if s.contains("navigation") || s.contains("Navigation") {
        FolioError::navigation_error(format!("{} navigation failed: {}", action, s))
    } else if s.contains("Uncaught") || s.contains("SyntaxError") || s.contains("TypeError") {
        FolioError::script_error(format!("{} script failed: {}", action, s))
    } else {
        FolioError::browser_error(format!("{} failed: {}", action, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ErrorCategory;

    #[test]
    fn categorizes_by_message() {
        assert_eq!(to_folio_error("Request Timeout", "Sample").category, ErrorCategory::Timeout);
        assert_eq!(to_folio_error("navigation aborted", "Open").category, ErrorCategory::Navigation);
        assert_eq!(
            to_folio_error("Uncaught TypeError: x is null", "Scroll").category,
            ErrorCategory::ScriptExecution
        );
        let other = to_folio_error("channel closed", "Scroll");
        assert_eq!(other.category, ErrorCategory::Browser);
        assert_eq!(other.message, "Scroll failed: channel closed");
    }
}
