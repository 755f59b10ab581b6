//! Small shared helpers for input validation at the engine boundary.
use std::sync::OnceLock;

use regex::Regex;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// A pragmatic email format check: one `@`, no whitespace, and a dot in the domain part.
/// Deliverability is the notifier's problem, not ours.
pub fn is_valid_email(email: &str) -> bool {
    let re = EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    re.is_match(email)
}

#[cfg(test)]
mod test {
    use super::is_valid_email;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("customer@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.io"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }
}
