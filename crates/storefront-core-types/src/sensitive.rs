//! Sensitive data marker for automatic redaction
//!
//! Payment card numbers and verification codes live in memory wrapped in
//! `Sensitive<T>` so that `Debug` output of a cached entity, or a log line
//! that formats one, never leaks them.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use storefront_core_types::Sensitive;
///
/// let cvv = Sensitive::new("123");
/// assert_eq!(format!("{:?}", cvv), "***REDACTED***");
/// assert_eq!(cvv.expose(), &"123");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Only the persistence layer should need this (to bind the value).
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Eq> Eq for Sensitive<T> {}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let card = Sensitive::new("4111111111111111");
        let debug_str = format!("{:?}", card);
        assert_eq!(debug_str, "***REDACTED***");
        assert!(!debug_str.contains("4111"));
    }

    #[test]
    fn test_sensitive_display_redaction() {
        let cvv = Sensitive::new("987");
        assert_eq!(format!("{}", cvv), "***REDACTED***");
    }

    #[test]
    fn test_sensitive_expose_and_into_inner() {
        let secret = Sensitive::new(String::from("test"));
        assert_eq!(secret.expose(), "test");
        assert_eq!(secret.into_inner(), "test");
    }

    #[test]
    fn test_sensitive_equality_compares_inner() {
        assert_eq!(Sensitive::new(1), Sensitive::new(1));
        assert_ne!(Sensitive::new(1), Sensitive::new(2));
    }

    #[test]
    fn test_sensitive_inside_struct_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Card {
            holder: String,
            number: Sensitive<String>,
        }

        let card = Card {
            holder: "alice".to_string(),
            number: Sensitive::new("5500000000000004".to_string()),
        };

        let debug_str = format!("{:?}", card);
        assert!(debug_str.contains("alice"));
        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("5500"));
    }
}
