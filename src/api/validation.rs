use std::collections::HashMap;

use thiserror::Error;

pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_TEXT_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 40;

/// Field name to human-readable problem, returned as `field_errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Request validation failed")]
pub struct ValidationErrors(pub HashMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

/// Request bodies that check their own shape before reaching a service.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Collects the first problem found for each field.
#[derive(Debug, Default)]
pub struct Checker {
    errors: ValidationErrors,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: String) {
        self.errors.0.entry(field.to_string()).or_insert(message);
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if let Err(msg) = validate_email_format(value) {
            self.fail(field, msg);
        }
        self
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        self.length(field, value, MIN_PASSWORD_LEN, MAX_PASSWORD_LEN)
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.chars().count();
        if len < min {
            self.fail(field, format!("Must be at least {} characters", min));
        } else if len > max {
            self.fail(field, format!("Must be at most {} characters", max));
        }
        self
    }

    pub fn max_length(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.length(field, value, 0, max);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        let errors = std::mem::take(&mut self.errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Basic email shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(format!("Email must be at most {} characters", MAX_EMAIL_LEN));
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    let domain = parts[1];
    if !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || domain.contains("..")
    {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("first.last+tag@mail.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        let bad_addresses = [
            "", "plain", "@x.com", "a@", "a@b", "a@@x.com", "a b@x.com", "a@.com", "a@x.com.",
            "a@x..com",
        ];
        for bad in bad_addresses {
            assert!(validate_email_format(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn rejects_overlong_email() {
        let email = format!("{}@x.com", "a".repeat(250));
        assert!(validate_email_format(&email).is_err());
    }

    #[test]
    fn checker_reports_each_field_once() {
        let errors = Checker::new()
            .email("email", "nope")
            .password("password", "short")
            .max_length("full_name", Some(&"n".repeat(256)), MAX_TEXT_LEN)
            .max_length("missing", None, MAX_TEXT_LEN)
            .finish()
            .unwrap_err();

        assert_eq!(errors.0.len(), 3);
        assert_eq!(errors.get("password"), Some("Must be at least 8 characters"));
        assert!(errors.get("missing").is_none());
    }

    #[test]
    fn password_bounds_are_inclusive() {
        assert!(Checker::new().password("p", &"x".repeat(8)).finish().is_ok());
        assert!(Checker::new().password("p", &"x".repeat(40)).finish().is_ok());
        assert!(Checker::new().password("p", &"x".repeat(41)).finish().is_err());
    }
}
