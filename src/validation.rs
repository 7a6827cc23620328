//! Field-level request validation.
//!
//! A [`Chain`] runs every one of its rules against the raw JSON body and
//! reports all failures at once. [`ValidatedJson`] plugs a chain into an
//! axum handler: the body is only deserialized into the route's input type
//! after the chain comes back clean.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref URL_RE: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// One failed rule, as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Present, not null, and not a blank string.
    Required,
    IsString,
    /// Minimum number of characters; non-strings fail.
    MinLength(usize),
    MaxLength(usize),
    Email,
    /// Absolute http(s) URL.
    Url,
    OneOf(&'static [&'static str]),
}

impl Check {
    fn passes(&self, value: &Value) -> bool {
        match (self, value) {
            (Check::Required, Value::Null) => false,
            (Check::Required, Value::String(s)) => !s.trim().is_empty(),
            (Check::Required, _) => true,
            (Check::IsString, v) => v.is_string(),
            (Check::MinLength(n), Value::String(s)) => s.chars().count() >= *n,
            (Check::MaxLength(n), Value::String(s)) => s.chars().count() <= *n,
            (Check::Email, Value::String(s)) => is_valid_email(s),
            (Check::Url, Value::String(s)) => URL_RE.is_match(s),
            (Check::OneOf(set), Value::String(s)) => set.contains(&s.as_str()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
    pub optional: bool,
    pub trim: bool,
}

impl Rule {
    pub const fn new(field: &'static str, check: Check, message: &'static str) -> Self {
        Self {
            field,
            check,
            message,
            optional: false,
            trim: false,
        }
    }

    /// Skip this rule when the field is absent or null.
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Check the string with surrounding whitespace removed, for fields
    /// that are stored trimmed.
    pub const fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    fn evaluate(&self, body: &Value) -> Option<FieldError> {
        let value = body.get(self.field).unwrap_or(&Value::Null);
        if self.optional && value.is_null() {
            return None;
        }
        let stripped;
        let value = match value {
            Value::String(s) if self.trim => {
                stripped = Value::String(s.trim().to_string());
                &stripped
            }
            v => v,
        };
        if self.check.passes(value) {
            None
        } else {
            Some(FieldError::new(self.field, self.message))
        }
    }
}

/// Named, ordered list of rules.
#[derive(Debug, Clone)]
pub struct Chain {
    pub name: &'static str,
    rules: Vec<Rule>,
}

impl Chain {
    pub fn new(name: &'static str, rules: Vec<Rule>) -> Self {
        Self { name, rules }
    }

    /// Runs every rule (no short-circuit) and returns the failures in rule order.
    pub fn run(&self, body: &Value) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(body))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(chain = self.name, failures = errors.len(), "validation failed");
            Err(errors)
        }
    }
}

/// Request body type that has a validation chain attached.
pub trait Validated: DeserializeOwned {
    fn chain() -> &'static Chain;
}

/// Extractor: JSON body → chain → typed input.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Validated,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;

        T::chain().run(&body).map_err(AppError::Validation)?;

        let input = serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(Self(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain() -> Chain {
        Chain::new(
            "test",
            vec![
                Rule::new("email", Check::Email, "Invalid email format"),
                Rule::new("password", Check::MinLength(5), "Password too short"),
                Rule::new("name", Check::Required, "Name is required"),
                Rule::new("kind", Check::OneOf(&["a", "b"]), "Unknown kind").optional(),
                Rule::new("site", Check::Url, "Invalid URL").optional(),
            ],
        )
    }

    #[test]
    fn valid_body_passes() {
        let body = json!({"email": "a@x.com", "password": "secret", "name": "A", "kind": "b"});
        assert!(chain().run(&body).is_ok());
    }

    #[test]
    fn collects_every_failure_in_rule_order() {
        let body = json!({"email": "", "password": "abc", "name": "   "});
        let errors = chain().run(&body).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["email", "password", "name"]);
        assert_eq!(errors[1].message, "Password too short");
    }

    #[test]
    fn optional_fields_are_skipped_when_absent_or_null() {
        let body = json!({"email": "a@x.com", "password": "secret", "name": "A", "kind": null});
        assert!(chain().run(&body).is_ok());
    }

    #[test]
    fn optional_fields_are_checked_when_present() {
        let body = json!({
            "email": "a@x.com", "password": "secret", "name": "A",
            "kind": "c", "site": "ftp://nope"
        });
        let errors = chain().run(&body).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("kind", "Unknown kind"),
                FieldError::new("site", "Invalid URL"),
            ]
        );
    }

    #[test]
    fn non_object_body_fails_required_rules() {
        let errors = chain().run(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn type_checks_reject_non_strings() {
        let c = Chain::new(
            "types",
            vec![
                Rule::new("title", Check::IsString, "Title must be a string"),
                Rule::new("title", Check::MinLength(3), "Title too short"),
                Rule::new("title", Check::MaxLength(5), "Title too long"),
            ],
        );
        assert_eq!(c.run(&json!({"title": 12345})).unwrap_err().len(), 3);
        assert!(c.run(&json!({"title": "ñandú"})).is_ok());
    }

    #[test]
    fn trimmed_rules_ignore_surrounding_whitespace() {
        let c = Chain::new(
            "trim",
            vec![
                Rule::new("title", Check::MinLength(3), "Title too short").trimmed(),
                Rule::new("raw", Check::MinLength(3), "Raw too short").optional(),
            ],
        );
        assert_eq!(c.run(&json!({"title": "   "})).unwrap_err().len(), 1);
        assert_eq!(c.run(&json!({"title": " ab "})).unwrap_err().len(), 1);
        assert!(c.run(&json!({"title": " abc ", "raw": "   "})).is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("  user@example.com "));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user example.com"));
    }
}
