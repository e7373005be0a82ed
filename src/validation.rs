//! Field-level validation shared by every service.
//!
//! Failures accumulate into a [`FieldErrors`] map keyed `valid_<field>`, which
//! renders as a 400 response listing every offending field at once.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

pub const MAX_RESERVATION_NOTES: usize = 2048;
pub const MAX_BILL_PLATE_NOTES: usize = 1024;
pub const MAX_NAME_LEN: usize = 150;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_REVIEW_TITLE: usize = 100;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a failure. The first message for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(format!("valid_{field}"))
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(&format!("valid_{field}"))
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(&format!("valid_{field}")).map(String::as_str)
    }

    /// One human readable line per failing field.
    pub fn summary(&self) -> String {
        self.0.values().cloned().collect::<Vec<_>>().join("\n")
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

/// Trimmed, non-empty text or `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Requires an `@` followed by a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

pub fn validate_notes(
    errors: &mut FieldErrors,
    field: &str,
    notes: Option<&str>,
    max: usize,
) {
    if let Some(notes) = notes {
        if notes.chars().count() > max {
            errors.add(field, format!("{field} must be at most {max} characters"));
        }
    }
}

/// Parses an ISO-8601 timestamp with offset and requires it to be after `now`.
pub fn parse_future_date_time(
    errors: &mut FieldErrors,
    raw: Option<&str>,
    now: DateTime<Utc>,
) -> Option<DateTime<FixedOffset>> {
    let Some(raw) = non_blank(raw) else {
        errors.add("date_time", "date_time is required");
        return None;
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) if parsed.with_timezone(&Utc) > now => Some(parsed),
        Ok(_) => {
            errors.add("date_time", "date_time must be in the future");
            None
        }
        Err(_) => {
            errors.add(
                "date_time",
                "date_time must be an ISO-8601 timestamp with offset",
            );
            None
        }
    }
}

pub fn validate_party_size(errors: &mut FieldErrors, amount_people: Option<i32>) -> i32 {
    match amount_people {
        Some(n) if n > 0 => n,
        _ => {
            errors.add("amount_people", "amount_people must be greater than 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("  ana.lopez@mail.example.mx "));
        assert!(!is_valid_email("ana.example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@.com"));
        assert!(!is_valid_email("ana@@example.com"));
    }

    #[test]
    fn errors_accumulate_and_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.add("name", "name is required");
        errors.add("name", "ignored");
        errors.add("email", "email is malformed");

        assert!(errors.has("name"));
        assert_eq!(errors.get("name"), Some("name is required"));
        assert_eq!(errors.summary(), "email is malformed\nname is required");
        assert!(matches!(errors.into_result(), Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_errors_pass() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn notes_are_counted_in_characters() {
        let mut errors = FieldErrors::new();
        let accented = "é".repeat(MAX_RESERVATION_NOTES);
        validate_notes(&mut errors, "notes", Some(&accented), MAX_RESERVATION_NOTES);
        assert!(errors.is_empty());

        let long = "x".repeat(MAX_RESERVATION_NOTES + 1);
        validate_notes(&mut errors, "notes", Some(&long), MAX_RESERVATION_NOTES);
        assert!(errors.has("notes"));
    }

    #[test]
    fn date_time_must_be_future() {
        let now = Utc::now();
        let mut errors = FieldErrors::new();

        let future = (now + Duration::days(2)).to_rfc3339();
        assert!(parse_future_date_time(&mut errors, Some(&future), now).is_some());
        assert!(errors.is_empty());

        let past = (now - Duration::minutes(1)).to_rfc3339();
        assert!(parse_future_date_time(&mut errors, Some(&past), now).is_none());
        assert_eq!(errors.get("date_time"), Some("date_time must be in the future"));
    }

    #[test]
    fn date_time_rejects_garbage_and_missing() {
        let now = Utc::now();
        let mut errors = FieldErrors::new();
        assert!(parse_future_date_time(&mut errors, Some("tomorrow"), now).is_none());
        assert!(errors.has("date_time"));

        let mut errors = FieldErrors::new();
        assert!(parse_future_date_time(&mut errors, None, now).is_none());
        assert_eq!(errors.get("date_time"), Some("date_time is required"));
    }

    #[test]
    fn party_size_must_be_positive() {
        let mut errors = FieldErrors::new();
        assert_eq!(validate_party_size(&mut errors, Some(4)), 4);
        assert!(errors.is_empty());
        validate_party_size(&mut errors, Some(0));
        assert!(errors.has("amount_people"));
    }
}
