//! Input format checks backing the `Invalid*` error taxonomy
//!
//! These run at the boundary, before anything reaches the service layer.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::db::crud::parse_object_id;
use crate::error::{AppError, AppResult};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,10}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\d{10}$").unwrap();
}

/// Validates an email address, failing with `InvalidEmail`
pub fn check_email(email: &str) -> AppResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(AppError::InvalidEmail {
            email: email.to_string(),
        })
    }
}

/// Validates a 10-digit phone number, failing with `InvalidPhone`
pub fn check_phone(phone: &str) -> AppResult<()> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(AppError::InvalidPhone {
            phone: phone.to_string(),
        })
    }
}

/// Validates a document id, failing with `InvalidId`
pub fn check_object_id(id: &str) -> AppResult<()> {
    parse_object_id(id).map(|_| ())
}

/// Validates a YYYY-MM-DD date string, failing with `InvalidDate`
pub fn check_date(date: &str) -> AppResult<()> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::InvalidDate {
            date: date.to_string(),
        })
}

/// Validates a password against the configured minimum length
pub fn check_password_length(password: &str, min: usize) -> AppResult<()> {
    if password.len() >= min {
        Ok(())
    } else {
        Err(AppError::PasswordTooShort { min })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_email() {
        assert!(check_email("a@x.com").is_ok());
        assert!(check_email("first.last+tag@sub.domain.org").is_ok());

        assert!(check_email("not-an-email").is_err());
        assert!(check_email("missing@tld").is_err());
        assert!(check_email("@x.com").is_err());
    }

    #[test]
    fn test_check_phone() {
        assert!(check_phone("0123456789").is_ok());

        assert!(check_phone("12345").is_err());
        assert!(check_phone("01234567890").is_err());
        assert!(check_phone("01234abcde").is_err());
    }

    #[test]
    fn test_check_object_id() {
        assert!(check_object_id(&bson::oid::ObjectId::new().to_hex()).is_ok());
        assert!(check_object_id("nope").is_err());
    }

    #[test]
    fn test_check_date() {
        assert!(check_date("2026-08-06").is_ok());

        assert!(check_date("06-08-2026").is_err());
        assert!(check_date("2026-13-01").is_err());
        assert!(check_date("yesterday").is_err());
    }

    #[test]
    fn test_check_password_length() {
        assert!(check_password_length("password1", 8).is_ok());
        let err = check_password_length("short", 8).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.kind(), "users/info/invalid-password-length");
    }
}
