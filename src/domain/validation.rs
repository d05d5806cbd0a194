//! Validation rules
//!
//! Pure checks run before any store mutation. Each rule returns the first
//! violation found, in a fixed order, as `DomainError::Validation`.

use chrono::DateTime;

use super::DomainError;
use super::records::{BorrowerKind, LecturerInput, LibraryItemInput, LoanRequest, StudentInput};

/// Every student and lecturer address must live under this domain.
pub const REQUIRED_EMAIL_SUFFIX: &str = "@gmail.com";

pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 99;

fn check_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name is invalid and empty"));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() {
        return Err(DomainError::validation("email is invalid and empty"));
    }
    let Some(local) = email.strip_suffix(REQUIRED_EMAIL_SUFFIX) else {
        return Err(DomainError::validation(format!(
            "email is invalid and does not end with {}",
            REQUIRED_EMAIL_SUFFIX
        )));
    };
    if local.is_empty() {
        return Err(DomainError::validation(format!(
            "email must contain a prefix before {}",
            REQUIRED_EMAIL_SUFFIX
        )));
    }
    Ok(())
}

fn check_age(age: i32) -> Result<(), DomainError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(DomainError::validation(format!(
            "invalid age {}, must be between {} and {}",
            age, MIN_AGE, MAX_AGE
        )));
    }
    Ok(())
}

pub fn validate_student(student: &StudentInput) -> Result<(), DomainError> {
    check_name(&student.name)?;
    check_email(&student.email)?;
    check_age(student.age)
}

pub fn validate_lecturer(lecturer: &LecturerInput) -> Result<(), DomainError> {
    check_name(&lecturer.name)?;
    check_email(&lecturer.email)?;
    check_age(lecturer.age)?;
    if lecturer.designation.trim().is_empty() {
        return Err(DomainError::validation("designation is invalid and empty"));
    }
    Ok(())
}

pub fn validate_library_item(item: &LibraryItemInput) -> Result<(), DomainError> {
    if item.book_name.trim().is_empty() {
        return Err(DomainError::validation("book_name is invalid and empty"));
    }
    if item.title.trim().is_empty() {
        return Err(DomainError::validation("title is invalid and empty"));
    }
    if item.author.trim().is_empty() {
        return Err(DomainError::validation("author is invalid and empty"));
    }
    if item.available_copies < 1 {
        return Err(DomainError::validation(
            "available_copies must be at least 1",
        ));
    }
    Ok(())
}

/// Checks a borrow/return request and returns the parsed borrower kind.
pub fn validate_loan_request(request: &LoanRequest) -> Result<BorrowerKind, DomainError> {
    if request.book_id <= 0 {
        return Err(DomainError::validation("invalid book_id"));
    }
    if request.user_id <= 0 {
        return Err(DomainError::validation("invalid user_id"));
    }
    if request.user_type.is_empty() {
        return Err(DomainError::validation("user_type cannot be empty"));
    }
    let kind = request
        .user_type
        .parse::<BorrowerKind>()
        .map_err(DomainError::Validation)?;

    if let (Some(borrowed), Some(returned)) = (&request.borrow_date, &request.return_date) {
        let borrowed = DateTime::parse_from_rfc3339(borrowed)
            .map_err(|_| DomainError::validation("borrow_date must be an RFC 3339 timestamp"))?;
        let returned = DateTime::parse_from_rfc3339(returned)
            .map_err(|_| DomainError::validation("return_date must be an RFC 3339 timestamp"))?;
        if returned < borrowed {
            return Err(DomainError::validation(
                "return_date cannot be before borrow_date",
            ));
        }
    }

    Ok(kind)
}
