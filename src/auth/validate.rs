use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::RegisterRequest;
use crate::error::ValidationIssue;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref FULL_NAME_RE: Regex = Regex::new(r"^[a-zA-Z\s]+$").unwrap();
    static ref CONTACT_RE: Regex = Regex::new(r"^[\d\s\-\+\(\)]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least 6 chars with one lowercase, one uppercase and one digit.
fn is_strong_password(password: &str) -> bool {
    password.len() >= 6
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// All field rules for registration, collected rather than short-circuited.
/// Role normalization happens separately at the boundary.
pub fn validate_registration(req: &RegisterRequest) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let required = [
        ("full_name", req.full_name.trim()),
        ("email", req.email.trim()),
        ("password", req.password.as_str()),
        ("contact_number", req.contact_number.trim()),
        ("country", req.country.trim()),
        ("city", req.city.trim()),
    ];
    let empty: Vec<&str> = required
        .iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| *k)
        .collect();
    if !empty.is_empty() {
        issues.push(ValidationIssue::new(
            "required",
            format!("All required fields must be filled: {}", empty.join(", ")),
        ));
        return issues;
    }

    if !FULL_NAME_RE.is_match(req.full_name.trim()) {
        issues.push(ValidationIssue::new(
            "invalid_full_name",
            "Full name can only contain letters and spaces",
        ));
    }
    if !is_valid_email(req.email.trim()) {
        issues.push(ValidationIssue::new("invalid_email", "Invalid email format"));
    }
    if !is_strong_password(&req.password) {
        issues.push(ValidationIssue::new(
            "weak_password",
            "Password must be at least 6 characters long and contain at least one \
             lowercase letter, one uppercase letter, and one number",
        ));
    }
    if !CONTACT_RE.is_match(req.contact_number.trim()) {
        issues.push(ValidationIssue::new(
            "invalid_contact",
            "Invalid contact number format",
        ));
    }

    issues
}
