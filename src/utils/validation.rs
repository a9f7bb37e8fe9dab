//! Validation Utilities
//!
//! Field validators shared by every registration and login payload. Each
//! validator reports a single message per field, checking in priority order:
//! required, then length, then format.

use std::borrow::Cow;
use std::sync::OnceLock;

use heck::ToLowerCamelCase;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

use super::error::FieldErrors;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MIN_EMAIL_LENGTH: usize = 5;
pub const MAX_EMAIL_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 30;
pub const MIN_ADDRESS_LENGTH: usize = 5;
pub const MAX_ADDRESS_LENGTH: usize = 100;
pub const MAX_CLINIC_NAME_LENGTH: usize = 150;
pub const MAX_SEASON_NAME_LENGTH: usize = 50;
pub const MIN_DOCTOR_DETAIL_LENGTH: usize = 2;
pub const MAX_DOCTOR_DETAIL_LENGTH: usize = 200;
pub const MOBILE_DIGITS: usize = 10;
pub const MIN_PINCODE: i32 = 100_000;
pub const MAX_PINCODE: i32 = 999_999;
pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 100;

/// Validates email address format
pub fn validate_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    regex.is_match(email)
}

/// Normalizes email address to lowercase and removes whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// True when the password mixes upper case, lower case, digits and a
/// punctuation or symbol character
pub fn is_strong_password(password: &str) -> bool {
    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in password.chars() {
        if c.is_uppercase() {
            has_upper = true;
        } else if c.is_lowercase() {
            has_lower = true;
        } else if c.is_numeric() {
            has_digit = true;
        } else if !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control() {
            has_special = true;
        }
    }

    has_upper && has_lower && has_digit && has_special
}

/// Number of decimal digits in a non-negative integer
pub fn digit_count(mut value: i64) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Converts `validator` output into a camelCase-keyed field map
pub fn collect_field_errors(result: Result<(), ValidationErrors>) -> FieldErrors {
    let mut fields = FieldErrors::new();

    if let Err(errors) = result {
        for (field, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for field '{}'", field));
                fields.insert(field.to_lower_camel_case(), message);
            }
        }
    }

    fields
}

pub fn name_validator(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(field_error("required", messages::NAME_MISSING));
    }
    let len = char_len(name);
    if len < MIN_NAME_LENGTH {
        return Err(field_error("too_short", messages::NAME_TOO_SHORT));
    }
    if len > MAX_NAME_LENGTH {
        return Err(field_error("too_long", messages::NAME_TOO_LONG));
    }
    Ok(())
}

pub fn email_validator(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(field_error("required", messages::EMAIL_MISSING));
    }
    let len = char_len(email);
    if len < MIN_EMAIL_LENGTH {
        return Err(field_error("too_short", messages::EMAIL_TOO_SHORT));
    }
    if len > MAX_EMAIL_LENGTH {
        return Err(field_error("too_long", messages::EMAIL_TOO_LONG));
    }
    if !validate_email(email) {
        return Err(field_error("invalid_email", messages::INVALID_EMAIL));
    }
    Ok(())
}

pub fn password_validator(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(field_error("required", messages::PASSWORD_MISSING));
    }
    let len = char_len(password);
    if len < MIN_PASSWORD_LENGTH {
        return Err(field_error("too_short", messages::PASSWORD_TOO_SHORT));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(field_error("too_long", messages::PASSWORD_TOO_LONG));
    }
    if !is_strong_password(password) {
        return Err(field_error("weak_password", messages::PASSWORD_WEAK));
    }
    Ok(())
}

pub fn mobile_validator(mobile: i64) -> Result<(), ValidationError> {
    if mobile == 0 {
        return Err(field_error("required", messages::MOBILE_MISSING));
    }
    if mobile < 0 {
        return Err(field_error("negative", messages::MOBILE_NEGATIVE));
    }
    if digit_count(mobile) != MOBILE_DIGITS {
        return Err(field_error("invalid_mobile", messages::INVALID_MOBILE));
    }
    Ok(())
}

pub fn gender_validator(gender: &str) -> Result<(), ValidationError> {
    let gender = gender.trim();
    if gender.is_empty() {
        return Err(field_error("required", messages::GENDER_MISSING));
    }
    match gender.to_lowercase().as_str() {
        "male" | "female" | "other" => Ok(()),
        _ => Err(field_error("invalid_gender", messages::INVALID_GENDER)),
    }
}

pub fn address_validator(address: &str) -> Result<(), ValidationError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(field_error("required", messages::ADDRESS_MISSING));
    }
    let len = char_len(address);
    if len < MIN_ADDRESS_LENGTH {
        return Err(field_error("too_short", messages::ADDRESS_TOO_SHORT));
    }
    if len > MAX_ADDRESS_LENGTH {
        return Err(field_error("too_long", messages::ADDRESS_TOO_LONG));
    }
    Ok(())
}

pub fn clinic_name_validator(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(field_error("required", messages::CLINIC_NAME_MISSING));
    }
    let len = char_len(name);
    if len < MIN_NAME_LENGTH {
        return Err(field_error("too_short", messages::CLINIC_NAME_TOO_SHORT));
    }
    if len > MAX_CLINIC_NAME_LENGTH {
        return Err(field_error("too_long", messages::CLINIC_NAME_TOO_LONG));
    }
    Ok(())
}

pub fn pincode_validator(pincode: i32) -> Result<(), ValidationError> {
    if pincode == 0 {
        return Err(field_error("required", messages::PINCODE_MISSING));
    }
    if !(MIN_PINCODE..=MAX_PINCODE).contains(&pincode) {
        return Err(field_error("invalid_pincode", messages::INVALID_PINCODE));
    }
    Ok(())
}

pub fn age_validator(age: i32) -> Result<(), ValidationError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(field_error("invalid_age", messages::INVALID_AGE));
    }
    Ok(())
}

pub fn qualifications_validator(qualifications: &str) -> Result<(), ValidationError> {
    doctor_detail(
        qualifications,
        messages::QUALIFICATIONS_MISSING,
        messages::QUALIFICATIONS_LENGTH,
    )
}

pub fn working_at_validator(working_at: &str) -> Result<(), ValidationError> {
    doctor_detail(
        working_at,
        messages::WORKING_AT_MISSING,
        messages::WORKING_AT_LENGTH,
    )
}

fn doctor_detail(
    value: &str,
    missing: &'static str,
    length: &'static str,
) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(field_error("required", missing));
    }
    let len = char_len(value);
    if !(MIN_DOCTOR_DETAIL_LENGTH..=MAX_DOCTOR_DETAIL_LENGTH).contains(&len) {
        return Err(field_error("length", length));
    }
    Ok(())
}

/// Validation error messages for user-friendly responses
pub mod messages {
    pub const NAME_MISSING: &str = "Name is required";
    pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters long";
    pub const NAME_TOO_LONG: &str = "Name cannot exceed 50 characters";

    pub const EMAIL_MISSING: &str = "Email is required";
    pub const EMAIL_TOO_SHORT: &str = "Email is too short";
    pub const EMAIL_TOO_LONG: &str = "Email cannot exceed 50 characters";
    pub const INVALID_EMAIL: &str = "Email format is invalid";

    pub const PASSWORD_MISSING: &str = "Password is required";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long";
    pub const PASSWORD_TOO_LONG: &str = "Password cannot exceed 30 characters";
    pub const PASSWORD_WEAK: &str =
        "Password is too weak, must include uppercase, lowercase, number, and special character";

    pub const MOBILE_MISSING: &str = "Mobile number is required";
    pub const MOBILE_NEGATIVE: &str = "Mobile number must be positive";
    pub const INVALID_MOBILE: &str = "10 Digit Mobile Number Required";

    pub const GENDER_MISSING: &str = "Gender is required";
    pub const INVALID_GENDER: &str = "Gender must be 'Male', 'Female', or 'Other'";

    pub const ADDRESS_MISSING: &str = "Address is required";
    pub const ADDRESS_TOO_SHORT: &str = "Address is too short, provide more details";
    pub const ADDRESS_TOO_LONG: &str = "Address is too long, please shorten it";

    pub const CLINIC_NAME_MISSING: &str = "Clinic name is required";
    pub const CLINIC_NAME_TOO_SHORT: &str = "Clinic name must be at least 2 characters long";
    pub const CLINIC_NAME_TOO_LONG: &str = "Clinic name cannot exceed 150 characters";

    pub const PINCODE_MISSING: &str = "Pincode is required";
    pub const INVALID_PINCODE: &str = "Pincode must be 6 digits";

    pub const INVALID_AGE: &str = "Age must be between 1 and 100";

    pub const QUALIFICATIONS_MISSING: &str = "Qualifications are required";
    pub const QUALIFICATIONS_LENGTH: &str = "Qualifications must be between 2 and 200 characters";
    pub const WORKING_AT_MISSING: &str = "WorkingAt is required";
    pub const WORKING_AT_LENGTH: &str = "WorkingAt must be between 2 and 200 characters";

    pub const SEASONS_MISSING: &str = "Season timing details required";
    pub const SEASON_NAME_MISSING: &str = "Season name is required";
    pub const SEASON_NAME_TOO_LONG: &str = "Season name is too long";
    pub const SEASON_START_MISSING: &str = "Season start time is required";
    pub const SEASON_END_MISSING: &str = "Season end time is required";
    pub const SEASON_RANGE: &str = "Season end must be after start";
}
