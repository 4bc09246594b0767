//! Schemas for the forms users fill in, with the wording shown next to the
//! inputs.

use crate::rules::{fields_match, RecordSchema, Rule, StringRule};

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

fn email() -> StringRule {
    Rule::string().email("Please enter a valid email address")
}

fn password() -> StringRule {
    Rule::string().min(8, "Password must be at least 8 characters")
}

fn required() -> StringRule {
    Rule::string().min(1, "This field is required")
}

fn phone() -> StringRule {
    Rule::string().pattern(r"^\+?[\d\s\-()]+$", "Please enter a valid phone number")
}

fn url() -> StringRule {
    Rule::string().url("Please enter a valid URL")
}

pub fn login() -> RecordSchema {
    RecordSchema::new()
        .field("email", email())
        .field("password", required())
}

/// Sign-up form; `confirmPassword` must repeat `password`.
pub fn register() -> RecordSchema {
    RecordSchema::new()
        .field("name", required())
        .field("email", email())
        .field("password", password())
        .field("confirmPassword", required())
        .refine(fields_match("password", "confirmPassword", PASSWORDS_DO_NOT_MATCH))
}

pub fn contact() -> RecordSchema {
    RecordSchema::new()
        .field("name", required())
        .field("email", email())
        .field("subject", required())
        .field(
            "message",
            Rule::string().min(10, "Message must be at least 10 characters"),
        )
}

pub fn profile_form() -> RecordSchema {
    RecordSchema::new()
        .field("firstName", required())
        .field("lastName", required())
        .field("email", email())
        .field("phone", phone().optional())
        .field("website", url().optional())
        .field("bio", Rule::string().optional())
}

pub fn forgot_password() -> RecordSchema {
    RecordSchema::new().field("email", email())
}

/// New-password form; `confirmPassword` must repeat `newPassword`.
pub fn reset_password() -> RecordSchema {
    RecordSchema::new()
        .field("newPassword", password())
        .field("confirmPassword", required())
        .refine(fields_match("newPassword", "confirmPassword", PASSWORDS_DO_NOT_MATCH))
}
