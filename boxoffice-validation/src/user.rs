//! Account and profile request schemas.

use crate::common::{email, membership_type, name, password, role};
use crate::rules::{NumberRule, RecordSchema, Rule, StringRule};

fn student_id() -> Rule {
    Rule::string().max(20, "Student ID too long").optional()
}

fn bio() -> Rule {
    Rule::string().max(500, "Bio too long").optional()
}

fn course() -> Rule {
    Rule::string().max(100, "Course name too long").optional()
}

fn grad_year() -> NumberRule {
    Rule::number()
        .int()
        .min(1900.0, "Number must be greater than or equal to 1900")
        .max(2100.0, "Number must be less than or equal to 2100")
}

fn link(message: &str) -> Rule {
    Rule::string().url(message).or_empty().optional()
}

fn handle(message: &str) -> Rule {
    Rule::string().max(50, message).optional()
}

fn avatar() -> StringRule {
    Rule::string().url("Invalid avatar URL")
}

pub fn social_links() -> RecordSchema {
    RecordSchema::new()
        .field("github", link("Invalid GitHub URL"))
        .field("linkedin", link("Invalid LinkedIn URL"))
        .field("facebook", link("Invalid Facebook URL"))
        .field("discord", handle("Discord handle too long"))
        .field("instagram", handle("Instagram handle too long"))
}

/// Profile as edited by administrators, including social links.
pub fn profile() -> RecordSchema {
    RecordSchema::new()
        .field("name", name().optional())
        .field("bio", bio())
        .field("avatar", avatar().or_empty().optional())
        .field("gradYear", grad_year().nullable().optional())
        .field("course", course())
        .field("socialLinks", Rule::record(social_links()).optional())
}

pub fn membership() -> RecordSchema {
    RecordSchema::new()
        .field("type", membership_type())
        .field("expiry", Rule::date().nullable().optional())
}

pub fn login_request() -> RecordSchema {
    RecordSchema::new()
        .field("email", email())
        .field("password", Rule::string().min(1, "Password is required"))
}

pub fn register_request() -> RecordSchema {
    RecordSchema::new()
        .field("email", email())
        .field("password", password())
        .field("name", name())
}

pub fn password_reset_initiate() -> RecordSchema {
    RecordSchema::new().field("email", email())
}

pub fn password_reset_complete() -> RecordSchema {
    RecordSchema::new()
        .field("token", Rule::string().min(1, "Reset token is required"))
        .field("newPassword", password())
}

pub fn password_update() -> RecordSchema {
    RecordSchema::new()
        .field(
            "currentPassword",
            Rule::string().min(1, "Current password is required"),
        )
        .field("newPassword", password())
}

pub fn email_verification() -> RecordSchema {
    RecordSchema::new().field("token", Rule::string().min(1, "Verification token is required"))
}

/// First-run account setup.
pub fn user_setup() -> RecordSchema {
    RecordSchema::new()
        .field("name", name())
        .field("bio", bio())
        .field("avatar", avatar().optional())
        .field("gradYear", grad_year().optional())
        .field("course", course())
        .field("membershipType", membership_type())
        .field("socialLinks", Rule::record(social_links()).optional())
        .field("studentId", student_id())
}

/// Self-service profile update; every field is optional.
pub fn user_update() -> RecordSchema {
    RecordSchema::new()
        .field("name", name().optional())
        .field("bio", bio())
        .field("avatar", avatar().optional())
        .field("gradYear", grad_year().optional())
        .field("course", course())
        .field("membershipType", membership_type().optional())
        .field("socialLinks", Rule::record(social_links()).optional())
        .field("studentId", student_id())
        .field("email", email().optional())
        .field("newPassword", password().optional())
}

pub fn admin_user_update() -> RecordSchema {
    RecordSchema::new()
        .field("email", email().optional())
        .field("studentId", student_id())
        .field("password", password().optional())
        .field("emailVerified", Rule::boolean().optional())
        .field("setupCompleted", Rule::boolean().optional())
        .field("isActive", Rule::boolean().optional())
        .field("roles", Rule::list(role()).optional())
        .field("membership", Rule::record(membership()).optional())
        .field("profile", Rule::record(profile()).optional())
}
