//! Rules shared by the server-side schemas, and the enumerations they check.

use serde::{Deserialize, Serialize};

use crate::rules::{Rule, StringRule};

/// Staff role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleType {
    Admin,
    Manager,
    Trainer,
}

impl RoleType {
    pub const ALL: [RoleType; 3] = [RoleType::Admin, RoleType::Manager, RoleType::Trainer];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Admin => "ADMIN",
            RoleType::Manager => "MANAGER",
            RoleType::Trainer => "TRAINER",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(RoleType::as_str).collect()
    }
}

/// Membership tier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipType {
    Full,
    Associate,
    Fellow,
    Alumni,
    Guest,
    Unknown,
}

impl MembershipType {
    pub const ALL: [MembershipType; 6] = [
        MembershipType::Full,
        MembershipType::Associate,
        MembershipType::Fellow,
        MembershipType::Alumni,
        MembershipType::Guest,
        MembershipType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Full => "FULL",
            MembershipType::Associate => "ASSOCIATE",
            MembershipType::Fellow => "FELLOW",
            MembershipType::Alumni => "ALUMNI",
            MembershipType::Guest => "GUEST",
            MembershipType::Unknown => "UNKNOWN",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(MembershipType::as_str).collect()
    }
}

pub fn email() -> StringRule {
    Rule::string().email("Invalid email address")
}

pub fn password() -> StringRule {
    Rule::string().min(8, "Password must be at least 8 characters")
}

pub fn name() -> StringRule {
    Rule::string().min(1, "Name is required").max(100, "Name too long")
}

pub fn role() -> Rule {
    Rule::one_of(&RoleType::names())
}

pub fn membership_type() -> Rule {
    Rule::one_of(&MembershipType::names())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_names_match_serde() {
        for role in RoleType::ALL {
            assert_eq!(
                serde_json::to_value(role).unwrap(),
                serde_json::Value::from(role.as_str())
            );
        }
        for tier in MembershipType::ALL {
            assert_eq!(
                serde_json::to_value(tier).unwrap(),
                serde_json::Value::from(tier.as_str())
            );
        }
    }
}
