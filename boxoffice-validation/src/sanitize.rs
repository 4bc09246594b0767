//! Views of a user record that are safe to send to clients.
//!
//! Each view drops a fixed set of fields and flattens stored role rows
//! (`[{"role": "ADMIN"}]`) into plain role names (`["ADMIN"]`).

use boxoffice_forms::{Record, Value};

const SECRETS: &[&str] = &[
    "password",
    "emailVerificationToken",
    "emailVerificationExpires",
    "passwordResetToken",
    "passwordResetExpires",
];

const METADATA: &[&str] = &[
    "setupCompletedAt",
    "createdAt",
    "updatedAt",
    "lastLogin",
    "isActive",
];

const PERSONAL: &[&str] = &[
    "email",
    "studentId",
    "emailVerified",
    "setupCompleted",
    "membership",
];

/// Replace role rows with their role names.
pub fn transform_user_roles(mut user: Record) -> Record {
    if let Some(Value::List(rows)) = user.get_mut("roles") {
        for row in rows.iter_mut() {
            if let Some(role) = row.get("role").cloned() {
                *row = role;
            }
        }
    }
    user
}

/// Everything except credentials and tokens.
pub fn safe_user_data(user: &Record) -> Record {
    transform_user_roles(without(user, &[SECRETS]))
}

/// [`safe_user_data`] without bookkeeping timestamps and flags.
pub fn clean_user_data(user: &Record) -> Record {
    transform_user_roles(without(user, &[SECRETS, METADATA]))
}

/// Public view: no contact details, membership or account state.
pub fn restricted_user_data(user: &Record) -> Record {
    transform_user_roles(without(user, &[SECRETS, METADATA, PERSONAL]))
}

/// The minimal identity kept in a session.
pub fn session_user_data(user: &Record) -> Record {
    let mut session = Record::new();
    for key in ["id", "email", "emailVerified", "setupCompleted"] {
        if let Some(value) = user.get(key) {
            session.insert(key.to_string(), value.clone());
        }
    }

    let mut profile = Record::new();
    if let Some(Value::Record(stored)) = user.get("profile") {
        for key in ["name", "avatar"] {
            match stored.get(key) {
                Some(Value::String(s)) if !s.is_empty() => {
                    profile.insert(key.to_string(), Value::String(s.clone()));
                }
                _ => {}
            }
        }
    }
    session.insert("profile".to_string(), Value::Record(profile));

    let roles = match user.get("roles") {
        Some(Value::List(rows)) => Value::List(rows.clone()),
        _ => Value::List(Vec::new()),
    };
    session.insert("roles".to_string(), roles);
    transform_user_roles(session)
}

fn without(user: &Record, groups: &[&[&str]]) -> Record {
    user.iter()
        .filter(|(key, _)| !groups.iter().any(|group| group.contains(&key.as_str())))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> Record {
        Value::from(json!({
            "id": "u1",
            "email": "viola@theatre.test",
            "password": "hash",
            "passwordResetToken": "t",
            "emailVerified": true,
            "setupCompleted": true,
            "createdAt": "2026-01-01T00:00:00.000Z",
            "isActive": true,
            "membership": {"type": "FULL"},
            "profile": {"name": "Viola", "avatar": ""},
            "roles": [{"role": "ADMIN"}, {"role": "TRAINER"}]
        }))
        .as_record()
        .cloned()
        .unwrap()
    }

    #[test]
    fn safe_view_drops_secrets_and_flattens_roles() {
        let safe = safe_user_data(&user());
        assert!(!safe.contains_key("password"));
        assert!(!safe.contains_key("passwordResetToken"));
        assert!(safe.contains_key("createdAt"));
        assert_eq!(safe["roles"], Value::from(json!(["ADMIN", "TRAINER"])));
    }

    #[test]
    fn clean_view_drops_metadata() {
        let clean = clean_user_data(&user());
        assert!(!clean.contains_key("createdAt"));
        assert!(!clean.contains_key("isActive"));
        assert!(clean.contains_key("email"));
    }

    #[test]
    fn restricted_view_drops_personal_fields() {
        let restricted = restricted_user_data(&user());
        assert_eq!(
            restricted.keys().collect::<Vec<_>>(),
            ["id", "profile", "roles"]
        );
    }

    #[test]
    fn session_view_is_minimal() {
        let session = session_user_data(&user());
        assert_eq!(
            Value::Record(session),
            Value::from(json!({
                "id": "u1",
                "email": "viola@theatre.test",
                "emailVerified": true,
                "setupCompleted": true,
                "profile": {"name": "Viola"},
                "roles": ["ADMIN", "TRAINER"]
            }))
        );
    }
}
