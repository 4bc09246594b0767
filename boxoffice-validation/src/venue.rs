//! Venue and venue feature request schemas.

use crate::rules::{NumberRule, RecordSchema, Rule, StringRule};

fn venue_name() -> StringRule {
    Rule::string()
        .min(1, "Venue name is required")
        .max(100, "Venue name too long")
}

fn capacity() -> NumberRule {
    Rule::number().int().min(1.0, "Capacity must be at least 1")
}

fn feature_name() -> StringRule {
    Rule::string()
        .min(1, "Feature name is required")
        .max(100, "Feature name too long")
}

fn venue_fields(schema: RecordSchema) -> RecordSchema {
    schema
        .field("address", Rule::string().max(500, "Address too long").optional())
        .field(
            "imageUrl",
            Rule::string().url("Invalid image URL").or_empty().optional(),
        )
        .field("notes", Rule::string().max(1000, "Notes too long").optional())
        .field("featureIds", Rule::list(Rule::string()).optional())
}

fn feature_fields(schema: RecordSchema) -> RecordSchema {
    schema
        .field(
            "description",
            Rule::string().max(500, "Description too long").optional(),
        )
        .field("icon", Rule::string().max(50, "Icon string too long").optional())
}

pub fn venue_create() -> RecordSchema {
    venue_fields(
        RecordSchema::new()
            .field("name", venue_name())
            .field("capacity", capacity().optional()),
    )
}

/// Partial update; `capacity` may be cleared with null.
pub fn venue_update() -> RecordSchema {
    venue_fields(
        RecordSchema::new()
            .field("name", venue_name().optional())
            .field("capacity", capacity().nullable().optional()),
    )
    .field("isActive", Rule::boolean().optional())
}

pub fn venue_feature_create() -> RecordSchema {
    feature_fields(RecordSchema::new().field("name", feature_name()))
}

pub fn venue_feature_update() -> RecordSchema {
    feature_fields(RecordSchema::new().field("name", feature_name().optional()))
        .field("isActive", Rule::boolean().optional())
}
