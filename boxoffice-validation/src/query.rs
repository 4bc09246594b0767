//! Listing query parameters: pagination and sorting.
//!
//! Query values arrive as strings (or numbers, once decoded). Integers are
//! read the lenient way browsers send them: leading whitespace, an optional
//! sign, then as many digits as there are; anything after is ignored.

use boxoffice_forms::{PageMeta, Record, SortOrder, TableResponse, Value};
use serde::Serialize;
use tracing::debug;

use crate::error::{QueryError, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub skip: u64,
}

/// A validated sort selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub sort_by: String,
    pub sort_order: SortOrder,
}

/// Read `page` and `limit`.
///
/// Missing, zero or unparseable values fall back to page 1 and limit 10.
/// Page is at least 1 and limit is clamped to `1..=100`. A page too large
/// to represent is [`QueryError::InvalidPagination`].
pub fn validate_pagination(query: &Record) -> Result<Pagination> {
    let page = parse_int(query.get("page"))?
        .filter(|n| *n != 0)
        .unwrap_or(i64::from(DEFAULT_PAGE))
        .max(1);
    let limit = parse_int(query.get("limit"))?
        .filter(|n| *n != 0)
        .unwrap_or(i64::from(DEFAULT_LIMIT))
        .clamp(1, i64::from(MAX_LIMIT));

    let page = u32::try_from(page).map_err(|_| QueryError::InvalidPagination)?;
    let limit = u32::try_from(limit).map_err(|_| QueryError::InvalidPagination)?;
    let pagination = Pagination {
        page,
        limit,
        skip: u64::from(page - 1) * u64::from(limit),
    };
    debug!(page, limit, skip = pagination.skip, "pagination validated");
    Ok(pagination)
}

/// Read `sortBy` and `sortOrder`.
///
/// `sortBy` defaults to `createdAt` and must be one of `valid_fields`.
/// `sortOrder` is ascending only when it is exactly `asc`.
pub fn validate_sort<S: AsRef<str>>(query: &Record, valid_fields: &[S]) -> Result<Sort> {
    let sort_by = query
        .get("sortBy")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SORT_FIELD);
    let sort_order = SortOrder::parse(query.get("sortOrder").and_then(Value::as_str).unwrap_or(""));

    if !valid_fields.iter().any(|f| f.as_ref() == sort_by) {
        return Err(QueryError::invalid_sort_field(sort_by, valid_fields));
    }
    Ok(Sort {
        sort_by: sort_by.to_string(),
        sort_order,
    })
}

/// Wrap one page of rows with its pagination metadata.
pub fn paginated<T>(data: Vec<T>, pagination: &Pagination, total: u64) -> TableResponse<T> {
    TableResponse::ok(data, PageMeta::new(pagination.page, pagination.limit, total))
}

/// Leading integer of a query value. `None` when there is none; digits that
/// overflow are an error.
fn parse_int(value: Option<&Value>) -> Result<Option<i64>> {
    match value {
        Some(Value::Number(n)) if n.is_finite() => {
            let truncated = n.trunc();
            if truncated.abs() >= i64::MAX as f64 {
                return Err(QueryError::InvalidPagination);
            }
            Ok(Some(truncated as i64))
        }
        Some(Value::String(s)) => {
            let s = s.trim_start();
            let (negative, rest) = match s.as_bytes().first() {
                Some(b'-') => (true, &s[1..]),
                Some(b'+') => (false, &s[1..]),
                _ => (false, s),
            };
            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            let digits = &rest[..digits_end];
            if digits.is_empty() {
                return Ok(None);
            }
            let magnitude: i64 = digits
                .parse()
                .map_err(|_| QueryError::InvalidPagination)?;
            Ok(Some(if negative { -magnitude } else { magnitude }))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(json: serde_json::Value) -> Record {
        Value::from(json).as_record().cloned().unwrap_or_default()
    }

    #[test]
    fn pagination_defaults() {
        let p = validate_pagination(&Record::new()).unwrap();
        assert_eq!(p, Pagination { page: 1, limit: 10, skip: 0 });
    }

    #[test]
    fn pagination_parses_leading_integers() {
        let p = validate_pagination(&query(json!({"page": " 3rd", "limit": "25 per page"}))).unwrap();
        assert_eq!(p, Pagination { page: 3, limit: 25, skip: 50 });

        let p = validate_pagination(&query(json!({"page": 2, "limit": 12.9}))).unwrap();
        assert_eq!(p, Pagination { page: 2, limit: 12, skip: 12 });
    }

    #[test]
    fn pagination_clamps() {
        let p = validate_pagination(&query(json!({"page": "-4", "limit": "500"}))).unwrap();
        assert_eq!((p.page, p.limit), (1, 100));

        let p = validate_pagination(&query(json!({"limit": "-3"}))).unwrap();
        assert_eq!(p.limit, 1);
    }

    #[test]
    fn zero_and_garbage_fall_back_to_defaults() {
        let p = validate_pagination(&query(json!({"page": "0", "limit": "0"}))).unwrap();
        assert_eq!((p.page, p.limit), (1, 10));

        let p = validate_pagination(&query(json!({"page": "abc", "limit": true}))).unwrap();
        assert_eq!((p.page, p.limit), (1, 10));
    }

    #[test]
    fn unrepresentable_page_is_rejected() {
        let err = validate_pagination(&query(json!({"page": "99999999999999999999"}))).unwrap_err();
        assert_eq!(err, QueryError::InvalidPagination);
        let err = validate_pagination(&query(json!({"page": "5000000000"}))).unwrap_err();
        assert_eq!(err, QueryError::InvalidPagination);
    }

    #[test]
    fn sort_defaults_to_created_at_desc() {
        let sort = validate_sort(&Record::new(), &["createdAt", "name"]).unwrap();
        assert_eq!(sort.sort_by, "createdAt");
        assert_eq!(sort.sort_order, SortOrder::Desc);
    }

    #[test]
    fn sort_order_is_asc_only_when_exact() {
        let fields = ["name"];
        let asc = validate_sort(&query(json!({"sortBy": "name", "sortOrder": "asc"})), &fields).unwrap();
        assert_eq!(asc.sort_order, SortOrder::Asc);
        let upper = validate_sort(&query(json!({"sortBy": "name", "sortOrder": "ASC"})), &fields).unwrap();
        assert_eq!(upper.sort_order, SortOrder::Desc);
    }

    #[test]
    fn unknown_sort_field_lists_choices() {
        let err = validate_sort(&query(json!({"sortBy": "price"})), &["name", "capacity"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid sortBy field. Must be one of: name, capacity"
        );
    }

    #[test]
    fn paginated_computes_page_count() {
        let p = Pagination { page: 2, limit: 10, skip: 10 };
        let response = paginated(vec!["Twelfth Night"], &p, 21);
        assert!(response.success);
        assert_eq!(response.meta, Some(PageMeta { page: 2, pages: 3, count: 21 }));
    }
}
