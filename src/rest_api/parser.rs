//! # Query Parameter Parser
//!
//! Turns raw `<operator>.<field>=<value>` pairs into typed equality filters
//! plus the reserved `select` and `limit` parameters.

use crate::document::{Document, Value};
use crate::observability::{log_event, Event};

use super::errors::{RestError, RestResult};

/// Operator token for equality when none is configured
pub const DEFAULT_EQUALITY_OPERATOR: &str = "eq";

const SELECT_PARAM: &str = "select";
const LIMIT_PARAM: &str = "limit";

/// Parsed filter parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    /// Field -> expected value, all combined with AND
    pub filters: Document,

    /// Fields to select (empty = all)
    pub select: Vec<String>,

    /// Maximum number of matched records
    pub limit: Option<usize>,
}

impl FilterParams {
    /// Parse ordered key/value pairs.
    ///
    /// Keys use the configured equality `operator`; pairs with any other
    /// operator are dropped. When a field repeats, the first value wins.
    pub fn parse<K, V>(pairs: &[(K, V)], operator: &str) -> RestResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = FilterParams::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                SELECT_PARAM => params.select.extend(parse_select(value)?),
                LIMIT_PARAM => {
                    let limit = parse_limit(value)?;
                    params.limit.get_or_insert(limit);
                }
                _ => {
                    let (op, field) = split_key(key)?;
                    if op != operator {
                        log_event(
                            Event::FilterOperatorIgnored,
                            &[("operator", op), ("field", field)],
                        );
                        continue;
                    }
                    if !params.filters.contains_field(field) {
                        params.filters.insert(field, coerce_value(value));
                    }
                }
            }
        }

        Ok(params)
    }
}

/// Split `<operator>.<field>`
fn split_key(key: &str) -> RestResult<(&str, &str)> {
    let (op, field) = key.split_once('.').ok_or_else(|| {
        RestError::InvalidQueryParam(format!("'{}' is not of the form <operator>.<field>", key))
    })?;
    if op.is_empty() {
        return Err(RestError::InvalidQueryParam(format!(
            "missing operator in '{}'",
            key
        )));
    }
    if field.is_empty() {
        return Err(RestError::InvalidQueryParam(format!(
            "missing field in '{}'",
            key
        )));
    }
    if field.contains('.') {
        return Err(RestError::InvalidQueryParam(format!(
            "nested field '{}' is not supported",
            key
        )));
    }
    Ok((op, field))
}

/// Parse select parameter (comma-separated field list)
fn parse_select(value: &str) -> RestResult<Vec<String>> {
    let fields: Vec<String> = value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if fields.is_empty() {
        return Err(RestError::InvalidQueryParam(
            "select cannot be empty".to_string(),
        ));
    }

    Ok(fields)
}

/// Parse limit parameter
fn parse_limit(value: &str) -> RestResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| RestError::InvalidQueryParam(format!("Invalid limit: {}", value)))
}

/// Coerce a raw parameter value: bool, then integer, then finite float,
/// otherwise the string itself.
pub fn coerce_value(value: &str) -> Value {
    match value {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = value.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(n) = value.parse::<f64>() {
        if n.is_finite() {
            return Value::Float(n);
        }
    }

    Value::String(value.to_string())
}
