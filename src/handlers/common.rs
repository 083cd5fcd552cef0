use crate::errors::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Resolves a path id. Anything that is not an integer cannot name a product.
pub fn parse_id(raw: &str) -> Result<i32, ServiceError> {
    raw.parse::<i32>()
        .map_err(|_| ServiceError::NotFound("Product not found".to_string()))
}

/// Largest accepted unit price, in either direction. Keeps stock value sums well inside
/// `Decimal` range and every stored price exactly representable as a SQLite REAL.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// True when the key was sent with a value a form would treat as filled in.
///
/// `null`, `false`, `0` and `""` all count as missing.
pub fn is_filled(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Renders a scalar as text; absent values become the empty string.
pub fn coerce_text(value: Option<Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// Absent values stay absent; scalars are rendered as text.
pub fn coerce_optional_text(value: Option<Value>) -> Option<String> {
    value.map(|v| match v {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Truncates a number or the leading integer of a string, the way `parseInt` reads a form field.
pub fn coerce_quantity(value: &Value) -> Result<i32, ServiceError> {
    let invalid = || ServiceError::ValidationError("Quantity must be a number".to_string());
    let out_of_range = || ServiceError::ValidationError("Quantity is out of range".to_string());

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return i32::try_from(i).map_err(|_| out_of_range());
            }
            let f = n.as_f64().ok_or_else(invalid)?.trunc();
            if f < f64::from(i32::MIN) || f > f64::from(i32::MAX) {
                return Err(out_of_range());
            }
            Ok(f as i32)
        }
        Value::String(s) => {
            let digits = leading_integer(s).ok_or_else(invalid)?;
            digits.parse::<i64>().map_err(|_| out_of_range()).and_then(|i| {
                i32::try_from(i).map_err(|_| out_of_range())
            })
        }
        _ => Err(invalid()),
    }
}

/// Reads a number or the leading decimal of a string, the way `parseFloat` reads a form field.
///
/// Prices beyond [`MAX_PRICE`] are rejected.
pub fn coerce_price(value: &Value) -> Result<Decimal, ServiceError> {
    let invalid = || ServiceError::ValidationError("Price must be a number".to_string());
    let out_of_range = || ServiceError::ValidationError("Price is out of range".to_string());

    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => leading_float(s).ok_or_else(invalid)?.to_string(),
        _ => return Err(invalid()),
    };

    let price = match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        Ok(price) => price,
        // numeric but too large or too precise for a Decimal
        Err(_) if text.parse::<f64>().is_ok() => return Err(out_of_range()),
        Err(_) => return Err(invalid()),
    };
    if price.abs() > MAX_PRICE {
        return Err(out_of_range());
    }
    Ok(price)
}

fn leading_integer(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    (end > digits_start).then(|| &s[..end])
}

fn leading_float(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            digits += 1;
        }
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // exponent only counts when followed by at least one digit
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}
