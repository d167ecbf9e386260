//! Field value normalization
//!
//! Snapshots arrive as loosely typed JSON: the same field may be `"5"` in one
//! version of a record and `5` in the next, or `""` where another version has
//! `null`. Normalizing both sides before comparing keeps those type
//! mismatches out of the audit trail.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A flat entity snapshot: field name to JSON value
pub type Record = Map<String, Value>;

/// Largest magnitude below which every whole `f64` is an exact integer
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A snapshot field value after normalization
///
/// Serializes back to plain JSON (`Empty` becomes `null`, whole numbers
/// become integers). Numbers nested in lists and records compare by value,
/// so `[1]` equals `[1.0]`.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Absent, `null`, or the empty string
    Empty,
    /// A JSON number, or a string that reads entirely as a number
    Number(f64),
    /// Any other string
    Text(String),
    Bool(bool),
    List(Vec<Value>),
    Record(Record),
}

impl FieldValue {
    /// Normalize a raw field value taken from a snapshot
    ///
    /// `None` stands for a field missing from the snapshot.
    pub fn normalize(raw: Option<&Value>) -> Self {
        match raw {
            None | Some(Value::Null) => FieldValue::Empty,
            Some(Value::String(s)) if s.is_empty() => FieldValue::Empty,
            Some(Value::String(s)) => match parse_number(s) {
                Some(n) => FieldValue::Number(n),
                None => FieldValue::Text(s.clone()),
            },
            Some(Value::Number(n)) => match n.as_f64() {
                Some(n) => FieldValue::Number(n),
                None => FieldValue::Text(n.to_string()),
            },
            Some(Value::Bool(b)) => FieldValue::Bool(*b),
            Some(Value::Array(items)) => FieldValue::List(items.clone()),
            Some(Value::Object(map)) => FieldValue::Record(map.clone()),
        }
    }

    /// Check if this is the canonical empty marker
    ///
    /// `0` and `false` are values, not empties.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// First element of a list value, when that element is a record
    pub fn first_record(&self) -> Option<&Record> {
        match self {
            FieldValue::List(items) => items.first().and_then(Value::as_object),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Empty, FieldValue::Empty) => true,
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => same_items(a, b),
            (FieldValue::Record(a), FieldValue::Record(b)) => same_record(a, b),
            _ => false,
        }
    }
}

fn same_json(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => same_items(xs, ys),
        (Value::Object(xs), Value::Object(ys)) => same_record(xs, ys),
        _ => a == b,
    }
}

fn same_items(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_json(x, y))
}

fn same_record(a: &Record, b: &Record) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, x)| b.get(key).is_some_and(|y| same_json(x, y)))
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Empty => serializer.serialize_none(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::Record(map) => map.serialize(serializer),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => f.write_str("null"),
            FieldValue::Number(n) => f.write_str(&format_number(*n)),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::List(items) => {
                let json = serde_json::to_string(items).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            FieldValue::Record(map) => {
                let json = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// Parse a string the way a JavaScript `Number()` conversion would
///
/// Surrounding whitespace is ignored and a blank string reads as `0`.
/// Accepts decimal literals with optional sign and exponent, `Infinity`,
/// and unsigned `0x`/`0o`/`0b` integer literals. Returns `None` for
/// anything else, including `"nan"` and `"inf"`.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    for (prefixes, radix) in [(["0x", "0X"], 16), (["0o", "0O"], 8), (["0b", "0B"], 2)] {
        if let Some(digits) = prefixes.iter().find_map(|p| trimmed.strip_prefix(*p)) {
            return parse_radix(digits, radix);
        }
    }

    let (sign, body) = match trimmed.as_bytes()[0] {
        b'+' => (1.0, &trimmed[1..]),
        b'-' => (-1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };

    if body == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    if !is_decimal_literal(body) {
        return None;
    }

    trimmed.parse::<f64>().ok()
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Unsigned decimal literal: `12`, `1.5`, `.5`, `5.`, `1e3`, `2.5E-4`
fn is_decimal_literal(s: &str) -> bool {
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}

/// Render a number the way the audit trail has always shown them
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let label = if n > 0.0 { "Infinity" } else { "-Infinity" };
        label.to_string()
    } else if n == 0.0 {
        // covers -0
        "0".to_string()
    } else {
        n.to_string()
    }
}
