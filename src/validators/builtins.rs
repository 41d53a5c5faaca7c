//! Built-in XSD datatypes
//!
//! Lexical validators for the primitive and derived atomic types of XML
//! Schema Part 2. The registry is a static map from local name to a
//! validator predicate; callers strip any namespace prefix before lookup.

use crate::error::{Error, Result};
use crate::names;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// The XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// The XML Schema instance namespace (`xsi:*` attributes)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The xmlns namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A built-in XSD type with its lexical validator
pub struct BuiltinType {
    /// Local name in the XSD namespace
    pub name: &'static str,
    validator: fn(&str) -> Result<()>,
}

impl BuiltinType {
    /// Validate a lexical value against this type
    pub fn validate(&self, value: &str) -> Result<()> {
        (self.validator)(value)
    }
}

macro_rules! builtin {
    ($map:expr, $name:literal, $validator:expr) => {
        $map.insert(
            $name,
            BuiltinType {
                name: $name,
                validator: $validator,
            },
        );
    };
}

static BUILTIN_TYPES: Lazy<HashMap<&'static str, BuiltinType>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // Primitive types
    builtin!(m, "string", validate_string);
    builtin!(m, "boolean", validate_boolean);
    builtin!(m, "decimal", validate_decimal);
    builtin!(m, "float", validate_float);
    builtin!(m, "double", validate_double);
    builtin!(m, "duration", validate_duration);
    builtin!(m, "dateTime", validate_date_time);
    builtin!(m, "time", validate_time);
    builtin!(m, "date", validate_date);
    builtin!(m, "gYearMonth", validate_g_year_month);
    builtin!(m, "gYear", validate_g_year);
    builtin!(m, "gMonthDay", validate_g_month_day);
    builtin!(m, "gDay", validate_g_day);
    builtin!(m, "gMonth", validate_g_month);
    builtin!(m, "hexBinary", validate_hex_binary);
    builtin!(m, "base64Binary", validate_base64_binary);
    builtin!(m, "anyURI", validate_any_uri);
    builtin!(m, "QName", validate_qname);
    builtin!(m, "NOTATION", validate_qname);

    // Derived string types
    builtin!(m, "normalizedString", validate_normalized_string);
    builtin!(m, "token", validate_token);
    builtin!(m, "language", validate_language);
    builtin!(m, "Name", validate_name);
    builtin!(m, "NCName", validate_ncname);
    builtin!(m, "ID", validate_ncname);
    builtin!(m, "IDREF", validate_ncname);
    builtin!(m, "IDREFS", validate_idrefs);
    builtin!(m, "ENTITY", validate_ncname);
    builtin!(m, "ENTITIES", validate_entities);
    builtin!(m, "NMTOKEN", validate_nmtoken);
    builtin!(m, "NMTOKENS", validate_nmtokens);

    // Derived numeric types
    builtin!(m, "integer", validate_integer);
    builtin!(m, "nonPositiveInteger", validate_non_positive_integer);
    builtin!(m, "negativeInteger", validate_negative_integer);
    builtin!(m, "long", validate_long);
    builtin!(m, "int", validate_int);
    builtin!(m, "short", validate_short);
    builtin!(m, "byte", validate_byte);
    builtin!(m, "nonNegativeInteger", validate_non_negative_integer);
    builtin!(m, "unsignedLong", validate_unsigned_long);
    builtin!(m, "unsignedInt", validate_unsigned_int);
    builtin!(m, "unsignedShort", validate_unsigned_short);
    builtin!(m, "unsignedByte", validate_unsigned_byte);
    builtin!(m, "positiveInteger", validate_positive_integer);

    m
});

/// Look up a built-in type by name, stripping any namespace prefix
pub fn get_builtin_type(name: &str) -> Option<&'static BuiltinType> {
    let local = match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    };
    BUILTIN_TYPES.get(local)
}

/// Check if a name denotes a built-in XSD type
pub fn is_builtin_type(name: &str) -> bool {
    get_builtin_type(name).is_some()
}

/// Validate a value against a built-in type by name
pub fn validate_builtin(name: &str, value: &str) -> Result<()> {
    match get_builtin_type(name) {
        Some(t) => t.validate(value),
        None => Err(Error::Value(format!("unknown built-in type: {}", name))),
    }
}

/// True for types whose facet bounds compare numerically
pub fn is_numeric_type(name: &str) -> bool {
    matches!(
        name,
        "decimal"
            | "integer"
            | "float"
            | "double"
            | "nonPositiveInteger"
            | "negativeInteger"
            | "long"
            | "int"
            | "short"
            | "byte"
            | "nonNegativeInteger"
            | "positiveInteger"
            | "unsignedLong"
            | "unsignedInt"
            | "unsignedShort"
            | "unsignedByte"
    )
}

/// True for date/time types
pub fn is_date_time_type(name: &str) -> bool {
    matches!(
        name,
        "dateTime" | "date" | "time" | "gYear" | "gYearMonth" | "gMonth" | "gMonthDay" | "gDay"
    )
}

// Primitive type validators

fn validate_string(_value: &str) -> Result<()> {
    Ok(())
}

fn validate_boolean(value: &str) -> Result<()> {
    match value {
        "true" | "false" | "1" | "0" => Ok(()),
        _ => Err(Error::Value(format!("invalid boolean value: {}", value))),
    }
}

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").unwrap());

fn validate_decimal(value: &str) -> Result<()> {
    if DECIMAL_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid decimal value: {}", value)))
    }
}

static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap());

fn validate_float(value: &str) -> Result<()> {
    match value {
        "INF" | "+INF" | "-INF" | "NaN" => return Ok(()),
        _ => {}
    }
    if FLOAT_RE.is_match(value) && value.parse::<f32>().is_ok() {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid float value: {}", value)))
    }
}

fn validate_double(value: &str) -> Result<()> {
    match value {
        "INF" | "+INF" | "-INF" | "NaN" => return Ok(()),
        _ => {}
    }
    if FLOAT_RE.is_match(value) && value.parse::<f64>().is_ok() {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid double value: {}", value)))
    }
}

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?P(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$").unwrap()
});

fn validate_duration(value: &str) -> Result<()> {
    if !DURATION_RE.is_match(value) {
        return Err(Error::Value(format!("invalid duration value: {}", value)));
    }
    // At least one component is required.
    match value.trim_start_matches('-') {
        "P" | "PT" => Err(Error::Value(format!(
            "duration must have at least one component: {}",
            value
        ))),
        _ => Ok(()),
    }
}

fn is_leap_year(year: u64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Days in a month. A `year` of `None` (no year context) admits February 29.
fn days_in_month(year: Option<u64>, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => match year {
            Some(y) if !is_leap_year(y) => 28,
            _ => 29,
        },
        _ => 0,
    }
}

/// Calendar check for a year/month/day triple taken from a lexical form.
/// Years before 0001 keep only the lexical 1..=31 day range.
fn valid_calendar_day(negative_year: bool, year: &str, month: u32, day: u32) -> bool {
    if negative_year {
        return (1..=31).contains(&day);
    }
    day >= 1 && day <= days_in_month(year.parse::<u64>().ok(), month)
}

static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(\d{4,})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$")
        .unwrap()
});

fn validate_date_time(value: &str) -> Result<()> {
    let caps = DATE_TIME_RE
        .captures(value)
        .ok_or_else(|| Error::Value(format!("invalid dateTime value: {}", value)))?;
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);
    let hour: u32 = caps[4].parse().unwrap_or(99);
    let minute: u32 = caps[5].parse().unwrap_or(99);
    let second: u32 = caps[6].parse().unwrap_or(99);
    if !(1..=12).contains(&month)
        || !valid_calendar_day(value.starts_with('-'), &caps[1], month, day)
        || hour > 23
        || minute > 59
        || second > 59
    {
        return Err(Error::Value(format!("invalid dateTime value: {}", value)));
    }
    Ok(())
}

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap());

fn validate_time(value: &str) -> Result<()> {
    let caps = TIME_RE
        .captures(value)
        .ok_or_else(|| Error::Value(format!("invalid time value: {}", value)))?;
    let hour: u32 = caps[1].parse().unwrap_or(99);
    let minute: u32 = caps[2].parse().unwrap_or(99);
    let second: u32 = caps[3].parse().unwrap_or(99);
    if hour > 23 || minute > 59 || second > 59 {
        return Err(Error::Value(format!("invalid time value: {}", value)));
    }
    Ok(())
}

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(\d{4,})-(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

fn validate_date(value: &str) -> Result<()> {
    let caps = DATE_RE
        .captures(value)
        .ok_or_else(|| Error::Value(format!("invalid date value: {}", value)))?;
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);
    if !(1..=12).contains(&month)
        || !valid_calendar_day(value.starts_with('-'), &caps[1], month, day)
    {
        return Err(Error::Value(format!("invalid date value: {}", value)));
    }
    Ok(())
}

static G_YEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d{4,}-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

fn validate_g_year_month(value: &str) -> Result<()> {
    let caps = G_YEAR_MONTH_RE
        .captures(value)
        .ok_or_else(|| Error::Value(format!("invalid gYearMonth value: {}", value)))?;
    let month: u32 = caps[1].parse().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return Err(Error::Value(format!(
            "invalid month in gYearMonth: {}",
            value
        )));
    }
    Ok(())
}

static G_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d{4,}(Z|[+-]\d{2}:\d{2})?$").unwrap());

fn validate_g_year(value: &str) -> Result<()> {
    if G_YEAR_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid gYear value: {}", value)))
    }
}

static G_MONTH_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

fn validate_g_month_day(value: &str) -> Result<()> {
    let caps = G_MONTH_DAY_RE
        .captures(value)
        .ok_or_else(|| Error::Value(format!("invalid gMonthDay value: {}", value)))?;
    let month: u32 = caps[1].parse().unwrap_or(0);
    let day: u32 = caps[2].parse().unwrap_or(0);
    // No year context: --02-29 is a valid gMonthDay (it recurs in leap years).
    if !(1..=12).contains(&month) || day < 1 || day > days_in_month(None, month) {
        return Err(Error::Value(format!("invalid gMonthDay value: {}", value)));
    }
    Ok(())
}

static G_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^---(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

fn validate_g_day(value: &str) -> Result<()> {
    let caps = G_DAY_RE
        .captures(value)
        .ok_or_else(|| Error::Value(format!("invalid gDay value: {}", value)))?;
    let day: u32 = caps[1].parse().unwrap_or(0);
    if !(1..=31).contains(&day) {
        return Err(Error::Value(format!("invalid gDay value: {}", value)));
    }
    Ok(())
}

static G_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

fn validate_g_month(value: &str) -> Result<()> {
    let caps = G_MONTH_RE
        .captures(value)
        .ok_or_else(|| Error::Value(format!("invalid gMonth value: {}", value)))?;
    let month: u32 = caps[1].parse().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return Err(Error::Value(format!("invalid gMonth value: {}", value)));
    }
    Ok(())
}

fn validate_hex_binary(value: &str) -> Result<()> {
    if value.len() % 2 != 0 {
        return Err(Error::Value(format!(
            "hexBinary must have even number of characters: {}",
            value
        )));
    }
    if value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid hexBinary value: {}", value)))
    }
}

fn validate_base64_binary(value: &str) -> Result<()> {
    BASE64_STANDARD
        .decode(value)
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid base64Binary value: {}", value)))
}

fn validate_any_uri(_value: &str) -> Result<()> {
    // Every string is an acceptable anyURI lexical form.
    Ok(())
}

fn validate_qname(value: &str) -> Result<()> {
    if names::is_valid_qname(value) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid QName: {}", value)))
    }
}

// String derived type validators

fn validate_normalized_string(value: &str) -> Result<()> {
    if value.contains(['\r', '\n', '\t']) {
        Err(Error::Value(
            "normalizedString cannot contain CR, LF, or TAB".to_string(),
        ))
    } else {
        Ok(())
    }
}

fn validate_token(value: &str) -> Result<()> {
    validate_normalized_string(value)?;
    if value.starts_with(' ') || value.ends_with(' ') {
        return Err(Error::Value(
            "token cannot have leading or trailing spaces".to_string(),
        ));
    }
    if value.contains("  ") {
        return Err(Error::Value(
            "token cannot have multiple consecutive spaces".to_string(),
        ));
    }
    Ok(())
}

static LANGUAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap());

fn validate_language(value: &str) -> Result<()> {
    if LANGUAGE_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid language tag: {}", value)))
    }
}

fn validate_name(value: &str) -> Result<()> {
    if names::is_valid_name(value) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid Name: {}", value)))
    }
}

fn validate_ncname(value: &str) -> Result<()> {
    if names::is_valid_ncname(value) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid NCName: {}", value)))
    }
}

fn validate_nmtoken(value: &str) -> Result<()> {
    if names::is_valid_nmtoken(value) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid NMTOKEN: {}", value)))
    }
}

fn validate_space_separated(value: &str, kind: &str, item: fn(&str) -> Result<()>) -> Result<()> {
    let items: Vec<&str> = value.split_whitespace().collect();
    if items.is_empty() {
        return Err(Error::Value(format!("{} cannot be empty", kind)));
    }
    for i in items {
        item(i)?;
    }
    Ok(())
}

fn validate_idrefs(value: &str) -> Result<()> {
    validate_space_separated(value, "IDREFS", validate_ncname)
}

fn validate_entities(value: &str) -> Result<()> {
    validate_space_separated(value, "ENTITIES", validate_ncname)
}

fn validate_nmtokens(value: &str) -> Result<()> {
    validate_space_separated(value, "NMTOKENS", validate_nmtoken)
}

// Numeric derived type validators

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

fn validate_integer(value: &str) -> Result<()> {
    if INTEGER_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::Value(format!("invalid integer value: {}", value)))
    }
}

/// Sign of an unbounded integer lexical form: -1, 0 or 1
fn integer_sign(value: &str) -> i8 {
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    if digits.bytes().all(|b| b == b'0') {
        0
    } else if negative {
        -1
    } else {
        1
    }
}

fn validate_non_positive_integer(value: &str) -> Result<()> {
    validate_integer(value)
        .map_err(|_| Error::Value(format!("invalid nonPositiveInteger value: {}", value)))?;
    if integer_sign(value) > 0 {
        return Err(Error::Value(format!(
            "nonPositiveInteger must be <= 0: {}",
            value
        )));
    }
    Ok(())
}

fn validate_negative_integer(value: &str) -> Result<()> {
    validate_integer(value)
        .map_err(|_| Error::Value(format!("invalid negativeInteger value: {}", value)))?;
    if integer_sign(value) >= 0 {
        return Err(Error::Value(format!(
            "negativeInteger must be < 0: {}",
            value
        )));
    }
    Ok(())
}

fn validate_non_negative_integer(value: &str) -> Result<()> {
    validate_integer(value)
        .map_err(|_| Error::Value(format!("invalid nonNegativeInteger value: {}", value)))?;
    if integer_sign(value) < 0 {
        return Err(Error::Value(format!(
            "nonNegativeInteger must be >= 0: {}",
            value
        )));
    }
    Ok(())
}

fn validate_positive_integer(value: &str) -> Result<()> {
    validate_integer(value)
        .map_err(|_| Error::Value(format!("invalid positiveInteger value: {}", value)))?;
    if integer_sign(value) <= 0 {
        return Err(Error::Value(format!(
            "positiveInteger must be > 0: {}",
            value
        )));
    }
    Ok(())
}

fn validate_long(value: &str) -> Result<()> {
    value
        .parse::<i64>()
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid long value: {}", value)))
}

fn validate_int(value: &str) -> Result<()> {
    value
        .parse::<i32>()
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid int value: {}", value)))
}

fn validate_short(value: &str) -> Result<()> {
    value
        .parse::<i16>()
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid short value: {}", value)))
}

fn validate_byte(value: &str) -> Result<()> {
    value
        .parse::<i8>()
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid byte value: {}", value)))
}

fn validate_unsigned_long(value: &str) -> Result<()> {
    value
        .parse::<u64>()
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid unsignedLong value: {}", value)))
}

fn validate_unsigned_int(value: &str) -> Result<()> {
    value
        .parse::<u32>()
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid unsignedInt value: {}", value)))
}

fn validate_unsigned_short(value: &str) -> Result<()> {
    value
        .parse::<u16>()
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid unsignedShort value: {}", value)))
}

fn validate_unsigned_byte(value: &str) -> Result<()> {
    value
        .parse::<u8>()
        .map(|_| ())
        .map_err(|_| Error::Value(format!("invalid unsignedByte value: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_all_names() {
        let names = [
            "string", "boolean", "decimal", "float", "double", "duration", "dateTime", "time",
            "date", "gYearMonth", "gYear", "gMonthDay", "gDay", "gMonth", "hexBinary",
            "base64Binary", "anyURI", "QName", "NOTATION", "normalizedString", "token",
            "language", "Name", "NCName", "ID", "IDREF", "IDREFS", "ENTITY", "ENTITIES",
            "NMTOKEN", "NMTOKENS", "integer", "nonPositiveInteger", "negativeInteger", "long",
            "int", "short", "byte", "nonNegativeInteger", "unsignedLong", "unsignedInt",
            "unsignedShort", "unsignedByte", "positiveInteger",
        ];
        for name in names {
            assert!(is_builtin_type(name), "missing builtin: {}", name);
        }
        assert_eq!(names.len(), 44);
    }

    #[test]
    fn test_prefix_stripped_on_lookup() {
        assert!(get_builtin_type("xs:string").is_some());
        assert!(get_builtin_type("xsd:int").is_some());
        assert!(get_builtin_type("xs:notAType").is_none());
    }

    #[test]
    fn test_boolean() {
        for ok in ["true", "false", "1", "0"] {
            assert!(validate_builtin("boolean", ok).is_ok());
        }
        assert!(validate_builtin("boolean", "TRUE").is_err());
        assert!(validate_builtin("boolean", "yes").is_err());
    }

    #[test]
    fn test_decimal_and_integer() {
        assert!(validate_builtin("decimal", "-1.23").is_ok());
        assert!(validate_builtin("decimal", "+100").is_ok());
        assert!(validate_builtin("decimal", "210.").is_ok());
        assert!(validate_builtin("decimal", ".5").is_ok());
        assert!(validate_builtin("decimal", "1.2.3").is_err());
        assert!(validate_builtin("decimal", "abc").is_err());

        assert!(validate_builtin("integer", "12345678901234567890123").is_ok());
        assert!(validate_builtin("integer", "1.0").is_err());
    }

    #[test]
    fn test_integer_sign_classes() {
        assert!(validate_builtin("nonPositiveInteger", "0").is_ok());
        assert!(validate_builtin("nonPositiveInteger", "-5").is_ok());
        assert!(validate_builtin("nonPositiveInteger", "5").is_err());

        assert!(validate_builtin("negativeInteger", "-1").is_ok());
        assert!(validate_builtin("negativeInteger", "0").is_err());
        assert!(validate_builtin("negativeInteger", "-0").is_err());

        assert!(validate_builtin("positiveInteger", "1").is_ok());
        assert!(validate_builtin("positiveInteger", "0").is_err());

        assert!(validate_builtin("nonNegativeInteger", "0").is_ok());
        assert!(validate_builtin("nonNegativeInteger", "-0").is_ok());
        assert!(validate_builtin("nonNegativeInteger", "-1").is_err());
    }

    #[test]
    fn test_bounded_integers() {
        assert!(validate_builtin("byte", "127").is_ok());
        assert!(validate_builtin("byte", "128").is_err());
        assert!(validate_builtin("short", "-32768").is_ok());
        assert!(validate_builtin("int", "2147483648").is_err());
        assert!(validate_builtin("unsignedByte", "255").is_ok());
        assert!(validate_builtin("unsignedByte", "-1").is_err());
    }

    #[test]
    fn test_float_special_values() {
        for ok in ["INF", "+INF", "-INF", "NaN", "1.5e10", "-0.5"] {
            assert!(validate_builtin("float", ok).is_ok(), "rejected {}", ok);
            assert!(validate_builtin("double", ok).is_ok(), "rejected {}", ok);
        }
        assert!(validate_builtin("float", "infinity").is_err());
    }

    #[test]
    fn test_date_time_types() {
        assert!(validate_builtin("dateTime", "2024-02-29T10:30:00").is_ok());
        assert!(validate_builtin("dateTime", "2024-02-29T10:30:00.5Z").is_ok());
        assert!(validate_builtin("dateTime", "2024-02-29T10:30:00+01:00").is_ok());
        assert!(validate_builtin("dateTime", "2024-13-01T00:00:00").is_err());
        assert!(validate_builtin("dateTime", "2023-02-29T00:00:00").is_err());
        assert!(validate_builtin("dateTime", "2024-02-29").is_err());

        assert!(validate_builtin("time", "23:59:59").is_ok());
        assert!(validate_builtin("time", "24:00:00").is_err());

        assert!(validate_builtin("date", "2024-01-31").is_ok());
        assert!(validate_builtin("date", "-0044-03-15").is_ok());
        assert!(validate_builtin("date", "2024-00-31").is_err());

        assert!(validate_builtin("gYearMonth", "2024-06").is_ok());
        assert!(validate_builtin("gYearMonth", "2024-13").is_err());
        assert!(validate_builtin("gDay", "---31Z").is_ok());
        assert!(validate_builtin("gMonth", "--02").is_ok());
        assert!(validate_builtin("gYear", "2024").is_ok());
    }

    #[test]
    fn test_date_day_of_month_bounds() {
        // Day must exist in the named month.
        assert!(validate_builtin("date", "2023-04-30").is_ok());
        assert!(validate_builtin("date", "2023-04-31").is_err());
        assert!(validate_builtin("date", "2024-02-31").is_err());

        // February follows the leap-year rules.
        assert!(validate_builtin("date", "2024-02-29").is_ok());
        assert!(validate_builtin("date", "2023-02-29").is_err());
        assert!(validate_builtin("date", "2000-02-29").is_ok());
        assert!(validate_builtin("date", "1900-02-28").is_ok());
        assert!(validate_builtin("date", "1900-02-29").is_err());

        // Years before 0001 only keep the lexical day range.
        assert!(validate_builtin("date", "-0044-02-30").is_ok());
        assert!(validate_builtin("date", "-0044-02-32").is_err());

        assert!(validate_builtin("dateTime", "2023-06-31T12:00:00").is_err());
        assert!(validate_builtin("dateTime", "2023-06-30T12:00:00").is_ok());
    }

    #[test]
    fn test_g_month_day_bounds() {
        assert!(validate_builtin("gMonthDay", "--12-25").is_ok());
        assert!(validate_builtin("gMonthDay", "--02-29").is_ok());
        assert!(validate_builtin("gMonthDay", "--02-30").is_err());
        assert!(validate_builtin("gMonthDay", "--04-31").is_err());
        assert!(validate_builtin("gMonthDay", "--01-31").is_ok());
    }

    #[test]
    fn test_duration() {
        assert!(validate_builtin("duration", "P1Y2M3DT10H30M").is_ok());
        assert!(validate_builtin("duration", "PT1H").is_ok());
        assert!(validate_builtin("duration", "-P1D").is_ok());
        assert!(validate_builtin("duration", "P").is_err());
        assert!(validate_builtin("duration", "-PT").is_err());
        assert!(validate_builtin("duration", "1Y").is_err());
    }

    #[test]
    fn test_binary_types() {
        assert!(validate_builtin("hexBinary", "0FB7").is_ok());
        assert!(validate_builtin("hexBinary", "0FB").is_err());
        assert!(validate_builtin("hexBinary", "0FBG").is_err());

        assert!(validate_builtin("base64Binary", "aGVsbG8=").is_ok());
        assert!(validate_builtin("base64Binary", "not base64!").is_err());
    }

    #[test]
    fn test_string_derived_types() {
        assert!(validate_builtin("normalizedString", "a b").is_ok());
        assert!(validate_builtin("normalizedString", "a\tb").is_err());

        assert!(validate_builtin("token", "a b").is_ok());
        assert!(validate_builtin("token", " a").is_err());
        assert!(validate_builtin("token", "a  b").is_err());

        assert!(validate_builtin("language", "en-US").is_ok());
        assert!(validate_builtin("language", "123").is_err());

        assert!(validate_builtin("NCName", "valid-name").is_ok());
        assert!(validate_builtin("NCName", "ns:name").is_err());

        assert!(validate_builtin("NMTOKENS", "one two three").is_ok());
        assert!(validate_builtin("NMTOKENS", "").is_err());
        assert!(validate_builtin("IDREFS", "ref1 ref2").is_ok());
    }

    #[test]
    fn test_qname_lexical() {
        assert!(validate_builtin("QName", "xs:element").is_ok());
        assert!(validate_builtin("QName", "element").is_ok());
        assert!(validate_builtin("QName", "a:b:c").is_err());
        assert!(validate_builtin("NOTATION", "n:tation").is_ok());
    }
}
