//! XSD constraining facets
//!
//! Facets constrain the lexical space of simple types. Validation runs in
//! two phases: whiteSpace normalization first (when that facet is present),
//! then every remaining facet predicate against the normalized value with
//! base-type-aware semantics.

use crate::error::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use super::builtins;

/// White space handling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Preserve all white space
    Preserve,
    /// Replace TAB, LF and CR with a space
    Replace,
    /// Replace, then trim and fold internal runs to single spaces
    Collapse,
}

impl WhiteSpace {
    /// Parse a `whiteSpace` facet value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "preserve" => Some(WhiteSpace::Preserve),
            "replace" => Some(WhiteSpace::Replace),
            "collapse" => Some(WhiteSpace::Collapse),
            _ => None,
        }
    }

    /// Normalize a string according to this mode
    pub fn normalize(&self, s: &str) -> String {
        match self {
            WhiteSpace::Preserve => s.to_string(),
            WhiteSpace::Replace => s.replace(['\t', '\n', '\r'], " "),
            WhiteSpace::Collapse => {
                let replaced = s.replace(['\t', '\n', '\r'], " ");
                replaced.split_whitespace().collect::<Vec<_>>().join(" ")
            }
        }
    }
}

/// A constraining facet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Facet {
    /// Regular expression over the full value
    Pattern(String),
    /// Closed set of allowed values; sibling `enumeration` elements collapse
    /// into one facet
    Enumeration(Vec<String>),
    /// Exact length
    Length(usize),
    /// Minimum length
    MinLength(usize),
    /// Maximum length
    MaxLength(usize),
    /// Inclusive lower bound (lexical form)
    MinInclusive(String),
    /// Inclusive upper bound (lexical form)
    MaxInclusive(String),
    /// Exclusive lower bound (lexical form)
    MinExclusive(String),
    /// Exclusive upper bound (lexical form)
    MaxExclusive(String),
    /// Maximum number of significant digits
    TotalDigits(u32),
    /// Maximum number of fraction digits
    FractionDigits(u32),
    /// White space normalization mode
    WhiteSpace(WhiteSpace),
}

impl Facet {
    /// Parse a facet element by local name and `value` attribute.
    /// Unrecognized names and unparseable values yield `None`.
    pub fn parse(name: &str, value: &str) -> Option<Facet> {
        match name {
            "pattern" => Some(Facet::Pattern(value.to_string())),
            "enumeration" => Some(Facet::Enumeration(vec![value.to_string()])),
            "length" => value.parse().ok().map(Facet::Length),
            "minLength" => value.parse().ok().map(Facet::MinLength),
            "maxLength" => value.parse().ok().map(Facet::MaxLength),
            "minInclusive" => Some(Facet::MinInclusive(value.to_string())),
            "maxInclusive" => Some(Facet::MaxInclusive(value.to_string())),
            "minExclusive" => Some(Facet::MinExclusive(value.to_string())),
            "maxExclusive" => Some(Facet::MaxExclusive(value.to_string())),
            "totalDigits" => value.parse().ok().map(Facet::TotalDigits),
            "fractionDigits" => value.parse().ok().map(Facet::FractionDigits),
            "whiteSpace" => WhiteSpace::parse(value).map(Facet::WhiteSpace),
            _ => None,
        }
    }

    /// The facet's XSD element name
    pub fn name(&self) -> &'static str {
        match self {
            Facet::Pattern(_) => "pattern",
            Facet::Enumeration(_) => "enumeration",
            Facet::Length(_) => "length",
            Facet::MinLength(_) => "minLength",
            Facet::MaxLength(_) => "maxLength",
            Facet::MinInclusive(_) => "minInclusive",
            Facet::MaxInclusive(_) => "maxInclusive",
            Facet::MinExclusive(_) => "minExclusive",
            Facet::MaxExclusive(_) => "maxExclusive",
            Facet::TotalDigits(_) => "totalDigits",
            Facet::FractionDigits(_) => "fractionDigits",
            Facet::WhiteSpace(_) => "whiteSpace",
        }
    }
}

/// A facet constraint violation
#[derive(Debug, Clone)]
pub struct FacetError {
    /// Name of the violated facet
    pub facet: &'static str,
    /// Description of the failure
    pub message: String,
    /// Allowed values, populated for enumeration failures
    pub allowed: Vec<String>,
}

impl FacetError {
    fn new(facet: &'static str, message: impl Into<String>) -> Self {
        Self {
            facet,
            message: message.into(),
            allowed: Vec::new(),
        }
    }
}

impl fmt::Display for FacetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} constraint violated: {}", self.facet, self.message)
    }
}

impl std::error::Error for FacetError {}

impl From<FacetError> for Error {
    fn from(err: FacetError) -> Self {
        Error::Value(err.to_string())
    }
}

/// How length facets count units, derived from the restriction base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    /// Characters (the default for string-like types)
    #[default]
    Characters,
    /// Items of a list value
    ListItems,
    /// Decoded octets of a hexBinary value
    HexOctets,
    /// Decoded octets of a base64Binary value
    Base64Octets,
}

impl LengthUnit {
    /// Pick the unit for a base type's local name
    pub fn for_base(base_local: Option<&str>) -> Self {
        match base_local {
            Some("hexBinary") => LengthUnit::HexOctets,
            Some("base64Binary") => LengthUnit::Base64Octets,
            _ => LengthUnit::Characters,
        }
    }

    fn measure(&self, value: &str) -> usize {
        match self {
            LengthUnit::Characters => value.chars().count(),
            LengthUnit::ListItems => value.split_whitespace().count(),
            LengthUnit::HexOctets => value.len() / 2,
            LengthUnit::Base64Octets => {
                let mut n = value.len();
                if value.ends_with("==") {
                    n -= 2;
                } else if value.ends_with('=') {
                    n -= 1;
                }
                n * 3 / 4
            }
        }
    }
}

/// Base-type context for facet evaluation
#[derive(Debug, Clone, Default)]
pub struct FacetContext {
    /// Local name of the restriction base, when known
    pub base_local: Option<String>,
    /// Unit for length facets
    pub length_unit: LengthUnit,
}

impl FacetContext {
    /// Context for a base type identified by local name
    pub fn for_base(base_local: Option<&str>) -> Self {
        Self {
            base_local: base_local.map(|s| s.to_string()),
            length_unit: LengthUnit::for_base(base_local),
        }
    }
}

/// Apply facets to a value: whiteSpace normalization first, then every
/// remaining predicate against the normalized value
pub fn validate_facets(
    value: &str,
    facets: &[Facet],
    ctx: &FacetContext,
) -> std::result::Result<(), FacetError> {
    let mut normalized = None;
    for facet in facets {
        if let Facet::WhiteSpace(mode) = facet {
            normalized = Some(mode.normalize(value));
            break;
        }
    }
    let value = normalized.as_deref().unwrap_or(value);

    for facet in facets {
        apply_facet(value, facet, ctx)?;
    }
    Ok(())
}

fn apply_facet(value: &str, facet: &Facet, ctx: &FacetContext) -> std::result::Result<(), FacetError> {
    match facet {
        Facet::WhiteSpace(_) => Ok(()),
        Facet::Pattern(pattern) => {
            let regex = compiled_pattern(pattern)
                .map_err(|e| FacetError::new("pattern", format!("invalid pattern: {}", e)))?;
            if regex.is_match(value) {
                Ok(())
            } else {
                Err(FacetError::new(
                    "pattern",
                    format!("value '{}' does not match pattern '{}'", value, pattern),
                ))
            }
        }
        Facet::Enumeration(values) => {
            if values.iter().any(|v| v == value) {
                Ok(())
            } else {
                let mut err = FacetError::new(
                    "enumeration",
                    format!("value '{}' is not in enumeration {:?}", value, values),
                );
                err.allowed = values.clone();
                Err(err)
            }
        }
        Facet::Length(expected) => {
            let length = ctx.length_unit.measure(value);
            if length == *expected {
                Ok(())
            } else {
                Err(FacetError::new(
                    "length",
                    format!("length must be exactly {}, got {}", expected, length),
                ))
            }
        }
        Facet::MinLength(min) => {
            let length = ctx.length_unit.measure(value);
            if length >= *min {
                Ok(())
            } else {
                Err(FacetError::new(
                    "minLength",
                    format!("length must be at least {}, got {}", min, length),
                ))
            }
        }
        Facet::MaxLength(max) => {
            let length = ctx.length_unit.measure(value);
            if length <= *max {
                Ok(())
            } else {
                Err(FacetError::new(
                    "maxLength",
                    format!("length must be at most {}, got {}", max, length),
                ))
            }
        }
        Facet::MinInclusive(bound) => bound_check(value, bound, ctx, "minInclusive", |c| c >= 0),
        Facet::MaxInclusive(bound) => bound_check(value, bound, ctx, "maxInclusive", |c| c <= 0),
        Facet::MinExclusive(bound) => bound_check(value, bound, ctx, "minExclusive", |c| c > 0),
        Facet::MaxExclusive(bound) => bound_check(value, bound, ctx, "maxExclusive", |c| c < 0),
        Facet::TotalDigits(max) => {
            let digits = value.trim_start_matches(['+', '-']).replacen('.', "", 1);
            let digits = digits.trim_start_matches('0');
            let count = if digits.is_empty() { 1 } else { digits.len() };
            if count <= *max as usize {
                Ok(())
            } else {
                Err(FacetError::new(
                    "totalDigits",
                    format!("total digits must be at most {}, got {}", max, count),
                ))
            }
        }
        Facet::FractionDigits(max) => {
            let fraction = value.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
            if fraction <= *max as usize {
                Ok(())
            } else {
                Err(FacetError::new(
                    "fractionDigits",
                    format!("fraction digits must be at most {}, got {}", max, fraction),
                ))
            }
        }
    }
}

fn bound_check(
    value: &str,
    bound: &str,
    ctx: &FacetContext,
    facet: &'static str,
    accept: fn(i32) -> bool,
) -> std::result::Result<(), FacetError> {
    let cmp = compare_values(value, bound, ctx.base_local.as_deref());
    if accept(cmp) {
        Ok(())
    } else {
        let relation = match facet {
            "minInclusive" => ">=",
            "maxInclusive" => "<=",
            "minExclusive" => ">",
            _ => "<",
        };
        Err(FacetError::new(
            facet,
            format!("value must be {} {}, got {}", relation, bound, value),
        ))
    }
}

/// Compare two lexical values in the context of a base type: decimal
/// comparison for numeric bases, lexicographic otherwise (including the
/// date/time family, whose lexical order matches value order for a fixed
/// timezone)
fn compare_values(v1: &str, v2: &str, base_local: Option<&str>) -> i32 {
    if let Some(base) = base_local {
        if builtins::is_numeric_type(base) {
            if let (Ok(d1), Ok(d2)) = (Decimal::from_str(v1), Decimal::from_str(v2)) {
                return match d1.cmp(&d2) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                };
            }
        }
    }
    match v1.cmp(v2) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

static PATTERN_CACHE: Lazy<Mutex<HashMap<String, Regex>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Compile an XSD pattern, translating shortcuts and anchoring both ends
fn compiled_pattern(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let mut cache = PATTERN_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }
    let translated = format!("^(?:{})$", convert_xsd_regex(pattern));
    let regex = Regex::new(&translated)?;
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Translate XSD regex shortcuts to host-regex character classes
fn convert_xsd_regex(pattern: &str) -> String {
    pattern
        .replace(r"\i", "[_:A-Za-z]")
        .replace(r"\c", "[_:A-Za-z0-9.-]")
        .replace(r"\d", "[0-9]")
        .replace(r"\D", "[^0-9]")
        .replace(r"\s", r"[ \t\n\r]")
        .replace(r"\S", r"[^ \t\n\r]")
        .replace(r"\w", "[A-Za-z0-9_]")
        .replace(r"\W", "[^A-Za-z0-9_]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FacetContext {
        FacetContext::default()
    }

    #[test]
    fn test_whitespace_parse() {
        assert_eq!(WhiteSpace::parse("preserve"), Some(WhiteSpace::Preserve));
        assert_eq!(WhiteSpace::parse("replace"), Some(WhiteSpace::Replace));
        assert_eq!(WhiteSpace::parse("collapse"), Some(WhiteSpace::Collapse));
        assert_eq!(WhiteSpace::parse("fold"), None);
    }

    #[test]
    fn test_whitespace_normalize() {
        let text = "  hello\t\nworld  ";
        assert_eq!(WhiteSpace::Preserve.normalize(text), text);
        assert_eq!(WhiteSpace::Replace.normalize(text), "  hello  world  ");
        assert_eq!(WhiteSpace::Collapse.normalize(text), "hello world");
    }

    #[test]
    fn test_whitespace_normalize_idempotent() {
        let text = " a \t b\nc ";
        let collapsed = WhiteSpace::Collapse.normalize(text);
        assert_eq!(WhiteSpace::Collapse.normalize(&collapsed), collapsed);
        let replaced = WhiteSpace::Replace.normalize(text);
        assert_eq!(WhiteSpace::Replace.normalize(&replaced), replaced);
    }

    #[test]
    fn test_facet_parse() {
        assert_eq!(Facet::parse("length", "5"), Some(Facet::Length(5)));
        assert_eq!(Facet::parse("length", "five"), None);
        assert_eq!(
            Facet::parse("whiteSpace", "collapse"),
            Some(Facet::WhiteSpace(WhiteSpace::Collapse))
        );
        assert_eq!(Facet::parse("assertion", "true()"), None);
    }

    #[test]
    fn test_length_facets() {
        let facets = [Facet::MinLength(2), Facet::MaxLength(4)];
        assert!(validate_facets("ab", &facets, &ctx()).is_ok());
        assert!(validate_facets("abcd", &facets, &ctx()).is_ok());
        assert!(validate_facets("a", &facets, &ctx()).is_err());
        assert!(validate_facets("abcde", &facets, &ctx()).is_err());
    }

    #[test]
    fn test_length_units() {
        let facets = [Facet::Length(2)];

        let hex = FacetContext::for_base(Some("hexBinary"));
        assert!(validate_facets("0FB7", &facets, &hex).is_ok());
        assert!(validate_facets("0F", &facets, &hex).is_err());

        let mut list = FacetContext::default();
        list.length_unit = LengthUnit::ListItems;
        assert!(validate_facets("a b", &facets, &list).is_ok());
        assert!(validate_facets("a b c", &facets, &list).is_err());
    }

    #[test]
    fn test_pattern_is_anchored() {
        let facets = [Facet::Pattern(r"\d{3}".to_string())];
        assert!(validate_facets("123", &facets, &ctx()).is_ok());
        assert!(validate_facets("1234", &facets, &ctx()).is_err());
        assert!(validate_facets("x123", &facets, &ctx()).is_err());
    }

    #[test]
    fn test_pattern_alternation_anchoring() {
        let facets = [Facet::Pattern("yes|no".to_string())];
        assert!(validate_facets("yes", &facets, &ctx()).is_ok());
        assert!(validate_facets("no", &facets, &ctx()).is_ok());
        assert!(validate_facets("yesno", &facets, &ctx()).is_err());
    }

    #[test]
    fn test_pattern_shortcuts() {
        let facets = [Facet::Pattern(r"\i\c*".to_string())];
        assert!(validate_facets("element", &facets, &ctx()).is_ok());
        assert!(validate_facets("_name", &facets, &ctx()).is_ok());
        assert!(validate_facets("1bad", &facets, &ctx()).is_err());
    }

    #[test]
    fn test_enumeration_carries_allowed_set() {
        let facets = [Facet::Enumeration(vec![
            "red".to_string(),
            "green".to_string(),
        ])];
        assert!(validate_facets("red", &facets, &ctx()).is_ok());
        let err = validate_facets("blue", &facets, &ctx()).unwrap_err();
        assert_eq!(err.facet, "enumeration");
        assert_eq!(err.allowed, vec!["red", "green"]);
    }

    #[test]
    fn test_numeric_bounds_use_decimal_compare() {
        let numeric = FacetContext::for_base(Some("integer"));
        let facets = [
            Facet::MinInclusive("9".to_string()),
            Facet::MaxInclusive("20".to_string()),
        ];
        // Lexicographically "10" < "9"; numerically it is within bounds.
        assert!(validate_facets("10", &facets, &numeric).is_ok());
        assert!(validate_facets("8", &facets, &numeric).is_err());
        assert!(validate_facets("21", &facets, &numeric).is_err());
    }

    #[test]
    fn test_exclusive_bounds() {
        let numeric = FacetContext::for_base(Some("decimal"));
        let facets = [
            Facet::MinExclusive("0".to_string()),
            Facet::MaxExclusive("1".to_string()),
        ];
        assert!(validate_facets("0.5", &facets, &numeric).is_ok());
        assert!(validate_facets("0", &facets, &numeric).is_err());
        assert!(validate_facets("1", &facets, &numeric).is_err());
    }

    #[test]
    fn test_string_bounds_fall_back_to_lexicographic() {
        let facets = [Facet::MinInclusive("b".to_string())];
        assert!(validate_facets("c", &facets, &ctx()).is_ok());
        assert!(validate_facets("a", &facets, &ctx()).is_err());
    }

    #[test]
    fn test_total_digits() {
        let facets = [Facet::TotalDigits(3)];
        assert!(validate_facets("123", &facets, &ctx()).is_ok());
        assert!(validate_facets("-12.3", &facets, &ctx()).is_ok());
        assert!(validate_facets("0007", &facets, &ctx()).is_ok());
        assert!(validate_facets("1234", &facets, &ctx()).is_err());
        assert!(validate_facets("0", &facets, &ctx()).is_ok());
    }

    #[test]
    fn test_fraction_digits() {
        let facets = [Facet::FractionDigits(2)];
        assert!(validate_facets("1.23", &facets, &ctx()).is_ok());
        assert!(validate_facets("1", &facets, &ctx()).is_ok());
        assert!(validate_facets("1.234", &facets, &ctx()).is_err());
    }

    #[test]
    fn test_whitespace_applied_before_other_facets() {
        let facets = [
            Facet::WhiteSpace(WhiteSpace::Collapse),
            Facet::Length(5),
        ];
        assert!(validate_facets("  hello  ", &facets, &ctx()).is_ok());
    }

}
