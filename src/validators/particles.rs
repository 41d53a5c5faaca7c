//! Occurrence bounds for particles
//!
//! Every particle of a content model carries `(minOccurs, maxOccurs)`.
//! `max = None` encodes `maxOccurs="unbounded"`.

/// Occurrence bounds for a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self {
            min: 1,
            max: Some(1),
        }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self {
            min: 0,
            max: Some(1),
        }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// Empty bounds (0, 0); on a group reference this means "unspecified,
    /// keep the referenced group's own bounds"
    pub fn empty() -> Self {
        Self {
            min: 0,
            max: Some(0),
        }
    }

    /// Check if this particle may be absent
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if both bounds are zero
    pub fn is_empty(&self) -> bool {
        self.min == 0 && self.max == Some(0)
    }

    /// Check if maxOccurs is 1
    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }

    /// Check if a count is below the minimum
    pub fn is_missing(&self, count: u32) -> bool {
        count < self.min
    }

    /// Check if a count is at or above the maximum
    pub fn is_over(&self, count: u32) -> bool {
        match self.max {
            Some(max) => count >= max,
            None => false,
        }
    }

    /// Check if a count exceeds the maximum
    pub fn is_exceeded(&self, count: u32) -> bool {
        match self.max {
            Some(max) => count > max,
            None => false,
        }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

/// Parse `minOccurs`/`maxOccurs` attribute values.
///
/// Defaults are (1, 1); the literal `unbounded` maps to an open upper bound;
/// unparseable values fall back to the default rather than failing the
/// compile.
pub fn parse_occurs(min_occurs: Option<&str>, max_occurs: Option<&str>) -> Occurs {
    let mut occurs = Occurs::once();

    if let Some(min) = min_occurs {
        if let Ok(value) = min.parse::<u32>() {
            occurs.min = value;
        }
    }

    if let Some(max) = max_occurs {
        if max == "unbounded" {
            occurs.max = None;
        } else if let Ok(value) = max.parse::<u32>() {
            occurs.max = Some(value);
        }
    }

    occurs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurs_presets() {
        assert_eq!(Occurs::once(), Occurs::new(1, Some(1)));
        assert_eq!(Occurs::optional(), Occurs::new(0, Some(1)));
        assert_eq!(Occurs::zero_or_more(), Occurs::new(0, None));
        assert_eq!(Occurs::empty(), Occurs::new(0, Some(0)));
    }

    #[test]
    fn test_occurs_predicates() {
        let optional = Occurs::optional();
        assert!(optional.is_emptiable());
        assert!(!optional.is_empty());
        assert!(optional.is_single());

        let unbounded = Occurs::zero_or_more();
        assert!(unbounded.is_emptiable());
        assert!(!unbounded.is_single());
        assert!(!unbounded.is_over(1_000_000));
    }

    #[test]
    fn test_occurs_counting() {
        let occurs = Occurs::new(2, Some(5));
        assert!(occurs.is_missing(1));
        assert!(!occurs.is_missing(2));
        assert!(occurs.is_over(5));
        assert!(!occurs.is_over(4));
        assert!(occurs.is_exceeded(6));
        assert!(!occurs.is_exceeded(5));
    }

    #[test]
    fn test_parse_occurs_defaults() {
        assert_eq!(parse_occurs(None, None), Occurs::once());
    }

    #[test]
    fn test_parse_occurs_values() {
        assert_eq!(parse_occurs(Some("0"), Some("5")), Occurs::new(0, Some(5)));
        assert_eq!(
            parse_occurs(Some("1"), Some("unbounded")),
            Occurs::new(1, None)
        );
    }

    #[test]
    fn test_parse_occurs_tolerates_garbage() {
        // Unparseable values fall back to the defaults.
        assert_eq!(parse_occurs(Some("abc"), Some("xyz")), Occurs::once());
    }
}
