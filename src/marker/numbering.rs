//! Marker identifiers: `pgepubid` followed by a decimal or Roman suffix.

use crate::error::{Error, Result};

/// Prefix shared by every page marker id.
pub const MARKER_PREFIX: &str = "pgepubid";

/// Literal segment between the prefix and a Roman numeral.
const ROMAN_SEGMENT: &str = "000";

/// Width of zero-padded decimal suffixes.
const DECIMAL_WIDTH: usize = 5;

const ROMAN_NUMERALS: [(u64, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Roman suffixes accepted on input, i..xv.
const ROMAN_TABLE: [&str; 15] = [
    "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "xi", "xii", "xiii", "xiv", "xv",
];

/// How a file's markers are numbered, fixed by its first marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingScheme {
    /// `pgepubid00042`
    Decimal,
    /// `pgepubid000xii`, used for front matter.
    Roman,
}

impl NumberingScheme {
    /// Split a marker id into its scheme and numeric value.
    ///
    /// The prefix is optional so bare suffixes (`"00042"`, `"xii"`) parse too.
    pub fn parse(id: &str) -> Result<(NumberingScheme, u32)> {
        let suffix = id.strip_prefix(MARKER_PREFIX).unwrap_or(id);

        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return suffix
                .parse()
                .map(|value| (NumberingScheme::Decimal, value))
                .map_err(|_| Error::UnparsableNumeral(suffix.to_string()));
        }

        let numeral = suffix.strip_prefix(ROMAN_SEGMENT).unwrap_or(suffix);
        roman_to_int(numeral)
            .map(|value| (NumberingScheme::Roman, value))
            .ok_or_else(|| Error::UnparsableNumeral(suffix.to_string()))
    }

    /// Render a full marker id for `value`.
    pub fn format(self, value: u64) -> String {
        match self {
            NumberingScheme::Decimal => {
                format!("{MARKER_PREFIX}{value:0width$}", width = DECIMAL_WIDTH)
            }
            NumberingScheme::Roman => {
                format!("{MARKER_PREFIX}{ROMAN_SEGMENT}{}", int_to_roman(value))
            }
        }
    }
}

/// Lowercase Roman numeral by the standard subtractive algorithm.
pub fn int_to_roman(mut n: u64) -> String {
    let mut result = String::new();
    for (value, numeral) in ROMAN_NUMERALS {
        while n >= value {
            result.push_str(numeral);
            n -= value;
        }
    }
    result
}

/// Inverse of [`int_to_roman`], limited to 1..=15. Case-insensitive.
pub fn roman_to_int(s: &str) -> Option<u32> {
    let s = s.to_ascii_lowercase();
    ROMAN_TABLE
        .iter()
        .position(|&numeral| numeral == s)
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(
            NumberingScheme::parse("pgepubid00042").unwrap(),
            (NumberingScheme::Decimal, 42)
        );
        assert_eq!(
            NumberingScheme::parse("pgepubid123456").unwrap(),
            (NumberingScheme::Decimal, 123456)
        );
    }

    #[test]
    fn test_parse_roman() {
        assert_eq!(
            NumberingScheme::parse("pgepubid000xii").unwrap(),
            (NumberingScheme::Roman, 12)
        );
        assert_eq!(
            NumberingScheme::parse("pgepubidIV").unwrap(),
            (NumberingScheme::Roman, 4)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_suffixes() {
        for id in ["pgepubid000xvi", "pgepubidabc", "pgepubid", "pgepubid99999999999", "pgepubid12a"] {
            assert!(
                matches!(NumberingScheme::parse(id), Err(Error::UnparsableNumeral(_))),
                "{id} should not parse"
            );
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(NumberingScheme::Decimal.format(43), "pgepubid00043");
        assert_eq!(NumberingScheme::Decimal.format(123456), "pgepubid123456");
        assert_eq!(NumberingScheme::Roman.format(14), "pgepubid000xiv");
        assert_eq!(NumberingScheme::Roman.format(1994), "pgepubid000mcmxciv");
    }

    #[test]
    fn test_roman_table_matches_algorithm() {
        for value in 1..=15u32 {
            let numeral = int_to_roman(value.into());
            assert_eq!(roman_to_int(&numeral), Some(value));
            let id = NumberingScheme::Roman.format(value.into());
            assert_eq!(
                NumberingScheme::parse(&id).unwrap(),
                (NumberingScheme::Roman, value)
            );
        }
        assert_eq!(roman_to_int("xvi"), None);
    }
}
