//! Date layouts found on identity documents and the sentinel used when a
//! date cannot be read.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;

const MONTH_NAME: &str =
    "(?i:january|february|march|april|may|june|july|august|september|october|november|december)";
const MONTH_ABBREVIATION: &str = "(?i:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)";

/// A textual date layout, printed in document notation (`dd.MM.yyyy`) and
/// backed by the equivalent chrono format string.
///
/// chrono accepts short numbers, signed years and flexible whitespace, so the
/// raw text is first checked against the layout's exact shape: two digits for
/// `dd`, `MM` and `mm`, four for `yyyy`, a full month name for `MMMM`, a
/// three-letter one for `MMM`, and every other character literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pub layout: &'static str,
    pattern: &'static str,
}

impl DateFormat {
    const fn new(layout: &'static str, pattern: &'static str) -> Self {
        Self { layout, pattern }
    }

    /// Parse `raw` against this layout. The whole string must have the
    /// layout's shape and name a real date.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        if !self.matches_shape(raw) {
            return None;
        }
        NaiveDate::parse_from_str(raw, self.pattern).ok()
    }

    fn matches_shape(&self, raw: &str) -> bool {
        SHAPES.get(self.layout).is_some_and(|shape| shape.is_match(raw))
    }
}

/// Candidate layouts for a date of birth, tried in order.
///
/// Month-first comes before day-first, so `03/04/1990` reads as March 4.
/// The trailing `dd/mm/yyyy` catches day-first slashed dates that the
/// month-first layout rejects.
pub const DATE_OF_BIRTH_FORMATS: [DateFormat; 7] = [
    DateFormat::new("MM/dd/yyyy", "%m/%d/%Y"),
    DateFormat::new("dd-MM-yyyy", "%d-%m-%Y"),
    DateFormat::new("yyyy-MM-dd", "%Y-%m-%d"),
    DateFormat::new("dd MMMM yyyy", "%d %B %Y"),
    DateFormat::new("dd MMM yyyy", "%d %b %Y"),
    DateFormat::new("dd.MM.yyyy", "%d.%m.%Y"),
    DateFormat::new("dd/mm/yyyy", "%d/%m/%Y"),
];

/// Layouts accepted when reading dates back from serialized guest JSON.
pub const SERIALIZED_DATE_FORMATS: [DateFormat; 2] = [
    DateFormat::new("MM/dd/yyyy", "%m/%d/%Y"),
    DateFormat::new("yyyy-MM-dd", "%Y-%m-%d"),
];

/// Anchored shape regex for every known layout, keyed by layout.
static SHAPES: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    DATE_OF_BIRTH_FORMATS
        .iter()
        .chain(SERIALIZED_DATE_FORMATS.iter())
        .filter_map(|format| {
            Regex::new(&shape_pattern(format.layout))
                .ok()
                .map(|shape| (format.layout, shape))
        })
        .collect()
});

fn shape_pattern(layout: &str) -> String {
    let mut pattern = String::from("^");
    let mut rest = layout;

    while let Some(c) = rest.chars().next() {
        let run = rest.chars().take_while(|&next| next == c).count();
        let token = &rest[..run * c.len_utf8()];

        match token {
            "yyyy" => pattern.push_str("[0-9]{4}"),
            "MMMM" => pattern.push_str(MONTH_NAME),
            "MMM" => pattern.push_str(MONTH_ABBREVIATION),
            "MM" | "dd" | "mm" => pattern.push_str("[0-9]{2}"),
            literal => pattern.push_str(&regex::escape(literal)),
        }

        rest = &rest[token.len()..];
    }

    pattern.push('$');
    pattern
}

/// Layout used when writing a date of birth.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Returns the first format in `formats` that parses `raw`, with its date.
#[must_use]
pub fn first_match(raw: &str, formats: &[DateFormat]) -> Option<(NaiveDate, DateFormat)> {
    formats
        .iter()
        .find_map(|format| format.parse(raw).map(|date| (date, *format)))
}

#[must_use]
pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    first_match(raw, &DATE_OF_BIRTH_FORMATS).map(|(date, _)| date)
}

/// The "unknown" date: 0001-01-01.
#[must_use]
pub fn unknown_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Midnight UTC on [`unknown_date`].
#[must_use]
pub fn unknown_instant() -> DateTime<Utc> {
    unknown_date().and_time(NaiveTime::MIN).and_utc()
}

#[must_use]
pub fn is_unknown(date: NaiveDate) -> bool {
    date == unknown_date()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_first_wins_for_ambiguous_dates() {
        let (date, format) = first_match("03/04/1990", &DATE_OF_BIRTH_FORMATS).unwrap();

        assert_eq!(date, ymd(1990, 3, 4));
        assert_eq!(format.layout, "MM/dd/yyyy");
    }

    #[test]
    fn test_each_layout_is_reachable() {
        let cases = [
            ("12/25/1985", "MM/dd/yyyy"),
            ("25-12-1985", "dd-MM-yyyy"),
            ("1985-12-25", "yyyy-MM-dd"),
            ("25 December 1985", "dd MMMM yyyy"),
            ("25 Dec 1985", "dd MMM yyyy"),
            ("25.12.1985", "dd.MM.yyyy"),
            ("25/12/1985", "dd/mm/yyyy"),
        ];

        for (raw, layout) in cases {
            let (date, format) = first_match(raw, &DATE_OF_BIRTH_FORMATS)
                .unwrap_or_else(|| panic!("{raw} should parse"));
            assert_eq!(date, ymd(1985, 12, 25), "{raw}");
            assert_eq!(format.layout, layout, "{raw}");
        }
    }

    #[test]
    fn test_abbreviated_month_name() {
        assert_eq!(parse_date_of_birth("07 Jun 2001"), Some(ymd(2001, 6, 7)));
    }

    #[test]
    fn test_unparseable_dates() {
        assert_eq!(parse_date_of_birth("not a date"), None);
        assert_eq!(parse_date_of_birth(""), None);
        assert_eq!(parse_date_of_birth("31/31/1990"), None);
        assert_eq!(parse_date_of_birth("1990/12/25"), None);
    }

    #[test]
    fn test_loose_shapes_are_rejected() {
        for raw in [
            "7/4/1980",
            "+1985-12-25",
            " 12/25/1985",
            "12/25/1985 ",
            "1/1/1",
            "25December1985",
            "25  December 1985",
            "5.3.1972",
            "25 Decem 1985",
        ] {
            assert_eq!(parse_date_of_birth(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn test_month_names_ignore_case() {
        assert_eq!(parse_date_of_birth("04 JULY 1980"), Some(ymd(1980, 7, 4)));
        assert_eq!(parse_date_of_birth("04 jul 1980"), Some(ymd(1980, 7, 4)));
    }

    #[test]
    fn test_every_layout_has_a_shape() {
        for format in DATE_OF_BIRTH_FORMATS.iter().chain(SERIALIZED_DATE_FORMATS.iter()) {
            assert!(SHAPES.contains_key(format.layout), "{}", format.layout);
        }
        assert_eq!(shape_pattern("dd.MM.yyyy"), r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}$");
    }

    #[test]
    fn test_trailing_text_is_rejected() {
        assert_eq!(parse_date_of_birth("1985-12-25 (DOB)"), None);
    }

    #[test]
    fn test_unknown_date() {
        assert_eq!(unknown_date(), ymd(1, 1, 1));
        assert!(is_unknown(unknown_date()));
        assert_eq!(unknown_instant().date_naive(), unknown_date());
    }
}
