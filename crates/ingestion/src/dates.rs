//! Mixed-format date parsing.
//!
//! Each date string is resolved independently: RFC 3339 first, then every
//! configured format in order. Formats carrying a time of day are reduced to
//! their calendar date.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use cryptostat_core::config::IngestConfig;
use cryptostat_core::{Error, Result};

/// Parser accepting several date text formats within one input.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<String>,
}

impl DateParser {
    /// Create a parser from the ingest configuration.
    ///
    /// Numeric formats that lead with month and day are also tried with the
    /// two swapped. `day_first` decides which reading comes first, so an
    /// ambiguous date follows the preference while an impossible reading
    /// (month 25) falls through to the other one.
    pub fn new(config: &IngestConfig) -> Self {
        let mut formats: Vec<String> = Vec::with_capacity(config.date_formats.len() * 2);
        for fmt in &config.date_formats {
            let candidates = match swap_day_month(fmt) {
                Some((month_first, day_first)) if config.day_first => vec![day_first, month_first],
                Some((month_first, day_first)) => vec![month_first, day_first],
                None => vec![fmt.clone()],
            };
            for candidate in candidates {
                if !formats.contains(&candidate) {
                    formats.push(candidate);
                }
            }
        }
        Self { formats }
    }

    /// Formats tried after RFC 3339, in order.
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Parse a date string, failing with `DateParse` if no format matches.
    pub fn parse(&self, text: &str) -> Result<NaiveDate> {
        let text = text.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.date_naive());
        }

        for fmt in &self.formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Ok(dt.date());
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
                return Ok(date);
            }
        }

        Err(Error::date_parse(format!(
            "'{}' matches none of the {} accepted formats",
            text,
            self.formats.len() + 1
        )))
    }
}

/// Month-first and day-first variants of a format leading with "%m?%d" or
/// "%d?%m", where `?` is `/`, `-` or `.`.
fn swap_day_month(fmt: &str) -> Option<(String, String)> {
    for sep in ['/', '-', '.'] {
        let md = format!("%m{}%d", sep);
        let dm = format!("%d{}%m", sep);
        if let Some(rest) = fmt.strip_prefix(&md) {
            return Some((fmt.to_string(), format!("{}{}", dm, rest)));
        }
        if let Some(rest) = fmt.strip_prefix(&dm) {
            return Some((format!("{}{}", md, rest), fmt.to_string()));
        }
    }
    None
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(&IngestConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mixed_formats() {
        let parser = DateParser::default();
        assert_eq!(parser.parse("2024-05-01T00:00:00.000Z").unwrap(), ymd(2024, 5, 1));
        assert_eq!(parser.parse("2024-05-02T23:59:59.999Z").unwrap(), ymd(2024, 5, 2));
        assert_eq!(parser.parse("2024-05-03 12:30:00").unwrap(), ymd(2024, 5, 3));
        assert_eq!(parser.parse("2024-05-04").unwrap(), ymd(2024, 5, 4));
        assert_eq!(parser.parse("05/05/2024").unwrap(), ymd(2024, 5, 5));
        assert_eq!(parser.parse("May 6, 2024").unwrap(), ymd(2024, 5, 6));
        assert_eq!(parser.parse(" 2024/05/07 ").unwrap(), ymd(2024, 5, 7));
    }

    #[test]
    fn test_offset_keeps_local_date() {
        let parser = DateParser::default();
        assert_eq!(
            parser.parse("2024-05-01T23:00:00-05:00").unwrap(),
            ymd(2024, 5, 1)
        );
    }

    #[test]
    fn test_month_first_by_default() {
        let parser = DateParser::default();
        assert_eq!(parser.parse("03/04/2024").unwrap(), ymd(2024, 3, 4));
    }

    #[test]
    fn test_day_first() {
        let config = IngestConfig {
            day_first: true,
            ..IngestConfig::default()
        };
        let parser = DateParser::new(&config);
        assert_eq!(parser.parse("03/04/2024").unwrap(), ymd(2024, 4, 3));
        assert_eq!(parser.parse("25-12-2023").unwrap(), ymd(2023, 12, 25));
        assert_eq!(parser.parse("12/25/2023").unwrap(), ymd(2023, 12, 25));
    }

    #[test]
    fn test_both_orders_in_one_input() {
        let rows = ["12/25/2023", "25/12/2023", "12-26-2023", "27-12-2023", "28.12.2023"];

        let parser = DateParser::default();
        let parsed: Vec<NaiveDate> = rows.iter().map(|r| parser.parse(r).unwrap()).collect();
        assert_eq!(
            parsed,
            vec![
                ymd(2023, 12, 25),
                ymd(2023, 12, 25),
                ymd(2023, 12, 26),
                ymd(2023, 12, 27),
                ymd(2023, 12, 28),
            ]
        );

        let day_first = DateParser::new(&IngestConfig {
            day_first: true,
            ..IngestConfig::default()
        });
        for (row, expected) in rows.iter().zip(&parsed) {
            assert_eq!(day_first.parse(row).unwrap(), *expected);
        }
    }

    #[test]
    fn test_swapped_formats_are_added_once() {
        let parser = DateParser::default();
        let formats = parser.formats();
        let month_first = formats.iter().position(|f| f == "%m/%d/%Y").unwrap();
        let day_first = formats.iter().position(|f| f == "%d/%m/%Y").unwrap();
        assert!(month_first < day_first);
        assert_eq!(formats.iter().filter(|f| *f == "%d/%m/%Y").count(), 1);
        assert!(formats.contains(&"%Y-%m-%d".to_string()));
        assert!(!formats.contains(&"%Y-%d-%m".to_string()));
    }

    #[test]
    fn test_dotted_and_comma_less_dates() {
        let parser = DateParser::default();
        assert_eq!(parser.parse("25.12.2023").unwrap(), ymd(2023, 12, 25));
        assert_eq!(parser.parse("Jan 5 2024").unwrap(), ymd(2024, 1, 5));
        assert_eq!(parser.parse("January 5 2024").unwrap(), ymd(2024, 1, 5));
    }

    #[test]
    fn test_unparseable() {
        let parser = DateParser::default();
        assert!(matches!(parser.parse("yesterday"), Err(Error::DateParse(_))));
        assert!(matches!(parser.parse("2024-13-45"), Err(Error::DateParse(_))));
    }
}
