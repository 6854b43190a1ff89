//! Localized month names.
//!
//! The preferred locale is used when known, otherwise the fallback, otherwise
//! POSIX (English) names. Resolution never fails.

use chrono::{Datelike, Locale, NaiveDate, NaiveTime, TimeZone, Utc};
use cryptostat_core::config::LocaleConfig;
use tracing::warn;

/// The twelve full month names of one locale.
#[derive(Debug, Clone)]
pub struct MonthNames {
    locale: Locale,
    names: Vec<String>,
}

impl MonthNames {
    /// Resolve month names for the configured locale pair.
    pub fn resolve(config: &LocaleConfig) -> Self {
        if let Some(locale) = parse_locale(&config.preferred) {
            return Self::for_locale(locale);
        }

        match parse_locale(&config.fallback) {
            Some(locale) => {
                warn!(
                    preferred = %config.preferred,
                    fallback = %config.fallback,
                    "Preferred locale unavailable, using fallback"
                );
                Self::for_locale(locale)
            }
            None => {
                warn!(
                    preferred = %config.preferred,
                    fallback = %config.fallback,
                    "No configured locale available, using POSIX month names"
                );
                Self::for_locale(Locale::POSIX)
            }
        }
    }

    /// Month names of a specific locale.
    pub fn for_locale(locale: Locale) -> Self {
        let names = (1..=12)
            .filter_map(|month| NaiveDate::from_ymd_opt(2000, month, 1))
            .map(|date| {
                Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
                    .format_localized("%B", locale)
                    .to_string()
            })
            .collect();
        Self { locale, names }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Full month name of the given date.
    pub fn name_of(&self, date: NaiveDate) -> &str {
        &self.names[date.month0() as usize]
    }

    /// All twelve names, January first.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for MonthNames {
    fn default() -> Self {
        Self::resolve(&LocaleConfig::default())
    }
}

/// Parse a POSIX-style locale name, ignoring any encoding suffix ("es_ES.UTF-8").
fn parse_locale(name: &str) -> Option<Locale> {
    let base = name.split(['.', '@']).next().unwrap_or(name).trim();
    if base.is_empty() {
        return None;
    }
    Locale::try_from(base).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, 15).unwrap()
    }

    #[test]
    fn test_preferred_locale() {
        let names = MonthNames::resolve(&LocaleConfig::default());
        assert_eq!(names.names().len(), 12);
        assert_eq!(names.name_of(date(1)), "enero");
        assert_eq!(names.name_of(date(12)), "diciembre");
    }

    #[test]
    fn test_encoding_suffix_is_ignored() {
        let config = LocaleConfig {
            preferred: "es_ES.UTF-8".to_string(),
            fallback: "en_US".to_string(),
        };
        assert_eq!(MonthNames::resolve(&config).name_of(date(5)), "mayo");
    }

    #[test]
    fn test_fallback_locale() {
        let config = LocaleConfig {
            preferred: "xx_XX".to_string(),
            fallback: "en_US".to_string(),
        };
        let names = MonthNames::resolve(&config);
        assert_eq!(names.name_of(date(3)), "March");
    }

    #[test]
    fn test_posix_when_nothing_resolves() {
        let config = LocaleConfig {
            preferred: "".to_string(),
            fallback: "nope".to_string(),
        };
        let names = MonthNames::resolve(&config);
        assert_eq!(names.locale(), Locale::POSIX);
        assert_eq!(names.name_of(date(7)), "July");
    }
}
