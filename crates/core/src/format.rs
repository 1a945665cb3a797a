//! Viewer-locale formatting for money and dates.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate};
use num_format::{Locale as NumLocale, ToFormattedString};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const NBSP: char = '\u{a0}';

/// Viewer locales the storefront renders for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "fr-FR")]
    FrFr,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "en-us" | "en" => Ok(Self::EnUs),
            "en-gb" => Ok(Self::EnGb),
            "de-de" | "de" => Ok(Self::DeDe),
            "fr-fr" | "fr" => Ok(Self::FrFr),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Locale {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::EnGb => "en-GB",
            Self::DeDe => "de-DE",
            Self::FrFr => "fr-FR",
        }
    }

    fn numbers(self) -> NumLocale {
        match self {
            Self::EnUs | Self::EnGb => NumLocale::en,
            Self::DeDe => NumLocale::de,
            Self::FrFr => NumLocale::fr,
        }
    }

    fn symbol_first(self) -> bool {
        matches!(self, Self::EnUs | Self::EnGb)
    }
}

struct Currency {
    code: &'static str,
    symbol: &'static str,
    minor_units: u32,
}

const CURRENCIES: &[Currency] = &[
    Currency { code: "USD", symbol: "$", minor_units: 2 },
    Currency { code: "EUR", symbol: "€", minor_units: 2 },
    Currency { code: "GBP", symbol: "£", minor_units: 2 },
    Currency { code: "CAD", symbol: "CA$", minor_units: 2 },
    Currency { code: "AUD", symbol: "A$", minor_units: 2 },
    Currency { code: "CHF", symbol: "CHF", minor_units: 2 },
    Currency { code: "INR", symbol: "₹", minor_units: 2 },
    Currency { code: "CNY", symbol: "CN¥", minor_units: 2 },
    Currency { code: "JPY", symbol: "¥", minor_units: 0 },
    Currency { code: "KRW", symbol: "₩", minor_units: 0 },
    Currency { code: "KWD", symbol: "KWD", minor_units: 3 },
    Currency { code: "BHD", symbol: "BHD", minor_units: 3 },
];

fn currency(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code == code)
}

/// Format `amount` of ISO-4217 `code` for `locale`: currency-specific minor
/// units, locale separators and symbol placement. Codes without a known
/// symbol are shown as the code itself.
pub fn format_currency(amount: Decimal, code: &str, locale: Locale) -> String {
    let code = code.trim().to_ascii_uppercase();
    let known = currency(&code);
    let digits = known.map(|c| c.minor_units).unwrap_or(2);
    let symbol = known.map(|c| c.symbol).unwrap_or(code.as_str());

    let rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let number = group_digits(rounded.abs(), digits, locale);
    let spaced = symbol.chars().all(|c| c.is_ascii_alphabetic());

    if locale.symbol_first() {
        if spaced {
            format!("{sign}{symbol}{NBSP}{number}")
        } else {
            format!("{sign}{symbol}{number}")
        }
    } else {
        format!("{sign}{number}{NBSP}{symbol}")
    }
}

/// Parse a backend money amount ("12.5", "1000", "-3.20").
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

fn group_digits(value: Decimal, digits: u32, locale: Locale) -> String {
    let fixed = format!("{:.*}", digits as usize, value);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let nums = locale.numbers();
    let grouped = match int_part.parse::<u64>() {
        Ok(n) => n.to_formatted_string(&nums),
        Err(_) => int_part.to_string(),
    };
    match frac_part {
        Some(f) if digits > 0 => format!("{grouped}{}{f}", nums.decimal()),
        _ => grouped,
    }
}

/// Format an RFC 3339 timestamp (or a bare `YYYY-MM-DD`) as a short date in
/// the viewer's convention. Unparseable input is returned unchanged.
///
/// The calendar day is taken in the timestamp's own UTC offset, not the
/// viewer's time zone.
pub fn format_date(raw: &str, locale: Locale) -> String {
    let date = DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"));
    match date {
        Ok(d) => short_date(d, locale),
        Err(_) => raw.to_string(),
    }
}

fn short_date(d: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::EnUs => format!("{}/{}/{}", d.month(), d.day(), d.year()),
        Locale::EnGb | Locale::FrFr => d.format("%d/%m/%Y").to_string(),
        Locale::DeDe => format!("{}.{}.{}", d.day(), d.month(), d.year()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        parse_amount(s).unwrap()
    }

    #[test]
    fn usd_en_us() {
        assert_eq!(format_currency(dec("1234.5"), "USD", Locale::EnUs), "$1,234.50");
        assert_eq!(format_currency(dec("0"), "usd", Locale::EnUs), "$0.00");
    }

    #[test]
    fn zero_decimal_currency() {
        assert_eq!(format_currency(dec("1500.4"), "JPY", Locale::EnUs), "¥1,500");
    }

    #[test]
    fn three_decimal_currency() {
        assert_eq!(format_currency(dec("2.5"), "KWD", Locale::EnUs), "KWD\u{a0}2.500");
    }

    #[test]
    fn euro_german_suffix() {
        assert_eq!(format_currency(dec("1234.5"), "EUR", Locale::DeDe), "1.234,50\u{a0}€");
    }

    #[test]
    fn unknown_code_uses_code() {
        assert_eq!(format_currency(dec("10"), "XYZ", Locale::EnGb), "XYZ\u{a0}10.00");
    }

    #[test]
    fn negative_amount() {
        assert_eq!(format_currency(dec("-3.2"), "GBP", Locale::EnGb), "-£3.20");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_currency(dec("0.125"), "USD", Locale::EnUs), "$0.13");
    }

    #[test]
    fn dates_per_locale() {
        let raw = "2024-03-05T10:00:00Z";
        assert_eq!(format_date(raw, Locale::EnUs), "3/5/2024");
        assert_eq!(format_date(raw, Locale::EnGb), "05/03/2024");
        assert_eq!(format_date(raw, Locale::DeDe), "5.3.2024");
        assert_eq!(format_date("2024-12-31", Locale::FrFr), "31/12/2024");
        // day as written in the timestamp's own offset
        assert_eq!(format_date("2024-03-05T23:30:00-05:00", Locale::EnUs), "3/5/2024");
    }

    #[test]
    fn bad_date_passes_through() {
        assert_eq!(format_date("yesterday", Locale::EnUs), "yesterday");
    }

    #[test]
    fn parses_locale_tags() {
        assert_eq!("en_US".parse::<Locale>().unwrap(), Locale::EnUs);
        assert_eq!("de-de".parse::<Locale>().unwrap(), Locale::DeDe);
        assert!("xx-YY".parse::<Locale>().is_err());
    }
}
