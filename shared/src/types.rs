//! Common types used across the ERP: pricing modes, discounts, lenient amounts
//! and the date formats exchanged with the front end.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Which side of the business a document sits on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentMode {
    /// Prices default from packaging cost price
    Purchase,
    /// Prices default from packaging sale price
    Sales,
}

impl fmt::Display for DocumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentMode::Purchase => write!(f, "Purchase"),
            DocumentMode::Sales => write!(f, "Sales"),
        }
    }
}

/// How a line discount is interpreted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    Fixed,
    Percent,
}

/// Settlement state of a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
            PaymentStatus::Partial => write!(f, "Partial"),
            PaymentStatus::Paid => write!(f, "Paid"),
        }
    }
}

// ============================================================================
// Amounts
// ============================================================================

/// Parse a user or import supplied amount.
///
/// Accepts a leading currency marker (`Rs`, `Rs.`, `PKR`, `$`) and thousands
/// separators, e.g. `"Rs 1,100.50"`. Returns `None` when nothing numeric is left.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let chars: Vec<char> = trimmed.chars().collect();

    let start = chars.iter().enumerate().position(|(i, &c)| {
        if c.is_ascii_digit() || c == '-' || c == '+' {
            return true;
        }
        // ".5" starts a number, "Rs.1100" does not
        c == '.'
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
            && (i == 0 || !chars[i - 1].is_alphabetic())
    })?;

    let mut numeric: String = chars[start..]
        .iter()
        .filter(|c| **c != ',' && !c.is_whitespace())
        .collect();

    if numeric.starts_with('.') {
        numeric.insert(0, '0');
    }

    Decimal::from_str(&numeric).ok()
}

/// Largest magnitude accepted from a UI input
pub const MAX_INPUT_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Same as [`parse_amount`] but coerces failures, and magnitudes beyond
/// [`MAX_INPUT_AMOUNT`], to zero
pub fn parse_amount_or_zero(text: &str) -> Decimal {
    parse_amount(text)
        .filter(|d| d.abs() <= MAX_INPUT_AMOUNT)
        .unwrap_or(Decimal::ZERO)
}

/// Serde adapter for catalog amounts that may arrive as numbers, formatted
/// strings, blanks or nulls. Unusable input deserializes to `None`.
pub fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientAmountVisitor)
}

struct LenientAmountVisitor;

impl<'de> Visitor<'de> for LenientAmountVisitor {
    type Value = Option<Decimal>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a formatted amount string, or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // NaN and infinities have no decimal form
        Ok(Decimal::from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_amount(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(LenientAmountVisitor)
    }
}

// ============================================================================
// Dates
// ============================================================================

/// Boundary date format
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Display/edit date format
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `YYYY-MM-DD` date
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), ISO_DATE_FORMAT).ok()
}

/// Format a date as `YYYY-MM-DD`
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Format a date as `DD/MM/YYYY`
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Strictly parse a `DD/MM/YYYY` date.
///
/// Day and month must be in range and the date must exist on the calendar,
/// so `31/02/2024` is rejected rather than rolled over into March.
pub fn parse_display_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let (day, month, year) = (parts[0], parts[1], parts[2]);
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if !all_digits(day) || !all_digits(month) || !all_digits(year) {
        return None;
    }
    if day.len() > 2 || month.len() > 2 || year.len() != 4 {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}
