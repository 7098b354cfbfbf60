//! Cell value parsers: statement amounts and calendar dates.
//!
//! Amount separators: `.` and `,` are thousands markers, except the last
//! separator in a cell is a decimal marker when it is followed by one or two
//! digits and no earlier separator uses the same character. So "10.500.000"
//! and "1,000,000" are whole numbers while "123.45", "1.234,5" and
//! "1,000.50" carry a fraction.
//!
//! Dates are read in a fixed order (`DateOrder`, day first by default).
//! Two-digit years expand around `century_pivot`: years up to the pivot land
//! in 2000-2099, later ones in 1900-1999.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::CellValue;

const CURRENCY_MARKERS: &[&str] = &["vnđ", "vnd", "₫", "đ"];

/// Parse a statement amount cell into a signed decimal.
pub fn parse_amount(raw: Option<&str>) -> CellValue<Decimal> {
    let Some(raw) = raw else {
        return CellValue::Absent;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Absent;
    }
    match amount_value(trimmed) {
        Some(v) => CellValue::Parsed(v),
        None => CellValue::Unparseable(trimmed.to_string()),
    }
}

fn amount_value(s: &str) -> Option<Decimal> {
    let mut body = s.to_lowercase().replace('\u{2212}', "-");
    for marker in CURRENCY_MARKERS {
        body = body.replace(marker, "");
    }
    let mut body: String = body.chars().filter(|c| !c.is_whitespace()).collect();

    let mut negative = false;
    if let Some(inner) = body.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        negative = true;
        body = inner.to_string();
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = !negative;
        body = rest.to_string();
    } else if let Some(rest) = body.strip_prefix('+') {
        body = rest.to_string();
    }

    let bytes = body.as_bytes();
    if !bytes.first()?.is_ascii_digit() || !bytes.last()?.is_ascii_digit() {
        return None;
    }
    if !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let seps: Vec<(usize, char)> = body
        .char_indices()
        .filter(|(_, c)| *c == '.' || *c == ',')
        .collect();
    if seps.windows(2).any(|w| w[1].0 == w[0].0 + 1) {
        return None;
    }

    let decimal_at = seps.last().and_then(|&(pos, ch)| {
        let frac_len = body.len() - pos - 1;
        let unique = seps[..seps.len() - 1].iter().all(|&(_, c)| c != ch);
        ((1..=2).contains(&frac_len) && unique).then_some(pos)
    });

    let normalized: String = body
        .char_indices()
        .filter_map(|(i, c)| match c {
            '.' | ',' if Some(i) == decimal_at => Some('.'),
            '.' | ',' => None,
            d => Some(d),
        })
        .collect();

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// DD/MM/YYYY
    #[default]
    DayFirst,
    /// MM/DD/YYYY
    MonthFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePolicy {
    pub order: DateOrder,
    pub century_pivot: u32,
    /// Year for two-part "DD/MM" cells; without it they are unparseable.
    pub fallback_year: Option<i32>,
}

impl Default for DatePolicy {
    fn default() -> Self {
        Self {
            order: DateOrder::DayFirst,
            century_pivot: 69,
            fallback_year: None,
        }
    }
}

fn numeric_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})(?:[/.\-](\d{4}|\d{2}))?(?:\s|$)")
            .expect("numeric date regex")
    })
}

fn iso_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})(?:[\sT]|$)").expect("iso date regex")
    })
}

pub fn expand_year(two_digit: u32, pivot: u32) -> i32 {
    if two_digit <= pivot {
        2000 + two_digit as i32
    } else {
        1900 + two_digit as i32
    }
}

/// Parse a date cell under `policy`. Never panics; bad input is
/// `Unparseable`, blank input is `Absent`.
pub fn parse_date(raw: Option<&str>, policy: &DatePolicy) -> CellValue<NaiveDate> {
    let Some(raw) = raw else {
        return CellValue::Absent;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Absent;
    }
    match date_value(trimmed, policy) {
        Some(d) => CellValue::Parsed(d),
        None => CellValue::Unparseable(trimmed.to_string()),
    }
}

fn date_value(s: &str, policy: &DatePolicy) -> Option<NaiveDate> {
    if let Some(caps) = iso_date_re().captures(s) {
        let y: i32 = caps[1].parse().ok()?;
        let m: u32 = caps[2].parse().ok()?;
        let d: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    let caps = numeric_date_re().captures(s)?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year = match caps.get(3) {
        Some(y) if y.as_str().len() == 2 => expand_year(y.as_str().parse().ok()?, policy.century_pivot),
        Some(y) => y.as_str().parse().ok()?,
        None => policy.fallback_year?,
    };
    let (day, month) = match policy.order {
        DateOrder::DayFirst => (first, second),
        DateOrder::MonthFirst => (second, first),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> CellValue<Decimal> {
        parse_amount(Some(s))
    }

    fn dec(s: &str) -> CellValue<Decimal> {
        CellValue::Parsed(Decimal::from_str(s).unwrap())
    }

    fn date(s: &str) -> CellValue<NaiveDate> {
        parse_date(Some(s), &DatePolicy::default())
    }

    fn ymd(y: i32, m: u32, d: u32) -> CellValue<NaiveDate> {
        CellValue::Parsed(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_amount_absent() {
        assert_eq!(parse_amount(None), CellValue::Absent);
        assert_eq!(amount(""), CellValue::Absent);
        assert_eq!(amount("   "), CellValue::Absent);
    }

    #[test]
    fn test_amount_thousand_separators() {
        assert_eq!(amount("1,000,000"), dec("1000000"));
        assert_eq!(amount("10.500.000"), dec("10500000"));
        assert_eq!(amount("2.500.000"), dec("2500000"));
        assert_eq!(amount("500000"), dec("500000"));
        assert_eq!(amount("1.234,567"), dec("1234567"));
        assert_eq!(amount("1,000"), dec("1000"));
    }

    #[test]
    fn test_amount_grouped_digits_all_forms() {
        for a in ['.', ','] {
            for b in ['.', ','] {
                let s = format!("12{a}345{b}678");
                assert_eq!(amount(&s), dec("12345678"), "{s}");
            }
        }
    }

    #[test]
    fn test_amount_decimal_marker() {
        assert_eq!(amount("123.45"), dec("123.45"));
        assert_eq!(amount("123,4"), dec("123.4"));
        assert_eq!(amount("1.234,5"), dec("1234.5"));
        assert_eq!(amount("1,000.50"), dec("1000.50"));
    }

    #[test]
    fn test_amount_signs_and_currency() {
        assert_eq!(amount("-50,000"), dec("-50000"));
        assert_eq!(amount("+50,000"), dec("50000"));
        assert_eq!(amount("(1,000)"), dec("-1000"));
        assert_eq!(amount("1.500.000 VND"), dec("1500000"));
        assert_eq!(amount("250.000đ"), dec("250000"));
        assert_eq!(amount("1 000 000"), dec("1000000"));
        assert_eq!(amount("0"), dec("0"));
    }

    #[test]
    fn test_amount_unparseable_is_not_zero() {
        assert_eq!(amount("abc"), CellValue::Unparseable("abc".to_string()));
        assert!(amount("--").is_unparseable());
        assert!(amount("-").is_unparseable());
        assert!(amount("12a34").is_unparseable());
        assert!(amount("1,,000").is_unparseable());
        assert!(amount("01/12/2025").is_unparseable());
        assert_ne!(amount("abc"), dec("0"));
    }

    #[test]
    fn test_date_dd_mm_yyyy() {
        assert_eq!(date("01/12/2025"), ymd(2025, 12, 1));
        assert_eq!(date("15-06-2025"), ymd(2025, 6, 15));
        assert_eq!(date("15.06.2025"), ymd(2025, 6, 15));
        assert_eq!(date("01/12/2025 10:33:12"), ymd(2025, 12, 1));
    }

    #[test]
    fn test_date_round_trips_every_day_of_2024() {
        let mut d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while d.format("%Y").to_string() == "2024" {
            let s = d.format("%d/%m/%Y").to_string();
            assert_eq!(date(&s), CellValue::Parsed(d), "{s}");
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_date_two_digit_year_pivot() {
        assert_eq!(date("15/06/25"), ymd(2025, 6, 15));
        assert_eq!(date("15/06/69"), ymd(2069, 6, 15));
        assert_eq!(date("15/06/70"), ymd(1970, 6, 15));
        assert_eq!(expand_year(0, 69), 2000);
    }

    #[test]
    fn test_date_iso() {
        assert_eq!(date("2025-12-02"), ymd(2025, 12, 2));
        let us = DatePolicy { order: DateOrder::MonthFirst, ..DatePolicy::default() };
        assert_eq!(parse_date(Some("2025-12-02"), &us), ymd(2025, 12, 2));
    }

    #[test]
    fn test_date_month_first() {
        let us = DatePolicy { order: DateOrder::MonthFirst, ..DatePolicy::default() };
        assert_eq!(parse_date(Some("12/01/2025"), &us), ymd(2025, 12, 1));
        assert!(parse_date(Some("13/01/2025"), &us).is_unparseable());
    }

    #[test]
    fn test_date_two_part_needs_fallback_year() {
        assert!(date("04/22").is_unparseable());
        let p = DatePolicy { fallback_year: Some(2026), ..DatePolicy::default() };
        assert_eq!(parse_date(Some("22/04"), &p), ymd(2026, 4, 22));
    }

    #[test]
    fn test_date_unparseable_and_absent() {
        assert_eq!(parse_date(None, &DatePolicy::default()), CellValue::Absent);
        assert_eq!(date("  "), CellValue::Absent);
        assert_eq!(date("not-a-date"), CellValue::Unparseable("not-a-date".to_string()));
        assert!(date("32/01/2025").is_unparseable());
        assert!(date("01/13/2025").is_unparseable());
        assert!(date("31/02/2025").is_unparseable());
        assert!(date("01/12/202").is_unparseable());
        assert!(date("01/12/2025abc").is_unparseable());
        assert!(date("Date").is_unparseable());
    }
}
