//! Argo date strings (`YYYYMMDDHHMISS`).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// chrono format of a full Argo date.
pub const ARGO_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parses a full 14-digit Argo date. Surrounding blanks are ignored.
pub fn parse_argo_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.len() != 14 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(trimmed, ARGO_DATE_FORMAT).ok()
}

pub fn format_argo_date(date: &NaiveDateTime) -> String {
    date.format(ARGO_DATE_FORMAT).to_string()
}

/// The earliest creation or launch date accepted in a data file.
pub fn earliest_argo_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1997, 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

/// Checks `value` against a unit pattern such as `YYYYMMDD` or `HHMI`.
///
/// Recognised tokens are `YYYY`, `MM`, `DD`, `HH`, `MI` and `SS`; any other
/// pattern falls back to a full Argo date check.
pub fn matches_date_pattern(pattern: &str, value: &str) -> bool {
    let Some(tokens) = tokenize(pattern) else {
        return parse_argo_date(value).is_some();
    };
    let value = value.trim();
    let width: usize = tokens.iter().map(|token| token.width()).sum();
    if value.len() != width || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let mut offset = 0;
    let mut year = None;
    let mut month = None;
    let mut day = None;
    for token in &tokens {
        let digits = &value[offset..offset + token.width()];
        offset += token.width();
        let Ok(number) = digits.parse::<u32>() else {
            return false;
        };
        let in_range = match token {
            DateToken::Year => {
                year = i32::try_from(number).ok();
                true
            }
            DateToken::Month => {
                month = Some(number);
                (1..=12).contains(&number)
            }
            DateToken::Day => {
                day = Some(number);
                (1..=31).contains(&number)
            }
            DateToken::Hour => number <= 23,
            DateToken::Minute | DateToken::Second => number <= 59,
        };
        if !in_range {
            return false;
        }
    }

    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d).is_some(),
        _ => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateToken {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl DateToken {
    fn width(&self) -> usize {
        match self {
            DateToken::Year => 4,
            _ => 2,
        }
    }
}

fn tokenize(pattern: &str) -> Option<Vec<DateToken>> {
    let upper = pattern.trim().to_ascii_uppercase();
    let mut rest = upper.as_str();
    let mut tokens = Vec::new();
    while !rest.is_empty() {
        let (token, len) = if rest.starts_with("YYYY") {
            (DateToken::Year, 4)
        } else if rest.starts_with("MM") {
            (DateToken::Month, 2)
        } else if rest.starts_with("DD") {
            (DateToken::Day, 2)
        } else if rest.starts_with("HH") {
            (DateToken::Hour, 2)
        } else if rest.starts_with("MI") {
            (DateToken::Minute, 2)
        } else if rest.starts_with("SS") {
            (DateToken::Second, 2)
        } else {
            return None;
        };
        tokens.push(token);
        rest = &rest[len..];
    }
    (!tokens.is_empty()).then_some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_dates_parse() {
        assert!(parse_argo_date("20240229120000").is_some());
        assert!(parse_argo_date(" 20240229120000 ").is_some());
        assert!(parse_argo_date("20230229120000").is_none());
        assert!(parse_argo_date("2024022912000").is_none());
        assert!(parse_argo_date("2024-02-29 12:00").is_none());
    }

    #[test]
    fn unit_patterns() {
        assert!(matches_date_pattern("YYYYMMDD", "20240131"));
        assert!(!matches_date_pattern("YYYYMMDD", "20240132"));
        assert!(matches_date_pattern("HHMI", "2359"));
        assert!(!matches_date_pattern("HHMI", "2460"));
        assert!(matches_date_pattern("date/time", "19970101000000"));
    }
}
