// src/period.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, ops::RangeInclusive, str::FromStr};
use thiserror::Error;

/// `"Q3 1991"`: a quarter token, whitespace, a four digit year.
static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Q(\d)\s+(\d{4})$").expect("period regex should compile"));

/// Malformed period label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty period label")]
    Empty,
    #[error("period {0:?} is not of the form \"Q<1-4> <year>\"")]
    Format(String),
    #[error("quarter {0:?} is not one of Q1, Q2, Q3, Q4")]
    Quarter(String),
}

/// A year outside the selectable range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("year {year} is outside {min}..={max}")]
pub struct SelectionError {
    pub year: u16,
    pub min: u16,
    pub max: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn number(&self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Quarter::Q1),
            2 => Some(Quarter::Q2),
            3 => Some(Quarter::Q3),
            4 => Some(Quarter::Q4),
            _ => None,
        }
    }

    /// Fraction of a year elapsed before the quarter starts.
    pub fn offset(&self) -> f64 {
        match self {
            Quarter::Q1 => 0.0,
            Quarter::Q2 => 0.25,
            Quarter::Q3 => 0.5,
            Quarter::Q4 => 0.75,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

impl FromStr for Quarter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let digits = t
            .strip_prefix('Q')
            .or_else(|| t.strip_prefix('q'))
            .unwrap_or(t);
        digits
            .parse::<u8>()
            .ok()
            .and_then(Quarter::from_number)
            .ok_or_else(|| ParseError::Quarter(s.to_string()))
    }
}

/// One calendar quarter. Ordering is chronological.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    // field order drives the derived Ord
    year: u16,
    quarter: Quarter,
}

impl Period {
    pub fn new(quarter: Quarter, year: u16) -> Self {
        Self { year, quarter }
    }

    pub fn quarter(&self) -> Quarter {
        self.quarter
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// `year + quarter offset`, strictly increasing with time.
    pub fn ordinal(&self) -> f64 {
        f64::from(self.year) + self.quarter.offset()
    }

    /// True iff `self` is strictly later than `other`.
    pub fn is_after(&self, other: &Period) -> bool {
        self.ordinal() > other.ordinal()
    }

    /// The following quarter, or `None` past year 9999.
    pub fn next(&self) -> Option<Period> {
        match self.quarter {
            Quarter::Q4 if self.year >= 9999 => None,
            Quarter::Q4 => Some(Period::new(Quarter::Q1, self.year + 1)),
            q => Quarter::from_number(q.number() + 1).map(|q| Period::new(q, self.year)),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quarter, self.year)
    }
}

impl FromStr for Period {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err(ParseError::Empty);
        }
        let caps = PERIOD_RE
            .captures(t)
            .ok_or_else(|| ParseError::Format(s.to_string()))?;
        let quarter = caps[1]
            .parse::<u8>()
            .ok()
            .and_then(Quarter::from_number)
            .ok_or_else(|| ParseError::Quarter(format!("Q{}", &caps[1])))?;
        let year = caps[2]
            .parse::<u16>()
            .map_err(|_| ParseError::Format(s.to_string()))?;
        Ok(Period::new(quarter, year))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Numeric key of a period label: `"Q3 1991"` → `1991.5`.
pub fn to_ordinal(period: &str) -> Result<f64, ParseError> {
    Ok(period.parse::<Period>()?.ordinal())
}

/// True iff period label `a` is strictly later than `b`.
pub fn is_after(a: &str, b: &str) -> Result<bool, ParseError> {
    Ok(to_ordinal(a)? > to_ordinal(b)?)
}

/// A quarter and year picked independently, as on the input form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodSelection {
    pub quarter: Quarter,
    pub year: u16,
}

impl PeriodSelection {
    pub fn new(quarter: Quarter, year: u16, years: &RangeInclusive<u16>) -> Result<Self, SelectionError> {
        if !years.contains(&year) {
            return Err(SelectionError {
                year,
                min: *years.start(),
                max: *years.end(),
            });
        }
        Ok(Self { quarter, year })
    }

    pub fn period(&self) -> Period {
        Period::new(self.quarter, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_offsets() {
        assert_eq!(to_ordinal("Q1 1991").unwrap(), 1991.0);
        assert_eq!(to_ordinal("Q2 1991").unwrap(), 1991.25);
        assert_eq!(to_ordinal("Q3 1991").unwrap(), 1991.5);
        assert_eq!(to_ordinal("Q4 1991").unwrap(), 1991.75);
    }

    #[test]
    fn test_ordinal_strictly_increasing() {
        let mut p = Period::new(Quarter::Q1, 1991);
        for _ in 0..200 {
            let next = p.next().unwrap();
            assert!(to_ordinal(&p.to_string()).unwrap() < to_ordinal(&next.to_string()).unwrap());
            assert!(p < next);
            p = next;
        }
    }

    #[test]
    fn test_is_after_antisymmetric_and_irreflexive() {
        let labels = ["Q1 1991", "Q4 1991", "Q2 2010", "Q3 2000", "Q1 2023"];
        for a in labels {
            assert!(!is_after(a, a).unwrap());
            for b in labels.iter().filter(|b| **b != a) {
                assert_eq!(is_after(a, b).unwrap(), !is_after(b, a).unwrap());
            }
        }
        assert!(is_after("Q1 1992", "Q4 1991").unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed_labels() {
        assert_eq!("".parse::<Period>(), Err(ParseError::Empty));
        assert!(matches!("1991 Q1".parse::<Period>(), Err(ParseError::Format(_))));
        assert!(matches!("Q1-1991".parse::<Period>(), Err(ParseError::Format(_))));
        assert!(matches!("Q1 91".parse::<Period>(), Err(ParseError::Format(_))));
        assert!(matches!("Q1 1991 extra".parse::<Period>(), Err(ParseError::Format(_))));
        assert_eq!(
            "Q5 1991".parse::<Period>(),
            Err(ParseError::Quarter("Q5".into()))
        );
        assert!(to_ordinal("Q0 2000").is_err());
    }

    #[test]
    fn test_parse_is_lenient_on_case_and_spacing() {
        let p: Period = " q2   2010 ".parse().unwrap();
        assert_eq!(p, Period::new(Quarter::Q2, 2010));
        assert_eq!(p.to_string(), "Q2 2010");
    }

    #[test]
    fn test_next_rolls_over_year() {
        let p = Period::new(Quarter::Q4, 1999);
        assert_eq!(p.next(), Some(Period::new(Quarter::Q1, 2000)));
        assert_eq!(Period::new(Quarter::Q2, 1999).next(), Some(Period::new(Quarter::Q3, 1999)));
        assert_eq!(Period::new(Quarter::Q4, 9999).next(), None);
    }

    #[test]
    fn test_quarter_from_str() {
        assert_eq!("Q3".parse::<Quarter>().unwrap(), Quarter::Q3);
        assert_eq!("q1".parse::<Quarter>().unwrap(), Quarter::Q1);
        assert_eq!("4".parse::<Quarter>().unwrap(), Quarter::Q4);
        assert!("Q9".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_selection_bounds() {
        let years = 1991..=2023;
        let sel = PeriodSelection::new(Quarter::Q3, 1991, &years).unwrap();
        assert_eq!(sel.period().to_string(), "Q3 1991");
        assert_eq!(
            PeriodSelection::new(Quarter::Q1, 1990, &years),
            Err(SelectionError {
                year: 1990,
                min: 1991,
                max: 2023
            })
        );
    }

    #[test]
    fn test_serde_as_label() {
        let p = Period::new(Quarter::Q1, 2023);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"Q1 2023\"");
        let back: Period = serde_json::from_str("\"Q1 2023\"").unwrap();
        assert_eq!(back, p);
    }
}
