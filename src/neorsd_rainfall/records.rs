// neorsd_rainfall - Rainfall data extraction from the NEORSD rainfall dashboard
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wrapper returned by the dashboard's tabular data endpoint.
///
/// Only `data` is used. The other fields are paging metadata for the dashboard's table
/// widget and are kept for logging.
#[derive(Deserialize, Debug)]
pub struct Envelope<R> {
    #[serde(rename = "draw", default)]
    pub draw: i64,
    #[serde(rename = "recordsTotal", default)]
    pub records_total: i64,
    #[serde(rename = "recordsFiltered", default)]
    pub records_filtered: i64,
    #[serde(rename = "data")]
    pub data: Vec<R>,
}

impl<R: DeserializeOwned> Envelope<R> {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// Total rainfall for one day of a month.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DailyRecord {
    #[serde(rename = "trend_data_day")]
    pub day_label: String,
    #[serde(rename = "rain_total")]
    pub rain_total: RainTotal,
}

/// Rainfall for one 5-minute interval of a day.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DetailRecord {
    #[serde(rename = "time")]
    pub time_label: String,
    #[serde(rename = "rain_total")]
    pub rain_total: RainTotal,
}

/// Common access to the label and amount of either kind of record.
pub trait RainfallRecord: DeserializeOwned {
    fn label(&self) -> &str;
    fn rain_total(&self) -> RainTotal;
}

impl RainfallRecord for DailyRecord {
    fn label(&self) -> &str {
        &self.day_label
    }

    fn rain_total(&self) -> RainTotal {
        self.rain_total
    }
}

impl RainfallRecord for DetailRecord {
    fn label(&self) -> &str {
        &self.time_label
    }

    fn rain_total(&self) -> RainTotal {
        self.rain_total
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RainTotalError {
    #[error("invalid rain total {0:?}")]
    Invalid(String),
    #[error("rain total {0} is too large")]
    TooLarge(String),
}

/// Amount of rainfall in inches.
///
/// The dashboard sends amounts as decimal strings (`"0.125"`). Only plain non-negative
/// decimals are accepted, anything else is rejected when decoding instead of being treated
/// as zero. Rounding to hundredths is done on the decimal digits, with halves rounded
/// away from zero, so `"0.145"` displays as `0.15`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainTotal {
    inches: f64,
    hundredths: u64,
}

impl RainTotal {
    /// Amount from a float, rounded using its shortest decimal representation.
    pub fn new(inches: f64) -> Option<Self> {
        if !inches.is_finite() {
            return None;
        }

        inches.to_string().parse().ok()
    }

    pub fn inches(&self) -> f64 {
        self.inches
    }

    /// Amount rounded to the nearest hundredth of an inch.
    pub fn hundredths(&self) -> u64 {
        self.hundredths
    }
}

impl FromStr for RainTotal {
    type Err = RainTotalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        let is_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
            return Err(RainTotalError::Invalid(s.to_owned()));
        }

        let too_large = || RainTotalError::TooLarge(s.to_owned());
        let mut frac_digits = frac.bytes().map(|b| u64::from(b - b'0'));
        let tenths = frac_digits.next().unwrap_or(0);
        let cents = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().map(|d| d >= 5).unwrap_or(false);

        let hundredths = whole
            .bytes()
            .try_fold(0u64, |acc, b| acc.checked_mul(10)?.checked_add(u64::from(b - b'0')))
            .and_then(|w| w.checked_mul(100))
            .and_then(|w| w.checked_add(tenths * 10 + cents + u64::from(round_up)))
            .ok_or_else(too_large)?;

        let inches = trimmed
            .parse::<f64>()
            .map_err(|_| RainTotalError::Invalid(s.to_owned()))?;

        Ok(RainTotal { inches, hundredths })
    }
}

impl fmt::Display for RainTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.hundredths / 100, self.hundredths % 100)
    }
}

impl<'de> Deserialize<'de> for RainTotal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RainTotalVisitor)
    }
}

struct RainTotalVisitor;

impl<'de> Visitor<'de> for RainTotalVisitor {
    type Value = RainTotal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative decimal number of inches as a string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        RainTotal::new(v).ok_or_else(|| E::custom(RainTotalError::Invalid(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }
}
