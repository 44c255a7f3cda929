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

use chrono::Month;

/// Calendar year that the dashboard numbers as year `0`.
///
/// The dashboard identifies years by an index relative to this year, so 2012 is `-7`
/// and 2020 is `1`.
pub const EPOCH_CALENDAR_YEAR: i32 = 2019;

/// Translate a calendar year into the dashboard's year index.
pub fn year_index(year: i32) -> i32 {
    year - EPOCH_CALENDAR_YEAR
}

/// Full English names of every month in calendar order, as expected by the dashboard.
pub fn months() -> impl Iterator<Item = &'static str> {
    (1..=12u8).filter_map(|m| Month::try_from(m).ok()).map(|m| m.name())
}

/// Whether a request concerns one total per day or one value per 5-minute interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Detail,
}

impl Granularity {
    /// Query string marker that selects the matching dashboard endpoint.
    pub fn endpoint_marker(&self) -> &'static str {
        match self {
            Self::Daily => "rainfallDaily",
            Self::Detail => "rainfallDetail",
        }
    }
}

/// Parameters for a single dashboard request.
///
/// Month and day are passed through as given. Misspelled months or out of range days
/// are left for the dashboard to reject, or more commonly, to answer with no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RainfallQuery {
    pub site: String,
    pub year: i32,
    pub month: String,
    pub day: Option<u32>,
}

impl RainfallQuery {
    pub fn daily<S, M>(site: S, year: i32, month: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        RainfallQuery {
            site: site.into(),
            year,
            month: month.into(),
            day: None,
        }
    }

    pub fn detail<S, M>(site: S, year: i32, month: M, day: u32) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        RainfallQuery {
            site: site.into(),
            year,
            month: month.into(),
            day: Some(day),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self.day {
            Some(_) => Granularity::Detail,
            None => Granularity::Daily,
        }
    }

    /// Form fields to POST to the dashboard, in a stable order.
    pub fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("startingYear", year_index(self.year).to_string()),
            ("rainfallSite", self.site.clone()),
            ("month", self.month.clone()),
        ];

        if let Some(day) = self.day {
            form.push(("day", day.to_string()));
        }

        form
    }
}
