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


//! Rainfall data extraction from the NEORSD rainfall dashboard
//!
//! ## Features
//!
//! `neorsd_rainfall` fetches rainfall measurements for a particular gauge from the
//! [NEORSD rainfall dashboard] and writes them to standard output as comma separated lines.
//! Amounts are in inches, rounded to the nearest hundredth. Two programs are included.
//!
//! * `rainfall` - Daily totals for every day of a year, one request per month.
//!   Lines are `location,year month day,inches`.
//! * `rainfall_detail` - Totals for every 5 minute interval of a single day.
//!   Lines are `location,year month day,time,inches`.
//!
//! [NEORSD rainfall dashboard]: https://www.neorsd.org/Rainfall%20Dashboard/
//!
//! ## Build
//!
//! `neorsd_rainfall` is a Rust program and must be built from source using a
//! [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! Fetch daily totals for the `Beachwood` gauge for all of 2012:
//!
//! ```text
//! ./rainfall --location Beachwood --year 2012 > beachwood-2012.csv
//! ```
//!
//! Fetch 5 minute totals for March 1st, 2012:
//!
//! ```text
//! ./rainfall_detail --location Beachwood --year 2012 --month March --day 1
//! ```
//!
//! Months are full English names. Neither the month nor the day are checked before they
//! are sent, a day that doesn't exist results in no output. Use `--verbose` to log each
//! request and response to standard error.
//!

pub mod client;
pub mod query;
pub mod records;
pub mod report;
