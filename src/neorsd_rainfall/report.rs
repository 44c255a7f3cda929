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

use crate::client::{ClientError, RainfallSource};
use crate::query::{months, Granularity, RainfallQuery};
use crate::records::{DailyRecord, DetailRecord, Envelope, RainfallRecord};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("request failed: {0}")]
    Client(#[from] ClientError),
    #[error("unable to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unable to write output: {0}")]
    Output(#[from] io::Error),
}

/// Format a single record as a comma separated output line.
///
/// Daily records produce `location,year month day,inches` while detail records produce
/// `location,year month day,time,inches`.
pub fn format_line<R: RainfallRecord>(query: &RainfallQuery, record: &R) -> String {
    match query.day {
        None => format!(
            "{},{} {} {},{}",
            query.site,
            query.year,
            query.month,
            record.label(),
            record.rain_total()
        ),
        Some(day) => format!(
            "{},{} {} {},{},{}",
            query.site,
            query.year,
            query.month,
            day,
            record.label(),
            record.rain_total()
        ),
    }
}

/// Decode a response body and format every record it contains, in the order received.
///
/// Any record failing to decode fails the whole body, nothing is returned for it.
pub fn decode_lines<R: RainfallRecord>(query: &RainfallQuery, body: &[u8]) -> Result<Vec<String>, ReportError> {
    let envelope = Envelope::<R>::from_slice(body).map_err(|e| {
        tracing::error!(
            message = "undecodable response body",
            body = %String::from_utf8_lossy(body),
        );
        ReportError::Decode(e)
    })?;

    tracing::debug!(
        message = "decoded rainfall response",
        draw = envelope.draw,
        records_total = envelope.records_total,
        records_filtered = envelope.records_filtered,
        records = envelope.data.len(),
    );

    Ok(envelope.data.iter().map(|r| format_line(query, r)).collect())
}

/// Fetch a single query and write its lines to `out`, returning the number of lines written.
///
/// Output is flushed before returning so that lines are visible before any following
/// request is made.
pub async fn write_query<S, W>(source: &S, query: &RainfallQuery, out: &mut W) -> Result<usize, ReportError>
where
    S: RainfallSource,
    W: Write,
{
    let body = source.fetch(query).await?;
    let lines = match query.granularity() {
        Granularity::Daily => decode_lines::<DailyRecord>(query, &body)?,
        Granularity::Detail => decode_lines::<DetailRecord>(query, &body)?,
    };

    for line in lines.iter() {
        writeln!(out, "{}", line)?;
    }

    out.flush()?;
    Ok(lines.len())
}

/// Fetch and write daily totals for every month of `year`, one request per month in
/// calendar order.
///
/// The first error stops the run. Lines for months before the failure have already been
/// written at that point.
pub async fn write_year<S, W>(source: &S, site: &str, year: i32, out: &mut W) -> Result<usize, ReportError>
where
    S: RainfallSource,
    W: Write,
{
    let mut total = 0;

    for month in months() {
        tracing::debug!(message = "fetching daily totals", site = %site, year = year, month = %month);
        let query = RainfallQuery::daily(site, year, month);
        let written = write_query(source, &query, out).await?;

        tracing::info!(message = "wrote daily totals", site = %site, year = year, month = %month, lines = written);
        total += written;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::{decode_lines, format_line, write_query, write_year, ReportError};
    use crate::client::{ClientError, RainfallSource};
    use crate::query::RainfallQuery;
    use crate::records::{DailyRecord, DetailRecord, RainTotal};
    use reqwest::{StatusCode, Url};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::rc::Rc;

    type Events = Rc<RefCell<Vec<String>>>;

    /// Source that answers from canned bodies keyed by month, recording each request.
    struct FakeSource {
        events: Events,
        bodies: HashMap<String, Vec<u8>>,
        failing: Option<String>,
    }

    impl FakeSource {
        fn new(events: Events) -> Self {
            FakeSource {
                events,
                bodies: HashMap::new(),
                failing: None,
            }
        }

        fn body(mut self, month: &str, body: &str) -> Self {
            self.bodies.insert(month.to_owned(), body.as_bytes().to_vec());
            self
        }

        fn failing(mut self, month: &str) -> Self {
            self.failing = Some(month.to_owned());
            self
        }
    }

    impl RainfallSource for FakeSource {
        async fn fetch(&self, query: &RainfallQuery) -> Result<Vec<u8>, ClientError> {
            self.events.borrow_mut().push(format!("fetch {}", query.month));

            if self.failing.as_deref() == Some(query.month.as_str()) {
                let url = Url::parse("http://localhost/table.php?rainfallDaily").unwrap();
                return Err(ClientError::Unexpected(StatusCode::INTERNAL_SERVER_ERROR, url));
            }

            Ok(self
                .bodies
                .get(&query.month)
                .cloned()
                .unwrap_or_else(|| br#"{"draw":0,"recordsTotal":0,"recordsFiltered":0,"data":[]}"#.to_vec()))
        }
    }

    /// Writer that records each complete line into the shared event log.
    struct RecordingWriter {
        events: Events,
        buf: Vec<u8>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(bytes);
            while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
                self.events.borrow_mut().push(format!("line {}", line));
            }

            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn daily_body(day: &str, total: &str) -> String {
        format!(
            r#"{{"draw":1,"recordsTotal":1,"recordsFiltered":1,"data":[{{"trend_data_day":"{}","rain_total":"{}"}}]}}"#,
            day, total
        )
    }

    #[test]
    fn test_format_line_daily() {
        let query = RainfallQuery::daily("Beachwood", 2012, "March");
        let record = DailyRecord {
            day_label: "3".to_owned(),
            rain_total: RainTotal::new(0.125).unwrap(),
        };

        assert_eq!("Beachwood,2012 March 3,0.13", format_line(&query, &record));
    }

    #[test]
    fn test_format_line_detail() {
        let query = RainfallQuery::detail("Beachwood", 2012, "March", 1);
        let record = DetailRecord {
            time_label: "14:05".to_owned(),
            rain_total: RainTotal::new(0.0).unwrap(),
        };

        assert_eq!("Beachwood,2012 March 1,14:05,0.00", format_line(&query, &record));
    }

    #[test]
    fn test_decode_lines_daily() {
        let query = RainfallQuery::daily("Beachwood", 2012, "March");
        let body = daily_body("3", "0.125");
        let lines = decode_lines::<DailyRecord>(&query, body.as_bytes()).unwrap();

        assert_eq!(vec!["Beachwood,2012 March 3,0.13".to_owned()], lines);
    }

    #[test]
    fn test_decode_lines_preserves_order() {
        let query = RainfallQuery::detail("Solon", 2020, "June", 2);
        let body = br#"{"draw":1,"recordsTotal":3,"recordsFiltered":3,"data":[
            {"time":"00:10","rain_total":"0.02"},
            {"time":"00:00","rain_total":"0.00"},
            {"time":"00:05","rain_total":"0.005"}]}"#;
        let lines = decode_lines::<DetailRecord>(&query, body).unwrap();

        assert_eq!(
            vec![
                "Solon,2020 June 2,00:10,0.02".to_owned(),
                "Solon,2020 June 2,00:00,0.00".to_owned(),
                "Solon,2020 June 2,00:05,0.01".to_owned(),
            ],
            lines
        );
    }

    #[test]
    fn test_decode_lines_same_body_same_output() {
        let query = RainfallQuery::daily("Beachwood", 2012, "May");
        let body = daily_body("17", "2.456");
        let first = decode_lines::<DailyRecord>(&query, body.as_bytes()).unwrap();
        let second = decode_lines::<DailyRecord>(&query, body.as_bytes()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_lines_malformed_total() {
        let query = RainfallQuery::daily("Beachwood", 2012, "March");
        let body = daily_body("3", "abc");
        let res = decode_lines::<DailyRecord>(&query, body.as_bytes());

        assert!(matches!(res, Err(ReportError::Decode(_))));
    }

    #[tokio::test]
    async fn test_write_query_detail() {
        let events = Events::default();
        let source = FakeSource::new(events.clone()).body(
            "March",
            r#"{"draw":1,"recordsTotal":1,"recordsFiltered":1,"data":[{"time":"14:05","rain_total":"0.00"}]}"#,
        );
        let query = RainfallQuery::detail("Beachwood", 2012, "March", 1);
        let mut out = Vec::new();

        let written = write_query(&source, &query, &mut out).await.unwrap();

        assert_eq!(1, written);
        assert_eq!("Beachwood,2012 March 1,14:05,0.00\n", String::from_utf8(out).unwrap());
    }

    #[tokio::test]
    async fn test_write_query_empty_data() {
        let events = Events::default();
        let source = FakeSource::new(events.clone());
        let query = RainfallQuery::detail("Beachwood", 2012, "March", 40);
        let mut out = Vec::new();

        let written = write_query(&source, &query, &mut out).await.unwrap();

        assert_eq!(0, written);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_write_query_decode_error_writes_nothing() {
        let events = Events::default();
        let source = FakeSource::new(events.clone()).body(
            "March",
            r#"{"data":[{"trend_data_day":"1","rain_total":"0.10"},{"trend_data_day":"2","rain_total":"abc"}]}"#,
        );
        let query = RainfallQuery::daily("Beachwood", 2012, "March");
        let mut out = Vec::new();

        let res = write_query(&source, &query, &mut out).await;

        assert!(matches!(res, Err(ReportError::Decode(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_write_year_one_request_per_month_streamed() {
        let events = Events::default();
        let source = FakeSource::new(events.clone())
            .body("January", &daily_body("1", "0.5"))
            .body("February", &daily_body("2", "0.125"))
            .body("December", &daily_body("31", "1"));
        let mut out = RecordingWriter {
            events: events.clone(),
            buf: Vec::new(),
        };

        let written = write_year(&source, "Beachwood", 2012, &mut out).await.unwrap();
        assert_eq!(3, written);

        let events = events.borrow();
        let fetches: Vec<&String> = events.iter().filter(|e| e.starts_with("fetch ")).collect();
        assert_eq!(12, fetches.len());
        assert_eq!("fetch January", fetches[0]);
        assert_eq!("fetch June", fetches[5]);
        assert_eq!("fetch December", fetches[11]);

        assert_eq!("fetch January", events[0]);
        assert_eq!("line Beachwood,2012 January 1,0.50", events[1]);
        assert_eq!("fetch February", events[2]);
        assert_eq!("line Beachwood,2012 February 2,0.13", events[3]);
        assert_eq!("fetch March", events[4]);
        assert_eq!("fetch December", events[events.len() - 2]);
        assert_eq!("line Beachwood,2012 December 31,1.00", events[events.len() - 1]);
    }

    #[tokio::test]
    async fn test_write_year_stops_on_transport_error() {
        let events = Events::default();
        let source = FakeSource::new(events.clone())
            .body("January", &daily_body("1", "0.5"))
            .body("March", &daily_body("1", "0.25"))
            .failing("February");
        let mut out = Vec::new();

        let res = write_year(&source, "Beachwood", 2012, &mut out).await;

        assert!(matches!(res, Err(ReportError::Client(ClientError::Unexpected(_, _)))));
        assert_eq!("Beachwood,2012 January 1,0.50\n", String::from_utf8(out).unwrap());
        assert_eq!(
            vec!["fetch January".to_owned(), "fetch February".to_owned()],
            *events.borrow()
        );
    }

    #[tokio::test]
    async fn test_write_year_stops_on_decode_error() {
        let events = Events::default();
        let source = FakeSource::new(events.clone())
            .body("January", &daily_body("1", "0.5"))
            .body("February", "<html>Service Unavailable</html>");
        let mut out = Vec::new();

        let res = write_year(&source, "Beachwood", 2012, &mut out).await;

        assert!(matches!(res, Err(ReportError::Decode(_))));
        assert_eq!("Beachwood,2012 January 1,0.50\n", String::from_utf8(out).unwrap());
        assert_eq!(2, events.borrow().len());
    }
}
