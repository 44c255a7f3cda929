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

use crate::query::{Granularity, RainfallQuery};
use reqwest::{Client, StatusCode, Url};
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Internal(#[from] reqwest::Error),
    #[error("invalid base URL {0}")]
    InvalidUrl(String),
    #[error("unexpected status {0} for {1}")]
    Unexpected(StatusCode, Url),
    #[error("empty response body for {0}")]
    EmptyBody(Url),
}

/// Something that can answer a `RainfallQuery` with the raw body of a dashboard response.
pub trait RainfallSource {
    fn fetch(&self, query: &RainfallQuery) -> impl Future<Output = Result<Vec<u8>, ClientError>>;
}

/// Client for the NEORSD rainfall dashboard's table data endpoints.
///
/// Each query results in a single form POST. No headers beyond what `reqwest` sets, no
/// cookies and no retries: any transport failure or non-200 response is returned as an
/// error before the body is looked at.
#[derive(Debug)]
pub struct RainfallClient {
    client: Client,
    base_url: Url,
}

impl RainfallClient {
    pub const DEFAULT_BASE_URL: &'static str =
        "https://www.neorsd.org/Rainfall%20Dashboard/dataTableServerSide.php";

    pub fn new(client: Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(RainfallClient { client, base_url })
    }

    fn endpoint_url(&self, granularity: Granularity) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(Some(granularity.endpoint_marker()));
        url
    }
}

impl RainfallSource for RainfallClient {
    async fn fetch(&self, query: &RainfallQuery) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint_url(query.granularity());
        let form = query.form();
        tracing::debug!(message = "making rainfall request", url = %url, form = ?form);

        let res = self.client.post(url.clone()).form(&form).send().await?;
        let status = res.status();
        tracing::debug!(message = "received rainfall response", url = %url, status = %status);

        if status != StatusCode::OK {
            return Err(ClientError::Unexpected(status, url));
        }

        let body = res.bytes().await?;
        if body.is_empty() {
            Err(ClientError::EmptyBody(url))
        } else {
            Ok(body.to_vec())
        }
    }
}
