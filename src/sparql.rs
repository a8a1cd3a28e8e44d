use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::info;

use crate::binding::{ResultRow, rows_from_results};
use crate::error::VisError;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

pub trait SparqlClient: Send + Sync {
    fn select(&self, label: &str, query: &str) -> Result<Vec<ResultRow>, VisError>;
}

#[derive(Clone)]
pub struct SparqlHttpClient {
    client: Client,
    endpoint: String,
}

impl SparqlHttpClient {
    pub fn new(endpoint: &str, user_agent: &str) -> Result<Self, VisError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|err| VisError::ConfigValue(format!("user agent: {err}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(SPARQL_RESULTS_JSON));
        // WDQS enforces its own query deadline; no client-side timeout here.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Option::<Duration>::None)
            .build()
            .map_err(|err| VisError::SparqlHttp(err.to_string()))?;
        query_url(endpoint, "")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn handle_status(
        label: &str,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, VisError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let reason = response
            .status()
            .canonical_reason()
            .unwrap_or("SPARQL request failed");
        // WDQS error bodies are stack traces; the first line is the useful part.
        let message = match response.text() {
            Ok(body) => match body.lines().map(str::trim).find(|line| !line.is_empty()) {
                Some(line) => format!("{reason}: {line}"),
                None => reason.to_string(),
            },
            Err(_) => reason.to_string(),
        };
        Err(VisError::SparqlStatus {
            mode: label.to_string(),
            status,
            message,
        })
    }
}

impl SparqlClient for SparqlHttpClient {
    fn select(&self, label: &str, query: &str) -> Result<Vec<ResultRow>, VisError> {
        let url = query_url(&self.endpoint, query)?;
        info!(mode = label, endpoint = %self.endpoint, "running SPARQL query");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| VisError::SparqlHttp(err.to_string()))?;
        let response = Self::handle_status(label, response)?;
        let body: Value = response
            .json()
            .map_err(|err| VisError::SparqlHttp(format!("malformed response body: {err}")))?;
        let rows = rows_from_results(&body);
        info!(mode = label, rows = rows.len(), "SPARQL query finished");
        Ok(rows)
    }
}

pub fn query_url(endpoint: &str, query: &str) -> Result<Url, VisError> {
    Url::parse_with_params(endpoint, &[("format", "json"), ("query", query)])
        .map_err(|err| VisError::ConfigValue(format!("endpoint {endpoint}: {err}")))
}
