//! PostgREST adapter for [`DataGateway`].
//!
//! ## Wire format
//! - Rows: `GET {base}/rest/v1/{collection}?select=*&col=op.value&order=col.desc&limit=n`
//! - Counts: same filters with `Prefer: count=exact` and `Range: 0-0`; the
//!   total is the part after `/` in `Content-Range` (`0-0/42`, `*/0`)
//! - Upserts: `POST` with `Prefer: resolution=merge-duplicates,return=minimal`
//!
//! Unknown columns and tables (`42703`, `42P01`, `PGRST204`, `PGRST205`, or a
//! bare 404) surface as `SchemaMismatch` so callers can fall back.

use async_trait::async_trait;
use interconnect_core::{DataGateway, Filter, Query};
use interconnect_domain::{GatewayConfig, InterconnectError, Record, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, RANGE};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

const REST_PREFIX: &str = "rest/v1/";
const SCHEMA_ERROR_CODES: &[&str] = &["42703", "42P01", "PGRST204", "PGRST205"];

/// Error body returned by PostgREST
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// [`DataGateway`] over a PostgREST endpoint
pub struct PostgrestGateway {
    http: HttpClient,
    rest_root: Url,
}

impl PostgrestGateway {
    /// Build a gateway from configuration.
    ///
    /// # Errors
    ///
    /// `Config` when the base URL is missing or malformed, or the API key is
    /// not a valid header value.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref() {
            headers.insert("apikey", header_value(key)?);
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {key}"))?);
        }

        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .max_attempts(config.max_attempts)
            .default_headers(headers)
            .build()?;

        Self::with_client(&config.base_url, http)
    }

    /// Gateway using a preconfigured client
    ///
    /// # Errors
    ///
    /// `Config` when `base_url` is empty or not a URL.
    pub fn with_client(base_url: &str, http: HttpClient) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(InterconnectError::Config("gateway base_url is not set".into()));
        }

        let mut base = Url::parse(base_url.trim())
            .map_err(|err| InterconnectError::Config(format!("invalid gateway base_url: {err}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_root = base
            .join(REST_PREFIX)
            .map_err(|err| InterconnectError::Config(format!("invalid gateway base_url: {err}")))?;

        Ok(Self { http, rest_root })
    }

    fn collection_url(&self, collection: &str) -> Result<Url> {
        self.rest_root
            .join(collection)
            .map_err(|err| InterconnectError::InvalidInput(format!("bad collection {collection}: {err}")))
    }
}

#[async_trait]
impl DataGateway for PostgrestGateway {
    #[instrument(skip(self), fields(collection = %query.collection))]
    async fn fetch_rows(&self, query: &Query) -> Result<Vec<Record>> {
        let url = self.collection_url(&query.collection)?;
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(query_params(query));

        let response =
            self.http.send(self.http.request(Method::GET, url).query(&params)).await?;
        let response = check_status(response, &query.collection).await?;

        let rows: Vec<Record> =
            response.json().await.map_err(|err| InterconnectError::from(InfraError::from(err)))?;
        debug!(rows = rows.len(), "fetched rows");
        Ok(rows)
    }

    #[instrument(skip(self), fields(collection = %query.collection))]
    async fn fetch_count(&self, query: &Query) -> Result<u64> {
        let url = self.collection_url(&query.collection)?;
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(query_params(&Query { order: None, limit: None, ..query.clone() }));

        let request = self
            .http
            .request(Method::GET, url)
            .query(&params)
            .header("Prefer", "count=exact")
            .header("Range-Unit", "items")
            .header(RANGE, "0-0");
        let response = self.http.send(request).await?;

        // An empty table answers 416 with `*/0`
        if response.status() != StatusCode::RANGE_NOT_SATISFIABLE {
            return parse_content_range(&check_status(response, &query.collection).await?);
        }
        parse_content_range(&response)
    }

    #[instrument(skip(self, record))]
    async fn insert_or_update(&self, collection: &str, record: Record) -> Result<()> {
        let url = self.collection_url(collection)?;
        let request = self
            .http
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&Value::Object(record));

        let response = self.http.send(request).await?;
        check_status(response, collection).await?;
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| InterconnectError::Config("gateway api_key is not a valid header value".into()))
}

/// PostgREST horizontal filtering parameters for `query`
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = query
        .filters
        .iter()
        .map(|filter| match filter {
            Filter::Eq(field, Value::Null) | Filter::IsNull(field) => {
                (field.clone(), "is.null".to_string())
            }
            Filter::Eq(field, value) => (field.clone(), format!("eq.{}", literal(value))),
            Filter::Gte(field, value) => (field.clone(), format!("gte.{}", literal(value))),
            Filter::Lte(field, value) => (field.clone(), format!("lte.{}", literal(value))),
            Filter::In(field, values) => {
                let list: Vec<String> = values.iter().map(list_item).collect();
                (field.clone(), format!("in.({})", list.join(",")))
            }
        })
        .collect();

    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.field)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list_item(value: &Value) -> String {
    let raw = literal(value);
    if raw.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", raw.replace('"', "\\\""))
    } else {
        raw
    }
}

async fn check_status(response: Response, collection: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: PostgrestErrorBody = serde_json::from_str(&text).unwrap_or_default();
    Err(classify_failure(status, &body, collection))
}

fn classify_failure(status: StatusCode, body: &PostgrestErrorBody, collection: &str) -> InterconnectError {
    let message = body
        .message
        .clone()
        .or_else(|| body.details.clone())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());

    let schema_code = body.code.as_deref().is_some_and(|code| SCHEMA_ERROR_CODES.contains(&code));
    if schema_code || status == StatusCode::NOT_FOUND {
        let field = missing_column(&message).unwrap_or_else(|| "*".to_string());
        return InterconnectError::schema_mismatch(collection, field);
    }

    let message = format!("HTTP {}: {message}", status.as_u16());
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        InterconnectError::Network(message)
    } else {
        InterconnectError::Gateway(message)
    }
}

/// Column named in messages like `column events.event_date does not exist`
/// or `Could not find the 'event_date' column of 'events'`
fn missing_column(message: &str) -> Option<String> {
    if let Some(rest) = message.split("column ").nth(1) {
        let token = rest.split_whitespace().next()?;
        let name = token.rsplit('.').next()?.trim_matches(|c| c == '"' || c == '\'');
        if !name.is_empty() && !message.contains("Could not find") {
            return Some(name.to_string());
        }
    }
    let quoted = message.split('\'').nth(1)?;
    message.contains(" column ").then(|| quoted.to_string())
}

fn parse_content_range(response: &Response) -> Result<u64> {
    let header = response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| InterconnectError::Gateway("count response without Content-Range".into()))?;

    header
        .rsplit('/')
        .next()
        .and_then(|total| total.trim().parse::<u64>().ok())
        .ok_or_else(|| InterconnectError::Gateway(format!("unparseable Content-Range: {header}")))
}
