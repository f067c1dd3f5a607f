//! HTTP client for one remote table.
//!
//! The endpoint URL names the table and carries a SAS token as its query
//! string, e.g. `https://acct.table.core.windows.net/users?sv=..&sig=..`.

use std::fmt;

use chrono::{DateTime, Utc};
use percent_encoding::utf8_percent_encode;
use reqwest::header::{ACCEPT, HeaderMap, IF_MATCH};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::StoreError;
use crate::infra::codec::Entity;
use crate::infra::filter::{Filter, QUERY_COMPONENT};
use crate::infra::store::TableStore;

pub const ACCEPT_NO_METADATA: &str = "application/json;odata=nometadata";
pub const API_VERSION: &str = "2019-02-02";
pub const API_VERSION_HEADER: &str = "x-ms-version";
pub const CONTINUATION_PARTITION_HEADER: &str = "x-ms-continuation-NextPartitionKey";
pub const CONTINUATION_ROW_HEADER: &str = "x-ms-continuation-NextRowKey";

/// Table URL with its embedded access signature.
#[derive(Clone)]
pub struct TableEndpoint {
    url: Url,
    table: String,
}

impl TableEndpoint {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let url = Url::parse(raw)
            .map_err(|e| StoreError::Config(format!("invalid table endpoint: {e}")))?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(StoreError::Config(format!(
                "table endpoint must be http(s), got {}",
                url.scheme()
            )));
        }
        let table = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| StoreError::Config("table endpoint has no table name".to_owned()))?;
        Ok(Self { url, table })
    }

    /// Build `{account_url}/{table}?{sas_token}`.
    pub fn from_account(account_url: &str, table: &str, sas_token: &str) -> Result<Self, StoreError> {
        let base = account_url.trim_end_matches('/');
        let sas = sas_token.trim_start_matches('?');
        Self::parse(&format!("{base}/{table}?{sas}"))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Signed expiry (`se`) of the embedded token, when it carries one.
    pub fn signature_expiry(&self) -> Option<DateTime<Utc>> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == "se")
            .and_then(|(_, value)| DateTime::parse_from_rfc3339(&value).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn collection_url(&self) -> Url {
        self.url.clone()
    }

    fn entity_url(&self, partition_key: &str, row_key: &str) -> Url {
        let mut url = self.url.clone();
        let path = format!(
            "{}(PartitionKey='{}',RowKey='{}')",
            self.url.path(),
            encode_key(partition_key),
            encode_key(row_key)
        );
        url.set_path(&path);
        url
    }

    fn query_url(&self, filter: Option<&Filter>, continuation: Option<&Continuation>) -> Url {
        let mut url = self.url.clone();
        let mut query = url.query().unwrap_or_default().to_owned();
        let mut push = |key: &str, value: String| {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(key);
            query.push('=');
            query.push_str(&value);
        };
        if let Some(filter) = filter {
            push("$filter", filter.to_query_component());
        }
        if let Some(next) = continuation {
            push("NextPartitionKey", encode_component(&next.partition_key));
            if let Some(row_key) = &next.row_key {
                push("NextRowKey", encode_component(row_key));
            }
        }
        url.set_query(Some(&query));
        url
    }
}

// The query string holds the signature, so only the table and host are shown.
impl fmt::Debug for TableEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEndpoint")
            .field("host", &self.url.host_str())
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}

fn encode_key(key: &str) -> String {
    encode_component(&key.replace('\'', "''"))
}

struct Continuation {
    partition_key: String,
    row_key: Option<String>,
}

impl Continuation {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Some(Self {
            partition_key: header(CONTINUATION_PARTITION_HEADER)?,
            row_key: header(CONTINUATION_ROW_HEADER),
        })
    }
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    value: Vec<Value>,
}

/// Client for one remote table.
#[derive(Debug, Clone)]
pub struct TableClient {
    http: Client,
    endpoint: TableEndpoint,
}

impl TableClient {
    pub fn new(http: Client, endpoint: TableEndpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &TableEndpoint {
        &self.endpoint
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(ACCEPT, ACCEPT_NO_METADATA)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(|e| {
            StoreError::Unavailable(format!(
                "{operation} {}: {}",
                self.endpoint.table(),
                e.without_url()
            ))
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        debug!(
            table = self.endpoint.table(),
            operation,
            status = status.as_u16(),
            "table request rejected"
        );
        Err(status_error(status))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
        operation: &'static str,
    ) -> Result<T, StoreError> {
        response.json::<T>().await.map_err(|e| {
            StoreError::Unavailable(format!(
                "{operation} {}: malformed response body: {}",
                self.endpoint.table(),
                e.without_url()
            ))
        })
    }
}

/// Map a non-success status to the store's error taxonomy.
pub fn status_error(status: StatusCode) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized,
        StatusCode::NOT_FOUND => StoreError::NotFound,
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => StoreError::Conflict,
        other => StoreError::Unavailable(format!("unexpected status {other}")),
    }
}

impl TableStore for TableClient {
    fn table_name(&self) -> &str {
        self.endpoint.table()
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Option<Entity>, StoreError> {
        let url = self.endpoint.entity_url(partition_key, row_key);
        let response = match self.send(self.request(Method::GET, url), "get").await {
            Ok(response) => response,
            Err(StoreError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };
        let body: Value = self.read_json(response, "get").await?;
        Entity::from_wire(body).map(Some)
    }

    async fn list(&self, filter: Option<&Filter>) -> Result<Vec<Entity>, StoreError> {
        let mut entities = Vec::new();
        let mut continuation = None;
        loop {
            let url = self.endpoint.query_url(filter, continuation.as_ref());
            let response = self.send(self.request(Method::GET, url), "list").await?;
            continuation = Continuation::from_headers(response.headers());
            let page: ListResponse = self.read_json(response, "list").await?;
            for value in page.value {
                entities.push(Entity::from_wire(value)?);
            }
            if continuation.is_none() {
                break;
            }
        }
        Ok(entities)
    }

    async fn insert(&self, entity: &Entity) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, self.endpoint.collection_url())
            .header("Prefer", "return-no-content")
            .json(&entity.to_wire());
        self.send(request, "insert").await.map(drop)
    }

    async fn replace(&self, entity: &Entity) -> Result<(), StoreError> {
        let url = self
            .endpoint
            .entity_url(&entity.partition_key, &entity.row_key);
        let request = self
            .request(Method::PUT, url)
            .header(IF_MATCH, "*")
            .json(&entity.to_wire());
        self.send(request, "replace").await.map(drop)
    }

    async fn delete(&self, partition_key: &str, row_key: &str) -> Result<(), StoreError> {
        let url = self.endpoint.entity_url(partition_key, row_key);
        let request = self.request(Method::DELETE, url).header(IF_MATCH, "*");
        match self.send(request, "delete").await {
            Ok(_) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
