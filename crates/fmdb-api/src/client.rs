// Document store HTTP client
//
// Wraps `reqwest::Client` with document URL construction, optional basic
// auth, and classification of the store's `{error, reason}` bodies. Nothing
// here retries; every failure goes back to the caller.

use std::time::Duration;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{FindResponse, StoreErrorBody, UpsertResponse};
use crate::query::FindQuery;
use crate::transport::TransportConfig;

/// Longest slice of a response body kept inside an error.
const BODY_PREVIEW_CHARS: usize = 200;

/// HTTP basic credentials for the store.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

impl BasicAuth {
    /// Credentials are only sent when both halves are non-empty.
    fn is_usable(&self) -> bool {
        !self.username.is_empty() && !self.password.expose_secret().is_empty()
    }
}

/// Raw HTTP client for a CouchDB-compatible document store.
///
/// Collections map to databases (`{base}/{collection}`), documents to
/// `{base}/{collection}/{id}`. All IDs are pushed as path segments, so they
/// are percent-encoded and can never escape their collection.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Option<BasicAuth>,
    timeout: Option<Duration>,
}

impl StoreClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the store root, e.g. `https://couch.example.edu:6984`.
    pub fn new(
        base_url: Url,
        auth: Option<BasicAuth>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, base_url, auth)?;
        client.timeout = Some(transport.timeout);
        Ok(client)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        auth: Option<BasicAuth>,
    ) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::UnsupportedBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            auth: auth.filter(BasicAuth::is_usable),
            timeout: None,
        })
    }

    /// The store base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn url_for(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::UnsupportedBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `{base}/{collection}`
    pub fn collection_url(&self, collection: &str) -> Result<Url, Error> {
        self.url_for(&[collection])
    }

    /// `{base}/{collection}/{id}[?rev={rev}]`
    pub fn document_url(
        &self,
        collection: &str,
        id: &str,
        rev: Option<&str>,
    ) -> Result<Url, Error> {
        let mut url = self.url_for(&[collection, id])?;
        if let Some(rev) = rev {
            url.query_pairs_mut().append_pair("rev", rev);
        }
        Ok(url)
    }

    // ── Core request path ────────────────────────────────────────────

    /// Send one request and decode a 2xx body into `T`.
    ///
    /// Non-2xx responses are decoded as `{error, reason}` and classified;
    /// anything else becomes `Error::UnexpectedStatus`.
    pub async fn execute<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        debug!(%method, path = url.path(), "document store request");

        let mut builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(auth) = &self.auth {
            builder = builder.basic_auth(&auth.username, Some(auth.password.expose_secret()));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(status = status.as_u16(), bytes = text.len(), "document store response");

        if !status.is_success() {
            return Err(match serde_json::from_str::<StoreErrorBody>(&text) {
                Ok(err) => Error::from_store(&err.error, err.reason),
                Err(_) => Error::UnexpectedStatus {
                    status: status.as_u16(),
                    body: preview(&text),
                },
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            // A 2xx body that is really an error payload still gets classified.
            match serde_json::from_str::<StoreErrorBody>(&text) {
                Ok(err) => Error::from_store(&err.error, err.reason),
                Err(_) => Error::Deserialization {
                    message: format!("{e} (body preview: {:?})", preview(&text)),
                    body: text.clone(),
                },
            }
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.map_or(0, |t| t.as_secs()),
            }
        } else {
            Error::Transport(err)
        }
    }

    // ── Document operations ──────────────────────────────────────────

    /// `GET /{collection}/{id}`
    pub async fn get_document<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<T, Error> {
        let url = self.document_url(collection, id, None)?;
        self.execute(Method::GET, url, None::<&()>).await
    }

    /// `POST /{collection}`: insert a new document. The document's own `_id`
    /// decides where it lands; a taken ID answers `Conflict`.
    pub async fn create_document<B: Serialize + ?Sized + Sync>(
        &self,
        collection: &str,
        doc: &B,
    ) -> Result<UpsertResponse, Error> {
        let url = self.collection_url(collection)?;
        self.execute(Method::POST, url, Some(doc)).await
    }

    /// `PUT /{collection}/{id}?rev={rev}`: replace a document. A stale or
    /// missing revision answers `Conflict`.
    pub async fn replace_document<B: Serialize + ?Sized + Sync>(
        &self,
        collection: &str,
        id: &str,
        rev: Option<&str>,
        doc: &B,
    ) -> Result<UpsertResponse, Error> {
        let url = self.document_url(collection, id, rev)?;
        self.execute(Method::PUT, url, Some(doc)).await
    }

    /// `DELETE /{collection}/{id}?rev={rev}`
    pub async fn delete_document(
        &self,
        collection: &str,
        id: &str,
        rev: &str,
    ) -> Result<UpsertResponse, Error> {
        let url = self.document_url(collection, id, Some(rev))?;
        self.execute(Method::DELETE, url, None::<&()>).await
    }

    /// `POST /{collection}/_find`
    pub async fn find<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &FindQuery,
    ) -> Result<FindResponse<T>, Error> {
        let url = self.url_for(&[collection, "_find"])?;
        self.execute(Method::POST, url, Some(query)).await
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> StoreClient {
        StoreClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap(), None).unwrap()
    }

    #[test]
    fn document_url_encodes_id_and_rev() {
        let c = client("http://couch:5984");
        let url = c.document_url("devices", "BLDG-101 CP1", Some("2-abc")).unwrap();
        assert_eq!(url.as_str(), "http://couch:5984/devices/BLDG-101%20CP1?rev=2-abc");
    }

    #[test]
    fn base_path_is_preserved() {
        let c = client("http://proxy/couch/");
        let url = c.collection_url("rooms").unwrap();
        assert_eq!(url.as_str(), "http://proxy/couch/rooms");
    }

    #[test]
    fn empty_credentials_are_dropped() {
        let auth = BasicAuth {
            username: "admin".into(),
            password: SecretString::from(String::new()),
        };
        let c = StoreClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://couch:5984").unwrap(),
            Some(auth),
        )
        .unwrap();
        assert!(c.auth.is_none());
    }

    #[test]
    fn rejects_cannot_be_a_base_url() {
        let err = StoreClient::with_client(
            reqwest::Client::new(),
            Url::parse("mailto:ops@example.edu").unwrap(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedBaseUrl(_)));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }
}
