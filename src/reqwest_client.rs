use std::collections::BTreeMap;

use url::Url;

use crate::errors::RequestError;

/// Raw answer from the transport, before any JSON decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a GET request to `url` with `params` as the query string.
///
/// The client never deals with connections or TLS itself; anything that can
/// turn a url and a parameter map into a response body can stand in here.
pub trait Transport {
    fn get(&self, url: &Url, params: &BTreeMap<String, String>)
    -> Result<HttpResponse, RequestError>;
}

/// Custom struct as a wrapper around the blocking reqwest client.
#[derive(Debug, Clone)]
pub struct RustClient(pub reqwest::blocking::Client);

impl RustClient {
    /// Create a new blocking client.
    ///
    /// # Arguments
    /// - user_agent -> User agent to tell the server about.
    ///
    /// # Returns
    /// - Ok(RustClient) -> A client to use for every request.
    /// - Err(RequestError) -> reqwest failed to set up TLS or the agent header.
    pub fn new(user_agent: &str) -> Result<Self, RequestError> {
        let client = reqwest::blocking::ClientBuilder::new()
            .user_agent(user_agent)
            .build()?;
        Ok(Self(client))
    }
}

impl Transport for RustClient {
    fn get(
        &self,
        url: &Url,
        params: &BTreeMap<String, String>,
    ) -> Result<HttpResponse, RequestError> {
        let response = self.0.get(url.clone()).query(params).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}
