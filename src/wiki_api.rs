use std::{
    cell::Cell,
    collections::BTreeMap,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    definitions::{ApiErrorBody, ApiException},
    endpoint::WikiaConfig,
    errors::{RequestError, Result, WikiaError},
    reqwest_client::{RustClient, Transport},
};

/// Client for one wiki host. Holds the endpoint configuration and the
/// transport used to reach it.
///
/// Cloning is cheap and clones share the rate limit clock, which is how pages
/// keep talking to the wiki they were resolved on.
#[derive(Debug, Clone)]
pub struct Wikia<T = RustClient> {
    config: WikiaConfig,
    transport: T,
    last_request: Rc<Cell<Option<Instant>>>,
}

impl Wikia<RustClient> {
    /// English main site over a blocking reqwest client.
    pub fn new() -> Result<Self> {
        Self::with_config(WikiaConfig::default())
    }

    pub fn with_config(config: WikiaConfig) -> Result<Self> {
        let transport = RustClient::new(config.user_agent())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Wikia<T> {
    pub fn with_transport(config: WikiaConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            last_request: Rc::new(Cell::new(None)),
        }
    }

    pub fn config(&self) -> &WikiaConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_language(&mut self, code: &str) -> Result<()> {
        self.config.set_language(code)
    }

    pub fn set_sub_site(&mut self, name: &str) {
        self.config.set_sub_site(name)
    }

    pub fn clear_sub_site(&mut self) {
        self.config.clear_sub_site()
    }

    pub fn set_rate_limit(&mut self, rate_limit: Option<Duration>) {
        self.config.set_rate_limit(rate_limit)
    }

    pub fn api_url(&self) -> String {
        self.config.api_url()
    }

    /// Send one request to the API and hand back the decoded body.
    ///
    /// `format=json` is always added. Nothing is cached; every call goes out.
    ///
    /// # Returns
    /// - Ok(Value) -> The decoded JSON body.
    /// - Err(Api) -> The body carried an `error` or `exception` payload.
    /// - Err(Request) -> Transport failure, bad status or undecodable body.
    pub fn request<I, K, V>(&self, params: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        params.insert("format".to_string(), "json".to_string());

        let url = self.config.parsed_api_url()?;
        self.wait_for_rate_limit();
        log::debug!(
            "GET {}?{}",
            url,
            params.iter().map(|(k, v)| format!("{}={}", k, v)).join("&")
        );

        let response = self.transport.get(&url, &params);
        self.last_request.set(Some(Instant::now()));
        let response = response?;

        let body: Value = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(_) if !response.is_success() => {
                return Err(RequestError::Status(response.status).into());
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(err) = api_error(&body) {
            log::debug!("API reported an error: {}", err);
            return Err(err);
        }
        if !response.is_success() {
            return Err(RequestError::Status(response.status).into());
        }
        Ok(body)
    }

    /// [`Wikia::request`] followed by decoding into a response struct.
    pub(crate) fn query<R, I, K, V>(&self, params: I) -> Result<R>
    where
        R: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(serde_json::from_value(self.request(params)?)?)
    }

    fn wait_for_rate_limit(&self) {
        let (Some(limit), Some(last)) = (self.config.rate_limit(), self.last_request.get()) else {
            return;
        };
        let elapsed = last.elapsed();
        if elapsed < limit {
            let wait = limit - elapsed;
            log::debug!("Rate limited, sleeping for {:?}", wait);
            thread::sleep(wait);
        }
    }
}

/// Pull an error payload out of a decoded body, if there is one.
fn api_error(body: &Value) -> Option<WikiaError> {
    if let Some(error) = body.get("error") {
        return Some(match serde_json::from_value::<ApiErrorBody>(error.clone()) {
            Ok(error) => WikiaError::api(error.code, error.info),
            Err(_) => WikiaError::api("", error.to_string()),
        });
    }
    if let Some(exception) = body.get("exception") {
        return Some(match serde_json::from_value::<ApiException>(exception.clone()) {
            Ok(exception) => {
                let code = match exception.code {
                    Value::String(code) => code,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                WikiaError::api(code, exception.message)
            }
            Err(_) => WikiaError::api("", exception.to_string()),
        });
    }
    None
}
