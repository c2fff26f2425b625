use std::time::Duration;

use derive_builder::Builder;
use lazy_regex::regex_is_match;
use url::Url;

use crate::errors::{Result, WikiaError};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_USER_AGENT: &str = "wikia-rs (https://crates.io/crates/wikia)";

/// Where requests go and how they are sent.
///
/// Build one with [`WikiaConfigBuilder`]; every field has a default so
/// `WikiaConfigBuilder::default().build()` gives the english main site.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct WikiaConfig {
    #[builder(default = "DEFAULT_LANGUAGE.to_string()", setter(into))]
    language: String,
    /// `None` means the main site.
    #[builder(default, setter(custom))]
    sub_site: Option<String>,
    #[builder(default = "DEFAULT_USER_AGENT.to_string()", setter(into))]
    user_agent: String,
    /// Minimum wait between two requests.
    #[builder(default, setter(strip_option))]
    rate_limit: Option<Duration>,
}

impl WikiaConfigBuilder {
    /// Same rules as [`WikiaConfig::set_sub_site`]: a blank name means the main site.
    pub fn sub_site<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.sub_site = Some(non_blank(name.into()));
        self
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(language) = &self.language
            && !is_valid_language(language)
        {
            return Err(format!("{:?} is not a lowercase language code", language));
        }
        Ok(())
    }
}

impl From<WikiaConfigBuilderError> for WikiaError {
    fn from(value: WikiaConfigBuilderError) -> Self {
        WikiaError::config(value.to_string())
    }
}

impl Default for WikiaConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            sub_site: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit: None,
        }
    }
}

fn non_blank(name: String) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn is_valid_language(code: &str) -> bool {
    regex_is_match!(r"^[a-z]+(-[a-z]+)*$", code)
}

impl WikiaConfig {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn sub_site(&self) -> Option<&str> {
        self.sub_site.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn rate_limit(&self) -> Option<Duration> {
        self.rate_limit
    }

    /// Switch the language of every following request.
    ///
    /// # Arguments
    /// - code -> A non-empty lowercase locale code, e.g. `fr` or `zh-hans`.
    ///
    /// # Returns
    /// - Err(Config) -> The code was rejected and nothing changed.
    pub fn set_language(&mut self, code: &str) -> Result<()> {
        if !is_valid_language(code) {
            return Err(WikiaError::config(format!(
                "{:?} is not a lowercase language code",
                code
            )));
        }
        self.language = code.to_string();
        Ok(())
    }

    /// Route requests to a sub-wikia. An empty name goes back to the main site.
    pub fn set_sub_site(&mut self, name: &str) {
        self.sub_site = non_blank(name.to_string());
    }

    pub fn clear_sub_site(&mut self) {
        self.sub_site = None;
    }

    pub fn set_rate_limit(&mut self, rate_limit: Option<Duration>) {
        self.rate_limit = rate_limit;
    }

    /// The base API url for the current language and sub-site.
    ///
    /// Sub-wikias live under `.com`, the main site under `.org`.
    pub fn api_url(&self) -> String {
        match &self.sub_site {
            Some(sub_site) => format!("http://{}.{}.wikia.com/api/v1", self.language, sub_site),
            None => format!("http://{}.wikia.org/api/v1", self.language),
        }
    }

    pub(crate) fn parsed_api_url(&self) -> Result<Url> {
        let raw = self.api_url();
        Url::parse(&raw).map_err(|e| WikiaError::config(format!("{:?}: {}", raw, e)))
    }
}
