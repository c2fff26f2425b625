//! Error types for the wikia client.
//!
//! Every public operation returns [`Result<T>`]. The variants mirror where a
//! call can go wrong:
//! - `Request` - the HTTP exchange itself failed, or the body was not the JSON
//!    we expected.
//! - `Api` - the remote API answered with its own error payload.
//! - `Page` - the requested title or page id does not exist.
//! - `Redirect` - a redirect was hit while the caller asked not to follow them.
//! - `Disambiguation` - the title resolves to a disambiguation page.
//! - `Config` - an invalid language code or builder setting.

use std::error::Error;
use std::fmt;

/// The canonical result type used across the crate.
pub type Result<T> = std::result::Result<T, WikiaError>;

/// Everything that can fail while talking to the transport.
#[derive(Debug)]
pub enum RequestError {
    /// Network, TLS or timeout failure reported by reqwest.
    Http(reqwest::Error),
    /// Non-success status code without an API error payload.
    Status(u16),
    /// The body could not be decoded as JSON.
    Decode(serde_json::Error),
    /// The JSON decoded but did not have the layout we rely on.
    Shape(String),
}

/// What a failed page lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Title(String),
    Id(u64),
}

#[derive(Debug)]
pub enum WikiaError {
    Request(RequestError),
    Api {
        code: String,
        info: String,
    },
    Page(PageRef),
    Redirect {
        title: String,
        /// Only known when the API reported where the redirect points.
        target: Option<String>,
    },
    Disambiguation {
        title: String,
    },
    Config(String),
}

impl WikiaError {
    /// Construct an error for JSON that decoded but had an unexpected layout.
    pub fn shape<S: Into<String>>(msg: S) -> Self {
        WikiaError::Request(RequestError::Shape(msg.into()))
    }

    /// Construct an API error from the payload's code and message.
    pub fn api<C: Into<String>, I: Into<String>>(code: C, info: I) -> Self {
        WikiaError::Api {
            code: code.into(),
            info: info.into(),
        }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        WikiaError::Config(msg.into())
    }

    /// Returns a short, user-friendly description of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WikiaError::Request(_) => "RequestError",
            WikiaError::Api { .. } => "ApiError",
            WikiaError::Page(_) => "PageError",
            WikiaError::Redirect { .. } => "RedirectError",
            WikiaError::Disambiguation { .. } => "DisambiguationError",
            WikiaError::Config(_) => "ConfigError",
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Title(title) => write!(f, "{:?}", title),
            PageRef::Id(id) => write!(f, "page id {}", id),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Http(e) => write!(f, "HTTP request failed: {}", e),
            RequestError::Status(code) => write!(f, "API responded with status {}", code),
            RequestError::Decode(e) => write!(f, "failed to decode API response: {}", e),
            RequestError::Shape(msg) => write!(f, "unexpected API response: {}", msg),
        }
    }
}

impl fmt::Display for WikiaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiaError::Request(e) => write!(f, "{}", e),
            WikiaError::Api { code, info } => {
                if code.is_empty() {
                    write!(f, "API error: {}", info)
                } else {
                    write!(f, "API error ({}): {}", code, info)
                }
            }
            WikiaError::Page(page) => write!(f, "{} does not match any pages", page),
            WikiaError::Redirect { title, target } => match target {
                Some(target) => write!(
                    f,
                    "{:?} redirects to {:?}; set redirect to follow it",
                    title, target
                ),
                None => write!(
                    f,
                    "{:?} is a redirect; set redirect to follow it",
                    title
                ),
            },
            WikiaError::Disambiguation { title } => {
                write!(f, "{:?} may refer to several pages", title)
            }
            WikiaError::Config(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl Error for RequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RequestError::Http(e) => Some(e),
            RequestError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl Error for WikiaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WikiaError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RequestError> for WikiaError {
    fn from(value: RequestError) -> Self {
        Self::Request(value)
    }
}
impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}
impl From<reqwest::Error> for WikiaError {
    fn from(value: reqwest::Error) -> Self {
        Self::Request(RequestError::from(value))
    }
}
impl From<serde_json::Error> for WikiaError {
    fn from(value: serde_json::Error) -> Self {
        Self::Request(RequestError::Decode(value))
    }
}
