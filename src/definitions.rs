use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Top level of an `action=query` answer.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct QueryResponse {
    pub query: Option<Query>,
    /// Members to merge into the next request when a prop list is cut short.
    #[serde(rename = "continue")]
    pub continuation: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Query {
    #[serde(default)]
    pub normalized: Vec<TitleChange>,
    #[serde(default)]
    pub redirects: Vec<TitleChange>,
    /// Keyed by page id, `-1` style keys for missing pages.
    #[serde(default)]
    pub pages: HashMap<String, PageEntry>,
    #[serde(default)]
    pub search: Vec<TitleEntry>,
    pub searchinfo: Option<SearchInfo>,
    #[serde(default)]
    pub random: Vec<TitleEntry>,
}

/// One `from` -> `to` hop, used for both normalization and redirects.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TitleChange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TitleEntry {
    pub title: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct SearchInfo {
    pub suggestion: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct PageEntry {
    pub pageid: Option<u64>,
    #[serde(default)]
    pub title: String,
    pub fullurl: Option<String>,
    /// Present (as an empty string) when the page does not exist.
    pub missing: Option<String>,
    /// Present when the title can never exist.
    pub invalid: Option<String>,
    /// Present when the page is itself a redirect that was not followed.
    pub redirect: Option<String>,
    pub pageprops: Option<HashMap<String, Value>>,
    pub extract: Option<String>,
    pub revisions: Option<Vec<Revision>>,
    pub imageinfo: Option<Vec<ImageInfo>>,
    pub extlinks: Option<Vec<ExtLink>>,
    pub links: Option<Vec<TitleEntry>>,
    pub categories: Option<Vec<TitleEntry>>,
}

impl PageEntry {
    pub fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|props| props.contains_key("disambiguation"))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Revision {
    pub revid: Option<u64>,
    pub parentid: Option<u64>,
    /// Parsed or raw body, depending on `rvparse`.
    #[serde(rename = "*")]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageInfo {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtLink {
    #[serde(rename = "*")]
    pub url: String,
}

/// Top level of an `action=parse` answer.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ParseResponse {
    pub parse: Option<Parse>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Parse {
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Section {
    pub line: String,
    pub level: Option<String>,
}

/// `{"error": {"code": .., "info": ..}}` as sent by api.php.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// `{"exception": {"message": .., "code": ..}}` as sent by the v1 endpoints.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiException {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Value,
}
