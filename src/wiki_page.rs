use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use lazy_regex::{regex, regex_replace};
use once_cell::unsync::OnceCell;
use serde_json::Value;

use crate::{
    definitions::{PageEntry, ParseResponse, QueryResponse},
    errors::{Result, WikiaError},
    reqwest_client::{RustClient, Transport},
    wiki_api::Wikia,
};

/// Plain text plus the revision it was taken from. One request fills all three.
#[derive(Debug, Clone)]
struct PageText {
    content: String,
    revision_id: u64,
    parent_id: Option<u64>,
}

/// A resolved wiki page.
///
/// Only the identity (title, id, url) is known up front. Every other field is
/// fetched the first time it is asked for and kept for the life of the page.
/// A failed fetch leaves nothing behind, so asking again retries.
pub struct WikiaPage<T = RustClient> {
    title: String,
    page_id: u64,
    url: String,
    client: Wikia<T>,
    text: OnceCell<PageText>,
    summary: OnceCell<String>,
    images: OnceCell<HashSet<String>>,
    references: OnceCell<Vec<String>>,
    links: OnceCell<Vec<String>>,
    categories: OnceCell<Vec<String>>,
    html: OnceCell<String>,
    sections: OnceCell<Vec<String>>,
    section_text: OnceCell<HashMap<String, String>>,
}

impl<T: Transport> WikiaPage<T> {
    pub(crate) fn new(client: Wikia<T>, title: String, page_id: u64, url: String) -> Self {
        Self {
            title,
            page_id,
            url,
            client,
            text: OnceCell::new(),
            summary: OnceCell::new(),
            images: OnceCell::new(),
            references: OnceCell::new(),
            links: OnceCell::new(),
            categories: OnceCell::new(),
            html: OnceCell::new(),
            sections: OnceCell::new(),
            section_text: OnceCell::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_id(&self) -> u64 {
        self.page_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Load content, summary, images, references, links and sections now
    /// instead of on first access.
    pub fn preload(&self) -> Result<()> {
        log::debug!("Preloading {:?}", self.title);
        self.content()?;
        self.summary()?;
        self.images()?;
        self.references()?;
        self.links()?;
        self.sections()?;
        Ok(())
    }

    /// `action=query` scoped to this page, plus `extra`.
    fn scoped(&self, extra: &[(&str, &str)]) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.insert("action".to_string(), "query".to_string());
        params.insert("titles".to_string(), self.title.clone());
        params
    }

    /// One request, one page entry back.
    fn single_query(&self, extra: &[(&str, &str)]) -> Result<PageEntry> {
        let response: QueryResponse = self.client.query(self.scoped(extra))?;
        let mut pages = response
            .query
            .ok_or_else(|| WikiaError::shape(format!("no query block for {:?}", self.title)))?
            .pages;
        let key = self.page_id.to_string();
        match pages.remove(&key) {
            Some(entry) => Ok(entry),
            None => pages
                .into_values()
                .next()
                .ok_or_else(|| WikiaError::shape(format!("no page entry for {:?}", self.title))),
        }
    }

    /// Keep requesting while the API hands back a `continue` object, merging
    /// it into the next request. Returns every page entry seen.
    fn continued_query(&self, extra: &[(&str, &str)]) -> Result<Vec<PageEntry>> {
        let mut entries = vec![];
        let mut last_continue: HashMap<String, Value> = HashMap::new();
        loop {
            let mut params = self.scoped(extra);
            for (key, value) in &last_continue {
                params.insert(key.clone(), continue_value(value));
            }

            let response: QueryResponse = self.client.query(params)?;
            let Some(query) = response.query else {
                break;
            };
            entries.extend(query.pages.into_values());

            match response.continuation {
                Some(next) if next == last_continue => {
                    return Err(WikiaError::shape(format!(
                        "continuation for {:?} did not advance",
                        self.title
                    )));
                }
                Some(next) => last_continue = next,
                None => break,
            }
        }
        Ok(entries)
    }

    fn page_text(&self) -> Result<&PageText> {
        self.text.get_or_try_init(|| {
            let entry = self.single_query(&[
                ("prop", "extracts|revisions"),
                ("explaintext", ""),
                ("rvprop", "ids"),
            ])?;
            let revision = entry
                .revisions
                .and_then(|revisions| revisions.into_iter().next())
                .ok_or_else(|| WikiaError::shape(format!("no revision for {:?}", self.title)))?;
            Ok(PageText {
                content: entry.extract.unwrap_or_default(),
                revision_id: revision
                    .revid
                    .ok_or_else(|| WikiaError::shape("revision without revid"))?,
                parent_id: revision.parentid,
            })
        })
    }

    /// Plain text content, without images or tables.
    pub fn content(&self) -> Result<&str> {
        Ok(&self.page_text()?.content)
    }

    pub fn revision_id(&self) -> Result<u64> {
        Ok(self.page_text()?.revision_id)
    }

    /// Revision id of the edit before the current one, if there is one.
    pub fn parent_id(&self) -> Result<Option<u64>> {
        Ok(self.page_text()?.parent_id)
    }

    /// Plain text of the intro section.
    pub fn summary(&self) -> Result<&str> {
        self.summary
            .get_or_try_init(|| {
                let entry =
                    self.single_query(&[("prop", "extracts"), ("explaintext", ""), ("exintro", "")])?;
                Ok(entry.extract.unwrap_or_default())
            })
            .map(String::as_str)
    }

    /// Urls of every image on the page.
    pub fn images(&self) -> Result<&HashSet<String>> {
        self.images.get_or_try_init(|| {
            Ok(self
                .continued_query(&[
                    ("generator", "images"),
                    ("gimlimit", "max"),
                    ("prop", "imageinfo"),
                    ("iiprop", "url"),
                ])?
                .into_iter()
                .filter_map(|entry| entry.imageinfo)
                .flatten()
                .map(|info| info.url)
                .collect())
        })
    }

    /// External urls linked from the page, in page order.
    pub fn references(&self) -> Result<&[String]> {
        self.references
            .get_or_try_init(|| {
                Ok(self
                    .continued_query(&[("prop", "extlinks"), ("ellimit", "max")])?
                    .into_iter()
                    .filter_map(|entry| entry.extlinks)
                    .flatten()
                    .map(|link| link.url)
                    .collect())
            })
            .map(Vec::as_slice)
    }

    /// Titles of the articles this page links to.
    pub fn links(&self) -> Result<&[String]> {
        self.links
            .get_or_try_init(|| {
                Ok(self
                    .continued_query(&[("prop", "links"), ("plnamespace", "0"), ("pllimit", "max")])?
                    .into_iter()
                    .filter_map(|entry| entry.links)
                    .flatten()
                    .map(|link| link.title)
                    .collect())
            })
            .map(Vec::as_slice)
    }

    /// Categories the page belongs to, without the `Category:` prefix.
    pub fn categories(&self) -> Result<&[String]> {
        self.categories
            .get_or_try_init(|| {
                Ok(self
                    .continued_query(&[("prop", "categories"), ("cllimit", "max")])?
                    .into_iter()
                    .filter_map(|entry| entry.categories)
                    .flatten()
                    .map(|category| regex_replace!(r"^Category:", &category.title, "").to_string())
                    .collect())
            })
            .map(Vec::as_slice)
    }

    /// Rendered HTML of the latest revision.
    pub fn html(&self) -> Result<&str> {
        self.html
            .get_or_try_init(|| {
                let entry = self.single_query(&[
                    ("prop", "revisions"),
                    ("rvprop", "content"),
                    ("rvlimit", "1"),
                    ("rvparse", ""),
                ])?;
                entry
                    .revisions
                    .and_then(|revisions| revisions.into_iter().next())
                    .and_then(|revision| revision.body)
                    .ok_or_else(|| WikiaError::shape(format!("no html for {:?}", self.title)))
            })
            .map(String::as_str)
    }

    /// Section headings in page order.
    pub fn sections(&self) -> Result<&[String]> {
        self.sections
            .get_or_try_init(|| {
                let response: ParseResponse = self.client.query([
                    ("action", "parse".to_string()),
                    ("prop", "sections".to_string()),
                    ("pageid", self.page_id.to_string()),
                ])?;
                let parse = response
                    .parse
                    .ok_or_else(|| WikiaError::shape(format!("no parse block for {:?}", self.title)))?;
                Ok(parse.sections.into_iter().map(|section| section.line).collect())
            })
            .map(Vec::as_slice)
    }

    /// Plain text of the section titled `heading`, or `None` when the page
    /// has no such section.
    pub fn section(&self, heading: &str) -> Result<Option<&str>> {
        let sections = self
            .section_text
            .get_or_try_init(|| Ok::<_, WikiaError>(split_sections(self.content()?)))?;
        Ok(sections.get(heading).map(String::as_str))
    }
}

fn continue_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Map each `== Heading ==` in plain text to the text up to the next heading.
/// The first section with a given heading wins.
fn split_sections(content: &str) -> HashMap<String, String> {
    let headings = regex!(r"(?m)^(={2,})[ \t]*(.+?)[ \t]*={2,}[ \t]*$");
    let found: Vec<_> = headings.captures_iter(content).collect();

    let mut sections = HashMap::new();
    for (i, caps) in found.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let end = found
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(content.len(), |next| next.start());
        sections
            .entry(name.as_str().to_string())
            .or_insert_with(|| content[whole.end()..end].trim().to_string());
    }
    sections
}

impl<T> PartialEq for WikiaPage<T> {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.page_id == other.page_id
    }
}

impl<T> Eq for WikiaPage<T> {}

impl<T> fmt::Display for WikiaPage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<WikiaPage {:?}>", self.title)
    }
}

impl<T> fmt::Debug for WikiaPage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikiaPage")
            .field("title", &self.title)
            .field("page_id", &self.page_id)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
