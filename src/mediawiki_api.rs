use crate::{
    definitions::{QueryResponse, TitleChange},
    errors::{PageRef, Result, WikiaError},
    reqwest_client::Transport,
    wiki_api::Wikia,
    wiki_page::WikiaPage,
};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
/// Upper bound on redirect hops followed while resolving one page.
pub const MAX_REDIRECTS: usize = 5;

/// How [`Wikia::page`] should treat redirects and lazy fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub redirect: bool,
    pub preload: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            redirect: true,
            preload: false,
        }
    }
}

impl PageOptions {
    pub fn redirect(mut self, redirect: bool) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }
}

/// Compare two titles the way the wiki does: exact, except the first
/// character may differ in case.
pub fn titles_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    match (a_chars.next(), b_chars.next()) {
        (Some(a_first), Some(b_first)) => {
            a_first.to_lowercase().eq(b_first.to_lowercase())
                && a_chars.as_str() == b_chars.as_str()
        }
        _ => false,
    }
}

fn resolve_params(target: &PageRef, redirect: bool) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("action", "query".to_string()),
        ("prop", "info|pageprops".to_string()),
        ("inprop", "url".to_string()),
        ("ppprop", "disambiguation".to_string()),
    ];
    match target {
        PageRef::Title(title) => params.push(("titles", title.clone())),
        PageRef::Id(id) => params.push(("pageids", id.to_string())),
    }
    if redirect {
        params.push(("redirects", "1".to_string()));
    }
    params
}

/// The title a redirect hop should start from, after normalization.
fn working_title(target: &PageRef, normalized: Option<&TitleChange>, hop: &TitleChange) -> String {
    match target {
        PageRef::Title(title) => match normalized {
            Some(n) if titles_match(&n.from, title) && !titles_match(&n.to, title) => n.to.clone(),
            _ => title.clone(),
        },
        // nothing to compare against, trust the hop
        PageRef::Id(_) => hop.from.clone(),
    }
}

impl<T: Transport> Wikia<T> {
    /// Search the wiki and return the matching titles in relevance order.
    ///
    /// # Arguments
    /// - query -> What to search for. Blank queries return nothing.
    /// - limit -> How many titles to ask for, [`DEFAULT_SEARCH_LIMIT`] upstream.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        Ok(self.search_inner(query, limit, false)?.0)
    }

    /// Same as [`Wikia::search`] but also returns the API's spelling suggestion.
    pub fn search_with_suggestion(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<(Vec<String>, Option<String>)> {
        self.search_inner(query, limit, true)
    }

    fn search_inner(
        &self,
        query: &str,
        limit: usize,
        suggestion: bool,
    ) -> Result<(Vec<String>, Option<String>)> {
        if query.trim().is_empty() {
            return Ok((vec![], None));
        }
        let mut params = vec![
            ("action", "query".to_string()),
            ("list", "search".to_string()),
            ("srsearch", query.to_string()),
            ("srlimit", limit.to_string()),
            ("srprop", String::new()),
        ];
        if suggestion {
            params.push(("srinfo", "suggestion".to_string()));
        }

        let response: QueryResponse = self.query(params)?;
        let Some(result) = response.query else {
            return Ok((vec![], None));
        };
        let titles = result.search.into_iter().map(|entry| entry.title).collect();
        let suggestion = result.searchinfo.and_then(|info| info.suggestion);
        Ok((titles, suggestion))
    }

    /// Titles of `pages` random articles, clamped to 1..=10.
    pub fn random(&self, pages: usize) -> Result<Vec<String>> {
        let pages = pages.clamp(1, 10);
        let response: QueryResponse = self.query([
            ("action", "query".to_string()),
            ("list", "random".to_string()),
            ("rnnamespace", "0".to_string()),
            ("rnlimit", pages.to_string()),
        ])?;
        Ok(response
            .query
            .map(|q| q.random.into_iter().map(|entry| entry.title).collect())
            .unwrap_or_default())
    }
}

impl<T: Transport + Clone> Wikia<T> {
    /// Plain text summary of a page.
    ///
    /// # Arguments
    /// - sentences -> When above zero, cut the summary after that many sentences.
    /// - chars -> Otherwise, when above zero, cut after that many characters.
    /// - redirect -> Follow redirects while resolving `title`.
    ///
    /// With neither limit the whole intro section is returned.
    pub fn summary(&self, title: &str, sentences: u32, chars: u32, redirect: bool) -> Result<String> {
        let page = self.page(title, PageOptions::default().redirect(redirect))?;
        let mut params = vec![
            ("action", "query".to_string()),
            ("prop", "extracts".to_string()),
            ("explaintext", String::new()),
            ("titles", page.title().to_string()),
        ];
        if sentences > 0 {
            params.push(("exsentences", sentences.to_string()));
        } else if chars > 0 {
            params.push(("exchars", chars.to_string()));
        } else {
            params.push(("exintro", String::new()));
        }

        let response: QueryResponse = self.query(params)?;
        response
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|entry| entry.extract)
            .ok_or_else(|| WikiaError::shape(format!("no extract for {:?}", page.title())))
    }

    /// Resolve `title` to a page on the current wiki.
    pub fn page(&self, title: &str, options: PageOptions) -> Result<WikiaPage<T>> {
        self.resolve(PageRef::Title(title.to_string()), options)
    }

    /// Switch to `sub_site` and resolve `title` there.
    pub fn page_in(
        &mut self,
        sub_site: &str,
        title: &str,
        options: PageOptions,
    ) -> Result<WikiaPage<T>> {
        self.set_sub_site(sub_site);
        self.page(title, options)
    }

    pub fn page_by_id(&self, page_id: u64, options: PageOptions) -> Result<WikiaPage<T>> {
        self.resolve(PageRef::Id(page_id), options)
    }

    /// Where `target` redirects to, without resolving the page it points at.
    fn redirect_target(&self, target: &PageRef) -> Result<Option<String>> {
        let response: QueryResponse = self.query(resolve_params(target, true))?;
        Ok(response
            .query
            .and_then(|q| q.redirects.into_iter().next())
            .map(|hop| hop.to))
    }

    /// Ask the API where `target` lives and build the page from the answer.
    ///
    /// Redirects are followed one hop per request, at most [`MAX_REDIRECTS`]
    /// times.
    fn resolve(&self, target: PageRef, options: PageOptions) -> Result<WikiaPage<T>> {
        let original = target.clone();
        let mut target = target;

        for _ in 0..=MAX_REDIRECTS {
            let response: QueryResponse = self.query(resolve_params(&target, options.redirect))?;
            let query = response
                .query
                .ok_or_else(|| WikiaError::shape("resolution answer has no query block"))?;
            let (key, entry) = query
                .pages
                .iter()
                .next()
                .ok_or_else(|| WikiaError::shape("resolution answer has no pages"))?;

            // `invalid` marks titles that can never exist, e.g. "[["
            if entry.missing.is_some() || entry.invalid.is_some() {
                return Err(WikiaError::Page(target));
            }

            if let Some(hop) = query.redirects.first() {
                if !options.redirect {
                    return Err(WikiaError::Redirect {
                        title: hop.from.clone(),
                        target: Some(hop.to.clone()),
                    });
                }
                let from = working_title(&target, query.normalized.first(), hop);
                if !titles_match(&hop.from, &from) {
                    return Err(WikiaError::shape(format!(
                        "redirect starts at {:?}, expected {:?}",
                        hop.from, from
                    )));
                }
                log::info!("Following redirect {:?} -> {:?}", hop.from, hop.to);
                target = PageRef::Title(hop.to.clone());
                continue;
            }

            if entry.redirect.is_some() {
                // only reachable when redirects were not requested
                return Err(WikiaError::Redirect {
                    title: match &target {
                        PageRef::Title(title) => title.clone(),
                        PageRef::Id(_) => entry.title.clone(),
                    },
                    target: self.redirect_target(&target)?,
                });
            }

            if entry.is_disambiguation() {
                return Err(WikiaError::Disambiguation {
                    title: entry.title.clone(),
                });
            }

            let page_id = match entry.pageid {
                Some(id) => id,
                None => key
                    .parse::<u64>()
                    .map_err(|_| WikiaError::shape(format!("page key {:?} is not an id", key)))?,
            };
            let url = entry
                .fullurl
                .clone()
                .ok_or_else(|| WikiaError::shape(format!("no url for {:?}", entry.title)))?;

            let page = WikiaPage::new(self.clone(), entry.title.clone(), page_id, url);
            if options.preload {
                page.preload()?;
            }
            return Ok(page);
        }

        Err(WikiaError::Redirect {
            title: match original {
                PageRef::Title(title) => title,
                PageRef::Id(id) => id.to_string(),
            },
            target: match target {
                PageRef::Title(title) => Some(title),
                PageRef::Id(_) => None,
            },
        })
    }
}
