//! Canned-response transport and wiki fixtures shared by the unit tests.

use std::{cell::RefCell, collections::BTreeMap, collections::HashMap, rc::Rc};

use serde_json::{Value, json};
use url::Url;

use crate::{
    endpoint::WikiaConfig,
    errors::RequestError,
    reqwest_client::{HttpResponse, Transport},
    wiki_api::Wikia,
};

type Params = BTreeMap<String, String>;

/// Answers requests from a table keyed by the full parameter map and records
/// every call it sees. Clones share the table and the call log.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Rc<RefCell<HashMap<Params, HttpResponse>>>,
    calls: Rc<RefCell<Vec<(String, Params)>>>,
}

fn to_params(params: &[(&str, &str)]) -> Params {
    let mut map: Params = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    map.insert("format".to_string(), "json".to_string());
    map
}

impl MockTransport {
    /// Answer `params` (plus `format=json`) with a 200 and `body`.
    pub fn on(&self, params: &[(&str, &str)], body: Value) -> &Self {
        self.on_raw(params, 200, &body.to_string())
    }

    pub fn on_raw(&self, params: &[(&str, &str)], status: u16, body: &str) -> &Self {
        self.responses.borrow_mut().insert(
            to_params(params),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Every `(url, params)` pair sent so far, oldest first.
    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.borrow().clone()
    }

    /// How many times exactly these params (plus `format=json`) were sent.
    pub fn count(&self, params: &[(&str, &str)]) -> usize {
        let wanted = to_params(params);
        self.calls.borrow().iter().filter(|(_, p)| *p == wanted).count()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &Url, params: &Params) -> Result<HttpResponse, RequestError> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), params.clone()));
        Ok(self
            .responses
            .borrow()
            .get(params)
            .cloned()
            .unwrap_or_else(|| {
                log::warn!("No canned response for {:?}", params);
                HttpResponse {
                    status: 404,
                    body: "no canned response".to_string(),
                }
            }))
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const DOG_ID: u64 = 26173;
pub const DOG_URL: &str = "http://runescape.wikia.com/wiki/Dog";
pub const DOG_REVID: u64 = 14013826;
pub const DOG_PARENTID: u64 = 13907115;
pub const DOG_CONTENT: &str = "The dog is a pet that players can own.\n\n\
== Dog ==\nA dog can be bought from the pet shop in Taverley.\n\n\
== Training ==\nDogs follow their owner around.\n\n\
=== Tricks ===\nSit and stay.";
pub const DOG_SUMMARY: &str = "The dog is a pet that players can own.";
pub const DOG_HTML: &str = "<p>The <b>dog</b> is a pet that players can own.</p>";
pub const DOG_IMAGES: [&str; 2] = [
    "http://images.wikia.com/runescape/images/1/1a/Dog.png",
    "http://images.wikia.com/runescape/images/2/2b/Dog_chathead.png",
];
pub const DOG_REFERENCES: [&str; 3] = [
    "http://services.runescape.com/m=news/pets",
    "http://services.runescape.com/m=news/taverley",
    "http://www.runescape.com/kbase/pets",
];
pub const DOG_LINKS: [&str; 3] = ["Pet shop", "Taverley", "Terrier"];
pub const DOG_CATEGORIES: [&str; 2] = ["Pets", "Animals"];
pub const DOG_SECTIONS: [&str; 3] = ["Dog", "Training", "Tricks"];

pub const BARACK_SEARCH: [&str; 10] = [
    "Barack Obama",
    "Barack Obama, Sr.",
    "Presidency of Barack Obama",
    "Family of Barack Obama",
    "First inauguration of Barack Obama",
    "Barack Obama presidential campaign, 2008",
    "Barack Obama presidential campaign, 2012",
    "Dreams from My Father",
    "Michelle Obama",
    "Barack Obama citizenship conspiracy theories",
];
pub const PORSCHE_SEARCH: [&str; 3] = ["Porsche", "Porsche in motorsport", "Porsche 911 GT3"];

pub fn resolve_params<'a>(key: &'a str, value: &'a str, redirect: bool) -> Vec<(&'a str, &'a str)> {
    let mut params = vec![
        ("action", "query"),
        ("prop", "info|pageprops"),
        ("inprop", "url"),
        ("ppprop", "disambiguation"),
        (key, value),
    ];
    if redirect {
        params.push(("redirects", "1"));
    }
    params
}

fn page_json(id: u64, title: &str, url: &str) -> Value {
    json!({
        "query": {
            "pages": {
                id.to_string(): {"pageid": id, "ns": 0, "title": title, "fullurl": url}
            }
        }
    })
}

fn dog_scoped(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
    let mut params = vec![("action", "query"), ("titles", "Dog")];
    params.extend_from_slice(extra);
    params
}

/// Register the fixture wiki: redirects, a missing page, the Dog article with
/// every lazy field, and a couple of searches.
pub fn register_fixtures(mock: &MockTransport) {
    let edison_url = "http://en.wikia.org/wiki/Edison,_New_Jersey";
    let party_url = "http://en.wikia.org/wiki/Communist_party";

    mock.on(
        &resolve_params("titles", "purpleberry", true),
        json!({"query": {
            "normalized": [{"from": "purpleberry", "to": "Purpleberry"}],
            "pages": {"-1": {"ns": 0, "title": "Purpleberry", "missing": ""}}
        }}),
    );
    mock.on(
        &resolve_params("pageids", "999999999", true),
        json!({"query": {"pages": {"999999999": {"pageid": 999999999, "missing": ""}}}}),
    );

    mock.on(
        &resolve_params("titles", "Menlo Park, New Jersey", true),
        json!({"query": {
            "redirects": [{"from": "Menlo Park, New Jersey", "to": "Edison, New Jersey"}],
            "pages": {"125414": {"pageid": 125414, "ns": 0, "title": "Edison, New Jersey", "fullurl": edison_url}}
        }}),
    );
    mock.on(
        &resolve_params("titles", "Edison, New Jersey", true),
        page_json(125414, "Edison, New Jersey", edison_url),
    );
    mock.on(
        &resolve_params("titles", "Menlo Park, New Jersey", false),
        json!({"query": {"pages": {"2036409": {
            "pageid": 2036409, "ns": 0, "title": "Menlo Park, New Jersey", "redirect": "",
            "fullurl": "http://en.wikia.org/wiki/Menlo_Park,_New_Jersey"
        }}}}),
    );

    mock.on(
        &resolve_params("titles", "Communist Party", true),
        json!({"query": {
            "redirects": [{"from": "Communist Party", "to": "Communist party"}],
            "pages": {"6917": {"pageid": 6917, "ns": 0, "title": "Communist party", "fullurl": party_url}}
        }}),
    );
    mock.on(
        &resolve_params("titles", "communist Party", true),
        json!({"query": {
            "normalized": [{"from": "communist Party", "to": "Communist Party"}],
            "redirects": [{"from": "Communist Party", "to": "Communist party"}],
            "pages": {"6917": {"pageid": 6917, "ns": 0, "title": "Communist party", "fullurl": party_url}}
        }}),
    );
    mock.on(
        &resolve_params("titles", "Communist party", true),
        page_json(6917, "Communist party", party_url),
    );

    mock.on(
        &resolve_params("titles", "Mercury", true),
        json!({"query": {"pages": {"19694": {
            "pageid": 19694, "ns": 0, "title": "Mercury",
            "fullurl": "http://en.wikia.org/wiki/Mercury",
            "pageprops": {"disambiguation": ""}
        }}}}),
    );

    mock.on(
        &resolve_params("titles", "Dog", true),
        page_json(DOG_ID, "Dog", DOG_URL),
    );
    mock.on(
        &resolve_params("pageids", "26173", true),
        page_json(DOG_ID, "Dog", DOG_URL),
    );

    register_dog_fields(mock);
    register_searches(mock);
}

fn register_dog_fields(mock: &MockTransport) {
    let id = DOG_ID.to_string();

    mock.on(
        &dog_scoped(&[("prop", "extracts|revisions"), ("explaintext", ""), ("rvprop", "ids")]),
        json!({"query": {"pages": {id.clone(): {
            "pageid": DOG_ID, "title": "Dog", "extract": DOG_CONTENT,
            "revisions": [{"revid": DOG_REVID, "parentid": DOG_PARENTID}]
        }}}}),
    );
    mock.on(
        &dog_scoped(&[("prop", "extracts"), ("explaintext", ""), ("exintro", "")]),
        json!({"query": {"pages": {id.clone(): {"pageid": DOG_ID, "title": "Dog", "extract": DOG_SUMMARY}}}}),
    );
    mock.on(
        &dog_scoped(&[
            ("generator", "images"),
            ("gimlimit", "max"),
            ("prop", "imageinfo"),
            ("iiprop", "url"),
        ]),
        json!({"query": {"pages": {
            "-1": {"ns": 6, "title": "File:Dog_chathead.png", "imageinfo": [{"url": DOG_IMAGES[1]}]},
            "-2": {"ns": 6, "title": "File:Dog.png", "imageinfo": [{"url": DOG_IMAGES[0]}]}
        }}}),
    );
    // references come back in two batches
    mock.on(
        &dog_scoped(&[("prop", "extlinks"), ("ellimit", "max")]),
        json!({
            "continue": {"eloffset": 2, "continue": "||"},
            "query": {"pages": {id.clone(): {"pageid": DOG_ID, "title": "Dog", "extlinks": [
                {"*": DOG_REFERENCES[0]}, {"*": DOG_REFERENCES[1]}
            ]}}}
        }),
    );
    mock.on(
        &dog_scoped(&[
            ("prop", "extlinks"),
            ("ellimit", "max"),
            ("eloffset", "2"),
            ("continue", "||"),
        ]),
        json!({"query": {"pages": {id.clone(): {"pageid": DOG_ID, "title": "Dog", "extlinks": [
            {"*": DOG_REFERENCES[2]}
        ]}}}}),
    );
    mock.on(
        &dog_scoped(&[("prop", "links"), ("plnamespace", "0"), ("pllimit", "max")]),
        json!({"query": {"pages": {id.clone(): {"pageid": DOG_ID, "title": "Dog", "links": [
            {"ns": 0, "title": DOG_LINKS[0]},
            {"ns": 0, "title": DOG_LINKS[1]},
            {"ns": 0, "title": DOG_LINKS[2]}
        ]}}}}),
    );
    mock.on(
        &dog_scoped(&[("prop", "categories"), ("cllimit", "max")]),
        json!({"query": {"pages": {id.clone(): {"pageid": DOG_ID, "title": "Dog", "categories": [
            {"ns": 14, "title": "Category:Pets"},
            {"ns": 14, "title": "Category:Animals"}
        ]}}}}),
    );
    mock.on(
        &dog_scoped(&[
            ("prop", "revisions"),
            ("rvprop", "content"),
            ("rvlimit", "1"),
            ("rvparse", ""),
        ]),
        json!({"query": {"pages": {id.clone(): {"pageid": DOG_ID, "title": "Dog", "revisions": [
            {"*": DOG_HTML}
        ]}}}}),
    );
    mock.on(
        &[("action", "parse"), ("prop", "sections"), ("pageid", "26173")],
        json!({"parse": {"title": "Dog", "sections": [
            {"line": DOG_SECTIONS[0], "level": "2"},
            {"line": DOG_SECTIONS[1], "level": "2"},
            {"line": DOG_SECTIONS[2], "level": "3"}
        ]}}),
    );
}

fn search_json(titles: &[&str], suggestion: Option<&str>) -> Value {
    let search: Vec<Value> = titles.iter().map(|t| json!({"ns": 0, "title": t})).collect();
    match suggestion {
        Some(suggestion) => json!({"query": {"searchinfo": {"suggestion": suggestion}, "search": search}}),
        None => json!({"query": {"searchinfo": {"totalhits": titles.len()}, "search": search}}),
    }
}

fn register_searches(mock: &MockTransport) {
    let search = |query: &'static str, limit: &'static str| {
        vec![
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", limit),
            ("srprop", ""),
        ]
    };

    mock.on(&search("Barack Obama", "10"), search_json(&BARACK_SEARCH, None));
    mock.on(&search("Porsche", "3"), search_json(&PORSCHE_SEARCH, None));
    mock.on(&search("qwertyuiopasdf", "10"), search_json(&[], None));

    let mut suggest = search("Barak Obama", "10");
    suggest.push(("srinfo", "suggestion"));
    mock.on(&suggest, search_json(&BARACK_SEARCH[..2], Some("barack obama")));

    mock.on(
        &[
            ("action", "query"),
            ("list", "random"),
            ("rnnamespace", "0"),
            ("rnlimit", "3"),
        ],
        json!({"query": {"random": [
            {"id": 1, "ns": 0, "title": "Dog"},
            {"id": 2, "ns": 0, "title": "Taverley"},
            {"id": 3, "ns": 0, "title": "Terrier"}
        ]}}),
    );
}

/// A client over the fixture wiki, plus a handle on its transport.
pub fn fixture_wikia() -> (Wikia<MockTransport>, MockTransport) {
    init_logger();
    let mock = MockTransport::default();
    register_fixtures(&mock);
    (
        Wikia::with_transport(WikiaConfig::default(), mock.clone()),
        mock,
    )
}
