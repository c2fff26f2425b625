//! Blocking client for the Wikia/Fandom read-only content API.
//!
//! Resolve titles or page ids to [`WikiaPage`]s, search a wiki, and pick the
//! language and sub-wikia requests are routed to.
//!
//! ```no_run
//! use wikia::{PageOptions, Wikia};
//!
//! # fn main() -> wikia::Result<()> {
//! let mut wikia = Wikia::new()?;
//! let dog = wikia.page_in("runescape", "Dog", PageOptions::default())?;
//! println!("{} ({})", dog.title(), dog.url());
//! println!("{:?}", dog.section("Training")?);
//!
//! for title in wikia.search("Dog", 5)? {
//!     println!("{}", title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod definitions;
pub mod endpoint;
pub mod errors;
pub mod mediawiki_api;
pub mod reqwest_client;
pub mod wiki_api;
pub mod wiki_page;

#[cfg(test)]
mod testing;

pub use endpoint::{WikiaConfig, WikiaConfigBuilder};
pub use errors::{PageRef, RequestError, Result, WikiaError};
pub use mediawiki_api::{DEFAULT_SEARCH_LIMIT, MAX_REDIRECTS, PageOptions, titles_match};
pub use reqwest_client::{HttpResponse, RustClient, Transport};
pub use wiki_api::Wikia;
pub use wiki_page::WikiaPage;
