//! Front-page scrapers.
//!
//! Each scraper turns one fetched page into a sequence of [`Listing`]s:
//!
//! 1. **Fetching**: a single GET of the configured start page
//! 2. **Extracting**: one listing per anchor matching the listing selector
//!
//! # Supported Sources
//!
//! | Source | Module | Default selector |
//! |--------|--------|------------------|
//! | Hacker News | [`hacker_news`] | `span.titleline > a` |
//!
//! There is no link-following, pagination or retry. Fetch and parse failures
//! propagate to the caller as [`ExtractError`](crate::error::ExtractError).
//!
//! [`Listing`]: crate::models::Listing

pub mod hacker_news;
