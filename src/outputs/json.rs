//! JSON output for scraped listings.
//!
//! Listings are written as one JSON array, with each element carrying both
//! `title` and `link` keys:
//!
//! ```text
//! [
//!   { "title": "Rust 2.0 released", "link": "https://example.com/rust" },
//!   { "title": "Ask HN: ...", "link": "item?id=42" }
//! ]
//! ```
//!
//! The destination `-` means stdout; anything else is a file path whose
//! parent directory is created when missing. Existing files are overwritten.

use crate::models::Listing;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

/// Serialize listings to the pretty-printed JSON array written by [`write_listings`].
pub fn listings_to_json(listings: &[Listing]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(listings)
}

/// Write listings to `destination`.
///
/// # Arguments
///
/// * `listings` - The listings to serialize
/// * `destination` - Output file path, or `-` for stdout
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation or writing fails.
#[instrument(level = "info", skip_all, fields(%destination, count = listings.len()))]
pub async fn write_listings(listings: &[Listing], destination: &str) -> Result<(), Box<dyn Error>> {
    let mut json = listings_to_json(listings)?;
    json.push('\n');

    if destination == "-" {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
        info!("Wrote listings to stdout");
        return Ok(());
    }

    if let Some(parent) = Path::new(destination).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent).await {
                error!(dir = %parent.display(), error = %e, "Failed to create output dir");
                return Err(e.into());
            }
        }
    }

    fs::write(destination, json).await?;
    info!(path = %destination, "Wrote listings JSON");
    Ok(())
}
