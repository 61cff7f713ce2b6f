//! Output generation for scraped listings and record reports.
//!
//! # Submodules
//!
//! - [`json`]: Writes listings as a JSON array to a file or stdout
//! - [`console`]: Renders record manager results as readable text

pub mod console;
pub mod json;
