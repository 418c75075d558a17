//! Output formatters for folder listings.
//!
//! - [`table`]: aligned, human-readable text
//! - [`json`]: machine-readable JSON for scripting
//!
//! # Example
//!
//! ```no_run
//! use ao2vis::cache::ProjectedFolderRecord;
//! use ao2vis::output::table::write_table;
//!
//! let records = vec![ProjectedFolderRecord::empty("Phoenix", "/ao2/base/characters/Phoenix")];
//! write_table(&records, &mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod table;

pub use json::{JsonOutput, JsonOutputError};
pub use table::write_table;
