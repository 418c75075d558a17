//! Actions on character folders.
//!
//! - [`delete`]: move a character folder to the system trash

pub mod delete;

pub use delete::{delete_character_folder, DeleteError, DeleteResult};
