//! Shared pieces of the sanity paper-list tools: the page data model, the
//! error type, client configuration, and the tag endpoint client.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use crate::client::{TagAction, TagClient};
pub use crate::config::Config;
pub use crate::error::{SanityError, SerDeError};
pub use crate::types::{PageData, Paper, PaperScore, TagCount, WordWeight};
