//! Configuration sources: the role table, file location, and parsing.
//!
//! A resolution reads a fixed cascade of dotenv-style files. [`locate`]
//! enumerates that cascade for an environment without touching the
//! filesystem; [`ConfigSource::load`] reads and parses one file. See
//! [`SourceRole`] for the precedence order and the per-role rules.

mod locator;
mod parser;
mod role;

pub use locator::{locate, missing_example_files, ConfigSource, Locations};
pub use parser::SourceMap;
pub use role::SourceRole;
