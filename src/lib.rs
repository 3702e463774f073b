//! Google Code Wiki markup to HTML.
//!
//! The [`wiki`] module holds the converter; the rest backs the `wikiwym`
//! command-line tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod wiki;

pub use wiki::{ParserOptions, Rendered, WikiParser, parse};
