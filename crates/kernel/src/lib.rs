//! Vetrina Kernel Library
//!
//! In-memory host services for the responsive image and Mailchimp plugins.
//! The command-line entry point is the `vetrina` binary.

pub mod cli;
pub mod config;
pub mod config_storage;
pub mod error;
pub mod file;
pub mod state;
pub mod theme;
pub mod variables;
