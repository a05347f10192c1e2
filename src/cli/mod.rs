//! Terminal front end of the storefront client.
//!
//! Each subcommand is a [`commands::CallableTrait`] object run against an
//! [`context::AppContext`] built once per invocation.

pub mod commands;
pub mod context;
pub mod error;
pub mod progress;
pub mod render;
