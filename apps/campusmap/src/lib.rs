//! # campusmap
//!
//! Application layer around `campusmap-core`: configuration, document
//! storage, the command line and the HTTP API.

pub mod api;
pub mod cli;
pub mod config;
pub mod store;
