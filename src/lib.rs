//! MGNREGA cache library
//!
//! This module exposes the cache, upstream client, retrieval policy, and HTTP
//! router for use by the binary and in integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod retrieval;
pub mod server;
