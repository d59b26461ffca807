//! Airport lookup server.
//!
//! Answers "which airport is this code, and what time is it there?". Airport
//! geography comes from a bulk import; timezone data is fetched lazily from
//! an external resolver when a lookup asks for it and the stored data is
//! missing, a placeholder, or out of date.

pub mod cache;
pub mod config;
pub mod domain;
pub mod freshness;
pub mod refresh;
pub mod resolver;
pub mod service;
pub mod store;
pub mod web;
