//! Card production: the LLM-backed generator and the cache-backed service
//! in front of it.

pub mod generator;
pub mod service;
