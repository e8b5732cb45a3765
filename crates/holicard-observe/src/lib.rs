//! Observability for Holicard: the global tracing subscriber.

pub mod tracing_setup;
