//! Image search implementations.

pub mod unsplash;
