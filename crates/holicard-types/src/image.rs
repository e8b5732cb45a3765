//! Image search request shapes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orientation hint passed to the image service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    Squarish,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Squarish => write!(f, "squarish"),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            "squarish" => Ok(Orientation::Squarish),
            other => Err(format!("invalid orientation: '{other}'")),
        }
    }
}

/// A single image search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    pub text: String,
    pub count: usize,
    pub orientation: Orientation,
}
