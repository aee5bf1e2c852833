//! The options accepted when requesting a shadow container.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Whether the shadow container is reachable from its host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowMode {
    /// The container is exposed on the host element.
    Open,
    /// The container is only returned to the caller.
    Closed,
}

impl ShadowMode {
    /// The mode string as written in the request.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for ShadowMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for ShadowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request for a shadow container, i.e. the `attachShadow` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowRequest {
    pub mode: ShadowMode,
}

impl ShadowRequest {
    /// Request an open container.
    #[inline]
    pub fn open() -> Self {
        Self {
            mode: ShadowMode::Open,
        }
    }

    /// Request a closed container.
    #[inline]
    pub fn closed() -> Self {
        Self {
            mode: ShadowMode::Closed,
        }
    }

    /// Build a request from a mode string.
    pub fn with_mode(mode: &str) -> Result<Self, Error> {
        Ok(Self {
            mode: mode.parse()?,
        })
    }
}
