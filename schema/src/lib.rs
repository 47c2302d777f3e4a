//! Schema definitions for routeprobe
//!
//! This crate contains the data structures shared by the prober, the smoke
//! suite and the CLI: the HTTP verb enumeration, probe requests and results,
//! and the route plan that drives a smoke run. Everything here is plain data
//! with serde support so a route plan can be written in TOML.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod plan;
pub mod probe;

pub use plan::*;
pub use probe::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// HTTP verbs the prober knows how to dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// All supported verbs, in dispatch order
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    /// Upper-case wire name of the verb
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a JSON payload is sent with this verb
    ///
    /// Bodies attached to GET or DELETE requests are dropped.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name a supported verb
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MethodError {
    /// Anything other than GET, POST, PUT or DELETE
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}

impl MethodError {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            MethodError::UnsupportedMethod(_) => "SCHEMA001",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = MethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| MethodError::UnsupportedMethod(trimmed.to_string()))
    }
}
