#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the chores crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by every chore and by the CLI.
///
/// Variants are grouped by how the CLI reacts to them: configuration and
/// local filesystem problems are detected before any network activity, API
/// failures propagate unchanged from the tracker client, and the two
/// rate-limit variants carry the request that tripped the limit so the
/// operator can tell which call to resume from.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors raised while reading inputs or writing outputs.
    #[error("I/O failure at {path:?}: {source}")]
    Io {
        /// Location that triggered the failure.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Returned when a required local path does not exist.
    #[error("path not found: {path:?}")]
    NotFound {
        /// Missing location.
        path: PathBuf
    },
    /// Wraps YAML decoding errors raised by the configuration loader.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps JSON encoding and decoding errors.
    #[error("JSON processing failed: {source}")]
    Json {
        /// Underlying serde_json error.
        source: serde_json::Error
    },
    /// Returned when inputs or configuration violate invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Returned at startup when no access token is available.
    #[error(
        "missing repository-scoped access token; pass --token or set {variable}"
    )]
    MissingCredential {
        /// Environment variable consulted for the token.
        variable: String
    },
    /// Non rate-limit HTTP failure reported by the issue tracker.
    #[error("issue tracker responded with HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status:  u16,
        /// Message extracted from the response body.
        message: String
    },
    /// Primary rate limit persisted after every allowed retry.
    #[error("request quota still exhausted for {method} {path} after {retries} retries")]
    RateLimited {
        /// HTTP method of the throttled request.
        method:  String,
        /// Path of the throttled request.
        path:    String,
        /// Number of retries performed before giving up.
        retries: u32
    },
    /// Secondary (abuse detection) rate limit, never retried.
    #[error("secondary rate limit hit for {method} {path}; wait before resuming")]
    SecondaryRateLimit {
        /// HTTP method of the throttled request.
        method: String,
        /// Path of the throttled request.
        path:   String
    },
    /// Returned when no milestone matches the requested state filter.
    #[error("no {state} milestones found")]
    NoMilestones {
        /// State filter used for the lookup.
        state: String
    },
    /// Transport and client construction errors.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            source
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(error: octocrab::Error) -> Self {
        Self::Service {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// A [`std::io::ErrorKind::NotFound`] source is mapped to
/// [`Error::NotFound`] so callers can distinguish missing inputs.
///
/// # Parameters
///
/// * `path` - Location that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    if source.kind() == std::io::ErrorKind::NotFound {
        return Error::NotFound {
            path: path.to_path_buf()
        };
    }

    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::validation("display me");
        assert_eq!(error.to_string(), error.to_display_string());
    }

    #[test]
    fn io_error_maps_missing_paths_to_not_found() {
        let path = std::path::Path::new("/tmp/components");
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");

        match super::io_error(path, source) {
            Error::NotFound {
                path: ref stored_path
            } => assert_eq!(stored_path, path),
            other => panic!("expected not found error, got {other:?}")
        }
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/out.md");
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");

        match super::io_error(path, source) {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Parse { .. }));
    }

    #[test]
    fn serde_json_conversion_maps_to_json_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Json { .. }));
    }

    #[test]
    fn rate_limit_messages_name_the_request() {
        let primary = Error::RateLimited {
            method:  "POST".to_owned(),
            path:    "/repos/o/r/issues".to_owned(),
            retries: 5
        };
        let secondary = Error::SecondaryRateLimit {
            method: "POST".to_owned(),
            path:   "/repos/o/r/issues".to_owned()
        };
        assert_eq!(
            primary.to_string(),
            "request quota still exhausted for POST /repos/o/r/issues after 5 retries"
        );
        assert!(secondary.to_string().contains("POST /repos/o/r/issues"));
    }
}
