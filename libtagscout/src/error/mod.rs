//! Error types for tagscout
//!
//! Every fallible operation in the crate returns [`ScoutError`]. Listing
//! failures are surfaced verbatim to the caller; per-tag enrichment failures
//! are swallowed by the lister and never reach this type's consumers.

use thiserror::Error;


/// Main error type for tagscout operations
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Network-related errors (connection, DNS, broken transfers)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication errors (401, 403, token exchange)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Resource not found errors (404, missing platform in an index)
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Any other non-success status returned by the registry
    #[error("Registry error (status: {status_code}): {message}")]
    Registry { message: String, status_code: u16 },

    /// Validation errors (malformed reference, digest mismatch, bad manifest)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, bad values)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller's cancellation token fired while an operation was running
    #[error("Cancelled: {operation}")]
    Cancelled { operation: String },
}

/// Result type alias for tagscout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagscout::error::ScoutError;
    ///
    /// let err = ScoutError::network("connection refused");
    /// assert!(matches!(err, ScoutError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagscout::error::ScoutError;
    ///
    /// let err = ScoutError::authentication("token request rejected", Some(401));
    /// assert!(matches!(err, ScoutError::Authentication { .. }));
    /// ```
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new not found error.
    pub fn not_found<T: Into<String>, N: Into<String>>(resource_type: T, name: N) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new registry error for an unexpected HTTP status.
    pub fn registry<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Registry {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagscout::error::ScoutError;
    ///
    /// let err = ScoutError::validation("invalid manifest format");
    /// assert!(matches!(err, ScoutError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new cancellation error naming the interrupted operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagscout::error::ScoutError;
    ///
    /// let err = ScoutError::cancelled("list tags");
    /// assert_eq!(err.to_string(), "Cancelled: list tags");
    /// ```
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Returns true if this error was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
