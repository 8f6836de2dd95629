//! Error types shared by the sanity crates

use miette::Diagnostic;

/// Main error type for sanity operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum SanityError {
    /// Transport-level HTTP failure
    #[error("request to {url} failed")]
    #[diagnostic(code(sanity::client::transport))]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a success status
    #[error("{url} returned {status}")]
    #[diagnostic(code(sanity::client::status))]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The configured endpoint cannot serve as a base URL
    #[error("invalid endpoint url: {0}")]
    #[diagnostic(code(sanity::config::endpoint))]
    Endpoint(String),

    /// IO error
    #[error(transparent)]
    #[diagnostic(code(sanity::io))]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),

    /// Config file with an extension we do not know how to read
    #[error("unsupported config format: {0}")]
    #[diagnostic(code(sanity::config::format), help("use a .json or .toml file"))]
    ConfigFormat(String),
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(sanity::serde::json))]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    #[diagnostic(code(sanity::serde::toml_de))]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    #[diagnostic(code(sanity::serde::toml_ser))]
    TomlSer(#[from] toml::ser::Error),
}

impl From<serde_json::Error> for SanityError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(SerDeError::Json(err))
    }
}

impl From<toml::de::Error> for SanityError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serde(SerDeError::TomlDe(err))
    }
}

impl From<toml::ser::Error> for SanityError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serde(SerDeError::TomlSer(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn status_error_mentions_url_and_code() {
        let err = SanityError::Status {
            url: "http://localhost:5000/del/foo".into(),
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(err.to_string(), "http://localhost:5000/del/foo returned 404");
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("sanity::client::status")
        );
    }

    #[test]
    fn json_errors_convert() {
        let err: SanityError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, SanityError::Serde(SerDeError::Json(_))));
    }
}
