use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can stop a single `hint` invocation.
///
/// Display strings describe the failing step only; the underlying cause is
/// reachable through `source()` and rendered by the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("API key must be specified using --api-key, HINT_API_KEY, or OPENAI_API_KEY")]
    MissingApiKey,

    #[error("invalid value for {key}: {value:?}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("failed to read config: {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to {action}")]
    Context {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("error serializing request")]
    RequestBuild(#[source] serde_json::Error),

    #[error("API key is not a valid HTTP header value")]
    InvalidApiKey(#[source] reqwest::header::InvalidHeaderValue),

    #[error("error executing HTTP request")]
    Transport(#[source] reqwest::Error),

    #[error("error deserializing response (HTTP {status})")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("API error: {0}")]
    Provider(String),

    #[error("received empty response from API")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Context,
    RequestBuild,
    Transport,
    Decode,
    Provider,
    EmptyResponse,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingApiKey
            | Error::InvalidSetting { .. }
            | Error::ConfigRead { .. }
            | Error::ConfigParse { .. } => ErrorKind::Config,
            Error::Context { .. } => ErrorKind::Context,
            Error::RequestBuild(_) | Error::InvalidApiKey(_) => ErrorKind::RequestBuild,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Provider(_) => ErrorKind::Provider,
            Error::EmptyResponse => ErrorKind::EmptyResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_does_not_repeat_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = Error::Context {
            action: "read current directory",
            source,
        };
        assert_eq!(err.to_string(), "failed to read current directory");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("nope"));
        assert_eq!(err.kind(), ErrorKind::Context);
    }

    #[test]
    fn provider_message_is_verbatim() {
        let err = Error::Provider("invalid_api_key".into());
        assert_eq!(err.to_string(), "API error: invalid_api_key");
        assert!(err.source().is_none());
    }

    #[test]
    fn config_variants_share_a_kind() {
        assert_eq!(Error::MissingApiKey.kind(), ErrorKind::Config);
        let err = Error::InvalidSetting {
            key: "HINT_TIMEOUT",
            value: "soon".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.to_string(), "invalid value for HINT_TIMEOUT: \"soon\"");
    }
}
