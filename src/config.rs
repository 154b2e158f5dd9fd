use crate::error::{Error, Result};
use crate::{cli, paths};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Contents of `hint.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load config if the file exists, otherwise return Ok(None).
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(s) => Self::parse(path, &s).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load an explicitly requested file; a missing file is an error here.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &s)
    }

    /// Use `explicit` if given, else the first file found on the search path.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }
        for path in paths::config_search_paths() {
            if let Some(cfg) = Self::load_optional(&path)? {
                tracing::debug!(path = %path.display(), "loaded config file");
                return Ok(Some(cfg));
            }
        }
        Ok(None)
    }

    fn parse(path: &Path, s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl From<&cli::Args> for Overrides {
    fn from(args: &cli::Args) -> Self {
        Self {
            api_url: args.api_url.clone(),
            api_key: args.api_key.clone(),
            model: args.model.clone(),
            timeout_secs: args.timeout,
        }
    }
}

/// Settings for one invocation, fully resolved and validated.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    /// `None` means the request may block indefinitely.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ResolvedConfig {
    /// Resolve from CLI args, the process environment and the config file.
    pub fn load(args: &cli::Args) -> Result<Self> {
        let file = FileConfig::discover(args.config.as_deref())?;
        Self::resolve(&Overrides::from(args), file.as_ref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Per field: flag, then `HINT_*` variable, then file, then default.
    /// A missing key additionally falls back to `OPENAI_API_KEY`.
    pub fn resolve(
        flags: &Overrides,
        file: Option<&FileConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.is_empty());
        let file = file.cloned().unwrap_or_default();

        let api_url = first_set([flags.api_url.clone(), env("HINT_API_URL"), file.api_url])
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let model = first_set([flags.model.clone(), env("HINT_MODEL"), file.model])
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_key = first_set([
            flags.api_key.clone(),
            env("HINT_API_KEY"),
            file.api_key,
            env("OPENAI_API_KEY"),
        ])
        .ok_or(Error::MissingApiKey)?;

        let env_timeout = match env("HINT_TIMEOUT") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| Error::InvalidSetting {
                key: "HINT_TIMEOUT",
                value: raw,
            })?),
            None => None,
        };
        let timeout = flags
            .timeout_secs
            .or(env_timeout)
            .or(file.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            api_url,
            api_key,
            model,
            timeout,
        })
    }
}

fn first_set<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates.into_iter().flatten().find(|v| !v.is_empty())
}
