use clap::Parser;
use std::path::PathBuf;

/// Ask an LLM a question about the current directory
#[derive(Debug, Parser)]
#[command(name = "hint")]
#[command(version)]
#[command(about = "A utility for getting contextual hints using LLM", long_about = None)]
pub struct Args {
    /// API URL (OpenAI is used by default)
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// API key
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Model name (default: config/model or "gpt-4")
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Give up on the request after this many seconds (default: wait forever)
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Read settings from this TOML file instead of searching for hint.toml
    /// (keys: api_url, api_key, model, timeout_secs)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Question text; all words are joined with single spaces
    #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
    pub question: Vec<String>,
}

impl Args {
    pub fn question(&self) -> String {
        self.question.join(" ")
    }
}
