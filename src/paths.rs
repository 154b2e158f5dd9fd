use std::env;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "hint.toml";

fn user_config_dir() -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".config"))
}

/// Candidate config files, most preferred first.
///
/// The user-wide file is checked before the one in the working directory.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(2);
    if let Some(dir) = user_config_dir() {
        out.push(dir.join(CONFIG_FILE_NAME));
    }
    out.push(PathBuf::from(".").join(CONFIG_FILE_NAME));
    out
}
