//! Runtime settings resolved from flags, environment and defaults.

use std::path::PathBuf;

use crate::api::DEFAULT_API_URL;
use crate::cli::Cli;
use crate::fields::ApiLayout;

pub const API_URL_ENV: &str = "TODO_API_URL";
pub const API_LAYOUT_ENV: &str = "TODO_API_LAYOUT";
pub const DATA_DIR_ENV: &str = "TODO_DATA_DIR";

/// Settings for one run of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub layout: ApiLayout,
    pub data_dir: PathBuf,
}

impl Settings {
    /// Resolve settings: command-line flag, then environment, then default.
    pub fn resolve(cli: &Cli) -> Result<Self, String> {
        Self::resolve_with(cli, |key| std::env::var(key).ok())
    }

    fn resolve_with(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let api_url = cli
            .api_url
            .clone()
            .or_else(|| env(API_URL_ENV))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(format!("API URL must start with http:// or https://, got '{api_url}'"));
        }

        let layout = match cli.layout {
            Some(layout) => layout,
            None => match env(API_LAYOUT_ENV) {
                Some(raw) => raw.parse()?,
                None => ApiLayout::default(),
            },
        };

        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| env(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| {
                let home = env("HOME").unwrap_or_else(|| ".".to_string());
                PathBuf::from(home).join(".todo")
            });

        Ok(Settings {
            api_url,
            layout,
            data_dir,
        })
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["todo"]);
        let s = Settings::resolve_with(&cli, env_of(&[("HOME", "/home/ana")])).unwrap();
        assert_eq!(s.api_url, DEFAULT_API_URL);
        assert_eq!(s.layout, ApiLayout::TrailingSlash);
        assert_eq!(s.preferences_path(), PathBuf::from("/home/ana/.todo/preferences.json"));
    }

    #[test]
    fn test_flag_beats_env() {
        let cli = Cli::parse_from(["todo", "--api-url", "http://localhost:8000", "list"]);
        let env = env_of(&[
            (API_URL_ENV, "https://other.example.com"),
            (API_LAYOUT_ENV, "todos"),
            (DATA_DIR_ENV, "/tmp/todo"),
        ]);
        let s = Settings::resolve_with(&cli, env).unwrap();
        assert_eq!(s.api_url, "http://localhost:8000");
        assert_eq!(s.layout, ApiLayout::Todos);
        assert_eq!(s.log_dir(), PathBuf::from("/tmp/todo/logs"));
    }

    #[test]
    fn test_rejects_bad_values() {
        let cli = Cli::parse_from(["todo", "--api-url", "ftp://nope"]);
        assert!(Settings::resolve_with(&cli, env_of(&[])).is_err());

        let cli = Cli::parse_from(["todo"]);
        assert!(Settings::resolve_with(&cli, env_of(&[(API_LAYOUT_ENV, "graphql")])).is_err());
    }
}
