//! Named connection contexts for the CLI.
//!
//! A context pairs an organization URL with an API token. Contexts are kept
//! in a YAML file together with the selector of the current one:
//!
//! ```yaml
//! contexts:
//!   - url: https://app.example.com
//!     organization: acme
//!     apiToken: ...
//! currentContext: https://app.example.com/acme
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from the context store.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write configuration: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("no contexts configured")]
    NoContexts,

    #[error("context selector is required")]
    SelectorRequired,

    #[error("context {0:?} not found")]
    NotFound(String),

    #[error("organization URL is required")]
    UrlRequired,

    #[error("API token is required")]
    TokenRequired,
}

pub type Result<T> = std::result::Result<T, ContextError>;

/// One organization the CLI can talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigContext {
    pub url: String,
    pub organization: String,
    pub api_token: String,
}

impl ConfigContext {
    /// Trim every field and drop trailing slashes from the URL.
    #[must_use]
    pub fn normalize(&self) -> Self {
        Self {
            url: normalize_base_url(&self.url),
            organization: self.organization.trim().to_string(),
            api_token: self.api_token.trim().to_string(),
        }
    }

    /// `<url>/<organization>` for the normalized context.
    #[must_use]
    pub fn selector(&self) -> String {
        let context = self.normalize();
        format!("{}/{}", context.url, context.organization)
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Normalize a user-supplied selector so it compares equal to
/// [`ConfigContext::selector`].
#[must_use]
pub fn normalize_selector(raw: &str) -> String {
    let selector = raw.trim().trim_end_matches('/');

    match selector.rfind('/') {
        Some(split) if split > 0 && split < selector.len() - 1 => {
            let base_url = normalize_base_url(&selector[..split]);
            let organization = selector[split + 1..].trim();
            format!("{base_url}/{organization}")
        }
        _ => selector.to_string(),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigFile {
    contexts: Vec<ConfigContext>,
    current_context: String,
}

/// Contexts backed by a YAML file.
#[derive(Debug)]
pub struct ContextStore {
    path: PathBuf,
    file: ConfigFile,
}

impl ContextStore {
    /// Load the store from `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let file = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ContextError::Read {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                ConfigFile::default()
            } else {
                serde_yaml::from_str(&content)?
            }
        } else {
            ConfigFile::default()
        };

        Ok(Self { path, file })
    }

    /// File backing the store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalized contexts that have both a URL and a token.
    #[must_use]
    pub fn contexts(&self) -> Vec<ConfigContext> {
        self.file
            .contexts
            .iter()
            .map(ConfigContext::normalize)
            .filter(|c| !c.url.is_empty() && !c.api_token.is_empty())
            .collect()
    }

    /// The context named by `currentContext`, if it still exists.
    #[must_use]
    pub fn current_context(&self) -> Option<ConfigContext> {
        let current = normalize_selector(&self.file.current_context);
        if current.is_empty() {
            return None;
        }

        self.contexts().into_iter().find(|c| c.selector() == current)
    }

    /// Make the context matching `selector` current and persist.
    pub fn select(&mut self, selector: &str) -> Result<ConfigContext> {
        let contexts = self.contexts();
        if contexts.is_empty() {
            return Err(ContextError::NoContexts);
        }

        let selector = normalize_selector(selector);
        if selector.is_empty() {
            return Err(ContextError::SelectorRequired);
        }

        let selected = contexts
            .into_iter()
            .find(|c| c.selector() == selector)
            .ok_or(ContextError::NotFound(selector))?;

        self.file.current_context = selected.selector();
        self.save()?;

        debug!(context = %self.file.current_context, "Selected context");
        Ok(selected)
    }

    /// Add or replace a context, make it current and persist.
    pub fn upsert(&mut self, context: &ConfigContext) -> Result<ConfigContext> {
        let context = context.normalize();
        if context.url.is_empty() {
            return Err(ContextError::UrlRequired);
        }
        if context.api_token.is_empty() {
            return Err(ContextError::TokenRequired);
        }

        let selector = context.selector();
        let mut contexts = self.contexts();
        match contexts.iter_mut().find(|c| c.selector() == selector) {
            Some(existing) => *existing = context.clone(),
            None => contexts.push(context.clone()),
        }

        self.file.contexts = contexts;
        self.file.current_context = selector;
        self.save()?;

        debug!(context = %self.file.current_context, "Saved context");
        Ok(context)
    }

    /// Write the store back to its file.
    pub fn save(&self) -> Result<()> {
        let content = serde_yaml::to_string(&self.file)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(ContextError::Write)?;
        }
        std::fs::write(&self.path, content).map_err(ContextError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(url: &str, organization: &str, token: &str) -> ConfigContext {
        ConfigContext {
            url: url.to_string(),
            organization: organization.to_string(),
            api_token: token.to_string(),
        }
    }

    #[test]
    fn test_normalize_context() {
        let ctx = context("  https://app.example.com// ", " acme ", " tok\n").normalize();
        assert_eq!(ctx, context("https://app.example.com", "acme", "tok"));
        assert_eq!(ctx.selector(), "https://app.example.com/acme");
    }

    #[test]
    fn test_normalize_selector() {
        assert_eq!(
            normalize_selector(" https://app.example.com/ / acme/ "),
            "https://app.example.com/acme"
        );
        assert_eq!(normalize_selector("acme"), "acme");
        assert_eq!(normalize_selector("/acme"), "/acme");
        assert_eq!(normalize_selector("   "), "");
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::load(dir.path().join("config.yaml")).unwrap();

        assert!(store.contexts().is_empty());
        assert!(store.current_context().is_none());
    }

    #[test]
    fn test_contexts_skip_incomplete_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "contexts:\n\
             - url: https://app.example.com/\n  organization: acme\n  apiToken: tok\n\
             - url: https://other.example.com\n  organization: beta\n  apiToken: ''\n\
             - organization: gamma\n  apiToken: tok\n\
             currentContext: https://app.example.com/acme\n",
        )
        .unwrap();

        let store = ContextStore::load(&path).unwrap();
        assert_eq!(
            store.contexts(),
            vec![context("https://app.example.com", "acme", "tok")]
        );
        assert_eq!(
            store.current_context(),
            Some(context("https://app.example.com", "acme", "tok"))
        );
    }

    #[test]
    fn test_upsert_appends_replaces_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut store = ContextStore::load(&path).unwrap();

        store
            .upsert(&context("https://app.example.com/", "acme", "one"))
            .unwrap();
        store
            .upsert(&context("https://app.example.com", "beta", "two"))
            .unwrap();
        store
            .upsert(&context("https://app.example.com", "acme", "three"))
            .unwrap();

        let reloaded = ContextStore::load(&path).unwrap();
        let contexts = reloaded.contexts();
        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].api_token, "three");
        assert_eq!(
            reloaded.current_context().unwrap().selector(),
            "https://app.example.com/acme"
        );
    }

    #[test]
    fn test_upsert_requires_url_and_token() {
        let dir = TempDir::new().unwrap();
        let mut store = ContextStore::load(dir.path().join("config.yaml")).unwrap();

        assert!(matches!(
            store.upsert(&context(" ", "acme", "tok")),
            Err(ContextError::UrlRequired)
        ));
        assert!(matches!(
            store.upsert(&context("https://app.example.com", "acme", "  ")),
            Err(ContextError::TokenRequired)
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_select() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let mut store = ContextStore::load(&path).unwrap();

        assert!(matches!(
            store.select("https://app.example.com/acme"),
            Err(ContextError::NoContexts)
        ));

        store
            .upsert(&context("https://app.example.com", "acme", "one"))
            .unwrap();
        store
            .upsert(&context("https://app.example.com", "beta", "two"))
            .unwrap();

        assert!(matches!(store.select(" / "), Err(ContextError::SelectorRequired)));
        let err = store.select("https://app.example.com/gamma").unwrap_err();
        assert_eq!(
            err.to_string(),
            "context \"https://app.example.com/gamma\" not found"
        );

        let selected = store.select("https://app.example.com// acme").unwrap();
        assert_eq!(selected.organization, "acme");

        let reloaded = ContextStore::load(&path).unwrap();
        assert_eq!(reloaded.current_context().unwrap().organization, "acme");
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "contexts: 42\n").unwrap();

        assert!(matches!(
            ContextStore::load(&path),
            Err(ContextError::Parse(_))
        ));
    }
}
