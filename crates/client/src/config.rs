//! Client configuration.

use std::path::PathBuf;

use crate::guard::RouteTable;
use crate::storage::sqlite;

pub const NAMESPACE_ENV: &str = "REVISO_STORAGE_NAMESPACE";
pub const DATA_DIR_ENV: &str = "REVISO_DATA_DIR";
pub const DEFAULT_NAMESPACE: &str = "reviso";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every session key in storage.
    pub namespace: String,
    /// Directory holding `session.db`; the OS data directory when unset.
    pub data_dir: Option<PathBuf>,
    pub routes: RouteTable,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data_dir: None,
            routes: RouteTable::default(),
        }
    }
}

impl ClientConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the environment in practice).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(NAMESPACE_ENV) {
            let namespace = raw.trim();
            if namespace.is_empty() {
                tracing::warn!("{NAMESPACE_ENV} is blank; using {DEFAULT_NAMESPACE:?}");
            } else {
                config.namespace = namespace.to_string();
            }
        }

        config.data_dir = lookup(DATA_DIR_ENV)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        config
    }

    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        sqlite::default_path(self.data_dir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.namespace, "reviso");
        assert_eq!(config.routes.onboarding, "/form");
    }

    #[test]
    fn overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup(&[
            (NAMESPACE_ENV, " campus-a "),
            (DATA_DIR_ENV, "/tmp/reviso-test"),
        ]));
        assert_eq!(config.namespace, "campus-a");
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/reviso-test/session.db")
        );
    }

    #[test]
    fn blank_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[(NAMESPACE_ENV, "  "), (DATA_DIR_ENV, "")]));
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.data_dir, None);
    }
}
