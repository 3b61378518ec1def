//! Route table configuration: a file listing patterns and their payloads,
//! loaded once at startup and fed into [`crate::routing::Router::add`].

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A single route entry as read from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub pattern: String,
    #[serde(default)]
    pub payload: HashMap<String, String>,
}

/// The full set of routes to build a [`crate::routing::Router`] from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTableConfig {
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl RouteTableConfig {
    /// Loads a route table from a file (`.toml` or `.json`). When the file
    /// does not exist, falls back to an empty table rather than failing —
    /// the router then simply matches nothing until routes are added
    /// programmatically.
    pub fn load(path: &Path) -> Result<Self> {
        let config: RouteTableConfig = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => toml::from_str(&content)?,
                Some("json") => serde_json::from_str(&content)?,
                Some(ext) => anyhow::bail!("unsupported route table format: .{ext}, use .toml or .json"),
                None => anyhow::bail!("route table file has no extension, use .toml or .json"),
            }
        } else {
            tracing::info!(
                "route table not found at {}, starting with an empty router",
                path.display()
            );
            RouteTableConfig::default()
        };

        config.validate()?;
        tracing::info!(routes = config.routes.len(), "loaded route table");
        Ok(config)
    }

    /// Rejects duplicate patterns upfront — `Router::add` would silently
    /// merge them, which is correct behavior for programmatic use but a
    /// likely copy-paste mistake in a config file.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.routes {
            if !seen.insert(&entry.pattern) {
                anyhow::bail!("duplicate route pattern in config: {}", entry.pattern);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_when_file_missing() {
        let config = RouteTableConfig::load(Path::new("/nonexistent/routes.toml")).unwrap();
        assert!(config.routes.is_empty());
    }

    #[test]
    fn validate_rejects_duplicate_patterns() {
        let config = RouteTableConfig {
            routes: vec![
                RouteEntry { pattern: "/a".to_string(), payload: HashMap::new() },
                RouteEntry { pattern: "/a".to_string(), payload: HashMap::new() },
            ],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_toml_route_table() {
        let toml_src = r#"
            [[routes]]
            pattern = "/users/{id:digit}"
            payload = { handler = "get_user" }
        "#;
        let config: RouteTableConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].pattern, "/users/{id:digit}");
        assert_eq!(config.routes[0].payload.get("handler"), Some(&"get_user".to_string()));
    }
}
