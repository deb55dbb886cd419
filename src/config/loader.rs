use crate::config::schema::PanelConfig;
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<PanelConfig> {
        let path = path.as_ref();
        let mut visited = HashSet::new();
        let mut tree = Self::load_with_inheritance(path, &mut visited)?;
        if let Value::Object(map) = &mut tree {
            map.remove("extends");
        }

        let config: PanelConfig = serde_json::from_value(tree)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus an explicit backend URL, for runs without a config file.
    pub fn from_base_url(base_url: &str) -> Result<PanelConfig> {
        let config = PanelConfig {
            base_url: base_url.to_string(),
            ..PanelConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the raw settings tree of `path` with its ancestors merged in.
    /// Defaults are applied once, after the whole chain is merged.
    fn load_with_inheritance(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Value> {
        let path = fs::canonicalize(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        if !visited.insert(path.clone()) {
            return Err(Error::Config(format!(
                "Circular inheritance detected involving {}",
                path.display()
            )));
        }

        let tree = Self::load_file(&path)?;
        if !tree.is_object() {
            return Err(Error::Config(format!(
                "{}: expected a table of settings",
                path.display()
            )));
        }

        let parent = match tree.get("extends") {
            Some(Value::String(parent)) => parent.clone(),
            Some(Value::Null) | None => return Ok(tree),
            Some(other) => {
                return Err(Error::Config(format!(
                    "{}: extends must be a path, got {}",
                    path.display(),
                    other
                )));
            }
        };

        let parent_path = path
            .parent()
            .ok_or_else(|| {
                Error::Config(format!(
                    "Cannot determine parent directory for {}",
                    path.display()
                ))
            })?
            .join(parent);

        let mut merged = Self::load_with_inheritance(&parent_path, visited)?;
        Self::merge_trees(&mut merged, tree);
        Ok(merged)
    }

    fn load_file(path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Value> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(content)?),
            Some("toml") => Ok(toml::from_str(content)?),
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    /// Every key the child writes wins, tables are merged key by key.
    fn merge_trees(parent: &mut Value, child: Value) {
        match (parent, child) {
            (Value::Object(parent), Value::Object(child)) => {
                for (key, value) in child {
                    match parent.get_mut(&key) {
                        Some(existing) if existing.is_object() && value.is_object() => {
                            Self::merge_trees(existing, value);
                        }
                        Some(existing) => *existing = value,
                        None => {
                            parent.insert(key, value);
                        }
                    }
                }
            }
            (parent, child) => *parent = child,
        }
    }
}
