//! Project settings store
//!
//! Reads and writes `.frosting.toml` in the source directory. The file is
//! human-edited, so it is held as a [`toml_edit::DocumentMut`] and edits
//! preserve comments and formatting.
//!
//! Value resolution order is: command-line override, then persisted value,
//! then hard-coded default. Supplying an override writes it back to the
//! file immediately, before any command action runs, so the override
//! survives a crash mid-command.
//!
//! The source directory and the config path itself are never persisted
//! here: the config file cannot record where to find itself.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table, Value};

use crate::error::ConfigError;
use crate::infra::filesystem::atomic_write;

/// The persisted project settings
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    doc: DocumentMut,
}

impl Settings {
    /// Load settings from a file. A missing file is an empty document;
    /// malformed TOML is a fatal parse error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let doc = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
            content.parse::<DocumentMut>().map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?
        } else {
            DocumentMut::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the document to disk, atomically.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }
        atomic_write(&self.path, &self.doc.to_string()).map_err(|e| ConfigError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }

    fn find(&self, key: &str) -> Option<&Item> {
        let mut item = self.doc.as_item();
        for segment in key.split('.') {
            item = item.as_table_like()?.get(segment)?;
        }
        Some(item)
    }

    /// Get a string value by dotted key
    pub fn get_str(&self, key: &str) -> Option<String> {
        let item = self.find(key)?;
        let value = item.as_str();
        if value.is_none() {
            tracing::warn!("Ignoring non-string value for '{key}'");
        }
        value.map(str::to_string)
    }

    /// Get a boolean value by dotted key
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let item = self.find(key)?;
        let value = item.as_bool();
        if value.is_none() {
            tracing::warn!("Ignoring non-boolean value for '{key}'");
        }
        value
    }

    /// Get an integer value by dotted key
    pub fn get_int(&self, key: &str) -> Option<i64> {
        let item = self.find(key)?;
        let value = item.as_integer();
        if value.is_none() {
            tracing::warn!("Ignoring non-integer value for '{key}'");
        }
        value
    }

    /// Get an array of strings by dotted key
    pub fn get_str_array(&self, key: &str) -> Option<Vec<String>> {
        let array = self.find(key)?.as_array()?;
        Some(
            array
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }

    /// Get a table of string values by dotted key
    pub fn get_str_map(&self, key: &str) -> BTreeMap<String, String> {
        let Some(table) = self.find(key).and_then(Item::as_table_like) else {
            return BTreeMap::new();
        };
        table
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.to_string(), s.to_string())))
            .collect()
    }

    /// Set a value by dotted key, creating intermediate tables as needed.
    ///
    /// A non-table value sitting where a parent table belongs is replaced,
    /// mirroring how the read path ignores type mismatches.
    pub fn set<V: Into<Value>>(&mut self, key: &str, value: V) {
        let segments: Vec<&str> = key.split('.').collect();
        let (leaf, parents) = segments.split_last().expect("key is never empty");
        let mut item = self.doc.as_item_mut();
        for segment in parents {
            let table = item
                .as_table_like_mut()
                .expect("parent segments are always tables");
            let usable = table.get(segment).is_some_and(|i| i.as_table_like().is_some());
            if !usable {
                if table.get(segment).is_some() {
                    tracing::warn!("Replacing non-table value for '{segment}' in '{key}'");
                }
                let mut child = Table::new();
                child.set_implicit(true);
                table.insert(segment, Item::Table(child));
            }
            item = table.get_mut(segment).expect("segment inserted above");
        }
        item.as_table_like_mut()
            .expect("parent segments are always tables")
            .insert(leaf, Item::Value(value.into()));
    }

    /// Remove a value by dotted key, pruning tables left empty.
    pub fn remove(&mut self, key: &str) {
        let segments: Vec<&str> = key.split('.').collect();
        Self::remove_in(self.doc.as_table_mut(), &segments);
    }

    fn remove_in(table: &mut Table, segments: &[&str]) {
        match segments {
            [] => {}
            [leaf] => {
                table.remove(leaf);
            }
            [head, rest @ ..] => {
                if let Some(child) = table.get_mut(head).and_then(Item::as_table_mut) {
                    Self::remove_in(child, rest);
                    if child.is_empty() {
                        table.remove(head);
                    }
                }
            }
        }
    }

    /// Resolve a string setting: CLI override, then persisted value, then
    /// default. An override is persisted immediately.
    pub fn resolve_str(
        &mut self,
        key: &str,
        cli: Option<&str>,
        default: &str,
    ) -> Result<String, ConfigError> {
        if let Some(value) = cli {
            self.set(key, value);
            self.save()?;
            return Ok(value.to_string());
        }
        Ok(self.get_str(key).unwrap_or_else(|| default.to_string()))
    }

    /// Resolve an optional string setting (no hard-coded default).
    pub fn resolve_opt_str(
        &mut self,
        key: &str,
        cli: Option<&str>,
    ) -> Result<Option<String>, ConfigError> {
        if let Some(value) = cli {
            self.set(key, value);
            self.save()?;
            return Ok(Some(value.to_string()));
        }
        Ok(self.get_str(key))
    }

    /// Resolve a boolean setting.
    pub fn resolve_bool(
        &mut self,
        key: &str,
        cli: Option<bool>,
        default: bool,
    ) -> Result<bool, ConfigError> {
        if let Some(value) = cli {
            self.set(key, value);
            self.save()?;
            return Ok(value);
        }
        Ok(self.get_bool(key).unwrap_or(default))
    }

    /// Resolve an unsigned integer setting.
    pub fn resolve_usize(
        &mut self,
        key: &str,
        cli: Option<usize>,
        default: usize,
    ) -> Result<usize, ConfigError> {
        if let Some(value) = cli {
            self.set(key, i64::try_from(value).unwrap_or(i64::MAX));
            self.save()?;
            return Ok(value);
        }
        let persisted = self
            .get_int(key)
            .and_then(|v| usize::try_from(v).ok());
        Ok(persisted.unwrap_or(default))
    }

    /// Resolve a map-valued setting: start from the persisted table, apply
    /// additions, then removals, and write the result back. A result equal
    /// to the (empty) default is deleted rather than stored.
    pub fn resolve_map(
        &mut self,
        key: &str,
        adds: &BTreeMap<String, String>,
        removes: &[String],
    ) -> Result<BTreeMap<String, String>, ConfigError> {
        let before = self.get_str_map(key);
        let mut merged = before.clone();
        for (name, value) in adds {
            merged.insert(name.clone(), value.clone());
        }
        for name in removes {
            merged.remove(name);
        }
        if merged != before {
            if merged.is_empty() {
                self.remove(key);
            } else {
                let mut table = toml_edit::InlineTable::new();
                for (name, value) in &merged {
                    table.insert(name, value.as_str().into());
                }
                self.set(key, Value::InlineTable(table));
            }
            self.save()?;
        }
        Ok(merged)
    }

    /// Ensure a string is a member of an array-valued setting, persisting
    /// the addition.
    pub fn ensure_member(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut members = self.get_str_array(key).unwrap_or_default();
        if members.iter().any(|m| m == value) {
            return Ok(());
        }
        members.push(value.to_string());
        let array: toml_edit::Array = members.iter().map(String::as_str).collect();
        self.set(key, Value::Array(array));
        self.save()
    }
}
