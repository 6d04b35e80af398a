// SPDX-License-Identifier: MPL-2.0-only

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

use crate::NAME;

pub static WORKSPACE_NAMES_PATH: &str = "workspace-names.ron";

/// Name-per-workspace store, index aligned with workspace indices.
///
/// Entries may be empty, in which case the generated default name is used.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct WorkspaceNames {
    names: Vec<String>,
}

impl From<Vec<String>> for WorkspaceNames {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl WorkspaceNames {
    /// Display name of the workspace at `index`.
    pub fn name(&self, index: usize) -> String {
        match self.names.get(index) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Workspace {}", index + 1),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Replace the name at `index`, padding with empty names if the store is shorter.
    pub fn set(&mut self, index: usize, label: impl Into<String>) {
        if index >= self.names.len() {
            self.names.resize(index + 1, String::new());
        }
        self.names[index] = label.into();
    }

    /// Insert a name before `index`, shifting later names by one.
    pub fn insert(&mut self, index: usize, label: impl Into<String>) {
        if index > self.names.len() {
            self.names.resize(index, String::new());
        }
        self.names.insert(index, label.into());
    }

    /// Remove the name at `index` and drop the empty names left at the tail.
    pub fn remove(&mut self, index: usize) {
        if index >= self.names.len() {
            return;
        }
        self.names.remove(index);
        while self.names.last().is_some_and(|n| n.is_empty()) {
            self.names.pop();
        }
    }

    /// Path of the store in the xdg config directory, created if necessary.
    pub fn path() -> anyhow::Result<PathBuf> {
        let xdg = BaseDirectories::with_prefix(NAME)?;
        Ok(xdg.place_config_file(WORKSPACE_NAMES_PATH)?)
    }

    pub fn load() -> anyhow::Result<Self> {
        let path = match BaseDirectories::with_prefix(NAME)
            .map(|dirs| dirs.find_config_file(WORKSPACE_NAMES_PATH))
        {
            Ok(Some(path)) => path,
            _ => anyhow::bail!("Failed to find workspace names file"),
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                anyhow::bail!("Failed to open '{}': {}", path.display(), err);
            }
        };

        match ron::de::from_reader::<_, Self>(file) {
            Ok(names) => Ok(names),
            Err(err) => {
                anyhow::bail!("Failed to parse '{}': {}", path.display(), err);
            }
        }
    }

    /// A missing store is the same as an empty one.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(names) => names,
            Err(err) => {
                tracing::debug!("Using generated workspace names: {}", err);
                Self::default()
            }
        }
    }

    pub fn write(&self) -> anyhow::Result<()> {
        self.write_to(&Self::path()?)
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let f = File::create(path)?;
        ron::ser::to_writer_pretty(&f, self, ron::ser::PrettyConfig::default())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> WorkspaceNames {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
    }

    #[test]
    fn missing_and_empty_names_fall_back_to_generated_ones() {
        let store = names(&["Mail", ""]);
        assert_eq!(store.name(0), "Mail");
        assert_eq!(store.name(1), "Workspace 2");
        assert_eq!(store.name(5), "Workspace 6");
    }

    #[test]
    fn set_pads_the_store() {
        let mut store = WorkspaceNames::default();
        store.set(2, "Music");
        assert_eq!(store.as_slice(), &["", "", "Music"]);
    }

    #[test]
    fn insert_shifts_later_names() {
        let mut store = names(&["Web", "Chat"]);
        store.insert(1, "Code");
        assert_eq!(store.as_slice(), &["Web", "Code", "Chat"]);
        store.insert(5, "Games");
        assert_eq!(store.as_slice(), &["Web", "Code", "Chat", "", "", "Games"]);
    }

    #[test]
    fn remove_trims_trailing_empty_names() {
        let mut store = names(&["Web", "", "", "Chat"]);
        store.remove(3);
        assert_eq!(store.as_slice(), &["Web"]);
        store.remove(7);
        assert_eq!(store.as_slice(), &["Web"]);
    }

    #[test]
    fn store_is_a_plain_list_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WORKSPACE_NAMES_PATH);
        std::fs::write(&path, r#"["One", "Two"]"#).unwrap();
        let store = WorkspaceNames::load_from(&path).unwrap();
        assert_eq!(store, names(&["One", "Two"]));

        let mut store = store;
        store.set(0, "Uno");
        store.write_to(&path).unwrap();
        assert_eq!(WorkspaceNames::load_from(&path).unwrap().name(0), "Uno");
    }
}
