use std::fs;
use std::path::Path;

use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::engine::pool::{Pool, PromptItem};
use crate::error::{QuizError, Result};

#[derive(Embed)]
#[folder = "assets/datasets/"]
struct DatasetAssets;

/// Supplies prompt pools for a selection of group ids.
pub trait DatasetProvider {
    fn pool(&self, group_ids: &[String]) -> Result<Pool>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemDef {
    pub key: String,
    pub answers: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupDef {
    pub id: String,
    pub label: String,
    pub items: Vec<ItemDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetFile {
    pub name: String,
    pub groups: Vec<GroupDef>,
}

/// Groups shipped with the binary, optionally extended by `*.toml` files in a
/// user dataset directory. A user group with a bundled id replaces it.
#[derive(Clone, Debug, Default)]
pub struct BundledDatasets {
    groups: Vec<GroupDef>,
}

impl BundledDatasets {
    pub fn load(user_dir: Option<&Path>) -> Result<Self> {
        let mut datasets = Self::default();

        let mut names: Vec<String> = DatasetAssets::iter()
            .filter(|f| f.ends_with(".toml"))
            .map(|f| f.to_string())
            .collect();
        names.sort();
        for name in names {
            let Some(file) = DatasetAssets::get(&name) else {
                continue;
            };
            let content = std::str::from_utf8(file.data.as_ref()).map_err(|e| QuizError::Dataset {
                name: name.clone(),
                message: e.to_string(),
            })?;
            datasets.merge(parse_dataset(&name, content)?);
        }

        if let Some(dir) = user_dir
            && dir.is_dir()
        {
            let mut paths: Vec<_> = fs::read_dir(dir)
                .map_err(|e| QuizError::Dataset {
                    name: dir.display().to_string(),
                    message: e.to_string(),
                })?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("toml"))
                .collect();
            paths.sort();
            for path in paths {
                let name = path.display().to_string();
                let content = fs::read_to_string(&path).map_err(|e| QuizError::Dataset {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
                datasets.merge(parse_dataset(&name, &content)?);
            }
        }

        tracing::debug!(groups = datasets.groups.len(), "datasets loaded");
        Ok(datasets)
    }

    pub fn from_files(files: Vec<DatasetFile>) -> Self {
        let mut datasets = Self::default();
        for file in files {
            datasets.merge(file);
        }
        datasets
    }

    fn merge(&mut self, file: DatasetFile) {
        for group in file.groups {
            match self.groups.iter_mut().find(|g| g.id == group.id) {
                Some(existing) => *existing = group,
                None => self.groups.push(group),
            }
        }
    }

    pub fn groups(&self) -> &[GroupDef] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&GroupDef> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_ids(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.id.as_str()).collect()
    }
}

impl DatasetProvider for BundledDatasets {
    fn pool(&self, group_ids: &[String]) -> Result<Pool> {
        let mut items = Vec::new();
        for id in group_ids {
            let group = self
                .group(id)
                .ok_or_else(|| QuizError::UnknownGroup(id.clone()))?;
            for def in &group.items {
                items.push(PromptItem::new(def.key.as_str(), &def.answers)?);
            }
        }
        Pool::new(items)
    }
}

pub fn parse_dataset(name: &str, content: &str) -> Result<DatasetFile> {
    toml::from_str(content).map_err(|e| QuizError::Dataset {
        name: name.to_string(),
        message: e.to_string(),
    })
}
