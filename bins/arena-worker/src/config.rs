// Language store for the Arena worker
use crate::renderer;
use anyhow::{bail, Context, Result};
use arena_common::types::{default_version, DataType, LanguageProfile};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of languages.json. `harness` and `boilerplate` are paths
/// relative to the file.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEntry {
    pub slug: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub harness: Option<PathBuf>,
    #[serde(default)]
    pub boilerplate: Option<PathBuf>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub fallback_element_type: Option<DataType>,
}

#[derive(Debug, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageEntry>,
}

/// Language configuration manager
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    profiles: BTreeMap<String, LanguageProfile>,
}

impl LanguageConfigManager {
    /// Load language profiles from languages.json, reading each harness file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let languages_json: LanguagesJson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

        let mut profiles = BTreeMap::new();
        for entry in languages_json.languages {
            let slug = entry.slug.trim().to_lowercase();
            if slug.is_empty() {
                bail!("Language '{}' has an empty slug", entry.name);
            }
            if profiles.contains_key(&slug) {
                bail!("Duplicate language slug in {}: {}", config_path.display(), slug);
            }

            let harness = read_template(base_dir, entry.harness.as_deref(), "harness", &slug)?;
            let boilerplate =
                read_template(base_dir, entry.boilerplate.as_deref(), "boilerplate", &slug)?;
            renderer::check_boilerplate(&boilerplate, &slug)
                .with_context(|| format!("Invalid boilerplate for '{}'", slug))?;

            profiles.insert(
                slug.clone(),
                LanguageProfile {
                    slug,
                    name: entry.name,
                    version: entry.version,
                    harness,
                    boilerplate,
                    extension: entry.extension,
                    fallback_element_type: entry.fallback_element_type,
                },
            );
        }

        if profiles.is_empty() {
            bail!("No languages configured in {}", config_path.display());
        }

        Ok(Self { profiles })
    }

    /// Profile for a language slug, case-insensitive
    pub fn get_profile(&self, slug: &str) -> Option<&LanguageProfile> {
        self.profiles.get(&slug.trim().to_lowercase())
    }

    /// All configured slugs, sorted
    pub fn list_languages(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }
}

fn read_template(base_dir: &Path, relative: Option<&Path>, kind: &str, slug: &str) -> Result<String> {
    match relative {
        Some(relative) => {
            let path = base_dir.join(relative);
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {} for '{}': {}", kind, slug, path.display()))
        }
        None => Ok(String::new()),
    }
}
