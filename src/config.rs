//! Configuration loading and management
//!
//! Handles parsing of `tempo.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "tempo.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data file names within the data directory
    #[serde(default)]
    pub data: DataConfig,

    /// Category table: each label maps to a project-id prefix
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,

    /// Defaults applied to new tasks
    #[serde(default)]
    pub tasks: TaskDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            categories: default_categories(),
            tasks: TaskDefaults::default(),
        }
    }
}

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Task table file name
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,

    /// Progress journal file name
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_tasks_file() -> String {
    "tasks.csv".to_string()
}

fn default_log_file() -> String {
    "progress_log.csv".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
            log_file: default_log_file(),
        }
    }
}

/// One category entry: display label plus project-id prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub label: String,
    pub prefix: String,
}

fn default_categories() -> Vec<CategoryConfig> {
    [
        ("study", "STUDY"),
        ("model", "LLM"),
        ("work", "WORK"),
        ("hobby", "LIFE"),
    ]
    .into_iter()
    .map(|(label, prefix)| CategoryConfig {
        label: label.to_string(),
        prefix: prefix.to_string(),
    })
    .collect()
}

/// Defaults applied to new tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefaults {
    /// Due date offset in days when none is given
    #[serde(default = "default_due_in_days")]
    pub due_in_days: i64,

    /// Default importance for new tasks
    #[serde(default = "default_rating")]
    pub importance: u8,

    /// Default urgency for new tasks
    #[serde(default = "default_rating")]
    pub urgency: u8,
}

fn default_due_in_days() -> i64 {
    7
}

fn default_rating() -> u8 {
    5
}

impl Default for TaskDefaults {
    fn default() -> Self {
        Self {
            due_in_days: default_due_in_days(),
            importance: default_rating(),
            urgency: default_rating(),
        }
    }
}

impl Config {
    /// Load configuration from a `tempo.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &PathBuf) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve a category label to its project-id prefix
    pub fn prefix_for(&self, label: &str) -> crate::error::Result<&str> {
        self.categories
            .iter()
            .find(|entry| entry.label.eq_ignore_ascii_case(label.trim()))
            .map(|entry| entry.prefix.as_str())
            .ok_or_else(|| crate::error::Error::UnknownCategory(label.to_string()))
    }

    /// All configured category labels, in table order
    pub fn category_labels(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(|entry| entry.label.as_str())
            .collect()
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.categories.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "categories cannot be empty".to_string(),
            ));
        }

        let mut labels = std::collections::HashSet::new();
        let mut prefixes = std::collections::HashSet::new();
        for entry in &self.categories {
            let label = entry.label.trim();
            if label.is_empty() {
                return Err(crate::error::Error::InvalidConfig(
                    "categories cannot include empty labels".to_string(),
                ));
            }
            if !labels.insert(label.to_ascii_lowercase()) {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "categories has duplicate label '{label}'"
                )));
            }

            let prefix = entry.prefix.trim();
            if prefix.is_empty() {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "category '{label}' has an empty prefix"
                )));
            }
            if !prefix
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() && !ch.is_ascii_lowercase())
            {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "category prefix '{prefix}' must be uppercase alphanumeric"
                )));
            }
            if !prefixes.insert(prefix.to_string()) {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "categories has duplicate prefix '{prefix}'"
                )));
            }
        }

        if self.tasks.due_in_days < 0 {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.due_in_days cannot be negative".to_string(),
            ));
        }
        for (field, value) in [
            ("tasks.importance", self.tasks.importance),
            ("tasks.urgency", self.tasks.urgency),
        ] {
            if !(1..=10).contains(&value) {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "{field} must be in 1..=10, got {value}"
                )));
            }
        }

        if self.data.tasks_file.trim().is_empty() || self.data.log_file.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "data file names cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_four_categories() {
        let config = Config::default();
        assert_eq!(config.categories.len(), 4);
        assert_eq!(config.prefix_for("study").unwrap(), "STUDY");
        assert_eq!(config.prefix_for("WORK").unwrap(), "WORK");
        assert_eq!(config.tasks.due_in_days, 7);
    }

    #[test]
    fn unknown_category_is_user_error() {
        let config = Config::default();
        let err = config.prefix_for("cooking").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_codes::USER_ERROR);
    }

    #[test]
    fn rejects_lowercase_prefix() {
        let parsed: Config = toml::from_str(
            r#"
            [[categories]]
            label = "study"
            prefix = "study"
            "#,
        )
        .unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_labels() {
        let parsed: Config = toml::from_str(
            r#"
            [[categories]]
            label = "study"
            prefix = "STUDY"

            [[categories]]
            label = "Study"
            prefix = "SCH"
            "#,
        )
        .unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn load_from_missing_dir_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.data.tasks_file, "tasks.csv");
    }
}
