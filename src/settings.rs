//! Run configuration: workbook/output paths and sheet names.
//! Defaults, then an optional YAML file, then LOOTCASE_WORKBOOK / LOOTCASE_OUTPUT.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "lootcase.yaml";
pub const DEFAULT_WORKBOOK_PATH: &str = "data/Tech GD Test Config.xlsx";
pub const DEFAULT_OUTPUT_PATH: &str = "data/case_config.json";
pub const DEFAULT_CASES_SHEET: &str = "Кейсы Парсинг";
pub const DEFAULT_REWARDS_SHEET: &str = "Таблица Наград";

pub const CONFIG_ENV: &str = "LOOTCASE_CONFIG";
pub const WORKBOOK_ENV: &str = "LOOTCASE_WORKBOOK";
pub const OUTPUT_ENV: &str = "LOOTCASE_OUTPUT";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unable to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub cases: String,
    pub rewards: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        SheetNames {
            cases: DEFAULT_CASES_SHEET.to_string(),
            rewards: DEFAULT_REWARDS_SHEET.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub workbook: PathBuf,
    pub output: PathBuf,
    pub sheets: SheetNames,
    pub strict_rewards: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            workbook: PathBuf::from(DEFAULT_WORKBOOK_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            sheets: SheetNames::default(),
            strict_rewards: false,
        }
    }
}

impl Settings {
    pub fn from_yaml_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes as YAML null, which `#[serde(default)]` does not cover.
        if raw.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Resolves settings for a run. An explicit path (argument or LOOTCASE_CONFIG) must exist;
    /// the default `lootcase.yaml` is used only if present.
    pub fn load(explicit: Option<&str>) -> Result<Self, SettingsError> {
        let explicit = explicit
            .map(str::to_string)
            .or_else(|| env::var(CONFIG_ENV).ok().filter(|v| !v.trim().is_empty()));

        let mut settings = match explicit {
            Some(path) => Self::from_yaml_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::from_yaml_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Settings::default(),
        };
        settings.apply_overrides(|key| env::var(key).ok());
        Ok(settings)
    }

    /// Applies path overrides from a key lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(workbook) = lookup(WORKBOOK_ENV).filter(|v| !v.trim().is_empty()) {
            self.workbook = PathBuf::from(workbook);
        }
        if let Some(output) = lookup(OUTPUT_ENV).filter(|v| !v.trim().is_empty()) {
            self.output = PathBuf::from(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{Settings, DEFAULT_CASES_SHEET, DEFAULT_REWARDS_SHEET, OUTPUT_ENV, WORKBOOK_ENV};

    #[test]
    fn empty_yaml_gives_defaults() {
        let settings = Settings::from_yaml_str("").expect("empty yaml should parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.sheets.cases, DEFAULT_CASES_SHEET);
        assert_eq!(settings.sheets.rewards, DEFAULT_REWARDS_SHEET);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let settings = Settings::from_yaml_str(
            "output: out/cases.json\nsheets:\n  cases: Cases\nstrict_rewards: true\n",
        )
        .expect("yaml should parse");
        assert_eq!(settings.output, PathBuf::from("out/cases.json"));
        assert_eq!(settings.sheets.cases, "Cases");
        assert_eq!(settings.sheets.rewards, DEFAULT_REWARDS_SHEET);
        assert!(settings.strict_rewards);
        assert_eq!(settings.workbook, Settings::default().workbook);
    }

    #[test]
    fn unknown_type_is_a_parse_error() {
        assert!(Settings::from_yaml_str("strict_rewards: [1, 2]").is_err());
    }

    #[test]
    fn overrides_replace_paths_when_set() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            k if k == WORKBOOK_ENV => Some("book.xlsx".to_string()),
            k if k == OUTPUT_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(settings.workbook, PathBuf::from("book.xlsx"));
        assert_eq!(settings.output, Settings::default().output);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let path = std::env::temp_dir().join("lootcase-missing-config.yaml");
        let err = Settings::load(path.to_str()).expect_err("missing config should fail");
        assert!(err.to_string().contains("unable to read config"));
    }
}
