//! Workbook -> case config JSON. Reads both sheets in full, builds the tree, then writes once.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::loot::{build_config, BuildError, BuildOptions, BuildReport, IdentityResolver, LootConfig};
use crate::settings::{Settings, SettingsError};
use crate::workbook::{Sheet, Workbook, WorkbookError};

pub const INSPECT_ROW_LIMIT: usize = 25;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("failed to serialize case config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub output_path: PathBuf,
    pub report: BuildReport,
}

/// Reads the configured workbook and builds the case tree without writing anything.
pub fn convert_workbook(
    workbook: &mut Workbook,
    settings: &Settings,
) -> Result<(LootConfig, BuildReport), ConvertError> {
    let rewards = workbook.sheet(&settings.sheets.rewards)?;
    let cases = workbook.sheet(&settings.sheets.cases)?;
    log_sheet(&rewards);
    log_sheet(&cases);

    let resolver = IdentityResolver::from_sheet(&rewards);
    info!(
        currencies = resolver.currency_count(),
        rewards = resolver.reward_count(),
        "loaded reward lookup tables"
    );

    let options = BuildOptions {
        strict_rewards: settings.strict_rewards,
    };
    Ok(build_config(&cases, &resolver, options)?)
}

pub fn write_config(config: &LootConfig, path: &Path) -> Result<(), ConvertError> {
    let serialized = config.to_json_pretty()?;
    let write_err = |source: std::io::Error| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, serialized).map_err(write_err)
}

/// Full run: open, build, write.
pub fn run_build(settings: &Settings) -> Result<BuildOutcome, ConvertError> {
    let mut workbook = Workbook::open(&settings.workbook)?;
    let (config, report) = convert_workbook(&mut workbook, settings)?;
    write_config(&config, &settings.output)?;
    info!(
        output = %settings.output.display(),
        cases = report.cases,
        groups = report.groups,
        rewards = report.rewards,
        unresolved = report.unresolved.len(),
        "case config written"
    );
    Ok(BuildOutcome {
        output_path: settings.output.clone(),
        report,
    })
}

fn log_sheet(sheet: &Sheet) {
    info!(
        sheet = %sheet.name,
        used_rows = sheet.used_rows().count(),
        "loaded sheet"
    );
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetPreview {
    pub name: String,
    pub used_rows: usize,
    pub width: usize,
    /// (row number, cell texts) for the first used rows.
    pub rows: Vec<(usize, Vec<String>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookPreview {
    pub sheet_names: Vec<String>,
    pub sheets: Vec<SheetPreview>,
}

/// Sheet list plus the first `limit` used rows of each configured sheet.
pub fn inspect_workbook(settings: &Settings, limit: usize) -> Result<WorkbookPreview, ConvertError> {
    let mut workbook = Workbook::open(&settings.workbook)?;
    let sheet_names = workbook.sheet_names()?;
    let mut sheets = Vec::new();
    for name in [&settings.sheets.cases, &settings.sheets.rewards] {
        let sheet = workbook.sheet(name)?;
        sheets.push(preview(&sheet, limit));
    }
    Ok(WorkbookPreview {
        sheet_names,
        sheets,
    })
}

fn preview(sheet: &Sheet, limit: usize) -> SheetPreview {
    SheetPreview {
        name: sheet.name.clone(),
        used_rows: sheet.used_rows().count(),
        width: sheet.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0),
        rows: sheet
            .used_rows()
            .take(limit)
            .map(|row| (row.number, row.cells.iter().map(|c| c.text()).collect()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{inspect_workbook, run_build, ConvertError};
    use crate::settings::Settings;
    use crate::workbook::WorkbookError;

    fn unique_dir(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("lootcase-{name}-{stamp}"))
    }

    fn csv_workbook(name: &str) -> (PathBuf, Settings) {
        let dir = unique_dir(name);
        let book = dir.join("book");
        fs::create_dir_all(&book).expect("workbook dir should be created");
        fs::write(
            book.join("cases.csv"),
            "Case,Group,Group %,Reward,Count,Chance\nBox1,G1,10%,Gold,5,100%\n,,,Gem,1,\"5,5%\"\n",
        )
        .expect("cases sheet should be written");
        fs::write(
            book.join("rewards.csv"),
            "Name,Tech,Id,Type,,Name,Tech,Id,Type\nGold,gold,itm_gold,currency,,,,,\n,,,,,Gem,gem,itm_gem,item\n",
        )
        .expect("rewards sheet should be written");

        let mut settings = Settings::default();
        settings.workbook = book;
        settings.output = dir.join("out").join("case_config.json");
        settings.sheets.cases = "cases".to_string();
        settings.sheets.rewards = "rewards".to_string();
        (dir, settings)
    }

    #[test]
    fn build_writes_pretty_json_and_creates_parent_dirs() {
        let (dir, settings) = csv_workbook("pipeline-build");
        let outcome = run_build(&settings).expect("build should succeed");
        assert_eq!(outcome.output_path, settings.output);
        assert_eq!(outcome.report.rewards, 2);

        let written = fs::read_to_string(&settings.output).expect("output should exist");
        assert!(written.contains("\n  \"Box1\": {"));
        let json: serde_json::Value = serde_json::from_str(&written).expect("output is json");
        assert_eq!(json["Box1"]["groups"]["G1"]["rewards"]["gem"]["parameters"]["chance"], 0.055);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_sheet_aborts_without_output() {
        let (dir, mut settings) = csv_workbook("pipeline-missing");
        settings.sheets.rewards = "Nope".to_string();
        let err = run_build(&settings).expect_err("missing sheet should fail");
        assert!(matches!(
            err,
            ConvertError::Workbook(WorkbookError::MissingSheet { ref sheet, .. }) if sheet == "Nope"
        ));
        assert!(!settings.output.exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn inspect_lists_sheets_and_rows() {
        let (dir, settings) = csv_workbook("pipeline-inspect");
        let preview = inspect_workbook(&settings, 2).expect("inspect should succeed");
        assert_eq!(preview.sheet_names, vec!["cases".to_string(), "rewards".to_string()]);
        assert_eq!(preview.sheets[0].name, "cases");
        assert_eq!(preview.sheets[0].used_rows, 3);
        assert_eq!(preview.sheets[0].rows.len(), 2);
        assert_eq!(preview.sheets[0].rows[1].1[0], "Box1");

        let _ = fs::remove_dir_all(dir);
    }
}
