//! Row-merge parser for the cases sheet.
//!
//! Layout (1-based columns): case, group, group chance, reward name, count, reward chance.
//! Case and group are written once per run; blank cells inherit the value above. A group's
//! chance is taken from the row that creates the group and never changes afterwards.

use thiserror::Error;
use tracing::{debug, warn};

use crate::loot::config::{get_or_insert_with, GroupConfig, LootConfig, RewardEntry};
use crate::loot::identity::{IdentityResolver, Resolution};
use crate::loot::percent::parse_percent;
use crate::loot::report::{BuildReport, IgnoredGroupChance, OverwrittenReward, UnresolvedReward};
use crate::workbook::{Cell, Row, Sheet};

pub const CASE_COLUMN: usize = 1;
pub const GROUP_COLUMN: usize = 2;
pub const GROUP_CHANCE_COLUMN: usize = 3;
pub const REWARD_COLUMN: usize = 4;
pub const COUNT_COLUMN: usize = 5;
pub const CHANCE_COLUMN: usize = 6;

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("sheet '{sheet}' row {row} column {column}: no {key} name set on this row or any row above it")]
    MissingCarriedKey {
        sheet: String,
        row: usize,
        column: usize,
        key: &'static str,
    },
    #[error("sheet '{sheet}' row {row} column {column}: invalid reward count '{value}': {reason}")]
    InvalidCount {
        sheet: String,
        row: usize,
        column: usize,
        value: String,
        reason: String,
    },
    #[error("sheet '{sheet}' row {row} column {column}: reward '{name}' is not in the currency or reward table")]
    UnresolvedReward {
        sheet: String,
        row: usize,
        column: usize,
        name: String,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Fail on reward names neither lookup table knows instead of writing an empty-keyed entry.
    pub strict_rewards: bool,
}

/// Case and group values carried down the sheet.
#[derive(Debug, Clone, Default, PartialEq)]
struct Carry {
    case: Option<String>,
    group: Option<(String, f64)>,
}

/// One data row with its carried keys filled in.
#[derive(Debug, Clone, PartialEq)]
struct RowRecord {
    row: usize,
    case: String,
    group: String,
    group_chance: f64,
    /// Column 3 when this row names its group explicitly.
    stated_group_chance: Option<f64>,
    reward_name: String,
    count: i64,
    chance: f64,
}

impl Carry {
    fn advance(self, row: &Row, sheet: &str) -> Result<(Carry, RowRecord), BuildError> {
        let case_cell = row.cell(CASE_COLUMN).trimmed();
        let case = if case_cell.is_empty() {
            self.case
        } else {
            Some(case_cell)
        };

        let group_cell = row.cell(GROUP_COLUMN).trimmed();
        let stated_group_chance = if group_cell.is_empty() {
            None
        } else {
            Some(parse_percent(&row.cell(GROUP_CHANCE_COLUMN).text()))
        };
        let group = match stated_group_chance {
            Some(chance) => Some((group_cell, chance)),
            None => self.group,
        };

        let missing = |column, key| BuildError::MissingCarriedKey {
            sheet: sheet.to_string(),
            row: row.number,
            column,
            key,
        };
        let case_key = case.clone().ok_or_else(|| missing(CASE_COLUMN, "case"))?;
        let (group_key, group_chance) = group.clone().ok_or_else(|| missing(GROUP_COLUMN, "group"))?;

        let count = parse_count(row.cell(COUNT_COLUMN)).map_err(|reason| BuildError::InvalidCount {
            sheet: sheet.to_string(),
            row: row.number,
            column: COUNT_COLUMN,
            value: row.cell(COUNT_COLUMN).text(),
            reason,
        })?;

        let record = RowRecord {
            row: row.number,
            case: case_key,
            group: group_key,
            group_chance,
            stated_group_chance,
            reward_name: row.cell(REWARD_COLUMN).trimmed(),
            count,
            chance: parse_percent(&row.cell(CHANCE_COLUMN).text()),
        };
        Ok((Carry { case, group }, record))
    }
}

fn parse_count(cell: &Cell) -> Result<i64, String> {
    match cell {
        Cell::Int(i) => Ok(*i),
        Cell::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Ok(*f as i64)
        }
        Cell::Float(_) => Err("not a whole number".to_string()),
        Cell::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|err| format!("not an integer ({err})")),
        Cell::Empty => Err("cell is empty".to_string()),
        Cell::Bool(_) => Err("boolean cell".to_string()),
        Cell::Error(_) => Err("cell holds a spreadsheet error".to_string()),
    }
}

/// Builds the case tree from the cases sheet. The first used row is the header.
pub fn build_config(
    sheet: &Sheet,
    resolver: &IdentityResolver,
    options: BuildOptions,
) -> Result<(LootConfig, BuildReport), BuildError> {
    let mut config = LootConfig::default();
    let mut report = BuildReport::default();

    sheet
        .used_rows()
        .skip(1)
        .try_fold(Carry::default(), |carry, row| {
            let (carry, record) = carry.advance(row, &sheet.name)?;
            apply_row(&mut config, &mut report, resolver, options, &sheet.name, record)?;
            Ok::<_, BuildError>(carry)
        })?;

    report.cases = config.case_count();
    report.groups = config.group_count();
    report.rewards = config.reward_count();
    Ok((config, report))
}

fn apply_row(
    config: &mut LootConfig,
    report: &mut BuildReport,
    resolver: &IdentityResolver,
    options: BuildOptions,
    sheet: &str,
    record: RowRecord,
) -> Result<(), BuildError> {
    let (technical_name, entry) = match resolver.resolve(&record.reward_name) {
        Resolution::Resolved { identity, table } => {
            debug!(
                row = record.row,
                reward = %record.reward_name,
                technical_name = %identity.technical_name,
                table = table.as_str(),
                "resolved reward"
            );
            (
                identity.technical_name.clone(),
                RewardEntry::resolved(identity, record.count, record.chance),
            )
        }
        Resolution::Unresolved => {
            if options.strict_rewards {
                return Err(BuildError::UnresolvedReward {
                    sheet: sheet.to_string(),
                    row: record.row,
                    column: REWARD_COLUMN,
                    name: record.reward_name,
                });
            }
            warn!(
                row = record.row,
                reward = %record.reward_name,
                "reward not found in currency or reward table; writing it under an empty key"
            );
            report.unresolved.push(UnresolvedReward {
                row: record.row,
                reward_name: record.reward_name.clone(),
            });
            (String::new(), RewardEntry::unresolved(record.count, record.chance))
        }
    };

    let (case, created) = config.case_mut(&record.case);
    if created {
        debug!(row = record.row, case = %record.case, "new case");
    }

    let (group, created) =
        get_or_insert_with(&mut case.groups, &record.group, || GroupConfig::new(record.group_chance));
    if created {
        debug!(
            row = record.row,
            case = %record.case,
            group = %record.group,
            group_chance = record.group_chance,
            "new group"
        );
    } else if let Some(stated) = record.stated_group_chance {
        if stated != group.group_chance {
            warn!(
                row = record.row,
                group = %record.group,
                kept = group.group_chance,
                ignored = stated,
                "group already exists; keeping its original chance"
            );
            report.ignored_group_chances.push(IgnoredGroupChance {
                row: record.row,
                case: record.case.clone(),
                group: record.group.clone(),
                kept: group.group_chance,
                ignored: stated,
            });
        }
    }

    if group.rewards.insert(technical_name.clone(), entry).is_some() {
        warn!(
            row = record.row,
            group = %record.group,
            technical_name = %technical_name,
            "reward listed twice in group; later row wins"
        );
        report.overwritten.push(OverwrittenReward {
            row: record.row,
            case: record.case,
            group: record.group,
            technical_name,
        });
    }
    report.rows_processed += 1;
    Ok(())
}
