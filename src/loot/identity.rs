//! Reward identity lookup from the rewards sheet.
//!
//! The sheet carries two tables side by side: currencies in columns 1-4 (data from the
//! second used row) and general rewards in columns 6-9 (data from the third used row).
//! Both map a display name to its technical name, item id and type.

use std::collections::HashMap;

use crate::workbook::{Row, Sheet};

/// Canonical form of a reward as the runtime knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardIdentity {
    pub technical_name: String,
    pub item_id: String,
    pub reward_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    Currency,
    Reward,
}

impl LookupTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Reward => "reward",
        }
    }
}

/// Where a table sits on the rewards sheet.
#[derive(Debug, Clone, Copy)]
struct TableLayout {
    first_column: usize,
    skip_rows: usize,
}

const CURRENCY_LAYOUT: TableLayout = TableLayout {
    first_column: 1,
    skip_rows: 1,
};

const REWARD_LAYOUT: TableLayout = TableLayout {
    first_column: 6,
    skip_rows: 2,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Resolved {
        identity: &'a RewardIdentity,
        table: LookupTable,
    },
    Unresolved,
}

impl Resolution<'_> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    currencies: HashMap<String, RewardIdentity>,
    rewards: HashMap<String, RewardIdentity>,
}

impl IdentityResolver {
    pub fn from_sheet(sheet: &Sheet) -> Self {
        IdentityResolver {
            currencies: read_table(sheet, CURRENCY_LAYOUT),
            rewards: read_table(sheet, REWARD_LAYOUT),
        }
    }

    /// Currency table first, then the reward table.
    pub fn resolve(&self, name: &str) -> Resolution<'_> {
        if let Some(identity) = self.currencies.get(name) {
            return Resolution::Resolved {
                identity,
                table: LookupTable::Currency,
            };
        }
        if let Some(identity) = self.rewards.get(name) {
            return Resolution::Resolved {
                identity,
                table: LookupTable::Reward,
            };
        }
        Resolution::Unresolved
    }

    pub fn currency_count(&self) -> usize {
        self.currencies.len()
    }

    pub fn reward_count(&self) -> usize {
        self.rewards.len()
    }
}

fn read_table(sheet: &Sheet, layout: TableLayout) -> HashMap<String, RewardIdentity> {
    sheet
        .used_rows()
        .skip(layout.skip_rows)
        .filter_map(|row| read_entry(row, layout.first_column))
        .collect()
}

fn read_entry(row: &Row, col: usize) -> Option<(String, RewardIdentity)> {
    let name = row.cell(col).trimmed();
    if name.is_empty() {
        return None;
    }
    let identity = RewardIdentity {
        technical_name: row.cell(col + 1).trimmed(),
        item_id: row
            .cell(col + 2)
            .text()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect(),
        reward_type: row.cell(col + 3).trimmed(),
    };
    Some((name, identity))
}
