//! What a build noticed but did not fail on: unresolved names, overwrites, ignored group chances.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReward {
    pub row: usize,
    pub reward_name: String,
}

/// A reward that replaced an earlier one with the same technical name in the same group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverwrittenReward {
    pub row: usize,
    pub case: String,
    pub group: String,
    pub technical_name: String,
}

/// A repeated group cell whose chance differs from the one the group was created with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgnoredGroupChance {
    pub row: usize,
    pub case: String,
    pub group: String,
    pub kept: f64,
    pub ignored: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub rows_processed: usize,
    pub cases: usize,
    pub groups: usize,
    pub rewards: usize,
    pub unresolved: Vec<UnresolvedReward>,
    pub overwritten: Vec<OverwrittenReward>,
    pub ignored_group_chances: Vec<IgnoredGroupChance>,
}

impl BuildReport {
    pub fn has_warnings(&self) -> bool {
        !self.unresolved.is_empty()
            || !self.overwritten.is_empty()
            || !self.ignored_group_chances.is_empty()
    }
}
