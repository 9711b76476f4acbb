//! In-memory case config tree and its JSON shape.
//! Keys keep first-insertion order at every level so the written file diffs cleanly.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;

use crate::loot::identity::RewardIdentity;

/// Returns the value under `key`, inserting `make()` at the end if absent. The flag is true on insert.
pub fn get_or_insert_with<'m, V>(
    map: &'m mut IndexMap<String, V>,
    key: &str,
    make: impl FnOnce() -> V,
) -> (&'m mut V, bool) {
    match map.entry(key.to_string()) {
        Entry::Occupied(entry) => (entry.into_mut(), false),
        Entry::Vacant(entry) => (entry.insert(make()), true),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardParameters {
    pub count: i64,
    pub item_id: String,
    pub chance: f64,
}

/// One reward inside a group. `reward_type` is None for names neither lookup table knows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardEntry {
    #[serde(rename = "type")]
    pub reward_type: Option<String>,
    pub parameters: RewardParameters,
}

impl RewardEntry {
    pub fn resolved(identity: &RewardIdentity, count: i64, chance: f64) -> Self {
        RewardEntry {
            reward_type: Some(identity.reward_type.clone()),
            parameters: RewardParameters {
                count,
                item_id: identity.item_id.clone(),
                chance,
            },
        }
    }

    pub fn unresolved(count: i64, chance: f64) -> Self {
        RewardEntry {
            reward_type: None,
            parameters: RewardParameters {
                count,
                item_id: String::new(),
                chance,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupConfig {
    pub group_chance: f64,
    pub rewards: IndexMap<String, RewardEntry>,
}

impl GroupConfig {
    pub fn new(group_chance: f64) -> Self {
        GroupConfig {
            group_chance,
            rewards: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CaseConfig {
    pub groups: IndexMap<String, GroupConfig>,
}

/// The root artifact: case name -> case.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct LootConfig {
    pub cases: IndexMap<String, CaseConfig>,
}

impl LootConfig {
    pub fn case_mut(&mut self, case: &str) -> (&mut CaseConfig, bool) {
        get_or_insert_with(&mut self.cases, case, CaseConfig::default)
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    pub fn group_count(&self) -> usize {
        self.cases.values().map(|c| c.groups.len()).sum()
    }

    pub fn reward_count(&self) -> usize {
        self.cases
            .values()
            .flat_map(|c| c.groups.values())
            .map(|g| g.rewards.len())
            .sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{get_or_insert_with, GroupConfig, LootConfig, RewardEntry};
    use crate::loot::identity::RewardIdentity;

    #[test]
    fn overwritten_reward_keeps_its_first_position() {
        let mut rewards: IndexMap<String, RewardEntry> = IndexMap::new();
        rewards.insert("b".to_string(), RewardEntry::unresolved(1, 0.1));
        rewards.insert("a".to_string(), RewardEntry::unresolved(2, 0.2));
        let previous = rewards.insert("b".to_string(), RewardEntry::unresolved(3, 0.3));
        assert_eq!(previous.map(|r| r.parameters.count), Some(1));
        assert_eq!(rewards.keys().map(String::as_str).collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(rewards.get("b").map(|r| r.parameters.count), Some(3));
    }

    #[test]
    fn get_or_insert_reports_creation_once() {
        let mut map: IndexMap<String, Vec<u8>> = IndexMap::new();
        let (v, created) = get_or_insert_with(&mut map, "k", Vec::new);
        v.push(1);
        assert!(created);
        let (v, created) = get_or_insert_with(&mut map, "k", Vec::new);
        assert!(!created);
        assert_eq!(v, &vec![1]);
    }

    #[test]
    fn serializes_to_case_config_shape() {
        let mut config = LootConfig::default();
        let (case, _) = config.case_mut("Box");
        let (group, _) = get_or_insert_with(&mut case.groups, "G", || GroupConfig::new(0.25));
        let identity = RewardIdentity {
            technical_name: "gold".to_string(),
            item_id: "itm_gold".to_string(),
            reward_type: "currency".to_string(),
        };
        group
            .rewards
            .insert("gold".to_string(), RewardEntry::resolved(&identity, 3, 0.5));
        group
            .rewards
            .insert(String::new(), RewardEntry::unresolved(1, 0.1));

        let json = serde_json::to_value(&config).expect("config should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "Box": {"groups": {"G": {"group_chance": 0.25, "rewards": {
                    "gold": {"type": "currency", "parameters": {"count": 3, "item_id": "itm_gold", "chance": 0.5}},
                    "": {"type": null, "parameters": {"count": 1, "item_id": "", "chance": 0.1}}
                }}}}
            })
        );
        assert_eq!(config.case_count(), 1);
        assert_eq!(config.group_count(), 1);
        assert_eq!(config.reward_count(), 2);
    }

    #[test]
    fn pretty_output_preserves_insertion_order() {
        let mut config = LootConfig::default();
        config.case_mut("Zeta");
        config.case_mut("Alpha");
        let text = config.to_json_pretty().expect("config should serialize");
        let zeta = text.find("Zeta").expect("Zeta present");
        let alpha = text.find("Alpha").expect("Alpha present");
        assert!(zeta < alpha);
    }
}
