//! Loot case config: percent parsing, reward identity lookup, the row-merge tree builder
//! and the serialized tree.

pub mod config;
pub mod hierarchy;
pub mod identity;
pub mod percent;
pub mod report;

pub use config::{CaseConfig, GroupConfig, LootConfig, RewardEntry, RewardParameters};
pub use hierarchy::{build_config, BuildError, BuildOptions};
pub use identity::{IdentityResolver, LookupTable, Resolution, RewardIdentity};
pub use percent::parse_percent;
pub use report::{BuildReport, IgnoredGroupChance, OverwrittenReward, UnresolvedReward};
