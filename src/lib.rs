//! Builds the loot case JSON config from the game design workbook.

pub mod cli;
pub mod loot;
pub mod pipeline;
pub mod settings;
pub mod workbook;
