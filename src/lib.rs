//! Resolve BattleScribe/BSData catalogues into the flat faction documents the
//! army builder loads, then merge, validate and reconcile them.

pub mod bsdata;
pub mod cli;
pub mod config;
pub mod error;
pub mod factions;
pub mod files;
pub mod generate;
pub mod report;
pub mod sync;
pub mod validate;
