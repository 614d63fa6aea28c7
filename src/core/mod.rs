//! Core business logic: targets, rebalancing, text extraction and their abstractions

pub mod alias;
pub mod cache;
pub mod config;
pub mod extract;
pub mod format;
pub mod history;
pub mod holdings;
pub mod log;
pub mod ocr;
pub mod portfolio;
pub mod rebalance;
pub mod snapshot;
pub mod sort;
pub mod targets;

// Re-export main types for cleaner imports
pub use alias::{AliasGroup, AliasResolver};
pub use holdings::{CustomStock, Holding, IndexSnapshot};
pub use ocr::TextRecognizer;
pub use rebalance::{CurrentValues, PlanRow, Policy, RebalancePlan};
pub use snapshot::{HistoryProvider, SnapshotProvider};
pub use targets::{Target, TargetSet};
