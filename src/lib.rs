//! Scholarship matching: eligibility checks, match scoring and catalog
//! search over scholarship listings, plus the stores and reports the CLI
//! builds on them.

pub mod config;
pub mod db;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod report;
pub mod scoring;
pub mod search;
pub mod seed;
pub mod store;
pub mod trace;

pub use eligibility::is_eligible;
pub use models::*;
pub use scoring::{recommend, recommend_for, score, RecommendPolicy};
pub use search::{search, SearchCriteria};
