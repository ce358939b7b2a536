//! Skill gap library: resume-to-job matching and learning-plan optimization

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod optimization;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, SkillGapError};
pub use processing::analyzer::{AnalysisEngine, JobSource};
