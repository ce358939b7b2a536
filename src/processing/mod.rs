//! Skill extraction, similarity and gap analysis

pub mod analyzer;
pub mod gap_analysis;
pub mod requirements;
pub mod similarity;
pub mod skill_extractor;
pub mod skills;
