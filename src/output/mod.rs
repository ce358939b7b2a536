//! Report assembly and rendering

pub mod formatter;
pub mod recommendations;
pub mod report;
