//! CLI interface for the skill gap analyzer

use crate::config::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "skillgap")]
#[command(about = "Resume skill-gap analysis and learning-plan optimization")]
#[command(long_about = "Compare a resume against a job description or role template, list the missing skills by priority, and pick the skills worth learning within a time and cost budget")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a resume against a job
    Analyze(AnalyzeArgs),

    /// Job role templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Print the skills detected in a document
    Skills {
        /// Path to a resume or job description (PDF, DOCX, TXT, MD)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to resume file (PDF, DOCX, TXT, MD)
    #[arg(short, long)]
    pub resume: PathBuf,

    /// Path to job description file (TXT, MD)
    #[arg(short, long, required_unless_present = "template")]
    pub job: Option<PathBuf>,

    /// Job role template name (see `templates list`); with --job, used when
    /// the description names no required skills
    #[arg(short, long)]
    pub template: Option<String>,

    /// Learning time budget in months
    #[arg(long)]
    pub time_budget: Option<f64>,

    /// Learning cost budget in dollars
    #[arg(long)]
    pub cost_budget: Option<f64>,

    /// Output format: console, json, markdown [default: from config]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Save output to file
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Use lexical similarity instead of the embedding model
    #[arg(long)]
    pub offline: bool,

    /// Output detailed analysis
    #[arg(short, long)]
    pub detailed: bool,
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List available job role templates
    List,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

/// The `--output` flag when given, otherwise the configured format
pub fn resolve_output_format(flag: Option<&str>, configured: &OutputFormat) -> Result<OutputFormat, String> {
    match flag {
        Some(format) => parse_output_format(format),
        None => Ok(configured.clone()),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
