//! skillgap: resume skill-gap analysis and learning-plan optimization

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use skillgap::catalog::{find_template, load_job_templates, load_skill_dictionary};
use skillgap::cli::{self, AnalyzeArgs, Cli, Commands, ConfigAction, TemplateAction};
use skillgap::config::Config;
use skillgap::error::{Result, SkillGapError};
use skillgap::input::InputManager;
use skillgap::output::formatter::{save_report_to_file, ReportGenerator};
use skillgap::processing::analyzer::{AnalysisEngine, JobSource};
use skillgap::processing::similarity::{EmbeddingOracle, LexicalOracle, SimilarityOracle};
use skillgap::processing::skill_extractor::{normalize_duplicates, skills_in_order};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

static LEXICAL_ORACLE: LexicalOracle = LexicalOracle;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Analyze(args) => run_analysis(args, config).await,

        Commands::Templates { action } => match action {
            TemplateAction::List => {
                let templates = load_job_templates(&config.data.job_templates)?;
                println!("📋 Job role templates ({}):", templates.len());
                for (name, template) in &templates {
                    println!(
                        "  • {} ({} required, {} preferred, {} bonus)",
                        name,
                        template.required.len(),
                        template.preferred.len(),
                        template.bonus.len()
                    );
                }
                Ok(())
            }
        },

        Commands::Skills { file } => {
            cli::validate_file_extension(&file, &["pdf", "docx", "txt", "md"])
                .map_err(|e| SkillGapError::InvalidInput(format!("Input file: {}", e)))?;

            let mut input_manager = InputManager::new();
            let text = input_manager.extract_file(&file).await?;
            let dictionary = load_skill_dictionary(&config.data.skill_dictionary)?;

            let ordered = skills_in_order(&text, &dictionary)?;
            let kept = normalize_duplicates(&ordered.iter().cloned().collect());
            let skills: Vec<&String> = ordered.iter().filter(|skill| kept.contains(*skill)).collect();

            println!("🔎 {} skills found in {}:", skills.len(), file.display());
            for skill in skills {
                println!("  • {}", skill);
            }
            Ok(())
        }

        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Configuration ({})", config_path.display());
                    println!("Embedding Model: {}", config.model.embedding_model);
                    println!("Models Directory: {}", config.model.models_dir.display());
                    println!("Similarity Threshold: {}", config.matching.similarity_threshold);
                    println!(
                        "Windows: category {} chars, or-group {} chars",
                        config.matching.category_window, config.matching.or_group_window
                    );
                    println!(
                        "Budgets: {:.2} months, ${:.0}",
                        config.optimization.time_budget_months, config.optimization.cost_budget_dollars
                    );
                    let weights = &config.optimization.weights;
                    println!(
                        "Weights: required {:.1}, preferred {:.1}, bonus {:.1}",
                        weights.required, weights.preferred, weights.bonus
                    );
                    println!("Output Format: {:?}", config.output.format);
                    println!("Skill Dictionary: {}", config.data.skill_dictionary.display());
                    println!("Job Templates: {}", config.data.job_templates.display());
                }
                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default().save_to(&config_path)?;
                    println!("✅ Configuration reset to defaults");
                }
            }
            Ok(())
        }
    }
}

async fn run_analysis(args: AnalyzeArgs, mut config: Config) -> Result<()> {
    info!("Starting skill gap analysis");

    cli::validate_file_extension(&args.resume, &["pdf", "docx", "txt", "md"])
        .map_err(|e| SkillGapError::InvalidInput(format!("Resume file: {}", e)))?;
    let output_format = cli::resolve_output_format(args.output.as_deref(), &config.output.format)
        .map_err(SkillGapError::InvalidInput)?;

    if let Some(months) = args.time_budget {
        config.optimization.time_budget_months = months;
    }
    if let Some(dollars) = args.cost_budget {
        config.optimization.cost_budget_dollars = dollars;
    }
    let detailed = args.detailed || config.output.detailed;

    let dictionary = load_skill_dictionary(&config.data.skill_dictionary)?;

    let mut input_manager = InputManager::new();
    let resume_text = input_manager.extract_file(&args.resume).await?;

    let template = match &args.template {
        Some(name) => {
            let templates = load_job_templates(&config.data.job_templates)?;
            Some((name.clone(), find_template(&templates, name)?.clone()))
        }
        None => None,
    };

    let job_source = match (&args.job, template) {
        (Some(job), template) => {
            cli::validate_file_extension(job, &["txt", "md"])
                .map_err(|e| SkillGapError::InvalidInput(format!("Job description file: {}", e)))?;
            let text = input_manager.extract_file(job).await?;
            match template {
                Some((name, template)) => JobSource::DescriptionWithFallback { text, name, template },
                None => JobSource::Description(text),
            }
        }
        (None, Some((name, template))) => JobSource::Template { name, template },
        (None, None) => {
            return Err(SkillGapError::InvalidInput(
                "Either --job or --template is required".to_string(),
            ))
        }
    };

    let oracle: &'static dyn SimilarityOracle = if args.offline {
        info!("Offline mode: using lexical similarity");
        &LEXICAL_ORACLE
    } else {
        EmbeddingOracle::shared(&config.embedding_model_source())
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Analyzing skills...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let engine_config = config.clone();
    let result = tokio::task::spawn_blocking(move || {
        let engine = AnalysisEngine::new(oracle, dictionary, &engine_config);
        engine.analyze(&resume_text, &job_source)
    })
    .await
    .map_err(|e| SkillGapError::Io(std::io::Error::other(e)))?;
    spinner.finish_and_clear();

    let mut report = result?;
    report.metadata.resume_file = args.resume.display().to_string();
    if let (Some(job), None) = (&args.job, &args.template) {
        report.metadata.job_source = job.display().to_string();
    }

    let generator = ReportGenerator::with_options(config.output.color_output, detailed, true, true);
    let rendered = generator.generate_report(&report, &output_format)?;

    match &args.save {
        Some(path) => {
            save_report_to_file(&rendered, path)?;
            println!("💾 Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if args.save.is_some() && output_format != skillgap::config::OutputFormat::Console {
        print_short_summary(&args.resume, report.summary.score_percentage, report.summary.projected_percentage);
    }

    Ok(())
}

fn print_short_summary(resume: &Path, score: u8, projected: u8) {
    println!("📊 {}: {}% match, {}% after the learning plan", resume.display(), score, projected);
}
