//! Output formatters: colored console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::optimization::solver::SolverStatus;
use crate::output::report::*;
use crate::processing::skills::{Priority, SkillCategory};
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting analysis reports
pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for structured output
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for saved reports
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates the formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn status_note(status: SolverStatus) -> &'static str {
    match status {
        SolverStatus::Optimal => "optimal plan",
        SolverStatus::DegradedSuccess => "approximate plan (relaxed solver, budgets may be slightly exceeded)",
        SolverStatus::NotSolved => "search stopped early, best plan found so far",
        SolverStatus::Infeasible => "no plan fits the budgets",
        SolverStatus::Unbounded => "solver reported an unbounded problem",
        SolverStatus::NothingToOptimize => "nothing to learn",
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            3 => "▒",
            _ => "░",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Yellow,
            _ => Color::White,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let (badge, color) = match score {
            90..=100 => ("EXCELLENT", Color::Green),
            80..=89 => ("VERY GOOD", Color::BrightGreen),
            70..=79 => ("GOOD", Color::Yellow),
            60..=69 => ("FAIR", Color::BrightYellow),
            50..=59 => ("BELOW AVG", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn priority_color(priority: Priority) -> Color {
        match priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Cyan,
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("SKILL GAP ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));

        // Summary
        output.push_str(&self.format_header("Match Summary", 2));
        output.push_str(&format!(
            "Match Score: {}% {}\n",
            report.summary.score_percentage,
            self.format_score_badge(report.summary.score_percentage)
        ));
        output.push_str(&format!("Verdict: {}\n", self.colorize(&report.summary.verdict, Color::Cyan)));
        for category in SkillCategory::ALL {
            if report.job.list(category).is_empty() {
                continue;
            }
            let counts = report.match_details.get(category);
            output.push_str(&format!(
                "  {:<10} {}/{} (weight {:.1})\n",
                category.to_string(),
                counts.matched,
                counts.total,
                category.weight()
            ));
        }

        if !report.summary.strengths.is_empty() {
            output.push_str(&self.format_header("Strengths", 3));
            for strength in &report.summary.strengths {
                output.push_str(&format!("  • {}\n", self.colorize(strength, Color::Green)));
            }
        }

        if !report.summary.improvement_areas.is_empty() {
            output.push_str(&self.format_header("Improvement Areas", 3));
            for area in &report.summary.improvement_areas {
                output.push_str(&format!("  • {}\n", self.colorize(area, Color::Yellow)));
            }
        }

        // Missing skills
        output.push_str(&self.format_header("Missing Skills", 2));
        if report.missing.is_empty() {
            output.push_str(&self.colorize("None - every job skill is covered\n", Color::Green));
        }
        for priority in Priority::ALL {
            let skills = report.missing.get(priority);
            if skills.is_empty() {
                continue;
            }
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize(&format!("{:<6}", priority.to_string()), Self::priority_color(priority)),
                skills.join(", ")
            ));
        }

        // Learning plan
        output.push_str(&self.format_header("Learning Plan", 2));
        output.push_str(&format!(
            "Budget: {:.2} months / ${:.0} | Status: {} ({})\n",
            report.metadata.time_budget_months,
            report.metadata.cost_budget_dollars,
            report.plan.status,
            status_note(report.plan.status)
        ));
        for (priority, skill) in report.plan.selected.iter() {
            if let Some(detail) = report.plan.details.get(skill) {
                output.push_str(&format!(
                    "  • {} [{}] {:.2} months, ${:.0}\n",
                    self.colorize(skill, Color::White),
                    priority,
                    detail.time_months,
                    detail.cost_dollars
                ));
            }
        }
        if !report.plan.selected.is_empty() {
            output.push_str(&format!(
                "  Total: {:.2} months, ${:.0}\n",
                report.plan.total_time(),
                report.plan.total_cost()
            ));
        }
        output.push_str(&format!(
            "Projected score: {}% -> {}% ({:+.1} points)\n",
            report.summary.score_percentage,
            report.summary.projected_percentage,
            report.improvement.score_improvement * 100.0
        ));

        if self.detailed {
            output.push_str(&self.format_header("Detailed Analysis", 2));
            output.push_str(&format!("Resume skills: {}\n", report.resume_skills.join(", ")));
            for group in report.job.or_groups.groups() {
                output.push_str(&format!("Alternatives: {}\n", group.join(" / ")));
            }

            output.push_str(&self.format_header("Recommendations", 3));
            for (priority, items) in &report.recommendations {
                for rec in items {
                    output.push_str(&format!(
                        "{} {} ({})\n",
                        self.colorize(&format!("[{}]", priority), Self::priority_color(*priority)),
                        rec.skill,
                        rec.timeline
                    ));
                    for resource in &rec.resources {
                        output.push_str(&format!(
                            "    {}: {} {}\n",
                            resource.platform,
                            resource.course,
                            self.colorize(&resource.url, Color::BrightBlack)
                        ));
                    }
                    output.push_str(&format!("    Resume: {}\n", rec.resume_bullet));
                }
            }
        }

        output.push_str(&format!(
            "\n{} Generated by skillgap v{} | Similarity: {}\n",
            self.colorize("ℹ", Color::Blue),
            report.metadata.version,
            report.metadata.similarity_model
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_score_badge(score: u8) -> &'static str {
        match score {
            90..=100 => "🟢 Excellent",
            80..=89 => "🟡 Very Good",
            70..=79 => "🟠 Good",
            60..=69 => "🔴 Fair",
            50..=59 => "🔴 Below Average",
            _ => "🔴 Poor",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Skill Gap Analysis Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms
            ));
            let resume_name = Path::new(&report.metadata.resume_file)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| report.metadata.resume_file.clone());
            output.push_str(&format!(
                "**Resume:** `{}` | **Job:** `{}`\n\n",
                resume_name, report.metadata.job_source
            ));
        }

        output.push_str("## Summary\n\n");
        output.push_str(&format!(
            "**Match Score:** {}% {}\n\n",
            report.summary.score_percentage,
            Self::markdown_score_badge(report.summary.score_percentage)
        ));
        output.push_str(&format!("**Verdict:** {}\n\n", report.summary.verdict));

        output.push_str("| Category | Matched | Weight |\n");
        output.push_str("|----------|---------|--------|\n");
        for category in SkillCategory::ALL {
            let counts = report.match_details.get(category);
            output.push_str(&format!(
                "| {} | {}/{} | {:.1} |\n",
                category,
                counts.matched,
                counts.total,
                category.weight()
            ));
        }
        output.push('\n');

        if !report.summary.strengths.is_empty() {
            output.push_str("### Strengths\n\n");
            for strength in &report.summary.strengths {
                output.push_str(&format!("- {}\n", strength));
            }
            output.push('\n');
        }

        if !report.summary.improvement_areas.is_empty() {
            output.push_str("### Areas for Improvement\n\n");
            for area in &report.summary.improvement_areas {
                output.push_str(&format!("- {}\n", area));
            }
            output.push('\n');
        }

        output.push_str("## Missing Skills\n\n");
        if report.missing.is_empty() {
            output.push_str("Every job skill is covered.\n\n");
        }
        for priority in Priority::ALL {
            let skills = report.missing.get(priority);
            if !skills.is_empty() {
                output.push_str(&format!("- **{}:** {}\n", priority, skills.join(", ")));
            }
        }
        output.push('\n');

        output.push_str("## Learning Plan\n\n");
        output.push_str(&format!(
            "**Budget:** {:.2} months / ${:.0} | **Status:** {} ({})\n\n",
            report.metadata.time_budget_months,
            report.metadata.cost_budget_dollars,
            report.plan.status,
            status_note(report.plan.status)
        ));
        if !report.plan.selected.is_empty() {
            output.push_str("| Skill | Priority | Months | Cost |\n");
            output.push_str("|-------|----------|--------|------|\n");
            for (priority, skill) in report.plan.selected.iter() {
                if let Some(detail) = report.plan.details.get(skill) {
                    output.push_str(&format!(
                        "| {} | {} | {:.2} | ${:.0} |\n",
                        skill, priority, detail.time_months, detail.cost_dollars
                    ));
                }
            }
            output.push('\n');
        }
        output.push_str(&format!(
            "**Projected score:** {}% → {}%\n\n",
            report.summary.score_percentage, report.summary.projected_percentage
        ));

        output.push_str("## Recommendations\n\n");
        for (priority, items) in &report.recommendations {
            if items.is_empty() {
                continue;
            }
            output.push_str(&format!("### {} Priority\n\n", priority));
            for rec in items {
                output.push_str(&format!("#### {} ({})\n\n", rec.skill, rec.timeline));
                for resource in &rec.resources {
                    output.push_str(&format!("- [{}: {}]({})\n", resource.platform, resource.course, resource.url));
                }
                output.push_str(&format!("\n> {}\n\n", rec.resume_bullet));
            }
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by skillgap v{} using {}*\n",
                report.metadata.version, report.metadata.similarity_model
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_skillgap{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_skillgap{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_skillgap{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_filename() {
        assert_eq!(
            suggest_filename(&OutputFormat::Markdown, "/tmp/jane_doe.pdf", false),
            "jane_doe_skillgap.md"
        );
        assert!(suggest_filename(&OutputFormat::Json, "cv.txt", true).ends_with(".json"));
    }

    #[test]
    fn test_save_report_creates_parents() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("out.md");
        save_report_to_file("# Report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Report");
    }
}
