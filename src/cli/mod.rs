//! CLI command handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};

use posterkit::parsers::Sheet;
use posterkit::services::format::{
    format_number_with_unit, number_to_chinese, truncate_with_ellipsis,
};
use posterkit::services::{
    fetch_and_process_capital_data, MarketDataClient, MarketDataConfig, PosterDocument,
    PosterExportService,
};
use posterkit::templates::{
    morning_session_review, parse_sheet, supported_themes, theme_class, TemplateData,
    TemplateName, Theme,
};
use posterkit::types::{CapitalFlowItem, CapitalRanking};

/// Names longer than this are cut in text tables
const NAME_WIDTH: usize = 8;

/// Data pipeline for market report posters
#[derive(Parser)]
#[command(name = "posterkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch futures capital flow and print the inflow/outflow top 20
    Capital {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Map a CSV or JSON sheet onto a template's data
    Sheet {
        /// Template name, e.g. limit-review
        template: TemplateName,

        /// Sheet file (.csv or .json)
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List templates with their disabled fields and themes
    Templates {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a poster document and write it to the export directory
    Export {
        /// Template name, e.g. morning-session-review
        template: TemplateName,

        /// Sheet file for sheet-driven templates
        #[arg(long)]
        file: Option<PathBuf>,

        /// Theme (defaults to the template's default)
        #[arg(long)]
        theme: Option<Theme>,

        /// Output directory (defaults to ~/.posterkit/exports)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Request timeout in seconds for market data
        #[arg(long)]
        timeout: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Capital { json, timeout } => run_capital(json, timeout).await,
            Commands::Sheet {
                template,
                file,
                json,
            } => run_sheet(template, &file, json),
            Commands::Templates { json } => run_templates(json),
            Commands::Export {
                template,
                file,
                theme,
                out,
                timeout,
            } => run_export(template, file.as_deref(), theme, out, timeout).await,
        }
    }
}

fn market_client(timeout: Option<u64>) -> anyhow::Result<MarketDataClient> {
    let mut config = MarketDataConfig::default();
    if let Some(secs) = timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(MarketDataClient::with_config(config)?)
}

async fn load_ranking(timeout: Option<u64>) -> anyhow::Result<CapitalRanking> {
    let client = market_client(timeout)?;
    fetch_and_process_capital_data(&client)
        .await
        .context("capital flow pipeline failed")
}

/// Output the capital ranking as JSON or two text tables
async fn run_capital(json: bool, timeout: Option<u64>) -> anyhow::Result<()> {
    let ranking = load_ranking(timeout).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }

    print_flow_table(morning_session_review::title_by_theme(Theme::Red), &ranking.inflow_top20);
    println!();
    print_flow_table(morning_session_review::title_by_theme(Theme::Blue), &ranking.outflow_top20);
    Ok(())
}

fn print_flow_table(title: &str, items: &[CapitalFlowItem]) {
    println!("{}", title);
    if items.is_empty() {
        println!("  (no data)");
        return;
    }
    for (rank, item) in items.iter().enumerate() {
        println!(
            "{:>3}  {:<10} {:<8} {:>12} {:>12} {:>7.2}%",
            rank + 1,
            truncate_with_ellipsis(&item.stock_name, NAME_WIDTH, "…"),
            item.industry,
            format_number_with_unit(item.main_funds_flow),
            format_number_with_unit(item.lower_funds_flow),
            item.limit_rate,
        );
    }
}

fn load_sheet_data(template: TemplateName, file: &Path) -> anyhow::Result<TemplateData> {
    let sheet =
        Sheet::load(file).with_context(|| format!("failed to read sheet {}", file.display()))?;
    Ok(parse_sheet(template, &sheet))
}

/// Output mapped sheet data
fn run_sheet(template: TemplateName, file: &Path, json: bool) -> anyhow::Result<()> {
    let data = load_sheet_data(template, file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    match &data {
        TemplateData::LimitReview(parts) => {
            for part in parts {
                println!("{} ({})", part.reason, part.items.len());
                for item in &part.items {
                    println!(
                        "  {:<8} {:<10} {}",
                        item.stock_code,
                        truncate_with_ellipsis(&item.stock_name, NAME_WIDTH, "…"),
                        streak_label(item.limit_times),
                    );
                }
            }
        }
        TemplateData::PerformanceForecast(items) => {
            for item in items {
                println!(
                    "  {:<10} {:<6} {:>12} {:>7.2}%  {}",
                    truncate_with_ellipsis(&item.stock_name, NAME_WIDTH, "…"),
                    item.limit_type,
                    format_number_with_unit(item.performance_increase),
                    item.limit_rate,
                    item.industry,
                );
            }
        }
        TemplateData::MorningSessionReview(_) | TemplateData::Empty => {
            println!("{} does not read sheets", template);
        }
    }
    Ok(())
}

/// "首板", "二板", ... for a limit-up streak
fn streak_label(limit_times: u32) -> String {
    match number_to_chinese(limit_times) {
        Ok(n) => format!("{}板", n),
        Err(_) => format!("{}板", limit_times),
    }
}

/// Output the template registry
fn run_templates(json: bool) -> anyhow::Result<()> {
    let now = Local::now().naive_local();

    if json {
        let templates: Vec<serde_json::Value> = TemplateName::all()
            .iter()
            .map(|template| {
                let config = template.config_at(now);
                serde_json::json!({
                    "name": template,
                    "disabledFields": config.disabled_fields,
                    "themes": supported_themes(*template),
                    "defaultTheme": config.default_theme(),
                    "baseForm": config.base_form(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    for template in TemplateName::all() {
        let config = template.config_at(now);
        let themes: Vec<&str> = supported_themes(*template)
            .iter()
            .map(Theme::as_str)
            .collect();
        println!("{} ({})", template, template.cli_name());
        if let Some(title) = config.base_form().title {
            println!("  title:    {}", title);
        }
        println!("  disabled: {:?}", config.disabled_fields);
        println!(
            "  themes:   {}",
            if themes.is_empty() {
                "-".to_string()
            } else {
                themes.join(", ")
            }
        );
    }
    Ok(())
}

/// Build and write a poster document
async fn run_export(
    template: TemplateName,
    file: Option<&Path>,
    theme: Option<Theme>,
    out: Option<PathBuf>,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    if let Some(theme) = theme {
        if theme_class(template, theme).is_none() {
            bail!("{} does not offer theme {}", template.cli_name(), theme);
        }
    }

    let now = Local::now().naive_local();

    let data = match (template, file) {
        (TemplateName::MorningSessionReview, _) => {
            let theme = theme
                .or_else(|| template.config_at(now).default_theme())
                .unwrap_or(Theme::Red);
            let ranking = load_ranking(timeout).await?;
            TemplateData::MorningSessionReview(morning_session_review::select(theme, &ranking))
        }
        (TemplateName::LimitReview | TemplateName::PerformanceForecast, Some(file)) => {
            load_sheet_data(template, file)?
        }
        (TemplateName::LimitReview | TemplateName::PerformanceForecast, None) => {
            bail!("{} needs a sheet: pass --file", template.cli_name())
        }
        (TemplateName::SimpleTemplate | TemplateName::ImageFrame, _) => TemplateData::Empty,
    };

    let document = PosterDocument::build(template, theme, data, now)?;
    let service = match out {
        Some(dir) => PosterExportService::with_output_dir(dir),
        None => PosterExportService::new()?,
    };
    let path = service.write(&document)?;
    println!("{}", path.display());
    Ok(())
}
