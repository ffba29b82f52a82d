//! Status command

use anyhow::{Context, Result};
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use console::style;
use lifeline_resolver::LineReport;
use tabled::{settings::Style, Table, Tabled};

use super::{build_pipeline, evaluation_time, load_config};
use crate::cli::StatusArgs;
use crate::output;

#[derive(Tabled)]
struct LineRow {
    line: String,
    #[tabled(rename = "initial build")]
    initial: String,
    #[tabled(rename = "latest build")]
    latest: String,
    released: String,
    #[tabled(rename = "effective eol")]
    effective_eol: String,
    supported: String,
    tags: String,
}

impl From<&LineReport> for LineRow {
    fn from(report: &LineReport) -> Self {
        let effective_eol = match report.published_eol {
            Some(published) if published == report.effective_eol => {
                format!("{} (published)", format_date(report.effective_eol))
            }
            _ => format_date(report.effective_eol),
        };

        Self {
            line: report.line.to_string(),
            initial: report.initial_version.to_string(),
            latest: report.latest_version.to_string(),
            released: format_date(report.initial_release_date),
            effective_eol,
            supported: output::yes_no(report.in_support),
            tags: report.tags.join(", "),
        }
    }
}

fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

pub async fn run(args: StatusArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path, &args.source)?;
    let now = evaluation_time(&args.source)?;
    let pipeline = build_pipeline(&config)?;

    let (graph, catalog_size) = pipeline
        .graph()
        .await
        .context("Failed to read the release catalog")?;

    let reports: Vec<LineReport> = graph
        .report(pipeline.policy(), pipeline.eol_table(), now)
        .into_iter()
        .filter(|report| args.all || report.in_support)
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    output::header("Release lines");
    output::kv("Catalog", &config.catalog.url);
    output::kv("Evaluated at", &now.to_rfc3339());
    output::kv(
        "Releases",
        &format!(
            "{} ({} immutable builds)",
            catalog_size,
            graph.immutable_count()
        ),
    );
    println!();

    if reports.is_empty() {
        println!("{}", style("No release lines in support").dim());
        return Ok(());
    }

    let rows: Vec<LineRow> = reports.iter().map(LineRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);

    Ok(())
}
