//! Resolve command

use anyhow::{Context, Result};
use camino::Utf8Path;
use lifeline_core::RuntimeConfig;
use lifeline_registry::RegistryClient;
use lifeline_resolver::Resolution;
use serde::Serialize;

use super::{build_pipeline, evaluation_time, load_config};
use crate::cli::ResolveArgs;
use crate::output;

#[derive(Serialize)]
struct ResolveOutput<'a> {
    images: &'a [String],
    tags: &'a [String],
    supported_lines: Vec<String>,
    registry_checked: bool,
}

pub async fn run(args: ResolveArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = resolve_config(&args, config_path)?;
    let now = evaluation_time(&args.source)?;

    let mut pipeline = build_pipeline(&config)?;
    if args.skip_registry_check {
        output::warning("Skipping registry cross-check");
    } else {
        let mut registry = RegistryClient::new(
            config.registry.tags_url.clone(),
            config.registry.format,
            &config.network,
        )
        .context("Failed to create registry client")?;
        if let Some(token) = &config.registry.token {
            registry = registry.with_token(token.clone());
        }
        pipeline = pipeline.with_registry(Box::new(registry));
    }

    let resolution = pipeline.run(now).await.context("Resolution failed")?;
    print_resolution(&resolution, args.json)
}

fn resolve_config(args: &ResolveArgs, config_path: Option<&Utf8Path>) -> Result<RuntimeConfig> {
    let mut config = load_config(config_path, &args.source)?;

    if let Some(url) = &args.registry_tags_url {
        config.registry.tags_url = url.clone();
    }
    if let Some(format) = args.registry_format {
        config.registry.format = format;
    }
    if let Some(image) = &args.image {
        config.registry.image = image.clone();
    }

    Ok(config)
}

fn print_resolution(resolution: &Resolution, json: bool) -> Result<()> {
    if json {
        let doc = ResolveOutput {
            images: &resolution.images,
            tags: &resolution.tags,
            supported_lines: resolution
                .supported_lines
                .iter()
                .map(ToString::to_string)
                .collect(),
            registry_checked: resolution.registry_checked,
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    for image in &resolution.images {
        println!("{}", image);
    }

    output::success(&format!(
        "{} images across {} supported lines",
        resolution.images.len(),
        resolution.supported_lines.len()
    ));
    Ok(())
}
