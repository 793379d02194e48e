//! `vellum` renders one view, with its layouts, to stdout.
//!
//! ```text
//! vellum user.profile --views ./views -p name=Ada -g site='"Example"'
//! vellum home --config vellum.yaml --data page.json
//! ```
//!
//! Values given with `--param` and `--global` are parsed as JSON when they
//! can be and taken as plain strings otherwise, so `-p count=3` passes a
//! number and `-p name=Ada` a string.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use serde_json::{Map, Value};
use vellum::{Renderer, ViewConfig};

mod logging;

use logging::Logger;

#[derive(Parser, Debug)]
#[command(name = "vellum", version, about, long_about = None)]
struct Cli {
    /// View to render, e.g. `user.profile`.
    view: String,

    #[arg(short, long, help = "YAML file with `view_dir` and `extension`")]
    config: Option<PathBuf>,

    #[arg(long, help = "Directory holding the views [default: views]")]
    views: Option<PathBuf>,

    #[arg(long = "ext", help = "Extension of view files [default: html]")]
    extension: Option<String>,

    #[arg(
        short,
        long = "param",
        value_name = "KEY=VALUE",
        value_parser = parse_pair,
        help = "Parameter passed to the view"
    )]
    params: Vec<(String, Value)>,

    #[arg(
        short,
        long = "global",
        value_name = "KEY=VALUE",
        value_parser = parse_pair,
        help = "Global visible to the view and its layouts"
    )]
    globals: Vec<(String, Value)>,

    #[arg(short, long, help = "JSON or YAML file with parameters")]
    data: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Log more (-v, -vv)")]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    Logger::init(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = view_config(cli)?;
    tracing::debug!(view_dir = %config.view_dir.display(), extension = %config.extension, "loaded config");

    let mut renderer = Renderer::new(config)?;
    for (name, value) in &cli.globals {
        renderer.add_global(name.as_str(), value)?;
    }

    let params = build_params(cli.data.as_deref(), &cli.params)?;
    renderer
        .display_to(out, &cli.view, &params)
        .with_context(|| format!("failed to render `{}`", cli.view))?;
    Ok(())
}

fn view_config(cli: &Cli) -> Result<ViewConfig> {
    let mut config = match &cli.config {
        Some(path) => ViewConfig::from_yaml_file(path)?,
        None => ViewConfig::new("views"),
    };
    if let Some(views) = &cli.views {
        config.view_dir = views.clone();
    }
    if let Some(extension) = &cli.extension {
        config = config.with_extension(extension);
    }
    Ok(config)
}

/// Parameters from `--data`, then `--param` on top.
fn build_params(data: Option<&Path>, pairs: &[(String, Value)]) -> Result<Map<String, Value>> {
    let mut params = match data {
        Some(path) => load_data(path)?,
        None => Map::new(),
    };
    for (key, value) in pairs {
        params.insert(key.clone(), value.clone());
    }
    Ok(params)
}

fn load_data(path: &Path) -> Result<Map<String, Value>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&source)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
        _ => serde_yaml::from_str(&source)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => bail!("{} must hold a map of parameters", path.display()),
    }
}

fn parse_pair(arg: &str) -> Result<(String, Value), String> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", arg))?;
    if key.is_empty() {
        return Err(format!("missing key in `{}`", arg));
    }
    Ok((key.to_string(), parse_value(raw)))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
