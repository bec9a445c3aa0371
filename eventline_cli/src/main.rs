use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use eventline::{
    compute_layout, load_events, CategoryRegistry, ChartConfig, ChartLayout, LoadedEvents,
    Selection, SkippedRow,
};
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod plot;

use plot::{render_chart_guard, ChartKind, PlotOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Emoji event timeline renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw the timeline chart for a CSV of events to SVG and/or PNG
    Render(RenderArgs),
    /// Summarise a CSV of events, or dump its computed layout as JSON
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// CSV with a `date,time,category,description,location` header
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// JSON category list: `[{"key": "music", "glyph": "🎵"}, ...]`
    #[arg(long, value_hint = ValueHint::FilePath)]
    categories: Option<PathBuf>,

    /// JSON chart configuration overrides
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output SVG path
    #[arg(long, default_value = "timeline.svg", value_hint = ValueHint::FilePath)]
    svg: PathBuf,

    /// Also write a PNG
    #[arg(long, value_hint = ValueHint::FilePath)]
    png: Option<PathBuf>,

    /// Categories to keep at full opacity (comma separated); others are dimmed
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Draw the story boxes beside the chart
    #[arg(long, action = ArgAction::SetTrue)]
    stories: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the loaded rows, skipped rows and layout as JSON on stdout
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Command::Render(args) => args.source.verbose,
        Command::Inspect(args) => args.source.verbose,
    };
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

struct Prepared {
    loaded: LoadedEvents,
    registry: CategoryRegistry,
    config: ChartConfig,
    layout: ChartLayout,
}

fn prepare(source: &SourceArgs) -> Result<Prepared> {
    let registry = match source.categories.as_ref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            CategoryRegistry::from_json(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => CategoryRegistry::default(),
    };
    let config = match source.config.as_ref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ChartConfig::from_json(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => ChartConfig::default(),
    };

    let t_load = Instant::now();
    let data = fs::read(&source.input)
        .with_context(|| format!("failed to read {}", source.input.display()))?;
    let loaded = load_events(&data)
        .with_context(|| format!("failed to load events from {}", source.input.display()))?;
    debug!(
        "Load stage: {:.1} ms",
        t_load.elapsed().as_secs_f64() * 1000.0
    );
    if !loaded.skipped.is_empty() {
        warn!(
            "Skipped {} malformed row(s) in {}",
            loaded.skipped.len(),
            source.input.display()
        );
    }

    let layout = compute_layout(&loaded.events, &registry, &config);
    Ok(Prepared {
        loaded,
        registry,
        config,
        layout,
    })
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let prepared = prepare(&args.source)?;
    let selection = if args.only.is_empty() {
        Selection::all(&prepared.registry)
    } else {
        Selection::only(&prepared.registry, &args.only)
    }
    .with_inactive_opacity(prepared.config.inactive_opacity);
    if !args.only.is_empty() {
        let active: Vec<&str> = selection.active_keys().collect();
        info!("Active categories: {}", active.join(", "));
    }

    let opts = PlotOptions {
        stories: args.stories,
    };
    render_chart_guard(
        &prepared.layout,
        &selection,
        &prepared.config,
        &args.svg,
        ChartKind::Svg,
        &opts,
    )
    .map_err(|err| anyhow!("failed to render {}: {}", args.svg.display(), err))?;
    info!(
        "Wrote chart: {} ({} marks)",
        args.svg.display(),
        prepared.layout.marks().len()
    );

    if let Some(path) = args.png.as_ref() {
        if let Err(err) = render_chart_guard(
            &prepared.layout,
            &selection,
            &prepared.config,
            path,
            ChartKind::Png,
            &opts,
        ) {
            warn!("Skipping PNG render ({}): {}", path.display(), err);
        } else {
            info!("Wrote chart: {}", path.display());
        }
    }
    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<()> {
    let prepared = prepare(&args.source)?;

    if args.json {
        let report = json!({
            "events": prepared.loaded.events,
            "skipped": prepared.loaded.skipped,
            "layout": prepared.layout,
        });
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
        return Ok(());
    }

    log_skipped(&prepared.loaded.skipped);

    let events = &prepared.loaded.events;
    info!("Rows: {} loaded, {} skipped", events.len(), prepared.loaded.skipped.len());

    let Some(geometry) = prepared.layout.geometry() else {
        info!("No events; the chart would show only its placeholder");
        return Ok(());
    };

    let days = geometry.days();
    if let (Some(first), Some(last)) = (days.first(), days.last()) {
        info!("Days: {} distinct, {} to {}", days.len(), first, last);
    }
    info!("Canvas: {:.0} x {:.0} px", geometry.width, geometry.height);

    let mut per_category: BTreeMap<&str, usize> = BTreeMap::new();
    for event in events {
        *per_category.entry(event.category.as_str()).or_default() += 1;
    }
    for (category, count) in &per_category {
        let glyph = prepared.registry.glyph_or_fallback(category);
        let known = if prepared.registry.contains(category) {
            ""
        } else {
            " (unregistered)"
        };
        info!("  {glyph} {category}: {count}{known}");
    }

    let groups = geometry
        .marks
        .iter()
        .filter(|m| m.dodge.index == 0 && m.dodge.group_size > 1)
        .count();
    let largest = geometry
        .marks
        .iter()
        .map(|m| m.dodge.group_size)
        .max()
        .unwrap_or(0);
    info!("Dodge groups: {groups} shared slot(s), largest holds {largest} event(s)");
    if largest > prepared.config.max_dodge {
        warn!(
            "Largest slot exceeds max_dodge ({}); its cluster extends past the usual spread",
            prepared.config.max_dodge
        );
    }
    Ok(())
}

fn log_skipped(skipped: &[SkippedRow]) {
    for row in skipped {
        match row.line {
            Some(line) => warn!("line {line}: {}", row.reason),
            None => warn!("{}", row.reason),
        }
    }
}
