//! Bindery demo
//!
//! Builds the sample tree, attaches a binding engine to it, and runs a fixed
//! number of update ticks, optionally pressing the button on chosen ticks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bindery_bind::{BindConfig, BindEngine};
use bindery_core::{SharedModel, WidgetClass, WidgetId, WidgetTree};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod example;

#[derive(Parser)]
#[command(name = "bindery-demo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drive a data-bound widget tree", long_about = None)]
struct Cli {
    /// Number of update ticks to run
    #[arg(short, long, default_value = "5")]
    ticks: u32,

    /// Press the button before this tick (repeatable)
    #[arg(long = "press-at", value_name = "TICK")]
    press_at: Vec<u32>,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "bindery_bind=trace" (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter '{}'", directives))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => BindConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => BindConfig::default(),
    };

    let model = example::model();
    let shared: SharedModel = model.clone();

    let mut tree = WidgetTree::new();
    let root = tree
        .instantiate(None, &example::scene())
        .context("Failed to build the sample tree")?;
    let button = tree
        .find(root, "Button")
        .context("Sample tree has no Button")?;

    let mut engine = BindEngine::attach_with_config(&shared, &mut tree, root, config)
        .context("Failed to attach the binding engine")?;
    let stats = engine.stats();
    info!(
        widgets = stats.bound_widgets,
        bindings = stats.bindings,
        direct = stats.direct_bindings,
        expressions = stats.expression_bindings,
        events = stats.events_wired,
        expanded = stats.expanded_children,
        nested = stats.nested_engines,
        errors = stats.compile_errors,
        "Engine attached"
    );

    for tick in 0..cli.ticks {
        if cli.press_at.contains(&tick) {
            let handlers = tree.press(button)?;
            info!(tick, handlers, "Pressed Button");
        }

        engine.update(&mut tree);
        let update = engine.last_update();
        debug!(
            tick,
            evaluated = update.evaluated,
            applied = update.applied,
            hidden = update.skipped_hidden,
            failures = update.total_failures(),
            "Tick"
        );
    }

    println!("After {} tick(s), {} click(s):", cli.ticks, model.borrow().data().clicks);
    print_tree(&tree, root, 0);
    Ok(())
}

fn print_tree(tree: &WidgetTree, id: WidgetId, depth: usize) {
    let Some(widget) = tree.get(id) else {
        return;
    };

    let mut line = format!("{}{} ({})", "  ".repeat(depth), widget.name(), widget.class());
    if !widget.is_visible() {
        line.push_str(" hidden");
    }
    if widget.is_disabled() {
        line.push_str(" disabled");
    }
    if !widget.text().is_empty() {
        line.push_str(&format!(" text={:?}", widget.text()));
    }
    if !widget.tooltip().is_empty() {
        line.push_str(&format!(" tooltip={:?}", widget.tooltip()));
    }
    if let Some(texture) = widget.texture() {
        let source = texture.resource_path().unwrap_or("?");
        line.push_str(&format!(" texture=<{} {}>", texture.class_name(), source));
    }
    if widget.class() == WidgetClass::ProgressBar {
        line.push_str(&format!(" value={}", widget.value()));
    }
    println!("{}", line);

    for &child in tree.children(id) {
        print_tree(tree, child, depth + 1);
    }
}
