use crate::config::load_config;
use crate::editor::Editor;
use crate::geometry::Point;
use crate::ir::parse_scene;
use crate::render::{render_svg, write_output_svg};
use crate::route_dump::write_route_dump;
use crate::wiring::ClickOutcome;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nwire", version, about = "Route node-graph connectors around obstacles")]
pub struct Args {
    /// Scene file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (routing, metrics, themeVariables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Move a node before routing, as NODE=X,Y. Repeatable.
    #[arg(long = "drag", value_parser = parse_drag)]
    pub drag: Vec<(String, Point)>,

    /// Overlay inflated obstacles and the visibility graph
    #[arg(long = "show-graph")]
    pub show_graph: bool,

    /// Log debug diagnostics to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if args.show_graph {
        config.render.show_visibility_graph = true;
    }

    let input = read_input(args.input.as_deref())?;
    let spec = parse_scene(&input)?;
    let (mut editor, outcomes) = Editor::from_spec(&spec, &config)?;
    let rejected = outcomes
        .iter()
        .filter(|o| matches!(o, ClickOutcome::Rejected { .. }))
        .count();
    if rejected > 0 {
        tracing::warn!(rejected, "some connections were not created");
    }

    let mut frame = editor.frame();
    for (node, position) in &args.drag {
        frame = editor.drag_node(node, *position)?;
    }
    let unroutable = frame.links.iter().filter(|l| l.curve.is_none()).count();
    tracing::info!(
        nodes = editor.scene().node_count(),
        links = frame.links.len(),
        unroutable,
        "routed scene"
    );

    match args.output_format {
        OutputFormat::Json => {
            write_route_dump(args.output.as_deref(), editor.scene(), &frame)?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(editor.scene(), &frame, None, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(editor.scene(), &frame, None, &config.theme, &config.render);
            write_png(&svg, &output, &config.render)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded in another binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, render: &crate::config::RenderConfig) -> Result<()> {
    crate::render::write_output_png(svg, output, render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _render: &crate::config::RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the 'png' feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn parse_drag(raw: &str) -> Result<(String, Point), String> {
    let (node, coords) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NODE=X,Y, got '{raw}'"))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y after '=', got '{coords}'"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    if node.is_empty() {
        return Err("node key is empty".to_string());
    }
    Ok((node.to_string(), Point::new(x, y)))
}
