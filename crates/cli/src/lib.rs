use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use xray_annotate_core::{
    Annotation, AnnotationEngine, EngineConfig, Extent, Frame, InputEvent, Point, SelectionSummary, Tool,
};

#[derive(Debug, Parser)]
#[command(name = "xray-annotate")]
#[command(about = "Replay annotation input against the x-ray annotation engine")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON event script and print the resulting annotations.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Engine configuration JSON (partial files are fine).
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Include the final frame's draw list.
        #[arg(long)]
        frame: bool,
        /// Write the result here instead of stdout.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the default engine configuration.
    DefaultConfig,
    /// Print CLI version.
    Version,
}

/// Recorded session: the loaded image, the viewport it was shown in and the
/// input that followed
#[derive(Debug, Deserialize)]
struct Script {
    image: Option<Extent>,
    #[serde(default = "default_viewport")]
    viewport: Extent,
    #[serde(default)]
    events: Vec<InputEvent>,
}

fn default_viewport() -> Extent {
    Extent::new(1280.0, 800.0)
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    events: usize,
    handled: usize,
    tool: Tool,
    zoom: f32,
    pan: Point,
    hint: Option<&'static str>,
    can_undo: bool,
    can_redo: bool,
    annotations: Vec<Annotation>,
    selected: Option<SelectionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<Frame>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Replay { script, config, frame, output } => {
            run_replay(&script, config.as_deref(), frame, output.as_deref())
        }
        Commands::DefaultConfig => {
            let json = serde_json::to_string_pretty(&EngineConfig::default())?;
            println!("{json}");
            Ok(())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_replay(script_path: &Path, config_path: Option<&Path>, with_frame: bool, output: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    ensure_file_exists(script_path)?;
    let raw = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse script {}", script_path.display()))?;

    let mut engine = AnnotationEngine::new(config);
    if let Some(image) = script.image {
        engine.load_image(image, script.viewport);
    } else {
        tracing::warn!("script has no image, pointer events will be ignored");
    }

    let events = script.events.len();
    let handled =
        script.events.into_iter().map(|event| engine.handle(event)).filter(|handled| *handled).count();
    tracing::info!(events, handled, annotations = engine.annotations().len(), "replay finished");

    let payload = ReplayOutput {
        events,
        handled,
        tool: engine.tool(),
        zoom: engine.viewport().zoom(),
        pan: engine.viewport().pan(),
        hint: engine.hint(),
        can_undo: engine.can_undo(),
        can_redo: engine.can_redo(),
        annotations: engine.annotations(),
        selected: engine.selection_summary(),
        frame: with_frame.then(|| engine.frame()),
    };

    let json = serde_json::to_string_pretty(&payload)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    ensure_file_exists(path)?;
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
    EngineConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
