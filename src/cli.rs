use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser};
use log::info;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use oxgraph::{Diagram, ReplayMode, SceneConfig, Script, SvgScene, replay};

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
enum OutputDestination {
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Parser)]
#[command(
    name = "oxgraph",
    about = "Replay graph-editor interaction scripts and render the resulting diagram to SVG."
)]
pub struct ReplayArgs {
    /// Path to the interaction script (JSON). Use '-' to read from stdin.
    #[arg(short = 'i', long = "input")]
    input: String,

    /// Path to the output file. Use '-' to write to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// JSON file with scene settings (width, height, background, node_radius).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Canvas width, overriding config and environment.
    #[arg(long = "width")]
    width: Option<f32>,

    /// Canvas height, overriding config and environment.
    #[arg(long = "height")]
    height: Option<f32>,

    /// Background color for the rendered diagram.
    #[arg(short = 'b', long = "background-color")]
    background_color: Option<String>,

    /// Skip commands the diagram rejects instead of aborting.
    #[arg(long = "keep-going", action = ArgAction::SetTrue)]
    keep_going: bool,

    /// Suppress informational output.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

pub fn dispatch() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let replay_args = match args.get(1).map(|s| s.as_str()) {
        Some("replay") => ReplayArgs::parse_from(
            std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
        ),
        _ => ReplayArgs::parse_from(args),
    };
    run_replay(replay_args)
}

fn run_replay(cli: ReplayArgs) -> Result<()> {
    let input_source = parse_input(&cli.input)?;
    let output_dest = parse_output(cli.output.as_deref(), &input_source)?;
    let config = load_config(&cli)?;

    if config.width <= 0.0 || config.height <= 0.0 {
        bail!("canvas width and height must be greater than zero");
    }

    let source = load_script(&input_source)?;
    let script = Script::from_json(&source).context("failed to parse interaction script")?;

    let mode = if cli.keep_going {
        ReplayMode::KeepGoing
    } else {
        ReplayMode::Strict
    };

    let mut diagram = Diagram::new(SvgScene::new());
    let report = replay(&mut diagram, &script, mode).context("interaction script was rejected")?;
    info!(
        "replayed {} commands ({} rejected)",
        report.applied,
        report.rejected.len()
    );
    if !cli.quiet {
        for (index, err) in &report.rejected {
            eprintln!("Skipped command #{index}: {err}");
        }
    }

    let svg = diagram.surface().render_svg(&config)?;
    write_output(output_dest, svg.as_bytes(), cli.quiet)?;

    Ok(())
}

fn load_config(cli: &ReplayArgs) -> Result<SceneConfig> {
    let base = match &cli.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            serde_json::from_str::<SceneConfig>(&contents)
                .with_context(|| format!("failed to parse scene config '{}'", path.display()))?
        }
        None => SceneConfig::default(),
    };

    let mut config = base.with_env();
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    if let Some(background) = &cli.background_color {
        config.background = background.clone();
    }
    Ok(config)
}

fn parse_input(input: &str) -> Result<InputSource> {
    match input {
        "-" => Ok(InputSource::Stdin),
        path_str => {
            let path = PathBuf::from(path_str);
            if !path.exists() {
                return Err(anyhow!("input file '{path_str}' does not exist"));
            }
            Ok(InputSource::File(path))
        }
    }
}

fn parse_output(output: Option<&str>, input: &InputSource) -> Result<OutputDestination> {
    match output {
        Some("-") => Ok(OutputDestination::Stdout),
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(anyhow!(
                        "output directory '{}' does not exist",
                        parent.display()
                    ));
                }
            }
            Ok(OutputDestination::File(path))
        }
        None => match input {
            InputSource::File(path) => Ok(OutputDestination::File(default_output_path(path))),
            InputSource::Stdin => Ok(OutputDestination::Stdout),
        },
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let default_name = input
        .file_stem()
        .and_then(|name| name.to_str())
        .map(|name| format!("{name}.svg"))
        .unwrap_or_else(|| "out.svg".to_string());
    let mut path = input.to_path_buf();
    path.set_file_name(default_name);
    path
}

fn load_script(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            if buffer.trim().is_empty() {
                Err(anyhow!("no interaction script supplied on stdin"))
            } else {
                Ok(buffer)
            }
        }
        InputSource::File(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            if contents.trim().is_empty() {
                Err(anyhow!("input file '{}' was empty", path.display()))
            } else {
                Ok(contents)
            }
        }
    }
}

fn write_output(dest: OutputDestination, bytes: &[u8], quiet: bool) -> Result<()> {
    match dest {
        OutputDestination::Stdout => {
            let mut stdout = io::stdout();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
        OutputDestination::File(path) => {
            fs::write(&path, bytes)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            if !quiet {
                println!("Rendered diagram -> {}", path.display());
            }
        }
    }
    Ok(())
}
