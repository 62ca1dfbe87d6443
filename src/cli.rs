use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::load_config;
use crate::dump::{LayoutDump, write_layout_dump};
use crate::layout::compute_layout;
use crate::spec::parse_spec;

/// Offline harness around the layout engine: parse a diagram spec, compute
/// the geometry, dump it as JSON. The dashboard embeds the library directly.
#[derive(Parser, Debug)]
#[command(name = "cfl", version, about = "Diagram layout engine (spec JSON in, geometry JSON out)")]
pub struct Args {
    /// Input spec file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width override
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height override
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(&args)?;
    let spec = parse_spec(&input)?;

    let mut canvas = spec.canvas.unwrap_or_default();
    if let Some(width) = args.width {
        canvas.width = width;
    }
    if let Some(height) = args.height {
        canvas.height = height;
    }

    let result = compute_layout(&spec, &canvas, &config);
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    match args.output.as_deref() {
        Some(path) => write_layout_dump(path, &result)?,
        None => println!("{}", LayoutDump::from_result(&result).to_json()?),
    }
    Ok(())
}

fn read_input(args: &Args) -> Result<String> {
    match args.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
