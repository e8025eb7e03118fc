use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing_subscriber::fmt::SubscriberBuilder;

use treefold::api::{Design, DesignFile};
use treefold::fold::fold_document;
use treefold::samples;
use treefold::PatternError;

mod provenance;

#[derive(Parser)]
#[command(name = "treefold")]
#[command(about = "Crease patterns from origami trees and disk packings")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build the crease pattern of a design and write it as FOLD
    Run {
        #[arg(long)]
        input: String,
        #[arg(long)]
        out: String,
        /// Export every hinge as unassigned
        #[arg(long)]
        fan_out_hinges: bool,
    },
    /// Print whether a design's packing is twisted
    Twisted {
        #[arg(long)]
        input: String,
    },
    /// Write a built-in design as JSON (stdout without --out)
    Sample {
        #[arg(long)]
        name: String,
        #[arg(long)]
        out: Option<String>,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            input,
            out,
            fan_out_hinges,
        } => run(&input, &out, fan_out_hinges),
        Action::Twisted { input } => {
            let twisted = twisted(&input)?;
            println!("{twisted}");
            Ok(())
        }
        Action::Sample { name, out } => sample(&name, out.as_deref()),
        Action::Report => {
            println!("{}", serde_json::to_string_pretty(&provenance::report_block())?);
            Ok(())
        }
    }
}

fn read_design(path: &str) -> Result<Design> {
    let bytes = fs::read(path).with_context(|| format!("reading {path}"))?;
    let file: DesignFile =
        serde_json::from_slice(&bytes).with_context(|| format!("parsing design {path}"))?;
    Design::from_file(&file).with_context(|| format!("loading design {path}"))
}

fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("writing {path}"))
}

fn run(input: &str, out: &str, fan_out_hinges: bool) -> Result<()> {
    let design = read_design(input)?;
    let root = design.root_id();
    tracing::info!(input, out, root = ?root, fan_out_hinges, "run");
    let g = design
        .crease_pattern()
        .with_context(|| format!("building crease pattern for {input}"))?;
    write_json(out, &fold_document(&g, fan_out_hinges))?;

    let payload = provenance::Payload::new(json!({
        "input": input,
        "root": root,
        "fan_out_hinges": fan_out_hinges
    }))
    .with_pattern(&g);
    let sidecar = provenance::write_sidecar(out, payload)?;
    tracing::info!(
        faces = g.faces().len(),
        sidecar = %sidecar.display(),
        "pattern written"
    );
    Ok(())
}

fn twisted(input: &str) -> Result<bool> {
    let design = read_design(input)?;
    let twisted = design
        .is_twisted()
        .with_context(|| format!("classifying {input}"))?;
    tracing::info!(input, twisted, "twisted");
    Ok(twisted)
}

fn sample(name: &str, out: Option<&str>) -> Result<()> {
    let file = match samples::by_name(name) {
        Err(PatternError::UnknownSample(_)) => bail!(
            "unknown sample {name}; expected one of {}",
            samples::NAMES.join(", ")
        ),
        design => design?.to_file(),
    };
    tracing::info!(name, out = ?out, "sample");
    match out {
        Some(path) => write_json(path, &file),
        None => {
            println!("{}", serde_json::to_string_pretty(&file)?);
            Ok(())
        }
    }
}
