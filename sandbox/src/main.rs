use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use std::fmt::Write as _;
use std::path::PathBuf;

use library::CaseInstance;
use library::cases::case_def::CaseDef;
use library::cases::registry::{find_case, registered_cases};
use library::compare;

#[derive(Parser)]
#[command(name = "sandbox", about = "Browser for the ray tracing control flow conformance cases")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every registered case name.
    List {
        /// Emit the registry as a JSON manifest instead of plain names.
        #[arg(long)]
        json: bool,
    },
    /// Dump the generated shader sources of one case.
    Shaders { case: String },
    /// Print the oracle image of one case, slice by slice.
    Expected {
        case: String,
        /// Write the raw little endian words instead of printing a grid.
        #[arg(long)]
        raw: Option<PathBuf>,
    },
    /// Compare a captured device readback against the oracle.
    Check { case: String, captured: PathBuf },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::List { json } => list(json),
        Command::Shaders { case } => dump_shaders(&resolve(&case)?),
        Command::Expected { case, raw } => dump_expected(&resolve(&case)?, raw.as_deref()),
        Command::Check { case, captured } => check(&resolve(&case)?, &captured),
    }
}

fn resolve(name: &str) -> Result<CaseDef> {
    find_case(name).with_context(|| format!("no case registered under {name:?}; see `sandbox list`"))
}

fn list(json: bool) -> Result<()> {
    let descriptors = registered_cases();

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    for descriptor in &descriptors {
        println!("{}", descriptor.name);
    }
    info!("{} cases registered", descriptors.len());

    Ok(())
}

fn dump_shaders(case: &CaseDef) -> Result<()> {
    let instance = CaseInstance::new(*case)?;

    for (slot, source) in instance.shaders().iter() {
        println!("---- {} ----", slot.token());
        println!("{source}");
    }

    Ok(())
}

fn dump_expected(case: &CaseDef, raw: Option<&std::path::Path>) -> Result<()> {
    let instance = CaseInstance::new(*case)?;
    let expected = instance.expected_values();

    if let Some(path) = raw {
        let bytes: Vec<u8> = expected.iter().flat_map(|word| word.to_le_bytes()).collect();
        std::fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
        info!("{} words written to {}", expected.len(), path.display());
        return Ok(());
    }

    let extent = instance.result_extent();
    let mut buffer = String::new();
    for z in 0..extent.depth() {
        writeln!(&mut buffer, "z={z}")?;
        for y in 0..extent.height() {
            for x in 0..extent.width() {
                write!(&mut buffer, "{:6} ", expected[extent.texel_index(x, y, z)])?;
            }
            buffer.push('\n');
        }
        buffer.push('\n');
    }
    print!("{buffer}");

    Ok(())
}

fn check(case: &CaseDef, captured: &std::path::Path) -> Result<()> {
    let instance = CaseInstance::new(*case)?;
    let expected = instance.expected_values();
    let extent = instance.result_extent();

    let bytes = std::fs::read(captured).with_context(|| format!("cannot read {}", captured.display()))?;
    if bytes.len() != expected.len() * 4 {
        bail!(
            "{} holds {} bytes, the result image needs {}",
            captured.display(),
            bytes.len(),
            expected.len() * 4,
        );
    }

    let actual: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().expect("chunk size is fixed")))
        .collect();

    let verdict = compare::compare(&actual, &expected, &extent);
    if !verdict.passed() {
        print!("{}", compare::format_side_by_side(&actual, &expected, &extent));
        bail!("{case}: {verdict}");
    }

    println!("{case}: {verdict}");
    Ok(())
}
