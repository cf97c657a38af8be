use clap::Parser;
use kitcov::analysis::run_analyses;
use kitcov::config::{AnalysisConfig, OutputFormat};
use kitcov::coverage::KeyCatalog;
use kitcov::error::KcResult;
use kitcov::layouts::{self, Layout};
use kitcov::report;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// A little tool for helping keycap designers analyse kitting coverage.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory (or single file) from which kit layouts are read
    #[arg(value_name = "kit-dir")]
    kits: PathBuf,

    /// Directories or files containing the keyboard layouts to cover
    #[arg(value_name = "keeb-loc", required = true)]
    targets: Vec<PathBuf>,

    /// Format of the outputted report
    #[arg(
        short = 'f',
        long,
        value_name = "format",
        value_enum,
        default_value = "text"
    )]
    output_format: OutputFormat,

    #[command(flatten)]
    analysis: AnalysisConfig,
}

fn main() {
    // Diagnostics go to stderr; stdout carries only the report.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            error!("{}", e);
            process::exit(-1);
        }
    }
}

fn run(cli: &Cli) -> KcResult<i32> {
    let mut loaded = layouts::load_path(&cli.kits)?;
    let kit_count = loaded.len();
    for target in &cli.targets {
        loaded.extend(layouts::load_path(target)?);
    }
    // One namespace for kits and keyboards: results are keyed by name.
    layouts::disambiguate_names(&mut loaded);
    let keyboards: Vec<Layout> = loaded.split_off(kit_count);
    let kits = loaded;
    info!(
        "loaded {} kits and {} keyboard layouts",
        kits.len(),
        keyboards.len()
    );

    let catalog = KeyCatalog::build(kits.iter().chain(keyboards.iter()));
    let output = run_analyses(&cli.analysis, &keyboards, &kits, &catalog)?;

    let rendered = report::render(&output.report, cli.output_format)?;
    if !rendered.is_empty() {
        print!("{}", rendered);
        if !rendered.ends_with('\n') {
            println!();
        }
    }

    Ok(output.exit_code)
}
