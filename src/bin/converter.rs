//! CAMT to V11 converter - CLI tool deriving V11 payment-reconciliation
//! files from camt.053/054 bank statements.

use camt_v11::{camt_format::CamtDocument, v11_format, Result, V11Version};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "camt_v11_converter")]
#[command(about = "Derive V11 reconciliation files from camt.053/054 statements", long_about = None)]
struct Cli {
    /// Input camt XML file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// V11 format version (3, 3-100, 3-128, 4)
    #[arg(long, default_value = "4")]
    format: String,

    /// Line separator between records
    #[arg(long, value_enum, default_value = "crlf")]
    line_ending: LineEnding,

    /// Output file path; defaults to the input name with a .v11 extension,
    /// or stdout when reading from stdin
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LineEnding {
    /// Carriage return + line feed
    Crlf,
    /// No separator between records
    None,
}

impl LineEnding {
    fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::None => "",
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let version = cli.format.parse::<V11Version>()?;

    let document = if let Some(ref input_path) = cli.input {
        let mut file = File::open(input_path)?;
        CamtDocument::from_read(&mut file)?
    } else {
        let mut stdin = io::stdin();
        CamtDocument::from_read(&mut stdin)?
    };

    let output = v11_format::generate(&document, version, cli.line_ending.as_str());

    for error in &output.errors {
        eprintln!("Warning: record skipped: {}", error);
    }

    match output_path(&cli, version) {
        Some(path) => {
            let mut file = File::create(&path)?;
            output.write_to(&mut file)?;
            eprintln!(
                "Wrote {} ({} records skipped)",
                path.display(),
                output.errors.len()
            );
        }
        None => {
            let mut stdout = io::stdout();
            output.write_to(&mut stdout)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Resolve the destination: an explicit `--output`, else `<input>.v11`,
/// else stdout for stdin input.
fn output_path(cli: &Cli, version: V11Version) -> Option<PathBuf> {
    if let Some(ref output) = cli.output {
        return Some(output.clone());
    }

    cli.input
        .as_deref()
        .map(|input| input.with_extension(version.extension()))
}
