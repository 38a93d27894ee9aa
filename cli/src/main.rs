//! pdfoutline CLI - batch PDF title and outline extraction

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::{
    has_pdf_extension, render, Error, ExtractOptions, ExtractionResult, JsonFormat,
    OutlineExtractor,
};

const DEFAULT_INPUT_DIR: &str = "./app/input";
const DEFAULT_OUTPUT_DIR: &str = "./app/output";

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract PDF titles and H1-H3 outlines to JSON", long_about = None)]
struct Cli {
    /// Also write log records to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Abort a document on its first page error
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in a directory (default)
    Batch {
        /// Directory containing PDF files
        #[arg(
            short,
            long,
            value_name = "DIR",
            env = "PDFOUTLINE_INPUT",
            default_value = DEFAULT_INPUT_DIR
        )]
        input: PathBuf,

        /// Directory for JSON results
        #[arg(
            short,
            long,
            value_name = "DIR",
            env = "PDFOUTLINE_OUTPUT",
            default_value = DEFAULT_OUTPUT_DIR
        )]
        output: PathBuf,
    },

    /// Extract one PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("{}: cannot open log file: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    let options = if cli.strict {
        ExtractOptions::new().strict()
    } else {
        ExtractOptions::new().lenient()
    };

    let result = match cli.command {
        Some(Commands::Batch { input, output }) => cmd_batch(&input, &output, options),
        Some(Commands::Extract {
            input,
            output,
            compact,
        }) => cmd_extract(&input, output.as_deref(), compact, options),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            let input = env_path("PDFOUTLINE_INPUT", DEFAULT_INPUT_DIR);
            let output = env_path("PDFOUTLINE_OUTPUT", DEFAULT_OUTPUT_DIR);
            cmd_batch(&input, &output, options)
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Console logging at `info` unless `RUST_LOG` says otherwise, optionally
/// mirrored to a file.
fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = File::options().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(Tee {
            file,
            console: io::stderr(),
        })));
    }

    builder.init();
    Ok(())
}

/// Writes log output to the console and a file.
struct Tee {
    file: File,
    console: io::Stderr,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}

/// Outcome counts of one batch run.
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchSummary {
    written: usize,
    empty: usize,
    failed: usize,
}

/// PDF files of a directory, sorted by name.
fn collect_pdfs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_pdf_extension(path))
        .collect();
    files.sort();
    Ok(files)
}

fn run_batch(
    input: &Path,
    output: &Path,
    extractor: &OutlineExtractor,
    pb: &ProgressBar,
) -> Result<BatchSummary, Box<dyn std::error::Error>> {
    if !input.is_dir() {
        log::error!("Input directory {} does not exist", input.display());
        return Err(Error::Other(format!("input directory not found: {}", input.display())).into());
    }
    fs::create_dir_all(output)?;

    let files = collect_pdfs(input)?;
    pb.set_length(files.len() as u64);

    let mut summary = BatchSummary::default();
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(name.clone());
        log::info!("Processing {}", name);

        match extractor.extract_file(path) {
            Ok(result) if result.is_empty() => {
                log::info!("No title or headings detected in {}", name);
                summary.empty += 1;
            }
            Ok(result) => {
                let stem = path.file_stem().unwrap_or_default().to_string_lossy();
                let target = output.join(format!("{}.json", stem));
                match write_result(&result, &target) {
                    Ok(()) => {
                        log::info!("Successfully processed {}", name);
                        summary.written += 1;
                    }
                    Err(e) => {
                        log::error!("Error processing {}: {}", name, e);
                        summary.failed += 1;
                    }
                }
            }
            Err(e) => {
                log::error!("Error processing {}: {}", name, e);
                summary.failed += 1;
            }
        }
        pb.inc(1);
    }

    Ok(summary)
}

fn write_result(result: &ExtractionResult, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = render::to_json(result, JsonFormat::Pretty)?;
    fs::write(target, json)?;
    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    options: ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::new().with_options(options);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let summary = run_batch(input, output, &extractor, &pb)?;
    pb.finish_and_clear();

    println!("{}", "Batch complete".green().bold());
    println!("  {} {} written", "├─".dimmed(), summary.written);
    println!("  {} {} without title or headings", "├─".dimmed(), summary.empty);
    println!("  {} {} failed", "└─".dimmed(), summary.failed);
    println!("{} {}", "Output:".bold(), output.display());

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    options: ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = OutlineExtractor::new()
        .with_options(options)
        .extract_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = render::to_json(&result, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and outline extraction tool");
    println!();
    println!("License: MIT");
}
