use anyhow::{Context as AnyhowContext, Result};
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, info};
use std::fs;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

mod cleaner;
mod config;
mod constants;
mod scanner;
mod writer;

use cleaner::Cleaner;
use config::{Config, ConfigManager};
use scanner::Scanner;
use writer::{OutputFormat, Writer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folder containing the .vtt files to clean
    #[arg(short, long, required_unless_present = "print_config")]
    folder: Option<PathBuf>,

    /// Number of words per chunk (0 writes the whole transcript as one chunk)
    #[arg(short, long, alias = "chunk_size")]
    chunk_size: Option<usize>,

    /// Also clean .vtt files in subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Appended to the file stem of each output file [default: _cleaned]
    #[arg(long)]
    suffix: Option<String>,

    /// Drop the WEBVTT header and NOTE/STYLE/REGION blocks
    #[arg(long)]
    strip_header: bool,

    /// Drop lines that repeat the previous line
    #[arg(long)]
    dedupe: bool,

    /// Show what would be written without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Use this file instead of the global config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a commented config file template and exit
    #[arg(long)]
    print_config: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Command line flags as the topmost config layer.
    fn overrides(&self) -> Config {
        Config {
            chunk_size: self.chunk_size,
            output_suffix: self.suffix.clone(),
            format: self.format,
            recursive: self.recursive.then_some(true),
            strip_header: self.strip_header.then_some(true),
            dedupe_lines: self.dedupe.then_some(true),
        }
    }
}

/// Colored status lines on stdout.
struct Reporter {
    out: StandardStream,
}

impl Reporter {
    fn new() -> Self {
        let choice = if std::io::stdout().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            out: StandardStream::stdout(choice),
        }
    }

    fn status(&mut self, label: &str, color: Color, message: &str) -> Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(self.out, "{}", label)?;
        self.out.reset()?;
        writeln!(self.out, " {}", message)?;
        Ok(())
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn progress_bar(len: u64, hidden: bool) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len);
    if hidden || !std::io::stderr().is_terminal() {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    }
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

/// Clean one file and write its transcript, returning the output path.
fn process_file(path: &Path, cleaner: &Cleaner, writer: &Writer, dry_run: bool) -> Result<PathBuf> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let chunks = cleaner.clean_and_chunk(&raw);
    debug!("{}: {} chunk(s)", path.display(), chunks.len());

    if dry_run {
        return Ok(writer.output_path(path));
    }
    writer.write(path, cleaner.chunk_size(), &chunks)
}

fn clean_folder(cli: &Cli, folder: &Path) -> Result<ExitCode> {
    let mut reporter = Reporter::new();

    if !folder.is_dir() {
        reporter.status(
            "Error:",
            Color::Red,
            &format!("The folder '{}' does not exist.", folder.display()),
        )?;
        return Ok(ExitCode::SUCCESS);
    }

    let config_manager = ConfigManager::new(folder, cli.config.as_deref())?;
    debug!(
        "Config files: global={:?} local={}",
        config_manager.global_config_path,
        config_manager.local_config_path.display()
    );
    let settings = config_manager.config().clone().merge(cli.overrides()).resolve();
    debug!("Resolved settings: {:?}", settings);

    let files = Scanner::new(settings.recursive).scan(folder)?;
    info!("Found {} .vtt file(s) in {}", files.len(), folder.display());

    let cleaner = Cleaner::new(settings.chunk_size).with_options(settings.clean);
    let writer = Writer::new(settings.output_suffix.clone(), settings.format);
    let progress = progress_bar(files.len() as u64, cli.verbose > 0)?;

    let mut processed = 0;
    let mut failed = 0;

    for path in &files {
        let name = path.strip_prefix(folder).unwrap_or(path).display().to_string();
        progress.set_message(name.clone());

        match process_file(path, &cleaner, &writer, cli.dry_run) {
            Ok(output) => {
                processed += 1;
                let label = if cli.dry_run { "Would write" } else { "Processed" };
                progress.suspend(|| {
                    reporter.status(
                        label,
                        Color::Green,
                        &format!("'{}' -> '{}'", name, output.display()),
                    )
                })?;
            }
            Err(e) => {
                failed += 1;
                progress.suspend(|| error!("Failed to process '{}': {:#}", name, e));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary_color = if failed > 0 { Color::Yellow } else { Color::Cyan };
    reporter.status(
        "Done:",
        summary_color,
        &format!("{} processed, {} failed", processed, failed),
    )?;

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.print_config {
        print!("{}", config::default_config());
        return Ok(ExitCode::SUCCESS);
    }

    let folder = cli
        .folder
        .clone()
        .context("A folder is required (use --folder <DIR>)")?;
    clean_folder(&cli, &folder)
}
