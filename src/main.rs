//! pagemark - Kindle page markers for EPUB content documents

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use pagemark::{Options, Outcome, RangeStatus, is_xhtml, list_ranges, paginate_file};

#[derive(Parser)]
#[command(name = "pagemark")]
#[command(version, about = "Insert or strip Kindle page markers in EPUB XHTML files", long_about = None)]
#[command(after_help = "EXAMPLES:
    pagemark OEBPS/text/chapter-1.xhtml    Paginate one file in place
    pagemark OEBPS/text/                   Summarize markers of every .xhtml file

A file is paginated when it contains <span id=\"pgepubid00023\"/> (or a roman
id such as pgepubid000xii); numbering continues from that marker. A bare
<span id=\"pgepubid\"/> removes all markers from the file.")]
struct Cli {
    /// An .xhtml file to paginate, or a directory to summarize
    #[arg(value_name = "PATH")]
    path: String,

    /// Words between markers
    #[arg(short = 'n', long, default_value_t = pagemark::marker::DEFAULT_INTERVAL,
          value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    interval: usize,

    /// Process the file but do not write it back
    #[arg(long)]
    dry_run: bool,

    /// Suppress log output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let options = Options {
        interval: cli.interval,
        dry_run: cli.dry_run,
    };

    let path = Path::new(&cli.path);
    if path.is_file() && is_xhtml(path) {
        process_file(path, &options);
        ExitCode::SUCCESS
    } else if path.is_dir() {
        match show_ranges(path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    } else {
        eprintln!("[ERROR] Invalid file or folder.");
        ExitCode::FAILURE
    }
}

fn process_file(path: &Path, options: &Options) {
    let name = display_name(path);
    match paginate_file(path, options) {
        Ok(Outcome::Skipped) => println!("[SKIP] {name} — no pgepubid span"),
        Ok(Outcome::Stripped { .. }) => {
            println!("[STRIP] {name} — removed all pgepubid spans")
        }
        Ok(Outcome::Paginated {
            first_id,
            placement,
            ..
        }) => {
            println!(
                "[ADD] {name} — paginated from {first_id} to {}",
                placement.last_value()
            );
            println!(
                "[NEXT] Use <span id=\"{}\"/> to continue pagination in the next file.",
                placement.next_marker_id()
            );
        }
        Err(e) => println!("[ERROR] {name} — {e}"),
    }
}

fn show_ranges(dir: &Path) -> pagemark::Result<()> {
    for report in list_ranges(dir)? {
        let name = display_name(&report.path);
        match report.status {
            RangeStatus::NoMarkers => println!("[NONE]  {name} — no page markers"),
            RangeStatus::Range { first, last } => {
                println!("[RANGE] {name} — {first} to {last}")
            }
            RangeStatus::Error(e) => println!("[ERROR] {name} — {e}"),
        }
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
