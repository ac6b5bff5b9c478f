//! card-pager CLI
//! Paginates a text file (or stdin) into cards and prints the pages.

use card_pager::{CardPager, CardTemplate, PaginateError, PaginationRules, StyleError};
use clap::{Parser, ValueEnum};
use log::{error, info};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error("error reading {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("bad configuration in {path}: {source}")]
    Config { path: String, source: StyleError },
    #[error("pagination failed: {0}")]
    Paginate(#[from] PaginateError),
    #[error("could not encode pages: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Pages separated by rule lines
    Text,
    /// JSON array of pages
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "card-pager", version, about = "Paginate marked-up text into fixed-size cards")]
struct Args {
    /// Input file; stdin when omitted
    input: Option<PathBuf>,

    /// Card template: deep or classic
    #[arg(short, long, default_value = "deep")]
    template: CardTemplate,

    /// JSON file with pagination rule overrides
    #[arg(long)]
    rules: Option<PathBuf>,

    /// JSON file with style sheet overrides
    #[arg(long)]
    style: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn read_file(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn read_input(input: Option<&Path>) -> Result<String, AppError> {
    match input {
        Some(path) => read_file(path),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| AppError::Read {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(text)
        }
    }
}

fn build_pager(args: &Args) -> Result<CardPager, AppError> {
    let config_error = |path: &Path, source: StyleError| AppError::Config {
        path: path.display().to_string(),
        source,
    };

    let mut sheet = args.template.style_sheet();
    if let Some(path) = &args.style {
        sheet = sheet
            .with_overrides(&read_file(path)?)
            .map_err(|e| config_error(path, e))?;
    }

    let mut rules = PaginationRules::default();
    if let Some(path) = &args.rules {
        rules = PaginationRules::from_json(&read_file(path)?).map_err(|e| config_error(path, e))?;
    }

    let pager = CardPager::with_style_sheet(sheet);
    pager.with_rules(rules).map_err(|e| AppError::Config {
        path: "<rules>".to_string(),
        source: e.into(),
    })
}

fn run(args: Args) -> Result<(), AppError> {
    let pager = build_pager(&args)?;
    let text = read_input(args.input.as_deref())?;
    let pages = pager.paginate(&text)?;
    info!(
        "{} page(s) with the {} template",
        pages.len(),
        pager.style_sheet().template.name()
    );

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&pages)?),
        Format::Text => {
            for page in &pages {
                println!(
                    "──── {} / {} ({:?}) ────",
                    page.index + 1,
                    pages.len(),
                    page.role(pages.len())
                );
                println!("{}", page.content());
            }
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}
