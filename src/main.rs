use std::{
    env,
    path::{Path, PathBuf},
    process,
};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{info, warn};

use fundutil::{ledger::Ledger, range::DateRange, report::Report, schemes::SchemeMap};

const SCHEME_MAP_FILE: &str = "scheme_codes.json";

/// Summarise mutual fund holdings from CAMS .csv transaction statements
#[derive(Parser, Debug)]
#[clap(version)]
struct Args {
    /// Directory holding the .csv statements (defaults to the current directory)
    path: Option<PathBuf>,

    /// Report the amount invested between two dd-mon-yyyy dates, either may be left empty
    #[clap(short = 'i', long = "invested", value_name = "START:END")]
    invested: Option<String>,

    /// JSON object mapping CAMS product codes to scheme codes. Defaults to
    /// scheme_codes.json in the statement directory; a ready-made table ships
    /// as data/scheme_codes.json in the source tree
    #[clap(short = 'm', long = "scheme-map", value_name = "FILE")]
    scheme_map: Option<PathBuf>,
}

impl Args {
    fn working_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => env::current_dir().context("cannot determine the current directory"),
        }
    }

    fn scheme_map_path(&self, working_dir: &Path) -> PathBuf {
        self.scheme_map
            .clone()
            .unwrap_or_else(|| working_dir.join(SCHEME_MAP_FILE))
    }

    /// `None` selects the holdings report.
    fn date_range(&self, today: NaiveDate) -> fundutil::error::Result<Option<DateRange>> {
        self.invested
            .as_deref()
            .map(|value| DateRange::parse(value, today))
            .transpose()
    }
}

fn load_scheme_map(args: &Args, working_dir: &Path) -> anyhow::Result<SchemeMap> {
    let path = args.scheme_map_path(working_dir);
    let schemes = SchemeMap::load(&path);
    let schemes = if args.scheme_map.is_none() {
        schemes.with_context(|| {
            format!(
                "copy data/scheme_codes.json into {} or pass --scheme-map <FILE>",
                working_dir.display()
            )
        })?
    } else {
        schemes?
    };

    if schemes.is_empty() {
        warn!("Scheme map {} has no entries", path.display());
    }
    info!("Loaded {} scheme codes from {}", schemes.len(), path.display());
    Ok(schemes)
}

fn run(args: Args) -> anyhow::Result<()> {
    let working_dir = args.working_dir()?;
    let range = args.date_range(Local::now().date_naive())?;
    let schemes = load_scheme_map(&args, &working_dir)?;

    let ledger = Ledger::load(&working_dir, &schemes)?;
    let report = match range {
        Some(range) => Report::invested(&ledger, range),
        None => Report::holdings(&ledger),
    };
    print!("{}", report);
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}
