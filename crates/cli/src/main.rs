mod settings;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use currency_codes::CodeTable;
use models::{Granularity, Period, Snapshot};
use pipeline::Collector;
use rate_sources::{SourceConfig, get_source};
use translation::{DEFAULT_CACHE_FILE, MyMemoryConfig, MyMemoryTranslator, TranslationCache};

#[derive(Debug, Parser)]
#[command(
    name = "rates",
    about = "Historical Ukrainian bank exchange rates: fetch, export, chart."
)]
struct Cli {
    /// Optional settings.json with base URLs and file locations
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Translation cache file (default CACHE.json)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Currency code table file (bundled table when omitted)
    #[arg(long, global = true)]
    codes: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct SnapshotArgs {
    /// Currency, alphabetic or numeric ("USD" or 840)
    #[arg(short, long)]
    currency: String,

    /// Date, e.g. 2021-04-03
    #[arg(short, long)]
    date: NaiveDate,

    /// Rate source: minfin or nbu
    #[arg(short, long, default_value = "minfin")]
    source: String,
}

#[derive(Debug, Args)]
struct PeriodArgs {
    /// Currency, alphabetic or numeric ("USD" or 840)
    #[arg(short, long)]
    currency: String,

    /// First date of the range
    #[arg(long)]
    from: NaiveDate,

    /// Last date of the range, inclusive
    #[arg(long)]
    to: NaiveDate,

    /// Step: day, month or year (day costs one request per day)
    #[arg(long, default_value = "year")]
    by: Granularity,

    /// Rate source: minfin or nbu
    #[arg(short, long, default_value = "minfin")]
    source: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch one date's rates and print them as JSON
    FetchSnapshot(SnapshotArgs),
    /// Fetch a date range and print it as JSON
    FetchPeriod(PeriodArgs),
    /// Fetch a date range and write it to a .json file
    ExportJson {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Fetch a date range and write it to a .csv file
    ExportCsv {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Fetch a date range, align it and render an SVG line chart
    Plot {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Only chart these banks (comma separated display names)
        #[arg(long, value_delimiter = ',')]
        banks: Vec<String>,

        /// Only chart banks present on every date of the period
        #[arg(long)]
        complete_only: bool,
    },
    /// List the cached bank display names
    Variants,
}

struct App {
    codes: CodeTable,
    cache: TranslationCache,
    translator: MyMemoryTranslator,
    source_config: SourceConfig,
    cache_path: PathBuf,
}

fn build_app(cli: &Cli) -> Result<App> {
    let settings = settings::load_optional_settings(cli.settings.as_ref())?.unwrap_or_default();

    let cache_path = cli
        .cache
        .clone()
        .or(settings.cache_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));
    let cache = TranslationCache::load(cache_path.clone())?;

    let codes = match cli.codes.as_ref().or(settings.codes_file.as_ref()) {
        Some(path) => CodeTable::load(path)?,
        None => CodeTable::bundled(),
    };

    let mut source_config = SourceConfig::default();
    if let Some(url) = settings.minfin_base_url {
        source_config.minfin_base_url = url;
    }
    if let Some(url) = settings.nbu_base_url {
        source_config.nbu_base_url = url;
    }
    if let Some(timeout) = settings.timeout_secs {
        source_config.timeout_secs = timeout;
    }

    let mut translator_config = MyMemoryConfig::default();
    if let Some(url) = settings.translation_base_url {
        translator_config.base_url = url;
    }
    if let Some(timeout) = settings.timeout_secs {
        translator_config.timeout_secs = timeout;
    }
    let translator = MyMemoryTranslator::new(translator_config)?;

    Ok(App {
        codes,
        cache,
        translator,
        source_config,
        cache_path,
    })
}

fn fetch_snapshot(app: &mut App, args: &SnapshotArgs) -> Result<Snapshot> {
    let cc = app.codes.canonical_cc(&args.currency)?;
    let source = get_source(&args.source, &app.source_config)?;
    let mut collector = Collector {
        codes: &app.codes,
        cache: &mut app.cache,
        translator: &app.translator,
    };
    collector
        .snapshot(source.as_ref(), &cc, args.date)
        .with_context(|| format!("fetching {cc} on {} from {}", args.date, args.source))
}

fn fetch_period(app: &mut App, args: &PeriodArgs) -> Result<Period> {
    let cc = app.codes.canonical_cc(&args.currency)?;
    let source = get_source(&args.source, &app.source_config)?;
    let mut collector = Collector {
        codes: &app.codes,
        cache: &mut app.cache,
        translator: &app.translator,
    };
    collector
        .collect(source.as_ref(), &cc, args.from, args.to, args.by)
        .with_context(|| {
            format!(
                "collecting {cc} from {} to {} by {} from {}",
                args.from, args.to, args.by, args.source
            )
        })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut app = build_app(&cli)?;

    match cli.command {
        Command::FetchSnapshot(args) => {
            let snapshot = fetch_snapshot(&mut app, &args)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::FetchPeriod(args) => {
            let period = fetch_period(&mut app, &args)?;
            println!("{}", serde_json::to_string_pretty(&period)?);
        }
        Command::ExportJson { period, out } => {
            let data = fetch_period(&mut app, &period)?;
            export::write_json(&out, &data, &app.cache_path)?;
            println!("Wrote {}", out.display());
        }
        Command::ExportCsv { period, out } => {
            let data = fetch_period(&mut app, &period)?;
            export::write_csv_period(&out, &data)?;
            println!("Wrote {}", out.display());
        }
        Command::Plot {
            period,
            out,
            banks,
            complete_only,
        } => {
            let data = fetch_period(&mut app, &period)?;
            let aligned = pipeline::align(&data)?;
            let mut records = if complete_only {
                aligned.complete_only()
            } else {
                aligned.into_records()
            };
            if !banks.is_empty() {
                records.retain(|r| banks.iter().any(|b| b == &r.bank));
            }
            chart::write_svg(&out, &records)?;
            println!("Wrote {}", out.display());
        }
        Command::Variants => {
            for name in app.cache.display_names() {
                println!("{name}");
            }
        }
    }
    Ok(())
}
