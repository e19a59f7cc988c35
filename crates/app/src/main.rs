use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use pinyin_core::model::{
    LevelSelection, PracticeMode, PracticeSettings, Theme, Vocabulary, VocabularyCategory,
};
use pinyin_core::selection::SequentialEnd;
use services::sessions::DEFAULT_ADVANCE_DELAY;
use services::{AppServices, Clock, SessionConfig};

mod logging;
mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidValue { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidValue { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- practice  [common] [--restart]");
    eprintln!("  cargo run -p app -- paragraph [common]");
    eprintln!("  cargo run -p app -- stats     [common]");
    eprintln!("  cargo run -p app -- reset     [common]");
    eprintln!("  cargo run -p app -- settings  [common] [--mode sequential|random|review]");
    eprintln!("                                [--level hsk1|hsk2|hsk3|hsk4|hsk1-2|hsk1-3|hsk1-4|all]");
    eprintln!("                                [--categories pronouns,food,...] [--translation on|off]");
    eprintln!("                                [--theme light|dark|system]");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url>             default sqlite://pinyin.sqlite3");
    eprintln!("  --vocab <path>                vocabulary JSON instead of the bundled list");
    eprintln!("  --delay-ms <ms>               pause after a correct answer, default 200");
    eprintln!("  --sequential-end complete|wrap");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PINYIN_DB_URL, PINYIN_VOCAB_PATH, PINYIN_ADVANCE_DELAY_MS, PINYIN_SEQUENTIAL_END,");
    eprintln!("  PINYIN_AI_API_KEY, PINYIN_AI_BASE_URL, PINYIN_AI_MODEL, PINYIN_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Paragraph,
    Stats,
    Reset,
    Settings,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "paragraph" => Some(Self::Paragraph),
            "stats" => Some(Self::Stats),
            "reset" => Some(Self::Reset),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }
}

/// Settings flags; unset fields keep the stored value.
#[derive(Debug, Default, PartialEq, Eq)]
struct SettingsUpdate {
    mode: Option<PracticeMode>,
    level: Option<LevelSelection>,
    categories: Option<Vec<VocabularyCategory>>,
    show_translation: Option<bool>,
    theme: Option<Theme>,
}

impl SettingsUpdate {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, current: PracticeSettings) -> PracticeSettings {
        PracticeSettings {
            selected_categories: self.categories.unwrap_or(current.selected_categories),
            mode: self.mode.unwrap_or(current.mode),
            level: self.level.unwrap_or(current.level),
            show_translation: self.show_translation.unwrap_or(current.show_translation),
            theme: self.theme.unwrap_or(current.theme),
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    vocab_path: Option<PathBuf>,
    advance_delay: Duration,
    sequential_end: SequentialEnd,
    restart: bool,
    settings: SettingsUpdate,
}

impl Args {
    fn from_env() -> Self {
        let db_url = std::env::var("PINYIN_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://pinyin.sqlite3".into(), normalize_sqlite_url);
        let vocab_path = std::env::var("PINYIN_VOCAB_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let advance_delay = std::env::var("PINYIN_ADVANCE_DELAY_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or(DEFAULT_ADVANCE_DELAY, Duration::from_millis);
        let sequential_end = std::env::var("PINYIN_SEQUENTIAL_END")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();

        Self {
            db_url,
            vocab_path,
            advance_delay,
            sequential_end,
            restart: false,
            settings: SettingsUpdate::default(),
        }
    }

    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
        mut parsed: Self,
    ) -> Result<Self, ArgsError> {
        while let Some(arg) = args.next() {
            match (arg.as_str(), cmd) {
                ("--db", _) => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                ("--vocab", _) => {
                    parsed.vocab_path = Some(PathBuf::from(require_value(args, "--vocab")?));
                }
                ("--delay-ms", _) => {
                    let value = require_value(args, "--delay-ms")?;
                    parsed.advance_delay =
                        Duration::from_millis(parse_value(value, "--delay-ms")?);
                }
                ("--sequential-end", _) => {
                    let value = require_value(args, "--sequential-end")?;
                    parsed.sequential_end = parse_value(value, "--sequential-end")?;
                }
                ("--restart", Command::Practice) => parsed.restart = true,
                ("--mode", Command::Settings) => {
                    let value = require_value(args, "--mode")?;
                    parsed.settings.mode = Some(parse_value(value, "--mode")?);
                }
                ("--level", Command::Settings) => {
                    let value = require_value(args, "--level")?;
                    parsed.settings.level = Some(parse_value(value, "--level")?);
                }
                ("--categories", Command::Settings) => {
                    let value = require_value(args, "--categories")?;
                    parsed.settings.categories = Some(parse_categories(value)?);
                }
                ("--translation", Command::Settings) => {
                    let value = require_value(args, "--translation")?;
                    parsed.settings.show_translation = Some(parse_switch(value, "--translation")?);
                }
                ("--theme", Command::Settings) => {
                    let value = require_value(args, "--theme")?;
                    parsed.settings.theme = Some(parse_value(value, "--theme")?);
                }
                ("--help" | "-h", _) => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

/// Comma-separated category names; an empty value selects no category.
fn parse_categories(raw: String) -> Result<Vec<VocabularyCategory>, ArgsError> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.parse().map_err(|_| ArgsError::InvalidValue {
                flag: "--categories",
                raw: name.to_string(),
            })
        })
        .collect()
}

fn parse_switch(raw: String, flag: &'static str) -> Result<bool, ArgsError> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(ArgsError::InvalidValue { flag, raw }),
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn load_vocabulary(path: Option<&PathBuf>) -> Result<Vocabulary, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(Vocabulary::from_json(&raw)?)
        }
        None => Ok(Vocabulary::builtin()?),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Without a subcommand, practice words.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Practice,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Practice,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter, Args::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing::debug!(command = ?cmd, db = %parsed.db_url, "starting");

    // The database file must exist before sqlx opens it.
    prepare_sqlite_file(&parsed.db_url)?;
    let vocabulary = load_vocabulary(parsed.vocab_path.as_ref())?;
    let config = SessionConfig::default()
        .with_sequential_end(parsed.sequential_end)
        .with_advance_delay(parsed.advance_delay);
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::system(), config, vocabulary).await?;

    match cmd {
        Command::Practice => terminal::run_practice(&services, parsed.restart).await,
        Command::Paragraph => terminal::run_paragraph(&services).await,
        Command::Stats => {
            let summary = services.settings().summary().await?;
            terminal::print_summary(&summary);
            Ok(())
        }
        Command::Reset => {
            services.settings().reset().await?;
            println!("Statistics and progress cleared.");
            Ok(())
        }
        Command::Settings => {
            let settings = services.settings();
            let current = settings.load().await?;
            let shown = if parsed.settings.is_empty() {
                current
            } else {
                settings.save(parsed.settings.apply(current)).await?
            };
            terminal::print_settings(&shown);
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    logging::init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
