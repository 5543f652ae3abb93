use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    ApiClient, ApiConfig, AuthService, CredentialContext, ExamConfig, ExamService,
};
use storage::repository::Storage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://exam.sqlite3";

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidApiUrl { raw: String },
    InvalidDuration { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
            ArgsError::InvalidDuration { raw } => {
                write!(f, "invalid --duration value: {raw} (expected seconds > 0)")
            }
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

struct DesktopApp {
    auth: Arc<AuthService>,
    exams: Arc<ExamService>,
}

impl UiApp for DesktopApp {
    fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    api: ApiConfig,
    db_url: String,
    exam: ExamConfig,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            db_url: DEFAULT_DB_URL.to_owned(),
            exam: ExamConfig::default(),
        }
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api <url>] [--db <sqlite_url>] [--duration <secs>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api {}", services::DEFAULT_API_URL);
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --duration 1800");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_API_URL, EXAM_DB_URL, EXAM_DURATION_SECS, RUST_LOG");
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Run(Args),
    Help,
}

impl Args {
    fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            db_url: std::env::var("EXAM_DB_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            exam: ExamConfig::from_env(),
        }
    }

    /// Apply command-line flags on top of `self`.
    fn parse(mut self, args: &mut impl Iterator<Item = String>) -> Result<Invocation, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    let value = require_value(args, "--api")?;
                    let trimmed = value.trim();
                    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    self.api = ApiConfig::new(trimmed).with_timeout(self.api.timeout);
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = normalize_sqlite_url(value);
                }
                "--duration" => {
                    let value = require_value(args, "--duration")?;
                    let secs = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or_else(|| ArgsError::InvalidDuration { raw: value.clone() })?;
                    self.exam = ExamConfig { duration_secs: secs };
                }
                "--help" | "-h" => return Ok(Invocation::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Invocation::Run(self))
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

fn init_tracing() {
    let filter = ["services=info", "app=info"]
        .into_iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive);
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = match Args::from_env().parse(&mut argv) {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::Help) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    let credentials = Arc::new(CredentialContext::new(Arc::clone(&storage.credentials)));
    match credentials.restore().await {
        Ok(true) => info!("restored saved login"),
        Ok(false) => {}
        Err(err) => warn!(%err, "could not read saved login; starting signed out"),
    }

    let client = ApiClient::new(&args.api, Arc::clone(&credentials))?;
    let transport = Arc::new(client.clone());
    let exams = ExamService::new(transport.clone(), transport.clone(), transport, args.exam);
    info!(
        api = %args.api.base_url,
        duration_secs = args.exam.duration_secs,
        "starting exam client"
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        auth: Arc::new(AuthService::new(client)),
        exams: Arc::new(exams),
    });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Exam")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
