// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use srtran::app_config::{Backend, Config, LogLevel};
use srtran::app_controller::{Controller, FileOutcome};
use srtran::errors::{AppError, TranslationError};
use srtran::translation::CancellationSignal;

/// CLI Wrapper for Backend to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliBackend {
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "openrouter")]
    OpenRouter,
    #[value(name = "googleai", aliases = ["google", "gemini"])]
    GoogleAI,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliBackend> for Backend {
    fn from(cli_backend: CliBackend) -> Self {
        match cli_backend {
            CliBackend::OpenAI => Backend::OpenAI,
            CliBackend::OpenRouter => Backend::OpenRouter,
            CliBackend::GoogleAI => Backend::GoogleAI,
            CliBackend::LMStudio => Backend::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an SRT file, or every SRT file in a directory
    Translate(TranslateArgs),

    /// Generate shell completions for srtran
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input SRT file or directory
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Output file (single file mode only; defaults to <stem>.<target>.srt)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Source language, name or ISO code (e.g. 'English', 'en')
    #[arg(short, long)]
    source: String,

    /// Target language, name or ISO code (e.g. 'Norwegian', 'nb')
    #[arg(short, long)]
    target: String,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    backend: Option<CliBackend>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Requests per minute (0 disables rate limiting)
    #[arg(long)]
    rpm: Option<u32>,

    /// Subtitles per request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Override the backend's API base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Log every translated subtitle and provider diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// SRTran - subtitle translation with large language models
///
/// Translates SRT subtitles in batches through OpenAI, OpenRouter,
/// Google AI or a local LM Studio server.
#[derive(Parser, Debug)]
#[command(name = "srtran")]
#[command(version)]
#[command(about = "Translate SRT subtitles with AI backends")]
#[command(long_about = "SRTran translates SRT subtitle files using large language models.

EXAMPLES:
    srtran translate -i movie.srt -s en -t fr                 # Translate one file
    srtran translate -i movie.srt -o out.srt -s en -t de -f   # Explicit output, overwrite
    srtran translate -i /shows/ -s English -t Spanish          # Every .srt in a directory
    srtran translate -i movie.srt -s en -t ja -b openrouter -m openai/gpt-4o --rpm 20
    srtran completions bash > srtran.bash                      # Generate bash completions

CONFIGURATION:
    Settings are read from the file given with --config, otherwise from the first of
    srtran.json, .srtran.json, ~/.config/srtran/config.json and ~/.srtran.json.
    GOOGLE_AI_API_KEY, OPENROUTER_API_KEY, OPENAI_API_KEY and LMSTUDIO_API_KEY (with
    matching _MODEL and _RPM variables, and LMSTUDIO_BASE_URL) override the file.
    Command line flags override both.

SUPPORTED BACKENDS:
    openai     - OpenAI API (requires API key)
    openrouter - OpenRouter gateway (requires API key)
    googleai   - Google AI / Gemini (requires API key)
    lmstudio   - LM Studio local server (http://localhost:1234/v1 by default)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger; the effective level is `log::max_level()`
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Info until the configuration says otherwise
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    let result: Result<(), AppError> = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "srtran", &mut std::io::stdout());
            Ok(())
        }
        Commands::Version => {
            println!("srtran {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    };

    if let Err(e) = result {
        match &e {
            AppError::Translation(TranslationError::Cancelled) => warn!("Translation cancelled"),
            other => error!("{}", other),
        }
        std::process::exit(e.exit_code());
    }
}

/// Config file, then environment, then command line flags
fn resolve_config(options: &TranslateArgs) -> Result<Config> {
    let (mut config, loaded_from) = Config::load(options.config.as_deref())?;
    match &loaded_from {
        Some(path) => debug!("Loaded configuration from {}", path.display()),
        None => debug!("No configuration file found, using defaults and environment"),
    }

    if let Some(backend) = options.backend {
        config.backend = backend.into();
    }
    if let Some(model) = &options.model {
        config.model = model.clone();
    }
    if let Some(rpm) = options.rpm {
        config.rpm = rpm;
    }
    if let Some(batch_size) = options.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(base_url) = &options.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<(), AppError> {
    let config = resolve_config(&options).map_err(|e| AppError::Config(format!("{:#}", e)))?;

    let level = if options.log_level.is_none() && options.verbose {
        LevelFilter::Debug
    } else {
        config.log_level.to_level_filter()
    };
    log::set_max_level(level);

    let controller =
        Controller::new(&config, options.verbose).map_err(|e| AppError::Config(format!("{:#}", e)))?;
    info!("Backend: {} - {}", config.backend.display_name(), config.model);

    let cancel = CancellationSignal::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current request");
            signal.cancel();
        }
    });

    let result = if options.input.is_file() {
        controller
            .run(
                &options.input,
                options.output.as_deref(),
                &options.source,
                &options.target,
                options.force_overwrite,
                &cancel,
            )
            .await
            .map(|outcome| {
                if let FileOutcome::Skipped(path) = outcome {
                    debug!("Nothing to do for {}", path.display());
                }
            })
    } else if options.input.is_dir() {
        if options.output.is_some() {
            warn!("--output is ignored when the input is a directory");
        }
        controller
            .run_folder(&options.input, &options.source, &options.target, options.force_overwrite, &cancel)
            .await
            .and_then(|summary| {
                if summary.failed > 0 {
                    Err(anyhow!("{} file(s) failed to translate", summary.failed))
                } else {
                    Ok(())
                }
            })
    } else {
        Err(anyhow!("Input path does not exist: {}", options.input.display()))
    };

    controller.close();
    result.map_err(AppError::from)
}
