// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, warn, LevelFilter, Level, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use subedit::app_config::{self, Config};
use subedit::app_controller::Controller;

// @const: Exit status of `check` when the file is unfinished or mistimed
const CHECK_PROBLEMS_EXIT: u8 = 2;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report caption counts, completeness, timing problems and warnings
    Check {
        /// DFXP caption file
        #[arg(value_name = "FILE")]
        input_file: PathBuf,
    },

    /// Move caption times forward or backward
    Shift {
        /// DFXP caption file
        #[arg(value_name = "FILE")]
        input_file: PathBuf,

        /// Amount to shift by, in milliseconds
        #[arg(short, long)]
        amount: f64,

        /// Only shift captions starting at or after this time (H:MM:SS.mmm)
        #[arg(long)]
        from: Option<String>,

        /// Shift backward instead of forward
        #[arg(short, long)]
        backward: bool,

        /// Output file (defaults to FILE.shifted.dfxp)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create an empty version in another language with the timing of a base file
    Seed {
        /// DFXP caption file whose timing is copied
        #[arg(value_name = "BASE")]
        base_file: PathBuf,

        /// Language code of the new version (e.g., 'fr', 'pt-br')
        #[arg(long)]
        language: Option<String>,

        /// Output file (defaults to BASE.<language>.dfxp)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions for subedit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subedit - caption timeline editor tools
///
/// Works on DFXP/TTML caption files: checks them, shifts their timing and
/// seeds new language versions from an existing one.
#[derive(Parser, Debug)]
#[command(name = "subedit")]
#[command(version)]
#[command(about = "Caption timeline tools for DFXP files")]
#[command(long_about = "subedit loads DFXP caption files into a caption timeline to check, retime and seed them.

EXAMPLES:
    subedit check talk.en.dfxp                     # Counts, completeness and warnings
    subedit shift talk.en.dfxp -a 1500             # Move every caption 1.5s later
    subedit shift talk.en.dfxp -a 500 -b --from 0:01:00.000
    subedit seed talk.en.dfxp --language fr        # Empty French version with the same timing
    subedit completions bash > subedit.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
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
        metadata.level() <= self.level
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

/// Load the configuration file, creating a default one when it does not exist
fn load_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.write_to_file(config_path)?;
        config
    };

    if let Some(log_level) = log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Trace lets the level be lowered once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subedit", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli.config_path, cli.log_level.as_ref())?;
    log::set_max_level(config.log_level.to_level_filter());

    let default_language = config.default_language.clone();
    let controller = Controller::with_config(config)?;

    let result = match cli.command {
        Commands::Check { input_file } => controller.check(&input_file).await.map(|report| {
            if report.has_problems() {
                ExitCode::from(CHECK_PROBLEMS_EXIT)
            } else {
                ExitCode::SUCCESS
            }
        }),
        Commands::Shift {
            input_file,
            amount,
            from,
            backward,
            output,
        } => controller
            .shift(&input_file, amount, from.as_deref(), backward, output)
            .await
            .map(|_| ExitCode::SUCCESS),
        Commands::Seed {
            base_file,
            language,
            output,
        } => {
            let language = language.unwrap_or(default_language);
            controller.seed(&base_file, &language, output).await.map(|_| ExitCode::SUCCESS)
        }
        Commands::Completions { .. } => Ok(ExitCode::SUCCESS),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    log::logger().flush();
    result
}
