//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. Secrets are read from the
//! environment (or flags) so they never need to live in a config file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use secrecy::SecretString;

use parley_infra::config::ConfigSources;
use parley_observe::tracing_setup::LogFormat;

/// Authenticated chat API backed by Gemini.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line encoding.
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve(ServeArgs),

    /// Apply pending database migrations and exit.
    Migrate {
        /// SQLite database URL.
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (overrides the settings file).
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides the settings file).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to a TOML settings file.
    #[arg(short, long, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// `development` or `production`.
    #[arg(long = "env", env = "PARLEY_ENV")]
    pub environment: Option<String>,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "COOKIE_SECRET", hide_env_values = true)]
    pub cookie_secret: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Browser origin allowed to make credentialed requests.
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    #[arg(long, env = "COOKIE_DOMAIN")]
    pub cookie_domain: Option<String>,
}

impl ServeArgs {
    /// Move the raw values into the shape the config assembler validates.
    pub fn sources(&self) -> ConfigSources {
        ConfigSources {
            environment: self.environment.clone(),
            database_url: self.database_url.clone(),
            jwt_secret: self.jwt_secret.clone().map(SecretString::from),
            cookie_secret: self.cookie_secret.clone().map(SecretString::from),
            gemini_api_key: self.gemini_api_key.clone().map(SecretString::from),
            frontend_url: self.frontend_url.clone(),
            cookie_domain: self.cookie_domain.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Default tracing filter derived from `-q` / `-v`.
    pub fn default_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "info,parley=debug,parley_core=debug,parley_infra=debug,parley_api=debug",
            _ => "trace",
        }
    }
}
