use std::{borrow::Cow, fmt, io::IsTerminal, path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, Role};
use logforth::filter::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "Gatekeeper", version, long_about = concat!("Gatekeeper v", env!("CARGO_PKG_VERSION")))]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short, env = "GATEKEEPER_CONFIG_PATH", default_value = "./gatekeeper.toml")]
    pub config: PathBuf,
    /// Set the logging level
    #[arg(long = "log", env = "GATEKEEPER_LOG", default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
    /// Set the style of log output
    #[arg(long, env = "GATEKEEPER_LOG_STYLE", default_value_t = LogStyle::default())]
    pub log_style: LogStyle,
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn config(&self) -> anyhow::Result<Config> {
        let config = if self.config.exists() {
            Config::load(&self.config)?
        } else {
            log::warn!(
                "Configuration file {} not found, using defaults",
                self.config.display()
            );
            Config::default()
        };

        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the configured routes and whether a role can reach them
    Routes {
        /// Role to render the menu for; omit to render it for a signed-out visitor
        #[arg(long)]
        role: Option<Role>,
    },
    /// Check whether a role may access a path
    Check {
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        path: String,
    },
    /// Sign in against the identity authority and show the resulting session
    Login {
        #[arg(long, short)]
        username: String,
        #[arg(long, short, env = "GATEKEEPER_PASSWORD", hide_env_values = true)]
        password: String,
        /// Toggle the role once after signing in
        #[arg(long)]
        toggle: bool,
    },
    /// Probe the identity authority's health endpoint
    Health {
        /// Bearer token to probe with
        #[arg(long, env = "GATEKEEPER_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Colorized text, used as the default with TTY output
    Color,
    /// Standard text, used as the default with non-TTY output
    Text,
    /// JSON objects
    Json,
}

impl Default for LogStyle {
    fn default() -> Self {
        if std::io::stderr().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Color => "color",
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Disable logging
    Off,
    /// Only log errors
    Error,
    /// Log errors, and warnings
    #[default]
    Warn,
    /// Log errors, warnings, and info messages
    Info,
    /// Log errors, warnings, info, and debug messages
    Debug,
    /// Log errors, warnings, info, debug, and trace messages
    Trace,
}

impl LogLevel {
    pub fn env_filter(self) -> EnvFilter {
        let filter_str = match self {
            LogLevel::Off => Cow::Borrowed("off"),
            // Dependencies stay at 'warn', workspace crates follow the selected level
            level => Cow::Owned(format!(
                "warn,gatekeeper={level},client={level},gateway={level},session={level},route_policy={level},config={level}"
            )),
        };

        EnvFilter::from_str(&filter_str).expect("These all are valid env filters.")
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
