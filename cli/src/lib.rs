//! routeprobe command-line front end
//!
//! Argument parsing and the run loop that prints one line per probe. The
//! interactive credential prompt of older smoke scripts is replaced by
//! flags and `ROUTEPROBE_*` environment variables so runs can be unattended.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod error;

pub use error::{CliError, Result};

use clap::Parser;
use routeprobe_core::report::{render, summary};
use routeprobe_core::{
    resolve_config, ConfigOverrides, RouteProber, SmokeConfig, SmokeSuite, SuiteReport, Transport,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

// The runtime itself is started by the binary.
use tokio as _;

/// Command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "routeprobe")]
#[command(about = "Smoke-test the health, login and protected routes of an HTTP backend")]
#[command(version)]
pub struct Cli {
    /// Backend base URL, e.g. https://backend.example.com
    #[arg(long, env = "ROUTEPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Route plan TOML file
    #[arg(long, value_name = "FILE", env = "ROUTEPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Login email used to obtain a bearer token
    #[arg(long, env = "ROUTEPROBE_EMAIL")]
    pub email: Option<String>,

    /// Login password used to obtain a bearer token
    #[arg(long, env = "ROUTEPROBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Value of the `subject` header on protected requests
    #[arg(long, env = "ROUTEPROBE_SUBJECT")]
    pub subject: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Values that override the route plan file
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            subject: self.subject.clone(),
        }
    }

    /// Merge the route plan file (if any) with flags and environment
    pub fn resolve(&self) -> Result<SmokeConfig> {
        if self.log_level.trim().is_empty() {
            return Err(CliError::InvalidArgument(
                "--log-level: cannot be empty".to_string(),
            ));
        }
        if let Some(path) = &self.config {
            if !path.is_file() {
                return Err(CliError::ConfigError(format!(
                    "route plan {} not found",
                    path.display()
                )));
            }
        }
        Ok(resolve_config(self.config.as_deref(), self.overrides())?)
    }
}

/// Run the smoke suite, writing the report to `out`
///
/// Probe failures are part of the report, not errors; only a failing
/// writer makes this return `Err`.
pub async fn run<T, W>(config: SmokeConfig, transport: T, out: &mut W) -> Result<SuiteReport>
where
    T: Transport + Send + Sync,
    W: Write,
{
    let suite = SmokeSuite::new(config, RouteProber::new(transport));
    writeln!(out, "Testing backend routes at {}\n", suite.config().base_url)?;

    let mut write_error = None;
    let report = suite
        .run(|event| {
            if write_error.is_none() {
                if let Err(e) = writeln!(out, "{}", render(event)) {
                    write_error = Some(e);
                }
            }
        })
        .await;
    if let Some(e) = write_error {
        return Err(e.into());
    }

    writeln!(out, "\n{}", summary(&report))?;
    info!(passed = report.passed(), failed = report.failed(), "report written");
    Ok(report)
}
