use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, Parser};
use directories::ProjectDirs;
use keyring::Entry;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use url::Url;

use crate::error::Error;
use crate::status::{AlertStatus, PluginOutput};

pub const DEFAULT_PORT: u16 = 8089;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
const APP_NAME: &str = "splunk-result-count";

/// Flags shared by both plugins.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Splunk username
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Splunk password
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Splunk API port (usually 8089)
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Splunk hostname
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Saved search to execute (enclose in quotes if needed)
    #[arg(short = 'j', long)]
    pub job: Option<String>,

    /// Time to wait for the search job to become ready, in seconds
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Verify the TLS certificate of the Splunk management port
    #[arg(long)]
    pub verify_ssl: bool,

    /// Path to a TOML config file with connection settings
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Resolve file, environment, flag and keyring settings into a request.
    pub fn search_request(&self) -> crate::Result<SearchRequest> {
        let settings = Settings::load(self).map_err(|e| Error::Configuration(format!("{:#}", e)))?;
        settings.into_request(self.job.clone(), self.timeout)
    }
}

#[derive(Debug, Parser)]
#[command(name = "check-splunk-result-count")]
#[command(about = "Run a saved search in Splunk and alert on the number of returned results")]
#[command(disable_help_flag = true)]
pub struct CheckCli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Warning result count (<= or >= depending on comparison method)
    #[arg(short = 'w', long = "warn", default_value_t = 5, allow_negative_numbers = true)]
    pub warn: i64,

    /// Critical result count (<= or >= depending on comparison method)
    #[arg(short = 'c', long = "crit", default_value_t = 0, allow_negative_numbers = true)]
    pub crit: i64,

    /// Comparison method for warning/critical: lt (less than) or gt (greater than)
    #[arg(short = 'm', long, default_value = "lt")]
    pub compmethod: String,

    /// Show this message
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

#[derive(Debug, Parser)]
#[command(name = "metric-splunk-result-count")]
#[command(about = "Run a saved search in Splunk and output the number of returned results as a metric")]
#[command(disable_help_flag = true)]
pub struct MetricCli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Metric naming scheme, text to prepend to the metric
    #[arg(short = 's', long)]
    pub scheme: Option<String>,

    /// Show this message
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

/// Parse the command line, turning clap failures into the plugin contract.
///
/// `--help` exits 0; any other parse failure is an UNKNOWN status line.
pub fn parse_cli<T: Parser>(plugin: &'static str) -> std::result::Result<T, ExitCode> {
    T::try_parse().map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            ExitCode::SUCCESS
        }
        _ => {
            let rendered = e.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            let message = first.trim_start_matches("error: ").to_string();
            PluginOutput::new(plugin, AlertStatus::Unknown, message).print_and_exit()
        }
    })
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything one invocation needs. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
    pub job_name: String,
    pub timeout_seconds: u64,
    pub verify_ssl: bool,
}

impl SearchRequest {
    pub fn base_url(&self) -> crate::Result<Url> {
        let raw = format!("https://{}:{}", self.host, self.port);
        Url::parse(&raw)
            .map_err(|e| Error::Configuration(format!("Invalid Splunk host '{}': {}", self.host, e)))
    }
}

/// Connection settings gathered from every source before validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub verify_ssl: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            host: String::new(),
            port: DEFAULT_PORT,
            verify_ssl: false,
        }
    }
}

#[derive(Deserialize, Serialize, Default)]
pub struct FileConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub verify_ssl: Option<bool>,
}

impl Settings {
    pub fn load(args: &ConnectionArgs) -> Result<Self> {
        let mut settings = Settings::default();

        // 1. Config file: explicit path must exist, the default one is optional
        match &args.config {
            Some(path) => settings.merge(read_file_config(path)?),
            None => {
                if let Some(path) = default_config_path() {
                    if path.exists() {
                        match read_file_config(&path) {
                            Ok(file_config) => settings.merge(file_config),
                            Err(e) => warn!("Ignoring config file {:?}: {:#}", path, e),
                        }
                    }
                }
            }
        }

        // 2. Environment
        settings.merge_env(|key| env::var(key).ok());

        // 3. Flags
        settings.merge_args(args);

        // 4. Keyring, only when no other source supplied a password
        if settings.password.is_empty() && !settings.username.is_empty() {
            if let Ok(entry) = Entry::new(APP_NAME, &settings.username) {
                if let Ok(password) = entry.get_password() {
                    info!("Using password for '{}' from keyring", settings.username);
                    settings.password = password;
                }
            }
        }

        Ok(settings)
    }

    fn merge(&mut self, other: FileConfig) {
        if let Some(v) = other.username {
            self.username = v;
        }
        if let Some(v) = other.password {
            self.password = v;
        }
        if let Some(v) = other.host {
            self.host = v;
        }
        if let Some(v) = other.port {
            self.port = v;
        }
        if let Some(v) = other.verify_ssl {
            self.verify_ssl = v;
        }
    }

    fn merge_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SPLUNK_USERNAME") {
            self.username = val;
        }
        if let Some(val) = lookup("SPLUNK_PASSWORD") {
            self.password = val;
        }
        if let Some(val) = lookup("SPLUNK_HOST") {
            self.host = val;
        }
        if let Some(val) = lookup("SPLUNK_PORT") {
            match val.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid SPLUNK_PORT '{}'", val),
            }
        }
        if let Some(val) = lookup("SPLUNK_VERIFY_SSL") {
            match val.parse() {
                Ok(verify) => self.verify_ssl = verify,
                Err(_) => warn!("Ignoring invalid SPLUNK_VERIFY_SSL '{}', expected true or false", val),
            }
        }
    }

    fn merge_args(&mut self, args: &ConnectionArgs) {
        if let Some(v) = &args.username {
            self.username = v.clone();
        }
        if let Some(v) = &args.password {
            self.password = v.clone();
        }
        if let Some(v) = &args.host {
            self.host = v.clone();
        }
        if let Some(v) = args.port {
            self.port = v;
        }
        if args.verify_ssl {
            self.verify_ssl = true;
        }
    }

    pub fn validate(&self, job: Option<&str>) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(Error::Configuration("Missing required option: -h/--host".into()));
        }
        if self.username.is_empty() {
            return Err(Error::Configuration("Missing required option: -u/--username".into()));
        }
        if self.password.is_empty() {
            return Err(Error::Configuration("Missing required option: -p/--password".into()));
        }
        if job.map_or(true, str::is_empty) {
            return Err(Error::Configuration("Missing required option: -j/--job".into()));
        }
        Ok(())
    }

    pub fn into_request(self, job: Option<String>, timeout_seconds: u64) -> crate::Result<SearchRequest> {
        self.validate(job.as_deref())?;
        let request = SearchRequest {
            host: self.host,
            port: self.port,
            credentials: Credentials {
                username: self.username,
                password: self.password,
            },
            job_name: job.unwrap_or_default(),
            timeout_seconds,
            verify_ssl: self.verify_ssl,
        };
        request.base_url()?;
        Ok(request)
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    info!("Loading config from: {:?}", path);
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read config file at {:?}", path))?;
    toml::from_str(&content).context(format!("Failed to parse config file at {:?}", path))
}
