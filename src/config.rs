//! Configuration loading and validation.
//!
//! All sections use `#[serde(default)]`, so a missing or empty `config.toml`
//! yields the stock Beshariq/Fargʻona setup. The bot token never lives in the
//! file: it is read from the environment variable named in `[telegram]`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::flow::is_start_command;
use crate::flow::validate::PhonePolicy;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Notification group chats, one per role.
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Conversation labels and validation rules.
    #[serde(default)]
    pub flow: FlowConfig,

    /// Delivery retry policy.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram-specific configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Environment variable name holding the bot token.
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: default_bot_token_env(),
        }
    }
}

/// Target group chats for finished submissions.
///
/// Either id may be omitted; when only one is present it receives both
/// passenger and driver submissions.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// Chat id receiving passenger submissions.
    #[serde(default)]
    pub passenger: Option<i64>,

    /// Chat id receiving driver submissions.
    #[serde(default)]
    pub driver: Option<i64>,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            passenger: Some(DEFAULT_PASSENGER_CHAT),
            driver: Some(DEFAULT_DRIVER_CHAT),
        }
    }
}

/// Labels, answer tokens and validation policy for the question flow.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    /// The two accepted directional routes.
    #[serde(default = "default_routes")]
    pub routes: [String; 2],

    /// Menu label selecting the passenger flow.
    #[serde(default = "default_passenger_label")]
    pub passenger_label: String,

    /// Menu label selecting the driver flow.
    #[serde(default = "default_driver_label")]
    pub driver_label: String,

    /// Affirmative answer token.
    #[serde(default = "default_yes")]
    pub yes: String,

    /// Negative answer token.
    #[serde(default = "default_no")]
    pub no: String,

    /// Which phone number shapes are accepted.
    #[serde(default)]
    pub phone_policy: PhonePolicy,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            routes: default_routes(),
            passenger_label: default_passenger_label(),
            driver_label: default_driver_label(),
            yes: default_yes(),
            no: default_no(),
            phone_policy: PhonePolicy::default(),
        }
    }
}

/// Retry behaviour of the reliable dispatcher.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Seconds added on top of the rate-limit hint before retrying.
    #[serde(default = "default_retry_padding_secs")]
    pub retry_padding_secs: u64,

    /// Maximum delivery attempts per message. `0` retries without limit.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            retry_padding_secs: default_retry_padding_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rotated JSON log files. Console-only when absent.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

const DEFAULT_PASSENGER_CHAT: i64 = -1_002_083_291_047;
const DEFAULT_DRIVER_CHAT: i64 = -1_002_574_496_144;

// Default value functions for serde

fn default_bot_token_env() -> String {
    "BOT_TOKEN".to_owned()
}
fn default_routes() -> [String; 2] {
    [
        "Beshariq \u{27a1}\u{fe0f} Farg\u{02bb}ona".to_owned(),
        "Farg\u{02bb}ona \u{27a1}\u{fe0f} Beshariq".to_owned(),
    ]
}
fn default_passenger_label() -> String {
    "Yo'lovchi".to_owned()
}
fn default_driver_label() -> String {
    "Taxi Haydovchi".to_owned()
}
fn default_yes() -> String {
    "Ha".to_owned()
}
fn default_no() -> String {
    "Yo\u{2018}q".to_owned()
}
fn default_retry_padding_secs() -> u64 {
    1
}
fn default_max_attempts() -> u32 {
    5
}

impl Config {
    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error if no channel is configured, the two routes are
    /// identical, or any label, route or answer token would be read as a
    /// different input.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.channels.passenger.is_none() && self.channels.driver.is_none() {
            anyhow::bail!("at least one of channels.passenger / channels.driver must be set");
        }
        let [first, second] = &self.flow.routes;
        if first.trim().is_empty() || second.trim().is_empty() {
            anyhow::bail!("flow.routes must not contain empty entries");
        }
        if first == second {
            anyhow::bail!("flow.routes must contain two distinct routes");
        }
        if self.flow.passenger_label == self.flow.driver_label {
            anyhow::bail!("flow.passenger_label and flow.driver_label must differ");
        }
        if self.flow.yes == self.flow.no {
            anyhow::bail!("flow.yes and flow.no must differ");
        }
        self.flow.validate_inputs()
    }
}

impl FlowConfig {
    /// Every configured value must reach the input kind it is meant for:
    /// routes and answer tokens must not be role labels, and nothing may be
    /// taken for `/start`.
    fn validate_inputs(&self) -> anyhow::Result<()> {
        let labels = [
            ("flow.passenger_label", self.passenger_label.as_str()),
            ("flow.driver_label", self.driver_label.as_str()),
        ];
        let answers = [
            ("flow.routes[0]", self.routes[0].as_str()),
            ("flow.routes[1]", self.routes[1].as_str()),
            ("flow.yes", self.yes.as_str()),
            ("flow.no", self.no.as_str()),
        ];

        for (key, value) in labels.iter().chain(answers.iter()) {
            if is_start_command(value.trim()) {
                anyhow::bail!("{key} must not be a /start command");
            }
        }
        for (key, value) in answers {
            for (label_key, label) in labels {
                if value.trim() == label.trim() {
                    anyhow::bail!("{key} collides with {label_key}");
                }
            }
        }
        Ok(())
    }
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `path` if it exists, falling back to defaults.
///
/// # Errors
///
/// Returns an error if an existing file is unreadable or invalid.
pub fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

/// Load variables from a `.env` file into the process environment.
///
/// A missing file is not an error. Variables already set in the environment
/// win over the file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_dotenv(path: &Path) -> anyhow::Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to parse {}", path.display())),
    }
}

/// Resolve the bot token from the environment variable named in config.
///
/// A `.env` file in the working directory is loaded first, if present.
///
/// # Errors
///
/// Returns an error when `.env` is malformed or the variable is missing or
/// blank.
pub fn resolve_bot_token(telegram: &TelegramConfig) -> anyhow::Result<String> {
    load_dotenv(Path::new(".env"))?;
    let token = std::env::var(&telegram.bot_token_env).with_context(|| {
        format!(
            "{} environment variable is required",
            telegram.bot_token_env
        )
    })?;
    if token.trim().is_empty() {
        anyhow::bail!("{} environment variable is empty", telegram.bot_token_env);
    }
    Ok(token)
}
