//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IMAGES_DIR: &str = "./images";

/// Bot configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token. The Telegram channel is enabled when set.
    pub telegram_token: Option<SecretString>,
    /// Usernames or numeric ids allowed to talk to the bot. `*` = everyone.
    pub allowed_users: Vec<String>,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
    /// Directory holding `<key>.jpg` illustrations.
    pub images_dir: PathBuf,
    /// Whether to run the stdin/stdout channel.
    pub cli_enabled: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            allowed_users: vec!["*".to_string()],
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            cli_enabled: false,
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram_token = get("TELEGRAM_TOKEN").map(SecretString::from);

        let allowed_users: Vec<String> = get("TELEGRAM_ALLOWED_USERS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let poll_timeout_secs = match get("TELEGRAM_POLL_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "TELEGRAM_POLL_TIMEOUT_SECS".into(),
                message: format!("expected a whole number of seconds, got {raw:?}"),
            })?,
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        let images_dir = get("CALORIE_BOT_IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR));

        let cli_enabled = match get("CALORIE_BOT_CLI") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "CALORIE_BOT_CLI".into(),
                message: format!("expected true/false, got {raw:?}"),
            })?,
            None => false,
        };

        let config = Self {
            telegram_token,
            allowed_users,
            poll_timeout_secs,
            images_dir,
            cli_enabled,
        };
        config.validate()?;
        Ok(config)
    }

    /// At least one channel must be enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token.is_none() && !self.cli_enabled {
            return Err(ConfigError::MissingRequired {
                key: "TELEGRAM_TOKEN".into(),
                hint: "Create a .env file with TELEGRAM_TOKEN=<your token>, or set CALORIE_BOT_CLI=1 to run locally.".into(),
            });
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn token_only_uses_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("TELEGRAM_TOKEN", "123:ABC")])).unwrap();
        assert_eq!(
            config.telegram_token.as_ref().unwrap().expose_secret(),
            "123:ABC"
        );
        assert_eq!(config.allowed_users, vec!["*"]);
        assert_eq!(config.poll_timeout_secs, 30);
        assert_eq!(config.images_dir, PathBuf::from("./images"));
        assert!(!config.cli_enabled);
    }

    #[test]
    fn no_channel_is_an_error() {
        let err = BotConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_TOKEN"));

        let err = BotConfig::from_lookup(lookup(&[("TELEGRAM_TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn cli_only_is_valid() {
        let config = BotConfig::from_lookup(lookup(&[("CALORIE_BOT_CLI", "true")])).unwrap();
        assert!(config.cli_enabled);
        assert!(config.telegram_token.is_none());
    }

    #[test]
    fn allowed_users_are_split_and_trimmed() {
        let config = BotConfig::from_lookup(lookup(&[
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_ALLOWED_USERS", "alice, 12345 ,,bob"),
        ]))
        .unwrap();
        assert_eq!(config.allowed_users, vec!["alice", "12345", "bob"]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = BotConfig::from_lookup(lookup(&[
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_POLL_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "TELEGRAM_POLL_TIMEOUT_SECS"
        ));

        let err = BotConfig::from_lookup(lookup(&[("CALORIE_BOT_CLI", "maybe")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "CALORIE_BOT_CLI"
        ));
    }

    #[test]
    fn default_config_needs_a_channel() {
        assert!(BotConfig::default().validate().is_err());
    }
}
