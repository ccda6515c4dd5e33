use adapter::{ErrorVisibility, RedditConfig};
use config::ConfigError;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::time::Duration;

const ENV_PREFIX: &str = "MOONTIMER_";

// 旧版部署直接使用这些变量名
const LEGACY_ENV_KEYS: [(&str, &str); 3] = [
    ("CLIENT_ID", "reddit.client_id"),
    ("CLIENT_SECRET", "reddit.client_secret"),
    ("REFRESH_TOKEN", "reddit.refresh_token"),
];

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub reddit: RedditSettings,
    pub listener: ListenerSettings,
    pub validation: ValidationSettings,
    pub submission: SubmissionSettings,
    pub logging: LogSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RedditSettings {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub auth_base: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ListenerSettings {
    #[serde(deserialize_with = "string_or_list")]
    pub channels: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub triggers: Vec<String>,
    pub poll_interval_ms: u64,
    pub batch_size: u32,
    pub error_visibility: ErrorVisibility,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ValidationSettings {
    pub required_marker: String,
    pub min_score: i64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SubmissionSettings {
    pub endpoint: String,
    pub site_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LogSettings {
    pub dir: String,
    pub console: bool,
    pub level: String,
}

impl RedditSettings {
    pub fn to_client_config(&self) -> RedditConfig {
        RedditConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: self.refresh_token.clone(),
            user_agent: self.user_agent.clone(),
            auth_base: self.auth_base.clone(),
            api_base: self.api_base.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::from_sources(&run_mode, collect_env_vars(std::env::vars()))
    }

    fn from_sources(run_mode: &str, env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env_json = serde_json::to_string(&env_map)
            .map_err(|e| ConfigError::Message(format!("Environment variables should serialize to JSON: {}", e)))?;

        let s = config::Config::builder()
            .set_default("reddit.user_agent", adapter::DEFAULT_USER_AGENT)?
            .set_default("reddit.auth_base", adapter::DEFAULT_AUTH_BASE)?
            .set_default("reddit.api_base", adapter::DEFAULT_API_BASE)?
            .set_default("reddit.request_timeout_secs", 30)?
            .set_default("listener.channels", vec!["Superstonk", "GME", "GMEJungle"])?
            .set_default("listener.triggers", domain::DEFAULT_TRIGGERS.to_vec())?
            .set_default(
                "listener.poll_interval_ms",
                adapter::DEFAULT_POLL_INTERVAL.as_millis() as i64,
            )?
            .set_default("listener.batch_size", adapter::DEFAULT_BATCH_SIZE as i64)?
            .set_default("listener.error_visibility", "log")?
            .set_default("validation.required_marker", domain::DEFAULT_REQUIRED_MARKER)?
            .set_default("validation.min_score", domain::DEFAULT_MIN_SCORE)?
            .set_default("submission.endpoint", adapter::DEFAULT_SUBMISSION_ENDPOINT)?
            .set_default("submission.site_url", domain::DEFAULT_SITE_URL)?
            .set_default("submission.timeout_secs", 30)?
            .set_default("logging.dir", "./logs")?
            .set_default("logging.console", run_mode != "production")?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        s.try_deserialize()
    }
}

fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    let mut legacy = HashMap::new();
    let mut prefixed = HashMap::new();

    for (k, v) in vars {
        if let Some(rest) = k.strip_prefix(ENV_PREFIX) {
            prefixed.insert(rest.replace("__", ".").to_lowercase(), v);
        } else if let Some((_, key)) = LEGACY_ENV_KEYS.iter().find(|(name, _)| *name == k) {
            legacy.insert(key.to_string(), v);
        }
    }

    legacy.extend(prefixed);
    legacy
}

/// Lists come from TOML arrays or from comma-separated env values.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    let items = match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s.split(',').map(str::to_string).collect(),
        StringOrList::Many(v) => v,
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        collect_env_vars(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![
            ("MOONTIMER_REDDIT__CLIENT_ID", "id"),
            ("MOONTIMER_REDDIT__CLIENT_SECRET", "secret"),
            ("MOONTIMER_REDDIT__REFRESH_TOKEN", "refresh"),
        ]
    }

    #[test]
    fn env_keys_are_mapped_to_sections() {
        let map = env(&[
            ("MOONTIMER_LISTENER__BATCH_SIZE", "25"),
            ("CLIENT_ID", "legacy-id"),
            ("PATH", "/usr/bin"),
        ]);
        assert_eq!(map.get("listener.batch_size").map(String::as_str), Some("25"));
        assert_eq!(map.get("reddit.client_id").map(String::as_str), Some("legacy-id"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn prefixed_env_wins_over_legacy() {
        let map = env(&[
            ("MOONTIMER_REDDIT__CLIENT_ID", "new-id"),
            ("CLIENT_ID", "legacy-id"),
        ]);
        assert_eq!(map.get("reddit.client_id").map(String::as_str), Some("new-id"));
    }

    #[test]
    fn defaults_fill_everything_but_credentials() {
        let s = Settings::from_sources("test", env(&credentials())).unwrap();
        assert_eq!(s.listener.channels, vec!["Superstonk", "GME", "GMEJungle"]);
        assert_eq!(s.listener.triggers, vec!["!moontimer", "!moontimers"]);
        assert_eq!(s.listener.poll_interval_ms, 3000);
        assert_eq!(s.listener.batch_size, 10);
        assert_eq!(s.listener.error_visibility, ErrorVisibility::Log);
        assert_eq!(s.validation.required_marker, "DD");
        assert_eq!(s.validation.min_score, 10);
        assert_eq!(s.submission.endpoint, "https://api.moontimers.com/api/mt_submit");
        assert!(s.logging.console);
        assert_eq!(s.reddit.to_client_config().request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn production_mode_disables_console() {
        let s = Settings::from_sources("production", env(&credentials())).unwrap();
        assert!(!s.logging.console);
    }

    #[test]
    fn comma_separated_lists_and_policy_from_env() {
        let mut pairs = credentials();
        pairs.push(("MOONTIMER_LISTENER__CHANNELS", "GME, wallstreetbets ,"));
        pairs.push(("MOONTIMER_LISTENER__ERROR_VISIBILITY", "silent"));
        pairs.push(("MOONTIMER_VALIDATION__MIN_SCORE", "25"));
        let s = Settings::from_sources("test", env(&pairs)).unwrap();
        assert_eq!(s.listener.channels, vec!["GME", "wallstreetbets"]);
        assert_eq!(s.listener.error_visibility, ErrorVisibility::Silent);
        assert_eq!(s.validation.min_score, 25);
    }

    #[test]
    fn missing_credentials_fail() {
        assert!(Settings::from_sources("test", HashMap::new()).is_err());
    }
}
