use clausemind_common::error::{ClauseError, ClauseResult};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub fallback_policies_dir: PathBuf,
    pub request_timeout_ms: u64,
    pub max_upload_bytes: usize,
    pub relevance_threshold: f64,
    pub max_clauses: usize,
    pub segment_cache_capacity: usize,
    /// `None` when `TRANSCRIPTION_BASE_URL` is unset; `/api/whisper` then
    /// reports transcription as unavailable.
    pub transcription: Option<TranscriptionSettings>,
    /// `None` when `CHAT_BASE_URL` is unset; `/api/chat` then answers 503.
    pub chat: Option<ChatSettings>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present; every variable has a default.
    pub fn from_env() -> ClauseResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        let relevance_threshold: f64 = parse_var("RELEVANCE_THRESHOLD", "35.0")?;
        if !(0.0..=100.0).contains(&relevance_threshold) {
            return Err(ClauseError::Config(format!(
                "RELEVANCE_THRESHOLD must be between 0 and 100, got {relevance_threshold}"
            )));
        }

        let transcription = env::var("TRANSCRIPTION_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|base_url| TranscriptionSettings {
                base_url: base_url.trim_end_matches('/').to_owned(),
                api_key: get_var_or("TRANSCRIPTION_API_KEY", ""),
                model: get_var_or("TRANSCRIPTION_MODEL", "whisper-1"),
            });

        let chat = env::var("CHAT_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|base_url| ChatSettings {
                base_url: base_url.trim_end_matches('/').to_owned(),
                api_key: get_var_or("CHAT_API_KEY", ""),
                model: get_var_or("CHAT_MODEL", "gpt-4"),
            });

        Ok(Self {
            host: get_var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", "8000")?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            cors_origins: split_list(&get_var_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
            fallback_policies_dir: PathBuf::from(get_var_or(
                "FALLBACK_POLICIES_DIR",
                "fallback_policies",
            )),
            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", "10000")?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", "20971520")?,
            relevance_threshold,
            max_clauses: parse_var("MAX_CLAUSES", "10")?,
            segment_cache_capacity: parse_var("SEGMENT_CACHE_CAPACITY", "64")?,
            transcription,
            chat,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_var<T>(key: &str, default: &str) -> ClauseResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_var_or(key, default)
        .trim()
        .parse()
        .map_err(|e| ClauseError::Config(format!("invalid {key}: {e}")))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PORT",
        "RELEVANCE_THRESHOLD",
        "CORS_ORIGINS",
        "TRANSCRIPTION_BASE_URL",
        "TRANSCRIPTION_MODEL",
        "CHAT_BASE_URL",
        "CHAT_API_KEY",
        "CHAT_MODEL",
    ];

    fn clear_vars() {
        for key in VARS {
            env::remove_var(key);
        }
    }

    #[test]
    fn config_from_env_uses_defaults() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.max_clauses, 10);
        assert!((cfg.relevance_threshold - 35.0).abs() < f64::EPSILON);
        assert_eq!(cfg.cors_origins.len(), 2);
        assert!(cfg.transcription.is_none());
        assert!(cfg.chat.is_none());
    }

    #[test]
    fn config_from_env_rejects_bad_port() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        env::set_var("PORT", "not-a-port");
        let result = AppConfig::from_env();
        env::remove_var("PORT");

        match result {
            Err(ClauseError::Config(msg)) => assert!(msg.contains("PORT"), "msg={msg}"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn config_from_env_rejects_out_of_range_threshold() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        env::set_var("RELEVANCE_THRESHOLD", "140");
        let result = AppConfig::from_env();
        env::remove_var("RELEVANCE_THRESHOLD");

        assert!(result.is_err());
    }

    #[test]
    fn transcription_enabled_by_base_url() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        env::set_var("TRANSCRIPTION_BASE_URL", "https://api.example.com/");
        env::set_var("CORS_ORIGINS", "https://app.example.com, ,https://admin.example.com");
        let cfg = AppConfig::from_env().expect("should parse config");
        clear_vars();

        let t = cfg.transcription.expect("transcription configured");
        assert_eq!(t.base_url, "https://api.example.com");
        assert_eq!(t.model, "whisper-1");
        assert_eq!(
            cfg.cors_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
    }

    #[test]
    fn chat_enabled_by_base_url() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        env::set_var("CHAT_BASE_URL", "https://llm.example.com//");
        env::set_var("CHAT_API_KEY", "secret");
        let cfg = AppConfig::from_env().expect("should parse config");
        clear_vars();

        let chat = cfg.chat.expect("chat configured");
        assert_eq!(chat.base_url, "https://llm.example.com");
        assert_eq!(chat.api_key, "secret");
        assert_eq!(chat.model, "gpt-4");
        assert!(cfg.transcription.is_none());
    }

    #[test]
    fn blank_chat_base_url_disables_chat() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        env::set_var("CHAT_BASE_URL", "  ");
        let cfg = AppConfig::from_env().expect("should parse config");
        clear_vars();

        assert!(cfg.chat.is_none());
    }

    #[test]
    fn bind_addr_formats_correctly() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        let mut cfg = AppConfig::from_env().expect("should parse config");
        cfg.host = "127.0.0.1".to_owned();
        cfg.port = 3000;
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }
}
