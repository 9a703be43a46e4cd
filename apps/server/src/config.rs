use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use pledgeboard_core::ledger::RetryPolicy;
use pledgeboard_core::settings::IntakeSettings;
use pledgeboard_vision::{VisionConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub upload_dir: PathBuf,
    pub report_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub intake: IntakeSettings,
    pub vision: VisionConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("PB_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid PB_LISTEN_ADDR")?;
        let db_path = env_or("PB_DB_PATH", "./db/app.db");
        let cors_allow = env_or("PB_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_env("PB_REQUEST_TIMEOUT_MS", 30_000)?;
        let upload_dir = PathBuf::from(env_or("PB_UPLOAD_DIR", "./data/uploads"));
        let report_dir = PathBuf::from(env_or("PB_REPORT_DIR", "./data/reports"));
        let max_upload_bytes: usize = parse_env("PB_MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;

        let defaults = IntakeSettings::default();
        let extraction_timeout = Duration::from_millis(parse_env(
            "PB_EXTRACTION_TIMEOUT_MS",
            defaults.extraction_timeout.as_millis() as u64,
        )?);
        let intake = IntakeSettings {
            confidence_threshold: parse_env(
                "PB_CONFIDENCE_THRESHOLD",
                defaults.confidence_threshold,
            )?,
            extraction_timeout,
            ledger_retry: RetryPolicy::new(
                parse_env(
                    "PB_LEDGER_RETRY_ATTEMPTS",
                    defaults.ledger_retry.max_attempts,
                )?,
                Duration::from_millis(parse_env(
                    "PB_LEDGER_RETRY_BASE_MS",
                    defaults.ledger_retry.base_delay.as_millis() as u64,
                )?),
            ),
            subscriber_queue_capacity: parse_env(
                "PB_SUBSCRIBER_QUEUE_CAPACITY",
                defaults.subscriber_queue_capacity,
            )?,
        };
        intake.validate().map_err(|e| anyhow!(e))?;

        let mut vision = VisionConfig::new(&upload_dir);
        vision.api_key = std::env::var("PB_VISION_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        vision.model = env_or("PB_VISION_MODEL", DEFAULT_MODEL);
        vision.base_url = env_or("PB_VISION_BASE_URL", DEFAULT_BASE_URL);
        vision.request_timeout = extraction_timeout;

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            upload_dir,
            report_dir,
            max_upload_bytes,
            intake,
            vision,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {}: {} ({})", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u64 = parse_env("PB_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("PB_TEST_GARBAGE_MS", "soon");
        let result: anyhow::Result<u64> = parse_env("PB_TEST_GARBAGE_MS", 1);
        assert!(result.is_err());
        std::env::remove_var("PB_TEST_GARBAGE_MS");
    }
}
