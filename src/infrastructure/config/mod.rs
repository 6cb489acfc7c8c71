use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub local_store_path: PathBuf,
    pub request_timeout_secs: u64,
    pub login_path: String,
    pub environment: Environment,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "API_BASE_URL must be an http(s) URL, got {}",
                api_base_url
            )));
        }

        let config = Config {
            api_base_url,
            local_store_path: env::var("LOCAL_STORE_PATH")
                .unwrap_or_else(|_| ".runbox/local_store.json".to_string())
                .into(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("REQUEST_TIMEOUT_SECS: {}", e)))?,
            login_path: env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".to_string()),
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
