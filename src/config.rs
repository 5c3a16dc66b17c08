use anyhow::{Context, Result};
use std::env;

use crate::services::predictor::DEFAULT_PREDICT_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub predict_url: String,
}

impl Config {
    /// Read configuration from the environment (and `.env`, loaded by main).
    pub fn from_env() -> Result<Self> {
        let predict_url = env::var("PREDICT_URL").unwrap_or_else(|_| {
            log::debug!("PREDICT_URL not set, using default: {}", DEFAULT_PREDICT_URL);
            DEFAULT_PREDICT_URL.to_string()
        });
        Self::new(predict_url)
    }

    pub fn new(predict_url: String) -> Result<Self> {
        let url = reqwest::Url::parse(&predict_url)
            .with_context(|| format!("PREDICT_URL is not a valid URL: {}", predict_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("PREDICT_URL must be an http(s) URL, got {}", predict_url);
        }

        Ok(Self { predict_url })
    }
}
