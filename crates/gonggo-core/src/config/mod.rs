mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use gonggo_client::ClientConfig;
use gonggo_memory::ChunkerConfig;

use crate::faq::ContextLimits;

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("client.kintel_url", &self.client.kintel_url),
            ("client.models_url", &self.client.models_url),
            ("gateway.kintel_upstream", &self.gateway.kintel_upstream),
            ("gateway.models_upstream", &self.gateway.models_upstream),
            ("gateway.faq_upstream", &self.gateway.faq_upstream),
        ] {
            url::Url::parse(value).with_context(|| format!("{name} is not a valid URL: {value}"))?;
        }
        if self.chunking.chunk_size == 0 {
            anyhow::bail!("chunking.chunk_size must be greater than 0");
        }
        if !(0.0..1.0).contains(&self.chunking.window_ratio) {
            anyhow::bail!(
                "chunking.window_ratio must be in [0, 1), got {}",
                self.chunking.window_ratio
            );
        }
        if self.timeouts.parse_seconds == 0 || self.timeouts.summary_seconds == 0 {
            anyhow::bail!("timeouts must be greater than 0 seconds");
        }
        if self.limits.max_file_size == 0 {
            anyhow::bail!("limits.max_file_size must be greater than 0");
        }
        if self.faq.retry_cap == 0 {
            anyhow::bail!("faq.retry_cap must be greater than 0");
        }
        Ok(())
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            kintel_base_url: self.client.kintel_url.clone(),
            models_base_url: self.client.models_url.clone(),
            parse_timeout: Duration::from_secs(self.timeouts.parse_seconds),
            summary_timeout: Duration::from_secs(self.timeouts.summary_seconds),
            request_timeout: Duration::from_secs(self.timeouts.request_seconds),
        }
    }

    #[must_use]
    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig {
            chunk_size: self.chunking.chunk_size,
            window_ratio: self.chunking.window_ratio,
        }
    }

    #[must_use]
    pub fn context_limits(&self) -> ContextLimits {
        ContextLimits {
            summary_cap: self.faq.summary_cap,
            chunk_cap: self.faq.chunk_cap,
            chunk_min: self.faq.chunk_min,
            retry_cap: self.faq.retry_cap,
            retry_delay: Duration::from_secs(self.faq.retry_delay_seconds),
        }
    }
}
