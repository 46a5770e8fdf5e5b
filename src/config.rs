#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Evaluator configuration sourced from the environment.
//!
//! Configuration is an explicit value handed to the orchestrator; nothing here
//! is stored in process-wide state.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::warn;

use crate::{
    constants::DEFAULT_ORACLE_TIMEOUT_SECS,
    oracle::{ElaborationCache, OpenAiOracle, OracleGate},
};

/// OpenAI credentials and optional tuning parameters sourced from the
/// environment.
#[derive(Clone)]
pub struct OpenAiEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:    String,
    /// API key used to authenticate OpenAI requests.
    api_key:     String,
    /// Default model identifier for chat completions.
    model:       String,
    /// Optional temperature override, if provided.
    temperature: Option<f32>,
}

impl std::fmt::Debug for OpenAiEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEnv")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl OpenAiEnv {
    /// Creates a credential bundle directly.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }

    /// Construct an `OpenAiEnv` from a variable lookup; returns `None` if
    /// any required field is missing or blank.
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_base = lookup("OPENAI_ENDPOINT")?.trim().to_owned();
        let api_key = lookup("OPENAI_API_KEY")?.trim().to_owned();
        let model = lookup("OPENAI_MODEL")?.trim().to_owned();

        if api_base.is_empty() || api_key.is_empty() || model.is_empty() {
            return None;
        }

        let temperature = lookup("OPENAI_TEMPERATURE").and_then(|s| s.trim().parse::<f32>().ok());

        Some(Self::new(api_base, api_key, model, temperature))
    }

    /// Returns the API base URL used for OpenAI requests.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key used for OpenAI requests.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the default model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the configured temperature, if any.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}

/// Everything the evaluator reads from the environment.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Whether the semantic oracle should be used at all.
    oracle_enabled:    bool,
    /// OpenAI credentials, if all required variables are present.
    openai:            Option<OpenAiEnv>,
    /// Per-attempt oracle timeout.
    oracle_timeout:    Duration,
    /// Whether repeated elaborations are served from memory.
    elaboration_cache: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            oracle_enabled:    false,
            openai:            None,
            oracle_timeout:    Duration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS),
            elaboration_cache: true,
        }
    }
}

impl EvaluatorConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// * `RUBRICATE_ORACLE_ENABLED`: `true` to consult the oracle (default
    ///   `false`)
    /// * `OPENAI_ENDPOINT`, `OPENAI_API_KEY`, `OPENAI_MODEL`: oracle
    ///   credentials
    /// * `OPENAI_TEMPERATURE`: optional sampling temperature
    /// * `RUBRICATE_ORACLE_TIMEOUT_SECS`: per-attempt timeout (default 30)
    /// * `RUBRICATE_ELABORATION_CACHE`: `false` to disable the elaboration
    ///   cache
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            oracle_enabled:    read_flag(&lookup, "RUBRICATE_ORACLE_ENABLED", false),
            openai:            OpenAiEnv::from_lookup(&lookup),
            oracle_timeout:    read_timeout_secs(
                &lookup,
                "RUBRICATE_ORACLE_TIMEOUT_SECS",
                DEFAULT_ORACLE_TIMEOUT_SECS,
            ),
            elaboration_cache: read_flag(&lookup, "RUBRICATE_ELABORATION_CACHE", true),
        }
    }

    /// Returns true if the oracle was requested.
    pub fn oracle_enabled(&self) -> bool {
        self.oracle_enabled
    }

    /// Returns the OpenAI configuration, if all required variables are set.
    pub fn openai(&self) -> Option<&OpenAiEnv> {
        self.openai.as_ref()
    }

    /// Returns the per-attempt oracle timeout.
    pub fn oracle_timeout(&self) -> Duration {
        self.oracle_timeout
    }

    /// Returns a copy with the oracle switched on or off.
    pub fn with_oracle_enabled(mut self, enabled: bool) -> Self {
        self.oracle_enabled = enabled;
        self
    }

    /// Builds the oracle gate described by this configuration.
    ///
    /// An enabled oracle without credentials is disabled with a warning
    /// rather than treated as an error.
    pub fn oracle_gate(&self) -> Result<OracleGate> {
        if !self.oracle_enabled {
            return Ok(OracleGate::disabled());
        }

        let Some(openai) = self.openai.as_ref() else {
            warn!(
                "RUBRICATE_ORACLE_ENABLED is true but OPENAI_ENDPOINT, OPENAI_API_KEY or \
                 OPENAI_MODEL is missing. Disabling the oracle."
            );
            return Ok(OracleGate::disabled());
        };

        let http_client = Client::builder()
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .build()
            .context("Failed to construct HTTP client for the oracle")?;
        let oracle = OpenAiOracle::new(openai, http_client);

        Ok(OracleGate::builder()
            .oracle(Arc::new(oracle))
            .timeout(self.oracle_timeout)
            .maybe_cache(self.elaboration_cache.then(ElaborationCache::default))
            .build())
    }
}

/// Parses a boolean environment flag, falling back to `default` when the
/// variable is missing or unrecognised.
fn read_flag(lookup: &impl Fn(&str) -> Option<String>, env: &str, default: bool) -> bool {
    match lookup(env).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1" | "yes" | "on") => true,
        Some("false" | "0" | "no" | "off") => false,
        _ => default,
    }
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    env: &str,
    default_secs: u64,
) -> Duration {
    lookup(env)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
