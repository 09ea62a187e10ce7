use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use switchyard_core::estimate::{ModelPrice, PricingTable};
use switchyard_core::{CapabilityRouter, InvocationParams, ProviderId, ProviderKey, Summarizer};
use switchyard_guardrails::Classifier;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, expansion or parsing
    /// fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        tracing::debug!(path = %path.display(), "loading config");

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion or parsing fails, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).context("config variable expansion failed")?;

        let config: Self = toml::from_str(&expanded).context("failed to parse config")?;

        config.validate()?;

        tracing::debug!(
            providers = config.providers.len(),
            prices = config.pricing.len(),
            moderation_rules = config.moderation.rules.len(),
            context_tokens = config.summary.context_tokens,
            "config loaded"
        );

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid provider key, price or
    /// moderation rule
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_providers()?;
        self.validate_pricing()?;
        self.validate_summary()?;
        self.validate_moderation()?;
        Ok(())
    }

    /// Per-provider default parameters, keyed by resolved provider id
    ///
    /// # Errors
    ///
    /// Returns an error if a provider key is not a known provider id
    pub fn provider_defaults(&self) -> anyhow::Result<Vec<(ProviderId, InvocationParams)>> {
        self.providers
            .iter()
            .map(|(name, params)| Ok((parse_provider(name)?, params.clone())))
            .collect()
    }

    /// Pricing entries as a lookup table
    ///
    /// # Errors
    ///
    /// Returns an error if an entry names an unknown provider
    pub fn pricing_table(&self) -> anyhow::Result<PricingTable> {
        self.pricing
            .iter()
            .map(|entry| {
                Ok((
                    parse_provider(&entry.provider)?,
                    entry.model.clone(),
                    ModelPrice {
                        input_per_mtok: entry.input_per_mtok,
                        output_per_mtok: entry.output_per_mtok,
                    },
                ))
            })
            .collect()
    }

    /// Summarizer over `router`'s chat route for `provider`, sized to the
    /// configured context window
    pub fn summarizer(&self, router: Arc<CapabilityRouter>, provider: impl Into<ProviderKey>) -> Summarizer {
        Summarizer::new(router, provider).with_context_tokens(self.summary.context_tokens)
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        for name in self.providers.keys() {
            parse_provider(name)?;
        }
        Ok(())
    }

    fn validate_pricing(&self) -> anyhow::Result<()> {
        for entry in &self.pricing {
            parse_provider(&entry.provider)?;

            if entry.model.trim().is_empty() {
                anyhow::bail!("pricing entry for provider '{}' has an empty model", entry.provider);
            }

            for (field, value) in [
                ("input_per_mtok", entry.input_per_mtok),
                ("output_per_mtok", entry.output_per_mtok),
            ] {
                if !value.is_finite() || value < 0.0 {
                    anyhow::bail!(
                        "pricing for '{}/{}' has invalid {field}: {value}",
                        entry.provider,
                        entry.model
                    );
                }
            }
        }
        Ok(())
    }

    fn validate_summary(&self) -> anyhow::Result<()> {
        if self.summary.context_tokens == 0 {
            anyhow::bail!("summary.context_tokens must be greater than 0");
        }
        Ok(())
    }

    fn validate_moderation(&self) -> anyhow::Result<()> {
        Classifier::new(&self.moderation.rules).context("invalid moderation rule")?;
        Ok(())
    }
}

fn parse_provider(name: &str) -> anyhow::Result<ProviderId> {
    ProviderId::from_str(name).map_err(|_| anyhow::anyhow!("unknown provider '{name}'"))
}
