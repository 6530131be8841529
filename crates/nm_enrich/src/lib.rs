use nm_core::{Enricher, Error, Result};
use std::str::FromStr;
use std::sync::Arc;

pub mod ai;
pub mod random;

pub use ai::AiEnricher;
pub use random::RandomEnricher;

const DEFAULT_AI_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_AI_MODEL: &str = "deepseek-chat";

/// Connection settings for the AI-assisted enricher.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("AI_API_KEY").ok(),
            base_url: std::env::var("AI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnricherKind {
    Random,
    Ai,
}

impl FromStr for EnricherKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(Self::Random),
            "ai" => Ok(Self::Ai),
            other => Err(Error::InvalidArgument(format!(
                "unknown enrichment strategy: {}",
                other
            ))),
        }
    }
}

/// Builds the configured enrichment strategy.
pub fn create_enricher(kind: EnricherKind, config: AiConfig) -> Result<Arc<dyn Enricher>> {
    match kind {
        EnricherKind::Random => Ok(Arc::new(RandomEnricher::new())),
        EnricherKind::Ai => Ok(Arc::new(AiEnricher::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enricher_kind_parsing() {
        assert_eq!(EnricherKind::from_str("random").unwrap(), EnricherKind::Random);
        assert_eq!(EnricherKind::from_str("ai").unwrap(), EnricherKind::Ai);
        assert!(EnricherKind::from_str("geocoder").is_err());
    }

    #[test]
    fn test_create_enricher_selects_by_kind() {
        let enricher = create_enricher(EnricherKind::Random, AiConfig::default()).unwrap();
        assert_eq!(enricher.name(), "random");

        let config = AiConfig {
            api_key: Some("test-key".to_string()),
            ..AiConfig::default()
        };
        let enricher = create_enricher(EnricherKind::Ai, config).unwrap();
        assert_eq!(enricher.name(), "ai");
    }

    #[test]
    fn test_ai_enricher_requires_api_key() {
        let err = create_enricher(EnricherKind::Ai, AiConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MisconfiguredCredentials(_)));
    }
}
