use nm_core::{Enricher, Enrichment, Error, Importance, Location, RawArticle, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::AiConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// The object the model is asked to produce. Both fields are required;
/// anything else in the response is rejected at the parse boundary.
#[derive(Debug, Deserialize)]
struct AiExtraction {
    location: String,
    importance: i64,
}

/// Extracts a location and an importance rating from article text by
/// asking a chat-completion model for a strict JSON answer.
pub struct AiEnricher {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for AiEnricher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiEnricher")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl AiEnricher {
    pub fn new(config: AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::MisconfiguredCredentials("AI API key is not set".to_string()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        })
    }

    fn build_prompt(article: &RawArticle) -> String {
        let body = article
            .content
            .as_deref()
            .or(article.description.as_deref())
            .unwrap_or_default();

        format!(
            "You are a news analyst. Read the article below and extract two things:\n\
             1. \"location\": the place where the main event happened, as a name a geocoding \
             service can resolve directly (for example \"Seoul City Hall\"). If no specific \
             place can be identified, answer \"nationwide\" or \"online\".\n\
             2. \"importance\": an integer from 1 to 10 rating how important the story is \
             (10 is most important).\n\n\
             Respond with strictly this JSON object and nothing else:\n\
             {{\n  \"location\": \"extracted place\",\n  \"importance\": score\n}}\n\n\
             --- Article ---\n\
             Title: {}\n\
             Body: {}\n\
             ---------------",
            article.title, body
        )
    }
}

/// Pulls the first `{` through last `}` region out of a response that may be
/// wrapped in markdown fences or prose, and decodes it.
fn extract_json_object(text: &str) -> Result<AiExtraction> {
    let start = text
        .find('{')
        .ok_or_else(|| Error::ExtractionFailed("response contained no JSON object".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| Error::ExtractionFailed("response contained no JSON object".to_string()))?;

    let extraction: AiExtraction = serde_json::from_str(&text[start..=end]).map_err(|e| {
        Error::ExtractionFailed(format!("response JSON did not match the expected shape: {}", e))
    })?;

    if extraction.location.trim().is_empty() {
        return Err(Error::ExtractionFailed("extracted location was empty".to_string()));
    }

    Ok(extraction)
}

#[async_trait::async_trait]
impl Enricher for AiEnricher {
    fn name(&self) -> &str {
        "ai"
    }

    async fn enrich(&self, article: &RawArticle) -> Result<Enrichment> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::build_prompt(article),
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| Error::ExtractionFailed("model returned no choices".to_string()))?;

        let extraction = extract_json_object(content)?;
        debug!(
            url = %article.url,
            location = %extraction.location,
            importance = extraction.importance,
            "extracted article analysis"
        );

        Ok(Enrichment {
            location: Location::Place { name: extraction.location },
            importance: Importance::from_ai_scale(extraction.importance),
            min_zoom: None,
            max_zoom: None,
        })
    }
}
