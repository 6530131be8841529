use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candidate article as delivered by the upstream feed. Untrusted input,
/// consumed and discarded within a single ingest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub author: Option<String>,
}

/// Where an article happened. Coordinates come from the placeholder
/// enricher, place names from the AI enricher ("nationwide" and "online"
/// are valid when no specific place is identifiable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Point { lat: f64, lng: f64 },
    Place { name: String },
}

impl Location {
    pub fn is_valid(&self) -> bool {
        match self {
            Location::Point { lat, lng } => {
                (-90.0..=90.0).contains(lat) && (-180.0..=180.0).contains(lng)
            }
            Location::Place { name } => !name.trim().is_empty(),
        }
    }
}

/// Importance on the canonical 1-100 scale. All stored records use this
/// scale regardless of which enrichment strategy produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Importance(u8);

impl Importance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Maps the AI enricher's 1-10 rating onto the canonical scale.
    pub fn from_ai_scale(value: i64) -> Self {
        let rating = value.clamp(1, 10) as u8;
        Self(rating * 10)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Metadata an enrichment strategy attaches to a candidate article.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub location: Location,
    pub importance: Importance,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
}

/// Canonical persisted record. Created once by the pipeline and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedArticle {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub location: Location,
    pub importance: Importance,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_clamps_to_canonical_bound() {
        assert_eq!(Importance::new(0).get(), 1);
        assert_eq!(Importance::new(50).get(), 50);
        assert_eq!(Importance::new(200).get(), 100);
    }

    #[test]
    fn test_importance_from_ai_scale() {
        assert_eq!(Importance::from_ai_scale(8).get(), 80);
        assert_eq!(Importance::from_ai_scale(1).get(), 10);
        assert_eq!(Importance::from_ai_scale(10).get(), 100);
        // Out-of-range ratings are clamped before mapping
        assert_eq!(Importance::from_ai_scale(0).get(), 10);
        assert_eq!(Importance::from_ai_scale(42).get(), 100);
    }

    #[test]
    fn test_location_validity() {
        assert!(Location::Point { lat: -90.0, lng: 180.0 }.is_valid());
        assert!(!Location::Point { lat: 91.0, lng: 0.0 }.is_valid());
        assert!(!Location::Point { lat: 0.0, lng: -180.5 }.is_valid());
        assert!(Location::Place { name: "Seoul".to_string() }.is_valid());
        assert!(!Location::Place { name: "  ".to_string() }.is_valid());
    }
}
