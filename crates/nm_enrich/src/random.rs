use nm_core::{Enricher, Enrichment, Importance, Location, RawArticle, Result};
use rand::Rng;

/// Placeholder strategy that scatters articles uniformly across the globe
/// with a random importance. Stands in for a real geocoder.
#[derive(Debug, Default)]
pub struct RandomEnricher;

impl RandomEnricher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Enricher for RandomEnricher {
    fn name(&self) -> &str {
        "random"
    }

    async fn enrich(&self, _article: &RawArticle) -> Result<Enrichment> {
        let mut rng = rand::thread_rng();
        let lat = rng.gen_range(-90.0..=90.0);
        let lng = rng.gen_range(-180.0..=180.0);
        let importance = Importance::new(rng.gen_range(1..=100));
        let min_zoom: u8 = rng.gen_range(1..=5);
        let max_zoom: u8 = rng.gen_range(min_zoom..=20);

        Ok(Enrichment {
            location: Location::Point { lat, lng },
            importance,
            min_zoom: Some(min_zoom),
            max_zoom: Some(max_zoom),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate() -> RawArticle {
        RawArticle {
            title: "Test Article".to_string(),
            description: None,
            content: None,
            url: "https://example.com/test".to_string(),
            image_url: None,
            published_at: Utc::now(),
            source: "test".to_string(),
            author: None,
        }
    }

    #[tokio::test]
    async fn test_values_stay_within_declared_bounds() {
        let enricher = RandomEnricher::new();
        let article = candidate();

        for _ in 0..200 {
            let enrichment = enricher.enrich(&article).await.unwrap();
            assert!(enrichment.location.is_valid());
            let importance = enrichment.importance.get();
            assert!((1..=100).contains(&importance));

            let min_zoom = enrichment.min_zoom.unwrap();
            let max_zoom = enrichment.max_zoom.unwrap();
            assert!((1..=5).contains(&min_zoom));
            assert!((min_zoom..=20).contains(&max_zoom));
        }
    }
}
