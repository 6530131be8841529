use nm_core::{Error, Result};
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// Metadata card for a single article page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCard {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub url: String,
    pub source: String,
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn title_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn favicon_href(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"link[rel="icon"]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|s| s.to_string())
}

/// Reads Open Graph tags from a fetched page, falling back to the title
/// element and the favicon link when they are absent.
pub fn extract_preview(page_url: &str, html: &str) -> Result<PreviewCard> {
    let parsed = Url::parse(page_url)
        .map_err(|e| Error::InvalidArgument(format!("invalid url: {}", e)))?;
    let document = Html::parse_document(html);

    let title = meta_content(&document, r#"meta[property="og:title"]"#)
        .or_else(|| title_text(&document))
        .unwrap_or_default();

    let description = meta_content(&document, r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(&document, r#"meta[name="description"]"#))
        .unwrap_or_default();

    let image_url = meta_content(&document, r#"meta[property="og:image"]"#)
        .or_else(|| favicon_href(&document))
        .unwrap_or_default();

    Ok(PreviewCard {
        title,
        description,
        image_url,
        url: page_url.to_string(),
        source: parsed.host_str().unwrap_or_default().to_string(),
    })
}
