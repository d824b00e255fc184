// ============================================================================
// API Client : titres de presse
// ============================================================================
// Scrape la page BBC World : les titres sont le texte des <h3> sous <body>
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use crate::models::NewsHeadlines;

/// Page source des titres
pub const NEWS_URL: &str = "https://www.bbc.com/news/world";

/// Récupère et parse les titres
///
/// Une page sans titre donne le placeholder "No headlines found"
#[instrument(skip(client))]
pub async fn fetch_headlines(
    client: &Client,
    headline_count: usize,
    timeout: Duration,
) -> Result<NewsHeadlines> {
    let html = super::get_text(client, NEWS_URL, timeout).await?;
    let headlines = parse_headlines(&html, headline_count);
    debug!(count = headlines.len(), placeholder = headlines.is_placeholder(), "Headlines parsed");
    Ok(headlines)
}

/// Extrait les titres d'un document HTML
///
/// CONCEPT : Sélecteur CSS "body h3"
/// - tous les h3 descendants du body, dans l'ordre du document
/// - text() concatène les nœuds texte (balises internes ignorées)
pub fn parse_headlines(html: &str, headline_count: usize) -> NewsHeadlines {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("body h3") {
        Ok(selector) => selector,
        Err(_) => return NewsHeadlines::placeholder(),
    };

    let titles = document
        .select(&selector)
        .map(|element| element.text().collect::<String>());

    NewsHeadlines::collect(titles, headline_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headlines() {
        let html = r#"
            <html><head><title>News</title></head>
            <body>
              <h2>Section</h2>
              <div><h3> Storm hits <span>coast</span> </h3></div>
              <h3>Markets rally</h3>
              <h3>Storm hits coast</h3>
              <h3>Talks resume</h3>
              <h3>Election results</h3>
              <h3>Fifth story</h3>
            </body></html>
        "#;

        let headlines = parse_headlines(html, 4);
        let titles: Vec<&String> = headlines.iter().collect();
        assert_eq!(
            titles,
            vec!["Storm hits coast", "Markets rally", "Talks resume", "Election results"]
        );
    }

    #[test]
    fn test_parse_headlines_none_found() {
        let html = "<html><body><p>Nothing here</p></body></html>";
        let headlines = parse_headlines(html, 4);
        assert!(headlines.is_placeholder());
        assert_eq!(headlines.len(), 1);
    }
}
