// ============================================================================
// API Client : wttr.in
// ============================================================================
// Bulletin météo texte pour la localisation configurée
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::models::WeatherReport;

/// Construit l'URL wttr.in pour une localisation (espaces → '_')
///
/// Options "0FQAT" : conditions actuelles seulement, sans "Follow",
/// sans en-tête, sans séquences ANSI
pub fn build_weather_url(location: &str) -> String {
    format!("https://wttr.in/{}?0FQAT", location.trim().replace(' ', "_"))
}

/// Récupère le bulletin météo
///
/// Une réponse sans '°' est rejetée comme un échec réseau
#[instrument(skip(client))]
pub async fn fetch_weather(client: &Client, location: &str, timeout: Duration) -> Result<WeatherReport> {
    let url = build_weather_url(location);
    let body = super::get_text(client, &url, timeout).await?;
    let report = WeatherReport::from_raw(&body, Local::now().time())?;
    debug!(chars = report.text.len(), "Weather report parsed");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_weather_url() {
        assert_eq!(build_weather_url("New York"), "https://wttr.in/New_York?0FQAT");
        assert_eq!(build_weather_url("Kyiv"), "https://wttr.in/Kyiv?0FQAT");
    }
}
