// ============================================================================
// Module : api
// ============================================================================
// Ce module contient tous les fetchers : une requête réseau + un parsing
// vers une valeur typée, ou une erreur (jamais de mutation du store)
//
// - bitstamp : prix spot BTC/USD et taux LTC/BTC
// - news     : titres de la page BBC World
// - weather  : bulletin texte wttr.in
// - war      : séries personnel / équipement (dataset GitHub)
// ============================================================================

pub mod bitstamp; // Tickers Bitstamp (JSON)
pub mod news;     // Scraping HTML des titres
pub mod war;      // Données de guerre (JSON)
pub mod weather;  // Météo texte

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

// Re-export des fonctions principales
pub use bitstamp::{fetch_secondary_rate, fetch_spot_price};
pub use news::fetch_headlines;
pub use war::fetch_war_stats;
pub use weather::fetch_weather;

/// User-Agent envoyé à toutes les sources (certaines bloquent les clients sans UA)
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux armv7l) AppleWebKit/537.36 cryptopaper";

/// Crée le client HTTP partagé par tous les fetchers
///
/// CONCEPT RUST : Client réutilisable
/// - reqwest::Client garde un pool de connexions interne
/// - Clone est bon marché (Arc interne), on le passe aux pollers
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Échec de la création du client HTTP")
}

/// GET borné par `timeout`, retourne le corps texte
///
/// Un statut HTTP hors 2xx est une erreur
pub(crate) async fn get_text(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    debug!(url = %url, ?timeout, "Sending HTTP request");
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("Échec de la requête HTTP vers {}", url))?
        .error_for_status()
        .with_context(|| format!("Statut HTTP en erreur pour {}", url))?;

    response
        .text()
        .await
        .with_context(|| format!("Échec de la lecture de la réponse de {}", url))
}
