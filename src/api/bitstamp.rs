// ============================================================================
// API Client : Bitstamp
// ============================================================================
// Récupère le dernier prix d'un marché Bitstamp
//
// Format de réponse (extrait) :
//   {"last": "67123.45", "high": "...", "low": "...", ...}
// Le champ "last" est un nombre encodé en chaîne
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::models::PriceQuote;

/// Ticker BTC/USD (prix spot)
pub const SPOT_PRICE_URL: &str = "https://www.bitstamp.net/api/v2/ticker/btcusd";

/// Ticker LTC/BTC (taux secondaire)
pub const SECONDARY_RATE_URL: &str = "https://www.bitstamp.net/api/v2/ticker/ltcbtc";

/// Partie utile de la réponse ticker
#[derive(Debug, Deserialize)]
struct TickerResponse {
    last: String,
}

/// Récupère le prix spot BTC/USD
#[instrument(skip(client))]
pub async fn fetch_spot_price(client: &Client, timeout: Duration) -> Result<PriceQuote> {
    fetch_ticker(client, SPOT_PRICE_URL, timeout).await
}

/// Récupère le taux LTC/BTC
#[instrument(skip(client))]
pub async fn fetch_secondary_rate(client: &Client, timeout: Duration) -> Result<PriceQuote> {
    fetch_ticker(client, SECONDARY_RATE_URL, timeout).await
}

async fn fetch_ticker(client: &Client, url: &str, timeout: Duration) -> Result<PriceQuote> {
    let body = super::get_text(client, url, timeout).await?;
    let quote = parse_ticker(&body)?;
    debug!(url = %url, value = quote.value, "Ticker parsed");
    Ok(quote)
}

/// Parse une réponse ticker Bitstamp
///
/// JSON invalide, champ absent ou "last" non numérique → erreur
pub fn parse_ticker(body: &str) -> Result<PriceQuote> {
    let ticker: TickerResponse =
        serde_json::from_str(body).context("Échec du parsing JSON du ticker")?;

    let value: f64 = ticker
        .last
        .trim()
        .parse()
        .with_context(|| format!("Champ 'last' non numérique : {:?}", ticker.last))?;

    if !value.is_finite() {
        anyhow::bail!("Champ 'last' non fini : {}", value);
    }

    Ok(PriceQuote::new(value, Utc::now()))
}
