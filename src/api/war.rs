// ============================================================================
// API Client : dataset des pertes (PetroIvaniuk/2022-Ukraine-Russia-War-Dataset)
// ============================================================================
// Deux tableaux JSON triés par date :
// - personnel : [{"date": "...", "day": 2, "personnel": 2800, ...}, ...]
// - équipement : [{"date": "...", "day": 2, "tank": 80, "APC": 516, ...}, ...]
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::models::{EquipmentLossSnapshot, PersonnelDailySeries, WarStats};

pub const PERSONNEL_URL: &str = "https://raw.githubusercontent.com/PetroIvaniuk/2022-Ukraine-Russia-War-Dataset/main/data/russia_losses_personnel.json";

pub const EQUIPMENT_URL: &str = "https://raw.githubusercontent.com/PetroIvaniuk/2022-Ukraine-Russia-War-Dataset/main/data/russia_losses_equipment.json";

/// Entrée de la série personnel (seul le compteur cumulé est utilisé)
#[derive(Debug, Deserialize)]
struct PersonnelEntry {
    personnel: f64,
}

/// Récupère les deux séries (rafraîchissement quotidien)
#[instrument(skip(client))]
pub async fn fetch_war_stats(client: &Client, num_days: usize, timeout: Duration) -> Result<WarStats> {
    let personnel = fetch_personnel(client, num_days, timeout).await?;
    let equipment = fetch_equipment(client, timeout).await?;

    info!(day = equipment.day, last = ?personnel.last(), "War stats fetched");
    Ok(WarStats { personnel, equipment })
}

/// Récupère la série personnel et la convertit en deltas quotidiens
pub async fn fetch_personnel(
    client: &Client,
    num_days: usize,
    timeout: Duration,
) -> Result<PersonnelDailySeries> {
    let body = super::get_text(client, PERSONNEL_URL, timeout).await?;
    parse_personnel(&body, num_days)
}

/// Récupère le snapshot d'équipement
pub async fn fetch_equipment(client: &Client, timeout: Duration) -> Result<EquipmentLossSnapshot> {
    let body = super::get_text(client, EQUIPMENT_URL, timeout).await?;
    parse_equipment(&body)
}

/// Parse le tableau personnel
pub fn parse_personnel(body: &str, num_days: usize) -> Result<PersonnelDailySeries> {
    let entries: Vec<PersonnelEntry> =
        serde_json::from_str(body).context("Échec du parsing JSON de la série personnel")?;
    debug!(points = entries.len(), "Personnel series parsed");

    let cumulative: Vec<i64> = entries.iter().map(|e| e.personnel.round() as i64).collect();
    PersonnelDailySeries::from_cumulative(&cumulative, num_days)
}

/// Parse le tableau équipement
pub fn parse_equipment(body: &str) -> Result<EquipmentLossSnapshot> {
    let entries: Vec<Map<String, Value>> =
        serde_json::from_str(body).context("Échec du parsing JSON de la série équipement")?;
    debug!(points = entries.len(), "Equipment series parsed");

    EquipmentLossSnapshot::from_entries(&entries)
}
