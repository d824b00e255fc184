// ============================================================================
// Statistiques de guerre : personnel et équipement
// ============================================================================
// Deux séries publiées une fois par jour :
// - PersonnelDailySeries : pertes quotidiennes dérivées d'un compteur cumulé
// - EquipmentLossSnapshot : compteurs par catégorie d'équipement + delta du jour
//
// CONCEPTS RUST :
// 1. Enum fermé (EquipmentCategory) au lieu de clés String libres
// 2. Fonction de renommage totale : toute clé source devient soit
//    Known(catégorie) soit Unknown(nom brut), jamais un cas silencieux
// 3. BTreeMap : ordre déterministe des clés (affichage et tests)
// ============================================================================

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde_json::{Map, Value};

/// Nombre de jours affichés dans l'histogramme du personnel
pub const WAR_DAYS: usize = 40;

/// Clé du numéro de jour dans les entrées d'équipement
const DAY_KEY: &str = "day";

// ============================================================================
// Enum : EquipmentCategory
// ============================================================================

/// Catégories d'équipement affichées (ensemble fermé)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EquipmentCategory {
    Tank,
    Apv,
    Arty,
    Mlrs,
    Aa,
    Jet,
    Helo,
    Drone,
    Missile,
    Truck,
}

impl EquipmentCategory {
    /// Toutes les catégories, dans l'ordre d'affichage
    pub const ALL: [EquipmentCategory; 10] = [
        EquipmentCategory::Tank,
        EquipmentCategory::Apv,
        EquipmentCategory::Arty,
        EquipmentCategory::Mlrs,
        EquipmentCategory::Aa,
        EquipmentCategory::Jet,
        EquipmentCategory::Helo,
        EquipmentCategory::Drone,
        EquipmentCategory::Missile,
        EquipmentCategory::Truck,
    ];

    /// Nom canonique court
    pub fn label(&self) -> &'static str {
        match self {
            EquipmentCategory::Tank => "tank",
            EquipmentCategory::Apv => "apv",
            EquipmentCategory::Arty => "arty",
            EquipmentCategory::Mlrs => "mlrs",
            EquipmentCategory::Aa => "aa",
            EquipmentCategory::Jet => "jet",
            EquipmentCategory::Helo => "helo",
            EquipmentCategory::Drone => "drone",
            EquipmentCategory::Missile => "missile",
            EquipmentCategory::Truck => "truck",
        }
    }
}

/// Résultat du renommage d'une clé source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipmentKey {
    /// Clé reconnue, normalisée vers sa catégorie canonique
    Known(EquipmentCategory),
    /// Clé sans correspondance, conservée sous son nom brut
    Unknown(String),
}

impl EquipmentKey {
    /// Table de renommage : nom utilisé par le dataset → catégorie canonique
    ///
    /// Les noms canoniques eux-mêmes sont aussi acceptés (identité)
    pub fn from_raw(raw: &str) -> Self {
        let category = match raw {
            "tank" => EquipmentCategory::Tank,
            "APC" | "apv" => EquipmentCategory::Apv,
            "field artillery" | "arty" => EquipmentCategory::Arty,
            "MRL" | "mlrs" => EquipmentCategory::Mlrs,
            "anti-aircraft warfare" | "aa" => EquipmentCategory::Aa,
            "aircraft" | "jet" => EquipmentCategory::Jet,
            "helicopter" | "helo" => EquipmentCategory::Helo,
            "drone" => EquipmentCategory::Drone,
            "cruise missiles" | "missile" => EquipmentCategory::Missile,
            "vehicles and fuel tanks" | "truck" => EquipmentCategory::Truck,
            other => return EquipmentKey::Unknown(other.to_string()),
        };
        EquipmentKey::Known(category)
    }
}

// ============================================================================
// Structure : EquipmentLossSnapshot
// ============================================================================

/// Dernier relevé des pertes d'équipement et variation du jour
///
/// Invariant : `totals` et `deltas` contiennent toujours exactement
/// les 10 catégories de EquipmentCategory::ALL
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentLossSnapshot {
    /// Numéro du jour de guerre de la dernière entrée
    pub day: i64,

    /// Compteurs cumulés de la dernière entrée
    pub totals: BTreeMap<EquipmentCategory, i64>,

    /// Variation (max - min) sur les deux dernières entrées
    pub deltas: BTreeMap<EquipmentCategory, i64>,

    /// Champs numériques non reconnus : (total, delta) sous leur nom brut
    pub extras: BTreeMap<String, (i64, i64)>,
}

impl EquipmentLossSnapshot {
    /// Snapshot vide (avant le premier fetch)
    pub fn empty() -> Self {
        let zeros: BTreeMap<EquipmentCategory, i64> =
            EquipmentCategory::ALL.iter().map(|c| (*c, 0)).collect();
        Self {
            day: 0,
            totals: zeros.clone(),
            deltas: zeros,
            extras: BTreeMap::new(),
        }
    }

    /// Construit le snapshot à partir des entrées du dataset (ordre chronologique)
    ///
    /// - totals : dernière entrée, clés renommées
    /// - deltas : max - min par clé sur exactement les deux dernières entrées
    pub fn from_entries(entries: &[Map<String, Value>]) -> Result<Self> {
        let latest = match entries.last() {
            Some(latest) => latest,
            None => bail!("Aucune entrée d'équipement"),
        };

        let mut snapshot = Self::empty();
        snapshot.day = latest.get(DAY_KEY).and_then(as_count).unwrap_or(0);

        for (raw, value) in latest {
            if raw == DAY_KEY {
                continue;
            }
            let Some(count) = as_count(value) else {
                continue; // champs texte (ex: direction principale)
            };
            match EquipmentKey::from_raw(raw) {
                EquipmentKey::Known(category) => {
                    snapshot.totals.insert(category, count);
                }
                EquipmentKey::Unknown(name) => {
                    snapshot.extras.insert(name, (count, 0));
                }
            }
        }

        // Min/max par clé brute sur la fenêtre des deux dernières entrées
        let window = &entries[entries.len().saturating_sub(2)..];
        let mut ranges: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
        for entry in window {
            for (raw, value) in entry {
                if raw == DAY_KEY {
                    continue;
                }
                if let Some(count) = as_count(value) {
                    let range = ranges.entry(raw.as_str()).or_insert((count, count));
                    range.0 = range.0.min(count);
                    range.1 = range.1.max(count);
                }
            }
        }

        for (raw, (min, max)) in ranges {
            let delta = max - min;
            match EquipmentKey::from_raw(raw) {
                EquipmentKey::Known(category) => {
                    snapshot.deltas.insert(category, delta);
                }
                EquipmentKey::Unknown(name) => {
                    snapshot.extras.entry(name).or_insert((0, 0)).1 = delta;
                }
            }
        }

        Ok(snapshot)
    }

    /// Delta du jour pour une catégorie
    pub fn delta(&self, category: EquipmentCategory) -> i64 {
        self.deltas.get(&category).copied().unwrap_or(0)
    }

    /// Total cumulé pour une catégorie
    pub fn total(&self, category: EquipmentCategory) -> i64 {
        self.totals.get(&category).copied().unwrap_or(0)
    }
}

impl Default for EquipmentLossSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Convertit une valeur JSON numérique en compteur entier
fn as_count(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}

// ============================================================================
// Structure : PersonnelDailySeries
// ============================================================================

/// Pertes quotidiennes de personnel sur les `WAR_DAYS` derniers jours
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonnelDailySeries {
    /// Deltas jour par jour, du plus ancien au plus récent
    pub daily: Vec<i64>,
}

impl PersonnelDailySeries {
    /// Dérive les deltas à partir du compteur cumulé
    ///
    /// Les `num_days + 1` derniers points sont différenciés pour produire
    /// `num_days` valeurs. Moins de points → erreur.
    pub fn from_cumulative(cumulative: &[i64], num_days: usize) -> Result<Self> {
        if cumulative.len() < num_days + 1 {
            bail!(
                "Série personnel trop courte : {} points pour {} jours",
                cumulative.len(),
                num_days
            );
        }

        let tail = &cumulative[cumulative.len() - (num_days + 1)..];

        // CONCEPT RUST : windows(2)
        // - Itère sur les paires consécutives [a, b] sans allocation
        let daily = tail.windows(2).map(|pair| pair[1] - pair[0]).collect();

        Ok(Self { daily })
    }

    pub fn len(&self) -> usize {
        self.daily.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// Pertes du dernier jour
    pub fn last(&self) -> Option<i64> {
        self.daily.last().copied()
    }

    /// Maximum de la série
    pub fn high(&self) -> Option<i64> {
        self.daily.iter().copied().max()
    }

    /// Minimum de la série
    pub fn low(&self) -> Option<i64> {
        self.daily.iter().copied().min()
    }
}

/// Les deux séries de guerre, rafraîchies ensemble une fois par jour
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WarStats {
    pub personnel: PersonnelDailySeries,
    pub equipment: EquipmentLossSnapshot,
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_rename_known_keys() {
        assert_eq!(
            EquipmentKey::from_raw("APC"),
            EquipmentKey::Known(EquipmentCategory::Apv)
        );
        assert_eq!(
            EquipmentKey::from_raw("cruise missiles"),
            EquipmentKey::Known(EquipmentCategory::Missile)
        );
        assert_eq!(
            EquipmentKey::from_raw("tank"),
            EquipmentKey::Known(EquipmentCategory::Tank)
        );
    }

    #[test]
    fn test_rename_unknown_key() {
        assert_eq!(
            EquipmentKey::from_raw("naval ship"),
            EquipmentKey::Unknown("naval ship".to_string())
        );
    }

    #[test]
    fn test_canonical_labels_round_trip() {
        for category in EquipmentCategory::ALL {
            assert_eq!(
                EquipmentKey::from_raw(category.label()),
                EquipmentKey::Known(category)
            );
        }
    }

    #[test]
    fn test_apc_lands_under_apv() {
        let data = entries(json!([{ "date": "2024-01-01", "day": 1, "APC": 5 }]));
        let snapshot = EquipmentLossSnapshot::from_entries(&data).unwrap();

        assert_eq!(snapshot.total(EquipmentCategory::Apv), 5);
        assert!(!snapshot.extras.contains_key("APC"));
    }

    #[test]
    fn test_snapshot_key_sets_are_identical() {
        let data = entries(json!([
            { "day": 700, "tank": 100, "APC": 200, "naval ship": 20, "greatest losses direction": "East" },
            { "day": 701, "tank": 104, "APC": 209, "naval ship": 21, "drone": 50 }
        ]));
        let snapshot = EquipmentLossSnapshot::from_entries(&data).unwrap();

        let total_keys: Vec<_> = snapshot.totals.keys().collect();
        let delta_keys: Vec<_> = snapshot.deltas.keys().collect();
        assert_eq!(total_keys, delta_keys);
        assert_eq!(total_keys.len(), EquipmentCategory::ALL.len());

        assert_eq!(snapshot.day, 701);
        assert_eq!(snapshot.total(EquipmentCategory::Tank), 104);
        assert_eq!(snapshot.delta(EquipmentCategory::Tank), 4);
        assert_eq!(snapshot.delta(EquipmentCategory::Apv), 9);
        // Présent dans une seule entrée : delta nul
        assert_eq!(snapshot.delta(EquipmentCategory::Drone), 0);
        // Absent partout : 0
        assert_eq!(snapshot.total(EquipmentCategory::Jet), 0);
        // Clé inconnue conservée sous son nom brut
        assert_eq!(snapshot.extras.get("naval ship"), Some(&(21, 1)));
        assert!(!snapshot.extras.contains_key("greatest losses direction"));
    }

    #[test]
    fn test_delta_uses_only_last_two_entries() {
        let data = entries(json!([
            { "day": 1, "tank": 10 },
            { "day": 2, "tank": 50 },
            { "day": 3, "tank": 53 }
        ]));
        let snapshot = EquipmentLossSnapshot::from_entries(&data).unwrap();
        assert_eq!(snapshot.delta(EquipmentCategory::Tank), 3);
    }

    #[test]
    fn test_empty_equipment_is_error() {
        assert!(EquipmentLossSnapshot::from_entries(&[]).is_err());
    }

    #[test]
    fn test_personnel_daily_deltas() {
        let cumulative = [100, 150, 170, 300, 310];
        let series = PersonnelDailySeries::from_cumulative(&cumulative, 3).unwrap();

        assert_eq!(series.daily, vec![20, 130, 10]);
        assert_eq!(series.last(), Some(10));
        assert_eq!(series.high(), Some(130));
        assert_eq!(series.low(), Some(10));
    }

    #[test]
    fn test_personnel_too_short() {
        assert!(PersonnelDailySeries::from_cumulative(&[1, 2, 3], 3).is_err());
        assert_eq!(
            PersonnelDailySeries::from_cumulative(&[1, 2, 3, 4], 3).unwrap().len(),
            3
        );
    }
}
