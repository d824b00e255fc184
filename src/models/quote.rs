// ============================================================================
// Structure : PriceQuote
// ============================================================================
// Un prix ponctuel (spot BTC/USD ou taux LTC/BTC) avec l'heure du fetch
//
// CONCEPTS RUST :
// 1. Copy : la quote est petite (f64 + Option<DateTime>), on la copie
//    librement au lieu de la partager par référence
// 2. Option<DateTime<Utc>> : None = jamais récupérée (valeur zéro initiale)
// ============================================================================

use chrono::{DateTime, Utc};

/// Dernière valeur connue d'un feed de prix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    /// Valeur (USD pour le spot, BTC pour le taux secondaire)
    pub value: f64,

    /// Moment du fetch réussi (None tant qu'aucun fetch n'a abouti)
    pub as_of: Option<DateTime<Utc>>,
}

impl PriceQuote {
    /// Crée une quote récupérée à l'instant `as_of`
    pub fn new(value: f64, as_of: DateTime<Utc>) -> Self {
        Self {
            value,
            as_of: Some(as_of),
        }
    }

    /// Quote zéro : aucune donnée encore reçue
    pub fn unset() -> Self {
        Self {
            value: 0.0,
            as_of: None,
        }
    }

    /// Vérifie si la quote porte une vraie valeur
    ///
    /// CONCEPT : Une quote à 0 ne peut pas amorcer le buffer de chandelles
    /// (min/max n'auraient aucun sens), d'où le retry bloquant au démarrage
    pub fn is_set(&self) -> bool {
        self.as_of.is_some() && self.value != 0.0
    }
}

impl Default for PriceQuote {
    fn default() -> Self {
        Self::unset()
    }
}
