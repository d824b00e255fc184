// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod candles;  // Buffer glissant des prix échantillonnés
pub mod contrast; // Niveau de contraste du fond
pub mod news;     // Titres de presse et mots surveillés
pub mod quote;    // Prix ponctuel (spot, taux secondaire)
pub mod war;      // Statistiques personnel / équipement
pub mod weather;  // Bulletin météo

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use cryptopaper::models::candles::CandleBuffer;
// On peut faire : use cryptopaper::models::CandleBuffer;
pub use candles::{fraction_of_range, CandleBuffer, MAX_CANDLES, SECS_PER_CANDLE};
pub use contrast::ContrastLevel;
pub use news::{NewsHeadlines, WatchList};
pub use quote::PriceQuote;
pub use war::{EquipmentCategory, EquipmentKey, EquipmentLossSnapshot, PersonnelDailySeries, WarStats};
pub use weather::WeatherReport;
