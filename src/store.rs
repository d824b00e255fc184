// ============================================================================
// Store des feeds : dernière valeur connue de chaque source
// ============================================================================
// Chaque feed a sa propre cellule, remplacée en entier à chaque fetch réussi
//
// CONCEPTS RUST :
// 1. ArcSwap<T> : pointeur atomique vers un Arc<T>
//    - store() remplace la valeur entière d'un coup (pas de lecture déchirée)
//    - load() lit sans verrou, ne bloque jamais l'écrivain
// 2. Arc<FeedStore> : partagé entre la boucle de rendu et les pollers
//
// PROPRIÉTÉ DES ÉCRITURES :
// - spot_price / secondary_rate : uniquement leur poller
// - headlines / weather / war : uniquement la boucle de rendu (refresh inline)
// ============================================================================

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::models::{NewsHeadlines, PriceQuote, WarStats, WeatherReport};

/// Cellule d'un feed : dernière valeur connue, remplacée atomiquement
#[derive(Debug)]
pub struct FeedCell<T> {
    value: ArcSwap<T>,
}

impl<T> FeedCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: ArcSwap::from_pointee(initial),
        }
    }

    /// Remplace la valeur (fetch réussi)
    pub fn set(&self, value: T) {
        self.value.store(Arc::new(value));
    }

    /// Snapshot partagé de la valeur courante
    pub fn snapshot(&self) -> Arc<T> {
        self.value.load_full()
    }
}

impl<T: Clone> FeedCell<T> {
    /// Copie de la valeur courante
    pub fn get(&self) -> T {
        T::clone(&self.value.load())
    }
}

impl<T: Default> Default for FeedCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Valeurs courantes de tous les feeds
#[derive(Debug, Default)]
pub struct FeedStore {
    /// Prix spot BTC/USD
    pub spot_price: FeedCell<PriceQuote>,

    /// Taux secondaire LTC/BTC
    pub secondary_rate: FeedCell<PriceQuote>,

    /// Titres de presse
    pub headlines: FeedCell<NewsHeadlines>,

    /// Bulletin météo
    pub weather: FeedCell<WeatherReport>,

    /// Statistiques de guerre
    pub war: FeedCell<WarStats>,
}

impl FeedStore {
    /// Store amorcé avec le prix spot initial
    pub fn with_spot(spot: PriceQuote) -> Self {
        let store = Self::default();
        store.spot_price.set(spot);
        store
    }
}
