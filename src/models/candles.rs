// ============================================================================
// Structure : CandleBuffer
// ============================================================================
// Fenêtre glissante de taille fixe qui échantillonne le prix spot une fois
// par intervalle de SECS_PER_CANDLE secondes
//
// CONCEPTS RUST :
// 1. VecDeque<T> : file à double entrée, push_back + pop_front en O(1)
// 2. Invariant : len() <= capacity, éviction FIFO
// 3. Option<i64> : dernier tick échantillonné (None avant le premier)
//
// CONCEPT : Découplage fetch / tracé
// - Le poller peut rafraîchir le prix toutes les 30s, 60s ou jamais
// - Le buffer ajoute UN point par frontière d'horloge, quelle que soit
//   la fraîcheur du prix (un feed lent produit une ligne plate)
// ============================================================================

use std::collections::VecDeque;

/// Nombre maximum d'échantillons conservés (6 heures à 30s)
pub const MAX_CANDLES: usize = 720;

/// Durée d'un échantillon en secondes
pub const SECS_PER_CANDLE: i64 = 30;

/// Buffer circulaire des prix échantillonnés
#[derive(Debug, Clone)]
pub struct CandleBuffer {
    /// Échantillons, du plus ancien au plus récent
    samples: VecDeque<f64>,

    /// Capacité maximale
    capacity: usize,

    /// Durée d'un échantillon (secondes)
    secs_per_candle: i64,

    /// Dernier tick (floor(now / secs_per_candle)) ayant produit un échantillon
    last_tick: Option<i64>,
}

impl CandleBuffer {
    /// Crée un buffer vide avec les constantes par défaut
    pub fn new() -> Self {
        Self::with_capacity(MAX_CANDLES, SECS_PER_CANDLE)
    }

    /// Crée un buffer vide avec capacité et intervalle personnalisés
    pub fn with_capacity(capacity: usize, secs_per_candle: i64) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            secs_per_candle: secs_per_candle.max(1),
            last_tick: None,
        }
    }

    /// Crée un buffer amorcé avec un premier prix
    ///
    /// Le tick courant est marqué comme déjà échantillonné : le prochain
    /// point arrivera à la prochaine frontière de 30s
    pub fn seeded(price: f64, now_unix: i64) -> Self {
        let mut buffer = Self::new();
        buffer.push(price);
        buffer.last_tick = Some(buffer.tick_of(now_unix));
        buffer
    }

    /// Calcule le tick correspondant à un timestamp Unix
    ///
    /// CONCEPT RUST : div_euclid
    /// - Division "floor" correcte même pour les valeurs négatives
    pub fn tick_of(&self, now_unix: i64) -> i64 {
        now_unix.div_euclid(self.secs_per_candle)
    }

    /// Ajoute un échantillon, évince le plus ancien si la capacité est dépassée
    pub fn push(&mut self, price: f64) {
        self.samples.push_back(price);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Vérification d'échantillonnage, appelée à chaque frame
    ///
    /// Ajoute `price` si le tick a avancé depuis le dernier échantillon.
    /// Retourne true si un point a été ajouté.
    pub fn sample(&mut self, now_unix: i64, price: f64) -> bool {
        let tick = self.tick_of(now_unix);
        match self.last_tick {
            Some(last) if tick <= last => false,
            _ => {
                self.last_tick = Some(tick);
                self.push(price);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Itère sur les échantillons du plus ancien au plus récent
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.samples.iter()
    }

    /// Dernier échantillon
    pub fn last(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Prix minimum de la fenêtre
    ///
    /// CONCEPT RUST : fold au lieu de min_by + partial_cmp().unwrap()
    /// - f64 n'implémente pas Ord (NaN), fold avec f64::min évite le panic
    pub fn min(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().copied().fold(f64::INFINITY, f64::min))
    }

    /// Prix maximum de la fenêtre
    pub fn max(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Amplitude max - min (0 si vide)
    pub fn range(&self) -> f64 {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => max - min,
            _ => 0.0,
        }
    }

    /// Volatilité en pourcentage : (max - min) / max * 100
    ///
    /// Exactement 0 quand max == min (ou buffer vide), jamais de division par zéro
    pub fn volatility_percent(&self) -> f64 {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) if max - min > 0.0 && max > 0.0 => ((max - min) / max) * 100.0,
            _ => 0.0,
        }
    }

    /// Position du prix courant dans la fenêtre [min, max], sur une échelle 0..=rate
    pub fn position_of(&self, value: f64, rate: u32) -> u32 {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => fraction_of_range(value, min, max, rate),
            _ => 0,
        }
    }
}

impl Default for CandleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Projette `value` de [min_val, max_val] vers [0, rate]
///
/// - max_val <= min_val : retourne rate (plage dégénérée)
/// - value est bornée à la plage avant la projection
/// - le résultat est tronqué (floor), donc monotone non-décroissant en value
pub fn fraction_of_range(value: f64, min_val: f64, max_val: f64, rate: u32) -> u32 {
    if max_val <= min_val {
        return rate;
    }
    let clamped = value.max(min_val).min(max_val);
    let fraction = (clamped - min_val) / (max_val - min_val);
    ((fraction * rate as f64).floor() as u32).min(rate)
}

// ============================================================================
// Tests unitaires
// ============================================================================
