// ============================================================================
// Structure : ContrastLevel
// ============================================================================
// Luminosité du fond, ajustée par les flèches haut/bas
//
// Invariant : la valeur reste dans [MIN_CONTRAST, MAX_CONTRAST]
// ============================================================================

/// Luminosité minimale du fond
pub const MIN_CONTRAST: u8 = 155;

/// Luminosité maximale (blanc pur)
pub const MAX_CONTRAST: u8 = 255;

/// Pas d'ajustement par appui de touche
pub const CONTRAST_STEP: u8 = 20;

/// Niveau de contraste (gris du fond)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContrastLevel(u8);

impl ContrastLevel {
    /// Démarre au maximum (fond blanc)
    pub fn new() -> Self {
        Self(MAX_CONTRAST)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Éclaircit d'un pas
    ///
    /// CONCEPT RUST : saturating_add + min
    /// - u8 ne peut pas déborder silencieusement (panic en debug)
    /// - saturating_add s'arrête à 255, min() garde la borne haute
    pub fn increase(&mut self) {
        self.0 = self.0.saturating_add(CONTRAST_STEP).min(MAX_CONTRAST);
    }

    /// Assombrit d'un pas, sans descendre sous MIN_CONTRAST
    pub fn decrease(&mut self) {
        self.0 = self.0.saturating_sub(CONTRAST_STEP).max(MIN_CONTRAST);
    }

    /// Numéro du pas courant (0 = plus sombre, 5 = plus clair)
    pub fn step(&self) -> u8 {
        (self.0 - MIN_CONTRAST) / CONTRAST_STEP
    }

    /// Vérifie si le contraste est au maximum
    pub fn is_max(&self) -> bool {
        self.0 >= MAX_CONTRAST
    }
}

impl Default for ContrastLevel {
    fn default() -> Self {
        Self::new()
    }
}
