// ============================================================================
// Structure : WeatherReport
// ============================================================================
// Bloc texte formaté par wttr.in, avec l'heure du dernier fetch réussi
// ajoutée à la fin du texte
// ============================================================================

use anyhow::{bail, Result};
use chrono::NaiveTime;

/// Marqueur attendu dans toute réponse météo valide
pub const DEGREE_MARKER: char = '°';

/// Bulletin météo opaque
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeatherReport {
    pub text: String,
}

impl WeatherReport {
    /// Valide et formate une réponse brute de wttr.in
    ///
    /// - pas de '°' → erreur (traitée comme un échec réseau)
    /// - flèches diagonales remplacées par des lettres modificatrices
    ///   (glyphes absents de la police d'origine, rendu conservé)
    /// - "(HH:MM)" du fetch ajouté après 16 espaces
    pub fn from_raw(raw: &str, fetched_at: NaiveTime) -> Result<Self> {
        if !raw.contains(DEGREE_MARKER) {
            bail!("Réponse météo sans marqueur de température");
        }

        let body: String = raw
            .chars()
            .map(|c| match c {
                '\u{2196}' => '\u{02f9}',
                '\u{2197}' => '\u{02fa}',
                '\u{2198}' => '\u{02fc}',
                '\u{2199}' => '\u{02fb}',
                other => other,
            })
            .collect();

        Ok(Self {
            text: format!("{}{}({})", body, " ".repeat(16), fetched_at.format("%H:%M")),
        })
    }

    /// Vérifie que le bulletin contient bien une température
    pub fn has_temperature(&self) -> bool {
        self.text.contains(DEGREE_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_rejects_missing_marker() {
        assert!(WeatherReport::from_raw("Unknown location", at(10, 0)).is_err());
        assert!(WeatherReport::from_raw("", at(10, 0)).is_err());
    }

    #[test]
    fn test_formats_and_stamps() {
        let report = WeatherReport::from_raw("Sunny +21°C \u{2197} 5 km/h", at(14, 35)).unwrap();
        assert!(report.has_temperature());
        assert!(report.text.contains('\u{02fa}'));
        assert!(!report.text.contains('\u{2197}'));
        assert!(report.text.ends_with("                (14:35)"));
    }

    #[test]
    fn test_default_has_no_temperature() {
        assert!(!WeatherReport::default().has_temperature());
    }
}
