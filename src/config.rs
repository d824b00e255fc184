// ============================================================================
// Configuration
// ============================================================================
// - Constantes de cadence et de timeout
// - Fichier d'options (2 lignes : seuil d'alarme, localisation)
// - Fichier des mots surveillés (un mot par ligne)
// - Arguments de ligne de commande (clap)
//
// Les deux fichiers sont lus une seule fois au démarrage. Un fichier absent
// ou invalide donne les valeurs par défaut et un avertissement.
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use clap::Parser;
use tracing::{info, warn};

use crate::models::news::DEFAULT_WATCH_WORDS;
use crate::models::WatchList;

// ============================================================================
// Constantes
// ============================================================================

/// Intervalle du poller de prix spot
pub const SPOT_INTERVAL: Duration = Duration::from_secs(30);

/// Intervalle du poller de taux secondaire
pub const SECONDARY_INTERVAL: Duration = Duration::from_secs(60);

/// Timeout d'une tentative de fetch rapide (tickers, titres)
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(1);

/// Timeout du scraping des titres (bloque la boucle de rendu)
pub const HEADLINE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout des fetchs lents (météo, données de guerre)
pub const SLOW_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Délai entre deux tentatives du fetch spot initial
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(15);

/// Cadence d'affichage par défaut
pub const DEFAULT_FPS: u32 = 30;

/// Seuil d'alarme par défaut du taux secondaire
pub const DEFAULT_ALARM_THRESHOLD: f64 = 0.0040;

/// Localisation météo par défaut
pub const DEFAULT_LOCATION: &str = "New York";

/// Nom du fichier d'options dans le répertoire lib
pub const OPTIONS_FILE: &str = "options.txt";

/// Nom du fichier des mots surveillés dans le répertoire lib
pub const WATCH_WORDS_FILE: &str = "watch-words.txt";

/// Résolution logique du cadre composé
pub const LOGICAL_RESOLUTION: Resolution = Resolution {
    width: 2200,
    height: 1650,
};

// ============================================================================
// Structure : DisplayConfig
// ============================================================================

/// Options d'affichage lues au démarrage
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// En dessous (ou égal), le taux secondaire s'affiche en inversé
    pub alarm_threshold: f64,

    /// Localisation météo (caractères filtrés, en "Title Case")
    pub location: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            alarm_threshold: DEFAULT_ALARM_THRESHOLD,
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl DisplayConfig {
    /// Charge les options, ou les valeurs par défaut en cas de problème
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!(threshold = config.alarm_threshold, location = %config.location, "Options loaded");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Options are defaulting");
                Self::default()
            }
        }
    }

    /// Lit le fichier d'options (ligne 1 : seuil, ligne 2 : localisation)
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        Self::parse(&contents)
    }

    /// Parse le contenu du fichier d'options
    pub fn parse(contents: &str) -> Result<Self> {
        let mut lines = contents.lines().map(sanitize_option_line);

        let (threshold_line, location_line) = match (lines.next(), lines.next()) {
            (Some(threshold), Some(location)) => (threshold, location),
            _ => bail!("Le fichier d'options doit contenir deux lignes"),
        };

        let threshold: f64 = threshold_line
            .parse()
            .with_context(|| format!("Seuil invalide : {:?}", threshold_line))?;
        if !threshold.is_finite() || threshold <= 0.0 {
            bail!("Le seuil doit être un nombre positif : {}", threshold);
        }

        let location = title_case(&location_line);
        if location.is_empty() {
            bail!("Localisation vide");
        }

        Ok(Self {
            alarm_threshold: round4(threshold),
            location,
        })
    }

    /// Localisation entre crochets si elle contient des chiffres (code postal, coordonnées)
    pub fn location_label(&self) -> String {
        if self.location.chars().any(|c| c.is_ascii_digit()) {
            format!("[{}]", self.location)
        } else {
            self.location.clone()
        }
    }
}

/// Garde les caractères alphanumériques et " _-.,~'"
fn sanitize_option_line(line: &str) -> String {
    line.trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || " _-.,~'".contains(*c))
        .collect()
}

/// Arrondi à 4 décimales
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// "new york" → "New York" (majuscule après tout caractère non alphabétique)
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut start_of_word = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if start_of_word {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            result.push(c);
            start_of_word = true;
        }
    }
    result
}

// ============================================================================
// Mots surveillés
// ============================================================================

/// Charge la liste des mots surveillés, ou la liste par défaut
///
/// Les lignes contenant des caractères non imprimables sont ignorées
pub fn load_watch_list(path: &Path) -> WatchList {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let words: Vec<&str> = contents
                .lines()
                .filter(|line| line.chars().all(|c| c.is_ascii_graphic() || c == ' ' || c == '\t'))
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();
            info!(count = words.len(), "Watch words loaded");
            WatchList::new(words)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Watch word list is missing, using defaults");
            WatchList::new(DEFAULT_WATCH_WORDS)
        }
    }
}

// ============================================================================
// Écriture (format partagé avec le service d'édition)
// ============================================================================

/// Normalise un seuil saisi : 4 décimales, non positif → 0.0001, invalide → 0.0002
pub fn sanitize_threshold(input: &str) -> String {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => format!("{:.4}", value),
        Ok(_) => "0.0001".to_string(),
        Err(_) => "0.0002".to_string(),
    }
}

/// Écrit le fichier d'options dans le format lu par DisplayConfig::load
pub fn save_options(path: &Path, threshold: &str, location: &str) -> Result<()> {
    let location: String = location.chars().filter(|c| !c.is_control()).collect();
    let contents = format!("{}\n{}", sanitize_threshold(threshold), location);
    std::fs::write(path, contents).with_context(|| format!("Impossible d'écrire {}", path.display()))
}

/// Écrit la liste des mots surveillés
///
/// Caractères non alphanumériques retirés, lignes vides ignorées,
/// tri insensible à la casse
pub fn save_watch_words(path: &Path, text: &str) -> Result<()> {
    let mut words: Vec<String> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect())
        .collect();
    words.sort_by_key(|w: &String| w.to_lowercase());

    std::fs::write(path, words.join("\n"))
        .with_context(|| format!("Impossible d'écrire {}", path.display()))
}

// ============================================================================
// Résolution de présentation
// ============================================================================

/// Taille du cadre présenté
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Résolution 4:3 dérivée d'une largeur, 800x600 minimum
    pub fn from_width(width: u32) -> Self {
        if width < 800 {
            return Self {
                width: 800,
                height: 600,
            };
        }
        Self {
            width,
            height: (width / 4) * 3,
        }
    }

    /// Facteur d'échelle par rapport à la résolution logique
    pub fn scale(&self) -> f64 {
        self.width as f64 / LOGICAL_RESOLUTION.width as f64
    }
}

// ============================================================================
// Ligne de commande
// ============================================================================

/// Arguments de lancement
#[derive(Debug, Clone, Parser)]
#[command(name = "cryptopaper", version, about = "Tableau de bord BTC, news, météo")]
pub struct Cli {
    /// Largeur de sortie : le cadre est redimensionné à la présentation
    pub width: Option<u32>,

    /// Répertoire contenant options.txt et watch-words.txt
    #[arg(long, env = "CRYPTOPAPER_LIB_DIR", default_value = "lib")]
    pub lib_dir: PathBuf,

    /// Heure locale après laquelle les données de guerre du jour sont publiées
    #[arg(long, default_value = "14:05", value_parser = parse_hh_mm)]
    pub daily_cutoff: NaiveTime,

    /// Minute de l'heure après laquelle la météo est rafraîchie
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(0..59))]
    pub hourly_after_minute: u32,

    /// Images par seconde de la boucle de rendu
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub fps: u32,
}

impl Cli {
    /// Résolution de présentation (None : résolution logique, pas de redimensionnement)
    pub fn resolution(&self) -> Option<Resolution> {
        self.width
            .map(Resolution::from_width)
            .filter(|r| *r != LOGICAL_RESOLUTION)
    }

    pub fn options_path(&self) -> PathBuf {
        self.lib_dir.join(OPTIONS_FILE)
    }

    pub fn watch_words_path(&self) -> PathBuf {
        self.lib_dir.join(WATCH_WORDS_FILE)
    }
}

/// Parse "HH:MM" en NaiveTime
fn parse_hh_mm(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| format!("heure invalide {:?} : {}", value, e))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let config = DisplayConfig::parse("0.00456789\nnew york\n").unwrap();
        assert_eq!(config.alarm_threshold, 0.0046);
        assert_eq!(config.location, "New York");
    }

    #[test]
    fn test_parse_options_sanitizes() {
        let config = DisplayConfig::parse("  0.0035;\nsan francisco!\n").unwrap();
        assert_eq!(config.alarm_threshold, 0.0035);
        assert_eq!(config.location, "San Francisco");
    }

    #[test]
    fn test_parse_options_rejects_bad_input() {
        assert!(DisplayConfig::parse("").is_err());
        assert!(DisplayConfig::parse("0.004").is_err());
        assert!(DisplayConfig::parse("abc\nParis").is_err());
        assert!(DisplayConfig::parse("-1\nParis").is_err());
        assert!(DisplayConfig::parse("0\nParis").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = DisplayConfig::load_or_default(&dir.path().join("absent.txt"));
        assert_eq!(config, DisplayConfig::default());
        assert_eq!(config.alarm_threshold, 0.0040);
        assert_eq!(config.location, "New York");
    }

    #[test]
    fn test_location_label() {
        let mut config = DisplayConfig::default();
        assert_eq!(config.location_label(), "New York");
        config.location = "10001".to_string();
        assert_eq!(config.location_label(), "[10001]");
    }

    #[test]
    fn test_save_then_load_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OPTIONS_FILE);

        save_options(&path, "0.005", "kyiv").unwrap();
        let config = DisplayConfig::load(&path).unwrap();
        assert_eq!(config.alarm_threshold, 0.005);
        assert_eq!(config.location, "Kyiv");
    }

    #[test]
    fn test_sanitize_threshold() {
        assert_eq!(sanitize_threshold("0.0041"), "0.0041");
        assert_eq!(sanitize_threshold("-3"), "0.0001");
        assert_eq!(sanitize_threshold("oops"), "0.0002");
    }

    #[test]
    fn test_watch_words_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WATCH_WORDS_FILE);

        save_watch_words(&path, "zebra\n\nAlpha!\nmid-word\n").unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(saved, "Alpha\nmidword\nzebra");

        let watch = load_watch_list(&path);
        assert_eq!(watch.len(), 3);
        assert!(watch.matches("ALPHA team"));
    }

    #[test]
    fn test_watch_words_skip_non_printable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WATCH_WORDS_FILE);
        std::fs::write(&path, "storm\nbad\u{7}word\ncafé\n\n").unwrap();

        let watch = load_watch_list(&path);
        assert_eq!(watch.len(), 1);
        assert!(watch.matches("Storm warning"));
    }

    #[test]
    fn test_missing_watch_words_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let watch = load_watch_list(&dir.path().join("absent.txt"));
        assert_eq!(watch.len(), DEFAULT_WATCH_WORDS.len());
    }

    #[test]
    fn test_resolution_from_width() {
        assert_eq!(Resolution::from_width(1872), Resolution { width: 1872, height: 1404 });
        assert_eq!(Resolution::from_width(640), Resolution { width: 800, height: 600 });
        assert!((Resolution::from_width(1100).scale() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["cryptopaper"]);
        assert_eq!(cli.width, None);
        assert_eq!(cli.resolution(), None);
        assert_eq!(cli.daily_cutoff, NaiveTime::from_hms_opt(14, 5, 0).unwrap());
        assert_eq!(cli.hourly_after_minute, 30);
        assert_eq!(cli.fps, 30);

        let cli = Cli::parse_from(["cryptopaper", "1872", "--daily-cutoff", "13:00"]);
        assert_eq!(cli.resolution(), Some(Resolution { width: 1872, height: 1404 }));
        assert_eq!(cli.daily_cutoff, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
    }

    #[test]
    fn test_hourly_after_minute_range() {
        // Au-delà de 58, la condition "minute > seuil" ne serait jamais vraie
        let cli = Cli::parse_from(["cryptopaper", "--hourly-after-minute", "58"]);
        assert_eq!(cli.hourly_after_minute, 58);
        assert!(Cli::try_parse_from(["cryptopaper", "--hourly-after-minute", "59"]).is_err());
        assert!(Cli::try_parse_from(["cryptopaper", "--hourly-after-minute", "60"]).is_err());
    }
}
