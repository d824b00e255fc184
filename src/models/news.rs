// ============================================================================
// Titres de presse et mots surveillés
// ============================================================================

/// Nombre de titres affichés
pub const HEADLINE_COUNT: usize = 4;

/// Texte affiché quand aucun titre n'a été trouvé
pub const NO_HEADLINES: &str = "No headlines found";

/// Liste ordonnée de titres dédupliqués, remplacée en entier à chaque refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsHeadlines {
    headlines: Vec<String>,
}

impl NewsHeadlines {
    /// Construit la liste à partir des titres bruts, dans l'ordre de rencontre
    ///
    /// - chaque titre est trimé, les vides ignorés
    /// - doublons supprimés (première occurrence gardée)
    /// - au plus `count` titres
    /// - aucun titre → placeholder, jamais une liste vide
    pub fn collect<I, S>(raw: I, count: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut headlines: Vec<String> = Vec::new();
        for title in raw {
            if headlines.len() >= count {
                break;
            }
            let title = title.as_ref().trim();
            if title.is_empty() || headlines.iter().any(|h| h == title) {
                continue;
            }
            headlines.push(title.to_string());
        }

        if headlines.is_empty() {
            return Self::placeholder();
        }
        Self { headlines }
    }

    /// Liste réduite au message "aucun titre"
    pub fn placeholder() -> Self {
        Self {
            headlines: vec![NO_HEADLINES.to_string()],
        }
    }

    /// Vérifie si la liste est le placeholder (résultat vide)
    pub fn is_placeholder(&self) -> bool {
        self.headlines.len() == 1 && self.headlines[0] == NO_HEADLINES
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> + '_ {
        self.headlines.iter()
    }

    pub fn len(&self) -> usize {
        self.headlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headlines.is_empty()
    }
}

impl Default for NewsHeadlines {
    fn default() -> Self {
        Self::placeholder()
    }
}

// ============================================================================
// Structure : WatchList
// ============================================================================
// Mots qui font clignoter un titre quand ils y apparaissent
// ============================================================================

/// Mots surveillés par défaut (fichier absent)
pub const DEFAULT_WATCH_WORDS: [&str; 9] = [
    "breaking", "shot", "troop", "explo", "nuclear", "chemical", "Putin", "killed", "Moscow",
];

/// Liste de mots surveillés (comparaison insensible à la casse)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchList {
    /// Mots déjà passés en minuscules
    words: Vec<String>,
}

impl WatchList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Vérifie si le titre contient au moins un mot surveillé
    pub fn matches(&self, headline: &str) -> bool {
        let headline = headline.to_lowercase();
        self.words.iter().any(|w| headline.contains(w.as_str()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for WatchList {
    fn default() -> Self {
        Self::new(DEFAULT_WATCH_WORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_dedup_and_cap() {
        let raw = ["  First  ", "Second", "First", "", "Third", "Fourth", "Fifth"];
        let news = NewsHeadlines::collect(raw, 4);
        let titles: Vec<&String> = news.iter().collect();
        assert_eq!(titles, vec!["First", "Second", "Third", "Fourth"]);
        assert!(!news.is_placeholder());
    }

    #[test]
    fn test_collect_empty_gives_placeholder() {
        let news = NewsHeadlines::collect(Vec::<String>::new(), 4);
        assert_eq!(news.len(), 1);
        assert!(news.is_placeholder());

        let news = NewsHeadlines::collect(["   ", ""], 4);
        assert!(news.is_placeholder());
    }

    #[test]
    fn test_watch_list_case_insensitive() {
        let watch = WatchList::default();
        assert!(watch.matches("BREAKING: something happened"));
        assert!(watch.matches("Explosion reported near the port"));
        assert!(watch.matches("talks in moscow"));
        assert!(!watch.matches("Weather is mild today"));
    }

    #[test]
    fn test_watch_list_ignores_empty_words() {
        let watch = WatchList::new(["", "  ", "storm"]);
        assert_eq!(watch.len(), 1);
        assert!(!watch.matches("Calm seas"));
    }
}
