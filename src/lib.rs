// ============================================================================
// Cryptopaper - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Fetchers HTTP (Bitstamp, BBC, wttr.in, dataset des pertes)
pub mod models;    // Structures de données
pub mod store;     // Dernière valeur connue de chaque feed
pub mod config;    // Options, mots surveillés, ligne de commande
pub mod poller;    // Pollers de fond (spot, taux secondaire)
pub mod scheduler; // Déclencheurs minute / heure / jour
pub mod app;       // État de la boucle de rendu
pub mod ui;        // Interface utilisateur
