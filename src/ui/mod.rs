// ============================================================================
// Module : ui
// ============================================================================
// Interface terminal : événements clavier, composition du cadre, formatage
// ============================================================================

pub mod events;    // Lecture du clavier
pub mod dashboard; // Composition du cadre complet
pub mod chart;     // Graphique, jauges, pertes de guerre
pub mod format;    // Horloge, date, prix

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use dashboard::{render, Theme};
