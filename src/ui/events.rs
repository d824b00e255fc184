// ============================================================================
// Gestion des événements
// ============================================================================
// Lecture non bloquante du clavier, une fois par cadre
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Error handling avec Result
// 3. Pattern matching : une fonction is_*_event par action
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),
}

/// Gestionnaire d'événements
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Vide la file des événements en attente sans bloquer
    ///
    /// CONCEPT : poll(Duration::ZERO)
    /// - retourne immédiatement, la cadence est tenue par la boucle de rendu
    /// - seules les pressions de touches sont gardées (pas les Release)
    pub fn drain(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let CrosstermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    events.push(Event::Key(key));
                }
            }
        }
        Ok(events)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Échap ou 'q' : arrêt
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Flèche haut : contraste +1 pas
pub fn is_contrast_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up)
    } else {
        false
    }
}

/// Flèche bas : contraste -1 pas
pub fn is_contrast_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down)
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, event::KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(is_quit_event(&key(KeyCode::Esc)));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
    }

    #[test]
    fn test_contrast_events() {
        assert!(is_contrast_up_event(&key(KeyCode::Up)));
        assert!(!is_contrast_up_event(&key(KeyCode::Down)));
        assert!(is_contrast_down_event(&key(KeyCode::Down)));
        assert!(!is_contrast_down_event(&key(KeyCode::Char('q'))));
    }
}
