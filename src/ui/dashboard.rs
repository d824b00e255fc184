// ============================================================================
// Dashboard - Composition du cadre complet
// ============================================================================
// Un cadre = un appel à Terminal::draw, composé à partir des snapshots du store
//
//   ┌─────────────┬──────────────┬─────────────┐
//   │ 14:07       │   Sun 18th   │     $67,123 │  en-tête
//   │             │   Oct '26    │             │
//   ├─────────────┴──────────────┼─────────────┤
//   │ titres (clignotants)       │ H / L       │
//   ├────────────────────────────┴─────────────┤
//   │ graphique du prix spot                   │
//   ├──────────────────┬────────┬──────────────┤
//   │ guerre           │ météo  │ vol / LTC    │
//   ├──────────────────┴────────┴──────────────┤
//   │                              statut      │
//   └──────────────────────────────────────────┘
//
// CONCEPTS RATATUI :
// 1. Layout : découpage en zones avec Constraint
// 2. Style : fond gris réglable (contraste), texte noir, inversion
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::config::{Resolution, LOGICAL_RESOLUTION};
use crate::ui::chart;

// ============================================================================
// Theme
// ============================================================================

/// Palette dérivée du niveau de contraste
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    background: Color,
}

impl Theme {
    /// Fond gris de niveau `contrast` (255 = blanc)
    pub fn from_contrast(contrast: u8) -> Self {
        Self {
            background: Color::Rgb(contrast, contrast, contrast),
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Texte noir sur le fond
    pub fn text(&self) -> Style {
        Style::default().fg(Color::Black).bg(self.background)
    }

    pub fn bold(&self) -> Style {
        self.text().add_modifier(Modifier::BOLD)
    }

    /// Texte secondaire (libellés, grille)
    pub fn dim(&self) -> Style {
        Style::default().fg(Color::Rgb(90, 90, 90)).bg(self.background)
    }

    /// Blanc sur noir (horloge, prix, alarmes, titres surveillés)
    pub fn inverse(&self) -> Style {
        self.text().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub fn block(&self) -> Block<'static> {
        Block::default().style(self.text())
    }
}

// ============================================================================
// Présentation
// ============================================================================

/// Zone de présentation : le cadre est réduit selon la résolution demandée
/// et centré dans le terminal
///
/// Sans résolution (ou à la résolution logique), le terminal entier est utilisé
pub fn present_area(area: Rect, resolution: Option<Resolution>) -> Rect {
    let scale = match resolution {
        Some(r) if r != LOGICAL_RESOLUTION => r.scale().min(1.0),
        _ => return area,
    };

    // Terminal réduit à rien : rien à centrer
    if area.width == 0 || area.height == 0 {
        return area;
    }

    let width = ((area.width as f64 * scale).round() as u16).clamp(1, area.width);
    let height = ((area.height as f64 * scale).round() as u16).clamp(1, area.height);

    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine le cadre complet
pub fn render(frame: &mut Frame, app: &App, resolution: Option<Resolution>) {
    let theme = Theme::from_contrast(app.contrast.value());
    let area = present_area(frame.size(), resolution);

    frame.render_widget(theme.block(), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // En-tête
            Constraint::Percentage(25), // Titres
            Constraint::Min(8),         // Graphique
            Constraint::Length(9),      // Guerre / météo / volatilité
            Constraint::Length(1),      // Statut
        ])
        .split(area);

    render_header(frame, app, &theme, rows[0]);
    render_headlines_row(frame, app, &theme, rows[1]);
    chart::render_candle_chart(frame, app, &theme, rows[2]);
    render_bottom_row(frame, app, &theme, rows[3]);
    render_status(frame, app, &theme, rows[4]);
}

// ============================================================================
// En-tête : horloge, date, prix spot
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);

    let clock = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {} ", app.time.clock), theme.inverse())),
    ])
    .style(theme.text());
    frame.render_widget(clock, columns[0]);

    let date = Paragraph::new(vec![
        Line::from(Span::styled(app.time.day.clone(), theme.bold())),
        Line::from(app.time.month.clone()),
    ])
    .style(theme.text())
    .alignment(Alignment::Center);
    frame.render_widget(date, columns[1]);

    let spot = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} ", crate::ui::format::format_spot(app.spot().value)),
            theme.inverse(),
        )),
    ])
    .style(theme.text())
    .alignment(Alignment::Right);
    frame.render_widget(spot, columns[2]);
}

// ============================================================================
// Titres et plus haut / plus bas
// ============================================================================

fn render_headlines_row(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(18)])
        .split(area);

    let headlines = app.store.headlines.snapshot();

    // CONCEPT : un titre qui contient un mot surveillé clignote (inversé
    // une seconde sur deux)
    let lines: Vec<Line> = headlines
        .iter()
        .map(|headline| {
            let style = if app.headline_flashes(headline) {
                theme.inverse()
            } else {
                theme.text()
            };
            Line::from(Span::styled(format!(" {} ", headline), style))
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .style(theme.text())
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, columns[0]);

    let high = app.candles.max().unwrap_or_default();
    let low = app.candles.min().unwrap_or_default();
    let extremes = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("H:{}", crate::ui::format::dollars(high)),
            theme.bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("L:{}", crate::ui::format::dollars(low)),
            theme.bold(),
        )),
    ])
    .style(theme.text())
    .alignment(Alignment::Right);
    frame.render_widget(extremes, columns[1]);
}

// ============================================================================
// Ligne du bas : guerre, météo, volatilité, taux secondaire
// ============================================================================

fn render_bottom_row(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(30),
            Constraint::Length(4),
            Constraint::Min(20),
        ])
        .split(area);

    chart::render_war(frame, app, theme, columns[0]);

    let weather = app.store.weather.snapshot();
    let report = Paragraph::new(weather.text.as_str()).style(theme.text());
    frame.render_widget(report, columns[1]);

    chart::render_movement(frame, app, theme, columns[2]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(columns[3]);

    chart::render_volatility(frame, app, theme, right[0]);
    chart::render_secondary(frame, app, theme, right[1]);
}

// ============================================================================
// Statut
// ============================================================================

fn render_status(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let status = Paragraph::new(format!("{}  ", app.status_line()))
        .style(theme.text())
        .alignment(Alignment::Right);
    frame.render_widget(status, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================
