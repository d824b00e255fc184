// ============================================================================
// Chart - Widgets de données
// ============================================================================
// - Graphique du prix spot (buffer de chandelles)
// - Jauge de volatilité et indicateur de mouvement
// - Taux secondaire avec alarme
// - Pertes de guerre : sparkline personnel + variations d'équipement
//
// CONCEPTS RATATUI :
// 1. Chart + Dataset : série de points (x, y)
// 2. Gauge : ratio 0..1 avec label
// 3. Sparkline : histogramme compact à partir de &[u64]
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Borders, Chart, Dataset, Gauge, GraphType, Paragraph, Sparkline},
    Frame,
};

use crate::app::App;
use crate::models::EquipmentCategory;
use crate::ui::format;
use crate::ui::Theme;

/// Volatilité (en %) qui remplit entièrement la jauge
pub const VOLATILITY_FULL_SCALE: f64 = 10.0;

/// Une ligne verticale de grille toutes les 120 chandelles (une heure)
pub const GRID_EVERY: usize = 120;

// ============================================================================
// Graphique du prix spot
// ============================================================================

/// Dessine le buffer de chandelles en ligne, avec un repère du prix courant
///
/// CONCEPT RUST : Iterator chaining
/// - .iter().enumerate().map() : (index, prix) → point (x, y)
pub fn render_candle_chart(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let points: Vec<(f64, f64)> = app
        .candles
        .iter()
        .enumerate()
        .map(|(i, price)| (i as f64, *price))
        .collect();

    let (min_price, max_price) = match (app.candles.min(), app.candles.max()) {
        (Some(min), Some(max)) if max > min => (min, max),
        (Some(price), Some(_)) => (price - 1.0, price + 1.0),
        _ => (0.0, 1.0),
    };

    let x_max = (app.candles.capacity().saturating_sub(1)).max(1) as f64;

    // Repère horizontal du dernier point jusqu'au bord droit
    let marker: Vec<(f64, f64)> = match points.last() {
        Some(&(x, y)) => vec![(x, y), (x_max, y)],
        None => Vec::new(),
    };

    // Grille : une heure de chandelles
    let grid: Vec<(f64, f64)> = (1..=points.len() / GRID_EVERY)
        .flat_map(|n| {
            let x = (n * GRID_EVERY) as f64;
            [(x, min_price), (x, max_price)]
        })
        .collect();

    let mut datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.text())
            .data(&points),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(theme.text())
            .data(&marker),
    ];
    if !grid.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(theme.dim())
                .data(&grid),
        );
    }

    let x_axis = Axis::default().style(theme.text()).bounds([0.0, x_max]);

    let y_axis = Axis::default()
        .style(theme.text())
        .bounds([min_price, max_price])
        .labels(vec![
            Span::raw(format::dollars(min_price)),
            Span::raw(format::dollars(max_price)),
        ]);

    let chart = Chart::new(datasets)
        .block(theme.block().borders(Borders::ALL))
        .style(theme.text())
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

// ============================================================================
// Volatilité et mouvement
// ============================================================================

/// Jauge de volatilité : amplitude en dollars et en pourcentage
pub fn render_volatility(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let volatility = app.candles.volatility_percent();
    let ratio = (volatility / VOLATILITY_FULL_SCALE).clamp(0.0, 1.0);
    let label = format!(
        "{}  {:.2}%",
        format::dollars(app.candles.range()),
        volatility
    );

    let gauge = Gauge::default()
        .block(theme.block().borders(Borders::ALL).title(" Vol "))
        .gauge_style(theme.text())
        .ratio(ratio)
        .label(label);

    frame.render_widget(gauge, area);
}

/// Indicateur de mouvement : position du prix courant entre le bas et le haut
///
/// CONCEPT : fraction_of_range(spot, min, max, hauteur)
/// - hauteur → prix au plus haut du buffer, 0 → au plus bas
pub fn render_movement(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = theme.block().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }

    let rows = inner.height as u32;
    let position = app.candles.position_of(app.spot().value, rows - 1);
    let marker_row = rows - 1 - position;

    let lines: Vec<Line> = (0..rows)
        .map(|row| {
            if row == marker_row {
                Line::from(Span::styled("━".repeat(inner.width as usize), theme.text()))
            } else {
                Line::from("")
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(theme.text()), inner);
}

// ============================================================================
// Taux secondaire
// ============================================================================

/// Taux LTC/BTC et sa valeur en dollars, inversés sous le seuil d'alarme
pub fn render_secondary(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let rate = app.secondary().value;
    let style = if app.secondary_alarm() {
        theme.inverse()
    } else {
        theme.text()
    };

    let lines = vec![
        Line::from(Span::styled(format!("${:.2} ", rate * app.spot().value), style)),
        Line::from(Span::styled(
            format::format_rate(rate),
            style.add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .style(theme.text())
        .alignment(Alignment::Right);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Pertes de guerre
// ============================================================================

/// Sparkline des pertes quotidiennes, chiffres clés et variations d'équipement
pub fn render_war(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let stats = app.store.war.snapshot();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    // Ligne d'équipement : "tank 14  apv 22 ..."
    let equipment: Vec<Span> = EquipmentCategory::ALL
        .iter()
        .flat_map(|category| {
            [
                Span::styled(format!("{} ", category.label()), theme.dim()),
                Span::styled(format!("{}  ", stats.equipment.delta(*category)), theme.bold()),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(equipment)).style(theme.text()), rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(16)])
        .split(rows[1]);

    // CONCEPT RUST : conversion i64 → u64
    // - Sparkline n'accepte que des u64, les deltas négatifs (corrections) sont ramenés à 0
    let daily: Vec<u64> = stats
        .personnel
        .daily
        .iter()
        .map(|v| (*v).max(0) as u64)
        .collect();

    let sparkline = Sparkline::default()
        .block(theme.block().borders(Borders::ALL))
        .style(theme.text())
        .data(&daily);
    frame.render_widget(sparkline, columns[0]);

    let figure = |value: Option<i64>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    let summary = vec![
        Line::from(Span::styled(figure(stats.personnel.last()), theme.bold())),
        Line::from(format!("High: {}", figure(stats.personnel.high()))),
        Line::from(format!("Low: {}", figure(stats.personnel.low()))),
        Line::from(format!("Day {}", stats.equipment.day)),
    ];
    frame.render_widget(Paragraph::new(summary).style(theme.text()), columns[1]);
}
