// ============================================================================
// Cryptopaper - Point d'entrée
// ============================================================================
// Tableau de bord permanent : prix BTC, taux LTC, titres, météo, pertes
//
// DÉROULEMENT :
// 1. Logging, arguments, fichiers d'options
// 2. Fetch spot bloquant (retry toutes les 15 s), puis fetchs initiaux
// 3. Pollers de fond (spot 30 s, LTC 60 s) sur le runtime tokio
// 4. Boucle de rendu à cadence fixe (30 FPS par défaut)
// 5. Arrêt : annulation + join des pollers, restauration du terminal
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Async dans sync : main() synchrone + tokio::runtime::Runtime
// 3. block_on : les rafraîchissements lents bloquent la boucle de rendu
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use reqwest::Client;
use tracing::{debug, error, info, warn};

use cryptopaper::api;
use cryptopaper::app::App;
use cryptopaper::config::{self, Cli, DisplayConfig, Resolution, FETCH_TIMEOUT, INITIAL_RETRY_DELAY};
use cryptopaper::poller::{self, Poller};
use cryptopaper::scheduler::{self, SchedulerConfig};
use cryptopaper::store::FeedStore;
use cryptopaper::ui::events::{is_contrast_down_event, is_contrast_up_event, is_quit_event, Event};
use cryptopaper::ui::{render, EventHandler};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - stdout appartient au TUI une fois lancé
// - On log vers un fichier à rotation quotidienne
// ============================================================================

/// Répertoire des logs : ~/.local/share/cryptopaper/logs, sinon ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("cryptopaper").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/cryptopaper/logs/cryptopaper.log.*
/// RUST_LOG=cryptopaper=trace cryptopaper
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "cryptopaper.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptopaper=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

/// Message de démarrage : console (avant le TUI) et fichier de log
fn notice(kind: &str, content: &str) {
    println!("[{}] {}:  {}", Local::now().format("%b-%d %H:%M"), kind, content);
    info!(kind = %kind, "{}", content);
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    notice("STATUS", &format!("Cryptopaper {} starting up", env!("CARGO_PKG_VERSION")));

    let display = DisplayConfig::load_or_default(&cli.options_path());
    notice(
        "Options",
        &format!("LTC threshold {:.4}, location {}", display.alarm_threshold, display.location),
    );
    let watch = config::load_watch_list(&cli.watch_words_path());

    let scheduler_config = SchedulerConfig {
        daily_cutoff: cli.daily_cutoff,
        hourly_after_minute: cli.hourly_after_minute,
    };

    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;
    let client = api::build_client()?;

    // Le buffer de chandelles ne peut pas démarrer sans prix réel
    let spot = runtime.block_on(poller::wait_for_spot(
        || api::fetch_spot_price(&client, FETCH_TIMEOUT),
        INITIAL_RETRY_DELAY,
        |_| {
            notice(
                "RETRY",
                &format!("No spot price yet, retrying in {}s", INITIAL_RETRY_DELAY.as_secs()),
            )
        },
    ));
    notice("STATUS", &format!("BTC spot {:.2}", spot.value));
    let store = Arc::new(FeedStore::with_spot(spot));

    runtime.block_on(initial_fetch(&store, &client, &display.location));
    notice("STATUS", "Initial data loaded");

    let mut app = App::new(Arc::clone(&store), display, watch, scheduler_config, Local::now());

    // Terminal d'abord : un échec ici sort avant le lancement des pollers
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let poller = Poller::spawn(runtime.handle(), Arc::clone(&store), client.clone());

    let events = EventHandler::new();
    info!(fps = cli.fps, resolution = ?cli.resolution(), "Starting render loop");
    let result = run(&mut terminal, &mut app, &runtime, &client, &events, cli.fps, cli.resolution());

    // Arrêt : annulation et join des pollers, puis restauration du terminal
    runtime.block_on(poller.shutdown());

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Démarrage
// ============================================================================

/// Premiers fetchs des autres feeds ; un échec laisse la valeur par défaut
async fn initial_fetch(store: &FeedStore, client: &Client, location: &str) {
    match api::fetch_secondary_rate(client, FETCH_TIMEOUT).await {
        Ok(rate) => store.secondary_rate.set(rate),
        Err(e) => warn!(error = %e, "Initial secondary rate fetch failed"),
    }

    scheduler::refresh_headlines(store, client).await;
    scheduler::refresh_weather(store, client, location).await;
    scheduler::refresh_war(store, client).await;
}

// ============================================================================
// Boucle de rendu
// ============================================================================
// CONCEPT : Fixed-timestep loop
// - Input → Update → Refresh → Render → Sleep
// - Le sleep complète le budget du cadre (1 / fps)
// - Un rafraîchissement lent allonge le cadre courant, sans rattrapage
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runtime: &tokio::runtime::Runtime,
    client: &Client,
    events: &EventHandler,
    fps: u32,
    resolution: Option<Resolution>,
) -> Result<()> {
    let frame_budget = Duration::from_secs_f64(1.0 / fps.max(1) as f64);

    while app.is_running() {
        let frame_start = Instant::now();

        // 1. INPUT
        for event in events.drain()? {
            handle_event(app, &event);
        }
        if !app.is_running() {
            break;
        }

        // 2. UPDATE : horloge, chandelles, déclencheurs
        let due = app.tick(Local::now());

        // 3. REFRESH : feeds lents, inline
        if due.any() {
            runtime.block_on(scheduler::run_due(due, &app.store, client, &app.display.location));
        }

        // 4. RENDER
        terminal.draw(|frame| render(frame, app, resolution))?;

        // 5. SLEEP
        if let Some(rest) = frame_budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(())
}

/// Traite un événement clavier
fn handle_event(app: &mut App, event: &Event) {
    if is_quit_event(event) {
        info!("Quit requested");
        app.quit();
    } else if is_contrast_up_event(event) {
        app.contrast_up();
        debug!(contrast = app.contrast.value(), "Contrast up");
    } else if is_contrast_down_event(event) {
        app.contrast_down();
        debug!(contrast = app.contrast.value(), "Contrast down");
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Configure le terminal en mode TUI
///
/// Si l'écran alternatif ne peut pas être ouvert, le raw mode est désactivé
/// avant de remonter l'erreur
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    enter_alternate_screen().map_err(|e| {
        if let Err(restore) = disable_raw_mode() {
            warn!(error = %restore, "Failed to leave raw mode after setup error");
        }
        e
    })
}

fn enter_alternate_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même si la boucle de rendu a échoué
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
