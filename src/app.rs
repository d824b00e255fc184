// ============================================================================
// Structure : App
// ============================================================================
// État de la boucle de rendu
//
// CONCEPTS RUST :
// 1. State Management : tout ce que la boucle de rendu possède est ici
// 2. Arc<FeedStore> : lecture partagée des feeds écrits par les pollers
// 3. Temps injecté : tick(now) reçoit l'heure, jamais Local::now() en interne
//
// PROPRIÉTÉ :
// - candles, contrast, scheduler : modifiés uniquement par la boucle de rendu
// - display, watch : immuables après le démarrage
// ============================================================================

use std::sync::Arc;

use chrono::{DateTime, Local, Timelike};

use crate::config::DisplayConfig;
use crate::models::{CandleBuffer, ContrastLevel, PriceQuote, WatchList};
use crate::scheduler::{DueRefreshes, SchedulerConfig, SlowFeedScheduler};
use crate::store::FeedStore;
use crate::ui::format;

// ============================================================================
// Enum : LoopState
// ============================================================================
// CONCEPT RUST : Enum pour state machine
// - Running → Stopped, jamais l'inverse
// ============================================================================

/// État de la boucle de rendu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Champs dérivés de l'heure, recalculés à chaque tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFields {
    /// "14:07"
    pub clock: String,

    /// "Sun 18th"
    pub day: String,

    /// "Oct '26"
    pub month: String,

    /// "3h07m"
    pub uptime: String,

    /// Seconde paire : les titres surveillés s'affichent en inversé
    pub flash_on: bool,
}

impl TimeFields {
    fn compute(now: DateTime<Local>, started_at: DateTime<Local>) -> Self {
        let uptime_secs = (now - started_at).num_seconds();
        Self {
            clock: now.format("%H:%M").to_string(),
            day: format::day_line(now.date_naive()),
            month: format::month_line(now.date_naive()),
            uptime: format::dhm(uptime_secs),
            flash_on: now.second() % 2 == 0,
        }
    }
}

/// État principal de la boucle de rendu
pub struct App {
    state: LoopState,

    /// Dernières valeurs connues de chaque feed
    pub store: Arc<FeedStore>,

    /// Historique échantillonné du prix spot
    pub candles: CandleBuffer,

    /// Gris du fond
    pub contrast: ContrastLevel,

    /// Seuil d'alarme et localisation
    pub display: DisplayConfig,

    /// Mots qui font clignoter un titre
    pub watch: WatchList,

    scheduler: SlowFeedScheduler,
    started_at: DateTime<Local>,

    /// Horloge, date, uptime
    pub time: TimeFields,
}

impl App {
    /// Crée l'état de rendu après les fetchs initiaux
    ///
    /// Le buffer est amorcé avec le prix spot courant du store et le tick
    /// courant est marqué comme déjà échantillonné
    pub fn new(
        store: Arc<FeedStore>,
        display: DisplayConfig,
        watch: WatchList,
        scheduler_config: SchedulerConfig,
        started_at: DateTime<Local>,
    ) -> Self {
        let spot = store.spot_price.get();
        Self {
            state: LoopState::Running,
            candles: CandleBuffer::seeded(spot.value, started_at.timestamp()),
            contrast: ContrastLevel::new(),
            display,
            watch,
            scheduler: SlowFeedScheduler::starting_at(scheduler_config, started_at.naive_local(), 0),
            started_at,
            time: TimeFields::compute(started_at, started_at),
            store,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Passe à Stopped (Esc / q)
    pub fn quit(&mut self) {
        self.state = LoopState::Stopped;
    }

    pub fn contrast_up(&mut self) {
        self.contrast.increase();
    }

    pub fn contrast_down(&mut self) {
        self.contrast.decrease();
    }

    /// Minutes écoulées depuis le démarrage
    pub fn uptime_minute(&self, now: DateTime<Local>) -> i64 {
        (now - self.started_at).num_minutes()
    }

    /// Un tick de la boucle de rendu
    ///
    /// 1. Champs dérivés de l'heure
    /// 2. Échantillonnage du prix spot si le tick de 30 s a avancé
    /// 3. Déclencheurs des feeds lents (le rafraîchissement est fait par l'appelant)
    pub fn tick(&mut self, now: DateTime<Local>) -> DueRefreshes {
        self.time = TimeFields::compute(now, self.started_at);

        let spot = self.store.spot_price.get();
        self.candles.sample(now.timestamp(), spot.value);

        let uptime_minute = self.uptime_minute(now);
        self.scheduler.poll(now.naive_local(), uptime_minute)
    }

    /// Prix spot courant
    pub fn spot(&self) -> PriceQuote {
        self.store.spot_price.get()
    }

    /// Taux secondaire courant
    pub fn secondary(&self) -> PriceQuote {
        self.store.secondary_rate.get()
    }

    /// Le taux secondaire est sous le seuil d'alarme (affichage inversé)
    pub fn secondary_alarm(&self) -> bool {
        self.secondary().value <= self.display.alarm_threshold
    }

    /// Un titre clignote s'il contient un mot surveillé, une seconde sur deux
    pub fn headline_flashes(&self, headline: &str) -> bool {
        self.time.flash_on && self.watch.matches(headline)
    }

    /// Ligne de statut (bas de l'écran)
    pub fn status_line(&self) -> String {
        let step = (!self.contrast.is_max()).then(|| self.contrast.step());
        format::status_line(&self.display.location_label(), step, &self.time.uptime)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn local(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 10, 18, h, m, s)
            .single()
            .unwrap()
    }

    fn app_at(start: DateTime<Local>, spot: f64) -> App {
        let store = Arc::new(FeedStore::with_spot(PriceQuote::new(spot, Utc::now())));
        App::new(
            store,
            DisplayConfig::default(),
            WatchList::default(),
            SchedulerConfig::default(),
            start,
        )
    }

    #[test]
    fn test_app_creation() {
        let app = app_at(local(9, 0, 0), 67_000.0);
        assert!(app.is_running());
        assert_eq!(app.candles.len(), 1);
        assert_eq!(app.candles.last(), Some(67_000.0));
        assert_eq!(app.time.clock, "09:00");
        assert_eq!(app.time.uptime, "0h00m");
    }

    #[test]
    fn test_app_quit() {
        let mut app = app_at(local(9, 0, 0), 1.0);
        app.quit();
        assert_eq!(app.state(), LoopState::Stopped);
        assert!(!app.is_running());
    }

    #[test]
    fn test_tick_samples_on_new_boundary() {
        let start = local(9, 0, 1);
        let mut app = app_at(start, 67_000.0);

        app.store.spot_price.set(PriceQuote::new(67_100.0, Utc::now()));
        app.tick(local(9, 0, 10));
        assert_eq!(app.candles.len(), 1);

        app.tick(local(9, 0, 31));
        assert_eq!(app.candles.len(), 2);
        assert_eq!(app.candles.last(), Some(67_100.0));
    }

    #[test]
    fn test_tick_reports_minute_trigger() {
        let start = local(9, 0, 0);
        let mut app = app_at(start, 1.0);

        assert!(!app.tick(local(9, 0, 30)).headlines);
        assert!(app.tick(local(9, 1, 0)).headlines);
        assert!(!app.tick(local(9, 1, 30)).headlines);
        assert_eq!(app.time.uptime, "0h01m");
    }

    #[test]
    fn test_contrast_keys() {
        let mut app = app_at(local(9, 0, 0), 1.0);
        app.contrast_up();
        assert_eq!(app.contrast.value(), 255);

        for _ in 0..10 {
            app.contrast_down();
        }
        assert_eq!(app.contrast.value(), 155);
        assert!(app.status_line().contains("   0  Up:"));
    }

    #[test]
    fn test_headline_flashes_on_even_seconds() {
        let mut app = app_at(local(9, 0, 0), 1.0);

        app.tick(local(9, 0, 2));
        assert!(app.headline_flashes("Nuclear talks resume"));
        assert!(!app.headline_flashes("Markets rally"));

        app.tick(local(9, 0, 3));
        assert!(!app.headline_flashes("Nuclear talks resume"));
    }

    #[test]
    fn test_secondary_alarm() {
        let app = app_at(local(9, 0, 0), 1.0);
        app.store.secondary_rate.set(PriceQuote::new(0.0040, Utc::now()));
        assert!(app.secondary_alarm());
        app.store.secondary_rate.set(PriceQuote::new(0.0041, Utc::now()));
        assert!(!app.secondary_alarm());
    }
}
