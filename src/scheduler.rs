// ============================================================================
// Scheduler des feeds lents : titres, météo, données de guerre
// ============================================================================
// Évalué à chaque tick de la boucle de rendu avec l'heure locale courante.
// Chaque déclencheur compare une unité de temps à la dernière valeur vue :
//
//   minute  : la minute d'uptime a changé          → titres
//   heure   : heure jamais vue ET minute > 30       → météo
//   jour    : date jamais vue ET heure > 14:05      → guerre
//
// Le garde est posé AVANT le fetch : un fetch raté n'est pas retenté
// avant la période suivante, la valeur précédente reste affichée.
//
// CONCEPT RUST : `now` est injecté (NaiveDateTime), le scheduler ne lit
// jamais l'horloge lui-même. Les tests rejouent des journées complètes.
// ============================================================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api;
use crate::config::{HEADLINE_TIMEOUT, SLOW_FETCH_TIMEOUT};
use crate::models::news::HEADLINE_COUNT;
use crate::models::war::WAR_DAYS;
use crate::store::FeedStore;

// ============================================================================
// Configuration
// ============================================================================

/// Seuils des déclencheurs horaire et quotidien
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Heure locale après laquelle les chiffres du jour sont publiés
    pub daily_cutoff: NaiveTime,

    /// Minute après laquelle la météo de l'heure est rafraîchie
    pub hourly_after_minute: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            daily_cutoff: NaiveTime::from_hms_opt(14, 5, 0).unwrap_or(NaiveTime::MIN),
            hourly_after_minute: 30,
        }
    }
}

// ============================================================================
// Déclencheurs
// ============================================================================

/// Rafraîchissements dus à ce tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueRefreshes {
    pub headlines: bool,
    pub weather: bool,
    pub war: bool,
}

impl DueRefreshes {
    pub fn any(&self) -> bool {
        self.headlines || self.weather || self.war
    }
}

/// Gardes des trois déclencheurs
#[derive(Debug, Clone)]
pub struct SlowFeedScheduler {
    config: SchedulerConfig,
    last_minute: Option<i64>,
    last_hour: Option<u32>,
    last_daily: Option<NaiveDate>,
}

impl SlowFeedScheduler {
    /// Scheduler sans aucun garde : tout déclencheur éligible part au premier tick
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            last_minute: None,
            last_hour: None,
            last_daily: None,
        }
    }

    /// Scheduler amorcé après les fetchs initiaux du démarrage
    ///
    /// - minute : l'uptime courant (les titres viennent d'être récupérés)
    /// - heure : l'heure courante (la météo vient d'être récupérée)
    /// - jour : aujourd'hui seulement si le cutoff est déjà passé
    pub fn starting_at(config: SchedulerConfig, now: NaiveDateTime, uptime_minute: i64) -> Self {
        let last_daily = (now.time() > config.daily_cutoff).then(|| now.date());
        Self {
            config,
            last_minute: Some(uptime_minute),
            last_hour: Some(now.hour()),
            last_daily,
        }
    }

    /// Évalue les trois déclencheurs et pose les gardes de ceux qui partent
    pub fn poll(&mut self, now: NaiveDateTime, uptime_minute: i64) -> DueRefreshes {
        let mut due = DueRefreshes::default();

        if self.last_minute != Some(uptime_minute) {
            self.last_minute = Some(uptime_minute);
            due.headlines = true;
        }

        let hour = now.hour();
        if self.last_hour != Some(hour) && now.minute() > self.config.hourly_after_minute {
            self.last_hour = Some(hour);
            due.weather = true;
        }

        let today = now.date();
        if self.last_daily != Some(today) && now.time() > self.config.daily_cutoff {
            self.last_daily = Some(today);
            due.war = true;
        }

        if due.weather || due.war {
            debug!(?due, %now, "Slow refreshes due");
        }
        due
    }
}

// ============================================================================
// Rafraîchissements inline
// ============================================================================
// Exécutés par la boucle de rendu via runtime.block_on(). Seule la boucle
// de rendu écrit ces trois cellules.
// ============================================================================

/// Rafraîchit les titres ; un placeholder compte comme un échec
pub async fn refresh_headlines(store: &FeedStore, client: &Client) -> bool {
    match api::fetch_headlines(client, HEADLINE_COUNT, HEADLINE_TIMEOUT).await {
        Ok(headlines) if !headlines.is_placeholder() => {
            store.headlines.set(headlines);
            true
        }
        Ok(_) => {
            warn!("No headlines found, keeping previous headlines");
            false
        }
        Err(e) => {
            warn!(error = %e, "Headline refresh failed");
            false
        }
    }
}

/// Rafraîchit la météo
pub async fn refresh_weather(store: &FeedStore, client: &Client, location: &str) -> bool {
    match api::fetch_weather(client, location, SLOW_FETCH_TIMEOUT).await {
        Ok(report) => {
            info!(location = %location, "Weather updated");
            store.weather.set(report);
            true
        }
        Err(e) => {
            warn!(location = %location, error = %e, "Weather refresh failed");
            false
        }
    }
}

/// Rafraîchit les données de guerre (série personnel + snapshot équipement)
pub async fn refresh_war(store: &FeedStore, client: &Client) -> bool {
    match api::fetch_war_stats(client, WAR_DAYS, SLOW_FETCH_TIMEOUT).await {
        Ok(stats) => {
            store.war.set(stats);
            true
        }
        Err(e) => {
            warn!(error = %e, "War stats refresh failed");
            false
        }
    }
}

/// Exécute les rafraîchissements dus, dans l'ordre titres, météo, guerre
pub async fn run_due(due: DueRefreshes, store: &FeedStore, client: &Client, location: &str) {
    if due.headlines {
        refresh_headlines(store, client).await;
        if !store.weather.snapshot().has_temperature() {
            warn!(location = %location, "Weather missing");
        }
    }
    if due.weather {
        refresh_weather(store, client, location).await;
    }
    if due.war {
        refresh_war(store, client).await;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn next_day(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_daily_trigger_after_cutoff() {
        let mut scheduler = SlowFeedScheduler::starting_at(SchedulerConfig::default(), at(9, 0), 0);

        assert!(!scheduler.poll(at(14, 0), 0).war);
        assert!(!scheduler.poll(at(14, 5), 0).war);
        assert!(scheduler.poll(at(14, 10), 0).war);
        assert!(!scheduler.poll(at(14, 20), 0).war);
        assert!(!scheduler.poll(at(23, 59), 0).war);

        assert!(!scheduler.poll(next_day(8, 0), 0).war);
        assert!(scheduler.poll(next_day(14, 6), 0).war);
    }

    #[test]
    fn test_startup_after_cutoff_waits_for_tomorrow() {
        let mut scheduler = SlowFeedScheduler::starting_at(SchedulerConfig::default(), at(15, 0), 0);
        assert!(!scheduler.poll(at(15, 1), 0).war);
        assert!(scheduler.poll(next_day(14, 10), 0).war);
    }

    #[test]
    fn test_custom_cutoff() {
        let config = SchedulerConfig {
            daily_cutoff: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            hourly_after_minute: 30,
        };
        let mut scheduler = SlowFeedScheduler::starting_at(config, at(8, 0), 0);
        assert!(scheduler.poll(at(9, 1), 0).war);
    }

    #[test]
    fn test_hourly_trigger_after_half_hour() {
        let mut scheduler = SlowFeedScheduler::starting_at(SchedulerConfig::default(), at(13, 0), 0);

        // Heure de démarrage déjà couverte par le fetch initial
        assert!(!scheduler.poll(at(13, 45), 0).weather);

        assert!(!scheduler.poll(at(14, 0), 0).weather);
        assert!(!scheduler.poll(at(14, 30), 0).weather);
        assert!(scheduler.poll(at(14, 31), 0).weather);
        assert!(!scheduler.poll(at(14, 45), 0).weather);
        assert!(scheduler.poll(at(15, 59), 0).weather);
    }

    #[test]
    fn test_minute_trigger_follows_uptime() {
        let mut scheduler = SlowFeedScheduler::starting_at(SchedulerConfig::default(), at(10, 0), 0);

        assert!(!scheduler.poll(at(10, 0), 0).headlines);
        assert!(scheduler.poll(at(10, 1), 1).headlines);
        assert!(!scheduler.poll(at(10, 1), 1).headlines);
        assert!(scheduler.poll(at(10, 2), 2).headlines);
    }

    #[test]
    fn test_fresh_scheduler_fires_everything_eligible() {
        let mut scheduler = SlowFeedScheduler::new(SchedulerConfig::default());
        let due = scheduler.poll(at(16, 40), 0);
        assert_eq!(
            due,
            DueRefreshes {
                headlines: true,
                weather: true,
                war: true
            }
        );
        assert!(!scheduler.poll(at(16, 40), 0).any());
    }
}
