// ============================================================================
// Poller multi-cadence : prix spot et taux secondaire en arrière-plan
// ============================================================================
// Une tâche tokio par feed, indépendantes l'une de l'autre :
//
//   loop {
//       arrêt demandé ?  → sortie
//       fetch borné par timeout → succès : store.set() / échec : warn!
//       select! { arrêt, sleep(intervalle) }
//   }
//
// CONCEPTS RUST :
// 1. CancellationToken : un seul signal d'arrêt partagé par les deux tâches
// 2. JoinHandle : shutdown() attend la fin réelle des deux tâches
// 3. tokio::time::timeout : une tentative ne peut pas dépasser son budget
// 4. Générique sur la closure de fetch : testable sans réseau
//
// La cadence est "intervalle après la fin de la tentative" : un fetch lent
// décale les suivants, il n'y a jamais deux tentatives simultanées par feed.
// ============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api;
use crate::config::{FETCH_TIMEOUT, SECONDARY_INTERVAL, SPOT_INTERVAL};
use crate::models::PriceQuote;
use crate::store::{FeedCell, FeedStore};

/// Cadence d'un feed
#[derive(Debug, Clone, Copy)]
pub struct FeedSchedule {
    pub name: &'static str,
    pub interval: Duration,
    pub timeout: Duration,
}

impl FeedSchedule {
    /// Le timeout d'une tentative ne dépasse jamais l'intervalle
    pub fn new(name: &'static str, interval: Duration, timeout: Duration) -> Self {
        Self {
            name,
            interval,
            timeout: timeout.min(interval),
        }
    }
}

fn spot_cell(store: &FeedStore) -> &FeedCell<PriceQuote> {
    &store.spot_price
}

fn secondary_cell(store: &FeedStore) -> &FeedCell<PriceQuote> {
    &store.secondary_rate
}

// ============================================================================
// Tentative unique
// ============================================================================

/// Une tentative de rafraîchissement d'une cellule
///
/// Retourne true si la cellule a été mise à jour. En cas d'erreur ou de
/// timeout la valeur précédente est conservée.
pub async fn refresh_once<T, F, Fut>(cell: &FeedCell<T>, fetch: F, schedule: &FeedSchedule) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(schedule.timeout, fetch()).await {
        Ok(Ok(value)) => {
            cell.set(value);
            debug!(feed = schedule.name, "Feed refreshed");
            true
        }
        Ok(Err(e)) => {
            warn!(feed = schedule.name, error = %e, "Feed refresh failed, keeping last value");
            false
        }
        Err(_) => {
            warn!(
                feed = schedule.name,
                timeout_ms = schedule.timeout.as_millis() as u64,
                "Feed refresh timed out, keeping last value"
            );
            false
        }
    }
}

// ============================================================================
// Boucle d'un feed
// ============================================================================

/// Boucle de polling d'un feed jusqu'à l'annulation
///
/// L'arrêt est vérifié en haut de chaque cycle et mis en course avec le
/// sleep ; une tentative en cours n'est pas interrompue.
pub async fn run_feed<T, F, Fut>(
    store: Arc<FeedStore>,
    cell: fn(&FeedStore) -> &FeedCell<T>,
    schedule: FeedSchedule,
    fetch: F,
    cancel: CancellationToken,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    info!(feed = schedule.name, interval_secs = schedule.interval.as_secs(), "Poller started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        refresh_once(cell(&store), &fetch, &schedule).await;

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(schedule.interval) => {}
        }
    }

    info!(feed = schedule.name, "Poller stopped");
}

// ============================================================================
// Prix spot initial
// ============================================================================

/// Bloque jusqu'à obtenir un prix spot non nul
///
/// Une erreur ou une quote à zéro déclenche `on_retry(tentative)` puis une
/// attente de `retry_delay` avant la tentative suivante.
pub async fn wait_for_spot<F, Fut, R>(fetch: F, retry_delay: Duration, mut on_retry: R) -> PriceQuote
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<PriceQuote>>,
    R: FnMut(usize),
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match fetch().await {
            Ok(quote) if quote.is_set() => {
                info!(attempt, value = quote.value, "Initial spot price received");
                return quote;
            }
            Ok(_) => warn!(attempt, "Spot price is zero, retrying"),
            Err(e) => warn!(attempt, error = %e, "Initial spot fetch failed, retrying"),
        }
        on_retry(attempt);
        tokio::time::sleep(retry_delay).await;
    }
}

// ============================================================================
// Structure : Poller
// ============================================================================

/// Les deux tâches de fond et leur signal d'arrêt commun
///
/// CONCEPT RUST : Drop
/// - un Poller abandonné sans shutdown() (retour anticipé avec `?`)
///   annule quand même ses tâches
#[derive(Debug)]
pub struct Poller {
    cancel: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Poller {
    /// Lance les pollers spot (30 s) et secondaire (60 s) sur le runtime
    pub fn spawn(handle: &Handle, store: Arc<FeedStore>, client: Client) -> Self {
        let cancel = CancellationToken::new();

        let spot = FeedSchedule::new("spot_price", SPOT_INTERVAL, FETCH_TIMEOUT);
        let spot_client = client.clone();
        let spot_task = handle.spawn(run_feed(
            Arc::clone(&store),
            spot_cell,
            spot,
            move || {
                let client = spot_client.clone();
                async move { api::fetch_spot_price(&client, FETCH_TIMEOUT).await }
            },
            cancel.clone(),
        ));

        let secondary = FeedSchedule::new("secondary_rate", SECONDARY_INTERVAL, FETCH_TIMEOUT);
        let secondary_task = handle.spawn(run_feed(
            store,
            secondary_cell,
            secondary,
            move || {
                let client = client.clone();
                async move { api::fetch_secondary_rate(&client, FETCH_TIMEOUT).await }
            },
            cancel.clone(),
        ));

        Self {
            cancel,
            tasks: vec![(spot.name, spot_task), (secondary.name, secondary_task)],
        }
    }

    /// Construit un poller à partir de tâches déjà lancées
    pub fn from_tasks(cancel: CancellationToken, tasks: Vec<(&'static str, JoinHandle<()>)>) -> Self {
        Self { cancel, tasks }
    }

    /// Demande l'arrêt puis attend la fin de toutes les tâches
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for (name, task) in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                warn!(feed = name, error = %e, "Poller task ended abnormally");
            }
        }
        info!("Pollers joined");
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if !self.cancel.is_cancelled() {
            debug!("Poller dropped without shutdown, cancelling tasks");
            self.cancel.cancel();
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn schedule(interval_ms: u64, timeout_ms: u64) -> FeedSchedule {
        FeedSchedule::new(
            "test",
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }

    #[test]
    fn test_timeout_bounded_by_interval() {
        let s = FeedSchedule::new("x", Duration::from_secs(30), Duration::from_secs(90));
        assert_eq!(s.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_value() {
        let store = FeedStore::default();
        let before = PriceQuote::new(0.0041, Utc::now());
        store.secondary_rate.set(before);

        let updated = refresh_once(
            &store.secondary_rate,
            || async { Err(anyhow!("HTTP 503")) },
            &schedule(1000, 100),
        )
        .await;

        assert!(!updated);
        assert_eq!(store.secondary_rate.get(), before);
    }

    #[tokio::test]
    async fn test_timed_out_fetch_keeps_previous_value() {
        let store = FeedStore::default();
        let before = PriceQuote::new(67_000.0, Utc::now());
        store.spot_price.set(before);

        let updated = refresh_once(
            &store.spot_price,
            || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(PriceQuote::new(1.0, Utc::now()))
            },
            &schedule(1000, 20),
        )
        .await;

        assert!(!updated);
        assert_eq!(store.spot_price.get(), before);
    }

    #[tokio::test]
    async fn test_successful_fetch_replaces_value() {
        let store = FeedStore::default();
        let updated = refresh_once(
            &store.spot_price,
            || async { Ok(PriceQuote::new(68_000.0, Utc::now())) },
            &schedule(1000, 100),
        )
        .await;

        assert!(updated);
        assert_eq!(store.spot_price.get().value, 68_000.0);
    }

    #[tokio::test]
    async fn test_shutdown_joins_sleeping_tasks() {
        let store = Arc::new(FeedStore::default());
        let cancel = CancellationToken::new();
        let attempts = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&attempts);
        let task = tokio::spawn(run_feed(
            Arc::clone(&store),
            secondary_cell,
            schedule(60_000, 100),
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok(PriceQuote::new(n as f64, Utc::now()))
                }
            },
            cancel.clone(),
        ));

        // Laisse la première tentative aboutir, la tâche dort ensuite 60 s
        tokio::time::sleep(Duration::from_millis(50)).await;

        let poller = Poller::from_tasks(cancel, vec![("test", task)]);
        let joined = tokio::time::timeout(Duration::from_secs(1), poller.shutdown()).await;

        assert!(joined.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(store.secondary_rate.get().value, 1.0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_never_fetches() {
        let store = Arc::new(FeedStore::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        run_feed(
            Arc::clone(&store),
            spot_cell,
            schedule(10, 10),
            || async { Ok(PriceQuote::new(1.0, Utc::now())) },
            cancel,
        )
        .await;

        assert!(!store.spot_price.get().is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_attempt_waits_interval_after_completion() {
        let store = Arc::new(FeedStore::default());
        let cancel = CancellationToken::new();
        let starts = Arc::new(Mutex::new(Vec::new()));

        let recorder = Arc::clone(&starts);
        let task = tokio::spawn(run_feed(
            Arc::clone(&store),
            spot_cell,
            FeedSchedule::new("test", Duration::from_secs(30), Duration::from_secs(10)),
            move || {
                let recorder = Arc::clone(&recorder);
                async move {
                    recorder.lock().unwrap().push(tokio::time::Instant::now());
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(PriceQuote::new(67_000.0, Utc::now()))
                }
            },
            cancel.clone(),
        ));

        // Tentative 0..5 s, sommeil 5..35 s, deuxième tentative à 35 s
        tokio::time::sleep(Duration::from_secs(40)).await;
        Poller::from_tasks(cancel, vec![("test", task)]).shutdown().await;

        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 2);
        let gap = starts[1] - starts[0];
        assert!(gap >= Duration::from_secs(35), "gap = {:?}", gap);
        assert!(gap < Duration::from_millis(35_010), "gap = {:?}", gap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_feed_does_not_block_other_feed() {
        let store = Arc::new(FeedStore::default());
        let cancel = CancellationToken::new();

        let spot_task = tokio::spawn(run_feed(
            Arc::clone(&store),
            spot_cell,
            FeedSchedule::new("spot", Duration::from_secs(30), Duration::from_secs(20)),
            || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(PriceQuote::new(67_000.0, Utc::now()))
            },
            cancel.clone(),
        ));
        let secondary_task = tokio::spawn(run_feed(
            Arc::clone(&store),
            secondary_cell,
            FeedSchedule::new("secondary", Duration::from_secs(60), Duration::from_secs(1)),
            || async { Ok(PriceQuote::new(0.0041, Utc::now())) },
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.secondary_rate.get().value, 0.0041);
        assert!(!store.spot_price.get().is_set());

        // L'arrêt n'interrompt pas la tentative spot en cours
        let poller = Poller::from_tasks(cancel, vec![("spot", spot_task), ("secondary", secondary_task)]);
        poller.shutdown().await;
        assert_eq!(store.spot_price.get().value, 67_000.0);
    }

    #[tokio::test]
    async fn test_dropped_poller_cancels_tasks() {
        let store = Arc::new(FeedStore::default());
        let cancel = CancellationToken::new();
        let observer = cancel.clone();

        let task = tokio::spawn(run_feed(
            Arc::clone(&store),
            secondary_cell,
            schedule(60_000, 100),
            || async { Ok(PriceQuote::new(0.0041, Utc::now())) },
            cancel.clone(),
        ));

        drop(Poller::from_tasks(cancel, vec![("test", task)]));
        assert!(observer.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_spot_retries_until_real_quote() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let retries = Arc::new(Mutex::new(Vec::new()));
        let started = tokio::time::Instant::now();

        let counter = Arc::clone(&attempts);
        let seen = Arc::clone(&retries);
        let quote = wait_for_spot(
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    match counter.fetch_add(1, Ordering::SeqCst) {
                        0 => Err(anyhow!("connection refused")),
                        1 => Ok(PriceQuote::new(0.0, Utc::now())),
                        _ => Ok(PriceQuote::new(67_000.0, Utc::now())),
                    }
                }
            },
            Duration::from_secs(15),
            move |attempt| seen.lock().unwrap().push(attempt),
        )
        .await;

        assert_eq!(quote.value, 67_000.0);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(*retries.lock().unwrap(), vec![1, 2]);
        assert!(started.elapsed() >= Duration::from_secs(30));
    }
}
