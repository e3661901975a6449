//! Background monitor: poll the backend for the newest reading, evaluate
//! it against the active vegetation profile, and raise deduplicated alerts.
//!
//! Dedup policy: at most one alert per distinct reading timestamp. A fresh
//! timestamp reopens the alert window; an unchanged timestamp never
//! re-alerts, even if it stays out of range. Alerting and the data-refresh
//! signal are independent events — refresh fires on every successful
//! fetch, alerts only when the dedup window is open.
//!
//! The loop is a single tokio task; ticks are serialized because the next
//! interval tick is only awaited after the previous fetch completed or
//! failed. Only this task mutates the dedup state and the published
//! status snapshot; HTTP handlers read through the shared handles.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;

use crate::daylight::is_daytime;
use crate::evaluate::{alert_body, evaluate, Deviation};
use crate::models::{SensorReading, VegetationProfile};

// ---

/// Title used for every out-of-range alert.
pub const ALERT_TITLE: &str = "Greenhouse values out of range";

/// Backend-fetch collaborator: yields the newest reading per tick.
#[allow(async_fn_in_trait)]
pub trait ReadingSource {
    /// `Ok(None)` when the backend holds no readings yet.
    async fn fetch_latest_reading(&self) -> Result<Option<SensorReading>>;
}

/// Outbound event sink. `emit_alert` and `signal_data_refreshed` are
/// deliberately separate: a tick that finds everything in range still
/// refreshes, and a failed fetch does neither.
pub trait Notifier {
    fn emit_alert(&mut self, title: &str, body: &str, profile_name: &str);
    fn signal_data_refreshed(&mut self);
}

/// Default sink: structured log lines instead of push notifications.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn emit_alert(&mut self, title: &str, body: &str, profile_name: &str) {
        // ---
        tracing::warn!(profile = profile_name, "{title}: {body}");
    }

    fn signal_data_refreshed(&mut self) {
        // ---
        tracing::debug!("reading refreshed");
    }
}

// ---

/// Shared handle to the at-most-one active profile.
///
/// Written by the profile routes, read by the monitor on every tick so a
/// newly activated profile takes effect without restarting the loop.
#[derive(Clone, Default)]
pub struct ActiveProfile(Arc<RwLock<Option<VegetationProfile>>>);

impl ActiveProfile {
    pub async fn get(&self) -> Option<VegetationProfile> {
        // ---
        self.0.read().await.clone()
    }

    pub async fn set(&self, profile: Option<VegetationProfile>) {
        // ---
        *self.0.write().await = profile;
    }
}

/// What the monitor learned from its most recent successful fetch,
/// served verbatim by `GET /status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    // ---
    pub reading: SensorReading,
    pub deviations: Vec<Deviation>,
    pub is_daytime: bool,
    /// True once an alert has gone out for the current reading timestamp.
    pub alerted: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Single-writer snapshot slot shared with the status route.
#[derive(Clone, Default)]
pub struct StatusBoard(Arc<RwLock<Option<StatusSnapshot>>>);

impl StatusBoard {
    pub async fn latest(&self) -> Option<StatusSnapshot> {
        // ---
        self.0.read().await.clone()
    }

    async fn publish(&self, snapshot: StatusSnapshot) {
        // ---
        *self.0.write().await = Some(snapshot);
    }
}

// ---

/// The fetch-and-check loop plus its dedup state.
pub struct Monitor<S, N> {
    // ---
    source: S,
    notifier: N,
    active: ActiveProfile,
    status: StatusBoard,
    /// Timestamp of the last reading seen; empty before the first fetch.
    last_seen: String,
    /// True once an alert went out for `last_seen`.
    notified: bool,
}

impl<S: ReadingSource, N: Notifier> Monitor<S, N> {
    pub fn new(source: S, notifier: N, active: ActiveProfile, status: StatusBoard) -> Self {
        // ---
        Self {
            source,
            notifier,
            active,
            status,
            last_seen: String::new(),
            notified: false,
        }
    }

    /// One fetch-evaluate-notify cycle.
    ///
    /// A fetch error leaves all state untouched and is returned to the
    /// caller; the next scheduled tick is the retry mechanism. A
    /// successful fetch always ends with the data-refresh signal, whether
    /// or not an alert fired.
    pub async fn tick(&mut self) -> Result<()> {
        // ---
        let Some(reading) = self.source.fetch_latest_reading().await? else {
            tracing::debug!("backend has no readings yet");
            self.notifier.signal_data_refreshed();
            return Ok(());
        };

        // A new timestamp opens a fresh dedup window
        if reading.timestamp != self.last_seen {
            self.last_seen = reading.timestamp.clone();
            self.notified = false;
        }

        let profile = self.active.get().await;
        let report = evaluate(&reading, profile.as_ref());

        if !report.is_empty() && !self.notified {
            // report is non-empty only when a profile was present
            if let Some(p) = &profile {
                self.notifier
                    .emit_alert(ALERT_TITLE, &alert_body(&report), &p.name);
                self.notified = true;
            }
        }

        self.status
            .publish(StatusSnapshot {
                is_daytime: is_daytime(Some(&reading.timestamp)),
                deviations: report,
                alerted: self.notified,
                reading,
                fetched_at: Utc::now(),
            })
            .await;

        self.notifier.signal_data_refreshed();
        Ok(())
    }

    /// Run ticks on a fixed period until `shutdown` flips to true.
    ///
    /// Stopping drops the interval and any pending tick with it; the
    /// in-flight tick (if any) finishes before the loop exits.
    pub async fn run(mut self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        // ---
        tracing::info!("monitor polling every {}s", period.as_secs());
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        tracing::warn!("monitor tick failed: {e:#}");
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("monitor stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use anyhow::bail;

    use super::*;

    /// Reading source whose response the test can swap between ticks.
    #[derive(Clone, Default)]
    struct StubSource {
        reading: Arc<Mutex<Option<SensorReading>>>,
        fail: Arc<AtomicBool>,
    }

    impl StubSource {
        fn set_reading(&self, reading: SensorReading) {
            *self.reading.lock().unwrap() = Some(reading);
        }
    }

    impl ReadingSource for StubSource {
        async fn fetch_latest_reading(&self) -> Result<Option<SensorReading>> {
            if self.fail.load(Ordering::SeqCst) {
                bail!("backend unreachable");
            }
            Ok(self.reading.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct Events {
        alerts: Vec<(String, String, String)>,
        refreshes: usize,
    }

    /// Notifier that records every event for later assertions.
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Events>>);

    impl Recorder {
        fn alerts(&self) -> Vec<(String, String, String)> {
            self.0.lock().unwrap().alerts.clone()
        }

        fn refreshes(&self) -> usize {
            self.0.lock().unwrap().refreshes
        }
    }

    impl Notifier for Recorder {
        fn emit_alert(&mut self, title: &str, body: &str, profile_name: &str) {
            self.0.lock().unwrap().alerts.push((
                title.to_string(),
                body.to_string(),
                profile_name.to_string(),
            ));
        }

        fn signal_data_refreshed(&mut self) {
            self.0.lock().unwrap().refreshes += 1;
        }
    }

    fn tomato_profile() -> VegetationProfile {
        // ---
        VegetationProfile {
            id: Some(1),
            name: "Tomato".to_string(),
            day_temp_min: 18.0,
            day_temp_max: 30.0,
            night_temp_min: 12.0,
            night_temp_max: 22.0,
            day_ground_humid_min: 40.0,
            day_ground_humid_max: 70.0,
            night_ground_humid_min: 45.0,
            night_ground_humid_max: 75.0,
            day_air_humid_min: 50.0,
            day_air_humid_max: 80.0,
            night_air_humid_min: 55.0,
            night_air_humid_max: 85.0,
        }
    }

    fn hot_reading(ts: &str) -> SensorReading {
        // ---
        SensorReading {
            temperature: 33.0,
            ground_humidity: 55.0,
            air_humidity: 60.0,
            timestamp: ts.to_string(),
        }
    }

    fn ok_reading(ts: &str) -> SensorReading {
        // ---
        SensorReading {
            temperature: 24.0,
            ground_humidity: 55.0,
            air_humidity: 60.0,
            timestamp: ts.to_string(),
        }
    }

    async fn monitor_with(
        source: StubSource,
        recorder: Recorder,
        profile: Option<VegetationProfile>,
    ) -> Monitor<StubSource, Recorder> {
        // ---
        let active = ActiveProfile::default();
        active.set(profile).await;
        Monitor::new(source, recorder, active, StatusBoard::default())
    }

    #[tokio::test]
    async fn same_timestamp_alerts_exactly_once() {
        // ---
        let source = StubSource::default();
        source.set_reading(hot_reading("2024-06-01T14:00:00"));
        let recorder = Recorder::default();
        let mut monitor =
            monitor_with(source, recorder.clone(), Some(tomato_profile())).await;

        monitor.tick().await.unwrap();
        monitor.tick().await.unwrap();

        let alerts = recorder.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].0, ALERT_TITLE);
        assert_eq!(alerts[0].1, "Temperature is too high by 3.0°C. ");
        assert_eq!(alerts[0].2, "Tomato");
        assert_eq!(recorder.refreshes(), 2);
    }

    #[tokio::test]
    async fn new_timestamp_reopens_the_alert_window() {
        // ---
        let source = StubSource::default();
        source.set_reading(hot_reading("2024-06-01T14:00:00"));
        let recorder = Recorder::default();
        let mut monitor =
            monitor_with(source.clone(), recorder.clone(), Some(tomato_profile())).await;

        monitor.tick().await.unwrap();
        source.set_reading(hot_reading("2024-06-01T14:05:00"));
        monitor.tick().await.unwrap();

        assert_eq!(recorder.alerts().len(), 2);
    }

    #[tokio::test]
    async fn in_range_reading_refreshes_without_alerting() {
        // ---
        let source = StubSource::default();
        source.set_reading(ok_reading("2024-06-01T14:00:00"));
        let recorder = Recorder::default();
        let mut monitor =
            monitor_with(source, recorder.clone(), Some(tomato_profile())).await;

        monitor.tick().await.unwrap();

        assert_eq!(recorder.refreshes(), 1);
        assert!(recorder.alerts().is_empty());
    }

    #[tokio::test]
    async fn no_active_profile_suppresses_alerting() {
        // ---
        let source = StubSource::default();
        source.set_reading(hot_reading("2024-06-01T14:00:00"));
        let recorder = Recorder::default();
        let mut monitor = monitor_with(source, recorder.clone(), None).await;

        monitor.tick().await.unwrap();

        assert!(recorder.alerts().is_empty());
        assert_eq!(recorder.refreshes(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_untouched() {
        // ---
        let source = StubSource::default();
        source.set_reading(hot_reading("2024-06-01T14:00:00"));
        source.fail.store(true, Ordering::SeqCst);
        let recorder = Recorder::default();
        let mut monitor =
            monitor_with(source.clone(), recorder.clone(), Some(tomato_profile())).await;

        assert!(monitor.tick().await.is_err());
        assert_eq!(recorder.refreshes(), 0);
        assert!(recorder.alerts().is_empty());

        // The loop is not poisoned: the next tick alerts normally
        source.fail.store(false, Ordering::SeqCst);
        monitor.tick().await.unwrap();
        assert_eq!(recorder.alerts().len(), 1);
        assert_eq!(recorder.refreshes(), 1);
    }

    #[tokio::test]
    async fn empty_backend_still_signals_refresh() {
        // ---
        let source = StubSource::default();
        let recorder = Recorder::default();
        let mut monitor =
            monitor_with(source, recorder.clone(), Some(tomato_profile())).await;

        monitor.tick().await.unwrap();

        assert_eq!(recorder.refreshes(), 1);
        assert!(recorder.alerts().is_empty());
    }

    #[tokio::test]
    async fn back_in_range_then_same_timestamp_never_realerts() {
        // ---
        // Once a timestamp's window closes (alert sent), even a
        // still-out-of-range repeat of that timestamp stays silent.
        let source = StubSource::default();
        source.set_reading(hot_reading("2024-06-01T14:00:00"));
        let recorder = Recorder::default();
        let mut monitor =
            monitor_with(source.clone(), recorder.clone(), Some(tomato_profile())).await;

        monitor.tick().await.unwrap();
        monitor.tick().await.unwrap();
        monitor.tick().await.unwrap();

        assert_eq!(recorder.alerts().len(), 1);
        assert_eq!(recorder.refreshes(), 3);
    }

    #[tokio::test]
    async fn snapshot_reflects_latest_fetch() {
        // ---
        let source = StubSource::default();
        source.set_reading(hot_reading("2024-06-01T14:00:00"));
        let status = StatusBoard::default();
        let active = ActiveProfile::default();
        active.set(Some(tomato_profile())).await;
        let mut monitor =
            Monitor::new(source, Recorder::default(), active, status.clone());

        monitor.tick().await.unwrap();

        let snap = status.latest().await.unwrap();
        assert_eq!(snap.reading.timestamp, "2024-06-01T14:00:00");
        assert_eq!(snap.deviations.len(), 1);
        assert!(snap.is_daytime);
        assert!(snap.alerted);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        // ---
        let source = StubSource::default();
        let monitor = monitor_with(source, Recorder::default(), None).await;
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(monitor.run(Duration::from_secs(3600), rx));
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("monitor did not stop")
            .unwrap();
    }
}
