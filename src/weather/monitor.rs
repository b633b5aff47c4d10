use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, watch};
use tokio_util::sync::CancellationToken;

use crate::task::{BackgroundTask, SHUTDOWN_TIMEOUT};

use super::{AlertPolicy, WeatherLocation, WeatherReport, WeatherResponse};

#[async_trait]
pub trait WeatherSource: Send + Sync + 'static {
    async fn fetch(&self, location: &WeatherLocation) -> anyhow::Result<WeatherResponse>;
}

/// Reads a saved provider response from disk on every fetch.
pub struct FileWeatherSource {
    path: PathBuf,
}

impl FileWeatherSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WeatherSource for FileWeatherSource {
    async fn fetch(&self, _location: &WeatherLocation) -> anyhow::Result<WeatherResponse> {
        let document = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading weather response {}", self.path.display()))?;

        Ok(WeatherResponse::from_json(&document)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    pub report: Option<WeatherReport>,
    pub error: Option<String>,
}

#[derive(Clone)]
struct MonitorContext {
    source: Arc<dyn WeatherSource>,
    location: WeatherLocation,
    policy: AlertPolicy,
    refresh_interval: Duration,
    refresh_requested: Arc<Notify>,
    state: Arc<watch::Sender<WeatherState>>,
}

impl MonitorContext {
    async fn fetch_state(&self) -> WeatherState {
        let report = self
            .source
            .fetch(&self.location)
            .await
            .and_then(|response| Ok(WeatherReport::from_response(&response, &self.location, self.policy)?));

        match report {
            Ok(report) => {
                log::debug!("Weather refreshed: {report}");
                WeatherState {
                    report: Some(report),
                    error: None,
                }
            }
            Err(error) => {
                log::error!("Weather refresh failed: {error:#}");
                WeatherState {
                    report: None,
                    error: Some(format!("{error:#}")),
                }
            }
        }
    }
}

/// Periodically refreshes the weather report, independently of the schedule ticker.
pub struct WeatherMonitor {
    context: MonitorContext,
    task: Mutex<Option<BackgroundTask>>,
}

impl WeatherMonitor {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        location: WeatherLocation,
        policy: AlertPolicy,
        refresh_interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(WeatherState::default());

        Self {
            context: MonitorContext {
                source,
                location,
                policy,
                refresh_interval,
                refresh_requested: Arc::new(Notify::new()),
                state: Arc::new(state),
            },
            task: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.context.state.subscribe()
    }

    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(BackgroundTask::is_running) {
            return false;
        }

        let context = self.context.clone();
        *task = Some(BackgroundTask::spawn("weather monitor", move |token| {
            run_monitor(context, token)
        }));

        true
    }

    /// Asks the running loop to fetch again without waiting for the interval.
    pub fn refresh_now(&self) {
        self.context.refresh_requested.notify_one();
    }

    /// Fetches once outside the loop and publishes the result.
    pub async fn refresh_once(&self) -> WeatherState {
        let state = self.context.fetch_state().await;
        self.context.state.send_replace(state.clone());
        state
    }

    pub async fn shutdown(&self) {
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            task.cancel(SHUTDOWN_TIMEOUT).await;
        }
    }
}

async fn run_monitor(context: MonitorContext, cancellation_token: CancellationToken) {
    loop {
        let state = context.fetch_state().await;
        context.state.send_replace(state);

        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            _ = tokio::time::sleep(context.refresh_interval) => {}
            _ = context.refresh_requested.notified() => {
                log::debug!("Weather refresh requested");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::weather::{CurrentConditions, DailyForecast, default_location};

    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn fetch(&self, _location: &WeatherLocation) -> anyhow::Result<WeatherResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("API de clima falhou: 503");
            }

            Ok(WeatherResponse {
                current: Some(CurrentConditions {
                    temperature_2m: 25.2,
                    weather_code: 0,
                    uv_index: None,
                }),
                daily: Some(DailyForecast::default()),
            })
        }
    }

    const INTERVAL: Duration = Duration::from_secs(600);

    fn monitor(source: Arc<FakeSource>) -> WeatherMonitor {
        WeatherMonitor::new(source, default_location(), AlertPolicy::default(), INTERVAL)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_immediately_and_on_interval() {
        let source = Arc::new(FakeSource::default());
        let monitor = monitor(source.clone());
        let state = monitor.subscribe();

        assert!(monitor.start().await);
        assert!(!monitor.start().await);
        settle().await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.borrow().report.as_ref().unwrap().temperature, 25);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failure_clears_report_and_sets_error() {
        let source = Arc::new(FakeSource::default());
        let monitor = monitor(source.clone());
        let state = monitor.subscribe();

        monitor.start().await;
        settle().await;
        source.failing.store(true, Ordering::SeqCst);
        monitor.refresh_now();
        settle().await;

        let current = state.borrow().clone();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(current.report.is_none());
        assert_eq!(current.error.as_deref(), Some("API de clima falhou: 503"));

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn file_source_reads_saved_response() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        tokio::fs::write(
            &path,
            r#"{"current": {"temperature_2m": 30.6, "weather_code": 95}, "daily": {"uv_index_max": [3.0]}}"#,
        )
        .await
        .unwrap();
        let monitor = WeatherMonitor::new(
            Arc::new(FileWeatherSource::new(&path)),
            default_location(),
            AlertPolicy::default(),
            INTERVAL,
        );

        let state = monitor.refresh_once().await;

        let report = state.report.unwrap();
        assert_eq!(report.temperature, 31);
        assert_eq!(report.description, "Trovoada");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let monitor = WeatherMonitor::new(
            Arc::new(FileWeatherSource::new("/nonexistent/forecast.json")),
            default_location(),
            AlertPolicy::default(),
            INTERVAL,
        );

        let state = monitor.refresh_once().await;

        assert!(state.report.is_none());
        assert!(state.error.unwrap().contains("reading weather response"));
    }
}
