//! Polls a MoveQuest wearable over HTTP and appends each reading to a CSV log.
//!
//! Every cycle runs the same small state machine:
//!
//! ```text
//! Idle ──tick──▶ Requesting ──┬─ 7 fields ──▶ Persist ──▶ Idle
//!                             ├─ wrong arity ───────────▶ Idle   (logged, discarded)
//!                             └─ timeout / error / non-2xx ─▶ Idle   (logged)
//! ```
//!
//! A failed cycle is never retried early; the next tick retries naturally.
//! Cancellation is only observed between cycles or while waiting on the
//! network, so a record is either fully written and synced or not at all.
//! The write and `fsync` run on tokio's blocking pool.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use movequest_core::{AccelLogWriter, AccelRecord, RecordError};

/// Where to poll, where to write, and how often.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub url: String,
    pub output: PathBuf,
    pub interval: Duration,
    /// Bound on each request, connect included.
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            url: "http://172.20.10.2/data".to_string(),
            output: PathBuf::from("accel_log.csv"),
            interval: Duration::from_millis(50),
            timeout: Duration::from_secs(1),
        }
    }
}

/// Why a single poll produced no record.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("unexpected data format: {0}")]
    Record(#[from] RecordError),

    #[error("log write failed: {0}")]
    Io(#[from] io::Error),
}

/// Outcome counters for one logger run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub logged: u64,
    pub malformed: u64,
    pub failed: u64,
}

/// Fixed-interval HTTP poller that persists every well-formed reading.
pub struct PollingLogger {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    path: PathBuf,
    /// Lent to the blocking pool during a write; `None` only if that write
    /// task panicked.
    writer: Option<AccelLogWriter>,
    stats: PollStats,
}

impl PollingLogger {
    /// Build the HTTP client and open (or create) the log file.
    pub fn new(config: &PollerConfig) -> Result<Self, PollError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;
        let writer = AccelLogWriter::open(&config.output)?;

        Ok(Self {
            client,
            url: config.url.clone(),
            interval: config.interval,
            path: writer.path().to_path_buf(),
            writer: Some(writer),
            stats: PollStats::default(),
        })
    }

    /// One Requesting → Persist pass. The log is touched only on success.
    ///
    /// Do not drop this future once the request has completed: the writer is
    /// on loan to the blocking pool until the write returns.
    pub async fn poll_once(&mut self) -> Result<AccelRecord, PollError> {
        let record = self.fetch().await?;
        Ok(self.persist(record).await?)
    }

    /// GET the source and check the line's shape.
    async fn fetch(&self) -> Result<AccelRecord, PollError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }
        let text = resp.text().await?;
        Ok(AccelRecord::parse(&text)?)
    }

    /// Append and sync `record` off the async workers.
    async fn persist(&mut self, record: AccelRecord) -> io::Result<AccelRecord> {
        let mut writer = self.writer.take().ok_or_else(writer_lost)?;
        let (writer, result) = tokio::task::spawn_blocking(move || {
            let result = writer.append(&record).map(|()| record);
            (writer, result)
        })
        .await
        .map_err(io::Error::other)?;
        self.writer = Some(writer);
        result
    }

    /// Poll every `interval` until `cancel` fires, then close the log.
    pub async fn run(mut self, cancel: CancellationToken) -> io::Result<(PathBuf, PollStats)> {
        log::info!(
            "logging data from {} to {}",
            self.url,
            self.path.display()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let fetched = tokio::select! {
                _ = cancel.cancelled() => break,
                r = self.fetch() => r,
            };
            // Once a record is in hand it is written whatever happens next.
            let result = match fetched {
                Ok(record) => self.persist(record).await.map_err(PollError::from),
                Err(e) => Err(e),
            };
            self.note(result);
        }

        let stats = self.stats;
        log::info!(
            "logging stopped: {} logged, {} malformed, {} failed",
            stats.logged,
            stats.malformed,
            stats.failed
        );
        let writer = self.writer.take().ok_or_else(writer_lost)?;
        let path = writer.finish()?;
        Ok((path, stats))
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    fn note(&mut self, result: Result<AccelRecord, PollError>) {
        match result {
            Ok(record) => {
                self.stats.logged += 1;
                log::debug!("logged: {}", record.to_csv_line());
            }
            Err(PollError::Record(e)) => {
                self.stats.malformed += 1;
                log::warn!("unexpected data format: {e}");
            }
            Err(PollError::Io(e)) => {
                self.stats.failed += 1;
                log::error!("log write failed: {e}");
            }
            Err(e) => {
                self.stats.failed += 1;
                log::warn!("{e}");
            }
        }
    }
}

fn writer_lost() -> io::Error {
    io::Error::other("log writer lost after a failed write task")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Router, http::StatusCode, routing::get};

    use super::*;

    /// Serve `body` with `status` at `/data` on an ephemeral port.
    async fn source(status: StatusCode, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/data",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { (status, body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/data"), hits)
    }

    fn config(url: String, output: PathBuf) -> PollerConfig {
        PollerConfig {
            url,
            output,
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(500),
        }
    }

    fn line_count(path: &std::path::Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count()
    }

    #[tokio::test]
    async fn well_formed_line_appends_one_row() {
        let (url, _) = source(StatusCode::OK, "1200,0.1,-0.9,0.2,0.95,1.02,4\n").await;
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut logger = PollingLogger::new(&config(url, path.clone())).unwrap();
        assert_eq!(line_count(&path), 1);

        let record = logger.poll_once().await.unwrap();
        assert_eq!(record.fields()[6], "4");

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1200,0.1,-0.9,0.2,0.95,1.02,4");
    }

    #[tokio::test]
    async fn malformed_line_leaves_log_unchanged() {
        let (url, _) = source(StatusCode::OK, "1200,0.1,-0.9,0.2,0.95").await;
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut logger = PollingLogger::new(&config(url, path.clone())).unwrap();

        let err = logger.poll_once().await.unwrap_err();
        assert!(matches!(
            err,
            PollError::Record(RecordError::FieldCount { found: 5, .. })
        ));
        assert_eq!(line_count(&path), 1);
    }

    #[tokio::test]
    async fn multi_line_response_is_malformed() {
        let (url, _) = source(StatusCode::OK, "1,2,3,4\n5,6,7,8").await;
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut logger = PollingLogger::new(&config(url, path.clone())).unwrap();

        assert!(matches!(
            logger.poll_once().await,
            Err(PollError::Record(RecordError::MultiLine))
        ));
        assert_eq!(line_count(&path), 1);
        assert_eq!(logger.stats(), PollStats::default());
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let (url, _) = source(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut logger = PollingLogger::new(&config(url, path.clone())).unwrap();

        assert!(matches!(
            logger.poll_once().await,
            Err(PollError::Status(500))
        ));
        assert_eq!(line_count(&path), 1);
    }

    #[tokio::test]
    async fn unreachable_source_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut logger =
            PollingLogger::new(&config(format!("http://{addr}/data"), path.clone())).unwrap();

        assert!(matches!(
            logger.poll_once().await,
            Err(PollError::Transport(_))
        ));
        assert_eq!(line_count(&path), 1);
    }

    #[tokio::test]
    async fn silent_source_times_out() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let mut cfg = config(format!("http://{addr}/data"), path.clone());
        cfg.timeout = Duration::from_millis(100);
        let mut logger = PollingLogger::new(&cfg).unwrap();

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(Duration::from_secs(5), logger.poll_once())
            .await
            .expect("request was not bounded by the client timeout");
        match result {
            Err(PollError::Transport(e)) => assert!(e.is_timeout(), "{e}"),
            other => panic!("expected a transport timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(line_count(&path), 1);
    }

    #[tokio::test]
    async fn run_keeps_going_after_failures_and_stops_on_cancel() {
        let (url, hits) = source(StatusCode::OK, "1,2,3").await;
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let logger = PollingLogger::new(&config(url, path.clone())).unwrap();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(logger.run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(150)).await;
        cancel.cancel();

        let (out, stats) = task.await.unwrap().unwrap();
        assert_eq!(out, path);
        assert!(hits.load(Ordering::SeqCst) >= 2);
        assert!(stats.malformed >= 2);
        assert_eq!(stats.logged, 0);
        assert_eq!(line_count(&path), 1);
    }

    #[tokio::test]
    async fn run_logs_every_cycle() {
        let (url, _) = source(StatusCode::OK, "5,0,0,1,1,1,0").await;
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log.csv");
        let logger = PollingLogger::new(&config(url, path.clone())).unwrap();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(logger.run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(150)).await;
        cancel.cancel();

        let (_, stats) = task.await.unwrap().unwrap();
        assert!(stats.logged >= 2);
        assert_eq!(line_count(&path), 1 + stats.logged as usize);
    }
}
