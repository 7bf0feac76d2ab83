//! Fixed-cadence fetch → decide → notify loop.
//!
//! The loop owns the [`StateTracker`] outright, and a cycle runs to
//! completion before the next tick is awaited, so tracked state never needs
//! a lock. No failure inside a cycle ends the loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::announce::StateTracker;
use crate::feed::{FetchError, SnapshotFetcher};
use crate::notify::{Notifier, NotifyError};

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("fetch from '{source_name}' failed: {error}")]
    Fetch {
        source_name: String,
        #[source]
        error: FetchError,
    },

    #[error("announcing via '{sink}' failed: {error}")]
    Notify {
        sink: String,
        #[source]
        error: NotifyError,
    },
}

impl CycleError {
    fn is_idle(&self) -> bool {
        matches!(self, CycleError::Fetch { error, .. } if error.is_idle())
    }
}

/// What a completed cycle did. Notify failures don't abort the cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub announced: usize,
    pub failed: Vec<CycleError>,
}

pub struct PollLoop {
    fetcher: Arc<dyn SnapshotFetcher>,
    notifier: Arc<dyn Notifier>,
    tracker: StateTracker,
    interval: Duration,
}

impl PollLoop {
    pub fn new(
        fetcher: Arc<dyn SnapshotFetcher>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        PollLoop {
            fetcher,
            notifier,
            tracker: StateTracker::new(),
            interval,
        }
    }

    /// Poll until `shutdown` resolves. In-flight I/O is abandoned on shutdown.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Poll loop started (feed={}, notifier={}, interval={:?})",
            self.fetcher.name(),
            self.notifier.name(),
            self.interval
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping poll loop");
                    break;
                }
                _ = interval.tick() => {
                    match self.cycle().await {
                        Ok(report) => {
                            if report.announced > 0 {
                                debug!("Cycle sent {} announcement(s)", report.announced);
                            }
                            for err in &report.failed {
                                warn!("{}", err);
                            }
                        }
                        Err(err) if err.is_idle() => debug!("No live match: {}", err),
                        Err(err) => warn!("Cycle skipped: {}", err),
                    }
                }
            }
        }
    }

    /// One fetch → decide → notify pass.
    ///
    /// A fetch failure returns `Err` before tracked state is touched. Once a
    /// snapshot is in hand the state update stands whether or not the sends
    /// succeed.
    pub async fn cycle(&mut self) -> Result<CycleReport, CycleError> {
        let snapshot = self
            .fetcher
            .fetch_snapshot()
            .await
            .map_err(|error| CycleError::Fetch {
                source_name: self.fetcher.name().to_string(),
                error,
            })?;

        let announcements = self.tracker.process(&snapshot);

        let mut report = CycleReport::default();
        for ann in announcements {
            match self.notifier.send(&ann.text).await {
                Ok(()) => {
                    info!("Announced {}: {}", ann.kind, ann.text);
                    report.announced += 1;
                }
                Err(error) => report.failed.push(CycleError::Notify {
                    sink: self.notifier.name().to_string(),
                    error,
                }),
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Snapshot;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a scripted sequence of fetch results, then reports 404.
    struct ScriptedFetcher {
        script: Mutex<VecDeque<Result<Snapshot, FetchError>>>,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<Result<Snapshot, FetchError>>) -> Arc<Self> {
            Arc::new(ScriptedFetcher {
                script: Mutex::new(script.into()),
            })
        }
    }

    #[async_trait]
    impl SnapshotFetcher for ScriptedFetcher {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Closed);
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn snap(map: &str, left: &str, right: &str) -> Snapshot {
        Snapshot {
            match_id: Some("1".into()),
            map_number: Some(map.into()),
            team_name1: Some("Cloud9".into()),
            team_name2: Some("Eternal Fire".into()),
            score_left: Some(left.into()),
            score_right: Some(right.into()),
            map_count1: Some(0),
            map_count2: Some(0),
            match_format: Some("BO3".into()),
            ..Default::default()
        }
    }

    fn poll(fetcher: Arc<ScriptedFetcher>, notifier: Arc<RecordingNotifier>) -> PollLoop {
        PollLoop::new(fetcher, notifier, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_server_error_skips_cycle_without_touching_state() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(snap("1", "0", "0")),
            Err(FetchError::Status(500)),
            Ok(snap("1", "1", "0")),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poll = poll(fetcher, notifier.clone());

        assert_eq!(poll.cycle().await.unwrap().announced, 0);
        let before = poll.tracker.state().clone();

        let err = poll.cycle().await.unwrap_err();
        assert!(matches!(
            err,
            CycleError::Fetch {
                error: FetchError::Status(500),
                ..
            }
        ));
        assert_eq!(poll.tracker.state().identity, before.identity);
        assert_eq!(poll.tracker.state().last_signature, before.last_signature);

        assert_eq!(poll.cycle().await.unwrap().announced, 1);
        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec!["| (0) Cloud9 1:0 Eternal Fire (0) | map1 | bo3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_send_still_advances_state() {
        let fetcher = ScriptedFetcher::new(vec![Ok(snap("1", "5", "2")), Ok(snap("1", "5", "2"))]);
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let mut poll = poll(fetcher, notifier);

        let report = poll.cycle().await.unwrap();
        assert_eq!(report.announced, 0);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0],
            CycleError::Notify {
                error: NotifyError::Closed,
                ..
            }
        ));

        // Not retried on the next cycle.
        let report = poll.cycle().await.unwrap();
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_map_transition_and_win_sequence() {
        let mut won = snap("1", "13", "7");
        won.win_team = Some("Cloud9".into());
        won.win_type = Some("Map".into());
        let mut cleared = won.clone();
        cleared.win_team = Some(" ".into());

        let fetcher = ScriptedFetcher::new(vec![
            Ok(snap("1", "12", "7")),
            Ok(won.clone()),
            Ok(won.clone()),
            Ok(cleared),
            Ok(won),
            Ok(snap("2", "13", "7")),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poll = poll(fetcher, notifier.clone());
        for _ in 0..6 {
            poll.cycle().await.unwrap();
        }

        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec![
                "| (0) Cloud9 12:7 Eternal Fire (0) | map1 | bo3".to_string(),
                "| (0) Cloud9 13:7 Eternal Fire (0) | map1 | bo3".to_string(),
                "🏆 Cloud9 wins Map! ".to_string(),
                "🏆 Cloud9 wins Map! ".to_string(),
                "| (0) Cloud9 13:7 Eternal Fire (0) | map2 | bo3".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_keeps_polling_after_failures() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::NotAnObject),
            Err(FetchError::Status(502)),
            Ok(snap("1", "3", "3")),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        let poll = PollLoop::new(fetcher, notifier.clone(), Duration::from_secs(10));

        poll.run_until(tokio::time::sleep(Duration::from_secs(25)))
            .await;

        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec!["| (0) Cloud9 3:3 Eternal Fire (0) | map1 | bo3".to_string()]
        );
    }
}
