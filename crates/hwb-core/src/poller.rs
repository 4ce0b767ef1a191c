//! Driver loop: fetch, validate, format, notify, sleep.
//!
//! Every cycle starts fresh. Nothing is carried between cycles: the poll
//! window is recomputed from the clock and already-announced statuses are not
//! remembered, so a homework is re-announced for as long as the API keeps
//! returning it.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    api::HomeworkApi,
    config::Config,
    critical,
    errors::Error,
    messaging::port::MessagingPort,
    notifier::send_message,
    status::parse_status,
    validation::check_response,
    Result,
};

/// Outcome of one successful cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub from_date: i64,
    pub homeworks: usize,
    pub delivered: usize,
}

pub struct Poller {
    cfg: Arc<Config>,
    api: Arc<dyn HomeworkApi>,
    messenger: Arc<dyn MessagingPort>,
}

/// Earliest update time of interest for a cycle started at `now`.
pub fn poll_window(now: i64, cfg: &Config) -> i64 {
    let period = i64::try_from(cfg.retry_period.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(period)
}

impl Poller {
    pub fn new(
        cfg: Arc<Config>,
        api: Arc<dyn HomeworkApi>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            cfg,
            api,
            messenger,
        }
    }

    /// Run one cycle as of the Unix time `now`.
    ///
    /// The first record that cannot be formatted aborts the cycle; records
    /// before it have already been sent.
    pub async fn run_cycle(&self, now: i64) -> Result<CycleReport> {
        let from_date = poll_window(now, &self.cfg);
        tracing::debug!("Requesting homework statuses since {from_date}");

        let response = self.api.homework_statuses(from_date).await?;
        let homeworks = check_response(response.as_ref())?;

        let mut report = CycleReport {
            from_date,
            homeworks: homeworks.len(),
            delivered: 0,
        };
        if homeworks.is_empty() {
            tracing::debug!("No homework status updates");
            return Ok(report);
        }

        for homework in homeworks {
            let text = parse_status(homework)?;
            if send_message(self.messenger.as_ref(), &self.cfg.telegram_chat_id, &text).await {
                report.delivered += 1;
            }
        }

        Ok(report)
    }

    /// Poll until `shutdown` fires or a fatal error occurs.
    ///
    /// Cancellation is only observed between cycles, during the sleep.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(
            "Polling {} every {}s",
            self.cfg.endpoint,
            self.cfg.retry_period.as_secs()
        );

        loop {
            match self.run_cycle(Utc::now().timestamp()).await {
                Ok(report) => tracing::debug!(
                    "Cycle done: {} homework(s), {} delivered",
                    report.homeworks,
                    report.delivered
                ),
                Err(e) => handle_cycle_error(e)?,
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested, stopping");
                    return Ok(());
                }
                _ = sleep(self.cfg.retry_period) => {}
            }
        }
    }
}

/// Apply the failure policy: only fatal errors stop the loop, everything else
/// is logged and the next cycle starts fresh.
fn handle_cycle_error(e: Error) -> Result<()> {
    if e.is_fatal() {
        critical!("Program stopped: {e}");
        return Err(e);
    }
    tracing::error!("Program failure: {e}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatId, MessageId, MessageRef},
        errors::{ErrorKind, ShapeError, StatusError},
        status::HomeworkStatus,
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeApi {
        responses: Mutex<VecDeque<Result<Option<Value>>>>,
        calls: Mutex<Vec<i64>>,
    }

    impl FakeApi {
        fn with(responses: Vec<Result<Option<Value>>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<i64> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HomeworkApi for FakeApi {
        async fn homework_statuses(&self, from_date: i64) -> Result<Option<Value>> {
            self.calls.lock().unwrap().push(from_date);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Some(json!({"homeworks": []}))))
        }
    }

    #[derive(Default)]
    struct FakeMessenger {
        sends: Mutex<Vec<(ChatId, String)>>,
        fail: bool,
        cancel_on_send: Option<CancellationToken>,
    }

    impl FakeMessenger {
        fn sent(&self) -> Vec<String> {
            self.sends
                .lock()
                .unwrap()
                .iter()
                .map(|(_, text)| text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<MessageRef> {
            self.sends
                .lock()
                .unwrap()
                .push((chat_id.clone(), text.to_string()));
            if let Some(tok) = &self.cancel_on_send {
                tok.cancel();
            }
            if self.fail {
                return Err(Error::Notify("bot was blocked by the user".to_string()));
            }
            Ok(MessageRef {
                chat_id: chat_id.clone(),
                message_id: MessageId(1),
            })
        }
    }

    fn test_config(retry_period: Duration) -> Arc<Config> {
        Arc::new(Config {
            practicum_token: "p".to_string(),
            telegram_token: "t".to_string(),
            telegram_chat_id: ChatId("42".to_string()),
            endpoint: "http://127.0.0.1:9/api/".to_string(),
            retry_period,
            http_timeout: None,
        })
    }

    fn poller(api: Arc<FakeApi>, messenger: Arc<FakeMessenger>) -> Poller {
        Poller::new(test_config(Duration::from_secs(600)), api, messenger)
    }

    fn protocol_error() -> Error {
        Error::Protocol {
            endpoint: "http://127.0.0.1:9/api/".to_string(),
            status: 503,
        }
    }

    #[tokio::test]
    async fn window_is_now_minus_retry_period() {
        let api = Arc::new(FakeApi::default());
        let p = poller(api.clone(), Arc::new(FakeMessenger::default()));

        let report = p.run_cycle(1_700_000_600).await.unwrap();
        assert_eq!(report.from_date, 1_700_000_000);
        p.run_cycle(1_700_001_000).await.unwrap();
        assert_eq!(api.calls(), vec![1_700_000_000, 1_700_000_400]);
    }

    #[tokio::test]
    async fn empty_homeworks_send_nothing() {
        let api = Arc::new(FakeApi::with(vec![Ok(Some(json!({"homeworks": []})))]));
        let messenger = Arc::new(FakeMessenger::default());
        let report = poller(api, messenger.clone()).run_cycle(1_000).await.unwrap();

        assert_eq!(report.homeworks, 0);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn approved_homework_sends_one_message() {
        let api = Arc::new(FakeApi::with(vec![Ok(Some(json!({
            "homeworks": [{"status": "approved", "homework_name": "hw1"}]
        })))]));
        let messenger = Arc::new(FakeMessenger::default());
        let report = poller(api, messenger.clone()).run_cycle(1_000).await.unwrap();

        assert_eq!(report.delivered, 1);
        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("hw1"));
        assert!(sent[0].contains(HomeworkStatus::Approved.verdict()));
        assert_eq!(messenger.sends.lock().unwrap()[0].0, ChatId("42".to_string()));
    }

    #[tokio::test]
    async fn unknown_status_aborts_cycle_without_sending() {
        let api = Arc::new(FakeApi::with(vec![Ok(Some(json!({
            "homeworks": [{"status": "unknown", "homework_name": "hw2"}]
        })))]));
        let messenger = Arc::new(FakeMessenger::default());
        let err = poller(api, messenger.clone())
            .run_cycle(1_000)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Status(StatusError::UnknownStatus(Some(ref s))) if s == "unknown"
        ));
        assert!(messenger.sent().is_empty());
        assert!(handle_cycle_error(err).is_ok());
    }

    #[tokio::test]
    async fn records_before_a_bad_one_are_still_sent() {
        let api = Arc::new(FakeApi::with(vec![Ok(Some(json!({"homeworks": [
            {"status": "reviewing", "homework_name": "hw1"},
            {"status": "approved"},
            {"status": "rejected", "homework_name": "hw3"}
        ]})))]));
        let messenger = Arc::new(FakeMessenger::default());
        let err = poller(api, messenger.clone())
            .run_cycle(1_000)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Status(StatusError::MissingHomeworkName)));
        assert_eq!(messenger.sent().len(), 1);
        assert!(messenger.sent()[0].contains("hw1"));
    }

    #[tokio::test]
    async fn absent_answer_is_an_empty_payload() {
        let api = Arc::new(FakeApi::with(vec![Ok(None)]));
        let err = poller(api, Arc::new(FakeMessenger::default()))
            .run_cycle(1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Shape(ShapeError::EmptyPayload)));
    }

    #[tokio::test]
    async fn protocol_error_propagates_out_of_cycle() {
        let api = Arc::new(FakeApi::with(vec![Err(protocol_error())]));
        let messenger = Arc::new(FakeMessenger::default());
        let err = poller(api, messenger.clone())
            .run_cycle(1_000)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_send_does_not_fail_the_cycle() {
        let api = Arc::new(FakeApi::with(vec![Ok(Some(json!({"homeworks": [
            {"status": "approved", "homework_name": "hw1"},
            {"status": "rejected", "homework_name": "hw2"}
        ]})))]));
        let messenger = Arc::new(FakeMessenger {
            fail: true,
            ..Default::default()
        });
        let report = poller(api, messenger.clone()).run_cycle(1_000).await.unwrap();

        assert_eq!(report.homeworks, 2);
        assert_eq!(report.delivered, 0);
        assert_eq!(messenger.sent().len(), 2);
    }

    #[tokio::test]
    async fn loop_recovers_after_a_failed_cycle() {
        let shutdown = CancellationToken::new();
        let api = Arc::new(FakeApi::with(vec![
            Err(protocol_error()),
            Ok(Some(json!({
                "homeworks": [{"status": "approved", "homework_name": "hw1"}]
            }))),
        ]));
        let messenger = Arc::new(FakeMessenger {
            cancel_on_send: Some(shutdown.clone()),
            ..Default::default()
        });
        let p = Poller::new(
            test_config(Duration::from_millis(1)),
            api.clone(),
            messenger.clone(),
        );

        p.run(shutdown).await.unwrap();

        assert_eq!(api.calls().len(), 2);
        assert_eq!(messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_loop_stops_after_current_cycle() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let api = Arc::new(FakeApi::default());
        let p = poller(api.clone(), Arc::new(FakeMessenger::default()));

        p.run(shutdown).await.unwrap();
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn failed_cycle_is_logged_as_program_failure() {
        let mut outcome = None;
        let out = crate::logging::capture_logs(|| {
            outcome = Some(handle_cycle_error(
                StatusError::UnknownStatus(Some("unknown".to_string())).into(),
            ));
        });
        assert!(matches!(outcome, Some(Ok(()))));
        assert!(out.contains(", ERROR, Program failure: "), "{out}");
        assert!(out.contains("unknown"), "{out}");
    }

    #[test]
    fn fatal_error_is_logged_as_critical() {
        let mut outcome = None;
        let out = crate::logging::capture_logs(|| {
            outcome = Some(handle_cycle_error(Error::Config("x".to_string())));
        });
        assert!(matches!(outcome, Some(Err(Error::Config(_)))));
        assert!(out.contains(", CRITICAL, Program stopped: "), "{out}");
    }

    #[test]
    fn unknown_status_cycle_logs_an_error() {
        let api = Arc::new(FakeApi::with(vec![Ok(Some(json!({
            "homeworks": [{"status": "unknown", "homework_name": "hw2"}]
        })))]));
        let p = poller(api, Arc::new(FakeMessenger::default()));
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let out = crate::logging::capture_logs(|| {
            if let Err(e) = rt.block_on(p.run_cycle(1_000)) {
                handle_cycle_error(e).unwrap();
            }
        });
        assert!(out.contains(", ERROR, Program failure: "), "{out}");
        assert!(out.contains("unknown homework status: unknown"), "{out}");
    }

    #[test]
    fn only_config_level_errors_stop_the_loop() {
        assert!(handle_cycle_error(Error::Config("x".to_string())).is_err());
        assert!(handle_cycle_error(protocol_error()).is_ok());
        assert!(handle_cycle_error(ShapeError::MissingKey.into()).is_ok());
        assert!(handle_cycle_error(Error::Transport("reset".to_string())).is_ok());
    }
}
