//! The delivery engine: send, classify, retry, commit.
//!
//! One call to [`DeliveryEngine::deliver`] owns a video from "should we send
//! this" through to a terminal outcome. Rate limits are handled inside the
//! call with an explicit sleep-and-retry loop bounded by the backoff policy;
//! the dedup store is consulted on every iteration and committed only after
//! a confirmed send.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::dedup::DedupStore;
use crate::types::{ChannelId, MediaRef, MessageSeq};

use super::backoff::BackoffPolicy;
use super::{SendError, VideoSender};

/// Terminal outcome of one delivery call.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The video was sent and durably recorded.
    Sent {
        /// Send attempts made, including the successful one.
        attempts: u32,
    },

    /// The video was already delivered; no network call was made.
    Duplicate,

    /// The backoff ceiling was reached while rate limited. The video is not
    /// marked delivered and remains a candidate if re-observed.
    Deferred {
        /// Send attempts made before deferring.
        attempts: u32,
        /// Total backoff spent before deferring.
        waited: Duration,
    },

    /// A non-retryable failure. The video is not marked delivered.
    Failed(SendError),
}

/// Transient per-call retry state.
#[derive(Debug)]
struct DeliveryAttempt {
    retries: u32,
    waited: Duration,
}

impl DeliveryAttempt {
    fn new() -> Self {
        DeliveryAttempt {
            retries: 0,
            waited: Duration::ZERO,
        }
    }

    /// Attempts made so far, counting the initial one.
    fn attempts(&self) -> u32 {
        self.retries + 1
    }
}

/// Drives sends to the target chat and owns the dedup store.
pub struct DeliveryEngine<S> {
    sender: S,
    store: DedupStore,
    policy: BackoffPolicy,
    target: ChannelId,
    deferrals: u64,
}

impl<S: VideoSender> DeliveryEngine<S> {
    /// Creates an engine sending through `sender` to `target`.
    pub fn new(sender: S, store: DedupStore, policy: BackoffPolicy, target: ChannelId) -> Self {
        DeliveryEngine {
            sender,
            store,
            policy,
            target,
            deferrals: 0,
        }
    }

    /// The dedup store owned by this engine.
    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// How many deliveries have been deferred at the backoff ceiling.
    pub fn deferrals(&self) -> u64 {
        self.deferrals
    }

    /// Delivers one video, retrying through rate limits.
    ///
    /// The duplicate check runs on every loop iteration, not just on entry:
    /// time passes inside the backoff sleeps, and the check must reflect the
    /// store as it is when the send would actually happen.
    pub async fn deliver(&mut self, media: &MediaRef, seq: MessageSeq) -> DeliveryOutcome {
        let mut attempt = DeliveryAttempt::new();

        loop {
            if self.store.is_processed(&media.content_key) {
                debug!(
                    content_key = %media.content_key,
                    message_id = %seq,
                    "video already delivered; skipping"
                );
                return DeliveryOutcome::Duplicate;
            }

            match self.sender.send_video(&media.transport_id).await {
                Ok(()) => {
                    self.store.mark_processed(media.content_key.clone());
                    info!(
                        content_key = %media.content_key,
                        target = %self.target,
                        message_id = %seq,
                        attempts = attempt.attempts(),
                        "video delivered"
                    );
                    sleep(self.policy.send_cooldown).await;
                    return DeliveryOutcome::Sent {
                        attempts: attempt.attempts(),
                    };
                }
                Err(err) => match err.retry_after() {
                    Some(requested) => match self.policy.next_wait(attempt.waited, requested) {
                        Some(wait) => {
                            warn!(
                                content_key = %media.content_key,
                                wait_secs = wait.as_secs_f64(),
                                retries = attempt.retries,
                                "rate limited; waiting before retry"
                            );
                            sleep(wait).await;
                            attempt.waited += wait;
                            attempt.retries += 1;
                        }
                        None => {
                            self.deferrals += 1;
                            warn!(
                                content_key = %media.content_key,
                                transport_id = %media.transport_id,
                                waited_secs = attempt.waited.as_secs_f64(),
                                deferrals = self.deferrals,
                                "backoff ceiling reached; deferring video"
                            );
                            return DeliveryOutcome::Deferred {
                                attempts: attempt.attempts(),
                                waited: attempt.waited,
                            };
                        }
                    },
                    None => {
                        error!(
                            content_key = %media.content_key,
                            transport_id = %media.transport_id,
                            target = %self.target,
                            message_id = %seq,
                            error = %err,
                            "failed to deliver video"
                        );
                        return DeliveryOutcome::Failed(err);
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use tempfile::TempDir;

    use crate::types::{ContentKey, TransportId};

    const TARGET: ChannelId = ChannelId(-2002);
    const SEQ: MessageSeq = MessageSeq(7);

    /// A sender that replays a script of outcomes and records each call.
    #[derive(Clone, Default)]
    struct ScriptedSender {
        inner: Arc<SenderInner>,
    }

    #[derive(Default)]
    struct SenderInner {
        script: Mutex<VecDeque<Result<(), SendError>>>,
        calls: Mutex<Vec<(TransportId, Instant)>>,
    }

    impl ScriptedSender {
        fn with_script(script: Vec<Result<(), SendError>>) -> Self {
            ScriptedSender {
                inner: Arc::new(SenderInner {
                    script: Mutex::new(script.into()),
                    calls: Mutex::new(Vec::new()),
                }),
            }
        }

        fn calls(&self) -> Vec<(TransportId, Instant)> {
            self.inner.calls.lock().unwrap().clone()
        }
    }

    impl VideoSender for ScriptedSender {
        fn send_video(
            &self,
            video: &TransportId,
        ) -> impl Future<Output = Result<(), SendError>> + Send {
            let inner = self.inner.clone();
            let video = video.clone();
            async move {
                inner.calls.lock().unwrap().push((video, Instant::now()));
                // Off-script calls succeed.
                inner.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
            }
        }
    }

    fn engine_with(
        sender: ScriptedSender,
        policy: BackoffPolicy,
    ) -> (DeliveryEngine<ScriptedSender>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = DedupStore::load(dir.path().join("log.txt"));
        (DeliveryEngine::new(sender, store, policy, TARGET), dir)
    }

    fn quick_policy() -> BackoffPolicy {
        BackoffPolicy::new(Duration::from_secs(5), Duration::ZERO)
    }

    fn media(transport: &str, key: &str) -> MediaRef {
        MediaRef::new(transport, key)
    }

    #[tokio::test]
    async fn successful_send_commits_dedup_record() {
        let sender = ScriptedSender::default();
        let (mut engine, _dir) = engine_with(sender.clone(), quick_policy());

        let outcome = engine.deliver(&media("t1", "k1"), SEQ).await;

        assert!(matches!(outcome, DeliveryOutcome::Sent { attempts: 1 }));
        assert!(engine.store().is_processed(&ContentKey::new("k1")));
        assert_eq!(sender.calls().len(), 1);

        let log = std::fs::read_to_string(engine.store().log_path()).unwrap();
        assert_eq!(log, "k1\n");
    }

    #[tokio::test]
    async fn duplicate_makes_no_network_call() {
        let sender = ScriptedSender::default();
        let (mut engine, _dir) = engine_with(sender.clone(), quick_policy());

        engine.deliver(&media("t1", "k1"), SEQ).await;
        let outcome = engine.deliver(&media("t1-alias", "k1"), SEQ).await;

        assert!(matches!(outcome, DeliveryOutcome::Duplicate));
        assert_eq!(sender.calls().len(), 1);
    }

    #[tokio::test]
    async fn rate_limit_retries_after_signaled_wait() {
        let wait = Duration::from_millis(50);
        let sender = ScriptedSender::with_script(vec![
            Err(SendError::rate_limited_without_source(wait)),
            Ok(()),
        ]);
        let (mut engine, _dir) = engine_with(sender.clone(), quick_policy());

        let outcome = engine.deliver(&media("t1", "k1"), SEQ).await;

        assert!(matches!(outcome, DeliveryOutcome::Sent { attempts: 2 }));

        let calls = sender.calls();
        assert_eq!(calls.len(), 2);
        assert!(
            calls[1].1.duration_since(calls[0].1) >= wait,
            "retry happened before the signaled wait elapsed"
        );

        // Exactly one durable record despite two attempts.
        let log = std::fs::read_to_string(engine.store().log_path()).unwrap();
        assert_eq!(log, "k1\n");
    }

    #[tokio::test]
    async fn non_retryable_failure_leaves_no_record() {
        let sender = ScriptedSender::with_script(vec![Err(SendError::other_without_source(
            "chat not found",
        ))]);
        let (mut engine, _dir) = engine_with(sender.clone(), quick_policy());

        let outcome = engine.deliver(&media("t1", "k1"), SEQ).await;
        assert!(matches!(outcome, DeliveryOutcome::Failed(_)));
        assert!(!engine.store().is_processed(&ContentKey::new("k1")));
        assert!(!engine.store().log_path().exists());

        // The engine stays usable for the next video.
        let outcome = engine.deliver(&media("t2", "k2"), SEQ).await;
        assert!(matches!(outcome, DeliveryOutcome::Sent { .. }));
        assert!(engine.store().is_processed(&ContentKey::new("k2")));
    }

    #[tokio::test]
    async fn backoff_ceiling_defers_instead_of_retrying() {
        let sender = ScriptedSender::with_script(vec![Err(
            SendError::rate_limited_without_source(Duration::from_secs(60)),
        )]);
        let policy = BackoffPolicy::new(Duration::from_millis(10), Duration::ZERO);
        let (mut engine, _dir) = engine_with(sender.clone(), policy);

        let outcome = engine.deliver(&media("t1", "k1"), SEQ).await;

        match outcome {
            DeliveryOutcome::Deferred { attempts, waited } => {
                assert_eq!(attempts, 1);
                assert_eq!(waited, Duration::ZERO);
            }
            other => panic!("expected Deferred, got {:?}", other),
        }
        assert_eq!(sender.calls().len(), 1);
        assert_eq!(engine.deferrals(), 1);
        assert!(!engine.store().is_processed(&ContentKey::new("k1")));
    }

    #[tokio::test]
    async fn distinct_keys_with_aliased_transport_ids_both_deliver() {
        let sender = ScriptedSender::default();
        let (mut engine, _dir) = engine_with(sender.clone(), quick_policy());

        let first = engine.deliver(&media("shared-transport", "k1"), SEQ).await;
        let second = engine.deliver(&media("shared-transport", "k2"), SEQ).await;

        assert!(matches!(first, DeliveryOutcome::Sent { .. }));
        assert!(matches!(second, DeliveryOutcome::Sent { .. }));
        assert_eq!(sender.calls().len(), 2);

        let log = std::fs::read_to_string(engine.store().log_path()).unwrap();
        assert_eq!(log, "k1\nk2\n");
    }

    #[tokio::test]
    async fn success_cooldown_elapses_before_return() {
        let cooldown = Duration::from_millis(40);
        let sender = ScriptedSender::default();
        let policy = BackoffPolicy::new(Duration::from_secs(5), cooldown);
        let (mut engine, _dir) = engine_with(sender, policy);

        let started = Instant::now();
        engine.deliver(&media("t1", "k1"), SEQ).await;
        assert!(started.elapsed() >= cooldown);
    }
}
