//! Context assembly — bounded-time, partial-failure-tolerant composition
//! of three independent signal sources.
//!
//! # Failure policy
//!
//! Thread history and semantic search are mandatory: if either fails,
//! the whole build fails typed and no partial packet escapes. The
//! environment snapshot is best-effort context, not causal to the
//! prompt's usefulness, so its failure degrades to an empty snapshot.
//!
//! # Timeout
//!
//! One wall-clock deadline bounds the entire parallel fetch — a race
//! between "all fetches complete" and "deadline elapsed", not a
//! per-source timeout. Fetches still in flight at the deadline are
//! abandoned; no stale result is returned after it.

use crate::packet::{ContextPacket, PacketMeta, SalienceWeights};
use chrono::Utc;
use reverie_config::ContextConfig;
use reverie_core::environment::{EnvironmentSnapshot, EnvironmentSource};
use reverie_core::error::ContextError;
use reverie_core::fragment::{MemoryFragment, VectorStore};
use reverie_core::message::{ConversationMessage, Role, ThreadId, ThreadStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The context assembler. Stateless between calls — concurrent
/// `build_context` invocations are independent.
pub struct ContextAssembler {
    threads: Arc<dyn ThreadStore>,
    vectors: Arc<dyn VectorStore>,
    environment: Arc<dyn EnvironmentSource>,
    config: ContextConfig,
}

impl ContextAssembler {
    /// Create an assembler over its three collaborators.
    pub fn new(
        threads: Arc<dyn ThreadStore>,
        vectors: Arc<dyn VectorStore>,
        environment: Arc<dyn EnvironmentSource>,
        config: ContextConfig,
    ) -> Self {
        Self {
            threads,
            vectors,
            environment,
            config,
        }
    }

    /// Build one context packet for a query against a thread.
    ///
    /// The three fetches run concurrently under a single deadline of
    /// `config.timeout_secs`.
    pub async fn build_context(
        &self,
        query: &str,
        thread: &ThreadId,
    ) -> Result<ContextPacket, ContextError> {
        let started = Instant::now();
        let deadline = Duration::from_secs_f64(self.config.timeout_secs);

        let fetches = async {
            tokio::try_join!(
                self.fetch_history(thread),
                self.fetch_fragments(query),
                self.fetch_environment(),
            )
        };

        let (messages, fragments, environment) = tokio::time::timeout(deadline, fetches)
            .await
            .map_err(|_| ContextError::Timeout {
                timeout_secs: self.config.timeout_secs,
            })??;

        let build_secs = started.elapsed().as_secs_f64();
        debug!(
            thread = %thread,
            messages = messages.len(),
            fragments = fragments.len(),
            has_environment = environment.has_data(),
            build_secs,
            "context packet assembled"
        );

        Ok(ContextPacket {
            messages,
            fragments,
            environment,
            built_at: Utc::now(),
            meta: PacketMeta {
                build_secs,
                weights: SalienceWeights::default(),
            },
        })
    }

    /// Mandatory fetch: recent thread history, most-recent-last.
    async fn fetch_history(
        &self,
        thread: &ThreadId,
    ) -> Result<Vec<ConversationMessage>, ContextError> {
        let mut messages = self
            .threads
            .fetch_recent(thread, self.config.max_recent_messages)
            .await
            .map_err(|e| ContextError::ThreadStorageUnavailable(e.to_string()))?;

        if !self.config.include_system_messages {
            messages.retain(|m| m.role != Role::System);
        }
        Ok(messages)
    }

    /// Mandatory fetch: semantic search, most-similar-first.
    async fn fetch_fragments(&self, query: &str) -> Result<Vec<MemoryFragment>, ContextError> {
        self.vectors
            .search(
                query,
                self.config.max_semantic_memories,
                self.config.semantic_similarity_threshold,
            )
            .await
            .map_err(|e| ContextError::VectorStoreUnavailable(e.to_string()))
    }

    /// Best-effort fetch: environment snapshot. Never fails — config may
    /// skip the source entirely, and source errors degrade to an empty
    /// snapshot.
    async fn fetch_environment(&self) -> Result<EnvironmentSnapshot, ContextError> {
        if !self.config.include_sensor_data {
            return Ok(EnvironmentSnapshot::empty());
        }

        match self.environment.current_snapshot().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(
                    source = self.environment.name(),
                    error = %e,
                    "environment snapshot failed, continuing without sensor data"
                );
                Ok(EnvironmentSnapshot::empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reverie_core::environment::Activity;
    use reverie_core::error::{SensorError, StoreError};
    use reverie_core::fragment::{FragmentMeta, FragmentSource};
    use std::sync::atomic::{AtomicBool, Ordering};

    // ── Mock collaborators ─────────────────────────────────────────────

    struct MockThreadStore {
        messages: Vec<ConversationMessage>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MockThreadStore {
        fn with_messages(messages: Vec<ConversationMessage>) -> Self {
            Self {
                messages,
                fail: false,
                delay: None,
            }
        }

        fn failing() -> Self {
            Self {
                messages: vec![],
                fail: true,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl ThreadStore for MockThreadStore {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch_recent(
            &self,
            _thread: &ThreadId,
            limit: usize,
        ) -> Result<Vec<ConversationMessage>, StoreError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(StoreError::Unavailable("thread db offline".into()));
            }
            let start = self.messages.len().saturating_sub(limit);
            Ok(self.messages[start..].to_vec())
        }

        async fn append(
            &self,
            _thread: &ThreadId,
            _message: ConversationMessage,
        ) -> Result<String, StoreError> {
            unimplemented!("not used by assembler tests")
        }

        async fn delete_thread(&self, _thread: &ThreadId) -> Result<bool, StoreError> {
            unimplemented!("not used by assembler tests")
        }

        async fn count(&self, _thread: &ThreadId) -> Result<usize, StoreError> {
            Ok(self.messages.len())
        }
    }

    struct MockVectorStore {
        fragments: Vec<MemoryFragment>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MockVectorStore {
        fn with_fragments(fragments: Vec<MemoryFragment>) -> Self {
            Self {
                fragments,
                fail: false,
                delay: None,
            }
        }

        fn failing() -> Self {
            Self {
                fragments: vec![],
                fail: true,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl VectorStore for MockVectorStore {
        fn name(&self) -> &str {
            "mock"
        }

        async fn search(
            &self,
            _query: &str,
            limit: usize,
            _min_similarity: f32,
        ) -> Result<Vec<MemoryFragment>, StoreError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(StoreError::Unavailable("vector index offline".into()));
            }
            Ok(self.fragments.iter().take(limit).cloned().collect())
        }

        async fn store(&self, _fragment: MemoryFragment) -> Result<String, StoreError> {
            unimplemented!("not used by assembler tests")
        }

        async fn delete(&self, _id: &str) -> Result<bool, StoreError> {
            unimplemented!("not used by assembler tests")
        }

        async fn count(&self) -> Result<usize, StoreError> {
            Ok(self.fragments.len())
        }
    }

    struct MockEnvironment {
        fail: bool,
        called: AtomicBool,
    }

    impl MockEnvironment {
        fn ok() -> Self {
            Self {
                fail: false,
                called: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl EnvironmentSource for MockEnvironment {
        fn name(&self) -> &str {
            "mock"
        }

        async fn current_snapshot(&self) -> Result<EnvironmentSnapshot, SensorError> {
            self.called.store(true, Ordering::SeqCst);
            if self.fail {
                return Err(SensorError::Unavailable("sensors offline".into()));
            }
            let mut snapshot = EnvironmentSnapshot::empty();
            snapshot.activity = Some(Activity::Walking);
            Ok(snapshot)
        }

        async fn start_monitoring(&self) -> Result<(), SensorError> {
            Ok(())
        }

        async fn stop_monitoring(&self) -> Result<(), SensorError> {
            Ok(())
        }
    }

    fn fragment(content: &str, score: f32) -> MemoryFragment {
        MemoryFragment {
            id: content.into(),
            content: content.into(),
            embedding: vec![],
            created_at: Utc::now(),
            source: FragmentSource::Conversation,
            meta: FragmentMeta::default(),
            score,
        }
    }

    fn assembler(
        threads: MockThreadStore,
        vectors: MockVectorStore,
        environment: MockEnvironment,
        config: ContextConfig,
    ) -> ContextAssembler {
        ContextAssembler::new(
            Arc::new(threads),
            Arc::new(vectors),
            Arc::new(environment),
            config,
        )
    }

    // ── Tests ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn happy_path_builds_full_packet() {
        let asm = assembler(
            MockThreadStore::with_messages(vec![
                ConversationMessage::user("earlier"),
                ConversationMessage::assistant("latest"),
            ]),
            MockVectorStore::with_fragments(vec![fragment("best", 0.9), fragment("next", 0.7)]),
            MockEnvironment::ok(),
            ContextConfig::default(),
        );

        let packet = asm
            .build_context("what happened", &ThreadId::from("t1"))
            .await
            .unwrap();

        assert_eq!(packet.messages.len(), 2);
        assert_eq!(packet.messages.last().unwrap().content, "latest");
        assert_eq!(packet.fragments[0].content, "best");
        assert!(packet.environment.has_data());
        assert_eq!(packet.meta.weights, SalienceWeights::default());
    }

    #[tokio::test]
    async fn thread_store_failure_is_fatal() {
        let asm = assembler(
            MockThreadStore::failing(),
            MockVectorStore::with_fragments(vec![fragment("ok", 0.9)]),
            MockEnvironment::ok(),
            ContextConfig::default(),
        );

        let err = asm
            .build_context("q", &ThreadId::from("t1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::ThreadStorageUnavailable(_)));
    }

    #[tokio::test]
    async fn vector_store_failure_is_fatal() {
        let asm = assembler(
            MockThreadStore::with_messages(vec![ConversationMessage::user("hi")]),
            MockVectorStore::failing(),
            MockEnvironment::ok(),
            ContextConfig::default(),
        );

        let err = asm
            .build_context("q", &ThreadId::from("t1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::VectorStoreUnavailable(_)));
    }

    #[tokio::test]
    async fn sensor_failure_degrades_to_empty_snapshot() {
        let asm = assembler(
            MockThreadStore::with_messages(vec![ConversationMessage::user("hi")]),
            MockVectorStore::with_fragments(vec![]),
            MockEnvironment::failing(),
            ContextConfig::default(),
        );

        let packet = asm.build_context("q", &ThreadId::from("t1")).await.unwrap();
        assert!(!packet.environment.has_data());
        assert_eq!(packet.messages.len(), 1);
    }

    #[tokio::test]
    async fn sensor_skipped_when_disabled() {
        let environment = Arc::new(MockEnvironment::ok());
        let asm = ContextAssembler::new(
            Arc::new(MockThreadStore::with_messages(vec![])),
            Arc::new(MockVectorStore::with_fragments(vec![])),
            environment.clone(),
            ContextConfig {
                include_sensor_data: false,
                ..Default::default()
            },
        );

        let packet = asm.build_context("q", &ThreadId::from("t1")).await.unwrap();
        assert!(!packet.environment.has_data());
        assert!(!environment.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn system_messages_filtered_by_default() {
        let messages = vec![
            ConversationMessage::system("be terse"),
            ConversationMessage::user("hi"),
            ConversationMessage::assistant("hello"),
        ];
        let asm = assembler(
            MockThreadStore::with_messages(messages.clone()),
            MockVectorStore::with_fragments(vec![]),
            MockEnvironment::ok(),
            ContextConfig::default(),
        );

        let packet = asm.build_context("q", &ThreadId::from("t1")).await.unwrap();
        assert_eq!(packet.messages.len(), 2);
        assert!(packet.messages.iter().all(|m| m.role != Role::System));

        // And kept when configured in
        let asm = assembler(
            MockThreadStore::with_messages(messages),
            MockVectorStore::with_fragments(vec![]),
            MockEnvironment::ok(),
            ContextConfig {
                include_system_messages: true,
                ..Default::default()
            },
        );
        let packet = asm.build_context("q", &ThreadId::from("t1")).await.unwrap();
        assert_eq!(packet.messages.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_mandatory_fetch_times_out() {
        let mut threads = MockThreadStore::with_messages(vec![]);
        threads.delay = Some(Duration::from_secs(60));

        let asm = assembler(
            threads,
            MockVectorStore::with_fragments(vec![]),
            MockEnvironment::ok(),
            ContextConfig {
                timeout_secs: 0.5,
                ..Default::default()
            },
        );

        let started = tokio::time::Instant::now();
        let err = asm
            .build_context("q", &ThreadId::from("t1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ContextError::Timeout { .. }));
        // Deadline fired promptly, not after the 60s fetch finished
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sensor_also_bounded_by_deadline() {
        struct SlowEnvironment;

        #[async_trait]
        impl EnvironmentSource for SlowEnvironment {
            fn name(&self) -> &str {
                "slow"
            }

            async fn current_snapshot(&self) -> Result<EnvironmentSnapshot, SensorError> {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(EnvironmentSnapshot::empty())
            }

            async fn start_monitoring(&self) -> Result<(), SensorError> {
                Ok(())
            }

            async fn stop_monitoring(&self) -> Result<(), SensorError> {
                Ok(())
            }
        }

        let asm = ContextAssembler::new(
            Arc::new(MockThreadStore::with_messages(vec![])),
            Arc::new(MockVectorStore::with_fragments(vec![])),
            Arc::new(SlowEnvironment),
            ContextConfig {
                timeout_secs: 0.5,
                ..Default::default()
            },
        );

        let err = asm
            .build_context("q", &ThreadId::from("t1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::Timeout { .. }));
    }

    #[tokio::test]
    async fn recent_message_limit_applied() {
        let messages: Vec<_> = (0..10)
            .map(|i| ConversationMessage::user(format!("msg {i}")))
            .collect();
        let asm = assembler(
            MockThreadStore::with_messages(messages),
            MockVectorStore::with_fragments(vec![]),
            MockEnvironment::ok(),
            ContextConfig {
                max_recent_messages: 3,
                ..Default::default()
            },
        );

        let packet = asm.build_context("q", &ThreadId::from("t1")).await.unwrap();
        assert_eq!(packet.messages.len(), 3);
        assert_eq!(packet.messages.last().unwrap().content, "msg 9");
    }
}
