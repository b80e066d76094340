// Key-value collaborators used between the question and classification
// phases. The in-memory implementations back the API server and tests;
// anything durable plugs in behind the same traits.
//
// Both in-memory maps expire entries after a TTL and hold at most
// `capacity` entries, evicting the oldest first.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use siteprobe_common::{AnswerTranscript, ProbeError, QuestionSpec, Result};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_QUESTION_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_CAPACITY: usize = 10_000;

// ---------------------------------------------------------------------------
// Expiring map
// ---------------------------------------------------------------------------

struct Stamped<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

impl<T> Stamped<T> {
    fn age(&self) -> Duration {
        // Clock moving backwards counts as fresh.
        (Utc::now() - self.stored_at).to_std().unwrap_or_default()
    }
}

struct ExpiringMap<T> {
    entries: RwLock<HashMap<String, Stamped<T>>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> ExpiringMap<T> {
    fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    async fn get(&self, key: &str) -> Option<(T, Duration)> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        let age = entry.age();
        if age >= self.ttl {
            return None;
        }
        Some((entry.value.clone(), age))
    }

    async fn put(&self, key: String, value: T) {
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, e| e.age() < self.ttl);

        while entries.len() >= self.capacity && !entries.contains_key(&key) {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            entries.remove(&oldest);
        }

        let evicted = before.saturating_sub(entries.len());
        if evicted > 0 {
            debug!(evicted, remaining = entries.len(), "Evicted stale entries");
        }

        entries.insert(
            key,
            Stamped {
                value,
                stored_at: Utc::now(),
            },
        );
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a transcript. Reuses `session_id` when given, otherwise
    /// assigns a new one. Returns the id the transcript is stored under.
    async fn put(&self, transcript: AnswerTranscript, session_id: Option<String>)
        -> Result<String>;

    async fn get(&self, session_id: &str) -> Result<AnswerTranscript>;
}

pub struct InMemorySessionStore {
    sessions: ExpiringMap<AnswerTranscript>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_SESSION_TTL, DEFAULT_CAPACITY)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: ExpiringMap::new(ttl, capacity),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(
        &self,
        transcript: AnswerTranscript,
        session_id: Option<String>,
    ) -> Result<String> {
        let id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        self.sessions.put(id.clone(), transcript).await;
        Ok(id)
    }

    async fn get(&self, session_id: &str) -> Result<AnswerTranscript> {
        self.sessions
            .get(session_id)
            .await
            .map(|(transcript, _)| transcript)
            .ok_or_else(|| ProbeError::UnknownSession(session_id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// QuestionCache
// ---------------------------------------------------------------------------

#[async_trait]
pub trait QuestionCache: Send + Sync {
    async fn get(&self, url: &str) -> Result<Option<Vec<QuestionSpec>>>;
    async fn put(&self, url: &str, questions: Vec<QuestionSpec>) -> Result<()>;
}

pub struct InMemoryQuestionCache {
    entries: ExpiringMap<Vec<QuestionSpec>>,
}

impl InMemoryQuestionCache {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_QUESTION_CACHE_TTL, DEFAULT_CAPACITY)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: ExpiringMap::new(ttl, capacity),
        }
    }
}

impl Default for InMemoryQuestionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionCache for InMemoryQuestionCache {
    async fn get(&self, url: &str) -> Result<Option<Vec<QuestionSpec>>> {
        Ok(self.entries.get(url).await.map(|(questions, age)| {
            debug!(url, age_secs = age.as_secs(), "Question cache hit");
            questions
        }))
    }

    async fn put(&self, url: &str, questions: Vec<QuestionSpec>) -> Result<()> {
        self.entries.put(url.to_string(), questions).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteprobe_common::AnswerEntry;

    fn transcript(answer: &str) -> AnswerTranscript {
        vec![AnswerEntry {
            question: "Q1".into(),
            options: vec!["A. Sales".into(), "B. Support".into()],
            selected_answer: answer.into(),
        }]
    }

    #[tokio::test]
    async fn put_without_id_assigns_uuid() {
        let store = InMemorySessionStore::new();
        let id = store.put(transcript("A. Sales"), None).await.unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.get(&id).await.unwrap(), transcript("A. Sales"));
    }

    #[tokio::test]
    async fn put_with_id_overwrites() {
        let store = InMemorySessionStore::new();
        let id = store
            .put(transcript("A. Sales"), Some("visitor-1".into()))
            .await
            .unwrap();
        assert_eq!(id, "visitor-1");
        store
            .put(transcript("B. Support"), Some("visitor-1".into()))
            .await
            .unwrap();
        assert_eq!(store.get("visitor-1").await.unwrap(), transcript("B. Support"));
    }

    #[tokio::test]
    async fn unknown_session_is_reported() {
        let store = InMemorySessionStore::new();
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, ProbeError::UnknownSession(id) if id == "nope"));
    }

    #[tokio::test]
    async fn expired_session_is_unknown() {
        let store = InMemorySessionStore::with_limits(Duration::ZERO, DEFAULT_CAPACITY);
        let id = store.put(transcript("A. Sales"), None).await.unwrap();

        let err = store.get(&id).await.unwrap_err();
        assert!(matches!(err, ProbeError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped_on_put() {
        let store = InMemorySessionStore::with_limits(Duration::ZERO, DEFAULT_CAPACITY);
        for _ in 0..5 {
            store.put(transcript("A. Sales"), None).await.unwrap();
        }
        assert_eq!(store.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn full_session_store_evicts_oldest() {
        let store = InMemorySessionStore::with_limits(DEFAULT_SESSION_TTL, 2);
        for id in ["s-1", "s-2", "s-3"] {
            store
                .put(transcript("A. Sales"), Some(id.into()))
                .await
                .unwrap();
            // distinct timestamps so "oldest" is well defined
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(matches!(
            store.get("s-1").await.unwrap_err(),
            ProbeError::UnknownSession(_)
        ));
        assert!(store.get("s-2").await.is_ok());
        assert!(store.get("s-3").await.is_ok());
        assert_eq!(store.sessions.len().await, 2);
    }

    #[tokio::test]
    async fn overwriting_a_key_at_capacity_keeps_the_others() {
        let store = InMemorySessionStore::with_limits(DEFAULT_SESSION_TTL, 2);
        store.put(transcript("A"), Some("s-1".into())).await.unwrap();
        store.put(transcript("B"), Some("s-2".into())).await.unwrap();
        store.put(transcript("C"), Some("s-2".into())).await.unwrap();

        assert!(store.get("s-1").await.is_ok());
        assert_eq!(store.get("s-2").await.unwrap(), transcript("C"));
    }

    #[tokio::test]
    async fn cache_returns_latest_put() {
        let cache = InMemoryQuestionCache::new();
        assert!(cache.get("https://a.test").await.unwrap().is_none());

        cache
            .put("https://a.test", vec![QuestionSpec::placeholder()])
            .await
            .unwrap();
        let replacement = QuestionSpec::new("Q?", vec!["A. x".into()]);
        cache
            .put("https://a.test", vec![replacement.clone()])
            .await
            .unwrap();

        assert_eq!(
            cache.get("https://a.test").await.unwrap(),
            Some(vec![replacement])
        );
        assert!(cache.get("https://b.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_questions_are_a_miss() {
        let cache = InMemoryQuestionCache::with_limits(Duration::ZERO, DEFAULT_CAPACITY);
        cache
            .put("https://a.test", vec![QuestionSpec::placeholder()])
            .await
            .unwrap();

        assert!(cache.get("https://a.test").await.unwrap().is_none());
    }
}
