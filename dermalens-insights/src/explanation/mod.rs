//! Explanation Coordinator
//!
//! Wraps the text generator with a TTL cache, single-flight generation and a
//! template fallback.
//!
//! # Per-key lifecycle
//! `Absent → Generating → Cached → Expired → Generating → Cached → …`
//!
//! # Coordination
//! - Live cache entries are returned from a shared read lock without waiting.
//! - Misses take one coordinator-wide generation lock, re-check the cache,
//!   and only then run the generator. At most one generation runs at a time,
//!   and callers that queued behind it observe its result.
//! - Generator errors, panics and empty output are replaced by
//!   [`template::render`]; the result is cached either way, flagged with
//!   `is_generator_backed`.
//! - Expiry compares entry age with the TTL using the injected [`Clock`].

pub mod generator;
pub mod prompt;
pub mod template;

pub use generator::{DisabledGenerator, GenerationError, TextGenerator};

use crate::scorer::Recommendation;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dermalens_common::config::ExplanationConfig;
use dermalens_common::{Assessment, Clock, SystemClock};
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Cache identity: one explanation per assessment and catalog item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExplanationKey {
    pub assessment_id: Uuid,
    pub item_id: String,
}

impl ExplanationKey {
    pub fn new(assessment_id: Uuid, item_id: impl Into<String>) -> Self {
        Self {
            assessment_id,
            item_id: item_id.into(),
        }
    }

    pub fn for_recommendation(assessment_id: Uuid, recommendation: &Recommendation) -> Self {
        Self::new(assessment_id, recommendation.item.id.clone())
    }
}

/// Cached explanation text with provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedExplanation {
    pub key: ExplanationKey,
    pub text: String,
    pub generated_at: DateTime<Utc>,
    /// False when the text came from the template fallback
    pub is_generator_backed: bool,
}

/// Counters for cache behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub generations: u64,
    pub fallbacks: u64,
    /// Deadline-bounded requests answered with the template
    pub timeouts: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    generations: AtomicU64,
    fallbacks: AtomicU64,
    timeouts: AtomicU64,
}

/// Single-flight explanation cache
pub struct ExplanationCoordinator {
    entries: RwLock<HashMap<ExplanationKey, Arc<CachedExplanation>>>,
    generation: Mutex<()>,
    clock: Arc<dyn Clock>,
    ttl: ChronoDuration,
    counters: Counters,
}

impl ExplanationCoordinator {
    /// Default time-to-live for cached explanations
    pub const DEFAULT_TTL_DAYS: i64 = 7;

    /// Coordinator on the system clock with the default TTL
    pub fn new() -> Self {
        Self::with_clock(
            Arc::new(SystemClock),
            ChronoDuration::days(Self::DEFAULT_TTL_DAYS),
        )
    }

    pub fn with_clock(clock: Arc<dyn Clock>, ttl: ChronoDuration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generation: Mutex::new(()),
            clock,
            ttl,
            counters: Counters::default(),
        }
    }

    pub fn from_config(config: &ExplanationConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(clock, config.ttl())
    }

    pub fn ttl(&self) -> ChronoDuration {
        self.ttl
    }

    fn is_expired(&self, entry: &CachedExplanation, now: DateTime<Utc>) -> bool {
        now - entry.generated_at >= self.ttl
    }

    /// Live (non-expired) entry for `key`, without waiting on generation
    pub fn lookup(&self, key: &ExplanationKey) -> Option<Arc<CachedExplanation>> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| !self.is_expired(entry, now))
            .cloned()
    }

    /// Explanation text for `recommendation`, generating it at most once
    ///
    /// `generate` runs only on a miss, under the generation lock. Its errors
    /// and panics are converted into the template fallback; this call never
    /// fails.
    pub async fn get_explanation<F, Fut>(
        &self,
        key: ExplanationKey,
        recommendation: &Recommendation,
        generate: F,
    ) -> String
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, GenerationError>>,
    {
        self.resolve(key, recommendation, generate).await.text.clone()
    }

    /// Like [`get_explanation`](Self::get_explanation) but returns the cache
    /// entry, exposing provenance and timestamp
    pub async fn resolve<F, Fut>(
        &self,
        key: ExplanationKey,
        recommendation: &Recommendation,
        generate: F,
    ) -> Arc<CachedExplanation>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, GenerationError>>,
    {
        if let Some(entry) = self.lookup(&key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return entry;
        }

        let _guard = self.generation.lock().await;

        // Another caller may have filled the entry while we waited
        if let Some(entry) = self.lookup(&key) {
            debug!(item_id = %key.item_id, "Explanation populated while waiting for generation");
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return entry;
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let outcome = AssertUnwindSafe(async { generate().await })
            .catch_unwind()
            .await
            .unwrap_or(Err(GenerationError::Panicked))
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(GenerationError::Empty)
                } else {
                    Ok(text)
                }
            });

        let (text, is_generator_backed) = match outcome {
            Ok(text) => {
                self.counters.generations.fetch_add(1, Ordering::Relaxed);
                (text, true)
            }
            Err(GenerationError::Disabled) => {
                debug!(item_id = %key.item_id, "Text generation disabled, using template");
                self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
                (template::render(recommendation), false)
            }
            Err(e) => {
                warn!(
                    assessment_id = %key.assessment_id,
                    item_id = %key.item_id,
                    error = %e,
                    "Explanation generation failed, using template"
                );
                self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
                (template::render(recommendation), false)
            }
        };

        let entry = Arc::new(CachedExplanation {
            key: key.clone(),
            text,
            generated_at: self.clock.now(),
            is_generator_backed,
        });
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, Arc::clone(&entry));
        entry
    }

    /// Explain `recommendation` with `generator`, prompting from the assessment
    pub async fn explain(
        &self,
        generator: &dyn TextGenerator,
        assessment: &Assessment,
        recommendation: &Recommendation,
    ) -> String {
        let key = ExplanationKey::for_recommendation(assessment.id, recommendation);
        self.get_explanation(key, recommendation, move || async move {
            if !generator.is_enabled() {
                return Err(GenerationError::Disabled);
            }
            debug!(
                generator = generator.name(),
                item_id = %recommendation.item.id,
                "Generating explanation"
            );
            generator
                .generate(prompt::build_prompt(assessment, recommendation))
                .await
        })
        .await
    }

    /// Explanation text, or the template if `deadline` passes first
    ///
    /// On timeout the generation keeps running in a spawned task and fills the
    /// cache for the next request. Must be called inside a tokio runtime.
    pub async fn get_explanation_within<F, Fut>(
        self: &Arc<Self>,
        deadline: Duration,
        key: ExplanationKey,
        recommendation: &Recommendation,
        generate: F,
    ) -> String
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<String, GenerationError>> + Send + 'static,
    {
        if let Some(entry) = self.lookup(&key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return entry.text.clone();
        }

        let coordinator = Arc::clone(self);
        let owned = recommendation.clone();
        let item_id = key.item_id.clone();
        let task = tokio::spawn(async move {
            coordinator.resolve(key, &owned, generate).await
        });

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(entry)) => entry.text.clone(),
            Ok(Err(e)) => {
                warn!(item_id = %item_id, error = %e, "Explanation task aborted, using template");
                template::render(recommendation)
            }
            Err(_) => {
                self.counters.timeouts.fetch_add(1, Ordering::Relaxed);
                info!(
                    item_id = %item_id,
                    deadline_ms = deadline.as_millis() as u64,
                    error = %GenerationError::Timeout,
                    "Explanation deadline elapsed, generation continues in background"
                );
                template::render(recommendation)
            }
        }
    }

    /// [`explain`](Self::explain) bounded by `deadline`
    pub async fn explain_within(
        self: &Arc<Self>,
        deadline: Duration,
        generator: Arc<dyn TextGenerator>,
        assessment: &Assessment,
        recommendation: &Recommendation,
    ) -> String {
        let key = ExplanationKey::for_recommendation(assessment.id, recommendation);
        let prompt = prompt::build_prompt(assessment, recommendation);
        self.get_explanation_within(deadline, key, recommendation, move || async move {
            if !generator.is_enabled() {
                return Err(GenerationError::Disabled);
            }
            debug!(generator = generator.name(), "Generating explanation");
            generator.generate(prompt).await
        })
        .await
    }

    /// Remove every entry; returns how many were removed
    pub fn clear_cache(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let removed = entries.len();
        entries.clear();
        info!(removed, "Explanation cache cleared");
        removed
    }

    /// Remove expired entries; returns how many were removed
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        let removed = before - entries.len();
        info!(removed, remaining = entries.len(), "Expired explanations cleared");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner()).len();
        CacheStats {
            entries,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            generations: self.counters.generations.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
            timeouts: self.counters.timeouts.load(Ordering::Relaxed),
        }
    }
}

impl Default for ExplanationCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
