use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

/// Runtime context providing time and ID generation
#[derive(Clone)]
pub struct RuntimeContext {
    pub time_provider: Arc<dyn TimeProvider>,
    pub id_generator: Arc<dyn IdGenerator>,
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self {
            time_provider: Arc::new(RealTimeProvider),
            id_generator: Arc::new(RealIdGenerator::default()),
        }
    }
}

impl RuntimeContext {
    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }
}

pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

// --- Real implementations ---

pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Short random ids cut from a v4 UUID.
pub struct RealIdGenerator {
    length: usize,
}

impl RealIdGenerator {
    pub const MIN_LENGTH: usize = 4;
    pub const MAX_LENGTH: usize = 32;

    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(Self::MIN_LENGTH, Self::MAX_LENGTH),
        }
    }
}

impl Default for RealIdGenerator {
    fn default() -> Self {
        Self::new(8)
    }
}

impl IdGenerator for RealIdGenerator {
    fn next_id(&self) -> String {
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(self.length);
        id
    }
}

// --- Fake implementations ---

pub struct FakeTimeProvider {
    pub fixed_timestamp: i64,
}

impl FakeTimeProvider {
    pub fn new(fixed_timestamp: i64) -> Self {
        Self { fixed_timestamp }
    }
}

impl TimeProvider for FakeTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.fixed_timestamp, 0)
            .single()
            .unwrap_or_default()
    }
}

pub struct FakeIdGenerator {
    pub prefix: String,
    pub counter: AtomicU64,
}

impl FakeIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for FakeIdGenerator {
    fn next_id(&self) -> String {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, id)
    }
}
