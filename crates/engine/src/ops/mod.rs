use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{
    EngineError, Money, ResultEngine, State, Transaction,
    achievements::{catalog, onboarding_unlocks},
    ledger::Receipt,
    notify::{Notifier, Severity, TracingNotifier},
    storage::{MemoryStore, SnapshotStore},
};

mod achievements;
mod ledger;
mod settings;

/// Default simulated network latency.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);
/// Default snapshot key.
pub const DEFAULT_KEY: &str = "paycode:default";

/// What every engine operation hands back to the caller.
#[derive(Debug)]
pub struct Outcome {
    pub success: bool,
    /// User-facing message, also sent to the notifier.
    pub message: String,
    /// Records added to the history, in insertion order.
    pub transactions: Vec<Transaction>,
    pub error: Option<EngineError>,
}

impl Outcome {
    fn applied(receipt: Receipt) -> Self {
        Self {
            success: true,
            message: receipt.message,
            transactions: receipt.transactions,
            error: None,
        }
    }

    fn rejected(message: String, error: Option<EngineError>) -> Self {
        Self {
            success: false,
            message,
            transactions: Vec::new(),
            error,
        }
    }

    /// The single record of a one-transaction operation (or the first of many).
    pub fn transaction(&self) -> Option<&Transaction> {
        self.transactions.first()
    }
}

/// Async facade over the session state.
///
/// Every mutating call simulates the network round trip, applies the change
/// through [`LedgerStore`](crate::LedgerStore) or
/// [`AchievementTracker`](crate::AchievementTracker), writes the whole state
/// back to the snapshot store and notifies the user. Calls take `&mut self`,
/// so a second operation cannot start while one is in flight.
pub struct Engine {
    state: State,
    store: Arc<dyn SnapshotStore>,
    key: String,
    latency: Duration,
    timezone: Tz,
    notifier: Arc<dyn Notifier>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Calendar day of `now` in the configured timezone.
    pub fn day_of(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    pub fn today(&self) -> NaiveDate {
        self.day_of(Utc::now())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Writes the whole state under the session key.
    ///
    /// Failures are logged and swallowed: the in-memory state stays the
    /// source of truth for the rest of the session.
    async fn persist(&self) {
        let payload = match self.state.to_json() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!("failed to serialize snapshot: {err}");
                return;
            }
        };
        match self.store.save(&self.key, &payload).await {
            Ok(()) => tracing::debug!(key = %self.key, bytes = payload.len(), "snapshot saved"),
            Err(err) => tracing::error!(key = %self.key, "failed to save snapshot: {err}"),
        }
    }

    fn reject(&self, op: &'static str, err: EngineError) -> Outcome {
        tracing::debug!(op, "operation rejected: {err}");
        let message = err.user_message();
        self.notifier.notify(&message, Severity::Error);
        Outcome::rejected(message, Some(err))
    }

    /// Shared pattern of the ledger operations: delay, apply, persist,
    /// notify.
    async fn run<F>(&mut self, op: &'static str, apply: F) -> Outcome
    where
        F: FnOnce(&mut State, NaiveDate) -> ResultEngine<Receipt>,
    {
        self.simulate_latency().await;
        let today = self.today();
        match apply(&mut self.state, today) {
            Ok(receipt) => {
                tracing::debug!(op, records = receipt.transactions.len(), "operation applied");
                self.persist().await;
                self.notifier.notify(&receipt.message, Severity::Success);
                Outcome::applied(receipt)
            }
            Err(err) => self.reject(op, err),
        }
    }
}

/// Amounts are checked before the simulated round trip, like a form that
/// refuses to submit.
fn validate_amount(amount: Money) -> ResultEngine<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(EngineError::InvalidAmount(format!(
            "{amount} is not a positive amount"
        )))
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    store: Option<Arc<dyn SnapshotStore>>,
    key: String,
    latency: Duration,
    timezone: Tz,
    notifier: Arc<dyn Notifier>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            store: None,
            key: DEFAULT_KEY.to_string(),
            latency: DEFAULT_LATENCY,
            timezone: Tz::UTC,
            notifier: Arc::new(TracingNotifier),
        }
    }
}

impl EngineBuilder {
    /// Pass the snapshot store, defaults to a [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Key the session snapshot is stored under.
    pub fn key(mut self, key: &str) -> EngineBuilder {
        self.key = key.to_string();
        self
    }

    /// Simulated network latency for every mutating call.
    pub fn latency(mut self, latency: Duration) -> EngineBuilder {
        self.latency = latency;
        self
    }

    /// Timezone used to date transactions.
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = timezone;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = notifier;
        self
    }

    /// Construct `Engine`, loading the snapshot or falling back to the seed.
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn SnapshotStore>);

        // `writable` is false when the store could not be read: whatever it
        // holds is kept until the next mutation overwrites it.
        let (mut state, mut dirty, writable) = match store.load(&self.key).await {
            Ok(Some(payload)) => match State::restore(&payload) {
                Ok(state) => {
                    tracing::info!(key = %self.key, "loaded snapshot");
                    (state, false, true)
                }
                Err(err) => {
                    tracing::warn!(key = %self.key, "corrupt snapshot, using seed data: {err}");
                    (State::seed()?, true, true)
                }
            },
            Ok(None) => {
                tracing::info!(key = %self.key, "no snapshot found, using seed data");
                (State::seed()?, true, true)
            }
            Err(err) => {
                tracing::error!(key = %self.key, "failed to load snapshot: {err}");
                (State::seed()?, false, false)
            }
        };

        if state
            .achievements
            .initialize(&catalog(), &onboarding_unlocks())
        {
            dirty = true;
        }

        let engine = Engine {
            state,
            store,
            key: self.key,
            latency: self.latency,
            timezone: self.timezone,
            notifier: self.notifier,
        };
        if dirty && writable {
            engine.persist().await;
        }
        Ok(engine)
    }
}
