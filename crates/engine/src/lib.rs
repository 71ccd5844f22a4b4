pub use accounts::{Account, AccountKind};
pub use achievements::{
    AchievementCategory, AchievementDefinition, OnboardingUnlock, Tier, catalog,
    onboarding_unlocks,
};
pub use directory::{Business, Contact, Payee, Presence, ReceivedEnvelope};
pub use error::EngineError;
pub use ledger::{HistoryFilter, LedgerStore, LedgerStoreBuilder, P2pMode, Receipt};
pub use money::Money;
pub use notify::{Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use ops::{DEFAULT_KEY, DEFAULT_LATENCY, Engine, EngineBuilder, Outcome};
pub use settings::{Settings, SettingsPatch, Visibility};
pub use state::{Dashboard, State};
pub use storage::{MemoryStore, SnapshotStore, SqliteStore};
pub use tracker::{AchievementState, AchievementTracker, ClaimOutcome, ProgressUpdate};
pub use transactions::{Direction, Method, Status, Transaction, TransactionKind};

mod accounts;
mod achievements;
mod directory;
mod error;
mod ledger;
mod money;
mod notify;
mod ops;
mod settings;
pub mod snapshots;
mod state;
mod storage;
mod tracker;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
