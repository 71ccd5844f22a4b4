use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Account, AccountKind, AchievementTracker, Direction, Engine, EngineError, HistoryFilter,
    LedgerStore, MemoryStore, Method, Money, P2pMode, RecordingNotifier, Severity, SettingsPatch,
    SnapshotStore, SqliteStore, State, Status, catalog,
};
use migration::MigratorTrait;

const KEY: &str = "paycode:test";

async fn sqlite_store() -> (Arc<SqliteStore>, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    (Arc::new(SqliteStore::new(db.clone())), db)
}

/// A session whose checking account holds `balance` and nothing else.
/// Achievements start locked so the onboarding unlocks do not apply.
fn state_with_balance(balance: Money) -> State {
    let ledger = LedgerStore::builder()
        .account(Account::new(
            "checking",
            AccountKind::Checking,
            "Main Account",
            balance,
            "6011-0009-4521",
        ))
        .build();
    let mut achievements = AchievementTracker::default();
    achievements.initialize(&catalog(), &[]);
    State {
        ledger,
        achievements,
    }
}

async fn engine_on(
    store: Arc<dyn SnapshotStore>,
    notifier: &RecordingNotifier,
) -> Engine {
    Engine::builder()
        .store(store)
        .key(KEY)
        .latency(Duration::ZERO)
        .notifier(Arc::new(notifier.clone()))
        .build()
        .await
        .unwrap()
}

async fn engine_with_balance(balance: Money) -> (Engine, RecordingNotifier, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store
        .save(KEY, &state_with_balance(balance).to_json().unwrap())
        .await
        .unwrap();
    let notifier = RecordingNotifier::new();
    let engine = engine_on(store.clone(), &notifier).await;
    (engine, notifier, store)
}

struct BrokenStore;

#[async_trait]
impl SnapshotStore for BrokenStore {
    async fn load(&self, _key: &str) -> Result<Option<String>, EngineError> {
        Err(EngineError::Storage("disk unplugged".to_string()))
    }

    async fn save(&self, _key: &str, _snapshot: &str) -> Result<(), EngineError> {
        Err(EngineError::Storage("disk unplugged".to_string()))
    }
}

/// Cannot read but keeps every write.
#[derive(Default)]
struct WriteOnlyStore {
    writes: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl SnapshotStore for WriteOnlyStore {
    async fn load(&self, _key: &str) -> Result<Option<String>, EngineError> {
        Err(EngineError::Storage("read timeout".to_string()))
    }

    async fn save(&self, _key: &str, snapshot: &str) -> Result<(), EngineError> {
        self.writes.lock().unwrap().push(snapshot.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn new_session_starts_from_seed_and_is_saved() {
    let store = Arc::new(MemoryStore::new());
    let notifier = RecordingNotifier::new();
    let engine = engine_on(store.clone(), &notifier).await;

    assert_eq!(engine.balance().unwrap(), Money::new(1_542_050));
    assert_eq!(engine.transactions().len(), 5);
    assert_eq!(engine.total_points(), 0);
    let first = engine.state().achievements.get("first_transfer").unwrap();
    assert!(first.unlocked && !first.claimed);

    let saved = store.load(KEY).await.unwrap().expect("seed persisted");
    assert_eq!(&State::from_json(&saved).unwrap(), engine.state());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn transfer_over_balance_fails_and_changes_nothing() {
    let (mut engine, notifier, store) = engine_with_balance(Money::from_dollars(100)).await;
    let before = engine.state().clone();

    let outcome = engine
        .transfer("Bob", Money::from_dollars(150), None)
        .await;

    assert!(!outcome.success);
    assert!(matches!(outcome.error, Some(EngineError::InsufficientFunds(_))));
    assert_eq!(outcome.message, "Insufficient balance");
    assert_eq!(engine.state(), &before);
    assert_eq!(
        notifier.last(),
        Some(("Insufficient balance".to_string(), Severity::Error))
    );
    let saved = store.load(KEY).await.unwrap().unwrap();
    assert_eq!(State::from_json(&saved).unwrap(), before);
}

#[tokio::test]
async fn transfer_debits_and_records_newest_first() {
    let (mut engine, notifier, store) = engine_with_balance(Money::from_dollars(100)).await;

    let outcome = engine
        .transfer("Bob", Money::from_dollars(40), Some("lunch"))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.message, "Successfully sent $40.00 to Bob");
    assert_eq!(engine.balance().unwrap(), Money::from_dollars(60));

    let newest = &engine.transactions()[0];
    assert_eq!(Some(newest), outcome.transaction());
    assert_eq!(newest.direction(), Direction::Debit);
    assert_eq!(newest.amount, Money::from_dollars(40));
    assert_eq!(newest.counterpart(), "Bob");
    assert_eq!(newest.message.as_deref(), Some("lunch"));
    assert_eq!(newest.date, engine.today());

    assert_eq!(
        notifier.last(),
        Some(("Successfully sent $40.00 to Bob".to_string(), Severity::Success))
    );
    let saved = store.load(KEY).await.unwrap().unwrap();
    assert_eq!(&State::from_json(&saved).unwrap(), engine.state());
}

#[tokio::test]
async fn invalid_amount_is_rejected_before_touching_state() {
    let (mut engine, notifier, _) = engine_with_balance(Money::from_dollars(100)).await;
    let before = engine.state().clone();

    for amount in [Money::ZERO, Money::new(-500)] {
        let outcome = engine.business_payment("coffee_shop", amount).await;
        assert!(!outcome.success);
        assert!(matches!(outcome.error, Some(EngineError::InvalidAmount(_))));
        assert_eq!(outcome.message, "Please enter a valid amount");
    }
    assert_eq!(engine.state(), &before);
    assert_eq!(notifier.messages().len(), 2);
}

#[tokio::test]
async fn red_envelope_records_one_gift_per_recipient() {
    let (mut engine, _, _) = engine_with_balance(Money::from_dollars(100)).await;
    let recipients = vec!["Mom".to_string(), "Dad".to_string(), "Sis".to_string()];

    let outcome = engine
        .send_red_envelope(&recipients, Money::new(888), Some("Gong Xi Fa Cai"))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.transactions.len(), 3);
    assert!(
        outcome
            .transactions
            .iter()
            .all(|tx| tx.amount == Money::new(888) && tx.method == Method::RedEnvelope)
    );
    assert_eq!(
        engine.balance().unwrap(),
        Money::from_dollars(100) - Money::new(3 * 888)
    );
    assert_eq!(engine.transactions().len(), 3);
}

#[tokio::test]
async fn red_envelope_over_balance_is_all_or_nothing() {
    let (mut engine, _, _) = engine_with_balance(Money::from_dollars(20)).await;
    let recipients = vec!["A".to_string(), "B".to_string(), "C".to_string()];

    let outcome = engine
        .send_red_envelope(&recipients, Money::from_dollars(8), None)
        .await;

    assert!(!outcome.success);
    assert_eq!(engine.balance().unwrap(), Money::from_dollars(20));
    assert!(engine.transactions().is_empty());
}

#[tokio::test]
async fn requests_and_splits_leave_balance_alone() {
    let (mut engine, _, _) = engine_with_balance(Money::from_dollars(100)).await;

    let request = engine
        .p2p_transfer("Alice Chen", Money::from_dollars(30), None, P2pMode::Request)
        .await;
    assert!(request.success);
    assert_eq!(request.transaction().unwrap().status, Status::Requested);

    let friends = vec!["Ann".to_string(), "Bob".to_string(), "Cid".to_string()];
    let split = engine
        .split_bill(&friends, Money::from_dollars(100), Some("Dinner"))
        .await;
    assert!(split.success);
    assert_eq!(split.message, "Bill split: $25.00 each among 4 people");
    assert_eq!(split.transactions.len(), 3);

    assert_eq!(engine.balance().unwrap(), Money::from_dollars(100));
    assert_eq!(engine.transactions().len(), 4);
    assert!(engine.history(HistoryFilter::Sent, None).is_empty());
}

#[tokio::test]
async fn paycode_and_bill_payments_use_the_directories() {
    let store = Arc::new(MemoryStore::new());
    let notifier = RecordingNotifier::new();
    let mut engine = engine_on(store, &notifier).await;
    let start = engine.balance().unwrap();

    let unknown = engine.pay_paycode("PAY-NOPE-999", Money::from_dollars(5)).await;
    assert!(matches!(unknown.error, Some(EngineError::NotFound(_))));
    assert_eq!(engine.balance().unwrap(), start);

    let coffee = engine
        .pay_paycode(" pay-coffee-001 ", Money::new(450))
        .await;
    assert!(coffee.success);
    assert_eq!(coffee.message, "Paid $4.50 to Coffee Shop");

    let due = chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let bill = engine
        .pay_bill("electricity", Money::from_dollars(80), due)
        .await;
    assert!(bill.success);
    assert_eq!(
        bill.transaction().unwrap().message.as_deref(),
        Some("Bill due 2024-07-01")
    );

    assert_eq!(
        engine.balance().unwrap(),
        start - Money::new(450) - Money::from_dollars(80)
    );
    let spending = engine.spending_by_category();
    assert_eq!(spending.get(&Method::Bills), Some(&Money::from_dollars(200)));
}

#[tokio::test]
async fn first_transfer_is_claimed_once() {
    let (mut engine, notifier, _) = engine_with_balance(Money::from_dollars(100)).await;

    let early = engine.claim("first_transfer").await;
    assert!(!early.success);
    assert_eq!(engine.total_points(), 0);

    let progress = engine.record_progress("first_transfer", 1).await;
    assert!(progress.success);
    assert_eq!(progress.message, "Achievement unlocked: First Transfer!");
    let unlocked_at = engine
        .state()
        .achievements
        .get("first_transfer")
        .unwrap()
        .unlocked_at;
    assert!(unlocked_at.is_some());

    let claimed = engine.claim("first_transfer").await;
    assert!(claimed.success);
    assert_eq!(claimed.message, "Claimed 50 points for \"First Transfer\"!");
    assert_eq!(engine.total_points(), 50);

    let notified = notifier.messages().len();
    let again = engine.claim("first_transfer").await;
    assert!(!again.success);
    assert!(again.error.is_none());
    assert_eq!(engine.total_points(), 50);
    assert_eq!(notifier.messages().len(), notified);

    engine.record_progress("first_transfer", 5).await;
    let state = engine.state().achievements.get("first_transfer").unwrap();
    assert_eq!(state.progress, 1);
    assert_eq!(state.unlocked_at, unlocked_at);
}

#[tokio::test]
async fn unknown_achievement_is_reported() {
    let (mut engine, _, _) = engine_with_balance(Money::from_dollars(100)).await;

    let outcome = engine.record_progress("moon_landing", 1).await;
    assert!(!outcome.success);
    assert!(matches!(outcome.error, Some(EngineError::NotFound(_))));
}

#[tokio::test]
async fn settings_are_persisted() {
    let (mut engine, notifier, store) = engine_with_balance(Money::from_dollars(100)).await;

    let outcome = engine
        .update_settings(&SettingsPatch {
            dark_mode: Some(true),
            balance_visible: Some(false),
            ..SettingsPatch::default()
        })
        .await;
    assert!(outcome.success);
    assert!(engine.settings().dark_mode);
    assert!(!engine.dashboard(3).unwrap().balance_visible);
    assert_eq!(
        notifier.last(),
        Some(("Settings updated".to_string(), Severity::Info))
    );

    let reloaded = engine_on(store, &RecordingNotifier::new()).await;
    assert!(reloaded.settings().dark_mode);
}

#[tokio::test]
async fn corrupt_snapshot_falls_back_to_seed() {
    let store = Arc::new(MemoryStore::new());
    store.save(KEY, "{ not json").await.unwrap();

    let engine = engine_on(store.clone(), &RecordingNotifier::new()).await;

    assert_eq!(engine.balance().unwrap(), Money::new(1_542_050));
    let saved = store.load(KEY).await.unwrap().unwrap();
    assert_eq!(&State::from_json(&saved).unwrap(), engine.state());
}

#[tokio::test]
async fn snapshot_without_checking_account_falls_back_to_seed() {
    let store = Arc::new(MemoryStore::new());
    store.save(KEY, r#"{"ledger":{}}"#).await.unwrap();

    let mut engine = engine_on(store.clone(), &RecordingNotifier::new()).await;

    assert_eq!(engine.balance().unwrap(), Money::new(1_542_050));
    assert!(engine.dashboard(3).is_ok());
    let saved = store.load(KEY).await.unwrap().unwrap();
    assert_eq!(&State::from_json(&saved).unwrap(), engine.state());

    let outcome = engine.transfer("Bob", Money::from_dollars(5), None).await;
    assert!(outcome.success);
}

#[tokio::test]
async fn storage_failures_do_not_fail_operations() {
    let notifier = RecordingNotifier::new();
    let mut engine = engine_on(Arc::new(BrokenStore), &notifier).await;
    let start = engine.balance().unwrap();

    let outcome = engine
        .p2p_transfer("Mike Wong", Money::from_dollars(10), None, P2pMode::Send)
        .await;

    assert!(outcome.success);
    assert_eq!(engine.balance().unwrap(), start - Money::from_dollars(10));
}

#[tokio::test]
async fn unreadable_store_is_not_overwritten_at_startup() {
    let store = Arc::new(WriteOnlyStore::default());
    let mut engine = engine_on(store.clone(), &RecordingNotifier::new()).await;
    assert!(store.writes.lock().unwrap().is_empty());

    engine.transfer("Bob", Money::from_dollars(1), None).await;
    assert_eq!(store.writes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_snapshot_reload_reproduces_state() {
    let (store, _db) = sqlite_store().await;
    let notifier = RecordingNotifier::new();

    let mut engine = engine_on(store.clone(), &notifier).await;
    engine
        .transfer("Bob", Money::from_dollars(40), Some("lunch"))
        .await;
    engine
        .send_red_envelope(&["Kid".to_string()], Money::new(1_688), None)
        .await;
    engine.claim("biometric_user").await;

    let reloaded = engine_on(store, &notifier).await;
    assert_eq!(reloaded.state(), engine.state());
    assert_eq!(reloaded.balance().unwrap(), engine.balance().unwrap());
    assert_eq!(reloaded.transactions(), engine.transactions());
    assert_eq!(reloaded.total_points(), engine.total_points());
}

#[tokio::test(start_paused = true)]
async fn mutations_wait_for_the_simulated_round_trip() {
    let mut engine = Engine::builder()
        .latency(Duration::from_millis(300))
        .notifier(Arc::new(RecordingNotifier::new()))
        .build()
        .await
        .unwrap();

    let started = tokio::time::Instant::now();
    let outcome = engine.transfer("Bob", Money::from_dollars(1), None).await;
    assert!(outcome.success);
    assert!(started.elapsed() >= Duration::from_millis(300));
}
