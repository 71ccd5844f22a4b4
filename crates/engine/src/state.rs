//! The session state: ledger plus achievements, persisted as one snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    Account, AccountKind, AchievementTracker, LedgerStore, Money, ResultEngine, Transaction,
    TransactionKind,
    directory::{Business, Contact, Payee, Presence, ReceivedEnvelope},
    settings::Settings,
    transactions::Method,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub ledger: LedgerStore,
    #[serde(default)]
    pub achievements: AchievementTracker,
}

/// What the home screen shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub balance: Money,
    pub savings: Money,
    pub monthly_spending: Money,
    pub recent: Vec<Transaction>,
    pub received_envelopes: Vec<ReceivedEnvelope>,
    pub total_points: u32,
    pub unlocked: usize,
    pub achievements: usize,
    pub balance_visible: bool,
}

impl State {
    pub fn from_json(payload: &str) -> ResultEngine<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Parses a saved snapshot and checks it can back a session.
    ///
    /// A payload that parses but has no checking account is rejected like
    /// malformed JSON, every debit would fail on it.
    pub fn restore(payload: &str) -> ResultEngine<Self> {
        let state = Self::from_json(payload)?;
        if let Err(err) = state.ledger.primary_account() {
            return Err(crate::EngineError::Storage(format!(
                "unusable snapshot: {err}"
            )));
        }
        Ok(state)
    }

    pub fn to_json(&self) -> ResultEngine<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn dashboard(&self, recent: usize, today: NaiveDate) -> ResultEngine<Dashboard> {
        Ok(Dashboard {
            balance: self.ledger.balance()?,
            savings: self.ledger.savings_balance(),
            monthly_spending: self.ledger.spending_in_month(today),
            recent: self.ledger.transactions().iter().take(recent).cloned().collect(),
            received_envelopes: self.ledger.received_envelopes().to_vec(),
            total_points: self.achievements.total_points(),
            unlocked: self.achievements.unlocked_count(),
            achievements: self.achievements.all().len(),
            balance_visible: self.ledger.settings().balance_visible,
        })
    }

    /// Demo data every new user starts with. Achievements are left empty,
    /// the engine initializes them from the catalog.
    pub fn seed() -> ResultEngine<Self> {
        let day = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| {
                crate::EngineError::Storage(format!("invalid seed date {y}-{m}-{d}"))
            })
        };

        let history = [
            (
                TransactionKind::Receive {
                    from: "John Doe".into(),
                },
                Money::new(25_000),
                Method::P2p,
                day(2024, 6, 3)?,
            ),
            (
                TransactionKind::Send {
                    to: "Coffee Shop".into(),
                },
                Money::new(4_580),
                Method::PayCode,
                day(2024, 6, 3)?,
            ),
            (
                TransactionKind::Receive {
                    from: "Salary".into(),
                },
                Money::new(120_000),
                Method::BankTransfer,
                day(2024, 6, 1)?,
            ),
            (
                TransactionKind::Send {
                    to: "Alice Chen".into(),
                },
                Money::new(8_950),
                Method::SplitBill,
                day(2024, 5, 31)?,
            ),
            (
                TransactionKind::Send {
                    to: "Utility Bill".into(),
                },
                Money::new(12_000),
                Method::Bills,
                day(2024, 5, 30)?,
            ),
        ];

        let mut builder = LedgerStore::builder()
            .account(Account::new(
                "checking",
                AccountKind::Checking,
                "Main Account",
                Money::new(1_542_050),
                "6011-0009-4521",
            ))
            .account(Account::new(
                "savings",
                AccountKind::Savings,
                "Savings",
                Money::new(875_000),
                "6011-0009-7788",
            ));

        for (kind, amount, method, date) in history.into_iter().rev() {
            builder = builder.transaction(Transaction::new(kind, amount, method, None, date)?);
        }

        for (id, name, avatar, presence) in [
            (1, "John Doe", "👨", Presence::Online),
            (2, "Alice Chen", "👩", Presence::Offline),
            (3, "Mike Wong", "👨‍💼", Presence::Online),
            (4, "Sarah Liu", "👩‍💻", Presence::Online),
        ] {
            builder = builder.contact(Contact {
                id: id.to_string(),
                name: name.to_string(),
                avatar: avatar.to_string(),
                presence,
            });
        }

        for (id, name, account_number) in [
            ("electricity", "City Power & Light", "100200300"),
            ("water", "Metro Water", "400500600"),
            ("internet", "FiberNet", "700800900"),
        ] {
            builder = builder.payee(Payee {
                id: id.to_string(),
                name: name.to_string(),
                account_number: account_number.to_string(),
            });
        }

        for (id, name, paycode, account_number) in [
            ("coffee_shop", "Coffee Shop", "PAY-COFFEE-001", "889900112233"),
            ("fresh_mart", "Fresh Mart Grocery", "PAY-GROCERY-002", "889900445566"),
            ("page_turner", "Page Turner Books", "PAY-BOOKS-003", "889900778899"),
        ] {
            builder = builder.business(Business {
                id: id.to_string(),
                name: name.to_string(),
                paycode: paycode.to_string(),
                account_number: account_number.to_string(),
            });
        }

        builder = builder
            .received_envelope(ReceivedEnvelope {
                id: 1,
                amount: Money::new(8_800),
                from: "Mom".to_string(),
                message: "Happy Birthday!".to_string(),
                date: day(2024, 6, 1)?,
            })
            .received_envelope(ReceivedEnvelope {
                id: 2,
                amount: Money::new(16_800),
                from: "Uncle Tom".to_string(),
                message: "Congratulations!".to_string(),
                date: day(2024, 5, 28)?,
            })
            .settings(Settings::default());

        Ok(Self {
            ledger: builder.build(),
            achievements: AchievementTracker::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::{catalog, onboarding_unlocks};

    #[test]
    fn seed_matches_demo_data() {
        let state = State::seed().unwrap();
        assert_eq!(state.ledger.balance().unwrap(), Money::new(1_542_050));
        assert_eq!(state.ledger.savings_balance(), Money::new(875_000));
        assert_eq!(state.ledger.transactions().len(), 5);
        assert_eq!(state.ledger.transactions()[0].counterpart(), "John Doe");
        assert_eq!(state.ledger.transactions()[4].counterpart(), "Utility Bill");
        assert_eq!(state.ledger.contacts().len(), 4);
        assert!(state.achievements.all().is_empty());
    }

    #[test]
    fn restore_rejects_snapshot_without_checking_account() {
        assert!(State::from_json(r#"{"ledger":{}}"#).is_ok());
        assert!(matches!(
            State::restore(r#"{"ledger":{}}"#),
            Err(crate::EngineError::Storage(_))
        ));

        let seed = State::seed().unwrap();
        assert_eq!(State::restore(&seed.to_json().unwrap()).unwrap(), seed);
    }

    #[test]
    fn json_round_trip_keeps_everything() {
        let mut state = State::seed().unwrap();
        state.achievements.initialize(&catalog(), &onboarding_unlocks());
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        state
            .ledger
            .transfer("Bob", Money::from_dollars(40), Some("lunch"), today)
            .unwrap();

        let restored = State::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn dashboard_summarizes_state() {
        let mut state = State::seed().unwrap();
        state.achievements.initialize(&catalog(), &onboarding_unlocks());
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();

        let dashboard = state.dashboard(3, today).unwrap();
        assert_eq!(dashboard.recent.len(), 3);
        assert_eq!(dashboard.monthly_spending, Money::new(4_580));
        assert_eq!(dashboard.unlocked, 2);
        assert_eq!(dashboard.achievements, 14);
        assert_eq!(dashboard.total_points, 0);
        assert!(dashboard.balance_visible);
    }
}
