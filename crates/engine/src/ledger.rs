//! Ledger Store.
//!
//! Holds the accounts, the transaction history (newest first), the reference
//! directories and the user settings. Every money movement goes through one
//! of the operations below, which validate and check funds before touching
//! anything, so a failed operation leaves the ledger exactly as it was.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    Account, AccountKind, EngineError, Money, ResultEngine, Transaction, TransactionKind,
    directory::{Business, Contact, Payee, ReceivedEnvelope},
    settings::{Settings, SettingsPatch},
    transactions::{Direction, Method, Status},
    util::{fold_search_key, normalize_optional_text, normalize_required_name},
};

/// Mode of a peer-to-peer operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum P2pMode {
    Send,
    Request,
    Split,
}

/// History filter used by the transaction list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    #[default]
    All,
    Sent,
    Received,
}

/// What a successful ledger operation produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub message: String,
    /// New history records, in the order they were prepended.
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerStore {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    payees: Vec<Payee>,
    contacts: Vec<Contact>,
    businesses: Vec<Business>,
    received_envelopes: Vec<ReceivedEnvelope>,
    settings: Settings,
}

impl LedgerStore {
    pub fn builder() -> LedgerStoreBuilder {
        LedgerStoreBuilder::default()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// History, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn payees(&self) -> &[Payee] {
        &self.payees
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn received_envelopes(&self) -> &[ReceivedEnvelope] {
        &self.received_envelopes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The first checking account, which every debit draws from.
    pub fn primary_account(&self) -> ResultEngine<&Account> {
        self.accounts
            .iter()
            .find(|a| a.kind == AccountKind::Checking)
            .ok_or_else(|| EngineError::NotFound("primary account".to_string()))
    }

    fn primary_account_mut(&mut self) -> ResultEngine<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.kind == AccountKind::Checking)
            .ok_or_else(|| EngineError::NotFound("primary account".to_string()))
    }

    pub fn balance(&self) -> ResultEngine<Money> {
        Ok(self.primary_account()?.balance)
    }

    pub fn savings_balance(&self) -> Money {
        self.accounts
            .iter()
            .filter(|a| a.kind == AccountKind::Savings)
            .map(|a| a.balance)
            .sum()
    }

    pub fn payee(&self, payee_id: &str) -> ResultEngine<&Payee> {
        self.payees
            .iter()
            .find(|p| p.id == payee_id)
            .ok_or_else(|| EngineError::NotFound(format!("payee {payee_id}")))
    }

    pub fn business(&self, business_id: &str) -> ResultEngine<&Business> {
        self.businesses
            .iter()
            .find(|b| b.id == business_id)
            .ok_or_else(|| EngineError::NotFound(format!("business {business_id}")))
    }

    /// Resolves the business behind a scanned PayCode.
    pub fn business_by_paycode(&self, code: &str) -> ResultEngine<&Business> {
        self.businesses
            .iter()
            .find(|b| b.matches_paycode(code))
            .ok_or_else(|| EngineError::NotFound(format!("PayCode {}", code.trim())))
    }

    /// Debits the primary account once and prepends `records` in order, so
    /// the last record ends up newest.
    fn post_debit(&mut self, total: Money, records: Vec<Transaction>) -> ResultEngine<Vec<Transaction>> {
        self.primary_account_mut()?.debit(total)?;
        Ok(self.prepend(records))
    }

    fn prepend(&mut self, records: Vec<Transaction>) -> Vec<Transaction> {
        for record in &records {
            self.transactions.insert(0, record.clone());
        }
        records
    }

    fn debit_send(
        &mut self,
        recipient: &str,
        amount: Money,
        method: Method,
        memo: Option<&str>,
        today: NaiveDate,
    ) -> ResultEngine<Transaction> {
        let recipient = normalize_required_name(recipient, "recipient")?;
        let tx = Transaction::new(
            TransactionKind::Send { to: recipient },
            amount,
            method,
            normalize_optional_text(memo),
            today,
        )?;
        let mut posted = self.post_debit(amount, vec![tx])?;
        posted
            .pop()
            .ok_or_else(|| EngineError::Storage("debit posted no record".to_string()))
    }

    /// Sends money from the primary account.
    pub fn transfer(
        &mut self,
        recipient: &str,
        amount: Money,
        memo: Option<&str>,
        today: NaiveDate,
    ) -> ResultEngine<Receipt> {
        let tx = self.debit_send(recipient, amount, Method::Transfer, memo, today)?;
        Ok(Receipt {
            message: format!("Successfully sent {} to {}", tx.amount, tx.counterpart()),
            transactions: vec![tx],
        })
    }

    /// Peer-to-peer send, request or split.
    ///
    /// Only `Send` moves money. Requests and splits record a pending entry
    /// and leave the balance alone until fulfilled.
    pub fn p2p_transfer(
        &mut self,
        recipient: &str,
        amount: Money,
        message: Option<&str>,
        mode: P2pMode,
        today: NaiveDate,
    ) -> ResultEngine<Receipt> {
        match mode {
            P2pMode::Send => {
                let tx = self.debit_send(recipient, amount, Method::P2p, message, today)?;
                Ok(Receipt {
                    message: format!("Successfully sent {} to {}", tx.amount, tx.counterpart()),
                    transactions: vec![tx],
                })
            }
            P2pMode::Request => {
                let from = normalize_required_name(recipient, "recipient")?;
                let tx = Transaction::new(
                    TransactionKind::Request { from },
                    amount,
                    Method::Request,
                    normalize_optional_text(message),
                    today,
                )?
                .with_status(Status::Requested);
                let message = format!("Request sent to {} for {}", tx.counterpart(), tx.amount);
                Ok(Receipt {
                    message,
                    transactions: self.prepend(vec![tx]),
                })
            }
            P2pMode::Split => {
                let with = normalize_required_name(recipient, "recipient")?;
                let tx = Transaction::new(
                    TransactionKind::Split { with },
                    amount,
                    Method::SplitBill,
                    normalize_optional_text(message),
                    today,
                )?
                .with_status(Status::Pending);
                let message = format!("Split of {} requested from {}", tx.amount, tx.counterpart());
                Ok(Receipt {
                    message,
                    transactions: self.prepend(vec![tx]),
                })
            }
        }
    }

    /// Pays a known business.
    pub fn business_payment(
        &mut self,
        business_id: &str,
        amount: Money,
        today: NaiveDate,
    ) -> ResultEngine<Receipt> {
        self.pay_business(business_id, amount, Method::Business, today)
    }

    /// Pays the business behind a scanned PayCode.
    pub fn pay_paycode(
        &mut self,
        code: &str,
        amount: Money,
        today: NaiveDate,
    ) -> ResultEngine<Receipt> {
        let business_id = self.business_by_paycode(code)?.id.clone();
        self.pay_business(&business_id, amount, Method::PayCode, today)
    }

    fn pay_business(
        &mut self,
        business_id: &str,
        amount: Money,
        method: Method,
        today: NaiveDate,
    ) -> ResultEngine<Receipt> {
        let name = self.business(business_id)?.name.clone();
        let tx = self.debit_send(&name, amount, method, None, today)?;
        Ok(Receipt {
            message: format!("Paid {} to {}", tx.amount, tx.counterpart()),
            transactions: vec![tx],
        })
    }

    /// Sends the same gift to every recipient.
    ///
    /// The primary account is debited once for the whole amount while the
    /// history gets one gift record of `amount_each` per recipient.
    pub fn send_red_envelope(
        &mut self,
        recipients: &[String],
        amount_each: Money,
        message: Option<&str>,
        today: NaiveDate,
    ) -> ResultEngine<Receipt> {
        if recipients.is_empty() {
            return Err(EngineError::InvalidAmount(
                "a red envelope needs at least one recipient".to_string(),
            ));
        }
        let total = amount_each
            .checked_mul(recipients.len())
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        let message = normalize_optional_text(message);

        let mut records = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let to = normalize_required_name(recipient, "recipient")?;
            records.push(Transaction::new(
                TransactionKind::Gift { to },
                amount_each,
                Method::RedEnvelope,
                message.clone(),
                today,
            )?);
        }

        let transactions = self.post_debit(total, records)?;
        Ok(Receipt {
            message: format!(
                "Sent {} red envelope(s) of {} each ({} total)",
                transactions.len(),
                amount_each,
                total
            ),
            transactions,
        })
    }

    /// Pays a bill to a known payee.
    pub fn pay_bill(
        &mut self,
        payee_id: &str,
        amount: Money,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> ResultEngine<Receipt> {
        let name = self.payee(payee_id)?.name.clone();
        let memo = format!("Bill due {due_date}");
        let tx = self.debit_send(&name, amount, Method::Bills, Some(&memo), today)?;
        Ok(Receipt {
            message: format!("Paid {} to {}", tx.amount, tx.counterpart()),
            transactions: vec![tx],
        })
    }

    /// Asks every participant for their share of `total`.
    ///
    /// The creator pays a share too, so each participant owes
    /// `total / (participants + 1)`.
    pub fn split_bill(
        &mut self,
        participants: &[String],
        total: Money,
        description: Option<&str>,
        today: NaiveDate,
    ) -> ResultEngine<Receipt> {
        if participants.is_empty() {
            return Err(EngineError::InvalidAmount(
                "a split needs at least one participant".to_string(),
            ));
        }
        if !total.is_positive() {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        let share = total
            .share(participants.len() + 1)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        if !share.is_positive() {
            return Err(EngineError::InvalidAmount("share rounds to zero".to_string()));
        }
        let description = normalize_optional_text(description);

        let mut records = Vec::with_capacity(participants.len());
        for participant in participants {
            let with = normalize_required_name(participant, "participant")?;
            records.push(
                Transaction::new(
                    TransactionKind::Split { with },
                    share,
                    Method::SplitBill,
                    description.clone(),
                    today,
                )?
                .with_status(Status::Pending),
            );
        }

        let transactions = self.prepend(records);
        Ok(Receipt {
            message: format!(
                "Bill split: {} each among {} people",
                share,
                participants.len() + 1
            ),
            transactions,
        })
    }

    pub fn update_settings(&mut self, patch: &SettingsPatch) -> &Settings {
        self.settings.apply(patch);
        &self.settings
    }

    /// Total debited per method, transfers excluded.
    pub fn spending_by_category(&self) -> BTreeMap<Method, Money> {
        let mut totals = BTreeMap::new();
        for tx in self
            .transactions
            .iter()
            .filter(|tx| tx.direction() == Direction::Debit && tx.method != Method::Transfer)
        {
            *totals.entry(tx.method).or_insert(Money::ZERO) += tx.amount.abs();
        }
        totals
    }

    /// Everything debited in the calendar month of `today`.
    pub fn spending_in_month(&self, today: NaiveDate) -> Money {
        self.transactions
            .iter()
            .filter(|tx| tx.direction() == Direction::Debit)
            .filter(|tx| tx.date.year() == today.year() && tx.date.month() == today.month())
            .map(|tx| tx.amount)
            .sum()
    }

    /// History filtered by direction and by counterpart name.
    ///
    /// The search ignores case and accents.
    pub fn history(&self, filter: HistoryFilter, search: Option<&str>) -> Vec<&Transaction> {
        let needle = search.map(fold_search_key).filter(|s| !s.is_empty());
        self.transactions
            .iter()
            .filter(|tx| match filter {
                HistoryFilter::All => true,
                HistoryFilter::Sent => tx.direction() == Direction::Debit,
                HistoryFilter::Received => tx.direction() == Direction::Credit,
            })
            .filter(|tx| {
                needle
                    .as_deref()
                    .is_none_or(|needle| fold_search_key(tx.counterpart()).contains(needle))
            })
            .collect()
    }
}

/// The builder for `LedgerStore`, used for seeding.
#[derive(Default)]
pub struct LedgerStoreBuilder {
    store: LedgerStore,
}

impl LedgerStoreBuilder {
    pub fn account(mut self, account: Account) -> Self {
        self.store.accounts.push(account);
        self
    }

    /// Adds a historical record; call oldest first.
    pub fn transaction(mut self, tx: Transaction) -> Self {
        self.store.transactions.insert(0, tx);
        self
    }

    pub fn payee(mut self, payee: Payee) -> Self {
        self.store.payees.push(payee);
        self
    }

    pub fn contact(mut self, contact: Contact) -> Self {
        self.store.contacts.push(contact);
        self
    }

    pub fn business(mut self, business: Business) -> Self {
        self.store.businesses.push(business);
        self
    }

    pub fn received_envelope(mut self, envelope: ReceivedEnvelope) -> Self {
        self.store.received_envelopes.push(envelope);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.store.settings = settings;
        self
    }

    pub fn build(self) -> LedgerStore {
        self.store
    }
}
