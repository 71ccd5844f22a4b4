use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use engine::{
    AchievementCategory, Dashboard, Direction, Engine, HistoryFilter, MemoryStore, Money,
    Notifier, Outcome, P2pMode, Severity, SettingsPatch, SnapshotStore, SqliteStore,
    Transaction, Visibility,
};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "paycode", about = "Mock mobile banking session")]
struct Cli {
    /// Optional settings file (TOML, without extension).
    #[arg(long)]
    config: Option<String>,
    /// Override the log level.
    #[arg(long)]
    level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Balances, monthly spending and the latest activity.
    Dashboard {
        #[arg(long, default_value_t = 5)]
        recent: usize,
    },
    /// Transaction history, newest first.
    History {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        #[arg(long)]
        search: Option<String>,
    },
    /// Transfer to a recipient by name.
    Transfer {
        to: String,
        amount: Money,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Send money to a contact.
    Send {
        to: String,
        amount: Money,
        #[arg(long)]
        message: Option<String>,
    },
    /// Ask a contact for money.
    Request {
        from: String,
        amount: Money,
        #[arg(long)]
        message: Option<String>,
    },
    /// Split a total with friends, the caller pays one share.
    Split {
        total: Money,
        #[arg(required = true, num_args = 1..)]
        participants: Vec<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Pay a utility bill.
    PayBill {
        payee: String,
        amount: Money,
        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        due: NaiveDate,
    },
    /// Pay a merchant by id.
    PayBusiness { business: String, amount: Money },
    /// Pay the merchant behind a scanned PayCode.
    Scan { code: String, amount: Money },
    /// Send the same amount to every recipient.
    RedEnvelope {
        amount_each: Money,
        #[arg(required = true, num_args = 1..)]
        recipients: Vec<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Spending per payment method.
    Spending,
    /// Achievements, optionally restricted to one category.
    Achievements {
        #[arg(long)]
        category: Option<String>,
    },
    /// Record progress towards an achievement.
    Progress {
        id: String,
        #[arg(default_value_t = 1)]
        delta: u32,
    },
    /// Claim the reward of an unlocked achievement.
    Claim { id: String },
    /// Show or change settings.
    Settings {
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        biometric_login: Option<bool>,
        #[arg(long)]
        auto_top_up: Option<bool>,
        #[arg(long)]
        balance_visible: Option<bool>,
        #[arg(long)]
        profile_visible: Option<bool>,
        #[arg(long, value_enum)]
        transaction_visibility: Option<VisibilityArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Sent,
    Received,
}

impl From<FilterArg> for HistoryFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => HistoryFilter::All,
            FilterArg::Sent => HistoryFilter::Sent,
            FilterArg::Received => HistoryFilter::Received,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VisibilityArg {
    Public,
    Friends,
    Private,
}

impl From<VisibilityArg> for Visibility {
    fn from(value: VisibilityArg) -> Self {
        match value {
            VisibilityArg::Public => Visibility::Public,
            VisibilityArg::Friends => Visibility::Friends,
            VisibilityArg::Private => Visibility::Private,
        }
    }
}

/// Prints notifications the way the app shows toasts.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success => println!("✔ {message}"),
            Severity::Info => println!("ℹ {message}"),
            Severity::Error => eprintln!("✖ {message}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    let level = cli.level.as_deref().unwrap_or(&settings.app.level);
    tracing_subscriber::fmt()
        .with_env_filter(format!("paycode={level},engine={level}"))
        .with_writer(std::io::stderr)
        .init();

    let timezone: Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|_| format!("unknown timezone: {}", settings.app.timezone))?;
    let store = open_store(&settings.storage.database).await?;

    let mut engine = Engine::builder()
        .store(store)
        .key(&settings.app.key)
        .latency(Duration::from_millis(settings.app.latency_ms))
        .timezone(timezone)
        .notifier(Arc::new(ConsoleNotifier))
        .build()
        .await?;

    let outcome = match cli.command {
        Command::Dashboard { recent } => {
            print_dashboard(&engine.dashboard(recent)?);
            return Ok(());
        }
        Command::History { filter, search } => {
            for tx in engine.history(filter.into(), search.as_deref()) {
                print_transaction(tx);
            }
            return Ok(());
        }
        Command::Spending => {
            for (method, total) in engine.spending_by_category() {
                println!("{:<14} {:>12}", method.as_str(), total.to_string());
            }
            return Ok(());
        }
        Command::Achievements { category } => {
            let category = category
                .as_deref()
                .map(|name| AchievementCategory::try_from(name))
                .transpose()?;
            for state in engine.achievements(category) {
                let mark = match (state.unlocked, state.claimed) {
                    (_, true) => "claimed",
                    (true, false) => "unlocked",
                    (false, _) => "locked",
                };
                println!(
                    "{} {:<20} {:<24} {:>3}/{:<3} {:>4} pts  {mark}",
                    state.definition.badge,
                    state.id(),
                    state.definition.title,
                    state.progress,
                    state.definition.target,
                    state.definition.points,
                );
            }
            println!(
                "{} points, {:.0}% complete",
                engine.total_points(),
                engine.achievement_progress() * 100.0
            );
            return Ok(());
        }
        Command::Transfer { to, amount, memo } => {
            engine.transfer(&to, amount, memo.as_deref()).await
        }
        Command::Send {
            to,
            amount,
            message,
        } => {
            engine
                .p2p_transfer(&to, amount, message.as_deref(), P2pMode::Send)
                .await
        }
        Command::Request {
            from,
            amount,
            message,
        } => {
            engine
                .p2p_transfer(&from, amount, message.as_deref(), P2pMode::Request)
                .await
        }
        Command::Split {
            total,
            participants,
            description,
        } => {
            engine
                .split_bill(&participants, total, description.as_deref())
                .await
        }
        Command::PayBill { payee, amount, due } => engine.pay_bill(&payee, amount, due).await,
        Command::PayBusiness { business, amount } => {
            engine.business_payment(&business, amount).await
        }
        Command::Scan { code, amount } => engine.pay_paycode(&code, amount).await,
        Command::RedEnvelope {
            amount_each,
            recipients,
            message,
        } => {
            engine
                .send_red_envelope(&recipients, amount_each, message.as_deref())
                .await
        }
        Command::Progress { id, delta } => engine.record_progress(&id, delta).await,
        Command::Claim { id } => engine.claim(&id).await,
        Command::Settings {
            dark_mode,
            notifications,
            biometric_login,
            auto_top_up,
            balance_visible,
            profile_visible,
            transaction_visibility,
        } => {
            let patch = SettingsPatch {
                dark_mode,
                notifications,
                biometric_login,
                auto_top_up,
                balance_visible,
                profile_visible,
                transaction_visibility: transaction_visibility.map(Into::into),
            };
            if patch.is_empty() {
                println!("{:#?}", engine.settings());
                return Ok(());
            }
            engine.update_settings(&patch).await
        }
    };

    report(&outcome);
    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

async fn open_store(config: &Database) -> Result<Arc<dyn SnapshotStore>, BoxError> {
    let url = match config {
        Database::Memory => return Ok(Arc::new(MemoryStore::new())),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(Arc::new(SqliteStore::new(database)))
}

fn report(outcome: &Outcome) {
    // Failures already reached the console through the notifier.
    if !outcome.success && outcome.error.is_none() {
        eprintln!("✖ {}", outcome.message);
    }
    for tx in &outcome.transactions {
        print_transaction(tx);
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    if dashboard.balance_visible {
        println!("Balance   {:>14}", dashboard.balance.to_string());
        println!("Savings   {:>14}", dashboard.savings.to_string());
    } else {
        println!("Balance   {:>14}", "••••••");
    }
    println!("This month{:>14}", dashboard.monthly_spending.to_string());
    println!(
        "Rewards   {} points, {}/{} unlocked",
        dashboard.total_points, dashboard.unlocked, dashboard.achievements
    );
    for envelope in &dashboard.received_envelopes {
        println!(
            "🧧 {} from {} on {}: {}",
            envelope.amount, envelope.from, envelope.date, envelope.message
        );
    }
    println!();
    for tx in &dashboard.recent {
        print_transaction(tx);
    }
}

fn print_transaction(tx: &Transaction) {
    let sign = match tx.direction() {
        Direction::Debit => "-",
        Direction::Credit => "+",
        Direction::Pending => " ",
    };
    println!(
        "{} {:<14} {:<20} {sign}{:>12} {:?}{}",
        tx.date,
        tx.method.as_str(),
        tx.counterpart(),
        tx.amount.to_string(),
        tx.status,
        tx.message
            .as_deref()
            .map(|m| format!("  {m}"))
            .unwrap_or_default(),
    );
}
