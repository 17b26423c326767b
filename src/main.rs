//! The Budget Buster command line interface.
//!
//! A thin presentation layer over [TransactionStore]: every subcommand maps
//! onto one store operation and renders its result as text.

use std::{env, error::Error, fs, path::PathBuf, process::exit, sync::OnceLock};

use clap::{Parser, Subcommand, ValueEnum};
use numfmt::{Formatter, Precision};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use budget_buster::{
    FileSlot, Transaction, TransactionFilter, TransactionId, TransactionStore, TransactionType,
    TransactionUpdate, TypeFilter, export_file_name,
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The environment variable that overrides the default data directory.
const DATA_DIR_ENV: &str = "BUDGET_BUSTER_DATA_DIR";

/// A personal finance tracker for income and expense transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory the transaction data is stored in. Defaults to the
    /// BUDGET_BUSTER_DATA_DIR environment variable, then ".budget-buster".
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new transaction.
    Add {
        /// Whether the transaction is income or an expense.
        #[arg(long = "type", value_enum)]
        kind: CliType,
        /// The amount of money, e.g. 1200.50. Must be positive.
        #[arg(long)]
        amount: f64,
        /// A category label, e.g. "Rent".
        #[arg(long)]
        category: String,
        /// The date the transaction happened (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        /// An optional free-text description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change fields of an existing transaction.
    Edit {
        /// The ID of the transaction to change.
        id: TransactionId,
        /// Replace the transaction type.
        #[arg(long = "type", value_enum)]
        kind: Option<CliType>,
        /// Replace the amount.
        #[arg(long)]
        amount: Option<f64>,
        /// Replace the category.
        #[arg(long)]
        category: Option<String>,
        /// Replace the date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        /// Replace the description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a transaction. Deleting an unknown ID is not an error.
    Delete {
        /// The ID of the transaction to delete.
        id: TransactionId,
    },
    /// List transactions, most recent date first.
    List {
        /// Show only transactions of this type.
        #[arg(long = "type", value_enum, default_value = "all")]
        kind: CliTypeFilter,
        /// Show only transactions whose category or description contains
        /// this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,
        /// Show only transactions on or after this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        from: Option<Date>,
        /// Show only transactions on or before this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        to: Option<Date>,
    },
    /// Show income and expense totals and the balance.
    Summary,
    /// Show aggregate statistics.
    Stats,
    /// Write all transactions to a JSON file.
    Export {
        /// The file to write. Defaults to budget_buster_<today>.json.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace all transactions with the contents of a JSON file.
    Import {
        /// The JSON file to read.
        input: PathBuf,
    },
    /// Delete all transactions.
    Clear,
}

/// The transaction type as a CLI argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl From<CliType> for TransactionType {
    fn from(value: CliType) -> Self {
        match value {
            CliType::Income => TransactionType::Income,
            CliType::Expense => TransactionType::Expense,
        }
    }
}

/// The type filter as a CLI argument.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum CliTypeFilter {
    /// Show both income and expenses.
    #[default]
    All,
    /// Show only income.
    Income,
    /// Show only expenses.
    Expense,
}

impl From<CliTypeFilter> for TypeFilter {
    fn from(value: CliTypeFilter) -> Self {
        match value {
            CliTypeFilter::All => TypeFilter::All,
            CliTypeFilter::Income => TypeFilter::Income,
            CliTypeFilter::Expense => TypeFilter::Expense,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);
    let mut store = TransactionStore::load(FileSlot::new(data_dir))?;

    match cli.command {
        Command::Add {
            kind,
            amount,
            category,
            date,
            description,
        } => {
            let date = date.unwrap_or_else(today);
            let transaction = store.create(
                Transaction::build(kind.into(), amount, &category, date)
                    .description(&description),
            )?;
            println!("Added transaction {}", transaction.id);
        }
        Command::Edit {
            id,
            kind,
            amount,
            category,
            date,
            description,
        } => {
            let changes = TransactionUpdate {
                kind: kind.map(TransactionType::from),
                amount,
                category,
                date,
                description,
            };
            let transaction = store.update(id, &changes)?;
            println!("Updated transaction {}", transaction.id);
        }
        Command::Delete { id } => {
            if store.delete(id)? {
                println!("Deleted transaction {id}");
            } else {
                println!("No transaction with ID {id}, nothing to delete");
            }
        }
        Command::List {
            kind,
            search,
            from,
            to,
        } => {
            let filter = TransactionFilter {
                type_filter: kind.into(),
                search_text: search,
                from_date: from,
                to_date: to,
            };
            print_transaction_list(&store.list(&filter));
        }
        Command::Summary => {
            let summary = store.summary();
            println!("Income:  {}", format_currency(summary.total_income));
            println!("Expense: {}", format_currency(summary.total_expense));
            println!(
                "Balance: {} ({})",
                format_currency(summary.balance),
                summary.balance_tag()
            );
        }
        Command::Stats => {
            let stats = store.stats();
            println!("Transactions: {}", stats.count);

            match stats.biggest_expense {
                Some(biggest) => println!(
                    "Biggest expense: {} ({})",
                    format_currency(biggest.amount),
                    biggest.category
                ),
                None => println!("Biggest expense: {}", format_currency(0.0)),
            }

            match stats.top_category {
                Some(top) => println!("Top category: {} ({} records)", top.name, top.count),
                None => println!("Top category: -"),
            }
        }
        Command::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(today())));
            let snapshot = store.export_snapshot()?;
            fs::write(&path, snapshot)?;
            println!(
                "Exported {} transaction(s) to {}",
                store.transactions().len(),
                path.display()
            );
        }
        Command::Import { input } => {
            if !input.is_file() {
                eprintln!("No such file: {}", input.display());
                exit(1);
            }
            let text = fs::read_to_string(&input)?;
            let accepted = store.import_json(&text)?;
            println!("Imported {accepted} transaction(s)");
        }
        Command::Clear => {
            store.clear_all()?;
            println!("All transactions deleted");
        }
    }

    Ok(())
}

/// The data directory: the `--data-dir` flag, then the environment, then
/// `.budget-buster` in the working directory.
fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".budget-buster"))
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn parse_date(text: &str) -> Result<Date, String> {
    Date::parse(text, DATE_FORMAT)
        .map_err(|error| format!("expected a date like 2024-01-15: {error}"))
}

fn print_transaction_list(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    for (index, transaction) in transactions.iter().enumerate() {
        let description = if transaction.description.is_empty() {
            "-"
        } else {
            transaction.description.as_str()
        };
        println!(
            "{:>3}. [{}] {:<8} {:<20} {:>12}  {}  {}",
            index + 1,
            transaction.date,
            transaction.kind.label(),
            transaction.category,
            format_currency(transaction.amount),
            transaction.id,
            description
        );
    }

    println!("{} item(s)", transactions.len());
}

fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("₹")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-₹")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return "₹0.00".to_owned();
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted_string.as_bytes()[formatted_string.len() - 3] != b'.' {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}
