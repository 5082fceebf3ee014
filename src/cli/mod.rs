use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::application::{CategoryReport, LedgerService};
use crate::bridge::{Bridge, StatsView, TransactionView};
use crate::config::{resolve_database_path, DATABASE_ENV};
use crate::domain::{
    format_cents, parse_cents, parse_date, suggested_categories, NewTransaction, Stats,
    Transaction, TransactionType,
};
use crate::logging::init_tracing;

/// Budget Ledger - income and expense tracking
#[derive(Parser)]
#[command(name = "budget-ledger")]
#[command(about = "A local-first income and expense ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path (defaults to the per-user data directory)
    #[arg(long, global = true, env = DATABASE_ENV)]
    pub database: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database if it does not exist yet
    Init,

    /// Record an income or expense
    Add {
        /// Amount (e.g., "40.00" or "40")
        amount: String,

        /// Transaction type: income, expense
        #[arg(short = 't', long = "type")]
        transaction_type: String,

        /// Category label (e.g., "Jedzenie", "Pensja")
        #[arg(short, long)]
        category: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List transactions, most recent first
    List {
        /// Show only the N most recent transactions
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Delete a transaction by id
    Delete {
        /// Transaction id
        id: i64,
    },

    /// Show total income, total expenses and balance
    Stats {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Totals per category
    Report {
        /// Transaction type: income, expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        transaction_type: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show suggested category labels
    Categories {
        /// Transaction type: income, expense (omit for both)
        #[arg(short = 't', long = "type")]
        transaction_type: Option<String>,
    },

    /// Export all transactions
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Serve JSON requests on stdin, one reply per line on stdout
    Serve,

    /// Print the resolved database path
    Path,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);
        let database = resolve_database_path(self.database);

        match self.command {
            Commands::Init => {
                let service = LedgerService::open(&database).await?;
                service.close().await;
                println!("Database initialized: {}", database.display());
            }

            Commands::Add {
                amount,
                transaction_type,
                category,
                date,
                description,
            } => {
                let service = LedgerService::open(&database).await?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '40.00' or '40'")?;
                let transaction_type = parse_type(&transaction_type)?;
                let date = match date {
                    Some(date_str) => parse_date(&date_str)?,
                    None => Local::now().date_naive(),
                };

                let new = NewTransaction::new(amount_cents, transaction_type, category, date)
                    .with_description(description.unwrap_or_default());
                let tx = service.create_transaction(new).await?;

                println!(
                    "Recorded {}: {} {} on {} (#{})",
                    tx.transaction_type,
                    format_cents(tx.amount_cents),
                    tx.category,
                    tx.date,
                    tx.id
                );
            }

            Commands::List { limit, format } => {
                let service = LedgerService::open(&database).await?;
                let transactions = match limit {
                    Some(limit) => service.recent_transactions(limit).await?,
                    None => service.list_transactions().await?,
                };
                print_transactions(&transactions, &format)?;
            }

            Commands::Delete { id } => {
                let service = LedgerService::open(&database).await?;
                if service.delete_transaction(id).await? {
                    println!("Deleted transaction #{}", id);
                } else {
                    println!("No transaction with id {}", id);
                }
            }

            Commands::Stats { format } => {
                let service = LedgerService::open(&database).await?;
                let stats = service.stats().await?;
                print_stats(stats, &format)?;
            }

            Commands::Report {
                transaction_type,
                format,
            } => {
                let service = LedgerService::open(&database).await?;
                let report = service
                    .category_breakdown(parse_type(&transaction_type)?)
                    .await?;
                print_report(&report, &format)?;
            }

            Commands::Categories { transaction_type } => {
                run_categories_command(transaction_type.as_deref())?;
            }

            Commands::Export { output, format } => {
                let service = LedgerService::open(&database).await?;
                run_export_command(&service, output.as_deref(), &format).await?;
            }

            Commands::Serve => {
                let service = LedgerService::open(&database).await?;
                let bridge = Bridge::new(service);
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                bridge.serve(stdin, tokio::io::stdout()).await?;
                bridge.into_inner().close().await;
            }

            Commands::Path => {
                println!("{}", database.display());
            }
        }

        Ok(())
    }
}

fn parse_type(input: &str) -> Result<TransactionType> {
    input
        .to_lowercase()
        .parse::<TransactionType>()
        .with_context(|| format!("Invalid type '{}'. Valid types: income, expense", input))
}

fn run_categories_command(transaction_type: Option<&str>) -> Result<()> {
    let types = match transaction_type {
        Some(t) => vec![parse_type(t)?],
        None => TransactionType::ALL.to_vec(),
    };
    for t in types {
        println!("{}: {}", t, suggested_categories(t).join(", "));
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        "csv" => exporter.export_csv(writer).await?,
        "json" => exporter.export_json(writer).await?,
        _ => anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format),
    };
    if output.is_some() {
        eprintln!("Exported {} transactions", count);
    }
    Ok(())
}

fn print_transactions(transactions: &[Transaction], format: &str) -> Result<()> {
    match format {
        "json" => {
            let views: Vec<TransactionView> =
                transactions.iter().map(TransactionView::from).collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        "table" => {
            if transactions.is_empty() {
                println!("No transactions found.");
                return Ok(());
            }
            println!(
                "{:>6} {:<12} {:<8} {:>12} {:<15} DESCRIPTION",
                "ID", "DATE", "TYPE", "AMOUNT", "CATEGORY"
            );
            println!("{}", "-".repeat(72));
            for tx in transactions {
                println!(
                    "{:>6} {:<12} {:<8} {:>12} {:<15} {}",
                    tx.id,
                    tx.date,
                    tx.transaction_type,
                    format_cents(tx.signed_amount()),
                    truncate(&tx.category, 15),
                    truncate(&tx.description, 30)
                );
            }
        }
        _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
    }
    Ok(())
}

fn print_stats(stats: Stats, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&StatsView::from(stats))?),
        "table" => {
            println!("Total Income:   {:>15}", format_cents(stats.total_income));
            println!("Total Expenses: {:>15}", format_cents(stats.total_expenses));
            println!("{}", "-".repeat(31));
            println!("Balance:        {:>15}", format_cents(stats.balance));
        }
        _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
    }
    Ok(())
}

fn print_report(report: &CategoryReport, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        "table" => {
            if report.categories.is_empty() {
                println!("No {} transactions found.", report.transaction_type);
                return Ok(());
            }
            println!("{:<20} {:>12} {:>6} {:>8}", "CATEGORY", "TOTAL", "COUNT", "%");
            println!("{}", "-".repeat(49));
            for summary in &report.categories {
                println!(
                    "{:<20} {:>12} {:>6} {:>7.1}%",
                    truncate(&summary.category, 20),
                    format_cents(summary.total),
                    summary.count,
                    summary.percentage
                );
            }
            println!("{}", "-".repeat(49));
            println!("{:<20} {:>12}", "TOTAL", format_cents(report.total));
        }
        _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
    }
    Ok(())
}

/// Shorten to at most `max_len` characters, counting chars rather than bytes.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
