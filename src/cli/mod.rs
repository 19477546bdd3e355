use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::application::{AppError, LedgerService};
use crate::config::NotificationConfig;
use crate::domain::{Transaction, TransactionKind};
use crate::notification::Notifier;

/// Caixa - Company transaction ledger
#[derive(Parser)]
#[command(name = "caixa")]
#[command(about = "A transaction ledger for company accounts with CPF/CNPJ validation")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "caixa.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Company management commands
    #[command(subcommand)]
    Company(CompanyCommands),

    /// Execute a deposit or withdrawal against a company
    Transact {
        /// Requested amount (e.g., "500.00"); the fee is deducted from it
        amount: String,

        /// Customer CPF
        #[arg(long)]
        cpf: String,

        /// Company CNPJ
        #[arg(long)]
        cnpj: String,

        /// Transaction kind: deposito, saque
        #[arg(short, long)]
        kind: String,

        /// Additional system fee (omit for none)
        #[arg(long)]
        system_fee: Option<String>,
    },

    /// List transactions
    Transactions {
        /// Filter by customer CPF
        #[arg(long)]
        cpf: Option<String>,

        /// Filter by company CNPJ
        #[arg(long)]
        cnpj: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Register a new customer
    Add {
        /// Customer CPF (11 digits, punctuation allowed)
        cpf: String,

        /// Email address for transaction confirmations
        #[arg(short, long)]
        email: String,
    },

    /// List all customers
    List,

    /// Show a customer by CPF
    Show {
        /// Customer CPF
        cpf: String,
    },
}

#[derive(Subcommand)]
pub enum CompanyCommands {
    /// Register a new company
    Add {
        /// Company CNPJ (14 digits, punctuation allowed)
        cnpj: String,

        /// Opening balance
        #[arg(short, long, default_value = "0")]
        balance: String,

        /// Administrative fee rate used in fee computation
        #[arg(short, long, default_value = "0")]
        fee_rate: String,

        /// Endpoint for post-transaction callbacks
        #[arg(long)]
        webhook_url: Option<String>,
    },

    /// List all companies
    List,

    /// Show a company by CNPJ
    Show {
        /// Company CNPJ
        cnpj: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let notifier = Notifier::from_config(&NotificationConfig::from_env())?;

        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database, notifier).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Customer(customer_cmd) => {
                let service = LedgerService::connect(&self.database, notifier).await?;
                run_customer_command(&service, customer_cmd).await?;
            }

            Commands::Company(company_cmd) => {
                let service = LedgerService::connect(&self.database, notifier).await?;
                run_company_command(&service, company_cmd).await?;
            }

            Commands::Transact {
                amount,
                cpf,
                cnpj,
                kind,
                system_fee,
            } => {
                let service = LedgerService::connect(&self.database, notifier).await?;

                let amount = parse_amount(&amount)?;
                let kind = TransactionKind::from_str(&kind)
                    .ok_or_else(|| AppError::InvalidTransactionKind(kind.clone()))?;
                let system_fee = system_fee.as_deref().map(parse_amount).transpose()?;

                let receipt = service
                    .execute_transaction(&cpf, &cnpj, amount, kind, system_fee)
                    .await?;

                println!(
                    "Transaction {} committed: {} {} (fee {}), company balance {}",
                    receipt.transaction.id,
                    receipt.transaction.kind,
                    receipt.transaction.amount,
                    receipt.fee,
                    receipt.new_balance
                );
            }

            Commands::Transactions { cpf, cnpj } => {
                let service = LedgerService::connect(&self.database, notifier).await?;
                let transactions = match (cpf, cnpj) {
                    (Some(_), Some(_)) => {
                        anyhow::bail!("Use either --cpf or --cnpj, not both")
                    }
                    (Some(cpf), None) => service.list_transactions_for_customer(&cpf).await?,
                    (None, Some(cnpj)) => service.list_transactions_for_company(&cnpj).await?,
                    (None, None) => service.list_transactions().await?,
                };
                print_transactions(&transactions);
            }
        }

        Ok(())
    }
}

async fn run_customer_command(service: &LedgerService, cmd: CustomerCommands) -> Result<()> {
    match cmd {
        CustomerCommands::Add { cpf, email } => {
            let customer = service.register_customer(&cpf, &email).await?;
            println!("Registered customer {} ({})", customer.cpf, customer.id);
        }

        CustomerCommands::List => {
            let customers = service.list_customers().await?;
            if customers.is_empty() {
                println!("No customers registered");
                return Ok(());
            }
            for customer in customers {
                println!("{:>6}  {}  {}", customer.id, customer.cpf, customer.email);
            }
        }

        CustomerCommands::Show { cpf } => {
            let customer = service.get_customer(&cpf).await?;
            println!("Customer {}", customer.id);
            println!("  CPF:        {}", customer.cpf);
            println!("  Email:      {}", customer.email);
            println!("  Registered: {}", customer.created_at.to_rfc3339());
        }
    }
    Ok(())
}

async fn run_company_command(service: &LedgerService, cmd: CompanyCommands) -> Result<()> {
    match cmd {
        CompanyCommands::Add {
            cnpj,
            balance,
            fee_rate,
            webhook_url,
        } => {
            let balance = parse_amount(&balance)?;
            let fee_rate = parse_amount(&fee_rate)?;
            let company = service
                .register_company(&cnpj, balance, fee_rate, webhook_url)
                .await?;
            println!("Registered company {} ({})", company.cnpj, company.id);
        }

        CompanyCommands::List => {
            let companies = service.list_companies().await?;
            if companies.is_empty() {
                println!("No companies registered");
                return Ok(());
            }
            for company in companies {
                println!(
                    "{:>6}  {}  balance {}  fee rate {}",
                    company.id, company.cnpj, company.balance, company.admin_fee_rate
                );
            }
        }

        CompanyCommands::Show { cnpj } => {
            let company = service.get_company(&cnpj).await?;
            println!("Company {}", company.id);
            println!("  CNPJ:       {}", company.cnpj);
            println!("  Balance:    {}", company.balance);
            println!("  Fee rate:   {}", company.admin_fee_rate);
            if let Some(url) = &company.webhook_url {
                println!("  Webhook:    {}", url);
            }
            println!("  Registered: {}", company.created_at.to_rfc3339());
        }
    }
    Ok(())
}

fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions recorded");
        return;
    }
    for tx in transactions {
        println!(
            "{:>6}  {}  {}  {}  customer {} -> company {}",
            tx.id,
            tx.created_at.format("%Y-%m-%d %H:%M:%S"),
            tx.kind,
            tx.amount,
            tx.customer_id,
            tx.company_id
        );
    }
}

fn parse_amount(input: &str) -> Result<Decimal> {
    Decimal::from_str(input.trim())
        .with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}
