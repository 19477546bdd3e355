use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use rust_decimal::Decimal;
use tokio::sync::Mutex as AsyncMutex;

use crate::domain::{
    canonical_national_id, compute_fee, validate_cnpj, validate_cpf, Company, CompanyId, Customer,
    Transaction, TransactionKind,
};
use crate::notification::Notifier;
use crate::storage::Repository;

use super::AppError;

/// Application service providing the ledger operations. This is the
/// primary interface for any client (CLI, HTTP surface, etc.).
pub struct LedgerService {
    repo: Repository,
    notifier: Notifier,
    /// One lock per company: "read balance, validate, write balance,
    /// write transaction" must be serializable per company.
    company_locks: StdMutex<HashMap<CompanyId, Arc<AsyncMutex<()>>>>,
}

/// Result of a committed transaction.
#[derive(Debug)]
pub struct TransactionReceipt {
    pub transaction: Transaction,
    /// Total fee deducted from the requested amount
    pub fee: Decimal,
    /// Company balance after the commit
    pub new_balance: Decimal,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository, notifier: Notifier) -> Self {
        Self {
            repo,
            notifier,
            company_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str, notifier: Notifier) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo, notifier))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str, notifier: Notifier) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo, notifier))
    }

    // ========================
    // Customer operations
    // ========================

    /// Register a new customer. The CPF checksum is the sole gate
    /// before persistence.
    pub async fn register_customer(
        &self,
        cpf: &str,
        email: &str,
    ) -> Result<Customer, AppError> {
        if !validate_cpf(cpf) {
            return Err(AppError::InvalidCpf(cpf.to_string()));
        }

        // Identifiers are stored in canonical digit form
        let cpf = canonical_national_id(cpf);
        if self.repo.get_customer_by_cpf(&cpf).await?.is_some() {
            return Err(AppError::CustomerAlreadyExists(cpf));
        }

        let mut customer = Customer::new(cpf, email);
        self.repo.save_customer(&mut customer).await?;
        Ok(customer)
    }

    /// Get a customer by CPF.
    pub async fn get_customer(&self, cpf: &str) -> Result<Customer, AppError> {
        self.repo
            .get_customer_by_cpf(&canonical_national_id(cpf))
            .await?
            .ok_or_else(|| AppError::CustomerNotFound(cpf.to_string()))
    }

    /// List all registered customers.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self.repo.list_customers().await?)
    }

    // ========================
    // Company operations
    // ========================

    /// Register a new company with an opening balance and its
    /// administrative fee rate.
    pub async fn register_company(
        &self,
        cnpj: &str,
        balance: Decimal,
        admin_fee_rate: Decimal,
        webhook_url: Option<String>,
    ) -> Result<Company, AppError> {
        if !validate_cnpj(cnpj) {
            return Err(AppError::InvalidCnpj(cnpj.to_string()));
        }

        let cnpj = canonical_national_id(cnpj);
        if self.repo.get_company_by_cnpj(&cnpj).await?.is_some() {
            return Err(AppError::CompanyAlreadyExists(cnpj));
        }

        let mut company = Company::new(cnpj, balance, admin_fee_rate);
        if let Some(url) = webhook_url {
            company = company.with_webhook_url(url);
        }

        self.repo.save_company(&mut company).await?;
        Ok(company)
    }

    /// Get a company by CNPJ.
    pub async fn get_company(&self, cnpj: &str) -> Result<Company, AppError> {
        self.repo
            .get_company_by_cnpj(&canonical_national_id(cnpj))
            .await?
            .ok_or_else(|| AppError::CompanyNotFound(cnpj.to_string()))
    }

    /// List all registered companies.
    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        Ok(self.repo.list_companies().await?)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Execute a deposit or withdrawal against a company's balance.
    ///
    /// The fee (2% of the company's administrative fee rate, plus the
    /// caller's system fee when present) is deducted from the requested
    /// amount; the net amount is what moves the balance. A request
    /// whose fee meets or exceeds the amount is rejected, as is a
    /// withdrawal the company's balance cannot cover, with no mutation.
    ///
    /// Balance check and balance update run under the company's lock
    /// and commit in a single database transaction; notifications are
    /// delivered after commit and never affect the outcome.
    pub async fn execute_transaction(
        &self,
        cpf: &str,
        cnpj: &str,
        amount: Decimal,
        kind: TransactionKind,
        system_fee: Option<Decimal>,
    ) -> Result<TransactionReceipt, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(amount.to_string()));
        }

        let customer = self.get_customer(cpf).await?;
        let company = self.get_company(cnpj).await?;

        let fee = compute_fee(company.admin_fee_rate, system_fee);
        let net_amount = amount - fee;

        // A fee that swallows the whole amount would make a deposit
        // debit the balance (and vice versa); nothing moves
        if net_amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(format!(
                "{} (taxa {})",
                amount, fee
            )));
        }

        let (transaction, new_balance) = {
            let lock = self.lock_for(company.id);
            let _guard = lock.lock().await;

            // Fresh read under the lock: the lookup above may be stale
            let balance = self.repo.get_company_balance(company.id).await?;

            if kind == TransactionKind::Withdrawal && balance < net_amount {
                return Err(AppError::InsufficientBalance {
                    cnpj: company.cnpj.clone(),
                    balance,
                    required: net_amount,
                });
            }

            let new_balance = match kind {
                TransactionKind::Deposit => balance + net_amount,
                TransactionKind::Withdrawal => balance - net_amount,
            };

            let mut transaction =
                Transaction::new(customer.id, company.id, net_amount, kind, system_fee);
            self.repo
                .commit_transaction(&mut transaction, company.id, new_balance)
                .await?;

            (transaction, new_balance)
        };

        tracing::info!(
            id = transaction.id,
            kind = %kind,
            amount = %transaction.amount,
            cnpj = %company.cnpj,
            "transaction committed"
        );

        // Delivered after commit, outside the lock: failures are logged
        // and swallowed, and every call is timeout-bounded, so this can
        // delay the receipt but never fail it or undo the commit.
        self.notifier.notify(&company, &customer, &transaction).await;

        Ok(TransactionReceipt {
            transaction,
            fee,
            new_balance,
        })
    }

    /// List all transactions.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    /// List transactions for a customer, by CPF.
    pub async fn list_transactions_for_customer(
        &self,
        cpf: &str,
    ) -> Result<Vec<Transaction>, AppError> {
        let customer = self.get_customer(cpf).await?;
        Ok(self.repo.list_transactions_for_customer(customer.id).await?)
    }

    /// List transactions for a company, by CNPJ.
    pub async fn list_transactions_for_company(
        &self,
        cnpj: &str,
    ) -> Result<Vec<Transaction>, AppError> {
        let company = self.get_company(cnpj).await?;
        Ok(self.repo.list_transactions_for_company(company.id).await?)
    }

    fn lock_for(&self, company_id: CompanyId) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .company_locks
            .lock()
            .expect("company lock map poisoned");
        locks.entry(company_id).or_default().clone()
    }
}
