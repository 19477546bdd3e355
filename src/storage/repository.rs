use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};

use crate::domain::{
    Company, CompanyId, Customer, CustomerId, Transaction, TransactionKind,
};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying customers, companies and
/// transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Customer operations
    // ========================

    /// Save a new customer, assigning its surrogate id.
    pub async fn save_customer(&self, customer: &mut Customer) -> Result<()> {
        let row = sqlx::query(
            r#"
            INSERT INTO customers (cpf, email, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&customer.cpf)
        .bind(&customer.email)
        .bind(customer.created_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to save customer")?;

        customer.id = row.get("id");
        Ok(())
    }

    /// Get a customer by CPF (natural key).
    pub async fn get_customer_by_cpf(&self, cpf: &str) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, cpf, email, created_at
            FROM customers
            WHERE cpf = ?
            "#,
        )
        .bind(cpf)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch customer by CPF")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_customer(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a customer by surrogate id.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, cpf, email, created_at
            FROM customers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch customer")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_customer(&row)?)),
            None => Ok(None),
        }
    }

    /// List all customers.
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, cpf, email, created_at
            FROM customers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list customers")?;

        rows.iter().map(Self::row_to_customer).collect()
    }

    fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer> {
        Ok(Customer {
            id: row.get("id"),
            cpf: row.get("cpf"),
            email: row.get("email"),
            created_at: Self::parse_timestamp(row.get("created_at"))?,
        })
    }

    // ========================
    // Company operations
    // ========================

    /// Save a new company, assigning its surrogate id.
    pub async fn save_company(&self, company: &mut Company) -> Result<()> {
        let row = sqlx::query(
            r#"
            INSERT INTO companies (cnpj, balance, admin_fee_rate, webhook_url, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&company.cnpj)
        .bind(company.balance.to_string())
        .bind(company.admin_fee_rate.to_string())
        .bind(&company.webhook_url)
        .bind(company.created_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to save company")?;

        company.id = row.get("id");
        Ok(())
    }

    /// Get a company by CNPJ (natural key).
    pub async fn get_company_by_cnpj(&self, cnpj: &str) -> Result<Option<Company>> {
        let row = sqlx::query(
            r#"
            SELECT id, cnpj, balance, admin_fee_rate, webhook_url, created_at
            FROM companies
            WHERE cnpj = ?
            "#,
        )
        .bind(cnpj)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch company by CNPJ")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_company(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a company by surrogate id.
    pub async fn get_company(&self, id: CompanyId) -> Result<Option<Company>> {
        let row = sqlx::query(
            r#"
            SELECT id, cnpj, balance, admin_fee_rate, webhook_url, created_at
            FROM companies
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch company")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_company(&row)?)),
            None => Ok(None),
        }
    }

    /// Read the current balance for a company.
    pub async fn get_company_balance(&self, id: CompanyId) -> Result<Decimal> {
        let row = sqlx::query("SELECT balance FROM companies WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to fetch company balance")?;

        Self::parse_decimal(row.get("balance"))
    }

    /// List all companies.
    pub async fn list_companies(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query(
            r#"
            SELECT id, cnpj, balance, admin_fee_rate, webhook_url, created_at
            FROM companies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list companies")?;

        rows.iter().map(Self::row_to_company).collect()
    }

    fn row_to_company(row: &sqlx::sqlite::SqliteRow) -> Result<Company> {
        Ok(Company {
            id: row.get("id"),
            cnpj: row.get("cnpj"),
            balance: Self::parse_decimal(row.get("balance"))?,
            admin_fee_rate: Self::parse_decimal(row.get("admin_fee_rate"))?,
            webhook_url: row.get("webhook_url"),
            created_at: Self::parse_timestamp(row.get("created_at"))?,
        })
    }

    // ========================
    // Transaction operations
    // ========================

    /// Commit a transaction: write the company's new balance and insert
    /// the transaction row inside a single database transaction, so the
    /// persisted transaction and the updated balance are always
    /// mutually consistent. Assigns the transaction's surrogate id.
    pub async fn commit_transaction(
        &self,
        transaction: &mut Transaction,
        company_id: CompanyId,
        new_balance: Decimal,
    ) -> Result<()> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin database transaction")?;

        sqlx::query("UPDATE companies SET balance = ? WHERE id = ?")
            .bind(new_balance.to_string())
            .bind(company_id)
            .execute(&mut *db_tx)
            .await
            .context("Failed to update company balance")?;

        let row = sqlx::query(
            r#"
            INSERT INTO transactions (customer_id, company_id, amount, kind, system_fee, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(transaction.customer_id)
        .bind(transaction.company_id)
        .bind(transaction.amount.to_string())
        .bind(transaction.kind.as_str())
        .bind(transaction.system_fee.map(|f| f.to_string()))
        .bind(transaction.created_at.to_rfc3339())
        .fetch_one(&mut *db_tx)
        .await
        .context("Failed to save transaction")?;

        transaction.id = row.get("id");

        db_tx
            .commit()
            .await
            .context("Failed to commit transaction")?;
        Ok(())
    }

    /// List all transactions, oldest first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, company_id, amount, kind, system_fee, created_at
            FROM transactions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List transactions for a customer.
    pub async fn list_transactions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, company_id, amount, kind, system_fee, created_at
            FROM transactions
            WHERE customer_id = ?
            ORDER BY id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions for customer")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List transactions for a company.
    pub async fn list_transactions_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, company_id, amount, kind, system_fee, created_at
            FROM transactions
            WHERE company_id = ?
            ORDER BY id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions for company")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let kind_str: String = row.get("kind");
        let system_fee_str: Option<String> = row.get("system_fee");

        Ok(Transaction {
            id: row.get("id"),
            customer_id: row.get("customer_id"),
            company_id: row.get("company_id"),
            amount: Self::parse_decimal(row.get("amount"))?,
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            system_fee: system_fee_str
                .map(|s| Self::parse_decimal(s))
                .transpose()?,
            created_at: Self::parse_timestamp(row.get("created_at"))?,
        })
    }

    fn parse_decimal(value: String) -> Result<Decimal> {
        Decimal::from_str(&value).with_context(|| format!("Invalid decimal: {}", value))
    }

    fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(&value)
            .with_context(|| format!("Invalid timestamp: {}", value))?
            .with_timezone(&Utc))
    }
}
