use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse failure classes, used at the boundary to map errors to
/// distinguishable responses (404 / 400 / 400 / 500 on an HTTP
/// surface, exit codes on the CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    InvalidInput,
    InvalidState,
    Internal,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cliente não encontrado: {0}")]
    CustomerNotFound(String),

    #[error("Empresa não encontrada: {0}")]
    CompanyNotFound(String),

    #[error("Cliente já cadastrado: {0}")]
    CustomerAlreadyExists(String),

    #[error("Empresa já cadastrada: {0}")]
    CompanyAlreadyExists(String),

    #[error("CPF inválido: {0}")]
    InvalidCpf(String),

    #[error("CNPJ inválido: {0}")]
    InvalidCnpj(String),

    #[error("Valor inválido: {0}")]
    InvalidAmount(String),

    #[error("Tipo de transação desconhecido: {0}")]
    InvalidTransactionKind(String),

    #[error("Saldo insuficiente na empresa {cnpj}: saldo {balance}, necessário {required}")]
    InsufficientBalance {
        cnpj: String,
        balance: Decimal,
        required: Decimal,
    },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::CustomerNotFound(_) | AppError::CompanyNotFound(_) => {
                ErrorCategory::NotFound
            }
            AppError::CustomerAlreadyExists(_)
            | AppError::CompanyAlreadyExists(_)
            | AppError::InvalidCpf(_)
            | AppError::InvalidCnpj(_)
            | AppError::InvalidAmount(_)
            | AppError::InvalidTransactionKind(_) => ErrorCategory::InvalidInput,
            AppError::InsufficientBalance { .. } => ErrorCategory::InvalidState,
            AppError::Database(_) => ErrorCategory::Internal,
        }
    }
}
