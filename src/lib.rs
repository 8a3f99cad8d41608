pub mod amount;
pub mod api;
pub mod caller;
pub mod config;
pub mod db;
pub mod enums;
pub mod error;
pub mod services;

pub use caller::Caller;
pub use config::Config;
pub use enums::{ AdjustmentDirection, DepositStatus, TransactionType, WithdrawalStatus };
pub use error::{ AppError, Result };
pub use services::LedgerEngine;
