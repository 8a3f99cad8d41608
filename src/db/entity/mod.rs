pub mod account;
pub mod deposit;
pub mod withdrawal;
pub mod transaction;
pub mod platform_config;

pub use account::Entity as Account;
pub use deposit::Entity as Deposit;
pub use withdrawal::Entity as Withdrawal;
pub use transaction::Entity as Transaction;
pub use platform_config::Entity as PlatformConfig;
