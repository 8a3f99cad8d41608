pub mod deposit_service;
pub mod withdrawal_service;
pub mod adjustment_service;
pub mod settings_service;
pub mod ledger_engine;

pub use deposit_service::{ DepositConfirmation, DepositService };
pub use withdrawal_service::{ WithdrawalLimits, WithdrawalPayout, WithdrawalService };
pub use adjustment_service::{ Adjustment, AdjustmentService };
pub use settings_service::{ PlatformSettings, SettingsService };
pub use ledger_engine::{
    DepositView,
    InitOutcome,
    LedgerEngine,
    OwnerSummary,
    Reconciliation,
    WithdrawalView,
};
