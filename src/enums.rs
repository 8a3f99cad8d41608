use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── DepositStatus ──────────────────────────────────────────────────

/// Lifecycle of a user-submitted deposit claim.
///
/// `pending → confirmed | cancelled`; both outcomes are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Confirmed => "confirmed",
            DepositStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: DepositStatus) -> bool {
        match (self, next) {
            (DepositStatus::Pending, DepositStatus::Confirmed) => true,
            (DepositStatus::Pending, DepositStatus::Cancelled) => true,
            (DepositStatus::Pending, DepositStatus::Pending) => false,
            (DepositStatus::Confirmed, _) | (DepositStatus::Cancelled, _) => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DepositStatus::Confirmed | DepositStatus::Cancelled)
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DepositStatus::Pending),
            "confirmed" => Ok(DepositStatus::Confirmed),
            "cancelled" => Ok(DepositStatus::Cancelled),
            _ => Err(AppError::InvalidInput(format!("Invalid deposit status: {}", s))),
        }
    }
}

// ─── WithdrawalStatus ───────────────────────────────────────────────

/// Lifecycle of a payout request.
///
/// `pending → approved | cancelled`, `approved → sent | cancelled`.
/// `sent` and `cancelled` are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Sent => "sent",
            WithdrawalStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: WithdrawalStatus) -> bool {
        match (self, next) {
            (WithdrawalStatus::Pending, WithdrawalStatus::Approved) => true,
            (WithdrawalStatus::Pending, WithdrawalStatus::Cancelled) => true,
            (WithdrawalStatus::Approved, WithdrawalStatus::Sent) => true,
            (WithdrawalStatus::Approved, WithdrawalStatus::Cancelled) => true,
            (WithdrawalStatus::Pending, _) | (WithdrawalStatus::Approved, _) => false,
            (WithdrawalStatus::Sent, _) | (WithdrawalStatus::Cancelled, _) => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WithdrawalStatus::Sent | WithdrawalStatus::Cancelled)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "sent" => Ok(WithdrawalStatus::Sent),
            "cancelled" => Ok(WithdrawalStatus::Cancelled),
            _ => Err(AppError::InvalidInput(format!("Invalid withdrawal status: {}", s))),
        }
    }
}

// ─── TransactionType ────────────────────────────────────────────────

/// Category of a ledger entry. Credits are recorded as `deposit`,
/// debits as `withdrawal`, whatever their origin.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            _ => Err(AppError::InvalidInput(format!("Invalid transaction type: {}", s))),
        }
    }
}

// ─── AdjustmentDirection ────────────────────────────────────────────

/// Direction of a manual balance correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    Credit,
    Debit,
}

impl AdjustmentDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentDirection::Credit => "credit",
            AdjustmentDirection::Debit => "debit",
        }
    }

    /// Ledger entry type recorded for this direction.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            AdjustmentDirection::Credit => TransactionType::Deposit,
            AdjustmentDirection::Debit => TransactionType::Withdrawal,
        }
    }

    /// Applies the direction's sign to a positive amount.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            AdjustmentDirection::Credit => amount,
            AdjustmentDirection::Debit => -amount,
        }
    }
}

impl fmt::Display for AdjustmentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(AdjustmentDirection::Credit),
            "debit" => Ok(AdjustmentDirection::Debit),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid adjustment type: {}. Supported: credit, debit",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_transitions_only_leave_pending() {
        assert!(DepositStatus::Pending.can_transition_to(DepositStatus::Confirmed));
        assert!(DepositStatus::Pending.can_transition_to(DepositStatus::Cancelled));
        assert!(!DepositStatus::Confirmed.can_transition_to(DepositStatus::Confirmed));
        assert!(!DepositStatus::Confirmed.can_transition_to(DepositStatus::Pending));
        assert!(!DepositStatus::Cancelled.can_transition_to(DepositStatus::Confirmed));
    }

    #[test]
    fn withdrawal_transitions_follow_payout_order() {
        use WithdrawalStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Sent));
        assert!(Approved.can_transition_to(Sent));
        assert!(Approved.can_transition_to(Cancelled));
        assert!(!Approved.can_transition_to(Pending));

        for next in [Pending, Approved, Sent, Cancelled] {
            assert!(!Sent.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn status_strings_match_stored_vocabulary() {
        assert_eq!(DepositStatus::Confirmed.to_string(), "confirmed");
        assert_eq!(WithdrawalStatus::Sent.to_string(), "sent");
        assert_eq!(TransactionType::Withdrawal.to_string(), "withdrawal");
        assert_eq!("CANCELLED".parse::<WithdrawalStatus>().unwrap(), WithdrawalStatus::Cancelled);
        assert!("refunded".parse::<DepositStatus>().is_err());
    }

    #[test]
    fn adjustment_direction_maps_to_signed_entry() {
        let amount = Decimal::new(5, 1);

        assert_eq!(AdjustmentDirection::Credit.signed(amount), amount);
        assert_eq!(AdjustmentDirection::Debit.signed(amount), -amount);
        assert_eq!(AdjustmentDirection::Credit.transaction_type(), TransactionType::Deposit);
        assert_eq!(AdjustmentDirection::Debit.transaction_type(), TransactionType::Withdrawal);
        assert_eq!("debit".parse::<AdjustmentDirection>().unwrap(), AdjustmentDirection::Debit);
    }
}
