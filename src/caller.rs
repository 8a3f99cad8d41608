use uuid::Uuid;

use crate::error::{ AppError, Result };

/// The already-authenticated identity on whose behalf an engine operation runs.
///
/// Passed explicitly to every operation; the engine never looks up an ambient
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub account_id: Uuid,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(account_id: Uuid) -> Self {
        Self { account_id, is_admin: false }
    }

    pub fn admin(account_id: Uuid) -> Self {
        Self { account_id, is_admin: true }
    }

    pub fn require_admin(&self) -> Result<()> {
        if !self.is_admin {
            return Err(AppError::Forbidden("Admin privileges required".to_string()));
        }
        Ok(())
    }

    /// Users may only act on their own account.
    pub fn require_self(&self, user_id: Uuid) -> Result<()> {
        if self.account_id != user_id {
            return Err(AppError::Forbidden("Cannot act on another account".to_string()));
        }
        Ok(())
    }
}
