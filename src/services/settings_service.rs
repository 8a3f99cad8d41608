use std::sync::Arc;

use sea_orm::{ prelude::Decimal, ConnectionTrait, DatabaseConnection };
use serde::{ Deserialize, Serialize };

use crate::amount;
use crate::config::BootstrapConfig;
use crate::db::entity::platform_config;
use crate::db::{ PlatformConfigInput, PlatformConfigRepository };
use crate::error::{ AppError, Result };
use crate::services::withdrawal_service::WithdrawalLimits;

/// 0.001 BTC
pub const DEFAULT_MIN_DEPOSIT: Decimal = Decimal::from_parts(1, 0, 0, false, 3);
/// 0.001 BTC
pub const DEFAULT_MIN_WITHDRAWAL: Decimal = Decimal::from_parts(1, 0, 0, false, 3);
/// 100 BTC
pub const DEFAULT_MAX_WITHDRAWAL: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    pub deposit_address: String,
    pub admin_wallet: String,
    pub min_deposit: Decimal,
    pub min_withdrawal: Decimal,
    pub max_withdrawal: Decimal,
}

impl PlatformSettings {
    pub fn withdrawal_limits(&self) -> WithdrawalLimits {
        WithdrawalLimits {
            min: self.min_withdrawal,
            max: self.max_withdrawal,
        }
    }
}

impl From<platform_config::Model> for PlatformSettings {
    fn from(config: platform_config::Model) -> Self {
        Self {
            deposit_address: config.deposit_address,
            admin_wallet: config.admin_wallet,
            min_deposit: config.min_deposit,
            min_withdrawal: config.min_withdrawal,
            max_withdrawal: config.max_withdrawal,
        }
    }
}

pub struct SettingsService {
    db: DatabaseConnection,
    repository: Arc<PlatformConfigRepository>,
    defaults: BootstrapConfig,
}

impl SettingsService {
    pub fn new(
        db: DatabaseConnection,
        repository: Arc<PlatformConfigRepository>,
        defaults: BootstrapConfig
    ) -> Self {
        Self {
            db,
            repository,
            defaults,
        }
    }

    fn default_settings(&self) -> PlatformSettings {
        PlatformSettings {
            deposit_address: self.defaults.deposit_address.clone(),
            admin_wallet: self.defaults.admin_wallet.clone(),
            min_deposit: DEFAULT_MIN_DEPOSIT,
            min_withdrawal: DEFAULT_MIN_WITHDRAWAL,
            max_withdrawal: DEFAULT_MAX_WITHDRAWAL,
        }
    }

    /// Stored settings, or the configured defaults when none were saved yet.
    pub async fn current<C: ConnectionTrait>(&self, conn: &C) -> Result<PlatformSettings> {
        Ok(
            self.repository
                .find(conn).await?
                .map(PlatformSettings::from)
                .unwrap_or_else(|| self.default_settings())
        )
    }

    pub async fn update(&self, input: PlatformConfigInput) -> Result<PlatformSettings> {
        let input = validate(input)?;

        self.seed().await?;
        let current = self.repository
            .find(&self.db).await?
            .ok_or_else(|| AppError::Internal("Platform settings row missing".to_string()))?;

        let base = PlatformSettings::from(current.clone());
        let min_withdrawal = input.min_withdrawal.unwrap_or(base.min_withdrawal);
        let max_withdrawal = input.max_withdrawal.unwrap_or(base.max_withdrawal);
        if min_withdrawal > max_withdrawal {
            return Err(
                AppError::InvalidInput(
                    "minWithdrawal cannot exceed maxWithdrawal".to_string()
                )
            );
        }

        let saved = self.repository.update(current, input).await?;

        tracing::info!("Platform settings updated");
        Ok(saved.into())
    }

    /// Creates the settings row from defaults. Returns `false` when one exists,
    /// including when a concurrent caller created it first.
    pub async fn seed(&self) -> Result<bool> {
        let defaults = self.default_settings();

        self.repository.insert_if_absent(
            defaults.deposit_address,
            defaults.admin_wallet,
            defaults.min_deposit,
            defaults.min_withdrawal,
            defaults.max_withdrawal
        ).await
    }
}

/// Blank strings are treated as "leave unchanged"; amounts must be positive.
fn validate(input: PlatformConfigInput) -> Result<PlatformConfigInput> {
    let non_blank = |value: Option<String>| {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };

    Ok(PlatformConfigInput {
        deposit_address: non_blank(input.deposit_address),
        admin_wallet: non_blank(input.admin_wallet),
        min_deposit: input.min_deposit
            .map(|v| amount::validate_positive(v, "minDeposit"))
            .transpose()?,
        min_withdrawal: input.min_withdrawal
            .map(|v| amount::validate_positive(v, "minWithdrawal"))
            .transpose()?,
        max_withdrawal: input.max_withdrawal
            .map(|v| amount::validate_positive(v, "maxWithdrawal"))
            .transpose()?,
    })
}
