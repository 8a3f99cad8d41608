use sea_orm::{
    sea_query::OnConflict,
    ActiveModelTrait,
    ConnectionTrait,
    DatabaseConnection,
    EntityTrait,
    Set,
    prelude::Decimal,
};
use uuid::Uuid;

use crate::amount;
use crate::db::entity::{ platform_config, PlatformConfig };
use crate::error::Result;

/// Fields of a settings update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PlatformConfigInput {
    pub deposit_address: Option<String>,
    pub admin_wallet: Option<String>,
    pub min_deposit: Option<Decimal>,
    pub min_withdrawal: Option<Decimal>,
    pub max_withdrawal: Option<Decimal>,
}

/// Primary key of the only settings row. Concurrent seeding collides on it.
pub const SETTINGS_ID: Uuid = Uuid::from_u128(1);

pub struct PlatformConfigRepository {
    db: DatabaseConnection,
}

impl PlatformConfigRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads the settings row through `conn`, which may be an open transaction.
    pub async fn find<C: ConnectionTrait>(
        &self,
        conn: &C
    ) -> Result<Option<platform_config::Model>> {
        let config = PlatformConfig::find_by_id(SETTINGS_ID).one(conn).await?;
        Ok(config.map(normalized))
    }

    /// Inserts the settings row unless one exists. Returns whether it did.
    pub async fn insert_if_absent(
        &self,
        deposit_address: String,
        admin_wallet: String,
        min_deposit: Decimal,
        min_withdrawal: Decimal,
        max_withdrawal: Decimal
    ) -> Result<bool> {
        let config = platform_config::ActiveModel {
            id: Set(SETTINGS_ID),
            deposit_address: Set(deposit_address),
            admin_wallet: Set(admin_wallet),
            min_deposit: Set(min_deposit),
            min_withdrawal: Set(min_withdrawal),
            max_withdrawal: Set(max_withdrawal),
            updated_at: Set(chrono::Utc::now()),
        };

        let inserted = PlatformConfig::insert(config)
            .on_conflict(
                OnConflict::column(platform_config::Column::Id).do_nothing().to_owned()
            )
            .exec_without_returning(&self.db).await?;

        Ok(inserted > 0)
    }

    pub async fn update(
        &self,
        current: platform_config::Model,
        input: PlatformConfigInput
    ) -> Result<platform_config::Model> {
        let mut active: platform_config::ActiveModel = current.into();

        if let Some(deposit_address) = input.deposit_address {
            active.deposit_address = Set(deposit_address);
        }
        if let Some(admin_wallet) = input.admin_wallet {
            active.admin_wallet = Set(admin_wallet);
        }
        if let Some(min_deposit) = input.min_deposit {
            active.min_deposit = Set(min_deposit);
        }
        if let Some(min_withdrawal) = input.min_withdrawal {
            active.min_withdrawal = Set(min_withdrawal);
        }
        if let Some(max_withdrawal) = input.max_withdrawal {
            active.max_withdrawal = Set(max_withdrawal);
        }
        active.updated_at = Set(chrono::Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(normalized(updated))
    }
}

fn normalized(mut config: platform_config::Model) -> platform_config::Model {
    config.min_deposit = amount::normalize(config.min_deposit);
    config.min_withdrawal = amount::normalize(config.min_withdrawal);
    config.max_withdrawal = amount::normalize(config.max_withdrawal);
    config
}
