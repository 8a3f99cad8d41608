use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Operator-managed platform settings. At most one row exists.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "platform_config")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub deposit_address: String,
    pub admin_wallet: String,
    #[sea_orm(column_type = "Decimal(Some((16, 8)))")]
    pub min_deposit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 8)))")]
    pub min_withdrawal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 8)))")]
    pub max_withdrawal: Decimal,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
