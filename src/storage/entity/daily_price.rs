use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub price_id: i32,
    pub asset_id: i32, // 指向 assets.asset_id
    pub date: Date,

    #[sea_orm(nullable)]
    pub open: Option<f64>,
    #[sea_orm(nullable)]
    pub high: Option<f64>,
    #[sea_orm(nullable)]
    pub low: Option<f64>,
    pub close: f64, // 必填，> 0
    #[sea_orm(nullable)]
    pub volume_usd: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::AssetId"
    )]
    Asset,
}

impl ActiveModelBehavior for ActiveModel {}
