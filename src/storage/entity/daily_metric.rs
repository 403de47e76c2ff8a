use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 派生指标表，与 daily_prices 同粒度 (asset_id, date)。每次运行整体重算。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub metric_id: i32,
    pub asset_id: i32,
    pub date: Date,

    #[sea_orm(nullable)]
    pub daily_return_pct: Option<f64>,
    #[sea_orm(nullable)]
    pub daily_range_pct: Option<f64>,
    #[sea_orm(nullable)]
    pub vol_7d: Option<f64>,
    #[sea_orm(nullable)]
    pub vol_30d: Option<f64>,
    #[sea_orm(nullable)]
    pub sma_7: Option<f64>,
    #[sea_orm(nullable)]
    pub sma_30: Option<f64>,
    #[sea_orm(nullable)]
    pub volume_ratio_30d: Option<f64>,
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
