use crate::storage::entity::asset::{self, Entity as Asset, Model as AssetModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;

pub struct AssetRepository;

impl AssetRepository {
    pub async fn load_active<C: ConnectionTrait>(db: &C) -> Result<Vec<AssetModel>, DbErr> {
        Asset::find()
            .filter(asset::Column::IsActive.eq(true))
            .order_by_asc(asset::Column::AssetId)
            .all(db)
            .await
    }

    /// asset_id -> symbol，包含已停用的资产（旧指标行可能仍引用它们）
    pub async fn symbols<C: ConnectionTrait>(db: &C) -> Result<HashMap<i32, String>, DbErr> {
        let all = Asset::find().all(db).await?;
        Ok(all.into_iter().map(|a| (a.asset_id, a.symbol)).collect())
    }
}
