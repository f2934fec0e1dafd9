use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::restock_log::{ActiveModel, Column, Entity as RestockEntity};
use crate::error::AppResult;
use crate::models::RestockEntry;

/// Append-only access to the restock log
pub struct RestockRepository;

impl RestockRepository {
    pub async fn append<C>(
        db: &C,
        asset_id: i32,
        quantity_added: i32,
        restocked_by: &str,
        notes: Option<String>,
    ) -> AppResult<RestockEntry>
    where
        C: ConnectionTrait,
    {
        let model = ActiveModel {
            asset_id: Set(asset_id),
            quantity_added: Set(quantity_added),
            restocked_by: Set(Some(restocked_by.to_string())),
            restocked_at: Set(time::OffsetDateTime::now_utc()),
            notes: Set(notes),
            ..Default::default()
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    pub async fn list_for_asset<C>(
        db: &C,
        asset_id: i32,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<RestockEntry>>
    where
        C: ConnectionTrait,
    {
        let models = RestockEntity::find()
            .filter(Column::AssetId.eq(asset_id))
            .order_by_desc(Column::RestockedAt)
            .order_by_desc(Column::RestockId)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    pub async fn count_for_asset<C>(db: &C, asset_id: i32) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = RestockEntity::find()
            .filter(Column::AssetId.eq(asset_id))
            .count(db)
            .await?;

        Ok(count)
    }
}
