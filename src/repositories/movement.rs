use std::collections::HashMap;

use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::asset_movement::{ActiveModel, Column, Entity as MovementEntity};
use crate::error::AppResult;
use crate::models::{Movement, NewMovement};

/// Append-only access to the movement log
pub struct MovementRepository;

impl MovementRepository {
    pub async fn append<C>(db: &C, input: NewMovement) -> AppResult<Movement>
    where
        C: ConnectionTrait,
    {
        let model = ActiveModel {
            asset_id: Set(input.asset_id),
            from_location_id: Set(input.from_location_id),
            to_location_id: Set(input.to_location_id),
            moved_by: Set(input.moved_by),
            movement_type: Set(input.movement_type),
            quantity: Set(input.quantity),
            moved_at: Set(time::OffsetDateTime::now_utc()),
            notes: Set(input.notes),
            ..Default::default()
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    /// Movement history of one asset, newest first
    pub async fn list_for_asset<C>(
        db: &C,
        asset_id: i32,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Movement>>
    where
        C: ConnectionTrait,
    {
        let models = MovementEntity::find()
            .filter(Column::AssetId.eq(asset_id))
            .order_by_desc(Column::MovedAt)
            .order_by_desc(Column::MovementId)
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
        let count = MovementEntity::find()
            .filter(Column::AssetId.eq(asset_id))
            .count(db)
            .await?;

        Ok(count)
    }

    /// Latest movement per asset. Movement ids grow with time, so the
    /// highest id per asset is its most recent row.
    pub async fn latest_for_assets<C>(
        db: &C,
        asset_ids: Vec<i32>,
    ) -> AppResult<HashMap<i32, Movement>>
    where
        C: ConnectionTrait,
    {
        if asset_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let latest_ids = Query::select()
            .expr(Expr::col(Column::MovementId).max())
            .from(MovementEntity)
            .and_where(Expr::col(Column::AssetId).is_in(asset_ids))
            .group_by_col(Column::AssetId)
            .to_owned();

        let models = MovementEntity::find()
            .filter(Column::MovementId.in_subquery(latest_ids))
            .all(db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| (m.asset_id, Movement::from(m)))
            .collect())
    }
}
