use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use time::{Duration, OffsetDateTime};

use crate::entity::asset_assignment::{ActiveModel, Column, Entity as AssignmentEntity};
use crate::entity::sea_orm_active_enums::AssetCondition;
use crate::error::{AppError, AppResult};
use crate::models::{Assignment, AssignmentFilter};

/// Assignment repository for database operations
pub struct AssignmentRepository;

/// Assignment row about to be inserted
#[derive(Debug)]
pub struct NewAssignment {
    pub asset_id: i32,
    pub assigned_to: String,
    pub assigned_by: String,
    pub condition_issued: AssetCondition,
    pub quantity: i32,
    pub notes: Option<String>,
}

impl AssignmentRepository {
    pub async fn create<C>(db: &C, input: NewAssignment) -> AppResult<Assignment>
    where
        C: ConnectionTrait,
    {
        let model = ActiveModel {
            asset_id: Set(input.asset_id),
            assigned_to: Set(input.assigned_to),
            assigned_by: Set(input.assigned_by),
            date_issued: Set(OffsetDateTime::now_utc()),
            condition_issued: Set(input.condition_issued),
            quantity: Set(input.quantity),
            date_returned: Set(None),
            condition_returned: Set(None),
            quantity_returned: Set(None),
            notes: Set(input.notes),
            ..Default::default()
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> AppResult<Assignment>
    where
        C: ConnectionTrait,
    {
        let model = AssignmentEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment {}", id)))?;

        Ok(model.into())
    }

    /// The unreturned assignment of an asset, if any
    pub async fn find_active_for_asset<C>(db: &C, asset_id: i32) -> AppResult<Option<Assignment>>
    where
        C: ConnectionTrait,
    {
        let model = AssignmentEntity::find()
            .filter(Column::AssetId.eq(asset_id))
            .filter(Column::DateReturned.is_null())
            .order_by_desc(Column::DateIssued)
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    /// Unreturned assignments for a page of assets
    pub async fn find_active_for_assets<C>(db: &C, asset_ids: Vec<i32>) -> AppResult<Vec<Assignment>>
    where
        C: ConnectionTrait,
    {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = AssignmentEntity::find()
            .filter(Column::AssetId.is_in(asset_ids))
            .filter(Column::DateReturned.is_null())
            .order_by_desc(Column::DateIssued)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    pub async fn mark_returned<C>(
        db: &C,
        id: i32,
        condition: AssetCondition,
        quantity_returned: i32,
        notes: Option<String>,
    ) -> AppResult<Assignment>
    where
        C: ConnectionTrait,
    {
        let model = AssignmentEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment {}", id)))?;

        let mut active: ActiveModel = model.into();
        active.date_returned = Set(Some(OffsetDateTime::now_utc()));
        active.condition_returned = Set(Some(condition));
        active.quantity_returned = Set(Some(quantity_returned));
        if let Some(notes) = notes {
            active.notes = Set(Some(notes));
        }

        let result = active.update(db).await?;
        Ok(result.into())
    }

    pub async fn list<C>(
        db: &C,
        filter: &AssignmentFilter,
        overdue_after_days: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Assignment>>
    where
        C: ConnectionTrait,
    {
        let models = Self::filtered(filter, overdue_after_days)
            .order_by_desc(Column::DateIssued)
            .order_by_desc(Column::AssignmentId)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    pub async fn count<C>(
        db: &C,
        filter: &AssignmentFilter,
        overdue_after_days: i64,
    ) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = Self::filtered(filter, overdue_after_days).count(db).await?;
        Ok(count)
    }

    fn filtered(filter: &AssignmentFilter, overdue_after_days: i64) -> Select<AssignmentEntity> {
        let mut query = AssignmentEntity::find();

        if let Some(asset_id) = filter.asset_id {
            query = query.filter(Column::AssetId.eq(asset_id));
        }
        if let Some(assigned_to) = filter.assigned_to.as_deref().filter(|a| !a.is_empty()) {
            query = query.filter(Column::AssignedTo.eq(assigned_to));
        }
        if filter.active_only || filter.overdue_only {
            query = query.filter(Column::DateReturned.is_null());
        }
        if filter.overdue_only {
            // Overdue means strictly more than `overdue_after_days` whole days out
            let cutoff = OffsetDateTime::now_utc() - Duration::days(overdue_after_days + 1);
            query = query.filter(Column::DateIssued.lte(cutoff));
        }

        query
    }
}
