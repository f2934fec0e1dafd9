use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use time::OffsetDateTime;

use crate::entity::asset::{ActiveModel, Column, Entity as AssetEntity};
use crate::entity::sea_orm_active_enums::{BulkStatus, IndividualStatus};
use crate::error::{AppError, AppResult};
use crate::models::{Asset, BulkAssetFilter, BulkStatusFilter, UniqueAssetFilter};
use crate::repositories::{contains_ci, Repository};

/// Asset repository for database operations on both asset shapes
pub struct AssetRepository;

/// Asset row about to be inserted
#[derive(Debug)]
pub struct NewAsset {
    pub name: String,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub shape: NewAssetShape,
}

#[derive(Debug)]
pub enum NewAssetShape {
    Unique {
        serial_number: String,
        status: IndividualStatus,
    },
    Bulk {
        quantity: i32,
        minimum_threshold: i32,
        status: BulkStatus,
    },
}

/// Column changes applied by [`AssetRepository::update`]
#[derive(Debug, Default)]
pub struct AssetChanges {
    pub name: Option<String>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
    pub serial_number: Option<String>,
    pub individual_status: Option<IndividualStatus>,
    pub current_stock_level: Option<i32>,
    pub minimum_threshold: Option<i32>,
    pub bulk_status: Option<BulkStatus>,
    pub last_restocked: Option<OffsetDateTime>,
}

#[async_trait]
impl Repository<Asset> for AssetRepository {
    type Id = i32;

    async fn find_by_id<C>(db: &C, id: i32) -> AppResult<Asset>
    where
        C: ConnectionTrait,
    {
        let model = AssetEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {}", id)))?;

        Asset::try_from(model)
    }

    async fn delete<C>(db: &C, id: i32) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        let result = AssetEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Asset {}", id)));
        }

        Ok(())
    }

    async fn count<C>(db: &C) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = AssetEntity::find().count(db).await?;
        Ok(count)
    }
}

impl AssetRepository {
    /// Insert a new asset row
    pub async fn create<C>(db: &C, input: NewAsset) -> AppResult<Asset>
    where
        C: ConnectionTrait,
    {
        let now = OffsetDateTime::now_utc();
        let mut model = ActiveModel {
            name: Set(input.name),
            location_id: Set(input.location_id),
            keeper_payroll_number: Set(input.keeper_payroll_number),
            model_number: Set(input.model_number),
            notes: Set(input.notes),
            serial_number: Set(None),
            individual_status: Set(None),
            current_stock_level: Set(None),
            minimum_threshold: Set(None),
            last_restocked: Set(None),
            bulk_status: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match input.shape {
            NewAssetShape::Unique {
                serial_number,
                status,
            } => {
                model.is_bulk = Set(false);
                model.serial_number = Set(Some(serial_number));
                model.individual_status = Set(Some(status));
            }
            NewAssetShape::Bulk {
                quantity,
                minimum_threshold,
                status,
            } => {
                model.is_bulk = Set(true);
                model.current_stock_level = Set(Some(quantity));
                model.minimum_threshold = Set(Some(minimum_threshold));
                model.bulk_status = Set(Some(status));
                model.last_restocked = Set(Some(now));
            }
        }

        let result = model.insert(db).await.map_err(serial_conflict)?;
        Asset::try_from(result)
    }

    /// Load an asset and hold a row lock on it until the transaction ends.
    pub async fn find_for_update<C>(db: &C, id: i32) -> AppResult<Asset>
    where
        C: ConnectionTrait,
    {
        let model = AssetEntity::find_by_id(id)
            .lock_exclusive()
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {}", id)))?;

        Asset::try_from(model)
    }

    pub async fn update<C>(db: &C, id: i32, changes: AssetChanges) -> AppResult<Asset>
    where
        C: ConnectionTrait,
    {
        let model = AssetEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {}", id)))?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(model_number) = changes.model_number {
            active.model_number = Set(Some(model_number));
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(location_id) = changes.location_id {
            active.location_id = Set(Some(location_id));
        }
        if let Some(keeper) = changes.keeper_payroll_number {
            active.keeper_payroll_number = Set(Some(keeper));
        }
        if let Some(serial_number) = changes.serial_number {
            active.serial_number = Set(Some(serial_number));
        }
        if let Some(status) = changes.individual_status {
            active.individual_status = Set(Some(status));
        }
        if let Some(level) = changes.current_stock_level {
            active.current_stock_level = Set(Some(level));
        }
        if let Some(threshold) = changes.minimum_threshold {
            active.minimum_threshold = Set(Some(threshold));
        }
        if let Some(status) = changes.bulk_status {
            active.bulk_status = Set(Some(status));
        }
        if let Some(restocked) = changes.last_restocked {
            active.last_restocked = Set(Some(restocked));
        }
        active.updated_at = Set(OffsetDateTime::now_utc());

        let result = active.update(db).await.map_err(serial_conflict)?;
        Asset::try_from(result)
    }

    pub async fn serial_number_exists<C>(db: &C, serial_number: &str) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        let count = AssetEntity::find()
            .filter(Column::SerialNumber.eq(serial_number))
            .count(db)
            .await?;

        Ok(count > 0)
    }

    // ============ Bulk listings ============

    pub async fn list_bulk<C>(
        db: &C,
        filter: &BulkAssetFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Asset>>
    where
        C: ConnectionTrait,
    {
        let models = Self::bulk_query(filter)
            .order_by_asc(Column::Name)
            .order_by_asc(Column::AssetId)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        models.into_iter().map(Asset::try_from).collect()
    }

    pub async fn count_bulk<C>(db: &C, filter: &BulkAssetFilter) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = Self::bulk_query(filter).count(db).await?;
        Ok(count)
    }

    fn bulk_query(filter: &BulkAssetFilter) -> Select<AssetEntity> {
        let mut query = AssetEntity::find().filter(Column::IsBulk.eq(true));

        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            let term = term.trim();
            query = query.filter(
                Condition::any()
                    .add(contains_ci(Column::Name, term))
                    .add(contains_ci(Column::ModelNumber, term)),
            );
        }
        query = match filter.status {
            Some(BulkStatusFilter::Active) => query.filter(Column::BulkStatus.eq(BulkStatus::Active)),
            Some(BulkStatusFilter::OutOfStock) => {
                query.filter(Column::BulkStatus.eq(BulkStatus::OutOfStock))
            }
            Some(BulkStatusFilter::Discontinued) => {
                query.filter(Column::BulkStatus.eq(BulkStatus::Discontinued))
            }
            Some(BulkStatusFilter::LowStock) => query
                .filter(Column::CurrentStockLevel.gt(0))
                .filter(Expr::col(Column::CurrentStockLevel).lte(Expr::col(Column::MinimumThreshold))),
            None => query,
        };

        Self::with_common_filters(query, filter.location_id, filter.keeper_payroll_number.as_deref())
    }

    // ============ Unique listings ============

    pub async fn list_unique<C>(
        db: &C,
        filter: &UniqueAssetFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Asset>>
    where
        C: ConnectionTrait,
    {
        let models = Self::unique_query(filter)
            .order_by_desc(Column::UpdatedAt)
            .order_by_asc(Column::AssetId)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        models.into_iter().map(Asset::try_from).collect()
    }

    pub async fn count_unique<C>(db: &C, filter: &UniqueAssetFilter) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = Self::unique_query(filter).count(db).await?;
        Ok(count)
    }

    fn unique_query(filter: &UniqueAssetFilter) -> Select<AssetEntity> {
        let mut query = AssetEntity::find().filter(Column::IsBulk.eq(false));

        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            let term = term.trim();
            query = query.filter(
                Condition::any()
                    .add(contains_ci(Column::Name, term))
                    .add(contains_ci(Column::SerialNumber, term))
                    .add(contains_ci(Column::ModelNumber, term)),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::IndividualStatus.eq(status));
        }

        Self::with_common_filters(query, filter.location_id, filter.keeper_payroll_number.as_deref())
    }

    fn with_common_filters(
        mut query: Select<AssetEntity>,
        location_id: Option<i32>,
        keeper: Option<&str>,
    ) -> Select<AssetEntity> {
        if let Some(location_id) = location_id {
            query = query.filter(Column::LocationId.eq(location_id));
        }
        if let Some(keeper) = keeper.filter(|k| !k.is_empty()) {
            query = query.filter(Column::KeeperPayrollNumber.eq(keeper));
        }
        query
    }
}

fn serial_conflict(err: sea_orm::DbErr) -> AppError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Serial number already exists".to_string())
        }
        _ => AppError::from(err),
    }
}
