use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use crate::entity::location::{self, ActiveModel, Column, Entity as LocationEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateLocation, Location, LocationFilter, UpdateLocation};
use crate::repositories::{contains_ci, equals_ci, Repository};

/// Location repository for database operations
pub struct LocationRepository;

#[async_trait]
impl Repository<Location> for LocationRepository {
    type Id = i32;

    async fn find_by_id<C>(db: &C, id: i32) -> AppResult<Location>
    where
        C: ConnectionTrait,
    {
        let model = LocationEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {}", id)))?;

        Ok(model.into())
    }

    async fn delete<C>(db: &C, id: i32) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        let result = LocationEntity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict("Location is still holding assets".to_string())
                }
                other => other,
            })?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Location {}", id)));
        }

        Ok(())
    }

    async fn count<C>(db: &C) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = LocationEntity::find().count(db).await?;
        Ok(count)
    }
}

impl LocationRepository {
    /// Create a new location
    pub async fn create<C>(db: &C, input: &CreateLocation) -> AppResult<Location>
    where
        C: ConnectionTrait,
    {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            region_name: Set(input.region_name.clone()),
            department_name: Set(input.department_name.clone()),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Location {} / {} already exists",
                input.department_name, input.region_name
            )),
            other => other,
        })?;

        Ok(result.into())
    }

    /// Exact (department, region) lookup, ignoring case
    pub async fn find_by_names<C>(
        db: &C,
        department_name: &str,
        region_name: &str,
    ) -> AppResult<Option<Location>>
    where
        C: ConnectionTrait,
    {
        let model = LocationEntity::find()
            .filter(equals_ci(Column::DepartmentName, department_name))
            .filter(equals_ci(Column::RegionName, region_name))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    pub async fn list<C>(
        db: &C,
        filter: &LocationFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Location>>
    where
        C: ConnectionTrait,
    {
        let models = Self::filtered(filter)
            .order_by_asc(Column::RegionName)
            .order_by_asc(Column::DepartmentName)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    pub async fn count_filtered<C>(db: &C, filter: &LocationFilter) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = Self::filtered(filter).count(db).await?;
        Ok(count)
    }

    fn filtered(filter: &LocationFilter) -> Select<LocationEntity> {
        let mut query = LocationEntity::find();

        if let Some(region) = filter.region_name.as_deref().filter(|r| !r.is_empty()) {
            query = query.filter(contains_ci(Column::RegionName, region));
        }
        if let Some(department) = filter.department_name.as_deref().filter(|d| !d.is_empty()) {
            query = query.filter(contains_ci(Column::DepartmentName, department));
        }

        query
    }

    pub async fn update<C>(db: &C, id: i32, input: &UpdateLocation) -> AppResult<Location>
    where
        C: ConnectionTrait,
    {
        let model = LocationEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {}", id)))?;

        let mut active: ActiveModel = model.into();

        if let Some(region_name) = &input.region_name {
            active.region_name = Set(region_name.clone());
        }
        if let Some(department_name) = &input.department_name {
            active.department_name = Set(department_name.clone());
        }
        if let Some(notes) = &input.notes {
            active.notes = Set(Some(notes.clone()));
        }
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Load several locations at once
    pub async fn find_many<C>(db: &C, ids: Vec<i32>) -> AppResult<Vec<Location>>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = LocationEntity::find()
            .filter(Column::LocationId.is_in(ids))
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}

// Conversion from SeaORM model to our domain model
impl From<location::Model> for Location {
    fn from(m: location::Model) -> Self {
        Self {
            location_id: m.location_id,
            region_name: m.region_name,
            department_name: m.department_name,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
