use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::user::{self, ActiveModel, Column, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{User, UserFilter};
use crate::repositories::{contains_ci, Repository};

/// User repository for database operations
pub struct UserRepository;

/// Column changes applied by [`UserRepository::update`]
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub default_location_id: Option<i32>,
}

#[async_trait]
impl Repository<User> for UserRepository {
    type Id = String;

    async fn find_by_id<C>(db: &C, payroll_number: String) -> AppResult<User>
    where
        C: ConnectionTrait,
    {
        Self::find_optional(db, &payroll_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", payroll_number)))
    }

    async fn delete<C>(db: &C, payroll_number: String) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        let result = UserEntity::delete_by_id(payroll_number.clone())
            .exec(db)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict("User still has assignment records".to_string())
                }
                other => other,
            })?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("User {}", payroll_number)));
        }

        Ok(())
    }

    async fn count<C>(db: &C) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = UserEntity::find().count(db).await?;
        Ok(count)
    }
}

// User-specific methods (not in the base trait)
impl UserRepository {
    /// Create a new user
    pub async fn create<C>(
        db: &C,
        payroll_number: &str,
        name: &str,
        role: UserRole,
        password_hash: &str,
        must_change_password: bool,
        default_location_id: Option<i32>,
    ) -> AppResult<User>
    where
        C: ConnectionTrait,
    {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            payroll_number: Set(payroll_number.to_string()),
            name: Set(name.to_string()),
            role: Set(role),
            password_hash: Set(password_hash.to_string()),
            must_change_password: Set(must_change_password),
            default_location_id: Set(default_location_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Payroll number {} already exists", payroll_number))
            }
            other => other,
        })?;

        Ok(result.into())
    }

    pub async fn find_optional<C>(db: &C, payroll_number: &str) -> AppResult<Option<User>>
    where
        C: ConnectionTrait,
    {
        let model = UserEntity::find_by_id(payroll_number.to_string())
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    /// Search users by payroll number or name
    pub async fn search<C>(
        db: &C,
        filter: &UserFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<User>>
    where
        C: ConnectionTrait,
    {
        let models = Self::filtered(filter)
            .order_by_asc(Column::Name)
            .order_by_asc(Column::PayrollNumber)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    pub async fn count_search<C>(db: &C, filter: &UserFilter) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let count = Self::filtered(filter).count(db).await?;
        Ok(count)
    }

    fn filtered(filter: &UserFilter) -> Select<UserEntity> {
        let mut query = UserEntity::find();

        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            let term = term.trim();
            query = query.filter(
                Condition::any()
                    .add(contains_ci(Column::PayrollNumber, term))
                    .add(contains_ci(Column::Name, term)),
            );
        }
        if let Some(role) = filter.role {
            query = query.filter(Column::Role.eq(role));
        }

        query
    }

    /// Update profile fields
    pub async fn update<C>(db: &C, payroll_number: &str, changes: &UserChanges) -> AppResult<User>
    where
        C: ConnectionTrait,
    {
        let model = UserEntity::find_by_id(payroll_number.to_string())
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", payroll_number)))?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        if let Some(location_id) = changes.default_location_id {
            active.default_location_id = Set(Some(location_id));
        }
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Replace the stored password hash
    pub async fn set_password<C>(
        db: &C,
        payroll_number: &str,
        password_hash: &str,
        must_change_password: bool,
    ) -> AppResult<User>
    where
        C: ConnectionTrait,
    {
        let model = UserEntity::find_by_id(payroll_number.to_string())
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", payroll_number)))?;

        let mut active: ActiveModel = model.into();
        active.password_hash = Set(password_hash.to_string());
        active.must_change_password = Set(must_change_password);
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Load several users at once, keyed lookups for list views
    pub async fn find_many<C>(db: &C, payroll_numbers: Vec<String>) -> AppResult<Vec<User>>
    where
        C: ConnectionTrait,
    {
        if payroll_numbers.is_empty() {
            return Ok(Vec::new());
        }

        let models = UserEntity::find()
            .filter(Column::PayrollNumber.is_in(payroll_numbers))
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}

// Conversion from SeaORM model to our domain model
impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            payroll_number: m.payroll_number,
            name: m.name,
            role: m.role,
            password_hash: m.password_hash,
            must_change_password: m.must_change_password,
            default_location_id: m.default_location_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
