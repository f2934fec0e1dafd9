use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::config::BootstrapAdmin;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, UpdateUser, User};
use crate::repositories::{Repository, UserChanges, UserRepository};
use crate::services::{AuthService, LocationService};

pub struct UserService;

impl UserService {
    /// Create a user. Returns the temporary password when none was supplied.
    pub async fn create_user(
        db: &DatabaseConnection,
        input: CreateUser,
    ) -> AppResult<(User, Option<String>)> {
        let payroll_number = input.payroll_number.trim();
        if payroll_number.is_empty() {
            return Err(AppError::Validation("Payroll number is required".to_string()));
        }
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let (password, temporary) = match input.password {
            Some(password) => {
                AuthService::validate_new_password(&password)?;
                (password, None)
            }
            None => {
                let temporary = AuthService::generate_temporary_password();
                (temporary.clone(), Some(temporary))
            }
        };
        let password_hash = AuthService::hash_password(&password)?;

        let txn = db.begin().await?;

        let default_location_id = match &input.default_location {
            Some(selector) => Some(LocationService::resolve(&txn, selector).await?.location_id),
            None => None,
        };

        let user = UserRepository::create(
            &txn,
            payroll_number,
            input.name.trim(),
            input.role,
            &password_hash,
            temporary.is_some(),
            default_location_id,
        )
        .await?;

        txn.commit().await?;
        tracing::info!(payroll_number = %user.payroll_number, role = ?user.role, "Created user");

        Ok((user, temporary))
    }

    pub async fn update_user(
        db: &DatabaseConnection,
        payroll_number: &str,
        input: UpdateUser,
    ) -> AppResult<User> {
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Name cannot be empty".to_string()));
            }
        }

        let txn = db.begin().await?;

        let default_location_id = match &input.default_location {
            Some(selector) => Some(LocationService::resolve(&txn, selector).await?.location_id),
            None => None,
        };

        let changes = UserChanges {
            name: input.name.map(|n| n.trim().to_string()),
            role: input.role,
            default_location_id,
        };
        let user = UserRepository::update(&txn, payroll_number, &changes).await?;

        txn.commit().await?;
        Ok(user)
    }

    /// Create the configured administrator when no users exist yet
    pub async fn ensure_bootstrap_admin<C>(db: &C, admin: &BootstrapAdmin) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        if UserRepository::count(db).await? > 0 {
            return Ok(());
        }

        AuthService::validate_new_password(&admin.password)?;
        let password_hash = AuthService::hash_password(&admin.password)?;
        UserRepository::create(
            db,
            &admin.payroll_number,
            &admin.name,
            UserRole::Admin,
            &password_hash,
            true,
            None,
        )
        .await?;

        tracing::info!(payroll_number = %admin.payroll_number, "Created bootstrap administrator");
        Ok(())
    }
}
