use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::entity::sea_orm_active_enums::{IndividualStatus, MovementType};
use crate::error::{AppError, AppResult};
use crate::models::{
    Asset, AssetKind, CreateUniqueAsset, NewMovement, UniqueAssetFilter, UpdateUniqueAsset,
};
use crate::repositories::{
    AssetChanges, AssetRepository, AssignmentRepository, MovementRepository, NewAsset,
    NewAssetShape, Repository,
};
use crate::services::bulk_asset::{ensure_location, ensure_user};
use crate::services::tracking::{AssetView, TrackingService};

pub struct UniqueAssetService;

impl UniqueAssetService {
    pub async fn create(
        db: &DatabaseConnection,
        input: CreateUniqueAsset,
        created_by: &str,
    ) -> AppResult<Asset> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        let serial_number = input.serial_number.trim().to_string();
        if serial_number.is_empty() {
            return Err(AppError::Validation("Serial number is required".to_string()));
        }
        if input.status == Some(IndividualStatus::InUse) {
            return Err(AppError::Validation(
                "Assets are put in use by assigning them".to_string(),
            ));
        }

        let txn = db.begin().await?;

        if AssetRepository::serial_number_exists(&txn, &serial_number).await? {
            tracing::warn!(%serial_number, "Duplicate serial number");
            return Err(AppError::Conflict("Serial number already exists".to_string()));
        }
        ensure_location(&txn, input.location_id).await?;
        if let Some(keeper) = &input.keeper_payroll_number {
            ensure_user(&txn, keeper).await?;
        }

        let asset = AssetRepository::create(
            &txn,
            NewAsset {
                name: input.name.trim().to_string(),
                location_id: Some(input.location_id),
                keeper_payroll_number: input.keeper_payroll_number,
                model_number: input.model_number,
                notes: input.notes,
                shape: NewAssetShape::Unique {
                    serial_number,
                    status: input.status.unwrap_or(IndividualStatus::Available),
                },
            },
        )
        .await?;

        MovementRepository::append(
            &txn,
            NewMovement {
                asset_id: asset.asset_id,
                from_location_id: None,
                to_location_id: Some(input.location_id),
                moved_by: Some(created_by.to_string()),
                movement_type: MovementType::Adjustment,
                quantity: 1,
                notes: Some("Registered".to_string()),
            },
        )
        .await?;

        txn.commit().await?;
        tracing::info!(asset_id = asset.asset_id, "Created unique asset");

        Ok(asset)
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        input: UpdateUniqueAsset,
        updated_by: &str,
    ) -> AppResult<Asset> {
        if matches!(&input.name, Some(n) if n.trim().is_empty()) {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        let serial_number = input.serial_number.map(|s| s.trim().to_string());
        if matches!(&serial_number, Some(s) if s.is_empty()) {
            return Err(AppError::Validation(
                "Serial number cannot be empty".to_string(),
            ));
        }

        let txn = db.begin().await?;

        let asset = AssetRepository::find_for_update(&txn, id).await?;
        let (current_serial, current_status) = match &asset.kind {
            AssetKind::Unique {
                serial_number,
                status,
            } => (serial_number.clone(), *status),
            AssetKind::Bulk(_) => return Err(AppError::NotFound(format!("Unique asset {}", id))),
        };

        if let Some(serial) = serial_number.as_deref().filter(|s| *s != current_serial) {
            if AssetRepository::serial_number_exists(&txn, serial).await? {
                return Err(AppError::Conflict("Serial number already exists".to_string()));
            }
        }
        if let Some(location_id) = input.location_id {
            ensure_location(&txn, location_id).await?;
        }
        if let Some(keeper) = &input.keeper_payroll_number {
            ensure_user(&txn, keeper).await?;
        }

        // in_use and available follow the assignment log
        if let Some(status @ (IndividualStatus::Available | IndividualStatus::InUse)) =
            input.status.filter(|s| *s != current_status)
        {
            let assigned = AssignmentRepository::find_active_for_asset(&txn, id)
                .await?
                .is_some();
            match status {
                IndividualStatus::Available if assigned => {
                    return Err(AppError::Validation(
                        "Return the active assignment before marking the asset available"
                            .to_string(),
                    ));
                }
                IndividualStatus::InUse if !assigned => {
                    return Err(AppError::Validation(
                        "Assets are put in use by assigning them".to_string(),
                    ));
                }
                _ => {}
            }
        }

        let location_changed = input
            .location_id
            .is_some_and(|l| Some(l) != asset.location_id);
        let keeper_changed = input
            .keeper_payroll_number
            .as_ref()
            .is_some_and(|k| Some(k) != asset.keeper_payroll_number.as_ref());
        let disposed = input.status == Some(IndividualStatus::Disposed)
            && current_status != IndividualStatus::Disposed;

        let updated = AssetRepository::update(
            &txn,
            id,
            AssetChanges {
                name: input.name.map(|n| n.trim().to_string()),
                model_number: input.model_number,
                notes: input.notes,
                location_id: input.location_id,
                keeper_payroll_number: input.keeper_payroll_number.clone(),
                serial_number,
                individual_status: input.status,
                ..Default::default()
            },
        )
        .await?;

        if location_changed {
            MovementRepository::append(
                &txn,
                NewMovement {
                    asset_id: id,
                    from_location_id: asset.location_id,
                    to_location_id: updated.location_id,
                    moved_by: Some(updated_by.to_string()),
                    movement_type: MovementType::Transfer,
                    quantity: 1,
                    notes: None,
                },
            )
            .await?;
        }

        if keeper_changed {
            MovementRepository::append(
                &txn,
                NewMovement {
                    asset_id: id,
                    from_location_id: updated.location_id,
                    to_location_id: updated.location_id,
                    moved_by: Some(updated_by.to_string()),
                    movement_type: MovementType::Assignment,
                    quantity: 1,
                    notes: Some(format!(
                        "Keeper changed from {} to {}",
                        asset.keeper_payroll_number.as_deref().unwrap_or("none"),
                        updated.keeper_payroll_number.as_deref().unwrap_or("none")
                    )),
                },
            )
            .await?;
        }

        if disposed {
            MovementRepository::append(
                &txn,
                NewMovement {
                    asset_id: id,
                    from_location_id: updated.location_id,
                    to_location_id: None,
                    moved_by: Some(updated_by.to_string()),
                    movement_type: MovementType::Disposal,
                    quantity: 1,
                    notes: None,
                },
            )
            .await?;
        }

        txn.commit().await?;
        tracing::info!(
            asset_id = id,
            location_changed,
            keeper_changed,
            disposed,
            "Updated unique asset"
        );

        Ok(updated)
    }

    /// Load a unique asset, rejecting bulk assets with the same id
    pub async fn get<C>(db: &C, id: i32) -> AppResult<Asset>
    where
        C: ConnectionTrait,
    {
        let asset = AssetRepository::find_by_id(db, id).await?;
        if asset.is_bulk() {
            return Err(AppError::NotFound(format!("Unique asset {}", id)));
        }
        Ok(asset)
    }

    pub async fn get_view<C>(db: &C, id: i32) -> AppResult<AssetView>
    where
        C: ConnectionTrait,
    {
        let asset = Self::get(db, id).await?;
        TrackingService::load_view(db, asset).await
    }

    /// Tracking listing: each asset joined with its location, keeper,
    /// current assignment and latest movement.
    pub async fn list<C>(
        db: &C,
        filter: &UniqueAssetFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<AssetView>, u64)>
    where
        C: ConnectionTrait,
    {
        let assets = AssetRepository::list_unique(db, filter, limit, offset).await?;
        let total = AssetRepository::count_unique(db, filter).await?;
        let views = TrackingService::load_views(db, assets).await?;

        Ok((views, total))
    }

    pub async fn delete<C>(db: &C, id: i32) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        Self::get(db, id).await?;
        AssetRepository::delete(db, id).await?;
        tracing::info!(asset_id = id, "Deleted unique asset");
        Ok(())
    }
}
