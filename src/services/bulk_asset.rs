use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use time::OffsetDateTime;

use crate::entity::sea_orm_active_enums::MovementType;
use crate::error::{AppError, AppResult};
use crate::models::{
    Asset, BulkAssetFilter, BulkStock, CreateBulkAsset, NewMovement, RestockBulkAsset,
    RestockEntry, UpdateBulkAsset,
};
use crate::repositories::{
    AssetChanges, AssetRepository, LocationRepository, MovementRepository, NewAsset,
    NewAssetShape, Repository, RestockRepository, UserRepository,
};
use crate::services::tracking::{AssetView, TrackingService};

pub struct BulkAssetService;

impl BulkAssetService {
    /// Create a bulk asset and its opening stock movement in one transaction.
    pub async fn create(
        db: &DatabaseConnection,
        input: CreateBulkAsset,
        created_by: &str,
    ) -> AppResult<Asset> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if input.quantity < 0 {
            return Err(AppError::Validation("Quantity cannot be negative".to_string()));
        }
        if input.minimum_threshold < 0 {
            return Err(AppError::Validation(
                "Minimum threshold cannot be negative".to_string(),
            ));
        }

        let txn = db.begin().await?;

        ensure_location(&txn, input.location_id).await?;
        if let Some(keeper) = &input.keeper_payroll_number {
            ensure_user(&txn, keeper).await?;
        }

        let status = BulkStock::status_for_quantity(input.quantity);
        let asset = AssetRepository::create(
            &txn,
            NewAsset {
                name: input.name.trim().to_string(),
                location_id: Some(input.location_id),
                keeper_payroll_number: input.keeper_payroll_number,
                model_number: input.model_number,
                notes: input.notes,
                shape: NewAssetShape::Bulk {
                    quantity: input.quantity,
                    minimum_threshold: input.minimum_threshold,
                    status,
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
                quantity: input.quantity,
                notes: Some("Initial stock".to_string()),
            },
        )
        .await?;

        txn.commit().await?;
        tracing::info!(
            asset_id = asset.asset_id,
            quantity = input.quantity,
            status = ?status,
            "Created bulk asset"
        );

        Ok(asset)
    }

    /// Apply edits, logging one movement per kind of change (quantity,
    /// location, keeper), all in one transaction.
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        input: UpdateBulkAsset,
        updated_by: &str,
    ) -> AppResult<Asset> {
        if matches!(input.quantity, Some(q) if q < 0) {
            return Err(AppError::Validation("Quantity cannot be negative".to_string()));
        }
        if matches!(input.minimum_threshold, Some(t) if t < 0) {
            return Err(AppError::Validation(
                "Minimum threshold cannot be negative".to_string(),
            ));
        }
        if matches!(&input.name, Some(n) if n.trim().is_empty()) {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }

        let txn = db.begin().await?;

        let asset = AssetRepository::find_for_update(&txn, id).await?;
        let stock = bulk_stock(&asset)?.clone();

        if let Some(location_id) = input.location_id {
            ensure_location(&txn, location_id).await?;
        }
        if let Some(keeper) = &input.keeper_payroll_number {
            ensure_user(&txn, keeper).await?;
        }

        let new_quantity = input.quantity.unwrap_or(stock.current_stock_level);
        let status = BulkStock::resolve_status(stock.status, new_quantity, input.status);
        let location_changed = input
            .location_id
            .is_some_and(|l| Some(l) != asset.location_id);
        let keeper_changed = input
            .keeper_payroll_number
            .as_ref()
            .is_some_and(|k| Some(k) != asset.keeper_payroll_number.as_ref());

        let updated = AssetRepository::update(
            &txn,
            id,
            AssetChanges {
                name: input.name.map(|n| n.trim().to_string()),
                model_number: input.model_number,
                notes: input.notes,
                location_id: input.location_id,
                keeper_payroll_number: input.keeper_payroll_number.clone(),
                current_stock_level: Some(new_quantity),
                minimum_threshold: input.minimum_threshold,
                bulk_status: Some(status),
                ..Default::default()
            },
        )
        .await?;

        let delta = new_quantity - stock.current_stock_level;
        if delta != 0 {
            MovementRepository::append(
                &txn,
                NewMovement {
                    asset_id: id,
                    from_location_id: asset.location_id,
                    to_location_id: asset.location_id,
                    moved_by: Some(updated_by.to_string()),
                    movement_type: MovementType::Adjustment,
                    quantity: delta.abs(),
                    notes: Some(format!(
                        "Stock adjusted from {} to {}",
                        stock.current_stock_level, new_quantity
                    )),
                },
            )
            .await?;
        }

        if location_changed {
            MovementRepository::append(
                &txn,
                NewMovement {
                    asset_id: id,
                    from_location_id: asset.location_id,
                    to_location_id: updated.location_id,
                    moved_by: Some(updated_by.to_string()),
                    movement_type: MovementType::Transfer,
                    quantity: new_quantity,
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
                    quantity: new_quantity,
                    notes: Some(format!(
                        "Keeper changed from {} to {}",
                        asset.keeper_payroll_number.as_deref().unwrap_or("none"),
                        updated.keeper_payroll_number.as_deref().unwrap_or("none")
                    )),
                },
            )
            .await?;
        }

        txn.commit().await?;
        tracing::info!(
            asset_id = id,
            delta,
            location_changed,
            keeper_changed,
            "Updated bulk asset"
        );

        Ok(updated)
    }

    /// Add stock, append to the restock log and the movement log.
    pub async fn restock(
        db: &DatabaseConnection,
        id: i32,
        input: RestockBulkAsset,
        restocked_by: &str,
    ) -> AppResult<(Asset, RestockEntry)> {
        if input.quantity <= 0 {
            return Err(AppError::Validation(
                "Restock quantity must be greater than zero".to_string(),
            ));
        }

        let txn = db.begin().await?;

        let asset = AssetRepository::find_for_update(&txn, id).await?;
        let stock = bulk_stock(&asset)?;

        let new_quantity = stock
            .current_stock_level
            .checked_add(input.quantity)
            .ok_or_else(|| AppError::Validation("Stock level would overflow".to_string()))?;

        let updated = AssetRepository::update(
            &txn,
            id,
            AssetChanges {
                current_stock_level: Some(new_quantity),
                bulk_status: Some(BulkStock::resolve_status(stock.status, new_quantity, None)),
                last_restocked: Some(OffsetDateTime::now_utc()),
                ..Default::default()
            },
        )
        .await?;

        let entry =
            RestockRepository::append(&txn, id, input.quantity, restocked_by, input.notes.clone())
                .await?;

        MovementRepository::append(
            &txn,
            NewMovement {
                asset_id: id,
                from_location_id: None,
                to_location_id: asset.location_id,
                moved_by: Some(restocked_by.to_string()),
                movement_type: MovementType::Adjustment,
                quantity: input.quantity,
                notes: Some("Restock".to_string()),
            },
        )
        .await?;

        txn.commit().await?;
        tracing::info!(asset_id = id, added = input.quantity, new_quantity, "Restocked bulk asset");

        Ok((updated, entry))
    }

    /// Load a bulk asset, rejecting unique assets with the same id
    pub async fn get<C>(db: &C, id: i32) -> AppResult<Asset>
    where
        C: ConnectionTrait,
    {
        let asset = AssetRepository::find_by_id(db, id).await?;
        bulk_stock(&asset)?;
        Ok(asset)
    }

    pub async fn get_view<C>(db: &C, id: i32) -> AppResult<AssetView>
    where
        C: ConnectionTrait,
    {
        let asset = Self::get(db, id).await?;
        TrackingService::load_view(db, asset).await
    }

    pub async fn list<C>(
        db: &C,
        filter: &BulkAssetFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<AssetView>, u64)>
    where
        C: ConnectionTrait,
    {
        let assets = AssetRepository::list_bulk(db, filter, limit, offset).await?;
        let total = AssetRepository::count_bulk(db, filter).await?;
        let views = TrackingService::load_views(db, assets).await?;

        Ok((views, total))
    }

    pub async fn delete<C>(db: &C, id: i32) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        Self::get(db, id).await?;
        AssetRepository::delete(db, id).await?;
        tracing::info!(asset_id = id, "Deleted bulk asset");
        Ok(())
    }
}

fn bulk_stock(asset: &Asset) -> AppResult<&BulkStock> {
    asset
        .bulk()
        .ok_or_else(|| AppError::NotFound(format!("Bulk asset {}", asset.asset_id)))
}

pub(crate) async fn ensure_location<C>(db: &C, location_id: i32) -> AppResult<()>
where
    C: ConnectionTrait,
{
    LocationRepository::find_by_id(db, location_id)
        .await
        .map(|_| ())
}

pub(crate) async fn ensure_user<C>(db: &C, payroll_number: &str) -> AppResult<()>
where
    C: ConnectionTrait,
{
    UserRepository::find_by_id(db, payroll_number.to_string())
        .await
        .map(|_| ())
}
