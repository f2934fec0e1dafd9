use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::entity::sea_orm_active_enums::{AssetCondition, IndividualStatus, MovementType};
use crate::error::{AppError, AppResult};
use crate::models::{
    AssetKind, Assignment, AssignmentFilter, BulkStock, CreateAssignment, NewMovement,
    ReturnAssignment,
};
use crate::repositories::{
    AssetChanges, AssetRepository, AssignmentRepository, MovementRepository, NewAssignment,
    UserRepository,
};
use crate::services::bulk_asset::{ensure_location, ensure_user};

pub struct AssignmentService;

impl AssignmentService {
    /// Issue an asset to a user.
    ///
    /// The asset row stays locked for the whole transaction so the
    /// "already assigned" and stock checks cannot race a concurrent issue.
    /// Any failure rolls the transaction back.
    pub async fn create(db: &DatabaseConnection, input: CreateAssignment) -> AppResult<Assignment> {
        let txn = db.begin().await?;

        let asset = AssetRepository::find_for_update(&txn, input.asset_id).await?;

        let assignee = UserRepository::find_optional(&txn, &input.assigned_to)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", input.assigned_to)))?;
        ensure_user(&txn, &input.assigned_by).await?;
        if let Some(location_id) = input.location_id {
            ensure_location(&txn, location_id).await?;
        }

        let target_location =
            target_location(input.location_id, assignee.default_location_id, asset.location_id)
                .ok_or_else(|| {
                    AppError::Validation(
                        "No location could be resolved for this assignment".to_string(),
                    )
                })?;

        let mut changes = AssetChanges {
            location_id: Some(target_location),
            keeper_payroll_number: Some(assignee.payroll_number.clone()),
            ..Default::default()
        };

        match &asset.kind {
            AssetKind::Unique { status, .. } => {
                if input.quantity != 1 {
                    return Err(AppError::Validation(
                        "Unique assets are assigned with quantity 1".to_string(),
                    ));
                }
                if AssignmentRepository::find_active_for_asset(&txn, asset.asset_id)
                    .await?
                    .is_some()
                {
                    tracing::warn!(asset_id = asset.asset_id, "Asset is already assigned");
                    return Err(AppError::Conflict("Asset is already assigned".to_string()));
                }
                if *status != IndividualStatus::Available {
                    tracing::warn!(asset_id = asset.asset_id, ?status, "Asset is not available");
                    return Err(AppError::Validation(
                        "Only available assets can be assigned".to_string(),
                    ));
                }
                changes.individual_status = Some(IndividualStatus::InUse);
            }
            AssetKind::Bulk(stock) => {
                if input.quantity <= 0 {
                    return Err(AppError::Validation(
                        "Quantity must be greater than zero".to_string(),
                    ));
                }
                if stock.current_stock_level < input.quantity {
                    tracing::warn!(
                        asset_id = asset.asset_id,
                        available = stock.current_stock_level,
                        requested = input.quantity,
                        "Insufficient stock"
                    );
                    return Err(AppError::InsufficientStock {
                        available: stock.current_stock_level,
                        requested: input.quantity,
                    });
                }
                let remaining = stock.current_stock_level - input.quantity;
                changes.current_stock_level = Some(remaining);
                changes.bulk_status = Some(BulkStock::resolve_status(stock.status, remaining, None));
            }
        }

        let assignment = AssignmentRepository::create(
            &txn,
            NewAssignment {
                asset_id: asset.asset_id,
                assigned_to: assignee.payroll_number.clone(),
                assigned_by: input.assigned_by.clone(),
                condition_issued: input.condition_issued.unwrap_or_default(),
                quantity: input.quantity,
                notes: input.notes,
            },
        )
        .await?;

        AssetRepository::update(&txn, asset.asset_id, changes).await?;

        if asset.location_id != Some(target_location) {
            MovementRepository::append(
                &txn,
                NewMovement {
                    asset_id: asset.asset_id,
                    from_location_id: asset.location_id,
                    to_location_id: Some(target_location),
                    moved_by: Some(input.assigned_by),
                    movement_type: MovementType::Assignment,
                    quantity: input.quantity,
                    notes: Some(format!("Assigned to {}", assignee.payroll_number)),
                },
            )
            .await?;
        }

        txn.commit().await?;
        tracing::info!(
            assignment_id = assignment.assignment_id,
            asset_id = assignment.asset_id,
            assigned_to = %assignment.assigned_to,
            quantity = assignment.quantity,
            "Asset assigned"
        );

        Ok(assignment)
    }

    /// Close an assignment and put the asset back into circulation.
    pub async fn return_assignment(
        db: &DatabaseConnection,
        id: i32,
        input: ReturnAssignment,
    ) -> AppResult<Assignment> {
        let txn = db.begin().await?;

        let assignment = AssignmentRepository::find_by_id(&txn, id).await?;
        let asset = AssetRepository::find_for_update(&txn, assignment.asset_id).await?;

        // Re-read under the asset lock; a concurrent return may have won.
        let assignment = AssignmentRepository::find_by_id(&txn, id).await?;
        if !assignment.is_active() {
            return Err(AppError::Conflict(
                "Assignment has already been returned".to_string(),
            ));
        }

        ensure_user(&txn, &input.returned_by).await?;
        if let Some(location_id) = input.location_id {
            ensure_location(&txn, location_id).await?;
        }

        let quantity_returned = input.quantity_returned.unwrap_or(assignment.quantity);
        if quantity_returned <= 0 || quantity_returned > assignment.quantity {
            return Err(AppError::Validation(format!(
                "Returned quantity must be between 1 and {}",
                assignment.quantity
            )));
        }

        let return_location = input.location_id.or(asset.location_id);
        let mut changes = AssetChanges {
            location_id: return_location,
            ..Default::default()
        };
        match &asset.kind {
            // maintenance or disposal recorded while issued survives the return
            AssetKind::Unique { status, .. } => {
                if *status == IndividualStatus::InUse {
                    changes.individual_status = Some(IndividualStatus::Available);
                }
            }
            AssetKind::Bulk(stock) => {
                let restored = stock
                    .current_stock_level
                    .checked_add(quantity_returned)
                    .ok_or_else(|| AppError::Validation("Stock level would overflow".to_string()))?;
                changes.current_stock_level = Some(restored);
                changes.bulk_status = Some(BulkStock::resolve_status(stock.status, restored, None));
            }
        }

        let returned = AssignmentRepository::mark_returned(
            &txn,
            id,
            input.condition_returned.unwrap_or(AssetCondition::Good),
            quantity_returned,
            input.notes,
        )
        .await?;

        AssetRepository::update(&txn, asset.asset_id, changes).await?;

        MovementRepository::append(
            &txn,
            NewMovement {
                asset_id: asset.asset_id,
                from_location_id: asset.location_id,
                to_location_id: return_location,
                moved_by: Some(input.returned_by),
                movement_type: MovementType::Return,
                quantity: quantity_returned,
                notes: Some(format!("Returned by {}", assignment.assigned_to)),
            },
        )
        .await?;

        txn.commit().await?;
        tracing::info!(
            assignment_id = id,
            asset_id = asset.asset_id,
            quantity_returned,
            "Assignment returned"
        );

        Ok(returned)
    }

    pub async fn get<C>(db: &C, id: i32) -> AppResult<Assignment>
    where
        C: ConnectionTrait,
    {
        AssignmentRepository::find_by_id(db, id).await
    }

    pub async fn list<C>(
        db: &C,
        filter: &AssignmentFilter,
        overdue_after_days: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<Assignment>, u64)>
    where
        C: ConnectionTrait,
    {
        let assignments =
            AssignmentRepository::list(db, filter, overdue_after_days, limit, offset).await?;
        let total = AssignmentRepository::count(db, filter, overdue_after_days).await?;

        Ok((assignments, total))
    }
}

/// Where an issued asset ends up: the explicit override, else the
/// assignee's default location, else wherever the asset already is.
pub fn target_location(
    override_location: Option<i32>,
    assignee_default: Option<i32>,
    asset_location: Option<i32>,
) -> Option<i32> {
    override_location.or(assignee_default).or(asset_location)
}
