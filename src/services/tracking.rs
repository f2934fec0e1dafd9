use std::collections::{BTreeMap, HashMap};

use sea_orm::ConnectionTrait;
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};

use crate::error::{AppError, AppResult};
use crate::models::{Asset, Assignment, Location, Movement, User};
use crate::repositories::{
    AssignmentRepository, LocationRepository, MovementRepository, Repository, UserRepository,
};

/// An asset joined with everything the tracking screens show next to it
#[derive(Debug, Clone)]
pub struct AssetView {
    pub asset: Asset,
    pub location: Option<Location>,
    pub keeper: Option<User>,
    pub current_assignment: Option<Assignment>,
    pub assignee: Option<User>,
    pub latest_movement: Option<Movement>,
}

#[derive(Debug, Clone)]
pub struct TrackingSummary {
    pub unique_by_status: BTreeMap<String, i64>,
    pub bulk_by_status: BTreeMap<String, i64>,
    pub low_stock_count: i64,
    pub active_assignments: i64,
    pub overdue_assignments: i64,
    pub total_locations: u64,
    pub total_users: u64,
}

#[derive(Debug, FromRow)]
struct StatusCount {
    status: String,
    count: i64,
}

pub struct TrackingService;

impl TrackingService {
    /// Join a page of assets with their location, keeper, current
    /// assignment and latest movement using one query per related table.
    pub async fn load_views<C>(db: &C, assets: Vec<Asset>) -> AppResult<Vec<AssetView>>
    where
        C: ConnectionTrait,
    {
        let asset_ids: Vec<i32> = assets.iter().map(|a| a.asset_id).collect();
        let unique_ids: Vec<i32> = assets
            .iter()
            .filter(|a| !a.is_bulk())
            .map(|a| a.asset_id)
            .collect();

        let mut location_ids: Vec<i32> = assets.iter().filter_map(|a| a.location_id).collect();
        location_ids.sort_unstable();
        location_ids.dedup();

        // Bulk stock is issued to many people at once, so only unique
        // assets have a single current assignment.
        let mut assignments: HashMap<i32, Assignment> = HashMap::new();
        for assignment in AssignmentRepository::find_active_for_assets(db, unique_ids).await? {
            assignments.entry(assignment.asset_id).or_insert(assignment);
        }

        let mut payroll_numbers: Vec<String> = assets
            .iter()
            .filter_map(|a| a.keeper_payroll_number.clone())
            .chain(assignments.values().map(|a| a.assigned_to.clone()))
            .collect();
        payroll_numbers.sort_unstable();
        payroll_numbers.dedup();

        let locations: HashMap<i32, Location> = LocationRepository::find_many(db, location_ids)
            .await?
            .into_iter()
            .map(|l| (l.location_id, l))
            .collect();
        let users: HashMap<String, User> = UserRepository::find_many(db, payroll_numbers)
            .await?
            .into_iter()
            .map(|u| (u.payroll_number.clone(), u))
            .collect();
        let mut movements = MovementRepository::latest_for_assets(db, asset_ids).await?;

        let views = assets
            .into_iter()
            .map(|asset| {
                let current_assignment = assignments.remove(&asset.asset_id);
                AssetView {
                    location: asset.location_id.and_then(|id| locations.get(&id).cloned()),
                    keeper: asset
                        .keeper_payroll_number
                        .as_ref()
                        .and_then(|p| users.get(p).cloned()),
                    assignee: current_assignment
                        .as_ref()
                        .and_then(|a| users.get(&a.assigned_to).cloned()),
                    latest_movement: movements.remove(&asset.asset_id),
                    current_assignment,
                    asset,
                }
            })
            .collect();

        Ok(views)
    }

    pub async fn load_view<C>(db: &C, asset: Asset) -> AppResult<AssetView>
    where
        C: ConnectionTrait,
    {
        let mut views = Self::load_views(db, vec![asset]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("asset view missing".to_string()))
    }

    /// Dashboard counters, computed with aggregate SQL
    pub async fn summary<C>(
        db: &C,
        pool: &PgPool,
        overdue_after_days: i64,
    ) -> AppResult<TrackingSummary>
    where
        C: ConnectionTrait,
    {
        let unique_by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT individual_status AS status, COUNT(*) AS count \
             FROM assets WHERE NOT is_bulk GROUP BY individual_status",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| (row.status, row.count))
        .collect();

        let bulk_by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT bulk_status AS status, COUNT(*) AS count \
             FROM assets WHERE is_bulk GROUP BY bulk_status",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| (row.status, row.count))
        .collect();

        let low_stock_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assets \
             WHERE is_bulk AND current_stock_level > 0 \
             AND current_stock_level <= minimum_threshold",
        )
        .fetch_one(pool)
        .await?;

        let active_assignments: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM asset_assignment WHERE date_returned IS NULL")
                .fetch_one(pool)
                .await?;

        let overdue_cutoff = OffsetDateTime::now_utc() - Duration::days(overdue_after_days + 1);
        let overdue_assignments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM asset_assignment \
             WHERE date_returned IS NULL AND date_issued <= $1",
        )
        .bind(overdue_cutoff)
        .fetch_one(pool)
        .await?;

        Ok(TrackingSummary {
            unique_by_status,
            bulk_by_status,
            low_stock_count,
            active_assignments,
            overdue_assignments,
            total_locations: LocationRepository::count(db).await?,
            total_users: UserRepository::count(db).await?,
        })
    }
}
