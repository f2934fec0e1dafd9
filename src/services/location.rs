use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::error::{AppError, AppResult};
use crate::models::{CreateLocation, Location, LocationSelector};
use crate::repositories::{LocationRepository, Repository};

pub struct LocationService;

impl LocationService {
    /// Find a location by (department, region), creating it when missing.
    pub async fn find_or_create<C>(
        db: &C,
        department_name: &str,
        region_name: &str,
    ) -> AppResult<Location>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let department_name = department_name.trim();
        let region_name = region_name.trim();
        if department_name.is_empty() || region_name.is_empty() {
            return Err(AppError::Validation(
                "Department and region names are required".to_string(),
            ));
        }

        if let Some(location) =
            LocationRepository::find_by_names(db, department_name, region_name).await?
        {
            return Ok(location);
        }

        let input = CreateLocation {
            region_name: region_name.to_string(),
            department_name: department_name.to_string(),
            notes: None,
        };

        // Savepoint, so a lost race does not abort an enclosing transaction
        let savepoint = db.begin().await?;
        match LocationRepository::create(&savepoint, &input).await {
            Ok(location) => {
                savepoint.commit().await?;
                tracing::info!(
                    location_id = location.location_id,
                    department_name,
                    region_name,
                    "Created location"
                );
                Ok(location)
            }
            // Another request created it first
            Err(AppError::Conflict(_)) => {
                savepoint.rollback().await?;
                LocationRepository::find_by_names(db, department_name, region_name)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Location".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn resolve<C>(db: &C, selector: &LocationSelector) -> AppResult<Location>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        match selector {
            LocationSelector::Id(id) => LocationRepository::find_by_id(db, *id).await,
            LocationSelector::Named {
                department_name,
                region_name,
            } => Self::find_or_create(db, department_name, region_name).await,
        }
    }

    pub fn validate_new(input: &CreateLocation) -> AppResult<()> {
        if input.region_name.trim().is_empty() {
            return Err(AppError::Validation("Region name is required".to_string()));
        }
        if input.department_name.trim().is_empty() {
            return Err(AppError::Validation(
                "Department name is required".to_string(),
            ));
        }
        Ok(())
    }
}
