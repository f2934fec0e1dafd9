use uuid::Uuid;

use railtrack::entity::sea_orm_active_enums::{IndividualStatus, UserRole};
use railtrack::models::{Asset, CreateBulkAsset, CreateLocation, CreateUniqueAsset, Location, User};
use railtrack::repositories::{LocationRepository, UserRepository};
use railtrack::services::{AuthService, BulkAssetService, UniqueAssetService};
use railtrack::state::AppState;

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Authentication info for tests
#[allow(dead_code)]
pub struct TestAuth {
    pub payroll_number: String,
    pub role: UserRole,
    pub token: String,
}

impl TestAuth {
    /// Get the Authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Short unique suffix that fits the payroll number column
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Factory for creating test data
pub struct Factory<'a> {
    state: &'a AppState,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Create a user with the given role and return auth info
    pub async fn create_user(&self, role: UserRole) -> TestAuth {
        let user = self.create_user_record(role, None).await;
        let token = AuthService::generate_token(&user, &self.state.config).unwrap();

        TestAuth {
            payroll_number: user.payroll_number,
            role,
            token,
        }
    }

    pub async fn create_admin(&self) -> TestAuth {
        self.create_user(UserRole::Admin).await
    }

    pub async fn create_keeper(&self) -> TestAuth {
        self.create_user(UserRole::Keeper).await
    }

    pub async fn create_viewer(&self) -> TestAuth {
        self.create_user(UserRole::Viewer).await
    }

    /// Insert a user row with `TEST_PASSWORD`
    pub async fn create_user_record(
        &self,
        role: UserRole,
        default_location_id: Option<i32>,
    ) -> User {
        let payroll_number = format!("T{}", unique_suffix());
        let password_hash = AuthService::hash_password(TEST_PASSWORD).unwrap();

        UserRepository::create(
            &self.state.db,
            &payroll_number,
            &format!("Test User {}", payroll_number),
            role,
            &password_hash,
            false,
            default_location_id,
        )
        .await
        .unwrap()
    }

    pub async fn create_location(&self) -> Location {
        let suffix = unique_suffix();
        let input = CreateLocation {
            region_name: format!("Region {}", suffix),
            department_name: format!("Department {}", suffix),
            notes: None,
        };

        LocationRepository::create(&self.state.db, &input)
            .await
            .unwrap()
    }

    pub async fn create_bulk_asset(
        &self,
        location_id: i32,
        keeper: Option<&str>,
        quantity: i32,
        minimum_threshold: i32,
    ) -> Asset {
        let creator = self.create_user_record(UserRole::Keeper, None).await;
        let input = CreateBulkAsset {
            name: format!("Bulk {}", unique_suffix()),
            location_id,
            keeper_payroll_number: keeper.map(str::to_string),
            quantity,
            minimum_threshold,
            model_number: None,
            notes: None,
        };

        BulkAssetService::create(&self.state.db, input, &creator.payroll_number)
            .await
            .unwrap()
    }

    pub async fn create_unique_asset(&self, location_id: i32) -> Asset {
        let creator = self.create_user_record(UserRole::Keeper, None).await;
        let suffix = unique_suffix();
        let input = CreateUniqueAsset {
            name: format!("Radio {}", suffix),
            serial_number: format!("SN-{}", suffix),
            location_id,
            keeper_payroll_number: None,
            status: Some(IndividualStatus::Available),
            model_number: Some("TRX-100".to_string()),
            notes: None,
        };

        UniqueAssetService::create(&self.state.db, input, &creator.payroll_number)
            .await
            .unwrap()
    }
}
