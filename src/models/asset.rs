use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::entity::asset;
use crate::entity::sea_orm_active_enums::{BulkStatus, IndividualStatus};
use crate::error::AppError;

/// A tracked asset. Columns common to every asset live here; the
/// variant-specific fields live in [`AssetKind`].
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub asset_id: i32,
    pub name: String,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub kind: AssetKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "asset_type", rename_all = "snake_case")]
pub enum AssetKind {
    Unique {
        serial_number: String,
        status: IndividualStatus,
    },
    Bulk(BulkStock),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkStock {
    pub current_stock_level: i32,
    pub minimum_threshold: i32,
    pub last_restocked: Option<OffsetDateTime>,
    pub status: BulkStatus,
}

impl Asset {
    pub fn is_bulk(&self) -> bool {
        matches!(self.kind, AssetKind::Bulk(_))
    }

    pub fn bulk(&self) -> Option<&BulkStock> {
        match &self.kind {
            AssetKind::Bulk(stock) => Some(stock),
            AssetKind::Unique { .. } => None,
        }
    }
}

impl BulkStock {
    /// Status implied purely by the quantity on hand.
    pub fn status_for_quantity(quantity: i32) -> BulkStatus {
        if quantity > 0 {
            BulkStatus::Active
        } else {
            BulkStatus::OutOfStock
        }
    }

    /// Status after the quantity changes. `discontinued` is sticky until a
    /// caller explicitly requests another status.
    pub fn resolve_status(
        current: BulkStatus,
        quantity: i32,
        requested: Option<BulkStatus>,
    ) -> BulkStatus {
        match requested {
            Some(BulkStatus::Discontinued) => BulkStatus::Discontinued,
            Some(_) => Self::status_for_quantity(quantity),
            None if current == BulkStatus::Discontinued => BulkStatus::Discontinued,
            None => Self::status_for_quantity(quantity),
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.current_stock_level > 0 && self.current_stock_level <= self.minimum_threshold
    }

    /// Stock on hand as a percentage of the minimum threshold.
    pub fn stock_percentage(&self) -> Option<Decimal> {
        if self.minimum_threshold <= 0 {
            return None;
        }

        let pct = Decimal::from(self.current_stock_level) * Decimal::ONE_HUNDRED
            / Decimal::from(self.minimum_threshold);
        Some(pct.round_dp(2))
    }
}

impl TryFrom<asset::Model> for Asset {
    type Error = AppError;

    fn try_from(m: asset::Model) -> Result<Self, Self::Error> {
        let kind = if m.is_bulk {
            match (m.current_stock_level, m.minimum_threshold, m.bulk_status) {
                (Some(current_stock_level), Some(minimum_threshold), Some(status)) => {
                    AssetKind::Bulk(BulkStock {
                        current_stock_level,
                        minimum_threshold,
                        last_restocked: m.last_restocked,
                        status,
                    })
                }
                _ => {
                    return Err(AppError::Internal(format!(
                        "bulk asset {} is missing stock columns",
                        m.asset_id
                    )))
                }
            }
        } else {
            match (m.serial_number, m.individual_status) {
                (Some(serial_number), Some(status)) => AssetKind::Unique {
                    serial_number,
                    status,
                },
                _ => {
                    return Err(AppError::Internal(format!(
                        "unique asset {} is missing serial or status",
                        m.asset_id
                    )))
                }
            }
        };

        Ok(Self {
            asset_id: m.asset_id,
            name: m.name,
            location_id: m.location_id,
            keeper_payroll_number: m.keeper_payroll_number,
            model_number: m.model_number,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
            kind,
        })
    }
}

// ============ Bulk asset inputs ============

#[derive(Debug, Deserialize)]
pub struct CreateBulkAsset {
    pub name: String,
    pub location_id: i32,
    pub keeper_payroll_number: Option<String>,
    pub quantity: i32,
    pub minimum_threshold: i32,
    pub model_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBulkAsset {
    pub name: Option<String>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub quantity: Option<i32>,
    pub minimum_threshold: Option<i32>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
    pub status: Option<BulkStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RestockBulkAsset {
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Status filter for bulk listings; `low_stock` is derived, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatusFilter {
    Active,
    OutOfStock,
    Discontinued,
    LowStock,
}

#[derive(Debug, Clone, Default)]
pub struct BulkAssetFilter {
    pub search: Option<String>,
    pub status: Option<BulkStatusFilter>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
}

// ============ Unique asset inputs ============

#[derive(Debug, Deserialize)]
pub struct CreateUniqueAsset {
    pub name: String,
    pub serial_number: String,
    pub location_id: i32,
    pub keeper_payroll_number: Option<String>,
    pub status: Option<IndividualStatus>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUniqueAsset {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub status: Option<IndividualStatus>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UniqueAssetFilter {
    pub search: Option<String>,
    pub status: Option<IndividualStatus>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(current: i32, threshold: i32) -> BulkStock {
        BulkStock {
            current_stock_level: current,
            minimum_threshold: threshold,
            last_restocked: None,
            status: BulkStock::status_for_quantity(current),
        }
    }

    fn model(is_bulk: bool) -> asset::Model {
        let now = OffsetDateTime::now_utc();
        asset::Model {
            asset_id: 7,
            name: "Track gauge".to_string(),
            is_bulk,
            serial_number: None,
            individual_status: None,
            current_stock_level: None,
            minimum_threshold: None,
            last_restocked: None,
            bulk_status: None,
            location_id: Some(1),
            keeper_payroll_number: Some("P001".to_string()),
            model_number: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_follows_quantity() {
        assert_eq!(BulkStock::status_for_quantity(100), BulkStatus::Active);
        assert_eq!(BulkStock::status_for_quantity(0), BulkStatus::OutOfStock);
    }

    #[test]
    fn discontinued_is_sticky_without_explicit_request() {
        assert_eq!(
            BulkStock::resolve_status(BulkStatus::Discontinued, 50, None),
            BulkStatus::Discontinued
        );
        assert_eq!(
            BulkStock::resolve_status(BulkStatus::Discontinued, 50, Some(BulkStatus::Active)),
            BulkStatus::Active
        );
    }

    #[test]
    fn explicit_active_with_no_stock_is_out_of_stock() {
        assert_eq!(
            BulkStock::resolve_status(BulkStatus::Active, 0, Some(BulkStatus::Active)),
            BulkStatus::OutOfStock
        );
    }

    #[test]
    fn low_stock_excludes_empty_and_above_threshold() {
        assert!(stock(20, 20).is_low_stock());
        assert!(stock(1, 20).is_low_stock());
        assert!(!stock(0, 20).is_low_stock());
        assert!(!stock(21, 20).is_low_stock());
    }

    #[test]
    fn stock_percentage_is_relative_to_threshold() {
        assert_eq!(stock(70, 20).stock_percentage(), Some(Decimal::from(350)));
        assert_eq!(
            stock(1, 3).stock_percentage(),
            Some(Decimal::new(3333, 2))
        );
        assert_eq!(stock(10, 0).stock_percentage(), None);
    }

    #[test]
    fn bulk_row_becomes_bulk_variant() {
        let mut m = model(true);
        m.current_stock_level = Some(100);
        m.minimum_threshold = Some(20);
        m.bulk_status = Some(BulkStatus::Active);

        let asset = Asset::try_from(m).unwrap();
        assert!(asset.is_bulk());
        assert_eq!(asset.bulk().unwrap().current_stock_level, 100);
    }

    #[test]
    fn unique_row_becomes_unique_variant() {
        let mut m = model(false);
        m.serial_number = Some("SN-1".to_string());
        m.individual_status = Some(IndividualStatus::Available);

        let asset = Asset::try_from(m).unwrap();
        assert_eq!(
            asset.kind,
            AssetKind::Unique {
                serial_number: "SN-1".to_string(),
                status: IndividualStatus::Available,
            }
        );
    }

    #[test]
    fn row_missing_its_shape_is_rejected() {
        assert!(Asset::try_from(model(true)).is_err());
        assert!(Asset::try_from(model(false)).is_err());
    }
}
