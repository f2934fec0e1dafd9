pub mod asset;
pub mod assignment;
pub mod location;
pub mod movement;
pub mod restock;
pub mod user;

pub use asset::{AssetChanges, AssetRepository, NewAsset, NewAssetShape};
pub use assignment::{AssignmentRepository, NewAssignment};
pub use location::LocationRepository;
pub use movement::MovementRepository;
pub use restock::RestockRepository;
pub use user::{UserChanges, UserRepository};

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::ConnectionTrait;

use crate::error::AppResult;

/// Base repository trait for keyed lookups shared by the main tables
#[async_trait]
pub trait Repository<T>
where
    T: Send + Sync,
{
    type Id: Send + Sync + 'static;

    /// Find entity by its key
    async fn find_by_id<C>(db: &C, id: Self::Id) -> AppResult<T>
    where
        C: ConnectionTrait;

    /// Delete entity by its key
    async fn delete<C>(db: &C, id: Self::Id) -> AppResult<()>
    where
        C: ConnectionTrait;

    /// Count total entities
    async fn count<C>(db: &C) -> AppResult<u64>
    where
        C: ConnectionTrait;
}

/// Case-insensitive substring match on a text column.
pub(crate) fn contains_ci<C>(column: C, term: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", escaped))
}

/// Case-insensitive equality on a text column.
pub(crate) fn equals_ci<C>(column: C, value: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    Expr::expr(Func::lower(Expr::col(column))).eq(value.to_lowercase())
}
