pub mod asset;
pub mod assignment;
pub mod location;
pub mod movement;
pub mod restock;
pub mod user;

pub use asset::*;
pub use assignment::*;
pub use location::*;
pub use movement::*;
pub use restock::*;
pub use user::*;
