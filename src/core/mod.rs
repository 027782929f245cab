pub mod context;
pub mod entity;
pub mod error;
pub mod in_memory;
pub mod money;
pub mod reference;
pub mod traits;

pub use context::TenancyContext;
pub use entity::{Entity, EntityMeta, Extras};
pub use error::{AppError, Result};
pub use money::{Amount, Money};
pub use traits::Repository;
