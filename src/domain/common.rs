//! Shared traits implemented by the persisted row types.

use uuid::Uuid;

/// Exposes a stable identifier for rows stored in the data store.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Associates rows with the budget category they are filed under.
pub trait BelongsToCategory {
    fn category_id(&self) -> Uuid;
}

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Every row is owned by exactly one user.
pub trait UserOwned {
    fn user_id(&self) -> Uuid;
}
