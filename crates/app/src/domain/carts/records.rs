//! Cart Records

use comptoir::lines::Variant;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the shopper who owns a cart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserUuid(Uuid);

impl UserUuid {
    /// Wrap a user id.
    #[must_use]
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserUuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// One persisted cart line, as stored and returned by the cart repository.
///
/// Prices are minor units in the store currency, captured when the line was
/// created (sale price if the product was on sale, list price otherwise).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Identity of the line itself, distinct from the product id.
    pub uuid: Uuid,

    /// External id of the product the line references.
    pub product_uuid: Uuid,

    /// Display name captured at add time.
    pub name: String,

    /// Variant selection, if any.
    pub variant: Option<Variant>,

    /// Effective price per unit, minor units.
    pub unit_price_minor: i64,

    /// List price per unit, minor units.
    pub list_price_minor: i64,

    /// Units on the line.
    pub quantity: u32,

    /// Stock ceiling captured for the line.
    pub stock_quantity: u32,
}
