//! Shipping Address

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A required shipping-address field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressField {
    /// Recipient's full name.
    FullName,

    /// Contact phone number.
    Phone,

    /// Street address text.
    Address,

    /// City.
    City,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FullName => "full name",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
        };

        write!(f, "{label}")
    }
}

/// Where an order ships to.
///
/// Full name, phone, address and city are required to leave the Address step;
/// postal code, country and delivery instructions are optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient's full name.
    pub full_name: String,

    /// Contact phone number.
    pub phone: String,

    /// Street address text (street, district).
    pub address: String,

    /// City.
    pub city: String,

    /// Postal code, when the address has one.
    pub postal_code: String,

    /// Destination country.
    pub country: String,

    /// Free-form delivery instructions.
    pub instructions: Option<String>,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: "Bénin".to_string(),
            instructions: None,
        }
    }
}

impl ShippingAddress {
    /// The required fields that are still empty. Whitespace-only input counts
    /// as empty.
    #[must_use]
    pub fn missing_fields(&self) -> SmallVec<[AddressField; 4]> {
        let mut missing = SmallVec::new();

        if self.full_name.trim().is_empty() {
            missing.push(AddressField::FullName);
        }

        if self.phone.trim().is_empty() {
            missing.push(AddressField::Phone);
        }

        if self.address.trim().is_empty() {
            missing.push(AddressField::Address);
        }

        if self.city.trim().is_empty() {
            missing.push(AddressField::City);
        }

        missing
    }

    /// Whether every required field is filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ShippingAddress {
        ShippingAddress {
            full_name: "Aïcha Soglo".to_string(),
            phone: "+229 0123456789".to_string(),
            address: "Rue 12.080, Quartier Gbegamey".to_string(),
            city: "Cotonou".to_string(),
            ..ShippingAddress::default()
        }
    }

    #[test]
    fn default_country_is_benin() {
        let address = ShippingAddress::default();

        assert_eq!(address.country, "Bénin");
        assert!(address.instructions.is_none());
    }

    #[test]
    fn complete_address_has_no_missing_fields() {
        assert!(complete().is_complete());
    }

    #[test]
    fn empty_required_fields_are_reported_in_order() {
        let address = ShippingAddress::default();
        let missing = address.missing_fields();

        assert_eq!(
            missing.as_slice(),
            [
                AddressField::FullName,
                AddressField::Phone,
                AddressField::Address,
                AddressField::City,
            ]
        );
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut address = complete();
        address.city = "   ".to_string();

        assert_eq!(address.missing_fields().as_slice(), [AddressField::City]);
        assert!(!address.is_complete());
    }

    #[test]
    fn optional_fields_do_not_gate_completeness() {
        let mut address = complete();
        address.postal_code = String::new();
        address.country = String::new();
        address.instructions = None;

        assert!(address.is_complete());
    }

    #[test]
    fn address_field_display_names_fields() {
        assert_eq!(AddressField::FullName.to_string(), "full name");
        assert_eq!(AddressField::City.to_string(), "city");
    }
}
