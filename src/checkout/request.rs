//! Checkout request and its validated form

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::domain::aggregates::{CustomerContact, ShippingDetails};
use crate::domain::value_objects::PhoneNumber;
use crate::CheckoutError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(max = 255), custom = "non_blank")]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    pub phone_number: String,
    #[serde(default)]
    pub alternative_phone_number: Option<String>,
    #[validate(length(max = 255), custom = "non_blank")]
    pub street: String,
    #[validate(length(max = 128), custom = "non_blank")]
    pub city: String,
    #[validate(length(min = 1, message = "at least one cart item is required"))]
    pub items: Vec<CheckoutLine>,
}

/// One selected cart item. `quantity` is what the client saw; the cart item's own
/// quantity is the one that gets ordered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub cart_item_id: i64,
    #[serde(default)]
    pub quantity: Option<i32>,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { return Err(ValidationError::new("blank")); }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub contact: CustomerContact,
    pub shipping: ShippingDetails,
    /// Requested ids in submission order, duplicates removed.
    pub cart_item_ids: Vec<i64>,
}

impl CheckoutRequest {
    pub fn into_validated(self) -> Result<ValidatedCheckout, CheckoutError> {
        self.validate().map_err(|e| CheckoutError::Validation(e.to_string()))?;

        let phone_number = PhoneNumber::parse(&self.phone_number)
            .map_err(|e| CheckoutError::Validation(format!("phone_number: {e}")))?;
        let alternative_phone_number = match self.alternative_phone_number.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(PhoneNumber::parse(raw)
                .map_err(|e| CheckoutError::Validation(format!("alternative_phone_number: {e}")))?),
            _ => None,
        };

        let mut cart_item_ids = Vec::with_capacity(self.items.len());
        for line in &self.items {
            if !cart_item_ids.contains(&line.cart_item_id) { cart_item_ids.push(line.cart_item_id); }
        }

        Ok(ValidatedCheckout {
            contact: CustomerContact { name: self.customer_name.trim().to_string(), email: self.customer_email.trim().to_string() },
            shipping: ShippingDetails { phone_number, alternative_phone_number, street: self.street.trim().to_string(), city: self.city.trim().to_string() },
            cart_item_ids,
        })
    }
}
