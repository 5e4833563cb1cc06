//! Payments
//!
//! The boundary to an external payment provider. Only the non-sensitive
//! [`PaymentDescriptor`] is ever stored; [`PaymentToken`] cannot be serialized.

use std::fmt;

use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors reported by a [`PaymentProvider`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The provider declined the charge.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The provider could not be reached.
    #[error("payment provider unavailable: {0}")]
    Unavailable(String),

    /// The provider returned an unusable receipt.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Opaque, single-use payment method token from the provider's client side.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentToken(String);

impl PaymentToken {
    /// Wrap a provider token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for handing back to the provider.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PaymentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PaymentToken(..)")
    }
}

/// Last four digits of a card number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LastFour(String);

impl LastFour {
    /// Validate four ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLastFour`] for anything else.
    pub fn new(digits: impl Into<String>) -> Result<Self, ValidationError> {
        let digits = digits.into();

        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidLastFour(digits));
        }

        Ok(Self(digits))
    }

    /// The digits
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LastFour {
    type Error = ValidationError;

    fn try_from(digits: String) -> Result<Self, Self::Error> {
        Self::new(digits)
    }
}

impl From<LastFour> for String {
    fn from(digits: LastFour) -> Self {
        digits.0
    }
}

impl fmt::Display for LastFour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an order was paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit or debit card
    #[default]
    CreditCard,
}

/// Payment details safe to persist on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDescriptor {
    /// Payment method
    pub method: PaymentMethod,

    /// Card brand, e.g. `visa`
    pub brand: String,

    /// Last four card digits
    pub last_four: LastFour,
}

impl From<&PaymentReceipt> for PaymentDescriptor {
    fn from(receipt: &PaymentReceipt) -> Self {
        Self {
            method: PaymentMethod::CreditCard,
            brand: receipt.brand.clone(),
            last_four: receipt.last_four.clone(),
        }
    }
}

/// Amount to charge, already rounded to the currency's minor unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Amount in major units
    pub amount: Decimal,

    /// ISO currency code
    pub currency: String,
}

/// A successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Provider's transaction reference
    pub transaction_id: String,

    /// Card brand
    pub brand: String,

    /// Last four card digits
    pub last_four: LastFour,
}

/// External payment provider.
#[automock]
pub trait PaymentProvider {
    /// Charge `token` for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] if the charge did not go through.
    fn charge(
        &self,
        request: &ChargeRequest,
        token: &PaymentToken,
    ) -> Result<PaymentReceipt, PaymentError>;
}

impl<P: PaymentProvider + ?Sized> PaymentProvider for &P {
    fn charge(
        &self,
        request: &ChargeRequest,
        token: &PaymentToken,
    ) -> Result<PaymentReceipt, PaymentError> {
        (**self).charge(request, token)
    }
}
