//! Order draft, checkout fields and validation errors.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::{ItemId, OrderId};
use super::price::Price;

/// Error returned when parsing an unknown [`OrderField`] name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order field: {0}")]
pub struct UnknownOrderField(pub String);

/// The checkout form fields an order draft exposes for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    Email,
    Phone,
    Address,
    Payment,
}

impl OrderField {
    /// Every field, in form order.
    pub const ALL: [Self; 4] = [Self::Email, Self::Phone, Self::Address, Self::Payment];

    /// Fields that must be non-empty for an order to be valid.
    pub const REQUIRED: [Self; 3] = [Self::Email, Self::Phone, Self::Address];

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Payment => "payment",
        }
    }

    /// Whether validation checks this field.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Payment)
    }

    /// Message reported when a required field is empty.
    #[must_use]
    pub const fn missing_message(self) -> &'static str {
        match self {
            Self::Email => "Email is required",
            Self::Phone => "Phone number is required",
            Self::Address => "Delivery address is required",
            Self::Payment => "Payment method is required",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderField {
    type Err = UnknownOrderField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "address" => Ok(Self::Address),
            "payment" => Ok(Self::Payment),
            _ => Err(UnknownOrderField(s.to_string())),
        }
    }
}

/// The in-progress checkout form plus the basket item sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDraft {
    /// Free-form payment label (e.g. "cash", "card").
    pub payment: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Basket contents in insertion order, without duplicates.
    pub items: Vec<ItemId>,
}

impl OrderDraft {
    /// Read a form field.
    #[must_use]
    pub fn get(&self, field: OrderField) -> &str {
        match field {
            OrderField::Email => &self.email,
            OrderField::Phone => &self.phone,
            OrderField::Address => &self.address,
            OrderField::Payment => &self.payment,
        }
    }

    /// Overwrite a form field.
    pub fn set(&mut self, field: OrderField, value: impl Into<String>) {
        let slot = match field {
            OrderField::Email => &mut self.email,
            OrderField::Phone => &mut self.phone,
            OrderField::Address => &mut self.address,
            OrderField::Payment => &mut self.payment,
        };
        *slot = value.into();
    }

    /// Check every required field for a non-empty value.
    ///
    /// The result is rebuilt from scratch on every call.
    #[must_use]
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        for field in OrderField::REQUIRED {
            if self.get(field).is_empty() {
                errors.0.insert(field, field.missing_message().to_string());
            }
        }
        errors
    }
}

/// Field-keyed validation messages. Empty means the draft is valid.
///
/// Only [`OrderDraft::validate`] inserts entries, so keys are always a
/// subset of [`OrderField::REQUIRED`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<OrderField, String>);

impl FormErrors {
    /// Whether no field failed validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for one field, if it failed.
    #[must_use]
    pub fn get(&self, field: OrderField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Same as [`FormErrors::is_valid`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failing fields in form order.
    pub fn fields(&self) -> impl Iterator<Item = OrderField> + '_ {
        self.0.keys().copied()
    }

    /// All messages joined with `sep`, in form order.
    #[must_use]
    pub fn joined(&self, sep: &str) -> String {
        self.0.values().map(String::as_str).collect::<Vec<_>>().join(sep)
    }
}

/// Body sent to the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub payment: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Sum of the known prices of the basket items.
    pub total: Price,
    pub items: Vec<ItemId>,
}

impl OrderRequest {
    /// Build a request from a draft and its computed total.
    #[must_use]
    pub fn from_draft(draft: OrderDraft, total: Price) -> Self {
        Self {
            payment: draft.payment,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            total,
            items: draft.items,
        }
    }
}

/// Successful order submission result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    /// Total charged, as echoed back by the server.
    #[serde(default)]
    pub total: Option<Price>,
}
