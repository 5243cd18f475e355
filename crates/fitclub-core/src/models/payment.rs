// ABOUTME: Client payments with optional link to the membership they pay for
// ABOUTME: Amounts must be positive; the payment date is set by the server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::money::{self, Decimal};
use super::{nullable, require_id};
use crate::constants::limits::MAX_PAYMENT_DESCRIPTION_LEN;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Cash at the front desk
    Cash,
    /// Bank card
    Card,
    /// Bank transfer
    Transfer,
}

impl PaymentType {
    /// All payment types in display order
    pub const ALL: [Self; 3] = [Self::Cash, Self::Card, Self::Transfer];

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    /// Human-readable label used in reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Transfer => "Transfer",
        }
    }
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment received from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: i64,
    /// Paying client
    pub client_id: i64,
    /// Membership being paid for
    pub membership_id: Option<i64>,
    /// Amount paid
    pub amount: Decimal,
    /// When the payment was recorded
    pub payment_date: DateTime<Utc>,
    /// Payment method
    pub payment_type: PaymentType,
    /// Free-form note
    pub description: Option<String>,
}

/// Fields for creating or fully replacing a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Paying client
    pub client_id: i64,
    /// Membership being paid for
    #[serde(default)]
    pub membership_id: Option<i64>,
    /// Amount paid
    pub amount: Decimal,
    /// Payment method
    pub payment_type: PaymentType,
    /// Free-form note
    #[serde(default)]
    pub description: Option<String>,
}

impl PaymentRequest {
    /// Validate field shapes
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` for a non-positive amount or an overlong description
    pub fn validate(&self) -> AppResult<()> {
        require_id("client_id", self.client_id)?;
        if let Some(membership_id) = self.membership_id {
            require_id("membership_id", membership_id)?;
        }
        money::validate_scale("amount", self.amount)?;
        if self.amount <= Decimal::ZERO {
            return Err(AppError::out_of_range(
                "amount",
                "Payment amount must be greater than zero",
            ));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_PAYMENT_DESCRIPTION_LEN {
                return Err(AppError::out_of_range(
                    "description",
                    format!(
                        "Description must be at most {MAX_PAYMENT_DESCRIPTION_LEN} characters"
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Partial update of a payment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentPatch {
    /// New client
    pub client_id: Option<i64>,
    /// New membership link, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub membership_id: Option<Option<i64>>,
    /// New amount
    pub amount: Option<Decimal>,
    /// New payment method
    pub payment_type: Option<PaymentType>,
    /// New note, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl PaymentPatch {
    /// Merge onto the stored payment
    #[must_use]
    pub fn merge(self, existing: &Payment) -> PaymentRequest {
        PaymentRequest {
            client_id: self.client_id.unwrap_or(existing.client_id),
            membership_id: self.membership_id.unwrap_or(existing.membership_id),
            amount: self.amount.unwrap_or(existing.amount),
            payment_type: self.payment_type.unwrap_or(existing.payment_type),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: &str) -> PaymentRequest {
        serde_json::from_value(serde_json::json!({
            "client_id": 1,
            "amount": amount,
            "payment_type": "card",
        }))
        .unwrap()
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(request("1500.00").validate().is_ok());
        let err = request("0").validate().unwrap_err();
        assert_eq!(err.context.details["field"], "amount");
        assert!(request("-100").validate().is_err());
    }

    #[test]
    fn test_amount_precision_limited_to_kopecks() {
        assert!(request("10.50").validate().is_ok());
        assert!(request("10.500").validate().is_ok());
        let err = request("10.005").validate().unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_description_length_limit() {
        let mut req = request("10");
        req.description = Some("x".repeat(MAX_PAYMENT_DESCRIPTION_LEN));
        assert!(req.validate().is_ok());
        req.description = Some("x".repeat(MAX_PAYMENT_DESCRIPTION_LEN + 1));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_payment_type_rejected() {
        let parsed = serde_json::from_value::<PaymentRequest>(serde_json::json!({
            "client_id": 1,
            "amount": "10",
            "payment_type": "crypto",
        }));
        assert!(parsed.is_err());
    }
}
