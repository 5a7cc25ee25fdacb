//! Registration records as collected by the admission form.
//!
//! Field names serialize in camelCase so stored JSON stays compatible with the
//! documents the admission form has always produced.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment status written when a transaction id accompanies the submission.
pub const STATUS_PAID: &str = "paid";
/// Payment status for submissions still awaiting payment.
pub const STATUS_PENDING: &str = "pending";

/// A monetary amount as submitted by the form: either a JSON number or a
/// numeric string such as `"5000"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Returns the amount as a finite number, or `None` when the text does not
    /// parse.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Reference to an uploaded document. Only the storage path is kept, never a
/// public URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub path: String,
}

/// Supporting documents attached to a registration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Documents {
    pub aadhar_file: Option<FileRef>,
    pub caste_file: Option<FileRef>,
    pub residential_file: Option<FileRef>,
    pub income_file: Option<FileRef>,
    pub marksheet_file: Option<FileRef>,
    pub signature_file: Option<FileRef>,
}

/// A stored admission registration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub id: String,
    pub program: String,
    pub course: String,
    pub student_name: String,
    pub email: String,
    pub phone_number: String,
    pub aadhar_number: String,
    pub date_of_birth: String,
    pub permanent_address: String,
    pub correspondence_address: String,
    pub payment_amount: Option<Amount>,
    pub total_fee: Option<Amount>,
    pub transaction_id: Option<String>,
    pub payment_status: String,
    pub status: String,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    #[serde(flatten)]
    pub documents: Documents,
    pub payment_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sin_number: Option<String>,
    pub sin_generated_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// Builds a stored record from a validated submission.
    pub fn from_new(id: String, new: NewRegistration, now: DateTime<Utc>) -> Self {
        let transaction_id = new
            .transaction_id
            .filter(|txn| !txn.trim().is_empty());
        let status = if transaction_id.is_some() {
            STATUS_PAID
        } else {
            STATUS_PENDING
        };
        Self {
            id,
            program: new.program,
            course: new.course,
            student_name: new.student_name,
            email: new.email,
            phone_number: new.phone_number,
            aadhar_number: new.aadhar_number,
            date_of_birth: new.date_of_birth,
            permanent_address: new.permanent_address,
            correspondence_address: new.correspondence_address,
            payment_amount: new.payment_amount,
            total_fee: new.total_fee,
            transaction_id,
            payment_status: status.to_owned(),
            status: status.to_owned(),
            razorpay_order_id: new.razorpay_order_id,
            razorpay_payment_id: new.razorpay_payment_id,
            razorpay_signature: new.razorpay_signature,
            documents: new.documents,
            payment_time: None,
            created_at: now,
            updated_at: now,
            sin_number: None,
            sin_generated_at: None,
        }
    }

    /// The assigned SIN, if any.
    pub fn sin(&self) -> Option<&str> {
        self.sin_number.as_deref()
    }

    /// Applies a payment confirmation in place.
    pub fn apply_payment(&mut self, update: &PaymentUpdate, now: DateTime<Utc>) {
        self.transaction_id = Some(update.transaction_id.clone());
        self.payment_status = update.payment_status.clone();
        self.payment_time = Some(update.payment_time.unwrap_or(now));
        self.status = STATUS_PAID.to_owned();
        self.updated_at = now;
    }
}

/// A submission from the public registration form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRegistration {
    pub program: String,
    pub course: String,
    pub student_name: String,
    pub email: String,
    pub phone_number: String,
    pub aadhar_number: String,
    pub date_of_birth: String,
    pub permanent_address: String,
    pub correspondence_address: String,
    pub payment_amount: Option<Amount>,
    pub total_fee: Option<Amount>,
    pub transaction_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    #[serde(flatten)]
    pub documents: Documents,
}

impl NewRegistration {
    /// Rejects submissions missing the fields every record needs.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("program", &self.program),
            ("course", &self.course),
            ("studentName", &self.student_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidRegistration {
                    reason: format!("`{field}` is required"),
                });
            }
        }
        Ok(())
    }
}

/// Payment confirmation for an existing registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub transaction_id: String,
    pub payment_status: String,
    #[serde(default)]
    pub payment_time: Option<DateTime<Utc>>,
}

/// Offset pagination over registrations ordered newest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}
