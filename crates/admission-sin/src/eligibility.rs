use crate::Registration;

/// Returns `true` when a registration qualifies for a SIN.
///
/// A registration qualifies when it carries a non-blank transaction id and a
/// payment amount that parses to a number strictly greater than zero.
///
/// The `paymentStatus` string does **not** gate eligibility: a registration
/// with a transaction id and a positive amount qualifies even while its status
/// still reads `pending`. Existing records were written with inconsistent
/// status strings, so the transaction id and amount are the only trusted
/// signals.
///
/// # Example
/// ```
/// use admission_sin::{Registration, is_eligible};
///
/// let reg = Registration {
///     transaction_id: Some("TXN1".into()),
///     payment_amount: Some(500.0.into()),
///     ..Default::default()
/// };
/// assert!(is_eligible(&reg));
/// ```
pub fn is_eligible(registration: &Registration) -> bool {
    let has_transaction = registration
        .transaction_id
        .as_deref()
        .is_some_and(|txn| !txn.trim().is_empty());

    let has_positive_amount = registration
        .payment_amount
        .as_ref()
        .and_then(|amount| amount.value())
        .is_some_and(|amount| amount > 0.0);

    has_transaction && has_positive_amount
}
