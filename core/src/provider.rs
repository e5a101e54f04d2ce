//! The record-provider contract.
//!
//! RULE: The engine never knows how records are fetched. It asks for the two
//! logical views over a window and gets raw rows back; screening and
//! classification happen engine-side. A provider that cannot serve a view
//! returns `AuditError::DataUnavailable` and the engine propagates it
//! unchanged — no retries, no partial results.

use crate::{
    error::AuditResult,
    record::{FinanceRow, OperationsRow},
    types::Window,
};

pub trait RecordProvider {
    /// Operations view: shipped orders with dates, amounts and status.
    fn operations_rows(&self, window: &Window) -> AuditResult<Vec<OperationsRow>>;

    /// Finance view: booked receivables keyed by order id.
    fn finance_rows(&self, window: &Window) -> AuditResult<Vec<FinanceRow>>;
}
