//! Flow conservation check.
//!
//! When a net flow was derived purely from orders, every unit taken from
//! one token side was credited to the other. A flow that does not cancel
//! out means the netting step was corrupted, and the batch must not be
//! priced or signed.

use veilbatch_types::{NetFlow, Result, VeilBatchError};

/// Verify `token0 + token1 == 0`.
///
/// # Errors
/// Returns [`VeilBatchError::FlowConservationViolation`] carrying both sides.
pub fn verify_flow_conservation(flow: &NetFlow) -> Result<()> {
    if flow.is_conserved() {
        return Ok(());
    }
    tracing::error!(token0 = %flow.token0, token1 = %flow.token1, "net flow is not conserved");
    Err(VeilBatchError::FlowConservationViolation {
        token0: flow.token0.to_string(),
        token1: flow.token1.to_string(),
    })
}
