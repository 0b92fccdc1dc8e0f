//! Power-on sequence.
//!
//! The endpoint does not read tags until the network link is associated.
//! While it waits the system-red indicator blinks; once the link is up
//! system-green comes on and stays on for as long as the endpoint runs.

use tapgate_hardware::SignalOutputs;
use tapgate_network::Transport;
use tracing::{info, warn};

use crate::error::Result;
use crate::feedback::{FeedbackController, FeedbackKind};

/// Blink until `transport` reports a link, then render the ready indication.
///
/// Line failures while waiting are logged and do not stop the wait.
///
/// # Errors
///
/// Returns the first output failure of the reset or the ready indication.
pub async fn await_link<T, O>(transport: &T, feedback: &mut FeedbackController<O>) -> Result<()>
where
    T: Transport,
    O: SignalOutputs,
{
    feedback.reset().await?;

    let mut cycles = 0u32;
    while !transport.is_connected() {
        if cycles == 0 {
            info!("Waiting for network link");
        }
        if let Err(e) = feedback.render(FeedbackKind::LinkWait).await {
            warn!(error = %e, "Link wait indication incomplete");
        }
        cycles += 1;
    }

    info!(wait_cycles = cycles, "Network link up");
    feedback.render(FeedbackKind::Ready).await
}
