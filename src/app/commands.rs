//! Inbound commands to the application service.
//!
//! These represent events from the remote channel that the
//! [`AppService`](super::service::AppService) interprets between cycles.

use crate::control::OverrideCommand;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Operator override for one actuator; takes effect at the next cycle.
    Override(OverrideCommand),

    /// The dashboard link came up; everything published must be resent.
    LinkConnected,

    /// The dashboard link dropped.
    LinkDisconnected,
}
