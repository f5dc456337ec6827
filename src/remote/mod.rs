//! Remote dashboard layer.
//!
//! The dashboard exposes seven virtual pins (V0–V6).  This module owns
//! the wire format and the I/O thread; the control loop only sees
//! [`AppCommand`](crate::app::commands::AppCommand)s coming in and a
//! [`RemotePort`](crate::app::ports::RemotePort) going out.
//!
//! ```text
//!  ┌──────────────┐ CommandInbox     ┌────────────┐  TCP   ┌───────────┐
//!  │ control loop │◀──── AppCommand ─│  io_task   │◀──────▶│ dashboard │
//!  │ (AppService) │── Line ─────────▶│ read∥write │  JSON  │  server   │
//!  └──────────────┘ OUTBOUND_CHANNEL └────────────┘  lines └───────────┘
//! ```

pub mod channels;
pub mod codec;
pub mod io_task;
pub mod link;
pub mod message;
pub mod publisher;
pub mod vpin;
