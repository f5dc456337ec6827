//! [`RemotePort`] implementation that queues lines for the I/O task.

use crate::app::ports::RemotePort;
use crate::control::{ActuatorId, ClimateReading, StatusLabel};
use crate::error::RemoteError;

use super::channels;
use super::message::{encode_line, round_one_decimal, WireMessage};
use super::vpin::VirtualPin;

/// Publishes through [`channels::OUTBOUND_CHANNEL`].  Fails fast with
/// [`RemoteError::NotConnected`] while no session is up so callers keep
/// their "needs publishing" state.
#[derive(Debug, Default)]
pub struct ChannelPublisher;

impl ChannelPublisher {
    pub const fn new() -> Self {
        Self
    }

    fn send(&mut self, msg: &WireMessage) -> Result<(), RemoteError> {
        channels::send_line(encode_line(msg)?)
    }
}

impl RemotePort for ChannelPublisher {
    fn publish_status(
        &mut self,
        actuator: ActuatorId,
        label: StatusLabel,
    ) -> Result<(), RemoteError> {
        let msg = WireMessage::write_text(VirtualPin::status_for(actuator), label.as_str())?;
        self.send(&msg)
    }

    fn publish_telemetry(&mut self, reading: &ClimateReading) -> Result<(), RemoteError> {
        self.send(&WireMessage::write_number(
            VirtualPin::Temperature,
            round_one_decimal(reading.temperature_c),
        ))?;
        self.send(&WireMessage::write_number(
            VirtualPin::Humidity,
            round_one_decimal(reading.humidity_percent),
        ))
    }

    fn publish_system_status(&mut self, text: &str) -> Result<(), RemoteError> {
        let msg = WireMessage::write_text(VirtualPin::SystemStatus, text)?;
        self.send(&msg)
    }
}
