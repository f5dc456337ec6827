//! Dashboard virtual-pin map.
//!
//! ```text
//!  V0  temperature (°C, 1 dp)     device → server
//!  V1  humidity (%, 1 dp)         device → server
//!  V2  fan status label           device → server
//!  V3  pump status label          device → server
//!  V4  fan override switch        server → device
//!  V5  pump override switch       server → device
//!  V6  system status text         device → server
//! ```

use crate::control::ActuatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VirtualPin {
    Temperature = 0,
    Humidity = 1,
    FanStatus = 2,
    PumpStatus = 3,
    FanControl = 4,
    PumpControl = 5,
    SystemStatus = 6,
}

impl VirtualPin {
    /// Pins the device asks the server to replay after every connect.
    pub const SYNC_ON_CONNECT: [VirtualPin; 2] = [VirtualPin::FanControl, VirtualPin::PumpControl];

    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn from_number(n: u8) -> Option<Self> {
        Some(match n {
            0 => Self::Temperature,
            1 => Self::Humidity,
            2 => Self::FanStatus,
            3 => Self::PumpStatus,
            4 => Self::FanControl,
            5 => Self::PumpControl,
            6 => Self::SystemStatus,
            _ => return None,
        })
    }

    pub const fn status_for(actuator: ActuatorId) -> Self {
        match actuator {
            ActuatorId::Fan => Self::FanStatus,
            ActuatorId::Pump => Self::PumpStatus,
        }
    }

    /// Actuator driven by this pin, for the two override switches.
    pub const fn controlled_actuator(self) -> Option<ActuatorId> {
        match self {
            Self::FanControl => Some(ActuatorId::Fan),
            Self::PumpControl => Some(ActuatorId::Pump),
            _ => None,
        }
    }
}
