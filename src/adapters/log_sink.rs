//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  One `CYCLE` line is
//! printed per control cycle in the operator-facing format.

use log::{info, warn};

use crate::app::events::{AppEvent, CycleSummary};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// `T=26.0°C  H=48.0%  Fan=AUTO ON  Pump=AUTO ON  LED=OFF`, or a
/// placeholder when the reading failed.
pub fn format_cycle(s: &CycleSummary) -> String {
    let climate = match &s.reading {
        Some(r) => format!(
            "T={:.1}\u{00b0}C  H={:.1}%",
            r.temperature_c, r.humidity_percent
        ),
        None => "T=--  H=--".to_string(),
    };
    format!(
        "[{}] {}  Fan={}  Pump={}  LED={}",
        s.at,
        climate,
        s.fan,
        s.pump,
        if s.indicator_on { "ON" } else { "OFF" }
    )
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle(s) => {
                info!("CYCLE | {}", format_cycle(s));
            }
            AppEvent::StatusChanged { actuator, label } => {
                info!("STATUS | {} -> {}", actuator, label);
            }
            AppEvent::SensorReadFailed(e) => {
                warn!("SENSOR | read failed: {}", e);
            }
            AppEvent::ActuatorFault { actuator, error } => {
                warn!("FAULT | {}: {}", actuator, error);
            }
            AppEvent::IndicatorFault(e) => {
                warn!("FAULT | indicator: {}", e);
            }
            AppEvent::LinkChanged { connected } => {
                info!("LINK | {}", if *connected { "connected" } else { "disconnected" });
            }
            AppEvent::Started {
                max_temperature_c,
                min_humidity_percent,
            } => {
                info!(
                    "START | Sericulture control system started (T>{:.1}\u{00b0}C fan, H<{:.1}% pump)",
                    max_temperature_c, min_humidity_percent
                );
            }
            AppEvent::Shutdown => {
                info!("STOP | outputs released");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ClimateReading, StatusLabel, Timestamp};

    #[test]
    fn cycle_line_matches_console_format() {
        let s = CycleSummary {
            at: Timestamp::from_millis(5_000),
            reading: Some(ClimateReading::new(26.04, 48.0)),
            fan: StatusLabel::AutoOn,
            pump: StatusLabel::ManualOn,
            indicator_on: false,
        };
        assert_eq!(
            format_cycle(&s),
            "[5.000s] T=26.0\u{00b0}C  H=48.0%  Fan=AUTO ON  Pump=MANUAL ON  LED=OFF"
        );
    }

    #[test]
    fn failed_reading_has_placeholder() {
        let s = CycleSummary {
            at: Timestamp::ZERO,
            reading: None,
            fan: StatusLabel::Off,
            pump: StatusLabel::Off,
            indicator_on: true,
        };
        assert!(format_cycle(&s).contains("T=--  H=--"));
    }
}
