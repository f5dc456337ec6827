//! Per-actuator control state.
//!
//! Every actuator is an independent three-state machine:
//!
//! ```text
//!            trigger                        run window elapsed
//!   Idle ───────────────▶ AutoActive ───────────────────────▶ Idle
//!    ▲  ▲                     │
//!    │  │ release             │ override(on|off)
//!    │  └──── Manual{on} ◀────┘  (also reachable from Idle)
//! ```
//!
//! A manual override always wins and discards any running auto window.
//! Releasing an override returns to `Idle`; the next evaluation starts a
//! fresh window if the trigger condition still holds.

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use super::time::Timestamp;

/// The two relay-driven actuators in the enclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActuatorId {
    /// Exhaust fan, driven by over-temperature.
    Fan,
    /// Misting pump, driven by low humidity.
    Pump,
}

impl ActuatorId {
    pub const ALL: [ActuatorId; 2] = [ActuatorId::Fan, ActuatorId::Pump];

    /// Stable array index for per-actuator tables.
    pub const fn index(self) -> usize {
        match self {
            Self::Fan => 0,
            Self::Pump => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Pump => "pump",
        }
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status label shown on the dashboard for one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLabel {
    ManualOn,
    AutoOn,
    /// Idle or manually forced off.
    Off,
}

impl StatusLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManualOn => "MANUAL ON",
            Self::AutoOn => "AUTO ON",
            Self::Off => "OFF",
        }
    }

    pub const fn is_on(self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the three mutually exclusive modes an actuator is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    /// Auto mode, nothing running.
    #[default]
    Idle,
    /// Turned on by the threshold logic at `started_at`.
    AutoActive { started_at: Timestamp },
    /// Operator override; auto logic is suspended until released.
    Manual { on: bool },
}

/// Control record for one actuator.  Owned by the [`Arbiter`](super::Arbiter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorControl {
    state: ControlState,
}

impl ActuatorControl {
    /// Idle, no override asserted.
    pub const fn new() -> Self {
        Self {
            state: ControlState::Idle,
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    /// `Some(on)` while an operator override is asserted.
    pub fn manual_override(&self) -> Option<bool> {
        match self.state {
            ControlState::Manual { on } => Some(on),
            _ => None,
        }
    }

    pub fn is_auto_active(&self) -> bool {
        matches!(self.state, ControlState::AutoActive { .. })
    }

    /// Start of the running auto window, `None` when not auto-active.
    pub fn auto_started_at(&self) -> Option<Timestamp> {
        match self.state {
            ControlState::AutoActive { started_at } => Some(started_at),
            _ => None,
        }
    }

    /// Physical state this record demands: manual ON or a running auto window.
    pub fn wants_on(&self) -> bool {
        matches!(
            self.state,
            ControlState::Manual { on: true } | ControlState::AutoActive { .. }
        )
    }

    /// Apply one operator command.
    ///
    /// `Some(on)` asserts the override and drops any auto window.  `None`
    /// releases an asserted override; it does nothing in auto mode.
    pub fn apply_override(&mut self, intent: Option<bool>) {
        match intent {
            Some(on) => self.state = ControlState::Manual { on },
            None => {
                if let ControlState::Manual { .. } = self.state {
                    self.state = ControlState::Idle;
                }
            }
        }
    }

    /// Run the auto rules for one cycle and return the label in effect.
    ///
    /// `triggered` is `None` when the reading failed this cycle, otherwise
    /// whether the threshold condition holds.  A missing reading can never
    /// start a window but a running window still expires against `now`.
    pub fn evaluate(
        &mut self,
        now: Timestamp,
        triggered: Option<bool>,
        run_duration: Duration,
    ) -> StatusLabel {
        match self.state {
            ControlState::Manual { on: true } => StatusLabel::ManualOn,
            ControlState::Manual { on: false } => StatusLabel::Off,
            ControlState::Idle => {
                if triggered == Some(true) {
                    self.state = ControlState::AutoActive { started_at: now };
                    StatusLabel::AutoOn
                } else {
                    StatusLabel::Off
                }
            }
            ControlState::AutoActive { started_at } => {
                if now.saturating_duration_since(started_at) >= run_duration {
                    self.state = ControlState::Idle;
                    StatusLabel::Off
                } else {
                    StatusLabel::AutoOn
                }
            }
        }
    }

    /// Drop every mode back to idle (used on shutdown).
    pub fn reset(&mut self) {
        self.state = ControlState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN: Duration = Duration::from_secs(10);

    #[test]
    fn idle_triggers_auto_window() {
        let mut c = ActuatorControl::new();
        let label = c.evaluate(Timestamp::from_secs(1), Some(true), RUN);
        assert_eq!(label, StatusLabel::AutoOn);
        assert_eq!(c.auto_started_at(), Some(Timestamp::from_secs(1)));
        assert!(c.wants_on());
    }

    #[test]
    fn missing_reading_never_triggers() {
        let mut c = ActuatorControl::new();
        assert_eq!(c.evaluate(Timestamp::ZERO, None, RUN), StatusLabel::Off);
        assert!(!c.is_auto_active());
    }

    #[test]
    fn window_expires_at_exact_duration() {
        let mut c = ActuatorControl::new();
        c.evaluate(Timestamp::ZERO, Some(true), RUN);
        let just_before = Timestamp::from_millis(9_999);
        assert_eq!(c.evaluate(just_before, Some(false), RUN), StatusLabel::AutoOn);
        assert_eq!(c.evaluate(Timestamp::from_secs(10), Some(false), RUN), StatusLabel::Off);
        assert_eq!(c.auto_started_at(), None);
    }

    #[test]
    fn override_on_discards_window() {
        let mut c = ActuatorControl::new();
        c.evaluate(Timestamp::ZERO, Some(true), RUN);
        c.apply_override(Some(true));
        assert!(!c.is_auto_active());
        assert_eq!(c.manual_override(), Some(true));
        assert_eq!(c.evaluate(Timestamp::from_secs(3), Some(true), RUN), StatusLabel::ManualOn);
    }

    #[test]
    fn manual_off_suppresses_auto() {
        let mut c = ActuatorControl::new();
        c.apply_override(Some(false));
        assert_eq!(c.evaluate(Timestamp::ZERO, Some(true), RUN), StatusLabel::Off);
        assert!(!c.wants_on());
    }

    #[test]
    fn release_outside_manual_keeps_auto_window() {
        let mut c = ActuatorControl::new();
        c.evaluate(Timestamp::ZERO, Some(true), RUN);
        c.apply_override(None);
        assert_eq!(c.auto_started_at(), Some(Timestamp::ZERO));
    }

    #[test]
    fn labels_match_dashboard_strings() {
        assert_eq!(StatusLabel::ManualOn.as_str(), "MANUAL ON");
        assert_eq!(StatusLabel::AutoOn.as_str(), "AUTO ON");
        assert_eq!(StatusLabel::Off.as_str(), "OFF");
    }
}
