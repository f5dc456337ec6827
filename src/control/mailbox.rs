//! Fixed-size holding area for operator overrides between two cycles.
//!
//! Any number of overrides collapses into at most two commands per
//! actuator with the same effect as applying the whole sequence in order,
//! so a burst from the dashboard never loses its final command.
//!
//! | Sequence for one actuator         | Replayed as            |
//! |-----------------------------------|------------------------|
//! | ends with a force                 | that force             |
//! | a force, later a release          | force OFF, release     |
//! | releases only                     | release                |

use heapless::Vec;

use super::actuator::ActuatorId;
use super::arbiter::OverrideCommand;

/// Commands produced by one [`OverrideMailbox::take`].
pub type Replay = Vec<OverrideCommand, 4>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    last: Option<bool>,
    /// A force was seen; any auto window it interrupted is gone.
    forced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverrideMailbox {
    slots: [Option<Slot>; 2],
}

impl OverrideMailbox {
    pub const fn new() -> Self {
        Self { slots: [None; 2] }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Merge `cmd` after everything already held.
    pub fn push(&mut self, cmd: OverrideCommand) {
        let slot = &mut self.slots[cmd.actuator.index()];
        let forced = slot.is_some_and(|s| s.forced) || cmd.intent.is_some();
        *slot = Some(Slot {
            last: cmd.intent,
            forced,
        });
    }

    /// Empty the mailbox, returning commands to apply in order.
    pub fn take(&mut self) -> Replay {
        let mut out = Replay::new();
        for id in ActuatorId::ALL {
            let Some(slot) = self.slots[id.index()].take() else {
                continue;
            };
            // Two slots per actuator, two actuators: capacity is exact.
            match (slot.last, slot.forced) {
                (Some(on), _) => {
                    let _ = out.push(OverrideCommand {
                        actuator: id,
                        intent: Some(on),
                    });
                }
                (None, true) => {
                    let _ = out.push(OverrideCommand::force_off(id));
                    let _ = out.push(OverrideCommand::release(id));
                }
                (None, false) => {
                    let _ = out.push(OverrideCommand::release(id));
                }
            }
        }
        out
    }
}
