//! Output drivers, the stop button, hardware initialisation and task helpers.

pub mod hw_init;
pub mod output;
pub mod stop_button;
pub mod task_pin;
pub mod watchdog;
