//! GPIO assignments for the enclosure controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.
//!
//! Both relay channels and the indicator LED are wired active-low: driving
//! the pin LOW energises the load.

// ---------------------------------------------------------------------------
// Relay module (2-channel, opto-isolated, active-low inputs)
// ---------------------------------------------------------------------------

/// Exhaust fan relay, IN1.
pub const FAN_RELAY_GPIO: i32 = 6;
/// Misting pump relay, IN2.
pub const PUMP_RELAY_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// "Below max temperature" LED, sinks current through the pin.
pub const INDICATOR_LED_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT11 single-wire data line (open-drain, 10 kΩ external pull-up).
pub const DHT11_DATA_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Operator input (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary stop button; a long press shuts the controller down.
pub const STOP_BUTTON_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Output polarity
// ---------------------------------------------------------------------------

/// Pin level that energises a relay or lights the indicator.
pub const OUTPUT_ACTIVE_LEVEL: u32 = 0;
/// Pin level that de-energises a relay or darkens the indicator.
pub const OUTPUT_INACTIVE_LEVEL: u32 = 1;

/// Every output the firmware drives, in init order.
pub const OUTPUT_PINS: [i32; 3] = [FAN_RELAY_GPIO, PUMP_RELAY_GPIO, INDICATOR_LED_GPIO];

/// Pin level for a logical on/off on an active-low output.
pub const fn output_level(on: bool) -> u32 {
    if on {
        OUTPUT_ACTIVE_LEVEL
    } else {
        OUTPUT_INACTIVE_LEVEL
    }
}
