//! Fuzz target: `decode_inbound`
//!
//! Arbitrary lines from the server must decode to a result, never panic,
//! and only ever name the two switch pins as overrides.
//!
//! cargo fuzz run fuzz_inbound_message

#![no_main]

use libfuzzer_sys::fuzz_target;
use sericulture::remote::message::{decode_inbound, Inbound};

fuzz_target!(|data: &[u8]| {
    if let Ok(Inbound::Override(cmd)) = decode_inbound(data) {
        let _ = cmd.actuator.name();
    }
});
