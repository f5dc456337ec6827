//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                 |
//! |------------|--------------------|-----------------------------|
//! | `hardware` | SensorPort         | DHT11 on GPIO (bit-banged)  |
//! |            | ActuatorPort       | Relay / LED GPIO outputs    |
//! | `log_sink` | EventSink          | Serial log output           |
//! | `nvs`      | ConfigPort         | NVS / in-memory store       |
//! | `tcp_link` | Link               | Dashboard server over TCP   |
//! | `time`     | ClockPort          | ESP32 system timer          |
//! | `wifi`     | ConnectivityPort   | ESP-IDF WiFi STA            |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod tcp_link;
pub mod time;
pub mod wifi;
