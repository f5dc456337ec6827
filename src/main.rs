//! Sericulture controller: firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   MonotonicClock  │
//! │  (Sensor+Actuator) (EventSink)    (Config)     (ClockPort)     │
//! │  ChannelPublisher  TcpLink<WifiAdapter>                        │
//! │  (RemotePort)      (Link, on the remote-io thread)             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Arbiter · indicator · status publishing               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use sericulture::adapters::hardware::{install_panic_hook, HardwareAdapter};
use sericulture::adapters::log_sink::LogEventSink;
use sericulture::adapters::nvs::{load_or_default, NvsAdapter};
use sericulture::adapters::tcp_link::TcpLink;
use sericulture::adapters::time::MonotonicClock;
use sericulture::adapters::wifi::WifiAdapter;
use sericulture::app::runner;
use sericulture::app::service::AppService;
use sericulture::config::SystemConfig;
use sericulture::drivers::stop_button::StopButton;
use sericulture::drivers::{hw_init, watchdog::Watchdog};
use sericulture::error::Error;
use sericulture::pins;
use sericulture::remote::channels::{CommandInbox, OUTBOUND_CHANNEL};
use sericulture::remote::io_task;
use sericulture::remote::publisher::ChannelPublisher;

/// Granularity of the inter-cycle sleep and of stop-button polling.
const PAUSE_SLICE: Duration = Duration::from_millis(100);

/// How long to wait for "System Offline" to leave the outbound queue.
const OFFLINE_FLUSH: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Sericulture v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // Relays must be released whatever happens next.
    install_panic_hook();
    if let Err(e) = hw_init::init_peripherals().map_err(Error::from) {
        // No safe output state can be guaranteed; halt and let the
        // watchdog reset us.
        log::error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 2. Config ─────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    let config = match NvsAdapter::new(nvs_partition.clone()) {
        Ok(mut nvs) => load_or_default(&mut nvs),
        Err(e) => {
            warn!("NVS unavailable ({}), running with defaults", Error::from(e));
            SystemConfig::default()
        }
    };

    // ── 3. Dashboard link (WiFi + TCP on the remote-io thread) ─
    let wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?,
        sysloop,
    )?;
    let network = WifiAdapter::new(wifi, config.wifi.clone());
    let link = TcpLink::new(config.remote.host.clone(), config.remote.port, network);
    // Observe link events from before the first session can open.
    let mut inbox = CommandInbox::new();
    let _io = io_task::spawn(link, config.remote.clone());

    // ── 4. Control loop ───────────────────────────────────────
    let mut app = AppService::new(&config);
    let mut hw = HardwareAdapter::new();
    let clock = MonotonicClock::new();
    let mut remote = ChannelPublisher::new();
    let mut sink = LogEventSink::new();
    let watchdog = Watchdog::new(Watchdog::timeout_for(config.cycle_interval()));
    let mut stop_button = StopButton::new(pins::STOP_BUTTON_GPIO);
    let stop = runner::shutdown_flag();

    app.start(&mut sink);
    info!("System ready. Entering control loop.");

    runner::run_until_stopped(
        &mut app,
        &mut hw,
        &clock,
        &mut remote,
        &mut sink,
        || inbox.next_command(),
        |delay| {
            watchdog.feed();
            let until = Instant::now() + delay;
            while !stop.load(Ordering::Acquire) {
                if stop_button.poll(hw_init::micros() / 1_000) {
                    runner::request_shutdown();
                    break;
                }
                let now = Instant::now();
                if now >= until {
                    break;
                }
                std::thread::sleep(PAUSE_SLICE.min(until - now));
            }
        },
        stop,
    );

    // ── 5. Let the offline notice drain ───────────────────────
    let deadline = Instant::now() + OFFLINE_FLUSH;
    while !OUTBOUND_CHANNEL.is_empty() && Instant::now() < deadline {
        watchdog.feed();
        std::thread::sleep(Duration::from_millis(20));
    }
    drop(hw);
    info!("Sericulture control system stopped");
    Ok(())
}
