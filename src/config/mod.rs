//! Declarative description of the transceivers the caller wants brought up.
//!
//! Configuration values are plain `Copy` data handed to `init` by value: an
//! adapter reads them once while bringing the hardware up and keeps only the
//! runtime handles derived from them.
use embassy_time::Duration;

use crate::dispatch::BackendKind;
use crate::error::ConfigError;

pub mod bundle;

pub use bundle::{BundleConfig, MAX_INSTANCES};

/// Default values used by the builders.
pub mod defaults {
    use super::{CanBitrate, Oscillator};
    use embassy_time::Duration;

    /// Default CAN bitrate.
    pub const BITRATE: CanBitrate = CanBitrate::Kbps1000;
    /// Default bridge-chip crystal.
    pub const OSCILLATOR: Oscillator = Oscillator::Mhz16;
    /// Default SPI clock for a bridge chip (Hz).
    pub const SPI_CLOCK_HZ: u32 = 10_000_000;
    /// Highest SPI clock accepted by MCP2515-class bridge chips (Hz).
    pub const MAX_SPI_CLOCK_HZ: u32 = 10_000_000;
    /// Default depth of the SPI transaction queue.
    pub const QUEUE_DEPTH: u32 = 64;
    /// Default TX/RX queue length of the built-in controller.
    pub const CONTROLLER_QUEUE_LEN: u32 = 20;
    /// Default bound on a built-in controller transmission.
    pub const TRANSMIT_TIMEOUT: Duration = Duration::from_millis(100);
}

//==================================================================================WIRING
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Identifier of a physical SPI host (bus controller) on the device.
pub struct HostId(pub u8);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// GPIO number.
pub struct GpioPin(pub u8);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Pins shared by every device on one SPI host.
pub struct BusWiring {
    pub sclk: GpioPin,
    pub miso: GpioPin,
    pub mosi: GpioPin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Pins owned by a single bridge chip.
pub struct DeviceWiring {
    /// Chip-select line.
    pub cs: GpioPin,
    /// Interrupt line, when interrupt-driven reception is wanted.
    pub int: Option<GpioPin>,
}

//==================================================================================BITRATE
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// CAN bus bitrate.
pub enum CanBitrate {
    Kbps5,
    Kbps10,
    Kbps20,
    Kbps31_25,
    Kbps33_3,
    Kbps40,
    Kbps50,
    Kbps80,
    Kbps83_3,
    Kbps95,
    Kbps100,
    Kbps125,
    Kbps200,
    Kbps250,
    Kbps500,
    #[default]
    Kbps1000,
}

impl CanBitrate {
    /// Nominal bitrate in bits per second.
    pub const fn bits_per_second(self) -> u32 {
        match self {
            CanBitrate::Kbps5 => 5_000,
            CanBitrate::Kbps10 => 10_000,
            CanBitrate::Kbps20 => 20_000,
            CanBitrate::Kbps31_25 => 31_250,
            CanBitrate::Kbps33_3 => 33_300,
            CanBitrate::Kbps40 => 40_000,
            CanBitrate::Kbps50 => 50_000,
            CanBitrate::Kbps80 => 80_000,
            CanBitrate::Kbps83_3 => 83_300,
            CanBitrate::Kbps95 => 95_000,
            CanBitrate::Kbps100 => 100_000,
            CanBitrate::Kbps125 => 125_000,
            CanBitrate::Kbps200 => 200_000,
            CanBitrate::Kbps250 => 250_000,
            CanBitrate::Kbps500 => 500_000,
            CanBitrate::Kbps1000 => 1_000_000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Crystal fitted to the bridge chip.
pub enum Oscillator {
    Mhz8,
    #[default]
    Mhz16,
    Mhz20,
}

impl Oscillator {
    /// Crystal frequency in Hz.
    pub const fn hz(self) -> u32 {
        match self {
            Oscillator::Mhz8 => 8_000_000,
            Oscillator::Mhz16 => 16_000_000,
            Oscillator::Mhz20 => 20_000_000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Operating mode requested from a transceiver.
pub enum OperatingMode {
    /// Regular bus participation.
    #[default]
    Normal,
    /// Transmitted frames are looped back internally and never reach the bus.
    Loopback,
    /// Receive only, no acknowledgement.
    ListenOnly,
}

//==================================================================================INSTANCE_CONFIG
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// One SPI bridge chip: where it is wired and how its CAN side is set up.
pub struct InstanceConfig {
    /// SPI host the chip hangs off.
    pub host: HostId,
    /// Host pins (shared by every chip on `host`).
    pub bus: BusWiring,
    /// Chip-select and interrupt pins of this chip.
    pub device: DeviceWiring,
    /// CAN bitrate.
    pub bitrate: CanBitrate,
    /// Crystal fitted to the chip.
    pub oscillator: Oscillator,
    /// SPI clock for transactions with this chip (Hz).
    pub spi_clock_hz: u32,
    /// Depth of the SPI transaction queue.
    pub queue_depth: u32,
    /// Operating mode applied at configuration time.
    pub mode: OperatingMode,
}

impl InstanceConfig {
    /// Creates a builder for the chip selected by `cs` on `host`.
    pub fn builder(host: HostId, cs: GpioPin) -> InstanceConfigBuilder {
        InstanceConfigBuilder::new(host, cs)
    }

    /// `(host, chip-select)` pair identifying the electrical resource used by this chip.
    #[inline]
    pub fn resource(&self) -> (HostId, GpioPin) {
        (self.host, self.device.cs)
    }

    /// Checks the per-instance fields; `index` is only used to label the error.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.spi_clock_hz == 0 || self.spi_clock_hz > defaults::MAX_SPI_CLOCK_HZ {
            return Err(ConfigError::InvalidSpiClock {
                index,
                hz: self.spi_clock_hz,
            });
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::InvalidQueueDepth { index });
        }
        Ok(())
    }
}

#[derive(Debug)]
/// Fluent builder for [`InstanceConfig`].
pub struct InstanceConfigBuilder {
    config: InstanceConfig,
}

impl InstanceConfigBuilder {
    /// Starts from the defaults in [`defaults`].
    pub fn new(host: HostId, cs: GpioPin) -> Self {
        Self {
            config: InstanceConfig {
                host,
                bus: BusWiring::default(),
                device: DeviceWiring { cs, int: None },
                bitrate: defaults::BITRATE,
                oscillator: defaults::OSCILLATOR,
                spi_clock_hz: defaults::SPI_CLOCK_HZ,
                queue_depth: defaults::QUEUE_DEPTH,
                mode: OperatingMode::Normal,
            },
        }
    }

    /// Sets the host pins (clock, data-in, data-out).
    pub fn bus_pins(mut self, sclk: GpioPin, miso: GpioPin, mosi: GpioPin) -> Self {
        self.config.bus = BusWiring { sclk, miso, mosi };
        self
    }

    /// Enables interrupt-driven reception on `pin`.
    pub fn interrupt(mut self, pin: GpioPin) -> Self {
        self.config.device.int = Some(pin);
        self
    }

    pub fn bitrate(mut self, bitrate: CanBitrate) -> Self {
        self.config.bitrate = bitrate;
        self
    }

    pub fn oscillator(mut self, oscillator: Oscillator) -> Self {
        self.config.oscillator = oscillator;
        self
    }

    pub fn spi_clock_hz(mut self, hz: u32) -> Self {
        self.config.spi_clock_hz = hz;
        self
    }

    pub fn queue_depth(mut self, depth: u32) -> Self {
        self.config.queue_depth = depth;
        self
    }

    pub fn mode(mut self, mode: OperatingMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn build(self) -> InstanceConfig {
        self.config
    }
}

//==================================================================================BUILTIN_CONFIG
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Built-in CAN controller (TWAI-class peripheral) settings.
pub struct BuiltinConfig {
    /// Transceiver TX pin.
    pub tx: GpioPin,
    /// Transceiver RX pin.
    pub rx: GpioPin,
    pub bitrate: CanBitrate,
    pub mode: OperatingMode,
    /// Frames the driver may queue for transmission.
    pub tx_queue_len: u32,
    /// Frames the driver may buffer on reception.
    pub rx_queue_len: u32,
    /// Bound on a single transmission.
    pub transmit_timeout: Duration,
}

impl BuiltinConfig {
    /// Creates a builder for a controller wired to `tx`/`rx`.
    pub fn builder(tx: GpioPin, rx: GpioPin) -> BuiltinConfigBuilder {
        BuiltinConfigBuilder::new(tx, rx)
    }

    /// Both driver queues must hold at least one frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tx_queue_len == 0 || self.rx_queue_len == 0 {
            return Err(ConfigError::InvalidControllerQueue {
                tx_len: self.tx_queue_len,
                rx_len: self.rx_queue_len,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
/// Fluent builder for [`BuiltinConfig`].
pub struct BuiltinConfigBuilder {
    config: BuiltinConfig,
}

impl BuiltinConfigBuilder {
    pub fn new(tx: GpioPin, rx: GpioPin) -> Self {
        Self {
            config: BuiltinConfig {
                tx,
                rx,
                bitrate: defaults::BITRATE,
                mode: OperatingMode::Normal,
                tx_queue_len: defaults::CONTROLLER_QUEUE_LEN,
                rx_queue_len: defaults::CONTROLLER_QUEUE_LEN,
                transmit_timeout: defaults::TRANSMIT_TIMEOUT,
            },
        }
    }

    pub fn bitrate(mut self, bitrate: CanBitrate) -> Self {
        self.config.bitrate = bitrate;
        self
    }

    pub fn mode(mut self, mode: OperatingMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Sets both driver queue lengths.
    pub fn queues(mut self, tx_len: u32, rx_len: u32) -> Self {
        self.config.tx_queue_len = tx_len;
        self.config.rx_queue_len = rx_len;
        self
    }

    pub fn transmit_timeout(mut self, timeout: Duration) -> Self {
        self.config.transmit_timeout = timeout;
        self
    }

    pub fn build(self) -> BuiltinConfig {
        self.config
    }
}

//==================================================================================CAN_CONFIG
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Configuration handed to the dispatcher; one variant per backend family.
pub enum CanConfig {
    Builtin(BuiltinConfig),
    SingleBridge(InstanceConfig),
    MultiBridge(BundleConfig),
}

impl CanConfig {
    /// Backend family this configuration targets.
    pub fn kind(&self) -> BackendKind {
        match self {
            CanConfig::Builtin(_) => BackendKind::Builtin,
            CanConfig::SingleBridge(_) => BackendKind::SingleBridge,
            CanConfig::MultiBridge(_) => BackendKind::MultiBridge,
        }
    }
}

//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
