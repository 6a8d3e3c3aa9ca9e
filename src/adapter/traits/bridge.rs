//! Hardware seam for SPI bridge chips (MCP2515 class).
//!
//! [`BridgeHost`] registers SPI hosts and adds chips to them; [`BridgeDevice`]
//! is the register-level driver of one chip. Each method maps to one bounded
//! SPI transaction (or a short fixed sequence of them); the platform is
//! responsible for serializing transactions of chips sharing a host.
use crate::config::{BusWiring, CanBitrate, GpioPin, HostId, InstanceConfig, OperatingMode, Oscillator};
use crate::error::HalError;
use crate::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// SPI device parameters needed to add one chip to a registered host.
pub struct DeviceSettings {
    pub cs: GpioPin,
    pub spi_clock_hz: u32,
    pub queue_depth: u32,
}

impl From<&InstanceConfig> for DeviceSettings {
    fn from(config: &InstanceConfig) -> Self {
        Self {
            cs: config.device.cs,
            spi_clock_hz: config.spi_clock_hz,
            queue_depth: config.queue_depth,
        }
    }
}

/// Registration of SPI hosts and of the chips attached to them.
pub trait BridgeHost {
    /// Runtime registration of one SPI host.
    type Bus;
    /// Handle to one chip on a registered host.
    type Device: BridgeDevice;

    /// Initialize `host` with `wiring`. Called once per host per `init`.
    fn register_bus(&mut self, host: HostId, wiring: &BusWiring) -> Result<Self::Bus, HalError>;

    /// Free a host registration once no chip uses it anymore.
    fn release_bus(&mut self, host: HostId, bus: Self::Bus);

    /// Add a chip to a registered host.
    fn attach_device(
        &mut self,
        bus: &mut Self::Bus,
        settings: &DeviceSettings,
    ) -> Result<Self::Device, HalError>;

    /// Remove a chip from its host.
    fn detach_device(&mut self, bus: &mut Self::Bus, device: Self::Device);
}

/// Register-level driver of one bridge chip.
pub trait BridgeDevice {
    /// Read the chip identity. Returns [`HalError::NotDetected`] when no chip answers.
    fn probe(&mut self) -> Result<(), HalError>;

    /// Reset the chip and apply bitrate, oscillator and operating mode.
    fn configure(
        &mut self,
        bitrate: CanBitrate,
        oscillator: Oscillator,
        mode: OperatingMode,
    ) -> Result<(), HalError>;

    /// Enable the receive interrupt on `pin`.
    ///
    /// The platform's handler for `pin` must call
    /// [`RxNotifier::notify(line)`](crate::irq::RxNotifier::notify) and nothing else.
    fn arm_interrupt(&mut self, pin: GpioPin, line: usize) -> Result<(), HalError>;

    /// Disable the interrupt armed on `pin`.
    fn disarm_interrupt(&mut self, pin: GpioPin);

    /// Load `frame` into a free transmit buffer and request transmission.
    ///
    /// Returns [`HalError::TxBufferFull`] when the transmit slot still holds an unsent frame.
    fn transmit(&mut self, frame: &Frame) -> Result<(), HalError>;

    /// Read one pending frame and clear its pending flag. `Ok(None)` when nothing is pending.
    fn read_pending(&mut self) -> Result<Option<Frame>, HalError>;
}
