//! Hardware seam for a CAN controller built into the microcontroller (TWAI class).
use embassy_time::Duration;

use crate::config::BuiltinConfig;
use crate::error::HalError;
use crate::frame::Frame;

/// Driver of the on-chip CAN controller.
pub trait BuiltinController {
    /// Install the driver: pins, timing, queues, acceptance filter.
    fn install(&mut self, config: &BuiltinConfig) -> Result<(), HalError>;

    /// Join the bus.
    fn start(&mut self) -> Result<(), HalError>;

    /// Leave the bus.
    fn stop(&mut self);

    /// Remove the driver and free its resources.
    fn uninstall(&mut self);

    /// Queue `frame`, waiting at most `timeout` for room in the TX queue.
    fn transmit(&mut self, frame: &Frame, timeout: Duration) -> Result<(), HalError>;

    /// Pop one received frame without waiting.
    fn try_receive(&mut self) -> Result<Option<Frame>, HalError>;
}
