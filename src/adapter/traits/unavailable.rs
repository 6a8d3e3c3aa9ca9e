//! Placeholder for the hardware a dispatcher is built without.
//!
//! A board with only bridge chips still has to name a controller type for
//! [`Dispatcher`](crate::dispatch::Dispatcher); [`Unavailable`] fills that slot.
//! It has no values, so none of its methods can ever run.
use embassy_time::Duration;

use crate::adapter::traits::bridge::{BridgeDevice, BridgeHost, DeviceSettings};
use crate::adapter::traits::controller::BuiltinController;
use crate::config::{BuiltinConfig, BusWiring, CanBitrate, GpioPin, HostId, OperatingMode, Oscillator};
use crate::error::HalError;
use crate::frame::Frame;

#[derive(Debug)]
/// Uninhabited stand-in for a missing controller or bridge host.
pub enum Unavailable {}

impl BuiltinController for Unavailable {
    fn install(&mut self, _config: &BuiltinConfig) -> Result<(), HalError> {
        match *self {}
    }

    fn start(&mut self) -> Result<(), HalError> {
        match *self {}
    }

    fn stop(&mut self) {
        match *self {}
    }

    fn uninstall(&mut self) {
        match *self {}
    }

    fn transmit(&mut self, _frame: &Frame, _timeout: Duration) -> Result<(), HalError> {
        match *self {}
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, HalError> {
        match *self {}
    }
}

impl BridgeHost for Unavailable {
    type Bus = Unavailable;
    type Device = Unavailable;

    fn register_bus(&mut self, _host: HostId, _wiring: &BusWiring) -> Result<Self::Bus, HalError> {
        match *self {}
    }

    fn release_bus(&mut self, _host: HostId, _bus: Self::Bus) {
        match *self {}
    }

    fn attach_device(
        &mut self,
        _bus: &mut Self::Bus,
        _settings: &DeviceSettings,
    ) -> Result<Self::Device, HalError> {
        match *self {}
    }

    fn detach_device(&mut self, _bus: &mut Self::Bus, _device: Self::Device) {
        match *self {}
    }
}

impl BridgeDevice for Unavailable {
    fn probe(&mut self) -> Result<(), HalError> {
        match *self {}
    }

    fn configure(
        &mut self,
        _bitrate: CanBitrate,
        _oscillator: Oscillator,
        _mode: OperatingMode,
    ) -> Result<(), HalError> {
        match *self {}
    }

    fn arm_interrupt(&mut self, _pin: GpioPin, _line: usize) -> Result<(), HalError> {
        match *self {}
    }

    fn disarm_interrupt(&mut self, _pin: GpioPin) {
        match *self {}
    }

    fn transmit(&mut self, _frame: &Frame) -> Result<(), HalError> {
        match *self {}
    }

    fn read_pending(&mut self) -> Result<Option<Frame>, HalError> {
        match *self {}
    }
}
