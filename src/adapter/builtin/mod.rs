//! Adapter for the CAN controller built into the microcontroller.
use embassy_time::Duration;

use crate::adapter::traits::can_adapter::CanAdapter;
use crate::adapter::traits::controller::BuiltinController;
use crate::adapter::{check_ready, AdapterState};
use crate::config::{defaults, BuiltinConfig};
use crate::error::{CanError, InitCause};
use crate::frame::Frame;

/// Built-in controller adapter. One instance, index 0.
pub struct BuiltinAdapter<C: BuiltinController> {
    controller: C,
    state: AdapterState,
    transmit_timeout: Duration,
}

impl<C: BuiltinController> BuiltinAdapter<C> {
    /// Wrap the platform's controller driver. Nothing is touched until `init`.
    pub fn new(controller: C) -> Self {
        Self {
            controller,
            state: AdapterState::Uninit,
            transmit_timeout: defaults::TRANSMIT_TIMEOUT,
        }
    }

    /// Platform controller driver, e.g. for diagnostics.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Mutable access to the controller driver.
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Install the driver then start the controller; uninstall again if start fails.
    pub fn init(&mut self, config: BuiltinConfig) -> Result<(), CanError> {
        if self.state != AdapterState::Uninit {
            return Err(CanError::AlreadyInitialized);
        }
        config.validate()?;

        self.state = AdapterState::Initializing;
        if let Err(err) = self.controller.install(&config) {
            self.state = AdapterState::Uninit;
            return Err(CanError::InitFailure {
                index: 0,
                cause: InitCause::ControllerInstall(err),
            });
        }
        if let Err(err) = self.controller.start() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Controller start failed: {}", err);
            self.controller.uninstall();
            self.state = AdapterState::Uninit;
            return Err(CanError::InitFailure {
                index: 0,
                cause: InitCause::ControllerStart(err),
            });
        }

        self.transmit_timeout = config.transmit_timeout;
        self.state = AdapterState::Ready;

        #[cfg(feature = "defmt")]
        defmt::info!("Built-in controller ready at {} bit/s", config.bitrate.bits_per_second());
        Ok(())
    }

    /// Stop the controller and uninstall its driver.
    pub fn deinit(&mut self) -> Result<(), CanError> {
        if self.state != AdapterState::Ready {
            return Err(CanError::NotReady);
        }
        self.state = AdapterState::Deinitializing;
        self.controller.stop();
        self.controller.uninstall();
        self.state = AdapterState::Uninit;
        Ok(())
    }

    /// Transmit `frame` (index omitted, implicitly 0).
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), CanError> {
        self.send_indexed(0, frame)
    }

    /// Pop one received frame (index omitted, implicitly 0).
    pub fn receive_frame(&mut self, frame: &mut Frame) -> Result<bool, CanError> {
        self.receive_indexed(0, frame)
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    fn send_indexed(&mut self, index: usize, frame: &Frame) -> Result<(), CanError> {
        check_ready(self.state, index, 1)?;
        if !frame.validate() {
            return Err(CanError::InvalidFrame);
        }
        self.controller.transmit(frame, self.transmit_timeout)?;
        Ok(())
    }

    fn receive_indexed(&mut self, index: usize, frame: &mut Frame) -> Result<bool, CanError> {
        check_ready(self.state, index, 1)?;
        match self.controller.try_receive()? {
            Some(received) => {
                *frame = received;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<C: BuiltinController> CanAdapter for BuiltinAdapter<C> {
    type Config = BuiltinConfig;

    fn init(&mut self, config: BuiltinConfig) -> Result<(), CanError> {
        BuiltinAdapter::init(self, config)
    }

    fn deinit(&mut self) -> Result<(), CanError> {
        BuiltinAdapter::deinit(self)
    }

    fn send(&mut self, index: usize, frame: &Frame) -> Result<(), CanError> {
        self.send_indexed(index, frame)
    }

    fn receive(&mut self, index: usize, frame: &mut Frame) -> Result<bool, CanError> {
        self.receive_indexed(index, frame)
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    fn instance_count(&self) -> usize {
        usize::from(self.state == AdapterState::Ready)
    }
}
