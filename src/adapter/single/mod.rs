//! Adapter driving exactly one bridge chip on its own SPI host.
//!
//! Same lifecycle and failure semantics as the multi-instance adapter with the
//! instance count fixed at one: index 0 is the only valid index.
use crate::adapter::device;
use crate::adapter::traits::bridge::BridgeHost;
use crate::adapter::traits::can_adapter::CanAdapter;
use crate::adapter::{check_ready, AdapterState};
use crate::config::{GpioPin, HostId, InstanceConfig};
use crate::error::{CanError, InitCause};
use crate::frame::Frame;
use crate::irq::RxNotifier;

/// Handles owned while the chip is up.
struct Active<B, D> {
    host: HostId,
    bus: B,
    device: D,
    interrupt: Option<GpioPin>,
}

/// Single bridge-chip adapter.
pub struct SingleBridgeAdapter<'a, H: BridgeHost> {
    host: H,
    notifier: Option<&'a RxNotifier>,
    state: AdapterState,
    active: Option<Active<H::Bus, H::Device>>,
}

impl<'a, H: BridgeHost> SingleBridgeAdapter<'a, H> {
    /// Wrap the platform's bridge host. Nothing is touched until `init`.
    pub fn new(host: H) -> Self {
        Self {
            host,
            notifier: None,
            state: AdapterState::Uninit,
            active: None,
        }
    }

    /// Attach the notifier fed by the chip's interrupt handler (line 0).
    pub fn with_notifier(mut self, notifier: &'a RxNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub(crate) fn set_notifier(&mut self, notifier: &'a RxNotifier) {
        self.notifier = Some(notifier);
    }

    /// Platform host, e.g. for diagnostics.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the platform host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Register the host, then attach, probe, configure and arm the chip.
    /// Any failure undoes the completed steps in reverse order.
    pub fn init(&mut self, config: InstanceConfig) -> Result<(), CanError> {
        if self.state != AdapterState::Uninit {
            return Err(CanError::AlreadyInitialized);
        }
        config.validate(0)?;

        self.state = AdapterState::Initializing;
        if let Some(notifier) = self.notifier {
            notifier.reset();
        }

        let mut bus = match self.host.register_bus(config.host, &config.bus) {
            Ok(bus) => bus,
            Err(err) => {
                self.state = AdapterState::Uninit;
                return Err(CanError::InitFailure {
                    index: 0,
                    cause: InitCause::BusRegistration(err),
                });
            }
        };

        match device::bring_up(&mut self.host, &mut bus, &config, 0, self.notifier) {
            Ok(device) => {
                self.active = Some(Active {
                    host: config.host,
                    bus,
                    device,
                    interrupt: config.device.int,
                });
                self.state = AdapterState::Ready;

                #[cfg(feature = "defmt")]
                defmt::info!("Single bridge ready");
                Ok(())
            }
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Single bridge init failed: {}", err);
                self.host.release_bus(config.host, bus);
                self.state = AdapterState::Uninit;
                Err(err)
            }
        }
    }

    /// Disarm, detach, then release the host.
    pub fn deinit(&mut self) -> Result<(), CanError> {
        if self.state != AdapterState::Ready {
            return Err(CanError::NotReady);
        }
        self.state = AdapterState::Deinitializing;
        if let Some(mut active) = self.active.take() {
            device::tear_down(&mut self.host, &mut active.bus, active.device, active.interrupt);
            self.host.release_bus(active.host, active.bus);
        }
        if let Some(notifier) = self.notifier {
            notifier.reset();
        }
        self.state = AdapterState::Uninit;

        #[cfg(feature = "defmt")]
        defmt::info!("Single bridge down");
        Ok(())
    }

    /// Transmit `frame` (index omitted, implicitly 0).
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), CanError> {
        self.send_indexed(0, frame)
    }

    /// Read one pending frame (index omitted, implicitly 0).
    pub fn receive_frame(&mut self, frame: &mut Frame) -> Result<bool, CanError> {
        self.receive_indexed(0, frame)
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    fn send_indexed(&mut self, index: usize, frame: &Frame) -> Result<(), CanError> {
        let active = self.ready(index)?;
        device::transmit(&mut active.device, frame)
    }

    fn receive_indexed(&mut self, index: usize, frame: &mut Frame) -> Result<bool, CanError> {
        let notifier = self.notifier;
        let active = self.ready(index)?;
        let gate = active.interrupt.and(notifier);
        device::poll(&mut active.device, gate, index, frame)
    }

    fn ready(&mut self, index: usize) -> Result<&mut Active<H::Bus, H::Device>, CanError> {
        check_ready(self.state, index, 1)?;
        self.active.as_mut().ok_or(CanError::NotReady)
    }
}

impl<H: BridgeHost> CanAdapter for SingleBridgeAdapter<'_, H> {
    type Config = InstanceConfig;

    fn init(&mut self, config: InstanceConfig) -> Result<(), CanError> {
        SingleBridgeAdapter::init(self, config)
    }

    fn deinit(&mut self) -> Result<(), CanError> {
        SingleBridgeAdapter::deinit(self)
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
