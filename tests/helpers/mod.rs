/// Test doubles standing in for the platform drivers during integration tests.
use canif::adapter::{BridgeDevice, BridgeHost, BuiltinController, DeviceSettings};
use canif::config::{
    BuiltinConfig, BusWiring, CanBitrate, GpioPin, HostId, InstanceConfig, OperatingMode,
    Oscillator,
};
use canif::error::HalError;
use canif::frame::Frame;
use embassy_time::Duration;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

//==================================================================================BRIDGE
#[derive(Clone, Debug, PartialEq, Eq)]
/// Platform call recorded by the mock bridge host, in call order.
pub enum Event {
    RegisterBus(u8),
    ReleaseBus(u8),
    Attach { host: u8, cs: u8 },
    Detach { host: u8, cs: u8 },
    Configure { cs: u8, mode: OperatingMode },
    Arm { cs: u8, line: usize },
    Disarm { cs: u8 },
}

#[derive(Default, Debug)]
/// Behaviour and observable state of one simulated bridge chip.
pub struct ChipState {
    /// Probe fails with `NotDetected`.
    pub absent: bool,
    /// Probe transaction itself fails with `Timeout`.
    pub probe_error: bool,
    /// `configure` is refused.
    pub reject_configure: bool,
    /// `arm_interrupt` is refused.
    pub reject_arm: bool,
    /// Transactions time out once the chip is up.
    pub timeout: bool,
    /// Transmit buffer already holds an unsent frame.
    pub tx_busy: bool,
    /// Set by `configure` when loopback mode is requested.
    pub loopback: bool,
    /// Frames waiting in the receive buffers.
    pub rx: VecDeque<Frame>,
    /// Frames accepted for transmission.
    pub sent: Vec<Frame>,
    /// Number of `read_pending` transactions issued.
    pub reads: usize,
}

#[derive(Default, Debug)]
/// Shared state of the simulated board.
pub struct Bench {
    pub events: Vec<Event>,
    pub chips: HashMap<(u8, u8), ChipState>,
    /// Hosts whose registration is refused.
    pub refused_hosts: Vec<u8>,
    pub live_buses: usize,
    pub live_devices: usize,
}

#[derive(Clone, Default)]
/// In-memory bridge host reproducing the `BridgeHost` behaviour.
pub struct MockBridgeHost {
    pub bench: Rc<RefCell<Bench>>,
}

impl MockBridgeHost {
    /// Adjust or inspect the simulated chip behind `(host, cs)`.
    pub fn chip<R>(&self, host: u8, cs: u8, f: impl FnOnce(&mut ChipState) -> R) -> R {
        let mut bench = self.bench.borrow_mut();
        f(bench.chips.entry((host, cs)).or_default())
    }

    pub fn refuse_host(&self, host: u8) {
        self.bench.borrow_mut().refused_hosts.push(host);
    }

    pub fn events(&self) -> Vec<Event> {
        self.bench.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.bench.borrow_mut().events.clear();
    }

    /// `(live host registrations, live device handles)`.
    pub fn live(&self) -> (usize, usize) {
        let bench = self.bench.borrow();
        (bench.live_buses, bench.live_devices)
    }
}

pub struct MockBus {
    host: u8,
}

pub struct MockDevice {
    host: u8,
    cs: u8,
    bench: Rc<RefCell<Bench>>,
}

impl MockDevice {
    fn with_chip<R>(&self, f: impl FnOnce(&mut ChipState) -> R) -> R {
        let mut bench = self.bench.borrow_mut();
        f(bench.chips.entry((self.host, self.cs)).or_default())
    }

    fn record(&self, event: Event) {
        self.bench.borrow_mut().events.push(event);
    }
}

impl BridgeHost for MockBridgeHost {
    type Bus = MockBus;
    type Device = MockDevice;

    fn register_bus(&mut self, host: HostId, _wiring: &BusWiring) -> Result<MockBus, HalError> {
        let mut bench = self.bench.borrow_mut();
        if bench.refused_hosts.contains(&host.0) {
            return Err(HalError::Registration);
        }
        bench.events.push(Event::RegisterBus(host.0));
        bench.live_buses += 1;
        Ok(MockBus { host: host.0 })
    }

    fn release_bus(&mut self, host: HostId, bus: MockBus) {
        assert_eq!(host.0, bus.host, "bus released under the wrong host");
        let mut bench = self.bench.borrow_mut();
        bench.events.push(Event::ReleaseBus(host.0));
        bench.live_buses -= 1;
    }

    fn attach_device(
        &mut self,
        bus: &mut MockBus,
        settings: &DeviceSettings,
    ) -> Result<MockDevice, HalError> {
        let mut bench = self.bench.borrow_mut();
        bench.events.push(Event::Attach {
            host: bus.host,
            cs: settings.cs.0,
        });
        bench.live_devices += 1;
        bench.chips.entry((bus.host, settings.cs.0)).or_default();
        Ok(MockDevice {
            host: bus.host,
            cs: settings.cs.0,
            bench: self.bench.clone(),
        })
    }

    fn detach_device(&mut self, bus: &mut MockBus, device: MockDevice) {
        assert_eq!(bus.host, device.host, "device detached from the wrong bus");
        let mut bench = self.bench.borrow_mut();
        bench.events.push(Event::Detach {
            host: device.host,
            cs: device.cs,
        });
        bench.live_devices -= 1;
    }
}

impl BridgeDevice for MockDevice {
    fn probe(&mut self) -> Result<(), HalError> {
        self.with_chip(|chip| {
            if chip.probe_error {
                Err(HalError::Timeout)
            } else if chip.absent {
                Err(HalError::NotDetected)
            } else {
                Ok(())
            }
        })
    }

    fn configure(
        &mut self,
        _bitrate: CanBitrate,
        _oscillator: Oscillator,
        mode: OperatingMode,
    ) -> Result<(), HalError> {
        if self.with_chip(|chip| chip.reject_configure) {
            return Err(HalError::Unsupported);
        }
        self.with_chip(|chip| chip.loopback = mode == OperatingMode::Loopback);
        self.record(Event::Configure { cs: self.cs, mode });
        Ok(())
    }

    fn arm_interrupt(&mut self, _pin: GpioPin, line: usize) -> Result<(), HalError> {
        if self.with_chip(|chip| chip.reject_arm) {
            return Err(HalError::Unsupported);
        }
        self.record(Event::Arm { cs: self.cs, line });
        Ok(())
    }

    fn disarm_interrupt(&mut self, _pin: GpioPin) {
        self.record(Event::Disarm { cs: self.cs });
    }

    fn transmit(&mut self, frame: &Frame) -> Result<(), HalError> {
        self.with_chip(|chip| {
            if chip.timeout {
                return Err(HalError::Timeout);
            }
            if chip.tx_busy {
                return Err(HalError::TxBufferFull);
            }
            if chip.loopback {
                chip.rx.push_back(*frame);
            }
            chip.sent.push(*frame);
            Ok(())
        })
    }

    fn read_pending(&mut self) -> Result<Option<Frame>, HalError> {
        self.with_chip(|chip| {
            chip.reads += 1;
            if chip.timeout {
                return Err(HalError::Timeout);
            }
            Ok(chip.rx.pop_front())
        })
    }
}

//==================================================================================CONTROLLER
#[derive(Default, Debug)]
/// Observable state of the simulated built-in controller.
pub struct ControllerState {
    pub installed: bool,
    pub running: bool,
    pub refuse_start: bool,
    pub tx_full: bool,
    pub loopback: bool,
    pub last_timeout: Option<Duration>,
    pub rx: VecDeque<Frame>,
    pub sent: Vec<Frame>,
}

#[derive(Clone, Default)]
/// In-memory built-in controller.
pub struct MockController {
    pub state: Rc<RefCell<ControllerState>>,
}

impl BuiltinController for MockController {
    fn install(&mut self, config: &BuiltinConfig) -> Result<(), HalError> {
        let mut state = self.state.borrow_mut();
        state.installed = true;
        state.loopback = config.mode == OperatingMode::Loopback;
        Ok(())
    }

    fn start(&mut self) -> Result<(), HalError> {
        let mut state = self.state.borrow_mut();
        if state.refuse_start {
            return Err(HalError::BusBusy);
        }
        state.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.state.borrow_mut().running = false;
    }

    fn uninstall(&mut self) {
        self.state.borrow_mut().installed = false;
    }

    fn transmit(&mut self, frame: &Frame, timeout: Duration) -> Result<(), HalError> {
        let mut state = self.state.borrow_mut();
        state.last_timeout = Some(timeout);
        if state.tx_full {
            return Err(HalError::TxBufferFull);
        }
        if state.loopback {
            state.rx.push_back(*frame);
        }
        state.sent.push(*frame);
        Ok(())
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, HalError> {
        Ok(self.state.borrow_mut().rx.pop_front())
    }
}

//==================================================================================CONFIG
/// Bridge chip on `host` selected by `cs`, polled (no interrupt line).
pub fn chip(host: u8, cs: u8) -> InstanceConfig {
    InstanceConfig::builder(HostId(host), GpioPin(cs))
        .bus_pins(GpioPin(36), GpioPin(37), GpioPin(38))
        .build()
}

/// Same as [`chip`] with the receive interrupt wired to `int`.
pub fn chip_with_interrupt(host: u8, cs: u8, int: u8) -> InstanceConfig {
    InstanceConfig::builder(HostId(host), GpioPin(cs))
        .bus_pins(GpioPin(36), GpioPin(37), GpioPin(38))
        .interrupt(GpioPin(int))
        .build()
}

/// Reference frame used by the round-trip checks.
pub fn reference_frame() -> Frame {
    Frame::new_standard(0x123, &[0xAA, 0xBB]).expect("reference frame is valid")
}
