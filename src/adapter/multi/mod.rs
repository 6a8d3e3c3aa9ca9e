//! Adapter driving up to [`MAX_INSTANCES`] bridge chips addressed by index.
//!
//! Chips wired to the same SPI host share one host registration. The
//! registration is made by the first chip of the bundle on that host and
//! released when the last chip using it is torn down.
use crate::adapter::device;
use crate::adapter::traits::bridge::BridgeHost;
use crate::adapter::traits::can_adapter::CanAdapter;
use crate::adapter::{check_ready, AdapterState};
use crate::config::bundle::validate_instances;
use crate::config::{BundleConfig, GpioPin, HostId, InstanceConfig, MAX_INSTANCES};
use crate::error::{CanError, HalError, InitCause};
use crate::frame::Frame;
use crate::irq::RxNotifier;

/// Host registration shared by the chips wired to it.
struct HostEntry<B> {
    host: HostId,
    bus: B,
    /// Active instances referencing this registration.
    users: usize,
}

/// Runtime handle of one initialized chip.
struct Slot<D> {
    device: D,
    interrupt: Option<GpioPin>,
    /// Position of the host registration in `hosts`.
    host_entry: usize,
}

/// Multi-instance bridge adapter.
pub struct MultiBridgeAdapter<'a, H: BridgeHost> {
    host: H,
    notifier: Option<&'a RxNotifier>,
    state: AdapterState,
    count: usize,
    hosts: [Option<HostEntry<H::Bus>>; MAX_INSTANCES],
    slots: [Option<Slot<H::Device>>; MAX_INSTANCES],
}

impl<'a, H: BridgeHost> MultiBridgeAdapter<'a, H> {
    /// Wrap the platform's bridge host. Nothing is touched until `init`.
    pub fn new(host: H) -> Self {
        Self {
            host,
            notifier: None,
            state: AdapterState::Uninit,
            count: 0,
            hosts: core::array::from_fn(|_| None),
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Attach the notifier fed by the interrupt handlers of chips configured with an interrupt pin.
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

    /// Bring up every instance in order, or none of them.
    ///
    /// Fails without touching hardware when the list is empty, longer than
    /// [`MAX_INSTANCES`], or contains an invalid or duplicated instance. If a
    /// chip fails to come up, every chip brought up by this call is torn down
    /// in reverse order before the error is returned.
    pub fn init_instances(&mut self, instances: &[InstanceConfig]) -> Result<(), CanError> {
        if self.state != AdapterState::Uninit {
            return Err(CanError::AlreadyInitialized);
        }
        validate_instances(instances)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Bringing up {} bridge instance(s)", instances.len());

        self.state = AdapterState::Initializing;
        if let Some(notifier) = self.notifier {
            notifier.reset();
        }

        for (index, config) in instances.iter().enumerate() {
            if let Err(err) = self.bring_up_instance(index, config) {
                #[cfg(feature = "defmt")]
                defmt::warn!("Instance {} failed ({}), rolling back {} instance(s)", index, err, index);
                self.tear_down_all();
                if let Some(notifier) = self.notifier {
                    notifier.reset();
                }
                self.state = AdapterState::Uninit;
                return Err(err);
            }
            self.count = index + 1;
        }

        self.state = AdapterState::Ready;
        Ok(())
    }

    /// Tear every instance down in reverse index order.
    pub fn deinit(&mut self) -> Result<(), CanError> {
        if self.state != AdapterState::Ready {
            return Err(CanError::NotReady);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Tearing down {} bridge instance(s)", self.count);

        self.state = AdapterState::Deinitializing;
        self.tear_down_all();
        if let Some(notifier) = self.notifier {
            notifier.reset();
        }
        self.state = AdapterState::Uninit;
        Ok(())
    }

    /// Transmit `frame` on instance `index`.
    pub fn send(&mut self, index: usize, frame: &Frame) -> Result<(), CanError> {
        let slot = self.ready_slot(index)?;
        device::transmit(&mut slot.device, frame)
    }

    /// Read one pending frame from instance `index`, if any.
    pub fn receive(&mut self, index: usize, frame: &mut Frame) -> Result<bool, CanError> {
        let notifier = self.notifier;
        let slot = self.ready_slot(index)?;
        let gate = slot.interrupt.and(notifier);
        device::poll(&mut slot.device, gate, index, frame)
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Instances currently up (0 unless `Ready`).
    pub fn instance_count(&self) -> usize {
        self.count
    }

    /// Host registrations currently held.
    pub fn registered_hosts(&self) -> usize {
        self.hosts.iter().filter(|entry| entry.is_some()).count()
    }

    fn ready_slot(&mut self, index: usize) -> Result<&mut Slot<H::Device>, CanError> {
        check_ready(self.state, index, self.count)?;
        self.slots[index].as_mut().ok_or(CanError::NotReady)
    }

    fn bring_up_instance(&mut self, index: usize, config: &InstanceConfig) -> Result<(), CanError> {
        let entry_index = self.acquire_host(index, config)?;
        let Some(entry) = self.hosts[entry_index].as_mut() else {
            return Err(CanError::NotReady);
        };

        match device::bring_up(&mut self.host, &mut entry.bus, config, index, self.notifier) {
            Ok(device) => {
                self.slots[index] = Some(Slot {
                    device,
                    interrupt: config.device.int,
                    host_entry: entry_index,
                });
                Ok(())
            }
            Err(err) => {
                self.release_host(entry_index);
                Err(err)
            }
        }
    }

    /// Reuse the registration of `config.host` or register it in a free entry.
    fn acquire_host(&mut self, index: usize, config: &InstanceConfig) -> Result<usize, CanError> {
        let existing = self
            .hosts
            .iter()
            .position(|entry| entry.as_ref().is_some_and(|e| e.host == config.host));
        if let Some(position) = existing {
            if let Some(entry) = self.hosts[position].as_mut() {
                entry.users += 1;
            }
            return Ok(position);
        }

        let Some(free) = self.hosts.iter().position(Option::is_none) else {
            return Err(CanError::InitFailure {
                index,
                cause: InitCause::BusRegistration(HalError::Registration),
            });
        };
        let bus = self
            .host
            .register_bus(config.host, &config.bus)
            .map_err(|err| CanError::InitFailure {
                index,
                cause: InitCause::BusRegistration(err),
            })?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Registered SPI host {}", config.host.0);

        self.hosts[free] = Some(HostEntry {
            host: config.host,
            bus,
            users: 1,
        });
        Ok(free)
    }

    /// Drop one user of a host registration, releasing it with the last user.
    fn release_host(&mut self, entry_index: usize) {
        let last_user = match self.hosts[entry_index].as_mut() {
            Some(entry) => {
                entry.users = entry.users.saturating_sub(1);
                entry.users == 0
            }
            None => false,
        };
        if last_user {
            if let Some(entry) = self.hosts[entry_index].take() {
                #[cfg(feature = "defmt")]
                defmt::debug!("Releasing SPI host {}", entry.host.0);
                self.host.release_bus(entry.host, entry.bus);
            }
        }
    }

    /// Tear down every populated slot, highest index first.
    fn tear_down_all(&mut self) {
        for index in (0..MAX_INSTANCES).rev() {
            let Some(slot) = self.slots[index].take() else {
                continue;
            };
            if let Some(entry) = self.hosts[slot.host_entry].as_mut() {
                device::tear_down(&mut self.host, &mut entry.bus, slot.device, slot.interrupt);
            }

            #[cfg(feature = "defmt")]
            defmt::debug!("Instance {} down", index);

            self.release_host(slot.host_entry);
        }
        self.count = 0;
    }
}

impl<H: BridgeHost> CanAdapter for MultiBridgeAdapter<'_, H> {
    type Config = BundleConfig;

    fn init(&mut self, config: BundleConfig) -> Result<(), CanError> {
        config.validate()?;
        self.init_instances(config.as_slice())
    }

    fn deinit(&mut self) -> Result<(), CanError> {
        MultiBridgeAdapter::deinit(self)
    }

    fn send(&mut self, index: usize, frame: &Frame) -> Result<(), CanError> {
        MultiBridgeAdapter::send(self, index, frame)
    }

    fn receive(&mut self, index: usize, frame: &mut Frame) -> Result<bool, CanError> {
        MultiBridgeAdapter::receive(self, index, frame)
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    fn instance_count(&self) -> usize {
        self.count
    }
}
