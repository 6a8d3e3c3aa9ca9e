//! Routing of the uniform contract to exactly one backend family.
//!
//! The family is chosen once, when the [`Dispatcher`] is built: from the
//! `backend-*` cargo features with [`Dispatcher::from_features`], or
//! explicitly with [`Dispatcher::new`]. It never changes afterwards. The
//! dispatcher owns no hardware handle itself; it only forwards to the adapter
//! of the selected family.
//!
//! Two flavours of every operation are offered: `try_*` methods return the
//! detailed [`CanError`], while `init`/`deinit`/`send`/`receive` collapse it
//! to a `bool`, log it, and keep it in [`Dispatcher::last_error`].
use crate::adapter::traits::bridge::BridgeHost;
use crate::adapter::traits::can_adapter::CanAdapter;
use crate::adapter::traits::controller::BuiltinController;
use crate::adapter::{AdapterState, BuiltinAdapter, MultiBridgeAdapter, SingleBridgeAdapter};
use crate::config::CanConfig;
use crate::error::{CanError, ConfigError};
use crate::frame::Frame;
use crate::irq::RxNotifier;

//==================================================================================BACKEND_KIND
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Backend families known to the dispatcher.
pub enum BackendKind {
    /// Controller built into the microcontroller.
    Builtin,
    /// One external bridge chip.
    SingleBridge,
    /// Up to eight external bridge chips, possibly sharing SPI hosts.
    MultiBridge,
    /// Reserved family without an implementation; `init` always fails.
    Unimplemented,
}

impl BackendKind {
    /// Family selected through the `backend-*` cargo features.
    ///
    /// `None` unless exactly one of them is enabled.
    pub const fn from_features() -> Option<Self> {
        let enabled = cfg!(feature = "backend-builtin") as u8
            + cfg!(feature = "backend-single-bridge") as u8
            + cfg!(feature = "backend-multi-bridge") as u8
            + cfg!(feature = "backend-unimplemented") as u8;
        if enabled != 1 {
            None
        } else if cfg!(feature = "backend-builtin") {
            Some(BackendKind::Builtin)
        } else if cfg!(feature = "backend-single-bridge") {
            Some(BackendKind::SingleBridge)
        } else if cfg!(feature = "backend-multi-bridge") {
            Some(BackendKind::MultiBridge)
        } else {
            Some(BackendKind::Unimplemented)
        }
    }
}

//==================================================================================BACKEND
/// Closed set of adapter families, one of which a dispatcher routes to.
pub enum Backend<'a, C: BuiltinController, H: BridgeHost> {
    Builtin(BuiltinAdapter<C>),
    SingleBridge(SingleBridgeAdapter<'a, H>),
    MultiBridge(MultiBridgeAdapter<'a, H>),
    Unimplemented,
}

impl<C: BuiltinController, H: BridgeHost> Backend<'_, C, H> {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Builtin(_) => BackendKind::Builtin,
            Backend::SingleBridge(_) => BackendKind::SingleBridge,
            Backend::MultiBridge(_) => BackendKind::MultiBridge,
            Backend::Unimplemented => BackendKind::Unimplemented,
        }
    }
}

//==================================================================================DISPATCHER
/// Forwards `init/deinit/send/receive` to the adapter selected at construction.
pub struct Dispatcher<'a, C: BuiltinController, H: BridgeHost> {
    backend: Option<Backend<'a, C, H>>,
    last_error: Option<CanError>,
}

impl<'a, C: BuiltinController, H: BridgeHost> Dispatcher<'a, C, H> {
    /// Dispatcher routing to `backend`.
    pub fn new(backend: Backend<'a, C, H>) -> Self {
        Self {
            backend: Some(backend),
            last_error: None,
        }
    }

    /// Dispatcher without a backend: every operation fails.
    pub fn unconfigured() -> Self {
        Self {
            backend: None,
            last_error: None,
        }
    }

    /// Dispatcher for the family chosen by the `backend-*` cargo features.
    ///
    /// The builtin family consumes `controller`, the bridge families consume
    /// `host`. When no family is selected, or the selected family's hardware
    /// was not supplied, the dispatcher is left unconfigured.
    pub fn from_features(controller: Option<C>, host: Option<H>) -> Self {
        let backend = match (BackendKind::from_features(), controller, host) {
            (Some(BackendKind::Builtin), Some(controller), _) => {
                Some(Backend::Builtin(BuiltinAdapter::new(controller)))
            }
            (Some(BackendKind::SingleBridge), _, Some(host)) => {
                Some(Backend::SingleBridge(SingleBridgeAdapter::new(host)))
            }
            (Some(BackendKind::MultiBridge), _, Some(host)) => {
                Some(Backend::MultiBridge(MultiBridgeAdapter::new(host)))
            }
            (Some(BackendKind::Unimplemented), _, _) => Some(Backend::Unimplemented),
            _ => None,
        };

        if backend.is_none() {
            #[cfg(feature = "defmt")]
            defmt::warn!("No usable CAN backend selected");
        }

        Self {
            backend,
            last_error: None,
        }
    }

    /// Route interrupt-driven reception of bridge chips through `notifier`.
    pub fn with_notifier(mut self, notifier: &'a RxNotifier) -> Self {
        match self.backend.as_mut() {
            Some(Backend::SingleBridge(adapter)) => adapter.set_notifier(notifier),
            Some(Backend::MultiBridge(adapter)) => adapter.set_notifier(notifier),
            _ => {}
        }
        self
    }

    /// Selected family, if any.
    pub fn kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(Backend::kind)
    }

    /// Lifecycle state of the selected adapter (`Uninit` when none).
    pub fn state(&self) -> AdapterState {
        match self.backend.as_ref() {
            Some(Backend::Builtin(adapter)) => adapter.state(),
            Some(Backend::SingleBridge(adapter)) => adapter.state(),
            Some(Backend::MultiBridge(adapter)) => adapter.state(),
            Some(Backend::Unimplemented) | None => AdapterState::Uninit,
        }
    }

    /// Instances currently up.
    pub fn instance_count(&self) -> usize {
        match self.backend.as_ref() {
            Some(Backend::Builtin(adapter)) => CanAdapter::instance_count(adapter),
            Some(Backend::SingleBridge(adapter)) => CanAdapter::instance_count(adapter),
            Some(Backend::MultiBridge(adapter)) => adapter.instance_count(),
            Some(Backend::Unimplemented) | None => 0,
        }
    }

    /// Selected backend, e.g. to reach the platform host for diagnostics.
    pub fn backend(&self) -> Option<&Backend<'a, C, H>> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut Backend<'a, C, H>> {
        self.backend.as_mut()
    }

    /// Cause of the most recent failure reported through the boolean API.
    pub fn last_error(&self) -> Option<CanError> {
        self.last_error
    }

    //==============================================================================RESULT_API
    /// Forward `config` to the selected adapter.
    ///
    /// Fails without touching any adapter when no family is selected, when the
    /// placeholder family is selected, or when `config` targets another family.
    pub fn try_init(&mut self, config: CanConfig) -> Result<(), CanError> {
        let Some(backend) = self.backend.as_mut() else {
            return Err(ConfigError::NoBackendSelected.into());
        };
        match (backend, config) {
            (Backend::Builtin(adapter), CanConfig::Builtin(config)) => adapter.init(config),
            (Backend::SingleBridge(adapter), CanConfig::SingleBridge(config)) => {
                adapter.init(config)
            }
            (Backend::MultiBridge(adapter), CanConfig::MultiBridge(config)) => {
                CanAdapter::init(adapter, config)
            }
            (Backend::Unimplemented, _) => Err(ConfigError::BackendUnimplemented.into()),
            (backend, config) => Err(ConfigError::BackendMismatch {
                selected: backend.kind(),
                provided: config.kind(),
            }
            .into()),
        }
    }

    pub fn try_deinit(&mut self) -> Result<(), CanError> {
        match self.backend.as_mut() {
            Some(Backend::Builtin(adapter)) => adapter.deinit(),
            Some(Backend::SingleBridge(adapter)) => adapter.deinit(),
            Some(Backend::MultiBridge(adapter)) => adapter.deinit(),
            Some(Backend::Unimplemented) => Err(CanError::NotReady),
            None => Err(ConfigError::NoBackendSelected.into()),
        }
    }

    pub fn try_send(&mut self, index: usize, frame: &Frame) -> Result<(), CanError> {
        match self.backend.as_mut() {
            Some(Backend::Builtin(adapter)) => CanAdapter::send(adapter, index, frame),
            Some(Backend::SingleBridge(adapter)) => CanAdapter::send(adapter, index, frame),
            Some(Backend::MultiBridge(adapter)) => adapter.send(index, frame),
            Some(Backend::Unimplemented) => Err(CanError::NotReady),
            None => Err(ConfigError::NoBackendSelected.into()),
        }
    }

    pub fn try_receive(&mut self, index: usize, frame: &mut Frame) -> Result<bool, CanError> {
        match self.backend.as_mut() {
            Some(Backend::Builtin(adapter)) => CanAdapter::receive(adapter, index, frame),
            Some(Backend::SingleBridge(adapter)) => CanAdapter::receive(adapter, index, frame),
            Some(Backend::MultiBridge(adapter)) => adapter.receive(index, frame),
            Some(Backend::Unimplemented) => Err(CanError::NotReady),
            None => Err(ConfigError::NoBackendSelected.into()),
        }
    }

    //==============================================================================BOOL_API
    /// Bring the selected backend up. `false` on any failure.
    pub fn init(&mut self, config: CanConfig) -> bool {
        let result = self.try_init(config);
        self.record(result).is_some()
    }

    /// Tear the selected backend down. `false` when nothing was up.
    pub fn deinit(&mut self) -> bool {
        let result = self.try_deinit();
        self.record(result).is_some()
    }

    /// Transmit `frame` on instance `index` (0 for single-instance backends).
    pub fn send(&mut self, index: usize, frame: &Frame) -> bool {
        let result = self.try_send(index, frame);
        self.record(result).is_some()
    }

    /// Read one pending frame from instance `index` into `frame`.
    ///
    /// `false` both when nothing is pending (`frame` untouched) and on failure;
    /// only the latter updates [`last_error`](Self::last_error).
    pub fn receive(&mut self, index: usize, frame: &mut Frame) -> bool {
        let result = self.try_receive(index, frame);
        self.record(result).unwrap_or(false)
    }

    fn record<T>(&mut self, result: Result<T, CanError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("CAN dispatch failed: {}", err);
                self.last_error = Some(err);
                None
            }
        }
    }
}
