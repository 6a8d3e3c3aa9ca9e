//! Adapters for each backend family.
//!
//! All three share the same lifecycle,
//! `Uninit → Initializing → Ready → Deinitializing → Uninit`, and the same
//! failure semantics: bring-up is all-or-nothing, and runtime handles are
//! only reachable while the adapter is `Ready`.
pub mod builtin;
pub mod multi;
pub mod single;
pub mod traits;

mod device;

pub use builtin::BuiltinAdapter;
pub use multi::MultiBridgeAdapter;
pub use single::SingleBridgeAdapter;
pub use traits::{
    bridge::{BridgeDevice, BridgeHost, DeviceSettings},
    can_adapter::CanAdapter,
    controller::BuiltinController,
    unavailable::Unavailable,
};

use crate::error::CanError;

//==================================================================================ADAPTER_STATE
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Lifecycle of an adapter.
pub enum AdapterState {
    /// No runtime handle exists.
    #[default]
    Uninit,
    /// `init` is bringing instances up.
    Initializing,
    /// Every instance is up; `send`/`receive` are accepted.
    Ready,
    /// `deinit` is tearing instances down.
    Deinitializing,
}

/// Shared precondition of `send`/`receive`: adapter ready and `index < count`.
pub(crate) fn check_ready(state: AdapterState, index: usize, count: usize) -> Result<(), CanError> {
    if state != AdapterState::Ready {
        return Err(CanError::NotReady);
    }
    if index >= count {
        return Err(CanError::OutOfRange { index, count });
    }
    Ok(())
}
