//! Error definitions shared across library modules.
//! Each type models one failure scenario: rejected configuration, failed
//! bring-up of an instance, misuse of the runtime contract, or a hardware
//! fault reported by a platform driver.
use crate::dispatch::BackendKind;
use thiserror_no_std::Error;

//==================================================================================HAL_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Faults reported by the platform drivers behind the hardware traits.
pub enum HalError {
    /// The bus transaction did not complete within its bounded timeout.
    #[error("Bus transaction timed out")]
    Timeout,
    /// The bus was held by another transaction.
    #[error("Bus busy")]
    BusBusy,
    /// Every transmit buffer of the chip still holds an unsent frame.
    #[error("Transmit buffer occupied")]
    TxBufferFull,
    /// Identity/signature read did not match the expected chip.
    #[error("Device not detected")]
    NotDetected,
    /// The host or device could not be registered with the platform.
    #[error("Registration rejected by platform")]
    Registration,
    /// Requested setting (bitrate/oscillator combination, mode…) is not supported.
    #[error("Unsupported setting")]
    Unsupported,
}

//==================================================================================CONFIG_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Configuration rejected before any hardware is touched.
pub enum ConfigError {
    /// No backend family was selected when the dispatcher was built.
    #[error("No CAN backend selected")]
    NoBackendSelected,
    /// The selected backend family has no implementation.
    #[error("Selected CAN backend is not implemented")]
    BackendUnimplemented,
    /// The configuration targets a different backend family than the selected one.
    #[error("Configuration for {provided:?} given to {selected:?} backend")]
    BackendMismatch {
        selected: BackendKind,
        provided: BackendKind,
    },
    /// Instance count outside `1..=MAX_INSTANCES`.
    #[error("Invalid instance count: {count}")]
    InvalidCount { count: usize },
    /// Attempt to add an instance to a full bundle.
    #[error("Bundle capacity exceeded")]
    CapacityExceeded,
    /// Two instances alias the same host and chip-select line.
    #[error("Instances {first} and {second} share host and chip-select")]
    DuplicateResource { first: usize, second: usize },
    /// SPI clock is zero or above what the bridge chip accepts.
    #[error("Instance {index}: invalid SPI clock {hz} Hz")]
    InvalidSpiClock { index: usize, hz: u32 },
    /// SPI transaction queue depth of a bridge instance is zero.
    #[error("Instance {index}: queue depth must be at least 1")]
    InvalidQueueDepth { index: usize },
    /// A built-in controller driver queue holds no frame.
    #[error("Controller queues must hold at least one frame (tx {tx_len}, rx {rx_len})")]
    InvalidControllerQueue { tx_len: u32, rx_len: u32 },
}

//==================================================================================INIT_CAUSE
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Step of an instance bring-up that failed.
pub enum InitCause {
    /// The SPI host could not be registered.
    #[error("Bus registration failed: {0}")]
    BusRegistration(HalError),
    /// The device could not be added to its bus.
    #[error("Device attach failed: {0}")]
    DeviceAttach(HalError),
    /// The chip did not answer the identity probe.
    #[error("Device not detected")]
    DeviceNotDetected,
    /// The probe transaction itself failed.
    #[error("Probe failed: {0}")]
    Probe(HalError),
    /// Bitrate/oscillator/mode configuration was refused.
    #[error("Configuration failed: {0}")]
    Configure(HalError),
    /// The interrupt line could not be armed.
    #[error("Interrupt setup failed: {0}")]
    Interrupt(HalError),
    /// The built-in controller driver could not be installed.
    #[error("Controller install failed: {0}")]
    ControllerInstall(HalError),
    /// The built-in controller refused to start.
    #[error("Controller start failed: {0}")]
    ControllerStart(HalError),
}

//==================================================================================CAN_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Every failure of the uniform `init/deinit/send/receive` contract.
pub enum CanError {
    /// Configuration rejected before touching hardware.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    /// Bring-up of one instance failed; the whole call was rolled back.
    #[error("Instance {index} init failed: {cause}")]
    InitFailure { index: usize, cause: InitCause },
    /// Index does not address an initialized instance.
    #[error("Index {index} out of range (count {count})")]
    OutOfRange { index: usize, count: usize },
    /// Call before `init` or after `deinit`.
    #[error("Adapter not ready")]
    NotReady,
    /// `init` called on an adapter that is already up.
    #[error("Adapter already initialized")]
    AlreadyInitialized,
    /// Frame violates the length or identifier range rules.
    #[error("Invalid frame")]
    InvalidFrame,
    /// Bus transaction timed out or the bus was busy.
    #[error("Bus transaction failed: {0}")]
    TransactionFailure(HalError),
    /// The chip's transmit slot still holds an unsent frame.
    #[error("Transmit buffer busy")]
    TransmitBufferBusy,
}

impl From<HalError> for CanError {
    fn from(err: HalError) -> Self {
        match err {
            HalError::TxBufferFull => CanError::TransmitBufferBusy,
            other => CanError::TransactionFailure(other),
        }
    }
}
