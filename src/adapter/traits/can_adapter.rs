//! Uniform four-operation contract shared by every backend family.
use crate::adapter::AdapterState;
use crate::error::CanError;
use crate::frame::Frame;

/// Contract implemented by each adapter family and forwarded by the dispatcher.
///
/// Every method is synchronous and bounded by the underlying bus transaction
/// timeout. Call them from task context only, never from an interrupt handler.
pub trait CanAdapter {
    /// Configuration consumed by [`init`](Self::init).
    type Config;

    /// Validate `config` and bring every instance up, or none of them.
    fn init(&mut self, config: Self::Config) -> Result<(), CanError>;

    /// Tear every instance down. Fails with [`CanError::NotReady`] when nothing is initialized.
    fn deinit(&mut self) -> Result<(), CanError>;

    /// Queue `frame` for transmission on instance `index`. No retry is performed.
    fn send(&mut self, index: usize, frame: &Frame) -> Result<(), CanError>;

    /// Non-blocking read of one pending frame from instance `index`.
    ///
    /// Returns `Ok(false)` and leaves `frame` untouched when nothing is pending.
    fn receive(&mut self, index: usize, frame: &mut Frame) -> Result<bool, CanError>;

    /// Current lifecycle state.
    fn state(&self) -> AdapterState;

    /// Number of instances brought up by the last successful `init` (0 when not ready).
    fn instance_count(&self) -> usize;
}
