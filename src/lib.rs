//! `canif` library: one send/receive contract over the different ways a
//! constrained device can reach a CAN bus. The crate exposes the frame and
//! configuration model, the hardware seams (built-in controller, SPI bridge
//! chips), the adapters built on them, and the dispatcher that routes the
//! uniform contract to exactly one adapter family.
#![no_std]
//==================================================================================
/// Adapters for each backend family plus the traits describing the hardware they drive.
pub mod adapter;
/// Declarative configuration supplied by the caller (instances, bundles, built-in controller).
pub mod config;
/// Backend selection and the boolean send/receive contract.
pub mod dispatch;
/// Configuration, bring-up and runtime errors.
pub mod error;
/// CAN frame value type and its validation rules.
pub mod frame;
/// Interrupt-to-task "data pending" signalling.
pub mod irq;
//==================================================================================
