//! Abstraction traits used by the adapters: the uniform adapter contract and
//! the hardware seams implemented by a board support crate.
pub mod bridge;
pub mod can_adapter;
pub mod controller;
pub mod unavailable;
