//! Cross-crate integration scenarios.

pub mod fixtures;

mod adversarial;
mod atomic_swap_flow;
mod relay_flow;
