//! Inputs wrap around a dataset providing a simple read-only interface that evaluators build
//! their operations around.
//!
//! The only input currently is the daily close-price table. It is constructed once when the
//! process starts and never mutated afterwards, so it can be shared across requests without
//! synchronization.
pub mod prices;
