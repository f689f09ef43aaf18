//! Enumeration engine.
//!
//! This module provides the pieces that walk very large, implicitly defined
//! integer domains without materializing them:
//!
//! - `range`: random permutation of a half-open `u128` range
//! - `domain`: the indexable-domain abstraction and per-domain iterators
//! - `mux`: fair combination of several per-domain iterators

pub mod domain;
pub mod mux;
pub mod range;

// Re-export commonly used types
pub use domain::{shuffled, shuffled_with, Domain, DomainIter, Order};
pub use mux::{fair_mux, FairMux};
pub use range::{range_sampler, RangeSampler, SampleError};
