//! Pipeline stages for tyre detection.
//!
//! Each stage is a plain function over fixed-size buffers; the detector owns the
//! buffers and the cross-frame state and calls the stages in dataflow order.

pub(crate) mod constraints;
pub(crate) mod filter;
pub(crate) mod preprocess;
pub(crate) mod profile;
pub(crate) mod region;
pub(crate) mod uniformity;
pub(crate) mod zones;
