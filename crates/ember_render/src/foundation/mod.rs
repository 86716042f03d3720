//! Foundation utilities
//!
//! Low-level building blocks shared by every other module: math types and
//! small helpers with no dependencies on the rendering layers above.

pub mod math;
