//! Shared definitions for the Skein engines: wire-format constants, the
//! digest type, and the crate-wide error enum.

pub mod constants;
pub mod error;
pub mod primitives;
