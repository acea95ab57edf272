//! Merkle hash trees and Shamir secret sharing over pluggable primitives.

pub mod config;
pub mod gf256;
pub mod merkle;
pub mod primitives;
pub mod random;
pub mod scratch;
pub mod shamir;
