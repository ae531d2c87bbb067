//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tofflow-core:
//!
//! - MAX3510x time-to-digital converter over SPI

#![no_std]
#![deny(unsafe_code)]

pub mod max3510x;

pub use max3510x::Max3510x;
