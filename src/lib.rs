//! # spi-duplex
//!
//! A portable, no_std Rust implementation of a two-node, interrupt-driven
//! full-duplex serial link, in the style of a microcontroller SPI peripheral.
//!
//! One firmware image serves both ends of the bus; a role pin read once at
//! boot decides which end a board plays:
//! - the **master** samples an analog input, counts up once per sample, and
//!   sends each sample to the slave, showing what the slave answered
//! - the **slave** shows every byte it receives, counts down once per
//!   exchange, and answers each exchange with its counter
//!
//! The bus is bit-banged over `embedded-hal` digital pins:
//! - `embedded-hal` traits for digital I/O and timing
//! - a clocked shift engine per role, MSB first, select active low
//! - a role-selected handler table for the peripheral interrupt
//! - interrupt-safe node access with `critical-section`
//! - optional tick sources using either timer interrupts or blocking delay
//!
//! ## Crate features
//! | Feature         | Description |
//! |-----------------|-------------|
//! | `std`           | Disables `#![no_std]` |
//! | `delay-loop`    | Uses `embedded_hal::delay::DelayNs` to drive a node |
//! | `isr` (default) | Uses `critical_section::with` to share a node with interrupt handlers |
//! | `defmt`         | Uses `defmt` logging |
//! | `log`           | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spi_duplex::config::{EngineConfig, SamplerConfig};
//! use spi_duplex::engine::{MasterEngine, SlaveEngine};
//! use spi_duplex::node::{boot, MasterNode, Node, SlaveNode};
//! use spi_duplex::sink::PinBank;
//!
//! let mut node = boot(
//!     &mut role_pin,
//!     || {
//!         let engine = MasterEngine::new(sck, mosi, miso, ss, EngineConfig::master())?;
//!         MasterNode::new(engine, adc, SamplerConfig::default(), PinBank::new(leds), counter)
//!     },
//!     || {
//!         let engine = SlaveEngine::new(sck, miso, mosi, ss, EngineConfig::slave(), 0xff)?;
//!         SlaveNode::new(engine, PinBank::new(leds), counter)
//!     },
//! )?;
//! loop {
//!     node.tick()?; // at the peripheral clock rate
//!     if node.has_pending() {
//!         node.service()?;
//!     }
//!     node.poll()?;
//! }
//! ```
//!
//! Or, use `run_link_loop()` with a `DelayNs` implementation:
//!
//! ```rust,ignore
//! spi_duplex::runtime::run_link_loop(&mut node, &mut delay, 1)?;
//! ```
//!
//! ## Integration Notes
//!
//! - Both engines are advanced by `tick()`; the master toggles its clock every
//!   `ClockDivider::half_period()` ticks, so the slave must be ticked at least
//!   as often as the master
//! - Only one node instance should be active at a time in interrupt-driven mode
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

#[cfg(feature = "isr")]
pub use critical_section;

pub use heapless;

pub mod config;
pub mod consts;
pub mod counter;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod node;
pub mod role;
pub mod runtime;
pub mod sampler;
pub mod sink;
pub mod stats;
pub mod tick;

#[cfg(test)]
#[allow(dead_code)]
mod testing;
