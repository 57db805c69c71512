//! Translation tables for Linux input events.
//!
//! Broken firmware and inconsistent kernel keymaps report the wrong codes for some keys.
//! A [`Mapping`] holds one-to-one `from -> to` rules per event type and rewrites event
//! codes accordingly. Rules usually come from udev hwdb properties named
//! `INMAP_MAP_<TYPE>_<CODE>=<CODE>` and are looked up by device modalias through a
//! [`Context`].
#![deny(unused_must_use)]
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

pub mod context;
pub mod err;
pub mod event;
pub mod hwdb;
pub mod mapping;
pub mod mapping_table;
pub mod rule;
pub mod symbols;

pub use context::{Context, LogFn, MAP_PROPERTY_PREFIX};
pub use err::{Error, HwdbError, Result, RuleError};
pub use event::InputEvent;
pub use hwdb::{Hwdb, Property, PropertyDatabase};
pub use mapping::{Mapping, map_event, translate};
pub use mapping_table::{Entry, Insertion, MappingTable};
pub use rule::MappingRule;
pub use symbols::{EvdevSymbols, NoSymbols, SymbolResolver};

#[cfg(test)]
use std::sync::Once;

#[cfg(test)]
static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .init();
    });
}
