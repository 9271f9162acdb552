//! CMSIS-SVD resolver and device-model finalizer.
//!
//! Ingests a System View Description document and produces a fully
//! resolved, validated device model: `derivedFrom` inheritance is applied
//! (forward, backward, and cross-scope references included), dim templates
//! expand into concrete elements, register properties propagate through
//! the hierarchy, and the finalizer sorts children, adjusts sizes
//! bottom-up, and checks the address map and field layout.
//!
//! # Usage
//!
//! ```no_run
//! # fn main() -> eyre::Result<()> {
//! let (device, diagnostics) = svd_resolve::process_file("STM32F103.svd")?;
//! for warning in diagnostics.warnings() {
//!     eprintln!("{}: {}", warning.path, warning.detail);
//! }
//! let _rcc = device.periph("RCC").unwrap();
//! # Ok(())
//! # }
//! ```
//!
//! Fatal conditions (inheritance cycles, duplicate names, field overlaps
//! within one access domain, ...) surface as typed [`Error`]s; everything
//! recoverable lands in the caller-supplied [`Diagnostics`] sink.

#![deny(elided_lifetimes_in_paths)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

mod device;
mod diag;
mod dim;
mod error;
mod finalize;
mod graph;
mod ir;
mod process;
mod resolve;
pub mod svd;
pub mod types;
mod writer;

pub use self::device::{
    AddressBlock, Cluster, Cpu, Device, EnumeratedValue, EnumeratedValueContainer, Field,
    Interrupt, Peripheral, Register, RegisterCluster, SauRegion, SauRegionsConfig,
    WriteConstraint,
};
pub use self::diag::{Diagnostics, Warning, WarningKind};
pub use self::error::Error;
pub use self::writer::write_device;

use eyre::Result;
use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::Path;

/// Parses the SVD document at `path` into the sparse record tree.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<svd::Device> {
    let mut input = BufReader::new(File::open(path).map_err(Error::Io)?);
    let mut xml = String::new();
    input.read_to_string(&mut xml).map_err(Error::Io)?;
    parse_str(&xml)
}

/// Parses an SVD document from a string into the sparse record tree.
pub fn parse_str(xml: &str) -> Result<svd::Device> {
    Ok(quick_xml::de::from_str(xml).map_err(Error::from_de)?)
}

/// Resolves and finalizes a parsed device.
///
/// Warnings go to `diag`; fatal conditions abort with a typed [`Error`].
pub fn process(parsed: svd::Device, diag: &mut Diagnostics) -> Result<Device, Error> {
    let mut device = resolve::resolve(parsed, diag)?;
    process::inherit_properties(&mut device);
    finalize::finalize(device, diag)
}

/// Parses, resolves, and finalizes the SVD document at `path`.
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<(Device, Diagnostics)> {
    let parsed = parse_file(path)?;
    let mut diag = Diagnostics::new();
    let device = process(parsed, &mut diag)?;
    Ok((device, diag))
}

/// Parses, resolves, and finalizes an SVD document from a string.
pub fn process_str(xml: &str) -> Result<(Device, Diagnostics)> {
    let parsed = parse_str(xml)?;
    let mut diag = Diagnostics::new();
    let device = process(parsed, &mut diag)?;
    Ok((device, diag))
}
