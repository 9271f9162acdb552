//! The finalized device model.
//!
//! Everything here is fully resolved: derivations applied, dim templates
//! expanded, the register-property group populated at every level, children
//! sorted, and the address map validated.

mod cpu;
mod field;
mod peripheral;
mod register;

pub use self::cpu::{Cpu, SauRegion, SauRegionsConfig};
pub use self::field::{EnumeratedValue, EnumeratedValueContainer, Field, WriteConstraint};
pub use self::peripheral::{AddressBlock, Interrupt, Peripheral};
pub use self::register::{Cluster, Register, RegisterCluster};

use crate::types::{Access, Protection};

/// The outermost frame of a finalized description.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Device {
    /// Schema version the source document claimed.
    pub schema_version: Option<String>,
    /// Vendor of the device.
    pub vendor: Option<String>,
    /// Abbreviated vendor identifier.
    pub vendor_id: Option<String>,
    /// The string identifies the device or device series.
    pub name: String,
    /// Device series the device belongs to.
    pub series: Option<String>,
    /// Version of the description.
    pub version: String,
    /// Overview of the device features.
    pub description: String,
    /// License text to be included in generated headers.
    pub license_text: Option<String>,
    /// Processor description.
    pub cpu: Option<Cpu>,
    /// Name of the system include file.
    pub header_system_filename: Option<String>,
    /// Prefix prepended to all type definition names.
    pub header_definitions_prefix: Option<String>,
    /// Number of data bits addressed by a single address increment.
    pub address_unit_bits: u32,
    /// Bit width of the maximum single data transfer.
    pub width: u32,
    /// Default bit-width of any register contained in the device.
    pub size: u32,
    /// Default access rights for all registers.
    pub access: Access,
    /// Default protection for all address regions.
    pub protection: Protection,
    /// Default value for all registers at reset.
    pub reset_value: u64,
    /// Mask of register bits with a defined reset value.
    pub reset_mask: u64,
    /// The peripherals, sorted by base address, then name.
    pub peripherals: Vec<Peripheral>,
}

impl Device {
    /// Returns the peripheral with name `name`.
    pub fn periph(&self, name: &str) -> Option<&Peripheral> {
        self.peripherals.iter().find(|peripheral| peripheral.name == name)
    }
}
