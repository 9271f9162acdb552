use super::field::DimArrayIndex;
use super::register::RegisterTree;
use super::{deserialize_int, deserialize_int_opt, deserialize_u32, deserialize_u32_opt};
use crate::types::{Access, AddressBlockUsage, Protection};
use serde::{Deserialize, Deserializer};

/// A peripheral of the device.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peripheral {
    /// The peripheral from which to inherit unspecified data.
    #[serde(rename = "@derivedFrom", default)]
    pub derived_from: Option<String>,
    /// Number of elements in the array this template expands to.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub dim: Option<u32>,
    /// Address increment, in bytes, between two neighboring array members.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub dim_increment: Option<u64>,
    /// Substitution tokens for `%s`, as a list or range.
    pub dim_index: Option<String>,
    /// Name of the generated C structure.
    pub dim_name: Option<String>,
    /// Enumerated names for the array indices.
    pub dim_array_index: Option<DimArrayIndex>,
    /// The string identifies the peripheral.
    pub name: String,
    /// Version of the peripheral description.
    pub version: Option<String>,
    /// Overview of the purpose and functionality of the peripheral.
    pub description: Option<String>,
    /// Name of the original peripheral when this one redefines its address
    /// block.
    pub alternate_peripheral: Option<String>,
    /// Name of the group the peripheral belongs to.
    pub group_name: Option<String>,
    /// String prepended to the names of all registers of the peripheral.
    pub prepend_to_name: Option<String>,
    /// String appended to the names of all registers of the peripheral.
    pub append_to_name: Option<String>,
    /// Name of the generated peripheral structure.
    pub header_struct_name: Option<String>,
    /// C expression disabling the peripheral.
    pub disable_condition: Option<String>,
    /// Lowest address reserved or used by the peripheral.
    #[serde(deserialize_with = "deserialize_int")]
    pub base_address: u64,
    /// Default bit-width of any register contained in the peripheral.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub size: Option<u32>,
    /// Default access rights for all registers in the peripheral.
    #[serde(default)]
    pub access: Option<Access>,
    /// Default protection for the peripheral's address regions.
    #[serde(default)]
    pub protection: Option<Protection>,
    /// Default value for all registers in the peripheral at reset.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub reset_value: Option<u64>,
    /// Mask of register bits with a defined reset value.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub reset_mask: Option<u64>,
    /// Address ranges reserved or used by the peripheral.
    #[serde(default, rename = "addressBlock")]
    pub address_blocks: Vec<AddressBlock>,
    /// Interrupt lines connected to the peripheral.
    #[serde(default, rename = "interrupt")]
    pub interrupts: Vec<Interrupt>,
    /// The registers and clusters of the peripheral, in document order.
    #[serde(default, with = "RegistersWrapper")]
    pub registers: Vec<RegisterTree>,
}

/// An address range reserved or used by a peripheral.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBlock {
    /// Start address of the block, relative to the peripheral base.
    #[serde(deserialize_with = "deserialize_int")]
    pub offset: u64,
    /// Number of address unit bits covered by the block.
    #[serde(deserialize_with = "deserialize_int")]
    pub size: u64,
    /// Purpose of the block.
    pub usage: AddressBlockUsage,
    /// Protection of the block.
    #[serde(default)]
    pub protection: Option<Protection>,
}

/// An interrupt line connected to a peripheral.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interrupt {
    /// The string identifies the interrupt.
    pub name: String,
    /// Overview of the interrupt.
    pub description: Option<String>,
    /// Index of the interrupt line.
    #[serde(deserialize_with = "deserialize_u32")]
    pub value: u32,
}

#[derive(Deserialize)]
struct RegistersWrapper {
    #[serde(rename = "$value", default)]
    values: Vec<RegisterTree>,
}

impl RegistersWrapper {
    fn deserialize<'de, D>(deserializer: D) -> Result<Vec<RegisterTree>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(<Self as Deserialize>::deserialize(deserializer)?.values)
    }
}
