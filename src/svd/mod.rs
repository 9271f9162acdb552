//! Parsed SVD record tree.
//!
//! Everything in this module is sparse: attributes the document does not
//! mention stay `None` and are filled in later by derivation, property
//! inheritance, and finalization. Deserialization accepts the SVD integer
//! literal forms (decimal, `0x` hex, `0b`/`#` binary, optional leading `+`)
//! and `true`/`false`/`1`/`0` booleans.

mod cpu;
mod field;
mod peripheral;
mod register;

pub use self::cpu::{Cpu, SauAccess, SauRegion, SauRegionsConfig};
pub use self::field::{
    DimArrayIndex, EnumeratedValue, EnumeratedValues, Field, WriteConstraint, WriteConstraintRange,
};
pub use self::peripheral::{AddressBlock, Interrupt, Peripheral};
pub use self::register::{Cluster, Register, RegisterTree};

use crate::types::{Access, Protection};
use serde::{de, Deserialize, Deserializer};
use std::num::ParseIntError;

/// The outermost frame of the description.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Version of the SVD schema the document claims to follow.
    #[serde(rename = "@schemaVersion", default)]
    pub schema_version: Option<String>,
    /// Vendor of the device.
    pub vendor: Option<String>,
    /// Abbreviated vendor identifier.
    #[serde(rename = "vendorID", default)]
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
    #[serde(deserialize_with = "deserialize_u32")]
    pub address_unit_bits: u32,
    /// Bit width of the maximum single data transfer.
    #[serde(deserialize_with = "deserialize_u32")]
    pub width: u32,
    /// Default bit-width of any register contained in the device.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub size: Option<u32>,
    /// Default access rights for all registers.
    #[serde(default)]
    pub access: Option<Access>,
    /// Default protection for all address regions.
    #[serde(default)]
    pub protection: Option<Protection>,
    /// Default value for all registers at reset.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub reset_value: Option<u64>,
    /// Mask of register bits with a defined reset value.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub reset_mask: Option<u64>,
    /// The peripherals of the device, in document order.
    #[serde(default, with = "PeripheralsWrapper")]
    pub peripherals: Vec<Peripheral>,
}

#[derive(Deserialize)]
struct PeripheralsWrapper {
    #[serde(rename = "$value", default)]
    values: Vec<Peripheral>,
}

impl PeripheralsWrapper {
    fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Peripheral>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(<Self as Deserialize>::deserialize(deserializer)?.values)
    }
}

pub(crate) fn parse_int(src: &str) -> Result<u64, ParseIntError> {
    let src = src.trim();
    let src = src.strip_prefix('+').unwrap_or(src);
    if let Some(hex) = src.strip_prefix("0x").or_else(|| src.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) =
        src.strip_prefix("0b").or_else(|| src.strip_prefix("0B")).or_else(|| src.strip_prefix('#'))
    {
        u64::from_str_radix(bin, 2)
    } else {
        src.parse()
    }
}

pub(crate) fn parse_bool(src: &str) -> Option<bool> {
    match src.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn deserialize_int<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    parse_int(&String::deserialize(deserializer)?).map_err(de::Error::custom)
}

pub(crate) fn deserialize_int_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map_or(Ok(None), |s| parse_int(&s).map(Some).map_err(de::Error::custom))
}

pub(crate) fn deserialize_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_int(deserializer)?;
    u32::try_from(value).map_err(de::Error::custom)
}

pub(crate) fn deserialize_u32_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_int_opt(deserializer)?
        .map(|value| u32::try_from(value).map_err(de::Error::custom))
        .transpose()
}

pub(crate) fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let src = String::deserialize(deserializer)?;
    parse_bool(&src).ok_or_else(|| de::Error::custom(format!("invalid boolean `{src}`")))
}

pub(crate) fn deserialize_bool_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?.map_or(Ok(None), |src| {
        parse_bool(&src)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid boolean `{src}`")))
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_bool, parse_int};

    #[test]
    fn int_literal_forms() {
        assert_eq!(parse_int("123").unwrap(), 123);
        assert_eq!(parse_int("+123").unwrap(), 123);
        assert_eq!(parse_int("0x1F").unwrap(), 0x1F);
        assert_eq!(parse_int("0X1f").unwrap(), 0x1F);
        assert_eq!(parse_int("0b101").unwrap(), 5);
        assert_eq!(parse_int("#101").unwrap(), 5);
        assert_eq!(parse_int("0xFFFFFFFFFFFFFFFF").unwrap(), u64::MAX);
        assert!(parse_int("12z").is_err());
        assert!(parse_int("0xx1").is_err());
    }

    #[test]
    fn bool_literal_forms() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("yes"), None);
    }
}
