use super::{deserialize_bool_opt, deserialize_int, deserialize_int_opt, deserialize_u32_opt};
use crate::types::{Access, EnumUsage, ModifiedWriteValues, ReadAction};
use serde::Deserialize;

/// Bit-field properties of a register.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// The field from which to inherit unspecified data.
    #[serde(rename = "@derivedFrom", default)]
    pub derived_from: Option<String>,
    /// Number of elements in the list this template expands to.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub dim: Option<u32>,
    /// Bit increment between two neighboring list members.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub dim_increment: Option<u64>,
    /// Substitution tokens for `%s`, as a list or range.
    pub dim_index: Option<String>,
    /// Name of the generated C structure.
    pub dim_name: Option<String>,
    /// Enumerated names for the list indices.
    pub dim_array_index: Option<DimArrayIndex>,
    /// Name string used to identify the field.
    pub name: String,
    /// String describing the details of the field.
    pub description: Option<String>,
    /// Position of the least significant bit of the field.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub bit_offset: Option<u32>,
    /// Bit width of the field.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub bit_width: Option<u32>,
    /// Bit position of the least significant bit.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub lsb: Option<u32>,
    /// Bit position of the most significant bit.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub msb: Option<u32>,
    /// Bit range as a `[msb:lsb]` string.
    pub bit_range: Option<String>,
    /// The access rights of the field.
    #[serde(default)]
    pub access: Option<Access>,
    /// Side effect of a write on the field content.
    #[serde(default)]
    pub modified_write_values: Option<ModifiedWriteValues>,
    /// Constraint on writable values.
    pub write_constraint: Option<WriteConstraint>,
    /// Side effect of a read on the field content.
    #[serde(default)]
    pub read_action: Option<ReadAction>,
    /// Enumerated-value containers of the field, at most one per usage.
    #[serde(default, rename = "enumeratedValues")]
    pub enumerated_values: Vec<EnumeratedValues>,
}

/// A container of enumerated values, scoped to a usage direction.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumeratedValues {
    /// The container from which to inherit data.
    #[serde(rename = "@derivedFrom", default)]
    pub derived_from: Option<String>,
    /// Identifier of the container.
    pub name: Option<String>,
    /// Name of the generated C enumeration.
    pub header_enum_name: Option<String>,
    /// Access direction the values apply to.
    #[serde(default)]
    pub usage: Option<EnumUsage>,
    /// The values, in document order.
    #[serde(default, rename = "enumeratedValue")]
    pub values: Vec<EnumeratedValue>,
}

/// One named legal content of a field.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumeratedValue {
    /// The string identifies the value.
    pub name: String,
    /// Extended description of the value.
    pub description: Option<String>,
    /// The value, kept textual: binary literals may carry `x` wildcard bits.
    pub value: Option<String>,
    /// Whether this entry covers all values not otherwise described.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub is_default: Option<bool>,
}

/// Enumerated names for dim indices.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimArrayIndex {
    /// Name of the generated C enumeration.
    pub header_enum_name: Option<String>,
    /// The index names, in document order.
    #[serde(default, rename = "enumeratedValue")]
    pub values: Vec<EnumeratedValue>,
}

/// Constraint on the values writable to a register or field.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WriteConstraint {
    /// Only values read from the location may be written back.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub write_as_read: Option<bool>,
    /// Only enumerated values may be written.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub use_enumerated_values: Option<bool>,
    /// Writable value range.
    #[serde(default)]
    pub range: Option<WriteConstraintRange>,
}

/// Inclusive range of writable values.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WriteConstraintRange {
    /// Smallest writable value.
    #[serde(deserialize_with = "deserialize_int")]
    pub minimum: u64,
    /// Largest writable value.
    #[serde(deserialize_with = "deserialize_int")]
    pub maximum: u64,
}
