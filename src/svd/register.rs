use super::field::{DimArrayIndex, Field, WriteConstraint};
use super::{deserialize_int, deserialize_int_opt, deserialize_u32_opt};
use crate::types::{Access, DataType, ModifiedWriteValues, Protection, ReadAction};
use serde::{Deserialize, Deserializer};

/// Either of the two element kinds a register scope may contain.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegisterTree {
    /// A memory-mapped register.
    Register(Register),
    /// A named group of registers.
    Cluster(Cluster),
}

/// A named group of registers and sub-clusters at an offset within its
/// parent.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// The cluster from which to inherit unspecified data.
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
    /// String to identify the cluster.
    pub name: String,
    /// String describing the details of the register cluster.
    pub description: Option<String>,
    /// Name of the original cluster if this cluster provides an alternative
    /// description.
    pub alternate_cluster: Option<String>,
    /// Name of the generated cluster structure.
    pub header_struct_name: Option<String>,
    /// Cluster address relative to the base address of the peripheral.
    #[serde(deserialize_with = "deserialize_int")]
    pub address_offset: u64,
    /// Default bit-width of any register contained in the cluster.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub size: Option<u32>,
    /// Default access rights for all registers in the cluster.
    #[serde(default)]
    pub access: Option<Access>,
    /// Default protection for the cluster's address region.
    #[serde(default)]
    pub protection: Option<Protection>,
    /// Default value for all registers in the cluster at reset.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub reset_value: Option<u64>,
    /// Mask of register bits with a defined reset value.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub reset_mask: Option<u64>,
    /// Registers directly contained in the cluster.
    #[serde(default, rename = "register")]
    pub registers: Vec<Register>,
    /// Sub-clusters contained in the cluster.
    #[serde(default, rename = "cluster")]
    pub clusters: Vec<Cluster>,
}

impl Cluster {
    /// Drains the cluster's children into a single list, registers first.
    pub(crate) fn take_children(&mut self) -> Vec<RegisterTree> {
        let registers = std::mem::take(&mut self.registers);
        let clusters = std::mem::take(&mut self.clusters);
        registers
            .into_iter()
            .map(RegisterTree::Register)
            .chain(clusters.into_iter().map(RegisterTree::Cluster))
            .collect()
    }
}

/// The description of a register.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    /// The register from which to inherit unspecified data.
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
    /// String to identify the register.
    pub name: String,
    /// Register name without restrictions, for documentation.
    pub display_name: Option<String>,
    /// String describing the details of the register.
    pub description: Option<String>,
    /// Name of the group of alternate descriptions this register belongs to.
    pub alternate_group: Option<String>,
    /// A register defined earlier that describes the same memory location.
    pub alternate_register: Option<String>,
    /// The address offset relative to the enclosing element.
    #[serde(deserialize_with = "deserialize_int")]
    pub address_offset: u64,
    /// The bit-width of the register.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub size: Option<u32>,
    /// The access rights of the register.
    #[serde(default)]
    pub access: Option<Access>,
    /// The protection of the register.
    #[serde(default)]
    pub protection: Option<Protection>,
    /// The value of the register at reset.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub reset_value: Option<u64>,
    /// Mask of register bits with a defined reset value.
    #[serde(default, deserialize_with = "deserialize_int_opt")]
    pub reset_mask: Option<u64>,
    /// C data type used when accessing the register.
    #[serde(default)]
    pub data_type: Option<DataType>,
    /// Side effect of a write on the register content.
    #[serde(default)]
    pub modified_write_values: Option<ModifiedWriteValues>,
    /// Constraint on writable values.
    pub write_constraint: Option<WriteConstraint>,
    /// Side effect of a read on the register content.
    #[serde(default)]
    pub read_action: Option<ReadAction>,
    /// The bit fields of the register.
    #[serde(default, with = "FieldsWrapper")]
    pub fields: Vec<Field>,
}

#[derive(Deserialize)]
struct FieldsWrapper {
    #[serde(rename = "$value", default)]
    values: Vec<Field>,
}

impl FieldsWrapper {
    fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Field>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(<Self as Deserialize>::deserialize(deserializer)?.values)
    }
}
