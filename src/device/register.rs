use super::field::{Field, WriteConstraint};
use crate::svd::DimArrayIndex;
use crate::types::{Access, DataType, ModifiedWriteValues, Protection, ReadAction};

/// Either of the two element kinds a finalized register scope contains.
#[derive(Clone, Debug)]
pub enum RegisterCluster {
    /// A memory-mapped register.
    Register(Register),
    /// A named group of registers.
    Cluster(Cluster),
}

impl RegisterCluster {
    /// The element name.
    pub fn name(&self) -> &str {
        match self {
            RegisterCluster::Register(register) => &register.name,
            RegisterCluster::Cluster(cluster) => &cluster.name,
        }
    }

    /// The address offset relative to the enclosing element.
    pub fn address_offset(&self) -> u64 {
        match self {
            RegisterCluster::Register(register) => register.address_offset,
            RegisterCluster::Cluster(cluster) => cluster.address_offset,
        }
    }

    /// The absolute start address.
    pub fn base_address(&self) -> u64 {
        match self {
            RegisterCluster::Register(register) => register.base_address,
            RegisterCluster::Cluster(cluster) => cluster.base_address,
        }
    }

    /// The number of bytes the element spans in the address map.
    pub fn byte_size(&self) -> u64 {
        match self {
            RegisterCluster::Register(register) => u64::from(register.size) / 8,
            RegisterCluster::Cluster(cluster) => cluster.byte_size,
        }
    }
}

/// A finalized cluster.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Cluster {
    /// Number of array elements, when the cluster came from a template.
    pub dim: Option<u32>,
    /// Address increment between neighboring array members, in bytes.
    pub dim_increment: Option<u64>,
    /// Substitution tokens the template expanded with.
    pub dim_index: Option<String>,
    /// Name of the generated C structure.
    pub dim_name: Option<String>,
    /// Enumerated names for the array indices.
    pub dim_array_index: Option<DimArrayIndex>,
    /// String to identify the cluster.
    pub name: String,
    /// String describing the details of the register cluster.
    pub description: Option<String>,
    /// Name of the original cluster this one aliases.
    pub alternate_cluster: Option<String>,
    /// Name of the generated cluster structure.
    pub header_struct_name: Option<String>,
    /// Cluster address relative to the base address of the peripheral.
    pub address_offset: u64,
    /// Default bit-width of any register contained in the cluster.
    pub size: u32,
    /// Default access rights for all registers in the cluster.
    pub access: Access,
    /// Default protection for the cluster's address region.
    pub protection: Protection,
    /// Default value for all registers in the cluster at reset.
    pub reset_value: u64,
    /// Mask of register bits with a defined reset value.
    pub reset_mask: u64,
    /// The absolute start address.
    pub base_address: u64,
    /// The last absolute address covered by the cluster's children.
    pub end_address: u64,
    /// The number of bytes spanned by the cluster's children.
    pub byte_size: u64,
    /// Registers and sub-clusters, sorted by address offset, then name.
    pub registers: Vec<RegisterCluster>,
}

impl Cluster {
    /// Returns the register or cluster with name `name`.
    pub fn child(&self, name: &str) -> Option<&RegisterCluster> {
        self.registers.iter().find(|child| child.name() == name)
    }
}

/// A finalized register.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Register {
    /// Number of array elements, when the register came from a template.
    pub dim: Option<u32>,
    /// Address increment between neighboring array members, in bytes.
    pub dim_increment: Option<u64>,
    /// Substitution tokens the template expanded with.
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
    /// A register describing the same memory location.
    pub alternate_register: Option<String>,
    /// The address offset relative to the enclosing element.
    pub address_offset: u64,
    /// The bit-width of the register.
    pub size: u32,
    /// The access rights of the register.
    pub access: Access,
    /// The protection of the register.
    pub protection: Protection,
    /// The value of the register at reset.
    pub reset_value: u64,
    /// Mask of register bits with a defined reset value.
    pub reset_mask: u64,
    /// The absolute address of the register.
    pub base_address: u64,
    /// C data type used when accessing the register.
    pub data_type: Option<DataType>,
    /// Side effect of a write on the register content.
    pub modified_write_values: ModifiedWriteValues,
    /// Constraint on writable values.
    pub write_constraint: Option<WriteConstraint>,
    /// Side effect of a read on the register content.
    pub read_action: Option<ReadAction>,
    /// The bit fields of the register, sorted by lsb.
    pub fields: Vec<Field>,
}

impl Register {
    /// Returns the field with name `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}
