use super::register::{Register, RegisterCluster};
use crate::svd::DimArrayIndex;
use crate::types::{Access, AddressBlockUsage, Protection};

/// A finalized peripheral.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Peripheral {
    /// Number of array elements, when the peripheral came from a template.
    pub dim: Option<u32>,
    /// Address increment between neighboring array members, in bytes.
    pub dim_increment: Option<u64>,
    /// Substitution tokens the template expanded with.
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
    /// Name of the original peripheral this one aliases.
    pub alternate_peripheral: Option<String>,
    /// Name of the group the peripheral belongs to.
    pub group_name: Option<String>,
    /// String prepended to the names of all registers.
    pub prepend_to_name: Option<String>,
    /// String appended to the names of all registers.
    pub append_to_name: Option<String>,
    /// Name of the generated peripheral structure.
    pub header_struct_name: Option<String>,
    /// C expression disabling the peripheral.
    pub disable_condition: Option<String>,
    /// Lowest address reserved or used by the peripheral.
    pub base_address: u64,
    /// Default bit-width of any register contained in the peripheral.
    pub size: u32,
    /// Default access rights for all registers in the peripheral.
    pub access: Access,
    /// Default protection for the peripheral's address regions.
    pub protection: Protection,
    /// Default value for all registers in the peripheral at reset.
    pub reset_value: u64,
    /// Mask of register bits with a defined reset value.
    pub reset_mask: u64,
    /// Address ranges reserved or used by the peripheral, sorted by offset.
    pub address_blocks: Vec<AddressBlock>,
    /// Interrupt lines connected to the peripheral, sorted by value.
    pub interrupts: Vec<Interrupt>,
    /// Registers and clusters, sorted by address offset, then name.
    pub registers: Vec<RegisterCluster>,
    /// Last address covered by the address blocks.
    pub end_address_specified: u64,
    /// Last address covered by the registers and clusters.
    pub end_address_effective: u64,
    /// Byte size summed over the address blocks.
    pub size_specified: u64,
    /// Byte size spanned by the registers and clusters.
    pub size_effective: u64,
}

impl Peripheral {
    /// Returns the register or cluster with name `name`.
    pub fn child(&self, name: &str) -> Option<&RegisterCluster> {
        self.registers.iter().find(|child| child.name() == name)
    }

    /// Returns the register with name `name`, searching only this level.
    pub fn reg(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find_map(|child| match child {
            RegisterCluster::Register(register) if register.name == name => Some(register),
            _ => None,
        })
    }

    /// Returns every register of the peripheral, recursing into clusters,
    /// sorted by absolute address, then name.
    pub fn all_registers(&self) -> Vec<&Register> {
        fn collect<'a>(children: &'a [RegisterCluster], out: &mut Vec<&'a Register>) {
            for child in children {
                match child {
                    RegisterCluster::Register(register) => out.push(register),
                    RegisterCluster::Cluster(cluster) => collect(&cluster.registers, out),
                }
            }
        }
        let mut registers = Vec::new();
        collect(&self.registers, &mut registers);
        registers.sort_by(|a, b| {
            (a.base_address, a.name.as_str()).cmp(&(b.base_address, b.name.as_str()))
        });
        registers
    }
}

/// A finalized address block.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct AddressBlock {
    /// Start address of the block, relative to the peripheral base.
    pub offset: u64,
    /// Number of address unit bits covered by the block.
    pub size: u64,
    /// Purpose of the block.
    pub usage: AddressBlockUsage,
    /// Protection of the block.
    pub protection: Protection,
}

/// A finalized interrupt line.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Interrupt {
    /// The string identifies the interrupt.
    pub name: String,
    /// Overview of the interrupt.
    pub description: Option<String>,
    /// Index of the interrupt line.
    pub value: u32,
}
