//! Intermediate records between element processing and finalization.
//!
//! The register-property group stays `Option`-typed here: values arrive
//! from merging, then top-down inheritance, and only the finalizer demands
//! them to be present.

use crate::device::{AddressBlock, Cpu, EnumeratedValueContainer, Interrupt, WriteConstraint};
use crate::svd::DimArrayIndex;
use crate::types::{Access, DataType, ModifiedWriteValues, Protection, ReadAction};

#[derive(Clone, Debug)]
pub(crate) struct Device {
    pub(crate) schema_version: Option<String>,
    pub(crate) vendor: Option<String>,
    pub(crate) vendor_id: Option<String>,
    pub(crate) name: String,
    pub(crate) series: Option<String>,
    pub(crate) version: String,
    pub(crate) description: String,
    pub(crate) license_text: Option<String>,
    pub(crate) cpu: Option<Cpu>,
    pub(crate) header_system_filename: Option<String>,
    pub(crate) header_definitions_prefix: Option<String>,
    pub(crate) address_unit_bits: u32,
    pub(crate) width: u32,
    pub(crate) size: u32,
    pub(crate) access: Access,
    pub(crate) protection: Protection,
    pub(crate) reset_value: u64,
    pub(crate) reset_mask: u64,
    pub(crate) peripherals: Vec<Peripheral>,
}

#[derive(Clone, Debug)]
pub(crate) struct Peripheral {
    pub(crate) dim: Option<u32>,
    pub(crate) dim_increment: Option<u64>,
    pub(crate) dim_index: Option<String>,
    pub(crate) dim_name: Option<String>,
    pub(crate) dim_array_index: Option<DimArrayIndex>,
    pub(crate) size: Option<u32>,
    pub(crate) access: Option<Access>,
    pub(crate) protection: Option<Protection>,
    pub(crate) reset_value: Option<u64>,
    pub(crate) reset_mask: Option<u64>,
    pub(crate) name: String,
    pub(crate) version: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) alternate_peripheral: Option<String>,
    pub(crate) group_name: Option<String>,
    pub(crate) prepend_to_name: Option<String>,
    pub(crate) append_to_name: Option<String>,
    pub(crate) header_struct_name: Option<String>,
    pub(crate) disable_condition: Option<String>,
    pub(crate) base_address: u64,
    pub(crate) address_blocks: Vec<AddressBlock>,
    pub(crate) interrupts: Vec<Interrupt>,
    pub(crate) children: Vec<RegisterCluster>,
}

#[derive(Clone, Debug)]
pub(crate) enum RegisterCluster {
    Register(Register),
    Cluster(Cluster),
}

impl RegisterCluster {
    pub(crate) fn name(&self) -> &str {
        match self {
            RegisterCluster::Register(register) => &register.name,
            RegisterCluster::Cluster(cluster) => &cluster.name,
        }
    }

    pub(crate) fn address_offset(&self) -> u64 {
        match self {
            RegisterCluster::Register(register) => register.address_offset,
            RegisterCluster::Cluster(cluster) => cluster.address_offset,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Cluster {
    pub(crate) dim: Option<u32>,
    pub(crate) dim_increment: Option<u64>,
    pub(crate) dim_index: Option<String>,
    pub(crate) dim_name: Option<String>,
    pub(crate) dim_array_index: Option<DimArrayIndex>,
    pub(crate) size: Option<u32>,
    pub(crate) access: Option<Access>,
    pub(crate) protection: Option<Protection>,
    pub(crate) reset_value: Option<u64>,
    pub(crate) reset_mask: Option<u64>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) alternate_cluster: Option<String>,
    pub(crate) header_struct_name: Option<String>,
    pub(crate) address_offset: u64,
    pub(crate) children: Vec<RegisterCluster>,
}

#[derive(Clone, Debug)]
pub(crate) struct Register {
    pub(crate) dim: Option<u32>,
    pub(crate) dim_increment: Option<u64>,
    pub(crate) dim_index: Option<String>,
    pub(crate) dim_name: Option<String>,
    pub(crate) dim_array_index: Option<DimArrayIndex>,
    pub(crate) size: Option<u32>,
    pub(crate) access: Option<Access>,
    pub(crate) protection: Option<Protection>,
    pub(crate) reset_value: Option<u64>,
    pub(crate) reset_mask: Option<u64>,
    pub(crate) name: String,
    pub(crate) display_name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) alternate_group: Option<String>,
    pub(crate) alternate_register: Option<String>,
    pub(crate) address_offset: u64,
    pub(crate) data_type: Option<DataType>,
    pub(crate) modified_write_values: ModifiedWriteValues,
    pub(crate) write_constraint: Option<WriteConstraint>,
    pub(crate) read_action: Option<ReadAction>,
    pub(crate) fields: Vec<Field>,
}

#[derive(Clone, Debug)]
pub(crate) struct Field {
    pub(crate) dim: Option<u32>,
    pub(crate) dim_increment: Option<u64>,
    pub(crate) dim_index: Option<String>,
    pub(crate) dim_name: Option<String>,
    pub(crate) dim_array_index: Option<DimArrayIndex>,
    pub(crate) access: Option<Access>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) lsb: u32,
    pub(crate) msb: u32,
    pub(crate) modified_write_values: ModifiedWriteValues,
    pub(crate) write_constraint: Option<WriteConstraint>,
    pub(crate) read_action: Option<ReadAction>,
    pub(crate) enumerated_value_containers: Vec<EnumeratedValueContainer>,
}

/// The processed payload attached to a graph node.
#[derive(Clone, Debug)]
pub(crate) enum Element {
    Peripheral(Peripheral),
    Cluster(Cluster),
    Register(Register),
    Field(Field),
}

impl Element {
    pub(crate) fn name(&self) -> &str {
        match self {
            Element::Peripheral(peripheral) => &peripheral.name,
            Element::Cluster(cluster) => &cluster.name,
            Element::Register(register) => &register.name,
            Element::Field(field) => &field.name,
        }
    }
}
