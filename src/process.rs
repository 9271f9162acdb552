//! Conversion of parsed records into intermediate records.
//!
//! Each converter merges the parsed element with its derive base: the
//! element's own value wins, the base fills the gaps. Addresses are never
//! taken from the base; they come from the element literally, shifted by
//! the dim increment for array/list instances.

use crate::device::{
    AddressBlock, Cpu, EnumeratedValue, EnumeratedValueContainer, Interrupt, SauRegion,
    SauRegionsConfig, WriteConstraint,
};
use crate::diag::{Diagnostics, WarningKind};
use crate::dim::{self, DimExpansion, DimKind};
use crate::error::Error;
use crate::ir;
use crate::svd;
use crate::types::{Access, EnumUsage, ModifiedWriteValues, Protection};
use std::collections::HashSet;

/// Widest field for which an `isDefault` entry is expanded into concrete
/// values.
const MAX_DEFAULT_FILL_BITS: u32 = 16;

pub(crate) fn process_device(parsed: &svd::Device) -> ir::Device {
    ir::Device {
        schema_version: parsed.schema_version.clone(),
        vendor: parsed.vendor.clone(),
        vendor_id: parsed.vendor_id.clone(),
        name: parsed.name.clone(),
        series: parsed.series.clone(),
        version: parsed.version.clone(),
        description: parsed.description.clone(),
        license_text: parsed.license_text.clone(),
        cpu: parsed.cpu.as_ref().map(process_cpu),
        header_system_filename: parsed.header_system_filename.clone(),
        header_definitions_prefix: parsed.header_definitions_prefix.clone(),
        address_unit_bits: parsed.address_unit_bits,
        width: parsed.width,
        size: parsed.size.unwrap_or(32),
        access: parsed.access.unwrap_or(Access::ReadWrite),
        protection: parsed.protection.unwrap_or(Protection::Any),
        reset_value: parsed.reset_value.unwrap_or(0),
        reset_mask: parsed.reset_mask.unwrap_or(0xFFFF_FFFF),
        peripherals: Vec::new(),
    }
}

fn process_cpu(parsed: &svd::Cpu) -> Cpu {
    Cpu {
        name: parsed.name.clone(),
        revision: parsed.revision.clone(),
        endian: parsed.endian,
        mpu_present: parsed.mpu_present.unwrap_or(false),
        fpu_present: parsed.fpu_present.unwrap_or(false),
        fpu_dp: parsed.fpu_dp.unwrap_or(false),
        dsp_present: parsed.dsp_present.unwrap_or(false),
        icache_present: parsed.icache_present.unwrap_or(false),
        dcache_present: parsed.dcache_present.unwrap_or(false),
        itcm_present: parsed.itcm_present.unwrap_or(false),
        dtcm_present: parsed.dtcm_present.unwrap_or(false),
        vtor_present: parsed.vtor_present.unwrap_or(true),
        nvic_prio_bits: parsed.nvic_prio_bits,
        vendor_systick_config: parsed.vendor_systick_config,
        device_num_interrupts: parsed.device_num_interrupts,
        sau_num_regions: parsed.sau_num_regions,
        sau_regions_config: parsed.sau_regions_config.as_ref().map(process_sau_regions_config),
    }
}

fn process_sau_regions_config(parsed: &svd::SauRegionsConfig) -> SauRegionsConfig {
    SauRegionsConfig {
        enabled: parsed.enabled.unwrap_or(true),
        protection_when_disabled: parsed.protection_when_disabled.unwrap_or(Protection::Secure),
        regions: parsed
            .regions
            .iter()
            .map(|region| SauRegion {
                enabled: region.enabled.unwrap_or(true),
                name: region.name.clone(),
                base: region.base,
                limit: region.limit,
                access: region.access,
            })
            .collect(),
    }
}

pub(crate) fn process_peripheral(
    index: u32,
    name: String,
    parsed: &svd::Peripheral,
    base: Option<&ir::Peripheral>,
) -> ir::Peripheral {
    let dim_increment = parsed.dim_increment.or(base.and_then(|base| base.dim_increment));
    let address_blocks = {
        let own = process_address_blocks(&parsed.address_blocks);
        if own.is_empty() {
            base.map(|base| base.address_blocks.clone()).unwrap_or_default()
        } else {
            own
        }
    };
    ir::Peripheral {
        dim: parsed.dim.or(base.and_then(|base| base.dim)),
        dim_increment,
        dim_index: parsed
            .dim_index
            .clone()
            .or_else(|| base.and_then(|base| base.dim_index.clone())),
        dim_name: parsed.dim_name.clone().or_else(|| base.and_then(|base| base.dim_name.clone())),
        dim_array_index: parsed
            .dim_array_index
            .clone()
            .or_else(|| base.and_then(|base| base.dim_array_index.clone())),
        size: parsed.size.or(base.and_then(|base| base.size)),
        access: parsed.access.or(base.and_then(|base| base.access)),
        protection: parsed.protection.or(base.and_then(|base| base.protection)),
        reset_value: parsed.reset_value.or(base.and_then(|base| base.reset_value)),
        reset_mask: parsed.reset_mask.or(base.and_then(|base| base.reset_mask)),
        name,
        version: parsed.version.clone().or_else(|| base.and_then(|base| base.version.clone())),
        description: parsed
            .description
            .clone()
            .or_else(|| base.and_then(|base| base.description.clone())),
        alternate_peripheral: parsed
            .alternate_peripheral
            .clone()
            .or_else(|| base.and_then(|base| base.alternate_peripheral.clone())),
        group_name: parsed
            .group_name
            .clone()
            .or_else(|| base.and_then(|base| base.group_name.clone())),
        prepend_to_name: parsed
            .prepend_to_name
            .clone()
            .or_else(|| base.and_then(|base| base.prepend_to_name.clone())),
        append_to_name: parsed
            .append_to_name
            .clone()
            .or_else(|| base.and_then(|base| base.append_to_name.clone())),
        // Never inherited, matching svdconv.
        header_struct_name: parsed.header_struct_name.clone(),
        disable_condition: parsed
            .disable_condition
            .clone()
            .or_else(|| base.and_then(|base| base.disable_condition.clone())),
        base_address: shifted(parsed.base_address, dim_increment, index),
        address_blocks,
        interrupts: process_interrupts(&parsed.interrupts),
        children: Vec::new(),
    }
}

pub(crate) fn process_cluster(
    index: u32,
    name: String,
    parsed: &svd::Cluster,
    base: Option<&ir::Cluster>,
) -> ir::Cluster {
    let dim_increment = parsed.dim_increment.or(base.and_then(|base| base.dim_increment));
    ir::Cluster {
        dim: parsed.dim.or(base.and_then(|base| base.dim)),
        dim_increment,
        dim_index: parsed
            .dim_index
            .clone()
            .or_else(|| base.and_then(|base| base.dim_index.clone())),
        dim_name: parsed.dim_name.clone().or_else(|| base.and_then(|base| base.dim_name.clone())),
        dim_array_index: parsed
            .dim_array_index
            .clone()
            .or_else(|| base.and_then(|base| base.dim_array_index.clone())),
        size: parsed.size.or(base.and_then(|base| base.size)),
        access: parsed.access.or(base.and_then(|base| base.access)),
        protection: parsed.protection.or(base.and_then(|base| base.protection)),
        reset_value: parsed.reset_value.or(base.and_then(|base| base.reset_value)),
        reset_mask: parsed.reset_mask.or(base.and_then(|base| base.reset_mask)),
        name,
        description: parsed
            .description
            .clone()
            .or_else(|| base.and_then(|base| base.description.clone())),
        alternate_cluster: parsed
            .alternate_cluster
            .clone()
            .or_else(|| base.and_then(|base| base.alternate_cluster.clone())),
        header_struct_name: parsed
            .header_struct_name
            .clone()
            .or_else(|| base.and_then(|base| base.header_struct_name.clone())),
        address_offset: shifted(parsed.address_offset, dim_increment, index),
        children: Vec::new(),
    }
}

pub(crate) fn process_register(
    index: u32,
    name: String,
    display_name: Option<String>,
    parsed: &svd::Register,
    base: Option<&ir::Register>,
) -> ir::Register {
    let dim_increment = parsed.dim_increment.or(base.and_then(|base| base.dim_increment));
    ir::Register {
        dim: parsed.dim.or(base.and_then(|base| base.dim)),
        dim_increment,
        dim_index: parsed
            .dim_index
            .clone()
            .or_else(|| base.and_then(|base| base.dim_index.clone())),
        dim_name: parsed.dim_name.clone().or_else(|| base.and_then(|base| base.dim_name.clone())),
        dim_array_index: parsed
            .dim_array_index
            .clone()
            .or_else(|| base.and_then(|base| base.dim_array_index.clone())),
        size: parsed.size.or(base.and_then(|base| base.size)),
        access: parsed.access.or(base.and_then(|base| base.access)),
        protection: parsed.protection.or(base.and_then(|base| base.protection)),
        reset_value: parsed.reset_value.or(base.and_then(|base| base.reset_value)),
        reset_mask: parsed.reset_mask.or(base.and_then(|base| base.reset_mask)),
        name,
        display_name,
        description: parsed
            .description
            .clone()
            .or_else(|| base.and_then(|base| base.description.clone())),
        alternate_group: parsed
            .alternate_group
            .clone()
            .or_else(|| base.and_then(|base| base.alternate_group.clone())),
        alternate_register: parsed
            .alternate_register
            .clone()
            .or_else(|| base.and_then(|base| base.alternate_register.clone())),
        address_offset: shifted(parsed.address_offset, dim_increment, index),
        data_type: parsed.data_type.or(base.and_then(|base| base.data_type)),
        modified_write_values: parsed
            .modified_write_values
            .or(base.map(|base| base.modified_write_values))
            .unwrap_or(ModifiedWriteValues::Modify),
        write_constraint: process_write_constraint(parsed.write_constraint.as_ref())
            .or_else(|| base.and_then(|base| base.write_constraint.clone())),
        read_action: parsed.read_action.or(base.and_then(|base| base.read_action)),
        fields: Vec::new(),
    }
}

pub(crate) fn process_field(
    index: u32,
    name: String,
    parsed: &svd::Field,
    base: Option<&ir::Field>,
    path: &str,
    diag: &mut Diagnostics,
) -> Result<ir::Field, Error> {
    let dim_increment = parsed.dim_increment.or(base.and_then(|base| base.dim_increment));
    let (lsb, msb) = field_bit_range(parsed, base, path, diag)?;
    let shift = u32::try_from(dim_increment.unwrap_or(0) * u64::from(index)).unwrap_or(0);
    Ok(ir::Field {
        dim: parsed.dim.or(base.and_then(|base| base.dim)),
        dim_increment,
        dim_index: parsed
            .dim_index
            .clone()
            .or_else(|| base.and_then(|base| base.dim_index.clone())),
        dim_name: parsed.dim_name.clone().or_else(|| base.and_then(|base| base.dim_name.clone())),
        dim_array_index: parsed
            .dim_array_index
            .clone()
            .or_else(|| base.and_then(|base| base.dim_array_index.clone())),
        access: parsed.access.or(base.and_then(|base| base.access)),
        name,
        description: parsed
            .description
            .clone()
            .or_else(|| base.and_then(|base| base.description.clone())),
        lsb: lsb + shift,
        msb: msb + shift,
        modified_write_values: parsed
            .modified_write_values
            .or(base.map(|base| base.modified_write_values))
            .unwrap_or(ModifiedWriteValues::Modify),
        write_constraint: process_write_constraint(parsed.write_constraint.as_ref())
            .or_else(|| base.and_then(|base| base.write_constraint.clone())),
        read_action: parsed.read_action.or(base.and_then(|base| base.read_action)),
        enumerated_value_containers: Vec::new(),
    })
}

fn shifted(address: u64, dim_increment: Option<u64>, index: u32) -> u64 {
    match dim_increment {
        Some(increment) => address + increment * u64::from(index),
        None => address,
    }
}

pub(crate) fn process_address_blocks(parsed: &[svd::AddressBlock]) -> Vec<AddressBlock> {
    let mut blocks: Vec<AddressBlock> = parsed
        .iter()
        .map(|block| AddressBlock {
            offset: block.offset,
            size: block.size,
            usage: block.usage,
            protection: block.protection.unwrap_or(Protection::Any),
        })
        .collect();
    blocks.sort_by_key(|block| block.offset);
    blocks
}

fn process_interrupts(parsed: &[svd::Interrupt]) -> Vec<Interrupt> {
    let mut interrupts: Vec<Interrupt> = parsed
        .iter()
        .map(|interrupt| Interrupt {
            name: interrupt.name.clone(),
            description: interrupt.description.clone(),
            value: interrupt.value,
        })
        .collect();
    interrupts.sort_by_key(|interrupt| interrupt.value);
    interrupts
}

fn process_write_constraint(parsed: Option<&svd::WriteConstraint>) -> Option<WriteConstraint> {
    parsed.map(|constraint| WriteConstraint {
        write_as_read: constraint.write_as_read,
        use_enumerated_values: constraint.use_enumerated_values,
        range: constraint.range.as_ref().map(|range| (range.minimum, range.maximum)),
    })
}

/// Computes `(lsb, msb)` from whichever of the three encodings the parsed
/// field carries, falling back to the base for missing halves. An msb below
/// the lsb is warned about and swapped.
fn field_bit_range(
    parsed: &svd::Field,
    base: Option<&ir::Field>,
    path: &str,
    diag: &mut Diagnostics,
) -> Result<(u32, u32), Error> {
    let mut range: Option<(u32, u32)> = None;

    if parsed.bit_offset.is_some() || parsed.bit_width.is_some() {
        let offset = parsed.bit_offset.or(base.map(|base| base.lsb));
        let width = parsed.bit_width.or(base.map(|base| base.msb - base.lsb + 1));
        if let (Some(offset), Some(width)) = (offset, width) {
            range = Some((offset, offset + width.max(1) - 1));
        }
    }

    if parsed.lsb.is_some() || parsed.msb.is_some() {
        let lsb = parsed.lsb.or(base.map(|base| base.lsb));
        let msb = parsed.msb.or(base.map(|base| base.msb));
        if let (Some(lsb), Some(msb)) = (lsb, msb) {
            range = Some((lsb, msb));
        }
    }

    if let Some(text) = &parsed.bit_range {
        range = Some(parse_bit_range(text, &parsed.name)?);
    }

    if range.is_none() {
        range = base.map(|base| (base.lsb, base.msb));
    }

    let Some((lsb, msb)) = range else {
        return Err(Error::MissingBitRange { field: parsed.name.clone() });
    };
    if msb < lsb {
        diag.push(
            WarningKind::SwappedBitRange,
            path,
            format!("msb {msb} is smaller than lsb {lsb}; swapping"),
        );
        return Ok((msb, lsb));
    }
    Ok((lsb, msb))
}

fn parse_bit_range(text: &str, field: &str) -> Result<(u32, u32), Error> {
    let error = || Error::InvalidBitRange { field: field.to_string(), text: text.to_string() };
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(error)?;
    let (msb, lsb) = inner.split_once(':').ok_or_else(error)?;
    let msb: u32 = msb.trim().parse().map_err(|_| error())?;
    let lsb: u32 = lsb.trim().parse().map_err(|_| error())?;
    Ok((lsb, msb))
}

/// Dim-group values merged from the element and its base, ready for name
/// expansion.
pub(crate) struct DimRequest<'a> {
    pub(crate) name: &'a str,
    pub(crate) display_name: Option<&'a str>,
    pub(crate) dim: Option<u32>,
    pub(crate) dim_index: Option<&'a str>,
    pub(crate) kind: DimKind,
}

/// Resolves the dim template of an element, if any.
///
/// Returns `(is_template, expansion)`. A dim without a marker in the name
/// demotes the element to non-dim with a warning; a marker without a dim is
/// fatal.
pub(crate) fn extract_dimension(
    request: DimRequest<'_>,
    path: &str,
    diag: &mut Diagnostics,
) -> Result<(bool, DimExpansion), Error> {
    let mut dim = request.dim;
    if dim.is_none() && request.name.contains("%s") {
        return Err(Error::DimTemplate {
            name: request.name.to_string(),
            detail: "name carries a `%s` marker but dim is not set".to_string(),
        });
    }
    if dim.is_none() && request.display_name.is_some_and(|display| display.contains("%s")) {
        return Err(Error::DimTemplate {
            name: request.name.to_string(),
            detail: "display name carries a `%s` marker but dim is not set".to_string(),
        });
    }
    if dim.is_some() && !request.name.contains("%s") {
        diag.push(
            WarningKind::DimWithoutMarker,
            path,
            format!("dim is set but name `{}` carries no `%s` marker", request.name),
        );
        dim = None;
    }
    let expansion = dim::expand_names(
        request.name,
        request.display_name,
        dim,
        request.dim_index,
        request.kind,
    )?;
    Ok((dim.is_some(), expansion))
}

/// Builds a finalized enumerated-value container from its parsed record,
/// expanding wildcards and the `isDefault` entry over the field's domain.
pub(crate) fn process_enumerated_values(
    parsed: &svd::EnumeratedValues,
    lsb: u32,
    msb: u32,
    path: &str,
    diag: &mut Diagnostics,
) -> Result<EnumeratedValueContainer, Error> {
    let width = msb - lsb + 1;
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_values: HashSet<u64> = HashSet::new();
    let mut default: Option<(String, Option<String>)> = None;
    let mut values: Vec<EnumeratedValue> = Vec::new();

    for entry in &parsed.values {
        if entry.name.eq_ignore_ascii_case("reserved") {
            diag.push(
                WarningKind::ReservedName,
                path,
                "enumerated value named `reserved` is ignored",
            );
            continue;
        }

        let is_default = entry.is_default.unwrap_or(false);
        let mut literal = entry.value.as_deref();
        if is_default && literal.is_some() {
            diag.push(
                WarningKind::DefaultWithValue,
                path,
                format!("default enumerated value `{}` carries a value; value discarded", entry.name),
            );
            literal = None;
        }
        if is_default {
            if default.is_some() {
                return Err(Error::MultipleDefaults { field: path.to_string() });
            }
            if seen_names.insert(entry.name.clone()) {
                default = Some((entry.name.clone(), entry.description.clone()));
            }
            continue;
        }

        // Neither a value nor a default marker: nothing to describe.
        let Some(literal) = literal else {
            continue;
        };
        let (concrete, had_wildcard) = convert_enumerated_value(literal)?;
        for value in concrete {
            let name = if had_wildcard {
                format!("{}_{}", entry.name, value)
            } else {
                entry.name.clone()
            };
            if !seen_names.insert(name.clone()) {
                diag.push(
                    WarningKind::DuplicateEnumValue,
                    path,
                    format!("duplicate enumerated value name `{name}`; ignoring"),
                );
                continue;
            }
            if !seen_values.insert(value) {
                diag.push(
                    WarningKind::DuplicateEnumValue,
                    path,
                    format!("duplicate enumerated value {value} under name `{name}`; ignoring"),
                );
                continue;
            }
            values.push(EnumeratedValue { name, description: entry.description.clone(), value });
        }
    }

    if let Some((default_name, default_description)) = default {
        if width > MAX_DEFAULT_FILL_BITS {
            diag.push(
                WarningKind::WideDefaultDomain,
                path,
                format!("default expansion skipped for a {width}-bit field"),
            );
        } else {
            for value in 0..(1u64 << width) {
                if !seen_values.contains(&value) {
                    values.push(EnumeratedValue {
                        name: format!("{default_name}_{value}"),
                        description: default_description.clone(),
                        value,
                    });
                }
            }
        }
    }

    values.sort_by_key(|value| value.value);
    Ok(EnumeratedValueContainer {
        name: parsed.name.clone(),
        header_enum_name: parsed.header_enum_name.clone(),
        usage: parsed.usage.unwrap_or(EnumUsage::ReadWrite),
        values,
    })
}

/// Parses an enumerated-value literal into its concrete values. Binary
/// literals may carry `x` wildcard bits, which enumerate both settings.
fn convert_enumerated_value(literal: &str) -> Result<(Vec<u64>, bool), Error> {
    let text = literal.trim().to_ascii_lowercase().replace('#', "0b");
    let error = || Error::InvalidEnumValue { text: literal.to_string() };
    if let Some(binary) = text.strip_prefix("0b") {
        if binary.contains('x') {
            let mut values = vec![0u64];
            for bit in binary.chars() {
                let next: Vec<u64> = match bit {
                    '0' => values.iter().map(|value| value << 1).collect(),
                    '1' => values.iter().map(|value| (value << 1) | 1).collect(),
                    'x' => values
                        .iter()
                        .flat_map(|value| [value << 1, (value << 1) | 1])
                        .collect(),
                    _ => return Err(error()),
                };
                values = next;
            }
            return Ok((values, true));
        }
        let value = u64::from_str_radix(binary, 2).map_err(|_| error())?;
        Ok((vec![value], false))
    } else if let Some(hex) = text.strip_prefix("0x") {
        let value = u64::from_str_radix(hex, 16).map_err(|_| error())?;
        Ok((vec![value], false))
    } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        Ok((vec![text.parse().map_err(|_| error())?], false))
    } else {
        Err(error())
    }
}

/// Top-down propagation of the register-property group: device to
/// peripherals, then through clusters and registers, finally the access and
/// write-constraint of fields.
pub(crate) fn inherit_properties(device: &mut ir::Device) {
    for peripheral in &mut device.peripherals {
        peripheral.size = peripheral.size.or(Some(device.size));
        peripheral.access = peripheral.access.or(Some(device.access));
        peripheral.protection = peripheral.protection.or(Some(device.protection));
        peripheral.reset_value = peripheral.reset_value.or(Some(device.reset_value));
        peripheral.reset_mask = peripheral.reset_mask.or(Some(device.reset_mask));
        inherit_children(
            &mut peripheral.children,
            peripheral.size,
            peripheral.access,
            peripheral.protection,
            peripheral.reset_value,
            peripheral.reset_mask,
        );
    }
}

fn inherit_children(
    children: &mut [ir::RegisterCluster],
    size: Option<u32>,
    access: Option<Access>,
    protection: Option<Protection>,
    reset_value: Option<u64>,
    reset_mask: Option<u64>,
) {
    for child in children {
        match child {
            ir::RegisterCluster::Cluster(cluster) => {
                cluster.size = cluster.size.or(size);
                cluster.access = cluster.access.or(access);
                cluster.protection = cluster.protection.or(protection);
                cluster.reset_value = cluster.reset_value.or(reset_value);
                cluster.reset_mask = cluster.reset_mask.or(reset_mask);
                inherit_children(
                    &mut cluster.children,
                    cluster.size,
                    cluster.access,
                    cluster.protection,
                    cluster.reset_value,
                    cluster.reset_mask,
                );
            }
            ir::RegisterCluster::Register(register) => {
                register.size = register.size.or(size);
                register.access = register.access.or(access);
                register.protection = register.protection.or(protection);
                register.reset_value = register.reset_value.or(reset_value);
                register.reset_mask = register.reset_mask.or(reset_mask);
                for field in &mut register.fields {
                    field.access = field.access.or(register.access);
                    field.write_constraint =
                        field.write_constraint.take().or_else(|| register.write_constraint.clone());
                }
            }
        }
    }
}
