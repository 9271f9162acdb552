//! Validation and finalization of the intermediate tree.
//!
//! Runs bottom-up: registers validate their fields, clusters their
//! children, peripherals their address map, the device its peripherals.
//! Uniqueness violations, access-domain overlaps, and unsupported sizes
//! abort; address overlaps, misalignments, and droppable oddities are
//! reported through the warning sink.

use crate::device::{
    Cluster, Device, EnumeratedValueContainer, Field, Peripheral, Register, RegisterCluster,
};
use crate::diag::{Diagnostics, WarningKind};
use crate::error::Error;
use crate::ir;
use crate::types::{Access, Protection};
use indexmap::IndexMap;
use std::collections::HashSet;

pub(crate) fn finalize(device: ir::Device, diag: &mut Diagnostics) -> Result<Device, Error> {
    let mut peripherals: Vec<Peripheral> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for peripheral in &device.peripherals {
        let Some(peripheral) = finalize_peripheral(peripheral, diag)? else {
            continue;
        };
        if !seen.insert(peripheral.name.clone()) {
            return Err(Error::DuplicateName { kind: "peripheral", name: peripheral.name });
        }
        peripherals.push(peripheral);
    }
    peripherals.sort_by(|a, b| {
        (a.base_address, a.name.as_str()).cmp(&(b.base_address, b.name.as_str()))
    });
    check_peripheral_overlaps(&peripherals, diag);

    Ok(Device {
        schema_version: device.schema_version,
        vendor: device.vendor,
        vendor_id: device.vendor_id,
        name: device.name,
        series: device.series,
        version: device.version,
        description: device.description,
        license_text: device.license_text,
        cpu: device.cpu,
        header_system_filename: device.header_system_filename,
        header_definitions_prefix: device.header_definitions_prefix,
        address_unit_bits: device.address_unit_bits,
        width: device.width,
        size: device.size,
        access: device.access,
        protection: device.protection,
        reset_value: device.reset_value,
        reset_mask: device.reset_mask,
        peripherals,
    })
}

fn finalize_peripheral(
    peripheral: &ir::Peripheral,
    diag: &mut Diagnostics,
) -> Result<Option<Peripheral>, Error> {
    let path = peripheral.name.clone();
    let children = finalize_children(&peripheral.children, peripheral.base_address, &path, diag)?;
    if children.is_empty() {
        diag.push(
            WarningKind::EmptyElement,
            &path,
            "peripheral has no registers or clusters and is dropped",
        );
        return Ok(None);
    }

    if peripheral.base_address % 4 != 0 {
        diag.push(WarningKind::UnalignedBase, &path, "base address is not 4-byte aligned");
    }

    let size = peripheral.size.ok_or_else(|| Error::MissingSize { name: path.clone() })?;
    if size % 8 != 0 {
        diag.push(
            WarningKind::SizeNotByteMultiple,
            &path,
            format!("size {size} is not a multiple of 8; peripheral is dropped"),
        );
        return Ok(None);
    }

    if peripheral.address_blocks.is_empty() {
        return Err(Error::MissingAddressBlocks { name: path });
    }
    for pair in peripheral.address_blocks.windows(2) {
        if pair[1].offset < pair[0].offset + pair[0].size {
            diag.push(
                WarningKind::AddressBlockOverlap,
                &path,
                format!(
                    "address block at offset {:#x} overlaps the block at offset {:#x}",
                    pair[1].offset, pair[0].offset
                ),
            );
        }
    }

    let end_address_specified = peripheral
        .address_blocks
        .iter()
        .map(|block| peripheral.base_address + block.offset + block.size - 1)
        .max()
        .unwrap_or(peripheral.base_address);
    let size_specified = peripheral.address_blocks.iter().map(|block| block.size).sum();
    let end_address_effective = children
        .iter()
        .map(|child| child.base_address() + child.byte_size() - 1)
        .max()
        .unwrap_or(peripheral.base_address);
    let size_effective = end_address_effective - peripheral.base_address + 1;

    Ok(Some(Peripheral {
        dim: peripheral.dim,
        dim_increment: peripheral.dim_increment,
        dim_index: peripheral.dim_index.clone(),
        dim_name: peripheral.dim_name.clone(),
        dim_array_index: peripheral.dim_array_index.clone(),
        name: peripheral.name.clone(),
        version: peripheral.version.clone(),
        description: peripheral.description.clone(),
        alternate_peripheral: peripheral.alternate_peripheral.clone(),
        group_name: peripheral.group_name.clone(),
        prepend_to_name: peripheral.prepend_to_name.clone(),
        append_to_name: peripheral.append_to_name.clone(),
        header_struct_name: peripheral.header_struct_name.clone(),
        disable_condition: peripheral.disable_condition.clone(),
        base_address: peripheral.base_address,
        size,
        access: peripheral.access.unwrap_or(Access::ReadWrite),
        protection: peripheral.protection.unwrap_or(Protection::Any),
        reset_value: peripheral.reset_value.unwrap_or(0),
        reset_mask: peripheral.reset_mask.unwrap_or(0xFFFF_FFFF),
        address_blocks: peripheral.address_blocks.clone(),
        interrupts: peripheral.interrupts.clone(),
        registers: children,
        end_address_specified,
        end_address_effective,
        size_specified,
        size_effective,
    }))
}

fn finalize_children(
    children: &[ir::RegisterCluster],
    parent_base: u64,
    path: &str,
    diag: &mut Diagnostics,
) -> Result<Vec<RegisterCluster>, Error> {
    let mut finalized: Vec<RegisterCluster> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for child in children {
        let Some(child) = finalize_register_cluster(child, parent_base, path, diag)? else {
            continue;
        };
        let key = match &child {
            RegisterCluster::Register(register) => match &register.alternate_group {
                Some(group) => format!("{}_{}", register.name, group),
                None => register.name.clone(),
            },
            RegisterCluster::Cluster(cluster) => cluster.name.clone(),
        };
        if !seen.insert(key.clone()) {
            return Err(Error::DuplicateName { kind: "register/cluster", name: key });
        }
        finalized.push(child);
    }

    finalized.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    check_child_overlaps(&finalized, path, diag);
    Ok(finalized)
}

type ChildSortKey<'a> = (u64, (bool, &'a str), &'a str);

fn sort_key(child: &RegisterCluster) -> ChildSortKey<'_> {
    let alternate_group = match child {
        RegisterCluster::Register(register) => register.alternate_group.as_deref(),
        RegisterCluster::Cluster(_) => None,
    };
    let group_key = match alternate_group {
        Some(group) => (true, group),
        None => (false, ""),
    };
    (child.base_address(), group_key, child.name())
}

fn finalize_register_cluster(
    child: &ir::RegisterCluster,
    parent_base: u64,
    parent_path: &str,
    diag: &mut Diagnostics,
) -> Result<Option<RegisterCluster>, Error> {
    let path = format!("{parent_path}.{}", child.name());
    let effective_base = parent_base + child.address_offset();

    let (name, size, address_offset) = match child {
        ir::RegisterCluster::Register(register) => {
            (register.name.clone(), register.size, register.address_offset)
        }
        ir::RegisterCluster::Cluster(cluster) => {
            (cluster.name.clone(), cluster.size, cluster.address_offset)
        }
    };
    let size = size.ok_or(Error::MissingSize { name })?;
    if size % 8 != 0 {
        diag.push(
            WarningKind::SizeNotByteMultiple,
            &path,
            format!("size {size} is not a multiple of 8; element is dropped"),
        );
        return Ok(None);
    }
    let bytes = u64::from(size) / 8;
    if !matches!(bytes, 1 | 2 | 4 | 8 | 16) {
        return Err(Error::UnsupportedRegisterSize { name: child.name().to_string(), bytes });
    }
    let alignment = bytes.min(4);
    if address_offset % alignment != 0 {
        diag.push(
            WarningKind::UnalignedOffset,
            &path,
            format!("offset {address_offset:#x} is not aligned to {alignment} bytes"),
        );
    }

    match child {
        ir::RegisterCluster::Cluster(cluster) => {
            let children = finalize_children(&cluster.children, effective_base, &path, diag)?;
            if children.is_empty() {
                diag.push(
                    WarningKind::EmptyElement,
                    &path,
                    "cluster has no registers and is dropped",
                );
                return Ok(None);
            }
            let end_address = children
                .iter()
                .map(|child| child.base_address() + child.byte_size() - 1)
                .max()
                .unwrap_or(effective_base);
            Ok(Some(RegisterCluster::Cluster(Cluster {
                dim: cluster.dim,
                dim_increment: cluster.dim_increment,
                dim_index: cluster.dim_index.clone(),
                dim_name: cluster.dim_name.clone(),
                dim_array_index: cluster.dim_array_index.clone(),
                name: cluster.name.clone(),
                description: cluster.description.clone(),
                alternate_cluster: cluster.alternate_cluster.clone(),
                header_struct_name: cluster.header_struct_name.clone(),
                address_offset: cluster.address_offset,
                size,
                access: cluster.access.unwrap_or(Access::ReadWrite),
                protection: cluster.protection.unwrap_or(Protection::Any),
                reset_value: cluster.reset_value.unwrap_or(0),
                reset_mask: cluster.reset_mask.unwrap_or(0xFFFF_FFFF),
                base_address: effective_base,
                end_address,
                byte_size: end_address - effective_base + 1,
                registers: children,
            })))
        }
        ir::RegisterCluster::Register(register) => {
            if register.name.eq_ignore_ascii_case("reserved") {
                diag.push(
                    WarningKind::ReservedName,
                    &path,
                    "register named `reserved` is dropped",
                );
                return Ok(None);
            }
            if register.alternate_register.is_some() && register.alternate_group.is_some() {
                return Err(Error::ConflictingAlternates { name: register.name.clone() });
            }
            let fields = finalize_fields(&register.fields, size, &path, diag)?;
            Ok(Some(RegisterCluster::Register(Register {
                dim: register.dim,
                dim_increment: register.dim_increment,
                dim_index: register.dim_index.clone(),
                dim_name: register.dim_name.clone(),
                dim_array_index: register.dim_array_index.clone(),
                name: register.name.clone(),
                display_name: register.display_name.clone(),
                description: register.description.clone(),
                alternate_group: register.alternate_group.clone(),
                alternate_register: register.alternate_register.clone(),
                address_offset: register.address_offset,
                size,
                access: register.access.unwrap_or(Access::ReadWrite),
                protection: register.protection.unwrap_or(Protection::Any),
                reset_value: register.reset_value.unwrap_or(0),
                reset_mask: register.reset_mask.unwrap_or(0xFFFF_FFFF),
                base_address: effective_base,
                data_type: register.data_type,
                modified_write_values: register.modified_write_values,
                write_constraint: register.write_constraint.clone(),
                read_action: register.read_action,
                fields,
            })))
        }
    }
}

fn finalize_fields(
    fields: &[ir::Field],
    register_size: u32,
    path: &str,
    diag: &mut Diagnostics,
) -> Result<Vec<Field>, Error> {
    let mut finalized: Vec<Field> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for field in fields {
        if field.name.eq_ignore_ascii_case("reserved") {
            diag.push(
                WarningKind::ReservedName,
                format!("{path}.{}", field.name),
                "field named `reserved` is dropped",
            );
            continue;
        }
        if !seen.insert(field.name.clone()) {
            return Err(Error::DuplicateName { kind: "field", name: field.name.clone() });
        }
        finalized.push(Field {
            dim: field.dim,
            dim_increment: field.dim_increment,
            dim_index: field.dim_index.clone(),
            dim_name: field.dim_name.clone(),
            dim_array_index: field.dim_array_index.clone(),
            name: field.name.clone(),
            description: field.description.clone(),
            lsb: field.lsb,
            msb: field.msb,
            access: field.access.unwrap_or(Access::ReadWrite),
            modified_write_values: field.modified_write_values,
            write_constraint: field.write_constraint.clone(),
            read_action: field.read_action,
            enumerated_value_containers: finalize_containers(
                &field.enumerated_value_containers,
                field.msb - field.lsb + 1,
                &format!("{path}.{}", field.name),
                diag,
            ),
        });
    }
    finalized.sort_by_key(|field| field.lsb);

    // Overlaps are only fatal within one access domain; a read-only and a
    // write-only field may legitimately share bits.
    let mut read_fields: Vec<(u32, u32, String)> = Vec::new();
    let mut write_fields: Vec<(u32, u32, String)> = Vec::new();
    for field in &finalized {
        if field.msb >= register_size {
            diag.push(
                WarningKind::OversizedField,
                format!("{path}.{}", field.name),
                format!("msb {} exceeds the register size of {register_size} bits", field.msb),
            );
        }
        if field.access.is_readable() {
            for (lsb, msb, name) in &read_fields {
                if field.lsb <= *msb && field.msb >= *lsb {
                    return Err(Error::FieldAccessOverlap {
                        field: field.name.clone(),
                        other: name.clone(),
                        domain: "read",
                    });
                }
            }
            read_fields.push((field.lsb, field.msb, field.name.clone()));
        }
        if field.access.is_writable() {
            for (lsb, msb, name) in &write_fields {
                if field.lsb <= *msb && field.msb >= *lsb {
                    return Err(Error::FieldAccessOverlap {
                        field: field.name.clone(),
                        other: name.clone(),
                        domain: "write",
                    });
                }
            }
            write_fields.push((field.lsb, field.msb, field.name.clone()));
        }
    }
    Ok(finalized)
}

fn finalize_containers(
    containers: &[EnumeratedValueContainer],
    width: u32,
    path: &str,
    diag: &mut Diagnostics,
) -> Vec<EnumeratedValueContainer> {
    let max_value = match 1u64.checked_shl(width) {
        Some(limit) => limit - 1,
        None => u64::MAX,
    };
    let mut finalized: Vec<EnumeratedValueContainer> = containers
        .iter()
        .map(|container| {
            let mut container = container.clone();
            container.values.retain(|value| {
                if value.value > max_value {
                    diag.push(
                        WarningKind::OversizedValue,
                        path,
                        format!(
                            "enumerated value `{}` ({}) exceeds the {width}-bit field range and is dropped",
                            value.name, value.value
                        ),
                    );
                    false
                } else {
                    true
                }
            });
            container
        })
        .collect();
    finalized.sort_by(|a, b| {
        (a.usage.as_str(), a.values.len()).cmp(&(b.usage.as_str(), b.values.len()))
    });
    finalized
}

/// Transitive closure of the alternate-* relation around `start`, walking
/// both directions: the named primary and everything naming it.
fn alternate_closure(
    start: &str,
    alternates: &IndexMap<String, Option<String>>,
) -> HashSet<String> {
    let mut allowed: HashSet<String> = HashSet::new();
    let mut stack = vec![start.to_string()];
    while let Some(current) = stack.pop() {
        if !allowed.insert(current.clone()) {
            continue;
        }
        for (name, alternate) in alternates {
            if alternate.as_deref() == Some(current.as_str()) {
                stack.push(name.clone());
            }
        }
        if let Some(Some(primary)) = alternates.get(&current) {
            stack.push(primary.clone());
        }
    }
    allowed
}

fn warn_overlap(
    path: &str,
    kind: &str,
    name: &str,
    other: &str,
    allowed: &HashSet<String>,
    other_alternate: Option<&str>,
    diag: &mut Diagnostics,
) {
    if !allowed.is_empty() {
        if !allowed.contains(other) {
            diag.push(
                WarningKind::AddressOverlap,
                path,
                format!("{kind} `{name}` overlaps `{other}`, which is not among its alternates"),
            );
        }
    } else if other_alternate != Some(name) {
        diag.push(
            WarningKind::AddressOverlap,
            path,
            format!("{kind} `{name}` overlaps `{other}`"),
        );
    }
}

fn check_peripheral_overlaps(peripherals: &[Peripheral], diag: &mut Diagnostics) {
    let alternates: IndexMap<String, Option<String>> = peripherals
        .iter()
        .map(|peripheral| (peripheral.name.clone(), peripheral.alternate_peripheral.clone()))
        .collect();
    let mut effective: Vec<(u64, &str)> = Vec::new();
    let mut specified: Vec<(u64, &str)> = Vec::new();
    for peripheral in peripherals {
        let allowed = peripheral
            .alternate_peripheral
            .as_deref()
            .map(|alternate| alternate_closure(alternate, &alternates))
            .unwrap_or_default();
        for &(end, other) in &effective {
            if peripheral.base_address <= end {
                let other_alternate = alternates.get(other).and_then(|a| a.as_deref());
                warn_overlap(
                    &peripheral.name,
                    "peripheral",
                    &peripheral.name,
                    other,
                    &allowed,
                    other_alternate,
                    diag,
                );
            }
        }
        for &(end, other) in &specified {
            if peripheral.base_address <= end {
                let other_alternate = alternates.get(other).and_then(|a| a.as_deref());
                warn_overlap(
                    &peripheral.name,
                    "peripheral address blocks of",
                    &peripheral.name,
                    other,
                    &allowed,
                    other_alternate,
                    diag,
                );
            }
        }
        effective.push((peripheral.end_address_effective, &peripheral.name));
        specified.push((peripheral.end_address_specified, &peripheral.name));
    }
}

fn check_child_overlaps(children: &[RegisterCluster], path: &str, diag: &mut Diagnostics) {
    let register_alternates: IndexMap<String, Option<String>> = children
        .iter()
        .filter_map(|child| match child {
            RegisterCluster::Register(register) => {
                Some((register.name.clone(), register.alternate_register.clone()))
            }
            RegisterCluster::Cluster(_) => None,
        })
        .collect();
    let cluster_alternates: IndexMap<String, Option<String>> = children
        .iter()
        .filter_map(|child| match child {
            RegisterCluster::Cluster(cluster) => {
                Some((cluster.name.clone(), cluster.alternate_cluster.clone()))
            }
            RegisterCluster::Register(_) => None,
        })
        .collect();

    let mut intervals: Vec<(u64, &str)> = Vec::new();
    for child in children {
        let (kind, allowed, alternates, end) = match child {
            RegisterCluster::Register(register) => {
                // Alternate-group registers describe views of other
                // registers; they stay out of the interval checks.
                if register.alternate_group.is_some() {
                    continue;
                }
                let allowed = register
                    .alternate_register
                    .as_deref()
                    .map(|alternate| alternate_closure(alternate, &register_alternates))
                    .unwrap_or_default();
                let end = register.base_address + u64::from(register.size) / 8 - 1;
                ("register", allowed, &register_alternates, end)
            }
            RegisterCluster::Cluster(cluster) => {
                let allowed = cluster
                    .alternate_cluster
                    .as_deref()
                    .map(|alternate| alternate_closure(alternate, &cluster_alternates))
                    .unwrap_or_default();
                ("cluster", allowed, &cluster_alternates, cluster.end_address)
            }
        };
        for &(other_end, other) in &intervals {
            if child.base_address() <= other_end {
                let other_alternate = alternates.get(other).and_then(|a| a.as_deref());
                warn_overlap(path, kind, child.name(), other, &allowed, other_alternate, diag);
            }
        }
        intervals.push((end, child.name()));
    }
}
