//! SVD XML emission from the finalized model.
//!
//! The output is a self-contained description: inherited values are written
//! out, templates are gone, so the dim group is never emitted. Reprocessing
//! the output yields an equivalent model.

use crate::device::{
    Cluster, Cpu, Device, EnumeratedValueContainer, Field, Peripheral, Register, RegisterCluster,
    WriteConstraint,
};
use crate::error::Error;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Serializes a finalized device back to SVD XML.
pub fn write_device(device: &Device) -> Result<String, Error> {
    let mut xml = Xml { writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2) };
    xml.writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("device");
    if let Some(schema_version) = &device.schema_version {
        root.push_attribute(("schemaVersion", schema_version.as_str()));
    }
    xml.writer.write_event(Event::Start(root)).map_err(xml_error)?;

    xml.opt_element("vendor", device.vendor.as_deref())?;
    xml.opt_element("vendorID", device.vendor_id.as_deref())?;
    xml.element("name", &device.name)?;
    xml.opt_element("series", device.series.as_deref())?;
    xml.element("version", &device.version)?;
    xml.element("description", &device.description)?;
    xml.opt_element("licenseText", device.license_text.as_deref())?;
    if let Some(cpu) = &device.cpu {
        xml.cpu(cpu)?;
    }
    xml.opt_element("headerSystemFilename", device.header_system_filename.as_deref())?;
    xml.opt_element("headerDefinitionsPrefix", device.header_definitions_prefix.as_deref())?;
    xml.element("addressUnitBits", &device.address_unit_bits.to_string())?;
    xml.element("width", &device.width.to_string())?;
    xml.element("size", &device.size.to_string())?;
    xml.element("access", device.access.as_str())?;
    xml.element("protection", device.protection.as_str())?;
    xml.element("resetValue", &format!("{:#x}", device.reset_value))?;
    xml.element("resetMask", &format!("{:#x}", device.reset_mask))?;

    xml.start("peripherals")?;
    for peripheral in &device.peripherals {
        xml.peripheral(peripheral)?;
    }
    xml.end("peripherals")?;

    xml.end("device")?;
    String::from_utf8(xml.writer.into_inner().into_inner())
        .map_err(|err| Error::Xml(err.to_string()))
}

fn xml_error(err: quick_xml::Error) -> Error {
    Error::Xml(err.to_string())
}

struct Xml {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl Xml {
    fn start(&mut self, name: &str) -> Result<(), Error> {
        self.writer.write_event(Event::Start(BytesStart::new(name))).map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<(), Error> {
        self.writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)
    }

    fn element(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.start(name)?;
        self.writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)?;
        self.end(name)
    }

    fn opt_element(&mut self, name: &str, text: Option<&str>) -> Result<(), Error> {
        match text {
            Some(text) => self.element(name, text),
            None => Ok(()),
        }
    }

    fn bool_element(&mut self, name: &str, value: bool) -> Result<(), Error> {
        self.element(name, if value { "true" } else { "false" })
    }

    fn cpu(&mut self, cpu: &Cpu) -> Result<(), Error> {
        self.start("cpu")?;
        self.element("name", &cpu.name)?;
        self.element("revision", &cpu.revision)?;
        self.element("endian", cpu.endian.as_str())?;
        self.bool_element("mpuPresent", cpu.mpu_present)?;
        self.bool_element("fpuPresent", cpu.fpu_present)?;
        self.bool_element("fpuDP", cpu.fpu_dp)?;
        self.bool_element("dspPresent", cpu.dsp_present)?;
        self.bool_element("icachePresent", cpu.icache_present)?;
        self.bool_element("dcachePresent", cpu.dcache_present)?;
        self.bool_element("itcmPresent", cpu.itcm_present)?;
        self.bool_element("dtcmPresent", cpu.dtcm_present)?;
        self.bool_element("vtorPresent", cpu.vtor_present)?;
        self.element("nvicPrioBits", &cpu.nvic_prio_bits.to_string())?;
        self.bool_element("vendorSystickConfig", cpu.vendor_systick_config)?;
        if let Some(count) = cpu.device_num_interrupts {
            self.element("deviceNumInterrupts", &count.to_string())?;
        }
        if let Some(count) = cpu.sau_num_regions {
            self.element("sauNumRegions", &count.to_string())?;
        }
        if let Some(config) = &cpu.sau_regions_config {
            let mut start = BytesStart::new("sauRegionsConfig");
            start.push_attribute(("enabled", if config.enabled { "true" } else { "false" }));
            start.push_attribute((
                "protectionWhenDisabled",
                config.protection_when_disabled.as_str(),
            ));
            self.writer.write_event(Event::Start(start)).map_err(xml_error)?;
            for region in &config.regions {
                let mut start = BytesStart::new("region");
                start.push_attribute(("enabled", if region.enabled { "true" } else { "false" }));
                if let Some(name) = &region.name {
                    start.push_attribute(("name", name.as_str()));
                }
                self.writer.write_event(Event::Start(start)).map_err(xml_error)?;
                self.element("base", &format!("{:#x}", region.base))?;
                self.element("limit", &format!("{:#x}", region.limit))?;
                self.element("access", region.access.as_str())?;
                self.end("region")?;
            }
            self.end("sauRegionsConfig")?;
        }
        self.end("cpu")
    }

    fn peripheral(&mut self, peripheral: &Peripheral) -> Result<(), Error> {
        self.start("peripheral")?;
        self.element("name", &peripheral.name)?;
        self.opt_element("version", peripheral.version.as_deref())?;
        self.opt_element("description", peripheral.description.as_deref())?;
        self.opt_element("alternatePeripheral", peripheral.alternate_peripheral.as_deref())?;
        self.opt_element("groupName", peripheral.group_name.as_deref())?;
        self.opt_element("prependToName", peripheral.prepend_to_name.as_deref())?;
        self.opt_element("appendToName", peripheral.append_to_name.as_deref())?;
        self.opt_element("headerStructName", peripheral.header_struct_name.as_deref())?;
        self.opt_element("disableCondition", peripheral.disable_condition.as_deref())?;
        self.element("baseAddress", &format!("{:#x}", peripheral.base_address))?;
        self.element("size", &peripheral.size.to_string())?;
        self.element("access", peripheral.access.as_str())?;
        self.element("protection", peripheral.protection.as_str())?;
        self.element("resetValue", &format!("{:#x}", peripheral.reset_value))?;
        self.element("resetMask", &format!("{:#x}", peripheral.reset_mask))?;
        for block in &peripheral.address_blocks {
            self.start("addressBlock")?;
            self.element("offset", &format!("{:#x}", block.offset))?;
            self.element("size", &format!("{:#x}", block.size))?;
            self.element("usage", block.usage.as_str())?;
            self.element("protection", block.protection.as_str())?;
            self.end("addressBlock")?;
        }
        for interrupt in &peripheral.interrupts {
            self.start("interrupt")?;
            self.element("name", &interrupt.name)?;
            self.opt_element("description", interrupt.description.as_deref())?;
            self.element("value", &interrupt.value.to_string())?;
            self.end("interrupt")?;
        }
        self.start("registers")?;
        for child in &peripheral.registers {
            self.register_cluster(child)?;
        }
        self.end("registers")?;
        self.end("peripheral")
    }

    fn register_cluster(&mut self, child: &RegisterCluster) -> Result<(), Error> {
        match child {
            RegisterCluster::Register(register) => self.register(register),
            RegisterCluster::Cluster(cluster) => self.cluster(cluster),
        }
    }

    fn cluster(&mut self, cluster: &Cluster) -> Result<(), Error> {
        self.start("cluster")?;
        self.element("name", &cluster.name)?;
        self.opt_element("description", cluster.description.as_deref())?;
        self.opt_element("alternateCluster", cluster.alternate_cluster.as_deref())?;
        self.opt_element("headerStructName", cluster.header_struct_name.as_deref())?;
        self.element("addressOffset", &format!("{:#x}", cluster.address_offset))?;
        self.element("size", &cluster.size.to_string())?;
        self.element("access", cluster.access.as_str())?;
        self.element("protection", cluster.protection.as_str())?;
        self.element("resetValue", &format!("{:#x}", cluster.reset_value))?;
        self.element("resetMask", &format!("{:#x}", cluster.reset_mask))?;
        for child in &cluster.registers {
            self.register_cluster(child)?;
        }
        self.end("cluster")
    }

    fn register(&mut self, register: &Register) -> Result<(), Error> {
        self.start("register")?;
        self.element("name", &register.name)?;
        self.opt_element("displayName", register.display_name.as_deref())?;
        self.opt_element("description", register.description.as_deref())?;
        self.opt_element("alternateGroup", register.alternate_group.as_deref())?;
        self.opt_element("alternateRegister", register.alternate_register.as_deref())?;
        self.element("addressOffset", &format!("{:#x}", register.address_offset))?;
        self.element("size", &register.size.to_string())?;
        self.element("access", register.access.as_str())?;
        self.element("protection", register.protection.as_str())?;
        self.element("resetValue", &format!("{:#x}", register.reset_value))?;
        self.element("resetMask", &format!("{:#x}", register.reset_mask))?;
        if let Some(data_type) = register.data_type {
            self.element("dataType", data_type.as_str())?;
        }
        self.element("modifiedWriteValues", register.modified_write_values.as_str())?;
        if let Some(constraint) = &register.write_constraint {
            self.write_constraint(constraint)?;
        }
        if let Some(read_action) = register.read_action {
            self.element("readAction", read_action.as_str())?;
        }
        if !register.fields.is_empty() {
            self.start("fields")?;
            for field in &register.fields {
                self.field(field)?;
            }
            self.end("fields")?;
        }
        self.end("register")
    }

    fn field(&mut self, field: &Field) -> Result<(), Error> {
        self.start("field")?;
        self.element("name", &field.name)?;
        self.opt_element("description", field.description.as_deref())?;
        self.element("lsb", &field.lsb.to_string())?;
        self.element("msb", &field.msb.to_string())?;
        self.element("access", field.access.as_str())?;
        self.element("modifiedWriteValues", field.modified_write_values.as_str())?;
        if let Some(constraint) = &field.write_constraint {
            self.write_constraint(constraint)?;
        }
        if let Some(read_action) = field.read_action {
            self.element("readAction", read_action.as_str())?;
        }
        for container in &field.enumerated_value_containers {
            self.container(container)?;
        }
        self.end("field")
    }

    fn container(&mut self, container: &EnumeratedValueContainer) -> Result<(), Error> {
        self.start("enumeratedValues")?;
        self.opt_element("name", container.name.as_deref())?;
        self.opt_element("headerEnumName", container.header_enum_name.as_deref())?;
        self.element("usage", container.usage.as_str())?;
        for value in &container.values {
            self.start("enumeratedValue")?;
            self.element("name", &value.name)?;
            self.opt_element("description", value.description.as_deref())?;
            self.element("value", &value.value.to_string())?;
            self.end("enumeratedValue")?;
        }
        self.end("enumeratedValues")
    }

    fn write_constraint(&mut self, constraint: &WriteConstraint) -> Result<(), Error> {
        self.start("writeConstraint")?;
        if let Some(write_as_read) = constraint.write_as_read {
            self.bool_element("writeAsRead", write_as_read)?;
        }
        if let Some(use_enumerated_values) = constraint.use_enumerated_values {
            self.bool_element("useEnumeratedValues", use_enumerated_values)?;
        }
        if let Some((minimum, maximum)) = constraint.range {
            self.start("range")?;
            self.element("minimum", &minimum.to_string())?;
            self.element("maximum", &maximum.to_string())?;
            self.end("range")?;
        }
        self.end("writeConstraint")
    }
}
