//! Dim-template expansion of peripherals, registers, and fields.

mod common;

use common::{peripheral, process, process_err};
use svd_resolve::{Error, WarningKind};

#[test]
fn register_list_expands_with_dim_index() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>REG%s</name>
             <dim>3</dim>
             <dimIndex>A,B,C</dimIndex>
             <dimIncrement>4</dimIncrement>
             <addressOffset>0x0</addressOffset>
           </register>"#,
    ));

    let a = device.periph("PeripheralA").unwrap();
    let layout: Vec<(&str, u64)> =
        a.registers.iter().map(|child| (child.name(), child.address_offset())).collect();
    assert_eq!(layout, [("REGA", 0x0), ("REGB", 0x4), ("REGC", 0x8)]);
}

#[test]
fn register_array_expands_numbered() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>REG[%s]</name>
             <dim>2</dim>
             <dimIncrement>4</dimIncrement>
             <addressOffset>0x10</addressOffset>
           </register>"#,
    ));

    let a = device.periph("PeripheralA").unwrap();
    let layout: Vec<(&str, u64)> =
        a.registers.iter().map(|child| (child.name(), child.address_offset())).collect();
    assert_eq!(layout, [("REG0", 0x10), ("REG1", 0x14)]);
}

#[test]
fn numeric_range_dim_index() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CH%sCFG</name>
             <dim>3</dim>
             <dimIndex>2-4</dimIndex>
             <dimIncrement>4</dimIncrement>
             <addressOffset>0x0</addressOffset>
           </register>"#,
    ));

    let a = device.periph("PeripheralA").unwrap();
    let names: Vec<&str> = a.registers.iter().map(|child| child.name()).collect();
    assert_eq!(names, ["CH2CFG", "CH3CFG", "CH4CFG"]);
}

#[test]
fn peripheral_array_shifts_base_addresses() {
    let (device, _diag) = process(
        r#"<peripheral>
             <name>TIMER[%s]</name>
             <dim>2</dim>
             <dimIncrement>0x1000</dimIncrement>
             <baseAddress>0x40010000</baseAddress>
             <addressBlock><offset>0x0</offset><size>0x100</size><usage>registers</usage></addressBlock>
             <registers><register><name>CTRL</name><addressOffset>0x0</addressOffset></register></registers>
           </peripheral>"#,
    );

    assert_eq!(device.peripherals.len(), 2);
    let timer0 = device.periph("TIMER0").unwrap();
    let timer1 = device.periph("TIMER1").unwrap();
    assert_eq!(timer0.base_address, 0x4001_0000);
    assert_eq!(timer1.base_address, 0x4001_1000);
    assert_eq!(timer0.registers.len(), 1);
    assert_eq!(timer1.registers.len(), 1);
}

#[test]
fn field_list_shifts_bit_positions() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields>
               <field>
                 <name>EN%s</name>
                 <dim>3</dim>
                 <dimIncrement>2</dimIncrement>
                 <bitOffset>0</bitOffset><bitWidth>2</bitWidth>
               </field>
             </fields>
           </register>"#,
    ));

    let a = device.periph("PeripheralA").unwrap();
    let ctrl = a.reg("CTRL").unwrap();
    let layout: Vec<(&str, u32, u32)> =
        ctrl.fields.iter().map(|field| (field.name.as_str(), field.lsb, field.msb)).collect();
    assert_eq!(layout, [("EN0", 0, 1), ("EN1", 2, 3), ("EN2", 4, 5)]);
}

#[test]
fn display_name_expands_with_the_name() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>DAT%s</name>
             <displayName>Data %s</displayName>
             <dim>2</dim>
             <dimIndex>0-1</dimIndex>
             <dimIncrement>4</dimIncrement>
             <addressOffset>0x0</addressOffset>
           </register>"#,
    ));

    let a = device.periph("PeripheralA").unwrap();
    assert_eq!(a.reg("DAT0").unwrap().display_name.as_deref(), Some("Data 0"));
    assert_eq!(a.reg("DAT1").unwrap().display_name.as_deref(), Some("Data 1"));
}

#[test]
fn dim_without_marker_is_demoted_with_a_warning() {
    let (device, diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>PLAIN</name>
             <dim>3</dim>
             <dimIncrement>4</dimIncrement>
             <addressOffset>0x0</addressOffset>
           </register>"#,
    ));

    let a = device.periph("PeripheralA").unwrap();
    assert_eq!(a.registers.len(), 1);
    assert_eq!(a.registers[0].name(), "PLAIN");
    assert_eq!(diag.of_kind(WarningKind::DimWithoutMarker).count(), 1);
}

#[test]
fn marker_without_dim_is_fatal() {
    let error = process_err(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register><name>REG%s</name><addressOffset>0x0</addressOffset></register>"#,
    ));
    assert!(matches!(error, Error::DimTemplate { .. }), "{error}");
}

#[test]
fn dim_index_length_mismatch_is_fatal() {
    let error = process_err(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>REG%s</name>
             <dim>3</dim>
             <dimIndex>A,B</dimIndex>
             <dimIncrement>4</dimIncrement>
             <addressOffset>0x0</addressOffset>
           </register>"#,
    ));
    assert!(matches!(error, Error::DimTemplate { .. }), "{error}");
}

#[test]
fn field_array_form_is_fatal() {
    let error = process_err(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields>
               <field>
                 <name>EN[%s]</name>
                 <dim>2</dim>
                 <dimIncrement>1</dimIncrement>
                 <bitOffset>0</bitOffset><bitWidth>1</bitWidth>
               </field>
             </fields>
           </register>"#,
    ));
    assert!(matches!(error, Error::DimTemplate { .. }), "{error}");
}

#[test]
fn dim_template_inherits_through_derivation() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>SRC%s</name>
             <dim>2</dim>
             <dimIndex>A,B</dimIndex>
             <dimIncrement>4</dimIncrement>
             <addressOffset>0x0</addressOffset>
           </register>
           <register derivedFrom="SRC%s">
             <name>DST%s</name>
             <addressOffset>0x10</addressOffset>
           </register>"#,
    ));

    let a = device.periph("PeripheralA").unwrap();
    let names: Vec<&str> = a.registers.iter().map(|child| child.name()).collect();
    assert_eq!(names, ["SRCA", "SRCB", "DSTA", "DSTB"]);
    assert_eq!(a.reg("DSTA").unwrap().address_offset, 0x10);
    assert_eq!(a.reg("DSTB").unwrap().address_offset, 0x14);
}
