//! Field bit-range encodings, access domains, and validation.

mod common;

use common::{peripheral, process, process_err};
use svd_resolve::types::Access;
use svd_resolve::{Error, WarningKind};

#[test]
fn three_bit_range_encodings_agree() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields>
               <field><name>LOW</name><bitOffset>0</bitOffset><bitWidth>4</bitWidth></field>
               <field><name>MID</name><lsb>4</lsb><msb>7</msb></field>
               <field><name>HIGH</name><bitRange>[11:8]</bitRange></field>
             </fields>
           </register>"#,
    ));

    let ctrl = device.periph("PeripheralA").unwrap().reg("CTRL").unwrap();
    let layout: Vec<(&str, u32, u32)> =
        ctrl.fields.iter().map(|field| (field.name.as_str(), field.lsb, field.msb)).collect();
    assert_eq!(layout, [("LOW", 0, 3), ("MID", 4, 7), ("HIGH", 8, 11)]);
}

#[test]
fn swapped_bit_range_is_corrected_with_a_warning() {
    let (device, diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields><field><name>ODD</name><bitRange>[3:5]</bitRange></field></fields>
           </register>"#,
    ));

    let ctrl = device.periph("PeripheralA").unwrap().reg("CTRL").unwrap();
    let odd = ctrl.field("ODD").unwrap();
    assert_eq!((odd.lsb, odd.msb), (3, 5));
    assert_eq!(diag.of_kind(WarningKind::SwappedBitRange).count(), 1);
}

#[test]
fn malformed_bit_range_is_fatal() {
    let error = process_err(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields><field><name>BAD</name><bitRange>11:8</bitRange></field></fields>
           </register>"#,
    ));
    assert!(matches!(error, Error::InvalidBitRange { .. }), "{error}");
}

#[test]
fn field_without_any_encoding_is_fatal() {
    let error = process_err(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields><field><name>NOWHERE</name></field></fields>
           </register>"#,
    ));
    assert!(matches!(error, Error::MissingBitRange { .. }), "{error}");
}

#[test]
fn overlap_within_one_access_domain_is_fatal() {
    let error = process_err(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields>
               <field><name>AAA</name><bitOffset>0</bitOffset><bitWidth>4</bitWidth></field>
               <field><name>BBB</name><bitOffset>3</bitOffset><bitWidth>4</bitWidth></field>
             </fields>
           </register>"#,
    ));
    assert!(matches!(error, Error::FieldAccessOverlap { .. }), "{error}");
}

#[test]
fn read_only_and_write_only_fields_may_share_bits() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>FIFO</name>
             <addressOffset>0x0</addressOffset>
             <fields>
               <field><name>RDATA</name><bitOffset>0</bitOffset><bitWidth>8</bitWidth><access>read-only</access></field>
               <field><name>WDATA</name><bitOffset>0</bitOffset><bitWidth>8</bitWidth><access>write-only</access></field>
             </fields>
           </register>"#,
    ));

    let fifo = device.periph("PeripheralA").unwrap().reg("FIFO").unwrap();
    assert_eq!(fifo.fields.len(), 2);
    assert_eq!(fifo.field("RDATA").unwrap().access, Access::ReadOnly);
    assert_eq!(fifo.field("WDATA").unwrap().access, Access::WriteOnly);
}

#[test]
fn field_beyond_register_size_warns_but_survives() {
    let (device, diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>NARROW</name>
             <addressOffset>0x0</addressOffset>
             <size>8</size>
             <fields><field><name>WIDE</name><bitOffset>4</bitOffset><bitWidth>8</bitWidth></field></fields>
           </register>"#,
    ));

    let narrow = device.periph("PeripheralA").unwrap().reg("NARROW").unwrap();
    assert_eq!(narrow.fields.len(), 1);
    assert_eq!(diag.of_kind(WarningKind::OversizedField).count(), 1);
}

#[test]
fn reserved_fields_are_dropped_with_a_warning() {
    let (device, diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields>
               <field><name>EN</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field>
               <field><name>Reserved</name><bitOffset>1</bitOffset><bitWidth>7</bitWidth></field>
             </fields>
           </register>"#,
    ));

    let ctrl = device.periph("PeripheralA").unwrap().reg("CTRL").unwrap();
    assert_eq!(ctrl.fields.len(), 1);
    assert_eq!(ctrl.fields[0].name, "EN");
    assert_eq!(diag.of_kind(WarningKind::ReservedName).count(), 1);
}

#[test]
fn duplicate_field_names_are_fatal() {
    let error = process_err(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>CTRL</name>
             <addressOffset>0x0</addressOffset>
             <fields>
               <field><name>EN</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field>
               <field><name>EN</name><bitOffset>1</bitOffset><bitWidth>1</bitWidth></field>
             </fields>
           </register>"#,
    ));
    assert!(matches!(error, Error::DuplicateName { kind: "field", .. }), "{error}");
}

#[test]
fn field_access_falls_back_to_the_register() {
    let (device, _diag) = process(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>STAT</name>
             <addressOffset>0x0</addressOffset>
             <access>read-only</access>
             <fields><field><name>BUSY</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field></fields>
           </register>"#,
    ));

    let stat = device.periph("PeripheralA").unwrap().reg("STAT").unwrap();
    assert_eq!(stat.field("BUSY").unwrap().access, Access::ReadOnly);
}
