//! Literal forms and required elements of the XML front-end.

mod common;

use common::{device_doc, register};
use proptest::prelude::*;
use svd_resolve::Error;

fn peripheral_with_base(base: &str) -> String {
    format!(
        "<peripheral><name>PeripheralA</name><baseAddress>{base}</baseAddress>\
         <addressBlock><offset>0x0</offset><size>0x1000</size><usage>registers</usage></addressBlock>\
         <registers>{}</registers></peripheral>",
        register("RegisterR", 0x0),
    )
}

fn base_address_of(base_literal: &str) -> u64 {
    let (device, _diag) =
        svd_resolve::process_str(&device_doc(&peripheral_with_base(base_literal))).unwrap();
    device.peripherals[0].base_address
}

#[test]
fn integer_literal_forms() {
    assert_eq!(base_address_of("1073745920"), 0x4000_1000);
    assert_eq!(base_address_of("0x40001000"), 0x4000_1000);
    assert_eq!(base_address_of("0X40001000"), 0x4000_1000);
    assert_eq!(base_address_of("+0x40001000"), 0x4000_1000);
    assert_eq!(base_address_of("#1000000000"), 0x200);
    assert_eq!(base_address_of("0b1000000000"), 0x200);
}

#[test]
fn boolean_literal_forms() {
    for (literal, expected) in [("true", 2), ("1", 2), ("false", 1), ("0", 1)] {
        let body = format!(
            r#"<peripheral><name>PeripheralA</name><baseAddress>0x40001000</baseAddress>
               <addressBlock><offset>0x0</offset><size>0x1000</size><usage>registers</usage></addressBlock>
               <registers><register><name>CTRL</name><addressOffset>0x0</addressOffset>
               <fields><field><name>MODE</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth>
               <enumeratedValues>
                 <enumeratedValue><name>ON</name><value>1</value></enumeratedValue>
                 <enumeratedValue><name>REST</name><isDefault>{literal}</isDefault></enumeratedValue>
               </enumeratedValues>
               </field></fields></register></registers></peripheral>"#
        );
        let (device, _diag) = svd_resolve::process_str(&device_doc(&body)).unwrap();
        let svd_resolve::RegisterCluster::Register(register) = &device.peripherals[0].registers[0]
        else {
            panic!("expected a register");
        };
        assert_eq!(
            register.fields[0].enumerated_value_containers[0].values.len(),
            expected,
            "isDefault={literal}"
        );
    }
}

#[test]
fn missing_required_element_is_typed() {
    let body = r#"<peripheral><baseAddress>0x40001000</baseAddress></peripheral>"#;
    let report = svd_resolve::process_str(&device_doc(body)).unwrap_err();
    let error = report.downcast::<Error>().unwrap();
    assert!(matches!(error, Error::ParseMissingElement { .. }), "{error}");
}

proptest! {
    #[test]
    fn hex_and_decimal_base_addresses_agree(base in 0u64..0x1_0000_0000) {
        // 4-byte aligned to keep the fixture warning-free.
        let base = base & !0x3;
        prop_assert_eq!(base_address_of(&format!("{base}")), base);
        prop_assert_eq!(base_address_of(&format!("{base:#x}")), base);
    }

    #[test]
    fn dim_expansion_count_matches_dim(dim in 1u32..8) {
        let body = format!(
            "<peripheral><name>PeripheralA</name><baseAddress>0x40001000</baseAddress>\
             <addressBlock><offset>0x0</offset><size>0x1000</size><usage>registers</usage></addressBlock>\
             <registers><register><name>REG[%s]</name><dim>{dim}</dim><dimIncrement>4</dimIncrement>\
             <addressOffset>0x0</addressOffset></register></registers></peripheral>"
        );
        let (device, _diag) = svd_resolve::process_str(&device_doc(&body)).unwrap();
        prop_assert_eq!(device.peripherals[0].registers.len(), dim as usize);
    }
}
