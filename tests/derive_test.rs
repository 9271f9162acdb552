//! derivedFrom resolution across scopes, directions, and chains.

mod common;

use common::{peripheral, process, process_err, register};
use svd_resolve::Error;

#[test]
fn forward_reference_between_peripherals() {
    let (device, _diag) = process(&format!(
        r#"<peripheral derivedFrom="PeripheralB"><name>PeripheralA</name><baseAddress>0x40001000</baseAddress></peripheral>
           {}"#,
        peripheral("PeripheralB", 0x4000_2000, &register("RegisterR", 0x0)),
    ));

    let a = device.periph("PeripheralA").unwrap();
    assert_eq!(a.base_address, 0x4000_1000);
    assert_eq!(a.registers.len(), 1);
    assert_eq!(a.registers[0].name(), "RegisterR");
    assert_eq!(a.registers[0].address_offset(), 0x0);
    assert_eq!(a.registers[0].base_address(), 0x4000_1000);

    let b = device.periph("PeripheralB").unwrap();
    assert_eq!(b.registers.len(), 1);
    assert_eq!(b.registers[0].base_address(), 0x4000_2000);
}

#[test]
fn backward_reference_between_peripherals() {
    let (device, _diag) = process(&format!(
        r#"{}
           <peripheral derivedFrom="PeripheralA"><name>PeripheralB</name><baseAddress>0x40002000</baseAddress></peripheral>"#,
        peripheral("PeripheralA", 0x4000_1000, &register("RegisterR", 0x0)),
    ));

    let b = device.periph("PeripheralB").unwrap();
    assert_eq!(b.registers.len(), 1);
    assert_eq!(b.registers[0].name(), "RegisterR");
}

#[test]
fn inheritance_chain() {
    let (device, _diag) = process(&format!(
        r#"{}
           <peripheral derivedFrom="PeripheralA"><name>PeripheralB</name><baseAddress>0x40002000</baseAddress></peripheral>
           <peripheral derivedFrom="PeripheralB"><name>PeripheralC</name><baseAddress>0x40003000</baseAddress></peripheral>"#,
        peripheral("PeripheralA", 0x4000_1000, &register("RegisterR", 0x0)),
    ));

    for name in ["PeripheralA", "PeripheralB", "PeripheralC"] {
        let peripheral = device.periph(name).unwrap();
        assert_eq!(peripheral.registers.len(), 1, "{name}");
        assert_eq!(peripheral.registers[0].name(), "RegisterR", "{name}");
    }
}

#[test]
fn derived_attributes_fill_gaps_only() {
    let (device, _diag) = process(
        r#"<peripheral>
             <name>PeripheralA</name>
             <description>Base description</description>
             <baseAddress>0x40001000</baseAddress>
             <size>16</size>
             <access>write-only</access>
             <addressBlock><offset>0x0</offset><size>0x1000</size><usage>registers</usage></addressBlock>
             <registers><register><name>RegisterR</name><addressOffset>0x0</addressOffset></register></registers>
           </peripheral>
           <peripheral derivedFrom="PeripheralA">
             <name>PeripheralB</name>
             <baseAddress>0x40002000</baseAddress>
             <size>32</size>
           </peripheral>"#,
    );

    let b = device.periph("PeripheralB").unwrap();
    assert_eq!(b.size, 32);
    assert_eq!(b.access, svd_resolve::types::Access::WriteOnly);
    assert_eq!(b.description.as_deref(), Some("Base description"));
}

#[test]
fn register_derives_across_peripherals() {
    let (device, _diag) = process(&format!(
        r#"{}
           {}"#,
        peripheral(
            "PeripheralOne",
            0x4000_1000,
            r#"<register>
                 <name>RegisterX</name>
                 <addressOffset>0x0</addressOffset>
                 <size>16</size>
                 <fields><field><name>FieldF</name><bitOffset>0</bitOffset><bitWidth>4</bitWidth></field></fields>
               </register>"#,
        ),
        peripheral(
            "PeripheralTwo",
            0x4000_2000,
            r#"<register derivedFrom="PeripheralOne.RegisterX">
                 <name>RegisterY</name>
                 <addressOffset>0x4</addressOffset>
               </register>"#,
        ),
    ));

    let two = device.periph("PeripheralTwo").unwrap();
    let y = two.reg("RegisterY").unwrap();
    assert_eq!(y.size, 16);
    assert_eq!(y.address_offset, 0x4);
    assert_eq!(y.fields.len(), 1);
    assert_eq!(y.fields[0].name, "FieldF");
    assert_eq!((y.fields[0].lsb, y.fields[0].msb), (0, 3));
}

#[test]
fn explicit_child_shadows_inherited_child() {
    let (device, _diag) = process(&format!(
        "{}",
        peripheral(
            "PeripheralA",
            0x4000_1000,
            r#"<cluster>
                 <name>ClusterA</name>
                 <addressOffset>0x0</addressOffset>
                 <register><name>RegisterA</name><addressOffset>0x0</addressOffset><size>32</size></register>
               </cluster>
               <cluster derivedFrom="ClusterA">
                 <name>ClusterB</name>
                 <addressOffset>0x8</addressOffset>
                 <register><name>RegisterA</name><addressOffset>0x0</addressOffset><size>8</size></register>
               </cluster>"#,
        ),
    ));

    let a = device.periph("PeripheralA").unwrap();
    let Some(svd_resolve::RegisterCluster::Cluster(cluster_b)) = a.child("ClusterB") else {
        panic!("ClusterB missing");
    };
    assert_eq!(cluster_b.registers.len(), 1);
    let Some(svd_resolve::RegisterCluster::Register(register_a)) = cluster_b.child("RegisterA")
    else {
        panic!("RegisterA missing");
    };
    assert_eq!(register_a.size, 8);
}

#[test]
fn inherited_sibling_lands_next_to_explicit_child() {
    let (device, _diag) = process(&format!(
        "{}",
        peripheral(
            "PeripheralA",
            0x4000_1000,
            r#"<cluster>
                 <name>ClusterA</name>
                 <addressOffset>0x0</addressOffset>
                 <register><name>RegisterA</name><addressOffset>0x0</addressOffset></register>
               </cluster>
               <cluster derivedFrom="ClusterA">
                 <name>ClusterB</name>
                 <addressOffset>0x8</addressOffset>
                 <register><name>RegisterB</name><addressOffset>0x4</addressOffset></register>
               </cluster>"#,
        ),
    ));

    let a = device.periph("PeripheralA").unwrap();
    let Some(svd_resolve::RegisterCluster::Cluster(cluster_b)) = a.child("ClusterB") else {
        panic!("ClusterB missing");
    };
    let names: Vec<&str> = cluster_b.registers.iter().map(|child| child.name()).collect();
    assert_eq!(names, ["RegisterA", "RegisterB"]);
}

#[test]
fn enumerated_values_derive_by_path() {
    let (device, _diag) = process(&format!(
        "{}",
        peripheral(
            "PeripheralA",
            0x4000_1000,
            r#"<register>
                 <name>RegisterA</name>
                 <addressOffset>0x0</addressOffset>
                 <fields>
                   <field>
                     <name>FieldA</name>
                     <bitOffset>0</bitOffset><bitWidth>2</bitWidth>
                     <enumeratedValues>
                       <name>Modes</name>
                       <usage>read-write</usage>
                       <enumeratedValue><name>OFF</name><value>0</value></enumeratedValue>
                       <enumeratedValue><name>ON</name><value>1</value></enumeratedValue>
                     </enumeratedValues>
                   </field>
                   <field>
                     <name>FieldB</name>
                     <bitOffset>4</bitOffset><bitWidth>2</bitWidth>
                     <enumeratedValues derivedFrom="PeripheralA.RegisterA.FieldA.Modes"></enumeratedValues>
                   </field>
                 </fields>
               </register>"#,
        ),
    ));

    let a = device.periph("PeripheralA").unwrap();
    let field_b = a.reg("RegisterA").unwrap().field("FieldB").unwrap();
    assert_eq!(field_b.enumerated_value_containers.len(), 1);
    let container = &field_b.enumerated_value_containers[0];
    assert_eq!(container.name.as_deref(), Some("Modes"));
    assert_eq!(container.values.len(), 2);
    assert_eq!(container.value(1).unwrap().name, "ON");
}

#[test]
fn inheritance_cycle_is_fatal() {
    let error = process_err(
        r#"<peripheral derivedFrom="PeripheralB"><name>PeripheralA</name><baseAddress>0x40001000</baseAddress></peripheral>
           <peripheral derivedFrom="PeripheralA"><name>PeripheralB</name><baseAddress>0x40002000</baseAddress></peripheral>"#,
    );
    assert!(matches!(error, Error::Cycle { .. }), "{error}");
}

#[test]
fn ambiguous_derivation_is_fatal() {
    let error = process_err(&format!(
        r#"{}
           {}
           <peripheral derivedFrom="PeripheralSame"><name>PeripheralC</name><baseAddress>0x40003000</baseAddress></peripheral>"#,
        peripheral("PeripheralSame", 0x4000_1000, &register("RegisterR", 0x0)),
        peripheral("PeripheralSame", 0x4000_2000, &register("RegisterR", 0x0)),
    ));
    assert!(matches!(error, Error::AmbiguousDerivation { .. }), "{error}");
}

#[test]
fn unresolvable_derivation_is_fatal() {
    let error = process_err(
        r#"<peripheral derivedFrom="Nonexistent"><name>PeripheralA</name><baseAddress>0x40001000</baseAddress></peripheral>"#,
    );
    assert!(matches!(error, Error::UnresolvedDerivation { .. }), "{error}");
}

#[test]
fn derivation_to_a_different_level_never_resolves() {
    let error = process_err(&format!(
        r#"{}
           {}"#,
        peripheral("PeripheralA", 0x4000_1000, &register("RegisterR", 0x0)),
        peripheral(
            "PeripheralB",
            0x4000_2000,
            r#"<register derivedFrom="PeripheralA"><name>RegisterY</name><addressOffset>0x0</addressOffset></register>"#,
        ),
    ));
    assert!(matches!(error, Error::UnresolvedDerivation { .. }), "{error}");
}
