//! Re-emission of the finalized model and reprocessing of the output.

mod common;

use common::{device_doc, peripheral};

const BODY: &str = r#"<peripheral>
      <name>UART0</name>
      <baseAddress>0x40001000</baseAddress>
      <addressBlock><offset>0x0</offset><size>0x1000</size><usage>registers</usage></addressBlock>
      <registers>
        <register>
          <name>DATA</name>
          <addressOffset>0x0</addressOffset>
          <fields>
            <field><name>VALUE</name><bitOffset>0</bitOffset><bitWidth>8</bitWidth></field>
          </fields>
        </register>
        <register>
          <name>STAT</name>
          <addressOffset>0x4</addressOffset>
          <access>read-only</access>
          <fields>
            <field>
              <name>STATE</name>
              <bitRange>[1:0]</bitRange>
              <enumeratedValues>
                <usage>read</usage>
                <enumeratedValue><name>IDLE</name><value>0</value></enumeratedValue>
                <enumeratedValue><name>BUSY</name><value>1</value></enumeratedValue>
                <enumeratedValue><name>OTHER</name><isDefault>true</isDefault></enumeratedValue>
              </enumeratedValues>
            </field>
          </fields>
        </register>
        <cluster>
          <name>CH0</name>
          <addressOffset>0x10</addressOffset>
          <register><name>CFG</name><addressOffset>0x0</addressOffset></register>
          <register><name>DIV</name><addressOffset>0x4</addressOffset></register>
        </cluster>
      </registers>
    </peripheral>"#;

#[test]
fn written_output_reprocesses_to_the_same_model() {
    let (device, _diag) = svd_resolve::process_str(&device_doc(BODY)).unwrap();
    let written = svd_resolve::write_device(&device).unwrap();
    let (reprocessed, rediag) = svd_resolve::process_str(&written).unwrap();

    assert!(rediag.is_empty(), "round trip introduced warnings: {:?}", rediag.warnings());

    assert_eq!(reprocessed.name, device.name);
    assert_eq!(reprocessed.size, device.size);
    assert_eq!(reprocessed.peripherals.len(), device.peripherals.len());

    let uart = device.periph("UART0").unwrap();
    let uart2 = reprocessed.periph("UART0").unwrap();
    assert_eq!(uart2.base_address, uart.base_address);
    assert_eq!(uart2.size, uart.size);
    assert_eq!(uart2.registers.len(), uart.registers.len());
    assert_eq!(uart2.end_address_effective, uart.end_address_effective);

    let stat = uart.reg("STAT").unwrap();
    let stat2 = uart2.reg("STAT").unwrap();
    assert_eq!(stat2.access, stat.access);
    let state = stat.field("STATE").unwrap();
    let state2 = stat2.field("STATE").unwrap();
    assert_eq!((state2.lsb, state2.msb), (state.lsb, state.msb));
    assert_eq!(
        state2.enumerated_value_containers[0].values.len(),
        state.enumerated_value_containers[0].values.len(),
    );

    let flat: Vec<(String, u64)> = uart
        .all_registers()
        .into_iter()
        .map(|register| (register.name.clone(), register.base_address))
        .collect();
    let flat2: Vec<(String, u64)> = uart2
        .all_registers()
        .into_iter()
        .map(|register| (register.name.clone(), register.base_address))
        .collect();
    assert_eq!(flat2, flat);
}

#[test]
fn writing_twice_is_stable() {
    let (device, _diag) = svd_resolve::process_str(&device_doc(BODY)).unwrap();
    let written = svd_resolve::write_device(&device).unwrap();
    let (reprocessed, _rediag) = svd_resolve::process_str(&written).unwrap();
    let rewritten = svd_resolve::write_device(&reprocessed).unwrap();
    assert_eq!(written, rewritten);
}

#[test]
fn expanded_templates_write_as_concrete_registers() {
    let (device, _diag) = svd_resolve::process_str(&device_doc(&peripheral(
        "PeripheralA",
        0x4000_1000,
        r#"<register>
             <name>REG%s</name>
             <dim>2</dim>
             <dimIndex>A,B</dimIndex>
             <dimIncrement>4</dimIncrement>
             <addressOffset>0x0</addressOffset>
           </register>"#,
    )))
    .unwrap();

    let written = svd_resolve::write_device(&device).unwrap();
    assert!(written.contains("<name>REGA</name>"));
    assert!(written.contains("<name>REGB</name>"));
    assert!(!written.contains("%s"));
    assert!(!written.contains("<dim>"));

    let (reprocessed, rediag) = svd_resolve::process_str(&written).unwrap();
    assert!(rediag.is_empty());
    assert_eq!(reprocessed.periph("PeripheralA").unwrap().registers.len(), 2);
}
