#![allow(dead_code)]

use svd_resolve::{Device, Diagnostics, Error};

/// Wraps peripheral definitions in a minimal device document.
pub fn device_doc(peripherals: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<device schemaVersion="1.3">
  <name>TESTDEVICE</name>
  <version>1.0</version>
  <description>Device for tests</description>
  <addressUnitBits>8</addressUnitBits>
  <width>32</width>
  <peripherals>
    {peripherals}
  </peripherals>
</device>"#
    )
}

/// A peripheral with one register block and the given register definitions.
pub fn peripheral(name: &str, base: u64, registers: &str) -> String {
    format!(
        "<peripheral><name>{name}</name><baseAddress>{base:#x}</baseAddress>\
         <addressBlock><offset>0x0</offset><size>0x1000</size><usage>registers</usage></addressBlock>\
         <registers>{registers}</registers></peripheral>"
    )
}

/// A bare register at `offset`, all other attributes defaulted.
pub fn register(name: &str, offset: u64) -> String {
    format!("<register><name>{name}</name><addressOffset>{offset:#x}</addressOffset></register>")
}

/// Processes the given peripheral definitions, panicking on fatal errors.
pub fn process(peripherals: &str) -> (Device, Diagnostics) {
    svd_resolve::process_str(&device_doc(peripherals)).expect("processing failed")
}

/// Processes the given peripheral definitions, expecting a fatal error.
pub fn process_err(peripherals: &str) -> Error {
    let report = svd_resolve::process_str(&device_doc(peripherals))
        .err()
        .expect("processing unexpectedly succeeded");
    report.downcast::<Error>().expect("error is not the typed pipeline error")
}
