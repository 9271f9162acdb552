use super::{
    deserialize_bool, deserialize_bool_opt, deserialize_int, deserialize_u32, deserialize_u32_opt,
};
use crate::types::{Endian, Protection};
use serde::Deserialize;

/// The processor embedded in the device.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cpu {
    /// Processor name (`CM4`, `CM33`, ...). Kept free-form; vendor files
    /// stray from the schema's enumeration.
    pub name: String,
    /// Hardware revision, `rNpM` formatted.
    pub revision: String,
    /// Byte order.
    pub endian: Endian,
    /// Whether the processor features a memory protection unit.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub mpu_present: Option<bool>,
    /// Whether the processor features a floating point unit.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub fpu_present: Option<bool>,
    /// Whether the FPU is double precision.
    #[serde(default, rename = "fpuDP", deserialize_with = "deserialize_bool_opt")]
    pub fpu_dp: Option<bool>,
    /// Whether the processor implements the SIMD DSP extensions.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub dsp_present: Option<bool>,
    /// Whether an instruction cache is present.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub icache_present: Option<bool>,
    /// Whether a data cache is present.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub dcache_present: Option<bool>,
    /// Whether an instruction tightly coupled memory is present.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub itcm_present: Option<bool>,
    /// Whether a data tightly coupled memory is present.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub dtcm_present: Option<bool>,
    /// Whether the vector table offset register is implemented.
    #[serde(default, deserialize_with = "deserialize_bool_opt")]
    pub vtor_present: Option<bool>,
    /// Number of bits available in the NVIC for configuring priority.
    #[serde(deserialize_with = "deserialize_u32")]
    pub nvic_prio_bits: u32,
    /// Whether the device contains a vendor-specific SysTick timer.
    #[serde(deserialize_with = "deserialize_bool")]
    pub vendor_systick_config: bool,
    /// Total number of device-specific interrupts.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub device_num_interrupts: Option<u32>,
    /// Number of implemented SAU regions.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub sau_num_regions: Option<u32>,
    /// Preconfigured SAU regions.
    pub sau_regions_config: Option<SauRegionsConfig>,
}

/// Predefined security attribution unit regions.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct SauRegionsConfig {
    /// Whether the SAU is enabled.
    #[serde(rename = "@enabled", default, deserialize_with = "deserialize_bool_opt")]
    pub enabled: Option<bool>,
    /// Protection applied while the SAU is disabled.
    #[serde(rename = "@protectionWhenDisabled", default)]
    pub protection_when_disabled: Option<Protection>,
    /// The configured regions.
    #[serde(rename = "region", default)]
    pub regions: Vec<SauRegion>,
}

/// One preconfigured SAU region.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct SauRegion {
    /// Whether the region is enabled.
    #[serde(rename = "@enabled", default, deserialize_with = "deserialize_bool_opt")]
    pub enabled: Option<bool>,
    /// Region name.
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    /// Base address of the region.
    #[serde(deserialize_with = "deserialize_int")]
    pub base: u64,
    /// Limit address of the region.
    #[serde(deserialize_with = "deserialize_int")]
    pub limit: u64,
    /// Access attribute of the region.
    pub access: SauAccess,
}

/// Access attribute of a SAU region.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum SauAccess {
    /// Non-secure callable (secure) region.
    #[serde(rename = "c")]
    NonSecureCallable,
    /// Non-secure region.
    #[serde(rename = "n")]
    NonSecure,
}

impl SauAccess {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SauAccess::NonSecureCallable => "c",
            SauAccess::NonSecure => "n",
        }
    }
}
