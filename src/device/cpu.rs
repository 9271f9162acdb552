use crate::svd::SauAccess;
use crate::types::{Endian, Protection};

/// The processor of a finalized device, with presence flags defaulted.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Cpu {
    /// Processor name.
    pub name: String,
    /// Hardware revision.
    pub revision: String,
    /// Byte order.
    pub endian: Endian,
    /// Whether a memory protection unit is present.
    pub mpu_present: bool,
    /// Whether a floating point unit is present.
    pub fpu_present: bool,
    /// Whether the FPU is double precision.
    pub fpu_dp: bool,
    /// Whether the SIMD DSP extensions are implemented.
    pub dsp_present: bool,
    /// Whether an instruction cache is present.
    pub icache_present: bool,
    /// Whether a data cache is present.
    pub dcache_present: bool,
    /// Whether an instruction tightly coupled memory is present.
    pub itcm_present: bool,
    /// Whether a data tightly coupled memory is present.
    pub dtcm_present: bool,
    /// Whether the vector table offset register is implemented.
    pub vtor_present: bool,
    /// Number of NVIC priority bits.
    pub nvic_prio_bits: u32,
    /// Whether a vendor-specific SysTick timer is present.
    pub vendor_systick_config: bool,
    /// Total number of device-specific interrupts.
    pub device_num_interrupts: Option<u32>,
    /// Number of implemented SAU regions.
    pub sau_num_regions: Option<u32>,
    /// Preconfigured SAU regions.
    pub sau_regions_config: Option<SauRegionsConfig>,
}

/// Finalized SAU region configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct SauRegionsConfig {
    /// Whether the SAU is enabled.
    pub enabled: bool,
    /// Protection applied while the SAU is disabled.
    pub protection_when_disabled: Protection,
    /// The configured regions.
    pub regions: Vec<SauRegion>,
}

/// One finalized SAU region.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct SauRegion {
    /// Whether the region is enabled.
    pub enabled: bool,
    /// Region name.
    pub name: Option<String>,
    /// Base address of the region.
    pub base: u64,
    /// Limit address of the region.
    pub limit: u64,
    /// Access attribute of the region.
    pub access: SauAccess,
}
