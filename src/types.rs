//! Enumerations shared between the parsed records and the finalized model.

use serde::Deserialize;

/// Predefined access rights.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum Access {
    /// Read access is permitted. Write operations have an undefined result.
    #[serde(rename = "read-only")]
    ReadOnly,
    /// Read operations have an undefined result. Write access is permitted.
    #[serde(rename = "write-only")]
    WriteOnly,
    /// Read and write accesses are permitted.
    #[serde(rename = "read-write")]
    ReadWrite,
    /// Only the first write access after a reset has an effect.
    #[serde(rename = "writeOnce")]
    WriteOnce,
    /// Read access is permitted; only the first write has an effect.
    #[serde(rename = "read-writeOnce")]
    ReadWriteOnce,
}

impl Access {
    /// Whether the access type occupies the read domain.
    pub fn is_readable(self) -> bool {
        !matches!(self, Access::WriteOnly | Access::WriteOnce)
    }

    /// Whether the access type occupies the write domain.
    pub fn is_writable(self) -> bool {
        !matches!(self, Access::ReadOnly)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Access::ReadOnly => "read-only",
            Access::WriteOnly => "write-only",
            Access::ReadWrite => "read-write",
            Access::WriteOnce => "writeOnce",
            Access::ReadWriteOnce => "read-writeOnce",
        }
    }
}

/// Protection level of an address region.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum Protection {
    /// Secure accesses only.
    #[serde(rename = "s")]
    Secure,
    /// Non-secure or secure accesses.
    #[serde(rename = "n")]
    NonSecure,
    /// Privileged accesses only.
    #[serde(rename = "p")]
    Privileged,
    /// No restriction.
    #[serde(rename = "any")]
    Any,
}

impl Protection {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Protection::Secure => "s",
            Protection::NonSecure => "n",
            Protection::Privileged => "p",
            Protection::Any => "any",
        }
    }
}

/// Side of the register access an enumerated-value container applies to.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumUsage {
    /// Values valid when reading the field.
    #[serde(rename = "read")]
    Read,
    /// Values valid when writing the field.
    #[serde(rename = "write")]
    Write,
    /// Values valid in both directions.
    #[serde(rename = "read-write")]
    ReadWrite,
}

impl EnumUsage {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EnumUsage::Read => "read",
            EnumUsage::Write => "write",
            EnumUsage::ReadWrite => "read-write",
        }
    }
}

/// Side effect of a write on the register content.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ModifiedWriteValues {
    /// Writing a one clears the bit.
    OneToClear,
    /// Writing a one sets the bit.
    OneToSet,
    /// Writing a one toggles the bit.
    OneToToggle,
    /// Writing a zero clears the bit.
    ZeroToClear,
    /// Writing a zero sets the bit.
    ZeroToSet,
    /// Writing a zero toggles the bit.
    ZeroToToggle,
    /// Any write clears all bits.
    Clear,
    /// Any write sets all bits.
    Set,
    /// Written bits are stored as-is.
    Modify,
}

impl ModifiedWriteValues {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ModifiedWriteValues::OneToClear => "oneToClear",
            ModifiedWriteValues::OneToSet => "oneToSet",
            ModifiedWriteValues::OneToToggle => "oneToToggle",
            ModifiedWriteValues::ZeroToClear => "zeroToClear",
            ModifiedWriteValues::ZeroToSet => "zeroToSet",
            ModifiedWriteValues::ZeroToToggle => "zeroToToggle",
            ModifiedWriteValues::Clear => "clear",
            ModifiedWriteValues::Set => "set",
            ModifiedWriteValues::Modify => "modify",
        }
    }
}

/// Side effect of a read on the register content.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReadAction {
    /// The register is cleared after a read.
    Clear,
    /// The register is set after a read.
    Set,
    /// The register is modified after a read.
    Modify,
    /// A dependent resource is modified by the read.
    ModifyExternal,
}

impl ReadAction {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ReadAction::Clear => "clear",
            ReadAction::Set => "set",
            ReadAction::Modify => "modify",
            ReadAction::ModifyExternal => "modifyExternal",
        }
    }
}

/// C data type assigned to a register in generated headers.
#[non_exhaustive]
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum DataType {
    #[serde(rename = "uint8_t")]
    U8,
    #[serde(rename = "uint16_t")]
    U16,
    #[serde(rename = "uint32_t")]
    U32,
    #[serde(rename = "uint64_t")]
    U64,
    #[serde(rename = "int8_t")]
    I8,
    #[serde(rename = "int16_t")]
    I16,
    #[serde(rename = "int32_t")]
    I32,
    #[serde(rename = "int64_t")]
    I64,
    #[serde(rename = "uint8_t *")]
    U8Ptr,
    #[serde(rename = "uint16_t *")]
    U16Ptr,
    #[serde(rename = "uint32_t *")]
    U32Ptr,
    #[serde(rename = "uint64_t *")]
    U64Ptr,
    #[serde(rename = "int8_t *")]
    I8Ptr,
    #[serde(rename = "int16_t *")]
    I16Ptr,
    #[serde(rename = "int32_t *")]
    I32Ptr,
    #[serde(rename = "int64_t *")]
    I64Ptr,
}

impl DataType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            DataType::U8 => "uint8_t",
            DataType::U16 => "uint16_t",
            DataType::U32 => "uint32_t",
            DataType::U64 => "uint64_t",
            DataType::I8 => "int8_t",
            DataType::I16 => "int16_t",
            DataType::I32 => "int32_t",
            DataType::I64 => "int64_t",
            DataType::U8Ptr => "uint8_t *",
            DataType::U16Ptr => "uint16_t *",
            DataType::U32Ptr => "uint32_t *",
            DataType::U64Ptr => "uint64_t *",
            DataType::I8Ptr => "int8_t *",
            DataType::I16Ptr => "int16_t *",
            DataType::I32Ptr => "int32_t *",
            DataType::I64Ptr => "int64_t *",
        }
    }
}

/// Purpose of an address block within a peripheral.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AddressBlockUsage {
    /// The block holds registers.
    Registers,
    /// The block is a buffer.
    Buffer,
    /// The block is reserved.
    Reserved,
}

impl AddressBlockUsage {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            AddressBlockUsage::Registers => "registers",
            AddressBlockUsage::Buffer => "buffer",
            AddressBlockUsage::Reserved => "reserved",
        }
    }
}

/// Byte order of the processor.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    /// Little-endian memory mapping.
    Little,
    /// Big-endian memory mapping.
    Big,
    /// Configurable endianness.
    Selectable,
    /// Neither of the above.
    Other,
}

impl Endian {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Endian::Little => "little",
            Endian::Big => "big",
            Endian::Selectable => "selectable",
            Endian::Other => "other",
        }
    }
}
