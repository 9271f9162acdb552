use crate::svd::DimArrayIndex;
use crate::types::{Access, EnumUsage, ModifiedWriteValues, ReadAction};

/// A finalized bit field.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Field {
    /// Number of list elements, when the field came from a template.
    pub dim: Option<u32>,
    /// Bit increment between neighboring list members.
    pub dim_increment: Option<u64>,
    /// Substitution tokens the template expanded with.
    pub dim_index: Option<String>,
    /// Name of the generated C structure.
    pub dim_name: Option<String>,
    /// Enumerated names for the list indices.
    pub dim_array_index: Option<DimArrayIndex>,
    /// Name string used to identify the field.
    pub name: String,
    /// String describing the details of the field.
    pub description: Option<String>,
    /// Bit position of the least significant bit within the register.
    pub lsb: u32,
    /// Bit position of the most significant bit within the register.
    pub msb: u32,
    /// The access rights of the field.
    pub access: Access,
    /// Side effect of a write on the field content.
    pub modified_write_values: ModifiedWriteValues,
    /// Constraint on writable values.
    pub write_constraint: Option<WriteConstraint>,
    /// Side effect of a read on the field content.
    pub read_action: Option<ReadAction>,
    /// Enumerated-value containers, sorted by usage and value count.
    pub enumerated_value_containers: Vec<EnumeratedValueContainer>,
}

impl Field {
    /// The width of the field in bits.
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }

    /// The in-register mask of the field.
    pub fn mask(&self) -> u64 {
        (u64::MAX >> (64 - u64::from(self.width()))) << self.lsb
    }
}

/// A finalized container of enumerated values.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct EnumeratedValueContainer {
    /// Identifier of the container.
    pub name: Option<String>,
    /// Name of the generated C enumeration.
    pub header_enum_name: Option<String>,
    /// Access direction the values apply to.
    pub usage: EnumUsage,
    /// The values, sorted numerically; wildcards and defaults expanded.
    pub values: Vec<EnumeratedValue>,
}

impl EnumeratedValueContainer {
    /// Returns the value entry matching `value`.
    pub fn value(&self, value: u64) -> Option<&EnumeratedValue> {
        self.values.iter().find(|entry| entry.value == value)
    }
}

/// One finalized legal content of a field.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct EnumeratedValue {
    /// The string identifies the value.
    pub name: String,
    /// Extended description of the value.
    pub description: Option<String>,
    /// The concrete value.
    pub value: u64,
}

/// A finalized write constraint.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteConstraint {
    /// Only values read from the location may be written back.
    pub write_as_read: Option<bool>,
    /// Only enumerated values may be written.
    pub use_enumerated_values: Option<bool>,
    /// Inclusive range of writable values.
    pub range: Option<(u64, u64)>,
}
