//! Warning sink threaded through the pipeline.

/// Category of a non-fatal finding.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// Two non-alternate peers overlap in the address map.
    AddressOverlap,
    /// Two address blocks of one peripheral overlap.
    AddressBlockOverlap,
    /// A register/cluster offset is not aligned to `min(size_bytes, 4)`.
    UnalignedOffset,
    /// A peripheral base address is not 4-byte aligned.
    UnalignedBase,
    /// A field's msb lies beyond the register size.
    OversizedField,
    /// An enumerated value exceeds the field's value range; it is dropped.
    OversizedValue,
    /// A duplicate enumerated value name or value; the entry is dropped.
    DuplicateEnumValue,
    /// An `isDefault` entry carried a value; the value is discarded.
    DefaultWithValue,
    /// An element named "reserved" is dropped.
    ReservedName,
    /// `dim` is set but the name carries no `%s` marker; treated as non-dim.
    DimWithoutMarker,
    /// A bit range arrived with msb < lsb and was swapped.
    SwappedBitRange,
    /// An element without children is dropped.
    EmptyElement,
    /// A size that is not a multiple of 8 causes the element to be dropped.
    SizeNotByteMultiple,
    /// A default expansion over a very wide field was skipped.
    WideDefaultDomain,
}

/// A single structured warning.
#[derive(Clone, Debug)]
pub struct Warning {
    /// Category tag.
    pub kind: WarningKind,
    /// Dotted path of the offending element.
    pub path: String,
    /// Human-readable detail.
    pub detail: String,
}

/// Collects warnings emitted while a device is processed.
///
/// The collector is handed to [`crate::process`] by the caller; the library
/// keeps no global state. Every pushed warning is mirrored to
/// `tracing::warn!`.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected warnings in emission order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Whether any warning was collected.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Returns warnings matching `kind`.
    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> + '_ {
        self.warnings.iter().filter(move |warning| warning.kind == kind)
    }

    pub(crate) fn push(
        &mut self,
        kind: WarningKind,
        path: impl Into<String>,
        detail: impl Into<String>,
    ) {
        let warning = Warning { kind, path: path.into(), detail: detail.into() };
        tracing::warn!(kind = ?warning.kind, path = %warning.path, "{}", warning.detail);
        self.warnings.push(warning);
    }
}
