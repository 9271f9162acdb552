//! Fatal error taxonomy of the resolver pipeline.

use thiserror::Error;

/// Errors that abort processing.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A required XML element is absent from the input.
    #[error("required element `{element}` is missing{}", context_suffix(.context))]
    ParseMissingElement {
        /// Name of the missing element.
        element: String,
        /// Enclosing element, when known.
        context: Option<String>,
    },

    /// The input document is not deserializable SVD XML.
    #[error("malformed SVD document: {0}")]
    Xml(String),

    /// A dim template is inconsistent with its dim group.
    #[error("dim template error for `{name}`: {detail}")]
    DimTemplate {
        /// Name of the offending element.
        name: String,
        /// What is inconsistent.
        detail: String,
    },

    /// A `derivedFrom` path matched more than one element.
    #[error("derive path `{path}` resolves to multiple elements")]
    AmbiguousDerivation {
        /// The dotted derive path.
        path: String,
    },

    /// Placeholders remained unresolved once the fixed point was reached.
    #[error("unresolvable derivation(s), first: `{path}`")]
    UnresolvedDerivation {
        /// Derive path of one unresolved placeholder.
        path: String,
    },

    /// Adding a derive edge would close an inheritance cycle.
    #[error("inheritance cycle detected for `{name}` with derive path `{path}`")]
    Cycle {
        /// Name of the deriving element.
        name: String,
        /// The dotted derive path.
        path: String,
    },

    /// A derive target sits at a different hierarchy level than its consumer.
    #[error("`{name}` derives from `{base}` at a different hierarchy level")]
    LevelMismatch {
        /// Name of the deriving element.
        name: String,
        /// Name of the base element.
        base: String,
    },

    /// Two siblings share a uniqueness key.
    #[error("duplicate {kind} name `{name}`")]
    DuplicateName {
        /// Element kind ("peripheral", "register/cluster", "field", ...).
        kind: &'static str,
        /// The colliding key.
        name: String,
    },

    /// Two fields overlap within one access domain.
    #[error("field `{field}` overlaps with `{other}` in {domain} access")]
    FieldAccessOverlap {
        /// The later field in lsb order.
        field: String,
        /// The field it collides with.
        other: String,
        /// "read" or "write".
        domain: &'static str,
    },

    /// A `bitRange` string does not match `[msb:lsb]`.
    #[error("invalid bit range `{text}` on field `{field}`")]
    InvalidBitRange {
        /// Name of the field.
        field: String,
        /// The malformed string.
        text: String,
    },

    /// A field reached processing with no bit-range encoding from any source.
    #[error("field `{field}` has no bit range (bitOffset/bitWidth, lsb/msb, or bitRange)")]
    MissingBitRange {
        /// Name of the field.
        field: String,
    },

    /// A register or cluster reached finalization with no size from any source.
    #[error("register/cluster `{name}` has no size")]
    MissingSize {
        /// Name of the element.
        name: String,
    },

    /// A register or cluster size maps to an unsupported byte width.
    #[error("unsupported size of {bytes} bytes on `{name}`")]
    UnsupportedRegisterSize {
        /// Name of the element.
        name: String,
        /// The offending byte width.
        bytes: u64,
    },

    /// A peripheral carries no address blocks.
    #[error("peripheral `{name}` has no address blocks")]
    MissingAddressBlocks {
        /// Name of the peripheral.
        name: String,
    },

    /// A register specifies both `alternateRegister` and `alternateGroup`.
    #[error("register `{name}` carries both alternateRegister and alternateGroup")]
    ConflictingAlternates {
        /// Name of the register.
        name: String,
    },

    /// An enumerated-value container holds more than one `isDefault` entry.
    #[error("multiple default enumerated values in container on field `{field}`")]
    MultipleDefaults {
        /// Name of the owning field.
        field: String,
    },

    /// An enumerated value string is not a recognized literal.
    #[error("unrecognized enumerated value literal `{text}`")]
    InvalidEnumValue {
        /// The malformed literal.
        text: String,
    },

    /// File I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(context) => format!(" in `{context}`"),
        None => String::new(),
    }
}

impl Error {
    /// Classifies a quick-xml deserialization failure, recovering the typed
    /// missing-element kind from serde's "missing field" message.
    pub(crate) fn from_de(err: quick_xml::DeError) -> Self {
        let text = err.to_string();
        if let Some(field) = text.strip_prefix("missing field `") {
            if let Some(field) = field.strip_suffix('`') {
                return Error::ParseMissingElement { element: field.to_string(), context: None };
            }
        }
        Error::Xml(text)
    }
}
