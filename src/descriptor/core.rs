use std::borrow::Cow;
use std::fmt;

/// Scalar kinds understood by the client type language.
///
/// Integer and floating point widths all collapse to [`PrimitiveKind::Number`].
/// 64-bit integers lose their precision guarantee on the client side; the
/// mapping is kept lossy for wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

/// Library types with a fixed wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SpecialWireKind {
    /// A date/time serialized as an RFC 3339 string.
    Timestamp,
}

/// A node in the type graph.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// A composite with a stable qualified name (`module::Type` or `pkg.Type`).
    Named {
        name: Cow<'static, str>,
        fields: FieldList,
    },
    /// A composite rendered inline at every use site and never cached.
    Anonymous(FieldList),
    /// A collection that may arrive as `null` on the wire.
    Sequence(Box<TypeDescriptor>),
    /// A value that may be absent; the containing field becomes optional.
    Optional(Box<TypeDescriptor>),
    /// Single-payload wrapper ([`Choice`](super::Choice)); unwrapped to its
    /// payload and always optional in the containing field.
    Wrapper(Box<TypeDescriptor>),
    SpecialWire(SpecialWireKind),
    Unknown,
}

impl TypeDescriptor {
    pub fn named(name: impl Into<Cow<'static, str>>, fields: impl Into<FieldList>) -> Self {
        TypeDescriptor::Named {
            name: name.into(),
            fields: fields.into(),
        }
    }

    pub fn anonymous(fields: impl Into<FieldList>) -> Self {
        TypeDescriptor::Anonymous(fields.into())
    }

    pub fn sequence(element: TypeDescriptor) -> Self {
        TypeDescriptor::Sequence(Box::new(element))
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn wrapper(payload: TypeDescriptor) -> Self {
        TypeDescriptor::Wrapper(Box::new(payload))
    }

    pub const fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::String)
    }

    pub const fn number() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Number)
    }

    pub const fn boolean() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Boolean)
    }

    /// True when a field holding this type may be left out of the payload.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Optional(_) | TypeDescriptor::Wrapper(_)
        )
    }

    /// True for a named or anonymous composite with zero fields.
    ///
    /// Handlers taking such an input get a zero-argument client method.
    #[must_use]
    pub fn is_empty_composite(&self) -> bool {
        match self {
            TypeDescriptor::Named { fields, .. } | TypeDescriptor::Anonymous(fields) => {
                fields.resolve().is_empty()
            }
            _ => false,
        }
    }
}

/// One member of a composite type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Name used in the serialized payload.
    pub wire_name: Cow<'static, str>,
    pub ty: TypeDescriptor,
    /// Whether the field must be present. Fields whose type is optional are
    /// rendered optional regardless of this flag.
    pub required: bool,
}

impl Field {
    /// Creates a field whose `required` flag follows the type's optionality.
    pub fn new(wire_name: impl Into<Cow<'static, str>>, ty: TypeDescriptor) -> Self {
        let required = !ty.is_optional();
        Self {
            wire_name: wire_name.into(),
            ty,
            required,
        }
    }

    pub fn optional(wire_name: impl Into<Cow<'static, str>>, ty: TypeDescriptor) -> Self {
        Self {
            wire_name: wire_name.into(),
            ty,
            required: false,
        }
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        !self.required || self.ty.is_optional()
    }
}

/// Field list of a composite.
///
/// `Deferred` is produced by `#[derive(Describe)]`: the list is only built when
/// the compiler expands the type, which is what lets a type refer to itself.
#[derive(Clone)]
pub enum FieldList {
    Resolved(Vec<Field>),
    Deferred(fn() -> Vec<Field>),
}

impl FieldList {
    #[must_use]
    pub fn resolve(&self) -> Cow<'_, [Field]> {
        match self {
            FieldList::Resolved(fields) => Cow::Borrowed(fields.as_slice()),
            FieldList::Deferred(build) => Cow::Owned(build()),
        }
    }
}

impl From<Vec<Field>> for FieldList {
    fn from(fields: Vec<Field>) -> Self {
        FieldList::Resolved(fields)
    }
}

impl fmt::Debug for FieldList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldList::Resolved(fields) => f.debug_list().entries(fields.iter()).finish(),
            FieldList::Deferred(_) => f.write_str("[deferred]"),
        }
    }
}

// Deferred lists compare by pointer: resolving them here could recurse
// through a self-referential type.
impl PartialEq for FieldList {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldList::Resolved(a), FieldList::Resolved(b)) => a == b,
            (FieldList::Deferred(a), FieldList::Deferred(b)) => *a as usize == *b as usize,
            _ => false,
        }
    }
}
