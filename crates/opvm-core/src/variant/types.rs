//! Type Descriptors
//!
//! Closed description of every type category the variant factory inspects,
//! plus the two collaborator seams it consumes: type normalization and the
//! nullable-generic test.

use std::fmt;

/// Underlying integral representation of an enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegralType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
}

impl IntegralType {
    pub fn bits(self) -> u32 {
        match self {
            IntegralType::UInt8 | IntegralType::Int8 => 8,
            IntegralType::UInt16 | IntegralType::Int16 => 16,
            IntegralType::UInt32 | IntegralType::Int32 => 32,
            IntegralType::UInt64 | IntegralType::Int64 => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntegralType::Int8 | IntegralType::Int16 | IntegralType::Int32 | IntegralType::Int64
        )
    }

    /// Truncate an integer to this width, keeping only the low bits.
    pub fn truncate(self, value: i128) -> u64 {
        let raw = value as u64;
        match self.bits() {
            64 => raw,
            width => raw & ((1u64 << width) - 1),
        }
    }

    /// Interpret a truncated bit pattern as a signed or unsigned integer.
    pub fn widen(self, bits: u64) -> i128 {
        let width = self.bits();
        if self.is_signed() && width < 64 {
            let shift = 64 - width;
            (((bits << shift) as i64) >> shift) as i128
        } else if self.is_signed() {
            bits as i64 as i128
        } else {
            bits as i128
        }
    }
}

/// A named enumeration type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    pub name: String,
    pub underlying: IntegralType,
    pub members: Vec<(String, i64)>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, underlying: IntegralType) -> Self {
        EnumType {
            name: name.into(),
            underlying,
            members: Vec::new(),
        }
    }

    /// Add a named member (builder style)
    pub fn with_member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push((name.into(), value));
        self
    }

    /// Enumeration with no declared identity, used when an integral value is
    /// boxed against the enum base type.
    pub fn anonymous(underlying: IntegralType) -> Self {
        EnumType::new("<enum>", underlying)
    }

    pub fn member_name(&self, value: i128) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v as i128 == value)
            .map(|(n, _)| n.as_str())
    }
}

/// Name reserved for the runtime typed-reference struct.
pub const TYPED_REFERENCE: &str = "TypedReference";

/// A named value (struct) type with an ordered field layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<(String, TypeDesc)>,
}

impl StructType {
    pub fn new(name: impl Into<String>) -> Self {
        StructType {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: TypeDesc) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    /// The runtime typed-reference struct. It has no usable default constructor.
    pub fn typed_reference() -> Self {
        StructType::new(TYPED_REFERENCE)
            .with_field("value", TypeDesc::Pointer)
            .with_field("type", TypeDesc::Pointer)
    }

    pub fn is_typed_reference(&self) -> bool {
        self.name == TYPED_REFERENCE
    }
}

/// Runtime type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// The generic object type
    Object,
    /// A named reference class (derives from object)
    Class(String),
    Array(Box<TypeDesc>),
    String,
    Pointer,
    UnsignedPointer,
    UInt64,
    UInt32,
    UInt16,
    Int64,
    Int32,
    Int16,
    UInt8,
    Int8,
    Float64,
    Float32,
    Bool,
    Char,
    /// The abstract base of all enumerations
    EnumBase,
    Enum(EnumType),
    Struct(StructType),
    /// Generic nullable wrapper of T
    Nullable(Box<TypeDesc>),
    /// Managed reference to T
    ByRef(Box<TypeDesc>),
    /// Unmanaged pointer to T
    PointerTo(Box<TypeDesc>),
}

impl TypeDesc {
    pub fn array_of(element: TypeDesc) -> Self {
        TypeDesc::Array(Box::new(element))
    }

    pub fn nullable(inner: TypeDesc) -> Self {
        TypeDesc::Nullable(Box::new(inner))
    }

    pub fn by_ref(inner: TypeDesc) -> Self {
        TypeDesc::ByRef(Box::new(inner))
    }

    pub fn pointer_to(inner: TypeDesc) -> Self {
        TypeDesc::PointerTo(Box::new(inner))
    }

    pub fn typed_reference() -> Self {
        TypeDesc::Struct(StructType::typed_reference())
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, TypeDesc::EnumBase | TypeDesc::Enum(_))
    }

    pub fn is_value_struct(&self) -> bool {
        matches!(self, TypeDesc::Struct(_))
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Object => write!(f, "object"),
            TypeDesc::Class(name) => write!(f, "{}", name),
            TypeDesc::Array(elem) => write!(f, "{}[]", elem),
            TypeDesc::String => write!(f, "string"),
            TypeDesc::Pointer => write!(f, "nint"),
            TypeDesc::UnsignedPointer => write!(f, "nuint"),
            TypeDesc::UInt64 => write!(f, "u64"),
            TypeDesc::UInt32 => write!(f, "u32"),
            TypeDesc::UInt16 => write!(f, "u16"),
            TypeDesc::Int64 => write!(f, "i64"),
            TypeDesc::Int32 => write!(f, "i32"),
            TypeDesc::Int16 => write!(f, "i16"),
            TypeDesc::UInt8 => write!(f, "u8"),
            TypeDesc::Int8 => write!(f, "i8"),
            TypeDesc::Float64 => write!(f, "f64"),
            TypeDesc::Float32 => write!(f, "f32"),
            TypeDesc::Bool => write!(f, "bool"),
            TypeDesc::Char => write!(f, "char"),
            TypeDesc::EnumBase => write!(f, "enum"),
            TypeDesc::Enum(e) => write!(f, "{}", e.name),
            TypeDesc::Struct(s) => write!(f, "{}", s.name),
            TypeDesc::Nullable(inner) => write!(f, "{}?", inner),
            TypeDesc::ByRef(inner) => write!(f, "&{}", inner),
            TypeDesc::PointerTo(inner) => write!(f, "*{}", inner),
        }
    }
}

/// Strips one level of pointer/reference indirection
pub trait TypeNormalizer {
    fn normalize(&self, ty: &TypeDesc) -> TypeDesc;
}

/// True iff the type is a nullable-of-T instantiation
pub trait NullablePredicate {
    fn is_nullable(&self, ty: &TypeDesc) -> bool;
}

/// Default collaborator implementations for the closed descriptor set
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTypes;

impl TypeNormalizer for StandardTypes {
    fn normalize(&self, ty: &TypeDesc) -> TypeDesc {
        match ty {
            TypeDesc::ByRef(inner) | TypeDesc::PointerTo(inner) => (**inner).clone(),
            other => other.clone(),
        }
    }
}

impl NullablePredicate for StandardTypes {
    fn is_nullable(&self, ty: &TypeDesc) -> bool {
        matches!(ty, TypeDesc::Nullable(_))
    }
}
