//! Tagged Operand Representation
//!
//! Defines the variant kinds and the `Variant` container used for every
//! dynamically-typed VM operand. A variant's kind is fixed at construction.

use std::fmt;

use crate::error::{OpvmError, OpvmResult};

use super::native::{EnumValue, NativeValue};
use super::types::TypeDesc;

/// Representation kind of a VM operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Object,
    Array,
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
    Enum,
    ValueStruct,
}

impl VariantKind {
    /// Type payloads are converted to when assigned. `None` for kinds that
    /// hold values of many types.
    pub fn canonical_type(self) -> Option<TypeDesc> {
        let ty = match self {
            VariantKind::Object | VariantKind::Array | VariantKind::ValueStruct => return None,
            VariantKind::Enum => TypeDesc::EnumBase,
            VariantKind::String => TypeDesc::String,
            VariantKind::Pointer => TypeDesc::Pointer,
            VariantKind::UnsignedPointer => TypeDesc::UnsignedPointer,
            VariantKind::UInt64 => TypeDesc::UInt64,
            VariantKind::UInt32 => TypeDesc::UInt32,
            VariantKind::UInt16 => TypeDesc::UInt16,
            VariantKind::Int64 => TypeDesc::Int64,
            VariantKind::Int32 => TypeDesc::Int32,
            VariantKind::Int16 => TypeDesc::Int16,
            VariantKind::UInt8 => TypeDesc::UInt8,
            VariantKind::Int8 => TypeDesc::Int8,
            VariantKind::Float64 => TypeDesc::Float64,
            VariantKind::Float32 => TypeDesc::Float32,
            VariantKind::Bool => TypeDesc::Bool,
            VariantKind::Char => TypeDesc::Char,
        };
        Some(ty)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            VariantKind::Pointer
                | VariantKind::UnsignedPointer
                | VariantKind::UInt64
                | VariantKind::UInt32
                | VariantKind::UInt16
                | VariantKind::Int64
                | VariantKind::Int32
                | VariantKind::Int16
                | VariantKind::UInt8
                | VariantKind::Int8
                | VariantKind::Float64
                | VariantKind::Float32
        )
    }
}

/// Tagged VM operand
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    kind: VariantKind,
    payload: Option<NativeValue>,
    recorded_type: Option<TypeDesc>,
}

impl Variant {
    /// Create a variant of `kind` holding that kind's zero value (or nothing
    /// for reference-like kinds).
    pub fn new(kind: VariantKind) -> Self {
        let payload = kind.canonical_type().and_then(|t| NativeValue::zero_of(&t));
        Variant {
            kind,
            payload,
            recorded_type: None,
        }
    }

    /// Generic object variant, optionally remembering a more specific logical type
    pub fn object(recorded_type: Option<TypeDesc>) -> Self {
        Variant {
            kind: VariantKind::Object,
            payload: None,
            recorded_type,
        }
    }

    pub fn from_enum(value: EnumValue) -> Self {
        Variant {
            kind: VariantKind::Enum,
            payload: Some(NativeValue::Enum(value)),
            recorded_type: None,
        }
    }

    /// Wrap a struct value. The payload is kept as given.
    pub fn from_struct(value: NativeValue) -> Self {
        Variant {
            kind: VariantKind::ValueStruct,
            payload: Some(value),
            recorded_type: None,
        }
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    pub fn payload(&self) -> Option<&NativeValue> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<NativeValue> {
        self.payload
    }

    pub fn recorded_type(&self) -> Option<&TypeDesc> {
        self.recorded_type.as_ref()
    }

    /// Recorded type if present, else the payload's runtime type, else the
    /// kind's canonical type.
    pub fn logical_type(&self) -> TypeDesc {
        if let Some(ty) = &self.recorded_type {
            return ty.clone();
        }
        if let Some(payload) = &self.payload {
            return payload.runtime_type();
        }
        self.kind.canonical_type().unwrap_or(TypeDesc::Object)
    }

    /// Store a payload, converting it to this variant's kind.
    pub fn assign(&mut self, value: NativeValue) -> OpvmResult<()> {
        let accepted = match self.kind {
            VariantKind::Object => Ok(value),
            VariantKind::Array => match value {
                NativeValue::Array(_) => Ok(value),
                other => Err(other),
            },
            VariantKind::ValueStruct => match value {
                NativeValue::Struct(_) => Ok(value),
                other => Err(other),
            },
            VariantKind::Enum => match value {
                NativeValue::Enum(_) => Ok(value),
                other => Err(other),
            },
            kind => match kind.canonical_type() {
                Some(ty) => value.convert_to(&ty),
                None => Err(value),
            },
        };
        match accepted {
            Ok(v) => {
                self.payload = Some(v);
                Ok(())
            }
            Err(rejected) => Err(OpvmError::invalid_argument(format!(
                "{} is not representable as {:?}",
                rejected.runtime_type(),
                self.kind
            ))),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(ty) = &self.recorded_type {
            write!(f, "<{}>", ty)?;
        }
        match &self.payload {
            Some(p) => write!(f, "({})", p),
            None => write!(f, "(null)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_numeric_variant_starts_at_zero() {
        let v = Variant::new(VariantKind::UInt16);
        assert_eq!(v.payload(), Some(&NativeValue::UInt16(0)));
        assert_eq!(Variant::new(VariantKind::String).payload(), None);
    }

    #[test]
    fn assign_converts_into_kind() {
        let mut v = Variant::new(VariantKind::Int64);
        v.assign(NativeValue::UInt8(9)).expect("assign failed");
        assert_eq!(v.payload(), Some(&NativeValue::Int64(9)));
        assert_eq!(v.kind(), VariantKind::Int64);
    }

    #[test]
    fn assign_rejects_unrepresentable_value() {
        let mut v = Variant::new(VariantKind::Int8);
        let err = v.assign(NativeValue::String("x".into())).unwrap_err();
        assert!(matches!(err, OpvmError::InvalidArgument { .. }));
        assert_eq!(v.payload(), Some(&NativeValue::Int8(0)));
    }

    #[test]
    fn display_shows_recorded_type() {
        let mut v = Variant::object(Some(TypeDesc::nullable(TypeDesc::Int32)));
        v.assign(NativeValue::Int32(4)).expect("assign failed");
        assert_eq!(v.to_string(), "Object<i32?>(4)");
    }
}
