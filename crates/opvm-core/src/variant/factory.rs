//! Variant Factory
//!
//! Classifies a native value plus an optional declared type into a tagged
//! [`Variant`]. Classification never fails: values that cannot be coerced
//! are kept as-is or fall through to the generic object kind.

use tracing::debug;

use super::native::{EnumValue, NativeValue, StructValue};
use super::types::{
    EnumType, IntegralType, NullablePredicate, StandardTypes, StructType, TypeDesc, TypeNormalizer,
};
use super::value::{Variant, VariantKind};

/// Builds variants using a type normalizer and a nullable-generic predicate
#[derive(Debug, Clone, Default)]
pub struct VariantFactory<N = StandardTypes, P = StandardTypes> {
    normalizer: N,
    nullable: P,
}

impl VariantFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N: TypeNormalizer, P: NullablePredicate> VariantFactory<N, P> {
    pub fn with_collaborators(normalizer: N, nullable: P) -> Self {
        VariantFactory { normalizer, nullable }
    }

    /// Classify `value` against `declared`.
    ///
    /// Rules are applied in a fixed priority order; the first one that
    /// matches decides the kind:
    /// 1. an existing variant passes through unchanged
    /// 2. with no declared type, the value's runtime type is used (no value
    ///    at all gives an untyped object)
    /// 3. the declared type is normalized (one indirection level stripped)
    /// 4. the object type gives an object, recording a more specific runtime type
    /// 5. array, string, pointer and primitive types give their own kind
    /// 6. nullable-of-T gives an object recording the nullable type
    /// 7. enum types give an enum instance (returned directly)
    /// 8. struct types give a struct value (returned directly)
    /// 9. anything else gives a generic object
    ///
    /// Except for rules 7 and 8 the value, if any, is then assigned as payload.
    pub fn classify(&self, value: Option<NativeValue>, declared: Option<&TypeDesc>) -> Variant {
        let value = match value {
            Some(NativeValue::Variant(existing)) => return *existing,
            other => other,
        };

        let declared = match (declared, &value) {
            (Some(ty), _) => ty.clone(),
            (None, Some(v)) => v.runtime_type(),
            (None, None) => return Variant::object(None),
        };

        let ty = self.normalizer.normalize(&declared);

        let mut variant = if ty == TypeDesc::Object {
            let recorded = value
                .as_ref()
                .map(NativeValue::runtime_type)
                .filter(|t| *t != TypeDesc::Object);
            Variant::object(recorded)
        } else if let Some(kind) = primitive_kind(&ty) {
            Variant::new(kind)
        } else if self.nullable.is_nullable(&ty) {
            Variant::object(Some(ty.clone()))
        } else if ty.is_enum() {
            return Variant::from_enum(coerce_enum(&ty, value));
        } else if let TypeDesc::Struct(st) = &ty {
            return Variant::from_struct(coerce_struct(st, value));
        } else {
            Variant::object(None)
        };

        if let Some(value) = value {
            if let Err(e) = variant.assign(value) {
                debug!(declared = %declared, error = %e, "payload not representable; keeping zero value");
            }
        }
        variant
    }
}

/// Classify with the standard collaborators
pub fn classify(value: Option<NativeValue>, declared: Option<&TypeDesc>) -> Variant {
    VariantFactory::new().classify(value, declared)
}

/// Rule 5: first match wins, in this order.
fn primitive_kind(ty: &TypeDesc) -> Option<VariantKind> {
    let kind = match ty {
        TypeDesc::Array(_) => VariantKind::Array,
        TypeDesc::String => VariantKind::String,
        TypeDesc::Pointer => VariantKind::Pointer,
        TypeDesc::UnsignedPointer => VariantKind::UnsignedPointer,
        TypeDesc::UInt64 => VariantKind::UInt64,
        TypeDesc::UInt32 => VariantKind::UInt32,
        TypeDesc::UInt16 => VariantKind::UInt16,
        TypeDesc::Int64 => VariantKind::Int64,
        TypeDesc::Int32 => VariantKind::Int32,
        TypeDesc::Int16 => VariantKind::Int16,
        TypeDesc::UInt8 => VariantKind::UInt8,
        TypeDesc::Int8 => VariantKind::Int8,
        TypeDesc::Float64 => VariantKind::Float64,
        TypeDesc::Float32 => VariantKind::Float32,
        TypeDesc::Bool => VariantKind::Bool,
        TypeDesc::Char => VariantKind::Char,
        _ => return None,
    };
    Some(kind)
}

fn coerce_enum(ty: &TypeDesc, value: Option<NativeValue>) -> EnumValue {
    match (ty, value) {
        (TypeDesc::EnumBase, Some(NativeValue::Enum(existing))) => existing,
        (TypeDesc::Enum(et), None) => EnumValue::zero(et.clone()),
        (TypeDesc::Enum(et), Some(v)) => match v.as_integer() {
            Some(raw) => EnumValue::from_integer(et.clone(), raw),
            None => {
                debug!(target_type = %et.name, value = %v, "value has no integral form; using zero");
                EnumValue::zero(et.clone())
            }
        },
        (_, Some(v)) => {
            let underlying = underlying_of(&v);
            match v.as_integer() {
                Some(raw) => EnumValue::from_integer(EnumType::anonymous(underlying), raw),
                None => EnumValue::zero(EnumType::anonymous(underlying)),
            }
        }
        (_, None) => EnumValue::zero(EnumType::anonymous(IntegralType::Int32)),
    }
}

/// Underlying width used when an integral value is boxed against the enum base type.
fn underlying_of(value: &NativeValue) -> IntegralType {
    match value {
        NativeValue::UInt8(_) => IntegralType::UInt8,
        NativeValue::Int8(_) => IntegralType::Int8,
        NativeValue::UInt16(_) => IntegralType::UInt16,
        NativeValue::Int16(_) => IntegralType::Int16,
        NativeValue::UInt32(_) => IntegralType::UInt32,
        NativeValue::UInt64(_) | NativeValue::UnsignedPointer(_) => IntegralType::UInt64,
        NativeValue::Int64(_) | NativeValue::Pointer(_) => IntegralType::Int64,
        _ => IntegralType::Int32,
    }
}

fn coerce_struct(st: &StructType, value: Option<NativeValue>) -> NativeValue {
    let value = match value {
        Some(v) => v,
        None if st.is_typed_reference() => {
            return NativeValue::Struct(StructValue::uninitialized(st.clone()));
        }
        None => return NativeValue::Struct(StructValue::default_for(st.clone())),
    };
    // TODO: confirm against the interpreter whether a failed conversion should
    // be reported instead of keeping the mismatched value.
    match value.convert_to(&TypeDesc::Struct(st.clone())) {
        Ok(converted) => converted,
        Err(original) => {
            debug!(target_type = %st.name, value = %original, "struct conversion failed; keeping original");
            original
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_int32_keeps_payload() {
        let v = classify(Some(NativeValue::Int32(5)), Some(&TypeDesc::Int32));
        assert_eq!(v.kind(), VariantKind::Int32);
        assert_eq!(v.payload(), Some(&NativeValue::Int32(5)));
    }

    #[test]
    fn null_object_has_no_recorded_type() {
        let v = classify(None, Some(&TypeDesc::Object));
        assert_eq!(v.kind(), VariantKind::Object);
        assert!(v.recorded_type().is_none());
        assert!(v.payload().is_none());
    }

    #[test]
    fn no_value_no_type_is_untyped_object() {
        let v = classify(None, None);
        assert_eq!(v.kind(), VariantKind::Object);
        assert!(v.recorded_type().is_none());
    }

    #[test]
    fn existing_variant_passes_through() {
        let inner = classify(Some(NativeValue::Bool(true)), None);
        let again = classify(
            Some(NativeValue::Variant(Box::new(inner.clone()))),
            Some(&TypeDesc::String),
        );
        assert_eq!(again, inner);
    }

    #[test]
    fn by_ref_declared_type_is_normalized() {
        let v = classify(
            Some(NativeValue::Int16(-3)),
            Some(&TypeDesc::by_ref(TypeDesc::Int16)),
        );
        assert_eq!(v.kind(), VariantKind::Int16);
        assert_eq!(v.payload(), Some(&NativeValue::Int16(-3)));
    }
}
