//! Native Values
//!
//! The untagged runtime values the interpreter loads and computes. Each one
//! reports its own runtime type; the factory uses that to pick a variant kind.

use std::fmt;

use super::types::{EnumType, IntegralType, StructType, TypeDesc};
use super::value::Variant;

/// Host-side reference to an instance of a reference class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// `None` for a plain object instance
    pub class: Option<String>,
    pub handle: u64,
}

impl ObjectRef {
    pub fn plain(handle: u64) -> Self {
        ObjectRef { class: None, handle }
    }

    pub fn of_class(class: impl Into<String>, handle: u64) -> Self {
        ObjectRef {
            class: Some(class.into()),
            handle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub element: TypeDesc,
    pub items: Vec<Option<NativeValue>>,
}

/// An enumeration instance: a type plus the raw bit pattern of its underlying integer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    ty: EnumType,
    bits: u64,
}

impl EnumValue {
    /// Reinterpret an integer as a member of `ty`, truncating to the underlying width.
    pub fn from_integer(ty: EnumType, value: i128) -> Self {
        let bits = ty.underlying.truncate(value);
        EnumValue { ty, bits }
    }

    pub fn zero(ty: EnumType) -> Self {
        EnumValue { ty, bits: 0 }
    }

    pub fn enum_type(&self) -> &EnumType {
        &self.ty
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn value(&self) -> i128 {
        self.ty.underlying.widen(self.bits)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty.member_name(self.value()) {
            Some(member) => write!(f, "{}.{}", self.ty.name, member),
            None => write!(f, "{}({})", self.ty.name, self.value()),
        }
    }
}

/// A struct instance laid out per its [`StructType`]
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    ty: StructType,
    fields: Vec<Option<NativeValue>>,
    constructed: bool,
}

impl StructValue {
    /// Default-construct: every field holds its type's zero value.
    pub fn default_for(ty: StructType) -> Self {
        let fields = ty.fields.iter().map(|(_, t)| NativeValue::zero_of(t)).collect();
        StructValue {
            ty,
            fields,
            constructed: true,
        }
    }

    /// Allocate without running any constructor; all fields are empty.
    pub fn uninitialized(ty: StructType) -> Self {
        let fields = vec![None; ty.fields.len()];
        StructValue {
            ty,
            fields,
            constructed: false,
        }
    }

    /// Build from explicit field values. Returns `None` on arity mismatch.
    pub fn with_fields(ty: StructType, fields: Vec<Option<NativeValue>>) -> Option<Self> {
        if fields.len() != ty.fields.len() {
            return None;
        }
        Some(StructValue {
            ty,
            fields,
            constructed: true,
        })
    }

    pub fn struct_type(&self) -> &StructType {
        &self.ty
    }

    pub fn field(&self, name: &str) -> Option<&NativeValue> {
        let idx = self.ty.fields.iter().position(|(n, _)| n == name)?;
        self.fields[idx].as_ref()
    }

    pub fn fields(&self) -> &[Option<NativeValue>] {
        &self.fields
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Best-effort layout conversion. Field names must line up in order and
    /// each field must convert to the target field type. A target with a
    /// single field also accepts a scalar convertible to that field.
    fn convert_from(value: NativeValue, target: &StructType) -> Result<NativeValue, NativeValue> {
        match value {
            NativeValue::Struct(src) => {
                let names_match = src.ty.fields.len() == target.fields.len()
                    && src
                        .ty
                        .fields
                        .iter()
                        .zip(&target.fields)
                        .all(|((a, _), (b, _))| a == b);
                if !names_match {
                    return Err(NativeValue::Struct(src));
                }
                let converted: Option<Vec<Option<NativeValue>>> = src
                    .fields
                    .iter()
                    .zip(&target.fields)
                    .map(|(field, (_, ty))| match field {
                        None => Some(None),
                        Some(v) => v.clone().convert_to(ty).ok().map(Some),
                    })
                    .collect();
                match converted {
                    Some(fields) => Ok(NativeValue::Struct(StructValue {
                        ty: target.clone(),
                        fields,
                        constructed: src.constructed,
                    })),
                    None => Err(NativeValue::Struct(src)),
                }
            }
            scalar if target.fields.len() == 1 => {
                let ty = &target.fields[0].1;
                match scalar.convert_to(ty) {
                    Ok(field) => Ok(NativeValue::Struct(StructValue {
                        ty: target.clone(),
                        fields: vec![Some(field)],
                        constructed: true,
                    })),
                    Err(original) => Err(original),
                }
            }
            other => Err(other),
        }
    }
}

/// A native runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// An already-tagged operand
    Variant(Box<Variant>),
    Object(ObjectRef),
    Array(ArrayValue),
    String(String),
    Pointer(isize),
    UnsignedPointer(usize),
    UInt64(u64),
    UInt32(u32),
    UInt16(u16),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    UInt8(u8),
    Int8(i8),
    Float64(f64),
    Float32(f32),
    Bool(bool),
    Char(char),
    Enum(EnumValue),
    Struct(StructValue),
}

impl NativeValue {
    /// The value's own runtime type
    pub fn runtime_type(&self) -> TypeDesc {
        match self {
            NativeValue::Variant(v) => v.logical_type(),
            NativeValue::Object(obj) => match &obj.class {
                Some(name) => TypeDesc::Class(name.clone()),
                None => TypeDesc::Object,
            },
            NativeValue::Array(a) => TypeDesc::array_of(a.element.clone()),
            NativeValue::String(_) => TypeDesc::String,
            NativeValue::Pointer(_) => TypeDesc::Pointer,
            NativeValue::UnsignedPointer(_) => TypeDesc::UnsignedPointer,
            NativeValue::UInt64(_) => TypeDesc::UInt64,
            NativeValue::UInt32(_) => TypeDesc::UInt32,
            NativeValue::UInt16(_) => TypeDesc::UInt16,
            NativeValue::Int64(_) => TypeDesc::Int64,
            NativeValue::Int32(_) => TypeDesc::Int32,
            NativeValue::Int16(_) => TypeDesc::Int16,
            NativeValue::UInt8(_) => TypeDesc::UInt8,
            NativeValue::Int8(_) => TypeDesc::Int8,
            NativeValue::Float64(_) => TypeDesc::Float64,
            NativeValue::Float32(_) => TypeDesc::Float32,
            NativeValue::Bool(_) => TypeDesc::Bool,
            NativeValue::Char(_) => TypeDesc::Char,
            NativeValue::Enum(e) => TypeDesc::Enum(e.enum_type().clone()),
            NativeValue::Struct(s) => TypeDesc::Struct(s.struct_type().clone()),
        }
    }

    /// Integral representation, if the value has one
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            NativeValue::Pointer(v) => Some(*v as i128),
            NativeValue::UnsignedPointer(v) => Some(*v as i128),
            NativeValue::UInt64(v) => Some(*v as i128),
            NativeValue::UInt32(v) => Some(*v as i128),
            NativeValue::UInt16(v) => Some(*v as i128),
            NativeValue::Int64(v) => Some(*v as i128),
            NativeValue::Int32(v) => Some(*v as i128),
            NativeValue::Int16(v) => Some(*v as i128),
            NativeValue::UInt8(v) => Some(*v as i128),
            NativeValue::Int8(v) => Some(*v as i128),
            NativeValue::Char(c) => Some(*c as u32 as i128),
            NativeValue::Bool(b) => Some(*b as i128),
            NativeValue::Enum(e) => Some(e.value()),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            NativeValue::Float64(v) => Some(*v),
            NativeValue::Float32(v) => Some(*v as f64),
            other => other.as_integer().map(|i| i as f64),
        }
    }

    /// Zero value of a type; `None` for reference types.
    pub fn zero_of(ty: &TypeDesc) -> Option<NativeValue> {
        match ty {
            TypeDesc::Pointer => Some(NativeValue::Pointer(0)),
            TypeDesc::UnsignedPointer => Some(NativeValue::UnsignedPointer(0)),
            TypeDesc::UInt64 => Some(NativeValue::UInt64(0)),
            TypeDesc::UInt32 => Some(NativeValue::UInt32(0)),
            TypeDesc::UInt16 => Some(NativeValue::UInt16(0)),
            TypeDesc::Int64 => Some(NativeValue::Int64(0)),
            TypeDesc::Int32 => Some(NativeValue::Int32(0)),
            TypeDesc::Int16 => Some(NativeValue::Int16(0)),
            TypeDesc::UInt8 => Some(NativeValue::UInt8(0)),
            TypeDesc::Int8 => Some(NativeValue::Int8(0)),
            TypeDesc::Float64 => Some(NativeValue::Float64(0.0)),
            TypeDesc::Float32 => Some(NativeValue::Float32(0.0)),
            TypeDesc::Bool => Some(NativeValue::Bool(false)),
            TypeDesc::Char => Some(NativeValue::Char('\0')),
            TypeDesc::Enum(e) => Some(NativeValue::Enum(EnumValue::zero(e.clone()))),
            TypeDesc::Struct(s) => Some(NativeValue::Struct(StructValue::default_for(s.clone()))),
            _ => None,
        }
    }

    /// Convert to `ty`. On failure the original value is handed back untouched.
    pub fn convert_to(self, ty: &TypeDesc) -> Result<NativeValue, NativeValue> {
        if self.runtime_type() == *ty {
            return Ok(self);
        }
        match ty {
            TypeDesc::Object => Ok(self),
            TypeDesc::Nullable(inner) => self.convert_to(inner),
            TypeDesc::EnumBase => match self {
                NativeValue::Enum(_) => Ok(self),
                other => Err(other),
            },
            TypeDesc::Enum(et) => match self.as_integer() {
                Some(i) if !matches!(self, NativeValue::Bool(_) | NativeValue::Char(_)) => {
                    Ok(NativeValue::Enum(EnumValue::from_integer(et.clone(), i)))
                }
                _ => Err(self),
            },
            TypeDesc::Struct(st) => StructValue::convert_from(self, st),
            TypeDesc::Bool => match self.as_float() {
                Some(f) if !matches!(self, NativeValue::Char(_)) => Ok(NativeValue::Bool(f != 0.0)),
                _ => Err(self),
            },
            TypeDesc::Char => match self.as_integer() {
                Some(i) if !matches!(self, NativeValue::Bool(_)) => u32::try_from(i)
                    .ok()
                    .and_then(char::from_u32)
                    .map(NativeValue::Char)
                    .ok_or(self),
                _ => Err(self),
            },
            TypeDesc::Float64 => match self {
                NativeValue::Bool(_) | NativeValue::Char(_) => Err(self),
                other => other.as_float().map(NativeValue::Float64).ok_or(other),
            },
            TypeDesc::Float32 => match self {
                NativeValue::Bool(_) | NativeValue::Char(_) => Err(self),
                other => other.as_float().map(|f| NativeValue::Float32(f as f32)).ok_or(other),
            },
            TypeDesc::Pointer
            | TypeDesc::UnsignedPointer
            | TypeDesc::UInt64
            | TypeDesc::UInt32
            | TypeDesc::UInt16
            | TypeDesc::Int64
            | TypeDesc::Int32
            | TypeDesc::Int16
            | TypeDesc::UInt8
            | TypeDesc::Int8 => match self.exact_integer() {
                Some(i) => integer_as(ty, i).ok_or(self),
                None => Err(self),
            },
            _ => Err(self),
        }
    }

    /// Integral value, accepting floats only when they carry no fraction.
    fn exact_integer(&self) -> Option<i128> {
        match self {
            NativeValue::Float64(f) => float_to_integer(*f),
            NativeValue::Float32(f) => float_to_integer(*f as f64),
            other => other.as_integer(),
        }
    }
}

fn float_to_integer(f: f64) -> Option<i128> {
    // i128 covers every integral target; larger magnitudes fail the range check later.
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.7e38 {
        Some(f as i128)
    } else {
        None
    }
}

fn integer_as(ty: &TypeDesc, i: i128) -> Option<NativeValue> {
    let value = match ty {
        TypeDesc::Pointer => NativeValue::Pointer(isize::try_from(i).ok()?),
        TypeDesc::UnsignedPointer => NativeValue::UnsignedPointer(usize::try_from(i).ok()?),
        TypeDesc::UInt64 => NativeValue::UInt64(u64::try_from(i).ok()?),
        TypeDesc::UInt32 => NativeValue::UInt32(u32::try_from(i).ok()?),
        TypeDesc::UInt16 => NativeValue::UInt16(u16::try_from(i).ok()?),
        TypeDesc::Int64 => NativeValue::Int64(i64::try_from(i).ok()?),
        TypeDesc::Int32 => NativeValue::Int32(i32::try_from(i).ok()?),
        TypeDesc::Int16 => NativeValue::Int16(i16::try_from(i).ok()?),
        TypeDesc::UInt8 => NativeValue::UInt8(u8::try_from(i).ok()?),
        TypeDesc::Int8 => NativeValue::Int8(i8::try_from(i).ok()?),
        _ => return None,
    };
    Some(value)
}

impl From<IntegralType> for TypeDesc {
    fn from(ty: IntegralType) -> Self {
        match ty {
            IntegralType::UInt8 => TypeDesc::UInt8,
            IntegralType::Int8 => TypeDesc::Int8,
            IntegralType::UInt16 => TypeDesc::UInt16,
            IntegralType::Int16 => TypeDesc::Int16,
            IntegralType::UInt32 => TypeDesc::UInt32,
            IntegralType::Int32 => TypeDesc::Int32,
            IntegralType::UInt64 => TypeDesc::UInt64,
            IntegralType::Int64 => TypeDesc::Int64,
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::Variant(v) => write!(f, "{}", v),
            NativeValue::Object(obj) => match &obj.class {
                Some(name) => write!(f, "<{}#{}>", name, obj.handle),
                None => write!(f, "<object#{}>", obj.handle),
            },
            NativeValue::Array(a) => write!(f, "{}[{}]", a.element, a.items.len()),
            NativeValue::String(s) => write!(f, "{:?}", s),
            NativeValue::Pointer(v) => write!(f, "{:#x}", v),
            NativeValue::UnsignedPointer(v) => write!(f, "{:#x}", v),
            NativeValue::UInt64(v) => write!(f, "{}", v),
            NativeValue::UInt32(v) => write!(f, "{}", v),
            NativeValue::UInt16(v) => write!(f, "{}", v),
            NativeValue::Int64(v) => write!(f, "{}", v),
            NativeValue::Int32(v) => write!(f, "{}", v),
            NativeValue::Int16(v) => write!(f, "{}", v),
            NativeValue::UInt8(v) => write!(f, "{}", v),
            NativeValue::Int8(v) => write!(f, "{}", v),
            NativeValue::Float64(v) => write!(f, "{}", v),
            NativeValue::Float32(v) => write!(f, "{}", v),
            NativeValue::Bool(v) => write!(f, "{}", v),
            NativeValue::Char(c) => write!(f, "{:?}", c),
            NativeValue::Enum(e) => write!(f, "{}", e),
            NativeValue::Struct(s) => write!(f, "{}{{..}}", s.struct_type().name),
        }
    }
}
