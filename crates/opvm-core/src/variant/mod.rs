pub mod factory;
pub mod native;
pub mod types;
pub mod value;

pub use factory::{classify, VariantFactory};
pub use native::{ArrayValue, EnumValue, NativeValue, ObjectRef, StructValue};
pub use types::{
    EnumType, IntegralType, NullablePredicate, StandardTypes, StructType, TypeDesc, TypeNormalizer,
};
pub use value::{Variant, VariantKind};
