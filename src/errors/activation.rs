use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivationErrorKind {
    #[error("The given type {type_info} is not a concrete type ({kind}). Register a concrete implementation or a factory instead.")]
    NotConcrete { type_info: TypeInfo, kind: &'static str },
    #[error("For the container to be able to create {type_info}, it should contain exactly one public constructor, but it has none.")]
    NoConstructors { type_info: TypeInfo },
    #[error("For the container to be able to create {type_info}, it should contain exactly one public constructor, but it has {count}.")]
    AmbiguousConstructor { type_info: TypeInfo, count: usize },
}
