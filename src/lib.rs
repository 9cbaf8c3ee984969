#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod registry_macros;

pub(crate) mod any;
pub(crate) mod config;
pub(crate) mod constructor;
pub(crate) mod container;
pub(crate) mod descriptor;
pub(crate) mod diagnostics;
pub(crate) mod errors;
pub(crate) mod lifestyle;
pub(crate) mod registration;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod strategy;
pub(crate) mod verifier;

pub use any::TypeInfo;
pub use config::Config;
pub use constructor::{ConstructorResolutionBehavior, DefaultConstructorResolutionBehavior};
pub use container::Container;
pub use descriptor::{Component, ComponentDescriptor, ConstructorDescriptor, TypeKind};
pub use diagnostics::{DependencyNode, ObjectGraph};
pub use errors::{ActivationErrorKind, RegistryErrorKind, ResolveErrorKind, VerificationError, VerificationFailure};
pub use lifestyle::{DeclaredLifestyle, DefaultLifestyle, Lifestyle};
pub use registration::{BoxedFactory, ImplementationSource, Registration, RegistrationId, Relationship, RelationshipKind};
pub use registry::RegistryBuilder;
pub use strategy::{Caching, CreationStrategy, Creator, LifestyleCompiler, ResolvedGraph, StrategyCompiler};
