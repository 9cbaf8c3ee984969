use alloc::boxed::Box;
use core::fmt::{self, Debug, Formatter};

use crate::{
    any::TypeInfo,
    lifestyle::Lifestyle,
    registration::{BoxedFactory, Registration, RegistrationId, Relationship},
};

/// How long a created instance is kept for reuse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Caching {
    Never,
    Scope { name: &'static str },
    Process,
}

#[derive(Clone)]
pub enum Creator {
    /// Call the selected constructor with instances of these registrations, in parameter order
    Constructor { dependencies: Box<[RegistrationId]> },
    Factory(BoxedFactory),
}

impl Debug for Creator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor { dependencies } => f.debug_struct("Constructor").field("dependencies", dependencies).finish(),
            Self::Factory(_) => f.write_str("Factory(<function>)"),
        }
    }
}

/// Compiled plan for creating instances of one registration
#[derive(Clone, Debug)]
pub struct CreationStrategy {
    pub implementation: TypeInfo,
    pub lifestyle: Lifestyle,
    pub caching: Caching,
    pub creator: Creator,
}

/// Concrete lifestyle of a registration together with its compiled creation strategy
#[derive(Clone, Debug)]
pub struct ResolvedGraph {
    pub lifestyle: Lifestyle,
    pub strategy: CreationStrategy,
}

/// Turns a registration with a known lifestyle into a creation strategy.
/// Implement it to plug in another code generator, the default one is [`LifestyleCompiler`].
pub trait StrategyCompiler {
    /// # Errors
    /// Any error stops verification of the registration and is reported as a compile error.
    fn compile(&self, registration: &Registration, lifestyle: Lifestyle, relationships: &[Relationship]) -> anyhow::Result<CreationStrategy>;
}

/// Asks the lifestyle itself for the strategy, see [`Lifestyle::creation_strategy`]
#[derive(Clone, Copy, Debug, Default)]
pub struct LifestyleCompiler;

impl StrategyCompiler for LifestyleCompiler {
    fn compile(&self, registration: &Registration, lifestyle: Lifestyle, relationships: &[Relationship]) -> anyhow::Result<CreationStrategy> {
        let dependencies: alloc::vec::Vec<_> = relationships.iter().map(|relationship| relationship.dependency).collect();
        Ok(lifestyle.creation_strategy(registration, &dependencies))
    }
}

impl<F> StrategyCompiler for F
where
    F: Fn(&Registration, Lifestyle, &[Relationship]) -> anyhow::Result<CreationStrategy>,
{
    fn compile(&self, registration: &Registration, lifestyle: Lifestyle, relationships: &[Relationship]) -> anyhow::Result<CreationStrategy> {
        self(registration, lifestyle, relationships)
    }
}
