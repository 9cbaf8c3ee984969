use core::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use crate::{
    registration::{ImplementationSource, Registration, RegistrationId},
    strategy::{Caching, CreationStrategy, Creator},
};

/// How long a created instance is reused before a new one is created.
///
/// A larger `length` means a longer-lived instance.
/// Two lifestyles are equal only if both `name` and `length` match,
/// while ordering questions ([`Lifestyle::cmp_length`], [`Lifestyle::is_shorter_than`]) look at the length only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Lifestyle {
    pub name: &'static str,
    pub length: u16,
}

impl Lifestyle {
    /// New instance per resolution
    pub const TRANSIENT: Self = Self::new("Transient", 1);
    /// One instance per scope (unit of work)
    pub const SCOPED: Self = Self::new("Scoped", 500);
    /// One instance per process
    pub const SINGLETON: Self = Self::new("Singleton", 1000);

    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, length: u16) -> Self {
        Self { name, length }
    }

    #[inline]
    #[must_use]
    pub fn cmp_length(&self, other: &Self) -> Ordering {
        self.length.cmp(&other.length)
    }

    #[inline]
    #[must_use]
    pub fn is_shorter_than(&self, other: &Self) -> bool {
        self.length < other.length
    }

    /// Turns a registration into the creation strategy this lifestyle implies.
    ///
    /// Lifestyles at or below [`Self::TRANSIENT`] never cache,
    /// lifestyles at or above [`Self::SINGLETON`] cache for the whole process
    /// and everything in between caches per scope.
    #[must_use]
    pub fn creation_strategy(&self, registration: &Registration, dependencies: &[RegistrationId]) -> CreationStrategy {
        let caching = if self.length <= Self::TRANSIENT.length {
            Caching::Never
        } else if self.length >= Self::SINGLETON.length {
            Caching::Process
        } else {
            Caching::Scope { name: self.name }
        };
        let creator = match registration.source() {
            ImplementationSource::Constructor(_) => Creator::Constructor {
                dependencies: dependencies.into(),
            },
            ImplementationSource::Factory(factory) => Creator::Factory(factory.clone()),
        };

        CreationStrategy {
            implementation: registration.implementation(),
            lifestyle: *self,
            caching,
            creator,
        }
    }
}

impl Display for Lifestyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Lifestyle as it was declared for a registration.
/// [`DeclaredLifestyle::Automatic`] has no length until the dependency graph is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclaredLifestyle {
    Concrete(Lifestyle),
    Automatic,
}

impl DeclaredLifestyle {
    #[inline]
    #[must_use]
    pub fn concrete(&self) -> Option<Lifestyle> {
        match self {
            Self::Concrete(lifestyle) => Some(*lifestyle),
            Self::Automatic => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concrete(lifestyle) => lifestyle.name,
            Self::Automatic => "Automatic",
        }
    }
}

impl From<Lifestyle> for DeclaredLifestyle {
    fn from(lifestyle: Lifestyle) -> Self {
        Self::Concrete(lifestyle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultLifestyle {
    Transient,
    Scoped,
    Singleton,
    Automatic,
}

impl From<DefaultLifestyle> for DeclaredLifestyle {
    fn from(lifestyle: DefaultLifestyle) -> Self {
        match lifestyle {
            DefaultLifestyle::Transient => Self::Concrete(Lifestyle::TRANSIENT),
            DefaultLifestyle::Scoped => Self::Concrete(Lifestyle::SCOPED),
            DefaultLifestyle::Singleton => Self::Concrete(Lifestyle::SINGLETON),
            DefaultLifestyle::Automatic => Self::Automatic,
        }
    }
}
