use alloc::boxed::Box;
use core::fmt::{self, Display, Formatter};

use super::activation::ActivationErrorKind;
use crate::{any::TypeInfo, lifestyle::Lifestyle};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No registration for type {service} could be found")]
    NotRegistered { service: TypeInfo },
    #[error("Registration #{index} doesn't belong to this container")]
    UnknownRegistration { index: usize },
    #[error(
        "\
        The constructor of {consumer} contains a parameter of type {parameter} that is not registered. \
        Please ensure {parameter} is registered.\
        "
    )]
    MissingRegistration { consumer: TypeInfo, parameter: TypeInfo },
    #[error(
        "\
        The constructor of decorator {decorator} has no parameter of type {service}, \
        so the decorated {service} would be dropped from the graph.\
        "
    )]
    MissingDecoratee { decorator: TypeInfo, service: TypeInfo },
    #[error("The constructor of decorator {decorator} takes the decorated {service} more than once")]
    DuplicateDecoratee { decorator: TypeInfo, service: TypeInfo },
    #[error(transparent)]
    Activation(#[from] ActivationErrorKind),
    #[error("Cyclic dependency detected: {}", CyclePath(.path))]
    CyclicDependency { path: Box<[TypeInfo]> },
    #[error(
        "\
        Lifestyle of {service} is ambiguous: dependencies have distinct lifestyles {first} and {second} \
        with the same length {}. Register {service} with an explicit lifestyle.\
        ",
        .first.length
    )]
    AmbiguousLifestyle {
        service: TypeInfo,
        first: Lifestyle,
        second: Lifestyle,
    },
    #[error("Creation strategy of {service} can't be compiled: {error}")]
    Compile { service: TypeInfo, error: anyhow::Error },
}

struct CyclePath<'a>(&'a [TypeInfo]);

impl Display for CyclePath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, type_info) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{type_info}")?;
        }
        Ok(())
    }
}
