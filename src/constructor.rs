use tracing::debug;

use crate::{
    any::TypeInfo,
    descriptor::{ComponentDescriptor, ConstructorDescriptor, TypeKind},
    errors::ActivationErrorKind,
};

/// Picks the constructor used to inject an implementation type.
pub trait ConstructorResolutionBehavior {
    /// # Errors
    /// Returns [`ActivationErrorKind`] if no single constructor can be chosen for `implementation`.
    fn select_constructor<'a>(
        &self,
        service: TypeInfo,
        implementation: &'a ComponentDescriptor,
    ) -> Result<&'a ConstructorDescriptor, ActivationErrorKind>;
}

/// Requires a concrete implementation type with exactly one public constructor.
/// Zero and multiple constructors are both configuration errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultConstructorResolutionBehavior;

impl ConstructorResolutionBehavior for DefaultConstructorResolutionBehavior {
    fn select_constructor<'a>(
        &self,
        service: TypeInfo,
        implementation: &'a ComponentDescriptor,
    ) -> Result<&'a ConstructorDescriptor, ActivationErrorKind> {
        verify_type_is_concrete(implementation)?;

        match implementation.constructors.as_slice() {
            [constructor] => {
                debug!(
                    service = service.name,
                    implementation = implementation.type_info.name,
                    parameters = constructor.parameters.len(),
                    "Constructor selected"
                );
                Ok(constructor)
            }
            [] => Err(ActivationErrorKind::NoConstructors {
                type_info: implementation.type_info,
            }),
            constructors => Err(ActivationErrorKind::AmbiguousConstructor {
                type_info: implementation.type_info,
                count: constructors.len(),
            }),
        }
    }
}

fn verify_type_is_concrete(implementation: &ComponentDescriptor) -> Result<(), ActivationErrorKind> {
    // `dyn Any` flavors are rejected whatever kind the descriptor declares
    let kind = if implementation.type_info.is_universal_object() {
        "universal object"
    } else {
        match implementation.kind {
            TypeKind::Concrete => return Ok(()),
            kind => kind.name(),
        }
    };

    Err(ActivationErrorKind::NotConcrete {
        type_info: implementation.type_info,
        kind,
    })
}
