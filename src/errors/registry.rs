use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryErrorKind {
    #[error(
        "\
        Automatic lifestyle doesn't support factory registrations, there is no dependency graph to inspect. \
        Register the factory of {service} with an explicit lifestyle.\
        "
    )]
    NotSupported { service: TypeInfo },
    #[error("Type {service} has already been registered. Overriding registrations is disabled in config.")]
    DuplicateRegistration { service: TypeInfo },
    #[error("Decorator {decorator} can't be applied, no registration for {service} found")]
    NoDecoratee { service: TypeInfo, decorator: TypeInfo },
}
