use crate::lifestyle::{DeclaredLifestyle, Lifestyle};

/// Config for a registry
/// ## Fields
/// - `default_lifestyle`:
///   Lifestyle of registrations and decorators declared without an explicit one.
///   Set it to [`DeclaredLifestyle::Automatic`] to let the dependency graph decide.
///
/// - `allow_overriding_registrations`:
///   If `true`, registering the same service type twice replaces the first registration,
///   otherwise building the registry fails.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub default_lifestyle: DeclaredLifestyle,
    pub allow_overriding_registrations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_lifestyle: DeclaredLifestyle::Concrete(Lifestyle::TRANSIENT),
            allow_overriding_registrations: false,
        }
    }
}
