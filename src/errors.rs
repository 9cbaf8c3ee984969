mod activation;
mod registry;
mod resolve;
mod verification;

pub use activation::ActivationErrorKind;
pub use registry::RegistryErrorKind;
pub use resolve::ResolveErrorKind;
pub use verification::{VerificationError, VerificationFailure};
