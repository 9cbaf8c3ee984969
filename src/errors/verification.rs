use alloc::vec::Vec;
use core::fmt::{self, Display, Formatter};

use super::resolve::ResolveErrorKind;
use crate::any::TypeInfo;

#[derive(Debug)]
pub struct VerificationFailure {
    pub service: TypeInfo,
    pub error: ResolveErrorKind,
}

/// Every independent configuration problem found by one verification pass
#[derive(thiserror::Error, Debug)]
pub struct VerificationError {
    pub failures: Vec<VerificationFailure>,
}

impl Display for VerificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "The configuration is invalid, {} registration(s) failed verification:", self.failures.len())?;
        for VerificationFailure { service, error } in &self.failures {
            write!(f, "\n- {service}: {error}")?;
        }
        Ok(())
    }
}
