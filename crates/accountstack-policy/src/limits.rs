//! Service limits on managed policies and permission sets.
//!
//! The identity service rejects these at apply time; checking them during
//! synthesis fails the run before anything is submitted.

use crate::{PolicyDocument, PolicyError};

/// Maximum customer-managed policy references per permission set.
pub const MAX_CUSTOMER_MANAGED_POLICIES: usize = 10;

/// Maximum AWS-managed policy references per permission set.
pub const MAX_AWS_MANAGED_POLICIES: usize = 10;

/// Maximum non-whitespace characters in a managed policy document.
pub const MAX_POLICY_CHARACTERS: usize = 6144;

/// Check a managed policy body against [`MAX_POLICY_CHARACTERS`].
///
/// # Errors
/// Returns [`PolicyError::LimitExceeded`] if the document is too large.
pub fn check_policy_size(name: &str, document: &PolicyDocument) -> Result<(), PolicyError> {
    let actual = document.character_count();
    if actual > MAX_POLICY_CHARACTERS {
        return Err(PolicyError::LimitExceeded {
            subject: name.to_owned(),
            limit: "managed policy size",
            actual,
            max: MAX_POLICY_CHARACTERS,
        });
    }
    Ok(())
}

/// Check a permission set's reference counts.
///
/// # Errors
/// Returns [`PolicyError::LimitExceeded`] if either list is too long.
pub fn check_permission_set_references(
    name: &str,
    customer_managed: usize,
    aws_managed: usize,
) -> Result<(), PolicyError> {
    if customer_managed > MAX_CUSTOMER_MANAGED_POLICIES {
        return Err(PolicyError::LimitExceeded {
            subject: name.to_owned(),
            limit: "customer-managed policy references",
            actual: customer_managed,
            max: MAX_CUSTOMER_MANAGED_POLICIES,
        });
    }
    if aws_managed > MAX_AWS_MANAGED_POLICIES {
        return Err(PolicyError::LimitExceeded {
            subject: name.to_owned(),
            limit: "AWS-managed policy references",
            actual: aws_managed,
            max: MAX_AWS_MANAGED_POLICIES,
        });
    }
    Ok(())
}
