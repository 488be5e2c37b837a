//! Conditional mutation guarded by a version tag
//!
//! The helper here is the write-side core of the store: a compare-and-swap
//! on an opaque entity tag, structured as check, lock, recheck.

use std::sync::RwLock;

use crate::core::{StoreError, Versioned};

/// Mutate the entity behind `slot` only if its tag still equals `expected`.
///
/// The tag is compared twice. The first check holds only the shared lock,
/// so a stale caller is rejected without ever contending for the exclusive
/// one. The second check runs under the exclusive lock and closes the
/// window in which a racing writer may have committed between check and
/// lock. The lock covers this one entity; writers on other entities are
/// unaffected.
///
/// Returns the closure's result, or [`StoreError::Conflict`] when the tag
/// no longer matches.
pub fn mutate_versioned<T, R>(
    slot: &RwLock<T>,
    expected: &str,
    apply: impl FnOnce(&mut T) -> R,
) -> Result<R, StoreError>
where
    T: Versioned,
{
    {
        let current = slot.read().map_err(|_| StoreError::Lock)?;
        if current.etag() != expected {
            return Err(StoreError::Conflict);
        }
    }

    let mut current = slot.write().map_err(|_| StoreError::Lock)?;
    if current.etag() != expected {
        // A writer slipped in between the unlocked check and taking the lock
        return Err(StoreError::Conflict);
    }

    Ok(apply(&mut current))
}
