//! Allocation error shared by the fixed-capacity pools

use std::collections::TryReserveError;
use thiserror::Error;

/// A fixed-capacity array could not be reserved at startup.
///
/// Initialization stops on this error; nothing substitutes a smaller pool.
#[derive(Debug, Error)]
#[error("failed to allocate {what} ({capacity} slots): {source}")]
pub struct AllocError {
    pub what: &'static str,
    pub capacity: usize,
    #[source]
    pub source: TryReserveError,
}

/// Reserve exactly `capacity` default-initialized slots.
pub(crate) fn alloc_slots<T: Clone + Default>(
    what: &'static str,
    capacity: usize,
) -> Result<Vec<T>, AllocError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|source| AllocError { what, capacity, source })?;
    slots.resize(capacity, T::default());
    Ok(slots)
}

/// Reserve room for up to `capacity` elements without filling them.
pub(crate) fn alloc_pool<T>(what: &'static str, capacity: usize) -> Result<Vec<T>, AllocError> {
    let mut pool = Vec::new();
    pool.try_reserve_exact(capacity)
        .map_err(|source| AllocError { what, capacity, source })?;
    Ok(pool)
}
