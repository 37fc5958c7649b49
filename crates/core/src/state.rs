//! Per-invocation engine state.

use crate::names::{IdentCharset, NameAllocator};
use crate::options::{IdentifierStyle, ObfuscationOptions};
use crate::pool::StringPool;
use std::collections::BTreeMap;

/// State owned by one obfuscation call and discarded after it.
///
/// Nothing here may be shared across invocations: run-scoped uniqueness of
/// allocated names and pool indices is a per-call invariant. The sequential
/// name counter lives inside the allocator and therefore resets with it.
#[derive(Debug)]
pub struct ObfuscatorState {
    /// Collision-free identifier source for this run.
    pub allocator: NameAllocator,
    /// Deduplicated literal string pool for this run.
    pub pool: StringPool,
    /// Declaration map: original name -> generated name, applied textually
    /// across the whole unit. An approximation of lexical scoping; two
    /// distinct-scope declarations sharing a name collide under rename.
    pub rename_map: BTreeMap<String, String>,
    /// Name of the pool array, allocated when pooling first runs.
    pub pool_array_name: Option<String>,
    /// Name of the pool accessor, allocated when pooling first runs.
    pub pool_call_name: Option<String>,
}

impl ObfuscatorState {
    /// Builds fresh state for one call. `style` is the grammar-legal
    /// identifier style (the grammar may have substituted an unsupported
    /// one); `charset` is the grammar's alphanumeric identifier alphabet;
    /// `reserved` is the grammar keyword/global set.
    pub fn new(
        options: &ObfuscationOptions,
        style: IdentifierStyle,
        charset: IdentCharset,
        reserved: &[&str],
    ) -> Self {
        let mut allocator = NameAllocator::new(
            style,
            options.name_length,
            options.identifier_prefix.clone(),
            charset,
        );
        allocator.reserve(reserved.iter().copied());
        allocator.reserve(options.reserved_name_list());

        Self {
            allocator,
            pool: StringPool::new(),
            rename_map: BTreeMap::new(),
            pool_array_name: None,
            pool_call_name: None,
        }
    }
}
