//! Deduplicated string pool with deferred layout.
//!
//! Access sites are produced while the pipeline is still rewriting text, long
//! before shuffle/rotate decide the final storage order. To keep every
//! already-embedded reference consistent, access sites carry private-use
//! delimited placeholders holding the logical index; the final index
//! expression is substituted only after [`StringPool::finalize`] has fixed
//! the layout. The ordering constraint is load-bearing: layout first, index
//! text second.

use crate::result::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Opens a pool access-site placeholder.
pub const REF_OPEN: char = '\u{F8F0}';
/// Closes a pool access-site placeholder.
pub const REF_CLOSE: char = '\u{F8F1}';

/// Ordered sequence of unique literal string contents, each interned at most
/// once.
#[derive(Debug, Default)]
pub struct StringPool {
    entries: Vec<String>,
    index: HashMap<String, usize>,
}

/// Finalized pool layout: physical storage order plus the tables needed to
/// keep embedded references consistent.
#[derive(Debug)]
pub struct PoolLayout {
    /// Entry contents in physical storage order.
    pub storage: Vec<String>,
    /// Logical index -> embedded index (position before rotation).
    remap: Vec<usize>,
    /// Left-rotation amount applied to storage; the accessor must subtract
    /// it modulo the pool length. Zero when rotation is disabled.
    pub rotation: usize,
}

impl PoolLayout {
    /// Index to embed at an access site for a logical index.
    pub fn embedded_index(&self, logical: usize) -> Result<usize> {
        self.remap
            .get(logical)
            .copied()
            .ok_or_else(|| Error::Transform(format!("string pool index {logical} out of range")))
    }
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns content and returns its logical index. Idempotent: identical
    /// content always returns the same index.
    pub fn intern(&mut self, content: &str) -> usize {
        if let Some(&idx) = self.index.get(content) {
            return idx;
        }
        let idx = self.entries.len();
        self.entries.push(content.to_string());
        self.index.insert(content.to_string(), idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Placeholder text embedded at an access site for a logical index.
    pub fn placeholder(index: usize) -> String {
        format!("{REF_OPEN}{index}{REF_CLOSE}")
    }

    /// Fixes the final storage layout. Shuffle permutes storage order;
    /// rotate additionally rotates storage left by a random amount that the
    /// accessor compensates for. Embedded logical indices stay resolvable
    /// through the returned remap table.
    pub fn finalize(&self, shuffle: bool, rotate: bool, rng: &mut StdRng) -> PoolLayout {
        let len = self.entries.len();
        let mut order: Vec<usize> = (0..len).collect();
        if shuffle && len > 1 {
            order.shuffle(rng);
        }

        // order[p] = logical entry stored at pre-rotation position p
        let mut remap = vec![0usize; len];
        for (position, &logical) in order.iter().enumerate() {
            remap[logical] = position;
        }

        let pre_rotation: Vec<String> = order
            .iter()
            .map(|&logical| self.entries[logical].clone())
            .collect();

        let rotation = if rotate && len > 1 {
            rng.random_range(1..len)
        } else {
            0
        };

        // storage[p] holds the entry whose embedded index is (p + rotation) % len
        let storage: Vec<String> = (0..len)
            .map(|p| pre_rotation[(p + rotation) % len].clone())
            .collect();

        debug!(
            entries = len,
            shuffled = shuffle && len > 1,
            rotation,
            "finalized string pool layout"
        );

        PoolLayout {
            storage,
            remap,
            rotation,
        }
    }
}

/// Replaces every pool placeholder in `text` using `substitute`, which maps
/// a logical index to the final access-site index expression.
pub fn replace_placeholders<F>(text: &str, mut substitute: F) -> Result<String>
where
    F: FnMut(usize) -> Result<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(REF_OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + REF_OPEN.len_utf8()..];
        let close = after.find(REF_CLOSE).ok_or_else(|| {
            Error::Transform("unterminated string pool placeholder".to_string())
        })?;
        let logical: usize = after[..close]
            .parse()
            .map_err(|_| Error::Transform("malformed string pool placeholder".to_string()))?;
        out.push_str(&substitute(logical)?);
        rest = &after[close + REF_CLOSE.len_utf8()..];
    }
    out.push_str(rest);
    Ok(out)
}
