pub mod literal;
pub mod names;
pub mod options;
pub mod pool;
pub mod result;
pub mod seed;
pub mod state;

pub use options::ObfuscationOptions;
pub use result::{Error, Result};
pub use state::ObfuscatorState;

/// Maximum integer exactly representable in an IEEE-754 double (2^53).
///
/// Grammars whose runtimes evaluate numbers as doubles (JavaScript, Lua < 5.3)
/// cannot round-trip integer literals above this bound, so the numeric encoder
/// refuses them instead of emitting an expression that loses precision.
pub const MAX_SAFE_INTEGER: u64 = 1 << 53;
