/// Limits shared between the compiler and the virtual machine.

/// Maximum number of values the VM's stack can hold at once. Pushing beyond
/// this limit is a runtime error, not a panic.
pub const STACK_MAX: usize = 256;

/// Maximum number of constants a single chunk can hold. Constant indices are
/// encoded in at most 3 little-endian bytes, so the pool is capped at 2^24.
pub const MAX_CONSTANTS: usize = 1 << 24;

/// Maximum forward distance of a jump instruction. Jump operands are encoded
/// as 2 little-endian bytes.
pub const MAX_JUMP: usize = u16::MAX as usize;
