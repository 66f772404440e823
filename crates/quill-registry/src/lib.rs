//! Overload resolution and operator tables for the quill backend.
//!
//! Everything here is environment bootstrap: overload families are built
//! once (with their positional suffixes decoded and validated eagerly) and
//! operator methods are scanned into an explicit dispatch table. During a
//! construction session the registry is read-only.
//!
//! ## Modules
//!
//! - [`overload`]: overload families and positional-suffix decoding
//! - [`registry`]: the unified per-environment registry

pub mod overload;
pub mod registry;

pub use overload::{OverloadSet, decode_index};
pub use registry::{DEFAULT_OP_PREFIX, Registry};
