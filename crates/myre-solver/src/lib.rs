//! Type registry and unification-based type resolver for Myre (spec §3.3,
//! §4.1, §4.5, and the "TypeRegistry"/"TypeResolver" components of §2).

mod registry;
mod resolver;

pub use registry::{PrimitiveKind, Slot, TypeData, TypeRegistry, UnresolvedVar};
pub use resolver::resolve;
