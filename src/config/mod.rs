//! Configuration model and resolution
//!
//! Loading, shape detection, structured-to-legacy mapping, override layering,
//! defaulting and required-field validation for a container service.

pub mod coerce;
pub mod legacy;
pub mod mapper;
pub mod overrides;
pub mod resolved;
pub mod resolver;
pub mod shape;
pub mod structured;
pub mod validation;
pub mod values;

pub use legacy::LegacyConfig;
pub use overrides::Overrides;
pub use resolved::ResolvedConfig;
pub use resolver::{ResolveInput, resolve};
pub use shape::{ConfigShape, ValuesDocument};
pub use structured::StructuredConfig;
pub use values::{RawValues, load_values};
