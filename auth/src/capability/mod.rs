pub mod errors;
pub mod models;
pub mod registry;

pub use errors::CapabilityError;
pub use models::Action;
pub use models::Capability;
pub use models::Resource;
pub use models::Role;
pub use registry::CapabilityRegistry;
pub use registry::CapabilitySet;
