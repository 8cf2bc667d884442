//! Calform Core
//!
//! Host contract for declarative calendar resource providers: the provider
//! traits, the resource and state model, and schema validation.

pub mod lifecycle;
pub mod provider;
pub mod resource;
pub mod schema;
