//! # abiscope-registry
//!
//! Builds the signature registry the decoder runs against.
//!
//! 1. **Corpus parsing**: standard ABI JSON documents (bare arrays or
//!    compiler artifacts) resolved into typed signatures
//! 2. **Builder**: canonical signatures, Keccak-256 identifiers and the
//!    selector / topic collision policies
//! 3. **Registry**: the frozen lookup tables, plus a handle for swapping in
//!    a rebuilt registry
//! 4. **Artifact**: optional JSON persistence of a built registry
//!
//! Decoders consume the registry through
//! [`SignatureLookup`](abiscope_core::SignatureLookup).

pub mod artifact;
pub mod builder;
pub mod corpus;
pub mod registry;

pub use artifact::{RegistryArtifact, ARTIFACT_VERSION};
pub use builder::{BuildReport, BuilderConfig, RegistryBuilder};
pub use registry::{RegistryStats, SharedRegistry, SignatureRegistry};
