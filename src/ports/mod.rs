//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the relay core and an external
//! system. Implementations live in `src/adapters/`.

pub mod structure_generator;

pub use structure_generator::{
    GenerateFuture, RequestFingerprint, StructureGenerator, StructureRequest, StructureResponse,
};
