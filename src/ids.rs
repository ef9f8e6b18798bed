//! Order identifier generation

use uuid::Uuid;

pub trait OrderTokenGenerator: Send + Sync {
    /// Opaque, collision-resistant token; the caller adds the `ORD-` prefix.
    fn generate(&self) -> String;
}

/// Time-ordered UUIDv7 tokens, so order ids sort roughly by creation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenGenerator;

impl OrderTokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> String { Uuid::now_v7().simple().to_string().to_uppercase() }
}
