// Entity Models
//
// - Person: tracked entity with stable identity (UUID) and mutable values
// - Projections: read-only views without identity, never written back

pub mod person;
pub mod projection;

pub use person::{Person, PersonId, SEED_PEOPLE};
pub use projection::{PersonAge, PersonSummary, Projection};
