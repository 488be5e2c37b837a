//! Storage implementations for the session repository

pub mod in_memory;
pub mod occ;

pub use in_memory::InMemorySessionRepository;
