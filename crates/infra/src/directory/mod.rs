//! Directory adapters (users + roles).

mod in_memory;

pub use in_memory::InMemoryDirectory;
