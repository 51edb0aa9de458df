//! Infrastructure layer: storage adapters behind the `journal-auth` directory traits.

pub mod directory;
pub mod seed;

pub use directory::InMemoryDirectory;
