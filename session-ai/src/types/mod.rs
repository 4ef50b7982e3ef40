//! Types shared by the session AI traits.

pub mod summary;
