//! Domain types shared by the resolver and the sync pipelines.

pub mod errors;
pub mod model;
