// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains structures and methods for specifying parameters of the bootstrap.

pub mod bootstrap;
pub mod boundaries;

pub use bootstrap::{Bootstrap, SingularityPolicy};
pub use boundaries::Boundaries;
