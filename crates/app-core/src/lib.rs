//! Core application logic for Pet Adoption
//!
//! This crate contains the pet domain, the pet data source, and the state
//! machines of the list and details screens together with the effect handlers
//! that feed them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod details;
pub mod listing;
pub mod pets;

pub use pets::{DataUnavailable, InMemoryPetRepository, Pet, PetId, PetRepository};

/// Loading phase shared by both screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenState {
    /// Waiting for the data source
    #[default]
    Loading,

    /// The data source answered
    Loaded,
}
