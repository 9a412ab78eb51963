//! User interface for Pet Adoption
//!
//! This crate provides the presentation layer on top of the screen state
//! machines: routes and the navigation stack, screens that render models and
//! translate view effects into platform intents, and the host that wires the
//! screens to navigation.
//!
//! # Modules
//!
//! - [`navigation`] - Routes, URL router and navigation stack
//! - [`screens`] - Pet list and pet details screens
//! - [`host`] - Application host
//!
//! # Example
//!
//! ```rust,no_run
//! use app_core::InMemoryPetRepository;
//! use app_ui::{AppHost, PlatformIntent};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let mut host = AppHost::new(Arc::new(InMemoryPetRepository::sample()));
//! host.list_mut().wait_until_loaded().await;
//!
//! let pet = host.list().model().pets[0].clone();
//! host.list().select(pet).unwrap();
//!
//! // Navigation intents are applied by the host
//! assert!(matches!(host.next_intent().await, Some(PlatformIntent::Navigate(_))));
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod host;
pub mod navigation;
pub mod screens;

// Re-export commonly used types
pub use host::AppHost;

pub use navigation::{NavigationStack, Route, RouteParams, Router, StackEntry};

pub use screens::{
    render_details, render_list, PetCard, PetDetailsScreen, PetListScreen, PlatformIntent,
    ScreenContent, ScreenError, PET_NOT_FOUND,
};
