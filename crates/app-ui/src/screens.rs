//! Application screens
//!
//! Each screen owns the state loop of one screen instance and the subscriber
//! connection to it. Screens render models into [`ScreenContent`], forward
//! gestures as events, and turn view effects into [`PlatformIntent`]s.

use std::sync::Arc;
use thiserror::Error;

use app_core::details::{
    self, DetailsContent, PetDetailsEvent, PetDetailsLogic, PetDetailsModel, PetDetailsViewEffect,
};
use app_core::listing::{self, PetListEvent, PetListLogic, PetListModel, PetListViewEffect};
use app_core::{Pet, PetId, PetRepository};
use app_state::{LoopConfig, LoopConnection, StateLoop, StateLoopError};

use crate::navigation::Route;

/// Placeholder shown when a pet does not exist
pub const PET_NOT_FOUND: &str = "Pet not found";

/// Loop name of the list screen
pub const PET_LIST_LOOP: &str = "pet-list";

/// Loop name of the details screen
pub const PET_DETAILS_LOOP: &str = "pet-details";

/// Screen errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    /// The screen's loop no longer accepts events
    #[error(transparent)]
    Loop(#[from] StateLoopError),

    /// The pet is not on the list
    #[error("Unknown pet: {0}")]
    UnknownPet(PetId),

    /// No screen exists for the route
    #[error("Unknown route: {0}")]
    UnknownRoute(String),
}

/// Result type for screen operations
pub type Result<T> = std::result::Result<T, ScreenError>;

/// A pet as shown on the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetCard {
    /// Pet identifier
    pub id: PetId,
    /// Display name
    pub name: String,
    /// Breed
    pub breed: String,
    /// Location
    pub location: String,
    /// Image URL
    pub image_url: String,
}

impl From<&Pet> for PetCard {
    fn from(pet: &Pet) -> Self {
        Self {
            id: pet.id.clone(),
            name: pet.name.clone(),
            breed: pet.breed.clone(),
            location: pet.location.clone(),
            image_url: pet.image_url.clone(),
        }
    }
}

/// What a screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenContent {
    /// Progress indicator
    Loading,
    /// The list of pets
    PetList(Vec<PetCard>),
    /// Full details of one pet
    PetDetails(Arc<Pet>),
    /// Placeholder text
    NotFound(String),
}

/// Something the platform has to do for a screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformIntent {
    /// Show another route
    Navigate(Route),
    /// Leave the current screen
    GoBack,
    /// Open the dialer
    Dial {
        /// `tel:` URI
        uri: String,
    },
    /// Open a web page
    ViewUrl {
        /// Page URL
        url: String,
    },
}

impl From<PetListViewEffect> for PlatformIntent {
    fn from(effect: PetListViewEffect) -> Self {
        match effect {
            PetListViewEffect::ShowPetDetails(pet_id) => {
                PlatformIntent::Navigate(Route::PetDetails { pet_id })
            }
        }
    }
}

impl From<PetDetailsViewEffect> for PlatformIntent {
    fn from(effect: PetDetailsViewEffect) -> Self {
        match effect {
            PetDetailsViewEffect::OpenAndroidDialer(phone) => PlatformIntent::Dial {
                uri: format!("tel:{}", phone),
            },
            PetDetailsViewEffect::OpenAdoptUrl(url) => PlatformIntent::ViewUrl { url },
            PetDetailsViewEffect::CloseScreen => PlatformIntent::GoBack,
        }
    }
}

/// Render the list model
pub fn render_list(model: &PetListModel) -> ScreenContent {
    if model.is_loading() {
        ScreenContent::Loading
    } else {
        ScreenContent::PetList(model.pets.iter().map(|pet| PetCard::from(pet.as_ref())).collect())
    }
}

/// Render the details model
pub fn render_details(model: &PetDetailsModel) -> ScreenContent {
    match model.content() {
        DetailsContent::Loading => ScreenContent::Loading,
        DetailsContent::Found(pet) => ScreenContent::PetDetails(Arc::clone(pet)),
        DetailsContent::NotFound => ScreenContent::NotFound(PET_NOT_FOUND.to_string()),
    }
}

// =============================================================================
// List Screen
// =============================================================================

/// The pet list screen
pub struct PetListScreen {
    state_loop: StateLoop<PetListLogic>,
    connection: LoopConnection<PetListModel, PetListViewEffect>,
}

impl PetListScreen {
    /// Enter the list screen; loading starts right away
    pub fn open(repository: Arc<dyn PetRepository>) -> Self {
        let state_loop = listing::start(repository, LoopConfig::new(PET_LIST_LOOP));
        let connection = state_loop.attach();

        Self { state_loop, connection }
    }

    /// Latest model
    pub fn model(&self) -> PetListModel {
        self.connection.model()
    }

    /// Render the latest model
    pub fn content(&self) -> ScreenContent {
        render_list(&self.connection.model())
    }

    /// Wait until the pets are loaded and render them
    ///
    /// Returns `None` if the screen was closed first.
    pub async fn wait_until_loaded(&mut self) -> Option<ScreenContent> {
        let model = self.connection.wait_for(|m| !m.is_loading()).await?;
        Some(render_list(&model))
    }

    /// Tap a pet
    pub fn select(&self, pet: Arc<Pet>) -> Result<()> {
        self.state_loop.dispatch(PetListEvent::OnPetSelected(pet))?;
        Ok(())
    }

    /// Tap the pet with the given id, if it is on the list
    pub fn select_by_id(&self, pet_id: &PetId) -> Result<()> {
        let pet = self
            .model()
            .pets
            .into_iter()
            .find(|pet| &pet.id == pet_id)
            .ok_or_else(|| ScreenError::UnknownPet(pet_id.clone()))?;

        self.select(pet)
    }

    /// Wait for the next platform intent
    pub async fn next_intent(&mut self) -> Option<PlatformIntent> {
        self.connection.next_view_effect().await.map(PlatformIntent::from)
    }

    /// Attach a fresh connection after reconfiguration
    ///
    /// View effects still queued on the old connection are lost.
    pub fn reattach(&mut self) {
        self.connection = self.state_loop.attach();
        tracing::debug!(loop_name = %self.state_loop.name(), "Screen reattached");
    }
}

// =============================================================================
// Details Screen
// =============================================================================

/// The pet details screen
pub struct PetDetailsScreen {
    pet_id: PetId,
    state_loop: StateLoop<PetDetailsLogic>,
    connection: LoopConnection<PetDetailsModel, PetDetailsViewEffect>,
}

impl PetDetailsScreen {
    /// Enter the details screen for a pet and start loading it
    pub fn open(repository: Arc<dyn PetRepository>, pet_id: PetId) -> Result<Self> {
        let state_loop = details::start(repository, LoopConfig::new(PET_DETAILS_LOOP));
        let connection = state_loop.attach();
        state_loop.dispatch(PetDetailsEvent::LoadPet(pet_id.clone()))?;

        Ok(Self {
            pet_id,
            state_loop,
            connection,
        })
    }

    /// The requested pet id
    pub fn pet_id(&self) -> &PetId {
        &self.pet_id
    }

    /// Latest model
    pub fn model(&self) -> PetDetailsModel {
        self.connection.model()
    }

    /// Render the latest model
    pub fn content(&self) -> ScreenContent {
        render_details(&self.connection.model())
    }

    /// Wait until the pet is loaded (or known missing) and render it
    ///
    /// Returns `None` if the screen was closed first.
    pub async fn wait_until_loaded(&mut self) -> Option<ScreenContent> {
        let model = self.connection.wait_for(|m| !m.is_loading()).await?;
        Some(render_details(&model))
    }

    /// Press back
    pub fn back_pressed(&self) -> Result<()> {
        self.dispatch(PetDetailsEvent::BackPressed)
    }

    /// Tap the call button
    pub fn call_clicked(&self) -> Result<()> {
        self.dispatch(PetDetailsEvent::CallClicked)
    }

    /// Tap the adopt button
    pub fn adopt_clicked(&self) -> Result<()> {
        self.dispatch(PetDetailsEvent::AdoptClicked)
    }

    /// Wait for the next platform intent
    pub async fn next_intent(&mut self) -> Option<PlatformIntent> {
        self.connection.next_view_effect().await.map(PlatformIntent::from)
    }

    /// Take a pending platform intent without waiting
    pub fn try_next_intent(&mut self) -> Option<PlatformIntent> {
        self.connection.try_next_view_effect().map(PlatformIntent::from)
    }

    /// Attach a fresh connection after reconfiguration
    ///
    /// View effects still queued on the old connection are lost.
    pub fn reattach(&mut self) {
        self.connection = self.state_loop.attach();
        tracing::debug!(loop_name = %self.state_loop.name(), "Screen reattached");
    }

    fn dispatch(&self, event: PetDetailsEvent) -> Result<()> {
        self.state_loop.dispatch(event)?;
        Ok(())
    }
}
