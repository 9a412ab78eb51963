//! Pet list screen
//!
//! The list screen starts out loading, asks the data source for every pet once,
//! and turns a tap on a pet into a navigation request.

use app_state::{EffectHandler, First, LoopConfig, Next, StateLoop, Update};
use async_trait::async_trait;
use std::sync::Arc;

use crate::pets::{DataUnavailable, Pet, PetId, PetRepository};
use crate::ScreenState;

/// State of the list screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetListModel {
    /// Loading or loaded
    pub state: ScreenState,

    /// Pets in display order; empty while loading
    pub pets: Vec<Arc<Pet>>,
}

impl PetListModel {
    /// A loaded list
    pub fn loaded(pets: Vec<Arc<Pet>>) -> Self {
        Self {
            state: ScreenState::Loaded,
            pets,
        }
    }

    /// Check if the list is still loading
    pub fn is_loading(&self) -> bool {
        self.state == ScreenState::Loading
    }
}

/// Events coming into the list loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetListEvent {
    /// The data source returned the pets
    OnPetsLoaded(Vec<Arc<Pet>>),

    /// The user tapped a pet
    OnPetSelected(Arc<Pet>),
}

/// Effects requested by the list loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetListEffect {
    /// Fetch every pet
    LoadPets,
}

/// One-shot signals for the list screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetListViewEffect {
    /// Navigate to the details of a pet
    ShowPetDetails(PetId),
}

/// Update result for the list loop
pub type PetListNext = Next<PetListModel, PetListEffect, PetListViewEffect>;

/// Initial step: start loading the pets
pub fn init(model: PetListModel) -> First<PetListModel, PetListEffect> {
    First::first(model).with_effect(PetListEffect::LoadPets)
}

/// Apply an event to the list model
pub fn update(model: &PetListModel, event: PetListEvent) -> PetListNext {
    match event {
        PetListEvent::OnPetsLoaded(pets) => {
            if model.state == ScreenState::Loaded && model.pets == pets {
                Next::no_change()
            } else {
                Next::next(PetListModel::loaded(pets))
            }
        }
        PetListEvent::OnPetSelected(pet) => {
            Next::view(PetListViewEffect::ShowPetDetails(pet.id.clone()))
        }
    }
}

/// State machine of the list screen
#[derive(Debug, Clone, Copy, Default)]
pub struct PetListLogic;

impl Update for PetListLogic {
    type Model = PetListModel;
    type Event = PetListEvent;
    type Effect = PetListEffect;
    type ViewEffect = PetListViewEffect;

    fn init(&self, model: PetListModel) -> First<PetListModel, PetListEffect> {
        init(model)
    }

    fn update(&self, model: &PetListModel, event: PetListEvent) -> PetListNext {
        update(model, event)
    }
}

/// Runs list effects against the pet data source
pub struct PetListEffectHandler {
    repository: Arc<dyn PetRepository>,
}

impl PetListEffectHandler {
    /// Create a handler for a data source
    pub fn new(repository: Arc<dyn PetRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl EffectHandler<PetListEffect, PetListEvent> for PetListEffectHandler {
    type Error = DataUnavailable;

    async fn handle(&self, effect: PetListEffect) -> Result<PetListEvent, DataUnavailable> {
        match effect {
            PetListEffect::LoadPets => {
                let pets = self.repository.fetch_all_pets().await?;
                tracing::debug!(pet_count = pets.len(), "Pets loaded");
                Ok(PetListEvent::OnPetsLoaded(pets))
            }
        }
    }
}

/// Start a list loop for one screen instance
pub fn start(repository: Arc<dyn PetRepository>, config: LoopConfig) -> StateLoop<PetListLogic> {
    StateLoop::start(
        PetListLogic,
        PetListEffectHandler::new(repository),
        PetListModel::default(),
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pets::{sample_pets, MockPetRepository};

    fn pets() -> Vec<Arc<Pet>> {
        sample_pets().into_iter().map(Arc::new).collect()
    }

    fn pet_with_id(id: &str) -> Arc<Pet> {
        let mut pet = sample_pets().remove(0);
        pet.id = PetId::new(id);
        Arc::new(pet)
    }

    #[test]
    fn test_default_model_is_loading_and_empty() {
        let model = PetListModel::default();
        assert!(model.is_loading());
        assert!(model.pets.is_empty());
    }

    #[test]
    fn test_init_requests_pets() {
        let first = init(PetListModel::default());
        assert_eq!(first.model(), &PetListModel::default());
        assert_eq!(first.effects(), &[PetListEffect::LoadPets]);
    }

    #[test]
    fn test_pets_loaded() {
        let pets = pets();
        let next = update(&PetListModel::default(), PetListEvent::OnPetsLoaded(pets.clone()));

        assert_eq!(next.model(), Some(&PetListModel::loaded(pets)));
        assert!(next.effects().is_empty());
        assert!(next.view_effect().is_none());
    }

    #[test]
    fn test_pets_loaded_replaces_loaded_list() {
        let model = PetListModel::loaded(pets());
        let fewer = pets()[..2].to_vec();

        let next = update(&model, PetListEvent::OnPetsLoaded(fewer.clone()));
        assert_eq!(next.model(), Some(&PetListModel::loaded(fewer)));
    }

    #[test]
    fn test_pets_loaded_twice_is_idempotent() {
        let two = pets()[..2].to_vec();
        let event = PetListEvent::OnPetsLoaded(two.clone());

        let once = update(&PetListModel::default(), event.clone());
        let model = once.model().cloned().unwrap();
        let twice = update(&model, event);

        assert!(twice.is_no_change());
        assert_eq!(model, PetListModel::loaded(two));
    }

    #[test]
    fn test_update_is_deterministic() {
        let model = PetListModel::default();
        let event = PetListEvent::OnPetsLoaded(pets());

        assert_eq!(update(&model, event.clone()), update(&model, event));
    }

    #[test]
    fn test_pet_selected_shows_details() {
        let model = PetListModel::loaded(pets());
        let next = update(&model, PetListEvent::OnPetSelected(pet_with_id("42")));

        assert!(!next.has_model());
        assert!(next.effects().is_empty());
        assert_eq!(
            next.view_effect(),
            Some(&PetListViewEffect::ShowPetDetails(PetId::new("42")))
        );
    }

    #[tokio::test]
    async fn test_handler_loads_pets() {
        let mut repository = MockPetRepository::new();
        repository
            .expect_fetch_all_pets()
            .times(1)
            .returning(|| Ok(sample_pets().into_iter().map(Arc::new).collect()));

        let handler = PetListEffectHandler::new(Arc::new(repository));
        let event = handler.handle(PetListEffect::LoadPets).await.unwrap();

        match event {
            PetListEvent::OnPetsLoaded(pets) => assert_eq!(pets.len(), 5),
            other => panic!("Expected OnPetsLoaded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handler_propagates_unavailable() {
        let mut repository = MockPetRepository::new();
        repository
            .expect_fetch_all_pets()
            .returning(|| Err(DataUnavailable::new("offline")));

        let handler = PetListEffectHandler::new(Arc::new(repository));
        let err = handler.handle(PetListEffect::LoadPets).await.unwrap_err();
        assert_eq!(err, DataUnavailable::new("offline"));
    }

    #[tokio::test]
    async fn test_loop_loads_pets_on_start() {
        let mut repository = MockPetRepository::new();
        repository
            .expect_fetch_all_pets()
            .times(1)
            .returning(|| Ok(sample_pets().into_iter().map(Arc::new).collect()));

        let state_loop = start(Arc::new(repository), LoopConfig::new("pet-list"));
        let mut connection = state_loop.attach();

        let model = connection.wait_for(|m| !m.is_loading()).await.unwrap();
        assert_eq!(model.pets.len(), 5);
    }
}
