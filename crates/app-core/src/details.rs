//! Pet details screen
//!
//! The details screen loads one pet by id when it is entered. Once the pet is
//! loaded the user can call the shelter or open the adoption page; a pet that
//! does not exist ends in a loaded state without a pet.

use app_state::{EffectHandler, LoopConfig, Next, StateLoop, Update};
use async_trait::async_trait;
use std::sync::Arc;

use crate::pets::{DataUnavailable, Pet, PetId, PetRepository};
use crate::ScreenState;

/// State of the details screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetDetailsModel {
    /// Loading or loaded
    pub state: ScreenState,

    /// The id last requested; unset until the screen asks for a pet
    pub pet_id: Option<PetId>,

    /// The pet; unset while loading, and after loading if it was not found
    pub pet: Option<Arc<Pet>>,
}

/// What the details screen should show for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsContent<'a> {
    /// Still waiting for the data source
    Loading,
    /// The pet was found
    Found(&'a Arc<Pet>),
    /// The data source has no pet with the requested id
    NotFound,
}

impl PetDetailsModel {
    /// A model waiting for a pet
    pub fn loading(pet_id: PetId) -> Self {
        Self {
            state: ScreenState::Loading,
            pet_id: Some(pet_id),
            pet: None,
        }
    }

    /// A loaded model, with or without a pet
    pub fn loaded(pet_id: PetId, pet: Option<Arc<Pet>>) -> Self {
        Self {
            state: ScreenState::Loaded,
            pet_id: Some(pet_id),
            pet,
        }
    }

    /// Check if the pet is still loading
    pub fn is_loading(&self) -> bool {
        self.state == ScreenState::Loading
    }

    /// Check if a result for `id` answers the outstanding request
    pub fn is_awaiting(&self, id: &PetId) -> bool {
        self.is_loading() && self.pet_id.as_ref() == Some(id)
    }

    /// The pet, once loaded and found
    pub fn loaded_pet(&self) -> Option<&Arc<Pet>> {
        match self.state {
            ScreenState::Loading => None,
            ScreenState::Loaded => self.pet.as_ref(),
        }
    }

    /// Tell apart loading, found and not found
    pub fn content(&self) -> DetailsContent<'_> {
        match (self.state, &self.pet) {
            (ScreenState::Loading, _) => DetailsContent::Loading,
            (ScreenState::Loaded, Some(pet)) => DetailsContent::Found(pet),
            (ScreenState::Loaded, None) => DetailsContent::NotFound,
        }
    }
}

/// Events coming into the details loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetDetailsEvent {
    /// The screen was entered for a pet
    LoadPet(PetId),

    /// The data source answered the request for `id`
    OnPetLoaded {
        /// The requested id
        id: PetId,
        /// The pet; `None` when it does not exist
        pet: Option<Arc<Pet>>,
    },

    /// The user pressed back
    BackPressed,

    /// The user tapped the call button
    CallClicked,

    /// The user tapped the adopt button
    AdoptClicked,
}

/// Effects requested by the details loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetDetailsEffect {
    /// Fetch one pet
    LoadPet(PetId),
}

/// One-shot signals for the details screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetDetailsViewEffect {
    /// Open the phone dialer with a number
    OpenAndroidDialer(String),

    /// Open the adoption page
    OpenAdoptUrl(String),

    /// Leave the details screen
    CloseScreen,
}

/// Update result for the details loop
pub type PetDetailsNext = Next<PetDetailsModel, PetDetailsEffect, PetDetailsViewEffect>;

/// Apply an event to the details model
pub fn update(model: &PetDetailsModel, event: PetDetailsEvent) -> PetDetailsNext {
    match event {
        PetDetailsEvent::LoadPet(id) => {
            let effect = PetDetailsEffect::LoadPet(id.clone());
            if model.is_awaiting(&id) {
                Next::dispatch([effect])
            } else {
                // Any earlier pet is dropped; answers for other ids are now stale
                Next::next(PetDetailsModel::loading(id)).with_effect(effect)
            }
        }
        PetDetailsEvent::OnPetLoaded { id, pet } => {
            if model.is_awaiting(&id) {
                Next::next(PetDetailsModel::loaded(id, pet))
            } else {
                Next::no_change()
            }
        }
        PetDetailsEvent::BackPressed => Next::view(PetDetailsViewEffect::CloseScreen),
        PetDetailsEvent::CallClicked => match model.loaded_pet() {
            Some(pet) => Next::view(PetDetailsViewEffect::OpenAndroidDialer(pet.phone.clone())),
            None => Next::no_change(),
        },
        PetDetailsEvent::AdoptClicked => match model.loaded_pet() {
            Some(pet) => Next::view(PetDetailsViewEffect::OpenAdoptUrl(pet.adopt_url.clone())),
            None => Next::no_change(),
        },
    }
}

/// State machine of the details screen
#[derive(Debug, Clone, Copy, Default)]
pub struct PetDetailsLogic;

impl Update for PetDetailsLogic {
    type Model = PetDetailsModel;
    type Event = PetDetailsEvent;
    type Effect = PetDetailsEffect;
    type ViewEffect = PetDetailsViewEffect;

    fn update(&self, model: &PetDetailsModel, event: PetDetailsEvent) -> PetDetailsNext {
        update(model, event)
    }
}

/// Runs details effects against the pet data source
pub struct PetDetailsEffectHandler {
    repository: Arc<dyn PetRepository>,
}

impl PetDetailsEffectHandler {
    /// Create a handler for a data source
    pub fn new(repository: Arc<dyn PetRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl EffectHandler<PetDetailsEffect, PetDetailsEvent> for PetDetailsEffectHandler {
    type Error = DataUnavailable;

    async fn handle(&self, effect: PetDetailsEffect) -> Result<PetDetailsEvent, DataUnavailable> {
        match effect {
            PetDetailsEffect::LoadPet(id) => {
                let pet = self.repository.fetch_pet_by_id(&id).await?;
                tracing::debug!(pet_id = %id, found = pet.is_some(), "Pet loaded");
                Ok(PetDetailsEvent::OnPetLoaded { id, pet })
            }
        }
    }
}

/// Start a details loop for one screen instance
///
/// The loop starts empty; the screen dispatches [`PetDetailsEvent::LoadPet`]
/// when it is entered.
pub fn start(
    repository: Arc<dyn PetRepository>,
    config: LoopConfig,
) -> StateLoop<PetDetailsLogic> {
    StateLoop::start(
        PetDetailsLogic,
        PetDetailsEffectHandler::new(repository),
        PetDetailsModel::default(),
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pets::{sample_pets, MockPetRepository};
    use mockall::predicate::eq;

    fn pet() -> Arc<Pet> {
        Arc::new(sample_pets().remove(0))
    }

    fn loaded() -> PetDetailsModel {
        PetDetailsModel::loaded(PetId::new("1"), Some(pet()))
    }

    fn pet_loaded(id: &str, pet: Option<Arc<Pet>>) -> PetDetailsEvent {
        PetDetailsEvent::OnPetLoaded { id: PetId::new(id), pet }
    }

    #[test]
    fn test_load_pet_requests_pet() {
        let next = update(&PetDetailsModel::default(), PetDetailsEvent::LoadPet(PetId::new("1")));

        assert_eq!(next.model(), Some(&PetDetailsModel::loading(PetId::new("1"))));
        assert_eq!(next.effects(), &[PetDetailsEffect::LoadPet(PetId::new("1"))]);
        assert!(next.view_effect().is_none());
    }

    #[test]
    fn test_load_same_pet_while_loading_keeps_model() {
        let model = PetDetailsModel::loading(PetId::new("1"));
        let next = update(&model, PetDetailsEvent::LoadPet(PetId::new("1")));

        assert!(!next.has_model());
        assert_eq!(next.effects(), &[PetDetailsEffect::LoadPet(PetId::new("1"))]);
    }

    #[test]
    fn test_load_pet_when_loaded_resets_to_loading() {
        let next = update(&loaded(), PetDetailsEvent::LoadPet(PetId::new("2")));

        assert_eq!(next.model(), Some(&PetDetailsModel::loading(PetId::new("2"))));
        assert_eq!(next.effects(), &[PetDetailsEffect::LoadPet(PetId::new("2"))]);
    }

    #[test]
    fn test_pet_loaded() {
        let model = PetDetailsModel::loading(PetId::new("1"));
        let next = update(&model, pet_loaded("1", Some(pet())));

        assert_eq!(next.model(), Some(&loaded()));
        assert!(next.effects().is_empty());
    }

    #[test]
    fn test_pet_not_found() {
        let model = PetDetailsModel::loading(PetId::new("404"));
        let next = update(&model, pet_loaded("404", None));
        let model = next.model().cloned().unwrap();

        assert_eq!(model.state, ScreenState::Loaded);
        assert!(model.pet.is_none());
        assert_eq!(model.content(), DetailsContent::NotFound);
    }

    #[test]
    fn test_pet_loaded_ignored_when_loaded() {
        assert!(update(&loaded(), pet_loaded("1", Some(pet()))).is_no_change());
        assert!(update(&loaded(), pet_loaded("1", None)).is_no_change());

        let not_found = PetDetailsModel::loaded(PetId::new("404"), None);
        assert!(update(&not_found, pet_loaded("404", Some(pet()))).is_no_change());
    }

    #[test]
    fn test_pet_loaded_ignored_for_other_id() {
        let model = PetDetailsModel::loading(PetId::new("2"));

        assert!(update(&model, pet_loaded("1", Some(pet()))).is_no_change());
        assert!(update(&model, pet_loaded("1", None)).is_no_change());
    }

    #[test]
    fn test_pet_loaded_ignored_before_any_request() {
        assert!(update(&PetDetailsModel::default(), pet_loaded("1", Some(pet()))).is_no_change());
    }

    #[test]
    fn test_content() {
        assert_eq!(PetDetailsModel::default().content(), DetailsContent::Loading);
        assert_eq!(PetDetailsModel::loading(PetId::new("1")).content(), DetailsContent::Loading);

        let model = loaded();
        match model.content() {
            DetailsContent::Found(found) => assert_eq!(found.name, "Bruno"),
            other => panic!("Expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_back_pressed_in_any_state() {
        for model in [
            PetDetailsModel::default(),
            loaded(),
            PetDetailsModel::loaded(PetId::new("404"), None),
        ] {
            let next = update(&model, PetDetailsEvent::BackPressed);
            assert!(!next.has_model());
            assert_eq!(next.view_effect(), Some(&PetDetailsViewEffect::CloseScreen));
        }
    }

    #[test]
    fn test_call_clicked_opens_dialer() {
        let next = update(&loaded(), PetDetailsEvent::CallClicked);
        assert_eq!(
            next.view_effect(),
            Some(&PetDetailsViewEffect::OpenAndroidDialer("+12065550101".to_string()))
        );
    }

    #[test]
    fn test_adopt_clicked_opens_url() {
        let next = update(&loaded(), PetDetailsEvent::AdoptClicked);
        assert_eq!(
            next.view_effect(),
            Some(&PetDetailsViewEffect::OpenAdoptUrl(
                "https://adopt.example.org/pets/1".to_string()
            ))
        );
    }

    #[test]
    fn test_actions_ignored_while_loading() {
        let model = PetDetailsModel::loading(PetId::new("1"));
        assert!(update(&model, PetDetailsEvent::CallClicked).is_no_change());
        assert!(update(&model, PetDetailsEvent::AdoptClicked).is_no_change());
    }

    #[test]
    fn test_actions_ignored_when_not_found() {
        let model = PetDetailsModel::loaded(PetId::new("404"), None);
        assert!(update(&model, PetDetailsEvent::CallClicked).is_no_change());
        assert!(update(&model, PetDetailsEvent::AdoptClicked).is_no_change());
    }

    #[test]
    fn test_update_is_deterministic() {
        let model = PetDetailsModel::loading(PetId::new("1"));
        for event in [
            PetDetailsEvent::CallClicked,
            PetDetailsEvent::AdoptClicked,
            PetDetailsEvent::BackPressed,
            pet_loaded("1", None),
            PetDetailsEvent::LoadPet(PetId::new("2")),
        ] {
            assert_eq!(update(&model, event.clone()), update(&model, event));
        }
    }

    #[tokio::test]
    async fn test_handler_found() {
        let mut repository = MockPetRepository::new();
        repository
            .expect_fetch_pet_by_id()
            .with(eq(PetId::new("1")))
            .times(1)
            .returning(|_| Ok(Some(Arc::new(sample_pets().remove(0)))));

        let handler = PetDetailsEffectHandler::new(Arc::new(repository));
        let event = handler.handle(PetDetailsEffect::LoadPet(PetId::new("1"))).await.unwrap();

        match event {
            PetDetailsEvent::OnPetLoaded { id, pet: Some(pet) } => {
                assert_eq!(id, PetId::new("1"));
                assert_eq!(pet.name, "Bruno");
            }
            other => panic!("Expected OnPetLoaded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handler_not_found() {
        let mut repository = MockPetRepository::new();
        repository.expect_fetch_pet_by_id().returning(|_| Ok(None));

        let handler = PetDetailsEffectHandler::new(Arc::new(repository));
        let event = handler.handle(PetDetailsEffect::LoadPet(PetId::new("404"))).await.unwrap();

        assert_eq!(event, pet_loaded("404", None));
    }

    #[tokio::test]
    async fn test_handler_unavailable() {
        let mut repository = MockPetRepository::new();
        repository
            .expect_fetch_pet_by_id()
            .returning(|_| Err(DataUnavailable::new("offline")));

        let handler = PetDetailsEffectHandler::new(Arc::new(repository));
        assert!(handler.handle(PetDetailsEffect::LoadPet(PetId::new("1"))).await.is_err());
    }

    #[tokio::test]
    async fn test_loop_loads_requested_pet() {
        let mut repository = MockPetRepository::new();
        repository
            .expect_fetch_pet_by_id()
            .with(eq(PetId::new("1")))
            .times(1)
            .returning(|_| Ok(Some(Arc::new(sample_pets().remove(0)))));

        let state_loop = start(Arc::new(repository), LoopConfig::new("pet-details"));
        let mut connection = state_loop.attach();
        state_loop.dispatch(PetDetailsEvent::LoadPet(PetId::new("1"))).unwrap();

        let model = connection.wait_for(|m| !m.is_loading()).await.unwrap();
        assert_eq!(model.loaded_pet().map(|pet| pet.id.clone()), Some(PetId::new("1")));
    }
}
