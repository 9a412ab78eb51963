//! Pets and the pet data source
//!
//! This module defines the [`Pet`] value shared by every screen, the
//! [`PetRepository`] collaborator the effect handlers fetch from, and an
//! in-memory catalog implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// The pet data source could not answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Pet data unavailable: {reason}")]
pub struct DataUnavailable {
    /// Why the data source failed
    pub reason: String,
}

impl DataUnavailable {
    /// Create a new error
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Result type for pet data source operations
pub type Result<T> = std::result::Result<T, DataUnavailable>;

/// Identifier of an adoptable pet
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(String);

impl PetId {
    /// Create a pet id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An adoptable pet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Unique identifier
    pub id: PetId,

    /// Display name
    pub name: String,

    /// Breed
    pub breed: String,

    /// Image URL
    pub image_url: String,

    /// Where the pet can be visited
    pub location: String,

    /// Free-form description
    pub about: String,

    /// Shelter contact phone number
    pub phone: String,

    /// Where to submit an adoption request
    pub adopt_url: String,
}

/// The pet data source
///
/// Implementations own the pets; callers share them through `Arc`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Fetch every adoptable pet, in display order
    async fn fetch_all_pets(&self) -> Result<Vec<Arc<Pet>>>;

    /// Fetch one pet; `Ok(None)` when no pet has this id
    async fn fetch_pet_by_id(&self, id: &PetId) -> Result<Option<Arc<Pet>>>;
}

/// Pet repository backed by an in-memory catalog
pub struct InMemoryPetRepository {
    pets: Vec<Arc<Pet>>,
    latency: Duration,
    available: AtomicBool,
}

impl InMemoryPetRepository {
    /// Create a repository from a list of pets
    pub fn new(pets: impl IntoIterator<Item = Pet>) -> Self {
        Self {
            pets: pets.into_iter().map(Arc::new).collect(),
            latency: Duration::ZERO,
            available: AtomicBool::new(true),
        }
    }

    /// Create a repository holding the built-in sample catalog
    pub fn sample() -> Self {
        Self::new(sample_pets())
    }

    /// Create a repository from a JSON array of pets
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let pets: Vec<Pet> = serde_json::from_str(json)?;
        Ok(Self::new(pets))
    }

    /// Delay every response by a fixed latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Simulate the data source going offline or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of pets in the catalog
    pub fn len(&self) -> usize {
        self.pets.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.pets.is_empty()
    }

    async fn respond(&self) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DataUnavailable::new("pet catalog is offline"))
        }
    }
}

#[async_trait]
impl PetRepository for InMemoryPetRepository {
    async fn fetch_all_pets(&self) -> Result<Vec<Arc<Pet>>> {
        self.respond().await?;
        Ok(self.pets.clone())
    }

    async fn fetch_pet_by_id(&self, id: &PetId) -> Result<Option<Arc<Pet>>> {
        self.respond().await?;
        Ok(self.pets.iter().find(|pet| &pet.id == id).cloned())
    }
}

/// The built-in sample catalog
pub fn sample_pets() -> Vec<Pet> {
    vec![
        Pet {
            id: PetId::new("1"),
            name: "Bruno".to_string(),
            breed: "Labrador Retriever".to_string(),
            image_url: "https://images.unsplash.com/photo-1543466835-00a7907e9de1".to_string(),
            location: "Seattle, WA".to_string(),
            about: "Bruno is a gentle giant who loves long walks and belly rubs.".to_string(),
            phone: "+12065550101".to_string(),
            adopt_url: "https://adopt.example.org/pets/1".to_string(),
        },
        Pet {
            id: PetId::new("2"),
            name: "Luna".to_string(),
            breed: "Siberian Husky".to_string(),
            image_url: "https://images.unsplash.com/photo-1605568427561-40dd23c2acea".to_string(),
            location: "Portland, OR".to_string(),
            about: "Luna is energetic, talkative and happiest with a big back yard.".to_string(),
            phone: "+15035550102".to_string(),
            adopt_url: "https://adopt.example.org/pets/2".to_string(),
        },
        Pet {
            id: PetId::new("3"),
            name: "Milo".to_string(),
            breed: "Beagle".to_string(),
            image_url: "https://images.unsplash.com/photo-1505628346881-b72b27e84530".to_string(),
            location: "San Francisco, CA".to_string(),
            about: "Milo follows his nose everywhere and gets along with other dogs.".to_string(),
            phone: "+14155550103".to_string(),
            adopt_url: "https://adopt.example.org/pets/3".to_string(),
        },
        Pet {
            id: PetId::new("4"),
            name: "Daisy".to_string(),
            breed: "Golden Retriever".to_string(),
            image_url: "https://images.unsplash.com/photo-1552053831-71594a27632d".to_string(),
            location: "Denver, CO".to_string(),
            about: "Daisy is calm, house trained and great with kids.".to_string(),
            phone: "+13035550104".to_string(),
            adopt_url: "https://adopt.example.org/pets/4".to_string(),
        },
        Pet {
            id: PetId::new("5"),
            name: "Rocky".to_string(),
            breed: "German Shepherd".to_string(),
            image_url: "https://images.unsplash.com/photo-1589941013453-ec89f33b5e95".to_string(),
            location: "Austin, TX".to_string(),
            about: "Rocky is loyal and smart, and still learning that cats are friends.".to_string(),
            phone: "+15125550105".to_string(),
            adopt_url: "https://adopt.example.org/pets/5".to_string(),
        },
    ]
}
