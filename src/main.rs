//! Pet Adoption demo
//!
//! Walks the adoption flow against the built-in catalog: load the list, open a
//! pet, call the shelter, open the adoption page, go back, then follow a deep
//! link to a pet that does not exist.
//!
//! Logging is controlled with the `PET_ADOPTION_LOG` environment variable
//! (`info` by default, `debug` to trace every event of every loop).

use anyhow::{bail, Context, Result};
use app_core::InMemoryPetRepository;
use app_ui::{AppHost, PetDetailsScreen, PlatformIntent, ScreenContent};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "PET_ADOPTION_LOG";

/// Simulated data source latency
const CATALOG_LATENCY: Duration = Duration::from_millis(150);

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let repository = Arc::new(InMemoryPetRepository::sample().with_latency(CATALOG_LATENCY));
    let mut host = AppHost::new(repository);

    let cards = match host.list_mut().wait_until_loaded().await {
        Some(ScreenContent::PetList(cards)) => cards,
        other => bail!("unexpected list content: {:?}", other),
    };

    for card in &cards {
        tracing::info!(
            id = %card.id,
            name = %card.name,
            breed = %card.breed,
            location = %card.location,
            "Adoptable pet"
        );
    }

    let first = cards.first().context("no pets to adopt")?;
    host.list().select_by_id(&first.id)?;
    next_intent(&mut host).await?;

    match details(&mut host)?.wait_until_loaded().await {
        Some(ScreenContent::PetDetails(pet)) => {
            tracing::info!(name = %pet.name, about = %pet.about, "Showing pet");
        }
        other => bail!("unexpected details content: {:?}", other),
    }

    details(&mut host)?.call_clicked()?;
    next_intent(&mut host).await?;

    details(&mut host)?.adopt_clicked()?;
    next_intent(&mut host).await?;

    details(&mut host)?.back_pressed()?;
    next_intent(&mut host).await?;

    host.open_path("/pets/404")?;
    match details(&mut host)?.wait_until_loaded().await {
        Some(ScreenContent::NotFound(message)) => tracing::info!(%message, "Deep link"),
        other => bail!("unexpected deep link content: {:?}", other),
    }

    details(&mut host)?.back_pressed()?;
    next_intent(&mut host).await?;

    let route = host.current_route();
    tracing::info!(route = %route.to_path(), screen = route.title(), "Done");
    Ok(())
}

async fn next_intent(host: &mut AppHost) -> Result<PlatformIntent> {
    let intent = host.next_intent().await.context("screen closed")?;
    let route = host.current_route();
    tracing::info!(?intent, route = %route.to_path(), screen = route.title(), "Platform intent");
    Ok(intent)
}

fn details(host: &mut AppHost) -> Result<&mut PetDetailsScreen> {
    host.details_mut().context("no details screen open")
}
