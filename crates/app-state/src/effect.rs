//! Effect handling
//!
//! Effect handlers are the only place where a loop talks to the outside world.
//! Each effect is handled on its own task and its result is fed back into the
//! loop as an event.

use async_trait::async_trait;

/// Executes effects against external collaborators
///
/// A handler turns one effect into one event. Returning an error means the
/// effect produced nothing; the loop logs the failure and carries on with the
/// model it already has.
#[async_trait]
pub trait EffectHandler<F, E>: Send + Sync + 'static
where
    F: Send + 'static,
    E: Send + 'static,
{
    /// Error raised by the collaborator
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute the effect and produce the resulting event
    async fn handle(&self, effect: F) -> Result<E, Self::Error>;
}
