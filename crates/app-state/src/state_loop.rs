//! Unidirectional state loop runtime
//!
//! A [`StateLoop`] owns one screen's model. Events are queued on an unbounded
//! channel and applied one at a time on a single task, so the update function
//! never races with itself. Effects returned by the update run on their own
//! tasks and feed their resulting events back into the same queue.
//!
//! Exactly one subscriber can be attached at a time. It receives every new
//! model through a `watch` channel and view effects through a single-consumer
//! `mpsc` channel. View effects emitted while nobody is attached are dropped.

use parking_lot::{Mutex, RwLock};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::effect::EffectHandler;
use crate::update::Update;

/// Name used for loops that were not given one
pub const DEFAULT_LOOP_NAME: &str = "state-loop";

/// State loop errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateLoopError {
    /// The loop was disposed and accepts no more events
    #[error("State loop disposed: {0}")]
    Disposed(String),
}

/// Result type for state loop operations
pub type Result<T> = std::result::Result<T, StateLoopError>;

/// State loop configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// Name attached to every log line of this loop
    pub name: String,

    /// Log every published model at debug level
    pub trace_models: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOOP_NAME.to_string(),
            trace_models: false,
        }
    }
}

impl LoopConfig {
    /// Create a configuration for a named loop
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Enable or disable model tracing
    pub fn trace_models(mut self, enabled: bool) -> Self {
        self.trace_models = enabled;
        self
    }
}

/// The currently attached subscriber
struct Subscriber<M, V> {
    models: watch::Sender<M>,
    view_effects: mpsc::UnboundedSender<V>,
}

/// State shared between the loop handle and the loop task
///
/// Lock order is subscriber, then model.
struct Shared<M, V> {
    model: RwLock<M>,
    subscriber: Mutex<Option<Subscriber<M, V>>>,
    disposed: AtomicBool,
}

impl<M: Clone + Debug, V: Debug> Shared<M, V> {
    fn new(model: M) -> Self {
        Self {
            model: RwLock::new(model),
            subscriber: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Store and send a new model; returns false once the loop is disposed
    fn publish(&self, model: M) -> bool {
        let subscriber = self.subscriber.lock();
        // Checked under the subscriber lock, which dispose takes to detach
        if self.is_disposed() {
            return false;
        }

        *self.model.write() = model.clone();
        if let Some(subscriber) = subscriber.as_ref() {
            subscriber.models.send_replace(model);
        }
        true
    }

    fn deliver(&self, view_effect: V, loop_name: &str) {
        let subscriber = self.subscriber.lock();
        match subscriber.as_ref() {
            Some(subscriber) => {
                if let Err(mpsc::error::SendError(view_effect)) =
                    subscriber.view_effects.send(view_effect)
                {
                    tracing::debug!(
                        loop_name = %loop_name,
                        ?view_effect,
                        "Dropping view effect: subscriber gone"
                    );
                }
            }
            None => {
                tracing::debug!(
                    loop_name = %loop_name,
                    ?view_effect,
                    "Dropping view effect: no subscriber"
                );
            }
        }
    }

    fn attach(&self) -> LoopConnection<M, V> {
        let mut slot = self.subscriber.lock();
        let current = self.model.read().clone();

        let (models_tx, models_rx) = watch::channel(current);
        let (view_effects_tx, view_effects_rx) = mpsc::unbounded_channel();

        // A disposed loop hands out a connection that is already closed
        if !self.is_disposed() {
            *slot = Some(Subscriber {
                models: models_tx,
                view_effects: view_effects_tx,
            });
        }

        LoopConnection {
            models: models_rx,
            view_effects: view_effects_rx,
        }
    }

    fn detach(&self) {
        self.subscriber.lock().take();
    }
}

/// Subscriber side of a state loop
///
/// Dropping the connection, attaching a new one or disposing the loop closes
/// both channels.
#[derive(Debug)]
pub struct LoopConnection<M, V> {
    models: watch::Receiver<M>,
    view_effects: mpsc::UnboundedReceiver<V>,
}

impl<M: Clone, V> LoopConnection<M, V> {
    /// Latest model seen by this connection
    pub fn model(&self) -> M {
        self.models.borrow().clone()
    }

    /// Wait for the next published model
    ///
    /// Returns `None` once the connection is closed.
    pub async fn changed(&mut self) -> Option<M> {
        self.models.changed().await.ok()?;
        Some(self.models.borrow_and_update().clone())
    }

    /// Wait until the model satisfies a predicate
    ///
    /// The current model is checked first. Returns `None` if the connection
    /// closes before the predicate holds.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&M) -> bool) -> Option<M> {
        self.models
            .wait_for(predicate)
            .await
            .ok()
            .map(|model| M::clone(&model))
    }

    /// Wait for the next view effect
    ///
    /// Returns `None` once the connection is closed and drained.
    pub async fn next_view_effect(&mut self) -> Option<V> {
        self.view_effects.recv().await
    }

    /// Take a pending view effect without waiting
    pub fn try_next_view_effect(&mut self) -> Option<V> {
        self.view_effects.try_recv().ok()
    }
}

/// A running unidirectional loop for one screen instance
///
/// Dropping the loop disposes it.
pub struct StateLoop<U: Update> {
    config: LoopConfig,
    events: mpsc::UnboundedSender<U::Event>,
    shared: Arc<Shared<U::Model, U::ViewEffect>>,
    task: JoinHandle<()>,
}

impl<U: Update> StateLoop<U> {
    /// Start a loop from an initial model
    ///
    /// Runs [`Update::init`] once and dispatches its startup effects. Must be
    /// called from within a Tokio runtime.
    pub fn start<H>(update: U, handler: H, model: U::Model, config: LoopConfig) -> Self
    where
        H: EffectHandler<U::Effect, U::Event>,
    {
        let (model, startup) = update.init(model).into_parts();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::new(model));

        tracing::debug!(
            loop_name = %config.name,
            startup_effects = startup.len(),
            "Starting state loop"
        );

        let runner = LoopRunner {
            update,
            handler: Arc::new(handler),
            shared: Arc::clone(&shared),
            events: events_tx.clone(),
            config: config.clone(),
        };
        let task = tokio::spawn(runner.run(events_rx, startup));

        Self {
            config,
            events: events_tx,
            shared,
            task,
        }
    }

    /// Name of this loop
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Queue an event
    ///
    /// Never blocks. Events are applied strictly in the order they are queued.
    pub fn dispatch(&self, event: U::Event) -> Result<()> {
        if self.is_disposed() {
            return Err(StateLoopError::Disposed(self.config.name.clone()));
        }

        self.events
            .send(event)
            .map_err(|_| StateLoopError::Disposed(self.config.name.clone()))
    }

    /// Snapshot of the current model
    pub fn model(&self) -> U::Model {
        self.shared.model.read().clone()
    }

    /// Attach a subscriber, replacing any previous one
    ///
    /// The returned connection starts out with the current model.
    pub fn attach(&self) -> LoopConnection<U::Model, U::ViewEffect> {
        self.shared.attach()
    }

    /// Detach the current subscriber
    pub fn detach(&self) {
        self.shared.detach();
    }

    /// Check if a subscriber is attached
    pub fn is_attached(&self) -> bool {
        self.shared.subscriber.lock().is_some()
    }

    /// Check if the loop was disposed
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    /// Stop the loop
    ///
    /// In-flight effects are aborted and their results are never applied.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.shared.detach();
        self.task.abort();

        tracing::debug!(loop_name = %self.config.name, "State loop disposed");
    }
}

impl<U: Update> Drop for StateLoop<U> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// The loop task: owns the update function and the effect handler
struct LoopRunner<U: Update, H> {
    update: U,
    handler: Arc<H>,
    shared: Arc<Shared<U::Model, U::ViewEffect>>,
    events: mpsc::UnboundedSender<U::Event>,
    config: LoopConfig,
}

impl<U, H> LoopRunner<U, H>
where
    U: Update,
    H: EffectHandler<U::Effect, U::Event>,
{
    async fn run(self, mut events: mpsc::UnboundedReceiver<U::Event>, startup: Vec<U::Effect>) {
        let mut in_flight = JoinSet::new();

        for effect in startup {
            self.spawn_effect(effect, &mut in_flight);
        }

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.step(event, &mut in_flight),
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!(loop_name = %self.config.name, "Effect handler panicked: {}", e);
                        }
                    }
                }
            }
        }
    }

    fn step(&self, event: U::Event, in_flight: &mut JoinSet<()>) {
        if self.shared.is_disposed() {
            return;
        }

        tracing::debug!(loop_name = %self.config.name, ?event, "Processing event");

        let next = {
            let model = self.shared.model.read();
            self.update.update(&model, event)
        };
        let (model, effects, view_effect) = next.into_parts();

        if let Some(model) = model {
            if self.config.trace_models {
                tracing::debug!(loop_name = %self.config.name, ?model, "Publishing model");
            }
            if !self.shared.publish(model) {
                tracing::debug!(loop_name = %self.config.name, "Dropping model: loop disposed");
                return;
            }
        }

        if let Some(view_effect) = view_effect {
            self.shared.deliver(view_effect, &self.config.name);
        }

        for effect in effects {
            self.spawn_effect(effect, in_flight);
        }
    }

    fn spawn_effect(&self, effect: U::Effect, in_flight: &mut JoinSet<()>) {
        tracing::debug!(loop_name = %self.config.name, ?effect, "Dispatching effect");

        let handler = Arc::clone(&self.handler);
        let events = self.events.clone();
        let loop_name = self.config.name.clone();

        in_flight.spawn(async move {
            match handler.handle(effect).await {
                Ok(event) => {
                    if events.send(event).is_err() {
                        tracing::debug!(loop_name = %loop_name, "Dropping effect result: loop closed");
                    }
                }
                Err(error) => {
                    tracing::warn!(loop_name = %loop_name, %error, "Effect failed");
                }
            }
        });
    }
}
