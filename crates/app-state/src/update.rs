//! Update results
//!
//! This module defines the vocabulary returned by pure update functions: the
//! [`First`] step produced when a loop starts and the [`Next`] step produced for
//! every event afterwards, plus the [`Update`] trait that ties a screen's
//! model, events, effects and view effects together.

use std::fmt::Debug;

/// Outcome of applying a single event to a model
///
/// A `Next` optionally carries a new model, any number of effects to hand to
/// the effect handler, and at most one view effect for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Next<M, F, V> {
    model: Option<M>,
    effects: Vec<F>,
    view_effect: Option<V>,
}

impl<M, F, V> Next<M, F, V> {
    /// Nothing changes: same model, no effects, no view effect
    pub fn no_change() -> Self {
        Self {
            model: None,
            effects: Vec::new(),
            view_effect: None,
        }
    }

    /// Replace the model
    pub fn next(model: M) -> Self {
        Self {
            model: Some(model),
            ..Self::no_change()
        }
    }

    /// Keep the model and dispatch effects
    pub fn dispatch(effects: impl IntoIterator<Item = F>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
            ..Self::no_change()
        }
    }

    /// Keep the model and emit a view effect
    pub fn view(view_effect: V) -> Self {
        Self {
            view_effect: Some(view_effect),
            ..Self::no_change()
        }
    }

    /// Add an effect to this step
    pub fn with_effect(mut self, effect: F) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the view effect for this step
    pub fn with_view_effect(mut self, view_effect: V) -> Self {
        self.view_effect = Some(view_effect);
        self
    }

    /// The new model, if the step changes it
    pub fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    /// Effects requested by this step
    pub fn effects(&self) -> &[F] {
        &self.effects
    }

    /// The view effect emitted by this step
    pub fn view_effect(&self) -> Option<&V> {
        self.view_effect.as_ref()
    }

    /// Check if the step changes the model
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Check if the step does nothing at all
    pub fn is_no_change(&self) -> bool {
        self.model.is_none() && self.effects.is_empty() && self.view_effect.is_none()
    }

    /// Split into model, effects and view effect
    pub fn into_parts(self) -> (Option<M>, Vec<F>, Option<V>) {
        (self.model, self.effects, self.view_effect)
    }
}

/// Initial step of a loop: the starting model and its startup effects
#[derive(Debug, Clone, PartialEq)]
pub struct First<M, F> {
    model: M,
    effects: Vec<F>,
}

impl<M, F> First<M, F> {
    /// Start from a model without effects
    pub fn first(model: M) -> Self {
        Self {
            model,
            effects: Vec::new(),
        }
    }

    /// Add a startup effect
    pub fn with_effect(mut self, effect: F) -> Self {
        self.effects.push(effect);
        self
    }

    /// The starting model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Startup effects
    pub fn effects(&self) -> &[F] {
        &self.effects
    }

    /// Split into model and effects
    pub fn into_parts(self) -> (M, Vec<F>) {
        (self.model, self.effects)
    }
}

/// State machine definition for a single screen
///
/// Implementations must keep [`Update::update`] pure: the result depends only
/// on the model and the event, and nothing outside the returned [`Next`] is
/// touched.
pub trait Update: Send + Sync + 'static {
    /// Immutable screen state
    type Model: Clone + Debug + Send + Sync + 'static;

    /// Inputs to the loop
    type Event: Debug + Send + 'static;

    /// Requests for the effect handler
    type Effect: Debug + Send + 'static;

    /// One-shot signals for the presentation layer
    type ViewEffect: Debug + Send + 'static;

    /// Produce the starting model and startup effects
    ///
    /// Called exactly once when a loop starts.
    fn init(&self, model: Self::Model) -> First<Self::Model, Self::Effect> {
        First::first(model)
    }

    /// Apply an event to the current model
    fn update(
        &self,
        model: &Self::Model,
        event: Self::Event,
    ) -> Next<Self::Model, Self::Effect, Self::ViewEffect>;
}
