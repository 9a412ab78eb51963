//! Application host
//!
//! The host ties the screens to the navigation stack. The list screen lives for
//! the whole session at the root of the stack; a details screen is created when
//! its route is pushed and disposed when it is popped.

use std::sync::Arc;

use app_core::{PetId, PetRepository};

use crate::navigation::{NavigationStack, Route, Router};
use crate::screens::{
    PetDetailsScreen, PetListScreen, PlatformIntent, Result, ScreenContent, ScreenError,
};

/// Owns the screens of a running application
pub struct AppHost {
    repository: Arc<dyn PetRepository>,
    router: Router,
    navigation: NavigationStack,
    list: PetListScreen,
    details: Option<PetDetailsScreen>,
}

impl AppHost {
    /// Start the application on the pet list
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(repository: Arc<dyn PetRepository>) -> Self {
        let list = PetListScreen::open(Arc::clone(&repository));

        Self {
            repository,
            router: Router::new(),
            navigation: NavigationStack::new(Route::PetList),
            list,
            details: None,
        }
    }

    /// The route on top of the stack
    pub fn current_route(&self) -> &Route {
        self.navigation.current()
    }

    /// The navigation stack
    pub fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }

    /// The list screen
    pub fn list(&self) -> &PetListScreen {
        &self.list
    }

    /// The list screen, mutably
    pub fn list_mut(&mut self) -> &mut PetListScreen {
        &mut self.list
    }

    /// The details screen, if one is open
    pub fn details(&self) -> Option<&PetDetailsScreen> {
        self.details.as_ref()
    }

    /// The details screen, mutably
    pub fn details_mut(&mut self) -> Option<&mut PetDetailsScreen> {
        self.details.as_mut()
    }

    /// Render the screen on top of the stack
    pub fn content(&self) -> ScreenContent {
        match &self.details {
            Some(details) => details.content(),
            None => self.list.content(),
        }
    }

    /// Show a route
    ///
    /// Navigating to a pet replaces any details screen already open.
    pub fn navigate(&mut self, route: Route) -> Result<()> {
        match route {
            Route::PetList => {
                self.close_details();
                self.navigation.pop_to_root();
                Ok(())
            }
            Route::PetDetails { pet_id } => self.open_details(pet_id),
            Route::NotFound => Err(ScreenError::UnknownRoute(Route::NotFound.to_path())),
        }
    }

    /// Follow a deep link
    pub fn open_path(&mut self, path: &str) -> Result<Route> {
        let route = self.router.match_path(path);
        if route == Route::NotFound {
            return Err(ScreenError::UnknownRoute(path.to_string()));
        }

        self.navigate(route.clone())?;
        Ok(route)
    }

    /// Leave the screen on top of the stack
    ///
    /// Returns false when already at the root.
    pub fn go_back(&mut self) -> bool {
        if !self.navigation.can_go_back() {
            return false;
        }

        self.navigation.pop();
        self.close_details();
        true
    }

    /// Re-attach every live screen, as after a configuration change
    pub fn reconfigure(&mut self) {
        self.list.reattach();
        if let Some(details) = self.details.as_mut() {
            details.reattach();
        }
    }

    /// Wait for the next intent of the screen on top of the stack
    ///
    /// Navigation intents are applied before they are returned; the caller
    /// handles the rest (dialer, browser).
    pub async fn next_intent(&mut self) -> Option<PlatformIntent> {
        let intent = match self.details.as_mut() {
            Some(details) => details.next_intent().await,
            None => self.list.next_intent().await,
        }?;

        match &intent {
            PlatformIntent::Navigate(route) => {
                if let Err(e) = self.navigate(route.clone()) {
                    tracing::warn!(route = %route.to_path(), error = %e, "Navigation failed");
                }
            }
            PlatformIntent::GoBack => {
                self.go_back();
            }
            PlatformIntent::Dial { .. } | PlatformIntent::ViewUrl { .. } => {}
        }

        Some(intent)
    }

    fn open_details(&mut self, pet_id: PetId) -> Result<()> {
        let screen = PetDetailsScreen::open(Arc::clone(&self.repository), pet_id.clone())?;

        if self.details.replace(screen).is_some() {
            self.navigation.pop();
        }
        self.navigation.push(Route::PetDetails { pet_id });

        let entry = self.navigation.current_entry();
        tracing::debug!(
            route = %entry.route.to_path(),
            key = %entry.key,
            "Opened details screen"
        );
        Ok(())
    }

    fn close_details(&mut self) {
        if let Some(details) = self.details.take() {
            tracing::debug!(pet_id = %details.pet_id(), "Closed details screen");
        }
    }
}
