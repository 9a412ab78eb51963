//! Navigation system for Pet Adoption
//!
//! This module provides:
//! - Route definitions with deep linking support
//! - A URL router that parses paths back into routes
//! - A navigation stack

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use app_core::PetId;

// =============================================================================
// Route Parameters
// =============================================================================

/// Parameters for a route
pub type RouteParams = HashMap<String, String>;

// =============================================================================
// Route Definitions
// =============================================================================

/// All possible routes in the application
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "route", content = "params")]
pub enum Route {
    /// List of adoptable pets
    #[default]
    PetList,
    /// Details of one pet
    PetDetails {
        /// Pet identifier
        pet_id: PetId,
    },
    /// Unknown path
    NotFound,
}

impl Route {
    /// Create a details route
    pub fn pet_details(pet_id: impl Into<PetId>) -> Self {
        Route::PetDetails { pet_id: pet_id.into() }
    }

    /// Get the URL path for this route
    pub fn to_path(&self) -> String {
        match self {
            Route::PetList => "/".to_string(),
            Route::PetDetails { pet_id } => {
                format!("/pets/{}", urlencoding::encode(pet_id.as_str()))
            }
            Route::NotFound => "/not-found".to_string(),
        }
    }

    /// Screen title for this route
    pub fn title(&self) -> &'static str {
        match self {
            Route::PetList => "Adopt a Pet",
            Route::PetDetails { .. } => "Pet Details",
            Route::NotFound => "Not Found",
        }
    }
}

// =============================================================================
// URL Router
// =============================================================================

type RouteBuilder = Box<dyn Fn(RouteParams) -> Option<Route> + Send + Sync>;

struct RoutePattern {
    segments: Vec<PatternSegment>,
    builder: RouteBuilder,
}

enum PatternSegment {
    /// Literal segment
    Literal(String),
    /// Parameter segment
    Param(String),
}

/// URL Router for parsing paths to routes
pub struct Router {
    patterns: Vec<RoutePattern>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a new router with all routes
    pub fn new() -> Self {
        let mut router = Self { patterns: Vec::new() };

        router.add_route("/", |_| Some(Route::PetList));
        router.add_route("/pets", |_| Some(Route::PetList));
        router.add_route("/pets/:id", |params| {
            params.get("id").filter(|id| !id.is_empty()).map(|id| Route::pet_details(id.as_str()))
        });

        router
    }

    fn add_route<F>(&mut self, pattern: &str, builder: F)
    where
        F: Fn(RouteParams) -> Option<Route> + Send + Sync + 'static,
    {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) => PatternSegment::Param(name.to_string()),
                None => PatternSegment::Literal(s.to_string()),
            })
            .collect();

        self.patterns.push(RoutePattern {
            segments,
            builder: Box::new(builder),
        });
    }

    /// Match a path to a route
    pub fn match_path(&self, path: &str) -> Route {
        let pathname = match path.find('?') {
            Some(idx) => &path[..idx],
            None => path,
        };

        let path_segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();

        for pattern in &self.patterns {
            if let Some(params) = Self::match_pattern(&pattern.segments, &path_segments) {
                if let Some(route) = (pattern.builder)(params) {
                    return route;
                }
            }
        }

        Route::NotFound
    }

    fn match_pattern(pattern: &[PatternSegment], path: &[&str]) -> Option<RouteParams> {
        if pattern.len() != path.len() {
            return None;
        }

        let mut params = RouteParams::new();

        for (segment, actual) in pattern.iter().zip(path.iter()) {
            match segment {
                PatternSegment::Literal(expected) => {
                    if expected != *actual {
                        return None;
                    }
                }
                PatternSegment::Param(name) => {
                    params.insert(name.clone(), urlencoding::decode(actual).ok()?.into_owned());
                }
            }
        }

        Some(params)
    }
}

// =============================================================================
// Navigation Stack
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The route
    pub route: Route,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(route: Route) -> Self {
        Self {
            route,
            key: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Navigation stack
///
/// Never empty: the root entry cannot be popped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationStack {
    /// Stack entries (bottom to top)
    entries: Vec<StackEntry>,
    /// Root entry
    root: StackEntry,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

impl NavigationStack {
    /// Create a new navigation stack with a root route
    pub fn new(root: Route) -> Self {
        Self {
            entries: Vec::new(),
            root: StackEntry::new(root),
        }
    }

    /// Push a route onto the stack
    pub fn push(&mut self, route: Route) {
        self.entries.push(StackEntry::new(route));
    }

    /// Pop the top route (returns true if popped, false if at root)
    pub fn pop(&mut self) -> bool {
        self.entries.pop().is_some()
    }

    /// Pop to root
    pub fn pop_to_root(&mut self) {
        self.entries.clear();
    }

    /// Get the current (top) route
    pub fn current(&self) -> &Route {
        &self.current_entry().route
    }

    /// Get the current stack entry
    pub fn current_entry(&self) -> &StackEntry {
        self.entries.last().unwrap_or(&self.root)
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Get stack depth, root included
    pub fn depth(&self) -> usize {
        self.entries.len() + 1
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_to_path() {
        assert_eq!(Route::PetList.to_path(), "/");
        assert_eq!(Route::pet_details("42").to_path(), "/pets/42");
        assert_eq!(Route::pet_details("a b/c").to_path(), "/pets/a%20b%2Fc");
    }

    #[test]
    fn test_route_title() {
        assert_eq!(Route::PetList.title(), "Adopt a Pet");
        assert_eq!(Route::pet_details("1").title(), "Pet Details");
    }

    #[test]
    fn test_router_match_list() {
        let router = Router::new();
        assert_eq!(router.match_path("/"), Route::PetList);
        assert_eq!(router.match_path("/pets"), Route::PetList);
        assert_eq!(router.match_path("/pets/?sort=name"), Route::PetList);
    }

    #[test]
    fn test_router_match_details() {
        let router = Router::new();
        assert_eq!(router.match_path("/pets/42"), Route::pet_details("42"));
        assert_eq!(router.match_path("/pets/42?ref=share"), Route::pet_details("42"));
    }

    #[test]
    fn test_router_decodes_pet_id() {
        let router = Router::new();
        let route = Route::pet_details("a b/c");
        assert_eq!(router.match_path(&route.to_path()), route);
    }

    #[test]
    fn test_router_not_found() {
        let router = Router::new();
        assert_eq!(router.match_path("/cats"), Route::NotFound);
        assert_eq!(router.match_path("/pets/1/photos"), Route::NotFound);
    }

    #[test]
    fn test_route_serialization() {
        let json = serde_json::to_value(Route::pet_details("7")).unwrap();
        assert_eq!(json["route"], "PetDetails");
        assert_eq!(json["params"]["pet_id"], "7");
    }

    #[test]
    fn test_navigation_stack() {
        let mut stack = NavigationStack::default();
        assert_eq!(stack.current(), &Route::PetList);
        assert!(!stack.can_go_back());
        assert_eq!(stack.depth(), 1);

        stack.push(Route::pet_details("1"));
        assert_eq!(stack.current(), &Route::pet_details("1"));
        assert!(stack.can_go_back());
        assert_eq!(stack.depth(), 2);

        assert!(stack.pop());
        assert_eq!(stack.current(), &Route::PetList);
        assert!(!stack.pop());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_navigation_stack_pop_to_root() {
        let mut stack = NavigationStack::default();
        let root_key = stack.current_entry().key.clone();
        stack.push(Route::pet_details("1"));
        stack.push(Route::pet_details("2"));
        assert_eq!(stack.depth(), 3);

        stack.pop_to_root();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_entry().key, root_key);
        assert!(!stack.can_go_back());
    }

    #[test]
    fn test_stack_entry_keys_are_unique() {
        let a = StackEntry::new(Route::PetList);
        let b = StackEntry::new(Route::PetList);
        assert_ne!(a.key, b.key);
    }
}
