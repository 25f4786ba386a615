//! Request context the host provides to the override manager.

use super::entity::ContextId;

/// Resolves the store active for the current request.
pub trait CurrentContext: Send + Sync {
    /// The active store, or `None` if no store can be resolved.
    fn current_context(&self) -> Option<ContextId>;
}

/// Describes the route (operation) handling the current request.
pub trait CurrentRoute: Send + Sync {
    /// The matched route, or `None` while routing has not completed yet.
    fn current_route(&self) -> Option<RouteInfo>;
}

/// The parts of a matched route the override policy looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// Route name, e.g. `"entity.product.canonical"`
    pub name: String,
    /// Whether the route is administrative (editing/management)
    pub admin: bool,
}

impl RouteInfo {
    /// A display route.
    pub fn display(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: false,
        }
    }

    /// An administrative route.
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: true,
        }
    }
}
