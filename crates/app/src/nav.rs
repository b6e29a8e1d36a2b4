//! In-memory stack-based screen router.
//!
//! One active screen, a typed parameter payload, and a push-down history
//! stack, all in volatile memory. No forward stack, no deep links, no URL
//! sync; process restart lands on the initial screen again.
//!
//! Back-navigation restores the screen identity but resets the params to
//! [`ScreenParams::None`]. A product detail reached via back-navigation
//! therefore opens without its product. This matches the shipped behavior
//! and is flagged for product review in DESIGN.md rather than fixed here.

use tracing::debug;

use crate::models::{Event, Helper, Listing, Product, ServiceOffer, Space};

/// Every navigable destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Home,
    Login,
    Register,
    ProfileSetup,
    Profile,
    Market,
    ProductDetail,
    Cart,
    Checkout,
    Health,
    HealthService,
    Coworking,
    SpaceDetail,
    Events,
    EventDetail,
    Housing,
    ListingDetail,
    Visa,
    FamilyHelp,
    HelperDetail,
}

/// Typed per-destination navigation payload.
///
/// Replaces the untyped parameter bag: each detail screen declares the
/// entity it expects, and a screen opened without one gets
/// [`ScreenParams::None`] instead of silently falling back to demo data.
#[derive(Debug, Clone, Default)]
pub enum ScreenParams {
    /// No payload; list and form screens take nothing.
    #[default]
    None,
    /// Product for [`Screen::ProductDetail`].
    Product(Product),
    /// Health service for [`Screen::HealthService`].
    Service(ServiceOffer),
    /// Coworking space for [`Screen::SpaceDetail`].
    Space(Space),
    /// Event for [`Screen::EventDetail`].
    Event(Event),
    /// Housing listing for [`Screen::ListingDetail`].
    Listing(Listing),
    /// Family helper for [`Screen::HelperDetail`].
    Helper(Helper),
}

impl ScreenParams {
    /// True when no payload is attached.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Stack router holding the navigation state machine.
///
/// The stack always contains at least the initial screen; its top is the
/// active screen. Held behind the composition root, never in a global.
#[derive(Debug)]
pub struct Navigator {
    stack: Vec<Screen>,
    params: ScreenParams,
}

impl Navigator {
    /// Create a navigator showing `initial`.
    #[must_use]
    pub fn new(initial: Screen) -> Self {
        Self {
            stack: vec![initial],
            params: ScreenParams::None,
        }
    }

    /// The active screen.
    ///
    /// The stack is never empty, so this cannot fail.
    #[must_use]
    pub fn current(&self) -> Screen {
        self.stack.last().copied().unwrap_or(Screen::Home)
    }

    /// Payload the active screen was opened with.
    #[must_use]
    pub const fn params(&self) -> &ScreenParams {
        &self.params
    }

    /// Stack depth, counting the active screen.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Push `screen` onto the stack and make it active.
    pub fn navigate(&mut self, screen: Screen, params: ScreenParams) {
        debug!(from = ?self.current(), to = ?screen, "navigate");
        self.stack.push(screen);
        self.params = params;
    }

    /// Pop back to the previous screen.
    ///
    /// No-op at depth 1. The restored screen's params are reset to
    /// [`ScreenParams::None`] (see module docs).
    pub fn go_back(&mut self) {
        if self.stack.len() <= 1 {
            debug!("go_back ignored at stack root");
            return;
        }
        self.stack.pop();
        self.params = ScreenParams::None;
        debug!(to = ?self.current(), "went back");
    }

    /// Drop all history and land on `screen` with no params.
    ///
    /// Used when auth state flips: into `ProfileSetup` or `Home` after
    /// login, back to `Login` after logout.
    pub fn reset(&mut self, screen: Screen) {
        debug!(to = ?screen, "navigation reset");
        self.stack.clear();
        self.stack.push(screen);
        self.params = ScreenParams::None;
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Screen::Home)
    }
}
