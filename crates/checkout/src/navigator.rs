//! Step navigator
//!
//! The current step lives in an external [`Location`] (a URL fragment in a
//! browser) so that back/forward navigation and reloads keep working. The
//! navigator parses it through a [`StepRepresentation`], writes every
//! [`Navigator::advance_to`] back to it, and notifies subscribers of changes.
//!
//! The navigator never checks preconditions. Anyone may jump to any step;
//! guarding transitions is the orchestrator's job.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::CheckoutStep;

const FRAGMENT_ROUTE: &str = "checkout";

/// External navigation state
pub trait Location: Debug + Send + Sync {
    /// Current representation
    fn read(&self) -> String;
    /// Push a new history entry
    fn push(&self, representation: &str);
    /// Replace the current history entry
    fn replace(&self, representation: &str);
}

/// Bidirectional mapping between steps and their external form
pub trait StepRepresentation: Debug + Send + Sync {
    /// Parse a representation. Anything unknown maps to [`CheckoutStep::Address`].
    fn parse(&self, representation: &str) -> CheckoutStep;
    /// Encode a step
    fn encode(&self, step: CheckoutStep) -> String;
}

/// `#/checkout/<slug>` fragments
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentRepresentation;

impl StepRepresentation for FragmentRepresentation {
    fn parse(&self, representation: &str) -> CheckoutStep {
        let mut segments = representation.trim_start_matches('#').split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(""), Some(FRAGMENT_ROUTE), Some(slug)) => slug.parse().unwrap_or_default(),
            _ => CheckoutStep::default(),
        }
    }

    fn encode(&self, step: CheckoutStep) -> String {
        format!("#/{FRAGMENT_ROUTE}/{}", step.slug())
    }
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    index: usize,
}

/// In-memory [`Location`] with browser-like history
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    history: Arc<Mutex<History>>,
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryLocation {
    /// Location starting at `initial`
    pub fn new(initial: &str) -> Self {
        Self {
            history: Arc::new(Mutex::new(History {
                entries: vec![initial.to_string()],
                index: 0,
            })),
        }
    }

    /// Go back one entry. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let mut history = self.history.lock();
        if history.index == 0 {
            return false;
        }
        history.index -= 1;
        true
    }

    /// Go forward one entry. Returns `false` at the end of history.
    pub fn forward(&self) -> bool {
        let mut history = self.history.lock();
        if history.index + 1 >= history.entries.len() {
            return false;
        }
        history.index += 1;
        true
    }

    /// Number of history entries
    pub fn len(&self) -> usize {
        self.history.lock().entries.len()
    }

    /// Whether history is empty, which it never is
    pub fn is_empty(&self) -> bool {
        self.history.lock().entries.is_empty()
    }
}

impl Location for MemoryLocation {
    fn read(&self) -> String {
        let history = self.history.lock();
        history
            .entries
            .get(history.index)
            .cloned()
            .unwrap_or_default()
    }

    fn push(&self, representation: &str) {
        let mut history = self.history.lock();
        let next = history.index + 1;
        history.entries.truncate(next);
        history.entries.push(representation.to_string());
        history.index = next;
    }

    fn replace(&self, representation: &str) {
        let mut history = self.history.lock();
        let index = history.index;
        if let Some(entry) = history.entries.get_mut(index) {
            *entry = representation.to_string();
        }
    }
}

/// Checkout step state machine over an external [`Location`]
#[derive(Debug)]
pub struct Navigator {
    location: Arc<dyn Location>,
    representation: Arc<dyn StepRepresentation>,
    step: watch::Sender<CheckoutStep>,
}

impl Navigator {
    /// Create a new [`Navigator`], normalizing the location if it does not
    /// encode a known step.
    pub fn new(location: Arc<dyn Location>, representation: Arc<dyn StepRepresentation>) -> Self {
        let current = location.read();
        let step = representation.parse(&current);
        let encoded = representation.encode(step);
        if encoded != current {
            location.replace(&encoded);
        }

        let (sender, _) = watch::channel(step);
        Self {
            location,
            representation,
            step: sender,
        }
    }

    /// Navigator over a `#/checkout/<slug>` fragment
    pub fn with_fragment(location: Arc<dyn Location>) -> Self {
        Self::new(location, Arc::new(FragmentRepresentation))
    }

    /// Current step, read from the location
    pub fn current(&self) -> CheckoutStep {
        self.representation.parse(&self.location.read())
    }

    /// Listen for step changes
    pub fn subscribe(&self) -> watch::Receiver<CheckoutStep> {
        self.step.subscribe()
    }

    /// Move to `step`, writing it through to the location.
    ///
    /// Returns `false` when the checkout already reached its terminal step.
    pub fn advance_to(&self, step: CheckoutStep) -> bool {
        let current = self.current();
        if current.is_terminal() && step != current {
            tracing::debug!("Ignoring transition from {} to {}", current, step);
            return false;
        }

        if step != current {
            self.location.push(&self.representation.encode(step));
        }
        self.step.send_if_modified(|value| {
            let changed = *value != step;
            *value = step;
            changed
        });
        true
    }

    /// Re-read the location after it changed externally (back/forward).
    pub fn on_location_changed(&self) -> CheckoutStep {
        let current = self.location.read();
        let step = self.representation.parse(&current);
        let encoded = self.representation.encode(step);
        if encoded != current {
            self.location.replace(&encoded);
        }

        self.step.send_if_modified(|value| {
            let changed = *value != step;
            *value = step;
            changed
        });
        step
    }

    /// Step lies before the current one
    pub fn is_complete(&self, step: CheckoutStep) -> bool {
        step < self.current()
    }

    /// Step is the current one or lies ahead
    pub fn is_incomplete(&self, step: CheckoutStep) -> bool {
        step >= self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(initial: &str) -> (Navigator, MemoryLocation) {
        let location = MemoryLocation::new(initial);
        (Navigator::with_fragment(Arc::new(location.clone())), location)
    }

    #[test]
    fn test_fragment_representation() {
        let fragment = FragmentRepresentation;
        for step in CheckoutStep::ALL {
            assert_eq!(fragment.parse(&fragment.encode(step)), step);
        }
        assert_eq!(fragment.encode(CheckoutStep::Billing), "#/checkout/payment-methods");
        assert_eq!(fragment.parse("#/checkout/bogus"), CheckoutStep::Address);
        assert_eq!(fragment.parse("#/account/review-purchase"), CheckoutStep::Address);
        assert_eq!(fragment.parse(""), CheckoutStep::Address);
    }

    #[test]
    fn test_new_normalizes_location() {
        let (navigator, location) = setup("#/checkout/nowhere");
        assert_eq!(navigator.current(), CheckoutStep::Address);
        assert_eq!(location.read(), "#/checkout/shipping-address");
        assert_eq!(location.len(), 1);

        let (navigator, _) = setup("#/checkout/review-purchase");
        assert_eq!(navigator.current(), CheckoutStep::Review);
    }

    #[test]
    fn test_advance_writes_through() {
        let (navigator, location) = setup("");
        let receiver = navigator.subscribe();

        assert!(navigator.advance_to(CheckoutStep::Shipping));
        assert_eq!(location.read(), "#/checkout/shipping-method");
        assert_eq!(*receiver.borrow(), CheckoutStep::Shipping);

        // anyone may jump, the navigator does not guard
        assert!(navigator.advance_to(CheckoutStep::Review));
        assert_eq!(navigator.current(), CheckoutStep::Review);
    }

    #[test]
    fn test_success_is_terminal() {
        let (navigator, location) = setup("#/checkout/pending");
        assert!(navigator.advance_to(CheckoutStep::Success));
        assert!(!navigator.advance_to(CheckoutStep::Billing));
        assert_eq!(navigator.current(), CheckoutStep::Success);
        assert_eq!(location.read(), "#/checkout/success");
    }

    #[test]
    fn test_back_navigation_is_unrestricted() {
        let (navigator, location) = setup("");
        navigator.advance_to(CheckoutStep::Shipping);
        navigator.advance_to(CheckoutStep::Billing);
        let mut receiver = navigator.subscribe();

        assert!(location.back());
        assert_eq!(navigator.on_location_changed(), CheckoutStep::Shipping);
        assert!(receiver.has_changed().expect("sender alive"));
        assert_eq!(*receiver.borrow_and_update(), CheckoutStep::Shipping);

        assert!(location.forward());
        assert_eq!(navigator.on_location_changed(), CheckoutStep::Billing);
        assert!(navigator.is_complete(CheckoutStep::Shipping));
        assert!(navigator.is_incomplete(CheckoutStep::Billing));
        assert!(!navigator.is_complete(CheckoutStep::Review));
    }

    #[test]
    fn test_external_garbage_is_clamped() {
        let (navigator, location) = setup("");
        navigator.advance_to(CheckoutStep::Billing);
        location.push("#/checkout/../../admin");
        assert_eq!(navigator.on_location_changed(), CheckoutStep::Address);
        assert_eq!(location.read(), "#/checkout/shipping-address");
    }
}
