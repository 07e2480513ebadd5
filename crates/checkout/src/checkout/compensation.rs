//! Compensation actions for checkout steps.
//!
//! When a call fails after local state was changed optimistically,
//! compensating actions run in reverse order (LIFO) and put the view and the
//! step back where they were before the call.

use std::collections::VecDeque;

use checkout_common::cart::ShippingOption;
use tokio::sync::watch;
use tracing::instrument;

use super::view::CheckoutView;
use crate::navigator::Navigator;
use crate::CheckoutStep;

/// State a compensation may touch
pub(crate) struct CompensationContext<'a> {
    pub view: &'a watch::Sender<CheckoutView>,
    pub navigator: &'a Navigator,
}

pub(crate) trait CompensatingAction: Send + Sync {
    fn execute(&self, ctx: &CompensationContext<'_>);
    fn name(&self) -> &'static str;
}

/// Compensating actions, most recent first
#[derive(Default)]
pub(crate) struct Compensations {
    actions: VecDeque<Box<dyn CompensatingAction>>,
}

impl Compensations {
    pub fn push(&mut self, action: Box<dyn CompensatingAction>) {
        self.actions.push_front(action);
    }

    /// Forget the registered actions once the operation succeeded
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn execute(&mut self, ctx: &CompensationContext<'_>) {
        while let Some(action) = self.actions.pop_front() {
            tracing::debug!("Running compensation {}", action.name());
            action.execute(ctx);
        }
    }
}

/// Put back the shipping options that were cleared before attaching
/// billing and shipping to the cart.
pub(crate) struct RestoreShippingOptions {
    pub options: Vec<ShippingOption>,
}

impl CompensatingAction for RestoreShippingOptions {
    #[instrument(skip_all)]
    fn execute(&self, ctx: &CompensationContext<'_>) {
        tracing::info!(
            "Compensation: Restoring {} shipping options",
            self.options.len()
        );

        ctx.view.send_modify(|view| {
            view.shipping_options = self.options.clone();
        });
    }

    fn name(&self) -> &'static str {
        "RestoreShippingOptions"
    }
}

/// Return to the step an action started from
pub(crate) struct ReturnToStep {
    pub step: CheckoutStep,
}

impl CompensatingAction for ReturnToStep {
    #[instrument(skip_all)]
    fn execute(&self, ctx: &CompensationContext<'_>) {
        tracing::info!("Compensation: Returning to step {}", self.step);
        ctx.navigator.advance_to(self.step);
    }

    fn name(&self) -> &'static str {
        "ReturnToStep"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::navigator::MemoryLocation;

    struct Record {
        label: &'static str,
    }

    impl CompensatingAction for Record {
        fn execute(&self, ctx: &CompensationContext<'_>) {
            ctx.view.send_modify(|view| view.notices.load_errors.push(self.label.to_string()));
        }

        fn name(&self) -> &'static str {
            "Record"
        }
    }

    #[test]
    fn test_compensations_run_lifo() {
        let (view, _) = watch::channel(CheckoutView::default());
        let navigator = Navigator::with_fragment(Arc::new(MemoryLocation::default()));
        let ctx = CompensationContext {
            view: &view,
            navigator: &navigator,
        };

        let mut compensations = Compensations::default();
        compensations.push(Box::new(Record { label: "first" }));
        compensations.push(Box::new(Record { label: "second" }));
        compensations.execute(&ctx);

        assert_eq!(
            view.borrow().notices.load_errors,
            vec!["second".to_string(), "first".to_string()]
        );

        // drained
        compensations.execute(&ctx);
        assert_eq!(view.borrow().notices.load_errors.len(), 2);
    }

    #[test]
    fn test_restore_shipping_and_return_to_step() {
        let (view, _) = watch::channel(CheckoutView::default());
        let navigator = Navigator::with_fragment(Arc::new(MemoryLocation::new(
            "#/checkout/pending",
        )));
        let ctx = CompensationContext {
            view: &view,
            navigator: &navigator,
        };

        let options = vec![ShippingOption {
            carrier_party_id: "A".to_string(),
            shipment_method_enum_id: "B".to_string(),
            shipping_total: None,
            shipment_method_description: None,
        }];

        let mut compensations = Compensations::default();
        compensations.push(Box::new(RestoreShippingOptions {
            options: options.clone(),
        }));
        compensations.push(Box::new(ReturnToStep {
            step: CheckoutStep::Billing,
        }));
        compensations.execute(&ctx);

        assert_eq!(view.borrow().shipping_options, options);
        assert_eq!(navigator.current(), CheckoutStep::Billing);
    }
}
