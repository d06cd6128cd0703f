use paperchat_client::ApiClient;
use paperchat_types::{plan::sort_plans_free_first, CheckoutOrder, PaymentProof, Plan};

pub struct PendingOrder {
    pub plan_id: String,
    pub order: CheckoutOrder,
}

/// Plan catalogue plus the checkout/verify handoff. The gateway itself is
/// external; this screen only opens an order and submits the proof back.
#[derive(Default)]
pub struct UpgradeView {
    pub plans: Vec<Plan>,
    pub selected: usize,
    pub loading: bool,
    pub busy_plan: Option<String>,
    pub pending_order: Option<PendingOrder>,
    pub proof_input: String,
    pub notice: Option<String>,
    pub message: Option<String>,
}

impl UpgradeView {
    pub async fn load(&mut self, client: &ApiClient) {
        self.loading = true;
        self.notice = None;
        match client.list_plans().await {
            Ok(mut plans) => {
                sort_plans_free_first(&mut plans);
                self.plans = plans;
                if self.selected >= self.plans.len() && !self.plans.is_empty() {
                    self.selected = self.plans.len() - 1;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load plans");
                self.notice = Some("Failed to load plans".to_string());
            }
        }
        self.loading = false;
    }

    pub fn selected_plan(&self) -> Option<&Plan> {
        self.plans.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.plans.is_empty() {
            self.selected = (self.selected + 1) % self.plans.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.plans.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.plans.len() - 1);
        }
    }

    pub fn awaiting_proof(&self) -> bool {
        self.pending_order.is_some()
    }

    pub async fn checkout_selected(&mut self, client: &ApiClient) {
        let Some(plan) = self.selected_plan() else {
            return;
        };
        if plan.is_free() || self.busy_plan.is_some() {
            return;
        }
        let plan_id = plan.id.clone();
        self.busy_plan = Some(plan_id.clone());
        self.notice = None;
        self.message = None;
        match client.checkout(&plan_id).await {
            Ok(order) => {
                tracing::info!(order = %order.id, plan = %plan_id, "checkout order opened");
                self.pending_order = Some(PendingOrder { plan_id, order });
                self.proof_input.clear();
            }
            Err(err) => {
                tracing::warn!(error = %err, "checkout failed");
                self.notice = Some("Something went wrong while initiating payment".to_string());
            }
        }
        self.busy_plan = None;
    }

    /// Proof format: `<payment_id> <signature>` as handed back by the
    /// gateway after the user pays the order externally.
    pub async fn verify(&mut self, client: &ApiClient) -> bool {
        let Some(pending) = &self.pending_order else {
            return false;
        };
        let mut parts = self.proof_input.split_whitespace();
        let (Some(payment_id), Some(signature)) = (parts.next(), parts.next()) else {
            self.notice = Some("Enter the payment id and signature".to_string());
            return false;
        };
        let proof = PaymentProof {
            order_id: pending.order.id.clone(),
            payment_id: payment_id.to_string(),
            signature: signature.to_string(),
        };
        let plan_id = pending.plan_id.clone();
        match client.verify_payment(&plan_id, &proof).await {
            Ok(message) => {
                self.message = Some(message);
                self.pending_order = None;
                self.proof_input.clear();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "payment verification failed");
                self.notice =
                    Some("Payment verification failed. Please contact support".to_string());
                false
            }
        }
    }

    pub fn cancel_order(&mut self) {
        self.pending_order = None;
        self.proof_input.clear();
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(id: &str, name: &str) -> Plan {
        Plan {
            id: id.to_string(),
            name: name.to_string(),
            price: 399.0,
            credits: 100,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn free_plan_checkout_is_a_no_op() {
        // Unroutable address: a network attempt would leave a notice behind.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut view = UpgradeView::default();
        view.plans = vec![plan("1", "Free")];
        view.checkout_selected(&client).await;
        assert!(view.pending_order.is_none());
        assert!(view.notice.is_none());
    }

    #[test]
    fn cancel_clears_the_pending_order() {
        let mut view = UpgradeView::default();
        view.pending_order = Some(PendingOrder {
            plan_id: "p1".to_string(),
            order: CheckoutOrder {
                id: "o1".to_string(),
                amount: 39900,
                currency: "INR".to_string(),
            },
        });
        view.proof_input = "pay sig".to_string();
        view.cancel_order();
        assert!(!view.awaiting_proof());
        assert!(view.proof_input.is_empty());
    }
}
