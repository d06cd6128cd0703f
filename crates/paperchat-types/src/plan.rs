use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub note: String,
}

impl Plan {
    pub fn is_free(&self) -> bool {
        self.name.eq_ignore_ascii_case("free")
    }
}

/// Form payload for plan create/update. The backend assigns the id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanDraft {
    pub name: String,
    pub price: f64,
    pub credits: u32,
    #[serde(default)]
    pub note: String,
}

impl From<&Plan> for PlanDraft {
    fn from(plan: &Plan) -> Self {
        Self {
            name: plan.name.clone(),
            price: plan.price,
            credits: plan.credits,
            note: plan.note.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub id: String,
    pub amount: u64,
    #[serde(default)]
    pub currency: String,
}

/// Gateway confirmation handed back to the backend for verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProof {
    #[serde(rename = "razorpay_order_id")]
    pub order_id: String,
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
}

/// Upgrade screen ordering: the free plan leads, everything else keeps its
/// backend order.
pub fn sort_plans_free_first(plans: &mut [Plan]) {
    plans.sort_by_key(|p| !p.is_free());
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

    #[test]
    fn free_plan_sorts_first_and_order_is_stable() {
        let mut plans = vec![plan("1", "Pro"), plan("2", "Free"), plan("3", "Premium")];
        sort_plans_free_first(&mut plans);
        let names: Vec<&str> = plans.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Free", "Pro", "Premium"]);
    }

    #[test]
    fn is_free_ignores_case() {
        assert!(plan("1", "FREE").is_free());
        assert!(!plan("1", "Pro").is_free());
    }

    #[test]
    fn draft_round_trips_plan_fields() {
        let p = plan("1", "Pro");
        let draft = PlanDraft::from(&p);
        assert_eq!(draft.name, "Pro");
        assert_eq!(draft.credits, 100);
    }

    #[test]
    fn payment_proof_uses_gateway_field_names() {
        let proof = PaymentProof {
            order_id: "o1".to_string(),
            payment_id: "p1".to_string(),
            signature: "s1".to_string(),
        };
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json["razorpay_order_id"], "o1");
        assert_eq!(json["razorpay_signature"], "s1");
    }
}
