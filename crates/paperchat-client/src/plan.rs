use paperchat_types::{CheckoutOrder, PaymentProof, Plan, PlanDraft};
use serde::Deserialize;

use crate::error::Result;
use crate::http::{ApiClient, Envelope, ListBody};

#[derive(Deserialize)]
struct OrderBody {
    order: CheckoutOrder,
}

#[derive(Deserialize)]
struct VerifyBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    pub async fn list_plans(&self) -> Result<Vec<Plan>> {
        let body: ListBody<Plan> = self.get_json("/api/plan").await?;
        Ok(body.into_vec())
    }

    pub async fn create_plan(&self, draft: &PlanDraft) -> Result<Plan> {
        let body: Envelope<Plan> = self.post_json("/api/plan", draft).await?;
        Ok(body.data)
    }

    pub async fn update_plan(&self, id: &str, draft: &PlanDraft) -> Result<Plan> {
        let body: Envelope<Plan> = self.put_json(&format!("/api/plan/{}", id), draft).await?;
        Ok(body.data)
    }

    pub async fn delete_plan(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/plan/{}", id)).await
    }

    /// Open a gateway order for the plan. The actual payment happens outside
    /// this process; `verify_payment` closes the loop.
    pub async fn checkout(&self, plan_id: &str) -> Result<CheckoutOrder> {
        let body: OrderBody = self
            .post_json(&format!("/api/plan/checkout/{}", plan_id), &serde_json::json!({}))
            .await?;
        Ok(body.order)
    }

    pub async fn verify_payment(&self, plan_id: &str, proof: &PaymentProof) -> Result<String> {
        let body: VerifyBody = self
            .post_json(&format!("/api/plan/payment/verify/{}", plan_id), proof)
            .await?;
        Ok(body
            .message
            .unwrap_or_else(|| "Your plan has been upgraded".to_string()))
    }
}
