use paperchat_client::ApiClient;
use paperchat_types::{Plan, PlanDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFocus {
    Name,
    Price,
    Credits,
    Note,
    Table,
}

/// The admin plan screen: a create/edit form above the plan table. The
/// guard has already established the admin role by the time this renders.
#[derive(Default)]
pub struct PlanAdminView {
    pub plans: Vec<Plan>,
    pub name: String,
    pub price: String,
    pub credits: String,
    pub note: String,
    pub focus: Option<PlanFocus>,
    pub editing: Option<String>,
    pub selected: usize,
    pub deleting: Option<String>,
    pub notice: Option<String>,
}

impl PlanAdminView {
    pub fn focus(&self) -> PlanFocus {
        self.focus.unwrap_or(PlanFocus::Name)
    }

    pub async fn load(&mut self, client: &ApiClient) {
        self.notice = None;
        match client.list_plans().await {
            Ok(plans) => {
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
    }

    pub fn input(&mut self, c: char) {
        let field = match self.focus() {
            PlanFocus::Name => &mut self.name,
            PlanFocus::Price => &mut self.price,
            PlanFocus::Credits => &mut self.credits,
            PlanFocus::Note => &mut self.note,
            PlanFocus::Table => return,
        };
        field.push(c);
    }

    pub fn backspace(&mut self) {
        let field = match self.focus() {
            PlanFocus::Name => &mut self.name,
            PlanFocus::Price => &mut self.price,
            PlanFocus::Credits => &mut self.credits,
            PlanFocus::Note => &mut self.note,
            PlanFocus::Table => return,
        };
        field.pop();
    }

    pub fn next_field(&mut self) {
        self.focus = Some(match self.focus() {
            PlanFocus::Name => PlanFocus::Price,
            PlanFocus::Price => PlanFocus::Credits,
            PlanFocus::Credits => PlanFocus::Note,
            PlanFocus::Note => PlanFocus::Table,
            PlanFocus::Table => PlanFocus::Name,
        });
    }

    pub fn prev_field(&mut self) {
        self.focus = Some(match self.focus() {
            PlanFocus::Name => PlanFocus::Table,
            PlanFocus::Price => PlanFocus::Name,
            PlanFocus::Credits => PlanFocus::Price,
            PlanFocus::Note => PlanFocus::Credits,
            PlanFocus::Table => PlanFocus::Note,
        });
    }

    /// Parse the form into a draft; name, price and credits are required,
    /// the note allowance is free-text and optional.
    pub fn to_draft(&self) -> Result<PlanDraft, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Plan name is required".to_string());
        }
        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| "Price must be a number".to_string())?;
        if price < 0.0 {
            return Err("Price cannot be negative".to_string());
        }
        let credits: u32 = self
            .credits
            .trim()
            .parse()
            .map_err(|_| "Credits must be a whole number".to_string())?;
        Ok(PlanDraft {
            name: name.to_string(),
            price,
            credits,
            note: self.note.trim().to_string(),
        })
    }

    pub fn reset_form(&mut self) {
        self.name.clear();
        self.price.clear();
        self.credits.clear();
        self.note.clear();
        self.editing = None;
        self.focus = None;
    }

    pub fn edit_selected(&mut self) {
        let Some(plan) = self.plans.get(self.selected) else {
            return;
        };
        self.name = plan.name.clone();
        self.price = format_price(plan.price);
        self.credits = plan.credits.to_string();
        self.note = plan.note.clone();
        self.editing = Some(plan.id.clone());
        self.focus = Some(PlanFocus::Name);
    }

    pub fn apply_created(&mut self, plan: Plan) {
        self.plans.push(plan);
        self.reset_form();
    }

    pub fn apply_updated(&mut self, plan: Plan) {
        if let Some(slot) = self.plans.iter_mut().find(|p| p.id == plan.id) {
            *slot = plan;
        }
        self.reset_form();
    }

    pub async fn submit(&mut self, client: &ApiClient) {
        self.notice = None;
        let draft = match self.to_draft() {
            Ok(draft) => draft,
            Err(problem) => {
                self.notice = Some(problem);
                return;
            }
        };
        match self.editing.clone() {
            Some(id) => match client.update_plan(&id, &draft).await {
                Ok(plan) => self.apply_updated(plan),
                Err(err) => {
                    tracing::warn!(error = %err, "plan update failed");
                    self.notice = Some(err.notice());
                }
            },
            None => match client.create_plan(&draft).await {
                Ok(plan) => self.apply_created(plan),
                Err(err) => {
                    tracing::warn!(error = %err, "plan create failed");
                    self.notice = Some(err.notice());
                }
            },
        }
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

    pub async fn delete_selected(&mut self, client: &ApiClient) {
        let Some(plan) = self.plans.get(self.selected) else {
            return;
        };
        if self.deleting.is_some() {
            return;
        }
        let id = plan.id.clone();
        self.deleting = Some(id.clone());
        self.notice = None;
        match client.delete_plan(&id).await {
            Ok(()) => {
                self.plans.retain(|p| p.id != id);
                if self.editing.as_deref() == Some(id.as_str()) {
                    self.reset_form();
                }
                if self.selected >= self.plans.len() && !self.plans.is_empty() {
                    self.selected = self.plans.len() - 1;
                }
            }
            Err(err) => {
                self.notice = Some(err.notice());
            }
        }
        self.deleting = None;
    }

    pub fn cancel_edit(&mut self) {
        if self.editing.is_some() {
            self.reset_form();
        } else {
            self.notice = None;
        }
    }
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{}", price)
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
            note: "Unlimited".to_string(),
        }
    }

    fn filled_view() -> PlanAdminView {
        let mut view = PlanAdminView::default();
        view.name = "Pro".to_string();
        view.price = "399".to_string();
        view.credits = "100".to_string();
        view.note = String::new();
        view
    }

    #[test]
    fn draft_parses_the_form() {
        let draft = filled_view().to_draft().unwrap();
        assert_eq!(draft.name, "Pro");
        assert_eq!(draft.price, 399.0);
        assert_eq!(draft.credits, 100);
        assert_eq!(draft.note, "");
    }

    #[test]
    fn draft_rejects_missing_name_and_bad_numbers() {
        let mut view = filled_view();
        view.name = "  ".to_string();
        assert!(view.to_draft().is_err());

        let mut view = filled_view();
        view.price = "a lot".to_string();
        assert_eq!(view.to_draft().unwrap_err(), "Price must be a number");

        let mut view = filled_view();
        view.credits = "-3".to_string();
        assert!(view.to_draft().is_err());
    }

    #[test]
    fn created_plan_joins_the_list_and_form_resets() {
        let mut view = filled_view();
        view.apply_created(plan("srv-1", "Pro"));
        assert_eq!(view.plans.len(), 1);
        assert_eq!(view.plans[0].id, "srv-1");
        assert!(view.name.is_empty());
        assert!(view.price.is_empty());
        assert!(view.editing.is_none());
    }

    #[test]
    fn updated_plan_replaces_exactly_its_row() {
        let mut view = PlanAdminView::default();
        view.plans = vec![plan("1", "Basic"), plan("2", "Pro")];
        view.editing = Some("2".to_string());
        let mut updated = plan("2", "Pro Max");
        updated.price = 499.0;
        view.apply_updated(updated);
        assert_eq!(view.plans[0].name, "Basic");
        assert_eq!(view.plans[1].name, "Pro Max");
        assert_eq!(view.plans[1].price, 499.0);
        assert!(view.editing.is_none());
    }

    #[test]
    fn edit_selected_fills_the_form() {
        let mut view = PlanAdminView::default();
        view.plans = vec![plan("1", "Basic")];
        view.edit_selected();
        assert_eq!(view.name, "Basic");
        assert_eq!(view.price, "399");
        assert_eq!(view.editing.as_deref(), Some("1"));
    }
}
