use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use paperchat_client::{
    decide, Access, ApiClient, AuthEvent, ClientConfig, GuardDecision, RefreshLoop, SessionCache,
    SessionSource, SessionView,
};
use paperchat_types::Session;

use crate::views::auth::{LoginForm, SignupForm};
use crate::views::chat::ChatView;
use crate::views::plans::{PlanAdminView, PlanFocus};
use crate::views::upgrade::UpgradeView;
use crate::views::workspace::{UploadForm, WorkspaceView};

/// Characters of the newest answer revealed per UI tick.
const TYPING_CHARS_PER_TICK: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Forbidden,
    Workspace,
    Upgrade,
    Chat,
    PlanAdmin,
}

impl Route {
    pub fn access(self) -> Access {
        match self {
            Route::Home | Route::Login | Route::Signup | Route::Forbidden => Access::Public,
            Route::Workspace | Route::Upgrade | Route::Chat => Access::Authenticated,
            Route::PlanAdmin => Access::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Route),
    Logout,
    ToggleSidebar,
    TogglePassword,
    ToggleUploadModal,
    ToggleImagePrompt,
    Input(char),
    Backspace,
    NextField,
    PrevField,
    Submit,
    SelectNext,
    SelectPrev,
    OpenSelected,
    DeleteSelected,
    EditSelected,
    ExportTranscript,
    SkipTyping,
    CancelOrClose,
}

pub struct App<S: SessionSource> {
    pub config: ClientConfig,
    pub client: ApiClient,
    pub session: SessionCache<S>,
    pub refresh: Arc<RefreshLoop>,
    auth_events: mpsc::UnboundedReceiver<AuthEvent>,

    pub route: Route,
    route_loaded: bool,
    session_probe: bool,
    pub should_quit: bool,
    pub tick_count: usize,
    pub sidebar_visible: bool,
    pub flash: Option<String>,
    /// Open profile-image prompt; the buffer is the typed file path.
    pub image_prompt: Option<String>,

    pub login: LoginForm,
    pub signup: SignupForm,
    pub workspace: WorkspaceView,
    pub upload: UploadForm,
    pub chat: ChatView,
    pub upgrade: UpgradeView,
    pub plans: PlanAdminView,
}

impl<S: SessionSource> App<S> {
    pub fn new(
        config: ClientConfig,
        client: ApiClient,
        session: SessionCache<S>,
        refresh: Arc<RefreshLoop>,
        auth_events: mpsc::UnboundedReceiver<AuthEvent>,
    ) -> Self {
        Self {
            config,
            client,
            session,
            refresh,
            auth_events,
            route: Route::Home,
            route_loaded: false,
            session_probe: false,
            should_quit: false,
            tick_count: 0,
            sidebar_visible: true,
            flash: None,
            image_prompt: None,
            login: LoginForm::default(),
            signup: SignupForm::default(),
            workspace: WorkspaceView::default(),
            upload: UploadForm::default(),
            chat: ChatView::default(),
            upgrade: UpgradeView::default(),
            plans: PlanAdminView::default(),
        }
    }

    pub fn guard_decision(&self) -> GuardDecision {
        decide(self.route.access(), &self.session.view())
    }

    pub fn current_session(&self) -> Option<Session> {
        match self.session.view() {
            SessionView::Resolved(session) => session,
            SessionView::Pending => None,
        }
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('x') => Some(Action::Quit),
                KeyCode::Char('b') => Some(Action::ToggleSidebar),
                KeyCode::Char('l') if self.route.access() != Access::Public => {
                    Some(Action::Logout)
                }
                KeyCode::Char('u') if self.route == Route::Workspace => {
                    Some(Action::ToggleUploadModal)
                }
                KeyCode::Char('i') if self.route.access() != Access::Public => {
                    Some(Action::ToggleImagePrompt)
                }
                KeyCode::Char('p') if matches!(self.route, Route::Login | Route::Signup) => {
                    Some(Action::TogglePassword)
                }
                KeyCode::Char('e') if self.route == Route::Chat => Some(Action::ExportTranscript),
                KeyCode::Char('d') if self.route == Route::Chat => Some(Action::DeleteSelected),
                _ => None,
            };
        }

        // Section navigation works from any signed-in screen; the guard
        // decides what actually renders.
        match key.code {
            KeyCode::F(2) => return Some(Action::Navigate(Route::Workspace)),
            KeyCode::F(3) => return Some(Action::Navigate(Route::Upgrade)),
            KeyCode::F(4) => return Some(Action::Navigate(Route::PlanAdmin)),
            _ => {}
        }

        if self.image_prompt.is_some() {
            return match key.code {
                KeyCode::Esc => Some(Action::CancelOrClose),
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Char(c) => Some(Action::Input(c)),
                _ => None,
            };
        }

        if self.upload.open && self.route == Route::Workspace {
            return match key.code {
                KeyCode::Esc => Some(Action::CancelOrClose),
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Tab => Some(Action::NextField),
                KeyCode::BackTab => Some(Action::PrevField),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Char(c) => Some(Action::Input(c)),
                _ => None,
            };
        }

        match self.route {
            Route::Home => match key.code {
                KeyCode::Char('l') => Some(Action::Navigate(Route::Login)),
                KeyCode::Char('s') => Some(Action::Navigate(Route::Signup)),
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => None,
            },
            Route::Login | Route::Signup => match key.code {
                KeyCode::Esc => Some(Action::CancelOrClose),
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Tab => Some(Action::NextField),
                KeyCode::BackTab => Some(Action::PrevField),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Char(c) => Some(Action::Input(c)),
                _ => None,
            },
            Route::Forbidden => match key.code {
                KeyCode::Esc | KeyCode::Enter => Some(Action::Navigate(Route::Workspace)),
                _ => None,
            },
            Route::Workspace => match key.code {
                KeyCode::Esc => Some(Action::CancelOrClose),
                KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrev),
                KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
                KeyCode::Enter => Some(Action::OpenSelected),
                KeyCode::Char('d') => Some(Action::DeleteSelected),
                KeyCode::Char('u') => Some(Action::ToggleUploadModal),
                _ => None,
            },
            Route::Chat => match key.code {
                KeyCode::Esc => Some(Action::CancelOrClose),
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Up => Some(Action::SelectPrev),
                KeyCode::Down => Some(Action::SelectNext),
                KeyCode::Tab => Some(Action::SkipTyping),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Char(c) => Some(Action::Input(c)),
                _ => None,
            },
            Route::Upgrade => {
                if self.upgrade.awaiting_proof() {
                    match key.code {
                        KeyCode::Esc => Some(Action::CancelOrClose),
                        KeyCode::Enter => Some(Action::Submit),
                        KeyCode::Backspace => Some(Action::Backspace),
                        KeyCode::Char(c) => Some(Action::Input(c)),
                        _ => None,
                    }
                } else {
                    match key.code {
                        KeyCode::Esc => Some(Action::CancelOrClose),
                        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrev),
                        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
                        KeyCode::Enter => Some(Action::Submit),
                        _ => None,
                    }
                }
            }
            Route::PlanAdmin => {
                if self.plans.focus() == PlanFocus::Table {
                    match key.code {
                        KeyCode::Esc => Some(Action::CancelOrClose),
                        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrev),
                        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
                        KeyCode::Char('e') => Some(Action::EditSelected),
                        KeyCode::Char('d') => Some(Action::DeleteSelected),
                        KeyCode::Tab => Some(Action::NextField),
                        KeyCode::BackTab => Some(Action::PrevField),
                        _ => None,
                    }
                } else {
                    match key.code {
                        KeyCode::Esc => Some(Action::CancelOrClose),
                        KeyCode::Enter => Some(Action::Submit),
                        KeyCode::Tab => Some(Action::NextField),
                        KeyCode::BackTab => Some(Action::PrevField),
                        KeyCode::Backspace => Some(Action::Backspace),
                        KeyCode::Char(c) => Some(Action::Input(c)),
                        _ => None,
                    }
                }
            }
        }
    }

    pub async fn update(&mut self, action: Action) -> anyhow::Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Navigate(route) => self.navigate(route),
            Action::ToggleSidebar => self.sidebar_visible = !self.sidebar_visible,
            Action::Logout => self.logout().await,
            Action::ToggleUploadModal => self.upload.toggle(),
            Action::ToggleImagePrompt => {
                self.image_prompt = match self.image_prompt {
                    Some(_) => None,
                    None => Some(String::new()),
                };
            }
            Action::TogglePassword => match self.route {
                Route::Login => self.login.toggle_password(),
                Route::Signup => self.signup.toggle_password(),
                _ => {}
            },
            Action::Input(c) => {
                if let Some(buffer) = &mut self.image_prompt {
                    buffer.push(c);
                } else {
                    match self.route {
                        Route::Login => self.login.input(c),
                        Route::Signup => self.signup.input(c),
                        Route::Workspace if self.upload.open => self.upload.input(c),
                        Route::Chat => self.chat.question.push(c),
                        Route::Upgrade => self.upgrade.proof_input.push(c),
                        Route::PlanAdmin => self.plans.input(c),
                        _ => {}
                    }
                }
            }
            Action::Backspace => {
                if let Some(buffer) = &mut self.image_prompt {
                    buffer.pop();
                } else {
                    match self.route {
                        Route::Login => self.login.backspace(),
                        Route::Signup => self.signup.backspace(),
                        Route::Workspace if self.upload.open => self.upload.backspace(),
                        Route::Chat => {
                            self.chat.question.pop();
                        }
                        Route::Upgrade => {
                            self.upgrade.proof_input.pop();
                        }
                        Route::PlanAdmin => self.plans.backspace(),
                        _ => {}
                    }
                }
            }
            Action::NextField => match self.route {
                Route::Login => self.login.next_field(),
                Route::Signup => self.signup.next_field(),
                Route::Workspace if self.upload.open => self.upload.next_field(),
                Route::PlanAdmin => self.plans.next_field(),
                _ => {}
            },
            Action::PrevField => match self.route {
                Route::Login => self.login.next_field(),
                Route::Signup => self.signup.prev_field(),
                Route::Workspace if self.upload.open => self.upload.next_field(),
                Route::PlanAdmin => self.plans.prev_field(),
                _ => {}
            },
            Action::Submit => self.submit().await,
            Action::SelectNext => match self.route {
                Route::Workspace => self.workspace.select_next(),
                Route::Chat => self.chat.select_next(),
                Route::Upgrade => self.upgrade.select_next(),
                Route::PlanAdmin => self.plans.select_next(),
                _ => {}
            },
            Action::SelectPrev => match self.route {
                Route::Workspace => self.workspace.select_prev(),
                Route::Chat => self.chat.select_prev(),
                Route::Upgrade => self.upgrade.select_prev(),
                Route::PlanAdmin => self.plans.select_prev(),
                _ => {}
            },
            Action::OpenSelected => {
                if self.route == Route::Workspace {
                    if let Some(file) = self.workspace.selected_file().cloned() {
                        self.chat.prepare(file);
                        self.navigate(Route::Chat);
                    }
                }
            }
            Action::DeleteSelected => match self.route {
                Route::Workspace => self.workspace.delete_selected(&self.client).await,
                Route::Chat => self.chat.delete_selected(&self.client).await,
                Route::PlanAdmin => self.plans.delete_selected(&self.client).await,
                _ => {}
            },
            Action::EditSelected => {
                if self.route == Route::PlanAdmin {
                    self.plans.edit_selected();
                }
            }
            Action::ExportTranscript => {
                if self.route == Route::Chat {
                    match self.chat.export() {
                        Ok(path) => self.flash = Some(format!("Saved {}", path.display())),
                        Err(problem) => self.flash = Some(problem),
                    }
                }
            }
            Action::SkipTyping => self.chat.typing.skip(),
            Action::CancelOrClose => self.cancel_or_close(),
        }
        Ok(())
    }

    async fn submit(&mut self) {
        if self.image_prompt.is_some() {
            self.submit_image().await;
            return;
        }
        match self.route {
            Route::Login => {
                if self.login.submit(&self.client).await {
                    // New entitlements: everything downstream re-reads.
                    self.session.invalidate();
                    self.navigate(Route::Workspace);
                }
            }
            Route::Signup => {
                if self.signup.submit(&self.client).await {
                    self.flash = Some("Account created. Please log in".to_string());
                    self.navigate(Route::Login);
                }
            }
            Route::Workspace if self.upload.open => {
                let session = self.current_session();
                if self
                    .upload
                    .submit(&self.client, session.as_ref(), self.config.max_upload_bytes)
                    .await
                {
                    let _ = self.client.refresh_token().await;
                    self.session.invalidate();
                    self.upload.close();
                    self.workspace.load(&self.client).await;
                    self.flash = Some("PDF uploaded".to_string());
                }
            }
            Route::Chat => self.chat.ask(&self.client).await,
            Route::Upgrade => {
                if self.upgrade.awaiting_proof() {
                    if self.upgrade.verify(&self.client).await {
                        let _ = self.client.refresh_token().await;
                        self.session.invalidate();
                    }
                } else {
                    self.upgrade.checkout_selected(&self.client).await;
                }
            }
            Route::PlanAdmin => self.plans.submit(&self.client).await,
            _ => {}
        }
    }

    /// Store the image, point the profile at it, then renew the credential
    /// so the next session read reflects the new picture.
    async fn submit_image(&mut self) {
        let Some(raw) = self.image_prompt.clone() else {
            return;
        };
        let path = PathBuf::from(raw.trim());
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        if filename.is_empty() {
            self.flash = Some("Enter an image file path".to_string());
            return;
        }
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.flash = Some(format!("Cannot read {}: {}", path.display(), err));
                return;
            }
        };
        let result = async {
            let uploaded = self.client.upload_logo(&filename, bytes).await?;
            self.client.update_image(&uploaded.url).await?;
            self.client.refresh_token().await
        }
        .await;
        match result {
            Ok(()) => {
                self.session.invalidate();
                self.image_prompt = None;
                self.flash = Some("Profile image updated".to_string());
            }
            Err(err) => self.flash = Some(err.notice()),
        }
    }

    fn cancel_or_close(&mut self) {
        if self.image_prompt.take().is_some() {
            return;
        }
        if self.flash.take().is_some() {
            return;
        }
        match self.route {
            Route::Login | Route::Signup => self.navigate(Route::Home),
            Route::Workspace => {
                if self.upload.open {
                    self.upload.close();
                } else {
                    self.workspace.notice = None;
                }
            }
            Route::Chat => {
                if self.chat.notice.take().is_none() {
                    self.navigate(Route::Workspace);
                }
            }
            Route::Upgrade => {
                if self.upgrade.awaiting_proof() {
                    self.upgrade.cancel_order();
                } else {
                    self.upgrade.notice = None;
                    self.upgrade.message = None;
                }
            }
            Route::PlanAdmin => self.plans.cancel_edit(),
            _ => {}
        }
    }

    pub fn navigate(&mut self, route: Route) {
        self.route = route;
        self.route_loaded = false;
    }

    async fn logout(&mut self) {
        match self.client.logout().await {
            Ok(()) => {
                // Epoch first: a refresh tick racing this logout must land
                // in a superseded epoch and be discarded.
                let epoch = self.refresh.supersede();
                self.session.clear();
                tracing::info!(epoch, "signed out");
                self.navigate(Route::Login);
            }
            Err(err) => {
                self.flash = Some(err.notice());
            }
        }
    }

    fn force_logout(&mut self) {
        tracing::warn!("credential renewal failed; signing out");
        self.session.clear();
        self.flash = Some("Session expired. Please log in again".to_string());
        self.navigate(Route::Login);
    }

    async fn load_route_data(&mut self) {
        match self.route {
            Route::Workspace => self.workspace.load(&self.client).await,
            Route::Upgrade => self.upgrade.load(&self.client).await,
            Route::PlanAdmin => self.plans.load(&self.client).await,
            Route::Chat => self.chat.load(&self.client).await,
            _ => {}
        }
    }

    pub async fn tick(&mut self) {
        self.tick_count += 1;

        while let Ok(event) = self.auth_events.try_recv() {
            match event {
                AuthEvent::ForcedLogout => self.force_logout(),
            }
        }

        self.chat.typing.tick(TYPING_CHARS_PER_TICK);

        match self.guard_decision() {
            GuardDecision::Loading => {
                // Kick the shared read once; everyone else waits on it.
                if !self.session_probe {
                    self.session_probe = true;
                    let cache = self.session.clone();
                    tokio::spawn(async move {
                        let _ = cache.get().await;
                    });
                }
            }
            GuardDecision::Unauthenticated => {
                self.session_probe = false;
                self.navigate(Route::Login);
            }
            GuardDecision::Forbidden => {
                self.session_probe = false;
                self.navigate(Route::Forbidden);
            }
            GuardDecision::Authorized => {
                self.session_probe = false;
                if !self.route_loaded {
                    self.route_loaded = true;
                    self.load_route_data().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use paperchat_client::ClientError;
    use paperchat_types::Role;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedSender;

    enum FakeKind {
        User { credit: u32, used: u32 },
        Admin,
        Absent,
        Hang,
    }

    struct FakeSource(FakeKind);

    fn session(role: Role, credit: u32, used: u32) -> Session {
        Session {
            id: "u1".to_string(),
            fullname: "Test User".to_string(),
            email: "t@example.com".to_string(),
            role,
            credit,
            used_credits: used,
            image: None,
        }
    }

    #[async_trait]
    impl SessionSource for FakeSource {
        async fn load(&self) -> paperchat_client::Result<Session> {
            match &self.0 {
                FakeKind::User { credit, used } => Ok(session(Role::User, *credit, *used)),
                FakeKind::Admin => Ok(session(Role::Admin, 0, 0)),
                FakeKind::Absent => Err(ClientError::Network("down".to_string())),
                FakeKind::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(ClientError::Network("hung".to_string()))
                }
            }
        }
    }

    fn test_app(kind: FakeKind) -> (App<FakeSource>, UnboundedSender<AuthEvent>) {
        let config = ClientConfig::default();
        // Unroutable port: any accidental network call fails fast.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let cache = SessionCache::new(FakeSource(kind), Duration::from_secs(60));
        let refresh = Arc::new(RefreshLoop::new());
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(config, client, cache, refresh, rx), tx)
    }

    /// Run ticks until the session probe resolves and redirects settle.
    async fn settle(app: &mut App<FakeSource>) {
        for _ in 0..3 {
            app.tick().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[tokio::test]
    async fn guarded_route_stays_loading_while_session_is_pending() {
        let (mut app, _tx) = test_app(FakeKind::Hang);
        app.navigate(Route::Workspace);
        app.tick().await;
        assert_eq!(app.guard_decision(), GuardDecision::Loading);
        assert_eq!(app.route, Route::Workspace);
    }

    #[tokio::test]
    async fn absent_session_redirects_to_login() {
        let (mut app, _tx) = test_app(FakeKind::Absent);
        app.navigate(Route::Workspace);
        settle(&mut app).await;
        assert_eq!(app.route, Route::Login);
    }

    #[tokio::test]
    async fn non_admin_on_plan_admin_lands_on_forbidden_not_login() {
        let (mut app, _tx) = test_app(FakeKind::User { credit: 5, used: 0 });
        app.navigate(Route::PlanAdmin);
        settle(&mut app).await;
        assert_eq!(app.route, Route::Forbidden);
    }

    #[tokio::test]
    async fn admin_reaches_the_plan_screen() {
        let (mut app, _tx) = test_app(FakeKind::Admin);
        app.navigate(Route::PlanAdmin);
        settle(&mut app).await;
        assert_eq!(app.route, Route::PlanAdmin);
        assert_eq!(app.guard_decision(), GuardDecision::Authorized);
    }

    #[tokio::test]
    async fn forced_logout_event_signs_the_user_out() {
        let (mut app, tx) = test_app(FakeKind::User { credit: 5, used: 0 });
        app.navigate(Route::Workspace);
        settle(&mut app).await;

        tx.send(AuthEvent::ForcedLogout).unwrap();
        app.tick().await;

        assert_eq!(app.route, Route::Login);
        assert_eq!(app.session.view(), SessionView::Resolved(None));
    }

    #[tokio::test]
    async fn exhausted_credits_block_upload_client_side() {
        let (mut app, _tx) = test_app(FakeKind::User { credit: 5, used: 5 });
        app.navigate(Route::Workspace);
        settle(&mut app).await;

        app.upload.open = true;
        app.upload.title = "Notes".to_string();
        app.upload.path = "/tmp/notes.pdf".to_string();
        app.update(Action::Submit).await.unwrap();

        assert_eq!(app.upload.notice.as_deref(), Some("No credits left"));
        assert!(app.upload.open, "modal stays open on rejection");
    }

    #[tokio::test]
    async fn image_prompt_rejects_a_missing_file_without_closing() {
        let (mut app, _tx) = test_app(FakeKind::User { credit: 5, used: 0 });
        app.navigate(Route::Workspace);
        settle(&mut app).await;

        app.image_prompt = Some("/no/such/image.png".to_string());
        app.update(Action::Submit).await.unwrap();

        assert!(app.flash.is_some());
        assert!(app.image_prompt.is_some(), "prompt stays open on rejection");
    }

    #[tokio::test]
    async fn public_routes_render_without_a_session() {
        let (mut app, _tx) = test_app(FakeKind::Hang);
        app.tick().await;
        assert_eq!(app.route, Route::Home);
        assert_eq!(app.guard_decision(), GuardDecision::Authorized);
    }
}
