use crate::session::SessionView;

/// What a route demands of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// The closed set of guard outcomes. Rendering and redirects key off this
/// and nothing else; the machine per guarded navigation is
/// `Loading -> {Authorized, Unauthenticated, Forbidden}`, leaving `Loading`
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session read still in flight: render nothing, redirect nowhere.
    Loading,
    Authorized,
    /// Absent session: redirect to login.
    Unauthenticated,
    /// Present session, insufficient role: redirect to the forbidden
    /// screen — never to login.
    Forbidden,
}

pub fn decide(access: Access, view: &SessionView) -> GuardDecision {
    match access {
        Access::Public => GuardDecision::Authorized,
        Access::Authenticated | Access::Admin => match view {
            SessionView::Pending => GuardDecision::Loading,
            SessionView::Resolved(None) => GuardDecision::Unauthenticated,
            SessionView::Resolved(Some(session)) => {
                if access == Access::Admin && !session.is_admin() {
                    GuardDecision::Forbidden
                } else {
                    GuardDecision::Authorized
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperchat_types::{Role, Session};

    fn session(role: Role) -> Session {
        Session {
            id: "u1".to_string(),
            fullname: "Test".to_string(),
            email: "t@example.com".to_string(),
            role,
            credit: 10,
            used_credits: 0,
            image: None,
        }
    }

    #[test]
    fn public_routes_never_gate() {
        assert_eq!(
            decide(Access::Public, &SessionView::Pending),
            GuardDecision::Authorized
        );
        assert_eq!(
            decide(Access::Public, &SessionView::Resolved(None)),
            GuardDecision::Authorized
        );
    }

    #[test]
    fn pending_session_renders_nothing() {
        assert_eq!(
            decide(Access::Authenticated, &SessionView::Pending),
            GuardDecision::Loading
        );
        assert_eq!(
            decide(Access::Admin, &SessionView::Pending),
            GuardDecision::Loading
        );
    }

    #[test]
    fn absent_session_goes_to_login() {
        assert_eq!(
            decide(Access::Authenticated, &SessionView::Resolved(None)),
            GuardDecision::Unauthenticated
        );
        assert_eq!(
            decide(Access::Admin, &SessionView::Resolved(None)),
            GuardDecision::Unauthenticated
        );
    }

    #[test]
    fn non_admin_on_admin_route_is_forbidden_not_unauthenticated() {
        let view = SessionView::Resolved(Some(session(Role::User)));
        assert_eq!(decide(Access::Admin, &view), GuardDecision::Forbidden);
    }

    #[test]
    fn admin_passes_both_guards() {
        let view = SessionView::Resolved(Some(session(Role::Admin)));
        assert_eq!(decide(Access::Authenticated, &view), GuardDecision::Authorized);
        assert_eq!(decide(Access::Admin, &view), GuardDecision::Authorized);
    }

    #[test]
    fn user_passes_the_authenticated_guard() {
        let view = SessionView::Resolved(Some(session(Role::User)));
        assert_eq!(decide(Access::Authenticated, &view), GuardDecision::Authorized);
    }
}
