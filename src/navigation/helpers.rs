//! # Navigation Helpers
//!
//! Named entry points for call sites. Screens call these instead of the raw
//! primitives so requests are tagged as user actions and the well-known
//! routes are never spelled out as strings.

use log::debug;

use super::controller::{NavigationController, NavigationError, RETURN_TO_PARAM};
use super::stack::StackOp;
use crate::routing::{NavigationRequest, Origin, Params, ResolutionDecision};

type NavResult = Result<ResolutionDecision, NavigationError>;

impl NavigationController {
    /// Pushes `name` on behalf of the user.
    pub async fn navigate_to(&self, name: &str, params: Params) -> NavResult {
        let request = NavigationRequest::new(name, params, Origin::UserAction);
        self.navigate(StackOp::Push, request).await
    }

    pub async fn navigate_to_home(&self) -> NavResult {
        let home = self.well_known().home.clone();
        self.navigate_to(&home, Params::new()).await
    }

    pub async fn navigate_to_login(&self) -> NavResult {
        let login = self.well_known().login.clone();
        self.navigate_to(&login, Params::new()).await
    }

    pub async fn reset_to_home(&self) -> NavResult {
        let home = self.well_known().home.clone();
        let request = NavigationRequest::new(&home, Params::new(), Origin::UserAction);
        self.navigate(StackOp::ResetTo, request).await
    }

    pub async fn reset_to_login(&self) -> NavResult {
        let login = self.well_known().login.clone();
        let request = NavigationRequest::new(&login, Params::new(), Origin::UserAction);
        self.navigate(StackOp::ResetTo, request).await
    }

    /// Called by the login screen after a successful sign-in.
    ///
    /// Re-issues the request that was redirected to login (as a reset, since
    /// login already owns the whole stack). Without a pending request, goes
    /// home.
    pub async fn resume_after_login(&self) -> NavResult {
        let well_known = self.well_known();
        self.reset_from_top(|top| {
            let pending = (top.route == well_known.login)
                .then(|| top.params.get(RETURN_TO_PARAM))
                .flatten()
                .and_then(NavigationRequest::from_value);

            match pending {
                Some(original) => {
                    debug!("Resuming {} after login", original.target);
                    NavigationRequest::new(&original.target, original.params, Origin::Redirect)
                }
                None => NavigationRequest::new(&well_known.home, Params::new(), Origin::UserAction),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::auth::{AuthStateProbe, ProbeError, SessionFlag};
    use crate::routing::{DecisionKind, params};
    use crate::test_support::{drain, scenario_controller};

    #[tokio::test]
    async fn test_navigate_to_is_user_action_push() {
        let (controller, _events) = scenario_controller(Arc::new(SessionFlag::new(true))).await;
        controller
            .navigate_to("form_editor", params([("form_id", "f-1")]))
            .await
            .unwrap();
        let top = controller.top().await;
        assert_eq!(top.route, "form_editor");
        assert_eq!(top.params["form_id"], "f-1");
        assert_eq!(controller.depth().await, 2);
    }

    #[tokio::test]
    async fn test_navigate_to_home_and_login() {
        let (controller, _events) = scenario_controller(Arc::new(SessionFlag::new(false))).await;
        controller.navigate_to_login().await.unwrap();
        assert_eq!(controller.routes().await, vec!["home", "login"]);
        controller.navigate_to_home().await.unwrap();
        assert_eq!(controller.routes().await, vec!["home", "login", "home"]);
    }

    #[tokio::test]
    async fn test_reset_helpers() {
        let (controller, _events) = scenario_controller(Arc::new(SessionFlag::new(false))).await;
        controller.navigate_to("about", Default::default()).await.unwrap();
        controller.reset_to_login().await.unwrap();
        assert_eq!(controller.routes().await, vec!["login"]);
        controller.reset_to_home().await.unwrap();
        assert_eq!(controller.routes().await, vec!["home"]);
    }

    #[tokio::test]
    async fn test_resume_after_login_reissues_original_request() {
        let session = SessionFlag::new(false);
        let (controller, mut events) = scenario_controller(Arc::new(session.clone())).await;
        controller
            .navigate_to("form_editor", params([("form_id", "f-9")]))
            .await
            .unwrap();
        assert_eq!(controller.routes().await, vec!["login"]);

        session.sign_in();
        let decision = controller.resume_after_login().await.unwrap();
        assert_eq!(decision.kind(), DecisionKind::Allow);
        let top = controller.top().await;
        assert_eq!(controller.routes().await, vec!["form_editor"]);
        assert_eq!(top.params["form_id"], "f-9");

        let last = drain(&mut events).pop().unwrap();
        assert_eq!(last.origin_route, "login");
        assert_eq!(last.target_route, "form_editor");
    }

    #[tokio::test]
    async fn test_resume_without_pending_request_goes_home() {
        let session = SessionFlag::new(false);
        let (controller, _events) = scenario_controller(Arc::new(session.clone())).await;
        controller.navigate_to_login().await.unwrap();
        session.sign_in();
        controller.resume_after_login().await.unwrap();
        assert_eq!(controller.routes().await, vec!["home"]);
    }

    #[tokio::test]
    async fn test_resume_while_still_signed_out_returns_to_login() {
        let (controller, _events) = scenario_controller(Arc::new(SessionFlag::new(false))).await;
        controller.navigate_to("dashboard", Default::default()).await.unwrap();
        let decision = controller.resume_after_login().await.unwrap();
        assert_eq!(decision.kind(), DecisionKind::RedirectToLogin);
        assert_eq!(controller.routes().await, vec!["login"]);
    }

    /// Signed out (after a delay) on the first question, signed in after.
    struct SignsInAfterFirstCheck {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthStateProbe for SignsInAfterFirstCheck {
        fn name(&self) -> &str {
            "signs-in-after-first-check"
        }

        async fn is_authenticated(&self) -> Result<bool, ProbeError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
                return Ok(false);
            }
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_resume_keeps_its_place_in_the_queue() {
        let probe = Arc::new(SignsInAfterFirstCheck {
            calls: AtomicUsize::new(0),
        });
        let (controller, mut events) = scenario_controller(probe).await;

        let (first, resume, third) = tokio::join!(
            controller.navigate_to("dashboard", Default::default()),
            controller.resume_after_login(),
            controller.navigate_to("nonexistent", Default::default()),
        );
        assert_eq!(first.unwrap().kind(), DecisionKind::RedirectToLogin);
        assert_eq!(resume.unwrap().kind(), DecisionKind::Allow);
        assert_eq!(third.unwrap().kind(), DecisionKind::NotFound);

        let targets: Vec<String> = drain(&mut events)
            .into_iter()
            .map(|e| e.target_route)
            .collect();
        assert_eq!(targets, vec!["dashboard", "dashboard", "nonexistent"]);
        assert_eq!(controller.routes().await, vec!["dashboard", "not_found"]);
    }
}
