//! Harness assembly from module source text.

use crate::field::FieldKindTable;
use crate::invoker::ProxyInvoker;
use crate::section::{Section, SubmitOutcome};
use apiproxy_extractor::{ExtractIssue, extract};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global authentication indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// The session holds a token.
    LoggedIn,
    /// No token.
    LoggedOut,
}

impl AuthStatus {
    const fn from_flag(authenticated: bool) -> Self {
        if authenticated {
            Self::LoggedIn
        } else {
            Self::LoggedOut
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoggedIn => "logged in",
            Self::LoggedOut => "logged out",
        })
    }
}

/// A set of sections built from one generated module.
///
/// # Examples
///
/// ```no_run
/// use apiproxy_client::{Dispatcher, ProxyModule};
/// use apiproxy_harness::{FieldKindTable, Harness};
///
/// # async fn example(source: &str, dispatcher: Dispatcher) -> Result<(), apiproxy_client::InvokeError> {
/// let proxy = ProxyModule::connect(dispatcher).await?;
/// let harness = Harness::load(source, proxy, &FieldKindTable::default());
///
/// harness.section("echomsg").unwrap().field("msg").unwrap().set_value("hi");
/// let outcome = harness.submit("echomsg").await;
/// println!("{outcome:?} / {}", harness.auth_status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Harness<I> {
    invoker: I,
    sections: Vec<Section>,
    issues: Vec<ExtractIssue>,
    banner: Option<String>,
    authenticated: AtomicBool,
}

impl<I: ProxyInvoker> Harness<I> {
    /// Extracts `source` and builds one section per callable, in order.
    ///
    /// A fatal extraction issue becomes the error banner; other issues are
    /// kept for display.
    pub fn load(source: &str, invoker: I, table: &FieldKindTable) -> Self {
        let extraction = extract(source);
        let banner = extraction
            .fatal_issue()
            .map(|issue| format!("Failed to load the API proxy module: {issue}"));

        if let Some(banner) = &banner {
            tracing::warn!(%banner, "harness has no sections");
        }

        let sections: Vec<Section> = extraction
            .metadata
            .iter()
            .map(|descriptor| Section::new(descriptor, table))
            .collect();
        tracing::info!(sections = sections.len(), issues = extraction.issues.len(), "harness loaded");

        let authenticated = AtomicBool::new(invoker.is_authenticated());
        Self {
            invoker,
            sections,
            issues: extraction.issues,
            banner,
            authenticated,
        }
    }

    /// Builds an empty harness showing `message` as its error banner.
    pub fn failed(invoker: I, message: impl Into<String>) -> Self {
        let authenticated = AtomicBool::new(invoker.is_authenticated());
        Self {
            invoker,
            sections: Vec::new(),
            issues: Vec::new(),
            banner: Some(message.into()),
            authenticated,
        }
    }

    /// Sections in callable order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// Harness-level error, if loading failed.
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Extraction issues, fatal or not.
    #[must_use]
    pub fn issues(&self) -> &[ExtractIssue] {
        &self.issues
    }

    /// The invoker sections call through.
    #[must_use]
    pub const fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Last observed authentication state.
    #[must_use]
    pub fn auth_status(&self) -> AuthStatus {
        AuthStatus::from_flag(self.authenticated.load(Ordering::Acquire))
    }

    /// Re-reads the authentication state from the session.
    pub fn refresh_auth(&self) -> AuthStatus {
        let authenticated = self.invoker.is_authenticated();
        self.authenticated.store(authenticated, Ordering::Release);
        AuthStatus::from_flag(authenticated)
    }

    /// Submits the named section. `None` if there is no such section.
    ///
    /// The authentication indicator is refreshed after every dispatched
    /// call, whether it succeeded or failed.
    pub async fn submit(&self, name: &str) -> Option<SubmitOutcome> {
        let section = self.section(name)?;
        let outcome = section.submit(&self.invoker).await;
        if outcome.was_dispatched() {
            let status = self.refresh_auth();
            tracing::debug!(callable = name, %status, "auth status refreshed");
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::MockProxyInvoker;
    use crate::section::ResponseView;
    use apiproxy_client::{ApiError, DispatchError, InvokeError, ResponsePayload};
    use serde_json::json;
    use std::sync::Arc;

    const SOURCE: &str = r"export const apiProxy = {
  /**
   * POST /api/login
   * @param {object} credentials - Request body.
   * Stores the returned token for later requests.
   */
  login: async (credentials) => {
    return send('POST', '/api/login', credentials);
  },
  /**
   * GET /api/echomsg/:msg
   * @param {string} msg - Path segment :msg.
   * @auth bearer
   */
  echomsg: async (msg) => {
    return send('GET', `/api/echomsg/${encodeURIComponent(msg)}`);
  },
  /**
   * GET /api/todos/fetch
   */
  fetch: async () => {
    return send('GET', '/api/todos/fetch');
  },
};
";

    fn logged_out_invoker() -> MockProxyInvoker {
        let mut invoker = MockProxyInvoker::new();
        invoker.expect_is_authenticated().return_const(false);
        invoker
    }

    #[test]
    fn test_sections_in_source_order() {
        let harness = Harness::load(SOURCE, logged_out_invoker(), &FieldKindTable::default());

        let names: Vec<_> = harness.sections().iter().map(Section::name).collect();
        assert_eq!(names, vec!["login", "echomsg", "fetch"]);
        assert!(harness.banner().is_none());
        assert!(harness.section("fetch").unwrap().has_no_params());
        assert_eq!(harness.auth_status(), AuthStatus::LoggedOut);
    }

    #[test]
    fn test_missing_aggregate_sets_banner() {
        let harness = Harness::load(
            "export default {};",
            logged_out_invoker(),
            &FieldKindTable::default(),
        );
        assert!(harness.sections().is_empty());
        assert!(harness.banner().unwrap().contains("apiProxy"));
    }

    #[tokio::test]
    async fn test_login_refreshes_auth_status() {
        let logged_in = Arc::new(AtomicBool::new(false));

        let mut invoker = MockProxyInvoker::new();
        let flag = Arc::clone(&logged_in);
        invoker
            .expect_is_authenticated()
            .returning(move || flag.load(Ordering::SeqCst));
        let flag = Arc::clone(&logged_in);
        invoker
            .expect_invoke()
            .withf(|name, _| name == "login")
            .returning(move |_, _| {
                flag.store(true, Ordering::SeqCst);
                Ok(ResponsePayload::Json(json!({"token": "abc"})))
            });

        let harness = Harness::load(SOURCE, invoker, &FieldKindTable::default());
        harness
            .section("login")
            .unwrap()
            .field("credentials")
            .unwrap()
            .set_value(r#"{"username": "testuser", "password": "password123"}"#);

        let outcome = harness.submit("login").await.unwrap();
        assert!(outcome.was_dispatched());
        assert_eq!(harness.auth_status(), AuthStatus::LoggedIn);
    }

    #[tokio::test]
    async fn test_failed_call_still_refreshes_auth_status() {
        let mut invoker = MockProxyInvoker::new();
        invoker.expect_is_authenticated().times(2).return_const(false);
        invoker.expect_invoke().returning(|_, _| {
            Err(InvokeError::Dispatch(DispatchError::Api(ApiError {
                status: 401,
                status_text: "Unauthorized".to_string(),
                data: json!({"message": "Token has expired", "reason": "token_expired"}),
            })))
        });

        let harness = Harness::load(SOURCE, invoker, &FieldKindTable::default());
        let outcome = harness.submit("fetch").await.unwrap();

        assert!(matches!(
            outcome,
            SubmitOutcome::Completed(ResponseView::ApiFailure { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_rejected_submit_skips_refresh() {
        let mut invoker = MockProxyInvoker::new();
        invoker.expect_is_authenticated().times(1).return_const(false);
        invoker.expect_invoke().never();

        let harness = Harness::load(SOURCE, invoker, &FieldKindTable::default());
        harness
            .section("login")
            .unwrap()
            .field("credentials")
            .unwrap()
            .set_value("{bad json");

        let outcome = harness.submit("login").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        assert!(harness.submit("nope").await.is_none());
    }
}
