use std::sync::Arc;

use crate::{
    api::Backend,
    errors::ClientResult,
    form::{CredentialFlow, FormKind, FormOutcome, FormSettings, FormState, PageHandles},
    view::CredentialForm,
};

/// Submit handler of the login page.
pub struct LoginFlow<B> {
    inner: CredentialFlow<B>,
}

impl<B: Backend> LoginFlow<B> {
    pub fn attach(
        form: Option<Arc<dyn CredentialForm>>,
        backend: B,
        page: PageHandles,
        settings: FormSettings,
    ) -> Option<Self> {
        CredentialFlow::attach(FormKind::Login, form, backend, page, settings)
            .map(|inner| Self { inner })
    }

    pub async fn submit(&self) -> ClientResult<FormOutcome> {
        self.inner.submit().await
    }

    pub fn state(&self) -> FormState {
        self.inner.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::constants::LOGIN_CATCH_ALL;
    use crate::form::testing::FormPage;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn flow_against(reply: ResponseTemplate, page: &FormPage) -> (MockServer, LoginFlow<ApiClient>) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({ "username": "ann", "password": "pw" })))
            .respond_with(reply)
            .expect(1)
            .mount(&mock_server)
            .await;

        let flow = LoginFlow::attach(
            page.form(),
            ApiClient::new(mock_server.uri(), None).unwrap(),
            page.handles(),
            FormSettings::new(FormKind::Login),
        )
        .unwrap();
        (mock_server, flow)
    }

    #[tokio::test]
    async fn test_success_sentinel_redirects_without_alert() {
        let page = FormPage::new("ann", "pw");
        let (_server, flow) = flow_against(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Login successful" })),
            &page,
        )
        .await;

        let outcome = flow.submit().await.unwrap();
        assert_eq!(outcome, FormOutcome::Redirected("/index".to_string()));
        assert_eq!(page.location.current().as_deref(), Some("/index"));
        assert!(page.alerts.shown().is_empty());
        assert_eq!(flow.state(), FormState::Redirecting);
    }

    #[tokio::test]
    async fn test_other_message_is_alerted_verbatim() {
        let page = FormPage::new("ann", "pw");
        let (_server, flow) = flow_against(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "wrong" })),
            &page,
        )
        .await;

        let outcome = flow.submit().await.unwrap();
        assert_eq!(outcome, FormOutcome::Alerted("wrong".to_string()));
        assert_eq!(page.alerts.shown(), vec!["wrong".to_string()]);
        assert!(page.location.current().is_none());
    }

    #[tokio::test]
    async fn test_rejection_reason_is_swallowed_by_default() {
        let page = FormPage::new("ann", "pw");
        let (_server, flow) = flow_against(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad creds" })),
            &page,
        )
        .await;

        let outcome = flow.submit().await.unwrap();
        assert_eq!(outcome, FormOutcome::Alerted(LOGIN_CATCH_ALL.to_string()));
        assert_eq!(page.alerts.shown(), vec!["Login failed. Please try again.".to_string()]);
        assert!(page.location.current().is_none());
        assert_eq!(flow.state(), FormState::AlertShown);
    }

    #[test]
    fn test_attach_without_form() {
        let page = FormPage::new("ann", "pw");
        let api = ApiClient::new("http://127.0.0.1:5000", None).unwrap();
        assert!(LoginFlow::attach(None, api, page.handles(), FormSettings::new(FormKind::Login)).is_none());
    }
}
