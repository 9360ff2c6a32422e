// src/form.rs

//! Credential submission shared by the login and registration pages.
//!
//! A submit goes `Idle -> Submitting -> {Redirecting | AlertShown}`. Transport
//! failures, unreadable bodies and non-2xx answers all end in the page's
//! catch-all alert unless `RejectionPolicy::Surface` asks for the server's own
//! reason. A 2xx answer that is not a success shows the server's message.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    api::Backend,
    config::{Config, OverlapPolicy, RejectionPolicy},
    constants::*,
    errors::{ClientError, ClientResult},
    models::{Credentials, ResponseStatus, ServerResponse},
    single_flight::SingleFlight,
    view::{Alerter, CredentialForm, Navigator},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
}

impl FormKind {
    pub fn name(&self) -> &'static str {
        match self {
            FormKind::Login => "login",
            FormKind::Register => "register",
        }
    }

    /// Used in log lines, e.g. "Registration error".
    pub fn label(&self) -> &'static str {
        match self {
            FormKind::Login => "Login",
            FormKind::Register => "Registration",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            FormKind::Login => LOGIN_ENDPOINT,
            FormKind::Register => REGISTER_ENDPOINT,
        }
    }

    pub fn success_sentinel(&self) -> &'static str {
        match self {
            FormKind::Login => LOGIN_SUCCESS,
            FormKind::Register => REGISTER_SUCCESS,
        }
    }

    /// Reason used when a non-2xx body carries no message.
    pub fn rejection_fallback(&self) -> &'static str {
        match self {
            FormKind::Login => LOGIN_REJECTED,
            FormKind::Register => REGISTER_REJECTED,
        }
    }

    /// Alert for a 2xx answer that is not a success and carries no message.
    pub fn mismatch_default(&self) -> &'static str {
        match self {
            FormKind::Login => LOGIN_MISMATCH,
            FormKind::Register => REGISTER_MISMATCH,
        }
    }

    pub fn catch_all(&self) -> &'static str {
        match self {
            FormKind::Login => LOGIN_CATCH_ALL,
            FormKind::Register => REGISTER_CATCH_ALL,
        }
    }

    pub fn missing_form_message(&self) -> String {
        format!("{} form not found", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Redirecting,
    AlertShown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Redirected(String),
    Alerted(String),
}

#[derive(Debug, Clone)]
pub struct FormSettings {
    pub endpoint: String,
    pub landing_route: String,
    pub rejection_policy: RejectionPolicy,
    pub overlap_policy: OverlapPolicy,
}

impl FormSettings {
    pub fn new(kind: FormKind) -> Self {
        Self {
            endpoint: kind.endpoint().to_string(),
            landing_route: LANDING_ROUTE.to_string(),
            rejection_policy: RejectionPolicy::default(),
            overlap_policy: OverlapPolicy::default(),
        }
    }

    pub fn from_config(kind: FormKind, config: &Config) -> Self {
        let endpoint = match kind {
            FormKind::Login => &config.endpoints.login,
            FormKind::Register => &config.endpoints.register,
        };
        Self {
            endpoint: endpoint.clone(),
            landing_route: config.landing_route.clone(),
            rejection_policy: config.rejection_policy,
            overlap_policy: config.overlap_policy,
        }
    }
}

/// The pieces of a page a credential flow needs besides its form.
#[derive(Clone)]
pub struct PageHandles {
    pub alerter: Arc<dyn Alerter>,
    pub navigator: Arc<dyn Navigator>,
}

pub struct CredentialFlow<B> {
    kind: FormKind,
    backend: B,
    form: Arc<dyn CredentialForm>,
    page: PageHandles,
    settings: FormSettings,
    guard: SingleFlight,
    state: Mutex<FormState>,
}

impl<B: Backend> CredentialFlow<B> {
    /// Wires the flow to `form`. A page without the form gets no flow; that is
    /// logged, not an error.
    pub fn attach(
        kind: FormKind,
        form: Option<Arc<dyn CredentialForm>>,
        backend: B,
        page: PageHandles,
        settings: FormSettings,
    ) -> Option<Self> {
        let Some(form) = form else {
            log::error!("{}", kind.missing_form_message());
            return None;
        };

        Some(Self {
            kind,
            backend,
            form,
            page,
            settings,
            guard: SingleFlight::new(),
            state: Mutex::new(FormState::Idle),
        })
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn state(&self) -> FormState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: FormState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Submits the form once. The only error is `Busy`, for a submit made
    /// while another is outstanding under `OverlapPolicy::Reject`; every other
    /// failure is reported to the user and comes back as `Alerted`.
    pub async fn submit(&self) -> ClientResult<FormOutcome> {
        let _permit = match self.settings.overlap_policy {
            OverlapPolicy::Reject => Some(
                self.guard
                    .try_begin()
                    .ok_or(ClientError::Busy(self.kind.name()))?,
            ),
            OverlapPolicy::Allow => None,
        };

        self.set_state(FormState::Submitting);
        let outcome = match self.exchange().await {
            Ok(data) => self.settle(data),
            Err(err) => self.fail(err),
        };
        Ok(outcome)
    }

    async fn exchange(&self) -> ClientResult<ServerResponse> {
        let credentials = Credentials {
            username: self.form.username(),
            password: self.form.password(),
        };
        let body = serde_json::to_value(&credentials)?;

        let reply = self.backend.post_json(&self.settings.endpoint, &body).await?;
        log::info!("Response Status: {}", reply.status);

        if !reply.is_success() {
            let data = reply.json()?;
            return Err(ClientError::Rejected {
                status: reply.status,
                message: data
                    .text()
                    .unwrap_or(self.kind.rejection_fallback())
                    .to_string(),
            });
        }

        let data = reply.json()?;
        log::info!("Server Response: {:?}", data);
        Ok(data)
    }

    fn is_success(&self, data: &ServerResponse) -> bool {
        match data.status {
            Some(status) => status == ResponseStatus::Success,
            None => data.message.as_deref() == Some(self.kind.success_sentinel()),
        }
    }

    fn settle(&self, data: ServerResponse) -> FormOutcome {
        if self.is_success(&data) {
            let route = self.settings.landing_route.clone();
            log::info!("Redirecting to {}", route);
            self.set_state(FormState::Redirecting);
            self.page.navigator.navigate(&route);
            return FormOutcome::Redirected(route);
        }

        log::error!("{} failed: {:?}", self.kind.label(), data.message);
        let text = data.text().unwrap_or(self.kind.mismatch_default()).to_string();
        self.show_alert(text)
    }

    fn fail(&self, err: ClientError) -> FormOutcome {
        log::error!("{} error: {}", self.kind.label(), err);
        let text = match (err, self.settings.rejection_policy) {
            (ClientError::Rejected { message, .. }, RejectionPolicy::Surface) => message,
            _ => self.kind.catch_all().to_string(),
        };
        self.show_alert(text)
    }

    fn show_alert(&self, text: String) -> FormOutcome {
        self.set_state(FormState::AlertShown);
        self.page.alerter.alert(&text);
        FormOutcome::Alerted(text)
    }
}
