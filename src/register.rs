use std::sync::Arc;

use crate::{
    api::Backend,
    errors::ClientResult,
    form::{CredentialFlow, FormKind, FormOutcome, FormSettings, FormState, PageHandles},
    view::CredentialForm,
};

/// Submit handler of the registration page.
pub struct RegisterFlow<B> {
    inner: CredentialFlow<B>,
}

impl<B: Backend> RegisterFlow<B> {
    pub fn attach(
        form: Option<Arc<dyn CredentialForm>>,
        backend: B,
        page: PageHandles,
        settings: FormSettings,
    ) -> Option<Self> {
        CredentialFlow::attach(FormKind::Register, form, backend, page, settings)
            .map(|inner| Self { inner })
    }

    pub async fn submit(&self) -> ClientResult<FormOutcome> {
        self.inner.submit().await
    }

    pub fn state(&self) -> FormState {
        self.inner.state()
    }
}
