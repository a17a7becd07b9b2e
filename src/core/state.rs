use std::sync::Arc;

use crate::core::config::Settings;
use crate::repositories::GradeableSource;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    source: Arc<dyn GradeableSource>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, source: Arc<dyn GradeableSource>) -> Self {
        Self { inner: Arc::new(InnerState { settings, source }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn source(&self) -> &dyn GradeableSource {
        self.inner.source.as_ref()
    }
}
