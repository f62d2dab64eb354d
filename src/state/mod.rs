pub(crate) mod package_sync;

use crate::api::{ApiClient, ApiError, ApiErrorKind};
use crate::models::PackageSummary;
use crate::storage::{load_flag, SIDEBAR_COLLAPSED_KEY};
use leptos::prelude::*;
use strum::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum NoticeKind {
    Error,
    Info,
}

/// One dismissible entry in the global notification area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Loaded from backend for the list page.
    pub packages: RwSignal<Vec<PackageSummary>>,
    pub packages_loading: RwSignal<bool>,
    pub packages_error: RwSignal<Option<String>>,

    /// Global UI state.
    pub sidebar_collapsed: RwSignal<bool>,

    pub notices: RwSignal<Vec<Notice>>,
    notice_seq: RwSignal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        let state = Self::with_client(ApiClient::from_env());
        state.sidebar_collapsed.set(load_flag(SIDEBAR_COLLAPSED_KEY));
        state
    }

    /// Construct around a caller-supplied client. The entry point goes
    /// through `new`; this seam keeps the state constructible where
    /// `window.ENV` and localStorage don't exist.
    pub fn with_client(api_client: ApiClient) -> Self {
        Self {
            api_client: RwSignal::new(api_client),
            packages: RwSignal::new(vec![]),
            packages_loading: RwSignal::new(false),
            packages_error: RwSignal::new(None),
            sidebar_collapsed: RwSignal::new(false),
            notices: RwSignal::new(vec![]),
            notice_seq: RwSignal::new(0),
        }
    }

    fn push_notice(&self, kind: NoticeKind, message: String) {
        let id = self.notice_seq.get_untracked() + 1;
        self.notice_seq.set(id);
        self.notices.update(|xs| {
            xs.push(Notice { id, kind, message });
            // Cap the stack; old transient notices are not worth scrolling.
            if xs.len() > 5 {
                xs.remove(0);
            }
        });
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.push_notice(NoticeKind::Error, message.into());
    }

    pub fn push_info(&self, message: impl Into<String>) {
        self.push_notice(NoticeKind::Info, message.into());
    }

    /// Every failed request ends up here: errors never vanish silently.
    /// NotFound is the exception — pages render it as a terminal state.
    pub fn notify_api_error(&self, e: &ApiError) {
        match e.kind {
            ApiErrorKind::Unauthorized => {
                self.push_error("Your session has expired. Please sign in again.")
            }
            _ => self.push_error(e.to_string()),
        }
    }

    pub fn dismiss_notice(&self, id: u64) {
        self.notices.update(|xs| xs.retain(|n| n.id != id));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
