use crate::state::{AppContext, NoticeKind};
use leptos::prelude::*;
use tw_merge::tw_merge;

/// Fixed-position stack rendering the global notices.
///
/// Transient errors land here; every failed request produces a
/// user-visible notice. Each entry is dismissible and the UI underneath
/// stays usable.
#[component]
pub fn ToastStack() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let notices = app_state.0.notices;

    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-50 flex w-80 flex-col gap-2">
            {move || {
                notices
                    .get()
                    .into_iter()
                    .map(|notice| {
                        let id = notice.id;
                        let app_state = app_state.clone();
                        let class = tw_merge!(
                            "pointer-events-auto flex items-start justify-between gap-2 rounded-md border px-3 py-2 text-sm shadow-md bg-background",
                            match notice.kind {
                                NoticeKind::Error => "border-destructive/40 text-destructive",
                                NoticeKind::Info => "border-border text-foreground",
                            }
                        );

                        view! {
                            <div class=class role="alert">
                                <div class="min-w-0 break-words">{notice.message}</div>
                                <button
                                    class="shrink-0 text-xs text-muted-foreground hover:text-foreground"
                                    on:click=move |_| app_state.0.dismiss_notice(id)
                                >
                                    "Dismiss"
                                </button>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}
