use leptos::prelude::*;
use tw_merge::tw_merge;

/// Difficulty pip: 1 (trivial) through 5 (brutal).
#[component]
pub fn DifficultyBadge(#[prop(into)] difficulty: Signal<i32>) -> impl IntoView {
    let class = move || {
        let tone = match difficulty.get() {
            1 | 2 => "bg-success/15 text-success",
            3 => "bg-warning/15 text-warning",
            _ => "bg-destructive/15 text-destructive",
        };
        tw_merge!(
            "inline-flex items-center rounded-full px-2 py-0.5 text-xs font-medium",
            tone
        )
    };

    view! { <span class=class>{move || format!("D{}", difficulty.get())}</span> }
}

/// Small neutral tag, used for generated / fact-checked markers.
#[component]
pub fn FlagBadge(#[prop(into)] label: &'static str) -> impl IntoView {
    view! {
        <span class="inline-flex items-center rounded-full bg-muted px-2 py-0.5 text-xs text-muted-foreground">
            {label}
        </span>
    }
}
