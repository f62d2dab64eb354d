use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardItem, CardList, CardTitle, DifficultyBadge, FlagBadge, Input,
    Label, Spinner, Textarea,
};
use crate::dnd::{pointer_in_lower_half, DragId, DropTarget};
use crate::models::{ContentNode, Question, Round};
use crate::state::package_sync::{LoadState, PackageSyncController};
use crate::state::AppContext;
use crate::storage::{
    load_json_from_storage, load_recent_packages, save_flag, save_json_to_storage,
    CURRENT_PACKAGE_KEY, SIDEBAR_COLLAPSED_KEY,
};
use crate::util::{clamp_difficulty, non_blank, today_iso_local};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use wasm_bindgen::JsCast;

/// Decide before/after placement from the pointer position inside the
/// hovered row.
fn drop_after(ev: &web_sys::DragEvent) -> bool {
    ev.current_target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .map(|el| el.get_bounding_client_rect())
        .map(|rect| pointer_in_lower_half(rect.top(), rect.height(), ev.client_y() as f64))
        .unwrap_or(true)
}

#[component]
pub fn PackagesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let packages = app_state.0.packages;
    let loading = app_state.0.packages_loading;
    let error = app_state.0.packages_error;

    let new_title: RwSignal<String> = RwSignal::new(String::new());
    let new_description: RwSignal<String> = RwSignal::new(String::new());
    let form_error: RwSignal<Option<String>> = RwSignal::new(None);
    let creating: RwSignal<bool> = RwSignal::new(false);

    let recents = load_recent_packages();
    let has_recents = !recents.is_empty();
    let last_opened = load_json_from_storage::<i64>(CURRENT_PACKAGE_KEY);

    let load_packages = {
        let app_state = app_state.clone();
        move || {
            let api_client = app_state.0.api_client.get_untracked();
            loading.set(true);
            error.set(None);

            let app_state = app_state.clone();
            spawn_local(async move {
                match api_client.get_packages().await {
                    Ok(list) => packages.set(list),
                    Err(e) => {
                        error.set(Some(e.to_string()));
                        app_state.0.notify_api_error(&e);
                    }
                }
                loading.set(false);
            });
        }
    };

    {
        let load_packages = load_packages.clone();
        Effect::new(move |_| {
            load_packages();
        });
    }

    let on_create = {
        let app_state = app_state.clone();
        let load_packages = load_packages.clone();
        move |_| {
            let title = new_title.get_untracked();
            // Validation happens before any request leaves the client.
            let Some(title) = non_blank(&title) else {
                form_error.set(Some("Title is required".to_string()));
                return;
            };
            form_error.set(None);
            creating.set(true);

            let req = crate::api::CreatePackageRequest {
                title: title.to_string(),
                description: new_description.get_untracked(),
                play_date: Some(today_iso_local()),
            };

            let api_client = app_state.0.api_client.get_untracked();
            let app_state = app_state.clone();
            let load_packages = load_packages.clone();
            spawn_local(async move {
                match api_client.create_package(&req).await {
                    Ok(_) => {
                        new_title.set(String::new());
                        new_description.set(String::new());
                        load_packages();
                    }
                    Err(e) => app_state.0.notify_api_error(&e),
                }
                creating.set(false);
            });
        }
    };

    let on_delete = {
        let app_state = app_state.clone();
        let load_packages = load_packages.clone();
        move |id: i64| {
            let api_client = app_state.0.api_client.get_untracked();
            let app_state = app_state.clone();
            let load_packages = load_packages.clone();
            spawn_local(async move {
                match api_client.delete_package(id).await {
                    Ok(_) => {
                        app_state.0.push_info("Package deleted");
                        load_packages();
                    }
                    Err(e) => app_state.0.notify_api_error(&e),
                }
            });
        }
    };
    let on_delete = StoredValue::new(on_delete);

    view! {
        <div class="mx-auto w-full max-w-[1080px] px-4 py-8">
            <div class="mb-6 space-y-1">
                <h1 class="text-xl font-semibold">"Quizforge"</h1>
                <p class="text-xs text-muted-foreground">"Quiz packages"</p>
            </div>

            {last_opened.map(|id| view! {
                <a
                    class="mb-3 inline-block text-xs text-primary underline underline-offset-4"
                    href=format!("/packages/{id}")
                >
                    "Continue where you left off"
                </a>
            })}

            <Show when=move || has_recents fallback=|| ().into_view()>
                <div class="mb-4 flex flex-wrap items-center gap-2 text-xs text-muted-foreground">
                    "Recent:"
                    {recents
                        .clone()
                        .into_iter()
                        .map(|r| {
                            view! {
                                <a
                                    class="rounded-full border px-2 py-0.5 hover:bg-accent"
                                    href=format!("/packages/{}", r.id)
                                >
                                    {r.title}
                                </a>
                            }
                        })
                        .collect_view()}
                </div>
            </Show>

            <div class="grid gap-4 md:grid-cols-[2fr_1fr]">
                <Card>
                    <CardHeader>
                        <CardTitle>"Packages"</CardTitle>
                        <CardDescription>
                            {move || format!("{} total", packages.get().len())}
                        </CardDescription>
                    </CardHeader>
                    <CardContent>
                        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                            {move || {
                                error.get().map(|e| view! {
                                    <Alert class="mb-3 border-destructive/30">
                                        <AlertDescription class="text-destructive">{e}</AlertDescription>
                                    </Alert>
                                })
                            }}
                        </Show>

                        <Show
                            when=move || !packages.get().is_empty()
                            fallback=move || view! {
                                <div class="text-xs text-muted-foreground">
                                    {move || if loading.get() { "Loading packages..." } else { "No packages yet." }}
                                </div>
                            }
                        >
                            <CardList>
                                {move || {
                                    packages
                                        .get()
                                        .into_iter()
                                        .map(|pkg| {
                                            let pkg_id = pkg.id;
                                            view! {
                                                <CardItem class="justify-between rounded-md border px-4 py-3">
                                                    <a class="min-w-0 flex-1" href=format!("/packages/{pkg_id}")>
                                                        <div class="truncate text-sm font-medium">{pkg.title}</div>
                                                        <div class="truncate text-xs text-muted-foreground">
                                                            {format!(
                                                                "{} rounds{}",
                                                                pkg.round_count,
                                                                pkg.play_date.map(|d| format!(" · plays {d}")).unwrap_or_default(),
                                                            )}
                                                        </div>
                                                    </a>
                                                    <Button
                                                        variant=ButtonVariant::Ghost
                                                        size=ButtonSize::Sm
                                                        on:click=move |_| on_delete.get_value()(pkg_id)
                                                    >
                                                        "Delete"
                                                    </Button>
                                                </CardItem>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </CardList>
                        </Show>
                    </CardContent>
                </Card>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-base">"New package"</CardTitle>
                    </CardHeader>
                    <CardContent class="flex flex-col gap-3">
                        <div class="flex flex-col gap-2">
                            <Label html_for="pkg-title">"Title"</Label>
                            <Input id="pkg-title" placeholder="Spring pub quiz" bind_value=new_title />
                        </div>
                        <div class="flex flex-col gap-2">
                            <Label html_for="pkg-desc">"Description"</Label>
                            <Input id="pkg-desc" placeholder="Optional" bind_value=new_description />
                        </div>

                        <Show when=move || form_error.get().is_some() fallback=|| ().into_view()>
                            {move || {
                                form_error.get().map(|e| view! {
                                    <div class="text-xs text-destructive">{e}</div>
                                })
                            }}
                        </Show>

                        <Button attr:disabled=move || creating.get() on:click=on_create>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || creating.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if creating.get() { "Creating..." } else { "Create" }}
                            </span>
                        </Button>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn PackageEditorPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = PackageSyncController::new(app_state.clone());
    provide_context(controller.clone());

    let params = use_params_map();
    let package_id = move || {
        params
            .read()
            .get("id")
            .and_then(|s| s.parse::<i64>().ok())
    };

    {
        let controller = controller.clone();
        Effect::new(move |_| {
            if let Some(id) = package_id() {
                save_json_to_storage(CURRENT_PACKAGE_KEY, &id);
                controller.load(id);
            }
        });
    }

    let load_state = controller.load_state;

    view! {
        <div class="mx-auto w-full max-w-[1240px] px-4 py-6">
            {move || match load_state.get() {
                LoadState::Idle | LoadState::Loading => view! {
                    <div class="flex items-center gap-2 py-16 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading package..."
                    </div>
                }
                .into_any(),
                LoadState::NotFound => view! {
                    <div class="flex flex-col items-start gap-3 py-16">
                        <h2 class="text-lg font-semibold">"Package not found"</h2>
                        <p class="text-sm text-muted-foreground">
                            "It may have been deleted, or you don't have access to it."
                        </p>
                        <Button href="/" variant=ButtonVariant::Outline>"Back to packages"</Button>
                    </div>
                }
                .into_any(),
                LoadState::Ready => view! { <PackageEditor /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn SavingIndicator() -> impl IntoView {
    let controller = expect_context::<PackageSyncController>();
    let saving = controller.saving;
    let pending = controller.pending_writes;

    view! {
        <div class="flex items-center gap-2 text-xs text-muted-foreground">
            // "Saved" requires both nothing in flight and nothing still
            // buffered inside a quiet period.
            <Show
                when=move || { saving.get() > 0 || pending.get() > 0 }
                fallback=|| view! { <span>"All changes saved"</span> }
            >
                <Spinner class="size-3" />
                <span>"Saving..."</span>
            </Show>
        </div>
    }
}

#[component]
fn PackageEditor() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<PackageSyncController>();
    provide_context(SelectedQuestion(RwSignal::new(None)));

    let title: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let play_date: RwSignal<String> = RwSignal::new(String::new());
    let header_error: RwSignal<Option<String>> = RwSignal::new(None);
    // Seed the header fields once per loaded package; later snapshot
    // refetches must not clobber in-progress typing.
    let seeded_for: RwSignal<Option<i64>> = RwSignal::new(None);

    {
        let controller = controller.clone();
        Effect::new(move |_| {
            let Some(pkg) = controller.package.get() else {
                return;
            };
            if seeded_for.get_untracked() == Some(pkg.id) {
                return;
            }
            seeded_for.set(Some(pkg.id));
            title.set(pkg.title);
            description.set(pkg.description);
            play_date.set(pkg.play_date.unwrap_or_default());
        });
    }

    let on_header_edit = {
        let controller = controller.clone();
        Callback::new(move |_: String| {
            let t = title.get_untracked();
            if non_blank(&t).is_none() {
                header_error.set(Some("Title is required".to_string()));
                return;
            }
            header_error.set(None);

            let date = play_date.get_untracked();
            controller.edit_package_header(
                t,
                description.get_untracked(),
                if date.trim().is_empty() { None } else { Some(date) },
            );
        })
    };

    let sidebar_collapsed = app_state.0.sidebar_collapsed;
    let toggle_sidebar = move |_| {
        let next = !sidebar_collapsed.get_untracked();
        sidebar_collapsed.set(next);
        save_flag(SIDEBAR_COLLAPSED_KEY, next);
    };

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex items-start justify-between gap-4">
                <div class="flex w-full max-w-xl flex-col gap-2">
                    <Input class="text-lg font-semibold" bind_value=title on_edit=on_header_edit placeholder="Package title" />
                    <Input bind_value=description on_edit=on_header_edit placeholder="Description" />
                    <div class="flex items-center gap-2">
                        <Label html_for="play-date" class="text-xs text-muted-foreground">"Play date"</Label>
                        <Input id="play-date" r#type="date" class="w-40" bind_value=play_date on_edit=on_header_edit />
                    </div>
                    <Show when=move || header_error.get().is_some() fallback=|| ().into_view()>
                        {move || header_error.get().map(|e| view! { <div class="text-xs text-destructive">{e}</div> })}
                    </Show>
                </div>

                <div class="flex shrink-0 items-center gap-3">
                    <SavingIndicator />
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=toggle_sidebar>
                        {move || if sidebar_collapsed.get() { "Show rounds" } else { "Hide rounds" }}
                    </Button>
                    <Button href="/" variant=ButtonVariant::Outline size=ButtonSize::Sm>"All packages"</Button>
                </div>
            </div>

            <div class=move || {
                if sidebar_collapsed.get() {
                    "grid gap-4"
                } else {
                    "grid gap-4 md:grid-cols-[340px_1fr]"
                }
            }>
                <Show when=move || !sidebar_collapsed.get() fallback=|| ().into_view()>
                    <RoundSidebar />
                </Show>
                <QuestionPanel />
            </div>
        </div>
    }
}

/// Rounds + questions tree with the drag wiring.
///
/// Rows are HTML5 draggables; hovering re-renders a pre-commit preview of
/// the prospective arrangement, and only a drop schedules the
/// package-order write.
#[component]
fn RoundSidebar() -> impl IntoView {
    let controller = expect_context::<PackageSyncController>();

    let on_add_round = {
        let controller = controller.clone();
        move |_| {
            let count = controller
                .package
                .get_untracked()
                .map(|p| p.rounds.len())
                .unwrap_or(0);
            controller.add_round(format!("Round {}", count + 1), String::new(), 6);
        }
    };

    view! {
        <div class="flex flex-col gap-2">
            {
                let controller = controller.clone();
                move || {
                    let Some(pkg) = controller.package.get() else {
                        return ().into_view().into_any();
                    };
                    pkg.rounds
                        .into_iter()
                        .map(|round| view! { <RoundBlock round=round /> })
                        .collect_view()
                        .into_any()
                }
            }

            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_add_round>
                "+ Add round"
            </Button>
        </div>
    }
}

#[component]
fn RoundBlock(round: Round) -> impl IntoView {
    let controller = expect_context::<PackageSyncController>();

    let round_id = round.id;
    let selected = {
        let controller = controller.clone();
        move || controller.selected_round_id.get() == Some(round_id)
    };

    let header_class = {
        let selected = selected.clone();
        move || {
            if selected() {
                "flex cursor-grab items-center justify-between gap-2 rounded-md border border-primary/50 bg-primary/5 px-3 py-2"
            } else {
                "flex cursor-grab items-center justify-between gap-2 rounded-md border px-3 py-2 hover:bg-accent/50"
            }
        }
    };

    let c_start = controller.clone();
    let c_over = controller.clone();
    let c_drop = controller.clone();
    let c_end = controller.clone();
    let c_select = controller.clone();
    let c_delete = controller.clone();
    let c_body_over = controller.clone();
    let c_body_drop = controller.clone();

    let question_rows = round
        .round_questions
        .iter()
        .map(|rq| {
            view! { <QuestionRow round_id=round_id link_id=rq.id question=rq.question.clone() /> }
        })
        .collect_view();

    let actual = round.round_questions.len();

    view! {
        <div class="flex flex-col gap-1">
            <div
                class=header_class
                draggable="true"
                on:dragstart=move |ev: web_sys::DragEvent| {
                    // Only one gesture at a time: a second pick-up is refused.
                    if !c_start.pick_up(DragId::round(round_id)) {
                        ev.prevent_default();
                        return;
                    }
                    if let Some(dt) = ev.data_transfer() {
                        let _ = dt.set_data("text/plain", &DragId::round(round_id).encode());
                        dt.set_drop_effect("move");
                    }
                }
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    if let Some(dt) = ev.data_transfer() {
                        dt.set_drop_effect("move");
                    }
                    c_over.hover(DropTarget::RoundRow {
                        round_id,
                        after: drop_after(&ev),
                    });
                }
                on:drop=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    c_drop.drop_on(DropTarget::RoundRow {
                        round_id,
                        after: drop_after(&ev),
                    });
                }
                on:dragend=move |_ev: web_sys::DragEvent| {
                    // Fires on the source after the gesture; if no drop
                    // claimed it (escape, outside), revert the preview.
                    c_end.cancel_drag();
                }
                on:click=move |_| c_select.selected_round_id.set(Some(round_id))
            >
                <div class="min-w-0">
                    <div class="truncate text-sm font-medium">{round.name.clone()}</div>
                    <div class="text-xs text-muted-foreground">
                        {format!("{actual} of {} questions", round.question_count)}
                    </div>
                </div>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    on:click=move |ev: web_sys::MouseEvent| {
                        ev.stop_propagation();
                        c_delete.delete_round(round_id);
                    }
                >
                    "×"
                </Button>
            </div>

            // Round body: dropping a question here (not on a row) appends it.
            <div
                class="ml-3 flex min-h-[28px] flex-col gap-1 border-l pl-2"
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    c_body_over.hover(DropTarget::RoundBody { round_id });
                }
                on:drop=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    c_body_drop.drop_on(DropTarget::RoundBody { round_id });
                }
            >
                {question_rows}
            </div>
        </div>
    }
}

#[component]
fn QuestionRow(round_id: i64, link_id: i64, question: Question) -> impl IntoView {
    let controller = expect_context::<PackageSyncController>();
    let selected_question = expect_context::<SelectedQuestion>().0;

    let question_id = question.id;
    let c_start = controller.clone();
    let c_over = controller.clone();
    let c_drop = controller.clone();
    let c_end = controller.clone();
    let c_select = controller.clone();
    let c_remove = controller.clone();

    let difficulty = question.difficulty;

    view! {
        <div
            class="flex cursor-grab items-center justify-between gap-2 rounded px-2 py-1 text-sm hover:bg-accent/50"
            draggable="true"
            on:dragstart=move |ev: web_sys::DragEvent| {
                if !c_start.pick_up(DragId::question(link_id)) {
                    ev.prevent_default();
                    return;
                }
                if let Some(dt) = ev.data_transfer() {
                    let _ = dt.set_data("text/plain", &DragId::question(link_id).encode());
                    dt.set_drop_effect("move");
                }
            }
            on:dragover=move |ev: web_sys::DragEvent| {
                ev.prevent_default();
                ev.stop_propagation();
                if let Some(dt) = ev.data_transfer() {
                    dt.set_drop_effect("move");
                }
                c_over.hover(DropTarget::QuestionRow {
                    round_id,
                    link_id,
                    after: drop_after(&ev),
                });
            }
            on:drop=move |ev: web_sys::DragEvent| {
                ev.prevent_default();
                ev.stop_propagation();
                c_drop.drop_on(DropTarget::QuestionRow {
                    round_id,
                    link_id,
                    after: drop_after(&ev),
                });
            }
            on:dragend=move |_ev: web_sys::DragEvent| {
                c_end.cancel_drag();
            }
            on:click=move |_| {
                c_select.selected_round_id.set(Some(round_id));
                selected_question.set(Some(question_id));
            }
        >
            <div class="min-w-0 truncate">{question.title.clone()}</div>
            <div class="flex shrink-0 items-center gap-1">
                <DifficultyBadge difficulty=difficulty />
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    on:click=move |ev: web_sys::MouseEvent| {
                        ev.stop_propagation();
                        c_remove.remove_question_from_round(round_id, question_id);
                    }
                >
                    "−"
                </Button>
            </div>
        </div>
    }
}

/// The question selected for editing; lives beside the controller so the
/// sidebar rows and the editor panel share it explicitly.
#[derive(Clone, Copy)]
pub(crate) struct SelectedQuestion(pub RwSignal<Option<i64>>);

#[component]
fn QuestionPanel() -> impl IntoView {
    let controller = expect_context::<PackageSyncController>();
    let selected_question = expect_context::<SelectedQuestion>().0;

    let search_open: RwSignal<bool> = RwSignal::new(false);

    let find_question = {
        let controller = controller.clone();
        move |question_id: i64| -> Option<Question> {
            let pkg = controller.package.get_untracked()?;
            pkg.rounds
                .iter()
                .flat_map(|r| r.round_questions.iter())
                .find(|rq| rq.question_id == question_id)
                .map(|rq| rq.question.clone())
        }
    };
    let find_question = StoredValue::new(find_question);

    view! {
        <div class="flex flex-col gap-4">
            <RoundFieldsEditor />

            <div class="flex items-center gap-2">
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| search_open.set(true)
                >
                    "Add existing question"
                </Button>
            </div>

            <Show when=move || search_open.get() fallback=|| ().into_view()>
                <QuestionSearchPanel on_close=Callback::new(move |_: ()| search_open.set(false)) />
            </Show>

            <NewQuestionForm />

            {move || {
                selected_question
                    .get()
                    .and_then(|qid| find_question.get_value()(qid))
                    .map(|q| view! { <QuestionEditor question=q /> })
            }}
        </div>
    }
}

#[component]
fn RoundFieldsEditor() -> impl IntoView {
    let controller = expect_context::<PackageSyncController>();

    let name: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let question_count: RwSignal<String> = RwSignal::new(String::new());
    let round_error: RwSignal<Option<String>> = RwSignal::new(None);
    let seeded_for: RwSignal<Option<i64>> = RwSignal::new(None);

    {
        let controller = controller.clone();
        Effect::new(move |_| {
            let Some(rid) = controller.selected_round_id.get() else {
                return;
            };
            if seeded_for.get_untracked() == Some(rid) {
                return;
            }
            let Some(round) = controller.package.get_untracked().and_then(|p| {
                p.rounds.iter().find(|r| r.id == rid).cloned()
            }) else {
                return;
            };
            seeded_for.set(Some(rid));
            name.set(round.name);
            description.set(round.description);
            question_count.set(round.question_count.to_string());
        });
    }

    let on_edit = {
        let controller = controller.clone();
        Callback::new(move |_: String| {
            let Some(rid) = controller.selected_round_id.get_untracked() else {
                return;
            };
            let n = name.get_untracked();
            if non_blank(&n).is_none() {
                round_error.set(Some("Round name is required".to_string()));
                return;
            }
            round_error.set(None);

            let count = question_count.get_untracked().parse::<i32>().unwrap_or(0);
            controller.edit_round_fields(rid, n, description.get_untracked(), count.max(0));
        })
    };

    let has_selection = {
        let controller = controller.clone();
        move || controller.selected_round_id.get().is_some()
    };

    view! {
        <Show when=has_selection fallback=|| ().into_view()>
            <Card>
                <CardHeader>
                    <CardTitle class="text-base">"Round"</CardTitle>
                </CardHeader>
                <CardContent class="flex flex-wrap items-end gap-3">
                    <div class="flex min-w-56 flex-1 flex-col gap-2">
                        <Label html_for="round-name">"Name"</Label>
                        <Input id="round-name" bind_value=name on_edit=on_edit />
                    </div>
                    <div class="flex min-w-56 flex-1 flex-col gap-2">
                        <Label html_for="round-desc">"Description"</Label>
                        <Input id="round-desc" bind_value=description on_edit=on_edit />
                    </div>
                    <div class="flex w-32 flex-col gap-2">
                        <Label html_for="round-count">"Target count"</Label>
                        <Input id="round-count" r#type="number" bind_value=question_count on_edit=on_edit />
                    </div>

                    <Show when=move || round_error.get().is_some() fallback=|| ().into_view()>
                        {move || round_error.get().map(|e| view! {
                            <div class="w-full text-xs text-destructive">{e}</div>
                        })}
                    </Show>
                </CardContent>
            </Card>
        </Show>
    }
}

#[component]
fn QuestionEditor(question: Question) -> impl IntoView {
    let controller = expect_context::<PackageSyncController>();

    let question_id = question.id;
    let content_text: RwSignal<String> =
        RwSignal::new(ContentNode::to_plain_text(&question.content));
    let answer: RwSignal<String> = RwSignal::new(question.answer.clone());

    let on_content_edit = {
        let controller = controller.clone();
        Callback::new(move |text: String| {
            controller.edit_question_content(question_id, &text);
        })
    };

    let on_answer_edit = {
        let controller = controller.clone();
        Callback::new(move |value: String| {
            controller.edit_question_answer(question_id, value);
        })
    };

    view! {
        <Card>
            <CardHeader class="flex-row items-center justify-between">
                <div class="flex flex-col gap-1">
                    <CardTitle class="text-base">{question.title.clone()}</CardTitle>
                    <CardDescription>{question.topic.clone()}</CardDescription>
                </div>
                <div class="flex items-center gap-1">
                    <DifficultyBadge difficulty=question.difficulty />
                    <Show when=move || question.is_generated fallback=|| ().into_view()>
                        <FlagBadge label="AI" />
                    </Show>
                    <Show when=move || question.fact_checked fallback=|| ().into_view()>
                        <FlagBadge label="Checked" />
                    </Show>
                </div>
            </CardHeader>
            <CardContent class="flex flex-col gap-3">
                <div class="flex flex-col gap-2">
                    <Label html_for="q-content">"Question text"</Label>
                    <Textarea id="q-content" rows=6 bind_value=content_text on_edit=on_content_edit />
                </div>
                <div class="flex flex-col gap-2">
                    <Label html_for="q-answer">"Answer"</Label>
                    <Input id="q-answer" bind_value=answer on_edit=on_answer_edit />
                </div>
            </CardContent>
        </Card>
    }
}

#[component]
fn NewQuestionForm() -> impl IntoView {
    let controller = expect_context::<PackageSyncController>();

    let open: RwSignal<bool> = RwSignal::new(false);
    let title: RwSignal<String> = RwSignal::new(String::new());
    let content_text: RwSignal<String> = RwSignal::new(String::new());
    let answer: RwSignal<String> = RwSignal::new(String::new());
    let difficulty: RwSignal<String> = RwSignal::new("3".to_string());
    let form_error: RwSignal<Option<String>> = RwSignal::new(None);

    let on_create = {
        let controller = controller.clone();
        move |_| {
            let Some(round_id) = controller.selected_round_id.get_untracked() else {
                form_error.set(Some("Select a round first".to_string()));
                return;
            };
            let t = title.get_untracked();
            let Some(trimmed) = non_blank(&t) else {
                form_error.set(Some("Title is required".to_string()));
                return;
            };
            form_error.set(None);

            let diff = clamp_difficulty(difficulty.get_untracked().parse().unwrap_or(3));
            controller.create_question_in_round(
                round_id,
                trimmed.to_string(),
                content_text.get_untracked(),
                answer.get_untracked(),
                diff,
            );

            title.set(String::new());
            content_text.set(String::new());
            answer.set(String::new());
            open.set(false);
        }
    };
    let on_create = Callback::new(on_create);

    view! {
        <div>
            <Show
                when=move || open.get()
                fallback=move || view! {
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| open.set(true)>
                        "New question"
                    </Button>
                }
            >
                <Card>
                    <CardHeader>
                        <CardTitle class="text-base">"New question"</CardTitle>
                    </CardHeader>
                    <CardContent class="flex flex-col gap-3">
                        <div class="flex flex-col gap-2">
                            <Label html_for="nq-title">"Title"</Label>
                            <Input id="nq-title" bind_value=title />
                        </div>
                        <div class="flex flex-col gap-2">
                            <Label html_for="nq-content">"Question text"</Label>
                            <Textarea id="nq-content" rows=4 bind_value=content_text />
                        </div>
                        <div class="flex items-end gap-3">
                            <div class="flex flex-1 flex-col gap-2">
                                <Label html_for="nq-answer">"Answer"</Label>
                                <Input id="nq-answer" bind_value=answer />
                            </div>
                            <div class="flex w-28 flex-col gap-2">
                                <Label html_for="nq-diff">"Difficulty"</Label>
                                <Input id="nq-diff" r#type="number" bind_value=difficulty />
                            </div>
                        </div>

                        <Show when=move || form_error.get().is_some() fallback=|| ().into_view()>
                            {move || form_error.get().map(|e| view! { <div class="text-xs text-destructive">{e}</div> })}
                        </Show>

                        <div class="flex items-center gap-2">
                            <Button size=ButtonSize::Sm on:click=move |ev| on_create.run(ev)>"Create and add"</Button>
                            <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=move |_| open.set(false)>
                                "Cancel"
                            </Button>
                        </div>
                    </CardContent>
                </Card>
            </Show>
        </div>
    }
}

#[component]
fn QuestionSearchPanel(on_close: Callback<()>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<PackageSyncController>();

    let query: RwSignal<String> = RwSignal::new(String::new());
    let page: RwSignal<i32> = RwSignal::new(1);
    let results: RwSignal<Vec<Question>> = RwSignal::new(vec![]);
    let total: RwSignal<i64> = RwSignal::new(0);
    let searching: RwSignal<bool> = RwSignal::new(false);

    const PAGE_SIZE: i32 = 10;

    let run_search = {
        let app_state = app_state.clone();
        move || {
            let q = query.get_untracked();
            let p = page.get_untracked();
            let api_client = app_state.0.api_client.get_untracked();
            let app_state = app_state.clone();
            searching.set(true);

            spawn_local(async move {
                match api_client.search_questions(&q, p, PAGE_SIZE).await {
                    Ok(found) => {
                        results.set(found.items);
                        total.set(found.total);
                    }
                    Err(e) => app_state.0.notify_api_error(&e),
                }
                searching.set(false);
            });
        }
    };
    let run_search = StoredValue::new(run_search);

    let on_query_edit = Callback::new(move |_: String| {
        page.set(1);
        run_search.get_value()();
    });

    let add_to_round = {
        let controller = controller.clone();
        move |question_id: i64| {
            if let Some(round_id) = controller.selected_round_id.get_untracked() {
                controller.add_question_to_round(round_id, question_id);
            }
        }
    };
    let add_to_round = StoredValue::new(add_to_round);

    let has_prev = move || page.get() > 1;
    let has_next = move || (page.get() as i64) * (PAGE_SIZE as i64) < total.get();

    view! {
        <Card>
            <CardHeader class="flex-row items-center justify-between">
                <CardTitle class="text-base">"Find a question"</CardTitle>
                <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                    "Close"
                </Button>
            </CardHeader>
            <CardContent class="flex flex-col gap-3">
                <Input placeholder="Search by title or topic" bind_value=query on_edit=on_query_edit />

                <Show when=move || searching.get() fallback=|| ().into_view()>
                    <div class="flex items-center gap-2 text-xs text-muted-foreground">
                        <Spinner class="size-3" />
                        "Searching..."
                    </div>
                </Show>

                <CardList>
                    {move || {
                        results
                            .get()
                            .into_iter()
                            .map(|q| {
                                let qid = q.id;
                                view! {
                                    <CardItem class="justify-between rounded border px-3 py-2">
                                        <div class="min-w-0">
                                            <div class="truncate text-sm">{q.title.clone()}</div>
                                            <div class="truncate text-xs text-muted-foreground">{q.topic.clone()}</div>
                                        </div>
                                        <div class="flex shrink-0 items-center gap-2">
                                            <DifficultyBadge difficulty=q.difficulty />
                                            <Button size=ButtonSize::Sm on:click=move |_| add_to_round.get_value()(qid)>
                                                "Add"
                                            </Button>
                                        </div>
                                    </CardItem>
                                }
                            })
                            .collect_view()
                    }}
                </CardList>

                <div class="flex items-center justify-between text-xs text-muted-foreground">
                    <span>{move || format!("{} matches", total.get())}</span>
                    <div class="flex items-center gap-2">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || !has_prev()
                            on:click=move |_| {
                                page.update(|p| *p -= 1);
                                run_search.get_value()();
                            }
                        >
                            "Prev"
                        </Button>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || !has_next()
                            on:click=move |_| {
                                page.update(|p| *p += 1);
                                run_search.get_value()();
                            }
                        >
                            "Next"
                        </Button>
                    </div>
                </div>
            </CardContent>
        </Card>
    }
}
