use crate::api::{
    AddQuestionToRoundRequest, ApiErrorKind, CreateQuestionRequest, CreateRoundRequest,
    SaveOrderRound, UpdatePackageRequest, UpdateQuestionRequest, UpdateRoundRequest,
};
use crate::autosave::{PendingWrites, SaveChannel, SavePayload};
use crate::dnd::{DragGesture, DragId, DropTarget};
use crate::models::{ContentNode, Package};
use crate::ordering::apply_drop;
use crate::state::AppContext;
use crate::storage::write_recent_package;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wasm_bindgen::JsCast;

/// Quiet period between the last edit on a channel and its write.
pub(crate) const QUIET_PERIOD_MS: i32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoadState {
    Idle,
    Loading,
    Ready,
    /// Terminal: the package is gone or the caller has no access.
    NotFound,
}

/// Single source of truth for the package editor.
///
/// Responsibilities:
/// - owns the rendered package tree snapshot (nobody else writes it)
/// - optimistic field edits + reorders, debounced per channel
/// - structural CRUD as fetch-mutate-refetch cycles
/// - re-fetch after every settled write to reconcile with server truth
///
/// Non-responsibilities:
/// - auth (session cookie, external), question generation, uploads.
#[derive(Clone)]
pub(crate) struct PackageSyncController {
    app_state: AppContext,

    pub package: RwSignal<Option<Package>>,
    pub load_state: RwSignal<LoadState>,

    /// Writes currently in flight.
    pub saving: RwSignal<u32>,

    /// Channels holding a buffered, not-yet-flushed payload. The saving
    /// indicator reads this together with `saving`: "saved" means nothing
    /// in flight AND nothing buffered, so a settled write cannot report
    /// saved while a newer edit still waits out its quiet period.
    pub pending_writes: RwSignal<usize>,

    /// Explicit current-round selection for the add/create-question flows.
    pub selected_round_id: RwSignal<Option<i64>>,

    /// Last committed arrangement; drag previews render on `package` and
    /// fall back to this on cancel.
    committed: StoredValue<Option<Package>>,
    pub gesture: RwSignal<DragGesture>,

    /// Per-channel pending payloads + debounce timers.
    pending: Arc<Mutex<PendingWrites>>,
    autosave_timers: Arc<Mutex<HashMap<SaveChannel, i32>>>,
    quiet_ms: i32,
}

impl PackageSyncController {
    pub fn new(app_state: AppContext) -> Self {
        Self {
            app_state,
            package: RwSignal::new(None),
            load_state: RwSignal::new(LoadState::Idle),
            saving: RwSignal::new(0),
            pending_writes: RwSignal::new(0),
            selected_round_id: RwSignal::new(None),
            committed: StoredValue::new(None),
            gesture: RwSignal::new(DragGesture::default()),
            pending: Arc::new(Mutex::new(PendingWrites::default())),
            autosave_timers: Arc::new(Mutex::new(HashMap::new())),
            quiet_ms: QUIET_PERIOD_MS,
        }
    }

    fn package_id_untracked(&self) -> Option<i64> {
        self.package.get_untracked().map(|p| p.id)
    }

    /// Fetch the authoritative tree and replace the snapshot.
    pub fn load(&self, package_id: i64) {
        self.load_state.set(LoadState::Loading);

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.get_package(package_id).await {
                Ok(pkg) => {
                    write_recent_package(pkg.id, &pkg.title);
                    s2.install_snapshot(pkg);
                    s2.load_state.set(LoadState::Ready);
                }
                Err(e) if e.kind == ApiErrorKind::NotFound => {
                    s2.load_state.set(LoadState::NotFound);
                }
                Err(e) => {
                    s2.app_state.0.notify_api_error(&e);
                    s2.load_state.set(LoadState::Idle);
                }
            }
        });
    }

    /// Silent refetch used to reconcile after writes: no loading flicker,
    /// but NotFound still becomes terminal (the package may have vanished).
    fn reload(&self) {
        let Some(package_id) = self.package_id_untracked() else {
            return;
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.get_package(package_id).await {
                Ok(pkg) => s2.install_snapshot(pkg),
                Err(e) if e.kind == ApiErrorKind::NotFound => {
                    s2.load_state.set(LoadState::NotFound);
                }
                Err(e) => s2.app_state.0.notify_api_error(&e),
            }
        });
    }

    fn install_snapshot(&self, pkg: Package) {
        // Keep the selection valid across refetches.
        let selected = self.selected_round_id.get_untracked();
        if let Some(rid) = selected {
            if !pkg.rounds.iter().any(|r| r.id == rid) {
                self.selected_round_id
                    .set(pkg.rounds.first().map(|r| r.id));
            }
        } else {
            self.selected_round_id
                .set(pkg.rounds.first().map(|r| r.id));
        }

        self.committed.set_value(Some(pkg.clone()));
        self.package.set(Some(pkg));
    }

    // ----- drag gesture ---------------------------------------------------

    /// Enter `dragging`; rejected while another gesture is live.
    pub fn pick_up(&self, id: DragId) -> bool {
        let mut picked = false;
        self.gesture.update(|g| picked = g.pick_up(id));
        picked
    }

    /// Live pre-commit preview: recompute the arrangement from the
    /// committed tree on every hover so repeated hovers never accumulate.
    pub fn hover(&self, target: DropTarget) {
        let Some(dragged) = self.gesture.get_untracked().active() else {
            return;
        };
        let Some(mut preview) = self.committed.get_value() else {
            return;
        };
        apply_drop(&mut preview, dragged, target);
        self.package.set(Some(preview));
    }

    /// Gesture ended over a valid target: commit the arrangement and hand
    /// the full order document to the package-order channel.
    pub fn drop_on(&self, target: DropTarget) {
        let dragged = {
            let mut taken = None;
            self.gesture.update(|g| taken = g.finish());
            taken
        };
        let Some(dragged) = dragged else {
            return;
        };
        let Some(mut next) = self.committed.get_value() else {
            return;
        };

        if !apply_drop(&mut next, dragged, target) {
            // Self-drop or inapplicable target: restore the committed view.
            self.package.set(Some(next));
            return;
        }

        let rounds = SaveOrderRound::from_package(&next);
        let package_id = next.id;
        self.committed.set_value(Some(next.clone()));
        self.package.set(Some(next));

        self.schedule(
            SaveChannel::PackageOrder(package_id),
            SavePayload::PackageOrder { package_id, rounds },
        );
    }

    /// Gesture ended with no valid target: revert to the committed view.
    pub fn cancel_drag(&self) {
        let cancelled = {
            let mut taken = None;
            self.gesture.update(|g| taken = g.cancel());
            taken
        };
        if cancelled.is_some() {
            self.package.set(self.committed.get_value());
        }
    }

    // ----- optimistic field edits ----------------------------------------

    pub fn edit_package_header(&self, title: String, description: String, play_date: Option<String>) {
        let Some(package_id) = self.package_id_untracked() else {
            return;
        };

        self.update_snapshot(|pkg| {
            pkg.title = title.clone();
            pkg.description = description.clone();
            pkg.play_date = play_date.clone();
        });

        self.schedule(
            SaveChannel::PackageHeader(package_id),
            SavePayload::PackageHeader {
                package_id,
                title,
                description,
                play_date,
            },
        );
    }

    pub fn edit_round_fields(
        &self,
        round_id: i64,
        name: String,
        description: String,
        question_count: i32,
    ) {
        self.update_snapshot(|pkg| {
            if let Some(r) = pkg.rounds.iter_mut().find(|r| r.id == round_id) {
                r.name = name.clone();
                r.description = description.clone();
                r.question_count = question_count;
            }
        });

        self.schedule(
            SaveChannel::RoundFields(round_id),
            SavePayload::RoundFields {
                round_id,
                name,
                description,
                question_count,
            },
        );
    }

    pub fn edit_question_content(&self, question_id: i64, text: &str) {
        let content = ContentNode::from_plain_text(text);

        // The same question may sit in several rounds via distinct links;
        // content follows the question, not the link.
        self.update_snapshot(|pkg| {
            for round in pkg.rounds.iter_mut() {
                for rq in round.round_questions.iter_mut() {
                    if rq.question_id == question_id {
                        rq.question.content = content.clone();
                    }
                }
            }
        });

        self.schedule(
            SaveChannel::QuestionContent(question_id),
            SavePayload::QuestionContent {
                question_id,
                content,
            },
        );
    }

    pub fn edit_question_answer(&self, question_id: i64, answer: String) {
        self.update_snapshot(|pkg| {
            for round in pkg.rounds.iter_mut() {
                for rq in round.round_questions.iter_mut() {
                    if rq.question_id == question_id {
                        rq.question.answer = answer.clone();
                    }
                }
            }
        });

        self.schedule(
            SaveChannel::QuestionAnswer(question_id),
            SavePayload::QuestionAnswer {
                question_id,
                answer,
            },
        );
    }

    /// Mutate both the rendered snapshot and the committed arrangement so a
    /// later drag cancel doesn't roll back an unrelated field edit.
    fn update_snapshot(&self, f: impl Fn(&mut Package)) {
        self.package.update(|p| {
            if let Some(pkg) = p.as_mut() {
                f(pkg);
            }
        });
        self.committed.update_value(|p| {
            if let Some(pkg) = p.as_mut() {
                f(pkg);
            }
        });
    }

    // ----- debounced persistence -----------------------------------------

    fn schedule(&self, channel: SaveChannel, payload: SavePayload) {
        self.buffer_write(channel, payload);
        self.schedule_autosave(channel);
    }

    /// Buffer the payload and mirror the buffer occupancy into the gauge
    /// the saving indicator reads.
    fn buffer_write(&self, channel: SaveChannel, payload: SavePayload) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.put(channel, payload);
            self.pending_writes.set(pending.pending_count());
        }
    }

    /// Claim the latest buffered payload for `channel` once its quiet
    /// period has elapsed.
    fn claim_write(&self, channel: SaveChannel) -> Option<(SavePayload, u64)> {
        let mut pending = self.pending.lock().ok()?;
        let claimed = pending.take(channel);
        self.pending_writes.set(pending.pending_count());
        claimed
    }

    /// Replace the channel's timer: the quiet period restarts at the most
    /// recent edit, so a typing burst fires exactly once.
    fn schedule_autosave(&self, channel: SaveChannel) {
        let Some(win) = web_sys::window() else {
            return;
        };

        if let Ok(mut map) = self.autosave_timers.lock() {
            if let Some(tid) = map.remove(&channel) {
                let _ = win.clear_timeout_with_handle(tid);
            }
        }

        let s2 = self.clone();
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            s2.flush(channel);
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                self.quiet_ms,
            )
            .unwrap_or(0);

        if let Ok(mut map) = self.autosave_timers.lock() {
            map.insert(channel, tid);
        }
    }

    fn flush(&self, channel: SaveChannel) {
        let Some((payload, seq)) = self.claim_write(channel) else {
            return;
        };

        self.saving.update(|n| *n += 1);

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            let result = match payload {
                SavePayload::QuestionContent {
                    question_id,
                    content,
                } => api_client
                    .update_question(
                        question_id,
                        &UpdateQuestionRequest {
                            content: Some(content),
                            ..Default::default()
                        },
                    )
                    .await
                    .map(|_| ()),
                SavePayload::QuestionAnswer {
                    question_id,
                    answer,
                } => api_client
                    .update_question(
                        question_id,
                        &UpdateQuestionRequest {
                            answer: Some(answer),
                            ..Default::default()
                        },
                    )
                    .await
                    .map(|_| ()),
                SavePayload::PackageHeader {
                    package_id,
                    title,
                    description,
                    play_date,
                } => api_client
                    .update_package(
                        package_id,
                        &UpdatePackageRequest {
                            title: Some(title),
                            description: Some(description),
                            play_date,
                        },
                    )
                    .await
                    .map(|_| ()),
                SavePayload::RoundFields {
                    round_id,
                    name,
                    description,
                    question_count,
                } => api_client
                    .update_round(
                        round_id,
                        &UpdateRoundRequest {
                            name: Some(name),
                            description: Some(description),
                            question_count: Some(question_count),
                        },
                    )
                    .await
                    .map(|_| ()),
                SavePayload::PackageOrder { rounds, .. } => {
                    api_client.save_order(rounds).await.map(|_| ())
                }
            };

            if let Err(e) = result {
                // Optimistic state stays; the refetch below reconciles.
                s2.app_state.0.notify_api_error(&e);
            }

            s2.saving.update(|n| *n = n.saturating_sub(1));

            // Re-fetch server truth after every settled write. If a newer
            // write is already pending on this channel, its own settle will
            // reconcile instead (and the refetch would clobber the newer
            // optimistic state mid-typing).
            let newer_pending = s2
                .pending
                .lock()
                .ok()
                .map(|p| !p.is_latest(channel, seq) || p.has_pending(channel))
                .unwrap_or(false);
            if !newer_pending {
                s2.reload();
            }
        });
    }

    // ----- structural CRUD (fetch-mutate-refetch, not optimistic) ---------

    pub fn add_round(&self, name: String, description: String, question_count: i32) {
        let Some(pkg) = self.package.get_untracked() else {
            return;
        };

        let req = CreateRoundRequest {
            name,
            description,
            question_count,
            order_index: pkg.rounds.len() as i32,
            package_id: pkg.id,
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.create_round(&req).await {
                Ok(round) => {
                    s2.selected_round_id.set(Some(round.id));
                    s2.reload();
                }
                Err(e) => s2.app_state.0.notify_api_error(&e),
            }
        });
    }

    pub fn delete_round(&self, round_id: i64) {
        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.delete_round(round_id).await {
                Ok(_) => s2.reload(),
                Err(e) => s2.app_state.0.notify_api_error(&e),
            }
        });
    }

    pub fn add_question_to_round(&self, round_id: i64, question_id: i64) {
        let order_index = self
            .package
            .get_untracked()
            .and_then(|pkg| {
                pkg.rounds
                    .iter()
                    .find(|r| r.id == round_id)
                    .map(|r| r.round_questions.len() as i32)
            })
            .unwrap_or(0);

        let req = AddQuestionToRoundRequest {
            question_id,
            order_index,
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.add_question_to_round(round_id, &req).await {
                Ok(_) => s2.reload(),
                Err(e) => s2.app_state.0.notify_api_error(&e),
            }
        });
    }

    pub fn remove_question_from_round(&self, round_id: i64, question_id: i64) {
        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client
                .remove_question_from_round(round_id, question_id)
                .await
            {
                Ok(_) => s2.reload(),
                Err(e) => s2.app_state.0.notify_api_error(&e),
            }
        });
    }

    /// Create a fresh question and link it to `round_id` in one flow.
    pub fn create_question_in_round(
        &self,
        round_id: i64,
        title: String,
        content_text: String,
        answer: String,
        difficulty: i32,
    ) {
        let req = CreateQuestionRequest {
            title,
            content: ContentNode::from_plain_text(&content_text),
            answer,
            difficulty,
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.create_question(&req).await {
                Ok(question) => {
                    s2.add_question_to_round(round_id, question.id);
                }
                Err(e) => s2.app_state.0.notify_api_error(&e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::models::Round;
    use crate::state::AppState;

    fn controller() -> PackageSyncController {
        let state = AppState::with_client(ApiClient::new("http://localhost:3001".to_string()));
        PackageSyncController::new(AppContext(state))
    }

    fn round(id: i64, order_index: i32) -> Round {
        Round {
            id,
            package_id: 1,
            name: format!("Round {id}"),
            description: String::new(),
            question_count: 0,
            order_index,
            round_questions: vec![],
        }
    }

    fn package(rounds: Vec<Round>) -> Package {
        Package {
            id: 1,
            title: "Pkg".to_string(),
            description: String::new(),
            play_date: None,
            author: None,
            rounds,
        }
    }

    #[test]
    fn test_install_snapshot_replaces_package_and_committed() {
        let c = controller();
        c.install_snapshot(package(vec![round(10, 0)]));

        // A hover preview only touches the rendered signal.
        c.package
            .update(|p| p.as_mut().unwrap().title = "preview".to_string());

        // A refetch replaces both views with server truth.
        c.install_snapshot(package(vec![round(10, 0), round(11, 1)]));
        let shown = c.package.get_untracked().expect("snapshot installed");
        let committed = c.committed.get_value().expect("committed installed");
        assert_eq!(shown, committed);
        assert_eq!(shown.title, "Pkg");
        assert_eq!(shown.rounds.len(), 2);
    }

    #[test]
    fn test_install_snapshot_revalidates_selection() {
        let c = controller();
        c.install_snapshot(package(vec![round(10, 0), round(11, 1)]));
        c.selected_round_id.set(Some(11));

        // The server dropped round 11; selection falls back to the first.
        c.install_snapshot(package(vec![round(10, 0)]));
        assert_eq!(c.selected_round_id.get_untracked(), Some(10));

        // A still-present selection survives the refetch.
        c.install_snapshot(package(vec![round(10, 0), round(12, 1)]));
        assert_eq!(c.selected_round_id.get_untracked(), Some(10));
    }

    #[test]
    fn test_newer_buffered_write_keeps_unsaved_state_visible() {
        let c = controller();
        let ch = SaveChannel::QuestionAnswer(5);
        let payload = |s: &str| SavePayload::QuestionAnswer {
            question_id: 5,
            answer: s.to_string(),
        };

        c.buffer_write(ch, payload("draft 1"));
        assert_eq!(c.pending_writes.get_untracked(), 1);

        // Quiet period elapses; the write goes out.
        c.claim_write(ch).expect("buffered write");
        c.saving.update(|n| *n += 1);
        assert_eq!(c.pending_writes.get_untracked(), 0);

        // User keeps typing while the request is in flight.
        c.buffer_write(ch, payload("draft 2"));

        // First write settles. The in-flight count drops to zero, but the
        // newer edit still sits in the buffer, so the combined state the
        // indicator reads must not say "saved".
        c.saving.update(|n| *n = n.saturating_sub(1));
        assert_eq!(c.saving.get_untracked(), 0);
        assert_eq!(c.pending_writes.get_untracked(), 1);
    }
}
