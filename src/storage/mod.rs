use crate::models::RecentPackage;
use crate::util::now_ms;
use serde::{Deserialize, Serialize};

pub(crate) const SIDEBAR_COLLAPSED_KEY: &str = "quizforge_sidebar_collapsed";
pub(crate) const CURRENT_PACKAGE_KEY: &str = "quizforge_current_package_id";
pub(crate) const RECENT_PACKAGES_KEY: &str = "quizforge_recent_packages";

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn load_flag(key: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(key).ok().flatten())
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
}

pub(crate) fn save_flag(key: &str, value: bool) {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        let _ = storage.set_item(key, if value { "1" } else { "0" });
    }
}

pub(crate) fn upsert_lru_by_key<T: Clone>(
    mut items: Vec<T>,
    item: T,
    same_key: impl Fn(&T, &T) -> bool,
    max: usize,
) -> Vec<T> {
    items.retain(|x| !same_key(x, &item));
    items.insert(0, item);
    if items.len() > max {
        items.truncate(max);
    }
    items
}

pub(crate) fn load_recent_packages() -> Vec<RecentPackage> {
    load_json_from_storage::<Vec<RecentPackage>>(RECENT_PACKAGES_KEY).unwrap_or_default()
}

pub(crate) fn write_recent_package(id: i64, title: &str) {
    let item = RecentPackage {
        id,
        title: title.to_string(),
        last_opened_ms: now_ms(),
    };

    let next = upsert_lru_by_key(load_recent_packages(), item, |a, b| a.id == b.id, 8);
    save_json_to_storage(RECENT_PACKAGES_KEY, &next);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recent(id: i64) -> RecentPackage {
        RecentPackage {
            id,
            title: format!("pkg {id}"),
            last_opened_ms: id,
        }
    }

    #[test]
    fn test_lru_moves_existing_entry_to_front() {
        let items = vec![recent(1), recent(2), recent(3)];
        let next = upsert_lru_by_key(items, recent(3), |a, b| a.id == b.id, 8);
        let ids: Vec<i64> = next.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_lru_truncates_at_max() {
        let items = vec![recent(1), recent(2)];
        let next = upsert_lru_by_key(items, recent(3), |a, b| a.id == b.id, 2);
        let ids: Vec<i64> = next.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` +
// wasm-bindgen-test-runner).
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_recent_packages_storage_round_trip() {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.remove_item(RECENT_PACKAGES_KEY);
        }

        write_recent_package(7, "Pub quiz #7");
        write_recent_package(8, "Pub quiz #8");
        write_recent_package(7, "Pub quiz #7");

        let recents = load_recent_packages();
        assert_eq!(recents.len(), 2);
        assert_eq!(recents[0].id, 7);
    }

    #[wasm_bindgen_test]
    fn test_flag_round_trip() {
        save_flag(SIDEBAR_COLLAPSED_KEY, true);
        assert!(load_flag(SIDEBAR_COLLAPSED_KEY));
        save_flag(SIDEBAR_COLLAPSED_KEY, false);
        assert!(!load_flag(SIDEBAR_COLLAPSED_KEY));
    }
}
