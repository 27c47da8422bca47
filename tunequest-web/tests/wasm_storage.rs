#![cfg(target_arch = "wasm32")]

use std::collections::BTreeSet;
use tunequest_engine::{GuestProgressStore, ProgressSet};
use tunequest_web::dom;
use tunequest_web::storage::SessionProgressStore;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn guest_sets_round_trip_through_session_storage() {
    let mut store = SessionProgressStore;
    let levels: BTreeSet<u32> = [1, 7].into_iter().collect();
    store.save(ProgressSet::Played, &levels).expect("save played");
    assert_eq!(store.load(ProgressSet::Played).expect("load played"), levels);
}

#[wasm_bindgen_test]
fn completed_set_starts_empty() {
    let storage = dom::session_storage().expect("session storage");
    storage
        .remove_item("tunequest.guest.completed")
        .expect("clear completed");
    let store = SessionProgressStore;
    assert!(
        store
            .load(ProgressSet::Completed)
            .expect("load completed")
            .is_empty()
    );
}

#[wasm_bindgen_test]
fn missing_auth_token_means_guest() {
    let storage = dom::session_storage().expect("session storage");
    storage.remove_item("authToken").expect("clear token");
    assert!(dom::auth_token().is_none());
}
