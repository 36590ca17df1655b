//! Selection to draft to edits, persisted through a file-backed slot

use collagekit::platform::{FileStorage, KeyValueStorage};
use collagekit::selection::{Route, Toggle};
use collagekit::source::Photo;
use collagekit::state::{self, CollageLayout, DraftStore};
use collagekit::{Error, SelectionController, DRAFT_KEY};

fn feed() -> Vec<Photo> {
    ["sun", "sea", "sand", "sky", "surf"]
        .iter()
        .map(|id| Photo {
            id: id.to_string(),
            preview_uri: format!("https://images.test/{}.jpg", id),
            alt_text: None,
        })
        .collect()
}

#[test]
fn draft_survives_a_new_session() {
    let dir = tempfile::tempdir().unwrap();

    let mut selection = SelectionController::new();
    for id in ["sea", "sun", "sky", "sand", "surf"] {
        selection.toggle(id);
    }
    assert_eq!(selection.count(), 4);
    assert_eq!(selection.toggle("surf"), Toggle::Rejected);

    {
        let drafts = DraftStore::new(FileStorage::open(dir.path()).unwrap());
        let (state, route) = selection.commit(&feed(), &drafts).unwrap();
        assert_eq!(route, Route::Collage);
        assert_eq!(route.path(), "/collage");
        assert_eq!(state.layout(), CollageLayout::Grid);
    }

    // A fresh storage handle over the same directory sees the same draft
    let drafts = DraftStore::new(FileStorage::open(dir.path()).unwrap());
    let state = drafts.load().unwrap();
    let ids: Vec<_> = state.images().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["sea", "sun", "sky", "sand"]);
    assert_eq!(state.images()[0].alt.as_deref(), Some(""));

    let state = state::update_layout(&state, CollageLayout::Vertical);
    let state = state::reorder_images(&state, 3, 0).unwrap();
    drafts.save(&state).unwrap();

    let reloaded = drafts.load().unwrap();
    assert_eq!(reloaded.layout(), CollageLayout::Vertical);
    assert_eq!(reloaded.images()[0].id, "sand");
    assert_eq!(reloaded.images()[1].id, "sea");

    drafts.clear().unwrap();
    assert!(drafts.load().is_none());
    assert!(drafts.storage().get_item(DRAFT_KEY).is_none());
}

#[test]
fn out_of_range_reorder_keeps_saved_draft() {
    let dir = tempfile::tempdir().unwrap();
    let drafts = DraftStore::new(FileStorage::open(dir.path()).unwrap());

    let mut selection = SelectionController::new();
    selection.toggle("sun");
    selection.toggle("sea");
    let (state, _) = selection.commit(&feed(), &drafts).unwrap();

    let err = state::reorder_images(&state, 0, 2).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { index: 2, len: 2 }));
    assert_eq!(drafts.load(), Some(state));
}

#[test]
fn corrupt_slot_reads_as_no_draft() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set_item(DRAFT_KEY, "{\"images\":[],\"layout\":\"grid\"}").unwrap();
    assert!(DraftStore::new(storage).load().is_none());

    let storage = FileStorage::open(dir.path()).unwrap();
    storage
        .set_item(DRAFT_KEY, "{\"images\":[{\"id\":\"a\",\"src\":\"s\"}],\"layout\":\"mosaic\"}")
        .unwrap();
    assert!(DraftStore::new(storage).load().is_none());
}

#[test]
fn new_commit_supersedes_old_draft() {
    let dir = tempfile::tempdir().unwrap();
    let drafts = DraftStore::new(FileStorage::open(dir.path()).unwrap());

    let mut first = SelectionController::new();
    first.toggle("sun");
    first.commit(&feed(), &drafts).unwrap();

    let mut second = SelectionController::with_capacity(2);
    second.toggle("sky");
    second.toggle("surf");
    assert_eq!(second.toggle("sea"), Toggle::Rejected);
    second.commit(&feed(), &drafts).unwrap();

    let ids: Vec<_> = drafts.load().unwrap().images().iter().map(|i| i.id.clone()).collect();
    assert_eq!(ids, ["sky", "surf"]);
}
