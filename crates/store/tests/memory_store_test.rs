use geomark_core::models::{DocumentPatch, Schedule, Subject, UserDocument};
use geomark_store::{DocumentStore, MemoryStore};
use pretty_assertions::assert_eq;

fn subject(id: &str, name: &str) -> Subject {
    Subject {
        id: id.to_string(),
        name: name.to_string(),
    }
}

#[tokio::test]
async fn read_of_an_unknown_user_is_absent() {
    let store = MemoryStore::new();
    let document = store.read("nobody").await.expect("read succeeds");
    assert_eq!(document, None);
}

#[tokio::test]
async fn first_write_seeds_defaults_for_unnamed_fields() {
    let store = MemoryStore::new();

    store
        .write("user-1", DocumentPatch::min_attendance_percent(60))
        .await
        .expect("write succeeds");

    let document = store
        .read("user-1")
        .await
        .expect("read succeeds")
        .expect("document exists");

    assert_eq!(document.min_attendance_percent, 60);
    assert!(document.subjects.is_empty());
    assert!(document.attendance_records.is_empty());
}

#[tokio::test]
async fn write_replaces_only_the_named_fields() {
    let store = MemoryStore::new();

    store
        .write(
            "user-1",
            DocumentPatch::subjects(vec![subject("sub-1", "Networks")]),
        )
        .await
        .expect("write succeeds");

    store
        .write("user-1", DocumentPatch::schedule(Schedule::default()))
        .await
        .expect("write succeeds");

    let document = store
        .read("user-1")
        .await
        .expect("read succeeds")
        .expect("document exists");

    // The schedule write must not have clobbered the subject list.
    assert_eq!(document.subjects, vec![subject("sub-1", "Networks")]);
}

#[tokio::test]
async fn full_patch_replaces_everything() {
    let store = MemoryStore::new();

    store
        .write(
            "user-1",
            DocumentPatch::subjects(vec![subject("sub-1", "Networks")]),
        )
        .await
        .expect("write succeeds");

    let mut replacement = UserDocument::default();
    replacement.min_attendance_percent = 90;
    store
        .write("user-1", DocumentPatch::full(&replacement))
        .await
        .expect("write succeeds");

    let document = store
        .read("user-1")
        .await
        .expect("read succeeds")
        .expect("document exists");

    assert_eq!(document, replacement);
}

#[tokio::test]
async fn subscribers_see_the_merged_document_after_each_write() {
    let store = MemoryStore::new();
    let mut updates = store.subscribe("user-1");

    store
        .write("user-1", DocumentPatch::min_attendance_percent(65))
        .await
        .expect("write succeeds");

    let echoed = updates.recv().await.expect("update delivered");
    assert_eq!(echoed.min_attendance_percent, 65);

    store
        .write(
            "user-1",
            DocumentPatch::subjects(vec![subject("sub-1", "Networks")]),
        )
        .await
        .expect("write succeeds");

    let echoed = updates.recv().await.expect("update delivered");
    assert_eq!(echoed.min_attendance_percent, 65);
    assert_eq!(echoed.subjects, vec![subject("sub-1", "Networks")]);
}

#[tokio::test]
async fn subscriptions_are_scoped_per_user() {
    let store = MemoryStore::new();
    let mut other = store.subscribe("user-2");

    store
        .write("user-1", DocumentPatch::min_attendance_percent(65))
        .await
        .expect("write succeeds");

    assert!(matches!(
        other.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}
