//! File store behaviour on a real directory.

use deck_core::{normalize_slides, Error, Slide, SlideInput, TopicKey};
use deck_store::{DeckStore, FileStore};

fn sample_inputs() -> Vec<SlideInput> {
    vec![
        SlideInput {
            title: Some("Basics".into()),
            content: Some(vec!["- point a".into(), "  ".into(), "- point b".into()]),
            image: Some("https://example.com/a.png".into()),
            ..Default::default()
        },
        SlideInput {
            content: Some(vec!["- orphan".into()]),
            theme: Some("#112233".into()),
            ..Default::default()
        },
    ]
}

#[tokio::test]
async fn open_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("decks");

    let store = FileStore::open(&root).await.unwrap();

    assert!(root.is_dir());
    assert_eq!(store.root(), root.as_path());
}

#[tokio::test]
async fn save_then_load_returns_normalized_deck() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let key = TopicKey::from_topic("Python Basics").unwrap();

    let slides = normalize_slides(sample_inputs(), false);
    store.save(&key, &slides).await.unwrap();
    let loaded = store.load(&key).await.unwrap();

    assert_eq!(loaded, slides);
    assert_eq!(loaded[0].content, vec!["- point a", "- point b"]);
    assert_eq!(loaded[0].image, None);
    assert_eq!(loaded[1].title, "Untitled Slide");
    assert_eq!(loaded[1].theme, "#112233");
    assert!(dir.path().join("Python_Basics.json").is_file());
}

#[tokio::test]
async fn saving_twice_matches_saving_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let key = TopicKey::from_topic("Idempotent").unwrap();
    let slides = normalize_slides(sample_inputs(), true);

    store.save(&key, &slides).await.unwrap();
    let first = std::fs::read_to_string(store.path_for(&key)).unwrap();
    store.save(&key, &slides).await.unwrap();
    let second = std::fs::read_to_string(store.path_for(&key)).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.load(&key).await.unwrap(), slides);
}

#[tokio::test]
async fn stored_json_is_pretty_camel_case() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let key = TopicKey::from_topic("format").unwrap();

    store.save(&key, &[Slide::new("A")]).await.unwrap();
    let raw = std::fs::read_to_string(store.path_for(&key)).unwrap();

    assert!(raw.starts_with("[\n  {\n"));
    assert!(raw.contains("\"titleColor\": \"#000000\""));
    assert!(raw.contains("\"image\": null"));
}

#[tokio::test]
async fn whitespace_variants_share_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();

    let a = TopicKey::from_topic("My Topic").unwrap();
    let b = TopicKey::from_topic("My \t Topic").unwrap();
    store.save(&a, &[Slide::new("first")]).await.unwrap();
    store.save(&b, &[Slide::new("second")]).await.unwrap();

    assert_eq!(store.path_for(&a), store.path_for(&b));
    assert_eq!(store.load(&a).await.unwrap()[0].title, "second");
}

#[tokio::test]
async fn missing_deck_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let key = TopicKey::from_topic("never saved").unwrap();

    assert!(!store.exists(&key).await.unwrap());
    assert!(matches!(store.load(&key).await, Err(Error::DeckNotFound(_))));
}

#[tokio::test]
async fn hand_edited_file_gets_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let key = TopicKey::from_topic("edited").unwrap();
    std::fs::write(
        store.path_for(&key),
        r#"[{"title":"Kept","content":["x",""],"image":"pic.png"}]"#,
    )
    .unwrap();

    let loaded = store.load(&key).await.unwrap();

    assert!(store.exists(&key).await.unwrap());
    assert_eq!(loaded[0].title, "Kept");
    assert_eq!(loaded[0].content, vec!["x"]);
    assert_eq!(loaded[0].title_color, "#000000");
    assert_eq!(loaded[0].image.as_deref(), Some("pic.png"));
}

#[tokio::test]
async fn corrupt_file_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    let key = TopicKey::from_topic("corrupt").unwrap();
    std::fs::write(store.path_for(&key), "{ not json").unwrap();

    assert!(matches!(store.load(&key).await, Err(Error::JsonError(_))));
}
