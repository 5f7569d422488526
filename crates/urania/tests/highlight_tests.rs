use urania::dom::{Document, NodeId};
use urania::highlights::{
    flattened_text, render_highlights, selection_offsets, strip_markers, subject_key, DomPosition,
    HighlightColor, HighlightError, HighlightRange, HighlightSession, HighlightSet, HighlightStore,
    JsonFileHighlightStore, MemoryHighlightStore,
};
use uuid::Uuid;

const BODY: &str = r#"<article><p>Hello <b>bright</b> world.</p><div data-chart="natal"><svg><text>Sun</text></svg></div><p>Second para</p></article>"#;

fn body() -> Document {
    Document::parse(BODY).expect("body markup")
}

fn first_paragraph(doc: &Document) -> NodeId {
    doc.children(doc.root())[0]
}

fn range(start: usize, end: usize) -> HighlightRange {
    HighlightRange {
        id: Uuid::new_v4(),
        start,
        end,
        color: HighlightColor::Yellow,
    }
}

#[test]
fn test_flattened_text_skips_chart() {
    let doc = body();
    assert_eq!(flattened_text(&doc, doc.root()), "Hello bright world.Second para");
}

#[test]
fn test_overlap_is_rejected_touching_is_not() {
    let mut set = HighlightSet::new();
    let first = set.create(10, 20, HighlightColor::Green).expect("first range").id;
    assert_eq!(
        set.create(15, 25, HighlightColor::Blue).map(|r| r.id),
        Err(HighlightError::Overlap(first))
    );
    assert!(set.create(20, 30, HighlightColor::Blue).is_ok());
    assert_eq!(
        set.create(7, 7, HighlightColor::Pink).map(|r| r.id),
        Err(HighlightError::InvalidRange { start: 7, end: 7 })
    );
    assert_eq!(set.len(), 2);
}

#[test]
fn test_from_ranges_drops_bad_entries() {
    let stored = vec![range(0, 5), range(3, 8), range(9, 9), range(5, 9)];
    let set = HighlightSet::from_ranges(stored);
    let spans: Vec<(usize, usize)> = set.ranges().iter().map(|r| (r.start, r.end)).collect();
    assert_eq!(spans, vec![(0, 5), (5, 9)]);
}

#[test]
fn test_render_preserves_text_and_strip_restores_markup() {
    let mut doc = body();
    let root = doc.root();
    let original = doc.to_markup();

    let ranges = vec![range(3, 9), range(16, 24)];
    let marks = render_highlights(&mut doc, root, &ranges);
    assert_eq!(marks, 4);
    assert_eq!(flattened_text(&doc, root), "Hello bright world.Second para");

    let marked: Vec<String> = doc
        .find_all(root, |d, n| d.name(n) == Some("mark"))
        .into_iter()
        .map(|n| doc.text_content(n))
        .collect();
    assert_eq!(marked, vec!["lo ", "bri", "ld.", "Secon"]);

    // rendering again yields the same markup
    let once = doc.to_markup();
    render_highlights(&mut doc, root, &ranges);
    assert_eq!(doc.to_markup(), once);

    assert_eq!(strip_markers(&mut doc, root), 4);
    assert_eq!(doc.to_markup(), original);
}

#[test]
fn test_unicode_offsets_count_chars() {
    let mut doc = Document::parse("<p>Vénus ♀ rising</p>").expect("markup");
    let root = doc.root();
    render_highlights(&mut doc, root, &[range(6, 7)]);
    let mark = doc.find(root, |d, n| d.name(n) == Some("mark")).expect("mark");
    assert_eq!(doc.text_content(mark), "♀");
}

#[test]
fn test_selection_offsets() {
    let doc = body();
    let root = doc.root();
    let p = first_paragraph(&doc);
    let hello = doc.children(p)[0];
    let world = doc.children(p)[2];

    // backwards selection is normalized
    assert_eq!(
        selection_offsets(&doc, root, DomPosition::new(world, 3), DomPosition::new(hello, 2)),
        Some((2, 15))
    );
    // element positions count the children before the boundary
    assert_eq!(
        selection_offsets(&doc, root, DomPosition::new(p, 1), DomPosition::new(p, 3)),
        Some((6, 19))
    );
    assert_eq!(
        selection_offsets(&doc, root, DomPosition::new(hello, 4), DomPosition::new(hello, 4)),
        None
    );

    let chart_text = doc
        .find(root, |d, n| d.name(n) == Some("text"))
        .and_then(|n| doc.children(n).first().copied())
        .expect("chart text");
    assert_eq!(
        selection_offsets(&doc, root, DomPosition::new(chart_text, 0), DomPosition::new(hello, 2)),
        None
    );
}

#[test]
fn test_session_create_reload_and_click() {
    let key = subject_key("Ada Example", "1990-05-15", "14:30", "Paris");
    let mut store = MemoryHighlightStore::new();

    {
        let mut doc = body();
        let root = doc.root();
        let mut session = HighlightSession::open(&mut store, &key, &mut doc, root);
        session.create(&mut doc, 10, 20, HighlightColor::Yellow).expect("first");
        assert!(matches!(
            session.create(&mut doc, 15, 25, HighlightColor::Green),
            Err(HighlightError::Overlap(_))
        ));
        let p = first_paragraph(&doc);
        let hello = doc.children(p)[0];
        let created = session
            .create_from_selection(
                &mut doc,
                DomPosition::new(hello, 0),
                DomPosition::new(hello, 5),
                HighlightColor::Pink,
            )
            .expect("selection range");
        assert!(created.is_some());
        let collapsed = session
            .create_from_selection(
                &mut doc,
                DomPosition::new(hello, 1),
                DomPosition::new(hello, 1),
                HighlightColor::Pink,
            )
            .expect("collapsed selection");
        assert_eq!(collapsed, None);
    }
    assert_eq!(store.load(&key).len(), 2);

    let mut doc = body();
    let root = doc.root();
    let mut session = HighlightSession::open(&mut store, &key, &mut doc, root);
    assert_eq!(session.ranges().len(), 2);
    assert_eq!(flattened_text(&doc, root), "Hello bright world.Second para");

    let mark = doc.find(root, |d, n| d.name(n) == Some("mark")).expect("rendered mark");
    let inside = doc.children(mark)[0];
    assert!(session.click_marker(&mut doc, inside, true).is_none());
    let removed = session.click_marker(&mut doc, inside, false).expect("removed range");
    assert_eq!((removed.start, removed.end), (0, 5));
    assert_eq!(session.ranges().len(), 1);
    drop(session);
    assert_eq!(store.load(&key).len(), 1);
}

#[test]
fn test_json_file_store_persists_and_survives_corruption() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("highlights.json");
    let mut store = JsonFileHighlightStore::new(&path);

    assert!(store.load("a").is_empty());
    store.save("a", &[range(0, 4)]).expect("save a");
    store.save("b", &[range(2, 3), range(5, 6)]).expect("save b");

    let reopened = JsonFileHighlightStore::new(&path);
    assert_eq!(reopened.load("a").len(), 1);
    assert_eq!(reopened.load("b").len(), 2);

    store.save("a", &[]).expect("clear a");
    assert!(store.load("a").is_empty());
    assert_eq!(store.load("b").len(), 2);

    std::fs::write(&path, r#"{"b": "oops"}"#).expect("write entry");
    assert!(store.load("b").is_empty());

    std::fs::write(&path, "not json").expect("corrupt file");
    assert!(store.load("b").is_empty());
    store.save("c", &[range(1, 2)]).expect("save over corrupt file");
    assert_eq!(store.load("c").len(), 1);
}
