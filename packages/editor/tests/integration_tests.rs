//! Integration tests for editor crate

use screenwright_editor::{
    classify, format, Block, Document, EditOutcome, EditSession, ElementType, Key, KeyHandling,
    Mark, Marks, Point, Selection, TextRun,
};

fn type_line(session: &mut EditSession, text: &str) {
    for c in text.chars() {
        assert_eq!(session.handle_key(Key::Char(c)), KeyHandling::Consumed);
    }
}

#[test]
fn test_writing_a_scene_from_the_starter() {
    let mut session = EditSession::new(Document::starter());

    session.handle_key(Key::Enter);
    type_line(&mut session, "JOHN");
    session.handle_key(Key::Enter);
    session.handle_key(Key::Tab);
    type_line(&mut session, "quietly");
    session.handle_key(Key::Enter);
    type_line(&mut session, "It's over.");
    session.handle_key(Key::Enter);

    let doc = session.document();
    assert_eq!(
        doc.types(),
        vec![
            ElementType::SceneHeading,
            ElementType::Character,
            ElementType::Parenthetical,
            ElementType::Dialogue,
            ElementType::Character,
        ]
    );
    assert_eq!(doc.text(), "INT. START HERE\nJOHN\nquietly\nIt's over.\n");
}

#[test]
fn test_break_and_cycle_are_total() {
    let mut all: Vec<ElementType> = ElementType::ALL.to_vec();
    all.push(ElementType::from("paragraph"));
    all.push(ElementType::from(""));

    for element_type in &all {
        let next = classify::next_on_break(element_type);
        assert!(!next.is_legacy(), "break from {} gave {}", element_type, next);

        let cycled = classify::cycle(element_type);
        if element_type.is_legacy() {
            assert_eq!(&cycled, element_type);
        } else {
            assert!(!cycled.is_legacy());
        }
    }
}

#[test]
fn test_tab_on_every_type() {
    for element_type in ElementType::ALL {
        let mut session = EditSession::new(Document::from_blocks(vec![Block::new(
            element_type.clone(),
            "x",
        )]));

        let expected = classify::cycle(&element_type);
        let outcome = session.cycle_type();

        assert_eq!(session.document().types(), vec![expected.clone()]);
        assert_eq!(outcome.is_changed(), expected != element_type);
    }
}

#[test]
fn test_saved_document_round_trips() {
    let mut session = EditSession::new(Document::starter());
    session.insert_break();
    session.insert_text("MARIA");
    session.insert_break();
    session.toggle_mark(Mark::Bold);
    session.insert_text("Now");
    session.toggle_mark(Mark::Bold);
    session.insert_text(" or never.");

    let dir = tempfile::tempdir().unwrap();
    let path = format::save_to_disk(session.document(), dir.path(), "draft").unwrap();
    let loaded = format::load_from_disk(&path).unwrap();

    assert_eq!(&loaded, session.document());

    let dialogue = loaded.block(2).unwrap();
    assert_eq!(
        dialogue.children,
        vec![
            TextRun::styled(
                "Now",
                Marks {
                    bold: true,
                    ..Marks::default()
                }
            ),
            TextRun::plain(" or never."),
        ]
    );
}

#[test]
fn test_persisted_json_shape() {
    let doc = Document::from_blocks(vec![Block::with_runs(
        ElementType::Transition,
        vec![TextRun::styled(
            "CUT TO:",
            Marks {
                italic: true,
                ..Marks::default()
            },
        )],
    )]);

    let value = format::to_value(&doc).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            { "type": "transition", "children": [{ "text": "CUT TO:", "italic": true }] }
        ])
    );
}

#[test]
fn test_load_clears_history_and_notifies() {
    let mut session = EditSession::new(Document::new());
    session.insert_text("INT. GARAGE");
    session.insert_break();
    assert!(session.can_undo());

    let version = session.version();
    session
        .load_json(r#"[{"type":"action","children":[{"text":"Rain."}]}]"#)
        .unwrap();

    assert_eq!(session.version(), version + 1);
    assert!(!session.can_undo());
    assert_eq!(session.undo(), EditOutcome::Unchanged);
    assert_eq!(session.document().text(), "Rain.");
}

#[test]
fn test_invalid_load_is_rejected() {
    let mut session = EditSession::new(Document::starter());

    for bad in ["null", "{}", "[]", r#"[{"type":"action","children":[]}]"#, "[1,2]"] {
        assert!(session.load_json(bad).is_err(), "accepted {}", bad);
    }

    assert_eq!(session.document(), &Document::starter());
}

#[test]
fn test_undo_redo_walks_every_step() {
    let mut session = EditSession::new(Document::starter());
    let mut snapshots = vec![session.document().clone()];

    session.insert_break();
    snapshots.push(session.document().clone());
    session.insert_text("ANNA");
    snapshots.push(session.document().clone());
    session.cycle_type();
    snapshots.push(session.document().clone());
    session.select(Selection::range(Point::new(1, 0), Point::new(1, 4)));
    session.toggle_mark(Mark::Underline);
    snapshots.push(session.document().clone());

    for expected in snapshots.iter().rev().skip(1) {
        assert_eq!(session.undo(), EditOutcome::Changed);
        assert_eq!(session.document(), expected);
    }
    assert_eq!(session.undo(), EditOutcome::Unchanged);

    for expected in snapshots.iter().skip(1) {
        assert_eq!(session.redo(), EditOutcome::Changed);
        assert_eq!(session.document(), expected);
    }
}

#[test]
fn test_toolbar_retag_over_selection() {
    let mut session = EditSession::new(Document::from_blocks(vec![
        Block::new(ElementType::Action, "one"),
        Block::new(ElementType::Action, "two"),
        Block::new(ElementType::Action, "three"),
    ]));
    session.select(Selection::range(Point::new(0, 1), Point::new(1, 1)));

    session.set_block_type(ElementType::Dialogue);

    assert_eq!(
        session.document().types(),
        vec![ElementType::Dialogue, ElementType::Dialogue, ElementType::Action]
    );
}

#[test]
fn test_flag_keys_are_consumed() {
    let mut session = EditSession::new(Document::starter());
    session.select_all();

    assert_eq!(session.handle_key(Key::Bold), KeyHandling::Consumed);
    assert_eq!(session.handle_key(Key::Italic), KeyHandling::Consumed);
    assert_eq!(session.handle_key(Key::Underline), KeyHandling::Consumed);

    let run = &session.document().block(0).unwrap().children[0];
    assert!(run.bold && run.italic && run.underline);
    assert_eq!(run.text, "INT. START HERE");
}
