//! Integration tests for the chat-core frame pipeline.
//!
//! These tests drive raw wire text through the public API the same way the
//! client does: decode, reconcile, apply to a [`ChatView`], then interpret
//! each transcript entry for display.

use chat_core::domain::presentation::{interpret, Alignment, EventKind};
use chat_core::protocol::codec::decode_frame;
use chat_core::{reconcile, ChatEvent, ChatView, InboundFrame};

/// Feeds every frame through decode → reconcile → apply, skipping frames that
/// fail to decode exactly as the session loop does.
fn feed(view: &mut ChatView, frames: &[&str]) -> usize {
    let mut dropped = 0;
    for text in frames {
        match decode_frame(text) {
            Ok(frame) => view.apply(reconcile(frame)),
            Err(_) => dropped += 1,
        }
    }
    dropped
}

#[test]
fn test_transcript_order_matches_arrival_order() {
    let mut view = ChatView::new();

    feed(
        &mut view,
        &[
            r#"{"username":"alice","message":"alice: first"}"#,
            r#"{"username":"bobby","message":"bobby: second"}"#,
            r#"{"username":"carol","message":"carol: third"}"#,
        ],
    );

    let texts: Vec<&str> = view
        .transcript()
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(texts, vec!["alice: first", "bobby: second", "carol: third"]);
}

#[test]
fn test_malformed_frame_between_good_frames_is_dropped_alone() {
    let mut view = ChatView::new();

    let dropped = feed(
        &mut view,
        &[
            r#"{"username":"alice","message":"alice: before"}"#,
            "{not json at all",
            r#"{"type":"connected-users","connectedUsers":["alice","bobby"]}"#,
            r#"{"username":"bobby","message":"bobby: after"}"#,
        ],
    );

    assert_eq!(dropped, 1);
    assert_eq!(view.transcript().len(), 2);
    assert_eq!(view.roster().as_slice(), ["alice".to_string(), "bobby".to_string()]);
}

#[test]
fn test_malformed_frame_alone_leaves_view_unchanged() {
    let mut view = ChatView::new();
    feed(
        &mut view,
        &[r#"{"type":"connected-users","connectedUsers":["alice"]}"#],
    );
    let before = view.clone();

    let dropped = feed(&mut view, &["<html>502 Bad Gateway</html>"]);

    assert_eq!(dropped, 1);
    assert_eq!(view, before);
}

#[test]
fn test_roster_push_is_full_replace() {
    let mut view = ChatView::new();

    feed(
        &mut view,
        &[
            r#"{"type":"connected-users","connectedUsers":["alice","bobby","carol"]}"#,
            r#"{"type":"connected-users","connectedUsers":["bobby"]}"#,
        ],
    );

    assert_eq!(view.roster().as_slice(), ["bobby".to_string()]);
}

#[test]
fn test_first_delimiter_split_through_full_pipeline() {
    let frame = decode_frame(r#"{"username":"alice","message":"alice: hello: world"}"#).unwrap();

    let event = match frame {
        InboundFrame::Chat(event) => event,
        other => panic!("expected chat event, got {other:?}"),
    };
    let rendered = interpret(&event, Some("bobby"));

    assert_eq!(rendered.kind, EventKind::Message);
    assert_eq!(rendered.speaker, "alice");
    assert_eq!(rendered.content, "hello: world");
    assert_eq!(rendered.alignment, Alignment::Remote);
}

#[test]
fn test_mixed_session_renders_notices_and_bubbles() {
    let mut view = ChatView::new();
    feed(
        &mut view,
        &[
            r#"{"username":"bobby","message":"bobby has joined the chat"}"#,
            r#"{"username":"bobby","message":"bobby: hi"}"#,
            r#"{"username":"alice","message":"alice: hey bobby"}"#,
            r#"{"username":"alice","message":"alice has left the chat"}"#,
        ],
    );

    let kinds: Vec<(EventKind, Alignment)> = view
        .transcript()
        .iter()
        .map(|e: &ChatEvent| {
            let r = interpret(e, Some("bobby"));
            (r.kind, r.alignment)
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            (EventKind::Joined, Alignment::Centered),
            (EventKind::Message, Alignment::Local),
            (EventKind::Message, Alignment::Remote),
            (EventKind::Left, Alignment::Centered),
        ]
    );
}
