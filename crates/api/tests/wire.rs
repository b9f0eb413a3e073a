use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use sportmate_api::*;

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).expect("valid json")
}

#[test]
fn new_invitation_uses_backend_field_names() {
    let invitation = NewInvitation::new(
        "Sunday doubles",
        "Riverside courts",
        "tennis",
        "2025-06-01T09:00",
        "bring balls",
    );

    let value = parse(&serde_json::to_string(&invitation).expect("serialize"));

    assert_eq!(
        value,
        json!({
            "Name": "Sunday doubles",
            "Place": "Riverside courts",
            "sp_type": "tennis",
            "DateTime": "2025-06-01T09:00",
            "Other": "bring balls",
        })
    );
}

#[test]
fn invitation_decodes_with_missing_note() {
    let raw = r#"{
        "i_id": 31,
        "u_id": 4,
        "Name": "Morning run",
        "Place": "North park gate",
        "sp_type": "running",
        "DateTime": "2025-05-03T06:30"
    }"#;

    let invitation: Invitation = serde_json::from_str(raw).expect("deserialize");

    assert_eq!(invitation.id, InvitationId::new(31));
    assert_eq!(invitation.owner_id, UserId::new(4));
    assert_eq!(invitation.sport_type, "running");
    assert!(invitation.note.is_empty());
}

#[test]
fn message_batch_decodes_text_and_service_entries() {
    let raw = r#"[
        {"id": 5, "sender": {"id": 1, "name": "Mei"}, "createdAt": 1717000000000, "type": "invite_created"},
        {"id": 6, "sender": {"id": 2, "name": "Tom"}, "createdAt": 1717000005000, "type": "user_joined"},
        {"id": 7, "sender": {"id": 2, "name": "Tom"}, "createdAt": 1717000009000, "type": "text", "content": "on my way"}
    ]"#;

    let messages: Vec<Message> = serde_json::from_str(raw).expect("deserialize");

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].display_text(), "Mei created the invitation");
    assert_eq!(messages[1].display_text(), "Tom joined the chat");
    assert_eq!(messages[2].display_text(), "on my way");
    assert!(messages[1].kind.is_service());
    assert!(messages[2].is_own(UserId::new(2)));
    assert_eq!(
        messages[1].created_at,
        Utc.timestamp_millis_opt(1_717_000_005_000).unwrap()
    );
}

#[test]
fn unknown_message_type_falls_back_to_content() {
    let raw = r#"{"id": 9, "sender": {"id": 3, "name": "Ada"}, "createdAt": 0, "type": "poll_closed", "content": "poll closed"}"#;

    let message: Message = serde_json::from_str(raw).expect("deserialize");

    assert_eq!(message.kind, MessageKind::Unknown);
    assert_eq!(message.display_text(), "poll closed");
}

#[test]
fn message_without_type_is_text() {
    let raw = r#"{"id": 10, "sender": {"id": 3, "name": "Ada"}, "createdAt": 0, "content": "hi"}"#;

    let message: Message = serde_json::from_str(raw).expect("deserialize");

    assert_eq!(message.kind, MessageKind::Text);
    let value = parse(&serde_json::to_string(&message).expect("serialize"));
    assert_eq!(value["type"], "text");
    assert_eq!(value["createdAt"], 0);
}

#[test]
fn post_body_is_a_bare_content_object() {
    let body = NewMessage {
        content: "see you at 7".to_string(),
    };

    let value = parse(&serde_json::to_string(&body).expect("serialize"));

    assert_eq!(value, json!({ "content": "see you at 7" }));
}
