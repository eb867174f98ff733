use wingmate::chat::{
    ChatMessage, ChatRole, MAX_HISTORY_TURNS, MAX_TURN_CHARS, TRUNCATION_MARKER, build_context,
};

fn history_of(count: usize, content: &str) -> Vec<ChatMessage> {
    (0..count)
        .map(|i| {
            let role = if i % 2 == 0 {
                ChatRole::User
            } else {
                ChatRole::Assistant
            };
            ChatMessage::new("widget-1", role, content, None)
        })
        .collect()
}

#[test]
fn context_length_is_min_of_history_and_limit() {
    for n in [0usize, 1, 5, 9, 10, 11, 25, 100] {
        let history = history_of(n, "turn");
        let ctx = build_context(&history, "m");
        assert_eq!(
            ctx.ordered_turns.len(),
            n.min(MAX_HISTORY_TURNS),
            "history of {} turns",
            n
        );
    }
}

#[test]
fn retained_turns_are_the_most_recent() {
    let history: Vec<ChatMessage> = (0..30)
        .map(|i| ChatMessage::new("widget-1", ChatRole::User, format!("turn {}", i), None))
        .collect();
    let ctx = build_context(&history, "m");

    let contents: Vec<&str> = ctx.ordered_turns.iter().map(|t| t.content.as_str()).collect();
    let expected: Vec<String> = (20..30).map(|i| format!("turn {}", i)).collect();
    assert_eq!(contents, expected);
}

#[test]
fn content_at_or_under_budget_is_unchanged() {
    for len in [0usize, 1, 50, 199, 200] {
        let content = "a".repeat(len);
        let history = vec![ChatMessage::new("c", ChatRole::User, &content, None)];
        let ctx = build_context(&history, "");
        assert_eq!(ctx.ordered_turns[0].content, content, "length {}", len);
    }
}

#[test]
fn content_over_budget_is_cut_to_203_chars() {
    for len in [201usize, 250, 10_000] {
        let content = "b".repeat(len);
        let history = vec![ChatMessage::new("c", ChatRole::User, &content, None)];
        let ctx = build_context(&history, "");

        let trimmed = &ctx.ordered_turns[0].content;
        assert_eq!(trimmed.len(), MAX_TURN_CHARS + TRUNCATION_MARKER.len());
        assert!(trimmed.ends_with(TRUNCATION_MARKER));
        // The kept part is a prefix of the original
        assert_eq!(&trimmed[..MAX_TURN_CHARS], &content[..MAX_TURN_CHARS]);
    }
}

#[test]
fn twelve_alternating_short_turns_pass_through() {
    let content = "x".repeat(50);
    let history = history_of(12, &content);
    let ctx = build_context(&history, "hello");

    assert_eq!(ctx.ordered_turns.len(), 10);
    assert!(ctx.ordered_turns.iter().all(|t| t.content == content));
}

#[test]
fn empty_inputs_signal_greeting() {
    let ctx = build_context(&[], "");
    assert!(ctx.ordered_turns.is_empty());
    assert_eq!(ctx.pending_user_message, "");
    assert!(ctx.is_greeting_request());

    // Either one being non-empty means it is not a greeting
    assert!(!build_context(&[], "hi").is_greeting_request());
    let history = history_of(1, "hi");
    assert!(!build_context(&history, "").is_greeting_request());
}

#[test]
fn builder_has_no_side_effects() {
    let content = "c".repeat(500);
    let history = history_of(12, &content);
    let before: Vec<String> = history.iter().map(|m| m.content.clone()).collect();

    let _ = build_context(&history, "m");
    let _ = build_context(&history, "m");

    let after: Vec<String> = history.iter().map(|m| m.content.clone()).collect();
    assert_eq!(before, after);
}
