use criterion::{Criterion, black_box, criterion_group, criterion_main};

use wingmate::chat::{ChatMessage, ChatRole, build_context};

fn history(turns: usize, chars_per_turn: usize) -> Vec<ChatMessage> {
    (0..turns)
        .map(|i| {
            let role = if i % 2 == 0 {
                ChatRole::User
            } else {
                ChatRole::Assistant
            };
            ChatMessage::new("bench", role, "x".repeat(chars_per_turn), None)
        })
        .collect()
}

fn bench_build_context(c: &mut Criterion) {
    let short_history = history(10, 50);
    let long_history = history(100, 50);
    let oversized_turns = history(10, 2000);

    c.bench_function("build_context_short_history", |b| {
        b.iter(|| build_context(black_box(&short_history), black_box("how do I jibe?")))
    });

    c.bench_function("build_context_long_history", |b| {
        b.iter(|| build_context(black_box(&long_history), black_box("how do I jibe?")))
    });

    c.bench_function("build_context_truncating_turns", |b| {
        b.iter(|| build_context(black_box(&oversized_turns), black_box("how do I jibe?")))
    });
}

criterion_group!(benches, bench_build_context);
criterion_main!(benches);
