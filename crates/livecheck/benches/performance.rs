use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use livecheck::testing::ScriptedClient;
use livecheck::{
    ContainerSize, CursorPosition, Diagnostic, DiagnosticBatch, Document, EditAction, EditorShell,
    QueryAnswer, Severity, diagnostics_for_file,
};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 48);
    for i in 0..line_count {
        out.push_str(&format!("theorem t{i:06} (n : ℕ) : n + 0 = n := by simp\n"));
    }
    out.pop();
    out
}

fn large_batch(files: usize, per_file: usize) -> DiagnosticBatch {
    let mut out = Vec::with_capacity(files * per_file);
    for f in 0..files {
        for line in 0..per_file {
            out.push(Diagnostic {
                file: format!("/src/file{f}.lean"),
                line: line as u32 + 1,
                column: 0,
                severity: Severity::Warning,
                caption: String::new(),
                text: "declaration uses 'sorry'".to_string(),
            });
        }
    }
    out.into()
}

fn bench_typing_with_listener(c: &mut Criterion) {
    let text = large_text(10_000);
    c.bench_function("document/100_inserts_full_text_listener", |b| {
        b.iter_batched(
            || {
                let mut doc = Document::create("/a.lean", &text);
                doc.on_change(|value| {
                    black_box(value.len());
                });
                doc
            },
            |mut doc| {
                let mut offset = doc.len_chars() / 2;
                for _ in 0..100 {
                    doc.insert(offset, "x");
                    offset += 1;
                }
                black_box(doc.version());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_diagnostics_filter(c: &mut Criterion) {
    let batch = large_batch(200, 50);
    c.bench_function("diagnostics/filter_10k", |b| {
        b.iter(|| {
            let mine = diagnostics_for_file(black_box(&batch), "/src/file123.lean");
            black_box(mine.len());
        })
    });
}

fn bench_cursor_churn(c: &mut Criterion) {
    let text = large_text(2_000);
    c.bench_function("shell/200_cursor_moves_then_answer", |b| {
        b.iter_batched(
            || {
                let mut shell = EditorShell::new("/a.lean", &text);
                shell.attach_client(ScriptedClient::new());
                shell.activate(ContainerSize::new(200, 50));
                shell
            },
            |mut shell| {
                for line in 1..=200 {
                    shell.edit(EditAction::MoveTo(CursorPosition::new(line, 5)));
                }
                if let Some(client) = shell.client_mut() {
                    for i in (0..200).rev() {
                        client.complete(i, QueryAnswer::with_state("⊢ n + 0 = n"));
                    }
                }
                shell.tick();
                black_box(shell.goal().is_some());
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_typing_with_listener,
    bench_diagnostics_filter,
    bench_cursor_churn
);
criterion_main!(benches);
