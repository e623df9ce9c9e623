use livecheck::testing::ScriptedClient;
use livecheck::{CursorPosition, PointInfoView, QueryAnswer, QueryError};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[test]
fn test_cursor_change_queries_zero_based_column() {
    let mut client = ScriptedClient::new();
    let mut view = PointInfoView::new("/a.lean");

    view.cursor_changed(&mut client, CursorPosition::new(4, 8));

    let q = &client.queries()[0];
    assert_eq!(q.file, "/a.lean");
    assert_eq!((q.line, q.column), (4, 7));
    assert_eq!(view.latest_position(), Some(CursorPosition::new(4, 8)));
    assert_eq!(view.pending_count(), 1);
}

#[test]
fn test_late_answer_for_superseded_position_is_discarded() {
    let mut client = ScriptedClient::new();
    let mut view = PointInfoView::new("/a.lean");
    let p1 = CursorPosition::new(1, 1);
    let p2 = CursorPosition::new(2, 3);

    view.cursor_changed(&mut client, p1);
    view.cursor_changed(&mut client, p2);

    // P2 answers first, then P1 straggles in.
    client.complete(1, QueryAnswer::with_state("⊢ q"));
    assert!(view.poll());
    client.complete(0, QueryAnswer::with_state("⊢ p"));
    assert!(!view.poll());

    let goal = view.displayed().expect("goal for p2");
    assert_eq!(goal.position, p2);
    assert_eq!(goal.state, "⊢ q");
    assert_eq!(goal.header(), "goal at 2:2");
    assert_eq!(view.pending_count(), 0);
}

#[test]
fn test_stale_answer_never_shows_while_latest_is_pending() {
    let mut client = ScriptedClient::new();
    let mut view = PointInfoView::new("/a.lean");

    view.cursor_changed(&mut client, CursorPosition::new(1, 1));
    view.cursor_changed(&mut client, CursorPosition::new(1, 2));
    client.complete(0, QueryAnswer::with_state("⊢ stale"));

    assert!(!view.poll());
    assert_eq!(view.displayed(), None);
    assert_eq!(view.pending_count(), 1);
}

#[test]
fn test_absent_answer_clears_the_panel() {
    let mut client = ScriptedClient::new();
    let mut view = PointInfoView::new("/a.lean");

    view.cursor_changed(&mut client, CursorPosition::new(3, 1));
    client.complete(0, QueryAnswer::with_state("⊢ p"));
    assert!(view.poll());
    assert!(view.displayed().is_some());

    view.cursor_changed(&mut client, CursorPosition::new(5, 1));
    client.complete(1, QueryAnswer::absent());
    assert!(view.poll());
    assert_eq!(view.displayed(), None);
}

#[test]
fn test_p1_late_with_absent_p2_stays_empty() {
    let mut client = ScriptedClient::new();
    let mut view = PointInfoView::new("/a.lean");

    view.cursor_changed(&mut client, CursorPosition::new(1, 1));
    view.cursor_changed(&mut client, CursorPosition::new(9, 1));
    client.complete(1, QueryAnswer::absent());
    client.complete(0, QueryAnswer::with_state("⊢ p"));

    assert!(!view.poll());
    assert_eq!(view.displayed(), None);
}

#[test]
fn test_failure_keeps_previous_goal() {
    let mut client = ScriptedClient::new();
    let mut view = PointInfoView::new("/a.lean");
    let p1 = CursorPosition::new(1, 5);

    view.cursor_changed(&mut client, p1);
    client.complete(0, QueryAnswer::with_state("⊢ p"));
    view.poll();

    view.cursor_changed(&mut client, CursorPosition::new(2, 1));
    client.fail(
        1,
        QueryError::Server {
            code: -32801,
            message: "content modified".to_string(),
        },
    );
    assert!(!view.poll());
    assert_eq!(view.displayed().map(|g| g.position), Some(p1));
}

#[test]
fn test_returning_to_an_earlier_position_accepts_its_answer() {
    let mut client = ScriptedClient::new();
    let mut view = PointInfoView::new("/a.lean");
    let p1 = CursorPosition::new(1, 1);

    view.cursor_changed(&mut client, p1);
    view.cursor_changed(&mut client, CursorPosition::new(1, 2));
    view.cursor_changed(&mut client, p1);

    client.complete(0, QueryAnswer::with_state("⊢ p"));
    assert!(view.poll());
    assert_eq!(view.displayed().map(|g| g.state.as_str()), Some("⊢ p"));
}

#[test]
fn test_state_text_is_kept_verbatim() {
    let mut client = ScriptedClient::new();
    let mut view = PointInfoView::new("/a.lean");
    let state = "m n : ℕ\n⊢   m + n = n + m\n\n  trailing  ";

    view.cursor_changed(&mut client, CursorPosition::new(4, 3));
    client.complete(0, QueryAnswer::with_state(state));
    view.poll();

    assert_eq!(view.displayed().unwrap().state, state);
}

#[test]
fn test_random_completion_order_shows_only_latest() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..50 {
        let mut client = ScriptedClient::new();
        let mut view = PointInfoView::new("/a.lean");
        let moves = 2 + round % 7;

        for i in 0..moves {
            view.cursor_changed(&mut client, CursorPosition::new(1, i as u32 + 1));
        }
        let latest = moves - 1;

        let mut order: Vec<usize> = (0..moves).collect();
        order.shuffle(&mut rng);

        for index in order {
            client.complete(index, QueryAnswer::with_state(format!("state {index}")));
            view.poll();

            match view.displayed() {
                None => assert!(client.queries()[latest].is_pending()),
                Some(goal) => {
                    assert_eq!(goal.position, CursorPosition::new(1, latest as u32 + 1));
                    assert_eq!(goal.state, format!("state {latest}"));
                }
            }
        }

        assert_eq!(
            view.displayed().map(|g| g.state.clone()),
            Some(format!("state {latest}"))
        );
    }
}
