use super::*;
use crate::letter::Chunk;

fn quiet_config() -> TracerConfig {
    let mut config = TracerConfig::default();
    config.guidance.enabled = false;
    config
}

fn three_strokes() -> LetterDefinition {
    LetterDefinition::new(
        "three",
        vec![
            Chunk::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
            Chunk::new(vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)]),
            Chunk::new(vec![Point::new(0.0, 10.0), Point::new(10.0, 10.0)]),
        ],
    )
}

/// Points every `step` units along `path`, first point included.
fn walk(path: &[Point], step: f32) -> Vec<Point> {
    let mut out = vec![path[0]];
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let len = crate::geometry::distance(from, to);
        let dir = crate::geometry::normalize(to - from);
        let mut cursor = step;
        while cursor <= len + 1e-3 {
            out.push(from.offset(dir, cursor.min(len)));
            cursor += step;
        }
    }
    out
}

fn collect(events: &mut Vec<SessionEvent>, output: SessionOutput) {
    events.extend(output.events.iter().copied());
}

/// Traces `fraction` of the active chunk along its centerline, then lifts.
fn trace_active(session: &mut TracingSession, now_ms: &mut u64, fraction: f32) -> Vec<SessionEvent> {
    let path = session.active_chunk().expect("active chunk").to_vec();
    let samples = walk(&path, 1.0);
    let keep = ((samples.len() as f32) * fraction).ceil() as usize;

    let mut events = Vec::new();
    *now_ms += 16;
    collect(&mut events, session.pointer_down(*now_ms, samples[0]));
    for point in samples.iter().take(keep) {
        *now_ms += 16;
        collect(&mut events, session.pointer_move(*now_ms, *point));
    }
    *now_ms += 16;
    collect(&mut events, session.pointer_up(*now_ms));
    events
}

#[test]
fn load_without_guidance_waits_for_input_on_chunk_zero() {
    let mut session = TracingSession::new(quiet_config());
    assert_eq!(session.phase(), ChunkPhase::Idle);
    assert!(session.active_segments().is_empty());

    let output = session.load_letter(0, three_strokes()).expect("letter loads");
    assert!(output.is_empty());
    assert_eq!(session.phase(), ChunkPhase::AwaitingInput);
    assert_eq!(session.state().chunk_index(), 0);
    // 10 design units at scale 10 -> 100 units -> 20 segments.
    assert_eq!(session.active_segments().len(), 20);
    assert_eq!(session.segment_state(0), Some(SegmentState::Pending));
}

#[test]
fn completes_chunk_zero_fails_chunk_one_twice_then_advances() {
    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let mut now = 0u64;
    let mut indices = vec![session.state().chunk_index()];

    let events = trace_active(&mut session, &mut now, 1.0);
    assert!(events.contains(&SessionEvent::ChunkAdvanced {
        completed_chunk: 0,
        next_chunk: 1
    }));
    indices.push(session.state().chunk_index());

    for _ in 0..2 {
        let events = trace_active(&mut session, &mut now, 0.5);
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::ChunkRetry { chunk_index: 1, .. })));
        assert_eq!(session.phase(), ChunkPhase::AwaitingInput);
        assert_eq!(session.snapshot().completed_segments, 0);
        indices.push(session.state().chunk_index());
    }
    assert_eq!(session.state().attempts(), 2);

    trace_active(&mut session, &mut now, 1.0);
    indices.push(session.state().chunk_index());

    assert_eq!(indices, vec![0, 1, 1, 1, 2]);
    assert_eq!(
        session.state().completed_chunks().iter().copied().collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert_eq!(session.state().attempts(), 0);
}

#[test]
fn retry_keeps_the_same_segment_set() {
    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let before: Vec<_> = session.active_segments().iter().map(|s| s.start).collect();
    let mut now = 0;
    trace_active(&mut session, &mut now, 0.3);
    let after: Vec<_> = session.active_segments().iter().map(|s| s.start).collect();
    assert_eq!(before, after);
    assert!(session.active_segments().iter().all(|s| !s.completed));
    assert!(session.state().hits_per_segment().iter().all(|&h| h == 0));
}

fn ten_slice_letter() -> LetterDefinition {
    LetterDefinition::new(
        "bar",
        vec![Chunk::new(vec![Point::new(0.0, 0.0), Point::new(30.0, 0.0)])],
    )
}

fn nine_of_ten(threshold: f32) -> Vec<SessionEvent> {
    let mut config = quiet_config();
    config.segments.length = 30.0;
    config.tracking.success_threshold = threshold;
    let mut session = TracingSession::new(config);
    session.load_letter(0, ten_slice_letter()).expect("letter loads");
    assert_eq!(session.active_segments().len(), 10);

    let centers: Vec<Point> = session.active_segments().iter().map(|s| s.midpoint()).collect();
    let mut events = Vec::new();
    collect(&mut events, session.pointer_down(1, centers[0]));
    for center in centers.iter().take(9) {
        for _ in 0..5 {
            collect(&mut events, session.pointer_move(2, *center));
        }
    }
    collect(&mut events, session.pointer_up(3));
    events
}

#[test]
fn ninety_percent_advances_at_threshold_ninety() {
    let events = nine_of_ten(90.0);
    assert!(events.contains(&SessionEvent::ChunkEvaluated {
        chunk_index: 0,
        completion_rate: 90.0
    }));
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::ChunkAdvanced { completed_chunk: 0, .. })));
}

#[test]
fn ninety_percent_retries_at_threshold_ninety_five() {
    let events = nine_of_ten(95.0);
    assert!(events.contains(&SessionEvent::ChunkRetry {
        chunk_index: 0,
        completion_rate: 90.0
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::ChunkAdvanced { .. })));
}

#[test]
fn invalid_start_resets_and_stays_on_chunk() {
    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let start = session.active_chunk().expect("chunk")[0];

    let output = session.pointer_down(5, Point::new(start.x, start.y + 50.0));
    assert_eq!(
        output.events.as_slice(),
        &[SessionEvent::InvalidStart { chunk_index: 0 }]
    );
    assert_eq!(session.phase(), ChunkPhase::AwaitingInput);
    assert!(session.state().drawn_points().is_empty());
    assert!(session.pointer_move(6, start).is_empty());
    assert!(session.pointer_up(7).is_empty());
    assert!(session.state().hits_per_segment().iter().all(|&h| h == 0));
}

#[test]
fn off_path_jump_clears_progress_and_ignores_the_rest_of_the_gesture() {
    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let path = session.active_chunk().expect("chunk").to_vec();
    let samples = walk(&path, 1.0);

    session.pointer_down(0, samples[0]);
    for point in samples.iter().take(samples.len() / 2) {
        session.pointer_move(1, *point);
    }
    assert!(session.snapshot().completed_segments > 0);

    let jump = Point::new(path[0].x + 50.0, path[0].y + 200.0);
    let output = session.pointer_move(2, jump);
    assert!(matches!(
        output.events.as_slice(),
        [SessionEvent::OffPath { chunk_index: 0, .. }]
    ));
    assert_eq!(session.snapshot().completed_segments, 0);
    assert!(session.active_segments().iter().all(|s| !s.completed));
    assert_eq!(session.phase(), ChunkPhase::AwaitingInput);

    assert!(session.pointer_move(3, samples[1]).is_empty());
    assert!(session.pointer_up(4).is_empty());
    assert_eq!(session.state().chunk_index(), 0);
}

#[test]
fn progress_reports_completed_over_total() {
    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let events = trace_active(&mut session, &mut 0, 1.0);
    let last_progress = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Progress {
                completed, total, ..
            } => Some((*completed, *total)),
            _ => None,
        })
        .last();
    assert_eq!(last_progress, Some((20, 20)));
}

#[test]
fn finishing_the_last_chunk_completes_the_letter() {
    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let mut now = 0;
    trace_active(&mut session, &mut now, 1.0);
    trace_active(&mut session, &mut now, 1.0);
    let events = trace_active(&mut session, &mut now, 1.0);

    assert!(events.contains(&SessionEvent::ChunkAdvanced {
        completed_chunk: 2,
        next_chunk: 3
    }));
    assert_eq!(
        events.last(),
        Some(&SessionEvent::LetterComplete { letter_index: 0 })
    );
    assert_eq!(session.phase(), ChunkPhase::LetterComplete);
    assert!(session.active_segments().is_empty());
    assert!(session.active_chunk().is_none());
    assert!(session.pointer_down(now + 1, Point::new(0.0, 0.0)).is_empty());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.completed_chunks, vec![0, 1, 2]);
    assert_eq!(snapshot.chunk_index, snapshot.chunk_count);

    session.load_letter(now + 2, three_strokes()).expect("reload");
    assert_eq!(session.state().letter_index(), 1);
    assert_eq!(session.state().chunk_index(), 0);
    assert!(session.state().completed_chunks().is_empty());
}

#[test]
fn malformed_letters_are_rejected_without_touching_the_session() {
    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let mut now = 0;
    trace_active(&mut session, &mut now, 1.0);

    let empty = LetterDefinition::new("empty", Vec::new());
    assert!(matches!(
        session.load_letter(now, empty),
        Err(LetterError::NoChunks { .. })
    ));

    let dotted = LetterDefinition::new(
        "dotted",
        vec![
            Chunk::new(vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)]),
            Chunk::new(vec![Point::new(2.0, 2.0)]),
        ],
    );
    assert!(matches!(
        session.load_letter(now, dotted),
        Err(LetterError::DegenerateChunk { chunk: 1, points: 1, .. })
    ));

    assert_eq!(session.state().chunk_index(), 1);
    assert_eq!(session.letter().map(|l| l.name.as_str()), Some("three"));
}

#[test]
fn input_is_held_back_until_the_demonstration_finishes() {
    let mut session = TracingSession::new(TracerConfig::default());
    let output = session.load_letter(1_000, three_strokes()).expect("letter loads");
    let token = match output.events.as_slice() {
        [SessionEvent::DemonstrationStarted { token }] => *token,
        other => panic!("unexpected events {other:?}"),
    };
    assert_eq!(token.chunk_index, 0);
    assert_eq!(session.phase(), ChunkPhase::Demonstrating);

    let start = session.active_chunk().expect("chunk")[0];
    assert!(session.pointer_down(1_010, start).is_empty());
    assert!(session.pointer_move(1_020, start).is_empty());
    assert!(session.state().hits_per_segment().iter().all(|&h| h == 0));

    let running = session.tick(1_100);
    assert!(running.is_empty());
    let frame = session.guidance_frame().expect("frame");
    assert!(frame.hand.is_some());
    assert_eq!(frame.dots.len(), 3);

    let done = session.tick(60_000);
    assert_eq!(
        done.events.as_slice(),
        &[SessionEvent::DemonstrationFinished { token }]
    );
    assert_eq!(session.phase(), ChunkPhase::AwaitingInput);
    assert!(session
        .guidance_frame()
        .and_then(|frame| frame.arrow)
        .is_some());

    let output = session.pointer_down(60_010, start);
    assert_eq!(
        output.events.as_slice(),
        &[SessionEvent::GestureStarted { chunk_index: 0 }]
    );
}

#[test]
fn advancing_starts_a_new_demonstration_and_stales_the_old_token() {
    let mut session = TracingSession::new(TracerConfig::default());
    let output = session.load_letter(0, three_strokes()).expect("letter loads");
    let first = match output.events.as_slice() {
        [SessionEvent::DemonstrationStarted { token }] => *token,
        other => panic!("unexpected events {other:?}"),
    };
    session.tick(60_000);
    let mut now = 60_000;
    let events = trace_active(&mut session, &mut now, 1.0);

    let second = events
        .iter()
        .find_map(|e| match e {
            SessionEvent::DemonstrationStarted { token } => Some(*token),
            _ => None,
        })
        .expect("next chunk demonstration");
    assert_eq!(second.chunk_index, 1);
    assert!(!session.is_current(first));
    assert!(session.is_current(second));
    assert_eq!(session.phase(), ChunkPhase::Demonstrating);
}

#[test]
fn loading_over_a_running_demonstration_reports_the_cancel() {
    let mut session = TracingSession::new(TracerConfig::default());
    let output = session.load_letter(0, three_strokes()).expect("letter loads");
    let first = match output.events.as_slice() {
        [SessionEvent::DemonstrationStarted { token }] => *token,
        other => panic!("unexpected events {other:?}"),
    };

    let output = session
        .load_letter(10, ten_slice_letter())
        .expect("second letter loads");
    let (cancelled, started) = match output.events.as_slice() {
        [SessionEvent::DemonstrationCancelled { token: cancelled }, SessionEvent::DemonstrationStarted { token: started }] => {
            (*cancelled, *started)
        }
        other => panic!("unexpected events {other:?}"),
    };
    assert_eq!(cancelled, first);
    assert!(session.is_current(started));
    assert!(!session.is_current(first));

    // A finished demonstration has nothing left to cancel.
    session.tick(60_000);
    let output = session.load_letter(60_010, three_strokes()).expect("third letter loads");
    assert!(matches!(
        output.events.as_slice(),
        [SessionEvent::DemonstrationStarted { .. }]
    ));
}

#[test]
fn skip_cancels_the_demonstration() {
    let mut session = TracingSession::new(TracerConfig::default());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let output = session.skip_demonstration(10);
    assert!(matches!(
        output.events.as_slice(),
        [SessionEvent::DemonstrationCancelled { .. }]
    ));
    assert_eq!(session.phase(), ChunkPhase::AwaitingInput);
    assert!(session.guidance_frame().is_none());
}

#[test]
fn interruptible_demonstration_hands_over_to_the_gesture() {
    let mut config = TracerConfig::default();
    config.guidance.interruptible = true;
    let mut session = TracingSession::new(config);
    session.load_letter(0, three_strokes()).expect("letter loads");
    let start = session.active_chunk().expect("chunk")[0];

    let output = session.pointer_down(20, start);
    assert!(matches!(
        output.events.as_slice(),
        [
            SessionEvent::DemonstrationCancelled { .. },
            SessionEvent::GestureStarted { chunk_index: 0 }
        ]
    ));
    assert_eq!(session.phase(), ChunkPhase::Tracking);
}

#[test]
fn inactivity_replays_the_demonstration() {
    let mut config = TracerConfig::default();
    config.guidance.inactivity_ms = 3_000;
    let mut session = TracingSession::new(config);
    session.load_letter(0, three_strokes()).expect("letter loads");
    session.tick(10_000);
    assert_eq!(session.phase(), ChunkPhase::AwaitingInput);

    assert!(session.tick(12_999).is_empty());
    let output = session.tick(13_000);
    assert!(matches!(
        output.events.as_slice(),
        [SessionEvent::DemonstrationStarted { token }] if token.chunk_index == 0
    ));
    assert_eq!(session.phase(), ChunkPhase::Demonstrating);
}

#[test]
fn listener_receives_advance_retry_and_completion() {
    #[derive(Default)]
    struct Recorder {
        advanced: Vec<usize>,
        retried: Vec<usize>,
        completed: Vec<usize>,
    }

    impl TracingListener for Recorder {
        fn on_chunk_advance(&mut self, new_chunk_index: usize) {
            self.advanced.push(new_chunk_index);
        }

        fn on_chunk_retry(&mut self, chunk_index: usize, _completion_rate: f32) {
            self.retried.push(chunk_index);
        }

        fn on_letter_complete(&mut self, letter_index: usize) {
            self.completed.push(letter_index);
        }
    }

    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let mut recorder = Recorder::default();
    let mut now = 0;
    for fraction in [1.0, 0.4, 1.0, 1.0] {
        let path = session.active_chunk().expect("chunk").to_vec();
        let samples = walk(&path, 1.0);
        let keep = ((samples.len() as f32) * fraction).ceil() as usize;
        now += 1;
        session.pointer_down(now, samples[0]).dispatch(&mut recorder);
        for point in samples.iter().take(keep) {
            session.pointer_move(now, *point).dispatch(&mut recorder);
        }
        session.pointer_up(now).dispatch(&mut recorder);
    }

    assert_eq!(recorder.advanced, vec![1, 2, 3]);
    assert_eq!(recorder.retried, vec![1]);
    assert_eq!(recorder.completed, vec![0]);
}

#[test]
fn boundary_rails_flank_the_active_chunk() {
    let mut session = TracingSession::new(quiet_config());
    session.load_letter(0, three_strokes()).expect("letter loads");
    let path = session.active_chunk().expect("chunk").to_vec();
    let (outer, inner) = session.boundary_rails(10.0).expect("rails");
    assert_eq!(outer.len(), path.len());
    assert!((outer[0].y - (path[0].y + 10.0)).abs() < 1e-3);
    assert!((inner[0].y - (path[0].y - 10.0)).abs() < 1e-3);
}
