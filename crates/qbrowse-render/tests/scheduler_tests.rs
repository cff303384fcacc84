use std::cell::RefCell;
use std::rc::Rc;

use tokio::task::LocalSet;

use qbrowse_core::corpus::CorpusIndexer;
use qbrowse_core::types::{DocId, Document, RawRecord, TagFrequency};
use qbrowse_render::{JobState, RecordingSurface, RenderEvent, RenderScheduler, SurfaceOp};

fn docs(prefix: &str, n: usize) -> Vec<Document> {
    let records: Vec<RawRecord> = (0..n)
        .map(|i| RawRecord::new(&format!("{}_{:04}.JPG", prefix, i), "t.JPG", [("TAG", "v")]))
        .collect();
    CorpusIndexer::new().build(&records).documents
}

fn ids(docs: &[Document]) -> Vec<DocId> { docs.iter().map(|d| d.id).collect() }

fn scheduler(chunk_size: usize) -> (Rc<RefCell<RecordingSurface>>, RenderScheduler<RecordingSurface>) {
    let surface = Rc::new(RefCell::new(RecordingSurface::new()));
    let scheduler = RenderScheduler::new(surface.clone(), chunk_size);
    (surface, scheduler)
}

#[tokio::test]
async fn forty_five_results_in_chunks_of_twenty() {
    LocalSet::new().run_until(async {
        let (surface, scheduler) = scheduler(20);
        let results = docs("IMG", 45);
        let handle = scheduler.start(results.clone(), "dog");
        let events = handle.collect().await;

        assert_eq!(events.len(), 4, "one preview plus three chunks");
        assert_eq!(events[0], RenderEvent::Preview(results[0].clone()));
        let chunks: Vec<_> = events[1..].iter().map(|e| match e {
            RenderEvent::Chunk(p) => p.clone(),
            other => panic!("unexpected event {:?}", other),
        }).collect();
        let sizes: Vec<usize> = chunks.iter().map(|c| c.rendered.len()).collect();
        assert_eq!(sizes, vec![20, 20, 5]);
        let cursors: Vec<usize> = chunks.iter().map(|c| c.cursor).collect();
        assert_eq!(cursors, vec![20, 40, 45]);
        assert!(chunks.iter().all(|c| c.total == 45));
        assert_eq!(chunks.iter().map(|c| c.done).collect::<Vec<_>>(), vec![false, false, true]);

        let s = surface.borrow();
        assert_eq!(s.appended(), ids(&results), "chunks render in result order");
        assert_eq!(s.ops[0], SurfaceOp::Status("working".into()));
        assert_eq!(s.ops[1], SurfaceOp::Detail(results[0].id));
        assert_eq!(s.ops[2], SurfaceOp::Clear);
        let statuses: Vec<&str> = s.ops.iter().filter_map(|op| match op { SurfaceOp::Status(t) => Some(t.as_str()), _ => None }).collect();
        assert_eq!(statuses, vec!["working", "20 of 45 for dog", "40 of 45 for dog", "45 for dog"]);
    }).await;
}

#[tokio::test]
async fn preview_is_synchronous_and_chunks_are_deferred() {
    LocalSet::new().run_until(async {
        let (surface, scheduler) = scheduler(20);
        let results = docs("IMG", 30);
        let mut handle = scheduler.start(results.clone(), "cat");

        assert_eq!(handle.state(), JobState::Running);
        assert_eq!(handle.try_next(), Some(RenderEvent::Preview(results[0].clone())));
        assert_eq!(handle.try_next(), None, "no chunk before yielding to the event loop");
        assert!(surface.borrow().appended().is_empty());

        while handle.next_event().await.is_some() {}
        assert_eq!(handle.state(), JobState::Done);
        assert_eq!(surface.borrow().appended().len(), 30);
    }).await;
}

#[tokio::test]
async fn exact_multiple_and_single_result() {
    LocalSet::new().run_until(async {
        let (_surface, scheduler) = scheduler(20);
        let events = scheduler.start(docs("A", 40), "a").collect().await;
        assert_eq!(events.len(), 3);
        match &events[2] {
            RenderEvent::Chunk(p) => assert!(p.done && p.cursor == 40 && p.rendered.len() == 20),
            other => panic!("unexpected event {:?}", other),
        }

        let events = scheduler.start(docs("B", 1), "b").collect().await;
        assert_eq!(events.len(), 2);
        match &events[1] {
            RenderEvent::Chunk(p) => assert!(p.done && p.total == 1),
            other => panic!("unexpected event {:?}", other),
        }
    }).await;
}

#[tokio::test]
async fn empty_results_show_the_tag_list() {
    LocalSet::new().run_until(async {
        let (surface, scheduler) = scheduler(20);
        let scheduler = scheduler.with_fallback(vec![
            TagFrequency { tag: "DOG".into(), count: 3 },
            TagFrequency { tag: "CAT".into(), count: 1 },
        ]);
        let handle = scheduler.start(Vec::new(), "zebra");
        assert_eq!(handle.state(), JobState::Done);
        assert_eq!(handle.collect().await, vec![RenderEvent::Fallback]);

        let s = surface.borrow();
        assert!(s.ops.contains(&SurfaceOp::WordList(vec!["DOG".into(), "CAT".into()])));
        assert!(!s.ops.iter().any(|op| matches!(op, SurfaceOp::Detail(_) | SurfaceOp::Append(_))));
    }).await;
}

#[tokio::test]
async fn back_to_back_start_drops_the_first_job() {
    LocalSet::new().run_until(async {
        let (surface, scheduler) = scheduler(20);
        let first = docs("OLD", 45);
        let second = docs("NEW", 25);
        let a = scheduler.start(first.clone(), "old");
        let b = scheduler.start(second.clone(), "new");
        assert!(b.generation() > a.generation());

        let b_events = b.collect().await;
        let a_events = a.collect().await;
        assert_eq!(a_events, vec![RenderEvent::Preview(first[0].clone())]);
        assert_eq!(b_events.len(), 3);

        assert_eq!(surface.borrow().appended(), ids(&second));
        assert_eq!(surface.borrow().last_status(), Some("25 for new"));
    }).await;
}

#[tokio::test]
async fn superseding_mid_flight_never_interleaves() {
    LocalSet::new().run_until(async {
        let (surface, scheduler) = scheduler(1);
        let first = docs("OLD", 2000);
        let second = docs("NEW", 3);

        let mut a = scheduler.start(first.clone(), "old");
        assert!(matches!(a.next_event().await, Some(RenderEvent::Preview(_))));
        assert!(matches!(a.next_event().await, Some(RenderEvent::Chunk(_))));

        let cut = surface.borrow().ops.len();
        let b = scheduler.start(second.clone(), "new");
        b.collect().await;
        let a_rest = a.collect().await;
        let a_chunks = 1 + a_rest.iter().filter(|e| matches!(e, RenderEvent::Chunk(_))).count();

        let s = surface.borrow();
        let after: Vec<DocId> = s.ops[cut..].iter().filter_map(|op| match op { SurfaceOp::Append(v) => Some(v.clone()), _ => None }).flatten().collect();
        assert_eq!(after, ids(&second), "only the new job renders after it starts");
        assert_eq!(s.appended().len(), a_chunks + second.len());
        assert!(a_chunks < first.len());
    }).await;
}

#[tokio::test]
async fn cancel_stops_pending_chunks() {
    LocalSet::new().run_until(async {
        let (surface, scheduler) = scheduler(20);
        let mut handle = scheduler.start(docs("IMG", 45), "dog");
        scheduler.cancel();
        let mut events = Vec::new();
        while let Some(ev) = handle.next_event().await { events.push(ev); }
        assert_eq!(events.len(), 1);
        assert_eq!(handle.state(), JobState::Superseded);
        assert!(surface.borrow().appended().is_empty());
    }).await;
}

#[tokio::test]
async fn scheduler_state_goes_idle_running_done() {
    LocalSet::new().run_until(async {
        let (_surface, scheduler) = scheduler(20);
        assert_eq!(scheduler.state(), JobState::Idle);

        let handle = scheduler.start(docs("IMG", 45), "dog");
        assert_eq!(scheduler.state(), JobState::Running);
        handle.collect().await;
        assert_eq!(scheduler.state(), JobState::Done);

        scheduler.start(Vec::new(), "zebra");
        assert_eq!(scheduler.state(), JobState::Done);
    }).await;
}
