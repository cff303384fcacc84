use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task;
use tracing::debug;

use qbrowse_core::traits::RenderSurface;
use qbrowse_core::types::{Document, TagFrequency};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// No job has been started yet. Only [`RenderScheduler::state`] reports
    /// it; a handle from `start` is already `Running` or `Done`.
    Idle,
    Running,
    Done,
    /// A newer job started (or the scheduler was cancelled) before this one finished.
    Superseded,
}

/// One rendered chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProgress {
    /// The documents of this chunk only.
    pub rendered: Vec<Document>,
    /// Offset just past the last rendered document.
    pub cursor: usize,
    pub total: usize,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// First result, drawn in the detail view before any chunk.
    Preview(Document),
    Chunk(RenderProgress),
    /// Nothing matched; the tag list was shown instead.
    Fallback,
}

/// Caller's side of a job: its generation, state and event stream.
///
/// The stream ends once the job finishes or notices it was superseded.
pub struct RenderJobHandle {
    generation: u64,
    state: Rc<Cell<JobState>>,
    events: UnboundedReceiver<RenderEvent>,
}

impl RenderJobHandle {
    pub fn generation(&self) -> u64 { self.generation }

    pub fn state(&self) -> JobState { self.state.get() }

    pub async fn next_event(&mut self) -> Option<RenderEvent> {
        self.events.recv().await
    }

    /// Already-delivered event, without waiting.
    pub fn try_next(&mut self) -> Option<RenderEvent> {
        match self.events.try_recv() {
            Ok(ev) => Some(ev),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drain the stream to its end.
    pub async fn collect(mut self) -> Vec<RenderEvent> {
        let mut out = Vec::new();
        while let Some(ev) = self.events.recv().await { out.push(ev); }
        out
    }
}

struct RenderJob {
    results: Vec<Document>,
    chunk_size: usize,
    cursor: usize,
    term: String,
    generation: u64,
}

impl RenderJob {
    async fn run<S: RenderSurface>(
        mut self,
        surface: Rc<RefCell<S>>,
        current: Rc<Cell<u64>>,
        state: Rc<Cell<JobState>>,
        tx: UnboundedSender<RenderEvent>,
    ) {
        let total = self.results.len();
        while self.cursor < total {
            task::yield_now().await;
            if current.get() != self.generation {
                debug!(generation = self.generation, term = %self.term, cursor = self.cursor, "dropping superseded render job");
                state.set(JobState::Superseded);
                return;
            }

            let end = (self.cursor + self.chunk_size).min(total);
            let rendered = self.results[self.cursor..end].to_vec();
            let done = end >= total;
            {
                let mut s = surface.borrow_mut();
                s.append_list(&rendered);
                if done {
                    s.set_status(&format!("{} for {}", total, self.term));
                } else {
                    s.set_status(&format!("{} of {} for {}", end, total, self.term));
                }
            }
            debug!(generation = self.generation, cursor = end, total, "rendered chunk");
            self.cursor = end;
            if done { state.set(JobState::Done); }
            // Rendering does not depend on anyone listening.
            let _ = tx.send(RenderEvent::Chunk(RenderProgress { rendered, cursor: end, total, done }));
        }
    }
}

pub struct RenderScheduler<S: RenderSurface> {
    surface: Rc<RefCell<S>>,
    chunk_size: usize,
    fallback: Rc<[TagFrequency]>,
    current: Rc<Cell<u64>>,
    latest: RefCell<Rc<Cell<JobState>>>,
}

impl<S: RenderSurface + 'static> RenderScheduler<S> {
    /// `chunk_size` values below one are raised to one.
    pub fn new(surface: Rc<RefCell<S>>, chunk_size: usize) -> Self {
        Self {
            surface,
            chunk_size: chunk_size.max(1),
            fallback: Rc::from(Vec::new()),
            current: Rc::new(Cell::new(0)),
            latest: RefCell::new(Rc::new(Cell::new(JobState::Idle))),
        }
    }

    /// Tag list shown when a search matches nothing.
    pub fn with_fallback(mut self, tags: Vec<TagFrequency>) -> Self {
        self.fallback = Rc::from(tags);
        self
    }

    pub fn surface(&self) -> &Rc<RefCell<S>> { &self.surface }

    /// State of the most recently started job, `Idle` before the first one.
    pub fn state(&self) -> JobState { self.latest.borrow().get() }

    /// Stop the running job, if any, before its next chunk.
    pub fn cancel(&self) {
        self.current.set(self.current.get() + 1);
    }

    /// Start rendering `results`, superseding whatever job is still running.
    ///
    /// The preview is drawn before this returns; chunks follow from a local
    /// task, each after a yield to the event loop.
    pub fn start(&self, results: Vec<Document>, term: &str) -> RenderJobHandle {
        self.cancel();
        let generation = self.current.get();
        let (tx, events) = mpsc::unbounded_channel();
        let state = Rc::new(Cell::new(JobState::Running));
        let handle = RenderJobHandle { generation, state: state.clone(), events };
        *self.latest.borrow_mut() = state.clone();

        let Some(first) = results.first().cloned() else {
            {
                let mut s = self.surface.borrow_mut();
                s.show_word_list(&self.fallback);
                s.set_status(&format!("0 for {}", term));
            }
            let _ = tx.send(RenderEvent::Fallback);
            state.set(JobState::Done);
            return handle;
        };

        {
            let mut s = self.surface.borrow_mut();
            s.set_status("working");
            s.show_detail(&first);
            s.clear_list();
        }
        let _ = tx.send(RenderEvent::Preview(first));

        let job = RenderJob { results, chunk_size: self.chunk_size, cursor: 0, term: term.to_string(), generation };
        debug!(generation, total = job.results.len(), chunk_size = job.chunk_size, "render job started");
        task::spawn_local(job.run(self.surface.clone(), self.current.clone(), state, tx));
        handle
    }
}
