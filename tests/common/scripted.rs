use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use transactional_dao::{
    Column, ResourceFactory, ResourceHandle, Row, StoreError, StoreResult, Value,
};

/// One interaction with the scripted store, tagged with the handle number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Acquire,
    Begin(usize),
    Execute(usize),
    Query(usize),
    Commit(usize),
    Rollback(usize),
    Release(usize),
}

/// Which store calls should fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Failures {
    pub acquire: bool,
    pub begin: bool,
    pub statement: bool,
    pub commit: bool,
    pub rollback: bool,
    pub release: bool,
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    failures: Failures,
    rows: Vec<Row>,
    affected: u64,
    handles: usize,
}

/// In-process resource factory that records every call it receives.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    state: Arc<Mutex<State>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures: Failures) -> Self {
        let factory = Self::new();
        factory.state.lock().failures = failures;
        factory
    }

    /// Rows returned by every query.
    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.state.lock().rows = rows;
        self
    }

    /// Row count reported by every statement.
    pub fn with_affected(self, affected: u64) -> Self {
        self.state.lock().affected = affected;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    pub fn interactions(&self) -> usize {
        self.state.lock().events.len()
    }
}

fn scripted_failure(call: &str) -> StoreError {
    StoreError::Backend(format!("scripted {call} failure"))
}

#[async_trait]
impl ResourceFactory for ScriptedFactory {
    type Handle = ScriptedHandle;

    async fn acquire(&self) -> StoreResult<ScriptedHandle> {
        let mut state = self.state.lock();
        state.events.push(Event::Acquire);
        if state.failures.acquire {
            return Err(scripted_failure("acquire"));
        }
        state.handles += 1;
        Ok(ScriptedHandle {
            id: state.handles,
            state: Arc::clone(&self.state),
        })
    }
}

pub struct ScriptedHandle {
    id: usize,
    state: Arc<Mutex<State>>,
}

impl ScriptedHandle {
    fn record(&self, event: Event, fails: impl Fn(&Failures) -> bool, call: &str) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.events.push(event);
        if fails(&state.failures) {
            return Err(scripted_failure(call));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceHandle for ScriptedHandle {
    async fn begin(&mut self) -> StoreResult<()> {
        self.record(Event::Begin(self.id), |f| f.begin, "begin")
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.record(Event::Commit(self.id), |f| f.commit, "commit")
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.record(Event::Rollback(self.id), |f| f.rollback, "rollback")
    }

    async fn execute(&mut self, _sql: &str, _params: &[Value]) -> StoreResult<u64> {
        self.record(Event::Execute(self.id), |f| f.statement, "statement")?;
        Ok(self.state.lock().affected)
    }

    async fn query(
        &mut self,
        _sql: &str,
        _params: &[Value],
        _columns: &[Column],
    ) -> StoreResult<Vec<Row>> {
        self.record(Event::Query(self.id), |f| f.statement, "statement")?;
        Ok(self.state.lock().rows.clone())
    }

    async fn release(&mut self) -> StoreResult<()> {
        self.record(Event::Release(self.id), |f| f.release, "release")
    }
}
