//! Testing utilities for the chaoskit workspace
//!
//! Scripted executors that record how they were called, a store that fails
//! on demand, and record fixtures.

#![allow(missing_docs)]

use chaoskit_spec::{
    ActionSpec, Channel, CommandShape, ExecutorFactory, ExecutorKey, ExecutorRegistry, ExpContext,
    ExpModel, Executor, FlagMap, Response,
};
use chaoskit_store::{ExperimentRecord, ExperimentStatus, MemoryStore, RecordStore, StoreError};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// One observed `exec` call
#[derive(Debug, Clone, PartialEq)]
pub struct ExecCall {
    pub executor: String,
    pub uid: String,
    pub ctx: ExpContext,
    pub model: ExpModel,
    pub channel_bound: bool,
}

impl ExecCall {
    pub fn is_destroy(&self) -> bool {
        self.ctx.is_destroy()
    }
}

/// Shared log of exec calls across every executor a factory builds
#[derive(Debug, Clone, Default)]
pub struct ExecLog(Arc<Mutex<Vec<ExecCall>>>);

impl ExecLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    pub fn last(&self) -> Option<ExecCall> {
        self.0.lock().last().cloned()
    }

    fn push(&self, call: ExecCall) {
        self.0.lock().push(call);
    }
}

/// Executor returning a fixed response and logging every call
#[derive(Debug, Clone)]
pub struct ScriptedExecutor {
    name: String,
    response: Response,
    log: ExecLog,
    channel: Option<Arc<dyn Channel>>,
}

impl ScriptedExecutor {
    pub fn new(name: impl Into<String>, response: Response, log: ExecLog) -> Self {
        Self {
            name: name.into(),
            response,
            log,
            channel: None,
        }
    }
}

#[async_trait::async_trait]
impl Executor for ScriptedExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_channel(&mut self, channel: Arc<dyn Channel>) {
        self.channel = Some(channel);
    }

    async fn exec(&self, uid: &str, ctx: &ExpContext, model: &ExpModel) -> Response {
        self.log.push(ExecCall {
            executor: self.name.clone(),
            uid: uid.to_string(),
            ctx: ctx.clone(),
            model: model.clone(),
            channel_bound: self.channel.is_some(),
        });
        self.response.clone()
    }
}

pub fn scripted_factory(name: &str, response: Response, log: &ExecLog) -> ExecutorFactory {
    let template = ScriptedExecutor::new(name, response, log.clone());
    Arc::new(move || Box::new(template.clone()) as Box<dyn Executor>)
}

/// Registry with `host network delay`, `cpu fullload` and
/// `docker network delay`, all answering `response`
pub fn scripted_registry(response: &Response, log: &ExecLog) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();
    let entries = [
        (
            ExecutorKey::new("host", "network", "delay"),
            ActionSpec::new("network", "", "delay"),
            "host-network-delay",
        ),
        (
            ExecutorKey::new("cpu", "", "fullload"),
            ActionSpec::new("cpu", "", "fullload"),
            "cpu-fullload",
        ),
        (
            ExecutorKey::new("docker", "network", "delay"),
            ActionSpec::new("network", "docker", "delay"),
            "docker-network-delay",
        ),
    ];
    for (key, spec, name) in entries {
        if let Err(e) = registry.register_at(key, spec, scripted_factory(name, response.clone(), log)) {
            panic!("fixture registry: {e}");
        }
    }
    registry
}

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Insert,
    QueryByUid,
    QueryByShape,
    UpdateStatus,
    DeleteByUid,
    List,
}

/// [`MemoryStore`] with injectable per-operation failures
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<StoreOp>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ExperimentRecord>) -> Self {
        Self {
            inner: MemoryStore::with_records(records),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make `op` fail from now on
    pub fn fail(&self, op: StoreOp) -> &Self {
        self.failing.lock().insert(op);
        self
    }

    pub fn heal(&self, op: StoreOp) -> &Self {
        self.failing.lock().remove(&op);
        self
    }

    /// Underlying store, bypassing injected failures
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.failing.lock().contains(&op) {
            Err(StoreError::Unavailable(format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

impl RecordStore for FaultyStore {
    fn insert(&self, record: &ExperimentRecord) -> Result<(), StoreError> {
        self.check(StoreOp::Insert)?;
        self.inner.insert(record)
    }

    fn query_by_uid(&self, uid: &str) -> Result<Option<ExperimentRecord>, StoreError> {
        self.check(StoreOp::QueryByUid)?;
        self.inner.query_by_uid(uid)
    }

    fn query_by_command_shape(
        &self,
        shape: &CommandShape,
        flags: &FlagMap,
    ) -> Result<Vec<ExperimentRecord>, StoreError> {
        self.check(StoreOp::QueryByShape)?;
        self.inner.query_by_command_shape(shape, flags)
    }

    fn update_status(
        &self,
        uid: &str,
        status: ExperimentStatus,
        note: &str,
    ) -> Result<(), StoreError> {
        self.check(StoreOp::UpdateStatus)?;
        self.inner.update_status(uid, status, note)
    }

    fn delete_by_uid(&self, uid: &str) -> Result<(), StoreError> {
        self.check(StoreOp::DeleteByUid)?;
        self.inner.delete_by_uid(uid)
    }

    fn list(&self, status: Option<ExperimentStatus>) -> Result<Vec<ExperimentRecord>, StoreError> {
        self.check(StoreOp::List)?;
        self.inner.list(status)
    }
}

pub fn record(
    uid: &str,
    command: &str,
    sub_command: &str,
    flag: &str,
    status: ExperimentStatus,
) -> ExperimentRecord {
    ExperimentRecord::new(uid, &CommandShape::new(command, sub_command), flag).with_status(status)
}

/// `abc123`: host network delay on eth0, still `Created`
pub fn network_delay_record() -> ExperimentRecord {
    record(
        "abc123",
        "host",
        "network delay",
        "interface=eth0",
        ExperimentStatus::Created,
    )
}

pub fn ok_response() -> Response {
    Response::success("ok")
}

pub fn failed_response() -> Response {
    Response::exec_command_error("tc", "RTNETLINK answers: No such file or directory")
}
