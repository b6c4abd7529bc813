use chaoskit_engine::{ExperimentEngine, UID_LEN};
use chaoskit_spec::{decode_flags, ErrorKind, ExpContext, ExpModel, Response};
use chaoskit_store::{ExperimentStatus, MemoryStore, RecordStore, SqliteStore};
use chaoskit_test_utils::{
    failed_response, ok_response, scripted_registry, ExecLog, FaultyStore, StoreOp,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn engine_with(store: Arc<dyn RecordStore>, response: &Response) -> (ExperimentEngine, ExecLog) {
    let log = ExecLog::new();
    let registry = Arc::new(scripted_registry(response, &log));
    (ExperimentEngine::new(store, registry), log)
}

fn uid_of(resp: &Response) -> String {
    resp.result
        .as_ref()
        .and_then(|v| v.as_str())
        .unwrap()
        .to_string()
}

fn docker_delay() -> ExpModel {
    ExpModel::new("network", "docker", "delay")
        .with_flag("interface", "eth0")
        .with_flag("time", "3000")
}

#[tokio::test]
async fn create_records_running_experiment() {
    let store = Arc::new(MemoryStore::new());
    let (engine, log) = engine_with(store.clone(), &ok_response());

    let resp = engine.create(&ExpContext::new(), &docker_delay()).await.unwrap();
    let uid = uid_of(&resp);

    assert_eq!(uid.len(), UID_LEN);
    let call = log.last().unwrap();
    assert!(!call.is_destroy());
    assert_eq!(call.uid, uid);
    assert_eq!(call.ctx.uid(), Some(uid.as_str()));

    let stored = store.query_by_uid(&uid).unwrap().unwrap();
    assert_eq!(stored.status, ExperimentStatus::Running);
    assert_eq!(stored.command, "docker");
    assert_eq!(stored.sub_command, "network delay");
    assert_eq!(stored.flag, "interface=eth0 time=3000");
}

#[tokio::test]
async fn explicit_uid_is_kept_out_of_stored_flags() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _log) = engine_with(store.clone(), &ok_response());
    let model = docker_delay().with_flag("uid", "mine");

    let resp = engine.create(&ExpContext::new(), &model).await.unwrap();

    assert_eq!(uid_of(&resp), "mine");
    let stored = store.query_by_uid("mine").unwrap().unwrap();
    assert!(!decode_flags(&stored.flag).unwrap().contains_key("uid"));
}

#[tokio::test]
async fn duplicate_uid_is_parameter_illegal() {
    let (engine, log) = engine_with(Arc::new(MemoryStore::new()), &ok_response());
    let model = docker_delay().with_flag("uid", "mine");

    engine.create(&ExpContext::new(), &model).await.unwrap();
    let err = engine.create(&ExpContext::new(), &model).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ParameterIllegal);
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn failed_apply_is_recorded_as_error() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _log) = engine_with(store.clone(), &failed_response());
    let model = docker_delay().with_flag("uid", "bad");

    let err = engine.create(&ExpContext::new(), &model).await.unwrap_err();

    assert_eq!(err, failed_response());
    let stored = store.query_by_uid("bad").unwrap().unwrap();
    assert_eq!(stored.status, ExperimentStatus::Error);
    assert_eq!(stored.error, failed_response().err);
}

#[tokio::test]
async fn unknown_action_stores_nothing() {
    let store = Arc::new(MemoryStore::new());
    let (engine, log) = engine_with(store.clone(), &ok_response());

    let err = engine
        .create(&ExpContext::new(), &ExpModel::new("disk", "", "fill"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::HandlerNotFound);
    assert!(store.is_empty());
    assert!(log.is_empty());
}

#[tokio::test]
async fn insert_failure_is_database_error() {
    let store = Arc::new(FaultyStore::new());
    store.fail(StoreOp::Insert);
    let (engine, log) = engine_with(store, &ok_response());

    let err = engine.create(&ExpContext::new(), &docker_delay()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DatabaseError);
    assert!(log.is_empty());
}

#[tokio::test]
async fn created_experiment_destroys_through_same_executor() {
    let store = Arc::new(MemoryStore::new());
    let (engine, log) = engine_with(store.clone(), &ok_response());

    let uid = uid_of(&engine.create(&ExpContext::new(), &docker_delay()).await.unwrap());
    engine.destroy_by_uid(&ExpContext::new(), &uid, false).await.unwrap();

    let calls = log.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].executor, calls[1].executor);
    assert_eq!(calls[0].model.action_flags, calls[1].model.action_flags);
    assert!(calls[1].is_destroy());
    assert_eq!(
        store.query_by_uid(&uid).unwrap().unwrap().status,
        ExperimentStatus::Destroyed
    );
}

#[tokio::test]
async fn status_and_list_report_records() {
    let (engine, _log) = engine_with(Arc::new(MemoryStore::new()), &ok_response());
    let uid = uid_of(&engine.create(&ExpContext::new(), &docker_delay()).await.unwrap());

    let status = engine.status(&uid).unwrap().result.unwrap();
    assert_eq!(status["uid"], uid.as_str());
    assert_eq!(status["status"], "Running");

    let running = engine.list(Some(ExperimentStatus::Running)).unwrap().result.unwrap();
    assert_eq!(running.as_array().unwrap().len(), 1);
    let destroyed = engine.list(Some(ExperimentStatus::Destroyed)).unwrap().result.unwrap();
    assert!(destroyed.as_array().unwrap().is_empty());

    assert_eq!(engine.status("nope").unwrap_err().kind(), ErrorKind::DataNotFound);
}

#[tokio::test]
async fn sqlite_lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chaoskit.db");

    let uid = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let (engine, _log) = engine_with(store, &ok_response());
        uid_of(&engine.create(&ExpContext::new(), &docker_delay()).await.unwrap())
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let (engine, log) = engine_with(store.clone(), &ok_response());
    engine.destroy_by_uid(&ExpContext::new(), &uid, false).await.unwrap();

    assert_eq!(log.len(), 1);
    assert_eq!(
        store.query_by_uid(&uid).unwrap().unwrap().status,
        ExperimentStatus::Destroyed
    );
}

proptest! {
    #[test]
    fn create_then_destroy_replays_flags(
        flags in prop::collection::btree_map("[a-z]{1,6}", "[a-zA-Z0-9 =\"]{1,12}", 0..4),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let mut model = ExpModel::new("network", "docker", "delay");
        model.action_flags = flags.clone();
        model.action_flags.remove("uid");
        let expected = model.action_flags.clone();

        let calls = runtime.block_on(async {
            let (engine, log) = engine_with(Arc::new(MemoryStore::new()), &ok_response());
            let uid = uid_of(&engine.create(&ExpContext::new(), &model).await.unwrap());
            engine.destroy_by_uid(&ExpContext::new(), &uid, false).await.unwrap();
            log.calls()
        });

        prop_assert_eq!(calls.len(), 2);
        prop_assert_eq!(&calls[1].model.action_flags, &expected);
    }
}
