//! GrpcTransport against an in-memory `SoftwareService`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bridge::{Command, CommandResult, ErrorKind, Transport, TransportInfo, TransportKind};
use coordinator::{Coordinator, CoordinatorConfig};
use grpc::proto::*;
use grpc::{GrpcConfig, GrpcTransport, RpcError, ServiceConnector, SoftwareService};
use serde_json::{json, Value};
use tonic::Status;

/// One recorded call: method name plus the request as debug text.
type Call = (&'static str, String);

#[derive(Default)]
struct FakeApp {
    calls: Mutex<Vec<Call>>,
    fail_status: Mutex<Option<Status>>,
    stall: Mutex<Option<Duration>>,
}

impl FakeApp {
    fn record(&self, method: &'static str, request: impl std::fmt::Debug) -> Result<(), Status> {
        self.calls
            .lock()
            .unwrap()
            .push((method, format!("{request:?}")));
        match self.fail_status.lock().unwrap().clone() {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }

    /// Sleeps once for the configured stall, then answers promptly again.
    async fn maybe_stall(&self) {
        let stall = self.stall.lock().unwrap().take();
        if let Some(stall) = stall {
            tokio::time::sleep(stall).await;
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn methods(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }
}

#[async_trait]
impl SoftwareService for FakeApp {
    async fn get_software_info(
        &self,
        request: GetSoftwareInfoRequest,
    ) -> Result<GetSoftwareInfoResponse, Status> {
        self.record("GetSoftwareInfo", request)?;
        Ok(GetSoftwareInfoResponse {
            info: Some(SoftwareInfo {
                software_name: "Modeler".into(),
                version: "1.0.0".into(),
                status: "running".into(),
                current_project: "untitled".into(),
                total_objects: 2,
                available_commands: vec!["render".into(), "clear_scene".into()],
            }),
        })
    }

    async fn get_software_status(
        &self,
        request: GetSoftwareStatusRequest,
    ) -> Result<GetSoftwareStatusResponse, Status> {
        self.record("GetSoftwareStatus", request)?;
        Ok(GetSoftwareStatusResponse {
            status: Some(SoftwareStatus {
                running: true,
                current_project: "untitled".into(),
                object_count: 2,
                memory_usage: "45.2 MB".into(),
                uptime: "2h".into(),
            }),
        })
    }

    async fn create_object(
        &self,
        request: CreateObjectRequest,
    ) -> Result<CreateObjectResponse, Status> {
        self.record("CreateObject", &request)?;
        Ok(CreateObjectResponse {
            success: true,
            object_id: "obj_3".into(),
            error: String::new(),
            object: Some(ObjectInfo {
                name: request.name,
                r#type: request.r#type,
                properties: request.properties,
            }),
        })
    }

    async fn delete_object(
        &self,
        request: DeleteObjectRequest,
    ) -> Result<DeleteObjectResponse, Status> {
        self.record("DeleteObject", &request)?;
        if request.object_id == "missing" {
            return Ok(DeleteObjectResponse {
                success: false,
                error: "Object not found: missing".into(),
                message: String::new(),
            });
        }
        Ok(DeleteObjectResponse {
            success: true,
            error: String::new(),
            message: "Object deleted successfully".into(),
        })
    }

    async fn list_objects(
        &self,
        request: ListObjectsRequest,
    ) -> Result<ListObjectsResponse, Status> {
        self.record("ListObjects", request)?;
        self.maybe_stall().await;
        Ok(ListObjectsResponse {
            objects: vec![ObjectSummary {
                id: "obj_1".into(),
                name: "Cube".into(),
                r#type: "mesh".into(),
            }],
            total_count: 1,
        })
    }

    async fn get_object_info(
        &self,
        request: GetObjectInfoRequest,
    ) -> Result<GetObjectInfoResponse, Status> {
        self.record("GetObjectInfo", &request)?;
        Ok(GetObjectInfoResponse {
            success: true,
            error: String::new(),
            object: Some(ObjectInfo {
                name: "Cube".into(),
                r#type: "mesh".into(),
                properties: vec![Property::new("id", request.object_id)],
            }),
        })
    }

    async fn execute_software_command(
        &self,
        request: ExecuteSoftwareCommandRequest,
    ) -> Result<ExecuteSoftwareCommandResponse, Status> {
        self.record("ExecuteSoftwareCommand", &request)?;
        Ok(ExecuteSoftwareCommandResponse {
            success: true,
            error: String::new(),
            message: "Render completed successfully".into(),
            output_file: "render_output.png".into(),
        })
    }

    async fn save_project(
        &self,
        request: SaveProjectRequest,
    ) -> Result<SaveProjectResponse, Status> {
        self.record("SaveProject", &request)?;
        Ok(SaveProjectResponse {
            success: true,
            error: String::new(),
            message: "Project saved successfully".into(),
            filename: request.filename,
        })
    }

    async fn load_project(
        &self,
        request: LoadProjectRequest,
    ) -> Result<LoadProjectResponse, Status> {
        self.record("LoadProject", &request)?;
        Ok(LoadProjectResponse {
            success: true,
            error: String::new(),
            message: "Project loaded successfully".into(),
            filename: request.filename,
            objects_loaded: 4,
        })
    }
}

/// Hands out the shared fake, or refuses when `reachable` is false.
struct FakeConnector {
    app: Arc<FakeApp>,
    reachable: bool,
    dials: AtomicUsize,
}

impl FakeConnector {
    fn new(app: Arc<FakeApp>, reachable: bool) -> Arc<Self> {
        Arc::new(Self {
            app,
            reachable,
            dials: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ServiceConnector for FakeConnector {
    async fn connect(&self, config: &GrpcConfig) -> Result<Arc<dyn SoftwareService>, RpcError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if !self.reachable {
            return Err(RpcError::Status(Status::unavailable(format!(
                "{} refused",
                config.address
            ))));
        }
        Ok(self.app.clone())
    }
}

fn command(name: &str, params: Value) -> Command {
    let Value::Object(params) = params else {
        panic!("params must be an object");
    };
    Command::named(name, params).unwrap()
}

async fn connected() -> (Arc<FakeApp>, GrpcTransport) {
    let app = Arc::new(FakeApp::default());
    let transport = GrpcTransport::with_connector(
        GrpcConfig {
            request_timeout_ms: 200,
            ..GrpcConfig::default()
        },
        FakeConnector::new(app.clone(), true),
    );
    assert!(transport.connect().await);
    (app, transport)
}

#[tokio::test]
async fn connect_probes_status_once() {
    let (app, transport) = connected().await;
    assert_eq!(app.methods(), vec!["GetSoftwareStatus"]);
    assert!(transport.is_connected());
    assert!(transport.info().connected_since.is_some());

    // Already connected: no second dial or probe.
    assert!(transport.connect().await);
    assert_eq!(app.methods().len(), 1);
}

#[tokio::test]
async fn failed_probe_means_connection_failed() {
    let app = Arc::new(FakeApp::default());
    *app.fail_status.lock().unwrap() = Some(Status::unavailable("starting up"));
    let transport =
        GrpcTransport::with_connector(GrpcConfig::default(), FakeConnector::new(app.clone(), true));

    assert!(!transport.connect().await);
    assert!(!transport.is_connected());
    assert_eq!(app.methods(), vec!["GetSoftwareStatus"]);
}

#[tokio::test]
async fn unreachable_server_fails_connect_and_execute() {
    let app = Arc::new(FakeApp::default());
    let connector = FakeConnector::new(app.clone(), false);
    let transport = GrpcTransport::with_connector(GrpcConfig::default(), connector.clone());

    let result = transport
        .execute(&command("list_objects", json!({})))
        .await;
    assert_eq!(result.error_kind(), Some(ErrorKind::ConnectionFailed));
    assert_eq!(
        result.error(),
        Some("failed to connect using structured transport to localhost:50051")
    );
    assert_eq!(connector.dials.load(Ordering::SeqCst), 1);
    assert!(app.calls().is_empty());
}

#[tokio::test]
async fn every_command_reaches_its_rpc_with_mapped_fields() {
    let (app, transport) = connected().await;

    let cases = [
        ("get_software_info", json!({}), "GetSoftwareInfo"),
        ("get_software_status", json!({}), "GetSoftwareStatus"),
        (
            "create_object",
            json!({"name": "Cube", "type": "mesh", "size": 1.5}),
            "CreateObject",
        ),
        ("delete_object", json!({"id": "obj_1"}), "DeleteObject"),
        ("list_objects", json!({}), "ListObjects"),
        ("get_object_info", json!({"object_id": "obj_2"}), "GetObjectInfo"),
        (
            "execute_software_command",
            json!({"command": "render", "params": {"quality": "high"}}),
            "ExecuteSoftwareCommand",
        ),
        ("save_project", json!({"filename": "a.proj"}), "SaveProject"),
        ("load_project", json!({"filename": "b.proj"}), "LoadProject"),
    ];

    for (name, params, _) in &cases {
        let result = transport.send_command(&command(name, params.clone())).await;
        assert!(result.is_success(), "{name} failed: {:?}", result.error());
    }

    let calls = app.calls();
    let issued: Vec<&str> = calls.iter().skip(1).map(|(m, _)| *m).collect();
    let expected: Vec<&str> = cases.iter().map(|(_, _, m)| *m).collect();
    assert_eq!(issued, expected);

    let requests: Vec<&str> = calls.iter().skip(1).map(|(_, r)| r.as_str()).collect();
    assert!(requests[2].contains(r#"name: "Cube""#));
    assert!(requests[2].contains(r#""mesh""#));
    assert!(requests[2].contains(r#"key: "size", value: "1.5""#));
    assert!(requests[3].contains(r#"object_id: "obj_1""#));
    assert!(requests[5].contains(r#"object_id: "obj_2""#));
    assert!(requests[6].contains(r#"command: "render""#));
    assert!(requests[6].contains(r#"key: "quality", value: "high""#));
    assert!(requests[7].contains(r#"filename: "a.proj""#));
    assert!(requests[8].contains(r#"filename: "b.proj""#));
}

#[tokio::test]
async fn responses_carry_socket_shaped_payloads() {
    let (_app, transport) = connected().await;

    let created = transport
        .send_command(&command("create_object", json!({"name": "Cube", "type": "mesh"})))
        .await;
    assert_eq!(created.get("object_id"), Some(&json!("obj_3")));
    assert_eq!(created.get("object").unwrap()["type"], json!("mesh"));

    let executed = transport
        .send_command(&command("execute_software_command", json!({"command": "render"})))
        .await;
    assert_eq!(executed.get("output_file"), Some(&json!("render_output.png")));

    let loaded = transport
        .send_command(&command("load_project", json!({"filename": "b.proj"})))
        .await;
    assert_eq!(loaded.get("objects_loaded"), Some(&json!(4)));

    let info = transport
        .send_command(&command("get_software_info", json!({})))
        .await;
    assert_eq!(info.get("name"), Some(&json!("Modeler")));
}

#[tokio::test]
async fn unknown_command_never_touches_the_channel() {
    let (app, transport) = connected().await;
    let before = app.calls().len();

    let result = transport.send_command(&command("frobnicate", json!({}))).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::UnknownCommand));
    assert_eq!(result.error(), Some("unknown command: frobnicate"));
    assert_eq!(app.calls().len(), before);
    assert!(transport.is_connected());
}

#[tokio::test]
async fn application_failure_message_passes_through() {
    let (_app, transport) = connected().await;

    let result = transport
        .send_command(&command("delete_object", json!({"id": "missing"})))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("Object not found: missing"));
    assert_eq!(result.error_kind(), Some(ErrorKind::ApplicationError));
    assert!(transport.is_connected());
}

#[tokio::test]
async fn unavailable_status_drops_the_channel() {
    let (app, transport) = connected().await;
    *app.fail_status.lock().unwrap() = Some(Status::unavailable("server went away"));

    let result = transport.send_command(&command("list_objects", json!({}))).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ConnectionLost));
    assert!(!transport.is_connected());

    let again = transport.send_command(&command("list_objects", json!({}))).await;
    assert_eq!(again.error_kind(), Some(ErrorKind::NotConnected));
}

#[tokio::test]
async fn other_status_is_an_application_error_and_keeps_the_channel() {
    let (app, transport) = connected().await;
    *app.fail_status.lock().unwrap() = Some(Status::invalid_argument("name must not be empty"));

    let result = transport.send_command(&command("create_object", json!({}))).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ApplicationError));
    assert_eq!(result.error(), Some("name must not be empty"));
    assert!(transport.is_connected());
}

#[tokio::test]
async fn slow_call_times_out_and_disconnects() {
    let (app, transport) = connected().await;
    *app.stall.lock().unwrap() = Some(Duration::from_secs(5));

    let result = transport.send_command(&command("list_objects", json!({}))).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Timeout));
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn disconnect_then_execute_redials() {
    let app = Arc::new(FakeApp::default());
    let connector = FakeConnector::new(app.clone(), true);
    let transport = GrpcTransport::with_connector(GrpcConfig::default(), connector.clone());

    assert!(transport.connect().await);
    assert!(transport.disconnect().await);
    assert!(!transport.is_connected());
    assert!(!transport.check_health().await);

    let result = transport.execute(&command("list_objects", json!({}))).await;
    assert!(result.is_success());
    assert_eq!(connector.dials.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn execute_rejects_unknown_command_before_dialling() {
    for reachable in [false, true] {
        let app = Arc::new(FakeApp::default());
        let connector = FakeConnector::new(app.clone(), reachable);
        let transport = GrpcTransport::with_connector(GrpcConfig::default(), connector.clone());

        let result = transport.execute(&command("frobnicate", json!({}))).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::UnknownCommand));
        assert_eq!(result.error(), Some("unknown command: frobnicate"));
        assert_eq!(connector.dials.load(Ordering::SeqCst), 0);
        assert!(app.calls().is_empty());
        assert!(!transport.is_connected());
    }
}

#[tokio::test]
async fn execute_on_fresh_transport_passes_application_failure_through() {
    let app = Arc::new(FakeApp::default());
    let connector = FakeConnector::new(app.clone(), true);
    let transport = GrpcTransport::with_connector(GrpcConfig::default(), connector.clone());

    let result = transport
        .execute(&command("delete_object", json!({"id": "missing"})))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("Object not found: missing"));
    assert_eq!(result.error_kind(), Some(ErrorKind::ApplicationError));
    assert_eq!(app.methods(), vec!["GetSoftwareStatus", "DeleteObject"]);
    assert_eq!(connector.dials.load(Ordering::SeqCst), 1);
    assert!(transport.is_connected());
}

#[tokio::test]
async fn queued_execute_redials_after_the_call_ahead_times_out() {
    let app = Arc::new(FakeApp::default());
    *app.stall.lock().unwrap() = Some(Duration::from_secs(5));
    let connector = FakeConnector::new(app.clone(), true);
    let transport = Arc::new(GrpcTransport::with_connector(
        GrpcConfig {
            request_timeout_ms: 200,
            ..GrpcConfig::default()
        },
        connector.clone(),
    ));
    assert!(transport.connect().await);

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let transport = transport.clone();
            tokio::spawn(async move { transport.execute(&command("list_objects", json!({}))).await })
        })
        .collect();
    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    let timed_out = results
        .iter()
        .filter(|r| r.error_kind() == Some(ErrorKind::Timeout))
        .count();
    let succeeded = results.iter().filter(|r| r.is_success()).count();
    assert_eq!(timed_out, 1, "results: {results:?}");
    assert_eq!(succeeded, 1, "results: {results:?}");
    assert_eq!(connector.dials.load(Ordering::SeqCst), 2);
    assert!(transport.is_connected());
}

/// Stream-side stand-in for coordinator tests; never reachable.
struct Offline;

#[async_trait]
impl Transport for Offline {
    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }
    async fn connect(&self) -> bool {
        false
    }
    async fn disconnect(&self) -> bool {
        true
    }
    async fn send_command(&self, _command: &Command) -> CommandResult {
        bridge::BridgeError::NotConnected.into()
    }
    fn is_connected(&self) -> bool {
        false
    }
    fn info(&self) -> TransportInfo {
        TransportInfo {
            kind: TransportKind::Stream,
            endpoint: "localhost:9876".into(),
            connected: false,
            connected_since: None,
        }
    }
}

#[tokio::test]
async fn coordinator_execute_reports_application_failure_verbatim() {
    let app = Arc::new(FakeApp::default());
    let structured = Arc::new(GrpcTransport::with_connector(
        GrpcConfig::default(),
        FakeConnector::new(app.clone(), true),
    ));
    let coordinator = Coordinator::new(
        CoordinatorConfig {
            default_mode: TransportKind::Structured,
            ..CoordinatorConfig::default()
        },
        Arc::new(Offline),
        structured,
    );
    assert!(coordinator.start().await);

    let result = coordinator
        .execute(&command("delete_object", json!({"id": "missing"})))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("Object not found: missing"));
    assert_eq!(result.error_kind(), Some(ErrorKind::ApplicationError));
    assert_eq!(
        result.to_json(),
        json!({
            "success": false,
            "error": "Object not found: missing",
            "error_kind": "application_error"
        })
    );

    let status = serde_json::to_value(coordinator.status().await).unwrap();
    assert_eq!(status["mode"], json!("structured"));
    assert_eq!(status["transport"]["connected"], json!(true));
}
