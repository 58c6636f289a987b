//! Translation between free-form command parameters / results and the typed
//! RPC messages.
//!
//! Requests: parameter values are coerced to strings (strings verbatim,
//! `null` as empty, anything else as its JSON text). Missing keys fall back to
//! the message defaults; the application does its own validation.
//!
//! Responses: each reply becomes a [`CommandResult`] whose payload has the
//! same shape the application's socket server produces for the same command,
//! so callers see no difference between transports.

use std::collections::BTreeMap;

use bridge::{BridgeError, CommandResult, Params};
use serde_json::{json, Map, Value};

use crate::proto::{
    CreateObjectRequest, CreateObjectResponse, DeleteObjectRequest, DeleteObjectResponse,
    ExecuteSoftwareCommandRequest, ExecuteSoftwareCommandResponse, GetObjectInfoRequest,
    GetObjectInfoResponse, GetSoftwareInfoResponse, GetSoftwareStatusResponse,
    ListObjectsResponse, LoadProjectRequest, LoadProjectResponse, ObjectInfo, Property,
    SaveProjectRequest, SaveProjectResponse,
};
use crate::RpcMethod;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// String form of a parameter value as the RPC schema carries it.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn lookup(params: &Params, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| params.get(*key))
        .map(text)
        .unwrap_or_default()
}

fn properties(entries: BTreeMap<String, String>) -> Vec<Property> {
    entries
        .into_iter()
        .map(|(key, value)| Property::new(key, value))
        .collect()
}

pub(crate) fn create_object(params: &Params) -> CreateObjectRequest {
    let extra: BTreeMap<String, String> = params
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "name" | "type" | "object_type"))
        .map(|(key, value)| (key.clone(), text(value)))
        .collect();

    CreateObjectRequest {
        name: lookup(params, &["name"]),
        r#type: lookup(params, &["type", "object_type"]),
        properties: properties(extra),
    }
}

pub(crate) fn delete_object(params: &Params) -> DeleteObjectRequest {
    DeleteObjectRequest {
        object_id: lookup(params, &["id", "object_id"]),
    }
}

pub(crate) fn get_object_info(params: &Params) -> GetObjectInfoRequest {
    GetObjectInfoRequest {
        object_id: lookup(params, &["id", "object_id"]),
    }
}

/// A nested `params` object is flattened into the argument list; sibling keys
/// other than `command` join it and win on collision.
pub(crate) fn execute_software_command(params: &Params) -> ExecuteSoftwareCommandRequest {
    let mut args = BTreeMap::new();
    if let Some(Value::Object(nested)) = params.get("params") {
        for (key, value) in nested {
            args.insert(key.clone(), text(value));
        }
    }
    for (key, value) in params {
        match (key.as_str(), value) {
            ("command", _) | ("params", Value::Object(_)) => {}
            _ => {
                args.insert(key.clone(), text(value));
            }
        }
    }

    ExecuteSoftwareCommandRequest {
        command: lookup(params, &["command"]),
        params: properties(args),
    }
}

pub(crate) fn save_project(params: &Params) -> SaveProjectRequest {
    SaveProjectRequest {
        filename: lookup(params, &["filename"]),
    }
}

pub(crate) fn load_project(params: &Params) -> LoadProjectRequest {
    LoadProjectRequest {
        filename: lookup(params, &["filename"]),
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn outcome(method: RpcMethod, success: bool, error: String, payload: Map<String, Value>) -> CommandResult {
    if success {
        return CommandResult::ok(payload);
    }
    let message = if error.is_empty() {
        format!("{} reported failure", method.as_str())
    } else {
        error
    };
    BridgeError::application(message).into()
}

fn object_json(object: ObjectInfo) -> Value {
    let properties: Map<String, Value> = object
        .properties
        .into_iter()
        .map(|p| (p.key, Value::String(p.value)))
        .collect();
    json!({
        "name": object.name,
        "type": object.r#type,
        "properties": properties,
    })
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(crate) fn software_info(response: GetSoftwareInfoResponse) -> CommandResult {
    let Some(info) = response.info else {
        return CommandResult::ok_empty();
    };
    CommandResult::ok(into_map(json!({
        "name": info.software_name,
        "version": info.version,
        "status": info.status,
        "current_project": info.current_project,
        "total_objects": info.total_objects,
        "available_commands": info.available_commands,
    })))
}

pub(crate) fn software_status(response: GetSoftwareStatusResponse) -> CommandResult {
    let Some(status) = response.status else {
        return CommandResult::ok_empty();
    };
    CommandResult::ok(into_map(json!({
        "running": status.running,
        "current_project": status.current_project,
        "object_count": status.object_count,
        "memory_usage": status.memory_usage,
        "uptime": status.uptime,
    })))
}

pub(crate) fn created(response: CreateObjectResponse) -> CommandResult {
    let mut payload = Map::new();
    if !response.object_id.is_empty() {
        payload.insert("object_id".into(), Value::String(response.object_id));
    }
    if let Some(object) = response.object {
        payload.insert("object".into(), object_json(object));
    }
    outcome(RpcMethod::CreateObject, response.success, response.error, payload)
}

pub(crate) fn deleted(response: DeleteObjectResponse) -> CommandResult {
    let mut payload = Map::new();
    payload.insert("message".into(), Value::String(response.message));
    outcome(RpcMethod::DeleteObject, response.success, response.error, payload)
}

pub(crate) fn object_list(response: ListObjectsResponse) -> CommandResult {
    let objects: Vec<Value> = response
        .objects
        .into_iter()
        .map(|o| json!({"id": o.id, "name": o.name, "type": o.r#type}))
        .collect();
    CommandResult::ok(into_map(json!({
        "objects": objects,
        "total_count": response.total_count,
    })))
}

pub(crate) fn object_info(response: GetObjectInfoResponse) -> CommandResult {
    let mut payload = Map::new();
    if let Some(object) = response.object {
        payload.insert("object".into(), object_json(object));
    }
    outcome(RpcMethod::GetObjectInfo, response.success, response.error, payload)
}

pub(crate) fn command_executed(response: ExecuteSoftwareCommandResponse) -> CommandResult {
    let mut payload = Map::new();
    payload.insert("message".into(), Value::String(response.message));
    if !response.output_file.is_empty() {
        payload.insert("output_file".into(), Value::String(response.output_file));
    }
    outcome(
        RpcMethod::ExecuteSoftwareCommand,
        response.success,
        response.error,
        payload,
    )
}

pub(crate) fn project_saved(response: SaveProjectResponse) -> CommandResult {
    let mut payload = Map::new();
    payload.insert("message".into(), Value::String(response.message));
    payload.insert("filename".into(), Value::String(response.filename));
    outcome(RpcMethod::SaveProject, response.success, response.error, payload)
}

pub(crate) fn project_loaded(response: LoadProjectResponse) -> CommandResult {
    let mut payload = Map::new();
    payload.insert("message".into(), Value::String(response.message));
    payload.insert("filename".into(), Value::String(response.filename));
    payload.insert("objects_loaded".into(), json!(response.objects_loaded));
    outcome(RpcMethod::LoadProject, response.success, response.error, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{ObjectSummary, SoftwareInfo};
    use bridge::ErrorKind;

    fn params(value: Value) -> Params {
        into_map(value)
    }

    #[test]
    fn values_are_coerced_to_strings() {
        assert_eq!(text(&json!("cube")), "cube");
        assert_eq!(text(&json!(null)), "");
        assert_eq!(text(&json!(1.5)), "1.5");
        assert_eq!(text(&json!(true)), "true");
        assert_eq!(text(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn create_object_splits_name_type_and_properties() {
        let request = create_object(&params(json!({
            "name": "Cube",
            "object_type": "mesh",
            "size": 2,
            "color": "red",
        })));
        assert_eq!(request.name, "Cube");
        assert_eq!(request.r#type, "mesh");
        assert_eq!(
            request.properties,
            vec![Property::new("color", "red"), Property::new("size", "2")]
        );
    }

    #[test]
    fn type_wins_over_object_type() {
        let request = create_object(&params(json!({"type": "light", "object_type": "mesh"})));
        assert_eq!(request.r#type, "light");
        assert!(request.properties.is_empty());
    }

    #[test]
    fn object_id_accepts_both_spellings() {
        assert_eq!(delete_object(&params(json!({"id": "obj_1"}))).object_id, "obj_1");
        assert_eq!(
            get_object_info(&params(json!({"object_id": "obj_2"}))).object_id,
            "obj_2"
        );
        assert_eq!(delete_object(&Params::new()).object_id, "");
    }

    #[test]
    fn execute_software_command_flattens_nested_params() {
        let request = execute_software_command(&params(json!({
            "command": "render",
            "params": {"quality": "high", "frames": 10},
            "frames": 24,
        })));
        assert_eq!(request.command, "render");
        assert_eq!(
            request.params,
            vec![Property::new("frames", "24"), Property::new("quality", "high")]
        );
    }

    #[test]
    fn execute_software_command_keeps_scalar_params_key() {
        let request = execute_software_command(&params(json!({
            "command": "reset_camera",
            "params": "none",
        })));
        assert_eq!(request.params, vec![Property::new("params", "none")]);
    }

    #[test]
    fn failure_without_error_text_names_the_command() {
        let result = deleted(DeleteObjectResponse {
            success: false,
            error: String::new(),
            message: String::new(),
        });
        assert_eq!(result.error(), Some("delete_object reported failure"));
        assert_eq!(result.error_kind(), Some(ErrorKind::ApplicationError));
    }

    #[test]
    fn created_object_has_socket_reply_shape() {
        let result = created(CreateObjectResponse {
            success: true,
            object_id: "obj_3".into(),
            error: String::new(),
            object: Some(ObjectInfo {
                name: "Cube".into(),
                r#type: "mesh".into(),
                properties: vec![Property::new("size", "1.0")],
            }),
        });
        assert!(result.is_success());
        assert_eq!(
            result.to_json(),
            json!({
                "success": true,
                "object_id": "obj_3",
                "object": {"name": "Cube", "type": "mesh", "properties": {"size": "1.0"}},
            })
        );
    }

    #[test]
    fn info_is_flattened_and_empty_output_file_omitted() {
        let result = software_info(GetSoftwareInfoResponse {
            info: Some(SoftwareInfo {
                software_name: "Modeler".into(),
                version: "1.0.0".into(),
                status: "running".into(),
                current_project: "untitled".into(),
                total_objects: 2,
                available_commands: vec!["render".into()],
            }),
        });
        assert_eq!(result.get("name"), Some(&json!("Modeler")));
        assert_eq!(result.get("total_objects"), Some(&json!(2)));

        let result = command_executed(ExecuteSoftwareCommandResponse {
            success: true,
            error: String::new(),
            message: "Scene cleared successfully".into(),
            output_file: String::new(),
        });
        assert!(result.get("output_file").is_none());
    }

    #[test]
    fn object_list_keeps_order_and_count() {
        let result = object_list(ListObjectsResponse {
            objects: vec![
                ObjectSummary {
                    id: "obj_1".into(),
                    name: "Cube".into(),
                    r#type: "mesh".into(),
                },
                ObjectSummary {
                    id: "obj_2".into(),
                    name: "Camera".into(),
                    r#type: "camera".into(),
                },
            ],
            total_count: 2,
        });
        assert_eq!(result.get("objects").unwrap()[1]["id"], json!("obj_2"));
        assert_eq!(result.get("total_count"), Some(&json!(2)));
    }
}
