use std::fmt;

use bridge::{CommandResult, Params};
use tonic::Status;

use crate::mapping;
use crate::proto::{GetSoftwareInfoRequest, GetSoftwareStatusRequest, ListObjectsRequest};
use crate::service::SoftwareService;

/// The closed set of commands the RPC schema compiles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    GetSoftwareInfo,
    GetSoftwareStatus,
    CreateObject,
    DeleteObject,
    ListObjects,
    GetObjectInfo,
    ExecuteSoftwareCommand,
    SaveProject,
    LoadProject,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 9] = [
        Self::GetSoftwareInfo,
        Self::GetSoftwareStatus,
        Self::CreateObject,
        Self::DeleteObject,
        Self::ListObjects,
        Self::GetObjectInfo,
        Self::ExecuteSoftwareCommand,
        Self::SaveProject,
        Self::LoadProject,
    ];

    /// Resolves a command name; `None` for names outside the schema.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// The command name callers use.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetSoftwareInfo => "get_software_info",
            Self::GetSoftwareStatus => "get_software_status",
            Self::CreateObject => "create_object",
            Self::DeleteObject => "delete_object",
            Self::ListObjects => "list_objects",
            Self::GetObjectInfo => "get_object_info",
            Self::ExecuteSoftwareCommand => "execute_software_command",
            Self::SaveProject => "save_project",
            Self::LoadProject => "load_project",
        }
    }

    /// gRPC method path on `mcp.MCPService`.
    pub fn path(self) -> &'static str {
        match self {
            Self::GetSoftwareInfo => "/mcp.MCPService/GetSoftwareInfo",
            Self::GetSoftwareStatus => "/mcp.MCPService/GetSoftwareStatus",
            Self::CreateObject => "/mcp.MCPService/CreateObject",
            Self::DeleteObject => "/mcp.MCPService/DeleteObject",
            Self::ListObjects => "/mcp.MCPService/ListObjects",
            Self::GetObjectInfo => "/mcp.MCPService/GetObjectInfo",
            Self::ExecuteSoftwareCommand => "/mcp.MCPService/ExecuteSoftwareCommand",
            Self::SaveProject => "/mcp.MCPService/SaveProject",
            Self::LoadProject => "/mcp.MCPService/LoadProject",
        }
    }

    /// Builds the typed request from `params`, calls `service`, and maps the
    /// reply back into a result.
    pub async fn invoke(
        self,
        service: &dyn SoftwareService,
        params: &Params,
    ) -> Result<CommandResult, Status> {
        let result = match self {
            Self::GetSoftwareInfo => {
                mapping::software_info(service.get_software_info(GetSoftwareInfoRequest {}).await?)
            }
            Self::GetSoftwareStatus => mapping::software_status(
                service
                    .get_software_status(GetSoftwareStatusRequest {})
                    .await?,
            ),
            Self::CreateObject => {
                mapping::created(service.create_object(mapping::create_object(params)).await?)
            }
            Self::DeleteObject => {
                mapping::deleted(service.delete_object(mapping::delete_object(params)).await?)
            }
            Self::ListObjects => {
                mapping::object_list(service.list_objects(ListObjectsRequest {}).await?)
            }
            Self::GetObjectInfo => mapping::object_info(
                service
                    .get_object_info(mapping::get_object_info(params))
                    .await?,
            ),
            Self::ExecuteSoftwareCommand => mapping::command_executed(
                service
                    .execute_software_command(mapping::execute_software_command(params))
                    .await?,
            ),
            Self::SaveProject => {
                mapping::project_saved(service.save_project(mapping::save_project(params)).await?)
            }
            Self::LoadProject => {
                mapping::project_loaded(service.load_project(mapping::load_project(params)).await?)
            }
        };
        Ok(result)
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
