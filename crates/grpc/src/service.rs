//! Ports between [`crate::GrpcTransport`] and the wire.
//!
//! [`SoftwareService`] is one method per RPC of `mcp.MCPService`;
//! [`ServiceConnector`] opens a channel and hands back a service bound to it.
//! The tonic implementations live in [`crate::client`]; tests plug in
//! in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use tonic::Status;

use crate::proto::{
    CreateObjectRequest, CreateObjectResponse, DeleteObjectRequest, DeleteObjectResponse,
    ExecuteSoftwareCommandRequest, ExecuteSoftwareCommandResponse, GetObjectInfoRequest,
    GetObjectInfoResponse, GetSoftwareInfoRequest, GetSoftwareInfoResponse,
    GetSoftwareStatusRequest, GetSoftwareStatusResponse, ListObjectsRequest, ListObjectsResponse,
    LoadProjectRequest, LoadProjectResponse, SaveProjectRequest, SaveProjectResponse,
};
use crate::{GrpcConfig, RpcError};

/// Client side of the application's RPC service.
#[async_trait]
pub trait SoftwareService: Send + Sync {
    async fn get_software_info(
        &self,
        request: GetSoftwareInfoRequest,
    ) -> Result<GetSoftwareInfoResponse, Status>;

    async fn get_software_status(
        &self,
        request: GetSoftwareStatusRequest,
    ) -> Result<GetSoftwareStatusResponse, Status>;

    async fn create_object(
        &self,
        request: CreateObjectRequest,
    ) -> Result<CreateObjectResponse, Status>;

    async fn delete_object(
        &self,
        request: DeleteObjectRequest,
    ) -> Result<DeleteObjectResponse, Status>;

    async fn list_objects(
        &self,
        request: ListObjectsRequest,
    ) -> Result<ListObjectsResponse, Status>;

    async fn get_object_info(
        &self,
        request: GetObjectInfoRequest,
    ) -> Result<GetObjectInfoResponse, Status>;

    async fn execute_software_command(
        &self,
        request: ExecuteSoftwareCommandRequest,
    ) -> Result<ExecuteSoftwareCommandResponse, Status>;

    async fn save_project(&self, request: SaveProjectRequest)
        -> Result<SaveProjectResponse, Status>;

    async fn load_project(&self, request: LoadProjectRequest)
        -> Result<LoadProjectResponse, Status>;
}

/// Opens channels to the RPC server.
#[async_trait]
pub trait ServiceConnector: Send + Sync {
    /// Establishes a channel per `config` and returns a service bound to it.
    async fn connect(&self, config: &GrpcConfig) -> Result<Arc<dyn SoftwareService>, RpcError>;
}
