//! tonic implementation of [`SoftwareService`].
//!
//! Written in the shape `tonic-build` generates for a client stub: a cloned
//! `Grpc<Channel>` per call, `ready()` then `unary()` with a prost codec and
//! a static method path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Status};
use tracing::{debug, info};

use crate::proto::{
    CreateObjectRequest, CreateObjectResponse, DeleteObjectRequest, DeleteObjectResponse,
    ExecuteSoftwareCommandRequest, ExecuteSoftwareCommandResponse, GetObjectInfoRequest,
    GetObjectInfoResponse, GetSoftwareInfoRequest, GetSoftwareInfoResponse,
    GetSoftwareStatusRequest, GetSoftwareStatusResponse, ListObjectsRequest, ListObjectsResponse,
    LoadProjectRequest, LoadProjectResponse, SaveProjectRequest, SaveProjectResponse,
};
use crate::service::{ServiceConnector, SoftwareService};
use crate::{GrpcConfig, RpcError, RpcMethod};

/// `mcp.MCPService` client over a tonic [`Channel`].
#[derive(Debug, Clone)]
pub struct SoftwareServiceClient {
    inner: Grpc<Channel>,
    deadline: Duration,
}

impl SoftwareServiceClient {
    /// Opens a channel to `config.address`, failing if the server cannot be
    /// reached within the connect timeout.
    pub async fn connect(config: &GrpcConfig) -> Result<Self, RpcError> {
        let uri = config.uri();
        let endpoint =
            Endpoint::from_shared(uri.clone()).map_err(|source| RpcError::InvalidAddress {
                address: config.address.clone(),
                source,
            })?;
        let channel = endpoint
            .connect_timeout(config.connect_timeout())
            .connect()
            .await
            .map_err(|source| RpcError::Connect {
                address: config.address.clone(),
                source,
            })?;
        info!(uri = %uri, "RPC channel established");
        Ok(Self::new(channel, config.request_timeout()))
    }

    /// Wraps an existing channel. `deadline` is sent with every call.
    pub fn new(channel: Channel, deadline: Duration) -> Self {
        Self {
            inner: Grpc::new(channel),
            deadline,
        }
    }

    async fn unary<Req, Resp>(&self, method: RpcMethod, message: Req) -> Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("service was not ready: {e}")))?;

        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let path = PathAndQuery::from_static(method.path());
        let mut request = Request::new(message);
        request.set_timeout(self.deadline);

        debug!(path = method.path(), "Issuing unary RPC");
        let response = grpc.unary(request, path, codec).await?;
        Ok(response.into_inner())
    }
}

#[async_trait]
impl SoftwareService for SoftwareServiceClient {
    async fn get_software_info(
        &self,
        request: GetSoftwareInfoRequest,
    ) -> Result<GetSoftwareInfoResponse, Status> {
        self.unary(RpcMethod::GetSoftwareInfo, request).await
    }

    async fn get_software_status(
        &self,
        request: GetSoftwareStatusRequest,
    ) -> Result<GetSoftwareStatusResponse, Status> {
        self.unary(RpcMethod::GetSoftwareStatus, request).await
    }

    async fn create_object(
        &self,
        request: CreateObjectRequest,
    ) -> Result<CreateObjectResponse, Status> {
        self.unary(RpcMethod::CreateObject, request).await
    }

    async fn delete_object(
        &self,
        request: DeleteObjectRequest,
    ) -> Result<DeleteObjectResponse, Status> {
        self.unary(RpcMethod::DeleteObject, request).await
    }

    async fn list_objects(
        &self,
        request: ListObjectsRequest,
    ) -> Result<ListObjectsResponse, Status> {
        self.unary(RpcMethod::ListObjects, request).await
    }

    async fn get_object_info(
        &self,
        request: GetObjectInfoRequest,
    ) -> Result<GetObjectInfoResponse, Status> {
        self.unary(RpcMethod::GetObjectInfo, request).await
    }

    async fn execute_software_command(
        &self,
        request: ExecuteSoftwareCommandRequest,
    ) -> Result<ExecuteSoftwareCommandResponse, Status> {
        self.unary(RpcMethod::ExecuteSoftwareCommand, request).await
    }

    async fn save_project(
        &self,
        request: SaveProjectRequest,
    ) -> Result<SaveProjectResponse, Status> {
        self.unary(RpcMethod::SaveProject, request).await
    }

    async fn load_project(
        &self,
        request: LoadProjectRequest,
    ) -> Result<LoadProjectResponse, Status> {
        self.unary(RpcMethod::LoadProject, request).await
    }
}

/// Connector that dials real tonic channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct TonicConnector;

#[async_trait]
impl ServiceConnector for TonicConnector {
    async fn connect(&self, config: &GrpcConfig) -> Result<Arc<dyn SoftwareService>, RpcError> {
        let client = SoftwareServiceClient::connect(config).await?;
        Ok(Arc::new(client))
    }
}
