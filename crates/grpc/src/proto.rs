//! Wire messages of the `mcp.MCPService` schema.
//!
//! Hand-written equivalents of what `prost-build` emits for
//! `proto/software_service.proto`. Field tags must match the schema file.

/// Free-form string pair used for object properties and command arguments.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Property {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SoftwareInfo {
    #[prost(string, tag = "1")]
    pub software_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub version: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub status: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub current_project: ::prost::alloc::string::String,
    #[prost(int32, tag = "5")]
    pub total_objects: i32,
    #[prost(string, repeated, tag = "6")]
    pub available_commands: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SoftwareStatus {
    #[prost(bool, tag = "1")]
    pub running: bool,
    #[prost(string, tag = "2")]
    pub current_project: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub object_count: i32,
    #[prost(string, tag = "4")]
    pub memory_usage: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub uptime: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ObjectInfo {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub r#type: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub properties: ::prost::alloc::vec::Vec<Property>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ObjectSummary {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub r#type: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct GetSoftwareInfoRequest {}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetSoftwareInfoResponse {
    #[prost(message, optional, tag = "1")]
    pub info: ::core::option::Option<SoftwareInfo>,
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct GetSoftwareStatusRequest {}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetSoftwareStatusResponse {
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<SoftwareStatus>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateObjectRequest {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub r#type: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub properties: ::prost::alloc::vec::Vec<Property>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateObjectResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub object_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub error: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub object: ::core::option::Option<ObjectInfo>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteObjectRequest {
    #[prost(string, tag = "1")]
    pub object_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteObjectResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub error: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct ListObjectsRequest {}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ListObjectsResponse {
    #[prost(message, repeated, tag = "1")]
    pub objects: ::prost::alloc::vec::Vec<ObjectSummary>,
    #[prost(int32, tag = "2")]
    pub total_count: i32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetObjectInfoRequest {
    #[prost(string, tag = "1")]
    pub object_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetObjectInfoResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub error: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub object: ::core::option::Option<ObjectInfo>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ExecuteSoftwareCommandRequest {
    #[prost(string, tag = "1")]
    pub command: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub params: ::prost::alloc::vec::Vec<Property>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ExecuteSoftwareCommandResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub error: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub output_file: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SaveProjectRequest {
    #[prost(string, tag = "1")]
    pub filename: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SaveProjectResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub error: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub filename: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct LoadProjectRequest {
    #[prost(string, tag = "1")]
    pub filename: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct LoadProjectResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub error: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub filename: ::prost::alloc::string::String,
    #[prost(int32, tag = "5")]
    pub objects_loaded: i32,
}
