//! Explorer gateway: remote API access and the bootstrap pipeline.
mod bootstrap;
mod client;
mod credentials;
mod fault;
mod gateway;
mod handle;

pub use bootstrap::{
    BootstrapData, BootstrapErrorType, BootstrapObserver, BootstrapOptions, BootstrapPipeline,
    PipelineResult, StageId, StageReport, StageState, StageStatus,
};
pub use client::PlatformClient;
pub use credentials::CredentialContext;
pub use fault::Fault;
pub use gateway::{CallMethod, GatewayConfig, RemoteApiGateway, TOKEN_HEADER};
pub use handle::{ClientEvent, ClientHandle, Command};
