#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`DockerError`)
//! - [`config`]: Subscription configuration (`SubscriberConfig`, builder)
//! - [`types`]: Inspected container metadata (`ContainerDetails`, `ContainerNetworkInfo`)
//! - [`event`]: Container lifecycle events (`ContainerEvent`, `ContainerEventKind`)
//! - [`docker`]: Docker API abstraction (`DockerClient` trait, `BollardDockerClient`)
//! - [`observer`]: Event callbacks (`ContainerObserver`)
//! - [`backoff`]: Reconnect interval state (`ReconnectBackoff`)
//! - [`subscriber`]: Reconnecting event subscription (`EventSubscriber`)
//! - [`address`]: Container address resolution
//! - [`runtime`]: Facade over a client (`DockerRuntime`)
//!
//! # Architecture
//!
//! ```text
//! Docker events --stream--> EventSubscriber --> ContainerObserver
//!                               |
//!                        ReconnectBackoff (sleep, grow, reset)
//!
//! container_ip(id) --> inspect_container --> resolve_address
//! ```

pub mod address;
pub mod backoff;
pub mod config;
pub mod docker;
pub mod error;
pub mod event;
pub mod observer;
pub mod runtime;
pub mod subscriber;
pub mod types;

// --- Public API Re-exports ---

// Facade
pub use runtime::DockerRuntime;

// Configuration
pub use config::{SubscriberConfig, SubscriberConfigBuilder};

// Error
pub use error::DockerError;

// Events
pub use event::{ContainerEvent, ContainerEventKind};
pub use observer::ContainerObserver;

// Docker API
pub use docker::{BollardDockerClient, ContainerEventStream, DockerClient, normalize_endpoint};
pub use types::{ContainerDetails, ContainerNetworkInfo, ContainerState, NetworkEndpoint, RuntimeVersion};

// Subscription
pub use backoff::ReconnectBackoff;
pub use subscriber::EventSubscriber;

// Address resolution
pub use address::{LOOPBACK_ADDRESS, resolve_address, resolve_container_address};
