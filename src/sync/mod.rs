//! Realtime Sync Client
//!
//! Local mirror of per-referee scoring state fed by the backend push
//! channel, plus the command gateway for user-initiated scan/setup/reset/
//! teardown requests with optimistic local writes.

pub mod client;
pub mod connection;
pub mod gateway;
pub mod messages;
pub mod mirror;
pub mod tracking;

pub use client::SyncClient;
pub use connection::{ChannelSource, ConnectionManager, ConnectionState, WsSource};
pub use gateway::{CommandError, ControlApi, HttpGateway};
pub use messages::{
    DeviceInfo, DeviceStatus, LinkStatus, PushMessage, RefereeDescriptor, RefereeMode, Score,
    ScorePayload, SetupRequest, TrackingFrame,
};
pub use mirror::{RefereeMirror, RefereeRecord};
pub use tracking::WindowTracker;
