//! Streaming HTTP relay.
//!
//! Forwards one inbound request to an upstream HTTP service and streams the
//! response back chunk by chunk. The relay is dumb about payloads: bytes are
//! forwarded verbatim, in order, and abandoned promptly when either side
//! goes away.
//!
//! The pieces:
//! - [`RelayRequest`]: validated description of the upstream call.
//! - [`UpstreamConnector`] / [`UpstreamClient`]: opens the call under a deadline.
//! - [`DownstreamWriter`]: sink contract implemented by server adapters.
//! - [`pump`]: the read-one-write-one loop.
//! - [`RelaySupervisor`]: lifecycle, error responses and terminal logging.

#![deny(unsafe_code)]

pub mod downstream;
pub mod error;
pub mod headers;
pub mod pump;
pub mod request;
pub mod state;
pub mod supervisor;
pub mod upstream;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use downstream::{DownstreamWriter, PeerLiveness};
pub use error::RelayError;
pub use headers::{downstream_headers, should_forward_header};
pub use pump::pump;
pub use request::{RelayRequest, RelayRequestBuilder};
pub use state::{FailureSide, RelayCounters, RelayOutcome, RelayState, RelayStatus};
pub use supervisor::{RelayReport, RelaySupervisor};
pub use upstream::{
    ChunkResult, ChunkStream, ReleaseSignal, UpstreamClient, UpstreamConnector, UpstreamHandle,
    collect_chunks,
};
