//! Turns the JSON report of a finished iperf3 run into a flat list of [NormalizedSample]s.
//!
//! Two report shapes are understood. A TCP client report carries its intervals at the top level,
//! a UDP client run with `--get-server-output` carries the server's report, and its intervals,
//! under `server_output_json`. [crunch_samples] detects the shape and emits one sample per stream
//! per interval.

mod crunch;
mod error;
pub mod report;
mod sample;

pub use crunch::{crunch, crunch_samples, Cruncher, Iperf3Cruncher};
pub use error::CrunchError;
pub use sample::{NormalizedSample, TcpStats, TransportStats, UdpStats};
