//! The subset of the iperf3 JSON report that is normalized. Field names match the report.

use serde::Deserialize;

/// Value of `start.test_start.protocol` in a TCP report.
pub const TCP_PROTOCOL: &str = "TCP";

/// Report of a TCP client run.
#[derive(Debug, Clone, Deserialize)]
pub struct TcpReport {
    /// Set with `--title`; iperf3 omits it otherwise.
    #[serde(default)]
    pub title: String,
    pub start: TcpStart,
    pub intervals: Vec<Interval<TcpStream>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TcpStart {
    pub timestamp: Timestamp,
    pub test_start: TestStart,
}

/// Report of a client run made with `--get-server-output`, normalized from the server side.
#[derive(Debug, Clone, Deserialize)]
pub struct UdpReport {
    #[serde(default)]
    pub title: String,
    pub server_output_json: UdpServerOutput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UdpServerOutput {
    pub start: UdpStart,
    pub intervals: Vec<Interval<UdpStream>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UdpStart {
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Timestamp {
    /// Test start, in seconds since the epoch.
    pub timesecs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestStart {
    pub protocol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interval<S> {
    pub streams: Vec<S>,
}

/// Per-stream record of a TCP interval. The congestion and RTT fields are only reported by the
/// sending side, so they default to zero in a receiver report.
#[derive(Debug, Clone, Deserialize)]
pub struct TcpStream {
    pub socket: i64,
    /// Seconds since the test start.
    pub start: f64,
    pub end: f64,
    pub bytes: u64,
    pub bits_per_second: f64,
    #[serde(default)]
    pub retransmits: u64,
    #[serde(default)]
    pub snd_cwnd: u64,
    /// Microseconds.
    #[serde(default)]
    pub rtt: u64,
    #[serde(default)]
    pub rttvar: u64,
    #[serde(default)]
    pub pmtu: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UdpStream {
    pub socket: i64,
    pub start: f64,
    pub end: f64,
    pub bytes: u64,
    pub bits_per_second: f64,
    pub jitter_ms: f64,
    pub lost_packets: u64,
    pub lost_percent: f64,
    pub packets: u64,
}
