use serde::{Deserialize, Serialize};

/// One measurement of one stream over one reporting interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSample {
    /// `{title}-{test start epoch}-{socket}`. Identical for every interval of the same stream,
    /// so it can be used to join the samples of a stream. A sample is keyed by `(id, start)`.
    pub id: String,
    /// Seconds since the epoch.
    pub start: f64,
    pub end: f64,
    pub bytes: u64,
    /// Bits per second.
    pub bps: f64,
    #[serde(flatten)]
    pub stats: TransportStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransportStats {
    Tcp(TcpStats),
    Udp(UdpStats),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TcpStats {
    pub retransmits: u64,
    pub snd_cwnd: u64,
    pub rtt_ms: f64,
    pub rtt_var: u64,
    pub pmtu: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UdpStats {
    pub jitter_ms: f64,
    pub lost_packets: u64,
    pub lost_percent: f64,
    pub packets: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tcp_sample_is_flat() {
        let sample = NormalizedSample {
            id: "abc-1000-5".to_string(),
            start: 1000.0,
            end: 1001.0,
            bytes: 1024,
            bps: 8192.0,
            stats: TransportStats::Tcp(TcpStats {
                retransmits: 1,
                snd_cwnd: 2,
                rtt_ms: 1.5,
                rtt_var: 3,
                pmtu: 1500,
            }),
        };

        assert_eq!(
            serde_json::to_value(&sample).unwrap(),
            json!({
                "id": "abc-1000-5",
                "start": 1000.0,
                "end": 1001.0,
                "bytes": 1024,
                "bps": 8192.0,
                "retransmits": 1,
                "snd-cwnd": 2,
                "rtt-ms": 1.5,
                "rtt-var": 3,
                "pmtu": 1500,
            })
        );
    }

    #[test]
    fn udp_sample_reads_back() {
        let value = json!({
            "id": "voip-1000-5",
            "start": 1000.0,
            "end": 1001.0,
            "bytes": 8000,
            "bps": 64000.0,
            "jitter-ms": 0.25,
            "lost-packets": 2,
            "lost-percent": 4.0,
            "packets": 50,
        });

        let sample: NormalizedSample = serde_json::from_value(value).unwrap();
        assert_eq!(
            sample.stats,
            TransportStats::Udp(UdpStats {
                jitter_ms: 0.25,
                lost_packets: 2,
                lost_percent: 4.0,
                packets: 50,
            })
        );
    }
}
