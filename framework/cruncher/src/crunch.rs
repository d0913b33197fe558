use crate::error::CrunchError;
use crate::report::{TcpReport, UdpReport, TCP_PROTOCOL};
use crate::sample::{NormalizedSample, TcpStats, TransportStats, UdpStats};

/// Post-processing applied to the captured standard output of a finished run.
pub trait Cruncher: Send + Sync {
    /// Convert a raw report into the document handed back to the caller.
    fn crunch(&self, report: &[u8]) -> Result<Vec<u8>, CrunchError>;
}

/// [Cruncher] for iperf3 `--json` reports, see [crunch].
#[derive(Debug, Clone, Copy, Default)]
pub struct Iperf3Cruncher;

impl Cruncher for Iperf3Cruncher {
    fn crunch(&self, report: &[u8]) -> Result<Vec<u8>, CrunchError> {
        crunch(report)
    }
}

/// Normalize an iperf3 JSON report and encode the samples as a JSON array.
pub fn crunch(report: &[u8]) -> Result<Vec<u8>, CrunchError> {
    let samples = crunch_samples(report)?;
    serde_json::to_vec(&samples).map_err(CrunchError::Encoding)
}

/// Normalize an iperf3 JSON report.
///
/// A report whose `start.test_start.protocol` is `TCP` is read as a TCP report, even if it also
/// carries a server output. Any other report must carry a `server_output_json` object, which is
/// read instead. The first shape that matches wins; nothing is emitted for a report that matches
/// neither.
pub fn crunch_samples(report: &[u8]) -> Result<Vec<NormalizedSample>, CrunchError> {
    match serde_json::from_slice::<TcpReport>(report) {
        Ok(tcp) if tcp.start.test_start.protocol == TCP_PROTOCOL => {
            return Ok(tcp_samples(&tcp));
        }
        Ok(tcp) => log::debug!(
            "Report protocol is '{}', looking for the server output",
            tcp.start.test_start.protocol
        ),
        Err(e) => log::trace!("Not a TCP report: {e}"),
    }

    let udp = serde_json::from_slice::<UdpReport>(report)
        .map_err(CrunchError::UnrecognizedReportSchema)?;

    Ok(udp_samples(&udp))
}

fn sample_id(title: &str, start: i64, socket: i64) -> String {
    format!("{title}-{start}-{socket}")
}

fn tcp_samples(report: &TcpReport) -> Vec<NormalizedSample> {
    let start = report.start.timestamp.timesecs;
    let epoch = start as f64;

    report
        .intervals
        .iter()
        .flat_map(|interval| interval.streams.iter())
        .map(|stream| NormalizedSample {
            id: sample_id(&report.title, start, stream.socket),
            start: epoch + stream.start,
            end: epoch + stream.end,
            bytes: stream.bytes,
            bps: stream.bits_per_second,
            stats: TransportStats::Tcp(TcpStats {
                retransmits: stream.retransmits,
                snd_cwnd: stream.snd_cwnd,
                rtt_ms: stream.rtt as f64 / 1000.0,
                rtt_var: stream.rttvar,
                pmtu: stream.pmtu,
            }),
        })
        .collect()
}

fn udp_samples(report: &UdpReport) -> Vec<NormalizedSample> {
    let server = &report.server_output_json;
    let start = server.start.timestamp.timesecs;
    let epoch = start as f64;

    server
        .intervals
        .iter()
        .flat_map(|interval| interval.streams.iter())
        .map(|stream| NormalizedSample {
            id: sample_id(&report.title, start, stream.socket),
            start: epoch + stream.start,
            end: epoch + stream.end,
            bytes: stream.bytes,
            bps: stream.bits_per_second,
            stats: TransportStats::Udp(UdpStats {
                jitter_ms: stream.jitter_ms,
                lost_packets: stream.lost_packets,
                lost_percent: stream.lost_percent,
                packets: stream.packets,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::{json, Value};

    use super::*;

    fn tcp_stream(socket: i64, start: f64) -> Value {
        json!({
            "socket": socket,
            "start": start,
            "end": start + 1.0,
            "seconds": 1.0,
            "bytes": 1_250_000,
            "bits_per_second": 10_000_000.0,
            "retransmits": 2,
            "snd_cwnd": 87_380,
            "rtt": 1_500,
            "rttvar": 250,
            "pmtu": 1500,
            "omitted": false,
        })
    }

    fn udp_stream(socket: i64, start: f64) -> Value {
        json!({
            "socket": socket,
            "start": start,
            "end": start + 1.0,
            "seconds": 1.0,
            "bytes": 8_000,
            "bits_per_second": 64_000.0,
            "jitter_ms": 0.125,
            "lost_packets": 1,
            "packets": 50,
            "lost_percent": 2.0,
            "omitted": false,
        })
    }

    fn tcp_report(title: &str, timesecs: i64, intervals: usize, sockets: &[i64]) -> Value {
        let intervals: Vec<_> = (0..intervals)
            .map(|i| {
                json!({
                    "streams": sockets
                        .iter()
                        .map(|s| tcp_stream(*s, i as f64))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        json!({
            "title": title,
            "start": {
                "timestamp": { "time": "Thu, 01 Jan 1970 00:16:40 GMT", "timesecs": timesecs },
                "test_start": { "protocol": "TCP", "num_streams": sockets.len() },
            },
            "intervals": intervals,
        })
    }

    fn udp_report(title: &str, timesecs: i64, sockets: &[i64]) -> Value {
        json!({
            "title": title,
            "start": {
                "timestamp": { "timesecs": timesecs },
                "test_start": { "protocol": "UDP" },
            },
            "intervals": [],
            "server_output_json": {
                "start": { "timestamp": { "timesecs": timesecs + 1 } },
                "intervals": [{
                    "streams": sockets.iter().map(|s| udp_stream(*s, 0.0)).collect::<Vec<_>>(),
                }],
            },
        })
    }

    fn to_bytes(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn one_sample_per_stream_per_interval() {
        let samples = crunch_samples(&to_bytes(&tcp_report("abc", 1000, 1, &[5, 6]))).unwrap();

        let ids: Vec<_> = samples.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["abc-1000-5", "abc-1000-6"]);
    }

    #[test]
    fn tcp_fields_are_copied_with_unit_conversion() {
        let samples = crunch_samples(&to_bytes(&tcp_report("abc", 1000, 2, &[5]))).unwrap();

        let second = &samples[1];
        assert_eq!(second.start, 1001.0);
        assert_eq!(second.end, 1002.0);
        assert_eq!(second.bytes, 1_250_000);
        assert_eq!(second.bps, 10_000_000.0);
        assert_eq!(
            second.stats,
            TransportStats::Tcp(TcpStats {
                retransmits: 2,
                snd_cwnd: 87_380,
                rtt_ms: 1.5,
                rtt_var: 250,
                pmtu: 1500,
            })
        );
    }

    #[test]
    fn intervals_times_streams_samples() {
        let sockets = [4, 5, 6];
        let samples = crunch_samples(&to_bytes(&tcp_report("grid", 1000, 4, &sockets))).unwrap();

        assert_eq!(samples.len(), 4 * sockets.len());

        // The id names the stream; together with the start time it names the sample.
        let keys: HashSet<_> = samples
            .iter()
            .map(|s| (s.id.clone(), s.start.to_bits()))
            .collect();
        assert_eq!(keys.len(), samples.len());
        let ids: HashSet<_> = samples.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), sockets.len());
    }

    #[test]
    fn tcp_protocol_wins_over_server_output() {
        let mut report = tcp_report("both", 1000, 1, &[5]);
        report["server_output_json"] = udp_report("both", 1000, &[7])["server_output_json"].clone();

        let samples = crunch_samples(&to_bytes(&report)).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].id, "both-1000-5");
        assert!(matches!(samples[0].stats, TransportStats::Tcp(_)));
    }

    #[test]
    fn server_output_is_used_without_tcp_marker() {
        let samples = crunch_samples(&to_bytes(&udp_report("voip", 2000, &[5, 6]))).unwrap();

        let ids: Vec<_> = samples.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["voip-2001-5", "voip-2001-6"]);
        assert_eq!(samples[0].start, 2001.0);
        assert_eq!(samples[0].end, 2002.0);
        assert_eq!(
            samples[0].stats,
            TransportStats::Udp(UdpStats {
                jitter_ms: 0.125,
                lost_packets: 1,
                lost_percent: 2.0,
                packets: 50,
            })
        );
    }

    #[test]
    fn report_matching_neither_shape_is_rejected() {
        let mut report = tcp_report("x", 1000, 1, &[5]);
        report["start"]["test_start"]["protocol"] = json!("SCTP");

        let err = crunch_samples(&to_bytes(&report)).unwrap_err();
        assert!(matches!(err, CrunchError::UnrecognizedReportSchema(_)));
    }

    #[test]
    fn malformed_document_is_rejected() {
        let err = crunch(b"{\"title\": \"abc\", \"intervals\": [").unwrap_err();
        assert!(matches!(err, CrunchError::UnrecognizedReportSchema(_)));

        let err = crunch(b"iperf3: error - unable to connect to server").unwrap_err();
        assert!(matches!(err, CrunchError::UnrecognizedReportSchema(_)));
    }

    #[test]
    fn crunch_is_reproducible() {
        let report = to_bytes(&tcp_report("abc", 1000, 3, &[5, 6]));
        assert_eq!(crunch(&report).unwrap(), crunch(&report).unwrap());
    }

    #[test]
    fn crunch_emits_json_array() {
        let out = Iperf3Cruncher
            .crunch(&to_bytes(&tcp_report("abc", 1000, 1, &[5])))
            .unwrap();

        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["id"], "abc-1000-5");
        assert_eq!(value[0]["rtt-ms"], 1.5);
    }

    #[test]
    fn report_without_intervals_is_an_empty_array() {
        let out = crunch(&to_bytes(&tcp_report("abc", 1000, 0, &[]))).unwrap();
        assert_eq!(out, b"[]");
    }
}
