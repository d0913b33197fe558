use std::path::Path;

use trafic_cruncher::{crunch, crunch_samples, NormalizedSample, TransportStats, UdpStats};

fn load(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
}

#[test]
fn tcp_report_yields_every_stream_of_every_interval() {
    let samples = crunch_samples(&load("tcp_two_streams.json")).unwrap();

    let ids: Vec<_> = samples.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "bulk-1714989600-5",
            "bulk-1714989600-7",
            "bulk-1714989600-5",
            "bulk-1714989600-7",
        ]
    );

    let last = samples.last().unwrap();
    assert_eq!(last.start, 1714989600.0 + 1.000123);
    assert_eq!(last.end, 1714989600.0 + 2.000087);
    match &last.stats {
        TransportStats::Tcp(tcp) => {
            assert_eq!(tcp.retransmits, 3);
            assert_eq!(tcp.rtt_ms, 2.39);
            assert_eq!(tcp.pmtu, 1500);
        }
        other => panic!("Expected TCP stats, got {other:?}"),
    }
}

#[test]
fn udp_report_is_read_from_server_output() {
    let samples = crunch_samples(&load("udp_server_output.json")).unwrap();

    assert_eq!(samples.len(), 2);
    pretty_assertions::assert_eq!(
        samples[0],
        NormalizedSample {
            id: "voip-1714989900-5".to_string(),
            start: 1714989900.0,
            end: 1714989900.0 + 1.000212,
            bytes: 7840,
            bps: 62706.7,
            stats: TransportStats::Udp(UdpStats {
                jitter_ms: 0.0412,
                lost_packets: 1,
                lost_percent: 2.0,
                packets: 50,
            }),
        }
    );
}

#[test]
fn crunched_document_reads_back_as_samples() {
    let raw = load("tcp_two_streams.json");
    let out = crunch(&raw).unwrap();

    let decoded: Vec<NormalizedSample> = serde_json::from_slice(&out).unwrap();
    assert_eq!(decoded, crunch_samples(&raw).unwrap());
}
