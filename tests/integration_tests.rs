use std::{io::{Read, Write}, net::{TcpListener, TcpStream}, thread, time::{Duration, Instant}};

use table_sizes::endpoints::{EndpointRegistry, ServerId};
use table_sizes::error::FailureReason;
use table_sizes::table_size::{SegmentSizeInfo, TableSizeReader};
use table_sizes::transport::HttpTransport;

/// How a stub server answers every request.
#[derive(Clone)]
enum Behaviour {
    /// wait, then answer with status and body.
    Answer { delay_ms: u64, status: u16, body: &'static str },
    /// accept the connection and never answer.
    Silent,
}

/// Start a stub http server on a free local port, and return its `host:port`.
fn stub_server(behaviour: Behaviour) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let hostname_port = listener.local_addr().unwrap().to_string();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(_) => continue,
            };
            let behaviour = behaviour.clone();
            thread::spawn(move || handle(stream, behaviour));
        }
    });
    hostname_port
}

fn handle(mut stream: TcpStream, behaviour: Behaviour) {
    // read the request head.
    let mut request = Vec::new();
    let mut buffer = [0_u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buffer) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buffer[..n]),
        }
    }
    match behaviour {
        Behaviour::Answer { delay_ms, status, body } => {
            thread::sleep(Duration::from_millis(delay_ms));
            let response = format!(
                "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        },
        Behaviour::Silent => {
            thread::sleep(Duration::from_secs(30));
        },
    }
}

/// A `host:port` on which nothing listens.
fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

fn reader(parallel: usize) -> TableSizeReader<HttpTransport> {
    TableSizeReader::new(HttpTransport::new(Duration::from_secs(1), 2).unwrap(), parallel).unwrap()
}

#[test]
fn integration_all_servers_respond() {
    let body = r#"{"tableName":"t1_OFFLINE","diskSizeInBytes":300,"segments":[{"segmentName":"s1","diskSizeInBytes":100},{"segmentName":"s2","diskSizeInBytes":200}]}"#;
    let servers = (0..4)
        .map(|nr| format!("S{}={}", nr, stub_server(Behaviour::Answer { delay_ms: 10 * nr, status: 200, body })))
        .collect::<Vec<_>>()
        .join(",");
    let registry = EndpointRegistry::parse_server_list(&servers).unwrap();

    let result = reader(4).get_segment_size_info_from_servers(&registry, "t1_OFFLINE", 5000).unwrap();

    assert!(result.is_complete());
    assert_eq!(result.responded(), 4);
    assert_eq!(result.invited, 4);
    for segments in result.responses.values() {
        assert_eq!(segments.iter().map(|s| s.disk_size_in_bytes).sum::<u64>(), 300);
    }
}

#[test]
fn integration_ok_error_silent() {
    let registry = EndpointRegistry::parse_server_list(&format!(
        "A={},B={},C={}",
        stub_server(Behaviour::Answer { delay_ms: 50, status: 200, body: r#"{"segments":[{"id":"s1","size":100}]}"# }),
        stub_server(Behaviour::Answer { delay_ms: 30, status: 500, body: "" }),
        stub_server(Behaviour::Silent),
    )).unwrap();

    let timer = Instant::now();
    let result = reader(3).get_segment_size_info_from_servers(&registry, "t1", 1000).unwrap();
    let elapsed = timer.elapsed();

    assert_eq!(result.responded(), 1);
    assert_eq!(result.invited, 3);
    assert_eq!(result.responses[&ServerId::from("A")], vec![SegmentSizeInfo { segment_name: "s1".to_string(), disk_size_in_bytes: 100 }]);
    assert_eq!(result.failures.get(&ServerId::from("B")), Some(&FailureReason::Status(500)));
    assert_eq!(result.failures.get(&ServerId::from("C")), Some(&FailureReason::Timeout));
    assert!(elapsed >= Duration::from_millis(950), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2000), "{:?}", elapsed);
}

#[test]
fn integration_many_silent_servers_share_one_deadline() {
    let servers = (0..6)
        .map(|nr| format!("S{}={}", nr, stub_server(Behaviour::Silent)))
        .collect::<Vec<_>>()
        .join(",");
    let registry = EndpointRegistry::parse_server_list(&servers).unwrap();

    let timer = Instant::now();
    // fewer workers than servers: the servers still waiting for a worker at the deadline are not read at all.
    let result = reader(2).get_segment_size_info_from_servers(&registry, "t1", 500).unwrap();

    assert!(timer.elapsed() < Duration::from_millis(1500), "{:?}", timer.elapsed());
    assert_eq!(result.responded(), 0);
    assert_eq!(result.failures.len(), 6);
}

#[test]
fn integration_refused_and_malformed_are_isolated() {
    let registry = EndpointRegistry::parse_server_list(&format!(
        "A={},B={},C={}",
        stub_server(Behaviour::Answer { delay_ms: 0, status: 200, body: r#"{"segments":[{"id":"s1","size":7}]}"# }),
        refused_endpoint(),
        stub_server(Behaviour::Answer { delay_ms: 0, status: 200, body: "<html>not json</html>" }),
    )).unwrap();

    let result = reader(3).get_segment_size_info_from_servers(&registry, "t1", 3000).unwrap();

    assert_eq!(result.responses.keys().collect::<Vec<_>>(), vec![&ServerId::from("A")]);
    assert!(matches!(result.failures.get(&ServerId::from("B")), Some(FailureReason::Transport(_))));
    assert!(matches!(result.failures.get(&ServerId::from("C")), Some(FailureReason::Decode(_))));
}

#[test]
fn integration_reader_is_reused_across_calls() {
    let registry = EndpointRegistry::parse_server_list(&format!(
        "A={},B={}",
        stub_server(Behaviour::Answer { delay_ms: 0, status: 200, body: r#"{"segments":[]}"# }),
        stub_server(Behaviour::Silent),
    )).unwrap();
    let reader = reader(2);

    for _ in 0..3 {
        let allsizes = reader.read_table_sizes(&registry, "t1", 300).unwrap();
        assert_eq!(allsizes.table_sizes.len(), 2);
        assert_eq!(allsizes.responded(), 1);
        assert_eq!(allsizes.total_disk_size_in_bytes(), 0);
    }
}
