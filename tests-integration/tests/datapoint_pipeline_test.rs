//! Integration tests for the datapoint pipeline
//!
//! Tests the full flow: HTTP upload → decode → convert → export → downstream sink

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use acceptor::export::HttpMetricsExporter;
use acceptor::handler::datapoint_handler::DATAPOINT_CONTENT_TYPE;
use acceptor::serve_datapoint_http;
use acceptor::testing::MetricsReceiverSink;
use common::model::{
    AggregationTemporality, DoubleDataPoint, Gauge, IntDataPoint, IntGauge, IntSum, Metric,
    Metrics, metric,
};
use common::wire::proto::MetricKind;
use tests_integration::generators::{
    double_datapoint, encode_upload, int_datapoint, string_datapoint,
};
use tests_integration::{create_test_config, init_test_logging};
use tokio::sync::oneshot;

const TS_MILLIS: i64 = 1_700_000_000_123;
const TS_NANOS: u64 = 1_700_000_000_123_000_000;

struct Pipeline {
    sink: MetricsReceiverSink,
    acceptor_url: String,
    shutdown_tx: oneshot::Sender<()>,
    stopped_rx: oneshot::Receiver<()>,
}

/// Stand up sink and acceptor on ephemeral ports, wired together.
async fn start_pipeline() -> Pipeline {
    init_test_logging();

    let mut sink = MetricsReceiverSink::builder()
        .with_endpoint("127.0.0.1:0")
        .build()
        .expect("Failed to build receiver sink");
    sink.start().await.expect("Failed to start receiver sink");

    let config = create_test_config(&sink.metrics_url().unwrap());
    let exporter =
        Arc::new(HttpMetricsExporter::new(&config.exporter).expect("Failed to build exporter"));

    let (init_tx, init_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (stopped_tx, stopped_rx) = oneshot::channel();

    tokio::spawn(async move {
        serve_datapoint_http(&config, exporter, init_tx, shutdown_rx, stopped_tx)
            .await
            .expect("Failed to start datapoint http server");
    });

    let local_addr = init_rx
        .await
        .expect("Failed to receive init signal from datapoint http server");

    Pipeline {
        sink,
        acceptor_url: format!("http://{local_addr}/v2/datapoint"),
        shutdown_tx,
        stopped_rx,
    }
}

impl Pipeline {
    async fn upload(&self, body: Vec<u8>) -> reqwest::StatusCode {
        reqwest::Client::new()
            .post(&self.acceptor_url)
            .header("content-type", DATAPOINT_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .expect("Failed to reach acceptor")
            .status()
    }

    async fn wait_for_data_points(&self, expected: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while self.sink.data_point_count().await < expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "Timed out waiting for {expected} data points"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.stopped_rx.await;
        self.sink
            .shutdown()
            .await
            .expect("Failed to shut down receiver sink");
    }
}

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[tokio::test]
async fn test_datapoint_upload_reaches_downstream_sink() {
    let pipeline = start_pipeline().await;

    let body = encode_upload(vec![
        double_datapoint(
            "cpu.utilization",
            MetricKind::Gauge,
            0.5,
            Some(TS_MILLIS),
            &[("host", "web-1")],
        ),
        int_datapoint(
            "requests.count",
            MetricKind::Counter,
            42,
            Some(TS_MILLIS),
            &[("host", "web-1")],
        ),
    ]);

    assert_eq!(pipeline.upload(body).await, reqwest::StatusCode::OK);

    let mut expected = Metrics::new_single_scope();
    expected.resource_metrics[0].scope_metrics[0].metrics = vec![
        Metric {
            name: "cpu.utilization".to_string(),
            data: Some(metric::Data::Gauge(Gauge {
                data_points: vec![DoubleDataPoint {
                    labels: labels(&[("host", "web-1")]),
                    time_unix_nano: TS_NANOS,
                    value: 0.5,
                }],
            })),
        },
        Metric {
            name: "requests.count".to_string(),
            data: Some(metric::Data::IntSum(IntSum {
                data_points: vec![IntDataPoint {
                    labels: labels(&[("host", "web-1")]),
                    time_unix_nano: TS_NANOS,
                    value: 42,
                }],
                aggregation_temporality: AggregationTemporality::Cumulative as i32,
                is_monotonic: true,
            })),
        },
    ];

    pipeline
        .sink
        .assert_all_metrics_received(&expected.resource_metrics, Duration::from_secs(2))
        .await
        .expect("Converted tree never reached the sink");

    pipeline.shutdown().await;
}

#[tokio::test]
async fn test_mixed_upload_drops_bad_records_but_delivers_rest() {
    let pipeline = start_pipeline().await;

    let body = encode_upload(vec![
        string_datapoint("build.info", MetricKind::Gauge, "1.2.3"),
        int_datapoint(
            "queue.depth",
            MetricKind::Gauge,
            17,
            Some(TS_MILLIS),
            &[("queue", "ingest")],
        ),
        int_datapoint("uptime.seconds", MetricKind::Timestamp, 12_345, None, &[]),
    ]);

    assert_eq!(pipeline.upload(body).await, reqwest::StatusCode::OK);

    let mut expected = Metrics::new_single_scope();
    expected.resource_metrics[0].scope_metrics[0].metrics = vec![Metric {
        name: "queue.depth".to_string(),
        data: Some(metric::Data::IntGauge(IntGauge {
            data_points: vec![IntDataPoint {
                labels: labels(&[("queue", "ingest")]),
                time_unix_nano: TS_NANOS,
                value: 17,
            }],
        })),
    }];

    pipeline
        .sink
        .assert_all_metrics_received(&expected.resource_metrics, Duration::from_secs(2))
        .await
        .expect("Surviving record never reached the sink");

    assert_eq!(pipeline.sink.data_point_count().await, 1);

    pipeline.shutdown().await;
}

#[tokio::test]
async fn test_undecodable_upload_is_rejected() {
    let pipeline = start_pipeline().await;

    let status = pipeline.upload(b"\xff\xff definitely not protobuf".to_vec()).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);

    // Nothing was exported
    assert_eq!(pipeline.sink.data_point_count().await, 0);

    pipeline.shutdown().await;
}

#[tokio::test]
async fn test_each_upload_produces_one_tree() {
    let pipeline = start_pipeline().await;

    for value in [1, 2] {
        let body = encode_upload(vec![int_datapoint(
            "requests.count",
            MetricKind::Counter,
            value,
            Some(TS_MILLIS),
            &[],
        )]);
        assert_eq!(pipeline.upload(body).await, reqwest::StatusCode::OK);
    }

    pipeline.wait_for_data_points(2).await;
    assert_eq!(pipeline.sink.all_metrics().await.len(), 2);

    pipeline.shutdown().await;
}

#[tokio::test]
async fn test_timestampless_datapoint_gets_receive_time() {
    let pipeline = start_pipeline().await;

    let nanos_now = |time: SystemTime| {
        time.duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0)
    };

    let before = nanos_now(SystemTime::now());
    let body = encode_upload(vec![int_datapoint(
        "queue.depth",
        MetricKind::Gauge,
        3,
        None,
        &[],
    )]);
    assert_eq!(pipeline.upload(body).await, reqwest::StatusCode::OK);
    let after = nanos_now(SystemTime::now());

    pipeline.wait_for_data_points(1).await;

    let received = pipeline.sink.all_metrics().await;
    let Some(metric::Data::IntGauge(gauge)) =
        &received[0].resource_metrics[0].scope_metrics[0].metrics[0].data
    else {
        panic!("expected an int gauge");
    };

    let stamped = gauge.data_points[0].time_unix_nano;
    assert!(
        (before..=after).contains(&stamped),
        "receive-time stamp {stamped} outside [{before}, {after}]"
    );

    pipeline.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_downstream_yields_bad_gateway() {
    init_test_logging();

    // Nothing listens on the exporter endpoint
    let config = create_test_config("http://127.0.0.1:9/v1/metrics");
    let exporter =
        Arc::new(HttpMetricsExporter::new(&config.exporter).expect("Failed to build exporter"));

    let (init_tx, init_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (stopped_tx, stopped_rx) = oneshot::channel();

    tokio::spawn(async move {
        serve_datapoint_http(&config, exporter, init_tx, shutdown_rx, stopped_tx)
            .await
            .expect("Failed to start datapoint http server");
    });

    let local_addr = init_rx.await.expect("Failed to receive init signal");

    let body = encode_upload(vec![int_datapoint(
        "requests.count",
        MetricKind::Counter,
        1,
        Some(TS_MILLIS),
        &[],
    )]);

    let status = reqwest::Client::new()
        .post(format!("http://{local_addr}/v2/datapoint"))
        .header("content-type", DATAPOINT_CONTENT_TYPE)
        .body(body)
        .send()
        .await
        .expect("Failed to reach acceptor")
        .status();

    assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);

    let _ = shutdown_tx.send(());
    let _ = stopped_rx.await;
}
