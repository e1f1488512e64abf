//! Sessions over an HTTP-FLV source served by a mock server.

mod common;

use common::{fast_config, FlvBuilder, RecordingPresenter, FLAGS_AUDIO_VIDEO};
use flvscope::config::SourceConfig;
use flvscope::session::{Session, SessionError, SessionOutcome};
use flvscope::source::ByteSource;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn test_http_stream_completes() {
    let server = MockServer::start().await;
    let body = FlvBuilder::new(FLAGS_AUDIO_VIDEO)
        .video(0)
        .audio(20)
        .video(40)
        .audio(50)
        .build();
    Mock::given(method("GET"))
        .and(path("/live/room.flv"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/x-flv")
                .set_body_bytes(body),
        )
        .mount(&server)
        .await;

    let source = ByteSource::from_arg(&format!("{}/live/room.flv", server.uri()));
    assert!(source.is_live());

    let mut presenter = RecordingPresenter::default();
    let outcome = Session::open(source, SourceConfig::default(), fast_config())
        .run(&mut presenter, CancellationToken::new())
        .await
        .unwrap();

    match outcome {
        SessionOutcome::Completed(summary) => {
            assert_eq!(summary.max_deviation_ms, 20);
            assert_eq!(summary.final_duration_ms, 40);
        }
        other => panic!("expected completion, got {:?}", other),
    }
    assert_eq!(presenter.values(), vec![20, 10]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_error_status_is_source_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = ByteSource::from_arg(&format!("{}/live/gone.flv", server.uri()));
    let mut presenter = RecordingPresenter::default();
    let outcome = Session::open(source, SourceConfig::default(), fast_config())
        .run(&mut presenter, CancellationToken::new())
        .await;

    assert!(matches!(outcome, Err(SessionError::Source(_))));
    assert!(presenter.events.is_empty());
}
