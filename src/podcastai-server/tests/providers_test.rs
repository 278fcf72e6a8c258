//! Provider clients against local stub servers.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use podcastai_core::config::{ScriptConfig, SpeechConfig, SpeechProviderKind};
use podcastai_core::{
    AudioFormat, AudioOutput, AudioStore, AudioSynthesizer, OpenAiTextGenerator, PodcastError,
    Presenter, Script, ScriptGenerator, ScriptLine, TextGenerator, create_speech_provider,
    default_config,
};

type Captured = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

async fn chat_completions(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    captured.lock().unwrap().push((headers, body.clone()));

    if body["model"] == "missing-model" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "message": "model not found",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": null
                }
            })),
        )
            .into_response();
    }

    let content = r#"```json
{"title":"AI Moves Fast","script":[
  {"speaker":"Alex","line":"AI is moving fast."},
  {"speaker":"Sara","line":"Maybe too fast."}]}
```"#;

    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": body["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
    }))
    .into_response()
}

async fn elevenlabs_speech(
    State(captured): State<Captured>,
    Path(voice_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    captured.lock().unwrap().push((headers.clone(), body.clone()));

    if headers.get("xi-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    let text = body["text"].as_str().unwrap_or_default();
    if text == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "synthesis failed").into_response();
    }

    format!("<{}|{}>", voice_id, text).into_response()
}

/// Returns a mono WAV clip with one sample per input character.
async fn openai_speech(State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    captured.lock().unwrap().push((headers, body.clone()));

    let text = body["input"].as_str().unwrap_or_default();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
        for (i, _) in text.chars().enumerate() {
            writer.write_sample(i as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    buffer.into_response()
}

fn stub_router(captured: Captured) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/text-to-speech/{voice_id}", post(elevenlabs_speech))
        .route("/v1/audio/speech", post(openai_speech))
        .with_state(captured)
}

fn presenters() -> Vec<Presenter> {
    vec![
        Presenter::new("Alex", "optimistic").with_voice("voice-alex"),
        Presenter::new("Sara", "skeptical").with_voice("voice-sara"),
    ]
}

fn script_config(base: &str, model: &str) -> ScriptConfig {
    ScriptConfig {
        api_base: base.to_string(),
        api_key: "test-key".to_string(),
        model: model.to_string(),
        timeout_secs: 5,
        ..ScriptConfig::default()
    }
}

#[tokio::test]
async fn given_chat_stub_when_generating_script_then_fenced_reply_is_parsed() {
    let captured = Captured::default();
    let base = spawn_stub(stub_router(captured.clone())).await;

    let provider = OpenAiTextGenerator::new(&script_config(&base, "test-model")).unwrap();
    let generator = ScriptGenerator::new(Arc::new(provider), Arc::new(default_config()));

    let script = generator
        .generate_script("AI is evolving fast.", "Tech News", &presenters())
        .await
        .unwrap();

    assert_eq!(script.title, "AI Moves Fast");
    assert_eq!(script.speakers(), vec!["Alex", "Sara"]);

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["authorization"], "Bearer test-key");
    assert_eq!(body["model"], "test-model");

    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("AI is evolving fast."));
    assert!(prompt.contains("Tech News"));
    assert!(prompt.contains("Sara"));
}

#[tokio::test]
async fn given_api_error_when_generating_then_upstream_error() {
    let captured = Captured::default();
    let base = spawn_stub(stub_router(captured.clone())).await;

    let provider = OpenAiTextGenerator::new(&script_config(&base, "missing-model")).unwrap();
    let err = provider.generate("hello").await.unwrap_err();

    assert!(matches!(err, PodcastError::Upstream { .. }));
    assert!(err.to_string().contains("model not found"));
}

#[tokio::test]
async fn given_elevenlabs_stub_when_synthesizing_then_clips_join_in_script_order() {
    let captured = Captured::default();
    let base = spawn_stub(stub_router(captured.clone())).await;
    let dir = tempfile::tempdir().unwrap();

    let config = SpeechConfig {
        api_base: base,
        api_key: "test-key".to_string(),
        timeout_secs: 5,
        ..SpeechConfig::default()
    };
    let provider = create_speech_provider(&config).unwrap();
    let synthesizer = AudioSynthesizer::new(provider, AudioStore::new(dir.path()).unwrap(), 3);

    let script = Script::new(
        "Order",
        vec![
            ScriptLine::new("Alex", "one"),
            ScriptLine::new("Sara", "two"),
            ScriptLine::new("Alex", "three"),
            ScriptLine::new("Sara", "four"),
        ],
    );

    let audio = synthesizer.synthesize(&script, &presenters(), false).await.unwrap();

    let AudioOutput::File { filename } = &audio.output else {
        panic!("expected a stored file");
    };
    let bytes = synthesizer.store().read(filename).await.unwrap();
    assert_eq!(
        bytes,
        b"<voice-alex|one><voice-sara|two><voice-alex|three><voice-sara|four>"
    );

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 4);
    for (headers, body) in requests.iter() {
        assert_eq!(headers["accept"], "audio/mpeg");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert!(body["voice_settings"]["stability"].is_number());
    }
}

#[tokio::test]
async fn given_failing_line_when_synthesizing_then_no_file_is_written() {
    let captured = Captured::default();
    let base = spawn_stub(stub_router(captured)).await;
    let dir = tempfile::tempdir().unwrap();

    let config = SpeechConfig {
        api_base: base,
        api_key: "test-key".to_string(),
        timeout_secs: 5,
        ..SpeechConfig::default()
    };
    let provider = create_speech_provider(&config).unwrap();
    let synthesizer = AudioSynthesizer::new(provider, AudioStore::new(dir.path()).unwrap(), 2);

    let script = Script::new(
        "Broken",
        vec![ScriptLine::new("Alex", "fine"), ScriptLine::new("Sara", "boom")],
    );

    let err = synthesizer.synthesize(&script, &presenters(), false).await.unwrap_err();

    assert_eq!(err.kind(), "upstream_error");
    assert!(err.to_string().contains("500"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn given_wrong_key_when_synthesizing_then_upstream_error() {
    let captured = Captured::default();
    let base = spawn_stub(stub_router(captured)).await;

    let config = SpeechConfig {
        api_base: base,
        api_key: "wrong-key".to_string(),
        timeout_secs: 5,
        ..SpeechConfig::default()
    };
    let provider = create_speech_provider(&config).unwrap();

    let err = provider.synthesize("hello", "voice-alex").await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn given_openai_wav_stub_when_synthesizing_then_single_wav_holds_every_clip() {
    let captured = Captured::default();
    let base = spawn_stub(stub_router(captured.clone())).await;
    let dir = tempfile::tempdir().unwrap();

    let config = SpeechConfig {
        provider: SpeechProviderKind::OpenAi,
        api_base: base,
        api_key: "test-key".to_string(),
        model: "tts-1".to_string(),
        format: AudioFormat::Wav,
        timeout_secs: 5,
        ..SpeechConfig::default()
    };
    let provider = create_speech_provider(&config).unwrap();
    let synthesizer = AudioSynthesizer::new(provider, AudioStore::new(dir.path()).unwrap(), 2);

    let presenters = vec![
        Presenter::new("Alex", "").with_voice("alloy"),
        Presenter::new("Sara", "").with_voice("nova"),
    ];
    let script = Script::new(
        "Wave",
        vec![ScriptLine::new("Alex", "abc"), ScriptLine::new("Sara", "defgh")],
    );

    let audio = synthesizer.synthesize(&script, &presenters, true).await.unwrap();
    assert_eq!(audio.format, AudioFormat::Wav);

    let AudioOutput::Base64(data) = &audio.output else {
        panic!("expected inline audio");
    };
    let wav = BASE64.decode(data).unwrap();
    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    assert_eq!(reader.spec().sample_rate, 24_000);

    let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, vec![0, 1, 2, 0, 1, 2, 3, 4]);

    let requests = captured.lock().unwrap();
    let voices: Vec<&str> = requests
        .iter()
        .map(|(_, body)| body["voice"].as_str().unwrap())
        .collect();
    assert_eq!(voices.len(), 2);
    assert!(voices.contains(&"alloy") && voices.contains(&"nova"));
    for (headers, body) in requests.iter() {
        assert_eq!(headers["authorization"], "Bearer test-key");
        assert_eq!(body["response_format"], "wav");
    }
}
