//! End-to-end runs of the analyzer over mock rendering and generation.

use std::sync::Arc;

use ai_client::AiError;
use siteprobe_common::{AnswerEntry, ContentRecord, ProbeError, QuestionSpec, WebsiteType};
use siteprobe_core::classifier::{ResultClassifier, CLASSIFY_SAMPLING};
use siteprobe_core::question::{QuestionGenerator, QUESTION_SAMPLING};
use siteprobe_core::testing::{analyzer, page, MockBackend, MockRenderer};
use siteprobe_core::Analyzer;

const SHOP_URL: &str = "https://shop.test/";

fn shop_renderer() -> Arc<MockRenderer> {
    Arc::new(MockRenderer::new().on_page(
        SHOP_URL,
        page("Shop", "Buy the latest devices", &["Our Products", "Support"]),
    ))
}

fn setup(backend: MockBackend) -> (Analyzer, Arc<MockRenderer>, Arc<MockBackend>) {
    let renderer = shop_renderer();
    let backend = Arc::new(backend);
    (analyzer(renderer.clone(), backend.clone()), renderer, backend)
}

#[tokio::test]
async fn json_with_surrounding_noise_is_used_verbatim() {
    let backend = Arc::new(MockBackend::new().reply(
        r#"noise {"question":"What are you looking for?","options":["A. Mac","B. iPad","C. iPhone","D. Watch"]} trailing"#,
    ));
    let generator = QuestionGenerator::new(backend.clone());
    let content = ContentRecord {
        title: "Shop".into(),
        ..Default::default()
    };

    let spec = generator.generate(&content).await.unwrap();

    assert_eq!(spec.question, "What are you looking for?");
    assert_eq!(spec.options, vec!["A. Mac", "B. iPad", "C. iPhone", "D. Watch"]);

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sampling, QUESTION_SAMPLING);
    assert!(calls[0].prompt.contains("Shop"));
}

#[tokio::test]
async fn line_fallback_keeps_three_options() {
    let backend = Arc::new(
        MockBackend::new().reply("Here is my answer:\nWhat do you need?\nA. Support\nB. Sales\nC. Docs"),
    );
    let generator = QuestionGenerator::new(backend);

    let spec = generator.generate(&ContentRecord::default()).await.unwrap();

    assert_eq!(spec.question, "What do you need?");
    assert_eq!(spec.options, vec!["A. Support", "B. Sales", "C. Docs"]);
}

#[tokio::test]
async fn unavailable_backend_fails_question_generation() {
    let (analyzer, _, _) = setup(
        MockBackend::new().fail(AiError::Network("connection refused".into())),
    );

    let err = analyzer.generate_question(SHOP_URL).await.unwrap_err();

    assert!(matches!(err, ProbeError::BackendUnavailable(_)), "got {err:?}");
}

#[tokio::test]
async fn rejected_request_is_a_backend_error() {
    let (analyzer, _, _) = setup(MockBackend::new().fail(AiError::Api {
        status: 401,
        message: "invalid api key".into(),
    }));

    let err = analyzer.generate_question(SHOP_URL).await.unwrap_err();

    assert!(matches!(err, ProbeError::Backend(_)), "got {err:?}");
}

#[tokio::test]
async fn unknown_page_is_an_extraction_error_and_backend_is_not_called() {
    let (analyzer, _, backend) = setup(MockBackend::new());

    let err = analyzer
        .generate_question("https://missing.test/")
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::Extraction(_)), "got {err:?}");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn blank_url_is_rejected_before_rendering() {
    let (analyzer, renderer, _) = setup(MockBackend::new());

    let err = analyzer.generate_question("   ").await.unwrap_err();

    assert!(matches!(err, ProbeError::InvalidRequest(_)));
    assert_eq!(renderer.render_count(), 0);
}

#[tokio::test]
async fn question_set_carries_content_and_profile() {
    let (analyzer, _, _) = setup(MockBackend::new().reply(
        r#"{"question":"Why are you here?","options":["A. Buy","B. Browse"]}"#,
    ));

    let set = analyzer.generate_question(SHOP_URL).await.unwrap();

    assert_eq!(set.content.title, "Shop");
    assert_eq!(set.content.main_content, "Buy the latest devices");
    assert_eq!(set.questions.len(), 1);
    assert_eq!(set.questions[0].question, "Why are you here?");
    assert_eq!(set.analysis.website_type, WebsiteType::ECommerce);
    assert_eq!(set.analysis.primary_categories, vec!["Our Products"]);
}

#[tokio::test]
async fn cached_questions_skip_generation_but_not_scraping() {
    let (analyzer, renderer, backend) = setup(MockBackend::new().reply(
        r#"{"question":"Why are you here?","options":["A. Buy","B. Browse"]}"#,
    ));

    let first = analyzer.generate_question(SHOP_URL).await.unwrap();
    let second = analyzer.generate_question(SHOP_URL).await.unwrap();

    assert_eq!(first.questions, second.questions);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(renderer.render_count(), 2);
}

#[tokio::test]
async fn unusable_model_output_yields_a_question_anyway() {
    let (analyzer, _, _) = setup(MockBackend::new().reply("{ definitely not json"));

    let set = analyzer.generate_question(SHOP_URL).await.unwrap();

    assert_eq!(set.questions.len(), 1);
    assert!(set.questions[0].options.is_empty());
}

#[tokio::test]
async fn garbage_classification_is_unknown_with_session() {
    let backend = Arc::new(MockBackend::new().reply("I cannot decide, sorry!"));
    let classifier = ResultClassifier::new(backend.clone());
    let transcript = vec![AnswerEntry {
        question: "Q1".into(),
        options: vec!["A. Sales".into(), "B. Support".into()],
        selected_answer: "A. Sales".into(),
    }];

    let result = classifier
        .classify(&ContentRecord::default(), &transcript, Some("visitor-7"))
        .await
        .unwrap();

    assert_eq!(result.user_intent, "unknown");
    assert_eq!(result.explanation, "Failed to parse response");
    assert_eq!(result.session_id.as_deref(), Some("visitor-7"));

    let calls = backend.calls();
    assert_eq!(calls[0].sampling, CLASSIFY_SAMPLING);
    assert!(calls[0].prompt.contains("A. Sales"));
}

#[tokio::test]
async fn classify_results_records_the_session() {
    let (analyzer, _, backend) = setup(
        MockBackend::new()
            .reply(r#"{"user_intent":"purchase","explanation":"Picked the shop option"}"#)
            .reply(r#"{"user_intent":"purchase","explanation":"Same answers as before"}"#),
    );
    let content = ContentRecord {
        title: "Shop".into(),
        ..Default::default()
    };
    let questions = vec![QuestionSpec::new(
        "Why are you here?",
        vec!["A. Buy".into(), "B. Browse".into()],
    )];

    let outcome = analyzer
        .classify_results(&content, &questions, &["A. Buy".to_string()], None)
        .await
        .unwrap();

    assert_eq!(outcome.results.user_intent, "purchase");
    let session_id = outcome.results.session_id.clone().unwrap();

    let replay = analyzer
        .classify_session(&content, &session_id)
        .await
        .unwrap();
    assert_eq!(replay.results.explanation, "Same answers as before");
    assert_eq!(replay.results.session_id.as_deref(), Some(session_id.as_str()));

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].prompt, calls[1].prompt);
}

#[tokio::test]
async fn unknown_session_is_reported() {
    let (analyzer, _, backend) = setup(MockBackend::new());

    let err = analyzer
        .classify_session(&ContentRecord::default(), "nope")
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::UnknownSession(_)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn page_without_headings_or_containers_still_extracts() {
    let url = "https://plain.test/";
    let renderer = Arc::new(MockRenderer::new().on_page(
        url,
        "<html><head><title>Plain</title></head><body><div>Just some text</div></body></html>",
    ));
    let backend = Arc::new(MockBackend::new().reply("What brings you here?\nA. Reading"));

    let set = analyzer(renderer, backend).generate_question(url).await.unwrap();

    assert_eq!(set.content.title, "Plain");
    assert_eq!(set.content.main_content, "Just some text");
    assert!(set.content.headings.is_empty());
    assert_eq!(set.questions[0].question, "What brings you here?");
    assert_eq!(set.analysis.website_type, WebsiteType::General);
}
