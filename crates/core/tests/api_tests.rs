//! Library API integration tests
use std::time::Duration;

use sgnl_core::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

fn pipeline() -> SignalPipeline {
    SignalPipeline::new(&SignalConfig::default()).expect("default config is valid")
}

#[test]
fn test_code_walkthrough_on_neutral_host() {
    let html = fixture("code_walkthrough.html");
    let report = pipeline().score_html(&html, Some("https://notes.example.net/pool"), &ScoreContext::default());

    let heuristics = report.heuristics.as_ref().unwrap();
    let code = heuristics.adjustment(Signal::CodeDensity).expect("code bonus applied");
    assert_eq!(code.delta, 20);
    assert!(heuristics.adjustment(Signal::Affiliate).is_none());
    assert!(heuristics.adjustment(Signal::Hype).is_none());
    assert!((50..=70).contains(&heuristics.final_score));

    assert_eq!(report.domain.host_category, HostCategory::Neutral);
    assert_eq!(report.combined_score, f64::from(heuristics.final_score));
    assert_eq!(report.extraction.title.as_deref(), Some("A Worker Pool with Bounded Channels"));
}

#[test]
fn test_code_query_match_adds_bonus() {
    let html = fixture("code_walkthrough.html");
    let p = pipeline();
    let plain = p.score_html(&html, None, &ScoreContext::default());
    let queried = p.score_html(&html, None, &ScoreContext::with_query("rust worker pool example"));

    let bonus = queried.heuristics.as_ref().unwrap().adjustment(Signal::CodeQueryMatch);
    assert_eq!(bonus.map(|a| a.delta), Some(5));
    assert_eq!(
        queried.heuristics.unwrap().final_score,
        (plain.heuristics.unwrap().final_score + 5).min(100)
    );
}

#[test]
fn test_academic_host_multiplier() {
    let html = fixture("technical_article.html");
    let report = pipeline().score_html(&html, Some("https://arxiv.org/abs/2401.00001"), &ScoreContext::default());

    let heuristics = report.heuristics.as_ref().unwrap();
    assert_eq!(heuristics.adjustment(Signal::DataDensity).map(|a| a.delta), Some(15));
    assert_eq!(heuristics.adjustment(Signal::Slop).map(|a| a.delta), Some(10));
    assert_eq!(heuristics.final_score, 75);

    assert_eq!(report.domain.host_category, HostCategory::Academic);
    assert_eq!(report.domain.multiplier, 0.15);
    assert_eq!(report.combined_score, 86.25);
}

#[test]
fn test_technical_article_is_extracted_and_measured() {
    let html = fixture("technical_article.html");
    let report = pipeline().score_html(&html, None, &ScoreContext::default());

    assert_eq!(report.extraction.outcome, Some(ExtractionOutcome::Primary));
    assert!(report.extraction.text.contains("Average latency hides the requests"));
    assert!(!report.extraction.text.contains("<table"));

    let density = report.density.as_ref().expect("long text is measured");
    assert!((0.0..=1.0).contains(&density.combined));
    assert_eq!(report.skip_deep_analysis, density.below_threshold);

    let scores = density.readability_scores.expect("readability indices reported");
    assert!(scores.flesch_kincaid_grade > 6.0);
    assert!(scores.gunning_fog > scores.flesch_kincaid_grade - 5.0);

    let stats = report.extraction.stats.expect("text stats reported");
    assert!(stats.word_count > 250);
    assert_eq!(stats.char_count, report.extraction.text.chars().count());
    assert_eq!(stats.reference_count, 0);
}

#[test]
fn test_citations_counted_without_changing_scores() {
    let html = fixture("technical_article.html");
    let cited = html.replace(
        "what the measurements taught us",
        "what the measurements taught us [1], following Dean et al. and doi.org/10.1145/2408776.2408794",
    );
    let p = pipeline();
    let plain = p.score_html(&html, None, &ScoreContext::default());
    let report = p.score_html(&cited, None, &ScoreContext::default());

    assert_eq!(report.extraction.stats.unwrap().reference_count, 3);
    assert_eq!(report.heuristics.unwrap().final_score, plain.heuristics.unwrap().final_score);
    assert_eq!(report.combined_score, plain.combined_score);
}

#[test]
fn test_affiliate_spam_penalties() {
    let html = fixture("affiliate_spam.html");
    let report = pipeline().score_html(&html, Some("https://deals.example.com/top-10"), &ScoreContext::default());
    let heuristics = report.heuristics.as_ref().unwrap();

    let affiliate: Vec<_> = heuristics.adjustments.iter().filter(|a| a.signal == Signal::Affiliate).collect();
    assert_eq!(affiliate.len(), 1);
    assert_eq!(affiliate[0].delta, -30);
    assert!(affiliate[0].reason.contains("3 link(s)"));

    let hype: Vec<_> = heuristics.adjustments.iter().filter(|a| a.signal == Signal::Hype).collect();
    assert_eq!(hype.len(), 1);
    assert_eq!(hype[0].delta, -20);

    assert!(heuristics.final_score < 30);
    assert!(report.combined_score >= 0.0);
    assert!(report.skip_deep_analysis);
}

#[test]
fn test_sparse_page_skips_density() {
    let html = fixture("sparse.html");
    let report = pipeline().score_html(&html, None, &ScoreContext::default());

    assert!(report.is_success());
    assert_eq!(report.extraction.outcome, Some(ExtractionOutcome::NoContent));
    assert_eq!(report.extraction.title.as_deref(), Some("Coming Soon"));
    assert!(report.density.is_none());
    assert!(report.skip_deep_analysis);
    assert!(report.heuristics.is_some());
}

#[test]
fn test_reports_are_deterministic() {
    let p = pipeline();
    for name in ["code_walkthrough.html", "technical_article.html", "affiliate_spam.html", "sparse.html"] {
        let html = fixture(name);
        let a = p.score_html(&html, Some("https://github.com/x/y"), &ScoreContext::default());
        let b = p.score_html(&html, Some("https://github.com/x/y"), &ScoreContext::default());
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap(), "{name}");
    }
}

#[test]
fn test_report_views() {
    let html = fixture("technical_article.html");
    let report = pipeline().score_html(&html, Some("https://arxiv.org/abs/2401.00001"), &ScoreContext::default());

    let semantic = report.semantic_input(100);
    assert_eq!(semantic.text.chars().count(), 100);
    assert!(semantic.truncated);
    assert_eq!(semantic.combined_score, 86.25);

    let view = report.presentation();
    assert_eq!(view.heuristic_score, Some(75));
    assert_eq!(view.adjustments.len(), 2);
    assert_eq!(view.host_category, HostCategory::Academic);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["heuristics"]["final"], 75);
    assert_eq!(json["domain"]["host_category"], "academic");
    assert_eq!(json["stage"], "done");
    assert!(json["extraction"]["stats"]["word_count"].is_u64());
    assert!(json["density"]["readability_scores"]["coleman_liau_index"].is_f64());
}

#[test]
fn test_custom_domain_table_from_config() {
    let config = SignalConfig::builder()
        .domains(DomainTable {
            rules: vec![DomainRule::new("contentfarm.example", HostCategory::Spam)],
            ..DomainTable::default()
        })
        .build();
    let html = fixture("technical_article.html");
    let report = SignalPipeline::new(&config).unwrap().score_html(
        &html,
        Some("https://www.contentfarm.example/post"),
        &ScoreContext::default(),
    );
    assert_eq!(report.domain.host_category, HostCategory::Spam);
    assert_eq!(report.combined_score, 37.5);
}

#[tokio::test]
async fn test_score_url_fetches_and_scores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture("code_walkthrough.html")))
        .mount(&server)
        .await;

    let url = format!("{}/post", server.uri());
    let report = pipeline().score_url(&url, &ScoreContext::default()).await;

    assert!(report.is_success());
    assert_eq!(report.stage, Stage::Done);
    assert_eq!(report.extraction.url, url);
    assert_eq!(report.heuristics.unwrap().adjustment(Signal::CodeDensity).map(|a| a.delta), Some(20));
}

#[tokio::test]
async fn test_score_url_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let report = pipeline().score_url(&format!("{}/gone", server.uri()), &ScoreContext::default()).await;
    assert!(!report.is_success());
    assert_eq!(report.extraction.fetch_status, FetchStatus::Failed);
    assert_eq!(report.extraction.error, Some(FetchErrorKind::HttpStatus));
    assert_eq!(report.combined_score, 0.0);
    assert!(report.skip_deep_analysis);
    assert_eq!(report.stage, Stage::Errored);
}

#[tokio::test]
async fn test_batch_isolates_timeout() {
    let server = MockServer::start().await;
    for i in 0..10 {
        let mut response = ResponseTemplate::new(200).set_body_string(fixture("technical_article.html"));
        if i == 6 {
            response = response.set_delay(Duration::from_secs(3));
        }
        Mock::given(method("GET"))
            .and(path(format!("/doc/{i}")))
            .respond_with(response)
            .mount(&server)
            .await;
    }

    let config = SignalConfig::builder().per_url_timeout(1).concurrency(4).build();
    let urls: Vec<String> = (0..10).map(|i| format!("{}/doc/{i}", server.uri())).collect();
    let reports = SignalPipeline::new(&config)
        .unwrap()
        .score_batch(&urls, &ScoreContext::default())
        .await;

    assert_eq!(reports.len(), 10);
    for (i, (report, url)) in reports.iter().zip(&urls).enumerate() {
        assert_eq!(&report.extraction.url, url);
        if i == 6 {
            assert!(!report.is_success());
            assert_eq!(report.extraction.error, Some(FetchErrorKind::Timeout));
            assert!(report.skip_deep_analysis);
        } else {
            assert!(report.is_success(), "document {i} should succeed");
            assert_eq!(report.heuristics.as_ref().unwrap().final_score, 75);
        }
    }
}

#[tokio::test]
async fn test_batch_shutdown_cancels_slow_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture("sparse.html")))
        .mount(&server)
        .await;
    let slow = ResponseTemplate::new(200)
        .set_body_string(fixture("sparse.html"))
        .set_delay(Duration::from_secs(10));
    Mock::given(method("GET")).and(path("/slow")).respond_with(slow).mount(&server).await;

    let urls = [format!("{}/fast", server.uri()), format!("{}/slow", server.uri())];
    let reports = pipeline()
        .score_batch_until(&urls, &ScoreContext::default(), tokio::time::sleep(Duration::from_millis(1500)))
        .await;

    assert!(reports[0].is_success());
    assert_eq!(reports[1].extraction.error, Some(FetchErrorKind::Cancelled));
    assert_eq!(reports[1].stage, Stage::Errored);
}
