use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use fetcher::FetchConfig;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use tower::ServiceExt;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

const ARTICLE: &str = r#"<html><head><title>测试</title></head>
<body><p>我们喜欢编程，我们喜欢音乐。</p><p>我们！</p>
<script>document.write("喜欢喜欢喜欢")</script>
<img src="/img/a.png"><img src="/img/gone.png"><img src="/img/b.png">
</body></html>"#;

async fn serve_fixtures() -> SocketAddr {
    let png = || async { ([(header::CONTENT_TYPE, "image/png")], PNG_MAGIC) };
    let fixtures = Router::new()
        .route("/article", get(|| async { ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], ARTICLE) }))
        .route("/plain", get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<p>!!! ???</p>") }))
        .route("/img/a.png", get(png))
        .route("/img/b.png", get(png));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, fixtures).await.unwrap();
    });
    addr
}

fn app() -> Router {
    build_app(ServerConfig::default()).unwrap()
}

async fn call(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn call_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = call(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

fn encode(url: &str) -> String {
    url.replace(':', "%3A").replace('/', "%2F")
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = call(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn index_lists_every_chart_kind() {
    let (status, body) = call(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<form action="/analyze""#));
    for kind in ["bar", "word-cloud", "line", "scatter", "image-list", "funnel", "pie", "area"] {
        assert!(body.contains(&format!(r#"value="{kind}""#)), "{kind}");
    }
}

#[tokio::test]
async fn missing_url_prompts_for_one() {
    let (status, body) = call(app(), "/analyze?kind=pie").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please enter a URL."));
    assert!(body.contains(r#"<option value="pie" selected>"#));
}

#[tokio::test]
async fn unknown_kind_is_a_bad_request() {
    let (status, body) = call_json(app(), "/api/analyze?url=http%3A%2F%2Fexample.com&kind=histogram").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("histogram"));
}

#[tokio::test]
async fn invalid_url_is_reported_not_raised() {
    let (status, body) = call(app(), "/analyze?url=nonsense&kind=bar").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"class="error""#));
    assert!(body.contains("invalid URL"));

    let (status, json) = call_json(app(), "/api/analyze?url=nonsense").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "invalid_url");
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let addr = serve_fixtures().await;
    let uri = format!("/api/analyze?url={}", encode(&format!("http://{addr}/missing")));
    let (status, json) = call_json(app(), &uri).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["kind"], "status");
}

#[tokio::test]
async fn api_ranks_visible_words() {
    let addr = serve_fixtures().await;
    let uri = format!("/api/analyze?url={}&kind=bar&k=2", encode(&format!("http://{addr}/article")));
    let (status, json) = call_json(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    let top = json["top"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["token"], "我们");
    assert_eq!(top[0]["count"], 3);
    // script text is not visible, so 喜欢 is only counted twice
    assert_eq!(top[1]["token"], "喜欢");
    assert_eq!(top[1]["count"], 2);
    assert_eq!(json["chart"]["xAxis"]["data"], serde_json::json!(["我们", "喜欢"]));
    assert_eq!(json["chart"]["series"][0]["data"], serde_json::json!([3, 2]));
    assert!(json.get("images").is_none());
}

#[tokio::test]
async fn funnel_percentages_use_displayed_counts() {
    let addr = serve_fixtures().await;
    let uri = format!("/api/analyze?url={}&kind=funnel&k=2", encode(&format!("http://{addr}/article")));
    let (_, json) = call_json(app(), &uri).await;
    let data = &json["chart"]["series"][0]["data"];
    assert_eq!(data[0]["name"], "我们");
    assert_eq!(data[0]["value"], 60.0);
    assert_eq!(data[1]["value"], 40.0);
}

#[tokio::test]
async fn text_without_words_renders_empty_chart() {
    let addr = serve_fixtures().await;
    let uri = format!("/api/analyze?url={}&kind=pie", encode(&format!("http://{addr}/plain")));
    let (status, json) = call_json(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["distinct_tokens"], 0);
    assert!(json["top"].as_array().unwrap().is_empty());

    let uri = format!("/analyze?url={}&kind=bar", encode(&format!("http://{addr}/plain")));
    let (_, body) = call(app(), &uri).await;
    assert!(body.contains("No words found on this page."));
}

#[tokio::test]
async fn chart_page_embeds_options() {
    let addr = serve_fixtures().await;
    let uri = format!("/analyze?url={}&kind=word-cloud", encode(&format!("http://{addr}/article")));
    let (status, body) = call(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("echarts.init"));
    assert!(body.contains(r#""type":"wordCloud""#));
    assert!(body.contains("我们"));
}

#[tokio::test]
async fn image_listing_warns_once_per_failed_image() {
    let addr = serve_fixtures().await;
    let uri = format!("/analyze?url={}&kind=image-list", encode(&format!("http://{addr}/article")));
    let (status, body) = call(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("<img src=\"data:image/png;base64,").count(), 2);
    assert_eq!(body.matches(r#"class="warning""#).count(), 1);
    assert!(body.contains(&format!("http://{addr}/img/gone.png")));

    let uri = format!("/api/analyze?url={}&kind=image-list", encode(&format!("http://{addr}/article")));
    let (_, json) = call_json(app(), &uri).await;
    let images = json["images"].as_array().unwrap();
    let ok: Vec<bool> = images.iter().map(|i| i["ok"].as_bool().unwrap()).collect();
    assert_eq!(ok, vec![true, false, true]);
    assert!(json.get("chart").is_none());
}

#[tokio::test]
async fn page_without_images_says_so() {
    let addr = serve_fixtures().await;
    let uri = format!("/analyze?url={}&kind=image-list", encode(&format!("http://{addr}/plain")));
    let (_, body) = call(app(), &uri).await;
    assert!(body.contains("There are no images on this page."));
}

#[tokio::test]
async fn concurrent_image_listing_keeps_page_order() {
    let addr = serve_fixtures().await;
    let config = ServerConfig {
        fetch: FetchConfig { image_concurrency: 3, ..FetchConfig::default() },
        ..ServerConfig::default()
    };
    let app = build_app(config).unwrap();
    let uri = format!("/api/analyze?url={}&kind=image-list", encode(&format!("http://{addr}/article")));
    let (status, json) = call_json(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    let urls: Vec<&str> = json["images"].as_array().unwrap().iter().map(|i| i["url"].as_str().unwrap()).collect();
    let expected: Vec<String> = ["a.png", "gone.png", "b.png"].iter().map(|f| format!("http://{addr}/img/{f}")).collect();
    assert_eq!(urls, expected);

    let uri = format!("/analyze?url={}&kind=image-list", encode(&format!("http://{addr}/article")));
    let (_, body) = call(app, &uri).await;
    assert_eq!(body.matches("<img src=\"data:image/png;base64,").count(), 2);
    assert_eq!(body.matches(r#"class="warning""#).count(), 1);
}

#[tokio::test]
async fn cleared_k_field_uses_the_default() {
    let (status, body) = call(app(), "/analyze?url=nonsense&kind=bar&k=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"class="error""#));
    assert!(body.contains(r#"name="k" min="1" max="100" value="20""#));

    let addr = serve_fixtures().await;
    let uri = format!("/api/analyze?url={}&kind=bar&k=", encode(&format!("http://{addr}/article")));
    let (status, json) = call_json(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["top"][0]["token"], "我们");

    let (status, _) = call(app(), "/analyze?kind=bar&k=lots").await;
    assert_eq!(status, StatusCode::OK);
}
