use sumi_lens::config::{Config, CredentialStrategy};
use sumi_lens::{Phase, ResolutionState, ScrapeError, Scraper, UrlError};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scraper() -> Scraper {
    Scraper::new(&Config::default()).expect("Failed to build scraper")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn state_for(url: &str, max_redirect: i32) -> ResolutionState {
    ResolutionState::new(
        Url::parse(url).expect("Failed to parse URL"),
        max_redirect,
        "",
        "",
    )
}

#[tokio::test]
async fn test_full_preview() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(html(
            r#"<html><head>
            <title>Fallback</title>
            <meta property="og:title" content="Article Title">
            <meta property="og:description" content="About the article">
            <meta property="og:image" content="/cover.jpg">
            <meta property="og:site_name" content="Example News">
            <link rel="icon" href="/icon.png">
            </head><body><img src="/inline.png"></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let document = scraper()
        .scrape(&format!("{}/article", base_url), 3, "", "")
        .await
        .expect("Scrape failed");

    let preview = &document.preview;
    assert_eq!(preview.title, "Article Title");
    assert_eq!(preview.description, "About the article");
    assert_eq!(preview.images, vec![format!("{}/cover.jpg", base_url)]);
    assert_eq!(preview.link, format!("{}/article", base_url));
    assert_eq!(preview.name, "Example News");
    assert_eq!(preview.icon, format!("{}/icon.png", base_url));
    assert!(document.body_text().contains("Article Title"));
}

#[tokio::test]
async fn test_canonical_redirect_is_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<html><head><title>Duplicate</title>
            <link rel="canonical" href="{}/real"></head><body></body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/real"))
        .respond_with(html(&format!(
            r#"<html><head><title>Real Page</title>
            <link rel="canonical" href="{}/real"></head><body></body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper();
    let mut controller = scraper.controller(state_for(&format!("{}/", base_url), 3));
    let document = controller.run().await.expect("Scrape failed");

    assert_eq!(document.preview.title, "Real Page");
    assert_eq!(document.preview.link, format!("{}/real", base_url));

    // One fetch left the budget at 2; the canonical fetch took it to 1
    let state = controller.state();
    assert_eq!(state.fetches(), 2);
    assert_eq!(state.budget(), 1);
    assert_eq!(state.phase(), Phase::Done);
    assert_eq!(state.target().as_str(), format!("{}/", base_url));
}

#[tokio::test]
async fn test_zero_budget_fetches_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<html><head><title>Only</title>
            <link rel="canonical" href="{}/real">
            <meta name="fragment" content="!"></head><body></body></html>"#,
            base_url
        )))
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/real"))
        .respond_with(html("<title>Never</title>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    for max_redirect in [0, -3, i32::MIN] {
        let scraper = scraper();
        let mut controller = scraper.controller(state_for(&format!("{}/", base_url), max_redirect));
        let document = controller.run().await.expect("Scrape failed");
        assert_eq!(document.preview.title, "Only");
        assert_eq!(controller.state().fetches(), 1);
        assert_eq!(controller.state().budget(), max_redirect.saturating_sub(1));
    }
}

#[tokio::test]
async fn test_budget_exhaustion_returns_last_preview() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    for (from, to) in [("/a", "/b"), ("/b", "/c"), ("/c", "/d")] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(html(&format!(
                r#"<head><title>{}</title><link rel="canonical" href="{}{}"></head>"#,
                from, base_url, to
            )))
            .mount(&mock_server)
            .await;
    }

    let scraper = scraper();
    let mut controller = scraper.controller(state_for(&format!("{}/a", base_url), 2));
    let document = controller.run().await.expect("Scrape failed");

    assert_eq!(document.preview.title, "/b");
    assert_eq!(controller.state().fetches(), 2);
    assert_eq!(controller.state().url().path(), "/b");
}

#[tokio::test]
async fn test_fragment_meta_triggers_escaped_fetch() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Mounted first so it takes precedence over the plain page
    Mock::given(method("GET"))
        .and(path("/app"))
        .and(query_param("_escaped_fragment_", ""))
        .respond_with(html(
            r#"<head><title>Rendered</title><meta name="fragment" content="!"></head>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app"))
        .respond_with(html(
            r#"<head><title>Shell</title><meta name="fragment" content="!"></head>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper();
    let mut controller = scraper.controller(state_for(&format!("{}/app", base_url), 5));
    let document = controller.run().await.expect("Scrape failed");

    assert_eq!(document.preview.title, "Rendered");
    assert_eq!(controller.state().fetches(), 2);
    assert_eq!(
        controller.state().escaped_fragment().map(Url::as_str),
        Some(format!("{}/app?_escaped_fragment_=", base_url).as_str())
    );
}

#[tokio::test]
async fn test_hashbang_url_is_requested_escaped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(query_param("_escaped_fragment_", "section=2"))
        .respond_with(html("<head><title>Section Two</title></head>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let document = scraper()
        .scrape(&format!("{}/page#!section=2", base_url), 1, "", "")
        .await
        .expect("Scrape failed");

    assert_eq!(document.preview.title, "Section Two");
    assert_eq!(document.preview.link, format!("{}/page#!section=2", base_url));
}

#[tokio::test]
async fn test_http_redirect_within_host_keeps_icon() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(r#"<head><link rel="icon" href="/favicon.png"></head>"#))
        .mount(&mock_server)
        .await;

    let document = scraper()
        .scrape(&format!("{}/old", base_url), 1, "", "")
        .await
        .expect("Scrape failed");

    assert_eq!(document.preview.link, format!("{}/new", base_url));
    assert_eq!(document.preview.icon, format!("{}/favicon.png", base_url));
}

#[tokio::test]
async fn test_http_redirect_across_hosts_keeps_default_icon() {
    let origin = MockServer::start().await;
    let mirror = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/landing", mirror.uri()).as_str()),
        )
        .mount(&origin)
        .await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html(
            r#"<head><title>Mirror</title><link rel="icon" href="/favicon.png"></head>"#,
        ))
        .mount(&mirror)
        .await;

    let document = scraper()
        .scrape(&format!("{}/start", origin.uri()), 1, "", "")
        .await
        .expect("Scrape failed");

    let mirror_url = Url::parse(&mirror.uri()).unwrap();
    assert_eq!(document.preview.title, "Mirror");
    assert_eq!(document.preview.link, format!("{}/landing", mirror.uri()));
    assert_eq!(
        document.preview.name,
        format!(
            "{}:{}",
            mirror_url.host_str().unwrap(),
            mirror_url.port().unwrap()
        )
    );
    assert_eq!(document.preview.icon, format!("{}/favicon.ico", origin.uri()));
}

#[tokio::test]
async fn test_request_headers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/default"))
        .and(header("accept-language", "en"))
        .and(header("user-agent", "SumiLens/1.0"))
        .respond_with(html("<title>Default</title>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/german"))
        .and(header("accept-language", "de"))
        .and(header(
            "cookie",
            "access_token=tok; refresh_token=tok; main_access_token=tok; \
             main_refresh_token=tok; brainer_v4=true; expires_at=1947832244556; \
             main_expires_at=1947832244556",
        ))
        .respond_with(html("<title>German</title>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper();
    let default = scraper
        .scrape(&format!("{}/default", base_url), 1, "", "")
        .await
        .expect("Scrape failed");
    let german = scraper
        .scrape(&format!("{}/german", base_url), 1, "de", "Bearer tok")
        .await
        .expect("Scrape failed");

    assert_eq!(default.preview.title, "Default");
    assert_eq!(german.preview.title, "German");
}

#[tokio::test]
async fn test_authorization_header_strategy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(html("<title>Private</title>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.credentials.strategy = CredentialStrategy::AuthorizationHeader;
    let scraper = Scraper::new(&config).expect("Failed to build scraper");

    let document = scraper
        .scrape(&format!("{}/", mock_server.uri()), 1, "", "Bearer tok")
        .await
        .expect("Scrape failed");
    assert_eq!(document.preview.title, "Private");
}

#[tokio::test]
async fn test_declared_charset_is_decoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"<title>Caf\xE9 cr\xE8me</title>".to_vec())
                .insert_header("content-type", "text/html; charset=ISO-8859-1"),
        )
        .mount(&mock_server)
        .await;

    let document = scraper()
        .scrape(&format!("{}/", mock_server.uri()), 1, "", "")
        .await
        .expect("Scrape failed");
    assert_eq!(document.preview.title, "Café crème");
    assert!(String::from_utf8(document.body).is_ok());
}

#[tokio::test]
async fn test_error_status_is_still_previewed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("<title>Not Found</title>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let document = scraper()
        .scrape(&format!("{}/missing", mock_server.uri()), 1, "", "")
        .await
        .expect("Scrape failed");
    assert_eq!(document.preview.title, "Not Found");
}

#[tokio::test]
async fn test_invalid_url_is_error() {
    let result = scraper().scrape("not a url", 3, "", "").await;
    assert!(matches!(result, Err(ScrapeError::Url(UrlError::Parse { .. }))));

    let result = scraper().scrape("mailto:someone@example.com", 3, "", "").await;
    assert!(matches!(
        result,
        Err(ScrapeError::Url(UrlError::MissingHost(_)))
    ));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Bind and drop a listener to get a port nobody is listening on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let scraper = scraper();
    let mut controller = scraper.controller(state_for(&format!("http://127.0.0.1:{}/", port), 3));
    let result = controller.run().await;

    assert!(matches!(result, Err(ScrapeError::Transport { .. })));
    assert_eq!(controller.state().phase(), Phase::Error);
    assert_eq!(controller.state().budget(), 2);
}

#[tokio::test]
async fn test_malformed_image_fails_scrape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(r#"<img src="http://example.com:99999/a.png">"#))
        .mount(&mock_server)
        .await;

    let result = scraper()
        .scrape(&format!("{}/", mock_server.uri()), 1, "", "")
        .await;
    assert!(matches!(result, Err(ScrapeError::Url(_))));
}
