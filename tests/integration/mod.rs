//! Integration tests for the alert bot against a local HTTP server.
//!
//! The market data and Telegram endpoints are served by `wiremock`, so these
//! run offline. The `live_*` tests hit the real services.
//! Run with: cargo test --test integration -- --ignored

use penny_alert::config::Config;
use penny_alert::error::{MarketError, NotifyError};
use penny_alert::market::{MarketDataClient, MarketDataSource};
use penny_alert::notify::{Notifier, TelegramNotifier, STARTUP_MESSAGE};
use penny_alert::poller::Poller;
use rust_decimal_macros::dec;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:TESTTOKEN";

const LISTING: &str = "\
Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares
ABCD|Abcd Holdings - Common Stock|S|N|N|100|N|N
WXYZ|Wxyz Corp - Common Stock|S|N|N|100|N|N
File Creation Time: 1017202608:31|||||||
";

/// Config pointing every endpoint at `server`.
fn test_config(server: &MockServer) -> Config {
    Config {
        telegram_token: TOKEN.to_string(),
        chat_id: "42".to_string(),
        telegram_api_url: server.uri(),
        listing_urls: vec![format!("{}/nasdaqlisted.txt", server.uri())],
        market_data_url: server.uri(),
        http_timeout_ms: 2000,
        ..Config::default()
    }
}

fn chart_body(price: f64, closes: &[f64], volumes: &[u64]) -> serde_json::Value {
    let timestamps: Vec<i64> = (0..closes.len() as i64)
        .map(|i| 1_767_600_000 + i * 86_400)
        .collect();
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": {"symbol": "X", "regularMarketPrice": price, "currency": "USD"},
                "timestamp": timestamps,
                "indicators": {"quote": [{
                    "open": closes,
                    "high": closes,
                    "low": closes,
                    "close": closes,
                    "volume": volumes
                }]}
            }],
            "error": null
        }
    })
}

fn not_found_body() -> serde_json::Value {
    serde_json::json!({
        "chart": {
            "result": null,
            "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
        }
    })
}

/// A Telegram HTTP 500 surfaces as a "Telegram error", not a panic.
#[tokio::test]
async fn test_notifier_reports_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::new(&test_config(&server)).unwrap();
    let err = notifier.send("hello").await.unwrap_err();

    assert!(matches!(err, NotifyError::Rejected { status: 500, .. }));
    assert!(err.to_string().contains("Telegram error"));
}

/// Messages are posted as a form with the chat id and text.
#[tokio::test]
async fn test_notifier_posts_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_string_contains("chat_id=42"))
        .and(body_string_contains("text=ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::new(&test_config(&server)).unwrap();
    notifier.send("ping").await.unwrap();
}

/// An unreachable Telegram host is a transport failure.
#[tokio::test]
async fn test_notifier_transport_failure() {
    let config = Config {
        telegram_token: TOKEN.to_string(),
        chat_id: "42".to_string(),
        telegram_api_url: "http://127.0.0.1:9".to_string(),
        http_timeout_ms: 500,
        ..Config::default()
    };

    let notifier = TelegramNotifier::new(&config).unwrap();
    let err = notifier.send("hello").await.unwrap_err();

    assert!(matches!(err, NotifyError::Transport(_)));
    assert!(!err.to_string().contains(TOKEN));
}

/// Listings are downloaded and parsed.
#[tokio::test]
async fn test_fetch_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nasdaqlisted.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = MarketDataClient::new(&config).unwrap();
    let symbols = client.fetch_listing(&config.listing_urls[0]).await.unwrap();

    assert_eq!(symbols, vec!["ABCD".to_string(), "WXYZ".to_string()]);
}

/// A missing listing is a listing failure.
#[tokio::test]
async fn test_fetch_listing_not_found() {
    let server = MockServer::start().await;
    let client = MarketDataClient::new(&test_config(&server)).unwrap();

    let result = client
        .fetch_listing(&format!("{}/missing.txt", server.uri()))
        .await;

    assert!(matches!(result, Err(MarketError::ListingFetchFailed { .. })));
}

/// Quote snapshots read the chart meta price.
#[tokio::test]
async fn test_quote_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ABCD"))
        .and(query_param("range", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(4.25, &[4.25], &[1000])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ZZZZ"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;

    let client = MarketDataClient::new(&test_config(&server)).unwrap();

    assert_eq!(client.quote_price("ABCD").await.unwrap(), Some(dec!(4.25)));

    let err = client.quote_price("ZZZZ").await.unwrap_err();
    assert!(matches!(err, MarketError::QuoteFailed { .. }));
    assert!(err.to_string().contains("Not Found"));
}

/// Daily bars come back oldest first for the configured range.
#[tokio::test]
async fn test_daily_bars() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ABCD"))
        .and(query_param("range", "5d"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(
            8.5,
            &[10.0, 10.5, 11.0, 9.0, 8.5],
            &[100, 100, 100, 100, 500],
        )))
        .mount(&server)
        .await;

    let client = MarketDataClient::new(&test_config(&server)).unwrap();
    let bars = client.daily_bars("ABCD").await.unwrap();

    assert_eq!(bars.len(), 5);
    assert_eq!(bars[4].close, dec!(8.5));
    assert_eq!(bars[4].volume, 500);
    assert!(bars[0].date < bars[4].date);
}

/// Full cycle: startup notice, universe, scan, one alert.
#[tokio::test]
async fn test_poller_cycle_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nasdaqlisted.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&server)
        .await;

    // ABCD: cheap and spiking. WXYZ: above the ceiling.
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ABCD"))
        .and(query_param("range", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(8.5, &[8.5], &[500])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ABCD"))
        .and(query_param("range", "5d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(
            8.5,
            &[10.0, 10.5, 11.0, 9.0, 8.5],
            &[100, 100, 100, 100, 500],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/WXYZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(25.0, &[25.0], &[10])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(2)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = MarketDataClient::new(&config).unwrap();
    let notifier = TelegramNotifier::new(&config).unwrap();
    let mut poller = Poller::new(&config, client, notifier);

    poller.start().await;
    assert_eq!(poller.universe(), &["ABCD".to_string()]);

    let summary = poller.scan_batch().await;
    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.alerts, 1);
    assert_eq!(summary.notify_failures, 0);

    let requests = server.received_requests().await.unwrap();
    let texts: Vec<String> = requests
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| String::from_utf8_lossy(&r.body).to_string())
        .collect();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("Stock+Alert+Bot+started"), "{}", STARTUP_MESSAGE);
    assert!(texts[1].contains("ABCD"));
}

/// Live listing download.
#[tokio::test]
#[ignore = "requires network access"]
async fn live_fetch_nasdaq_listing() {
    let config = Config::default();
    let client = MarketDataClient::new(&config).unwrap();

    let symbols = client.fetch_listing(&config.listing_urls[0]).await.unwrap();

    assert!(symbols.len() > 1000, "expected a full directory");
    println!("First symbols: {:?}", &symbols[..5]);
}
