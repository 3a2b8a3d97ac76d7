//! Client SDK against a live router with in-memory providers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use smartprice_client::{ClientError, SmartPriceClient};
use smartprice_hex::inbound::HttpServer;
use smartprice_hex::{ExchangeRateProvider, LocationResolver, Phase, SmartPrice, SmartPriceConfig};
use smartprice_types::{
    ConvertQuery, Coordinates, DetectionMethod, GeolocationPermission, IpGeoRecord,
    IpGeolocationProvider, PermissionOutcome, ProviderError, RateSource, ReverseGeocodeRecord,
    ReverseGeocoder, RoundingMode,
};
use tokio::net::TcpListener;

/// Maps a handful of public IPs to countries; everything else fails.
struct TableIp;

#[async_trait]
impl IpGeolocationProvider for TableIp {
    async fn lookup(&self, ip: Option<&str>) -> Result<IpGeoRecord, ProviderError> {
        let country = match ip {
            Some("49.36.0.1") => "IN",
            Some("126.0.0.1") => "JP",
            _ => return Err(ProviderError::Http(503)),
        };
        Ok(IpGeoRecord {
            country_code: country.into(),
            ..Default::default()
        })
    }
}

struct FixedGeocoder;

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn reverse(&self, _coordinates: Coordinates) -> Result<ReverseGeocodeRecord, ProviderError> {
        Ok(ReverseGeocodeRecord {
            country_code: "GB".into(),
            city: Some("London".into()),
            ..Default::default()
        })
    }
}

struct TableRates(HashMap<&'static str, f64>);

#[async_trait]
impl RateSource for TableRates {
    async fn fetch_rate(&self, _base: &str, target: &str) -> Result<f64, ProviderError> {
        self.0.get(target).copied().ok_or(ProviderError::Http(404))
    }
}

struct Granted(Coordinates);

#[async_trait]
impl GeolocationPermission for Granted {
    async fn request(&self) -> PermissionOutcome {
        PermissionOutcome::Granted(self.0)
    }
}

async fn spawn_server() -> String {
    let rates = TableRates(HashMap::from([("INR", 83.0), ("JPY", 149.5), ("GBP", 0.79)]));
    let server = HttpServer::new(
        LocationResolver::new(TableIp, FixedGeocoder),
        ExchangeRateProvider::new(rates),
        "USD",
    );
    let router = server.router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_endpoints() {
    let client = SmartPriceClient::new(spawn_server().await);

    assert!(client.health().await.unwrap());

    let location = client
        .clone()
        .with_forwarded_for("49.36.0.1")
        .detect_location()
        .await
        .unwrap();
    assert_eq!(location.method, DetectionMethod::Ip);
    assert_eq!(location.currency, "INR");

    let fallback = client.detect_location().await.unwrap();
    assert!(fallback.is_fallback());

    let quote = client.exchange_rate(None, "JPY").await.unwrap();
    assert_eq!(quote.value(), 149.5);

    let converted = client
        .convert(&ConvertQuery {
            amount: 599.0,
            currency: "INR".into(),
            base: None,
            mode: RoundingMode::Nearest,
            granularity: None,
        })
        .await
        .unwrap();
    assert_eq!(converted.formatted, "₹49717.00");

    let currencies = client.currencies().await.unwrap();
    assert!(currencies.iter().any(|c| c.code == "KWD" && c.decimal_places == 3));
}

#[tokio::test]
async fn test_api_errors_surface_message() {
    let client = SmartPriceClient::new(spawn_server().await);

    let err = client.reverse_geocode(95.0, 0.0).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("Invalid coordinates"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_client_backs_the_adapter() {
    let client = SmartPriceClient::new(spawn_server().await);
    let smart = SmartPrice::new(
        Arc::new(LocationResolver::new(client.clone(), client.clone())),
        Arc::new(ExchangeRateProvider::new(client)),
        Granted(Coordinates::new(51.5, -0.12)),
        SmartPriceConfig {
            client_ip: Some("126.0.0.1".into()),
            ..Default::default()
        },
    );

    let snapshot = smart.resolve_location().await;
    assert_eq!(snapshot.phase, Phase::Ready);
    assert_eq!(snapshot.current_currency, "JPY");
    assert_eq!(smart.formatted_amount(999.0), "¥149351");

    let snapshot = smart.change_currency("GBP").await;
    assert!(snapshot.manual_override);
    assert_eq!(smart.formatted_amount(100.0), "£79.00");
}

#[tokio::test]
async fn test_client_backs_browser_strategy() {
    let client = SmartPriceClient::new(spawn_server().await);
    let smart = SmartPrice::new(
        Arc::new(LocationResolver::new(client.clone(), client.clone())),
        Arc::new(ExchangeRateProvider::new(client)),
        Granted(Coordinates::new(51.5, -0.12)),
        SmartPriceConfig {
            prefer_browser_geolocation: true,
            ..Default::default()
        },
    );

    let snapshot = smart.request_geolocation_permission().await;
    let location = snapshot.user_location.unwrap();
    assert_eq!(location.method, DetectionMethod::Browser);
    assert_eq!(location.country_code, "GB");
    assert_eq!(snapshot.current_currency, "GBP");
}
