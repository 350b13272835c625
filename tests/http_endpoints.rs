//! Integration tests against a local HTTP responder.
//!
//! Exercises `HttpUserSource` and `PresenceChartRenderer` over real
//! sockets, serving canned analyzer responses from a tokio listener.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use presence_picker::models::{ChartData, ChartKind, Clock, IdField, UserId};
use presence_picker::render::{ChartSettings, PresenceChartRenderer, RenderError};
use presence_picker::selector::{LoadOutcome, SelectionOutcome, SelectorSettings, UserSelector};
use presence_picker::source::{FetchError, HttpUserSource, UserSource};
use presence_picker::view::{MemorySurface, Region};

/// Canned response: status and body.
type Routes = HashMap<&'static str, (u16, String)>;

/// Serve `routes` on an ephemeral port; unknown paths answer 404.
/// Returns the `http://127.0.0.1:<port>` origin.
async fn serve(routes: Routes) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .get(path.as_str())
                    .cloned()
                    .unwrap_or((404, "{\"error\": \"not found\"}".to_string()));
                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

fn english() -> ChartSettings {
    ChartSettings {
        locale: "en".into(),
        ..ChartSettings::default()
    }
}

fn user_id_settings() -> SelectorSettings {
    SelectorSettings {
        id_field: IdField::Field("user_id".into()),
        ..SelectorSettings::default()
    }
}

// ---------------------------------------------------------------------------
// users listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetches_users_listing() {
    let body = json!([{"user_id": 10, "name": "User 10"}]).to_string();
    let origin = serve(HashMap::from([("/api/v1/users", (200, body))])).await;

    let source =
        HttpUserSource::new(&format!("{origin}/api/v1/users"), Duration::from_secs(5)).unwrap();
    let listing = source.fetch_users().await.unwrap();
    assert_eq!(listing, json!([{"user_id": 10, "name": "User 10"}]));
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let origin = serve(HashMap::from([("/api/v1/users", (500, "{}".to_string()))])).await;
    let source =
        HttpUserSource::new(&format!("{origin}/api/v1/users"), Duration::from_secs(5)).unwrap();

    let err = source.fetch_users().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 500, .. }));
}

#[tokio::test]
async fn invalid_json_is_malformed() {
    let origin = serve(HashMap::from([("/api/v1/users", (200, "<html>".to_string()))])).await;
    let source =
        HttpUserSource::new(&format!("{origin}/api/v1/users"), Duration::from_secs(5)).unwrap();

    let err = source.fetch_users().await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source =
        HttpUserSource::new(&format!("http://{addr}/api/v1/users"), Duration::from_secs(2)).unwrap();
    let err = source.fetch_users().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}

#[tokio::test]
async fn relative_avatars_resolve_against_endpoint() {
    let body = json!([
        {"user_id": "141", "name": "Adam", "avatar": "/api/images/users/141"},
    ])
    .to_string();
    let origin = serve(HashMap::from([("/api/v1/users", (200, body))])).await;
    let source =
        HttpUserSource::new(&format!("{origin}/api/v1/users"), Duration::from_secs(5)).unwrap();

    let memory = Arc::new(Mutex::new(MemorySurface::default()));
    let renderer = PresenceChartRenderer::new(
        reqwest::Client::new(),
        &format!("{origin}/api/v1/"),
        ChartKind::PresenceWeekday,
        english(),
    )
    .unwrap();
    let mut selector = UserSelector::new(memory.clone(), Arc::new(renderer), user_id_settings());

    assert_eq!(selector.load(&source).await, LoadOutcome::Populated { users: 1 });
    assert_eq!(
        selector.avatars().get(&UserId::from("141")),
        Some(format!("{origin}/api/images/users/141").as_str())
    );
}

// ---------------------------------------------------------------------------
// charts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetches_each_chart_kind() {
    let origin = serve(HashMap::from([
        (
            "/api/v1/presence_weekday/10",
            (200, json!([["Weekday", "Presence (s)"], ["Mon", 3600]]).to_string()),
        ),
        (
            "/api/v1/mean_time_weekday/10",
            (200, json!([["Mon", 1800.5]]).to_string()),
        ),
        (
            "/api/v1/presence_start_end/10",
            (200, json!([["Mon", [9, 0, 0], [17, 30, 0]]]).to_string()),
        ),
    ]))
    .await;
    let base = format!("{origin}/api/v1/");
    let user = UserId::from("10");

    let chart = |kind| {
        PresenceChartRenderer::new(reqwest::Client::new(), &base, kind, english()).unwrap()
    };

    assert_eq!(
        chart(ChartKind::PresenceWeekday).fetch_chart(&user).await.unwrap(),
        ChartData::Bars(vec![("Mon".into(), 3600.0)])
    );
    assert_eq!(
        chart(ChartKind::MeanTimeWeekday).fetch_chart(&user).await.unwrap(),
        ChartData::Bars(vec![("Mon".into(), 1800.5)])
    );
    assert_eq!(
        chart(ChartKind::PresenceStartEnd).fetch_chart(&user).await.unwrap(),
        ChartData::Spans(vec![("Mon".into(), Clock::new(9, 0, 0), Clock::new(17, 30, 0))])
    );
}

#[tokio::test]
async fn missing_user_chart_is_not_found() {
    let origin = serve(HashMap::new()).await;
    let renderer = PresenceChartRenderer::new(
        reqwest::Client::new(),
        &format!("{origin}/api/v1/"),
        ChartKind::PresenceWeekday,
        english(),
    )
    .unwrap();

    let err = renderer.fetch_chart(&UserId::from("99")).await.unwrap_err();
    assert_eq!(err, RenderError::NotFound(UserId::from("99")));
}

#[tokio::test]
async fn end_to_end_pick_renders_chart() {
    let origin = serve(HashMap::from([
        (
            "/api/v1/users",
            (
                200,
                json!([
                    {"user_id": 10, "name": "User 10"},
                    {"user_id": 11, "name": "User 11"},
                ])
                .to_string(),
            ),
        ),
        (
            "/api/v1/presence_weekday/11",
            (200, json!([["Weekday", "Presence (s)"], ["Tue", 7200]]).to_string()),
        ),
    ]))
    .await;

    let source =
        HttpUserSource::new(&format!("{origin}/api/v1/users"), Duration::from_secs(5)).unwrap();
    let renderer = PresenceChartRenderer::new(
        reqwest::Client::new(),
        &format!("{origin}/api/v1/"),
        ChartKind::PresenceWeekday,
        english(),
    )
    .unwrap();
    let memory = Arc::new(Mutex::new(MemorySurface::default()));
    let mut selector =
        UserSelector::new(memory.clone(), Arc::new(renderer.clone()), user_id_settings());

    assert_eq!(selector.load(&source).await, LoadOutcome::Populated { users: 2 });
    assert_eq!(selector.select("11"), SelectionOutcome::Rendered(UserId::from("11")));
    assert_eq!(renderer.wait_idle().await, Ok(()));

    let surface = memory.lock().unwrap();
    assert!(surface.is_visible(Region::Chart));
    assert!(!surface.is_visible(Region::Loading));
    let chart = surface.text(Region::Chart);
    assert!(chart.starts_with("Presence by weekday"));
    assert!(chart.contains("Tue"));
    assert!(chart.contains("2:00:00"));
}

#[tokio::test]
async fn failed_chart_is_drawn_and_loading_hidden() {
    let origin = serve(HashMap::from([(
        "/api/v1/users",
        (200, json!([{"user_id": 5, "name": "Gone"}]).to_string()),
    )]))
    .await;

    let source =
        HttpUserSource::new(&format!("{origin}/api/v1/users"), Duration::from_secs(5)).unwrap();
    let renderer = PresenceChartRenderer::new(
        reqwest::Client::new(),
        &format!("{origin}/api/v1/"),
        ChartKind::MeanTimeWeekday,
        english(),
    )
    .unwrap();
    let memory = Arc::new(Mutex::new(MemorySurface::default()));
    let mut selector =
        UserSelector::new(memory.clone(), Arc::new(renderer.clone()), user_id_settings());

    selector.load(&source).await;
    selector.select("5");
    assert_eq!(
        renderer.wait_idle().await,
        Err(RenderError::NotFound(UserId::from("5")))
    );

    let surface = memory.lock().unwrap();
    assert!(surface.is_visible(Region::Chart));
    assert!(!surface.is_visible(Region::Loading));
    assert!(surface.text(Region::Chart).contains("user 5 not found"));
}
