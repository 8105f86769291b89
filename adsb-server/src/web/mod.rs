//! Read-only observer surface — a single rendered HTML snapshot of the
//! state store, no mutation and no separate API surface.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::Html;
use axum::Router;

use adsb_core::types::icao_to_string;
use adsb_core::Vessels;

const BASE_CSS: &str = r#"* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Courier New', monospace; background: #0a0a0a; color: #e0e0e0; }
nav { background: #111; border-bottom: 1px solid #333; padding: 8px 16px; }
nav .brand { color: #00ff88; font-weight: bold; font-size: 14px; }
.container { padding: 16px; }
table { width: 100%; border-collapse: collapse; font-size: 13px; }
th { background: #1a1a1a; color: #00ff88; padding: 8px; text-align: left; border-bottom: 1px solid #333; }
td { padding: 6px 8px; border-bottom: 1px solid #1a1a1a; }
tr:hover { background: #111; }"#;

fn render_page(body: &str) -> Html<String> {
    let mut s = String::with_capacity(body.len() + BASE_CSS.len() + 512);
    s.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    s.push_str("<meta charset=\"UTF-8\">\n");
    s.push_str("<meta http-equiv=\"refresh\" content=\"5\">\n");
    s.push_str("<title>adsb-decode \u{2014} aircraft</title>\n");
    s.push_str("<style>\n");
    s.push_str(BASE_CSS);
    s.push_str("\n</style>\n</head>\n<body>\n");
    s.push_str("<nav><span class=\"brand\">adsb-decode</span></nav>\n");
    s.push_str(body);
    s.push_str("\n</body>\n</html>");
    Html(s)
}

fn render_age(instant: Option<Instant>) -> String {
    match instant {
        Some(t) => format!("{}s ago", Instant::now().duration_since(t).as_secs()),
        None => "-".to_string(),
    }
}

fn opt_cell<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

async fn page_aircraft(State(vessels): State<Arc<Vessels>>) -> Html<String> {
    let mut rows = Vec::new();
    vessels.for_each(|icao, record| {
        let position = match (record.lat, record.lon) {
            (Some(lat), Some(lon)) => format!(
                "{lat:.4}, {lon:.4} ({})",
                record
                    .lat_lon_method
                    .map(|m| m.as_str())
                    .unwrap_or("unknown")
            ),
            _ => "-".to_string(),
        };
        rows.push(format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            icao_to_string(icao),
            record.message_count,
            record.callsign.as_deref().unwrap_or("-"),
            opt_cell(record.squawk),
            record
                .airborne
                .map(|a| if a { "airborne" } else { "ground" })
                .unwrap_or("-"),
            record
                .altitude_ft
                .map(|a| format!("{a:.0}"))
                .unwrap_or_else(|| "-".to_string()),
            position,
            record.ground_speed.as_deref().unwrap_or("-"),
            record.ground_track.as_deref().unwrap_or("-"),
            render_age(record.last_updated),
        ));
    });

    let table = format!(
        "<div class=\"container\">\n<p>{} aircraft tracked</p>\n<table>\n<tr><th>ICAO</th><th>Msgs</th><th>Callsign</th><th>Squawk</th><th>Status</th><th>Altitude (ft)</th><th>Position</th><th>Ground speed</th><th>Ground track</th><th>Last updated</th></tr>\n{}\n</table>\n</div>",
        rows.len(),
        rows.join("\n")
    );
    render_page(&table)
}

/// Build the observer router over a shared [`Vessels`] handle.
pub fn build_router(vessels: Arc<Vessels>) -> Router {
    Router::new()
        .route("/", axum::routing::get(page_aircraft))
        .with_state(vessels)
}

/// Serve the observer surface at `addr` until the process is terminated.
pub async fn serve(vessels: Arc<Vessels>, addr: &str) -> std::io::Result<()> {
    let app = build_router(vessels);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "observer surface listening");
    axum::serve(listener, app).await
}
