//! End-to-end tests against an in-process server.
//!
//! Each test writes a synthetic dataset and model artifact to a temp
//! directory, builds the application context from them, serves it on an
//! ephemeral port, and exercises the HTTP surface with a real client.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, TimeDelta};

use aircast::{config::Config, routes, AppContext};

// ---

/// Write a 120-hour dataset (with a gap, a sub-hourly duplicate, and one
/// corrupt row) plus a lag1-echo linear model, and return their paths.
fn write_fixtures(tag: &str) -> Result<(PathBuf, PathBuf)> {
    // ---
    let dir = std::env::temp_dir().join(format!("aircast-test-{}-{}", std::process::id(), tag));
    std::fs::create_dir_all(&dir)?;

    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut csv = String::from("timestamp,PM2.5,NO2,station\n");
    for i in 0..120i64 {
        if i == 40 {
            // Leave a one-hour hole for the normalizer to interpolate.
            continue;
        }
        let ts = start + TimeDelta::hours(i);
        let pm25 = 18.0 + (i % 12) as f64 * 1.5;
        let no2 = 30.0 + (i % 5) as f64;
        csv.push_str(&format!(
            "{},{:.1},{:.1},riyadh-01\n",
            ts.format("%Y-%m-%d %H:%M:%S"),
            pm25,
            no2
        ));
    }
    let duplicate = start + TimeDelta::hours(10) + TimeDelta::minutes(30);
    csv.push_str(&format!(
        "{},99.0,31.0,riyadh-01\n",
        duplicate.format("%Y-%m-%d %H:%M:%S")
    ));
    csv.push_str("not-a-timestamp,12.0,30.0,riyadh-01\n");

    let data_path = dir.join("air_quality.csv");
    std::fs::write(&data_path, csv)?;

    let model_path = dir.join("pm25_linear.json");
    std::fs::write(
        &model_path,
        r#"{"intercept": 1.0, "coefficients": {"PM2.5_lag1": 1.0}}"#,
    )?;

    Ok((data_path, model_path))
}

/// Build the app from the fixtures and serve it on an ephemeral port.
async fn spawn_app(tag: &str) -> Result<String> {
    // ---
    let (data_path, model_path) = write_fixtures(tag)?;
    let ctx = AppContext::from_config(Config {
        data_path,
        model_path,
        target: "PM2.5".to_string(),
        port: 0,
    })?;

    let app = routes::router(Arc::new(ctx));
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{}", addr))
}

// ---

#[tokio::test]
async fn health_endpoint_reports_ok() -> Result<()> {
    // ---
    let base = spawn_app("health").await?;

    let response = reqwest::get(format!("{base}/health")).await?;
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, serde_json::json!({"ok": true}));

    Ok(())
}

#[tokio::test]
async fn last_window_returns_72_parallel_arrays() -> Result<()> {
    // ---
    let base = spawn_app("last").await?;

    let response = reqwest::get(format!("{base}/api/last")).await?;
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await?;
    let timestamps = body["timestamps"].as_array().expect("timestamps array");
    let pm25 = body["pm25"].as_array().expect("pm25 array");
    let aqi = body["aqi"].as_array().expect("aqi array");

    assert_eq!(timestamps.len(), 72);
    assert_eq!(pm25.len(), 72);
    assert_eq!(aqi.len(), 72);

    // Most-recent-last: the window ends at the final observed hour.
    assert_eq!(
        timestamps.last().and_then(|v| v.as_str()),
        Some("2024-03-05 23:00:00")
    );

    // The gap-filled series feeds the window, so every cell is a number.
    for value in pm25.iter().chain(aqi.iter()) {
        assert!(value.as_f64().is_some());
    }

    Ok(())
}

#[tokio::test]
async fn predict_returns_next_hour_forecast() -> Result<()> {
    // ---
    let base = spawn_app("predict").await?;

    let response = reqwest::get(format!("{base}/api/predict")).await?;
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await?;

    // The model echoes lag1 + 1: the value at hour 118 is 18 + (118 % 12) * 1.5
    // = 33.0, so the forecast must be 34.0 µg/m³.
    assert_eq!(body["next_hour_prediction_ugm3"].as_f64(), Some(34.0));
    assert_eq!(body["next_hour_prediction_aqi"].as_u64(), Some(97));
    assert_eq!(body["aqi_category_text"], "moderate");
    assert_eq!(body["aqi_category_class"], "aqi-moderate");
    assert_eq!(body["last_timestamp"], "2024-03-05 23:00:00");

    Ok(())
}
