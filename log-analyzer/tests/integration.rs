use std::{io::Write, time::Duration};

use flate2::{Compression, write::GzEncoder};
use serde_json::Value;
use tokio::{
    process::{Child, Command},
    time::sleep,
};

const LOG: &str = concat!(
    r#"203.0.113.5 - - [01/Aug/2025:10:00:01 +0000] "GET /index.html HTTP/1.1" 200 1024 "http://example.com/" "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)""#,
    "\n",
    r#"203.0.113.6 - - [01/Aug/2025:11:00:01 +0000] "GET /about HTTP/1.1" 404 - "-" "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0""#,
    "\n",
    r#"203.0.113.5 - - [02/Aug/2025:09:15:00 +0000] "GET /index.html HTTP/1.1" 200 2048 "-" "Mozilla/5.0 (compatible; YandexBot/3.0; +http://yandex.com/bots)""#,
    "\n",
    "this line is not a log entry\n",
);

async fn start_analyzer() -> (Child, String) {
    let port = portpicker::pick_unused_port().expect("No free ports available");
    let base_url = format!("http://localhost:{port}");
    let child = Command::new(env!("CARGO_BIN_EXE_seo-log-analyzer"))
        .args(["--port", &port.to_string()])
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to start seo-log-analyzer");

    let client = reqwest::Client::new();
    for _ in 0..50 {
        if client
            .get(format!("{base_url}/up"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
        {
            break;
        }
        sleep(Duration::from_millis(200)).await;
    }
    (child, base_url)
}

async fn get_json(client: &reqwest::Client, url: String) -> (u16, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap();
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn upload_then_query() {
    let (mut child, base_url) = start_analyzer().await;
    let client = reqwest::Client::new();

    let (status, _) = get_json(&client, format!("{base_url}/query")).await;
    assert_eq!(status, 404, "querying before any upload");

    let resp = client
        .post(format!("{base_url}/upload?name=access.log"))
        .body(LOG)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let summary: Value = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
    assert_eq!(summary["records"], 3);
    assert_eq!(summary["skipped_lines"], 1);

    let (status, views) = get_json(&client, format!("{base_url}/query")).await;
    assert_eq!(status, 200);
    assert_eq!(views["summary"]["total_requests"], 3);
    assert_eq!(views["summary"]["bot_requests"], 2);
    assert_eq!(views["summary"]["unique_ips"], 2);
    assert_eq!(views["top_paths"][0][0], "/index.html");
    assert_eq!(views["daily_series"][0][0], "2025-08-01");

    let (_, bots) = get_json(&client, format!("{base_url}/query?bot=Google")).await;
    assert_eq!(bots["summary"]["total_requests"], 1);

    let (status, empty) = get_json(&client, format!("{base_url}/query?start=2030-01-01")).await;
    assert_eq!(status, 200);
    assert!(empty["warning"].is_string());

    let (_, records) = get_json(&client, format!("{base_url}/records?status=404")).await;
    assert_eq!(records.as_array().map(Vec::len), Some(1));
    assert_eq!(records[0]["bytes_sent"], 0);
    assert_eq!(records[0]["bot_name"], "Human");

    let (_, options) = get_json(&client, format!("{base_url}/options")).await;
    assert_eq!(options["status_codes"], serde_json::json!([200, 404]));

    let metrics = client
        .get(format!("{base_url}/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("log_total_requests 3"));

    let _ = child.kill().await;
    let _ = child.wait().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn gzip_upload_replaces_previous_file() {
    let (mut child, base_url) = start_analyzer().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base_url}/upload"))
        .body(LOG)
        .send()
        .await
        .unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(LOG.lines().next().unwrap().as_bytes())
        .unwrap();
    let gz = encoder.finish().unwrap();
    let resp = client
        .post(format!("{base_url}/upload?name=access.log.gz"))
        .body(gz)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let (_, views) = get_json(&client, format!("{base_url}/query")).await;
    assert_eq!(views["summary"]["total_requests"], 1);

    let resp = client
        .post(format!("{base_url}/upload?gzip=true"))
        .body(LOG)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = client
        .post(format!("{base_url}/upload"))
        .body("nothing useful here\n")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    // failed uploads leave the last good file in place
    let (_, views) = get_json(&client, format!("{base_url}/query")).await;
    assert_eq!(views["summary"]["total_requests"], 1);

    let _ = child.kill().await;
    let _ = child.wait().await;
}
