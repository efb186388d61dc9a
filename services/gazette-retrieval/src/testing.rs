//! In-process stand-in for the gazette host, shared with downstream crates
//! through the `testing` feature.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use gazette_models::{page_file_name, GazetteDate};
use gazette_utils::SourceConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn gazette_date(y: i32, m: u32, d: u32) -> GazetteDate {
    GazetteDate::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn source_config(base_url: &str, download_dir: &std::path::Path) -> SourceConfig {
    SourceConfig {
        base_url: base_url.to_string(),
        min_page_bytes: 1024,
        request_timeout_seconds: 5,
        download_dir: download_dir.to_path_buf(),
        ..SourceConfig::default()
    }
}

#[derive(Clone)]
enum Served {
    Body(Vec<u8>),
    Error,
}

/// Files served under `/{date}/{file}`; anything else is a 404.
#[derive(Clone, Default)]
pub struct FakeEdition {
    files: HashMap<String, Served>,
}

impl FakeEdition {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(date: &GazetteDate, number: u32) -> String {
        format!("{}/{}", date.url_key(), page_file_name("do", date, number))
    }

    pub fn page(mut self, date: &GazetteDate, number: u32, body: Vec<u8>) -> Self {
        self.files.insert(Self::key(date, number), Served::Body(body));
        self
    }

    /// Pages `1..=count`, each 2 KiB.
    pub fn valid_pages(mut self, date: &GazetteDate, count: u32) -> Self {
        for number in 1..=count {
            self = self.page(date, number, vec![b'%'; 2048]);
        }
        self
    }

    pub fn failing(mut self, date: &GazetteDate, number: u32) -> Self {
        self.files.insert(Self::key(date, number), Served::Error);
        self
    }
}

async fn serve_page(
    State(edition): State<Arc<FakeEdition>>,
    Path((date, file)): Path<(String, String)>,
) -> Result<Vec<u8>, StatusCode> {
    match edition.files.get(&format!("{}/{}", date, file)) {
        Some(Served::Body(body)) => Ok(body.clone()),
        Some(Served::Error) => Err(StatusCode::INTERNAL_SERVER_ERROR),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Starts the fake host on an ephemeral port and returns its base URL.
pub async fn spawn_gazette(edition: FakeEdition) -> String {
    let app = Router::new()
        .route("/:date/:file", get(serve_page))
        .with_state(Arc::new(edition));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
