//! In-process Maven repository and fixture builders for tests.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

#[inline]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

struct RepoState {
    files: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

/// HTTP server answering GET requests from a fixed path -> body table
pub struct TestRepository {
    pub base_url: String,
    state: Arc<RepoState>,
}

impl TestRepository {
    pub async fn serve<I>(files: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Vec<u8>)>,
    {
        let state = Arc::new(RepoState {
            files: files
                .into_iter()
                .map(|(path, body)| (path.to_string(), body))
                .collect(),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(serve_file)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub async fn empty() -> Self {
        Self::serve(Vec::<(&'static str, Vec<u8>)>::new()).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Number of requests received for `path`
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    pub fn total_hits(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

async fn serve_file(State(state): State<Arc<RepoState>>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(path.clone());

    match state.files.get(&path) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A `maven-metadata.xml` document listing `versions` in order
pub fn metadata_xml(group_id: &str, artifact_id: &str, versions: &[&str]) -> String {
    let entries: String = versions
        .iter()
        .map(|v| format!("      <version>{v}</version>\n"))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>{group_id}</groupId>
  <artifactId>{artifact_id}</artifactId>
  <versioning>
    <latest>{latest}</latest>
    <versions>
{entries}    </versions>
    <lastUpdated>20200301120000</lastUpdated>
  </versioning>
</metadata>
"#,
        latest = versions.last().copied().unwrap_or_default(),
    )
}

/// A zip archive holding `{entry_path}` with a small launcher script
pub fn zip_with_entry(entry_path: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .unix_permissions(0o755);

    writer.start_file(entry_path, options).unwrap();
    writer.write_all(b"#!/bin/sh\nexit 0\n").unwrap();
    writer.finish().unwrap().into_inner()
}
