#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread::ThreadId;

use axum::http::StatusCode;
use axum::routing::{get, MethodRouter};
use axum::Router;
use blockhost::models::{LatestReleases, ReleaseEntry, ReleaseKind, ReleaseManifest};
use blockhost::provision::{Invocation, Launcher, ProgressSink, LICENSE_FILE_NAME};
use serde_json::{json, Value};
use sha1::{Digest, Sha1};

pub const JAR: &[u8] = b"PK\x03\x04 not really a server jar, but bytes all the same";

pub const GENERATED_EULA: &str = "#By changing the setting below to TRUE you are indicating your agreement to our EULA (https://aka.ms/MinecraftEULA).\n#Tue Jun 13 10:00:00 UTC 2023\neula=false\n";

pub fn jar_sha1() -> String {
    hex::encode(Sha1::digest(JAR))
}

pub fn entry(id: &str, kind: ReleaseKind) -> ReleaseEntry {
    ReleaseEntry {
        id: id.to_string(),
        kind,
        metadata_url: format!("https://example.invalid/{}.json", id),
        release_time: None,
    }
}

pub fn manifest_of(entries: Vec<ReleaseEntry>) -> ReleaseManifest {
    ReleaseManifest::new(LatestReleases::default(), entries)
}

pub fn json_route(value: Value) -> MethodRouter {
    get(move || {
        let value = value.clone();
        async move { axum::Json(value) }
    })
}

pub fn bytes_route(bytes: &'static [u8]) -> MethodRouter {
    get(move || async move { bytes.to_vec() })
}

pub fn status_route(status: StatusCode) -> MethodRouter {
    get(move || async move { status })
}

/// A catalog server on a random local port. `build` receives the base URL so
/// documents can point back at the server.
pub async fn serve(build: impl FnOnce(&str) -> Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture server");
    let base = format!("http://{}", listener.local_addr().expect("No local addr"));
    let app = build(&base);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fixture server failed");
    });
    base
}

/// Manifest, metadata and artifact for the given ids, all served locally.
pub fn catalog_router(base: &str, ids: &[(&str, &str)]) -> Router {
    let versions: Vec<Value> = ids
        .iter()
        .map(|(id, kind)| {
            json!({
                "id": id,
                "type": kind,
                "url": format!("{}/v1/packages/{}.json", base, id),
                "time": "2023-06-12T13:25:51+00:00",
                "releaseTime": "2023-06-12T13:25:51+00:00"
            })
        })
        .collect();
    let manifest = json!({
        "latest": {"release": ids.first().map(|(id, _)| *id), "snapshot": null},
        "versions": versions
    });

    let mut router = Router::new()
        .route("/mc/game/version_manifest.json", json_route(manifest))
        .route("/server.jar", bytes_route(JAR));
    for (id, _) in ids {
        router = router.route(
            &format!("/v1/packages/{}.json", id),
            json_route(metadata(base, id)),
        );
    }
    router
}

pub fn metadata(base: &str, id: &str) -> Value {
    json!({
        "id": id,
        "downloads": {
            "server": {
                "sha1": jar_sha1(),
                "size": JAR.len(),
                "url": format!("{}/server.jar", base)
            }
        },
        "javaVersion": {"component": "java-runtime-gamma", "majorVersion": 17}
    })
}

pub fn manifest_url(base: &str) -> String {
    format!("{}/mc/game/version_manifest.json", base)
}

/// Records everything the pipeline reports.
#[derive(Default)]
pub struct Recorder {
    pub progress: Mutex<Vec<String>>,
    pub status: Mutex<Vec<String>>,
    pub downloads_started: Mutex<usize>,
    pub downloads_finished: Mutex<Vec<bool>>,
}

impl ProgressSink for Recorder {
    fn progress(&self, message: &str) {
        self.progress.lock().unwrap().push(message.to_string());
    }

    fn status(&self, line: &str) {
        self.status.lock().unwrap().push(line.to_string());
    }

    fn download_started(&self) {
        *self.downloads_started.lock().unwrap() += 1;
    }

    fn download_finished(&self, ok: bool) {
        self.downloads_finished.lock().unwrap().push(ok);
    }
}

/// Stands in for the Java runtime. Each call pops the next scripted exit
/// code; `None` means the runtime could not be started. A successful run
/// writes the license file like a real first start does.
pub struct FakeRuntime {
    exits: Mutex<VecDeque<Option<i32>>>,
    writes_license: bool,
    pub invocations: Mutex<Vec<Invocation>>,
    pub threads: Mutex<Vec<ThreadId>>,
}

impl FakeRuntime {
    pub fn new(exits: &[Option<i32>]) -> Self {
        Self {
            exits: Mutex::new(exits.iter().copied().collect()),
            writes_license: true,
            invocations: Mutex::new(Vec::new()),
            threads: Mutex::new(Vec::new()),
        }
    }

    pub fn without_license(mut self) -> Self {
        self.writes_license = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

impl Launcher for FakeRuntime {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        self.invocations.lock().unwrap().push(invocation.clone());
        self.threads.lock().unwrap().push(std::thread::current().id());
        let exit = self
            .exits
            .lock()
            .unwrap()
            .pop_front()
            .expect("Launcher called more often than scripted");
        let Some(code) = exit else {
            return Err(io::Error::new(io::ErrorKind::NotFound, "java not found"));
        };
        if code == 0 && self.writes_license {
            let path: PathBuf = invocation.working_dir.join(LICENSE_FILE_NAME);
            std::fs::write(path, GENERATED_EULA)?;
        }
        Ok(Some(code))
    }
}
