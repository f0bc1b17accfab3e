use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use common::storage::AttachmentKind;
use common::storage::filesystem::FilesystemAttachmentStore;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use serde_json::Value;
use tempfile::TempDir;

use sthala_server::config::{
    AppConfig, CatalogConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig,
};
use sthala_server::database::init_db;
use sthala_server::state::AppState;

pub mod routes {
    pub const SITES: &str = "/api/v1/sites";
    pub const ALL_SITES: &str = "/api/v1/sites/all";
    pub const MAP_POINTS: &str = "/api/v1/sites/map";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn site(id: i32) -> String {
        format!("/api/v1/sites/{id}")
    }

    pub fn sites_page(search: Option<&str>, page: i64) -> String {
        match search {
            Some(term) => format!("/api/v1/sites?search={term}&page={page}"),
            None => format!("/api/v1/sites?page={page}"),
        }
    }

    pub fn attachment(reference: &str) -> String {
        format!("/api/v1/attachments/{reference}")
    }
}

/// Smallest bytes that pass for each kind of attachment in tests.
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image body";
pub const AUDIO_BYTES: &[u8] = b"RIFF....WAVEfmt fake narration";

pub fn golconda_photo() -> Vec<u8> {
    let mut bytes = IMAGE_BYTES.to_vec();
    bytes.resize(40 * 1024, 0x5a);
    bytes
}

/// A multipart site submission under construction.
#[derive(Clone)]
pub struct SiteForm {
    fields: Vec<(&'static str, String)>,
    files: Vec<(&'static str, String, Vec<u8>)>,
}

impl SiteForm {
    /// A complete, valid submission: Golconda Fort with a 40 KB photo and a location.
    pub fn golconda() -> Self {
        Self::new("Golconda Fort", "Fort")
            .file("image", "golconda.png", golconda_photo())
            .text(
                "description",
                "A fortified citadel and former diamond trading centre.",
            )
            .text("language", "Telugu")
            .text("place_name", "Hyderabad")
    }

    /// A valid submission with the given title and category.
    pub fn new(title: &str, category: &str) -> Self {
        Self {
            fields: vec![
                ("title", title.to_string()),
                ("description", format!("Notes about {title}.")),
                ("category", category.to_string()),
                ("latitude", "17.3833".to_string()),
                ("longitude", "78.4011".to_string()),
            ],
            files: vec![("image", "photo.jpg".to_string(), IMAGE_BYTES.to_vec())],
        }
    }

    /// Set (or replace) a text field.
    pub fn text(mut self, name: &'static str, value: &str) -> Self {
        self.fields.retain(|(n, _)| *n != name);
        self.fields.push((name, value.to_string()));
        self
    }

    /// Set (or replace) a file field.
    pub fn file(mut self, name: &'static str, file_name: &str, bytes: Vec<u8>) -> Self {
        self.files.retain(|(n, _, _)| *n != name);
        self.files.push((name, file_name.to_string(), bytes));
        self
    }

    /// Drop a text or file field entirely.
    pub fn without(mut self, name: &str) -> Self {
        self.fields.retain(|(n, _)| *n != name);
        self.files.retain(|(n, _, _)| *n != name);
        self
    }

    fn into_form(self) -> Form {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for (name, file_name, bytes) in self.files {
            form = form.part(name, Part::bytes(bytes).file_name(file_name));
        }
        form
    }
}

/// A running test server over a throwaway database and attachment root.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub attachments_root: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

pub fn test_config(dir: &Path) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.join("catalog.db").display()),
            max_connections: 5,
        },
        storage: StorageConfig {
            root: dir.join("attachments"),
            ..Default::default()
        },
        catalog: CatalogConfig::default(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a tweaked configuration.
    pub async fn spawn_with(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = test_config(dir.path());
        tweak(&mut config);

        let db = init_db(&config.database.url, config.database.max_connections)
            .await
            .expect("Failed to initialize test database");
        let store = FilesystemAttachmentStore::new(
            config.storage.root.clone(),
            Duration::from_secs(config.storage.write_timeout_secs),
        )
        .await
        .expect("Failed to initialize attachment store");

        let attachments_root = config.storage.root.clone();
        let state = AppState {
            db: db.clone(),
            config,
            attachments: Arc::new(store),
        };

        let app = sthala_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            attachments_root,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn submit(&self, form: SiteForm) -> TestResponse {
        let res = self
            .client
            .post(self.url(routes::SITES))
            .multipart(form.into_form())
            .send()
            .await
            .expect("Failed to send multipart submission");

        TestResponse::from_response(res).await
    }

    /// Submit a valid site and return the created record.
    pub async fn create_site(&self, title: &str, category: &str) -> Value {
        let res = self.submit(SiteForm::new(title, category)).await;
        assert_eq!(res.status, 201, "create_site failed: {}", res.text);
        res.body
    }

    pub async fn record_count(&self) -> i64 {
        let row = self
            .db
            .query_one_raw(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT COUNT(*) AS n FROM site_record".to_string(),
            ))
            .await
            .expect("Failed to count records")
            .expect("COUNT should return a row");
        row.try_get("", "n").expect("Failed to read count")
    }

    pub async fn execute_sql(&self, sql: &str) {
        self.db
            .execute_raw(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
            .await
            .expect("Failed to execute SQL");
    }

    /// Number of stored files of one kind.
    pub fn stored_files(&self, kind: AttachmentKind) -> usize {
        count_files(&self.attachments_root.join(kind.as_str()))
    }

    /// Number of stored files across every kind.
    pub fn all_stored_files(&self) -> usize {
        AttachmentKind::ALL
            .iter()
            .map(|kind| self.stored_files(*kind))
            .sum()
    }

    /// Leftover temp files from interrupted writes.
    pub fn temp_files(&self) -> usize {
        count_files(&self.attachments_root.join(".tmp"))
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(Result::ok).count())
        .unwrap_or(0)
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}
