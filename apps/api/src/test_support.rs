//! In-memory stand-ins for every external collaborator, plus fixture builders
//! for the HTTP-level tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::types::Json;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::{AuthUser, Authenticator};
use crate::db::{PortfolioRepository, ProfileRepository, ResumeRepository, UserRepository};
use crate::errors::AppError;
use crate::llm_client::{LlmError, StructuredCompletion, StructuredRequest};
use crate::models::portfolio::{Portfolio, PortfolioCreate, PortfolioUpdate};
use crate::models::profile::{Profile, ProfileFields};
use crate::models::resume::{NewResume, Resume};
use crate::models::user::{User, UserUpdate};
use crate::models::Pagination;
use crate::state::AppState;
use crate::storage::{FileStore, StorageError, StoredObject};

// ────────────────────────────────────────────────────────────────────────────
// Object storage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FileStoreInner {
    objects: RwLock<HashMap<String, StoredObject>>,
    puts: AtomicUsize,
    fail_deletes: AtomicBool,
}

#[derive(Clone, Default)]
pub struct MemoryFileStore {
    inner: Arc<FileStoreInner>,
}

impl MemoryFileStore {
    pub async fn contains(&self, path: &str) -> bool {
        self.inner.objects.read().await.contains_key(path)
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.objects.read().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.inner.objects.read().await.len()
    }

    /// Number of successful `put` calls, including overwritten or deleted objects.
    pub fn put_count(&self) -> usize {
        self.inner.puts.load(Ordering::SeqCst)
    }

    /// Makes every subsequent `delete` fail.
    pub fn fail_deletes(&self) {
        self.inner.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put(&self, path: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.inner.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                bytes: body,
                content_type: Some(content_type.to_string()),
            },
        );
        self.inner.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        Ok(self.inner.objects.read().await.get(path).cloned())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        if self.inner.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("delete refused".to_string()));
        }
        self.inner.objects.write().await.remove(path);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Relational storage
// ────────────────────────────────────────────────────────────────────────────

/// What the next resume inserts should do.
#[derive(Debug, Clone, Copy, Default)]
pub enum InsertOutcome {
    #[default]
    Store,
    Fail,
    NoRow,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    resumes: Vec<Resume>,
    profiles: Vec<Profile>,
    portfolios: Vec<Portfolio>,
    resume_insert: InsertOutcome,
}

/// Every table in one lock. Rows are kept in insertion order, so "newest
/// first" is reverse iteration.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
    pub fn with_users(ids: &[&str]) -> Self {
        let users = ids
            .iter()
            .map(|id| User {
                id: id.to_string(),
                email: format!("{id}@example.com"),
                name: None,
                role: None,
                created_at: Utc::now(),
            })
            .collect();
        Self {
            tables: Arc::new(RwLock::new(Tables {
                users,
                ..Tables::default()
            })),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn set_resume_insert(&self, outcome: InsertOutcome) {
        self.tables.write().await.resume_insert = outcome;
    }
}

fn page_of<T: Clone>(rows: &[T], owned: impl Fn(&T) -> bool, page: Pagination) -> Vec<T> {
    let page = page.normalized();
    rows.iter()
        .rev()
        .filter(|row| owned(row))
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

fn rejected(what: &str) -> AppError {
    AppError::Database(sqlx::Error::Protocol(format!("{what} rejected")))
}

#[async_trait]
impl ResumeRepository for MemoryRepository {
    async fn list(&self, user_id: &str, page: Pagination) -> Result<Vec<Resume>, AppError> {
        let tables = self.tables.read().await;
        Ok(page_of(&tables.resumes, |r| r.user_id == user_id, page))
    }

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Resume>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .resumes
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, resume: &NewResume) -> Result<Option<Resume>, AppError> {
        let mut tables = self.tables.write().await;
        match tables.resume_insert {
            InsertOutcome::Fail => return Err(rejected("resume insert")),
            InsertOutcome::NoRow => return Ok(None),
            InsertOutcome::Store => {}
        }
        if tables.resumes.iter().any(|r| r.file_path == resume.file_path) {
            return Err(rejected("duplicate file_path"));
        }
        let row = Resume {
            id: resume.id,
            user_id: resume.user_id.clone(),
            title: resume.title.clone(),
            file_path: resume.file_path.clone(),
            data: Json(resume.data.clone()),
            created_at: Utc::now(),
        };
        tables.resumes.push(row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.resumes.len();
        tables
            .resumes
            .retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(tables.resumes.len() != before)
    }
}

#[async_trait]
impl ProfileRepository for MemoryRepository {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn insert(
        &self,
        user_id: &str,
        email: &str,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, AppError> {
        let mut tables = self.tables.write().await;
        if tables.profiles.iter().any(|p| p.user_id == user_id) {
            return Ok(None);
        }
        let now = Utc::now();
        let mut profile = Profile {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            email: email.to_string(),
            full_name: None,
            phone: None,
            location: None,
            bio: None,
            linkedin: None,
            github: None,
            website: None,
            title: None,
            company: None,
            created_at: now,
            updated_at: now,
        };
        fields.apply(&mut profile);
        tables.profiles.push(profile.clone());
        Ok(Some(profile))
    }

    async fn update(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .map(|profile| {
                fields.apply(profile);
                profile.updated_at = Utc::now();
                profile.clone()
            }))
    }

    async fn delete(&self, user_id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.user_id != user_id);
        Ok(tables.profiles.len() != before)
    }
}

#[async_trait]
impl PortfolioRepository for MemoryRepository {
    async fn list(&self, user_id: &str, page: Pagination) -> Result<Vec<Portfolio>, AppError> {
        let tables = self.tables.read().await;
        Ok(page_of(&tables.portfolios, |p| p.user_id == user_id, page))
    }

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Portfolio>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .portfolios
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn insert(
        &self,
        user_id: &str,
        portfolio: &PortfolioCreate,
    ) -> Result<Option<Portfolio>, AppError> {
        let now = Utc::now();
        let row = Portfolio {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: portfolio.name.clone(),
            template_id: portfolio.template_id.clone(),
            data: Value::Object(portfolio.data.clone()),
            color: portfolio.color.clone(),
            display_mode: portfolio.display_mode.clone(),
            is_published: portfolio.is_published,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.portfolios.push(row.clone());
        Ok(Some(row))
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        update: &PortfolioUpdate,
    ) -> Result<Option<Portfolio>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .portfolios
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
            .map(|portfolio| {
                update.apply(portfolio);
                portfolio.updated_at = Utc::now();
                portfolio.clone()
            }))
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.portfolios.len();
        tables
            .portfolios
            .retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(tables.portfolios.len() != before)
    }

    async fn set_published(
        &self,
        user_id: &str,
        id: Uuid,
        is_published: bool,
    ) -> Result<Option<Portfolio>, AppError> {
        let update = PortfolioUpdate {
            is_published: Some(is_published),
            ..PortfolioUpdate::default()
        };
        PortfolioRepository::update(self, user_id, id, &update).await
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn provision(&self, user_id: &str, email: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter().find(|u| u.id == user_id) {
            return Ok(user.clone());
        }
        let user = User {
            id: user_id.to_string(),
            email: email.to_string(),
            name: None,
            role: None,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user_id: &str, update: &UserUpdate) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .map(|user| {
                if let Some(name) = &update.name {
                    user.name = Some(name.clone());
                }
                if let Some(email) = &update.email {
                    user.email = email.clone();
                }
                if let Some(role) = &update.role {
                    user.role = Some(role.clone());
                }
                user.clone()
            }))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM and auth
// ────────────────────────────────────────────────────────────────────────────

/// Owned copy of the last request a [`StubCompletion`] saw.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: Vec<String>,
    pub user: String,
    pub schema_name: String,
    pub schema: Value,
}

#[derive(Default)]
struct StubState {
    calls: AtomicUsize,
    last: Mutex<Option<RecordedRequest>>,
}

/// Returns a canned JSON value, or `EmptyContent` when built with [`StubCompletion::empty`].
#[derive(Clone)]
pub struct StubCompletion {
    output: Option<Value>,
    state: Arc<StubState>,
}

impl StubCompletion {
    pub fn returning(output: Value) -> Self {
        Self {
            output: Some(output),
            state: Arc::default(),
        }
    }

    pub fn empty() -> Self {
        Self {
            output: None,
            state: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredCompletion for StubCompletion {
    async fn complete(&self, request: StructuredRequest<'_>) -> Result<Value, LlmError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last.lock().unwrap() = Some(RecordedRequest {
            system: request.system.iter().map(|s| s.to_string()).collect(),
            user: request.user.to_string(),
            schema_name: request.schema_name.to_string(),
            schema: request.schema.clone(),
        });
        self.output.clone().ok_or(LlmError::EmptyContent)
    }
}

/// Accepts `token-<id>` as user `<id>` with email `<id>@example.com`.
pub struct StubAuthenticator;

#[async_trait]
impl Authenticator for StubAuthenticator {
    async fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        token
            .strip_prefix("token-")
            .filter(|id| !id.is_empty())
            .map(|id| AuthUser {
                id: id.to_string(),
                email: format!("{id}@example.com"),
            })
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// App harness
// ────────────────────────────────────────────────────────────────────────────

/// Users `u1` and `u2` exist; `token-u1` / `token-u2` authenticate as them.
pub struct TestApp {
    pub files: MemoryFileStore,
    pub repo: MemoryRepository,
    pub llm: StubCompletion,
    pub max_upload_bytes: usize,
}

impl TestApp {
    pub fn new(llm_output: Value) -> Self {
        Self::with_llm(StubCompletion::returning(llm_output))
    }

    pub fn empty_llm() -> Self {
        Self::with_llm(StubCompletion::empty())
    }

    fn with_llm(llm: StubCompletion) -> Self {
        Self {
            files: MemoryFileStore::default(),
            repo: MemoryRepository::with_users(&["u1", "u2"]),
            llm,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn state(&self) -> AppState {
        let repo = Arc::new(self.repo.clone());
        AppState {
            files: Arc::new(self.files.clone()),
            resumes: repo.clone(),
            profiles: repo.clone(),
            portfolios: repo.clone(),
            users: repo,
            llm: Arc::new(self.llm.clone()),
            auth: Arc::new(StubAuthenticator),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new(sample_resume_json())
    }
}

pub fn request(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A `multipart/form-data` request carrying one `file` field.
pub fn multipart_upload(
    uri: &str,
    token: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    const BOUNDARY: &str = "folio-test-boundary";
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send_raw(router: Router, req: Request<Body>) -> Response {
    router.oneshot(req).await.unwrap()
}

pub async fn send(router: Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let response = send_raw(router, req).await;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body)
}

/// `Value::Null` for an empty body.
pub fn json_body(bytes: &Bytes) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn sample_resume_json() -> Value {
    json!({
        "personal_information": {
            "full_name": "Alice Example",
            "contact_info": {
                "email": "alice@example.com",
                "linkedin": "linkedin.com/in/alice",
                "phone": "555-0100",
                "address": "Springfield"
            },
            "education": {
                "school": "State University",
                "majors": ["Computer Science"],
                "minors": [],
                "expected_grad": "May 2026"
            }
        },
        "overview": {
            "career_name": "Backend Engineer",
            "resume_summary": "Builds reliable services in Rust and SQL."
        },
        "projects": [
            {"title": "Ledger", "description": "Double-entry bookkeeping service."}
        ],
        "skills": ["Rust", "SQL"],
        "experience": [
            {
                "company": "Acme",
                "description": "Maintained the billing pipeline.",
                "employed_dates": "2023 - 2024"
            }
        ]
    })
}

/// A PDF with one page per entry, each drawing its text in Courier.
/// An empty entry yields a page with no text at all.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        if !text.is_empty() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// A DOCX with one plain-text run per paragraph.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}
