#![allow(dead_code)]

// Stub OreCast services for integration tests.
//
// The client under test is blocking, so the axum stubs run on their own
// tokio runtime in a background thread, bound to an ephemeral port.

use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use orecast_cli::api::ApiClient;
use orecast_cli::config::{AuthzCredentials, OreConfig, Services};
use orecast_cli::ui::Terminal;
use serde_json::{json, Value};
use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

pub const CLIENT_ID: &str = "orecast-client";
pub const CLIENT_SECRET: &str = "orecast-secret";

/// What the stubs saw.
#[derive(Clone, Default)]
pub struct Recorder {
    pub authorize_hits: Arc<AtomicUsize>,
    pub token_hits: Arc<AtomicUsize>,
    pub authorize_bodies: Arc<Mutex<Vec<Value>>>,
    pub authorize_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub token_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub bearer: Arc<Mutex<Vec<Option<String>>>>,
    pub uploads: Arc<Mutex<Vec<String>>>,
    pub deleted: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn authorize_hits(&self) -> usize {
        self.authorize_hits.load(Ordering::SeqCst)
    }

    pub fn token_hits(&self) -> usize {
        self.token_hits.load(Ordering::SeqCst)
    }

    pub fn bearer(&self) -> Vec<Option<String>> {
        self.bearer.lock().unwrap().clone()
    }

    fn see_bearer(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.bearer.lock().unwrap().push(value);
    }
}

fn json_body(body: String) -> ([(header::HeaderName, &'static str); 1], String) {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// `/oauth/authorize` and `/oauth/token` answering with fixed raw bodies.
pub fn authz_routes(rec: Recorder, authorize_reply: &str, token_reply: &str) -> Router {
    let authorize_reply = authorize_reply.to_string();
    let token_reply = token_reply.to_string();
    let rec_a = rec.clone();
    Router::new()
        .route(
            "/oauth/authorize",
            post(
                move |Query(q): Query<HashMap<String, String>>, Json(body): Json<Value>| {
                    let rec = rec_a.clone();
                    let reply = authorize_reply.clone();
                    async move {
                        rec.authorize_hits.fetch_add(1, Ordering::SeqCst);
                        rec.authorize_queries.lock().unwrap().push(q);
                        rec.authorize_bodies.lock().unwrap().push(body);
                        json_body(reply)
                    }
                },
            ),
        )
        .route(
            "/oauth/token",
            get(move |Query(q): Query<HashMap<String, String>>| {
                let rec = rec.clone();
                let reply = token_reply.clone();
                async move {
                    rec.token_hits.fetch_add(1, Ordering::SeqCst);
                    rec.token_queries.lock().unwrap().push(q);
                    json_body(reply)
                }
            }),
        )
}

/// Discovery and data management endpoints; every mutation answers `reply`.
pub fn service_routes(rec: Recorder, reply: &str) -> Router {
    let reply = reply.to_string();
    let (r1, r2, r3, r4, r5) = (rec.clone(), rec.clone(), rec.clone(), rec.clone(), rec);
    let (p1, p2, p3) = (reply.clone(), reply.clone(), reply);
    Router::new()
        .route(
            "/sites",
            get(move |headers: HeaderMap| {
                let rec = r1.clone();
                async move {
                    rec.see_bearer(&headers);
                    json_body(json!([{"name": "Cornell"}]).to_string())
                }
            })
            .post(move |headers: HeaderMap, Json(_site): Json<Value>| {
                let rec = r2.clone();
                let reply = p1.clone();
                async move {
                    rec.see_bearer(&headers);
                    json_body(reply)
                }
            }),
        )
        .route(
            "/site/{name}",
            delete(move |Path(name): Path<String>, headers: HeaderMap| {
                let rec = r3.clone();
                let reply = p2.clone();
                async move {
                    rec.see_bearer(&headers);
                    rec.deleted.lock().unwrap().push(name);
                    json_body(reply)
                }
            }),
        )
        .route(
            "/storage/{site}/{bucket}/{file}",
            post(move |headers: HeaderMap, body: String| {
                let rec = r4.clone();
                let reply = p3.clone();
                async move {
                    rec.see_bearer(&headers);
                    rec.uploads.lock().unwrap().push(body);
                    json_body(reply)
                }
            }),
        )
        .route(
            "/storage/{site}",
            get(move |headers: HeaderMap| {
                let rec = r5.clone();
                async move {
                    rec.see_bearer(&headers);
                    json_body(json!({"status": "ok", "data": ["bucket"]}).to_string())
                }
            }),
        )
}

/// Upload endpoint answering per object name; names not in `replies` get
/// `fallback`.
pub fn upload_routes(rec: Recorder, replies: &[(&str, &str)], fallback: &str) -> Router {
    let replies: HashMap<String, String> = replies
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let fallback = fallback.to_string();
    Router::new().route(
        "/storage/{site}/{bucket}/{file}",
        post(
            move |Path((_site, _bucket, file)): Path<(String, String, String)>,
                  headers: HeaderMap,
                  _body: String| {
                let rec = rec.clone();
                let reply = replies.get(&file).cloned().unwrap_or_else(|| fallback.clone());
                async move {
                    rec.see_bearer(&headers);
                    rec.uploads.lock().unwrap().push(file);
                    json_body(reply)
                }
            },
        ),
    )
}

/// Serve `app` on 127.0.0.1 and return its base URL.
pub fn serve(app: Router) -> String {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

/// A valid OreCast token signed with `key`.
pub fn mint_token(key: &str) -> String {
    let claims = json!({
        "login": "alice",
        "iss": "orecast-authz",
        "exp": (Utc::now() + Duration::minutes(10)).timestamp(),
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(key.as_bytes())).unwrap()
}

pub fn token_reply(token: &str) -> String {
    json!({"access_token": token, "token_type": "bearer", "expires_in": 600}).to_string()
}

pub fn config(url: &str) -> OreConfig {
    OreConfig {
        services: Services {
            authz_url: url.to_string(),
            discovery_url: url.to_string(),
            metadata_url: url.to_string(),
            data_management_url: url.to_string(),
            data_bookkeeping_url: url.to_string(),
        },
        authz: AuthzCredentials {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
        },
    }
}

/// Terminal answering from scripted queues; counts how often it was asked.
pub struct ScriptedTerminal {
    lines: VecDeque<String>,
    secrets: VecDeque<String>,
    pub asked: Rc<Cell<usize>>,
}

impl ScriptedTerminal {
    pub fn new(lines: &[&str], secrets: &[&str]) -> Self {
        ScriptedTerminal {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            secrets: secrets.iter().map(|s| s.to_string()).collect(),
            asked: Rc::new(Cell::new(0)),
        }
    }
}

fn exhausted() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")
}

impl Terminal for ScriptedTerminal {
    fn line(&mut self, _label: &str) -> io::Result<String> {
        self.asked.set(self.asked.get() + 1);
        self.lines.pop_front().ok_or_else(exhausted)
    }

    fn secret(&mut self, _label: &str) -> io::Result<String> {
        self.asked.set(self.asked.get() + 1);
        self.secrets.pop_front().ok_or_else(exhausted)
    }
}

pub fn client(url: &str, term: ScriptedTerminal) -> ApiClient {
    ApiClient::new(config(url), Box::new(term)).unwrap()
}
