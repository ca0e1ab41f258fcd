// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared setup for router tests.

use std::path::PathBuf;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use repatria_api::{FileStorage, StorageDisk};
use repatria_domain::Role;
use repatria_persistence::Persistence;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::{AppState, build_router};

pub const TEST_PASSWORD: &str = "secret-password";

/// A router over an in-memory database and a temporary upload folder.
pub struct TestApp {
    pub router: Router,
    _dir: TempDir,
}

/// Creates a router with an admin, a registrar, and a social worker.
pub fn create_test_app() -> TestApp {
    let dir: TempDir = TempDir::new().expect("Failed to create temp dir");
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    for (username, role) in [
        ("admin", Role::Admin),
        ("registrar", Role::Registrar),
        ("social", Role::SocialAdaptation),
    ] {
        persistence
            .create_user(username, TEST_PASSWORD, "TEST OPERATOR", role, None)
            .unwrap();
    }

    let storage: FileStorage = FileStorage::new(
        vec![StorageDisk {
            name: String::from("disk1"),
            path: dir.path().join("disk1"),
            priority: 0,
        }],
        dir.path().join("uploads"),
        None,
    );
    storage.create_folders();

    let template: PathBuf = dir.path().join("missing-template.docx");
    let state: AppState = AppState::new(persistence, storage, template);
    let router: Router = build_router(state, DEFAULT_MAX_UPLOAD_BYTES);

    TestApp {
        router,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Logs in and returns the session token.
    pub async fn login(&self, username: &str) -> String {
        let body: String = serde_json::json!({
            "username": username,
            "password": TEST_PASSWORD,
        })
        .to_string();
        let response: Response<Body> = self
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), 200);
        json_body(response).await["session_token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

/// A JSON request carrying the session cookie.
pub fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("session={token}"));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn json_body(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
