use crate::client::ClientError;
use crate::model::user::Role;
use chrono::{DateTime, Utc};
use log::{info, warn};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    token: String,
    user: SessionUser,
}

/// A logged-in (or not yet logged-in) connection to the league admin API.
pub struct Session {
    http: Client,
    base_url: String,
    current: Option<StoredSession>,
    store: Option<PathBuf>,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Session {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            current: None,
            store: None,
        }
    }

    /// Persists the session to `path` and resumes one already saved there.
    pub fn with_store(mut self, path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        self.current = load_stored(&path)?;
        self.store = Some(path);
        Ok(self)
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<&SessionUser, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        // A refused login says nothing about the token already held.
        let reply: LoginReply = decode(response).await?;
        info!("Logged in as {}", reply.user.username);
        self.current = Some(StoredSession {
            token: reply.token,
            user: reply.user,
        });
        self.persist()?;

        self.current_user().ok_or(ClientError::NotLoggedIn)
    }

    /// Drops the local session; the server call is informational only.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        if let Some(token) = self.token() {
            let sent = self
                .http
                .post(self.url("/api/auth/logout"))
                .bearer_auth(token)
                .send()
                .await;
            if let Err(e) = sent {
                warn!("Logout request failed, clearing the session anyway: {}", e);
            }
        }
        self.clear()
    }

    pub async fn get<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ClientError> {
        let request = self.authorized(Method::GET, path)?;
        let response = request.send().await?;
        self.read(response).await
    }

    pub async fn send<B, T>(&mut self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authorized(method, path)?.json(body);
        let response = request.send().await?;
        self.read(response).await
    }

    pub async fn delete<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ClientError> {
        let request = self.authorized(Method::DELETE, path)?;
        let response = request.send().await?;
        self.read(response).await
    }

    /// Fetches the profile and refreshes the cached user with it.
    pub async fn refresh_profile(&mut self) -> Result<&SessionUser, ClientError> {
        let user: SessionUser = self.get("/api/auth/profile").await?;
        if let Some(current) = self.current.as_mut() {
            current.user = user;
        }
        self.persist()?;
        self.current_user().ok_or(ClientError::NotLoggedIn)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.token().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn read<T: DeserializeOwned>(&mut self, response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        let outcome = decode(response).await;
        if outcome.is_err() {
            self.absorb_rejection(status)?;
        }
        outcome
    }

    /// A rejected token ends the session.
    fn absorb_rejection(&mut self, status: StatusCode) -> Result<(), ClientError> {
        if (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
            && self.current.is_some()
        {
            warn!("Server answered {}, dropping the stored session", status);
            self.clear()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        self.current = None;
        self.persist()
    }

    fn persist(&self) -> Result<(), ClientError> {
        let Some(path) = self.store.as_deref() else {
            return Ok(());
        };
        match &self.current {
            Some(session) => fs::write(path, serde_json::to_vec_pretty(session)?)?,
            None if path.exists() => fs::remove_file(path)?,
            None => {}
        }
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::from_body(status.as_u16(), &body))
}

fn load_stored(path: &Path) -> Result<Option<StoredSession>, ClientError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read(path)?;
    match serde_json::from_slice::<StoredSession>(&raw) {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path() -> PathBuf {
        std::env::temp_dir().join(format!("league-session-{}.json", uuid::Uuid::new_v4()))
    }

    fn signed_in(store: &Path) -> Session {
        let mut session = Session::new("http://127.0.0.1:3001/")
            .with_store(store)
            .unwrap();
        session.current = Some(StoredSession {
            token: "token-123".to_string(),
            user: SessionUser {
                id: 1,
                username: "desk".to_string(),
                email: "desk@league.test".to_string(),
                role: Role::Admin,
                created_at: Utc::now(),
                last_login: None,
            },
        });
        session.persist().unwrap();
        session
    }

    #[test]
    fn saved_session_is_resumed() {
        let path = store_path();
        let original = signed_in(&path);

        let resumed = Session::new("http://127.0.0.1:3001").with_store(&path).unwrap();
        assert_eq!(resumed.token(), Some("token-123"));
        assert_eq!(resumed.current_user(), original.current_user());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn rejected_token_clears_session_and_file() {
        let path = store_path();
        let mut session = signed_in(&path);

        session.absorb_rejection(StatusCode::NOT_FOUND).unwrap();
        assert!(session.current_user().is_some());

        session.absorb_rejection(StatusCode::FORBIDDEN).unwrap();
        assert!(session.current_user().is_none());
        assert!(!path.exists());
    }

    #[actix_web::test]
    async fn failed_login_keeps_the_stored_session() {
        use actix_web::{web, App, HttpResponse, HttpServer};

        let server = HttpServer::new(|| {
            App::new().default_service(web::route().to(|| async {
                HttpResponse::Unauthorized().json(json!({ "error": "Invalid credentials" }))
            }))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let running = server.run();
        let handle = running.handle();
        actix_web::rt::spawn(running);

        let path = store_path();
        let mut session = signed_in(&path);
        session.base_url = format!("http://{addr}");

        let err = session.login("desk", "wrong-password").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 401, ref error, .. } if error == "Invalid credentials"));
        assert_eq!(session.token(), Some("token-123"));
        assert!(path.exists());

        let err = session.get::<SessionUser>("/api/auth/profile").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 401, .. }));
        assert!(session.current_user().is_none());
        assert!(!path.exists());

        handle.stop(false).await;
    }

    #[test]
    fn unreadable_store_starts_logged_out() {
        let path = store_path();
        fs::write(&path, b"{not json").unwrap();

        let session = Session::new("http://localhost").with_store(&path).unwrap();
        assert!(session.current_user().is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn requests_need_a_session() {
        let session = Session::new("http://localhost");
        assert!(matches!(
            session.authorized(Method::GET, "/api/teams"),
            Err(ClientError::NotLoggedIn)
        ));
        assert_eq!(session.url("/api/teams"), "http://localhost/api/teams");
    }
}
