//! ClubHouse Online member portal session.
//!
//! HTTP driver for the portal's member endpoints: form login with a cookie
//! store, tee sheet selection, claim and companion posts. All endpoint and
//! protocol detail stays in this file; the rest of the crate only sees the
//! [`Session`] capability set.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, SecondsFormat, Utc};
use reqwest::Client;
use tracing::{debug, warn};

use crate::booking::Transport;
use crate::config::SessionConfig;

use super::{ClaimOutcome, Session, SessionError, SessionFactory};

/// Creates one portal session per worker from shared configuration.
pub struct ClubhouseSessionFactory {
    config: SessionConfig,
}

impl ClubhouseSessionFactory {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for ClubhouseSessionFactory {
    async fn create(&self, worker: u32) -> Result<Box<dyn Session>, SessionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| SessionError::ConnectionFailed(e.to_string()))?;

        let transcript = if self.config.record {
            Some(Transcript::new(&self.config.record_dir, worker))
        } else {
            None
        };

        Ok(Box::new(ClubhouseSession {
            worker,
            client,
            config: self.config.clone(),
            selected_date: None,
            transcript,
        }))
    }
}

/// One worker's private portal session.
pub struct ClubhouseSession {
    worker: u32,
    client: Client,
    config: SessionConfig,
    selected_date: Option<NaiveDate>,
    transcript: Option<Transcript>,
}

impl ClubhouseSession {
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn map_err(e: reqwest::Error) -> SessionError {
        if e.is_timeout() {
            SessionError::Timeout
        } else if e.is_connect() {
            SessionError::ConnectionFailed(e.to_string())
        } else {
            SessionError::PortalError(e.to_string())
        }
    }

    fn record(&mut self, action: &str, detail: serde_json::Value) {
        if let Some(transcript) = &mut self.transcript {
            transcript.record(action, detail);
        }
    }
}

#[async_trait]
impl Session for ClubhouseSession {
    fn name(&self) -> &str {
        "clubhouse"
    }

    async fn authenticate(&mut self) -> Result<(), SessionError> {
        let url = format!("{}/login", self.base_url());
        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(Self::map_err)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 || status.as_u16() == 403 || body.contains("Invalid login") {
            self.record("login", serde_json::json!({"ok": false}));
            return Err(SessionError::AuthenticationFailed(
                "invalid credentials".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(SessionError::AuthenticationFailed(format!(
                "HTTP {}",
                status
            )));
        }

        debug!(worker = self.worker, "portal login successful");
        self.record("login", serde_json::json!({"ok": true}));
        Ok(())
    }

    async fn open_tee_sheet(&mut self) -> Result<(), SessionError> {
        let url = format!("{}/teetimes", self.base_url());
        let response = self.client.get(&url).send().await.map_err(|e| {
            SessionError::NavigationFailed(Self::map_err(e).to_string())
        })?;

        if !response.status().is_success() {
            return Err(SessionError::NavigationFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        self.record("open_tee_sheet", serde_json::json!({}));
        Ok(())
    }

    async fn select_date(&mut self, date: NaiveDate) -> Result<(), SessionError> {
        let url = format!("{}/teetimes/sheet", self.base_url());
        let response = self
            .client
            .get(&url)
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await
            .map_err(Self::map_err)?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(SessionError::DateNotFound(date));
        }
        if !status.is_success() {
            return Err(SessionError::PortalError(format!("HTTP {}", status)));
        }

        self.selected_date = Some(date);
        self.record("select_date", serde_json::json!({"date": date.to_string()}));
        Ok(())
    }

    async fn attempt_claim(&mut self, time: &str, hole: u8) -> Result<ClaimOutcome, SessionError> {
        let url = format!("{}/teetimes/claim", self.base_url());
        let date = self
            .selected_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let hole_str = hole.to_string();
        let params = [
            ("date", date.as_str()),
            ("time", time),
            ("hole", hole_str.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(Self::map_err)?;

        let status = response.status();
        // The portal answers a lost race with a conflict, not an error page.
        if matches!(status.as_u16(), 409 | 410 | 423) {
            self.record(
                "claim",
                serde_json::json!({"time": time, "hole": hole, "outcome": "unavailable"}),
            );
            return Ok(ClaimOutcome::Unavailable);
        }
        if !status.is_success() {
            return Err(SessionError::PortalError(format!("HTTP {}", status)));
        }

        let body = response.text().await.unwrap_or_default();
        if body.contains("no longer available") {
            self.record(
                "claim",
                serde_json::json!({"time": time, "hole": hole, "outcome": "unavailable"}),
            );
            return Ok(ClaimOutcome::Unavailable);
        }

        self.record(
            "claim",
            serde_json::json!({"time": time, "hole": hole, "outcome": "claimed"}),
        );
        Ok(ClaimOutcome::Claimed)
    }

    async fn attach_companions(
        &mut self,
        holes_to_play: u8,
        transport: Transport,
    ) -> Result<u32, SessionError> {
        let url = format!("{}/teetimes/players", self.base_url());
        let holes_str = holes_to_play.to_string();

        let mut attached = 0u32;
        for slot in 0..self.config.guest_count {
            let params = [
                ("name", self.config.guest_name.as_str()),
                ("holes", holes_str.as_str()),
                ("transport", transport.as_str()),
            ];

            let result = self.client.post(&url).form(&params).send().await;
            match result {
                Ok(response) if response.status().is_success() => attached += 1,
                Ok(response) => {
                    warn!(
                        worker = self.worker,
                        slot,
                        status = %response.status(),
                        "companion slot rejected"
                    );
                    break;
                }
                Err(e) => {
                    warn!(worker = self.worker, slot, error = %e, "companion post failed");
                    break;
                }
            }
        }

        self.record("attach_companions", serde_json::json!({"attached": attached}));
        Ok(attached)
    }

    async fn release(&mut self) {
        let url = format!("{}/logout", self.base_url());
        if let Err(e) = self.client.post(&url).send().await {
            debug!(worker = self.worker, error = %e, "logout failed");
        }

        self.record("release", serde_json::json!({}));
        if let Some(transcript) = &mut self.transcript {
            if let Err(e) = transcript.flush() {
                warn!(worker = self.worker, error = %e, "failed to write transcript");
            }
        }
    }

    fn recording_path(&self) -> Option<PathBuf> {
        self.transcript.as_ref().and_then(Transcript::path_if_written)
    }
}

/// JSON-lines action transcript, the session's recording artifact.
///
/// Lines are buffered in memory and written once at release so a session
/// that dies mid-run costs nothing at the critical moment.
struct Transcript {
    path: PathBuf,
    lines: Vec<String>,
    written: bool,
}

impl Transcript {
    fn new(dir: &std::path::Path, worker: u32) -> Self {
        Self {
            path: dir.join(format!("worker-{}.jsonl", worker)),
            lines: Vec::new(),
            written: false,
        }
    }

    fn record(&mut self, action: &str, mut detail: serde_json::Value) {
        if let Some(map) = detail.as_object_mut() {
            map.insert(
                "at".to_string(),
                serde_json::Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
            map.insert(
                "action".to_string(),
                serde_json::Value::String(action.to_string()),
            );
        }
        self.lines.push(detail.to_string());
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut content = self.lines.join("\n");
        content.push('\n');
        std::fs::write(&self.path, content)?;
        self.written = true;
        Ok(())
    }

    fn path_if_written(&self) -> Option<PathBuf> {
        self.written.then(|| self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            url: "https://club.example.com/Member-Central/".to_string(),
            username: "golfer".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_factory_creates_session_without_touching_network() {
        let factory = ClubhouseSessionFactory::new(config());
        let session = factory.create(1).await.unwrap();
        assert_eq!(session.name(), "clubhouse");
        assert!(session.recording_path().is_none());
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let session = ClubhouseSession {
            worker: 1,
            client: Client::new(),
            config: config(),
            selected_date: None,
            transcript: None,
        };
        assert_eq!(session.base_url(), "https://club.example.com/Member-Central");
    }

    #[test]
    fn test_transcript_lines_carry_action_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = Transcript::new(dir.path(), 7);
        transcript.record("claim", serde_json::json!({"time": "8:07"}));

        let line: serde_json::Value = serde_json::from_str(&transcript.lines[0]).unwrap();
        assert_eq!(line["action"], "claim");
        assert_eq!(line["time"], "8:07");
        assert!(line["at"].is_string());
    }

    #[test]
    fn test_transcript_path_only_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = Transcript::new(dir.path(), 2);
        transcript.record("login", serde_json::json!({"ok": true}));
        assert!(transcript.path_if_written().is_none());

        transcript.flush().unwrap();
        let path = transcript.path_if_written().unwrap();
        assert!(path.ends_with("worker-2.jsonl"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
        assert!(content.contains("\"action\":\"login\""));
    }
}
