//! Mock session, factory, and tee sheet for tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::booking::Transport;
use crate::session::{ClaimOutcome, Session, SessionError, SessionFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Open,
    Taken,
    Faulted,
}

/// Scripted tee sheet shared by every session a factory hands out.
///
/// Claims are atomic: the first session to claim an open slot takes it, and
/// every later claimer sees it unavailable, the same contention the real
/// sheet produces at open time. Slots never scripted at all are treated as
/// unavailable.
#[derive(Debug, Default)]
pub struct MockTeeSheet {
    slots: Mutex<HashMap<(String, u8), SlotState>>,
}

impl MockTeeSheet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script a slot as open for the taking.
    pub fn set_open(&self, time: &str, hole: u8) {
        self.set(time, hole, SlotState::Open);
    }

    /// Script a slot as already taken.
    pub fn set_taken(&self, time: &str, hole: u8) {
        self.set(time, hole, SlotState::Taken);
    }

    /// Script a slot whose claim faults instead of resolving.
    pub fn set_faulted(&self, time: &str, hole: u8) {
        self.set(time, hole, SlotState::Faulted);
    }

    fn set(&self, time: &str, hole: u8, state: SlotState) {
        self.slots
            .lock()
            .expect("mock sheet lock poisoned")
            .insert((time.to_string(), hole), state);
    }

    fn claim(&self, time: &str, hole: u8) -> Result<ClaimOutcome, SessionError> {
        let mut slots = self.slots.lock().expect("mock sheet lock poisoned");
        match slots.get_mut(&(time.to_string(), hole)) {
            Some(state) => match *state {
                SlotState::Open => {
                    *state = SlotState::Taken;
                    Ok(ClaimOutcome::Claimed)
                }
                SlotState::Taken => Ok(ClaimOutcome::Unavailable),
                SlotState::Faulted => {
                    Err(SessionError::PortalError("injected claim fault".to_string()))
                }
            },
            None => Ok(ClaimOutcome::Unavailable),
        }
    }
}

/// Knobs shared by a factory and the sessions it creates.
#[derive(Debug, Clone)]
struct MockBehavior {
    fail_create: bool,
    fail_auth: bool,
    fail_navigation: bool,
    fail_date: bool,
    claim_latency: Duration,
    guests_added: u32,
    recording: Option<PathBuf>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            fail_create: false,
            fail_auth: false,
            fail_navigation: false,
            fail_date: false,
            claim_latency: Duration::ZERO,
            guests_added: 3,
            recording: None,
        }
    }
}

/// Factory producing [`MockSession`]s over one shared tee sheet.
///
/// Tracks how many sessions were created and released, for asserting that
/// rejected runs never touch a session and that every worker releases on
/// every exit path.
#[derive(Debug)]
pub struct MockSessionFactory {
    sheet: Arc<MockTeeSheet>,
    behavior: MockBehavior,
    created: AtomicU32,
    released: Arc<AtomicU32>,
}

impl MockSessionFactory {
    pub fn new(sheet: Arc<MockTeeSheet>) -> Self {
        Self {
            sheet,
            behavior: MockBehavior::default(),
            created: AtomicU32::new(0),
            released: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Fail session creation itself (the browser-won't-launch case).
    pub fn with_failing_create(mut self) -> Self {
        self.behavior.fail_create = true;
        self
    }

    /// Sessions reject the login.
    pub fn with_failing_auth(mut self) -> Self {
        self.behavior.fail_auth = true;
        self
    }

    /// Sessions fail to reach the tee sheet.
    pub fn with_failing_navigation(mut self) -> Self {
        self.behavior.fail_navigation = true;
        self
    }

    /// Sessions fail to find the booking date.
    pub fn with_failing_date(mut self) -> Self {
        self.behavior.fail_date = true;
        self
    }

    /// Every claim attempt takes this long before resolving.
    pub fn with_claim_latency(mut self, latency: Duration) -> Self {
        self.behavior.claim_latency = latency;
        self
    }

    /// Companions attached per successful claim (default 3).
    pub fn with_guests(mut self, guests: u32) -> Self {
        self.behavior.guests_added = guests;
        self
    }

    /// Sessions report this path as their recording artifact.
    pub fn with_recording(mut self, path: PathBuf) -> Self {
        self.behavior.recording = Some(path);
        self
    }

    /// Sessions created so far.
    pub fn created_count(&self) -> u32 {
        self.created.load(Ordering::SeqCst)
    }

    /// Sessions released so far.
    pub fn released_count(&self) -> u32 {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn create(&self, worker: u32) -> Result<Box<dyn Session>, SessionError> {
        if self.behavior.fail_create {
            return Err(SessionError::ConnectionFailed(
                "mock session launch failure".to_string(),
            ));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            worker,
            sheet: Arc::clone(&self.sheet),
            behavior: self.behavior.clone(),
            released: Arc::clone(&self.released),
        }))
    }
}

/// Scripted [`Session`] implementation.
#[derive(Debug)]
pub struct MockSession {
    worker: u32,
    sheet: Arc<MockTeeSheet>,
    behavior: MockBehavior,
    released: Arc<AtomicU32>,
}

impl MockSession {
    /// The worker this session was created for.
    pub fn worker(&self) -> u32 {
        self.worker
    }
}

#[async_trait]
impl Session for MockSession {
    fn name(&self) -> &str {
        "mock"
    }

    async fn authenticate(&mut self) -> Result<(), SessionError> {
        if self.behavior.fail_auth {
            return Err(SessionError::AuthenticationFailed(
                "mock credentials rejected".to_string(),
            ));
        }
        Ok(())
    }

    async fn open_tee_sheet(&mut self) -> Result<(), SessionError> {
        if self.behavior.fail_navigation {
            return Err(SessionError::NavigationFailed(
                "mock tee sheet unreachable".to_string(),
            ));
        }
        Ok(())
    }

    async fn select_date(&mut self, date: NaiveDate) -> Result<(), SessionError> {
        if self.behavior.fail_date {
            return Err(SessionError::DateNotFound(date));
        }
        Ok(())
    }

    async fn attempt_claim(&mut self, time: &str, hole: u8) -> Result<ClaimOutcome, SessionError> {
        if !self.behavior.claim_latency.is_zero() {
            tokio::time::sleep(self.behavior.claim_latency).await;
        }
        self.sheet.claim(time, hole)
    }

    async fn attach_companions(
        &mut self,
        _holes_to_play: u8,
        _transport: Transport,
    ) -> Result<u32, SessionError> {
        Ok(self.behavior.guests_added)
    }

    async fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn recording_path(&self) -> Option<PathBuf> {
        self.behavior.recording.clone()
    }
}
