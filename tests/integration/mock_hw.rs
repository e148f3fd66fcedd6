//! Mock adapters for integration tests.
//!
//! Records every motor command and every emitted event so tests can
//! assert on the full history without touching GPIO registers.

use std::collections::VecDeque;

use pureflo::app::events::AppEvent;
use pureflo::app::ports::{EventSink, MotorPort};
use pureflo::net::{NetRequest, NetResponse, RequestSource};

// ── Motor call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCall {
    SetMaxSpeed(u16),
    SetSpeed(u16),
    Stop,
    Wake,
    Sleep,
}

#[derive(Default)]
pub struct MockMotor {
    pub calls: Vec<MotorCall>,
}

#[allow(dead_code)]
impl MockMotor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_call(&self) -> Option<MotorCall> {
        self.calls.last().copied()
    }

    /// Effective on/off state implied by the call history.
    pub fn is_driving(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                MotorCall::SetSpeed(sps) => Some(*sps > 0),
                MotorCall::Stop | MotorCall::Sleep => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl MotorPort for MockMotor {
    fn set_max_speed(&mut self, sps: u16) {
        self.calls.push(MotorCall::SetMaxSpeed(sps));
    }

    fn set_speed(&mut self, sps: u16) {
        self.calls.push(MotorCall::SetSpeed(sps));
    }

    fn run_once(&mut self) -> bool {
        false
    }

    fn stop(&mut self) {
        self.calls.push(MotorCall::Stop);
    }

    fn wake(&mut self) {
        self.calls.push(MotorCall::Wake);
    }

    fn sleep(&mut self) {
        self.calls.push(MotorCall::Sleep);
    }
}

// ── Recording event sink ──────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commits(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::SampleCommitted(_)))
            .count()
    }

    pub fn pump_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::PumpStateChanged { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Scripted request source ───────────────────────────────────

#[derive(Default)]
pub struct QueueSource {
    pub requests: VecDeque<NetRequest>,
    pub responses: Vec<NetResponse>,
}

#[allow(dead_code)]
impl QueueSource {
    pub fn with(requests: &[NetRequest]) -> Self {
        Self {
            requests: requests.iter().copied().collect(),
            responses: Vec::new(),
        }
    }
}

impl RequestSource for QueueSource {
    fn next_request(&mut self) -> Option<NetRequest> {
        self.requests.pop_front()
    }

    fn respond(&mut self, response: NetResponse) {
        self.responses.push(response);
    }
}
