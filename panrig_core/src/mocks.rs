//! Test and helper mocks for panrig_core

use std::collections::VecDeque;

use panrig_traits::{DigitalInput, Level, NetRequest, NetResponse, Network};

/// In-memory request queue. Answers are kept in arrival order.
#[derive(Debug, Default)]
pub struct LoopbackNetwork {
    pending: VecDeque<NetRequest>,
    answered: Vec<(NetRequest, NetResponse)>,
    rssi: Option<i32>,
}

impl LoopbackNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rssi(mut self, rssi: i32) -> Self {
        self.rssi = Some(rssi);
        self
    }

    pub fn push(&mut self, req: NetRequest) {
        self.pending.push_back(req);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn answered(&self) -> &[(NetRequest, NetResponse)] {
        &self.answered
    }

    /// Most recent response, if any.
    pub fn last_response(&self) -> Option<&NetResponse> {
        self.answered.last().map(|(_, resp)| resp)
    }
}

impl Network for LoopbackNetwork {
    fn service_one(
        &mut self,
        handler: &mut dyn FnMut(&NetRequest) -> NetResponse,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let Some(req) = self.pending.pop_front() else {
            return Ok(false);
        };
        let resp = handler(&req);
        self.answered.push((req, resp));
        Ok(true)
    }

    fn signal_strength(&self) -> Option<i32> {
        self.rssi
    }
}

/// A button that replays a fixed sequence of levels, then reads released.
#[derive(Debug, Default)]
pub struct ScriptedButton {
    levels: VecDeque<Level>,
}

impl ScriptedButton {
    pub fn new(levels: impl IntoIterator<Item = Level>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }
}

impl DigitalInput for ScriptedButton {
    fn read_level(&mut self) -> Result<Level, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.levels.pop_front().unwrap_or(Level::High))
    }
}
