use super::{RemoteSheets, SheetBlock};
use crate::error::{FrontdeskError, Result};
use crate::model::{SheetKey, SHEETS};
use std::collections::VecDeque;

/// Scripted remote for tests: each call pops the next scripted outcome, or
/// succeeds with a benign default when nothing is scripted. Appends are
/// recorded so tests can assert on exactly what was sent, in what order.
#[derive(Default)]
pub struct ScriptedRemote {
    connects: VecDeque<std::result::Result<(), String>>,
    authorizes: VecDeque<std::result::Result<bool, String>>,
    handshakes: VecDeque<std::result::Result<(), String>>,
    fetches: VecDeque<std::result::Result<Vec<SheetBlock>, String>>,
    appends: VecDeque<std::result::Result<(), String>>,
    pub append_log: Vec<(SheetKey, Vec<String>)>,
    pub fetch_calls: usize,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_connect(&mut self, outcome: std::result::Result<(), String>) -> &mut Self {
        self.connects.push_back(outcome);
        self
    }

    pub fn script_authorize(&mut self, outcome: std::result::Result<bool, String>) -> &mut Self {
        self.authorizes.push_back(outcome);
        self
    }

    pub fn script_handshake(&mut self, outcome: std::result::Result<(), String>) -> &mut Self {
        self.handshakes.push_back(outcome);
        self
    }

    pub fn script_fetch(
        &mut self,
        outcome: std::result::Result<Vec<SheetBlock>, String>,
    ) -> &mut Self {
        self.fetches.push_back(outcome);
        self
    }

    pub fn script_append(&mut self, outcome: std::result::Result<(), String>) -> &mut Self {
        self.appends.push_back(outcome);
        self
    }

    fn lift<T>(outcome: Option<std::result::Result<T, String>>, default: T) -> Result<T> {
        match outcome {
            None => Ok(default),
            Some(Ok(v)) => Ok(v),
            Some(Err(e)) => Err(FrontdeskError::Remote(e)),
        }
    }
}

impl RemoteSheets for ScriptedRemote {
    fn connect(&mut self) -> Result<()> {
        Self::lift(self.connects.pop_front(), ())
    }

    fn authorize(&mut self) -> Result<bool> {
        Self::lift(self.authorizes.pop_front(), true)
    }

    fn handshake(&mut self) -> Result<()> {
        Self::lift(self.handshakes.pop_front(), ())
    }

    fn fetch_all(&mut self) -> Result<Vec<SheetBlock>> {
        self.fetch_calls += 1;
        let empty = vec![SheetBlock::new(); SHEETS.len()];
        Self::lift(self.fetches.pop_front(), empty)
    }

    fn append(&mut self, sheet: SheetKey, values: &[String]) -> Result<()> {
        // every attempt is logged, successful or not
        self.append_log.push((sheet, values.to_vec()));
        Self::lift(self.appends.pop_front(), ())
    }
}
