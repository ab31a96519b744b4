//! The runtime performs the engine's effects.
//!
//! Generic over the cache and remote backends the same way the rest of the
//! crate is: production runs `Runtime<FileCache, HttpRemote>`, tests run
//! `Runtime<MemoryCache, ScriptedRemote>`. Effects are performed in order
//! and their completions fed straight back in, so on this single thread an
//! entire user action — optimistic apply, persist, queue drain — settles
//! before control returns to the caller.
//!
//! Persist failures are logged and swallowed: durable caching is a
//! fire-and-forget side effect, never a reason to fail the user's action.

use crate::cache::{self, CacheStore};
use crate::engine::{Effect, Engine, Event};
use crate::model::{Loader, PendingCommand, SHEETS};
use crate::remote::RemoteSheets;
use crate::sheet::parse_sheet;
use crate::state::{Action, HydratePayload, SheetKeys, SheetRows, Snapshot};
use std::collections::VecDeque;
use std::time::Instant;

pub struct Runtime<C: CacheStore, R: RemoteSheets> {
    engine: Engine,
    cache: C,
    remote: R,
    signed_in: Option<bool>,
}

impl<C: CacheStore, R: RemoteSheets> Runtime<C, R> {
    pub fn new(cache: C, remote: R) -> Self {
        Self {
            engine: Engine::new(),
            cache,
            remote,
            signed_in: None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.engine.snapshot()
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    /// Earliest pending retry deadline, if any loader failed.
    pub fn next_retry_at(&self) -> Option<Instant> {
        self.engine.next_retry_at()
    }

    /// Apply one user action and settle every effect it triggers.
    pub fn dispatch(&mut self, action: Action, now: Instant) {
        let effects = self.engine.dispatch(action, now);
        self.perform_all(effects, now);
    }

    /// Advance loaders and the queue drain; settles all triggered effects.
    pub fn pump(&mut self, now: Instant) {
        let effects = self.engine.tick(now);
        self.perform_all(effects, now);
    }

    fn perform_all(&mut self, effects: Vec<Effect>, now: Instant) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Persist => {
                    if let Err(err) = cache::persist(&mut self.cache, self.engine.snapshot()) {
                        tracing::warn!(%err, "cache persist failed");
                    }
                }
                Effect::Load { loader, generation } => {
                    let outcome = self.perform_load(loader);
                    queue.extend(self.engine.handle(
                        Event::LoadFinished {
                            loader,
                            generation,
                            outcome,
                        },
                        now,
                    ));
                }
                Effect::WatchSession => {
                    let signed_in = self.signed_in.unwrap_or(false);
                    queue.extend(
                        self.engine
                            .handle(Event::SessionChanged { signed_in }, now),
                    );
                }
                Effect::Append { command } => {
                    let outcome = self.perform_append(&command);
                    queue.extend(self.engine.handle(
                        Event::AppendFinished {
                            seq: command.seq,
                            outcome,
                        },
                        now,
                    ));
                }
            }
        }
    }

    fn perform_load(&mut self, loader: Loader) -> Result<HydratePayload, String> {
        match loader {
            Loader::Local => cache::load(&self.cache)
                .map(HydratePayload::Cache)
                .map_err(|e| e.to_string()),
            Loader::Client => self
                .remote
                .connect()
                .map(|_| HydratePayload::None)
                .map_err(|e| e.to_string()),
            Loader::Auth => self
                .remote
                .authorize()
                .map(|signed_in| {
                    self.signed_in = Some(signed_in);
                    HydratePayload::None
                })
                .map_err(|e| e.to_string()),
            Loader::Handshake => self
                .remote
                .handshake()
                .map(|_| HydratePayload::None)
                .map_err(|e| e.to_string()),
            Loader::Sheets => {
                let blocks = self.remote.fetch_all().map_err(|e| e.to_string())?;
                if blocks.len() != SHEETS.len() {
                    return Err(format!(
                        "expected {} sheet blocks, got {}",
                        SHEETS.len(),
                        blocks.len()
                    ));
                }
                let mut rows = SheetRows::new();
                let mut keys = SheetKeys::new();
                for (sheet, block) in SHEETS.iter().zip(blocks) {
                    let parsed = parse_sheet(&block, sheet.heading_rows);
                    tracing::debug!(sheet = %sheet.key, rows = parsed.rows.len(), "parsed sheet");
                    rows.insert(sheet.key, parsed.rows);
                    keys.insert(sheet.key, parsed.keys);
                }
                Ok(HydratePayload::Sheets { rows, keys })
            }
        }
    }

    fn perform_append(&mut self, command: &PendingCommand) -> Result<(), String> {
        let keys = self
            .engine
            .snapshot()
            .keys
            .get(&command.sheet)
            .filter(|keys| !keys.is_empty())
            .cloned()
            .ok_or_else(|| format!("no learned column order for {}", command.sheet))?;
        let values = crate::sheet::append_values(&keys, &command.fields);
        self.remote
            .append(command.sheet, &values)
            .map_err(|e| e.to_string())
    }
}
