//! The remote spreadsheet boundary.
//!
//! [`RemoteSheets`] is the seam between the engine and the network: connect
//! (build the HTTP client), authorize (load stored credentials, yielding the
//! session signal), handshake (cheap probe that the spreadsheet is
//! reachable), one bulk fetch, and the append primitive the sync queue
//! drains into. The append is NOT idempotent — it inserts a new row every
//! call — which is why a confirmation lost mid-flight can duplicate a row.
//!
//! [`http::HttpRemote`] talks to a Google-Sheets-style values API;
//! [`Offline`] refuses to connect (the `--offline` flag);
//! [`scripted::ScriptedRemote`] replays canned outcomes in tests.

use crate::error::{FrontdeskError, Result};
use crate::model::SheetKey;

pub mod http;
#[cfg(any(test, feature = "test_utils"))]
pub mod scripted;

/// One sheet's raw tabular block: rows of string cells.
pub type SheetBlock = Vec<Vec<String>>;

pub trait RemoteSheets {
    /// Build whatever transport the later calls need.
    fn connect(&mut self) -> Result<()>;

    /// Load stored credentials. `Ok(true)` means signed in.
    fn authorize(&mut self) -> Result<bool>;

    /// Verify the remote store is reachable with the current credentials.
    fn handshake(&mut self) -> Result<()>;

    /// Bulk read of every registered sheet range, in registry order.
    fn fetch_all(&mut self) -> Result<Vec<SheetBlock>>;

    /// Append one row of formatted cells to the end of a sheet's range.
    fn append(&mut self, sheet: SheetKey, values: &[String]) -> Result<()>;
}

impl<T: RemoteSheets + ?Sized> RemoteSheets for Box<T> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn authorize(&mut self) -> Result<bool> {
        (**self).authorize()
    }

    fn handshake(&mut self) -> Result<()> {
        (**self).handshake()
    }

    fn fetch_all(&mut self) -> Result<Vec<SheetBlock>> {
        (**self).fetch_all()
    }

    fn append(&mut self, sheet: SheetKey, values: &[String]) -> Result<()> {
        (**self).append(sheet, values)
    }
}

/// A remote that never connects. Commands still enqueue and persist; the
/// queue drains on a later online run.
pub struct Offline;

impl RemoteSheets for Offline {
    fn connect(&mut self) -> Result<()> {
        Err(FrontdeskError::Remote("offline mode".into()))
    }

    fn authorize(&mut self) -> Result<bool> {
        Err(FrontdeskError::Remote("offline mode".into()))
    }

    fn handshake(&mut self) -> Result<()> {
        Err(FrontdeskError::Remote("offline mode".into()))
    }

    fn fetch_all(&mut self) -> Result<Vec<SheetBlock>> {
        Err(FrontdeskError::Remote("offline mode".into()))
    }

    fn append(&mut self, _sheet: SheetKey, _values: &[String]) -> Result<()> {
        Err(FrontdeskError::Remote("offline mode".into()))
    }
}
