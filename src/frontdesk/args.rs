use clap::{Parser, Subcommand};

/// Returns the version string, including git hash and commit date for dev
/// builds. Format: "0.3.2" for releases, "0.3.2@abc1234 2026-08-01 14:30"
/// for dev builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "frontdesk")]
#[command(version = get_version())]
#[command(about = "Offline-first front-desk check-in recorder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Skip the network entirely; writes queue for a later sync
    #[arg(long, global = true)]
    pub offline: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check in a member, or a brand-new person when no row is given
    #[command(alias = "c")]
    Checkin {
        /// Membership row number (the #n shown by search)
        member: Option<usize>,

        /// Record the visit as a guest (expired memberships only)
        #[arg(long)]
        guest: bool,
    },

    /// Record a renewal for an expired membership and check the member in
    Renew {
        /// Membership row number (the #n shown by search)
        member: usize,
    },

    /// Leave a note for the host on a member's record
    Note {
        /// Membership row number (the #n shown by search)
        member: usize,

        /// The note text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Search the roster by name or phone number
    #[command(alias = "s")]
    Search {
        /// Search term; empty repeats the stored search
        term: Option<String>,
    },

    /// Show another page of the current search
    More,

    /// Show loading, saving, and head-count status
    #[command(alias = "st")]
    Status,

    /// Push queued check-ins and refresh the roster
    Sync {
        /// Keep retrying for up to this many seconds
        #[arg(long, value_name = "SECONDS")]
        wait: Option<u64>,
    },

    /// Store the API token your sign-in flow produced
    Signin {
        /// Token value; read from stdin when omitted
        token: Option<String>,
    },

    /// Forget the stored token
    Signout,

    /// Get or set configuration (spreadsheet-id, api-base)
    Config {
        /// Configuration key
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
