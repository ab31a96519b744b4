use chrono::Local;
use clap::Parser;
use colored::Colorize;
use directories::ProjectDirs;
use frontdesk::auth::{self, Credentials};
use frontdesk::cache::fs::FileCache;
use frontdesk::commands::checkin::CheckinKind;
use frontdesk::commands::search::SearchRequest;
use frontdesk::commands::{self, CmdResult};
use frontdesk::config::FrontdeskConfig;
use frontdesk::error::{FrontdeskError, Result};
use frontdesk::model::{business_date, LoadStatus, Loader};
use frontdesk::remote::http::HttpRemote;
use frontdesk::remote::{Offline, RemoteSheets};
use frontdesk::runtime::Runtime;
use frontdesk::state::Action;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod args;
mod cli;
use args::{Cli, Commands};
use cli::print::{print_members, print_messages, print_status};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

struct AppContext {
    runtime: Runtime<FileCache, Box<dyn RemoteSheets>>,
    data_dir: PathBuf,
    config: FrontdeskConfig,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Only commands that push or pull remote data pay for a connection
    // attempt; glancing at status or searching the cached roster stays local.
    let wants_network = matches!(
        cli.command,
        Some(Commands::Checkin { .. })
            | Some(Commands::Renew { .. })
            | Some(Commands::Note { .. })
            | Some(Commands::Sync { .. })
    );
    let mut ctx = init_context(&cli, wants_network)?;

    match cli.command {
        Some(Commands::Checkin { member, guest }) => handle_checkin(&mut ctx, member, guest),
        Some(Commands::Renew { member }) => handle_renew(&mut ctx, member),
        Some(Commands::Note { member, text }) => handle_note(&mut ctx, member, &text.join(" ")),
        Some(Commands::Search { term }) => {
            let request = match term {
                Some(term) => SearchRequest::Query(term),
                None => SearchRequest::Repeat,
            };
            handle_search(&mut ctx, request)
        }
        Some(Commands::More) => handle_search(&mut ctx, SearchRequest::More),
        Some(Commands::Sync { wait }) => handle_sync(&mut ctx, wait),
        Some(Commands::Signin { token }) => handle_signin(&ctx, token),
        Some(Commands::Signout) => handle_signout(&mut ctx),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        Some(Commands::Status) | None => handle_status(&mut ctx),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("frontdesk=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("frontdesk=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn data_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("FRONTDESK_HOME") {
        return Ok(PathBuf::from(home));
    }
    let dirs = ProjectDirs::from("com", "frontdesk", "frontdesk")
        .ok_or_else(|| FrontdeskError::Config("Could not determine data dir".into()))?;
    Ok(dirs.data_dir().to_path_buf())
}

fn init_context(cli: &Cli, wants_network: bool) -> Result<AppContext> {
    let data_dir = data_dir()?;
    let config = FrontdeskConfig::load(&data_dir)?;

    let cache = FileCache::new(data_dir.join("cache"));
    let remote: Box<dyn RemoteSheets> = if cli.offline || !wants_network {
        Box::new(Offline)
    } else if config.spreadsheet_id.is_empty() {
        tracing::debug!("no spreadsheet configured; staying offline");
        Box::new(Offline)
    } else {
        Box::new(HttpRemote::new(
            config.api_base.clone(),
            config.spreadsheet_id.clone(),
            auth::token_path(&data_dir),
        ))
    };

    Ok(AppContext {
        runtime: Runtime::new(cache, remote),
        data_dir,
        config,
    })
}

/// Dispatch a command's actions, then show its output and anything still
/// waiting to sync.
fn apply(ctx: &mut AppContext, result: CmdResult) -> Result<()> {
    let now = Instant::now();
    for action in result.actions {
        ctx.runtime.dispatch(action, now);
    }
    print_messages(&result.messages);

    let pending = ctx.runtime.snapshot().sync_queue.len();
    if pending > 0 {
        println!(
            "{}",
            format!(
                "Saving {} {}; will sync when online",
                pending,
                if pending == 1 { "change" } else { "changes" }
            )
            .dimmed()
        );
    }
    Ok(())
}

fn handle_checkin(ctx: &mut AppContext, member: Option<usize>, guest: bool) -> Result<()> {
    ctx.runtime.pump(Instant::now());
    let result = match member {
        None if guest => {
            return Err(FrontdeskError::Api(
                "Guest check-in needs a membership row".into(),
            ));
        }
        None => commands::checkin::new_person(Local::now())?,
        Some(index) => {
            let kind = if guest { CheckinKind::Guest } else { CheckinKind::Member };
            commands::checkin::member(ctx.runtime.snapshot(), index, kind, Local::now())?
        }
    };
    apply(ctx, result)
}

fn handle_renew(ctx: &mut AppContext, member: usize) -> Result<()> {
    ctx.runtime.pump(Instant::now());
    let result = commands::renew::run(ctx.runtime.snapshot(), member, Local::now())?;
    apply(ctx, result)
}

fn handle_note(ctx: &mut AppContext, member: usize, text: &str) -> Result<()> {
    ctx.runtime.pump(Instant::now());
    let result = commands::note::run(ctx.runtime.snapshot(), member, text, Local::now())?;
    apply(ctx, result)
}

fn handle_search(ctx: &mut AppContext, request: SearchRequest) -> Result<()> {
    ctx.runtime.pump(Instant::now());
    let result = commands::search::run(
        ctx.runtime.snapshot(),
        request,
        business_date(Local::now()),
    )?;
    print_members(&result.members);
    apply(ctx, result)
}

fn handle_status(ctx: &mut AppContext) -> Result<()> {
    ctx.runtime.pump(Instant::now());
    let result = commands::status::run(ctx.runtime.snapshot(), business_date(Local::now()))?;
    if let Some(report) = &result.status {
        print_status(report);
    }
    Ok(())
}

fn handle_sync(ctx: &mut AppContext, wait: Option<u64>) -> Result<()> {
    ctx.runtime.pump(Instant::now());

    if !ctx.runtime.snapshot().session.is_signed_in() {
        println!(
            "{}",
            "Not signed in; run `frontdesk signin` first".yellow()
        );
        return Ok(());
    }

    let deadline = wait.map(|secs| Instant::now() + Duration::from_secs(secs));
    while let Some(deadline) = deadline {
        let snapshot = ctx.runtime.snapshot();
        if snapshot.sync_queue.is_empty()
            && snapshot.loader_status(Loader::Sheets) == LoadStatus::Ok
        {
            break;
        }
        if Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(250));
        ctx.runtime.pump(Instant::now());
    }

    let snapshot = ctx.runtime.snapshot();
    if snapshot.sync_queue.is_empty() && snapshot.loader_status(Loader::Sheets) == LoadStatus::Ok
    {
        println!("{}", "Synced.".green());
    } else {
        println!(
            "{}",
            format!("{} changes still waiting", snapshot.sync_queue.len()).yellow()
        );
    }
    let result = commands::status::run(ctx.runtime.snapshot(), business_date(Local::now()))?;
    if let Some(report) = &result.status {
        print_status(report);
    }
    Ok(())
}

fn handle_signin(ctx: &AppContext, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => {
            eprintln!("Paste the token from your sign-in flow:");
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(FrontdeskError::Io)?;
            line.trim().to_string()
        }
    };
    if token.is_empty() {
        return Err(FrontdeskError::Api("Token cannot be empty".into()));
    }
    auth::save(
        &auth::token_path(&ctx.data_dir),
        &Credentials { access_token: token },
    )?;
    println!(
        "{}",
        "Signed in; run `frontdesk sync` to push queued changes".green()
    );
    Ok(())
}

fn handle_signout(ctx: &mut AppContext) -> Result<()> {
    auth::clear(&auth::token_path(&ctx.data_dir))?;
    let now = Instant::now();
    ctx.runtime.pump(now);
    ctx.runtime
        .dispatch(Action::SetSession { signed_in: false }, now);
    println!("{}", "Signed out".green());
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            Ok(())
        }
        (Some(key), None) => {
            println!("{}", ctx.config.get(&key)?);
            Ok(())
        }
        (Some(key), Some(value)) => {
            ctx.config.set(&key, &value)?;
            ctx.config.save(&ctx.data_dir)?;
            println!("{}", format!("Set {}", key).green());
            Ok(())
        }
    }
}
