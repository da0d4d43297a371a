mod config;
mod router;
mod screens;
mod shell;

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use plume_client::session::login_redirect;
use plume_client::{
    ApiClient, ClientError, RegistrationForm, SessionEvents, SessionHandle, SessionStore, accounts, oauth_apps, posts,
};
use plume_composer::media;
use plume_composer::{Composer, Network, QuickSelect};
use plume_store::Store;
use plume_types::events::SessionEvent;
use plume_types::models::{OAuthAppCredentials, PostStatus};

use config::AppConfig;
use router::{GuardOutcome, Route, guard, post_login_target};

const UPLOAD_STEP: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "plume", version, about = "Schedule posts across social networks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
        /// Page to continue to afterwards
        #[arg(long)]
        redirect: Option<String>,
    },
    /// Create an account and a workspace
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    Logout,
    /// Check the saved session against the server
    Whoami,
    Dashboard,
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Edit the saved draft and submit it
    Compose(ComposeArgs),
    #[command(subcommand)]
    Draft(DraftCommand),
    #[command(subcommand)]
    Accounts(AccountsCommand),
    #[command(subcommand)]
    Oauth(OauthCommand),
    /// Resolve a page path through the route guard and show its frame
    Open { path: String },
}

#[derive(Subcommand)]
enum PostsCommand {
    List {
        /// draft, scheduled, publishing, published or failed
        #[arg(long)]
        status: Option<String>,
    },
    Show { id: String },
    /// Change a post; only the given fields are sent
    Update {
        id: String,
        #[arg(long)]
        content: Option<String>,
        /// Replaces the target networks, repeatable
        #[arg(long = "network", short = 'n')]
        networks: Vec<Network>,
        /// New local publish time, e.g. 2026-11-02T09:30
        #[arg(long)]
        at: Option<String>,
    },
    Delete { id: String },
}

#[derive(Args)]
struct ComposeArgs {
    /// Post text; keeps the saved draft's text when omitted
    content: Option<String>,
    /// Target network, repeatable
    #[arg(long = "network", short = 'n')]
    networks: Vec<Network>,
    /// Image or video file, repeatable
    #[arg(long = "media", short = 'm')]
    media: Vec<PathBuf>,
    /// Local date and time, e.g. 2026-11-02T09:30
    #[arg(long, conflicts_with = "in_")]
    at: Option<String>,
    /// 30m, 1h or tomorrow
    #[arg(long = "in", id = "in_")]
    in_: Option<String>,
    /// Start from an empty draft
    #[arg(long)]
    fresh: bool,
    /// Save the draft instead of submitting it
    #[arg(long)]
    save_draft: bool,
}

#[derive(Subcommand)]
enum DraftCommand {
    Show,
    Discard,
}

#[derive(Subcommand)]
enum AccountsCommand {
    List,
    Disconnect { id: String },
}

#[derive(Subcommand)]
enum OauthCommand {
    Show,
    Set {
        network: Network,
        #[arg(long)]
        client_id: Option<String>,
        #[arg(long)]
        client_secret: Option<String>,
        #[arg(long)]
        redirect_uri: Option<String>,
        #[arg(long)]
        disable: bool,
    },
    Urls,
}

struct App {
    sessions: SessionStore,
}

impl App {
    fn client(&self) -> &ApiClient {
        self.sessions.client()
    }

    /// Run the route guard for a page. False means the page must not run.
    fn enter(&self, route: &Route) -> bool {
        let client = self.client();
        client.set_current_path(&route.path());
        match guard(route, client.session().status()) {
            GuardOutcome::Render => {
                if let (Some(session), true) = (client.session().current(), route.is_protected()) {
                    print!("{}", shell::frame(&session, route));
                }
                true
            }
            GuardOutcome::Redirect(to) => {
                println!("Redirecting to {}", to);
                false
            }
            GuardOutcome::Loading => {
                println!("Restoring session...");
                false
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plume=info,plume_client=info,plume_composer=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<ClientError>() {
                Some(client_err) => eprintln!("Error: {}", client_err.user_message()),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::from_env()?;
    debug!(api_url = %config.api_url, data_path = %config.data_path.display(), "Loaded config");

    let store = Arc::new(
        Store::open(&config.data_path)
            .with_context(|| format!("opening local data at {}", config.data_path.display()))?,
    );
    let handle = SessionHandle::new(store);
    let events = SessionEvents::new();
    let mut expired = events.subscribe();
    let client = ApiClient::new(config.client_config(), handle, events)?;
    let sessions = SessionStore::new(client);

    if let Some(session) = sessions.restore()? {
        info!(user_id = %session.user.id, tenant = %session.tenant.subdomain, "Session restored");
    }

    let app = App { sessions };
    let result = dispatch(&app, cli.command).await;
    report_expiry(&mut expired);
    result
}

/// Tell the user when a request ended their session.
fn report_expiry(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Expired { redirect } = event {
            eprintln!("Session expired. Log in again to continue ({}).", redirect);
        }
    }
}

async fn dispatch(app: &App, command: Command) -> anyhow::Result<ExitCode> {
    let route = match &command {
        Command::Login { .. } => Some(Route::Login),
        Command::Register { .. } => Some(Route::Register),
        Command::Logout => None,
        Command::Whoami | Command::Dashboard => Some(Route::Dashboard),
        Command::Posts(PostsCommand::Show { id } | PostsCommand::Update { id, .. }) => Some(Route::Post(id.clone())),
        Command::Posts(_) => Some(Route::Posts),
        Command::Compose(_) | Command::Draft(_) => Some(Route::Compose),
        Command::Accounts(_) | Command::Oauth(_) => Some(Route::Accounts),
        Command::Open { path } => Some(Route::parse(path)),
    };
    if let Some(route) = &route {
        if !app.enter(route) {
            return Ok(ExitCode::FAILURE);
        }
    }

    let client = app.client();
    match command {
        Command::Login {
            email,
            password,
            redirect,
        } => {
            let password = password_or_stdin(password)?;
            let session = app.sessions.login(&email, &password).await?;
            let target = post_login_target(&login_redirect(redirect.as_deref().unwrap_or_default()));
            println!("Logged in as {} ({})", session.user.display_name(), session.tenant.name);
            println!("Continue at {}", target);
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let password = password_or_stdin(password)?;
            let form = RegistrationForm {
                name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
            };
            let session = app.sessions.register(&form).await?;
            println!("Welcome, {}! Workspace: {}", session.user.display_name(), session.tenant.name);
        }
        Command::Logout => {
            app.sessions.logout()?;
            println!("Logged out");
        }
        Command::Whoami => {
            let user = app.sessions.revalidate().await?;
            println!("{} <{}>", user.display_name(), user.email);
        }
        Command::Dashboard => {
            let summary = screens::dashboard::load(client).await?;
            print!("{}", summary.render());
        }
        Command::Posts(cmd) => posts_command(client, cmd).await?,
        Command::Compose(args) => compose(client, args).await?,
        Command::Draft(DraftCommand::Show) => {
            let composer = Composer::mount(client.clone());
            print!("{}", screens::compose::render_draft(&composer, Utc::now()));
        }
        Command::Draft(DraftCommand::Discard) => {
            Composer::mount(client.clone()).reset()?;
            println!("Draft discarded");
        }
        Command::Accounts(AccountsCommand::List) => {
            let list = accounts::connected(client).await?;
            print!("{}", screens::accounts::render_accounts(&list));
        }
        Command::Accounts(AccountsCommand::Disconnect { id }) => {
            accounts::disconnect(client, &id).await?;
            println!("Disconnected {}", id);
        }
        Command::Oauth(cmd) => oauth_command(client, cmd).await?,
        Command::Open { path } => {
            if let Route::NotFound(_) = Route::parse(&path) {
                println!("Page not found: {}", path);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn posts_command(client: &ApiClient, cmd: PostsCommand) -> anyhow::Result<()> {
    match cmd {
        PostsCommand::List { status } => {
            let status = status
                .map(|s| serde_json::from_value::<PostStatus>(serde_json::Value::String(s.to_lowercase())))
                .transpose()
                .context("unknown post status")?;
            let list = posts::list(client, status).await?;
            print!("{}", screens::posts::render_list(&list));
        }
        PostsCommand::Show { id } => {
            let post = posts::get(client, &id).await?;
            print!("{}", screens::posts::render_list(std::slice::from_ref(&post)));
            println!("{}", post.content);
        }
        PostsCommand::Update {
            id,
            content,
            networks,
            at,
        } => {
            let req = screens::posts::update_request(content, &networks, at.as_deref(), &Local, Utc::now())?;
            let post = posts::update(client, &id, &req).await?;
            print!("{}", screens::posts::render_list(std::slice::from_ref(&post)));
        }
        PostsCommand::Delete { id } => {
            posts::delete(client, &id).await?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

async fn compose(client: &ApiClient, args: ComposeArgs) -> anyhow::Result<()> {
    let now = Utc::now();
    let mut composer = Composer::mount(client.clone());
    if args.fresh {
        composer.reset()?;
    }

    if let Some(content) = args.content {
        composer.set_content(content);
    }
    if !args.networks.is_empty() {
        composer.set_networks(args.networks);
    }
    for path in &args.media {
        let mut item = media::accept(path).await?;
        let (progress, _rx) = watch::channel(0u8);
        // A failed upload stays listed with its error and never becomes a reference.
        let _ = media::simulate_upload(&mut item, UPLOAD_STEP, &progress).await;
        composer.attach_media(item);
    }
    if let Some(raw) = &args.at {
        composer.schedule_input(raw, &Local, now)?;
    } else if let Some(raw) = &args.in_ {
        let choice = match raw.as_str() {
            "30m" => QuickSelect::In30Minutes,
            "1h" => QuickSelect::In1Hour,
            "tomorrow" => QuickSelect::Tomorrow9Am,
            other => anyhow::bail!("--in takes 30m, 1h or tomorrow, got {}", other),
        };
        composer.quick_schedule(choice, &Local, now);
    }

    print!("{}", screens::compose::render_draft(&composer, now));

    if args.save_draft {
        if composer.save_draft()? {
            println!("Draft saved");
        } else {
            println!("Draft too short to save");
        }
        return Ok(());
    }

    match composer.submit(now).await {
        Ok(post) => {
            match post.scheduled_at {
                Some(at) => println!("Post {} scheduled for {}", post.id, at.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
                None => println!("Post {} is being published", post.id),
            }
            Ok(())
        }
        Err(e) => {
            if !e.is_session_expired() {
                composer.save_draft()?;
            }
            Err(e.into())
        }
    }
}

async fn oauth_command(client: &ApiClient, cmd: OauthCommand) -> anyhow::Result<()> {
    match cmd {
        OauthCommand::Show => {
            let config = oauth_apps::config(client).await?;
            print!("{}", screens::accounts::render_oauth(&config));
        }
        OauthCommand::Set {
            network,
            client_id,
            client_secret,
            redirect_uri,
            disable,
        } => {
            let mut config = oauth_apps::config(client).await?;
            let entry = config
                .apps
                .entry(network.id().to_string())
                .or_insert_with(OAuthAppCredentials::default);
            if let Some(id) = client_id {
                entry.client_id = id;
            }
            if client_secret.is_some() {
                entry.client_secret = client_secret;
            }
            if redirect_uri.is_some() {
                entry.redirect_uri = redirect_uri;
            }
            entry.enabled = !disable;
            let saved = oauth_apps::update_config(client, &config).await?;
            print!("{}", screens::accounts::render_oauth(&saved));
        }
        OauthCommand::Urls => {
            let urls = oauth_apps::authorization_urls(client).await?;
            print!("{}", screens::accounts::render_authorization_urls(&urls));
        }
    }
    Ok(())
}

fn password_or_stdin(password: Option<String>) -> anyhow::Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
