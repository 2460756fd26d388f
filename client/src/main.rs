use std::{
    io::{self, Stdout},
    path::PathBuf,
    time::Duration,
};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use platform_obs::{ObsConfig, init_tracing};
use ratatui::prelude::*;
use staffdesk_client::{App, DEFAULT_URL, Effect, Outcome, QueryKey, RpcClient, ui};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "staffdesk", version, about = "Staffdesk employee records client")]
struct Cli {
    /// RPC endpoint of the Staffdesk server.
    #[arg(long, env = "STAFFDESK_URL", default_value = DEFAULT_URL)]
    url: String,
    /// Write logs to this file; nothing is logged otherwise.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = cli.log_file {
        init_tracing(ObsConfig::for_service("staffdesk-client").with_log_file(path))?;
    }
    let client = RpcClient::new(cli.url)?;
    tracing::info!(url = client.base_url(), "staffdesk client starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, client).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    client: RpcClient,
) -> Result<()> {
    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel(32);
    spawn_all(&client, &tx, app.start());

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        while let Ok(outcome) = rx.try_recv() {
            let effects = app.apply(outcome);
            spawn_all(&client, &tx, effects);
        }

        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    let effects = app.handle_key(key);
                    spawn_all(&client, &tx, effects);
                }
            }
        }
    }
}

fn spawn_all(client: &RpcClient, tx: &mpsc::Sender<Outcome>, effects: Vec<Effect>) {
    for effect in effects {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = run_effect(&client, effect).await;
            if tx.send(outcome).await.is_err() {
                tracing::debug!("ui loop gone; dropping outcome");
            }
        });
    }
}

async fn run_effect(client: &RpcClient, effect: Effect) -> Outcome {
    match effect {
        Effect::Fetch(ticket) => {
            let result = match &ticket.key {
                QueryKey::GetAll => client.get_all().await,
                QueryKey::Search(query) => client.search(query).await,
            };
            Outcome::Fetched { ticket, result }
        }
        Effect::Create(input) => Outcome::Saved(client.create(&input).await),
        Effect::Update(changes) => Outcome::Saved(client.update(&changes).await),
        Effect::Delete(id) => Outcome::Deleted(client.delete(id).await),
    }
}
