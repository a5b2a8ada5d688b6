// Allow dead code for features under development
#![allow(dead_code)]

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod application;
mod domain;
mod host;
mod infrastructure;

use crate::application::StartMatchInput;
use crate::domain::rules::GameKind;
use crate::domain::seat::Seat;
use crate::host::{spawn_idle_reaper, Dispatcher};
use crate::infrastructure::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardroom=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new();
    let reaper = spawn_idle_reaper(state.clone());

    // Mirror the event stream into the log, the way a chat frontend
    // would render it into the room.
    let mut events = state.presenter.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(
                "[{}] {} {}",
                &event.match_id[..8],
                event.event_type,
                event.data
            );
        }
    });

    // A demo room: three all-bot tables playing themselves out.
    let dispatcher = Dispatcher::new(state.clone());
    let mut match_ids = Vec::new();

    let war = dispatcher
        .open(StartMatchInput {
            game: GameKind::War,
            seats: vec![
                Seat::bot("bot-rusty", "Rusty"),
                Seat::bot("bot-clank", "Clanker"),
            ],
            bet: 100,
            seed: None,
        })
        .await?;
    match_ids.push(war.match_id);

    let uno = dispatcher
        .open(StartMatchInput {
            game: GameKind::Uno,
            seats: vec![
                Seat::bot("bot-rusty", "Rusty"),
                Seat::bot("bot-clank", "Clanker"),
                Seat::bot("bot-tin", "Tin"),
            ],
            bet: 0,
            seed: None,
        })
        .await?;
    match_ids.push(uno.match_id);

    let truco = dispatcher
        .open(StartMatchInput {
            game: GameKind::Truco,
            seats: vec![
                Seat::bot("bot-rusty", "Rusty"),
                Seat::bot("bot-clank", "Clanker"),
            ],
            bet: 0,
            seed: None,
        })
        .await?;
    match_ids.push(truco.match_id);

    tracing::info!("{} demo matches running", match_ids.len());

    // Wait for every table to play out.
    loop {
        let mut busy = false;
        for id in &match_ids {
            if let Some(entry) = state.registry.get(id).await {
                if !entry.runtime.lock().await.is_finished() {
                    busy = true;
                }
            }
        }
        if !busy {
            break;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    tracing::info!("all demo matches finished");
    reaper.abort();
    Ok(())
}
