//! Console presentation layer.
//!
//! Deliberately thin: it only renders whatever display state the controller
//! publishes and maps input lines onto `start`/`cancel`/`reset`. All
//! control flow and concurrency lives in the session controller.

use std::sync::Arc;

use tokio::io::AsyncBufReadExt;

use crate::config::EchoIdConfig;
use crate::identify::IdentificationClient;
use crate::logging;
use crate::session::{
    CpalMicrophone, DisplayState, SessionConfig, SessionController,
};

/// Runs the interactive console client.
///
/// # Errors
/// - If logging initialization or config loading fails
/// - If stdin cannot be read
pub async fn run() -> anyhow::Result<()> {
    logging::init_logging()?;
    let config = EchoIdConfig::load()?;
    tracing::info!(
        endpoint = %config.endpoint,
        capture_secs = config.capture_secs,
        "starting echoid"
    );

    let capture_secs = config.capture_secs;
    let controller = SessionController::new(
        SessionConfig {
            capture_duration: config.capture_duration(),
        },
        Arc::new(CpalMicrophone::new(config.device.clone())),
        Arc::new(IdentificationClient::new(config.endpoint.clone())),
    );

    let mut display = controller.display();
    let renderer = tokio::spawn(async move {
        while display.changed().await.is_ok() {
            let state = display.borrow_and_update().clone();
            render(&state, capture_secs);
        }
    });

    println!("echoid — identify the song playing around you");
    println!("[Enter] identify   [c] cancel   [q] quit");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {
                controller.reset();
                if let Err(e) = controller.start().await {
                    println!("! {e}");
                }
            }
            "c" => controller.cancel().await,
            "q" => break,
            other => println!("unknown command '{other}'"),
        }
    }

    renderer.abort();
    Ok(())
}

fn render(state: &DisplayState, capture_secs: u64) {
    match state {
        DisplayState::Idle => {
            println!("ready — press Enter to identify");
        }
        DisplayState::Recording { elapsed_secs } => {
            println!("listening… {elapsed_secs}s / {capture_secs}s");
        }
        DisplayState::Analyzing => {
            println!("analyzing audio…");
        }
        DisplayState::Result(track) => {
            println!("match found!");
            println!("  {} — {}", track.title, track.artist);
            println!("  album: {}", track.album_name);
            println!("  cover: {}", track.cover_art);
            println!("  play:  {}", track.spotify_url);
            println!("[Enter] identify another song");
        }
        DisplayState::ErrorDisplay { reason } => {
            println!("no match: {reason}");
            println!("[Enter] try again");
        }
    }
}
