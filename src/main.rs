use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use vibrax::controller::PlaybackQueueController;
use vibrax::logging;
use vibrax::player::connect_with_retry;
use vibrax::{
    search_or_empty, AppConfig, JsonLikedStore, LikeOutcome, LikeReconciler, PlaybackSession,
    SessionSnapshot, SimulatedPlayer, Track, TransportState, YouTubeSearch,
};

#[derive(Parser)]
#[command(name = "vibrax", version, about = "Search, like and queue music videos")]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Whose liked songs to read and write
    #[arg(long, global = true, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the catalog
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show or change liked songs
    Liked {
        #[command(subcommand)]
        action: LikedAction,
    },
    /// Play search results or the liked songs on the headless player
    Play {
        #[arg(required_unless_present = "liked")]
        query: Vec<String>,
        #[arg(long, conflicts_with = "query")]
        liked: bool,
        /// Stop after this many tracks have finished
        #[arg(long)]
        tracks: Option<usize>,
    },
}

#[derive(Subcommand)]
enum LikedAction {
    List,
    /// Like (or unlike) the first search hit for the query
    Toggle {
        #[arg(required = true)]
        query: Vec<String>,
    },
}

struct App {
    config: AppConfig,
    user: String,
    catalog: YouTubeSearch,
    likes: LikeReconciler,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== vibrax starting ===");

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let store = JsonLikedStore::open(config.liked_store_path.clone())
        .await
        .with_context(|| format!("opening {}", config.liked_store_path.display()))?;
    tracing::info!(path = %store.path().display(), "Using liked store");
    let app = App {
        catalog: YouTubeSearch::new(config.youtube_api_key.clone(), config.max_results),
        likes: LikeReconciler::new(Arc::new(store)),
        user: cli.user,
        config,
    };

    let res = match cli.command {
        Command::Search { query } => search(&app, &query.join(" ")).await,
        Command::Liked {
            action: LikedAction::List,
        } => list_liked(&app).await,
        Command::Liked {
            action: LikedAction::Toggle { query },
        } => toggle_liked(&app, &query.join(" ")).await,
        Command::Play {
            query,
            liked,
            tracks,
        } => play(&app, &query.join(" "), liked, tracks).await,
    };

    if let Err(ref err) = res {
        tracing::error!(error = ?err, "Command failed");
    }

    tracing::info!("vibrax shutting down");
    res
}

async fn search(app: &App, query: &str) -> Result<()> {
    // Liked flags and results are independent; fetch both at once
    let (refreshed, results) = futures::join!(
        app.likes.refresh(&app.user),
        search_or_empty(&app.catalog, query)
    );
    if let Err(e) = refreshed {
        eprintln!("{}", PlaybackQueueController::format_error(&e));
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, (track, liked)) in app
        .likes
        .mark_liked(&app.user, results)
        .await
        .into_iter()
        .enumerate()
    {
        print_track(i, &track, liked);
    }
    Ok(())
}

async fn list_liked(app: &App) -> Result<()> {
    app.likes.refresh(&app.user).await?;

    let tracks = app.likes.liked_tracks().await;
    if tracks.is_empty() {
        println!("No liked songs yet.");
    }
    for (i, track) in tracks.iter().enumerate() {
        print_track(i, track, true);
    }
    Ok(())
}

async fn toggle_liked(app: &App, query: &str) -> Result<()> {
    app.likes.refresh(&app.user).await?;

    let Some(track) = search_or_empty(&app.catalog, query).await.into_iter().next() else {
        println!("No results.");
        return Ok(());
    };

    match app.likes.toggle_like(&app.user, &track).await {
        LikeOutcome::Confirmed { liked: true } => println!("Liked: {}", track.title),
        LikeOutcome::Confirmed { liked: false } => println!("Removed from liked: {}", track.title),
        LikeOutcome::Failed { error, .. } => {
            println!("{}", PlaybackQueueController::format_error(&error))
        }
    }
    Ok(())
}

async fn play(app: &App, query: &str, liked: bool, limit: Option<usize>) -> Result<()> {
    let tracks = if liked {
        app.likes.refresh(&app.user).await?;
        app.likes.liked_tracks().await
    } else {
        search_or_empty(&app.catalog, query).await
    };
    if tracks.is_empty() {
        println!("Nothing to play.");
        return Ok(());
    }

    let mut session = PlaybackSession::mount(app.config.poll_interval());
    let track_seconds = app.config.simulated_track_seconds;
    let connection = connect_with_retry(
        || async move { Ok(SimulatedPlayer::connect(track_seconds)) },
        app.config.player_retry_interval(),
        app.config.player_retry_attempts,
    )
    .await?;
    session.attach_player(connection).await;

    let handle = session.handle();
    let mut updates = session.subscribe();
    let selected = handle
        .apply(|controller| {
            controller.set_queue(tracks);
            controller.select_track(0)
        })
        .await;
    if let Some(Err(e)) = selected {
        println!("{}", PlaybackQueueController::format_error(&e));
        session.unmount().await;
        return Ok(());
    }

    println!("Press Ctrl-C to stop.");
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let first = SessionSnapshot::default();
    let mut last = first.clone();
    loop {
        let snapshot = updates.borrow_and_update().clone();
        if snapshot.tracks_started_since(&last) > 0 {
            let started = snapshot.tracks_started_since(&first);
            if limit.is_some_and(|limit| started > limit as u64) {
                break;
            }
            if let Some(track) = &snapshot.track {
                println!("\nNow playing: {} - {}", track.title, track.channel_title);
            }
        }
        render_progress(&snapshot);
        last = snapshot;

        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    println!();
    session.unmount().await;
    Ok(())
}

fn print_track(index: usize, track: &Track, liked: bool) {
    let marker = if liked { "♥" } else { " " };
    println!(
        "{marker} {:>2}. {} - {} [{}]",
        index + 1,
        track.title,
        track.channel_title,
        track.id
    );
}

fn render_progress(snapshot: &SessionSnapshot) {
    let state = &snapshot.state;
    let status = match state.transport {
        TransportState::Idle => "idle",
        TransportState::Loading => "loading",
        TransportState::Playing => "playing",
        TransportState::Paused => "paused",
    };
    print!(
        "\r  [{status:>7}] {} / {} ({:>3.0}%)",
        format_time(state.progress_seconds),
        format_time(state.duration_seconds),
        state.progress_ratio() * 100.0
    );
    let _ = std::io::stdout().flush();
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
