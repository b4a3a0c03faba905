// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drive an editing session without a window.
//!
//! Drops two clips, drags one onto the other (ripple pushes it back out),
//! splits at the playhead, plays across the gap and prints the export body.
//!
//! ```text
//! cargo run -p voxedit_timeline --example headless_session [timeline.ron]
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use voxedit_timeline::{EditorSession, Key, KeyInput, TimelineConfig, CONFIG_FILE_NAME};

const VIEWPORT: f64 = 1200.0;

fn media(name: &str, duration: f64) -> String {
    format!(r#"{{"name":"{name}","type":"video","url":"http://localhost:8000/files/{name}.mp4","duration":{duration}}}"#)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("voxedit_timeline=debug".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting headless session v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), PathBuf::from);
    let config = if config_path.exists() {
        TimelineConfig::load(&config_path)?
    } else {
        TimelineConfig::default()
    };

    let mut session = EditorSession::new(config);
    let video = session
        .video_track()
        .map(|t| t.id)
        .ok_or("layout has no video track")?;

    let intro = session
        .drop_media(video, &media("intro", 8.0), 0.0, 0.0, VIEWPORT)
        .ok_or("intro drop rejected")?;
    tracing::info!(zoom = session.mapper().zoom(), "Zoom after first drop");

    let outro_x = session.mapper().seconds_to_pixels(12.0);
    let outro = session
        .drop_media(video, &media("outro", 4.0), outro_x, 0.0, VIEWPORT)
        .ok_or("outro drop rejected")?;

    // Drag the outro five seconds left, onto the intro's tail
    let zoom = session.mapper().zoom();
    let grab = zoom * 14.0;
    session.pointer_down(video, outro, grab);
    session.pointer_move(grab - zoom * 5.0);
    session.pointer_up(grab - zoom * 5.0, Some(video));

    session.seek(3.0);
    session.select(Some(intro));
    session.key(KeyInput::plain(Key::Char('c')));

    // Play from past the end: the gap clock carries the playhead
    session.seek(20.0);
    session.set_playing(true);
    let start = Instant::now();
    for frame in 0..5u64 {
        let time = session.tick(start + Duration::from_millis(frame * 16));
        tracing::debug!(time, gap = session.gap_clock_running(), "Frame");
    }
    session.set_playing(false);

    if let Some(track) = session.video_track() {
        for clip in track.sorted_clips() {
            println!(
                "{:<12} start {:>6.2}s  duration {:>6.2}s  offset {:>5.2}s",
                clip.name, clip.start, clip.duration, clip.source_offset
            );
        }
    }

    let export = session.export_request()?;
    println!("project_data = {}", export.to_json()?);
    Ok(())
}
