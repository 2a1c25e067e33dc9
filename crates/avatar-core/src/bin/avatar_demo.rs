//! Local demo: opens one streaming session, writes a browser viewer page for it,
//! has the avatar read a fixed message, then stops the session.
//!
//! Run: cargo run -p avatar-core --bin avatar-demo [-- --text "..." --keep-alive 60]
//! Needs HEYGEN_API_KEY (env or .env); AVATAR_ID / VOICE_ID are optional.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use avatar_core::telemetry::{init_tracing, load_dotenv};
use avatar_core::{AvatarConfig, AvatarSessions, Overrides, SessionInfo, SessionRegistry};

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

const DEMO_TEXT: &str = "Hello, this is a demo message from a Rust program. \
I am a streaming AI avatar reading text generated by your application.";

/// Seconds to wait for the viewer to connect before speaking.
const CONNECT_GRACE_SECS: u64 = 5;
const DEFAULT_KEEP_ALIVE_SECS: u64 = 60;

/// Browser-side media library, loaded from its CDN by the viewer page.
const MEDIA_CLIENT_SCRIPT: &str = "https://unpkg.com/livekit-client/dist/livekit-client.umd.js";

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("[avatar-demo] failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> DemoResult<()> {
    let args: Vec<String> = std::env::args().collect();
    let text = flag_value(&args, "--text").unwrap_or_else(|| DEMO_TEXT.to_string());
    let keep_alive = flag_value(&args, "--keep-alive")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_KEEP_ALIVE_SECS);

    let cfg = AvatarConfig::load()?;
    let sessions = AvatarSessions::from_config(&cfg, Arc::new(SessionRegistry::new()))?;

    tracing::info!("creating streaming session");
    let info = sessions.create(&Overrides::default()).await?;
    tracing::info!(session_id = %info.session_id, media_url = %info.media_url, "session live");

    // From here on the session must be stopped whatever happens, Ctrl-C included.
    let result = until_interrupted(
        drive(&sessions, &info, &text, keep_alive),
        tokio::signal::ctrl_c(),
    )
    .await;
    match sessions.stop(&info.session_id).await {
        Ok(_) => tracing::info!("session stopped; demo finished"),
        Err(e) => tracing::warn!(error = %e, "stop failed"),
    }
    result
}

/// Runs `work` unless `interrupt` fires first. A failed interrupt hook leaves `work` running.
async fn until_interrupted<W, I>(work: W, interrupt: I) -> DemoResult<()>
where
    W: Future<Output = DemoResult<()>>,
    I: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        result = work => result,
        Ok(()) = interrupt => {
            tracing::info!("interrupted; stopping session");
            Ok(())
        }
    }
}

async fn drive(sessions: &AvatarSessions, info: &SessionInfo, text: &str, keep_alive: u64) -> DemoResult<()> {
    let viewer = write_viewer(info)?;
    let viewer_url = format!("file://{}", viewer.display());
    if let Err(e) = webbrowser::open(&viewer_url) {
        tracing::warn!(error = %e, "could not launch a browser");
    }
    println!("Viewer page (click 'Connect to Avatar'): {}", viewer_url);

    tracing::info!("waiting {}s before sending text", CONNECT_GRACE_SECS);
    tokio::time::sleep(Duration::from_secs(CONNECT_GRACE_SECS)).await;

    let ack = sessions.talk(&info.session_id, text).await?;
    tracing::info!(ack = %ack, "task accepted");

    tracing::info!("keeping session alive for ~{}s (Ctrl-C stops early)", keep_alive);
    tokio::time::sleep(Duration::from_secs(keep_alive)).await;
    Ok(())
}

/// Persist the viewer page to a temp file that outlives the process.
fn write_viewer(info: &SessionInfo) -> std::io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("avatar-viewer-")
        .suffix(".html")
        .tempfile()?;
    file.write_all(viewer_html(&info.media_url, &info.media_access_token).as_bytes())?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

fn viewer_html(media_url: &str, access_token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Streaming Avatar Demo</title>
  <style>
    body {{ background: #111; color: #eee; font-family: sans-serif; display: flex; flex-direction: column; align-items: center; padding-top: 20px; }}
    video {{ width: 480px; height: 270px; background: #000; }}
    button {{ margin-top: 12px; padding: 8px 16px; font-size: 14px; }}
  </style>
  <script src="{script}"></script>
</head>
<body>
  <h2>Streaming Avatar Demo</h2>
  <video id="avatar-video" autoplay playsinline></video>
  <button id="connect-btn">Connect to Avatar</button>
  <pre id="status"></pre>
  <script>
    const mediaUrl = {url};
    const accessToken = {token};
    const statusEl = document.getElementById("status");
    const videoEl = document.getElementById("avatar-video");
    let room = null;
    const mediaStream = new MediaStream();

    async function connect() {{
      try {{
        statusEl.textContent = "Connecting...";
        const {{ Room, RoomEvent }} = LivekitClient;
        room = new Room();
        room.on(RoomEvent.TrackSubscribed, (track) => {{
          if (!videoEl.srcObject) {{ videoEl.srcObject = mediaStream; }}
          if (track.kind === "video" || track.kind === "audio") {{
            mediaStream.addTrack(track.mediaStreamTrack);
          }}
        }});
        room.on(RoomEvent.Disconnected, () => {{ statusEl.textContent = "Disconnected"; }});
        await room.connect(mediaUrl, accessToken);
        statusEl.textContent = "Connected. Waiting for avatar media...";
      }} catch (e) {{
        statusEl.textContent = "Error: " + e;
      }}
    }}

    document.getElementById("connect-btn").addEventListener("click", () => {{
      if (!room) {{ connect(); }}
    }});
  </script>
</body>
</html>
"#,
        script = MEDIA_CLIENT_SCRIPT,
        url = js_string(media_url),
        token = js_string(access_token),
    )
}

/// JSON string literal, which is also a valid JS string literal. `</` is split so the
/// value cannot close the surrounding script tag.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace("</", "<\\/")
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}
