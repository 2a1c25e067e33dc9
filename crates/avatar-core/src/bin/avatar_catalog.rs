//! Catalog dump: prints the streaming avatars and voices available to the account.
//! Run: cargo run -p avatar-core --bin avatar-catalog [-- --avatars | --voices]

use std::sync::Arc;

use avatar_core::telemetry::{init_tracing, load_dotenv};
use avatar_core::{AvatarConfig, AvatarResult, AvatarSessions, SessionRegistry};

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let only_avatars = args.iter().any(|a| a == "--avatars");
    let only_voices = args.iter().any(|a| a == "--voices");

    if let Err(e) = run(!only_voices, !only_avatars).await {
        eprintln!("[avatar-catalog] failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(avatars: bool, voices: bool) -> AvatarResult<()> {
    let cfg = AvatarConfig::load()?;
    let sessions = AvatarSessions::from_config(&cfg, Arc::new(SessionRegistry::new()))?;

    if avatars {
        let list = sessions.avatars().await?;
        println!("Total streaming avatars: {}\n", list.len());
        for a in &list {
            println!("- avatar_id     : {}", a.identifier().unwrap_or("N/A"));
            println!("  default_voice : {}", a.default_voice.as_deref().unwrap_or("N/A"));
            println!("  pose_name     : {}", a.pose_name.as_deref().unwrap_or("N/A"));
            println!("  status        : {}", a.status.as_deref().unwrap_or("N/A"));
            println!("  preview       : {}", a.normal_preview.as_deref().unwrap_or("N/A"));
            println!();
        }
    }

    if voices {
        let list = sessions.voices().await?;
        println!("Total voices: {}\n", list.len());
        for v in &list {
            println!("- voice_id : {}", v.voice_id);
            println!("  name     : {}", v.label());
            println!("  language : {}", v.language.as_deref().unwrap_or("N/A"));
            println!("  gender   : {}", v.gender.as_deref().unwrap_or("N/A"));
            println!("  preview  : {}", v.preview_audio.as_deref().unwrap_or("N/A"));
            if let Some(interactive) = v.support_interactive_avatar {
                println!("  interactive avatar : {}", interactive);
            }
            println!();
        }
    }
    Ok(())
}
