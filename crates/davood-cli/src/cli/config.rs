//! Settings CLI commands: show, set, and the connection test.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use davood_core::storage::API_KEY_KEY;
use davood_core::storage::kv_store::KvStore;
use davood_infra::kv::JsonFileKvStore;
use davood_types::config::Settings;

use super::chat::commands::{MAX_VOICE_SPEED, MIN_VOICE_SPEED};
use super::{SetArgs, command_view};
use crate::state::AppState;

/// Show only the last four characters of a secret.
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    if count <= 4 {
        "****".to_string()
    } else {
        let tail: String = value.chars().skip(count - 4).collect();
        format!("****{tail}")
    }
}

/// clap value parser for `--voice-speed`.
pub fn parse_voice_speed(raw: &str) -> Result<f32, String> {
    let speed: f32 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if (MIN_VOICE_SPEED..=MAX_VOICE_SPEED).contains(&speed) {
        Ok(speed)
    } else {
        Err(format!(
            "must be between {MIN_VOICE_SPEED} and {MAX_VOICE_SPEED}"
        ))
    }
}

async fn stored_api_key(store: &JsonFileKvStore) -> Result<String> {
    Ok(match store.get(API_KEY_KEY).await? {
        Some(serde_json::Value::String(key)) => key,
        _ => String::new(),
    })
}

fn on_off(flag: bool) -> Cell {
    if flag {
        Cell::new("on").fg(Color::Green)
    } else {
        Cell::new("off").fg(Color::DarkGrey)
    }
}

/// Two-column table of everything the user can configure.
pub fn settings_table(endpoint: &str, credential: &str, settings: &Settings) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Setting").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);

    table.add_row(vec![Cell::new("Endpoint"), Cell::new(endpoint).fg(Color::Cyan)]);
    table.add_row(vec![Cell::new("API key"), Cell::new(credential)]);
    table.add_row(vec![
        Cell::new("Response delay"),
        Cell::new(format!("{} ms", settings.effective_response_delay_ms())),
    ]);
    table.add_row(vec![
        Cell::new("Message limit"),
        Cell::new(settings.effective_message_limit()),
    ]);
    table.add_row(vec![Cell::new("Context"), on_off(settings.include_context)]);
    table.add_row(vec![Cell::new("Voice"), on_off(settings.voice_enabled)]);
    table.add_row(vec![
        Cell::new("Voice speed"),
        Cell::new(format!("{}x", settings.voice_speed)),
    ]);
    table.add_row(vec![Cell::new("TTS engine"), Cell::new(&settings.tts_engine)]);
    table.add_row(vec![Cell::new("Particles"), on_off(settings.particles)]);
    table.add_row(vec![Cell::new("Animations"), on_off(settings.animations)]);
    table
}

/// Print current settings. The API key is always masked.
pub async fn show_config(state: &AppState, json: bool) -> Result<()> {
    let session = state.build_session(command_view(true, false)).await?;
    let endpoint = session.client().endpoint();
    let api_key = stored_api_key(&state.store).await?;
    let masked = (!api_key.is_empty()).then(|| mask_secret(&api_key));
    let settings = session.settings();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "endpoint": endpoint,
                "api_key": masked,
                "settings": settings,
                "data_dir": state.data_dir,
            }))?
        );
        return Ok(());
    }

    let credential = masked.unwrap_or_else(|| "not set".to_string());
    println!();
    println!("{}", settings_table(&endpoint, &credential, &settings));
    println!(
        "  {}",
        style(format!("Data directory: {}", state.data_dir.display())).dim()
    );
    println!();
    Ok(())
}

/// Apply the given changes on top of the current settings and save.
pub async fn set_config(state: &AppState, args: SetArgs, json: bool, quiet: bool) -> Result<()> {
    let session = state.build_session(command_view(json, quiet)).await?;

    let settings = apply_changes(session.settings(), &args);
    let endpoint = args
        .endpoint
        .unwrap_or_else(|| session.client().endpoint());
    let api_key = match args.api_key {
        Some(key) => key,
        None => stored_api_key(&state.store).await?,
    };

    session.save_settings(&endpoint, &api_key, settings.clone()).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"saved": true, "endpoint": endpoint, "settings": settings})
        );
    }
    Ok(())
}

fn apply_changes(mut settings: Settings, args: &SetArgs) -> Settings {
    if let Some(delay) = args.response_delay {
        settings.response_delay_ms = delay;
    }
    if let Some(limit) = args.message_limit {
        settings.message_limit = limit;
    }
    if let Some(context) = args.context {
        settings.include_context = context;
    }
    if let Some(voice) = args.voice {
        settings.voice_enabled = voice;
    }
    if let Some(speed) = args.voice_speed {
        settings.voice_speed = speed;
    }
    if let Some(engine) = &args.tts_engine {
        settings.tts_engine = engine.clone();
    }
    if let Some(particles) = args.particles {
        settings.particles = particles;
    }
    if let Some(animations) = args.animations {
        settings.animations = animations;
    }
    settings
}

/// Probe the endpoint and report the result.
pub async fn test_connection(state: &AppState, json: bool, quiet: bool) -> Result<()> {
    let session = state.build_session(command_view(json, quiet)).await?;

    let spinner = (!json && !quiet).then(|| {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) =
            ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
        {
            bar.set_style(spinner_style);
        }
        bar.set_message(format!("Testing {}...", session.client().endpoint()));
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        bar
    });

    let status = session.test_connection().await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    }
    Ok(())
}
