//! Command-line demo for the read-along engine.
//!
//! Segments a text file into a page, then replays whole-page narration over
//! the estimated reading time (or runs test mode for a few timer ticks) and
//! reports the highlighted word after every tick.

use anyhow::{Context, Result, anyhow};
use readalong_core::config::{AppConfig, load_config};
use readalong_core::{languages, text_utils};
use readalong_core::ticker::TestTicker;
use readalong_core::{
    PageText, ReadingMode, SessionCommand, SessionEffect, SessionSetup, SyncFrame, SyncSession,
    TickInput, WordTag,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// Timer ticks consumed before test mode is switched off again.
const TEST_MODE_TICKS: usize = 24;

const USAGE: &str = "Usage: readalong <text-file> [--lang xx]... [--translation xx=path]... \
[--mode paragraph|sentence] [--test-mode] [--json]";

#[derive(Debug)]
struct CliArgs {
    text_path: PathBuf,
    languages: Vec<String>,
    translations: Vec<(String, PathBuf)>,
    mode: Option<ReadingMode>,
    test_mode: bool,
    json: bool,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let mut config = load_config(Path::new("conf/config.toml"));
    if let Some(mode) = args.mode {
        config.reading_mode = mode;
    }
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.text_path.display(),
        level = %config.log_level,
        mode = %config.reading_mode,
        "Starting read-along demo"
    );

    let page = load_page(&args)?;
    if page.is_empty() {
        warn!(path = %args.text_path.display(), "No sentences found; nothing to narrate");
        return Ok(());
    }
    info!(
        sentences = page.original().len(),
        words = page.total_words(),
        translations = page.translations().len(),
        "Loaded page"
    );

    let setup = SessionSetup::from_config(&config, &args.languages);
    let mut session = SyncSession::new(setup, page, &config);
    if args.test_mode {
        run_test_mode(&mut session, args.json)
    } else {
        run_playback(&mut session, &config, args.json)
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut text_path = None;
    let mut languages = Vec::new();
    let mut translations = Vec::new();
    let mut mode = None;
    let mut test_mode = false;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lang" => {
                let code = args.next().ok_or_else(|| anyhow!("--lang needs a value\n{USAGE}"))?;
                languages.push(code);
            }
            "--translation" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--translation needs a value\n{USAGE}"))?;
                let (code, path) = value
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected --translation xx=path, got {value}"))?;
                translations.push((code.to_string(), PathBuf::from(path)));
            }
            "--mode" => {
                let value = args.next().ok_or_else(|| anyhow!("--mode needs a value\n{USAGE}"))?;
                mode = Some(value.parse::<ReadingMode>()?);
            }
            "--test-mode" => test_mode = true,
            "--json" => json = true,
            flag if flag.starts_with("--") => return Err(anyhow!("Unknown flag {flag}\n{USAGE}")),
            path => {
                if text_path.replace(PathBuf::from(path)).is_some() {
                    return Err(anyhow!("Only one text file may be given\n{USAGE}"));
                }
            }
        }
    }

    let text_path = text_path.ok_or_else(|| anyhow!(USAGE))?;
    if !text_path.exists() {
        return Err(anyhow!("File not found: {}", text_path.display()));
    }
    Ok(CliArgs {
        text_path,
        languages,
        translations,
        mode,
        test_mode,
        json,
    })
}

fn load_page(args: &CliArgs) -> Result<PageText> {
    let text = fs::read_to_string(&args.text_path)
        .with_context(|| format!("failed to read {}", args.text_path.display()))?;
    let mut page = PageText::new(Some(&text));
    for (code, path) in &args.translations {
        let translated = fs::read_to_string(path)
            .with_context(|| format!("failed to read {code} translation {}", path.display()))?;
        page.set_translation(code, Some(&translated), None);
        if !page.has_translation(code) {
            warn!(%code, path = %path.display(), "Translation file is empty");
        }
    }
    Ok(page)
}

/// Replay whole-page narration with one progress tick per narrated word.
fn run_playback(session: &mut SyncSession, config: &AppConfig, json: bool) -> Result<()> {
    let language = session.narration_language().to_string();
    let narrated = session.page().narrated(&language).join(" ");
    let duration = config
        .rate_model()
        .estimated_duration(&narrated, &language)
        .as_secs_f64();
    let steps = text_utils::total_words(session.page().narrated(&language));
    let language_name = languages::language(&language).map_or(language.as_str(), |entry| entry.name);
    info!(
        %language,
        language_name,
        duration_secs = duration,
        steps,
        "Simulating whole-page narration"
    );

    session.apply_command(SessionCommand::PlayWhole);
    for step in 0..steps {
        let fraction = step as f64 / steps as f64;
        session.tick(TickInput::Progress {
            fraction,
            duration_secs: duration,
        });
        report(session, json)?;
    }
    let event = session.apply_command(SessionCommand::PlaybackEnded);
    info!(action = event.action, "Narration complete");
    Ok(())
}

/// Run the test-mode cursor off a real ticker thread for a fixed number of ticks.
fn run_test_mode(session: &mut SyncSession, json: bool) -> Result<()> {
    let event = session.apply_command(SessionCommand::StartTestMode);
    let (tx, rx) = mpsc::channel();
    let mut ticker = None;
    for effect in event.effects {
        if let SessionEffect::StartTestTimer {
            generation,
            interval,
        } = effect
        {
            ticker = Some(TestTicker::spawn(interval, generation, tx.clone())?);
        }
    }
    drop(tx);
    let ticker = ticker.ok_or_else(|| anyhow!("test mode did not request a timer"))?;

    report(session, json)?;
    for _ in 0..TEST_MODE_TICKS {
        let input = rx
            .recv_timeout(Duration::from_secs(30))
            .context("test-mode ticker stopped unexpectedly")?;
        session.tick(input);
        report(session, json)?;
    }

    let event = session.apply_command(SessionCommand::StopTestMode);
    for effect in &event.effects {
        if let SessionEffect::CancelTestTimer { generation } = effect {
            info!(generation, ticker = ticker.generation(), "Cancelling test-mode timer");
        }
    }
    ticker.stop();
    Ok(())
}

fn report(session: &SyncSession, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(&session.snapshot()).context("failed to encode snapshot")?;
        println!("{line}");
        return Ok(());
    }

    let frame = session.frame();
    let (Some(sentence_idx), Some(word_idx)) =
        (frame.position.sentence_idx, frame.position.word_idx)
    else {
        println!("[{}] no position", frame.state.label());
        return Ok(());
    };
    let word = current_word(frame).unwrap_or("?");
    let pct = frame
        .sentence_progress
        .get(&sentence_idx)
        .copied()
        .unwrap_or_default();
    println!(
        "[{}] sentence {sentence_idx} word {word_idx}: {word} ({pct:.0}%)",
        frame.state.label()
    );
    Ok(())
}

fn current_word(frame: &SyncFrame) -> Option<&str> {
    let sentences = match &frame.narrated_translation {
        Some(language) => {
            &frame
                .translations
                .iter()
                .find(|translation| &translation.language == language)?
                .sentences
        }
        None => &frame.original,
    };
    sentences
        .iter()
        .flat_map(|sentence| sentence.words.iter())
        .find(|word| word.tag == WordTag::Current)
        .map(|word| word.text.as_str())
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
