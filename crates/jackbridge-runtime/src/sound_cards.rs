//! ALSA sound card enumeration via `aplay -l`.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Upper bound for the listing command.
const LIST_TIMEOUT: Duration = Duration::from_secs(3);

/// One playback-capable card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundCard {
    pub index: u32,
    /// Short card id, e.g. `PCH` or `USB`.
    pub name: String,
}

impl SoundCard {
    /// Device strings usable as the JACK ALSA device: `hw:N` and, when the
    /// card has a name, `hw:CARD=<name>` with unusable characters replaced.
    pub fn device_names(&self) -> Vec<String> {
        let mut names = vec![format!("hw:{}", self.index)];
        if !self.name.is_empty() {
            let sanitized: String = self
                .name
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            names.push(format!("hw:CARD={sanitized}"));
        }
        names
    }
}

/// Parse `aplay -l` output.
///
/// Card lines look like `card 0: PCH [HDA Intel PCH], device 0: ...`. A card
/// with several devices appears once per device; only the first is kept.
pub fn parse_aplay_list(output: &str) -> Vec<SoundCard> {
    let mut cards: Vec<SoundCard> = Vec::new();
    for line in output.lines() {
        let Some(rest) = line.strip_prefix("card ") else {
            continue;
        };
        let Some((index, rest)) = rest.split_once(':') else {
            continue;
        };
        let Ok(index) = index.trim().parse::<u32>() else {
            continue;
        };
        if cards.iter().any(|card| card.index == index) {
            continue;
        }
        let name = rest
            .split(['[', ','])
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        cards.push(SoundCard { index, name });
    }
    cards
}

/// Run `<program> -l` and parse the result. Any failure yields no cards.
pub async fn list_sound_cards(program: &str) -> Vec<SoundCard> {
    let mut cmd = Command::new(program);
    cmd.arg("-l")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match timeout(LIST_TIMEOUT, cmd.output()).await {
        Ok(Ok(output)) if output.status.success() => {
            parse_aplay_list(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(Ok(output)) => {
            debug!(program, status = %output.status, "Sound card listing failed");
            Vec::new()
        }
        Ok(Err(e)) => {
            debug!(program, error = %e, "Sound card listing unavailable");
            Vec::new()
        }
        Err(_) => {
            debug!(program, "Sound card listing timed out");
            Vec::new()
        }
    }
}
