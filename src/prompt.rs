//! Single-keystroke confirmation on the controlling terminal.

use crate::confirm::{ChangePreview, ConfirmPrompt, Decision};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

const KEY_LEGEND: &str = "[y] apply  [n] skip  [a] apply all  [s] skip all  [q] abort";
const VALUE_PREVIEW_MAX_BYTES: usize = 120;

/// Interactive prompt reading one keystroke per decision. Unrecognized keys
/// are ignored and the prompt keeps waiting; no state changes until a valid
/// key arrives.
pub struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn ask(&mut self, change: &ChangePreview<'_>) -> Result<Decision> {
        println!();
        println!("{}", change.dn);
        println!("  {}:", change.attribute);
        for (old, new) in change.old.iter().zip(change.new.iter()) {
            if old == new {
                continue;
            }
            println!("    - {}", preview(old));
            println!("    + {}", preview(new));
        }
        println!("  {KEY_LEGEND}");

        let decision = read_decision()?;
        println!("  -> {}", decision.label());
        Ok(decision)
    }
}

/// Block on the keyboard under raw mode. Raw mode is left again before
/// returning so surrounding output renders normally.
fn read_decision() -> Result<Decision> {
    enable_raw_mode().context("enable raw mode")?;
    let decision = wait_for_decision();
    disable_raw_mode().context("disable raw mode")?;
    decision
}

fn wait_for_decision() -> Result<Decision> {
    loop {
        let Event::Key(key) = event::read().context("read key event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Decision::Abort);
        }
        if let Some(decision) = decode_key(key.code) {
            return Ok(decision);
        }
    }
}

fn decode_key(code: KeyCode) -> Option<Decision> {
    match code {
        KeyCode::Char('y' | 'Y') => Some(Decision::Yes),
        KeyCode::Char('n' | 'N') => Some(Decision::No),
        KeyCode::Char('a' | 'A') => Some(Decision::YesAll),
        KeyCode::Char('s' | 'S') => Some(Decision::NoAll),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Decision::Abort),
        _ => None,
    }
}

/// Lossy, truncated rendering for display only; mutation always operates on
/// the raw bytes.
fn preview(value: &[u8]) -> String {
    let text = String::from_utf8_lossy(value);
    if text.len() <= VALUE_PREVIEW_MAX_BYTES {
        return text.into_owned();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        if truncated.len() + ch.len_utf8() > VALUE_PREVIEW_MAX_BYTES {
            break;
        }
        truncated.push(ch);
    }
    truncated.push_str("...");
    truncated
}
