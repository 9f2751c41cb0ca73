//! # Ordered pattern dispatch table for server log lines.
//!
//! [`LineMatcher`] holds an immutable, ordered list of (pattern, kind)
//! bindings, built once at construction. [`LineMatcher::classify`] tries the
//! patterns in registration order against a full decoded line; the first
//! match wins and produces a [`LineEvent`]. A line matching no pattern is not
//! an error — the relay has already forwarded it verbatim.
//!
//! The stock table recognizes four lines of the headless server's log:
//! the CreatingGame→InGame transition, `[JOIN]`/`[LEAVE]` presence lines,
//! and the "Saving finished" marker. The presence patterns use a greedy
//! `(.+)` name capture, so names may contain almost any character.

use regex::Regex;

/// A classified log line, with the captured player name where applicable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// The server finished creating the game and is accepting players.
    Ready,
    /// A player joined; carries the display name.
    Joined(String),
    /// A player left; carries the display name.
    Left(String),
    /// The server finished writing a save.
    Saved,
}

/// What a pattern classifies its matches as.
///
/// `Joined`/`Left` expect the player name in capture group 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Ready,
    Joined,
    Left,
    Saved,
}

struct Binding {
    pattern: Regex,
    kind: LineKind,
}

/// Ordered (pattern, kind) dispatch table; first match wins.
pub struct LineMatcher {
    bindings: Vec<Binding>,
}

/// CreatingGame→InGame transition line.
const READY_PATTERN: &str = r"^\s*\d+\.\d+ Info ServerMultiplayerManager\.cpp:\d+: updateTick\(\d+\) changing state from\(CreatingGame\) to\(InGame\)$";
/// Join line; group 1 is the player name.
const JOINED_PATTERN: &str = r"^....-..-.. ..:..:.. \[JOIN] (.+) joined the game$";
/// Leave line; group 1 is the player name.
const LEFT_PATTERN: &str = r"^....-..-.. ..:..:.. \[LEAVE] (.+) left the game$";
/// Save-complete marker.
const SAVED_PATTERN: &str =
    r"^\s*\d+\.\d+ Info AppManagerStates\.cpp:\d+: Saving finished$";

impl LineMatcher {
    /// Builds a table from explicit bindings, evaluated in the given order.
    pub fn new(bindings: Vec<(Regex, LineKind)>) -> Self {
        Self {
            bindings: bindings
                .into_iter()
                .map(|(pattern, kind)| Binding { pattern, kind })
                .collect(),
        }
    }

    /// The stock table for the game server's log grammar.
    pub fn game_patterns() -> Self {
        let compile = |p: &str| Regex::new(p).expect("hard-coded pattern compiles");
        Self::new(vec![
            (compile(READY_PATTERN), LineKind::Ready),
            (compile(JOINED_PATTERN), LineKind::Joined),
            (compile(LEFT_PATTERN), LineKind::Left),
            (compile(SAVED_PATTERN), LineKind::Saved),
        ])
    }

    /// Classifies a line against the table; first matching binding wins.
    ///
    /// Returns `None` when no pattern matches — the caller forwards the line
    /// unchanged and does nothing else.
    pub fn classify(&self, line: &str) -> Option<LineEvent> {
        for binding in &self.bindings {
            let Some(caps) = binding.pattern.captures(line) else {
                continue;
            };
            let name = || {
                caps.get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            };
            return Some(match binding.kind {
                LineKind::Ready => LineEvent::Ready,
                LineKind::Joined => LineEvent::Joined(name()),
                LineKind::Left => LineEvent::Left(name()),
                LineKind::Saved => LineEvent::Saved,
            });
        }
        None
    }
}
