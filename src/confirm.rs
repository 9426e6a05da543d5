//! Interactive confirmation policy threaded through a whole run.

use anyhow::Result;

/// One operator decision at a confirmation prompt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Apply this change, keep asking.
    Yes,
    /// Skip this change, keep asking.
    No,
    /// Apply this and every later change without asking again.
    YesAll,
    /// Skip this and every later change without asking again.
    NoAll,
    /// Stop the run entirely.
    Abort,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Decision::Yes => "apply",
            Decision::No => "skip",
            Decision::YesAll => "apply all",
            Decision::NoAll => "skip all",
            Decision::Abort => "abort",
        }
    }
}

/// Running confirmation state, owned by the batch runner and updated in
/// place across every change decision.
///
/// Once `ask` turns false it never turns true again within a run: the
/// all/none decisions are irreversible.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConfirmState {
    pub ask: bool,
    pub apply: bool,
}

impl ConfirmState {
    /// Interactive default: prompt before the first change, apply nothing
    /// until the operator says so.
    pub fn interactive() -> Self {
        Self {
            ask: true,
            apply: false,
        }
    }

    /// Unattended batch mode: never prompt, apply everything.
    pub fn batch() -> Self {
        Self {
            ask: false,
            apply: true,
        }
    }

    /// Fold an operator decision into the state. `Abort` is not absorbed;
    /// the engine terminates the run instead.
    pub fn absorb(&mut self, decision: Decision) {
        match decision {
            Decision::Yes => {
                self.ask = true;
                self.apply = true;
            }
            Decision::No => {
                self.ask = true;
                self.apply = false;
            }
            Decision::YesAll => {
                self.ask = false;
                self.apply = true;
            }
            Decision::NoAll => {
                self.ask = false;
                self.apply = false;
            }
            Decision::Abort => {}
        }
    }
}

/// One pending change shown to the operator.
///
/// `old` and `new` have the same length; index i of `new` is the rewrite of
/// index i of `old`.
pub struct ChangePreview<'a> {
    pub dn: &'a str,
    pub attribute: &'a str,
    pub old: &'a [Vec<u8>],
    pub new: &'a [Vec<u8>],
}

/// Blocking decision acquisition, injected so the engine never touches a
/// real terminal. Implementations must return only valid decisions,
/// re-prompting internally on unrecognized input.
pub trait ConfirmPrompt {
    fn ask(&mut self, change: &ChangePreview<'_>) -> Result<Decision>;
}
