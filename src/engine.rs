//! Change application engine: the per-attribute applier and the batch
//! runner that drives it across all retrieved records.

use crate::confirm::{ChangePreview, ConfirmPrompt, ConfirmState, Decision};
use crate::directory::DirectorySession;
use crate::pattern::Rewrite;
use crate::record::Record;
use crate::report::{ChangeRecord, RunReport};
use crate::scope::{self, ScopeConstraint};
use anyhow::Result;

/// Control flow after one attribute: keep going or stop the whole run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Step {
    Continue,
    Abort,
}

/// Inputs for one full batch run.
pub struct RunArgs<'a> {
    pub session: &'a mut dyn DirectorySession,
    pub prompt: &'a mut dyn ConfirmPrompt,
    pub records: &'a [Record],
    pub constraint: Option<&'a ScopeConstraint>,
    pub rewrite: &'a Rewrite,
    pub initial: ConfirmState,
}

/// Drive the rewrite over every attribute of every in-scope record,
/// threading one confirmation state through the entire run.
///
/// Records are visited in retrieval order, attributes in name order. An
/// abort decision stops the run before the next unit of work; writes
/// already issued stay committed.
pub fn run(args: RunArgs<'_>) -> Result<RunReport> {
    let RunArgs {
        session,
        prompt,
        records,
        constraint,
        rewrite,
        initial,
    } = args;

    let mut state = initial;
    let mut report = RunReport::new(records.len());

    'records: for record in records {
        if !scope::in_scope(constraint, record) {
            tracing::debug!(dn = %record.dn, "record out of scope");
            continue;
        }
        report.records_in_scope += 1;

        for (attribute, raw_values) in &record.raw {
            let step = apply_attribute(ApplyArgs {
                session: &mut *session,
                prompt: &mut *prompt,
                state: &mut state,
                dn: &record.dn,
                attribute,
                raw_values,
                rewrite,
                report: &mut report,
            })?;
            if step == Step::Abort {
                report.aborted = true;
                break 'records;
            }
        }
    }

    Ok(report)
}

struct ApplyArgs<'a> {
    session: &'a mut dyn DirectorySession,
    prompt: &'a mut dyn ConfirmPrompt,
    state: &'a mut ConfirmState,
    dn: &'a str,
    attribute: &'a str,
    raw_values: &'a [Vec<u8>],
    rewrite: &'a Rewrite,
    report: &'a mut RunReport,
}

/// Apply the rewrite to one attribute of one record.
///
/// A substitution that changes nothing produces no prompt and no write. A
/// changed value set consults the confirmation state, then either issues
/// exactly one full-value-set replace or records a skip. Rejected and
/// unsendable writes are recorded as failures and the run continues.
fn apply_attribute(args: ApplyArgs<'_>) -> Result<Step> {
    let ApplyArgs {
        session,
        prompt,
        state,
        dn,
        attribute,
        raw_values,
        rewrite,
        report,
    } = args;

    let new_values: Vec<Vec<u8>> = raw_values
        .iter()
        .map(|value| rewrite.substitute(value))
        .collect();
    if new_values == raw_values {
        return Ok(Step::Continue);
    }

    if state.ask {
        let decision = prompt.ask(&ChangePreview {
            dn,
            attribute,
            old: raw_values,
            new: &new_values,
        })?;
        if decision == Decision::Abort {
            tracing::info!(dn, attribute, "run aborted by operator");
            return Ok(Step::Abort);
        }
        state.absorb(decision);
    }

    if !state.apply {
        tracing::debug!(dn, attribute, "change skipped");
        report.push(ChangeRecord::skipped(dn, attribute));
        return Ok(Step::Continue);
    }

    match session.modify_replace(dn, attribute, &new_values) {
        Ok(outcome) if outcome.is_success() => {
            tracing::info!(dn, attribute, "change applied");
            report.push(ChangeRecord::applied(dn, attribute, &outcome));
        }
        Ok(outcome) => {
            tracing::warn!(
                dn,
                attribute,
                code = outcome.code,
                "write rejected: {}",
                outcome.description
            );
            report.push(ChangeRecord::rejected(dn, attribute, &outcome));
        }
        Err(error) => {
            tracing::warn!(dn, attribute, "write failed: {error:#}");
            report.push(ChangeRecord::transport_failed(dn, attribute, &error));
        }
    }
    Ok(Step::Continue)
}
