use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod cli;
mod confirm;
mod directory;
mod engine;
mod pattern;
mod prompt;
mod record;
mod report;
mod scope;

use cli::Args;
use confirm::ConfirmState;
use directory::{ConnectSettings, DirectorySession, LdapDirectory};
use pattern::Rewrite;
use prompt::TerminalPrompt;
use report::RunReport;
use scope::ScopeConstraint;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    // Everything that can fail fast does so before the first record is
    // touched: pattern compilation, scope file, password file, bind, search.
    let rewrite = Rewrite::compile(&args.pattern, args.replacement.as_bytes())?;

    let constraint = match (&args.scope_attr, &args.scope_file) {
        (Some(attr), Some(path)) => Some(ScopeConstraint::from_file(attr, path)?),
        _ => None,
    };

    let password = args.password_file.as_deref().map(read_password).transpose()?;

    let mut directory = LdapDirectory::connect(&ConnectSettings {
        url: args.url.clone(),
        starttls: args.starttls,
        bind_dn: args.bind_dn.clone(),
        password,
    })?;

    let records = directory.search(&args.base, &args.filter, args.search_scope, &args.attrs)?;
    tracing::info!(count = records.len(), base = %args.base, "retrieved records");

    let initial = if args.batch {
        ConfirmState::batch()
    } else {
        ConfirmState::interactive()
    };
    let mut prompt = TerminalPrompt;
    let run_report = engine::run(engine::RunArgs {
        session: &mut directory,
        prompt: &mut prompt,
        records: &records,
        constraint: constraint.as_ref(),
        rewrite: &rewrite,
        initial,
    })?;

    directory.unbind();

    print_summary(&run_report);
    if let Some(path) = &args.report {
        report::write_json(path, &run_report)?;
        println!("Wrote run report to {}", path.display());
    }
    if run_report.aborted {
        bail!("run aborted by operator");
    }
    Ok(())
}

fn read_password(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read password file {}", path.display()))?;
    Ok(content.trim_end_matches(['\r', '\n']).to_string())
}

fn print_summary(run_report: &RunReport) {
    println!();
    println!(
        "Records: {} retrieved, {} in scope",
        run_report.records_total, run_report.records_in_scope
    );
    println!(
        "Changes: {} applied, {} skipped, {} failed",
        run_report.applied, run_report.skipped, run_report.failed
    );
    if run_report.aborted {
        println!("Run aborted before completion.");
    }
}
