//! CLI argument parsing.
//!
//! The CLI is intentionally thin: it produces the finalized parameter set
//! and leaves pattern compilation, file loading, and session setup to main.
use crate::directory::SearchScope;
use clap::Parser;
use std::path::PathBuf;

/// Root argument surface for the one-shot rewrite run.
#[derive(Parser, Debug)]
#[command(
    name = "ldre",
    version,
    about = "Regex-driven bulk attribute rewrite for LDAP directories",
    after_help = "Keys at the confirmation prompt:\n  y apply this change          n skip this change\n  a apply all further changes  s skip all further changes\n  q (or Esc/Ctrl-C) abort the run\n\nExamples:\n  ldre --url ldap://ldap.example.com --base dc=example,dc=com \\\n       --bind-dn cn=admin,dc=example,dc=com --password-file ~/.ldre-pw \\\n       --attr mail 'old\\.example\\.com' new.example.com\n  ldre --url ldaps://ldap.example.com --base ou=people,dc=example,dc=com \\\n       --filter '(mail=*)' --scope-attr department --scope-file eng.txt \\\n       --batch --report run.json 'old\\.example\\.com' new.example.com",
    arg_required_else_help = true
)]
pub struct Args {
    /// LDAP server URL (ldap://, ldaps://, ldapi://)
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// DN to bind as; omitted means an anonymous bind
    #[arg(long, value_name = "DN")]
    pub bind_dn: Option<String>,

    /// File holding the bind password (trailing newline ignored)
    #[arg(long, value_name = "PATH", requires = "bind_dn")]
    pub password_file: Option<PathBuf>,

    /// Negotiate STARTTLS on a plain ldap:// connection
    #[arg(long)]
    pub starttls: bool,

    /// Search base DN
    #[arg(long, value_name = "DN")]
    pub base: String,

    /// LDAP search filter selecting the records to retrieve
    #[arg(long, value_name = "FILTER", default_value = "(objectClass=*)")]
    pub filter: String,

    /// Search depth below the base: base, one, or sub
    #[arg(
        long,
        value_name = "SCOPE",
        default_value = "sub",
        value_parser = parse_search_scope
    )]
    pub search_scope: SearchScope,

    /// Attribute to retrieve and rewrite (repeatable; default: all)
    #[arg(long = "attr", value_name = "NAME")]
    pub attrs: Vec<String>,

    /// Attribute whose current values gate which records are touched
    #[arg(long, value_name = "NAME", requires = "scope_file")]
    pub scope_attr: Option<String>,

    /// File of allowed values for --scope-attr, one per line
    #[arg(long, value_name = "PATH", requires = "scope_attr")]
    pub scope_file: Option<PathBuf>,

    /// Apply every change without prompting
    #[arg(long)]
    pub batch: bool,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Regex applied to each attribute value
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Replacement template ($1 and ${name} reference capture groups)
    #[arg(value_name = "REPLACEMENT")]
    pub replacement: String,
}

fn parse_search_scope(value: &str) -> Result<SearchScope, String> {
    match value {
        "base" => Ok(SearchScope::Base),
        "one" => Ok(SearchScope::One),
        "sub" => Ok(SearchScope::Sub),
        other => Err(format!("unsupported search scope: {other}")),
    }
}
