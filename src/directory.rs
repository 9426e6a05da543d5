//! Directory session interface and the ldap3-backed implementation.

use crate::record::Record;
use anyhow::{Context, Result};
use ldap3::{LdapConn, LdapConnSettings, Mod, Scope, SearchEntry};
use std::collections::BTreeMap;

/// Search depth below the base entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchScope {
    Base,
    One,
    Sub,
}

/// Result of one write request, as reported by the directory.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub code: u32,
    pub description: String,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// A bound, queryable directory connection.
///
/// The engine issues one outstanding request at a time and interprets the
/// returned [`Outcome`] itself, so `modify_replace` reports non-zero result
/// codes as `Ok` outcomes; `Err` means the request could not be sent at all.
pub trait DirectorySession {
    fn search(
        &mut self,
        base: &str,
        filter: &str,
        scope: SearchScope,
        attrs: &[String],
    ) -> Result<Vec<Record>>;

    /// Replace the full value set of one attribute on one entry.
    fn modify_replace(
        &mut self,
        dn: &str,
        attribute: &str,
        values: &[Vec<u8>],
    ) -> Result<Outcome>;
}

/// Connection parameters for [`LdapDirectory::connect`].
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    pub url: String,
    pub starttls: bool,
    /// DN for a simple bind; `None` binds anonymously.
    pub bind_dn: Option<String>,
    pub password: Option<String>,
}

/// Synchronous LDAP connection speaking the [`DirectorySession`] interface.
pub struct LdapDirectory {
    conn: LdapConn,
}

impl LdapDirectory {
    pub fn connect(settings: &ConnectSettings) -> Result<Self> {
        let conn_settings = LdapConnSettings::new().set_starttls(settings.starttls);
        let mut conn = LdapConn::with_settings(conn_settings, &settings.url)
            .with_context(|| format!("connect to {}", settings.url))?;
        if let Some(bind_dn) = &settings.bind_dn {
            let password = settings.password.as_deref().unwrap_or("");
            conn.simple_bind(bind_dn, password)
                .and_then(|result| result.success())
                .with_context(|| format!("bind as {bind_dn}"))?;
            tracing::debug!(bind_dn, "bound to directory");
        }
        Ok(Self { conn })
    }

    /// Best-effort unbind; connection teardown failures are not actionable.
    pub fn unbind(mut self) {
        let _ = self.conn.unbind();
    }
}

impl DirectorySession for LdapDirectory {
    fn search(
        &mut self,
        base: &str,
        filter: &str,
        scope: SearchScope,
        attrs: &[String],
    ) -> Result<Vec<Record>> {
        let scope = match scope {
            SearchScope::Base => Scope::Base,
            SearchScope::One => Scope::OneLevel,
            SearchScope::Sub => Scope::Subtree,
        };
        // An empty attribute list means all user attributes.
        let attrs = if attrs.is_empty() {
            vec!["*".to_string()]
        } else {
            attrs.to_vec()
        };
        let (entries, _result) = self
            .conn
            .search(base, scope, filter, attrs)
            .and_then(|result| result.success())
            .with_context(|| format!("search under {base} with filter {filter}"))?;
        Ok(entries
            .into_iter()
            .map(|entry| record_from_entry(SearchEntry::construct(entry)))
            .collect())
    }

    fn modify_replace(
        &mut self,
        dn: &str,
        attribute: &str,
        values: &[Vec<u8>],
    ) -> Result<Outcome> {
        let replace: Mod<Vec<u8>> = Mod::Replace(
            attribute.as_bytes().to_vec(),
            values.iter().cloned().collect(),
        );
        let result = self
            .conn
            .modify(dn, vec![replace])
            .with_context(|| format!("modify {dn}"))?;
        Ok(Outcome {
            code: result.rc,
            description: describe(result.rc, &result.text),
        })
    }
}

fn record_from_entry(entry: SearchEntry) -> Record {
    let SearchEntry {
        dn, attrs, bin_attrs, ..
    } = entry;
    let string_attrs: BTreeMap<String, Vec<String>> = attrs.into_iter().collect();
    let binary_attrs: BTreeMap<String, Vec<Vec<u8>>> = bin_attrs.into_iter().collect();
    Record::new(dn, string_attrs, binary_attrs)
}

fn describe(code: u32, server_text: &str) -> String {
    let name = code_name(code);
    if server_text.is_empty() {
        name.to_string()
    } else {
        format!("{name}: {server_text}")
    }
}

fn code_name(code: u32) -> &'static str {
    match code {
        0 => "success",
        1 => "operations error",
        8 => "strong auth required",
        16 => "no such attribute",
        17 => "undefined attribute type",
        19 => "constraint violation",
        20 => "attribute or value exists",
        21 => "invalid attribute syntax",
        32 => "no such object",
        34 => "invalid DN syntax",
        49 => "invalid credentials",
        50 => "insufficient access rights",
        53 => "unwilling to perform",
        65 => "object class violation",
        _ => "directory error",
    }
}
