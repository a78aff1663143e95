//! Domain Graph Module
//!
//! The single consistent snapshot of everything the sources reveal about the
//! domain: users, computers and groups, plus the cross-namespace indices
//! (account name, SID, NT hash) used to merge differently-keyed records
//! about the same real-world principal.
//!
//! The graph is built once per run by the reconciliation pipeline and
//! treated as read-only by every consumer afterwards. All entity mutation
//! goes through the merge operations here; merges are idempotent and
//! overlay fields in place, they never replace an entity.
//!
//! # Field ownership
//!
//! | Source | Fields it may populate |
//! |--------|------------------------|
//! | Directory dump | DN, SID, SPNs, UAC, memberships, description |
//! | Secrets dump | NT/LM hash, cleartext password |
//! | Cracking output | cracked password only |
//!
//! The three never overwrite each other's fields, so applying sources in
//! pipeline order converges regardless of which sources saw the account.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::common_types::{sid_domain_prefix, uac_flags};
use crate::model::{kind_for_account_name, Group, Principal, PrincipalKind};
use crate::records::{DirectoryGroupRecord, DirectoryPrincipalRecord, SecretsEntry};

/// Placeholder returned while no principal with a SID has been observed
pub const DOMAIN_SID_SENTINEL: &str = "S-1-5-21";

/// What kind of object a SID resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    User,
    Computer,
    Group,
}

#[derive(Debug, Clone)]
struct SidEntry {
    kind: ObjectKind,
    name: String,
}

/// The identity graph: owns all entities and the indices across them
///
/// Maps are ordered by account name so iteration (and therefore report
/// output) is deterministic.
#[derive(Debug, Default)]
pub struct DomainGraph {
    users: BTreeMap<String, Principal>,
    computers: BTreeMap<String, Principal>,
    groups: BTreeMap<String, Group>,
    sid_index: HashMap<String, SidEntry>,
    name_to_sid: HashMap<String, String>,
    hash_to_sid: HashMap<String, String>,
    domain_sid: RefCell<Option<String>>,
}

impl DomainGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // Merge operations (the only entity mutation)
    // ==========================================

    /// Overlay a directory record onto the graph, creating the principal on
    /// first sighting. Only structural fields are touched; credential
    /// fields belong to the secrets and cracking sources.
    pub fn merge_directory_principal(&mut self, record: &DirectoryPrincipalRecord) {
        let name = record.sam_account_name.clone();
        let map = match record.kind {
            PrincipalKind::User => &mut self.users,
            PrincipalKind::Computer => &mut self.computers,
        };
        let principal = map
            .entry(name.clone())
            .or_insert_with(|| Principal::new(record.kind, name.clone()));

        if !record.distinguished_name.is_empty() {
            principal.distinguished_name = Some(record.distinguished_name.clone());
        }
        if !record.spn_list.is_empty() {
            principal.spn_list = record.spn_list.clone();
        }
        if !record.member_of.is_empty() {
            principal.member_of = record.member_of.clone();
        }
        if !record.description.is_empty() {
            principal.description = Some(record.description.clone());
        }
        principal.user_account_control = record.user_account_control;
        principal.enabled = record.user_account_control & uac_flags::ACCOUNTDISABLE == 0;

        if !record.object_sid.is_empty() {
            Self::assign_sid(principal, &record.object_sid);
            let sid = principal.object_sid.clone().unwrap_or_default();
            let kind = match record.kind {
                PrincipalKind::User => ObjectKind::User,
                PrincipalKind::Computer => ObjectKind::Computer,
            };
            self.index_sid(&sid, kind, &record.sam_account_name);
        }
        self.index_hash_for(&record.sam_account_name, record.kind);
    }

    /// Overlay a directory group record, keyed by group name
    pub fn merge_directory_group(&mut self, record: &DirectoryGroupRecord) {
        let group = self
            .groups
            .entry(record.name.clone())
            .or_insert_with(|| Group::new(record.name.clone()));

        if !record.members.is_empty() {
            group.members = record.members.clone();
        }
        if !record.member_of.is_empty() {
            group.member_of = record.member_of.clone();
        }
        if !record.object_sid.is_empty() {
            if let Some(existing) = &group.object_sid {
                if existing != &record.object_sid {
                    warn!(
                        group = %record.name,
                        known = %existing,
                        reported = %record.object_sid,
                        "conflicting SIDs for group, keeping the first"
                    );
                }
            } else {
                group.object_sid = Some(record.object_sid.clone());
            }
            if let Some(sid) = group.object_sid.clone() {
                self.index_sid(&sid, ObjectKind::Group, &record.name);
            }
        }
    }

    /// Attach credential material from a secrets-dump entry, synthesizing a
    /// minimal principal when the account was never seen in the directory.
    /// The variant of a synthesized principal follows the computer-account
    /// name suffix.
    pub fn merge_secrets_entry(&mut self, entry: &SecretsEntry) {
        let name = entry.account_name().to_string();
        let kind = match self.kind_of(&name) {
            Some(kind) => kind,
            None => kind_for_account_name(&name),
        };
        let map = match kind {
            PrincipalKind::User => &mut self.users,
            PrincipalKind::Computer => &mut self.computers,
        };
        let principal = map
            .entry(name.clone())
            .or_insert_with(|| Principal::new(kind, name.clone()));

        if principal.qualified_name.is_none() && entry.qualified_name != name {
            principal.qualified_name = Some(entry.qualified_name.clone());
        }
        if let (Some(lm), Some(nt)) = (&entry.lm_hash, &entry.nt_hash) {
            principal.lm_hash = Some(lm.clone());
            principal.nt_hash = Some(nt.clone());
        }
        if let Some(cleartext) = &entry.cleartext_password {
            principal.cleartext_password = Some(cleartext.clone());
        }
        self.index_hash_for(&name, kind);
    }

    /// Set the cracked password on every user and computer whose NT hash
    /// matches. Password reuse across accounts is expected, so all matches
    /// are visited; returns how many principals were updated.
    pub fn set_cracked_password_by_hash(&mut self, nt_hash: &str, password: &str) -> usize {
        let mut updated = 0;
        for principal in self
            .users
            .values_mut()
            .chain(self.computers.values_mut())
        {
            if principal.nt_hash.as_deref() == Some(nt_hash) {
                principal.cracked_password = Some(password.to_string());
                updated += 1;
            }
        }
        updated
    }

    // ==========================================
    // Lookup
    // ==========================================

    /// Find a principal by account name, users before computers
    pub fn find_by_account_name(&self, name: &str) -> Option<&Principal> {
        self.users.get(name).or_else(|| self.computers.get(name))
    }

    /// Find a principal by SID via the SID index
    pub fn find_by_sid(&self, sid: &str) -> Option<&Principal> {
        let entry = self.sid_index.get(sid)?;
        match entry.kind {
            ObjectKind::User => self.users.get(&entry.name),
            ObjectKind::Computer => self.computers.get(&entry.name),
            ObjectKind::Group => None,
        }
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn group_by_sid(&self, sid: &str) -> Option<&Group> {
        let entry = self.sid_index.get(sid)?;
        match entry.kind {
            ObjectKind::Group => self.groups.get(&entry.name),
            _ => None,
        }
    }

    /// Resolve a SID to the account name it is indexed under
    pub fn account_name_for_sid(&self, sid: &str) -> Option<&str> {
        self.sid_index.get(sid).map(|entry| entry.name.as_str())
    }

    pub fn users(&self) -> impl Iterator<Item = &Principal> {
        self.users.values()
    }

    pub fn computers(&self) -> impl Iterator<Item = &Principal> {
        self.computers.values()
    }

    /// All principals, users first, in stable name order
    pub fn principals(&self) -> impl Iterator<Item = &Principal> {
        self.users.values().chain(self.computers.values())
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn computer_count(&self) -> usize {
        self.computers.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // ==========================================
    // Derived state
    // ==========================================

    /// The SID prefix shared by all principals of the domain
    ///
    /// Derived by stripping the trailing RID from the first user (then
    /// computer) SID observed, then cached. While the cache still holds the
    /// sentinel it is re-derived on every read, so SID data arriving later
    /// in ingestion corrects it.
    pub fn domain_sid(&self) -> String {
        {
            let cache = self.domain_sid.borrow();
            if let Some(sid) = cache.as_ref() {
                if sid != DOMAIN_SID_SENTINEL {
                    return sid.clone();
                }
            }
        }
        let derived = self.derive_domain_sid();
        *self.domain_sid.borrow_mut() = Some(derived.clone());
        derived
    }

    /// Check transitive membership in the built-in high-privilege groups.
    /// Accepts an account name or a SID.
    pub fn is_privileged(&self, account_name_or_sid: &str) -> bool {
        crate::membership::is_privileged(self, account_name_or_sid)
    }

    fn derive_domain_sid(&self) -> String {
        for principal in self.users.values().chain(self.computers.values()) {
            if let Some(sid) = &principal.object_sid {
                if let Some(prefix) = sid_domain_prefix(sid) {
                    return prefix;
                }
            }
        }
        DOMAIN_SID_SENTINEL.to_string()
    }

    // ==========================================
    // Internals
    // ==========================================

    /// SIDs are immutable once known: the first sighting wins, later
    /// disagreements are logged as data-integrity warnings
    fn assign_sid(principal: &mut Principal, sid: &str) {
        match &principal.object_sid {
            Some(existing) if existing != sid => {
                warn!(
                    account = %principal.sam_account_name,
                    known = %existing,
                    reported = %sid,
                    "conflicting SIDs for account, keeping the first"
                );
            }
            Some(_) => {}
            None => principal.object_sid = Some(sid.to_string()),
        }
    }

    /// Which principal store already holds this account name, if any
    fn kind_of(&self, name: &str) -> Option<PrincipalKind> {
        if self.users.contains_key(name) {
            Some(PrincipalKind::User)
        } else if self.computers.contains_key(name) {
            Some(PrincipalKind::Computer)
        } else {
            None
        }
    }

    fn index_sid(&mut self, sid: &str, kind: ObjectKind, name: &str) {
        if let Some(existing) = self.sid_index.get(sid) {
            if existing.name != name {
                warn!(
                    sid = %sid,
                    known = %existing.name,
                    reported = %name,
                    "one SID claimed by two account names, keeping the first"
                );
            }
            return;
        }
        self.sid_index.insert(
            sid.to_string(),
            SidEntry {
                kind,
                name: name.to_string(),
            },
        );
        self.name_to_sid
            .entry(name.to_string())
            .or_insert_with(|| sid.to_string());
    }

    /// Record hash → SID only where both are known and the hash is unseen;
    /// a hash shared by several principals keeps its first owner here and
    /// is surfaced as password reuse by scanning all principals instead
    fn index_hash_for(&mut self, name: &str, kind: PrincipalKind) {
        let map = match kind {
            PrincipalKind::User => &self.users,
            PrincipalKind::Computer => &self.computers,
        };
        if let Some(principal) = map.get(name) {
            if let (Some(hash), Some(sid)) = (&principal.nt_hash, &principal.object_sid) {
                self.hash_to_sid
                    .entry(hash.clone())
                    .or_insert_with(|| sid.clone());
            }
        }
    }
}
