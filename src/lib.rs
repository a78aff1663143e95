//! Offline Active Directory credential and privilege exposure audit
//!
//! Combines three independently produced data sources — a directory object
//! dump, an offline secrets dump and cracking output — into one consistent
//! identity graph, then evaluates security findings over it: weak and
//! reused passwords, roastable accounts, delegation misconfiguration,
//! credentials leaked into descriptions.
//!
//! # Pipeline
//!
//! ```text
//! dump files -> discovery -> parsers -> reconciliation -> DomainGraph
//!                                                             |
//!                                finding modules  <-----------+
//!                                      |
//!                                markdown report
//! ```

pub mod asreproasting;
pub mod common_types;
pub mod delegation;
pub mod description_passwords;
pub mod discovery;
pub mod domain_graph;
pub mod errors;
pub mod findings;
pub mod hashcat;
pub mod kerberoasting;
pub mod ldap_dump;
pub(crate) mod ldap_helpers;
pub mod membership;
pub mod model;
pub mod password_reuse;
pub mod pipeline;
pub mod pre2k;
pub mod records;
pub mod report;
pub mod reversible_encryption;
pub mod secrets_dump;
pub mod weak_passwords;
