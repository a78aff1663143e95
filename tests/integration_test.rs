//! End-to-end integration tests
//!
//! Build real dump files on disk, run discovery, parsing and reconciliation
//! exactly the way the binary does, and check findings over the converged
//! graph.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ad_credential_audit::common_types::nt_hash_of;
use ad_credential_audit::{
    discovery, findings, hashcat, ldap_dump, membership, pipeline, report, secrets_dump,
};

const DOMAIN_SID: &str = "S-1-5-21-1004336348-1177238915-682003330";
const EMPTY_LM: &str = "aad3b435b51404eeaad3b435b51404ee";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn users_json() -> String {
    format!(
        r#"[
  {{"attributes": {{
      "sAMAccountName": ["alice"],
      "distinguishedName": ["CN=alice,CN=Users,DC=corp,DC=local"],
      "objectSid": ["{domain}-1104"],
      "userAccountControl": [512],
      "memberOf": ["CN=Tier0,CN=Users,DC=corp,DC=local"]
  }}}},
  {{"attributes": {{
      "sAMAccountName": ["bob"],
      "distinguishedName": ["CN=bob,CN=Users,DC=corp,DC=local"],
      "objectSid": ["{domain}-1105"],
      "userAccountControl": [512]
  }}}},
  {{"attributes": {{
      "sAMAccountName": ["svc-sql"],
      "distinguishedName": ["CN=svc-sql,CN=Users,DC=corp,DC=local"],
      "objectSid": ["{domain}-1106"],
      "userAccountControl": [512],
      "servicePrincipalName": ["MSSQLSvc/db01.corp.local:1433"]
  }}}}
]"#,
        domain = DOMAIN_SID
    )
}

fn groups_json() -> String {
    format!(
        r#"[
  {{"attributes": {{
      "name": ["Domain Admins"],
      "objectSid": ["{domain}-512"],
      "member": ["CN=Tier0,CN=Users,DC=corp,DC=local"]
  }}}},
  {{"attributes": {{
      "name": ["Tier0"],
      "objectSid": ["{domain}-2101"],
      "member": ["CN=alice,CN=Users,DC=corp,DC=local"]
  }}}}
]"#,
        domain = DOMAIN_SID
    )
}

fn computers_json() -> String {
    format!(
        r#"[
  {{"attributes": {{
      "sAMAccountName": ["WS01$"],
      "distinguishedName": ["CN=WS01,CN=Computers,DC=corp,DC=local"],
      "objectSid": ["{domain}-1201"],
      "userAccountControl": [4096]
  }}}}
]"#,
        domain = DOMAIN_SID
    )
}

/// Directory defines Domain Admins -> Tier0 -> alice; the secrets dump gives
/// alice a hash; the cracking output recovers it
#[test]
fn end_to_end_nested_admin_with_cracked_password() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "domain_users.json", &users_json());
    write_file(dir.path(), "domain_groups.json", &groups_json());
    write_file(dir.path(), "domain_computers.json", &computers_json());

    let alice_hash = nt_hash_of("Summer2024!");
    let ntds = format!(
        "corp.local\\alice:1104:{lm}:{nt}:::\ncorp.local\\bob:1105:{lm}:ffffffffffffffffffffffffffffffff:::\n",
        lm = EMPTY_LM,
        nt = alice_hash
    );
    write_file(dir.path(), "dc01.ntds", &ntds);
    let cracked_path = write_file(
        dir.path(),
        "cracked.txt",
        &format!("{}:Summer2024!\n", alice_hash),
    );

    let ldap_files = discovery::resolve_directory_dump(dir.path()).unwrap();
    let directory = ldap_dump::parse_directory_dumps(&ldap_files.files).unwrap();
    let secret_files = discovery::resolve_secrets_dump(dir.path()).unwrap();
    let secrets = secrets_dump::parse_secrets_dumps(&secret_files.files).unwrap();
    let cracked = hashcat::parse_cracked_file(&cracked_path).unwrap();

    let graph = pipeline::build_graph(&directory, &secrets, &cracked);

    // alice is privileged only through the nested Tier0 group
    assert!(graph.is_privileged("alice"));
    assert!(!graph.is_privileged("bob"));
    assert_eq!(graph.domain_sid(), DOMAIN_SID);
    assert_eq!(
        graph
            .find_by_account_name("alice")
            .unwrap()
            .cracked_password
            .as_deref(),
        Some("Summer2024!")
    );

    let closure = membership::privileged_principals(&graph);
    assert_eq!(closure.len(), 1);

    // weak-passwords fires on alice and the rendered report masks the value
    let mut reports = Vec::new();
    for module in findings::registry() {
        if let Some(result) = module.run(&graph) {
            reports.push(result);
        }
    }
    let rendered = report::render(&graph, &reports);
    assert!(rendered.contains("## Weak passwords"));
    assert!(rendered.contains("Su***4!"));
    assert!(!rendered.contains("Summer2024!"));
    assert!(rendered.contains("## Kerberoastable accounts"));
    assert!(rendered.contains("Domain: corp.local"));
}

#[test]
fn end_to_end_zip_archive_input() {
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("export.zip");
    let file = fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    writer.start_file("dump/domain_users.json", options).unwrap();
    writer.write_all(users_json().as_bytes()).unwrap();
    writer.start_file("dump/domain_groups.json", options).unwrap();
    writer.write_all(groups_json().as_bytes()).unwrap();
    writer.finish().unwrap();

    let resolved = discovery::resolve_directory_dump(&zip_path).unwrap();
    let directory = ldap_dump::parse_directory_dumps(&resolved.files).unwrap();
    assert_eq!(directory.principals.len(), 3);
    assert_eq!(directory.groups.len(), 2);

    let graph = pipeline::build_graph(&directory, &[], &[]);
    assert!(graph.is_privileged("alice"));
}

#[test]
fn end_to_end_secrets_only_account_is_synthesized() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "domain_users.json", &users_json());

    let ntds = format!(
        "corp.local\\ghost:1110:{lm}:8846f7eaee8fb117ad06bdd830b7586c:::\ncorp.local\\OLD01$:1111:{lm}:00000000000000000000000000000001:::\n",
        lm = EMPTY_LM
    );
    write_file(dir.path(), "dc01.ntds", &ntds);

    let ldap_files = discovery::resolve_directory_dump(dir.path()).unwrap();
    let directory = ldap_dump::parse_directory_dumps(&ldap_files.files).unwrap();
    let secret_files = discovery::resolve_secrets_dump(dir.path()).unwrap();
    let secrets = secrets_dump::parse_secrets_dumps(&secret_files.files).unwrap();
    let graph = pipeline::build_graph(&directory, &secrets, &[]);

    let ghost = graph.find_by_account_name("ghost").unwrap();
    assert_eq!(ghost.qualified_name.as_deref(), Some("corp.local\\ghost"));
    assert!(ghost.distinguished_name.is_none());

    // the `$` suffix routes the synthesized account to the computer store
    assert_eq!(graph.computer_count(), 1);
    assert!(graph.find_by_account_name("OLD01$").is_some());
}

#[test]
fn end_to_end_malformed_secrets_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut ntds = String::new();
    for i in 0..9 {
        ntds.push_str(&format!(
            "corp.local\\user{i}:11{i:02}:{lm}:8846f7eaee8fb117ad06bdd830b7586c:::\n",
            lm = EMPTY_LM
        ));
    }
    ntds.push_str("this line is not a secrets entry\n");
    let path = write_file(dir.path(), "dc01.ntds", &ntds);

    let secrets = secrets_dump::parse_secrets_dumps(&[path]).unwrap();
    assert_eq!(secrets.len(), 9);

    let graph = pipeline::build_graph(&ldap_dump::DirectoryRecords::default(), &secrets, &[]);
    assert_eq!(graph.user_count(), 9);
}
