//! Organization roster from GitHub org manifests.
//!
//! A manifest is arbitrary nested YAML; every scalar under a `members` or
//! `admins` key, at any depth, is a GitHub login (all-digit logins parse as
//! numbers). All manifests are unioned
//! into one sorted set.

use std::collections::BTreeSet;

use reqwest::blocking::Client;
use serde_yaml::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Org manifests of the Kubernetes GitHub organizations.
pub const KUBERNETES_ORG_MANIFESTS: &[&str] = &[
    "https://raw.githubusercontent.com/kubernetes/org/refs/heads/main/config/kubernetes-sigs/org.yaml",
    "https://raw.githubusercontent.com/kubernetes/org/refs/heads/main/config/kubernetes-incubator/org.yaml",
    "https://raw.githubusercontent.com/kubernetes/org/refs/heads/main/config/kubernetes-retired/org.yaml",
    "https://raw.githubusercontent.com/kubernetes/org/refs/heads/main/config/etcd-io/org.yaml",
    "https://raw.githubusercontent.com/kubernetes/org/refs/heads/main/config/kubernetes-nightly/org.yaml",
    "https://raw.githubusercontent.com/kubernetes/org/refs/heads/main/config/kubernetes-client/org.yaml",
    "https://raw.githubusercontent.com/kubernetes/org/refs/heads/main/config/kubernetes-csi/org.yaml",
    "https://raw.githubusercontent.com/kubernetes/org/refs/heads/main/config/kubernetes/org.yaml",
];

const MEMBER_KEYS: [&str; 2] = ["members", "admins"];

/// Collect every login listed under a `members`/`admins` key into `out`.
pub fn extract_members(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                if key.as_str().is_some_and(|k| MEMBER_KEYS.contains(&k)) {
                    if let Value::Sequence(logins) = child {
                        out.extend(logins.iter().filter_map(login));
                    }
                }
                extract_members(child, out);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                extract_members(item, out);
            }
        }
        Value::Tagged(tagged) => extract_members(&tagged.value, out),
        _ => {}
    }
}

fn login(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn parse_manifest(text: &str) -> Result<BTreeSet<String>> {
    let value: Value = serde_yaml::from_str(text)?;
    let mut members = BTreeSet::new();
    extract_members(&value, &mut members);
    Ok(members)
}

/// Download and union all manifests. A manifest that cannot be fetched or
/// parsed is logged and skipped.
pub fn fetch_roster(http: &Client, urls: &[String]) -> BTreeSet<String> {
    collect_roster(urls, |url| download(http, url))
}

/// Union the manifests `fetch` returns for `urls`, skipping any that fail to
/// fetch or parse.
pub fn collect_roster<F>(urls: &[String], mut fetch: F) -> BTreeSet<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut roster = BTreeSet::new();
    for url in urls {
        info!(%url, "processing manifest");
        match fetch(url).and_then(|text| parse_manifest(&text)) {
            Ok(members) => {
                info!(%url, count = members.len(), "manifest parsed");
                roster.extend(members);
            }
            Err(err) => warn!(%url, error = %err, "skipping manifest"),
        }
    }
    info!(count = roster.len(), "unique members across all manifests");
    roster
}

fn download(http: &Client, url: &str) -> Result<String> {
    let response = http.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("https://example.test/{n}/org.yaml")).collect()
    }

    fn logins(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn unions_members_and_admins_across_manifests() {
        let roster = collect_roster(&urls(&["a", "b"]), |url| {
            Ok(if url.contains("/a/") {
                "a:\n  members: [u1, u2]\n".to_string()
            } else {
                "b:\n  admins: [u2, u3]\n".to_string()
            })
        });

        assert_eq!(logins(&roster), vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn bad_manifests_are_skipped() {
        let roster = collect_roster(&urls(&["good", "gone", "garbled", "other"]), |url| {
            if url.contains("/gone/") {
                Err(Error::Http {
                    url: url.to_string(),
                    status: 404,
                })
            } else if url.contains("/garbled/") {
                Ok("members: [unclosed".to_string())
            } else if url.contains("/good/") {
                Ok("members: [alice]\n".to_string())
            } else {
                Ok("admins: [bob]\n".to_string())
            }
        });

        assert_eq!(logins(&roster), vec!["alice", "bob"]);
    }

    #[test]
    fn numeric_logins_are_kept() {
        let members = parse_manifest("members:\n  - 1234\n  - alice\n").unwrap();
        assert_eq!(logins(&members), vec!["1234", "alice"]);
    }

    #[test]
    fn walks_nested_mappings_and_sequences() {
        let yaml = r#"
orgs:
  kubernetes:
    admins:
      - alice
    members:
      - bob
      - carol
    teams:
      sig-docs:
        description: docs
        maintainers:
          - mallory
        members:
          - dave
      groups:
        - name: x
          members: [erin]
"#;
        let members = parse_manifest(yaml).unwrap();
        assert_eq!(logins(&members), vec!["alice", "bob", "carol", "dave", "erin"]);
    }

    #[test]
    fn ignores_scalars_and_other_keys() {
        assert!(parse_manifest("just a string").unwrap().is_empty());
        assert!(parse_manifest("description: members\nrepos: [a, b]\n").unwrap().is_empty());
        assert!(parse_manifest("members: not-a-list\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(parse_manifest("members: [unclosed"), Err(Error::Parse(_))));
    }
}
