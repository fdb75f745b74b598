// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests for the `toolhub` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const PIPEDRIVE: &str = r#"
slug = "pipedrive"
name = "Pipedrive"
category = "CRM Tools"
short_pitch = "A pipeline-first CRM."
rating_value = 4.5
dedicated = true
pros = ["Fast to set up"]

[[alternatives]]
slug = "hubspot"
name = "HubSpot CRM"

[[faqs]]
question = "Is there a free plan?"
answer = "No, but there is a trial."

[[faqs]]
question = "Can I import a CSV?"
answer = "Yes."
"#;

const HUBSPOT: &str = "
slug: hubspot
name: HubSpot CRM
category: CRM Tools
rating_value: 4.4
cons:
  - Paid hubs get expensive
";

fn setup_site() -> TempDir {
    let temp = tempdir().unwrap();
    let content = temp.path().join("content");
    fs::create_dir_all(content.join("tools")).unwrap();
    fs::write(content.join("tools/pipedrive.toml"), PIPEDRIVE).unwrap();
    fs::write(content.join("tools/hubspot.yaml"), HUBSPOT).unwrap();
    temp
}

fn toolhub(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("toolhub").unwrap();
    _ = cmd.current_dir(workdir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn build_writes_pages_and_redirect_stubs() {
    let temp = setup_site();
    let root = temp.path();

    _ = toolhub(root)
        .args(["build", "-c", "content", "-o", "public"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Built 4 page(s) and 2 redirect(s)"));

    let tool = fs::read_to_string(root.join("public/tools/pipedrive/index.html"))
        .unwrap();
    assert!(tool.contains("\"@type\":\"Product\""));
    assert!(tool.contains("\"@type\":\"FAQPage\""));
    assert!(tool.contains("<section id=\"pros\""));
    assert!(!tool.contains("<section id=\"cons\""));

    let stub =
        fs::read_to_string(root.join("public/tools/tag/CRM Tools/index.html"))
            .unwrap();
    assert!(stub.contains("window.location.replace(\"/tools/CRM%20Tools\")"));

    assert!(root.join("public/tools/CRM Tools/index.html").is_file());
    assert!(root.join("public/404.html").is_file());
}

#[test]
fn check_reports_catalog_counts() {
    let temp = setup_site();

    _ = toolhub(temp.path())
        .args(["check", "-c", "content"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Catalog OK: 2 tool(s) (1 dedicated), 0 comparison(s), 1 tag(s)",
        ));
}

#[test]
fn resolve_follows_route_precedence() {
    let temp = setup_site();
    let root = temp.path();

    let cases = [
        ("/tools", "hub"),
        ("/tools/pipedrive", "tool 'pipedrive' (dedicated route)"),
        ("/tools/hubspot", "tool 'hubspot' (generic route)"),
        ("/tools/crm%20tools", "listing 'CRM Tools' (2 tool(s))"),
        (
            "/tools/tag/CRM Tools",
            "redirect to /tools/CRM%20Tools (legacy_tag, replace history)",
        ),
        (
            "/tools/nothing-here",
            "redirect to /tools (not_found, replace history)",
        ),
        ("/tools/a/b/c", "redirect to /tools (not_found, replace history)"),
    ];

    for (path, expected) in cases {
        _ = toolhub(root)
            .args(["resolve", path, "-c", "content"])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected));
    }
}

#[test]
fn invalid_catalog_fails_with_issue_list() {
    let temp = setup_site();
    let root = temp.path();
    fs::write(
        root.join("content/tools/broken.toml"),
        "slug = \"broken\"\nname = \"Broken\"\nrating_value = 7.0\n",
    )
    .unwrap();

    _ = toolhub(root)
        .args(["check", "-c", "content"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("broken"));
}

#[test]
fn missing_content_dir_is_a_configuration_error() {
    let temp = tempdir().unwrap();

    _ = toolhub(temp.path())
        .args(["build", "-c", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("content directory does not exist"));
}
