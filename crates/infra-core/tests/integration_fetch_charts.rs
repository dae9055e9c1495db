//! End-to-end chart bootstrap against a scripted helm: layout, pull, extract, cleanup.

mod common;

use common::FakeHelm;
use infra_core::chart::{ChartFetcher, FetchEvent};
use infra_core::layout::Layout;
use std::fs;
use tempfile::tempdir;

const TOOL_LIST: &str = "\
# charts bootstrapped into tools/
helm repo add bitnami https://charts.bitnami.com/bitnami redis
helm repo add grafana https://grafana.github.io/helm-charts

helm repo add hashicorp https://helm.releases.hashicorp.com vault
helm repo update
";

#[test]
fn fetches_extracts_and_cleans_up() {
    let base = tempdir().unwrap();
    Layout::new(base.path()).create().unwrap();
    fs::create_dir_all(base.path().join("list-tools/argocd")).unwrap();

    let list = base.path().join("list-tools.txt");
    fs::write(&list, TOOL_LIST).unwrap();

    let helm = FakeHelm::default()
        .with_chart("redis", "18.1.0", &[("Chart.yaml", b"name: redis\n")])
        .with_chart(
            "vault",
            "0.27.0",
            &[("Chart.yaml", b"name: vault\n"), ("templates/server.yaml", b"kind: StatefulSet\n")],
        );
    let fetcher = ChartFetcher::new(base.path(), helm);

    let mut events = Vec::new();
    let report = fetcher
        .add_and_pull_charts_with(&list, |ev| {
            events.push(match ev {
                FetchEvent::AddingRepo(r) => format!("add {}", r.repo_name),
                FetchEvent::PullingChart(r) => format!("pull {}", r.chart_name),
                FetchEvent::Installed(c) => format!("ok {}", c.repo.chart_name),
                FetchEvent::Failed(f) => format!("fail {}", f.line_no),
            })
        })
        .unwrap();

    assert_eq!(
        events,
        [
            "add bitnami",
            "pull redis",
            "ok redis",
            "fail 3",
            "add hashicorp",
            "pull vault",
            "ok vault",
        ]
    );

    assert_eq!(report.installed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(!report.is_clean());
    assert!(report.failed[0].error.starts_with("invalid repo line"));
    assert!(report.list_tools_removed);
    assert!(!base.path().join("list-tools").exists());
    // the layout's own tools/list-tools tree is left alone
    assert!(base.path().join("tools/list-tools/argocd").is_dir());

    let tools = base.path().join("tools");
    assert_eq!(
        fs::read(tools.join("redis/Chart.yaml")).unwrap(),
        b"name: redis\n"
    );
    assert!(tools.join("vault/templates/server.yaml").is_file());
    assert!(!tools.join("redis-18.1.0.tgz").exists());
    assert!(!tools.join("vault-0.27.0.tgz").exists());

    let vault = &report.installed[1];
    assert_eq!(vault.archive, "vault-0.27.0.tgz");
    assert_eq!(vault.sha256.len(), 64);
    assert_eq!(vault.extracted.files, 2);
}

#[test]
fn helm_failures_do_not_stop_the_run() {
    let base = tempdir().unwrap();
    let list = base.path().join("tools.txt");
    fs::write(
        &list,
        "helm repo add broken https://example.invalid/charts kafka\n\
         helm repo add bitnami https://charts.bitnami.com/bitnami mongodb\n\
         helm repo add bitnami https://charts.bitnami.com/bitnami elasticsearch\n",
    )
    .unwrap();

    let helm = FakeHelm::default()
        .failing_repo("broken")
        .with_chart("mongodb", "14.0.0", &[("values.yaml", b"auth: {}\n")]);
    let fetcher = ChartFetcher::new(base.path(), helm);
    let report = fetcher.add_and_pull_charts(&list).unwrap();

    assert_eq!(report.installed.len(), 1);
    assert_eq!(report.installed[0].repo.chart_name, "mongodb");
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed[0].error.contains("error adding repo broken"));
    assert!(report.failed[0].error.contains("repository unreachable"));
    // pull "succeeded" but wrote nothing
    assert!(report.failed[1]
        .error
        .contains("no .tgz file found for chart elasticsearch"));
    assert!(!report.list_tools_removed);
    assert!(base.path().join("tools/mongodb/values.yaml").is_file());
}

#[test]
fn missing_tool_list_is_fatal() {
    let base = tempdir().unwrap();
    let fetcher = ChartFetcher::new(base.path(), FakeHelm::default());
    let err = fetcher
        .add_and_pull_charts(&base.path().join("absent.txt"))
        .unwrap_err();
    assert!(format!("{err:#}").contains("error opening file"));
}

#[cfg(unix)]
#[test]
fn unreadable_tool_list_is_fatal() {
    let base = tempdir().unwrap();
    // opening a directory succeeds on unix; reading it fails with EISDIR
    let list = base.path().join("charts.d");
    fs::create_dir(&list).unwrap();
    fs::create_dir_all(base.path().join("list-tools")).unwrap();

    let fetcher = ChartFetcher::new(base.path(), FakeHelm::default());
    let err = fetcher.add_and_pull_charts(&list).unwrap_err();
    assert!(format!("{err:#}").contains("error reading file"), "{err:#}");
    // the run aborted before cleanup
    assert!(base.path().join("list-tools").is_dir());
}

#[cfg(unix)]
#[test]
fn failed_list_tools_removal_is_fatal() {
    let base = tempdir().unwrap();
    let list = base.path().join("tools.txt");
    fs::write(&list, "# nothing to install\n").unwrap();
    // a regular file where the directory is expected cannot be removed as a tree
    fs::write(base.path().join("list-tools"), b"not a directory").unwrap();

    let fetcher = ChartFetcher::new(base.path(), FakeHelm::default());
    let err = fetcher.add_and_pull_charts(&list).unwrap_err();
    assert!(format!("{err:#}").contains("error removing"), "{err:#}");
}

#[test]
fn non_utf8_lines_do_not_abort_the_run() {
    let base = tempdir().unwrap();
    let list = base.path().join("tools.txt");
    let mut contents = b"# caf\xe9 charts\r\n".to_vec();
    contents.extend_from_slice(b"helm repo add bitnami https://charts.bitnami.com/bitnami redis\r\n");
    fs::write(&list, contents).unwrap();
    fs::create_dir_all(base.path().join("list-tools")).unwrap();

    let helm = FakeHelm::default().with_chart("redis", "18.1.0", &[("Chart.yaml", b"name: redis\n")]);
    let fetcher = ChartFetcher::new(base.path(), helm);
    let report = fetcher.add_and_pull_charts(&list).unwrap();

    assert!(report.is_clean(), "{:?}", report.failed);
    assert_eq!(report.installed.len(), 1);
    assert_eq!(report.installed[0].repo.chart_name, "redis");
    assert!(report.list_tools_removed);
}

#[test]
fn report_serializes_flat_chart_fields() {
    let base = tempdir().unwrap();
    let list = base.path().join("tools.txt");
    fs::write(
        &list,
        "helm repo add hashicorp https://helm.releases.hashicorp.com vault\n\
         helm repo add short https://example.com\n",
    )
    .unwrap();

    let helm = FakeHelm::default().with_chart("vault", "0.27.0", &[("Chart.yaml", b"name: vault\n")]);
    let report = ChartFetcher::new(base.path(), helm)
        .add_and_pull_charts(&list)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let chart = &json["installed"][0];
    assert_eq!(chart["repo_name"], "hashicorp");
    assert_eq!(chart["repo_url"], "https://helm.releases.hashicorp.com");
    assert_eq!(chart["chart_name"], "vault");
    assert_eq!(chart["archive"], "vault-0.27.0.tgz");
    assert_eq!(chart["extracted"]["files"], 1);
    assert_eq!(chart["extracted"]["directories"], 1);
    assert!(chart.get("repo").is_none());

    let failed = &json["failed"][0];
    assert_eq!(failed["line_no"], 2);
    assert_eq!(failed["line"], "helm repo add short https://example.com");
    assert_eq!(json["list_tools_removed"], false);
}
