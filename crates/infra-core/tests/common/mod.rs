//! Shared helpers: a scripted `HelmRunner` and an in-memory chart archive builder.

use flate2::write::GzEncoder;
use flate2::Compression;
use infra_core::chart::{HelmError, HelmRunner};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Gzip tar with a `<chart>/` directory and the given files beneath it.
pub fn chart_tgz(chart: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    {
        let mut builder = tar::Builder::new(&mut encoder);
        let mut dir = tar::Header::new_gnu();
        dir.set_entry_type(tar::EntryType::Directory);
        dir.set_mode(0o755);
        dir.set_size(0);
        builder
            .append_data(&mut dir, format!("{chart}/"), io::empty())
            .unwrap();
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_mode(0o644);
            header.set_size(data.len() as u64);
            builder
                .append_data(&mut header, format!("{chart}/{name}"), *data)
                .unwrap();
        }
        builder.finish().unwrap();
    }
    encoder.finish().unwrap()
}

/// Records every call; `pull` writes a prepared archive into the destination.
#[derive(Default)]
pub struct FakeHelm {
    pub calls: RefCell<Vec<String>>,
    /// chart name -> (archive file name, archive bytes)
    pub archives: HashMap<String, (String, Vec<u8>)>,
    /// repo names whose `repo add` fails
    pub failing_repos: Vec<String>,
}

impl FakeHelm {
    pub fn with_chart(mut self, chart: &str, version: &str, files: &[(&str, &[u8])]) -> Self {
        self.archives.insert(
            chart.to_string(),
            (format!("{chart}-{version}.tgz"), chart_tgz(chart, files)),
        );
        self
    }

    pub fn failing_repo(mut self, repo: &str) -> Self {
        self.failing_repos.push(repo.to_string());
        self
    }
}

impl HelmRunner for FakeHelm {
    fn repo_add(&self, name: &str, url: &str) -> Result<(), HelmError> {
        self.calls.borrow_mut().push(format!("repo add {name} {url}"));
        if self.failing_repos.iter().any(|r| r == name) {
            return Err(HelmError::Spawn {
                command: format!("helm repo add {name} {url}"),
                source: io::Error::new(io::ErrorKind::Other, "repository unreachable"),
            });
        }
        Ok(())
    }

    fn pull(&self, repo: &str, chart: &str, destination: &Path) -> Result<(), HelmError> {
        self.calls
            .borrow_mut()
            .push(format!("pull {repo}/{chart} --destination {}", destination.display()));
        if let Some((name, bytes)) = self.archives.get(chart) {
            std::fs::write(destination.join(name), bytes).unwrap();
        }
        Ok(())
    }
}
