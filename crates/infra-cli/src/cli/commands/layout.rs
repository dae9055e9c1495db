//! `infra layout <base>`: list the directory tree without creating it.

use infra_core::layout::Layout;
use std::path::Path;

pub fn run_layout(base: &Path) {
    for dir in Layout::new(base).directories() {
        println!("{}", dir.display());
    }
}
