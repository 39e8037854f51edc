use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A packaging tree and a linux-firmware checkout side by side:
///
/// ```text
/// <tmp>/firmware-nonfree/{debian/rules.defs, defines, <packages>/}
/// <tmp>/linux-firmware/{WHENCE, <files>}
/// ```
pub struct TestTree {
    pub dir: TempDir,
    pub binary_path: String,
}

impl TestTree {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let binary_path = env!("CARGO_BIN_EXE_check-upstream").to_string();

        let tree = Self { dir, binary_path };
        fs::create_dir_all(tree.packaging().join("debian")).unwrap();
        fs::create_dir_all(tree.upstream()).unwrap();
        tree.write_packaging("debian/rules.defs", "KERNELVERSION := 6.6.0-1\n");
        tree
    }

    pub fn packaging(&self) -> PathBuf {
        self.dir.path().join("firmware-nonfree")
    }

    pub fn upstream(&self) -> PathBuf {
        self.dir.path().join("linux-firmware")
    }

    pub fn write_packaging(&self, relative: &str, content: &str) {
        write_file(&self.packaging().join(relative), content);
    }

    pub fn write_upstream(&self, relative: &str, content: &str) {
        write_file(&self.upstream().join(relative), content);
    }

    pub fn write_defines(&self, packages: &[&str], exclude: &[&str]) {
        let mut defines = String::from("[base]\npackages:\n");
        for package in packages {
            defines.push_str(&format!(" {}\n", package));
            fs::create_dir_all(self.packaging().join(package)).unwrap();
        }
        if !exclude.is_empty() {
            defines.push_str("\n[upstream]\nexclude:\n");
            for pattern in exclude {
                defines.push_str(&format!(" {}\n", pattern));
            }
        }
        self.write_packaging("defines", &defines);
    }

    /// Runs the checker from the packaging root, as the packaging scripts do.
    pub fn run_checker(&self, args: &[&str]) -> std::process::Output {
        Command::new(&self.binary_path)
            .arg(self.upstream())
            .args(args)
            .current_dir(self.packaging())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run check-upstream")
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

const SEPARATOR: &str =
    "--------------------------------------------------------------------------\n";

/// Builds a WHENCE manifest, one `Driver:` section per call.
pub struct Whence {
    text: String,
}

impl Whence {
    pub fn new() -> Self {
        let mut text =
            String::from("This file attempts to document the origin and licensing information\n");
        text.push_str(SEPARATOR);
        Self { text }
    }

    pub fn section(mut self, driver: &str, licence: &str, files: &[&str]) -> Self {
        self.text.push_str(&format!("\nDriver: {} - test driver\n\n", driver));
        for file in files {
            self.text.push_str(&format!("File: {}\n", file));
        }
        self.text.push_str(&format!("\nLicence: {}\n\n", licence));
        self.text.push_str(SEPARATOR);
        self
    }

    pub fn build(self) -> String {
        self.text
    }
}
