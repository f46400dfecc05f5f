//! In-process stand-in for rclone used by the unit tests.
//! Cloud paths under `cloud_root` are served from a local `backing` directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tempdir::TempDir;

use super::{EXIT_DIR_NOT_FOUND, SyncTool, ToolOutput};
use crate::Context;
use crate::config::Roots;
use crate::core::Result;

pub(crate) const CLOUD_ROOT: &str = "remote:/proj";

pub(crate) struct FakeRemote {
    cloud_root: PathBuf,
    backing: PathBuf,
    failing: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub(crate) fn new<P: Into<PathBuf>>(cloud_root: &str, backing: P) -> Self {
        Self {
            cloud_root: PathBuf::from(cloud_root),
            backing: backing.into(),
            failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every following invocation exits with code 1.
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn backing(&self) -> &Path {
        &self.backing
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.cloud_root) {
            Ok(rel) => self.backing.join(rel),
            Err(_) => path.to_path_buf(),
        }
    }

    fn record(&self, command: String) -> String {
        self.calls.lock().unwrap().push(command.clone());
        command
    }

    fn finish(command: String, code: i32, stdout: String, stderr: &str) -> Result<ToolOutput> {
        Ok(ToolOutput {
            command,
            code: Some(code),
            stdout,
            stderr: stderr.to_string(),
        })
    }
}

impl SyncTool for FakeRemote {
    fn list(&self, path: &Path, dirs_only: bool) -> Result<ToolOutput> {
        let flag = if dirs_only { " --dirs-only" } else { "" };
        let command = self.record(format!("fake lsf{flag} {}", path.display()));
        if self.failing.load(Ordering::SeqCst) {
            return Self::finish(command, 1, String::new(), "simulated failure");
        }

        let host = self.resolve(path);
        if host.is_file() {
            let name = host.file_name().unwrap().to_string_lossy().into_owned();
            let stdout = if dirs_only { String::new() } else { format!("{name}\n") };
            return Self::finish(command, 0, stdout, "");
        }
        if !host.is_dir() {
            return Self::finish(command, EXIT_DIR_NOT_FOUND, String::new(), "directory not found");
        }

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&host)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                names.push(format!("{name}/"));
            } else if !dirs_only {
                names.push(name);
            }
        }
        names.sort();
        let stdout: String = names.iter().map(|name| format!("{name}\n")).collect();
        Self::finish(command, 0, stdout, "")
    }

    fn copy(&self, source: &Path, dest: &Path) -> Result<ToolOutput> {
        let command = self.record(format!("fake copy {} {}", source.display(), dest.display()));
        if self.failing.load(Ordering::SeqCst) {
            return Self::finish(command, 1, String::new(), "simulated failure");
        }

        let from = self.resolve(source);
        let to = self.resolve(dest);
        if from.is_file() {
            fs::create_dir_all(&to)?;
            fs::copy(&from, to.join(from.file_name().unwrap()))?;
        } else if from.is_dir() {
            copy_contents(&from, &to)?;
        } else {
            return Self::finish(command, EXIT_DIR_NOT_FOUND, String::new(), "directory not found");
        }
        Self::finish(command, 0, String::new(), "")
    }
}

fn copy_contents(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_contents(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

/// A scratch workspace: `<tmp>/local` is the local root, `<tmp>/cloud` backs `remote:/proj`.
pub(crate) struct Fixture {
    pub(crate) tmp: TempDir,
    pub(crate) ctx: Arc<Context>,
    pub(crate) remote: Arc<FakeRemote>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let tmp = TempDir::new("dualpath_test").unwrap();
        let local = tmp.path().join("local");
        let cloud = tmp.path().join("cloud");
        fs::create_dir_all(&local).unwrap();
        fs::create_dir_all(&cloud).unwrap();

        let remote = Arc::new(FakeRemote::new(CLOUD_ROOT, cloud));
        let ctx = Arc::new(Context::new(Roots::new(local, CLOUD_ROOT), remote.clone()));
        Self { tmp, ctx, remote }
    }

    pub(crate) fn local_root(&self) -> PathBuf {
        self.tmp.path().join("local")
    }

    pub(crate) fn cloud_dir(&self) -> &Path {
        self.remote.backing()
    }

    /// Creates a file on the fake remote, with parents.
    pub(crate) fn put_cloud_file(&self, rel: &str, content: &[u8]) {
        let path = self.cloud_dir().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub(crate) fn put_cloud_dir(&self, rel: &str) {
        fs::create_dir_all(self.cloud_dir().join(rel)).unwrap();
    }

    pub(crate) fn put_local_file(&self, rel: &str, content: &[u8]) {
        let path = self.local_root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a thread-local subscriber and returns its result with everything logged.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}
