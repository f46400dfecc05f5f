//! Project roots and the settings needed to reach the remote.
//!
//! A `Config` is normally read from a small YAML file:
//!
//! ```yaml
//! local_root: /home/lab/BioSci-McGrath
//! cloud_root: "cichlidVideo:/BioSci-McGrath"
//! tool:
//!   program: rclone
//!   flags: ["--config", "/home/lab/.config/rclone/rclone.conf"]
//! policy: strict
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, utils};
use crate::sync::{FailurePolicy, Rclone};

/// The pair of roots one project is mirrored between.
///
/// The cloud root is an rclone-style `remote:/path`; it is held as a path so the same
/// component-wise prefix algebra applies on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    local: PathBuf,
    cloud: PathBuf,
}

impl Roots {
    pub fn new<L: AsRef<Path>, C: AsRef<Path>>(local: L, cloud: C) -> Self {
        Self {
            local: utils::normalize(local),
            cloud: utils::normalize(cloud),
        }
    }

    pub fn local(&self) -> &Path {
        &self.local
    }

    pub fn cloud(&self) -> &Path {
        &self.cloud
    }

    pub fn rel_to_local<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        utils::join_rel(&self.local, rel.as_ref())
    }

    pub fn rel_to_cloud<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        utils::join_rel(&self.cloud, rel.as_ref())
    }

    /// Fails with `InvalidPath` unless `local` lies under the local root.
    pub fn local_to_rel<P: AsRef<Path>>(&self, local: P) -> Result<PathBuf> {
        Self::strip(local.as_ref(), &self.local, "local")
    }

    /// Fails with `InvalidPath` unless `cloud` lies under the cloud root.
    pub fn cloud_to_rel<P: AsRef<Path>>(&self, cloud: P) -> Result<PathBuf> {
        Self::strip(cloud.as_ref(), &self.cloud, "cloud")
    }

    pub fn local_to_cloud<P: AsRef<Path>>(&self, local: P) -> Result<PathBuf> {
        Ok(self.rel_to_cloud(self.local_to_rel(local)?))
    }

    pub fn cloud_to_local<P: AsRef<Path>>(&self, cloud: P) -> Result<PathBuf> {
        Ok(self.rel_to_local(self.cloud_to_rel(cloud)?))
    }

    fn strip(path: &Path, root: &Path, side: &str) -> Result<PathBuf> {
        let normalized = utils::normalize(path);
        normalized
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                Error::invalid_path(
                    path,
                    format!("not under the {side} root {}", root.display()),
                )
            })
    }
}

/// Settings for the external sync utility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "ToolConfig::default_program")]
    pub program: PathBuf,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl ToolConfig {
    fn default_program() -> PathBuf {
        PathBuf::from("rclone")
    }

    pub fn build(&self) -> Rclone {
        Rclone::new(&self.program).with_flags(self.flags.iter().cloned())
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: Self::default_program(),
            flags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub local_root: PathBuf,
    pub cloud_root: PathBuf,
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub policy: FailurePolicy,
}

impl Config {
    pub fn new<L: Into<PathBuf>, C: Into<PathBuf>>(local_root: L, cloud_root: C) -> Self {
        Self {
            local_root: local_root.into(),
            cloud_root: cloud_root.into(),
            tool: ToolConfig::default(),
            policy: FailurePolicy::default(),
        }
    }

    /// Loads and validates a YAML configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.local_root.is_absolute() {
            bail!("local_root must be absolute: {}", self.local_root.display());
        }
        if self.cloud_root.as_os_str().is_empty() {
            bail!("cloud_root must not be empty");
        }
        if self.roots().local() == self.roots().cloud() {
            bail!("local_root and cloud_root must differ");
        }
        if self.tool.program.as_os_str().is_empty() {
            bail!("tool.program must not be empty");
        }
        Ok(())
    }

    pub fn roots(&self) -> Roots {
        Roots::new(&self.local_root, &self.cloud_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn roots() -> Roots {
        Roots::new("/home/lab/proj", "remote:/proj")
    }

    mod translation {
        use super::*;

        #[test]
        fn test_rel_to_each_side() {
            let roots = roots();
            assert_eq!(roots.rel_to_local("a/b.txt"), PathBuf::from("/home/lab/proj/a/b.txt"));
            assert_eq!(roots.rel_to_cloud("a/b.txt"), PathBuf::from("remote:/proj/a/b.txt"));
        }

        #[test]
        fn test_rel_to_local_uses_local_root() {
            let roots = roots();
            assert!(roots.rel_to_local("x").starts_with(roots.local()));
            assert!(!roots.rel_to_local("x").starts_with(roots.cloud()));
        }

        #[test]
        fn test_to_rel() -> Result<()> {
            let roots = roots();
            assert_eq!(roots.local_to_rel("/home/lab/proj/a/b")?, PathBuf::from("a/b"));
            assert_eq!(roots.cloud_to_rel("remote:/proj/a/b")?, PathBuf::from("a/b"));
            assert_eq!(roots.local_to_rel("/home/lab/proj")?, PathBuf::new());
            Ok(())
        }

        #[test]
        fn test_cross_translation() -> Result<()> {
            let roots = roots();
            assert_eq!(
                roots.local_to_cloud("/home/lab/proj/v/clip.mp4")?,
                PathBuf::from("remote:/proj/v/clip.mp4")
            );
            assert_eq!(
                roots.cloud_to_local("remote:/proj/v/clip.mp4")?,
                PathBuf::from("/home/lab/proj/v/clip.mp4")
            );
            Ok(())
        }

        #[test]
        fn test_not_a_descendant() {
            let roots = roots();
            assert!(matches!(
                roots.local_to_rel("/home/lab/other/a"),
                Err(Error::InvalidPath { .. })
            ));
            assert!(matches!(
                roots.cloud_to_rel("remote:/other/a"),
                Err(Error::InvalidPath { .. })
            ));
            // textual prefix is not enough
            assert!(roots.local_to_rel("/home/lab/project2/a").is_err());
            assert!(roots.local_to_rel("/home/lab/proj/../other").is_err());
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn test_from_yaml_with_defaults() {
            let config = Config::from_yaml(
                "local_root: /data/proj\ncloud_root: \"remote:/proj\"\n",
            )
            .unwrap();
            assert_eq!(config.local_root, PathBuf::from("/data/proj"));
            assert_eq!(config.tool, ToolConfig::default());
            assert_eq!(config.policy, FailurePolicy::Strict);
            assert_eq!(config.roots(), Roots::new("/data/proj", "remote:/proj"));
        }

        #[test]
        fn test_from_yaml_full() {
            let config = Config::from_yaml(
                r#"
local_root: /data/proj
cloud_root: "remote:/proj"
tool:
  program: /usr/local/bin/rclone
  flags: ["--config", "/etc/rclone.conf"]
policy: lenient
"#,
            )
            .unwrap();
            assert_eq!(config.tool.program, PathBuf::from("/usr/local/bin/rclone"));
            assert_eq!(config.tool.flags, vec!["--config", "/etc/rclone.conf"]);
            assert_eq!(config.policy, FailurePolicy::Lenient);
            assert_eq!(config.tool.build().program(), Path::new("/usr/local/bin/rclone"));
        }

        #[test]
        fn test_validation() {
            assert!(Config::from_yaml("local_root: rel/proj\ncloud_root: \"r:/p\"\n").is_err());
            assert!(Config::from_yaml("local_root: /p\ncloud_root: \"\"\n").is_err());
            assert!(Config::from_yaml("local_root: /p\ncloud_root: /p/\n").is_err());
            assert!(Config::new("/p", "r:/p").validate().is_ok());
        }

        #[test]
        fn test_load_from_file() {
            let temp_dir = TempDir::new("config_test").unwrap();
            let file = temp_dir.path().join("dualpath.yaml");
            std::fs::write(&file, "local_root: /data/proj\ncloud_root: \"remote:/proj\"\n")
                .unwrap();

            let config = Config::load(&file).unwrap();
            assert_eq!(config.cloud_root, PathBuf::from("remote:/proj"));

            let missing = Config::load(&temp_dir.path().join("missing.yaml"));
            assert!(missing.is_err());
        }
    }
}
