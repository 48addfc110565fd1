#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

pub mod temp_files {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    /// A manifest written into its own temporary directory.
    ///
    /// The directory (and everything written next to the manifest) is removed on drop.
    pub struct TempManifest {
        dir: TempDir,
        path: PathBuf,
    }

    impl TempManifest {
        pub fn path(&self) -> &Path {
            &self.path
        }

        pub fn dir(&self) -> &Path {
            self.dir.path()
        }

        /// A sibling path inside the same temporary directory.
        pub fn sibling(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        pub fn rewrite(&self, content: &str) {
            std::fs::write(&self.path, content).unwrap();
        }
    }

    pub fn create_temp_manifest(content: &str, ext: &str) -> TempManifest {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("routes.{ext}"));
        std::fs::write(&path, content).unwrap();
        TempManifest { dir, path }
    }

    pub fn create_temp_yaml(content: &str) -> TempManifest {
        create_temp_manifest(content, "yaml")
    }
}

pub const BLOG_YAML: &str = r#"routes:
  - uri: /post/{year}/{slug?}
    name: post.show
    methods:
      GET: PostController
    where:
      year: "[0-9]{4}"
    middlewares: [auth, cache]
  - uri: /user/{id}
    name: user.show
    methods:
      GET: UserController
      DELETE: UserDeleteController
  - uri: /user/me
    methods:
      GET: MeController
  - uri: /
    name: home
"#;
