//! Shared helpers for kernel integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;
use vetrina_kernel::config::Config;
use vetrina_kernel::state::AppState;

static TEST_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Temporary directory removed on drop.
pub struct TestDir(PathBuf);

impl TestDir {
    pub fn new(name: &str) -> Self {
        let n = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir()
            .join(format!("vetrina_test_{name}_{n}_{}", std::process::id()));
        // Remove leftovers from a previous run, if any
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn write(&self, filename: &str, contents: impl AsRef<[u8]>) {
        std::fs::write(self.0.join(filename), contents).unwrap();
    }
}

impl Deref for TestDir {
    type Target = Path;
    fn deref(&self) -> &Path {
        &self.0
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

pub const CROP_16X9: &str = "\
id: crop_16x9
label: Crop 16:9
effects:
  - type: crop
    width: 1600
    height: 900
";

pub const CROP_4X3: &str = "\
id: crop_4x3
label: Crop 4:3
effects:
  - type: crop
    width: 800
    height: 600
";

pub const WIDE_BANNER: &str = r#"
id: wide_banner
label: Wide banner
breakpoint_group: default_theme
fallback_image_style: crop_4x3
image_style_mappings:
  - breakpoint_id: default_theme.wide
    media_query: "(min-width: 960px)"
    image_mapping:
      type: image_style
      image_style: crop_16x9
  - breakpoint_id: default_theme.narrow
    image_mapping:
      type: image_style
      image_style: crop_4x3
"#;

pub const UNMAPPED: &str = "\
id: unmapped
label: Unmapped
";

/// File ID used by [`write_site_config`].
pub fn banner_id() -> Uuid {
    Uuid::parse_str("0190a1b2-0000-7000-8000-000000000001").unwrap()
}

/// Write a small site: two image styles, two responsive styles, one file.
pub fn write_site_config(dir: &TestDir) {
    dir.write("image.style.crop_16x9.yml", CROP_16X9);
    dir.write("image.style.crop_4x3.yml", CROP_4X3);
    dir.write("responsive_image.styles.wide_banner.yml", WIDE_BANNER);
    dir.write("responsive_image.styles.unmapped.yml", UNMAPPED);
    dir.write(
        &format!("file.{}.yml", banner_id()),
        &format!(
            "id: {}\nfilename: banner.jpg\nuri: public://images/banner.jpg\nfilemime: image/jpeg\n",
            banner_id()
        ),
    );
}

/// State loaded from `dir` with default URLs and templates.
pub async fn state_from(dir: &TestDir) -> AppState {
    let config = Config {
        config_dir: Some(dir.to_path_buf()),
        ..Config::default()
    };
    AppState::new(&config).await.unwrap()
}
