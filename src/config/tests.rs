use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_playdeck_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", "/tmp/playdeck-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/playdeck-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("playdeck")
            .join("config.toml")
    );
}

#[test]
fn default_paths_fall_back_to_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.config/playdeck/config.toml")
    );
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/playdeck/playdeck.log")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
shuffle = true
repeat = true
volume = 80

[audio]
tick_ms = 100
fetch_timeout_secs = 3
quit_fade_out_ms = 0

[api]
base_url = "http://localhost:9000/v1"
access_token = "abc"
market = "UZ"

[controls]
volume_step = 10

[ui]
follow_playback = false
header_text = "hello"
now_playing_track_fields = ["artist", "title", "album"]
now_playing_track_separator = " • "
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " | "

[library]
extensions = ["mp3"]
recursive = false

[log]
level = "debug"
file = "/tmp/playdeck.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("PLAYDECK__PLAYBACK__VOLUME");

    let s = Settings::load().unwrap();
    assert!(s.playback.shuffle);
    assert!(s.playback.repeat);
    assert_eq!(s.playback.volume, 80);
    assert_eq!(s.audio.tick_ms, 100);
    assert_eq!(s.audio.fetch_timeout_secs, 3);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.api.base_url, "http://localhost:9000/v1");
    assert_eq!(s.api.access_token.as_deref(), Some("abc"));
    assert_eq!(s.api.market.as_deref(), Some("UZ"));
    assert_eq!(s.controls.volume_step, 10);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(
        s.ui.now_playing_track_fields,
        vec![
            TrackDisplayField::Artists,
            TrackDisplayField::Name,
            TrackDisplayField::Album
        ]
    );
    assert_eq!(s.ui.now_playing_track_separator, " • ");
    assert_eq!(
        s.ui.now_playing_time_fields,
        vec![TimeField::Elapsed, TimeField::Remaining]
    );
    assert_eq!(s.ui.now_playing_time_separator, " | ");
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert_eq!(s.log.level, "debug");
    assert_eq!(
        s.log.file.as_deref(),
        Some(std::path::Path::new("/tmp/playdeck.log"))
    );
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
volume = 20
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("PLAYDECK__PLAYBACK__VOLUME", "65");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.volume, 65);
}

#[test]
fn validate_rejects_zero_tick_and_bad_volume_step() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.audio.tick_ms = 0;
    assert!(s.validate().is_err());

    s.audio.tick_ms = 250;
    s.controls.volume_step = 0;
    assert!(s.validate().is_err());

    s.controls.volume_step = 101;
    assert!(s.validate().is_err());
}
