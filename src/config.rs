use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::knowledge::UserLevel;

/// 設定ファイル全体
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub coaching: CoachingConfig,
    #[serde(default)]
    pub pose: PoseConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// セッション設定
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// 種目ID (e.g. "overhead-press")
    #[serde(default = "default_exercise")]
    pub exercise: String,
    /// 検出ティック間隔（ミリ秒）
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// ユーザーレベル (beginner / intermediate / advanced)
    #[serde(default = "default_user_level")]
    pub user_level: String,
}

fn default_exercise() -> String { "overhead-press".to_string() }
fn default_tick_ms() -> u64 { 100 }
fn default_user_level() -> String { "beginner".to_string() }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exercise: default_exercise(),
            tick_ms: default_tick_ms(),
            user_level: default_user_level(),
        }
    }
}

impl SessionConfig {
    /// ティック間隔
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// 不明なレベル名はbeginner扱い
    pub fn level(&self) -> UserLevel {
        UserLevel::from_name(&self.user_level).unwrap_or(UserLevel::Beginner)
    }
}

/// コーチング設定
#[derive(Debug, Deserialize, Clone)]
pub struct CoachingConfig {
    /// 発話の最小間隔（ミリ秒）
    #[serde(default = "default_speech_cooldown_ms")]
    pub speech_cooldown_ms: u64,
    /// レップ判定の最小間隔（ミリ秒）
    #[serde(default = "default_rep_debounce_ms")]
    pub rep_debounce_ms: u64,
    /// シミュレータの1セットあたりレップ数
    #[serde(default = "default_reps_per_set")]
    pub reps_per_set: u32,
}

fn default_speech_cooldown_ms() -> u64 { 3000 }
fn default_rep_debounce_ms() -> u64 { 1000 }
fn default_reps_per_set() -> u32 { 8 }

impl Default for CoachingConfig {
    fn default() -> Self {
        Self {
            speech_cooldown_ms: default_speech_cooldown_ms(),
            rep_debounce_ms: default_rep_debounce_ms(),
            reps_per_set: default_reps_per_set(),
        }
    }
}

impl CoachingConfig {
    pub fn speech_cooldown(&self) -> Duration {
        Duration::from_millis(self.speech_cooldown_ms)
    }

    pub fn rep_debounce(&self) -> Duration {
        Duration::from_millis(self.rep_debounce_ms)
    }
}

/// ポーズ入力設定
#[derive(Debug, Deserialize, Clone)]
pub struct PoseConfig {
    /// この可視度未満のランドマークは角度計算・描画に使わない
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,
    /// 合成ポーズのシード（未指定ならランダム）
    #[serde(default)]
    pub seed: Option<u64>,
    /// プレス1サイクルの秒数
    #[serde(default = "default_cycle_secs")]
    pub cycle_secs: f32,
}

fn default_visibility_threshold() -> f32 { 0.5 }
fn default_cycle_secs() -> f32 { 3.0 }

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: default_visibility_threshold(),
            seed: None,
            cycle_secs: default_cycle_secs(),
        }
    }
}

/// 音声設定
#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    /// 音声フィードバックの有効/無効
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 音声ID
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    /// 話速 (0.5 - 2.0)
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// 声の安定度 (0.0 - 1.0)
    #[serde(default = "default_stability")]
    pub stability: f32,
    /// 明瞭度 (0.0 - 1.0)
    #[serde(default = "default_clarity")]
    pub clarity: f32,
    /// 発話ごとに推定時間だけブロックする
    #[serde(default)]
    pub simulate_duration: bool,
}

fn default_true() -> bool { true }
fn default_voice_id() -> String { "ErXwobaYiN019PkySvjV".to_string() }
fn default_speed() -> f32 { 1.0 }
fn default_stability() -> f32 { 0.8 }
fn default_clarity() -> f32 { 0.9 }

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            voice_id: default_voice_id(),
            speed: default_speed(),
            stability: default_stability(),
            clarity: default_clarity(),
            simulate_duration: false,
        }
    }
}

/// 履歴保存設定
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// ワークアウト履歴の保存先パス
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String { "workouts.json".to_string() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// オーバーレイ描画設定
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// 出力画像の幅（ピクセル）
    #[serde(default = "default_width")]
    pub width: u32,
    /// 出力画像の高さ（ピクセル）
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 { 640 }
fn default_height() -> u32 { 480 }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Config {
    /// TOMLファイルから読み込み
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// 読み込み失敗時は警告を出してデフォルト設定を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("config not loaded, using defaults: {:#}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.session.exercise, "overhead-press");
        assert_eq!(config.session.tick_ms, 100);
        assert_eq!(config.coaching.speech_cooldown_ms, 3000);
        assert_eq!(config.coaching.rep_debounce_ms, 1000);
        assert_eq!(config.pose.visibility_threshold, 0.5);
        assert_eq!(config.pose.seed, None);
        assert!(config.speech.enabled);
        assert_eq!(config.speech.voice_id, "ErXwobaYiN019PkySvjV");
        assert_eq!(config.storage.path, "workouts.json");
        assert_eq!((config.render.width, config.render.height), (640, 480));
    }

    #[test]
    fn test_partial_section() {
        let config: Config = toml::from_str(
            r#"
            [session]
            exercise = "boxing-combo"
            user_level = "Advanced"

            [pose]
            seed = 42

            [speech]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.session.exercise, "boxing-combo");
        assert_eq!(config.session.tick_ms, 100);
        assert_eq!(config.session.level(), UserLevel::Advanced);
        assert_eq!(config.pose.seed, Some(42));
        assert_eq!(config.pose.cycle_secs, 3.0);
        assert!(!config.speech.enabled);
        assert_eq!(config.speech.speed, 1.0);
    }

    #[test]
    fn test_unknown_level_is_beginner() {
        let session = SessionConfig {
            user_level: "olympian".to_string(),
            ..SessionConfig::default()
        };
        assert_eq!(session.level(), UserLevel::Beginner);
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load("/nonexistent/fitform.toml").is_err());
        let config = Config::load_or_default("/nonexistent/fitform.toml");
        assert_eq!(config.session.exercise, "overhead-press");
    }

    #[test]
    fn test_malformed_file() {
        let path = std::env::temp_dir().join(format!("fitform-config-{}.toml", std::process::id()));
        fs::write(&path, "[session\nexercise = ").unwrap();
        assert!(Config::load(&path).is_err());
        let config = Config::load_or_default(&path);
        assert_eq!(config.coaching.speech_cooldown(), Duration::from_secs(3));
        let _ = fs::remove_file(&path);
    }
}
