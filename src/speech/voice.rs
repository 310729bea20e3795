//! 音声出力（`Speaker`、音声設定、発話キュー）

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::analysis::Priority;
use crate::config::SpeechConfig;

/// デフォルトの音声ID
pub const DEFAULT_VOICE_ID: &str = "ErXwobaYiN019PkySvjV";

/// キーごとの定型コーチングフレーズ
pub const PHRASES: &[(&str, &str)] = &[
    ("good_form", "Great form! Keep it up!"),
    ("rep_complete", "Rep complete! Nice work!"),
    ("elbow_position", "Keep your elbows higher"),
    ("shoulder_level", "Keep your shoulders level"),
    ("core_engaged", "Remember to keep your core tight"),
    ("full_extension", "Great full extension!"),
    ("control_movement", "Focus on controlled movement"),
    ("breathe", "Don't forget to breathe"),
    ("setup_position", "Good setup position"),
    ("finish_strong", "Finish strong!"),
];

/// このプレフィックスのキーは緊急扱い（発話を中断）
pub const SAFETY_PREFIX: &str = "safety_";

/// キーから定型フレーズを引く
pub fn phrase(key: &str) -> Option<&'static str> {
    PHRASES.iter().find(|(k, _)| *k == key).map(|(_, text)| *text)
}

/// 音声合成の設定
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub voice_id: String,
    pub speed: f32,
    pub stability: f32,
    pub clarity: f32,
}

impl VoiceSettings {
    /// 設定から生成（範囲外の値はクランプ）
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            voice_id: config.voice_id.clone(),
            speed: config.speed.clamp(0.5, 2.0),
            stability: config.stability.clamp(0.0, 1.0),
            clarity: config.clarity.clamp(0.0, 1.0),
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice_id: DEFAULT_VOICE_ID.to_string(),
            speed: 1.0,
            stability: 0.8,
            clarity: 0.9,
        }
    }
}

/// 音声合成バックエンド（`speak`は発話完了まで戻らない）
pub trait Speaker {
    /// 1発話を再生
    fn speak(&mut self, text: &str, settings: &VoiceSettings) -> Result<()>;
    /// 再生中の発話を止める
    fn stop(&mut self);
}

/// フォールバック: 音声合成の代わりにログ出力
pub struct LoggingSpeaker {
    simulate_duration: bool,
    spoken: Vec<String>,
}

impl LoggingSpeaker {
    pub fn new(simulate_duration: bool) -> Self {
        Self {
            simulate_duration,
            spoken: Vec::new(),
        }
    }

    /// 推定発話時間（1文字50ms、最低1秒）
    pub fn estimated_duration(text: &str, speed: f32) -> Duration {
        let ms = (text.chars().count() as u64 * 50).max(1000);
        Duration::from_secs_f32(ms as f32 / 1000.0 / speed.max(0.5))
    }

    /// これまでの発話（古い順）
    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }
}

impl Speaker for LoggingSpeaker {
    fn speak(&mut self, text: &str, settings: &VoiceSettings) -> Result<()> {
        info!(voice = %settings.voice_id, "[voice] {}", text);
        self.spoken.push(text.to_string());
        if self.simulate_duration {
            thread::sleep(Self::estimated_duration(text, settings.speed));
        }
        Ok(())
    }

    fn stop(&mut self) {}
}

/// キュー内の1発話
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub priority: Priority,
}

/// 発話をキューに積み、`Speaker`で1つずつ再生
pub struct VoiceCoach<S: Speaker> {
    speaker: S,
    settings: VoiceSettings,
    enabled: bool,
    queue: VecDeque<Utterance>,
}

impl<S: Speaker> VoiceCoach<S> {
    pub fn new(speaker: S, settings: VoiceSettings) -> Self {
        Self {
            speaker,
            settings,
            enabled: true,
            queue: VecDeque::new(),
        }
    }

    pub fn from_config(speaker: S, config: &SpeechConfig) -> Self {
        let mut coach = Self::new(speaker, VoiceSettings::from_config(config));
        coach.set_enabled(config.enabled);
        coach
    }

    /// メッセージをキューに追加。高優先度は先頭、`interrupt`なら再生中の発話とキューを破棄。
    /// 無効時・空文字列は受け付けずfalseを返す
    pub fn speak(&mut self, text: &str, priority: Priority, interrupt: bool) -> bool {
        if !self.enabled || text.trim().is_empty() {
            return false;
        }
        if interrupt {
            self.speaker.stop();
            self.queue.clear();
        }
        let utterance = Utterance {
            text: text.to_string(),
            priority,
        };
        if priority == Priority::High {
            self.queue.push_front(utterance);
        } else {
            self.queue.push_back(utterance);
        }
        debug!(pending = self.queue.len(), ?priority, interrupt, "utterance queued");
        true
    }

    /// 定型フレーズを発話（未知のキーはそのまま読む）
    pub fn speak_phrase(&mut self, key: &str, custom_text: Option<&str>) -> bool {
        let text = custom_text.or_else(|| phrase(key)).unwrap_or(key);
        let urgent = key.starts_with(SAFETY_PREFIX);
        let priority = if urgent { Priority::High } else { Priority::Medium };
        self.speak(text, priority, urgent)
    }

    pub fn provide_feedback(&mut self, kind: VoiceFeedback, message: &str) -> bool {
        let (priority, interrupt) = match kind {
            VoiceFeedback::Safety => (Priority::High, true),
            VoiceFeedback::Correction => (Priority::Medium, false),
            VoiceFeedback::Positive => (Priority::Low, false),
        };
        self.speak(message, priority, interrupt)
    }

    /// キューを順に再生。失敗した発話はログを出してスキップ。
    /// 再生した件数を返す
    pub fn drain(&mut self) -> usize {
        let mut played = 0;
        while let Some(utterance) = self.queue.pop_front() {
            match self.speaker.speak(&utterance.text, &self.settings) {
                Ok(()) => played += 1,
                Err(e) => warn!("speech failed for {:?}: {:#}", utterance.text, e),
            }
        }
        played
    }

    /// 発話を止めてキューを破棄
    pub fn stop(&mut self) {
        self.speaker.stop();
        self.queue.clear();
    }

    /// 有効/無効を切り替え（無効化でキューも破棄）
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn update_settings(&mut self, settings: VoiceSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    /// 再生待ちの発話
    pub fn pending(&self) -> impl Iterator<Item = &Utterance> {
        self.queue.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn speaker(&self) -> &S {
        &self.speaker
    }
}

/// `VoiceCoach::provide_feedback`用のフィードバック種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceFeedback {
    Positive,
    Correction,
    Safety,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn coach() -> VoiceCoach<LoggingSpeaker> {
        VoiceCoach::new(LoggingSpeaker::new(false), VoiceSettings::default())
    }

    fn pending_texts<S: Speaker>(coach: &VoiceCoach<S>) -> Vec<&str> {
        coach.pending().map(|u| u.text.as_str()).collect()
    }

    #[test]
    fn test_fifo_then_drain() {
        let mut coach = coach();
        coach.speak("one", Priority::Medium, false);
        coach.speak("two", Priority::Low, false);
        assert_eq!(pending_texts(&coach), vec!["one", "two"]);
        assert_eq!(coach.drain(), 2);
        assert_eq!(coach.speaker().spoken(), &["one".to_string(), "two".to_string()]);
        assert_eq!(coach.pending_len(), 0);
    }

    #[test]
    fn test_high_priority_jumps_queue() {
        let mut coach = coach();
        coach.speak("one", Priority::Medium, false);
        coach.speak("urgent", Priority::High, false);
        assert_eq!(pending_texts(&coach), vec!["urgent", "one"]);
    }

    #[test]
    fn test_interrupt_clears_queue() {
        let mut coach = coach();
        coach.speak("one", Priority::Medium, false);
        coach.speak("two", Priority::Medium, false);
        coach.provide_feedback(VoiceFeedback::Safety, "Stop!");
        assert_eq!(pending_texts(&coach), vec!["Stop!"]);
    }

    #[test]
    fn test_blank_and_disabled_are_dropped() {
        let mut coach = coach();
        assert!(!coach.speak("   ", Priority::High, true));
        assert_eq!(coach.pending_len(), 0);

        assert!(coach.speak("queued", Priority::Medium, false));
        coach.set_enabled(false);
        assert_eq!(coach.pending_len(), 0);
        assert!(!coach.speak("ignored", Priority::High, false));
        assert!(!coach.provide_feedback(VoiceFeedback::Safety, "Stop!"));
        assert_eq!(coach.pending_len(), 0);
        assert_eq!(coach.drain(), 0);

        coach.set_enabled(true);
        assert!(coach.speak("back", Priority::Low, false));
        assert_eq!(coach.pending_len(), 1);
    }

    #[test]
    fn test_phrase_book() {
        let mut coach = coach();
        coach.speak_phrase("breathe", None);
        coach.speak_phrase("rep_complete", Some("Rep 3 done"));
        coach.speak_phrase("unknown_key", None);
        coach.speak_phrase("safety_back", Some("Watch your back"));
        assert_eq!(pending_texts(&coach), vec!["Watch your back"]);

        coach.stop();
        coach.speak_phrase("breathe", None);
        coach.speak_phrase("unknown_key", None);
        assert_eq!(pending_texts(&coach), vec!["Don't forget to breathe", "unknown_key"]);
        assert_eq!(phrase("good_form"), Some("Great form! Keep it up!"));
        assert_eq!(phrase("nope"), None);
    }

    #[test]
    fn test_feedback_priorities() {
        let mut coach = coach();
        coach.provide_feedback(VoiceFeedback::Positive, "nice");
        coach.provide_feedback(VoiceFeedback::Correction, "elbows");
        let priorities: Vec<_> = coach.pending().map(|u| u.priority).collect();
        assert_eq!(priorities, vec![Priority::Low, Priority::Medium]);
    }

    #[test]
    fn test_estimated_duration() {
        assert_eq!(LoggingSpeaker::estimated_duration("hi", 1.0), Duration::from_secs(1));
        let long = "a".repeat(40);
        assert_eq!(LoggingSpeaker::estimated_duration(&long, 1.0), Duration::from_secs(2));
        assert_eq!(LoggingSpeaker::estimated_duration(&long, 2.0), Duration::from_secs(1));
    }

    #[test]
    fn test_settings_are_clamped() {
        let config = SpeechConfig {
            speed: 5.0,
            stability: -1.0,
            ..SpeechConfig::default()
        };
        let settings = VoiceSettings::from_config(&config);
        assert_eq!(settings.speed, 2.0);
        assert_eq!(settings.stability, 0.0);
        assert_eq!(settings.voice_id, DEFAULT_VOICE_ID);
    }

    struct FailingSpeaker;

    impl Speaker for FailingSpeaker {
        fn speak(&mut self, text: &str, _settings: &VoiceSettings) -> Result<()> {
            bail!("no audio device for {}", text)
        }
        fn stop(&mut self) {}
    }

    #[test]
    fn test_failed_speech_is_skipped() {
        let mut coach = VoiceCoach::new(FailingSpeaker, VoiceSettings::default());
        coach.speak("one", Priority::Medium, false);
        coach.speak("two", Priority::Medium, false);
        assert_eq!(coach.drain(), 0);
        assert_eq!(coach.pending_len(), 0);
    }
}
