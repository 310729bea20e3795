use std::time::{Duration, Instant};

use tracing::debug;

use super::voice::{Speaker, VoiceCoach};
use crate::analysis::{CoachingFeedback, Priority};

/// 発話クールダウンのデフォルト
pub const DEFAULT_SPEECH_COOLDOWN: Duration = Duration::from_millis(3000);

/// 候補の振り分け先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// 音声キューに渡した
    Spoken,
    /// 画面表示のみ
    Displayed,
}

/// フィードバック候補のうち発話するものを決める
///
/// 発話希望かつクールダウン経過時のみ発話し、発話でクールダウンを再開する。
/// 高優先度は現在の発話を中断する。音声が受け付けなかったものは画面表示に回す。
pub struct CoachingOrchestrator<S: Speaker> {
    cooldown: Duration,
    last_spoken: Option<Instant>,
    voice: VoiceCoach<S>,
}

impl<S: Speaker> CoachingOrchestrator<S> {
    pub fn new(voice: VoiceCoach<S>, cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_spoken: None,
            voice,
        }
    }

    /// クールダウンが明けているか
    pub fn can_speak(&self, now: Instant) -> bool {
        match self.last_spoken {
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
            None => true,
        }
    }

    /// 候補1件を振り分け（音声が受け付けなければ表示に回す）
    pub fn submit(&mut self, item: &CoachingFeedback, now: Instant) -> Route {
        if !item.should_speak || !self.can_speak(now) {
            return Route::Displayed;
        }
        let interrupt = item.priority == Priority::High;
        if !self.voice.speak(&item.message, item.priority, interrupt) {
            debug!(message = %item.message, "voice refused cue, displaying instead");
            return Route::Displayed;
        }
        self.last_spoken = Some(now);
        debug!(message = %item.message, interrupt, "cue spoken");
        Route::Spoken
    }

    /// 1ティック分の候補を順に振り分け、表示用に残ったものを返す
    pub fn submit_all<'a>(&mut self, items: &'a [CoachingFeedback], now: Instant) -> Vec<&'a CoachingFeedback> {
        items
            .iter()
            .filter(|item| self.submit(item, now) == Route::Displayed)
            .collect()
    }

    /// キューをすべて再生
    pub fn flush(&mut self) -> usize {
        self.voice.drain()
    }

    /// 発話を止めてキューを空にする（セッション終了時）
    pub fn stop(&mut self) {
        self.voice.stop();
    }

    pub fn voice(&self) -> &VoiceCoach<S> {
        &self.voice
    }

    pub fn voice_mut(&mut self) -> &mut VoiceCoach<S> {
        &mut self.voice
    }
}
