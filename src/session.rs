//! Game session driver
//!
//! Owns the simulation state and the injected collaborators (level provider,
//! score store, remote submitter). Input handlers only record intent; the
//! next [`Session::frame`] consumes it. The async parts (level loading and
//! score submission) are bounded by the timeouts in [`Settings`].

use std::time::Duration;

use crate::error::{LayoutError, SubmitError};
use crate::highscores::{LeaderboardEntry, ScoreStore};
use crate::layout::{BrickLayout, LevelProvider};
use crate::settings::Settings;
use crate::sim::state::{BrickColor, GameEvent, GamePhase, GameState};
use crate::sim::tick::{self, FrameInput};
use crate::submission::{
    PlayerName, ScoreSubmitter, SubmissionGuard, Ticket, TxReceipt, submit_with_timeout,
};

/// A validated submission waiting for its remote result
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    ticket: Ticket,
    pub name: PlayerName,
    pub score: u64,
    /// Also record the score with the remote submitter
    pub remote: bool,
}

/// What happened to a submitted score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    /// The entry as saved locally
    pub entry: LeaderboardEntry,
    /// Leaderboard rank, None when it did not make the table
    pub rank: Option<usize>,
    /// Non-fatal problem to show the player (remote failure, save failure)
    pub notice: Option<String>,
}

/// One player's game, from title screen to leaderboard and back
pub struct Session<L, S, R> {
    pub state: GameState,
    pub settings: Settings,
    levels: L,
    store: S,
    submitter: R,
    /// Input recorded since the last frame
    intent: FrameInput,
    guard: SubmissionGuard,
    /// Events raised outside `frame` (commands, loads), reported by the next frame
    pending_events: Vec<GameEvent>,
}

impl<L: LevelProvider, S: ScoreStore, R: ScoreSubmitter> Session<L, S, R> {
    pub fn new(settings: Settings, levels: L, store: S, submitter: R) -> Self {
        let seed = settings.effective_seed();
        log::info!("New session (seed {})", seed);
        Self {
            state: GameState::new(seed, settings.tuning),
            settings,
            levels,
            store,
            submitter,
            intent: FrameInput::default(),
            guard: SubmissionGuard::default(),
            pending_events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // === Input intent ===

    /// Pointer moved to `x` in play-field coordinates
    pub fn pointer_moved(&mut self, x: f32) {
        self.intent.pointer_x = Some(x);
    }

    /// Held keyboard direction: -1, 0 or +1
    pub fn set_nudge(&mut self, direction: f32) {
        self.intent.nudge = direction.clamp(-1.0, 1.0);
    }

    /// Click, tap or space
    pub fn primary_action(&mut self) {
        self.intent.launch = true;
    }

    pub fn pause_pressed(&mut self) {
        self.intent.pause = true;
    }

    /// Run one frame with the recorded intent, then clear the one-shot inputs
    pub fn frame(&mut self, now: u64) -> Vec<GameEvent> {
        let input = self.intent.clone();
        self.intent.pointer_x = None;
        self.intent.launch = false;
        self.intent.pause = false;

        let mut events = std::mem::take(&mut self.pending_events);
        events.extend(tick::tick(&mut self.state, &input, now));
        events
    }

    // === Commands ===

    /// Start (or restart) a game and load its first level
    pub async fn start_game(&mut self) {
        self.guard.cancel();
        self.intent = FrameInput::default();
        tick::start_game(&mut self.state, &mut self.pending_events);
        self.load_level().await;
    }

    /// Fetch and install the current level's bricks
    ///
    /// Any provider failure, slow answer or empty layout is replaced by the
    /// generated fallback, so this always ends in `Playing`.
    pub async fn load_level(&mut self) {
        if self.state.phase != GamePhase::Loading {
            return;
        }
        let level = self.state.stats.level;
        let timeout_ms = self.settings.layout_timeout_ms;

        let fetched = match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.levels.generate_level(level),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LayoutError::Timeout(timeout_ms)),
        };
        let layout = fetched
            .and_then(|layout| layout.validate().map(|()| layout))
            .unwrap_or_else(|e| {
                log::warn!("Level {} layout unavailable ({}), using fallback", level, e);
                BrickLayout::fallback(level)
            });

        let bricks = layout.to_bricks(&mut self.state.rng, self.state.tuning.power_up_chance);
        tick::install_level(&mut self.state, bricks, &mut self.pending_events);
    }

    /// Answer the paint color picker. Returns the number of bricks cleared.
    pub fn select_color(&mut self, color: BrickColor, now: u64) -> Option<usize> {
        tick::select_color(&mut self.state, color, now, &mut self.pending_events)
    }

    /// Back to the title screen; any submission still in flight is abandoned
    pub fn main_menu(&mut self) -> bool {
        let result = tick::return_to_menu(&mut self.state, &mut self.pending_events);
        if result.success {
            self.guard.cancel();
        }
        result.success
    }

    pub fn leaderboard(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.store.top_scores(n).unwrap_or_else(|e| {
            log::error!("Failed to load leaderboard: {}", e);
            Vec::new()
        })
    }

    // === Score submission ===

    /// Validate initials and claim the single submission slot
    pub fn begin_submission(
        &mut self,
        raw_name: &str,
        remote: bool,
    ) -> Result<PendingSubmission, SubmitError> {
        if self.state.phase != GamePhase::GameOver {
            return Err(SubmitError::NotGameOver);
        }
        let name = if remote {
            PlayerName::remote(raw_name)?
        } else {
            PlayerName::local(raw_name)?
        };
        let ticket = self.guard.begin()?;
        Ok(PendingSubmission {
            ticket,
            name,
            score: self.state.stats.score,
            remote,
        })
    }

    /// Remote half of a submission; None for local-only submissions
    pub async fn send_remote(
        &self,
        pending: &PendingSubmission,
    ) -> Option<Result<TxReceipt, SubmitError>> {
        if !pending.remote {
            return None;
        }
        Some(
            submit_with_timeout(
                &self.submitter,
                &pending.name,
                pending.score,
                self.settings.submit_timeout_ms,
            )
            .await,
        )
    }

    /// Save the score locally and show the leaderboard
    ///
    /// Returns None when the result is stale (the player left the game-over
    /// screen or restarted while it was in flight).
    pub fn complete_submission(
        &mut self,
        pending: PendingSubmission,
        remote: Option<Result<TxReceipt, SubmitError>>,
        now: u64,
    ) -> Option<SubmissionReport> {
        if !self.guard.finish(pending.ticket) || self.state.phase != GamePhase::GameOver {
            log::debug!("Dropping stale submission for {}", pending.name);
            return None;
        }

        let mut entry = LeaderboardEntry::new(pending.name.as_str(), pending.score).at(now);
        let mut notice = None;
        match remote {
            Some(Ok(receipt)) => {
                log::info!("Score {} recorded remotely ({})", pending.score, receipt.tx_hash);
                entry = entry.with_tx_hash(receipt.tx_hash);
            }
            Some(Err(e)) => {
                log::warn!("Remote submission failed: {}", e);
                notice = Some(format!("{}. Score saved locally.", e));
            }
            None => {}
        }

        let rank = match self.store.save(entry.clone()) {
            Ok(rank) => rank,
            Err(e) => {
                log::error!("Failed to save score: {}", e);
                notice = Some(SubmitError::from(e).to_string());
                None
            }
        };
        log::info!("{} scored {} (rank {:?})", entry.name, entry.score, rank);

        tick::score_submitted(&mut self.state, &mut self.pending_events);
        Some(SubmissionReport {
            entry,
            rank,
            notice,
        })
    }

    /// Validate, submit (remotely if asked) and save the final score
    pub async fn submit_score(
        &mut self,
        raw_name: &str,
        remote: bool,
        now: u64,
    ) -> Result<SubmissionReport, SubmitError> {
        let pending = self.begin_submission(raw_name, remote)?;
        let outcome = self.send_remote(&pending).await;
        self.complete_submission(pending, outcome, now)
            .ok_or(SubmitError::NotGameOver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::error::NameError;
    use crate::highscores::MemoryStore;
    use crate::layout::FallbackLevels;
    use crate::submission::OfflineSubmitter;
    use glam::Vec2;

    struct FailingLevels;

    impl LevelProvider for FailingLevels {
        async fn generate_level(&self, _level: u32) -> Result<BrickLayout, LayoutError> {
            Err(LayoutError::Provider("service down".into()))
        }
    }

    struct SlowLevels;

    impl LevelProvider for SlowLevels {
        async fn generate_level(&self, _level: u32) -> Result<BrickLayout, LayoutError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(BrickLayout(vec![vec![1]]))
        }
    }

    struct FixedLevels(BrickLayout);

    impl LevelProvider for FixedLevels {
        async fn generate_level(&self, _level: u32) -> Result<BrickLayout, LayoutError> {
            Ok(self.0.clone())
        }
    }

    struct ChainSubmitter;

    impl ScoreSubmitter for ChainSubmitter {
        async fn submit(&self, _name: &PlayerName, _score: u64) -> Result<TxReceipt, SubmitError> {
            Ok(TxReceipt {
                tx_hash: "0xabc123".into(),
            })
        }
    }

    fn settings() -> Settings {
        Settings {
            seed: Some(1),
            ..Default::default()
        }
    }

    fn session<L: LevelProvider, R: ScoreSubmitter>(
        levels: L,
        submitter: R,
    ) -> Session<L, MemoryStore, R> {
        Session::new(settings(), levels, MemoryStore::default(), submitter)
    }

    /// Run the current game into game over with the given score
    fn lose_game<L: LevelProvider, R: ScoreSubmitter>(
        session: &mut Session<L, MemoryStore, R>,
        score: u64,
    ) {
        session.state.stats.lives = 1;
        session.state.stats.score = score;
        session.state.ball.attached = false;
        session.state.ball.pos = Vec2::new(100.0, 588.0);
        session.state.ball.vel = Vec2::new(0.0, 4.0);
        session.frame(0);
        assert_eq!(session.phase(), GamePhase::GameOver);
    }

    fn assert_fallback(session: &Session<impl LevelProvider, MemoryStore, impl ScoreSubmitter>) {
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.state.bricks.len(), 4 * BRICK_COLS);
        assert!(session.state.bricks.iter().all(|b| b.hp == BRICK_HP_DEFAULT));
    }

    #[tokio::test]
    async fn test_start_game_installs_level() {
        let mut session = session(FallbackLevels, OfflineSubmitter);
        assert_eq!(session.phase(), GamePhase::Start);
        session.start_game().await;
        assert_fallback(&session);

        let events = session.frame(0);
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: GamePhase::Start,
            to: GamePhase::Loading,
        }));
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: GamePhase::Loading,
            to: GamePhase::Playing,
        }));
    }

    #[tokio::test]
    async fn test_provider_layout_used() {
        let mut session = session(FixedLevels(BrickLayout(vec![vec![0, 2, 3]])), OfflineSubmitter);
        session.start_game().await;
        assert_eq!(session.state.bricks.len(), 2);
        assert_eq!(session.state.bricks[0].color, BrickColor::Lime);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        let mut session = session(FailingLevels, OfflineSubmitter);
        session.start_game().await;
        assert_fallback(&session);
    }

    #[tokio::test]
    async fn test_empty_layout_falls_back() {
        let mut session = session(FixedLevels(BrickLayout(vec![vec![0, 0]])), OfflineSubmitter);
        session.start_game().await;
        assert_fallback(&session);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let mut session = session(SlowLevels, OfflineSubmitter);
        let started = tokio::time::Instant::now();
        session.start_game().await;
        assert_fallback(&session);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(5_000), "{:?}", waited);
        assert!(waited < Duration::from_secs(3600), "{:?}", waited);
    }

    #[tokio::test]
    async fn test_intent_consumed_by_next_frame() {
        let mut session = session(FallbackLevels, OfflineSubmitter);
        session.start_game().await;

        session.pointer_moved(100.0);
        session.primary_action();
        let events = session.frame(0);
        assert!(events.contains(&GameEvent::BallLaunched));
        assert!(!session.state.ball.attached);
        assert_eq!(session.state.paddle_target_x, 40.0);
        assert!(session.state.paddle.pos.x < 340.0);

        // One-shots do not repeat
        session.pause_pressed();
        session.frame(16);
        assert_eq!(session.phase(), GamePhase::Paused);
        session.frame(32);
        assert_eq!(session.phase(), GamePhase::Paused);
        session.pause_pressed();
        session.frame(48);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[tokio::test]
    async fn test_next_level_loads_after_delay() {
        let mut session = session(FallbackLevels, OfflineSubmitter);
        session.start_game().await;
        for brick in session.state.bricks.iter_mut().skip(1) {
            brick.clear();
        }
        session.state.bricks[0].hp = 1;
        let target = session.state.bricks[0].clone();
        session.state.ball.attached = false;
        session.state.ball.pos = Vec2::new(
            target.center().x,
            target.pos.y + target.size.y + BALL_RADIUS + 2.0,
        );
        session.state.ball.vel = Vec2::new(0.0, -4.0);

        session.frame(1_000);
        assert_eq!(session.phase(), GamePhase::LevelComplete);
        session.frame(3_000);
        assert_eq!(session.phase(), GamePhase::Loading);
        session.load_level().await;
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.state.stats.level, 2);
        assert_eq!(session.state.visible_brick_count(), 4 * BRICK_COLS);
        assert!(session.state.ball.attached);
    }

    #[tokio::test]
    async fn test_local_submission() {
        let mut session = session(FallbackLevels, OfflineSubmitter);
        session.start_game().await;
        lose_game(&mut session, 420);

        let report = session.submit_score(" abc ", false, 99).await.unwrap();
        assert_eq!(report.rank, Some(1));
        assert_eq!(report.notice, None);
        assert_eq!(report.entry, LeaderboardEntry::new("ABC", 420).at(99));
        assert_eq!(session.phase(), GamePhase::Leaderboard);
        assert_eq!(session.leaderboard(10), vec![report.entry]);

        assert!(session.main_menu());
        assert_eq!(session.phase(), GamePhase::Start);
    }

    #[tokio::test]
    async fn test_remote_failure_saves_locally() {
        let mut session = session(FallbackLevels, OfflineSubmitter);
        session.start_game().await;
        lose_game(&mut session, 300);

        let report = session.submit_score("xyz", true, 5).await.unwrap();
        assert_eq!(report.entry.tx_hash, None);
        let notice = report.notice.unwrap();
        assert!(notice.contains("Wallet not connected"), "{}", notice);
        assert_eq!(session.store().scores.entries.len(), 1);
        assert_eq!(session.phase(), GamePhase::Leaderboard);
    }

    #[tokio::test]
    async fn test_remote_success_keeps_tx_hash() {
        let mut session = session(FallbackLevels, ChainSubmitter);
        session.start_game().await;
        lose_game(&mut session, 300);

        let report = session.submit_score("xyz", true, 5).await.unwrap();
        assert_eq!(report.entry.tx_hash.as_deref(), Some("0xabc123"));
        assert_eq!(report.notice, None);
    }

    #[tokio::test]
    async fn test_invalid_name_has_no_effect() {
        let mut session = session(FallbackLevels, ChainSubmitter);
        session.start_game().await;
        lose_game(&mut session, 300);

        assert_eq!(
            session.submit_score("ab", true, 0).await,
            Err(SubmitError::InvalidName(NameError::TooShort { min: 3 }))
        );
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert!(session.store().scores.is_empty());

        // Two initials are fine for a local save
        assert!(session.submit_score("ab", false, 0).await.is_ok());
    }

    #[tokio::test]
    async fn test_submission_requires_game_over() {
        let mut session = session(FallbackLevels, OfflineSubmitter);
        session.start_game().await;
        assert_eq!(
            session.submit_score("abc", false, 0).await,
            Err(SubmitError::NotGameOver)
        );
    }

    #[tokio::test]
    async fn test_single_flight_and_late_result() {
        let mut session = session(FallbackLevels, ChainSubmitter);
        session.start_game().await;
        lose_game(&mut session, 300);

        let pending = session.begin_submission("abc", true).unwrap();
        assert!(matches!(
            session.begin_submission("def", true),
            Err(SubmitError::InFlight)
        ));

        let outcome = session.send_remote(&pending).await;
        // Player leaves before the result lands
        assert!(session.main_menu());
        assert_eq!(session.complete_submission(pending, outcome, 0), None);
        assert_eq!(session.phase(), GamePhase::Start);
        assert!(session.store().scores.is_empty());
    }
}
