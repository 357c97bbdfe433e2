use std::collections::HashMap;

use futures_util::StreamExt;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::{
    config::GameConfig,
    geodesy::Coordinate,
    identifiers::{MarkerId, WaypointId},
    remote::{RemoteError, RemoteWaypointSource},
    session::{
        AnswerOutcome, FeedError, GameSession, MapSurface, MarkerKind, PositionFeed,
        PositionOutcome, PositionSample, PositionWatch, Prompt, SampleOrigin, SessionError,
        SessionPhase, TrackingMode, parse_waypoint_count,
    },
};

const SETUP_HEADER: &str = "New game";
const QUESTION_HEADER: &str = "Waypoint reached";
const RESULT_HEADER: &str = "Game over";

const PLAY_AGAIN: usize = 0;

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Where new waypoints come from when a game starts.
pub enum WaypointSupply {
    Local,
    Remote(RemoteWaypointSource),
}

/// Runs a [`GameSession`] against a position feed, a map and a prompt.
///
/// Events are handled one at a time: a sample is processed to completion,
/// including any question it raises, before the next one is read.
pub struct SessionController<F, P, M> {
    session: GameSession,
    feed: F,
    prompt: P,
    map: M,
    config: GameConfig,
    supply: WaypointSupply,

    watch: Option<PositionWatch>,
    last_settings: Option<(usize, TrackingMode)>,
    player_marker: Option<MarkerId>,
    waypoint_markers: HashMap<WaypointId, MarkerId>,
}

impl<F, P, M> SessionController<F, P, M>
where
    F: PositionFeed,
    P: Prompt,
    M: MapSurface,
{
    pub fn new(session: GameSession, feed: F, prompt: P, map: M, config: GameConfig) -> Self {
        Self {
            session,
            feed,
            prompt,
            map,
            config,
            supply: WaypointSupply::Local,
            watch: None,
            last_settings: None,
            player_marker: None,
            waypoint_markers: HashMap::new(),
        }
    }

    pub fn with_supply(mut self, supply: WaypointSupply) -> Self {
        self.supply = supply;
        self
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Configure, start and play until the player stops.
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        let Some((count, mode)) = self.configure().await? else {
            info!("setup dismissed");
            return Ok(());
        };

        self.start(count, mode).await?;
        self.run_session().await
    }

    /// Ask for waypoint count and tracking mode. `None` if the player backed out,
    /// in which case the session is idle again.
    pub async fn configure(&mut self) -> Result<Option<(usize, TrackingMode)>, ControllerError> {
        self.session.begin_configuring()?;

        let mut message = String::from("How many waypoints?");
        let count = loop {
            let Some(input) = self.prompt.ask_text(SETUP_HEADER, &message).await else {
                self.session.reset();
                return Ok(None);
            };

            match parse_waypoint_count(&input) {
                Ok(count) => break count,
                Err(error) => {
                    warn!(%error, "rejected waypoint count");
                    message = format!("{error}. How many waypoints?");
                }
            }
        };

        let modes: Vec<TrackingMode> = TrackingMode::iter().collect();
        let labels: Vec<String> = modes.iter().map(|m| m.label().to_string()).collect();

        let Some(choice) = self
            .prompt
            .ask(SETUP_HEADER, "How do you want to move?", &labels)
            .await
        else {
            self.session.reset();
            return Ok(None);
        };

        let Some(&mode) = modes.get(choice) else {
            self.session.reset();
            return Err(
                SessionError::InvalidArgument(format!("no tracking mode at index {choice}")).into(),
            );
        };

        Ok(Some((count, mode)))
    }

    /// Start a game around the player's current position.
    ///
    /// Nothing changes if the count is invalid, a game is already running or no
    /// fix can be obtained.
    pub async fn start(&mut self, count: usize, mode: TrackingMode) -> Result<(), ControllerError> {
        if count == 0 {
            return Err(SessionError::InvalidArgument(
                "waypoint count must be greater than zero".into(),
            )
            .into());
        }

        self.session.check_can_start()?;

        let origin = self.feed.current_position().await.inspect_err(|error| {
            warn!(%error, "could not get a position fix");
        })?;

        match &self.supply {
            WaypointSupply::Local => {
                self.session.start(origin, count, mode)?;
            }
            WaypointSupply::Remote(source) => {
                let waypoints = source.fetch(origin, count).await?;
                self.session.start_with_waypoints(waypoints, mode)?;
            }
        }

        self.last_settings = Some((count, mode));
        self.release_watch();
        self.clear_markers();

        for waypoint in self.session.waypoints() {
            let marker = self.map.add_marker(
                waypoint.location(),
                &MarkerKind::Waypoint(waypoint.id().clone()),
            );
            self.waypoint_markers.insert(waypoint.id().clone(), marker);
        }
        self.move_player(origin);

        Ok(())
    }

    /// Consume the position feed until the player stops playing.
    ///
    /// A feed error releases the subscription and is returned; the session is
    /// left as it was, so calling this again resubscribes.
    pub async fn run_session(&mut self) -> Result<(), ControllerError> {
        loop {
            if self.session.phase() != SessionPhase::Active {
                return Err(SessionError::InvalidTransition {
                    operation: "follow the position feed",
                    phase: self.session.phase(),
                }
                .into());
            }

            if self.watch.is_none() {
                self.watch = Some(self.feed.watch()?);
            }

            let next = match self.watch.as_mut() {
                Some(watch) => watch.next().await,
                None => None,
            };

            let sample = match next {
                Some(Ok(sample)) => sample,
                Some(Err(error)) => {
                    warn!(%error, "position feed failed");
                    self.release_watch();
                    self.remove_player();
                    return Err(error.into());
                }
                None => {
                    self.release_watch();
                    return Err(FeedError::Closed.into());
                }
            };

            self.handle_sample(sample).await;

            if self.session.phase().is_terminal() {
                self.release_watch();

                if !self.offer_replay().await? {
                    return Ok(());
                }
            }
        }
    }

    /// Apply one position sample. Samples the current mode doesn't listen to are
    /// dropped.
    pub async fn handle_sample(&mut self, sample: PositionSample) {
        let accepted = match self.session.mode() {
            Some(TrackingMode::RealTime) => true,
            Some(TrackingMode::Manual) => sample.origin == SampleOrigin::Drag,
            None => false,
        };

        if !accepted {
            debug!(origin = ?sample.origin, "ignoring sample for current mode");
            return;
        }

        self.move_player(sample.coordinate);

        // a dismissed question comes back on the next move
        if self.session.pending_question().is_some() {
            self.present_pending_question().await;
            return;
        }

        match self.session.on_position_update(sample.coordinate) {
            Ok(PositionOutcome::QuestionRequested(_)) => self.present_pending_question().await,
            Ok(PositionOutcome::NoHit | PositionOutcome::Suppressed) => {}
            Err(error) => warn!(%error, "ignored position update"),
        }
    }

    /// Ask the pending question until it is answered correctly, the session fails,
    /// or the player dismisses the dialog.
    async fn present_pending_question(&mut self) {
        while let Some(request) = self.session.pending_question() {
            let message = if request.attempts_remaining < self.config.max_attempts {
                format!(
                    "{}\n\nWrong answer, {} attempts remaining.",
                    request.question.text(),
                    request.attempts_remaining
                )
            } else {
                request.question.text().to_string()
            };

            let Some(index) = self
                .prompt
                .ask(QUESTION_HEADER, &message, request.question.answers())
                .await
            else {
                debug!(waypoint = %request.waypoint_id, "question dismissed");
                return;
            };

            match self.session.resolve_answer(index) {
                Ok(AnswerOutcome::Correct { waypoint, .. } | AnswerOutcome::Cleared { waypoint }) => {
                    if let Some(marker) = self.waypoint_markers.remove(waypoint.id()) {
                        self.map.remove_marker(&marker);
                    }
                }
                Ok(AnswerOutcome::Incorrect { attempts_remaining }) => {
                    debug!(attempts_remaining, "asking again");
                }
                Ok(AnswerOutcome::Failed { .. }) => {}
                Err(error) => {
                    warn!(%error, "could not resolve answer");
                    return;
                }
            }
        }
    }

    /// Offer another round after a win or loss. Returns whether a new game started.
    async fn offer_replay(&mut self) -> Result<bool, ControllerError> {
        let message = match self.session.phase() {
            SessionPhase::Cleared => "All waypoints cleared!",
            _ => "Out of attempts.",
        };
        let choices = vec!["Play again".to_string(), "Stop".to_string()];

        let choice = self.prompt.ask(RESULT_HEADER, message, &choices).await;

        match (choice, self.last_settings) {
            (Some(PLAY_AGAIN), Some((count, mode))) => {
                self.start(count, mode).await?;
                Ok(true)
            }
            _ => {
                self.stop();
                Ok(false)
            }
        }
    }

    /// Tear everything down: release the feed, clear the map, reset the session.
    pub fn stop(&mut self) {
        self.release_watch();
        self.clear_markers();
        self.remove_player();
        self.session.reset();
    }

    fn release_watch(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.feed.clear_watch(watch.id());
            debug!(watch = %watch.id(), "released position watch");
        }
    }

    fn move_player(&mut self, coordinate: Coordinate) {
        self.remove_player();
        self.player_marker = Some(self.map.add_marker(coordinate, &MarkerKind::Player));
        self.map.set_camera(coordinate, self.config.camera_zoom);
    }

    fn remove_player(&mut self) {
        if let Some(marker) = self.player_marker.take() {
            self.map.remove_marker(&marker);
        }
    }

    fn clear_markers(&mut self) {
        for (_, marker) in self.waypoint_markers.drain() {
            self.map.remove_marker(&marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;
    use crate::{
        identifiers::WatchId,
        riddle::{FixedQuestion, Waypoint, WaypointGenerator},
    };

    const SEED: u64 = 11;
    const WRONG: usize = 1;
    const REAL_TIME: usize = 1;
    const STOP: usize = 1;

    type Sample = Result<PositionSample, FeedError>;

    struct ScriptedFeed {
        fix: Result<Coordinate, FeedError>,
        watches: Mutex<VecDeque<Vec<Sample>>>,
        opened: Mutex<u32>,
        cleared: Mutex<Vec<WatchId>>,
    }

    impl ScriptedFeed {
        fn new(fix: Result<Coordinate, FeedError>, watches: Vec<Vec<Sample>>) -> Self {
            Self {
                fix,
                watches: Mutex::new(watches.into()),
                opened: Mutex::new(0),
                cleared: Mutex::new(Vec::new()),
            }
        }
    }

    impl PositionFeed for ScriptedFeed {
        fn current_position<'a>(
            &'a self,
        ) -> Pin<Box<dyn Future<Output = Result<Coordinate, FeedError>> + Send + 'a>> {
            let fix = self.fix.clone();
            Box::pin(async move { fix })
        }

        fn watch(&self) -> Result<PositionWatch, FeedError> {
            let mut opened = self.opened.lock().unwrap();
            *opened += 1;

            let samples = self.watches.lock().unwrap().pop_front().unwrap_or_default();
            let (watch, handle) =
                PositionWatch::channel(WatchId::new(format!("watch-{opened}")), samples.len() + 1);
            for sample in samples {
                handle.samples.try_send(sample).unwrap();
            }

            // dropping the handle ends the stream once the script runs out
            Ok(watch)
        }

        fn clear_watch(&self, id: &WatchId) {
            self.cleared.lock().unwrap().push(id.clone());
        }
    }

    /// Answers dialogs from a script; an exhausted script dismisses.
    #[derive(Default)]
    struct ScriptedPrompt {
        texts: Mutex<VecDeque<Option<String>>>,
        choices: Mutex<VecDeque<Option<usize>>>,
        messages: Mutex<Vec<String>>,
    }

    impl ScriptedPrompt {
        fn new(texts: &[Option<&str>], choices: &[Option<usize>]) -> Self {
            Self {
                texts: Mutex::new(texts.iter().map(|t| t.map(String::from)).collect()),
                choices: Mutex::new(choices.iter().copied().collect()),
                messages: Mutex::new(Vec::new()),
            }
        }

        fn question_count(&self) -> usize {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.starts_with("What is the capital"))
                .count()
        }
    }

    impl Prompt for ScriptedPrompt {
        fn ask<'a>(
            &'a self,
            _header: &'a str,
            message: &'a str,
            _choices: &'a [String],
        ) -> Pin<Box<dyn Future<Output = Option<usize>> + Send + 'a>> {
            self.messages.lock().unwrap().push(message.to_string());
            let choice = self.choices.lock().unwrap().pop_front().flatten();
            Box::pin(async move { choice })
        }

        fn ask_text<'a>(
            &'a self,
            _header: &'a str,
            message: &'a str,
        ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
            self.messages.lock().unwrap().push(message.to_string());
            let text = self.texts.lock().unwrap().pop_front().flatten();
            Box::pin(async move { text })
        }
    }

    #[derive(Default)]
    struct RecordingMap {
        next_id: u32,
        markers: HashMap<MarkerId, (Coordinate, MarkerKind)>,
        camera: Option<(Coordinate, f64)>,
    }

    impl RecordingMap {
        fn waypoint_markers(&self) -> usize {
            self.markers
                .values()
                .filter(|(_, kind)| matches!(kind, MarkerKind::Waypoint(_)))
                .count()
        }

        fn player(&self) -> Option<Coordinate> {
            self.markers
                .values()
                .find(|(_, kind)| *kind == MarkerKind::Player)
                .map(|(coordinate, _)| *coordinate)
        }
    }

    impl MapSurface for RecordingMap {
        fn add_marker(&mut self, coordinate: Coordinate, kind: &MarkerKind) -> MarkerId {
            self.next_id += 1;
            let id = MarkerId::new(format!("marker-{}", self.next_id));
            self.markers.insert(id.clone(), (coordinate, kind.clone()));
            id
        }

        fn remove_marker(&mut self, id: &MarkerId) {
            self.markers.remove(id);
        }

        fn set_camera(&mut self, coordinate: Coordinate, zoom: f64) {
            self.camera = Some((coordinate, zoom));
        }
    }

    fn origin() -> Coordinate {
        Coordinate::new(35.6586, 139.7454).unwrap()
    }

    fn far_away() -> Coordinate {
        Coordinate::new(35.7, 139.8).unwrap()
    }

    /// The waypoints a session seeded with [`SEED`] will generate first.
    fn expected_waypoints(count: usize) -> Vec<Waypoint> {
        let config = GameConfig::default();
        WaypointGenerator::seeded(config.spawn_radius_m, SEED)
            .generate(origin(), count, &mut FixedQuestion::demo())
            .unwrap()
    }

    fn controller(
        feed: ScriptedFeed,
        prompt: ScriptedPrompt,
    ) -> SessionController<ScriptedFeed, ScriptedPrompt, RecordingMap> {
        let config = GameConfig::default();
        let session = GameSession::with_parts(
            &config,
            WaypointGenerator::seeded(config.spawn_radius_m, SEED),
            Box::new(FixedQuestion::demo()),
        );

        SessionController::new(session, feed, prompt, RecordingMap::default(), config)
    }

    #[tokio::test]
    async fn test_run_plays_to_victory_and_stops() {
        let waypoints = expected_waypoints(2);
        let feed = ScriptedFeed::new(
            Ok(origin()),
            vec![vec![
                Ok(PositionSample::gps(far_away())),
                Ok(PositionSample::gps(waypoints[0].location())),
                Ok(PositionSample::gps(waypoints[1].location())),
            ]],
        );
        let prompt = ScriptedPrompt::new(
            &[Some("lots"), Some("2")],
            &[Some(REAL_TIME), Some(0), Some(WRONG), Some(0), Some(STOP)],
        );

        let mut controller = controller(feed, prompt);
        controller.run().await.unwrap();

        assert_eq!(controller.session().phase(), SessionPhase::Idle);
        assert!(!controller.is_watching());
        assert_eq!(controller.feed.cleared.lock().unwrap().len(), 1);
        assert!(controller.map().markers.is_empty());

        let messages = controller.prompt.messages.lock().unwrap().clone();
        assert!(messages[1].contains("not a number"));
        assert!(messages.iter().any(|m| m.contains("2 attempts remaining")));
        assert_eq!(messages.last().unwrap(), "All waypoints cleared!");
        drop(messages);
        assert_eq!(controller.prompt.question_count(), 3);
    }

    #[tokio::test]
    async fn test_start_places_markers_and_centers_camera() {
        let feed = ScriptedFeed::new(Ok(origin()), vec![]);
        let mut controller = controller(feed, ScriptedPrompt::default());

        controller.start(3, TrackingMode::RealTime).await.unwrap();

        assert_eq!(controller.session().phase(), SessionPhase::Active);
        assert_eq!(controller.map().waypoint_markers(), 3);
        assert_eq!(controller.map().player(), Some(origin()));
        assert_eq!(controller.map().camera, Some((origin(), 15.0)));
    }

    #[tokio::test]
    async fn test_manual_mode_only_follows_drags() {
        let waypoints = expected_waypoints(1);
        let feed = ScriptedFeed::new(Ok(origin()), vec![]);
        let prompt = ScriptedPrompt::new(&[], &[Some(0)]);

        let mut controller = controller(feed, prompt);
        controller.start(1, TrackingMode::Manual).await.unwrap();

        controller
            .handle_sample(PositionSample::gps(waypoints[0].location()))
            .await;
        assert_eq!(controller.prompt.question_count(), 0);
        assert_eq!(controller.map().player(), Some(origin()));

        controller
            .handle_sample(PositionSample::drag(waypoints[0].location()))
            .await;
        assert_eq!(controller.prompt.question_count(), 1);
        assert_eq!(controller.session().phase(), SessionPhase::Cleared);
        assert_eq!(controller.map().waypoint_markers(), 0);
    }

    #[tokio::test]
    async fn test_dismissed_question_stays_pending_until_next_move() {
        let waypoints = expected_waypoints(2);
        let feed = ScriptedFeed::new(Ok(origin()), vec![]);
        let prompt = ScriptedPrompt::new(&[], &[None, Some(0)]);

        let mut controller = controller(feed, prompt);
        controller.start(2, TrackingMode::RealTime).await.unwrap();

        controller
            .handle_sample(PositionSample::gps(waypoints[0].location()))
            .await;

        let snapshot = controller.session().snapshot();
        assert_eq!(snapshot.active_waypoint.as_ref(), Some(waypoints[0].id()));
        assert_eq!(snapshot.attempts_used, 0);
        assert_eq!(snapshot.waypoints.len(), 2);

        controller.handle_sample(PositionSample::gps(far_away())).await;

        assert_eq!(controller.prompt.question_count(), 2);
        assert!(controller.session().active_waypoint().is_none());
        assert_eq!(controller.session().waypoints().len(), 1);
        assert_eq!(controller.map().waypoint_markers(), 1);
    }

    #[tokio::test]
    async fn test_failure_then_play_again() {
        let waypoints = expected_waypoints(1);
        let feed = ScriptedFeed::new(
            Ok(origin()),
            vec![vec![Ok(PositionSample::gps(waypoints[0].location()))]],
        );
        let prompt = ScriptedPrompt::new(
            &[],
            &[Some(WRONG), Some(WRONG), Some(WRONG), Some(PLAY_AGAIN)],
        );

        let mut controller = controller(feed, prompt);
        controller.start(1, TrackingMode::RealTime).await.unwrap();

        // the second game's watch has no script, so the feed closes
        let result = controller.run_session().await;
        assert!(matches!(
            result,
            Err(ControllerError::Feed(FeedError::Closed))
        ));

        assert_eq!(controller.prompt.question_count(), 3);
        assert_eq!(
            controller.prompt.messages.lock().unwrap()[3],
            "Out of attempts."
        );
        assert_eq!(controller.session().phase(), SessionPhase::Active);
        assert_eq!(controller.session().attempts_used(), 0);
        assert_eq!(controller.session().waypoints().len(), 1);
        assert_ne!(controller.session().waypoints()[0].id(), waypoints[0].id());
        assert_eq!(*controller.feed.opened.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_feed_error_releases_watch() {
        let feed = ScriptedFeed::new(
            Ok(origin()),
            vec![vec![Err(FeedError::Unavailable("gps lost".into()))]],
        );

        let mut controller = controller(feed, ScriptedPrompt::default());
        controller.start(2, TrackingMode::RealTime).await.unwrap();

        let result = controller.run_session().await;
        assert!(matches!(
            result,
            Err(ControllerError::Feed(FeedError::Unavailable(_)))
        ));
        assert!(!controller.is_watching());
        assert_eq!(controller.feed.cleared.lock().unwrap().len(), 1);
        assert_eq!(controller.map().player(), None);
        assert_eq!(controller.session().phase(), SessionPhase::Active);
    }

    #[tokio::test]
    async fn test_start_without_fix_changes_nothing() {
        let feed = ScriptedFeed::new(Err(FeedError::PermissionDenied), vec![]);
        let mut controller = controller(feed, ScriptedPrompt::default());

        let result = controller.start(2, TrackingMode::Manual).await;
        assert!(matches!(
            result,
            Err(ControllerError::Feed(FeedError::PermissionDenied))
        ));
        assert_eq!(controller.session().phase(), SessionPhase::Idle);
        assert!(controller.map().markers.is_empty());
    }

    #[tokio::test]
    async fn test_dismissed_setup_returns_to_idle() {
        let feed = ScriptedFeed::new(Ok(origin()), vec![]);
        let prompt = ScriptedPrompt::new(&[Some("3")], &[None]);

        let mut controller = controller(feed, prompt);
        assert_eq!(controller.configure().await.unwrap(), None);
        assert_eq!(controller.session().phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_invalid_mode_choice_returns_to_idle() {
        let feed = ScriptedFeed::new(Ok(origin()), vec![]);
        let prompt = ScriptedPrompt::new(&[Some("3"), Some("2")], &[Some(7), Some(REAL_TIME)]);

        let mut controller = controller(feed, prompt);
        assert!(matches!(
            controller.configure().await,
            Err(ControllerError::Session(SessionError::InvalidArgument(_)))
        ));
        assert_eq!(controller.session().phase(), SessionPhase::Idle);

        assert_eq!(
            controller.configure().await.unwrap(),
            Some((2, TrackingMode::RealTime))
        );
    }

    #[tokio::test]
    async fn test_remote_supply_failure_changes_nothing() {
        let feed = ScriptedFeed::new(Ok(origin()), vec![]);
        let mut controller = controller(feed, ScriptedPrompt::default()).with_supply(
            WaypointSupply::Remote(RemoteWaypointSource::new("not a url")),
        );

        let result = controller.start(2, TrackingMode::RealTime).await;
        assert!(matches!(
            result,
            Err(ControllerError::Remote(RemoteError::InvalidUrl(_)))
        ));
        assert_eq!(controller.session().phase(), SessionPhase::Idle);
        assert!(controller.map().markers.is_empty());
    }

    #[tokio::test]
    async fn test_start_while_active_skips_the_waypoint_server() {
        let feed = ScriptedFeed::new(Ok(origin()), vec![]);
        let mut controller = controller(feed, ScriptedPrompt::default()).with_supply(
            WaypointSupply::Remote(RemoteWaypointSource::new("not a url")),
        );
        controller
            .session
            .start(origin(), 1, TrackingMode::RealTime)
            .unwrap();

        // an unusable server url would surface as a remote error if it were contacted
        let result = controller.start(2, TrackingMode::RealTime).await;
        assert!(matches!(
            result,
            Err(ControllerError::Session(SessionError::InvalidTransition {
                phase: SessionPhase::Active,
                ..
            }))
        ));
        assert_eq!(controller.session().waypoints().len(), 1);
    }
}
