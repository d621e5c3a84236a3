use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::Serialize;

use crate::{
    error::{EngineError, Result},
    input::{Applied, InputProcessor, KeyAction},
    language::Language,
    passage::{CharacterEntry, Passage, Status},
    stats::Results,
    timer::{Phase, TickHandle, TickId, TickOutcome, TickScheduler, Timer},
    word_generator::{WordGenConfig, WordGenerator},
};

pub const DEFAULT_NUMBER_OF_WORDS: usize = 45;
pub const DEFAULT_DURATION_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub number_of_words: usize,
    pub duration_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            number_of_words: DEFAULT_NUMBER_OF_WORDS,
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

/// Everything that can happen to a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Character(char),
    Delete,
    Reset,
    Tick(TickId),
}

impl Event {
    /// `None` for keystrokes that are dropped at the boundary
    pub fn from_key(action: KeyAction) -> Option<Self> {
        match action {
            KeyAction::Character(c) => Some(Event::Character(c)),
            KeyAction::Delete => Some(Event::Delete),
            KeyAction::Reset => Some(Event::Reset),
            KeyAction::Ignored => None,
        }
    }
}

/// What applying an event did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Update {
    Unchanged,
    Changed,
    /// First accepted character; the timer is now running
    Started,
    /// The timer expired with this event
    Finished,
    Reset,
}

/// Read-only view of a session for rendering
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub entries: Vec<CharacterEntry>,
    pub cursor: usize,
    pub elapsed_secs: u32,
    pub duration_secs: u32,
    pub seconds_remaining: u32,
    pub phase: Phase,
    pub finished: bool,
    pub results: Option<Results>,
}

/// One typing test: passage, cursor, countdown and the live tick stream
pub struct Session {
    config: SessionConfig,
    generator: WordGenerator,
    rng: Box<dyn RngCore + Send>,
    scheduler: Box<dyn TickScheduler>,
    passage: Passage,
    input: InputProcessor,
    timer: Timer,
    tick: Option<TickHandle>,
    results: Option<Results>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("passage", &self.passage.text())
            .field("cursor_pos", &self.input.cursor_pos())
            .field("timer", &self.timer)
            .field("tick", &self.tick)
            .field("results", &self.results)
            .finish()
    }
}

impl Session {
    pub fn new(
        language: Language,
        config: SessionConfig,
        scheduler: Box<dyn TickScheduler>,
    ) -> Result<Self> {
        Self::with_rng(
            language,
            config,
            scheduler,
            Box::new(StdRng::from_entropy()),
        )
    }

    /// Construct with an explicit random source, for reproducible passages
    pub fn with_rng(
        language: Language,
        config: SessionConfig,
        scheduler: Box<dyn TickScheduler>,
        mut rng: Box<dyn RngCore + Send>,
    ) -> Result<Self> {
        if config.duration_secs == 0 {
            return Err(EngineError::configuration(
                "duration must be at least one second",
            ));
        }
        let generator = WordGenerator::new(
            language,
            WordGenConfig {
                number_of_words: config.number_of_words,
            },
        )?;
        let passage = generator.generate(rng.as_mut());

        tracing::debug!(
            words = config.number_of_words,
            secs = config.duration_secs,
            chars = passage.len(),
            "session created"
        );

        Ok(Self {
            config,
            generator,
            rng,
            scheduler,
            passage,
            input: InputProcessor::new(),
            timer: Timer::new(config.duration_secs),
            tick: None,
            results: None,
        })
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    pub fn cursor_pos(&self) -> usize {
        self.input.cursor_pos()
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn has_started(&self) -> bool {
        self.timer.has_started()
    }

    pub fn is_finished(&self) -> bool {
        self.timer.has_expired()
    }

    /// Populated once the timer has expired
    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    /// Id of the tick stream this session currently accepts
    pub fn live_tick(&self) -> Option<TickId> {
        self.tick.as_ref().map(TickHandle::id)
    }

    pub fn apply(&mut self, event: Event) -> Result<Update> {
        let update = match event {
            Event::Character(c) => self.on_character(c)?,
            Event::Delete => self.on_delete()?,
            Event::Reset => {
                self.reset();
                Update::Reset
            }
            Event::Tick(id) => self.on_tick(id),
        };
        debug_assert!(self.invariants_hold(), "session invariant broken: {self:?}");
        Ok(update)
    }

    fn on_character(&mut self, c: char) -> Result<Update> {
        let applied = self
            .input
            .on_character(&mut self.passage, c, self.timer.phase())?;

        match applied {
            Applied::Advanced { first: true, .. } => {
                if self.timer.start() {
                    let handle = self.scheduler.schedule();
                    tracing::debug!(tick = handle.id().0, "timer started");
                    self.tick = Some(handle);
                }
                Ok(Update::Started)
            }
            Applied::Advanced { .. } | Applied::Retreated => Ok(Update::Changed),
            Applied::Ignored => Ok(Update::Unchanged),
        }
    }

    fn on_delete(&mut self) -> Result<Update> {
        match self.input.on_delete(&mut self.passage, self.timer.phase())? {
            Applied::Ignored => Ok(Update::Unchanged),
            _ => Ok(Update::Changed),
        }
    }

    fn on_tick(&mut self, id: TickId) -> Update {
        if self.live_tick() != Some(id) {
            tracing::trace!(tick = id.0, "dropping stale tick");
            return Update::Unchanged;
        }

        match self.timer.on_tick() {
            TickOutcome::Ignored => Update::Unchanged,
            TickOutcome::Advanced { .. } => Update::Changed,
            TickOutcome::Expired => {
                self.finish();
                Update::Finished
            }
        }
    }

    fn finish(&mut self) {
        // dropping the handle cancels the stream
        self.tick = None;
        let results = Results::from_entries(self.passage.entries(), self.config.duration_secs);
        tracing::info!(
            wpm = results.wpm,
            raw_wpm = results.raw_wpm,
            accuracy = %results.accuracy_label(),
            "test finished"
        );
        self.results = Some(results);
    }

    /// Regenerate the passage and return to the idle state
    pub fn reset(&mut self) {
        let from = self.timer.phase();
        if let Some(handle) = self.tick.take() {
            tracing::debug!(tick = handle.id().0, "cancelling tick stream");
            handle.cancel();
        }
        self.passage = self.generator.generate(self.rng.as_mut());
        self.input.reset();
        self.timer.reset();
        self.results = None;
        tracing::debug!(%from, chars = self.passage.len(), "session reset");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            entries: self.passage.snapshot(),
            cursor: self.input.cursor_pos(),
            elapsed_secs: self.timer.elapsed_secs(),
            duration_secs: self.timer.duration_secs(),
            seconds_remaining: self.timer.seconds_remaining(),
            phase: self.timer.phase(),
            finished: self.is_finished(),
            results: self.results,
        }
    }

    /// Entries before the cursor are typed, entries from the cursor on are
    /// pending, and the timer never runs past its duration.
    pub fn invariants_hold(&self) -> bool {
        let cursor = self.input.cursor_pos();
        let entries_ok = cursor <= self.passage.len()
            && self
                .passage
                .entries()
                .iter()
                .enumerate()
                .all(|(i, e)| (i < cursor) == (e.status != Status::Pending));
        let timer_ok = self.timer.elapsed_secs() <= self.timer.duration_secs()
            && (self.timer.phase() == Phase::Expired)
                == (self.timer.elapsed_secs() == self.timer.duration_secs());
        entries_ok && timer_ok
    }
}

/// Pure form of [`Session::apply`]
pub fn transition(mut session: Session, event: Event) -> Result<Session> {
    session.apply(event)?;
    Ok(session)
}
