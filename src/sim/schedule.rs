/// Tick-aligned delayed tasks.
///
/// Nothing here runs on its own. `step` drains whatever is due at the top
/// of every tick, so a task fires on the first tick at or after its due
/// time, never in the middle of one.
///
/// ## Cancellation
///   - `cancel(token)` drops one pending task.
///   - `teardown()` bumps the generation and drops everything. Tokens
///     issued before a teardown are dead: cancelling them is a no-op and
///     their tasks can never fire into the new scene.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Task {
    EndInvincibility,
    /// Stand-in for the presentation layer's "stomp animation done" signal.
    StompAnimationFinished { id: usize },
    RemoveEnemy { id: usize },
    Respawn,
    ResumeControl,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Token {
    id: u64,
    generation: u32,
}

#[derive(Clone, Debug)]
struct Pending {
    token: Token,
    due_ms: u64,
    task: Task,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    generation: u32,
    next_id: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after(&mut self, now_ms: u64, delay_ms: u64, task: Task) -> Token {
        let token = Token { id: self.next_id, generation: self.generation };
        self.next_id += 1;
        self.pending.push(Pending { token, due_ms: now_ms.saturating_add(delay_ms), task });
        token
    }

    /// Returns false if the task already fired, was cancelled, or belongs
    /// to a torn-down scene.
    pub fn cancel(&mut self, token: Token) -> bool {
        if token.generation != self.generation {
            return false;
        }
        let before = self.pending.len();
        self.pending.retain(|p| p.token != token);
        self.pending.len() != before
    }

    pub fn is_pending(&self, token: Token) -> bool {
        self.pending.iter().any(|p| p.token == token)
    }

    pub fn teardown(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending.clear();
    }

    /// Remove and return every task due at `now_ms`, earliest first.
    /// Ties keep scheduling order.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<Task> {
        let generation = self.generation;
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) = std::mem::take(&mut self.pending)
            .into_iter()
            .filter(|p| p.token.generation == generation)
            .partition(|p| p.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by_key(|p| (p.due_ms, p.token.id));
        due.into_iter().map(|p| p.task).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
