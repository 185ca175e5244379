use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use time::OffsetDateTime;

/// Identity of one admitted generation attempt: a monotonic sequence number
/// and a human-loggable correlation id unique for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHandle {
    pub sequence: u64,
    pub correlation_id: String,
}

/// Why an admission was refused. Refusals are silent no-ops: nothing is
/// queued, buffered, or replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionRefused {
    /// A request is already active.
    Busy,
    /// The prompt was empty or whitespace-only.
    BlankPrompt,
}

/// Single-flight admission control for generation calls.
///
/// The flag is an explicit check-and-set primitive, updated and read
/// synchronously within one scheduling turn, independent of any view-layer
/// state. It protects the initiation of calls, not data mutation.
#[derive(Debug)]
pub struct RequestGuard {
    active: AtomicBool,
    counter: AtomicU64,
}

impl RequestGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::seeded(0)
    }

    /// Creates a guard whose counter continues from `count`, so persisted
    /// request counts stay monotonic across restarts.
    #[must_use]
    pub fn seeded(count: u64) -> Self {
        Self {
            active: AtomicBool::new(false),
            counter: AtomicU64::new(count),
        }
    }

    /// Admits one attempt. Refused when a request is already active or the
    /// prompt is blank; the counter only moves on successful admission.
    pub fn try_acquire(&self, prompt: &str) -> Result<ActiveRequest<'_>, AdmissionRefused> {
        if prompt.trim().is_empty() {
            return Err(AdmissionRefused::BlankPrompt);
        }

        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AdmissionRefused::Busy);
        }

        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ActiveRequest {
            guard: self,
            handle: RequestHandle {
                sequence,
                correlation_id: correlation_id(sequence),
            },
        })
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Total admitted attempts so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Clears a held admission regardless of who holds it. Used by session
    /// reset to recover from an abandoned in-flight call.
    pub fn force_release(&self) {
        self.release();
    }

    fn release(&self) {
        // Idempotent: releasing an already-idle guard is a no-op.
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Default for RequestGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII admission token. Dropping it releases the guard, so every exit path
/// of the owning operation releases exactly once without caller discipline.
#[derive(Debug)]
pub struct ActiveRequest<'a> {
    guard: &'a RequestGuard,
    handle: RequestHandle,
}

impl ActiveRequest<'_> {
    #[must_use]
    pub fn handle(&self) -> &RequestHandle {
        &self.handle
    }

    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.handle.sequence
    }

    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.handle.correlation_id
    }
}

impl Drop for ActiveRequest<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

fn correlation_id(sequence: u64) -> String {
    let ts = OffsetDateTime::now_utc().unix_timestamp();
    format!("req-{sequence}-{ts}")
}
