use std::marker::PhantomData;
use std::sync::Arc;

use auth::Clock;
use auth::CodeGenerator;
use chrono::Duration;

use crate::domain::code::errors::CodeError;
use crate::domain::code::models::Code;
use crate::domain::code::models::CodeKind;
use crate::domain::code::models::OneTimeCode;
use crate::domain::code::ports::CodeRepository;

/// Issues and redeems one kind of one-time code.
///
/// Lifecycle is `ISSUED -> CONSUMED | EXPIRED`, both terminal. A subject
/// holds at most one live code of a kind: issuing purges the previous ones.
pub struct CodeManager<S, R>
where
    S: Send + Sync + 'static,
    R: CodeRepository<S>,
{
    repository: Arc<R>,
    generator: Arc<CodeGenerator>,
    window: Duration,
    kind: CodeKind,
    clock: Arc<dyn Clock>,
    _subject: PhantomData<fn() -> S>,
}

impl<S, R> CodeManager<S, R>
where
    S: Send + Sync + 'static,
    R: CodeRepository<S>,
{
    /// # Arguments
    /// * `repository` - Storage for this kind of code
    /// * `generator` - Alphabet and length of generated codes
    /// * `window` - Lifetime of an issued code
    /// * `kind` - Used in errors and logs
    /// * `clock` - Time source for expiry
    pub fn new(
        repository: Arc<R>,
        generator: Arc<CodeGenerator>,
        window: Duration,
        kind: CodeKind,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            generator,
            window,
            kind,
            clock,
            _subject: PhantomData,
        }
    }

    /// Issue a fresh code for `subject`, replacing any previous one.
    ///
    /// # Errors
    /// * `Store` - Purge or insert failed, including a code collision
    pub async fn issue(&self, subject: S) -> Result<OneTimeCode<S>, CodeError> {
        let purged = self.repository.delete_for_subject(&subject).await?;
        if purged > 0 {
            tracing::debug!(kind = %self.kind, purged, "Dropped previous codes");
        }

        let issued = OneTimeCode {
            code: Code::generated(self.generator.generate()),
            subject,
            expire_at: self.clock.now() + self.window,
        };

        self.repository.insert(&issued).await.map_err(|e| {
            tracing::error!(kind = %self.kind, "Failed to store issued code: {}", e);
            CodeError::from(e)
        })?;

        Ok(issued)
    }

    /// Consume `code` and return what it was bound to.
    ///
    /// # Errors
    /// * `NotFound` - Never issued or already consumed
    /// * `Expired` - Present but `now >= expire_at`; the record stays for
    ///   housekeeping
    /// * `Store` - Storage failure
    pub async fn redeem(&self, code: &Code) -> Result<OneTimeCode<S>, CodeError> {
        let now = self.clock.now();

        if let Some(taken) = self.repository.take_unexpired(code, now).await? {
            return Ok(taken);
        }

        match self.repository.find(code).await? {
            Some(_) => Err(CodeError::Expired(self.kind)),
            None => Err(CodeError::NotFound(self.kind)),
        }
    }

    /// Put back a code taken by [`redeem`](Self::redeem) whose follow-up
    /// work failed, so the subject can retry before it expires.
    ///
    /// # Errors
    /// * `Store` - Insert failed
    pub async fn restore(&self, redeemed: &OneTimeCode<S>) -> Result<(), CodeError> {
        self.repository.insert(redeemed).await?;
        tracing::debug!(kind = %self.kind, "Restored redeemed code");
        Ok(())
    }

    /// Read a code without consuming it.
    pub async fn lookup(&self, code: &Code) -> Result<Option<OneTimeCode<S>>, CodeError> {
        Ok(self.repository.find(code).await?)
    }

    /// Drop every code bound to `subject`.
    pub async fn invalidate(&self, subject: &S) -> Result<u64, CodeError> {
        Ok(self.repository.delete_for_subject(subject).await?)
    }

    /// Delete every code that has expired by now.
    pub async fn purge_expired(&self) -> Result<u64, CodeError> {
        let deleted = self.repository.delete_expired(self.clock.now()).await?;
        tracing::debug!(kind = %self.kind, deleted, "Purged expired codes");
        Ok(deleted)
    }
}
