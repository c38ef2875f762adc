//! Duplicate-check orchestration for new patient records.
//!
//! ```text
//! Start -> Validating -> Invalid                                  (terminal)
//!                     -> Valid -> CheckingDuplicates -> ConflictFound (terminal)
//!                              |                     -> Persisting
//!                              -> Persisting (flag_duplicates = false)
//! Persisting -> Saved | PersistFailed                             (terminal)
//! ```
//!
//! `submit` suspends only on the candidate lookup and on persistence. Persistence runs
//! on a spawned task that the caller awaits: dropping the `submit` future before that
//! point leaves nothing changed, dropping it afterwards does not abort the write.
//!
//! No lock spans the check and the save. Two concurrent submissions for the same person
//! can both pass the duplicate check; uniqueness, where required, belongs to the store.

use crate::collaborators::{
    CandidateLookup, FieldValidator, NoopNotifier, PatientStore, SaveNotifier,
};
use crate::config::CoreConfig;
use crate::error::{IntakeResult, PatientResult};
use crate::matcher::DuplicateMatcher;
use crate::outcome::{DuplicateConflict, ValidationOutcome};
use crate::patient::PatientRecord;
use crate::report::{report, Terminal};
use std::sync::Arc;

/// Non-terminal phases, used for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Validating,
    CheckingDuplicates,
    Persisting,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Validating => "validating",
            Phase::CheckingDuplicates => "checking_duplicates",
            Phase::Persisting => "persisting",
        }
    }
}

/// Validates, duplicate-checks and persists new patient records.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct IntakeService {
    cfg: Arc<CoreConfig>,
    validator: Arc<dyn FieldValidator>,
    lookup: Arc<dyn CandidateLookup>,
    store: Arc<dyn PatientStore>,
    notifier: Arc<dyn SaveNotifier>,
}

impl IntakeService {
    /// Creates a service with a no-op save notifier.
    pub fn new(
        cfg: Arc<CoreConfig>,
        validator: Arc<dyn FieldValidator>,
        lookup: Arc<dyn CandidateLookup>,
        store: Arc<dyn PatientStore>,
    ) -> Self {
        Self {
            cfg,
            validator,
            lookup,
            store,
            notifier: Arc::new(NoopNotifier),
        }
    }

    /// Replaces the notifier called after each successful save.
    pub fn with_notifier(mut self, notifier: Arc<dyn SaveNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Submits a candidate record for saving.
    ///
    /// With `flag_duplicates` set, the candidate is compared against the records the
    /// lookup returns for its full name, and any match holds the save. With it unset the
    /// caller has accepted the duplicate risk and the lookup is skipped entirely.
    ///
    /// Any id on `candidate` is discarded; the store issues one.
    ///
    /// # Returns
    ///
    /// - `Ok(Saved)` after exactly one store save and one notification,
    /// - `Ok(FieldInvalid)` without any lookup or save,
    /// - `Ok(DuplicateFound)` with every matching record, without any save.
    ///
    /// # Errors
    ///
    /// Returns an [`IntakeError`](crate::IntakeError) if the lookup or the save fails.
    /// No retry is attempted.
    #[tracing::instrument(skip_all, fields(flag_duplicates = flag_duplicates))]
    pub async fn submit(
        &self,
        candidate: PatientRecord,
        flag_duplicates: bool,
    ) -> IntakeResult<ValidationOutcome> {
        report(self.run(candidate, flag_duplicates).await)
    }

    async fn run(&self, mut candidate: PatientRecord, flag_duplicates: bool) -> Terminal {
        candidate.id = None;

        tracing::debug!(phase = Phase::Validating.as_str());
        let errors = self.validator.validate(&candidate);
        if !errors.is_empty() {
            return Terminal::Invalid(errors);
        }

        if flag_duplicates {
            tracing::debug!(phase = Phase::CheckingDuplicates.as_str());
            match self.check_duplicates(&candidate).await {
                Ok(conflict) if !conflict.is_empty() => return Terminal::ConflictFound(conflict),
                Ok(_) => {}
                Err(e) => return Terminal::LookupFailed(e),
            }
        }

        tracing::debug!(phase = Phase::Persisting.as_str());
        self.persist(candidate).await
    }

    async fn check_duplicates(&self, candidate: &PatientRecord) -> PatientResult<DuplicateConflict> {
        let full_name = candidate.full_name();
        let mut existing = self.lookup.search(&full_name).await?;

        let limit = self.cfg.max_candidates();
        if existing.len() > limit {
            existing = DuplicateMatcher::bound_candidates(&full_name, existing, limit);
            tracing::warn!(
                limit,
                kept = existing.len(),
                "lookup returned more candidates than configured; kept exact-name records and trimmed the rest"
            );
        }

        let conflict = DuplicateConflict::from_matches(
            existing
                .iter()
                .map(|other| DuplicateMatcher::compare(candidate, other)),
        );
        tracing::debug!(
            compared = existing.len(),
            matched = conflict.count(),
            "duplicate check complete"
        );
        Ok(conflict)
    }

    async fn persist(&self, candidate: PatientRecord) -> Terminal {
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);

        let task = tokio::spawn(async move {
            let saved = store.save(candidate).await?;
            notifier.patient_saved(&saved).await;
            PatientResult::Ok(saved)
        });

        match task.await {
            Ok(Ok(saved)) => Terminal::Saved(saved),
            Ok(Err(e)) => Terminal::PersistFailed(e),
            Err(e) => Terminal::PersistInterrupted(e),
        }
    }
}
