//! Drives a whole import run: files → rows → candidates → reconciliation → commit

use csv::{ByteRecord, StringRecord};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::import::{csv_reader, FileError, RowNormalizer};
use crate::ledger::{AccountResolver, CommitSummary, LedgerSession};
use crate::reconciliation::{MatchKind, Reconciled, ReconciliationEngine, RunClaims};
use crate::traits::*;
use crate::types::*;

/// What happened to a single input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// A new ledger entry was staged
    Created,
    /// An existing entry matched and had empty fields filled in
    Updated,
    /// An existing entry matched and already had all the row's information
    Unchanged,
    /// The row could not be imported; the reason has been logged
    Skipped(String),
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub files_processed: usize,
    pub files_failed: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    /// Writes flushed to the ledger; `None` for a dry run
    pub committed: Option<CommitSummary>,
}

impl RunReport {
    fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Created => self.created += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Unchanged => self.unchanged += 1,
            RowOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    /// Number of rows that were looked at
    pub fn rows(&self) -> usize {
        self.created + self.updated + self.unchanged + self.skipped
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows from {} files: {} created, {} updated, {} unchanged, {} skipped",
            self.rows(),
            self.files_processed,
            self.created,
            self.updated,
            self.unchanged,
            self.skipped,
        )?;
        if self.files_failed > 0 {
            write!(f, ", {} files failed", self.files_failed)?;
        }
        match &self.committed {
            Some(committed) if committed.rejected > 0 => {
                write!(f, ", {} writes rejected by the ledger", committed.rejected)?
            }
            Some(_) => {}
            None => write!(f, " (dry run, nothing committed)")?,
        }
        Ok(())
    }
}

/// Owns everything that lives for exactly one run: the ledger session, the
/// account cache and the per-account claimed sets.
pub struct RunDriver<S: LedgerStorage> {
    session: LedgerSession<S>,
    normalizer: RowNormalizer,
    engine: ReconciliationEngine,
    resolver: AccountResolver,
    claims: RunClaims,
    delimiter: u8,
    dry_run: bool,
    report: RunReport,
}

impl<S: LedgerStorage> RunDriver<S> {
    /// Start a run over an already connected ledger backend
    pub fn new(config: &Config, storage: S) -> Self {
        Self {
            session: LedgerSession::new(storage),
            normalizer: RowNormalizer::new(config.layout.clone(), config.default_account.clone()),
            engine: ReconciliationEngine::with_policy(config.match_policy),
            resolver: if config.dry_run {
                AccountResolver::dry_run()
            } else {
                AccountResolver::new()
            },
            claims: RunClaims::new(),
            delimiter: config.delimiter,
            dry_run: config.dry_run,
            report: RunReport::default(),
        }
    }

    /// Process all files and commit the result once.
    ///
    /// A file that can't be opened or read is logged and skipped. Only a failed
    /// commit is returned as an error.
    pub async fn run(mut self, files: &[PathBuf]) -> LedgerResult<RunReport> {
        for path in files {
            if let Err(err) = self.process_file(path).await {
                log::error!("{err}; continuing with the next file");
                self.report.files_failed += 1;
            }
        }
        self.finish().await
    }

    /// Process every row of one file
    pub async fn process_file(&mut self, path: &Path) -> Result<(), FileError> {
        log::info!("Importing {}...", path.display());
        let file = File::open(path).map_err(|source| FileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.process_reader(path, file).await?;
        log::info!("Importing {}...done", path.display());
        Ok(())
    }

    /// Process every row read from `input`; `source` is only used for messages
    pub async fn process_reader<R: Read>(
        &mut self,
        source: &Path,
        input: R,
    ) -> Result<(), FileError> {
        let source_name = source.display().to_string();
        let mut reader = csv_reader(input, self.delimiter);
        // Rows are decoded one by one so that a row in another encoding only skips itself
        let mut record = ByteRecord::new();
        let mut row_number = 0;
        loop {
            let has_row = reader
                .read_byte_record(&mut record)
                .map_err(|source_err| FileError::Read {
                    path: source.to_path_buf(),
                    source: source_err,
                })?;
            if !has_row {
                break;
            }
            row_number += 1;
            let outcome = match StringRecord::from_byte_record(record.clone()) {
                Ok(row) => self.process_row(&source_name, row_number, &row).await,
                Err(err) => {
                    log::warn!(
                        "{source_name}:{row_number}: skipping row {:?}: {err}",
                        raw_bytes_row(&record)
                    );
                    RowOutcome::Skipped(err.to_string())
                }
            };
            self.report.record(&outcome);
        }
        self.report.files_processed += 1;
        Ok(())
    }

    async fn process_row(&mut self, source: &str, row_number: usize, row: &StringRecord) -> RowOutcome {
        let candidate = match self.normalizer.normalize(row) {
            Ok(candidate) => candidate,
            Err(err) => {
                log::warn!(
                    "{source}:{row_number}: skipping row {:?}: {err}",
                    raw_row(row)
                );
                return RowOutcome::Skipped(err.to_string());
            }
        };

        match self.process_candidate(&candidate).await {
            Ok(reconciled) => {
                let outcome = match (reconciled.kind, reconciled.changed) {
                    (MatchKind::Created, _) => RowOutcome::Created,
                    (MatchKind::Matched, true) => RowOutcome::Updated,
                    (MatchKind::Matched, false) => RowOutcome::Unchanged,
                };
                log_outcome(source, row_number, &outcome, &reconciled);
                outcome
            }
            Err(err) => {
                log::warn!(
                    "{source}:{row_number}: could not reconcile row {:?}: {err}",
                    raw_row(row)
                );
                RowOutcome::Skipped(err.to_string())
            }
        }
    }

    /// Resolve the candidate's account and reconcile it against that account
    pub async fn process_candidate(
        &mut self,
        candidate: &TransactionCandidate,
    ) -> ReconciliationResult<Reconciled> {
        let account_id = self
            .resolver
            .resolve(&mut self.session, &candidate.account_name)
            .await?;
        self.engine
            .reconcile(
                &mut self.session,
                candidate,
                &account_id,
                self.claims.for_account(&account_id),
            )
            .await
    }

    /// Counters so far
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Commit the staged writes, or discard them for a dry run
    pub async fn finish(self) -> LedgerResult<RunReport> {
        let mut report = self.report;
        if self.dry_run {
            let discarded = self.session.discard();
            log::info!("Dry run: discarding {discarded} staged ledger writes");
        } else {
            report.committed = Some(self.session.commit().await?);
        }
        Ok(report)
    }
}

fn raw_row(row: &StringRecord) -> String {
    row.iter().collect::<Vec<_>>().join(",")
}

fn raw_bytes_row(row: &ByteRecord) -> String {
    row.iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

fn log_outcome(source: &str, row_number: usize, outcome: &RowOutcome, reconciled: &Reconciled) {
    let entry = &reconciled.entry;
    let verb = match outcome {
        RowOutcome::Created => "created",
        RowOutcome::Updated => "updated",
        RowOutcome::Unchanged => "unchanged",
        RowOutcome::Skipped(_) => "skipped",
    };
    if matches!(outcome, RowOutcome::Unchanged) {
        log::debug!(
            "{source}:{row_number}: {verb} {} {} {:?} [{}]",
            entry.date,
            entry.amount,
            entry.payee,
            entry.id
        );
    } else {
        log::info!(
            "{source}:{row_number}: {verb} {} {} {:?} [{}]",
            entry.date,
            entry.amount,
            entry.payee,
            entry.id
        );
    }
}
