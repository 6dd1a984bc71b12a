//! Resumable download ledger.
//!
//! The decade-spanning downloads run for days, so progress is kept in a CSV
//! with one row per year. Interrupted runs restart with `--resume`, which
//! reloads the CSV and picks up where the last sweep left off.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CdsClient, CdsError, JobState, Request};

/// The CDS queue starts deprioritising users with too many open requests.
pub const MAX_IN_FLIGHT: usize = 19;

/// Pause between polling two jobs in the same sweep.
const POLL_PAUSE: Duration = Duration::from_secs(2);

/// Pause between sweeps.
const SWEEP_SLEEP: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "started")]
    Started,
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "failed")]
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub year: i32,
    pub status: Status,
    pub request_id: String,
}

#[derive(Debug)]
pub struct Ledger {
    pub entries: Vec<Entry>,
}

impl Ledger {
    pub fn new(years: impl IntoIterator<Item = i32>) -> Self {
        let entries = years
            .into_iter()
            .map(|year| Entry {
                year,
                status: Status::NotStarted,
                request_id: String::new(),
            })
            .collect();

        Ledger { entries }
    }

    pub fn load(path: &Path) -> Result<Self, CdsError> {
        let mut reader = csv::Reader::from_path(path)?;
        let entries = reader.deserialize().collect::<Result<Vec<Entry>, _>>()?;

        Ok(Ledger { entries })
    }

    pub fn save(&self, path: &Path) -> Result<(), CdsError> {
        let mut writer = csv::Writer::from_path(path)?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;

        Ok(())
    }

    pub fn all_done(&self) -> bool {
        self.entries.iter().all(|e| e.status == Status::Done)
    }

    pub fn count(&self, status: Status) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn first_index(&self, status: Status) -> Option<usize> {
        self.entries.iter().position(|e| e.status == status)
    }

    pub fn indices(&self, status: Status) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.status == status)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Drives a ledger to completion against one dataset.
///
/// Each sweep tops the queue up to [`MAX_IN_FLIGHT`] jobs (one submission per
/// sweep, as the queue rebalances slowly anyway), polls every started job,
/// downloads completed ones to `{output_dir}/{year}.nc`, and persists the
/// ledger before sleeping.
pub async fn drive<F>(
    client: &CdsClient,
    dataset: &str,
    ledger_path: &Path,
    output_dir: &Path,
    resume: bool,
    years: std::ops::Range<i32>,
    make_request: F,
) -> Result<(), CdsError>
where
    F: Fn(i32) -> Request,
{
    let mut ledger = if resume {
        Ledger::load(ledger_path)?
    } else {
        let ledger = Ledger::new(years);
        ledger.save(ledger_path)?;
        ledger
    };

    loop {
        if ledger.all_done() {
            println!("All files are downloaded.");
            return Ok(());
        }

        if ledger.count(Status::Started) < MAX_IN_FLIGHT {
            if let Some(i) = ledger.first_index(Status::NotStarted) {
                let year = ledger.entries[i].year;
                println!("Submitting request for data for year: {}", year);
                let job = client.submit(dataset, &make_request(year)).await?;
                ledger.entries[i].request_id = job.id;
                ledger.entries[i].status = Status::Started;
            }
        }

        for i in ledger.indices(Status::Started) {
            let year = ledger.entries[i].year;
            let request_id = ledger.entries[i].request_id.clone();

            match client.status(&request_id).await? {
                JobState::Completed => {
                    ledger.entries[i].status = Status::Done;
                    println!("Downloading data for year: {}", year);
                    let dest = output_path(output_dir, year);
                    if let Err(e) = client.download_result(&request_id, &dest).await {
                        eprintln!("Error downloading data for year {}: {}", year, e);
                    }
                }
                JobState::Failed => {
                    ledger.entries[i].status = Status::Failed;
                    eprintln!("Failed to download data for year: {}", year);
                }
                state => println!("Data for year {} is {}.", year, state),
            }

            tokio::time::sleep(POLL_PAUSE).await;
        }

        ledger.save(ledger_path)?;
        tokio::time::sleep(SWEEP_SLEEP).await;
    }
}

fn output_path(output_dir: &Path, year: i32) -> PathBuf {
    output_dir.join(format!("{}.nc", year))
}

// -- Tests -------------------------------------------------------------------
