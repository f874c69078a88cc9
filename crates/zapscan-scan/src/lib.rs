//! ZAPScan Scan - The scan-orchestration core
//!
//! - `PhasePoller`: start a phase, poll its progress until completion or the
//!   attempt budget runs out
//! - `snapshot` / `delta`: capture the alert set for a target and count what
//!   a phase added
//! - `ScanOrchestrator`: the state machine sequencing health check, discovery,
//!   attack and reporting over an explicit `RunContext`
//! - `report`: text and JSON renderings of the finished `ScanRunSummary`

pub mod context;
pub mod orchestrator;
pub mod poller;
pub mod report;
pub mod snapshot;
pub mod summary;

pub use context::{RunContext, ScanState};
pub use orchestrator::ScanOrchestrator;
pub use poller::{PhaseOutcome, PhasePoller, PollSchedule};
pub use report::{FileReporter, ReportSink};
pub use snapshot::{delta, snapshot, try_snapshot, AlertSnapshot};
pub use summary::{PhaseSummary, ScanRunSummary};
