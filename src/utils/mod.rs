pub mod poller;

pub use poller::{PollState, Poller, PollerHandle, SnapshotSource};
