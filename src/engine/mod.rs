mod batch;
mod setups;
mod snapshot;

pub use batch::{AssetInput, BatchOutcome, build_snapshots, build_snapshots_with};
pub use setups::{MaCrossover, RsiRebound, SetupEngine, SetupRule, TrendFollowing, evaluate_setups};
pub use snapshot::{SnapshotOptions, assemble, build_market_snapshot, build_market_snapshot_with};
