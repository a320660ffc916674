// Human-facing rendering of snapshots and rankings
pub mod narrator;
pub mod tables;

pub use {
    narrator::{Narrative, Statement, Topic, narrate},
    tables::{fibonacci_table, levels_table, momentum_table, setups_table},
};
