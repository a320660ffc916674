use {
    crate::config::Price,
    serde::{Deserialize, Serialize},
};

/// Trailing-return momentum of one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumScore {
    pub symbol: String,
    pub last_close: Price,
    /// (window in bars, trailing return) for every configured window.
    pub returns: Vec<(usize, Option<f64>)>,
    /// Mean of the available returns. `None` when no window had enough history.
    pub score: Option<f64>,
}

impl MomentumScore {
    pub fn return_over(&self, window: usize) -> Option<f64> {
        self.returns
            .iter()
            .find(|(w, _)| *w == window)
            .and_then(|(_, r)| *r)
    }
}
