mod maths_utils;
mod perf;
mod time_utils;

pub use maths_utils::{
    get_max, get_min, linear_regression_slope, mean_and_stddev, paired_pct_returns, pearson_correlation,
};
pub use time_utils::{STANDARD_DATE_FORMAT, format_date, month_key, parse_date, week_key};
