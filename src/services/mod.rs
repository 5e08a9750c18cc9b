pub mod data_fetcher;
pub mod pipeline;
pub mod predictor;
pub mod rate_limiter;
pub mod schedule;
pub mod standings;

pub use data_fetcher::*;
pub use pipeline::*;
pub use predictor::*;
pub use rate_limiter::*;
pub use schedule::*;
pub use standings::*;
