//! Helpers around a topic-model trainer: splitting a line corpus into train and test
//! files, and extracting the time/perplexity/log-likelihood trace from a training log.

pub mod error;
pub mod split;
pub mod trace;

pub use error::{Error, Result};
pub use split::{split_file, train_test_split, write_split, Sampler, SplitConfig, SplitSummary};
pub use trace::{Extractor, MalformedPolicy, Trace, TraceRow, TraceSummary};

#[macro_export]
macro_rules! assert_rel_eq_arr2 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
}
