use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use ndarray_rand::rand::{
    prelude::{SliceRandom, ThreadRng},
    rngs::StdRng,
    thread_rng, SeedableRng,
};

use crate::error::{Error, Result};

/// Sampler decides the order in which the corpus is dealt into train and test.
pub enum Sampler {
    Thread(ThreadRng),
    Seeded(StdRng),
}

impl Sampler {
    /// Unseeded sampler; every run produces a different split.
    pub fn thread() -> Self {
        Self::Thread(thread_rng())
    }

    /// Reproducible sampler; the same seed and input give the same split.
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        match self {
            Self::Thread(rng) => items.shuffle(rng),
            Self::Seeded(rng) => items.shuffle(rng),
        }
    }
}

impl From<Option<u64>> for Sampler {
    fn from(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::thread, Self::seeded)
    }
}

/// Where the corpus comes from and where its two halves go.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub input: PathBuf,
    /// Fraction of the corpus that goes to the test file.
    pub test_ratio: f64,
    pub train_output: PathBuf,
    pub test_output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    pub total: usize,
    pub num_train: usize,
    pub num_test: usize,
}

fn check_ratio(test_ratio: f64) -> Result<()> {
    if (0.0..=1.0).contains(&test_ratio) {
        Ok(())
    } else {
        Err(Error::InvalidRatio(test_ratio))
    }
}

/// Number of test items for a corpus of `total` items: `floor(total * test_ratio)`.
pub fn num_test(total: usize, test_ratio: f64) -> usize {
    ((total as f64 * test_ratio).floor() as usize).min(total)
}

/// Split dataset into train and test data.
/// `test_ratio` is a ratio of the number of test data to the whole dataset.
/// The whole dataset is shuffled first, then the leading part becomes train data.
pub fn train_test_split<T>(
    mut items: Vec<T>,
    test_ratio: f64,
    sampler: &mut Sampler,
) -> Result<(Vec<T>, Vec<T>)> {
    check_ratio(test_ratio)?;

    let n_trains = items.len() - num_test(items.len(), test_ratio);
    sampler.shuffle(&mut items);
    let test = items.split_off(n_trains);
    Ok((items, test))
}

/// Read every line of `path` as raw bytes, each one keeping its own line terminator.
/// No encoding is assumed.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<Vec<u8>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut lines = Vec::new();
    loop {
        let mut line = Vec::new();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| Error::io(path, e))?;
        if read == 0 {
            break;
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Write `lines` verbatim to `path`, truncating whatever was there.
pub fn write_lines<L>(path: impl AsRef<Path>, lines: &[L]) -> Result<()>
where
    L: AsRef<[u8]>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer
            .write_all(line.as_ref())
            .map_err(|e| Error::io(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))
}

impl SplitConfig {
    /// Fails on a ratio that is NaN or outside `[0, 1]`.
    pub fn check(&self) -> Result<()> {
        check_ratio(self.test_ratio)
    }
}

/// Shuffle an already read corpus and write both halves.
pub fn write_split<L>(
    config: &SplitConfig,
    lines: Vec<L>,
    sampler: &mut Sampler,
) -> Result<SplitSummary>
where
    L: AsRef<[u8]>,
{
    let total = lines.len();
    let (train, test) = train_test_split(lines, config.test_ratio, sampler)?;
    write_lines(&config.train_output, &train)?;
    write_lines(&config.test_output, &test)?;

    tracing::debug!(
        num_train = train.len(),
        num_test = test.len(),
        "wrote split"
    );

    Ok(SplitSummary {
        total,
        num_train: train.len(),
        num_test: test.len(),
    })
}

/// Read the corpus at `config.input`, shuffle it and write both halves.
/// The ratio is checked before any file is touched.
pub fn split_file(config: &SplitConfig, sampler: &mut Sampler) -> Result<SplitSummary> {
    config.check()?;

    let lines = read_lines(&config.input)?;
    tracing::debug!(total = lines.len(), input = %config.input.display(), "read corpus");
    write_split(config, lines, sampler)
}
