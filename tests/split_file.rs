use std::{collections::HashMap, fs, path::Path};

use ldakit::{split::read_lines, split_file, Error, Sampler, SplitConfig};
use tempfile::TempDir;

fn config(dir: &Path, test_ratio: f64) -> SplitConfig {
    SplitConfig {
        input: dir.join("corpus.txt"),
        test_ratio,
        train_output: dir.join("corpus.train"),
        test_output: dir.join("corpus.test"),
    }
}

fn count_lines<'a>(lines: impl IntoIterator<Item = &'a Vec<u8>>) -> HashMap<&'a [u8], usize> {
    let mut counts = HashMap::new();
    for line in lines {
        *counts.entry(line.as_slice()).or_insert(0) += 1;
    }
    counts
}

#[test]
fn split_conserves_every_line() {
    let tmp = TempDir::new().unwrap();
    // Duplicates must survive the split as often as they appear in the input.
    let corpus = (0..50)
        .map(|i| format!("doc{} w{} w{}\n", i % 40, i, i + 1))
        .collect::<String>();
    fs::write(tmp.path().join("corpus.txt"), &corpus).unwrap();

    let config = config(tmp.path(), 0.1);
    let summary = split_file(&config, &mut Sampler::thread()).unwrap();
    assert_eq!(50, summary.total);
    assert_eq!(45, summary.num_train);
    assert_eq!(5, summary.num_test);

    let train = read_lines(&config.train_output).unwrap();
    let test = read_lines(&config.test_output).unwrap();
    assert_eq!(summary.num_train, train.len());
    assert_eq!(summary.num_test, test.len());

    let input = read_lines(&config.input).unwrap();
    assert_eq!(
        count_lines(&input),
        count_lines(train.iter().chain(test.iter()))
    );
}

#[test]
fn line_terminators_are_kept() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("corpus.txt"), "a\r\nb\nc").unwrap();

    let config = config(tmp.path(), 1.0);
    split_file(&config, &mut Sampler::seeded(3)).unwrap();

    let mut test = read_lines(&config.test_output).unwrap();
    test.sort();
    assert_eq!(vec![b"a\r\n".to_vec(), b"b\n".to_vec(), b"c".to_vec()], test);
    assert_eq!("", fs::read_to_string(&config.train_output).unwrap());
}

#[test]
fn non_utf8_lines_are_copied_verbatim() {
    let tmp = TempDir::new().unwrap();
    let corpus = b"caf\xe9 w1\nplain w2\n\xff\xfe w3\n";
    fs::write(tmp.path().join("corpus.txt"), corpus).unwrap();

    let config = config(tmp.path(), 0.5);
    let summary = split_file(&config, &mut Sampler::thread()).unwrap();
    assert_eq!(3, summary.total);
    assert_eq!(2, summary.num_train);
    assert_eq!(1, summary.num_test);

    let mut written = fs::read(&config.train_output).unwrap();
    written.extend(fs::read(&config.test_output).unwrap());
    let mut written_lines = written
        .split_inclusive(|&b| b == b'\n')
        .map(<[u8]>::to_vec)
        .collect::<Vec<_>>();
    written_lines.sort();

    let mut expected = corpus
        .split_inclusive(|&b| b == b'\n')
        .map(<[u8]>::to_vec)
        .collect::<Vec<_>>();
    expected.sort();
    assert_eq!(expected, written_lines);
}

#[test]
fn zero_ratio_writes_empty_test_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("corpus.txt"), "x\ny\nz\n").unwrap();

    let config = config(tmp.path(), 0.0);
    let summary = split_file(&config, &mut Sampler::thread()).unwrap();
    assert_eq!(3, summary.num_train);
    assert_eq!(0, summary.num_test);
    assert_eq!("", fs::read_to_string(&config.test_output).unwrap());
    assert_eq!(3, read_lines(&config.train_output).unwrap().len());
}

#[test]
fn empty_corpus_gives_empty_outputs() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("corpus.txt"), "").unwrap();

    let config = config(tmp.path(), 0.5);
    let summary = split_file(&config, &mut Sampler::thread()).unwrap();
    assert_eq!(0, summary.total);
    assert_eq!("", fs::read_to_string(&config.train_output).unwrap());
    assert_eq!("", fs::read_to_string(&config.test_output).unwrap());
}

#[test]
fn seeded_split_is_reproducible() {
    let tmp = TempDir::new().unwrap();
    let corpus = (0..30).map(|i| format!("{}\n", i)).collect::<String>();
    fs::write(tmp.path().join("corpus.txt"), corpus).unwrap();
    let config = config(tmp.path(), 0.3);

    split_file(&config, &mut Sampler::seeded(2024)).unwrap();
    let first = fs::read_to_string(&config.test_output).unwrap();
    split_file(&config, &mut Sampler::seeded(2024)).unwrap();
    let second = fs::read_to_string(&config.test_output).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invalid_ratio_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("corpus.txt"), "a\n").unwrap();

    let config = config(tmp.path(), 1.5);
    let err = split_file(&config, &mut Sampler::thread()).unwrap_err();
    assert!(matches!(err, Error::InvalidRatio(_)));
    assert!(!config.train_output.exists());
    assert!(!config.test_output.exists());
}

#[test]
fn missing_input_names_the_path() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path(), 0.5);
    match split_file(&config, &mut Sampler::thread()).unwrap_err() {
        Error::Io { path, .. } => assert_eq!(config.input, path),
        other => panic!("unexpected error: {}", other),
    }
}
