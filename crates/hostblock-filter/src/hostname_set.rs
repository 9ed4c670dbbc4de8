//! Blocked Hostname Set
//!
//! Loads a rank-prefixed site list into an exact-match set.
//!
//! Format, one record per line:
//! - `<rank>,<hostname>` → `hostname`
//! - only the text after the FIRST comma is kept (`1,a,b` → `a,b`)
//! - no comma → the empty hostname
//!
//! The set is built once at startup and only read afterwards, so it can
//! be shared behind an `Arc` without locking.

use memchr::memchr;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use xxhash_rust::xxh3::Xxh3Builder;

/// Errors while loading the site list
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't open site list {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while reading site list: {0}")]
    Io(#[from] io::Error),
}

/// Immutable set of blocked hostnames, compared byte for byte
pub struct HostnameSet {
    hosts: HashSet<Box<[u8]>, Xxh3Builder>,
}

impl HostnameSet {
    fn empty() -> Self {
        Self {
            hosts: HashSet::with_hasher(Xxh3Builder::new()),
        }
    }

    /// Build a set from already-split records
    pub fn load<I, L>(records: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut set = Self::empty();
        for record in records {
            set.insert_record(record.as_ref());
        }
        set
    }

    /// Read records from a stream, one per `\n`-terminated line
    ///
    /// A trailing `\r` is treated as part of the line ending. Bytes are
    /// not required to be UTF-8.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(Self::read_records(reader)?)
    }

    /// Open and read a site list file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        File::open(path)
            .and_then(Self::read_records)
            .map_err(|source| ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
    }

    fn read_records<R: Read>(reader: R) -> io::Result<Self> {
        let mut reader = BufReader::new(reader);
        let mut set = Self::empty();
        let mut line = Vec::new();
        let mut records = 0usize;

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            set.insert_record(strip_line_ending(&line));
            records += 1;
        }

        if set.is_empty() {
            warn!("Site list is empty, no hostname will be blocked");
        }
        info!(
            "Loaded site list: {} records, {} unique hostnames",
            records,
            set.len()
        );

        Ok(set)
    }

    fn insert_record(&mut self, record: &[u8]) {
        self.hosts.insert(Box::from(hostname_field(record)));
    }

    /// Exact, case-sensitive membership test
    #[inline]
    pub fn contains(&self, candidate: &[u8]) -> bool {
        self.hosts.contains(candidate)
    }

    /// Number of unique hostnames
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Iterate over the stored hostnames (arbitrary order)
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.hosts.iter().map(|host| &**host)
    }
}

impl fmt::Debug for HostnameSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostnameSet")
            .field("len", &self.hosts.len())
            .finish()
    }
}

/// Everything after the first comma, or the empty hostname
fn hostname_field(record: &[u8]) -> &[u8] {
    match memchr(b',', record) {
        Some(comma) => &record[comma + 1..],
        None => &[],
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_duplicates_collapse() {
        let set = HostnameSet::load(["1,a.com", "2,b.com", "2,b.com"]);

        assert_eq!(set.len(), 2);
        assert!(set.contains(b"a.com"));
        assert!(set.contains(b"b.com"));

        let mut hosts: Vec<&[u8]> = set.iter().collect();
        hosts.sort();
        assert_eq!(hosts, vec![&b"a.com"[..], &b"b.com"[..]]);
    }

    #[test]
    fn test_only_first_comma_splits() {
        let set = HostnameSet::load(["7,odd,name"]);
        assert!(set.contains(b"odd,name"));
        assert!(!set.contains(b"name"));
    }

    #[test]
    fn test_record_without_comma_is_empty_hostname() {
        let set = HostnameSet::load(["example.com"]);
        assert_eq!(set.len(), 1);
        assert!(set.contains(b""));
        assert!(!set.contains(b"example.com"));
    }

    #[test]
    fn test_exact_case_sensitive_match() {
        let set = HostnameSet::load(["1,Example.com"]);
        assert!(set.contains(b"Example.com"));
        assert!(!set.contains(b"example.com"));
        assert!(!set.contains(b"Example.com."));
        assert!(!set.contains(b"www.Example.com"));
    }

    #[test]
    fn test_from_reader_line_endings() {
        let content = "1,google.com\r\n2,youtube.com\n3,facebook.com";
        let set = HostnameSet::from_reader(Cursor::new(content)).unwrap();

        assert_eq!(set.len(), 3);
        assert!(set.contains(b"google.com"));
        assert!(set.contains(b"youtube.com"));
        assert!(set.contains(b"facebook.com"));
    }

    #[test]
    fn test_from_reader_non_utf8() {
        let content: &[u8] = b"1,caf\xe9.example\n";
        let set = HostnameSet::from_reader(content).unwrap();
        assert!(set.contains(b"caf\xe9.example"));
    }

    #[test]
    fn test_from_reader_empty() {
        let set = HostnameSet::from_reader(Cursor::new("")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_path_missing_file() {
        let path = std::env::temp_dir().join(format!(
            "hostblock-missing-{}.txt",
            std::process::id()
        ));
        let err = HostnameSet::from_path(&path).unwrap_err();

        match err {
            ConfigError::Unreadable { path: reported, source } => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_path_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "hostblock-sites-{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, "1,tracker.ads\n2,bad.example\n").unwrap();

        let set = HostnameSet::from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(set.len(), 2);
        assert!(set.contains(b"tracker.ads"));
    }
}
