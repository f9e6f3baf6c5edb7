use crate::error::{Result, StoreError};
use crate::event::Event;
use crate::record::Record;
use chrono::NaiveDateTime;
use fs2::FileExt;
use log::{debug, warn};
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A store over the five-column event schema.
pub type EventStore = Store<Event>;

/// Stable identifier the store assigns to a record when it enters memory.
///
/// Identifiers are never reused by the store that issued them, so they stay
/// valid across other records' removal, unlike positions. They are not
/// written to the file: reloading assigns fresh identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Controls the exclusive-access guard taken when a store is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    /// Hold an advisory exclusive lock on `<file>.lock` while the store is
    /// alive. A second store on the same file fails with
    /// [`StoreError::Locked`].
    #[default]
    Exclusive,
    /// No locking. Concurrent stores race and the last full rewrite wins.
    None,
}

/// What [`Store::load`] does with a row it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole load with [`StoreError::MalformedRecord`]. The
    /// in-memory collection is left untouched.
    #[default]
    Abort,
    /// Drop the row, log a warning and keep reading.
    Skip,
}

/// Builder for opening a [`Store`] with non-default settings.
///
/// ```no_run
/// use eventbook::{EventStore, LockMode, MalformedPolicy};
///
/// let store = EventStore::builder("events.csv")
///     .lock_mode(LockMode::None)
///     .malformed(MalformedPolicy::Skip)
///     .open()?;
/// # Ok::<(), eventbook::StoreError>(())
/// ```
#[derive(Debug)]
pub struct StoreBuilder<R> {
    path: PathBuf,
    lock_mode: LockMode,
    malformed: MalformedPolicy,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> StoreBuilder<R> {
    fn new(path: PathBuf) -> Self {
        StoreBuilder {
            path,
            lock_mode: LockMode::default(),
            malformed: MalformedPolicy::default(),
            _record: PhantomData,
        }
    }

    pub fn lock_mode(mut self, lock_mode: LockMode) -> Self {
        self.lock_mode = lock_mode;
        self
    }

    pub fn malformed(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    /// Create the parent directory if needed, take the lock, and load the
    /// file. The file itself is not created until the first write.
    pub fn open(self) -> Result<Store<R>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Open {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let lock = match self.lock_mode {
            LockMode::Exclusive => Some(acquire_lock(&self.path)?),
            LockMode::None => None,
        };

        let mut store = Store {
            path: self.path,
            records: Vec::new(),
            ids: Vec::new(),
            next_id: 0,
            malformed: self.malformed,
            disk_hash: None,
            _lock: lock,
        };
        store.load()?;
        Ok(store)
    }
}

/// An ordered, write-through collection of records backed by one CSV file.
///
/// The store is the only writer of its file. Every mutation rewrites the
/// whole file (header plus one row per record) through a temporary file and
/// a rename, so a crash mid-write leaves the previous contents intact.
///
/// Positions ([`remove_at`](Self::remove_at)) are valid only until the next
/// mutation; [`RecordId`]s stay valid for the store's lifetime.
#[derive(Debug)]
pub struct Store<R> {
    path: PathBuf,
    records: Vec<R>,
    ids: Vec<RecordId>,
    next_id: u64,
    malformed: MalformedPolicy,
    /// xxh64 of the file bytes this store last read or wrote; `None` while
    /// the file does not exist.
    disk_hash: Option<u64>,
    _lock: Option<File>,
}

impl<R: Record> Store<R> {
    pub fn builder(path: impl AsRef<Path>) -> StoreBuilder<R> {
        StoreBuilder::new(path.as_ref().to_path_buf())
    }

    /// Open with the default settings: exclusive lock, abort on malformed rows.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).open()
    }

    /// Replace the in-memory collection with the file's contents, in file
    /// order.
    ///
    /// A missing file yields an empty collection. On error the in-memory
    /// collection is unchanged.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Read`] if the file exists but cannot be read.
    /// - [`StoreError::SchemaMismatch`] if the header lacks a required column.
    /// - [`StoreError::MalformedRecord`] for an unparseable row, under
    ///   [`MalformedPolicy::Abort`].
    pub fn load(&mut self) -> Result<()> {
        let (records, disk_hash) = match fs::read(&self.path) {
            Ok(bytes) => {
                let records = decode(&self.path, &bytes, self.malformed)?;
                (records, Some(content_hash(&bytes)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (Vec::new(), None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let ids: Vec<RecordId> = (0..records.len()).map(|_| self.issue_id()).collect();
        self.ids = ids;
        self.records = records;
        self.disk_hash = disk_hash;
        debug!(
            "eventbook: loaded {} records from {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// The current records in insertion order.
    pub fn list(&self) -> &[R] {
        &self.records
    }

    /// Records paired with their identifiers, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (RecordId, &R)> {
        self.ids.iter().copied().zip(self.records.iter())
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.position(id).map(|index| &self.records[index])
    }

    /// Current position of the record with this identifier.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.ids.iter().position(|&candidate| candidate == id)
    }

    /// Identifier of the record currently at `index`.
    pub fn id_at(&self, index: usize) -> Option<RecordId> {
        self.ids.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record and persist the whole collection.
    ///
    /// The record is stored in its [`canonical`](Record::canonical) form.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if the write fails; the record stays in
    /// memory regardless.
    pub fn insert(&mut self, record: R) -> Result<RecordId> {
        let id = self.issue_id();
        self.records.push(record.canonical());
        self.ids.push(id);
        self.persist()?;
        Ok(id)
    }

    /// Remove the record at `index` and persist.
    ///
    /// # Errors
    ///
    /// - [`StoreError::IndexOutOfRange`] if `index >= len()`; nothing is
    ///   changed or written.
    /// - [`StoreError::Persistence`] if the write fails.
    pub fn remove_at(&mut self, index: usize) -> Result<R> {
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        self.ids.remove(index);
        let removed = self.records.remove(index);
        self.persist()?;
        Ok(removed)
    }

    /// Remove the record with this identifier and persist.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no record has this identifier.
    /// - [`StoreError::Persistence`] if the write fails.
    pub fn remove(&mut self, id: RecordId) -> Result<R> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        self.remove_at(index)
    }

    /// Rewrite the backing file from the in-memory collection.
    ///
    /// Logs a warning when the file changed on disk since this store last
    /// read or wrote it; the rewrite still happens.
    pub fn persist(&mut self) -> Result<()> {
        if let Ok(true) = self.is_stale() {
            warn!(
                "eventbook: {} changed on disk since it was last loaded, overwriting",
                self.path.display()
            );
        }

        let persistence = |source| StoreError::Persistence {
            path: self.path.clone(),
            source,
        };
        let bytes = encode(&self.records).map_err(persistence)?;
        write_atomic(&self.path, &bytes).map_err(persistence)?;

        self.disk_hash = Some(content_hash(&bytes));
        debug!(
            "eventbook: wrote {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Whether the file on disk differs from what this store last read or
    /// wrote (edited, replaced, created or deleted by someone else).
    pub fn is_stale(&self) -> Result<bool> {
        let current = match fs::read(&self.path) {
            Ok(bytes) => Some(content_hash(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(current != self.disk_hash)
    }

    fn issue_id(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Store<Event> {
    /// Build an [`Event`] from its fields, append it and persist.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if the write fails.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        date: NaiveDateTime,
        comments: impl Into<String>,
        category: impl Into<String>,
        notifications: impl Into<String>,
    ) -> Result<RecordId> {
        let event = Event::new(name, date)
            .with_comments(comments)
            .with_category(category)
            .with_notifications(notifications);
        self.insert(event)
    }
}

/// Hash of raw file bytes, used to notice writes made behind the store's back.
fn content_hash(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh64::xxh64(bytes, 0)
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn acquire_lock(path: &Path) -> Result<File> {
    let lock_path = sidecar(path, ".lock");
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&lock_path)
        .map_err(|source| StoreError::Open {
            path: lock_path.clone(),
            source,
        })?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => Err(StoreError::Locked {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(StoreError::Open {
            path: lock_path,
            source,
        }),
    }
}

/// Write to `<path>.tmp`, sync, then rename over `path`. On failure the
/// temporary file is removed and `path` is left as it was.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = sidecar(path, ".tmp");
    let result = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_data()?;
        drop(file);
        fs::rename(&tmp_path, path)
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn encode<R: Record>(records: &[R]) -> io::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(R::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.into_inner().map_err(|e| e.into_error())
}

fn decode<R: Record>(path: &Path, bytes: &[u8], policy: MalformedPolicy) -> Result<Vec<R>> {
    // A zero-byte file has no header to check and no rows.
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| malformed(path, &e))?
        .clone();
    let missing: Vec<String> = R::HEADERS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == **required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let parsed = row.and_then(|row| row.deserialize::<R>(Some(&headers)));
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => match policy {
                MalformedPolicy::Abort => return Err(malformed(path, &e)),
                MalformedPolicy::Skip => warn!("eventbook: skipping row: {}", malformed(path, &e)),
            },
        }
    }
    Ok(records)
}

fn malformed(path: &Path, err: &csv::Error) -> StoreError {
    let line = err.position().map_or(0, |p| p.line());
    let reason = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    };
    StoreError::MalformedRecord {
        path: path.to_path_buf(),
        line,
        reason,
    }
}
