//! Durable append-only journal store.
//!
//! ## Layout
//!
//! ```text
//! <dir>/state.journal
//!   frame := len:u32le ‖ payload[len] ‖ keccak256(payload)[32]
//!   payload := borsh(Vec<Put>)
//! ```
//!
//! Each [`StateStore::apply`] call appends exactly one frame and syncs it
//! before the batch becomes visible to readers. The journal file is held
//! under an exclusive lock for the life of the store, so a second open of
//! the same directory fails with [`std::io::ErrorKind::WouldBlock`].
//!
//! On open the journal is replayed into memory. Only the final frame may be
//! cut short by a crash: it is dropped and the file truncated back to the
//! last complete frame. Everything else fails closed with
//! [`StoreError::Corrupt`]: a checksum mismatch, a length above
//! [`MAX_PAYLOAD_LEN`], or an incomplete frame with a complete frame after it.

use alloy_primitives::keccak256;
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{decode, encode, Put, StateStore, StoreError, StoreResult};

/// File name of the journal inside the store directory.
pub const JOURNAL_FILE: &str = "state.journal";

/// Largest payload a single frame may carry.
pub const MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

const LEN_PREFIX: usize = 4;
const CHECKSUM_LEN: usize = 32;

struct Writer {
    file: File,
    len: u64,
}

/// Store backed by a journal file, replayed into memory on open.
pub struct JournalStore {
    path: PathBuf,
    writer: Mutex<Writer>,
    state: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl JournalStore {
    /// Open (or create) the journal inside `dir`.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(JOURNAL_FILE);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.try_lock_exclusive().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                format!("journal {} is locked by another store: {e}", path.display()),
            )
        })?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let replayed = replay(&bytes)?;
        if replayed.valid_len < bytes.len() as u64 {
            tracing::warn!(
                path = %path.display(),
                dropped_bytes = bytes.len() as u64 - replayed.valid_len,
                "truncating incomplete journal tail"
            );
            file.set_len(replayed.valid_len)?;
            file.sync_data()?;
        }
        file.seek(SeekFrom::Start(replayed.valid_len))?;

        tracing::info!(
            path = %path.display(),
            frames = replayed.frames,
            keys = replayed.state.len(),
            "opened journal store"
        );

        Ok(Self {
            path,
            writer: Mutex::new(Writer {
                file,
                len: replayed.valid_len,
            }),
            state: RwLock::new(replayed.state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JournalStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.state.read().get(key).cloned())
    }

    fn apply(&self, batch: Vec<Put>) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let frame = encode_frame(&batch)?;

        let mut guard = self.writer.lock();
        let Writer { file, len } = &mut *guard;
        let start = *len;
        if let Err(e) = file.write_all(&frame).and_then(|()| file.sync_data()) {
            // Roll back a partial append so later frames stay contiguous.
            file.set_len(start)?;
            file.seek(SeekFrom::Start(start))?;
            return Err(e.into());
        }
        *len = start + frame.len() as u64;

        let mut state = self.state.write();
        for put in batch {
            state.insert(put.key, put.value);
        }
        Ok(())
    }
}

fn encode_frame(batch: &[Put]) -> StoreResult<Vec<u8>> {
    let payload = encode(batch)?;
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|_| payload.len() <= MAX_PAYLOAD_LEN)
        .ok_or_else(|| StoreError::Codec(format!("batch of {} bytes too large", payload.len())))?;
    let mut frame = Vec::with_capacity(LEN_PREFIX + payload.len() + CHECKSUM_LEN);
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    frame.extend_from_slice(keccak256(&payload).as_slice());
    Ok(frame)
}

struct Replayed {
    state: BTreeMap<Vec<u8>, Vec<u8>>,
    valid_len: u64,
    frames: usize,
}

fn replay(bytes: &[u8]) -> StoreResult<Replayed> {
    let mut state = BTreeMap::new();
    let mut offset = 0usize;
    let mut frames = 0usize;

    while let Some(rest) = bytes.get(offset..).filter(|rest| !rest.is_empty()) {
        let corrupt = StoreError::Corrupt {
            offset: offset as u64,
        };
        match parse_frame(rest) {
            Frame::Complete {
                payload,
                checksum,
                size,
            } => {
                if keccak256(payload).as_slice() != checksum {
                    return Err(corrupt);
                }
                let batch: Vec<Put> = decode(payload)?;
                for put in batch {
                    state.insert(put.key, put.value);
                }
                offset += size;
                frames += 1;
            }
            Frame::Incomplete if holds_complete_frame(rest) => return Err(corrupt),
            Frame::Incomplete => break,
            Frame::Oversized => return Err(corrupt),
        }
    }

    Ok(Replayed {
        state,
        valid_len: offset as u64,
        frames,
    })
}

enum Frame<'a> {
    Complete {
        payload: &'a [u8],
        checksum: &'a [u8],
        size: usize,
    },
    Incomplete,
    Oversized,
}

fn parse_frame(rest: &[u8]) -> Frame<'_> {
    let Some(len_bytes) = rest.get(..LEN_PREFIX) else {
        return Frame::Incomplete;
    };
    let mut len_buf = [0u8; LEN_PREFIX];
    len_buf.copy_from_slice(len_bytes);
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_PAYLOAD_LEN {
        return Frame::Oversized;
    }

    let payload_end = LEN_PREFIX + len;
    match (
        rest.get(LEN_PREFIX..payload_end),
        rest.get(payload_end..payload_end + CHECKSUM_LEN),
    ) {
        (Some(payload), Some(checksum)) => Frame::Complete {
            payload,
            checksum,
            size: payload_end + CHECKSUM_LEN,
        },
        _ => Frame::Incomplete,
    }
}

// A torn append leaves a strict prefix of one frame. A checksummed frame
// starting anywhere inside that region means an earlier length was damaged.
fn holds_complete_frame(tail: &[u8]) -> bool {
    (1..tail.len()).any(|start| match tail.get(start..).map(parse_frame) {
        Some(Frame::Complete {
            payload, checksum, ..
        }) => keccak256(payload).as_slice() == checksum,
        _ => false,
    })
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn put(k: &[u8], v: &[u8]) -> Put {
        Put::new(k.to_vec(), v.to_vec())
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = JournalStore::open(dir.path()).unwrap();
            store.apply(vec![put(b"a", b"1"), put(b"b", b"2")]).unwrap();
            store.apply(vec![put(b"c", b"3")]).unwrap();
        }

        let store = JournalStore::open(dir.path()).unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.get(b"c").unwrap(), Some(b"3".to_vec()));
        assert_eq!(store.path(), dir.path().join(JOURNAL_FILE));
    }

    #[test]
    fn test_torn_tail_is_dropped() {
        let dir = tempdir().unwrap();
        {
            let store = JournalStore::open(dir.path()).unwrap();
            store.apply(vec![put(b"kept", b"1")]).unwrap();
        }

        let path = dir.path().join(JOURNAL_FILE);
        let intact_len = std::fs::metadata(&path).unwrap().len();
        let torn = encode_frame(&[put(b"lost", b"2")]).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&torn[..torn.len() - 5]).unwrap();
        drop(file);

        let store = JournalStore::open(dir.path()).unwrap();
        assert_eq!(store.get(b"kept").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"lost").unwrap(), None);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), intact_len);

        store.apply(vec![put(b"after", b"3")]).unwrap();
        drop(store);
        let store = JournalStore::open(dir.path()).unwrap();
        assert_eq!(store.get(b"after").unwrap(), Some(b"3".to_vec()));
    }

    #[test]
    fn test_checksum_mismatch_is_corruption() {
        let dir = tempdir().unwrap();
        {
            let store = JournalStore::open(dir.path()).unwrap();
            store.apply(vec![put(b"a", b"1")]).unwrap();
        }

        let path = dir.path().join(JOURNAL_FILE);
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[LEN_PREFIX] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            JournalStore::open(dir.path()),
            Err(StoreError::Corrupt { offset: 0 })
        ));
    }

    fn three_frame_journal() -> (tempfile::TempDir, PathBuf, Vec<u8>) {
        let dir = tempdir().unwrap();
        {
            let store = JournalStore::open(dir.path()).unwrap();
            store.apply(vec![put(b"a", b"1")]).unwrap();
            store.apply(vec![put(b"b", b"2")]).unwrap();
            store.apply(vec![put(b"c", b"3")]).unwrap();
        }
        let path = dir.path().join(JOURNAL_FILE);
        let bytes = std::fs::read(&path).unwrap();
        (dir, path, bytes)
    }

    #[test]
    fn test_damaged_first_length_is_corruption() {
        let (dir, path, mut bytes) = three_frame_journal();
        let original_len = bytes.len();
        bytes[3] = 0x7f;
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            JournalStore::open(dir.path()),
            Err(StoreError::Corrupt { offset: 0 })
        ));
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            original_len as u64
        );
    }

    #[test]
    fn test_length_past_eof_with_frames_after_is_corruption() {
        let (dir, path, mut bytes) = three_frame_journal();
        let overshoot = u32::try_from(bytes.len()).unwrap();
        bytes[..LEN_PREFIX].copy_from_slice(&overshoot.to_le_bytes());
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            JournalStore::open(dir.path()),
            Err(StoreError::Corrupt { offset: 0 })
        ));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_second_open_denied_while_locked() {
        let dir = tempdir().unwrap();
        let first = JournalStore::open(dir.path()).unwrap();

        match JournalStore::open(dir.path()) {
            Err(StoreError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::WouldBlock),
            Err(e) => panic!("Expected Io error, got {e:?}"),
            Ok(_) => panic!("Expected the journal to be locked"),
        }

        first.apply(vec![put(b"a", b"1")]).unwrap();
        drop(first);
        let reopened = JournalStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn test_empty_batch_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = JournalStore::open(dir.path()).unwrap();
        store.apply(Vec::new()).unwrap();
        assert_eq!(
            std::fs::metadata(dir.path().join(JOURNAL_FILE))
                .unwrap()
                .len(),
            0
        );
    }
}
