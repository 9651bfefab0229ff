use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt::Debug,
    fs,
    io::{ErrorKind, Write},
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
};

use crate::store::StoreError;

/// A value mirrored to a JSON file.
///
/// A missing file opens as `T::default()`. [`Db::flush`] rewrites the whole
/// file through a temporary sibling so readers never see a partial write.
#[derive(Debug)]
pub struct Db<T> {
    path: PathBuf,
    data: T,
    pretty: bool,
}

impl<T> Db<T>
where
    T: Serialize + DeserializeOwned + Default + Debug,
{
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = PathBuf::from(path.as_ref());
        let data = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => T::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => T::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            data,
            pretty: false,
        })
    }

    pub fn empty<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: PathBuf::from(path.as_ref()),
            data: T::default(),
            pretty: false,
        }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        let json = if self.pretty {
            serde_json::to_vec_pretty(&self.data)
        } else {
            serde_json::to_vec(&self.data)
        }
        .map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(&self.path).map_err(|err| StoreError::Io {
            path: self.path.clone(),
            source: err.error,
        })?;

        log::debug!("wrote {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }
}

impl<T> Deref for Db<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for Db<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn missing_file_opens_as_default() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let db: Db<Vec<u32>> = Db::open(temp.path().join("missing.json"))?;
        assert!(db.is_empty());
        Ok(())
    }

    #[test]
    fn flush_creates_parent_dirs_and_round_trips() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("values.json");

        let mut db: Db<Vec<u32>> = Db::open(&path)?;
        db.push(7);
        db.push(9);
        db.flush()?;

        assert_eq!(std::fs::read_to_string(&path)?, "[7,9]");
        let reopened: Db<Vec<u32>> = Db::open(&path)?;
        assert_eq!(*reopened, vec![7, 9]);
        Ok(())
    }

    #[test]
    fn pretty_output_is_indented() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("map.json");

        let mut db = Db::<std::collections::BTreeMap<String, bool>>::open(&path)?.pretty();
        db.insert("fullscreen".into(), true);
        db.flush()?;

        assert_eq!(std::fs::read_to_string(&path)?, "{\n  \"fullscreen\": true\n}");
        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported_with_its_path() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "[1,")?;

        let err = Db::<Vec<u32>>::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { path: ref p, .. } if p == &path));
        Ok(())
    }
}
