use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Chainable, ErrorDetail, Result};

/// A serialized data format.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: ErrorDetail + 'static;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Reads and parses the file at `path`.
    fn read<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let path = path.as_ref();
        let string = fs::read_to_string(path).chain_with(|| error! {
            "failed to open file for reading",
            "file path" => path.display(),
        })?;

        Self::from_str(&string).chain_with(|| error! {
            "failed to parse file",
            "file path" => path.display(),
        })
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        #[derive(Debug, Default, Copy, Clone)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::Error);

impl Json {
    /// Writes `value` as pretty-printed JSON to `path`, creating parent
    /// directories as needed.
    pub fn write<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(value)?;
        write_file(path, json)
    }
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create output directory",
            "directory" => parent.display(),
        })?;
    }

    fs::write(path, contents).chain_with(|| error! {
        "failed to open/create file for writing",
        "file path" => path.display(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize, Serialize, PartialEq)]
    struct Sample {
        name: String,
        count: usize,
    }

    #[test]
    fn json_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/sample.json");
        let sample = Sample { name: "tdd".into(), count: 2 };

        Json::write(&path, &sample).unwrap();
        let read: Sample = Json::read(&path).unwrap();
        assert_eq!(read, sample);
    }

    #[test]
    fn parse_failures_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "name = ").unwrap();

        let error = Toml::read::<Sample, _>(&path).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("failed to parse file"));
        assert!(message.contains("broken.toml"));
    }
}
