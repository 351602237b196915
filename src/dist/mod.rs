/*!
Reading IANA time zone database release archives, and the narrow
interface a downloader for them must satisfy.

IANA distributes releases as gzip-compressed tarballs from
`https://data.iana.org/time-zones/`. [`read_archive`] unpacks one into a
[`Release`]: the version string, the `leapseconds` file and the data
files (recognized by their `# tzdb data for` magic header).

Actually fetching the tarball over HTTP is deliberately not implemented
here: [`Client`] takes any [`Transport`] implementation, which keeps the
core free of a network stack and makes the download path trivially
testable with canned responses. The transport contract carries an opaque
cache validator (an HTTP ETag) so callers can avoid re-downloading an
unchanged release.
*/

use std::{collections::BTreeMap, io::Read};

use flate2::read::GzDecoder;

use crate::error::{err, Error, ErrorContext};

/// The base URL for time zone data on the IANA data server.
pub const BASE_URL: &str = "https://data.iana.org/time-zones/";

/// The path of the latest data tarball, relative to [`BASE_URL`].
const LATEST_DATA_PATH: &str = "tzdata-latest.tar.gz";

/// The magic header identifying tz data files in a release archive.
pub const DATA_FILE_MAGIC: &[u8] = b"# tzdb data for";

/// The name of the leap seconds file in a release archive.
const LEAP_SECONDS_FILENAME: &str = "leapseconds";

/// The name of the version file in a release archive.
const VERSION_FILENAME: &str = "version";

/// An unpacked IANA time zone database release.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Release {
    /// The release version, e.g. `2024b`.
    pub version: String,
    /// The tz data files, keyed by file name (`europe`, `northamerica`,
    /// …). Every value starts with the `# tzdb data for` magic header.
    pub data_files: BTreeMap<String, Vec<u8>>,
    /// The contents of the `leapseconds` file.
    pub leap_seconds: Vec<u8>,
}

/// Unpacks a release archive: a gzip-compressed tarball as served from
/// `https://data.iana.org/time-zones/releases/`.
///
/// Archive members that are neither the version file, the leap seconds
/// file nor magic-headed data files (the README, awk scripts and so on)
/// are skipped.
pub fn read_archive(bytes: &[u8]) -> Result<Release, Error> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut release = Release::default();
    let entries = archive
        .entries()
        .map_err(Error::io)
        .with_context(|| err!("failed to read archive"))?;
    for entry in entries {
        let mut entry = entry
            .map_err(Error::io)
            .with_context(|| err!("failed to read archive entry"))?;
        let name = entry
            .path()
            .map_err(Error::io)?
            .to_string_lossy()
            .into_owned();
        let mut content = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut content)
            .map_err(Error::io)
            .with_context(|| err!("failed to read archive file {name:?}"))?;
        match name.as_str() {
            VERSION_FILENAME => {
                let version = String::from_utf8_lossy(&content);
                let version = version.trim();
                if version.is_empty() {
                    return Err(err!("empty version file"));
                }
                release.version = version.to_string();
            }
            LEAP_SECONDS_FILENAME => {
                release.leap_seconds = content;
            }
            _ => {
                if content.starts_with(DATA_FILE_MAGIC) {
                    trace!("found data file {name}");
                    release.data_files.insert(name, content);
                }
            }
        }
    }
    if release.data_files.is_empty() {
        return Err(err!("no data files found in archive"));
    }
    if release.version.is_empty() {
        return Err(err!("no version found in archive"));
    }
    Ok(release)
}

/// The result of a conditional fetch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Fetched {
    /// The resource has not changed since the presented cache validator.
    NotModified,
    /// The resource body, along with its new cache validator if the
    /// server provided one.
    Body {
        /// The resource bytes.
        bytes: Vec<u8>,
        /// The opaque cache validator to present on the next fetch.
        etag: Option<String>,
    },
}

/// The narrow interface a downloader must satisfy.
///
/// An implementation performs a GET of `url`. When `etag` is given it
/// should be sent as an `If-None-Match` header, and a 304 response maps
/// to [`Fetched::NotModified`]. Status codes other than 200 and 304 are
/// errors.
pub trait Transport {
    /// Fetches `url`, conditionally when `etag` is given.
    fn fetch(&self, url: &str, etag: Option<&str>)
        -> Result<Fetched, Error>;
}

/// A client for the IANA time zone data server, generic over its
/// [`Transport`].
pub struct Client {
    transport: Box<dyn Transport>,
}

impl Client {
    /// Creates a client that downloads through the given transport.
    pub fn new(transport: Box<dyn Transport>) -> Client {
        Client { transport }
    }

    /// Downloads and unpacks the latest release.
    ///
    /// Pass the `etag` returned by a previous call to avoid downloading
    /// an unchanged release: when the server reports the resource
    /// unmodified, the release is `None` and the input validator is
    /// returned unchanged.
    pub fn latest(
        &self,
        etag: Option<&str>,
    ) -> Result<(Option<Release>, Option<String>), Error> {
        match self.download(LATEST_DATA_PATH, etag)? {
            Fetched::NotModified => {
                Ok((None, etag.map(|etag| etag.to_string())))
            }
            Fetched::Body { bytes, etag } => {
                let release = read_archive(&bytes)?;
                info!(
                    "downloaded tzdb release {} ({} data files)",
                    release.version,
                    release.data_files.len(),
                );
                Ok((Some(release), etag))
            }
        }
    }

    /// Fetches the resource at `path` relative to [`BASE_URL`].
    pub fn download(
        &self,
        path: &str,
        etag: Option<&str>,
    ) -> Result<Fetched, Error> {
        let url = format!("{BASE_URL}{path}");
        self.transport
            .fetch(&url, etag)
            .with_context(|| err!("GET {url:?}"))
    }
}

impl core::fmt::Debug for Client {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
