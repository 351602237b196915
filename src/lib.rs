/*!
A compiler from [IANA tz database] source text to [RFC 8536] TZif binary
files.

The tz database ships as a set of human-maintained text files describing
zones, daylight saving rules, zone aliases and leap seconds. Unix systems
consume a compiled form of that data: one TZif file per zone, usually found
under `/usr/share/zoneinfo`. This crate implements the compilation step,
analogous to the reference `zic(8)` tool, for a documented subset of the
source grammar (named rule sets, standard zones and fixed-offset zones).

The pipeline has four stages, each usable on its own:

* [`tzdata`] parses source text into a typed file model.
* [`civil`] provides the proleptic Gregorian arithmetic used to resolve
  symbolic day specifications like `lastSun` or `Sun>=8` and to convert
  date-times to Unix seconds, without consulting any host time zone
  facility.
* [`resolve`] walks each zone's continuation chain and produces its ordered
  list of UT transition instants.
* [`tzif`] models the RFC 8536 binary format and encodes, decodes and
  validates it.

The [`compile`](crate::compile()) and [`compile_bytes`] entry points tie the
stages together:

```
static TZDATA: &str = "\
Rule    Fict    1981    max     -       Mar     lastSun 1:00u   1:00    S
Rule    Fict    1996    max     -       Oct     lastSun 1:00u   0       -
Zone    Fictional/City  1:00    Fict    CE%sT
";

let compiled = tzc::compile_bytes(TZDATA.as_bytes())?;
let bytes = &compiled["Fictional/City"];
assert_eq!(&bytes[0..4], b"TZif");
# Ok::<(), tzc::Error>(())
```

Fetching and unpacking release archives from IANA is deliberately out of
the core: the [`dist`] module (feature `dist`, enabled by default) reads
`tzdata-*.tar.gz` archives and defines the narrow transport interface a
downloader must satisfy, but ships no HTTP client of its own.

[IANA tz database]: https://www.iana.org/time-zones
[RFC 8536]: https://datatracker.ietf.org/doc/html/rfc8536
*/

#![deny(rustdoc::broken_intra_doc_links)]
// We generally want all types to impl Debug.
#![warn(missing_debug_implementations)]

pub use crate::{
    compile::{compile, compile_bytes},
    error::Error,
};

#[macro_use]
mod logging;

pub mod civil;
pub mod compile;
#[cfg(feature = "dist")]
pub mod dist;
mod error;
pub mod resolve;
pub mod tzdata;
pub mod tzif;
