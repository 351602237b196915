/*!
The TZif binary format, as specified by [RFC 8536].

These binary files are the ones commonly found in Unix distributions in the
`/usr/share/zoneinfo` directory. A file consists of a version 1 header and
data block with 32-bit transition times and, for version 2 and up, a second
header and data block with 64-bit transition times followed by a footer
carrying a POSIX TZ string.

This module models the format structurally: [`Data`] holds both sections
verbatim, [`Data::encode`] and [`decode`] convert to and from bytes, and
[`validate`] cross-checks every header count and data invariant, reporting
all violations together.

All multi-octet integers are big-endian two's complement.

[RFC 8536]: https://datatracker.ietf.org/doc/html/rfc8536
*/

use crate::error::{err, Error, ErrorContext};

/// The four-octet ASCII sequence that identifies a TZif file.
pub const MAGIC: [u8; 4] = *b"TZif";

/// The version of a TZif file.
///
/// In version 1, time values are 32 bits. From version 2 upwards time
/// values are 64 bits, and the file carries both a version 1 section (for
/// backward compatibility) and a version 2+ section. Versions 3 and 4 only
/// relax requirements on the footer and leap-second records; their layout
/// is that of version 2.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub enum Version {
    /// Version 1, identified by a NUL version octet.
    #[default]
    V1,
    /// Version 2, identified by an ASCII `2`.
    V2,
    /// Version 3, identified by an ASCII `3`.
    V3,
    /// Version 4, identified by an ASCII `4`. Not in RFC 8536, but
    /// specified by `tzfile(5)`.
    V4,
}

impl Version {
    /// Returns the version octet as written in the header.
    pub fn byte(self) -> u8 {
        match self {
            Version::V1 => 0x00,
            Version::V2 => b'2',
            Version::V3 => b'3',
            Version::V4 => b'4',
        }
    }

    /// Parses a version octet.
    pub fn from_byte(byte: u8) -> Result<Version, Error> {
        match byte {
            0x00 => Ok(Version::V1),
            b'2' => Ok(Version::V2),
            b'3' => Ok(Version::V3),
            b'4' => Ok(Version::V4),
            _ => Err(Error::encoder(format!(
                "unrecognized version octet 0x{byte:02X}"
            ))),
        }
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Version::V1 => f.write_str("V1 (0x00)"),
            Version::V2 => f.write_str("V2 (0x32)"),
            Version::V3 => f.write_str("V3 (0x33)"),
            Version::V4 => f.write_str("V4 (0x34)"),
        }
    }
}

/// A TZif header.
///
/// ```text
/// +---------------+---+
/// |  magic    (4) |ver|
/// +---------------+---+---------------------------------------+
/// |           [unused - reserved for future use] (15)         |
/// +---------------+---------------+---------------+-----------+
/// |  isutcnt  (4) |  isstdcnt (4) |  leapcnt  (4) |
/// +---------------+---------------+---------------+
/// |  timecnt  (4) |  typecnt  (4) |  charcnt  (4) |
/// +---------------+---------------+---------------+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    /// The version of the file's format.
    pub version: Version,
    /// The number of UT/local indicators in the data block. Must be zero
    /// or equal to `typecnt`.
    pub isutcnt: u32,
    /// The number of standard/wall indicators in the data block. Must be
    /// zero or equal to `typecnt`.
    pub isstdcnt: u32,
    /// The number of leap-second records in the data block.
    pub leapcnt: u32,
    /// The number of transition times in the data block.
    pub timecnt: u32,
    /// The number of local time type records in the data block. Must not
    /// be zero in the authoritative section: many TZif readers reject
    /// files with zero time types even when the footer carries all the
    /// useful information.
    pub typecnt: u32,
    /// The total number of octets used by the time zone designations,
    /// including the trailing NUL of the last designation.
    pub charcnt: u32,
}

impl Header {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.push(self.version.byte());
        out.extend_from_slice(&[0; 15]);
        out.extend_from_slice(&self.isutcnt.to_be_bytes());
        out.extend_from_slice(&self.isstdcnt.to_be_bytes());
        out.extend_from_slice(&self.leapcnt.to_be_bytes());
        out.extend_from_slice(&self.timecnt.to_be_bytes());
        out.extend_from_slice(&self.typecnt.to_be_bytes());
        out.extend_from_slice(&self.charcnt.to_be_bytes());
    }
}

/// A six-octet local time type record.
///
/// ```text
/// +---------------+---+---+
/// |  utoff (4)    |dst|idx|
/// +---------------+---+---+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LocalTimeType {
    /// Seconds to add to UT to determine local time. Must not be
    /// `-2^31`, and should be in `[-89999, 93599]` (more than -25 hours
    /// and less than 26 hours).
    pub utoff: i32,
    /// Whether this local time type is daylight saving time.
    pub is_dst: bool,
    /// A zero-based index into the designation octets, selecting the
    /// NUL-terminated string starting at that position.
    pub idx: u8,
}

impl LocalTimeType {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.utoff.to_be_bytes());
        out.push(u8::from(self.is_dst));
        out.push(self.idx);
    }
}

/// A leap-second record in a version 1 data block: a 32-bit occurrence
/// time and the value of the accumulated correction on or after it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct V1LeapSecond {
    /// The Unix leap time at which the correction occurs.
    pub occur: i32,
    /// The accumulated correction on or after the occurrence.
    pub corr: i32,
}

/// A leap-second record in a version 2+ data block: a 64-bit occurrence
/// time and the value of the accumulated correction on or after it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LeapSecond {
    /// The Unix leap time at which the correction occurs.
    pub occur: i64,
    /// The accumulated correction on or after the occurrence.
    pub corr: i32,
}

/// The data block of a version 1 section, with 32-bit transition times.
///
/// ```text
/// +---------------------------------------------------------+
/// |  transition times          (timecnt x TIME_SIZE)        |
/// |  transition types          (timecnt)                    |
/// |  local time type records   (typecnt x 6)                |
/// |  time zone designations    (charcnt)                    |
/// |  leap-second records       (leapcnt x (TIME_SIZE + 4))  |
/// |  standard/wall indicators  (isstdcnt)                   |
/// |  UT/local indicators       (isutcnt)                    |
/// +---------------------------------------------------------+
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct V1DataBlock {
    /// Transition times, sorted in strictly ascending order.
    pub transition_times: Vec<i32>,
    /// For each transition time, a zero-based index into
    /// `local_time_types`.
    pub transition_types: Vec<u8>,
    /// The local time type records.
    pub local_time_types: Vec<LocalTimeType>,
    /// The designation octets: concatenated NUL-terminated strings, which
    /// may overlap when one is a suffix of another.
    pub designations: Vec<u8>,
    /// Leap-second records sorted by occurrence time.
    pub leap_seconds: Vec<V1LeapSecond>,
    /// Standard/wall indicators: true when the corresponding local time
    /// type's transitions were specified as standard time.
    pub std_wall: Vec<bool>,
    /// UT/local indicators: true when the corresponding local time type's
    /// transitions were specified as UT.
    pub ut_local: Vec<bool>,
}

impl V1DataBlock {
    fn write_to(&self, out: &mut Vec<u8>) {
        for &time in &self.transition_times {
            out.extend_from_slice(&time.to_be_bytes());
        }
        out.extend_from_slice(&self.transition_types);
        for typ in &self.local_time_types {
            typ.write_to(out);
        }
        out.extend_from_slice(&self.designations);
        for leap in &self.leap_seconds {
            out.extend_from_slice(&leap.occur.to_be_bytes());
            out.extend_from_slice(&leap.corr.to_be_bytes());
        }
        for &std in &self.std_wall {
            out.push(u8::from(std));
        }
        for &ut in &self.ut_local {
            out.push(u8::from(ut));
        }
    }
}

/// The data block of a version 2+ section, with 64-bit transition times.
/// Versions 2, 3 and 4 all use this layout.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct V2DataBlock {
    /// Transition times, sorted in strictly ascending order.
    pub transition_times: Vec<i64>,
    /// For each transition time, a zero-based index into
    /// `local_time_types`.
    pub transition_types: Vec<u8>,
    /// The local time type records.
    pub local_time_types: Vec<LocalTimeType>,
    /// The designation octets: concatenated NUL-terminated strings, which
    /// may overlap when one is a suffix of another.
    pub designations: Vec<u8>,
    /// Leap-second records sorted by occurrence time.
    pub leap_seconds: Vec<LeapSecond>,
    /// Standard/wall indicators: true when the corresponding local time
    /// type's transitions were specified as standard time.
    pub std_wall: Vec<bool>,
    /// UT/local indicators: true when the corresponding local time type's
    /// transitions were specified as UT.
    pub ut_local: Vec<bool>,
}

impl V2DataBlock {
    fn write_to(&self, out: &mut Vec<u8>) {
        for &time in &self.transition_times {
            out.extend_from_slice(&time.to_be_bytes());
        }
        out.extend_from_slice(&self.transition_types);
        for typ in &self.local_time_types {
            typ.write_to(out);
        }
        out.extend_from_slice(&self.designations);
        for leap in &self.leap_seconds {
            out.extend_from_slice(&leap.occur.to_be_bytes());
            out.extend_from_slice(&leap.corr.to_be_bytes());
        }
        for &std in &self.std_wall {
            out.push(u8::from(std));
        }
        for &ut in &self.ut_local {
            out.push(u8::from(ut));
        }
    }
}

/// The footer of a version 2+ file: a TZ string framed by ASCII newlines.
///
/// ```text
/// +---+--------------------+---+
/// | NL|  TZ string (0...)  |NL |
/// +---+--------------------+---+
/// ```
///
/// The TZ string describes how to compute local time after the last
/// transition in the data block. It must not contain NUL octets and should
/// not begin with a colon.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Footer {
    /// The TZ string. May be empty, meaning the information is not
    /// available.
    pub tz_string: String,
}

impl Footer {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(b'\n');
        out.extend_from_slice(self.tz_string.as_bytes());
        out.push(b'\n');
    }
}

/// A complete TZif file, both sections included.
///
/// For a version 1 file only the `v1_*` fields are meaningful. For version
/// 2 and up, the file carries the version 1 section (possibly with all
/// counts zero, as a minimal compatibility stub) followed by the version
/// 2+ section and the footer. Both headers carry the file's version octet.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Data {
    /// The file's version.
    pub version: Version,
    /// The version 1 header.
    pub v1_header: Header,
    /// The version 1 data block.
    pub v1_data: V1DataBlock,
    /// The version 2+ header. Unused for version 1 files.
    pub v2_header: Header,
    /// The version 2+ data block. Unused for version 1 files.
    pub v2_data: V2DataBlock,
    /// The footer. Unused for version 1 files.
    pub v2_footer: Footer,
}

impl Data {
    /// Encodes this file to bytes.
    ///
    /// The header counts are written as stored; use [`validate`] first to
    /// ensure they are consistent with the data blocks.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut out = vec![];
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// Like [`Data::encode`], but appends to an existing buffer.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        self.v1_header.write_to(out);
        self.v1_data.write_to(out);
        if self.version == Version::V1 {
            return Ok(());
        }
        if self.v2_header.version != self.version {
            return Err(Error::encoder(format!(
                "version mismatch: file is {} and v2+ header is {}",
                self.version, self.v2_header.version,
            )));
        }
        self.v2_header.write_to(out);
        self.v2_data.write_to(out);
        self.v2_footer.write_to(out);
        Ok(())
    }
}

/// Decodes a TZif file from bytes.
///
/// Trailing bytes after the encoded file are ignored.
pub fn decode(bytes: &[u8]) -> Result<Data, Error> {
    let mut rd = Reader { bytes, pos: 0 };
    let mut data = Data::default();

    data.v1_header = read_header(&mut rd)
        .with_context(|| err!("failed to read first header"))?;
    data.version = data.v1_header.version;
    data.v1_data = read_v1_block(&mut rd, &data.v1_header)
        .with_context(|| err!("failed to read v1 data block"))?;
    if data.version == Version::V1 {
        return Ok(data);
    }

    data.v2_header = read_header(&mut rd)
        .with_context(|| err!("failed to read v2+ header"))?;
    if data.v2_header.version == Version::V1 {
        return Err(Error::encoder(
            "second header cannot be version 1".to_string(),
        ));
    }
    data.version = data.v2_header.version;
    data.v2_data = read_v2_block(&mut rd, &data.v2_header)
        .with_context(|| err!("failed to read v2+ data block"))?;
    data.v2_footer = read_footer(&mut rd)
        .with_context(|| err!("failed to read footer"))?;
    Ok(data)
}

/// A byte-slice cursor used by the decoder.
struct Reader<'b> {
    bytes: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    fn take(&mut self, n: usize) -> Result<&'b [u8], Error> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                Error::encoder(format!(
                    "unexpected end of data: need {n} bytes at offset {}",
                    self.pos,
                ))
            })?;
        let taken = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(taken)
    }

    fn u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, Error> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i32(&mut self) -> Result<i32, Error> {
        Ok(i32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> Result<i64, Error> {
        Ok(i64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }
}

fn read_header(rd: &mut Reader<'_>) -> Result<Header, Error> {
    let magic = rd.take(4)?;
    if magic != MAGIC {
        return Err(Error::encoder(format!("invalid magic: {magic:?}")));
    }
    let version = Version::from_byte(rd.u8()?)?;
    // Reserved for future use.
    rd.take(15)?;
    Ok(Header {
        version,
        isutcnt: rd.u32()?,
        isstdcnt: rd.u32()?,
        leapcnt: rd.u32()?,
        timecnt: rd.u32()?,
        typecnt: rd.u32()?,
        charcnt: rd.u32()?,
    })
}

fn read_local_time_type(rd: &mut Reader<'_>) -> Result<LocalTimeType, Error> {
    Ok(LocalTimeType {
        utoff: rd.i32()?,
        is_dst: rd.u8()? != 0,
        idx: rd.u8()?,
    })
}

fn read_v1_block(
    rd: &mut Reader<'_>,
    header: &Header,
) -> Result<V1DataBlock, Error> {
    let mut block = V1DataBlock::default();
    for _ in 0..header.timecnt {
        block.transition_times.push(rd.i32()?);
    }
    for _ in 0..header.timecnt {
        block.transition_types.push(rd.u8()?);
    }
    for _ in 0..header.typecnt {
        block.local_time_types.push(read_local_time_type(rd)?);
    }
    block.designations = rd.take(header.charcnt as usize)?.to_vec();
    for _ in 0..header.leapcnt {
        block
            .leap_seconds
            .push(V1LeapSecond { occur: rd.i32()?, corr: rd.i32()? });
    }
    for _ in 0..header.isstdcnt {
        block.std_wall.push(rd.u8()? != 0);
    }
    for _ in 0..header.isutcnt {
        block.ut_local.push(rd.u8()? != 0);
    }
    Ok(block)
}

fn read_v2_block(
    rd: &mut Reader<'_>,
    header: &Header,
) -> Result<V2DataBlock, Error> {
    let mut block = V2DataBlock::default();
    for _ in 0..header.timecnt {
        block.transition_times.push(rd.i64()?);
    }
    for _ in 0..header.timecnt {
        block.transition_types.push(rd.u8()?);
    }
    for _ in 0..header.typecnt {
        block.local_time_types.push(read_local_time_type(rd)?);
    }
    block.designations = rd.take(header.charcnt as usize)?.to_vec();
    for _ in 0..header.leapcnt {
        block
            .leap_seconds
            .push(LeapSecond { occur: rd.i64()?, corr: rd.i32()? });
    }
    for _ in 0..header.isstdcnt {
        block.std_wall.push(rd.u8()? != 0);
    }
    for _ in 0..header.isutcnt {
        block.ut_local.push(rd.u8()? != 0);
    }
    Ok(block)
}

fn read_footer(rd: &mut Reader<'_>) -> Result<Footer, Error> {
    if rd.u8()? != b'\n' {
        return Err(Error::encoder("footer must start with a newline"));
    }
    let mut tz = vec![];
    loop {
        let byte = rd.u8()?;
        if byte == b'\n' {
            break;
        }
        tz.push(byte);
    }
    let tz_string = String::from_utf8(tz)
        .map_err(|_| Error::encoder("TZ string is not valid UTF-8"))?;
    Ok(Footer { tz_string })
}

/// The time zone designation octets of a file under construction.
///
/// Designations are NUL-terminated strings addressed by a byte index.
/// Inserting a string that already exists as a NUL-terminated run in the
/// pool (in particular, as a suffix of an earlier designation) reuses the
/// existing index instead of growing the pool: `"ST"` inserted after
/// `"HST"` resolves to the interior index of `"ST\0"`. The reference
/// compiler shares suffixes the same way, which matters for byte-exact
/// output.
#[derive(Clone, Debug, Default)]
pub struct DesignationPool {
    bytes: Vec<u8>,
}

impl DesignationPool {
    /// Creates an empty pool.
    pub fn new() -> DesignationPool {
        DesignationPool::default()
    }

    /// Inserts a designation and returns its index, reusing an existing
    /// NUL-terminated occurrence when possible.
    pub fn insert(&mut self, designation: &str) -> Result<u8, Error> {
        let mut needle = designation.as_bytes().to_vec();
        needle.push(0x00);
        if let Some(at) = find_subslice(&self.bytes, &needle) {
            // Indices are bounded by the insertion check below.
            return Ok(at as u8);
        }
        let at = self.bytes.len();
        if at + needle.len() > usize::from(u8::MAX) + 1 {
            return Err(Error::encoder(format!(
                "designation {designation:?} does not fit: designation \
                 indices are single octets",
            )));
        }
        self.bytes.extend_from_slice(&needle);
        Ok(at as u8)
    }

    /// Returns the pool's octets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the pool, returning its octets.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Validates a TZif structure, reporting every violation found.
///
/// Checks cover header/data count consistency, designation indices, local
/// time type offsets, transition ordering and leap-second record
/// invariants. Per the format's version policy, the version 1 section of a
/// version 2+ file is permitted to be an all-zero stub, so the non-zero
/// `typecnt`/`charcnt` requirements apply to the file's authoritative
/// section.
pub fn validate(data: &Data) -> Result<(), Error> {
    let mut errs = vec![];

    if data.version != data.v1_header.version
        || (data.version > Version::V1
            && data.v1_header.version != data.v2_header.version)
    {
        errs.push(Error::encoder(format!(
            "inconsistent version: file = {}, v1 header = {}, v2 header = {}",
            data.version, data.v1_header.version, data.v2_header.version,
        )));
    }

    validate_v1(data, &mut errs);
    if data.version > Version::V1 {
        validate_v2(data, &mut errs);
    }

    match Error::join(errs) {
        None => Ok(()),
        Some(error) => Err(error),
    }
}

fn validate_v1(data: &Data, errs: &mut Vec<Error>) {
    let header = &data.v1_header;
    let block = &data.v1_data;
    let authoritative = data.version == Version::V1;

    validate_counts(
        errs,
        "v1",
        header,
        authoritative,
        block.transition_times.len(),
        block.transition_types.len(),
        block.local_time_types.len(),
        block.designations.len(),
        block.leap_seconds.len(),
        block.std_wall.len(),
        block.ut_local.len(),
    );
    validate_types(errs, "v1", header, &block.transition_types);
    validate_local_time_types(
        errs,
        "v1",
        &block.local_time_types,
        &block.designations,
    );
    if authoritative {
        validate_ascending(
            errs,
            "v1",
            block.transition_times.iter().map(|&time| i64::from(time)),
        );
    }
    validate_leaps(
        errs,
        "v1",
        block
            .leap_seconds
            .iter()
            .map(|leap| (i64::from(leap.occur), leap.corr)),
    );
}

fn validate_v2(data: &Data, errs: &mut Vec<Error>) {
    let header = &data.v2_header;
    let block = &data.v2_data;

    validate_counts(
        errs,
        "v2",
        header,
        true,
        block.transition_times.len(),
        block.transition_types.len(),
        block.local_time_types.len(),
        block.designations.len(),
        block.leap_seconds.len(),
        block.std_wall.len(),
        block.ut_local.len(),
    );
    validate_types(errs, "v2", header, &block.transition_types);
    validate_local_time_types(
        errs,
        "v2",
        &block.local_time_types,
        &block.designations,
    );
    validate_ascending(errs, "v2", block.transition_times.iter().copied());
    validate_leaps(
        errs,
        "v2",
        block.leap_seconds.iter().map(|leap| (leap.occur, leap.corr)),
    );

    let tz = &data.v2_footer.tz_string;
    if tz.contains('\u{0}') {
        errs.push(Error::encoder("TZ string contains a NUL octet"));
    }
    if tz.starts_with(':') {
        errs.push(Error::encoder("TZ string starts with a colon"));
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_counts(
    errs: &mut Vec<Error>,
    label: &str,
    header: &Header,
    authoritative: bool,
    times: usize,
    types: usize,
    local_time_types: usize,
    designations: usize,
    leaps: usize,
    std_wall: usize,
    ut_local: usize,
) {
    if header.isutcnt != 0 && header.isutcnt != header.typecnt {
        errs.push(Error::encoder(format!(
            "invalid {label} isutcnt ({}): must be 0 or equal to typecnt \
             ({})",
            header.isutcnt, header.typecnt,
        )));
    }
    if ut_local != header.isutcnt as usize {
        errs.push(Error::encoder(format!(
            "invalid {label} isutcnt: header = {}, data = {ut_local}",
            header.isutcnt,
        )));
    }
    if header.isstdcnt != 0 && header.isstdcnt != header.typecnt {
        errs.push(Error::encoder(format!(
            "invalid {label} isstdcnt ({}): must be 0 or equal to typecnt \
             ({})",
            header.isstdcnt, header.typecnt,
        )));
    }
    if std_wall != header.isstdcnt as usize {
        errs.push(Error::encoder(format!(
            "invalid {label} isstdcnt: header = {}, data = {std_wall}",
            header.isstdcnt,
        )));
    }
    if leaps != header.leapcnt as usize {
        errs.push(Error::encoder(format!(
            "invalid {label} leapcnt: header = {}, data = {leaps}",
            header.leapcnt,
        )));
    }
    if times != header.timecnt as usize {
        errs.push(Error::encoder(format!(
            "invalid {label} timecnt: header = {}, transition times = \
             {times}",
            header.timecnt,
        )));
    }
    if times != types {
        errs.push(Error::encoder(format!(
            "inconsistent {label} transitions: transition times = {times}, \
             transition types = {types}",
        )));
    }
    if authoritative && header.typecnt == 0 {
        errs.push(Error::encoder(format!(
            "invalid {label} typecnt: must not be zero"
        )));
    }
    if local_time_types != header.typecnt as usize {
        errs.push(Error::encoder(format!(
            "invalid {label} typecnt: header = {}, data = \
             {local_time_types}",
            header.typecnt,
        )));
    }
    if authoritative && header.charcnt == 0 {
        errs.push(Error::encoder(format!(
            "invalid {label} charcnt: must not be zero"
        )));
    }
    if designations != header.charcnt as usize {
        errs.push(Error::encoder(format!(
            "invalid {label} charcnt: header = {}, data = {designations}",
            header.charcnt,
        )));
    }
}

fn validate_types(
    errs: &mut Vec<Error>,
    label: &str,
    header: &Header,
    types: &[u8],
) {
    for (i, &idx) in types.iter().enumerate() {
        if u32::from(idx) >= header.typecnt {
            errs.push(Error::encoder(format!(
                "invalid {label} transition type {i}: index {idx} is not \
                 less than typecnt {}",
                header.typecnt,
            )));
        }
    }
}

fn validate_local_time_types(
    errs: &mut Vec<Error>,
    label: &str,
    local_time_types: &[LocalTimeType],
    designations: &[u8],
) {
    if !designations.is_empty() && designations[designations.len() - 1] != 0 {
        errs.push(Error::encoder(format!(
            "invalid {label} time zone designations: missing NUL terminator",
        )));
    }
    for (i, typ) in local_time_types.iter().enumerate() {
        if typ.utoff == i32::MIN {
            errs.push(Error::encoder(format!(
                "invalid {label} local time type {i}: utoff must not be \
                 -2^31",
            )));
        } else if !(-89999..=93599).contains(&typ.utoff) {
            errs.push(Error::encoder(format!(
                "invalid {label} local time type {i}: utoff {} is outside \
                 [-89999, 93599]",
                typ.utoff,
            )));
        }
        let idx = usize::from(typ.idx);
        if idx >= designations.len() {
            errs.push(Error::encoder(format!(
                "invalid {label} local time type {i}: designation index \
                 {idx} is not less than charcnt {}",
                designations.len(),
            )));
        } else if !designations[idx..].contains(&0) {
            errs.push(Error::encoder(format!(
                "invalid {label} local time type {i}: no NUL at or after \
                 designation index {idx}",
            )));
        }
    }
}

fn validate_ascending(
    errs: &mut Vec<Error>,
    label: &str,
    times: impl Iterator<Item = i64>,
) {
    let mut prev: Option<i64> = None;
    for (i, time) in times.enumerate() {
        if let Some(prev) = prev {
            if time <= prev {
                errs.push(Error::encoder(format!(
                    "invalid {label} transition time {i}: {time} does not \
                     ascend from {prev}",
                )));
            }
        }
        prev = Some(time);
    }
}

/// The minimum distance between consecutive leap-second occurrences: 28
/// days' worth of seconds, minus a potential negative leap second.
const MIN_LEAP_SPACING: i64 = 2419199;

fn validate_leaps(
    errs: &mut Vec<Error>,
    label: &str,
    leaps: impl Iterator<Item = (i64, i32)>,
) {
    let mut prev: Option<(i64, i32)> = None;
    for (i, (occur, corr)) in leaps.enumerate() {
        match prev {
            None => {
                if occur < 0 {
                    errs.push(Error::encoder(format!(
                        "invalid {label} leap second 0: first occurrence \
                         {occur} is negative",
                    )));
                }
                if corr != 1 && corr != -1 {
                    errs.push(Error::encoder(format!(
                        "invalid {label} leap second 0: first correction \
                         {corr} is neither 1 nor -1",
                    )));
                }
            }
            Some((prev_occur, prev_corr)) => {
                if occur < prev_occur + MIN_LEAP_SPACING {
                    errs.push(Error::encoder(format!(
                        "invalid {label} leap second {i}: occurrence \
                         {occur} is not at least {MIN_LEAP_SPACING} after \
                         {prev_occur}",
                    )));
                }
                if (i64::from(corr) - i64::from(prev_corr)).abs() != 1 {
                    errs.push(Error::encoder(format!(
                        "invalid {label} leap second {i}: correction {corr} \
                         does not differ from {prev_corr} by exactly one",
                    )));
                }
            }
        }
        prev = Some((occur, corr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let header = Header {
            version: Version::V1,
            isutcnt: 1,
            isstdcnt: 2,
            leapcnt: 3,
            timecnt: 4,
            typecnt: 5,
            charcnt: 6,
        };
        let mut got = vec![];
        header.write_to(&mut got);
        let want = [
            // 4 bytes magic
            b'T', b'Z', b'i', b'f',
            // 1 byte version
            0,
            // 15 bytes reserved
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
            // 6 4-byte counts
            0, 0, 0, 1, // isutcnt
            0, 0, 0, 2, // isstdcnt
            0, 0, 0, 3, // leapcnt
            0, 0, 0, 4, // timecnt
            0, 0, 0, 5, // typecnt
            0, 0, 0, 6, // charcnt
        ];
        assert_eq!(got, want);

        let mut rd = Reader { bytes: &got, pos: 0 };
        assert_eq!(read_header(&mut rd).unwrap(), header);
    }

    /// RFC 8536, Appendix B.1: a version 1 file representing UTC with the
    /// 27 leap seconds through the end of 2016.
    fn rfc8536_b1() -> (Data, Vec<u8>) {
        let leaps: &[(i32, i32)] = &[
            (78796800, 1),
            (94694401, 2),
            (126230402, 3),
            (157766403, 4),
            (189302404, 5),
            (220924805, 6),
            (252460806, 7),
            (283996807, 8),
            (315532808, 9),
            (362793609, 10),
            (394329610, 11),
            (425865611, 12),
            (489024012, 13),
            (567993613, 14),
            (631152014, 15),
            (662688015, 16),
            (709948816, 17),
            (741484817, 18),
            (773020818, 19),
            (820454419, 20),
            (867715220, 21),
            (915148821, 22),
            (1136073622, 23),
            (1230768023, 24),
            (1341100824, 25),
            (1435708825, 26),
            (1483228826, 27),
        ];
        let data = Data {
            version: Version::V1,
            v1_header: Header {
                version: Version::V1,
                isutcnt: 1,
                isstdcnt: 1,
                leapcnt: 27,
                timecnt: 0,
                typecnt: 1,
                charcnt: 4,
            },
            v1_data: V1DataBlock {
                transition_times: vec![],
                transition_types: vec![],
                local_time_types: vec![LocalTimeType {
                    utoff: 0,
                    is_dst: false,
                    idx: 0,
                }],
                designations: b"UTC\x00".to_vec(),
                leap_seconds: leaps
                    .iter()
                    .map(|&(occur, corr)| V1LeapSecond { occur, corr })
                    .collect(),
                std_wall: vec![false],
                ut_local: vec![false],
            },
            ..Data::default()
        };

        #[rustfmt::skip]
        let want = vec![
            0x54, 0x5a, 0x69, 0x66, // magic
            0x00, // version
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x01, // isutcnt
            0x00, 0x00, 0x00, 0x01, // isstdcnt
            0x00, 0x00, 0x00, 0x1b, // leapcnt
            0x00, 0x00, 0x00, 0x00, // timecnt
            0x00, 0x00, 0x00, 0x01, // typecnt
            0x00, 0x00, 0x00, 0x04, // charcnt
            // localtimetype[0]
            0x00, 0x00, 0x00, 0x00, // utoff
            0x00,                   // dst
            0x00,                   // idx
            0x55, 0x54, 0x43, 0x00, // designations: "UTC\0"
            // leap second records: occurrence, correction
            0x04, 0xb2, 0x58, 0x00, 0x00, 0x00, 0x00, 0x01,
            0x05, 0xa4, 0xec, 0x01, 0x00, 0x00, 0x00, 0x02,
            0x07, 0x86, 0x1f, 0x82, 0x00, 0x00, 0x00, 0x03,
            0x09, 0x67, 0x53, 0x03, 0x00, 0x00, 0x00, 0x04,
            0x0b, 0x48, 0x86, 0x84, 0x00, 0x00, 0x00, 0x05,
            0x0d, 0x2b, 0x0b, 0x85, 0x00, 0x00, 0x00, 0x06,
            0x0f, 0x0c, 0x3f, 0x06, 0x00, 0x00, 0x00, 0x07,
            0x10, 0xed, 0x72, 0x87, 0x00, 0x00, 0x00, 0x08,
            0x12, 0xce, 0xa6, 0x08, 0x00, 0x00, 0x00, 0x09,
            0x15, 0x9f, 0xca, 0x89, 0x00, 0x00, 0x00, 0x0a,
            0x17, 0x80, 0xfe, 0x0a, 0x00, 0x00, 0x00, 0x0b,
            0x19, 0x62, 0x31, 0x8b, 0x00, 0x00, 0x00, 0x0c,
            0x1d, 0x25, 0xea, 0x0c, 0x00, 0x00, 0x00, 0x0d,
            0x21, 0xda, 0xe5, 0x0d, 0x00, 0x00, 0x00, 0x0e,
            0x25, 0x9e, 0x9d, 0x8e, 0x00, 0x00, 0x00, 0x0f,
            0x27, 0x7f, 0xd1, 0x0f, 0x00, 0x00, 0x00, 0x10,
            0x2a, 0x50, 0xf5, 0x90, 0x00, 0x00, 0x00, 0x11,
            0x2c, 0x32, 0x29, 0x11, 0x00, 0x00, 0x00, 0x12,
            0x2e, 0x13, 0x5c, 0x92, 0x00, 0x00, 0x00, 0x13,
            0x30, 0xe7, 0x24, 0x13, 0x00, 0x00, 0x00, 0x14,
            0x33, 0xb8, 0x48, 0x94, 0x00, 0x00, 0x00, 0x15,
            0x36, 0x8c, 0x10, 0x15, 0x00, 0x00, 0x00, 0x16,
            0x43, 0xb7, 0x1b, 0x96, 0x00, 0x00, 0x00, 0x17,
            0x49, 0x5c, 0x07, 0x97, 0x00, 0x00, 0x00, 0x18,
            0x4f, 0xef, 0x93, 0x18, 0x00, 0x00, 0x00, 0x19,
            0x55, 0x93, 0x2d, 0x99, 0x00, 0x00, 0x00, 0x1a,
            0x58, 0x68, 0x46, 0x9a, 0x00, 0x00, 0x00, 0x1b,
            0x00, // standard/wall[0]
            0x00, // UT/local[0]
        ];
        (data, want)
    }

    #[test]
    fn rfc8536_b1_utc_with_leap_seconds() {
        let (data, want) = rfc8536_b1();
        validate(&data).unwrap();
        assert_eq!(data.encode().unwrap(), want);
        assert_eq!(decode(&want).unwrap(), data);
    }

    /// RFC 8536, Appendix B.2: a version 2 file representing
    /// Pacific/Honolulu.
    fn rfc8536_b2() -> (Data, Vec<u8>) {
        let local_time_types = vec![
            LocalTimeType { utoff: -37886, is_dst: false, idx: 0 },
            LocalTimeType { utoff: -37800, is_dst: false, idx: 4 },
            LocalTimeType { utoff: -34200, is_dst: true, idx: 8 },
            LocalTimeType { utoff: -34200, is_dst: true, idx: 12 },
            LocalTimeType { utoff: -34200, is_dst: true, idx: 16 },
            LocalTimeType { utoff: -36000, is_dst: false, idx: 4 },
        ];
        let designations = b"LMT\x00HST\x00HDT\x00HWT\x00HPT\x00".to_vec();
        let counts = Header {
            version: Version::V2,
            isutcnt: 6,
            isstdcnt: 6,
            leapcnt: 0,
            timecnt: 7,
            typecnt: 6,
            charcnt: 20,
        };
        let data = Data {
            version: Version::V2,
            v1_header: counts,
            v1_data: V1DataBlock {
                transition_times: vec![
                    -2147483648,
                    -1157283000,
                    -1155436200,
                    -880198200,
                    -769395600,
                    -765376200,
                    -712150200,
                ],
                transition_types: vec![1, 2, 1, 3, 4, 1, 5],
                local_time_types: local_time_types.clone(),
                designations: designations.clone(),
                leap_seconds: vec![],
                std_wall: vec![true, false, false, false, true, false],
                ut_local: vec![true, false, false, false, true, false],
            },
            v2_header: counts,
            v2_data: V2DataBlock {
                transition_times: vec![
                    -2334101314,
                    -1157283000,
                    -1155436200,
                    -880198200,
                    -769395600,
                    -765376200,
                    -712150200,
                ],
                transition_types: vec![1, 2, 1, 3, 4, 1, 5],
                local_time_types,
                designations,
                leap_seconds: vec![],
                std_wall: vec![false, false, false, false, true, false],
                ut_local: vec![false, false, false, false, true, false],
            },
            v2_footer: Footer { tz_string: "HST10".to_string() },
        };

        #[rustfmt::skip]
        let want = vec![
            // v1 header
            0x54, 0x5a, 0x69, 0x66, // magic
            0x32, // version
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x06, // isutcnt
            0x00, 0x00, 0x00, 0x06, // isstdcnt
            0x00, 0x00, 0x00, 0x00, // leapcnt
            0x00, 0x00, 0x00, 0x07, // timecnt
            0x00, 0x00, 0x00, 0x06, // typecnt
            0x00, 0x00, 0x00, 0x14, // charcnt
            // v1 block
            0x80, 0x00, 0x00, 0x00, // trans time[0]
            0xbb, 0x05, 0x43, 0x48, // trans time[1]
            0xbb, 0x21, 0x71, 0x58, // trans time[2]
            0xcb, 0x89, 0x3d, 0xc8, // trans time[3]
            0xd2, 0x23, 0xf4, 0x70, // trans time[4]
            0xd2, 0x61, 0x49, 0x38, // trans time[5]
            0xd5, 0x8d, 0x73, 0x48, // trans time[6]
            0x01, 0x02, 0x01, 0x03, 0x04, 0x01, 0x05, // trans types
            // localtimetype[0]
            0xff, 0xff, 0x6c, 0x02, 0x00, 0x00,
            // localtimetype[1]
            0xff, 0xff, 0x6c, 0x58, 0x00, 0x04,
            // localtimetype[2]
            0xff, 0xff, 0x7a, 0x68, 0x01, 0x08,
            // localtimetype[3]
            0xff, 0xff, 0x7a, 0x68, 0x01, 0x0c,
            // localtimetype[4]
            0xff, 0xff, 0x7a, 0x68, 0x01, 0x10,
            // localtimetype[5]
            0xff, 0xff, 0x73, 0x60, 0x00, 0x04,
            0x4c, 0x4d, 0x54, 0x00, // designations[0]
            0x48, 0x53, 0x54, 0x00, // designations[4]
            0x48, 0x44, 0x54, 0x00, // designations[8]
            0x48, 0x57, 0x54, 0x00, // designations[12]
            0x48, 0x50, 0x54, 0x00, // designations[16]
            0x01, 0x00, 0x00, 0x00, 0x01, 0x00, // standard/wall
            0x01, 0x00, 0x00, 0x00, 0x01, 0x00, // UT/local
            // v2 header
            0x54, 0x5a, 0x69, 0x66, // magic
            0x32, // version
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x06, // isutcnt
            0x00, 0x00, 0x00, 0x06, // isstdcnt
            0x00, 0x00, 0x00, 0x00, // leapcnt
            0x00, 0x00, 0x00, 0x07, // timecnt
            0x00, 0x00, 0x00, 0x06, // typecnt
            0x00, 0x00, 0x00, 0x14, // charcnt
            // v2 block
            0xff, 0xff, 0xff, 0xff, 0x74, 0xe0, 0x70, 0xbe, // time[0]
            0xff, 0xff, 0xff, 0xff, 0xbb, 0x05, 0x43, 0x48, // time[1]
            0xff, 0xff, 0xff, 0xff, 0xbb, 0x21, 0x71, 0x58, // time[2]
            0xff, 0xff, 0xff, 0xff, 0xcb, 0x89, 0x3d, 0xc8, // time[3]
            0xff, 0xff, 0xff, 0xff, 0xd2, 0x23, 0xf4, 0x70, // time[4]
            0xff, 0xff, 0xff, 0xff, 0xd2, 0x61, 0x49, 0x38, // time[5]
            0xff, 0xff, 0xff, 0xff, 0xd5, 0x8d, 0x73, 0x48, // time[6]
            0x01, 0x02, 0x01, 0x03, 0x04, 0x01, 0x05, // trans types
            // localtimetype[0]
            0xff, 0xff, 0x6c, 0x02, 0x00, 0x00,
            // localtimetype[1]
            0xff, 0xff, 0x6c, 0x58, 0x00, 0x04,
            // localtimetype[2]
            0xff, 0xff, 0x7a, 0x68, 0x01, 0x08,
            // localtimetype[3]
            0xff, 0xff, 0x7a, 0x68, 0x01, 0x0c,
            // localtimetype[4]
            0xff, 0xff, 0x7a, 0x68, 0x01, 0x10,
            // localtimetype[5]
            0xff, 0xff, 0x73, 0x60, 0x00, 0x04,
            0x4c, 0x4d, 0x54, 0x00, // designations[0]
            0x48, 0x53, 0x54, 0x00, // designations[4]
            0x48, 0x44, 0x54, 0x00, // designations[8]
            0x48, 0x57, 0x54, 0x00, // designations[12]
            0x48, 0x50, 0x54, 0x00, // designations[16]
            0x00, 0x00, 0x00, 0x00, 0x01, 0x00, // standard/wall
            0x00, 0x00, 0x00, 0x00, 0x01, 0x00, // UT/local
            // footer
            0x0a,                   // NL
            0x48, 0x53, 0x54, 0x31, // "HST10"
            0x30,
            0x0a, // NL
        ];
        (data, want)
    }

    #[test]
    fn rfc8536_b2_pacific_honolulu() {
        let (data, want) = rfc8536_b2();
        validate(&data).unwrap();
        assert_eq!(data.encode().unwrap(), want);
        assert_eq!(decode(&want).unwrap(), data);
    }

    /// RFC 8536, Appendix B.3: a version 3 file representing a fictional
    /// Asia/Jerusalem with a single transition and a far-future footer
    /// rule. The version 1 section is an all-zero stub.
    fn rfc8536_b3() -> (Data, Vec<u8>) {
        let data = Data {
            version: Version::V3,
            v1_header: Header { version: Version::V3, ..Header::default() },
            v1_data: V1DataBlock::default(),
            v2_header: Header {
                version: Version::V3,
                isutcnt: 1,
                isstdcnt: 1,
                leapcnt: 0,
                timecnt: 1,
                typecnt: 1,
                charcnt: 4,
            },
            v2_data: V2DataBlock {
                transition_times: vec![2145916800],
                transition_types: vec![0],
                local_time_types: vec![LocalTimeType {
                    utoff: 7200,
                    is_dst: false,
                    idx: 0,
                }],
                designations: b"IST\x00".to_vec(),
                leap_seconds: vec![],
                std_wall: vec![true],
                ut_local: vec![true],
            },
            v2_footer: Footer {
                tz_string: "IST-2IDT,M3.4.4/26,M10.5.0".to_string(),
            },
        };

        #[rustfmt::skip]
        let want = vec![
            // v1 header (stub)
            0x54, 0x5a, 0x69, 0x66, // magic
            0x33, // version
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, // isutcnt
            0x00, 0x00, 0x00, 0x00, // isstdcnt
            0x00, 0x00, 0x00, 0x00, // leapcnt
            0x00, 0x00, 0x00, 0x00, // timecnt
            0x00, 0x00, 0x00, 0x00, // typecnt
            0x00, 0x00, 0x00, 0x00, // charcnt
            // v3 header
            0x54, 0x5a, 0x69, 0x66, // magic
            0x33, // version
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x01, // isutcnt
            0x00, 0x00, 0x00, 0x01, // isstdcnt
            0x00, 0x00, 0x00, 0x00, // leapcnt
            0x00, 0x00, 0x00, 0x01, // timecnt
            0x00, 0x00, 0x00, 0x01, // typecnt
            0x00, 0x00, 0x00, 0x04, // charcnt
            // v3 block
            0x00, 0x00, 0x00, 0x00, 0x7f, 0xe8, 0x17, 0x80, // time[0]
            0x00, // trans type[0]
            // localtimetype[0]
            0x00, 0x00, 0x1c, 0x20, // utoff
            0x00,                   // dst
            0x00,                   // idx
            0x49, 0x53, 0x54, 0x00, // designations: "IST\0"
            0x01, // standard/wall[0]
            0x01, // UT/local[0]
            // footer
            0x0a,                   // NL
            0x49, 0x53, 0x54, 0x2d, // "IST-2IDT,M3.4.4/26,M10.5.0"
            0x32, 0x49, 0x44, 0x54,
            0x2c, 0x4d, 0x33, 0x2e,
            0x34, 0x2e, 0x34, 0x2f,
            0x32, 0x36, 0x2c, 0x4d,
            0x31, 0x30, 0x2e, 0x35,
            0x2e, 0x30,
            0x0a, // NL
        ];
        (data, want)
    }

    #[test]
    fn rfc8536_b3_asia_jerusalem() {
        let (data, want) = rfc8536_b3();
        validate(&data).unwrap();
        assert_eq!(data.encode().unwrap(), want);
        assert_eq!(decode(&want).unwrap(), data);
    }

    #[test]
    fn minimal_utc_round_trip() {
        let counts = Header {
            version: Version::V2,
            typecnt: 1,
            charcnt: 4,
            ..Header::default()
        };
        let utc = LocalTimeType { utoff: 0, is_dst: false, idx: 0 };
        let data = Data {
            version: Version::V2,
            v1_header: counts,
            v1_data: V1DataBlock {
                local_time_types: vec![utc],
                designations: b"UTC\x00".to_vec(),
                ..V1DataBlock::default()
            },
            v2_header: counts,
            v2_data: V2DataBlock {
                local_time_types: vec![utc],
                designations: b"UTC\x00".to_vec(),
                ..V2DataBlock::default()
            },
            v2_footer: Footer { tz_string: "UTC0".to_string() },
        };
        validate(&data).unwrap();

        let bytes = data.encode().unwrap();
        // A v1 header plus empty v1 block, then a v2 header, block and
        // footer.
        assert_eq!(bytes.len(), 44 + 10 + 44 + 10 + 6);
        assert_eq!(&bytes[0..5], b"TZif2");
        assert_eq!(&bytes[54..59], b"TZif2");
        let footer_at = bytes.len() - 6;
        assert_eq!(&bytes[footer_at..], b"\nUTC0\n");

        assert_eq!(decode(&bytes).unwrap(), data);
    }

    #[test]
    fn encode_decode_idempotent() {
        for (data, _) in [rfc8536_b1(), rfc8536_b2(), rfc8536_b3()] {
            let bytes = data.encode().unwrap();
            let decoded = decode(&bytes).unwrap();
            assert_eq!(decoded, data);
            assert_eq!(decoded.encode().unwrap(), bytes);
        }
    }

    /// A generated TZif structure that satisfies [`validate`]: bounded
    /// dimensions, designations drawn through the pool, strictly
    /// ascending transition times and well-formed leap-second records.
    #[derive(Clone, Debug)]
    struct ValidData(Data);

    impl quickcheck::Arbitrary for ValidData {
        fn arbitrary(g: &mut quickcheck::Gen) -> ValidData {
            const DESIGNATIONS: &[&str] =
                &["LMT", "UTC", "CET", "CEST", "HST", "EET", "+0530"];
            const TZ_STRINGS: &[&str] =
                &["", "UTC0", "CET-1CEST,M3.5.0,M10.5.0/3"];

            let version = *g
                .choose(&[Version::V1, Version::V2, Version::V3])
                .unwrap();
            let typecnt = usize::arbitrary(g) % 4 + 1;
            let timecnt = usize::arbitrary(g) % 8;
            let leapcnt = usize::arbitrary(g) % 4;

            let mut pool = DesignationPool::new();
            let mut local_time_types = vec![];
            for _ in 0..typecnt {
                let designation = g.choose(DESIGNATIONS).unwrap();
                let idx = pool.insert(designation).unwrap();
                // Anything in the RFC's sanctioned [-89999, 93599].
                let utoff = i32::arbitrary(g).rem_euclid(183_599) - 89_999;
                local_time_types.push(LocalTimeType {
                    utoff,
                    is_dst: bool::arbitrary(g),
                    idx,
                });
            }

            // Strictly ascending, and small enough to survive the v1
            // block's 32-bit times when the file is version 1.
            let mut time = i64::from(i32::arbitrary(g) % 1_000_000);
            let mut transition_times = vec![];
            let mut transition_types = vec![];
            for _ in 0..timecnt {
                time += i64::from(u16::arbitrary(g)) + 1;
                transition_times.push(time);
                transition_types.push((usize::arbitrary(g) % typecnt) as u8);
            }

            let mut leap_seconds = vec![];
            let mut occur = i64::from(u16::arbitrary(g));
            let mut corr: i32 = if bool::arbitrary(g) { 1 } else { -1 };
            for _ in 0..leapcnt {
                leap_seconds.push(LeapSecond { occur, corr });
                occur += MIN_LEAP_SPACING + i64::from(u16::arbitrary(g));
                corr += if bool::arbitrary(g) { 1 } else { -1 };
            }

            // Indicator counts must be zero or typecnt.
            let (std_wall, ut_local): (Vec<bool>, Vec<bool>) =
                if bool::arbitrary(g) {
                    (
                        (0..typecnt).map(|_| bool::arbitrary(g)).collect(),
                        (0..typecnt).map(|_| bool::arbitrary(g)).collect(),
                    )
                } else {
                    (vec![], vec![])
                };

            let header = Header {
                version,
                isutcnt: ut_local.len() as u32,
                isstdcnt: std_wall.len() as u32,
                leapcnt: leapcnt as u32,
                timecnt: timecnt as u32,
                typecnt: typecnt as u32,
                charcnt: pool.as_bytes().len() as u32,
            };
            let data = if version == Version::V1 {
                Data {
                    version,
                    v1_header: header,
                    v1_data: V1DataBlock {
                        transition_times: transition_times
                            .iter()
                            .map(|&time| time as i32)
                            .collect(),
                        transition_types,
                        local_time_types,
                        designations: pool.into_bytes(),
                        leap_seconds: leap_seconds
                            .iter()
                            .map(|leap| V1LeapSecond {
                                occur: leap.occur as i32,
                                corr: leap.corr,
                            })
                            .collect(),
                        std_wall,
                        ut_local,
                    },
                    ..Data::default()
                }
            } else {
                Data {
                    version,
                    // A minimal-compliance stub for the v1 section.
                    v1_header: Header { version, ..Header::default() },
                    v1_data: V1DataBlock::default(),
                    v2_header: header,
                    v2_data: V2DataBlock {
                        transition_times,
                        transition_types,
                        local_time_types,
                        designations: pool.into_bytes(),
                        leap_seconds,
                        std_wall,
                        ut_local,
                    },
                    v2_footer: Footer {
                        tz_string: g.choose(TZ_STRINGS).unwrap().to_string(),
                    },
                }
            };
            ValidData(data)
        }
    }

    quickcheck::quickcheck! {
        fn prop_encode_then_decode_round_trips(data: ValidData) -> bool {
            let ValidData(data) = data;
            validate(&data).is_ok()
                && decode(&data.encode().unwrap()).unwrap() == data
        }
    }

    #[test]
    fn designation_pool_suffix_reuse() {
        let mut pool = DesignationPool::new();
        assert_eq!(pool.insert("LMT").unwrap(), 0);
        assert_eq!(pool.insert("HST").unwrap(), 4);
        assert_eq!(pool.insert("HDT").unwrap(), 8);
        assert_eq!(
            pool.as_bytes(),
            &[
                0x4c, 0x4d, 0x54, 0x00, // "LMT\0"
                0x48, 0x53, 0x54, 0x00, // "HST\0"
                0x48, 0x44, 0x54, 0x00, // "HDT\0"
            ],
        );
        // "ST" is a suffix of "HST"; the pool must not grow.
        assert_eq!(pool.insert("ST").unwrap(), 5);
        assert_eq!(pool.as_bytes().len(), 12);
        // Exact matches reuse their index too.
        assert_eq!(pool.insert("HST").unwrap(), 4);
        assert_eq!(pool.insert("T").unwrap(), 2);
        // A genuinely new designation is appended.
        assert_eq!(pool.insert("HWT").unwrap(), 12);
        assert_eq!(pool.as_bytes().len(), 16);
    }

    #[test]
    fn designation_pool_overflow() {
        let mut pool = DesignationPool::new();
        for i in 0..64 {
            pool.insert(&format!("A{i:02}")).unwrap();
        }
        // 64 four-byte entries fill all 256 addressable octets.
        assert_eq!(pool.as_bytes().len(), 256);
        assert!(pool.insert("XYZ").is_err());
    }

    #[test]
    fn v1_block_round_trip() {
        let header = Header {
            version: Version::V1,
            isutcnt: 2,
            isstdcnt: 2,
            leapcnt: 2,
            timecnt: 2,
            typecnt: 2,
            charcnt: 6,
        };
        let block = V1DataBlock {
            transition_times: vec![1, 2],
            transition_types: vec![3, 4],
            local_time_types: vec![
                LocalTimeType { utoff: 5, is_dst: true, idx: 6 },
                LocalTimeType { utoff: 7, is_dst: false, idx: 8 },
            ],
            designations: b"TZ\x00ZT\x00".to_vec(),
            leap_seconds: vec![
                V1LeapSecond { occur: 9, corr: 10 },
                V1LeapSecond { occur: 11, corr: 12 },
            ],
            std_wall: vec![true, false],
            ut_local: vec![true, false],
        };
        let mut bytes = vec![];
        block.write_to(&mut bytes);
        let mut rd = Reader { bytes: &bytes, pos: 0 };
        assert_eq!(read_v1_block(&mut rd, &header).unwrap(), block);
        assert_eq!(rd.pos, bytes.len());
    }

    #[test]
    fn v2_block_round_trip() {
        let header = Header {
            version: Version::V2,
            isutcnt: 2,
            isstdcnt: 2,
            leapcnt: 2,
            timecnt: 2,
            typecnt: 2,
            charcnt: 6,
        };
        let block = V2DataBlock {
            transition_times: vec![1, 2],
            transition_types: vec![3, 4],
            local_time_types: vec![
                LocalTimeType { utoff: 5, is_dst: true, idx: 6 },
                LocalTimeType { utoff: 7, is_dst: false, idx: 8 },
            ],
            designations: b"TZ\x00ZT\x00".to_vec(),
            leap_seconds: vec![
                LeapSecond { occur: 9, corr: 10 },
                LeapSecond { occur: 11, corr: 12 },
            ],
            std_wall: vec![true, false],
            ut_local: vec![true, false],
        };
        let mut bytes = vec![];
        block.write_to(&mut bytes);
        let mut rd = Reader { bytes: &bytes, pos: 0 };
        assert_eq!(read_v2_block(&mut rd, &header).unwrap(), block);
        assert_eq!(rd.pos, bytes.len());
    }

    #[test]
    fn footer_round_trip() {
        let footer = Footer { tz_string: "CET-1CEST,M3.5.0,M10.5.0/3".into() };
        let mut bytes = vec![];
        footer.write_to(&mut bytes);
        let mut rd = Reader { bytes: &bytes, pos: 0 };
        assert_eq!(read_footer(&mut rd).unwrap(), footer);
    }

    #[test]
    fn encode_rejects_version_mismatch() {
        let data = Data {
            version: Version::V2,
            v2_header: Header { version: Version::V3, ..Header::default() },
            ..Data::default()
        };
        let err = data.encode().unwrap_err();
        assert!(err.is_encoder());
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode(b"").is_err());
        assert!(decode(b"GZif").is_err());
        assert!(decode(&[0x54, 0x5a, 0x69, 0x66, 0x07]).is_err());
        // A valid header followed by too little data.
        let header = Header {
            version: Version::V1,
            timecnt: 3,
            typecnt: 1,
            charcnt: 4,
            ..Header::default()
        };
        let mut bytes = vec![];
        header.write_to(&mut bytes);
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn validate_reports_every_violation() {
        let (mut data, _) = rfc8536_b2();
        // Break several invariants at once.
        data.v2_header.timecnt = 99;
        data.v2_data.transition_types[0] = 42;
        data.v2_data.local_time_types[0].utoff = i32::MIN;
        data.v2_footer.tz_string = ":oops".to_string();
        let err = validate(&data).unwrap_err();
        assert!(err.is_encoder());
        let message = err.to_string();
        assert!(message.contains("invalid v2 timecnt"), "{message}");
        assert!(message.contains("transition type 0"), "{message}");
        assert!(message.contains("utoff must not be -2^31"), "{message}");
        assert!(message.contains("starts with a colon"), "{message}");
    }

    #[test]
    fn validate_transition_order() {
        let (mut data, _) = rfc8536_b3();
        data.v2_header.timecnt = 2;
        data.v2_data.transition_times = vec![100, 100];
        data.v2_data.transition_types = vec![0, 0];
        let err = validate(&data).unwrap_err();
        assert!(err.to_string().contains("does not ascend"));
    }

    #[test]
    fn validate_leap_invariants() {
        let (mut data, _) = rfc8536_b1();
        // First correction must be +/-1.
        data.v1_data.leap_seconds[0].corr = 2;
        assert!(validate(&data)
            .unwrap_err()
            .to_string()
            .contains("neither 1 nor -1"));

        let (mut data, _) = rfc8536_b1();
        // Adjacent corrections must differ by exactly one.
        data.v1_data.leap_seconds[1].corr = 3;
        assert!(validate(&data)
            .unwrap_err()
            .to_string()
            .contains("differ"));

        let (mut data, _) = rfc8536_b1();
        // Occurrences must be spaced at least 28 days minus a second.
        data.v1_data.leap_seconds[1].occur =
            data.v1_data.leap_seconds[0].occur + 1000;
        assert!(validate(&data)
            .unwrap_err()
            .to_string()
            .contains("at least"));
    }

    #[test]
    fn validate_stub_v1_section_allowed() {
        // The all-zero v1 stub of a v2+ file must validate, even though a
        // standalone v1 file requires non-zero typecnt and charcnt.
        let (data, _) = rfc8536_b3();
        validate(&data).unwrap();

        let v1_only = Data {
            version: Version::V1,
            ..Data::default()
        };
        let err = validate(&v1_only).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("typecnt: must not be zero"), "{message}");
        assert!(message.contains("charcnt: must not be zero"), "{message}");
    }

    #[test]
    fn validate_indicator_counts() {
        let (mut data, _) = rfc8536_b2();
        data.v2_header.isstdcnt = 3;
        let err = validate(&data).unwrap_err();
        let message = err.to_string();
        assert!(
            message.contains("must be 0 or equal to typecnt"),
            "{message}",
        );
    }
}
