/*!
The compiler entry points: tz source in, TZif artifacts out.

[`compile`](compile()) takes a parsed [`File`] and produces one
[`tzif::Data`] per named zone, with link names resolving to copies of
their target's artifact. [`compile_bytes`] adds parsing on the way in and
encoding on the way out.

A zone that fails to compile does not abort the rest: every zone is
attempted, and the failures are reported together, each labeled with its
zone name.
*/

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    civil,
    error::{err, Error, ErrorContext},
    resolve::{self, ZoneGroup},
    tzdata::{self, File, LeapCorrection, LeapLine, LeapMode, LinkLine},
    tzif,
};

/// Compiles tz source bytes to a map from zone name to encoded TZif
/// bytes.
///
/// This is parse + [`compile`](compile()) + encode. Link names appear in
/// the map alongside zone names, carrying copies of their target's bytes.
pub fn compile_bytes(
    data: &[u8],
) -> Result<BTreeMap<String, Vec<u8>>, Error> {
    let file = tzdata::parse(data)?;
    let compiled = compile(&file)?;
    let mut out = BTreeMap::new();
    for (name, data) in compiled {
        let bytes = data
            .encode()
            .with_context(|| err!("encoding zone {name:?}"))?;
        out.insert(name, bytes);
    }
    Ok(out)
}

/// Compiles a parsed file to a map from zone name to TZif structure.
///
/// Zone-level failures do not halt the compile: the remaining zones are
/// still attempted, and the error returned aggregates every failure with
/// its zone name. On success the map is complete, links included.
pub fn compile(file: &File) -> Result<BTreeMap<String, tzif::Data>, Error> {
    let groups = resolve::zone_groups(file)?;
    let mut out: BTreeMap<String, tzif::Data> = BTreeMap::new();
    let mut failures = vec![];
    for group in &groups {
        if out.contains_key(group.name) {
            failures.push(err!("duplicate zone name {:?}", group.name));
            continue;
        }
        match compile_zone(file, group) {
            Ok(data) => {
                out.insert(group.name.to_string(), data);
            }
            Err(error) => {
                debug!("zone {} failed to compile: {error}", group.name);
                failures.push(
                    error.context(err!("compiling zone {:?}", group.name)),
                );
            }
        }
    }
    for link in &file.links {
        match resolve_link(file, &out, link) {
            Ok(data) => {
                out.insert(link.link_name.clone(), data);
            }
            Err(error) => {
                failures.push(error.context(err!(
                    "resolving link {:?}",
                    link.link_name,
                )));
            }
        }
    }
    match Error::join(failures) {
        None => Ok(out),
        Some(error) => Err(error),
    }
}

/// Chases a link to its terminal zone and returns a copy of that zone's
/// artifact. A chain that cycles, or that ends at a name that is not a
/// zone, is an error.
fn resolve_link(
    file: &File,
    compiled: &BTreeMap<String, tzif::Data>,
    link: &LinkLine,
) -> Result<tzif::Data, Error> {
    let targets: BTreeMap<&str, &str> = file
        .links
        .iter()
        .map(|link| (link.link_name.as_str(), link.target.as_str()))
        .collect();
    let mut seen = BTreeSet::new();
    let mut current = link.target.as_str();
    loop {
        if let Some(data) = compiled.get(current) {
            return Ok(data.clone());
        }
        if !seen.insert(current) {
            return Err(err!("link chain cycles at {current:?}"));
        }
        match targets.get(current) {
            Some(next) => current = next,
            None => {
                return Err(err!(
                    "link target {current:?} does not name a zone"
                ))
            }
        }
    }
}

/// Compiles one zone group: resolve its transitions, then lay out the
/// TZif structure.
fn compile_zone(
    file: &File,
    group: &ZoneGroup<'_>,
) -> Result<tzif::Data, Error> {
    let zone = resolve::resolve_zone(file, group)?;
    trace!(
        "zone {}: {} transitions resolved",
        zone.name,
        zone.transitions.len(),
    );

    let mut pool = tzif::DesignationPool::new();
    let mut types: Vec<tzif::LocalTimeType> = vec![];

    // The initial record is always local time type zero: it describes
    // timestamps preceding the first transition.
    intern_type(&mut types, &mut pool, &zone.initial)?;
    let mut times = Vec::with_capacity(zone.transitions.len());
    let mut type_indices = Vec::with_capacity(zone.transitions.len());
    for transition in &zone.transitions {
        times.push(transition.at);
        type_indices.push(intern_type(
            &mut types,
            &mut pool,
            &transition.local_type(),
        )?);
    }

    let header = tzif::Header {
        version: tzif::Version::V2,
        isutcnt: 0,
        isstdcnt: 0,
        leapcnt: 0,
        timecnt: times.len() as u32,
        typecnt: types.len() as u32,
        charcnt: pool.as_bytes().len() as u32,
    };
    let data = tzif::Data {
        version: tzif::Version::V2,
        v1_header: header,
        v1_data: tzif::V1DataBlock {
            // The v1 section carries the 64-bit times truncated to 32
            // bits.
            transition_times: times.iter().map(|&time| time as i32).collect(),
            transition_types: type_indices.clone(),
            local_time_types: types.clone(),
            designations: pool.as_bytes().to_vec(),
            leap_seconds: vec![],
            std_wall: vec![],
            ut_local: vec![],
        },
        v2_header: header,
        v2_data: tzif::V2DataBlock {
            transition_times: times,
            transition_types: type_indices,
            local_time_types: types,
            designations: pool.into_bytes(),
            leap_seconds: vec![],
            std_wall: vec![],
            ut_local: vec![],
        },
        v2_footer: tzif::Footer { tz_string: zone.tz_string },
    };
    tzif::validate(&data)
        .with_context(|| err!("compiled zone fails validation"))?;
    Ok(data)
}

/// Interns a resolved local type, returning its index in the type table.
/// Identical types share an entry; designations share pool bytes.
fn intern_type(
    types: &mut Vec<tzif::LocalTimeType>,
    pool: &mut tzif::DesignationPool,
    local: &resolve::LocalType,
) -> Result<u8, Error> {
    let utoff = i32::try_from(local.utoff).map_err(|_| {
        Error::encoder(format!(
            "UT offset {} does not fit in 32 bits",
            local.utoff,
        ))
    })?;
    let idx = pool.insert(&local.designation)?;
    let record = tzif::LocalTimeType { utoff, is_dst: local.is_dst, idx };
    if let Some(at) = types.iter().position(|&have| have == record) {
        return Ok(at as u8);
    }
    if types.len() > usize::from(u8::MAX) {
        return Err(Error::encoder(
            "more than 256 local time types in one zone",
        ));
    }
    types.push(record);
    Ok((types.len() - 1) as u8)
}

/// Converts the leap lines of a leapsecond file into TZif leap-second
/// records.
///
/// Occurrences are expressed in Unix *leap* time, which counts previously
/// inserted leap seconds: each occurrence is the Unix seconds of the
/// line's date-time plus the accumulated correction before that line.
/// Corrections start at zero and step by one per line, so the resulting
/// sequence satisfies the TZif leap-second invariants by construction.
/// Rolling leap lines are outside the supported subset.
pub fn leap_records(
    leaps: &[LeapLine],
) -> Result<Vec<tzif::LeapSecond>, Error> {
    let mut out: Vec<tzif::LeapSecond> = Vec::with_capacity(leaps.len());
    let mut corr: i32 = 0;
    for leap in leaps {
        if leap.mode == LeapMode::Rolling {
            return Err(Error::unsupported(format!(
                "rolling leap second at {}-{:?}-{}",
                leap.year, leap.month, leap.day,
            )));
        }
        let occur = civil::unix_seconds(
            leap.year,
            leap.month,
            leap.day,
            i64::from(leap.time.hour),
            i64::from(leap.time.minute),
            i64::from(leap.time.second),
        ) + i64::from(corr);
        corr += match leap.corr {
            LeapCorrection::Added => 1,
            LeapCorrection::Skipped => -1,
        };
        if let Some(last) = out.last() {
            if occur <= last.occur {
                return Err(err!(
                    "leap second occurrences out of order: {occur} after {}",
                    last.occur,
                ));
            }
        }
        out.push(tzif::LeapSecond { occur, corr });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZURICH: &str = "\
Rule    Swiss 1941  1942  -  May  Mon>=1   1:00  1:00  S
Rule    Swiss 1941  1942  -  Oct  Mon>=1   2:00  0     -
Rule    EU    1977  1980  -  Apr  Sun>=1   1:00u 1:00  S
Rule    EU    1977  only  -  Sep  lastSun  1:00u 0     -
Rule    EU    1978  only  -  Oct   1       1:00u 0     -
Rule    EU    1979  1995  -  Sep  lastSun  1:00u 0     -
Rule    EU    1981  max   -  Mar  lastSun  1:00u 1:00  S
Rule    EU    1996  max   -  Oct  lastSun  1:00u 0     -
Zone    Europe/Zurich  0:34:08     -      LMT     1853 Jul 16
\t\t\t0:29:45.50  -      BMT     1894 Jun
\t\t\t1:00        Swiss  CE%sT   1981
\t\t\t1:00        EU     CE%sT
Link    Europe/Zurich  Europe/Vaduz
";

    #[test]
    fn compile_utc() {
        let compiled = compile_bytes(b"Zone Etc/UTC 0 - UTC\n").unwrap();
        assert_eq!(compiled.len(), 1);
        let bytes = &compiled["Etc/UTC"];
        assert_eq!(&bytes[0..5], b"TZif2");
        // No transitions: a v1 header, one six-byte type record and four
        // designation octets per section, and the placeholder footer.
        assert_eq!(bytes.len(), 44 + 10 + 44 + 10 + 6);
        assert!(bytes.ends_with(b"\nUTC0\n"));

        let data = tzif::decode(bytes).unwrap();
        tzif::validate(&data).unwrap();
        assert_eq!(data.v2_header.typecnt, 1);
        assert_eq!(data.v2_header.charcnt, 4);
        assert_eq!(data.v2_data.designations, b"UTC\x00");
        assert_eq!(
            data.v2_data.local_time_types,
            vec![tzif::LocalTimeType { utoff: 0, is_dst: false, idx: 0 }],
        );
    }

    #[test]
    fn compile_zurich() {
        let compiled = compile(&tzdata::parse(ZURICH.as_bytes()).unwrap())
            .unwrap();
        assert_eq!(compiled.len(), 2);
        let zurich = &compiled["Europe/Zurich"];
        // The link carries a copy of its target's artifact.
        assert_eq!(zurich, &compiled["Europe/Vaduz"]);

        tzif::validate(zurich).unwrap();
        assert_eq!(zurich.version, tzif::Version::V2);
        assert_eq!(zurich.v2_header.timecnt, 39);
        // LMT, BMT, CET and CEST.
        assert_eq!(zurich.v2_header.typecnt, 4);
        assert_eq!(
            zurich.v2_data.designations,
            b"LMT\x00BMT\x00CET\x00CEST\x00",
        );
        // The initial record is type zero; the first two transitions move
        // through BMT to CET, and the wartime summer of 1941 is CEST.
        assert_eq!(
            zurich.v2_data.local_time_types[0],
            tzif::LocalTimeType { utoff: 2048, is_dst: false, idx: 0 },
        );
        assert_eq!(zurich.v2_data.transition_types[0..4], [1, 2, 3, 2]);
        assert_eq!(zurich.v2_data.transition_times[0], -3675196800);
        // The v1 times are the 64-bit times truncated.
        assert_eq!(
            zurich.v1_data.transition_times[0],
            -3675196800i64 as i32,
        );
        assert_eq!(zurich.v1_header, zurich.v2_header);
    }

    #[test]
    fn compile_bytes_round_trips_through_decode() {
        let compiled = compile_bytes(ZURICH.as_bytes()).unwrap();
        for (name, bytes) in &compiled {
            let data = tzif::decode(bytes)
                .unwrap_or_else(|err| panic!("decoding {name}: {err}"));
            assert_eq!(&data.encode().unwrap(), bytes, "{name}");
        }
    }

    #[test]
    fn zone_failures_aggregate() {
        let source = "\
Zone Etc/Good 0 - GMT
Zone Test/Bad 1:00 Missing CE%sT
Zone Test/AlsoBad 1:00 AlsoMissing EE%sT
";
        let err = compile(&tzdata::parse(source.as_bytes()).unwrap())
            .unwrap_err();
        assert!(err.is_unknown_rule_name());
        let message = err.to_string();
        assert!(message.contains("compiling zone \"Test/Bad\""), "{message}");
        assert!(
            message.contains("compiling zone \"Test/AlsoBad\""),
            "{message}",
        );
        assert!(message.contains("\"Missing\""), "{message}");
    }

    #[test]
    fn duplicate_zone_names_rejected() {
        let source = "\
Zone Etc/Twice 0 - GMT
Zone Etc/Twice 1:00 - CET
";
        let err = compile(&tzdata::parse(source.as_bytes()).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("duplicate zone name"));
    }

    #[test]
    fn link_chains_and_cycles() {
        let source = "\
Zone Etc/Real 0 - GMT
Link Etc/Real Alias/One
Link Alias/One Alias/Two
";
        let compiled =
            compile(&tzdata::parse(source.as_bytes()).unwrap()).unwrap();
        assert_eq!(compiled.len(), 3);
        assert_eq!(compiled["Alias/Two"], compiled["Etc/Real"]);

        let source = "\
Link Alias/B Alias/A
Link Alias/A Alias/B
";
        let err = compile(&tzdata::parse(source.as_bytes()).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("cycles"), "{err}");

        let err = compile(
            &tzdata::parse(b"Link Etc/Nowhere Alias/C\n").unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not name a zone"), "{err}");
    }

    #[test]
    fn leap_records_match_utc_table() {
        // The leap seconds through 2016, as in the IANA leapseconds file.
        let source = "\
Leap 1972 Jun 30 23:59:60 + S
Leap 1972 Dec 31 23:59:60 + S
Leap 1973 Dec 31 23:59:60 + S
Leap 1974 Dec 31 23:59:60 + S
Leap 1975 Dec 31 23:59:60 + S
Leap 1976 Dec 31 23:59:60 + S
Leap 1977 Dec 31 23:59:60 + S
Leap 1978 Dec 31 23:59:60 + S
Leap 1979 Dec 31 23:59:60 + S
Leap 1981 Jun 30 23:59:60 + S
Leap 1982 Jun 30 23:59:60 + S
Leap 1983 Jun 30 23:59:60 + S
Leap 1985 Jun 30 23:59:60 + S
Leap 1987 Dec 31 23:59:60 + S
Leap 1989 Dec 31 23:59:60 + S
Leap 1990 Dec 31 23:59:60 + S
Leap 1992 Jun 30 23:59:60 + S
Leap 1993 Jun 30 23:59:60 + S
Leap 1994 Jun 30 23:59:60 + S
Leap 1995 Dec 31 23:59:60 + S
Leap 1997 Jun 30 23:59:60 + S
Leap 1998 Dec 31 23:59:60 + S
Leap 2005 Dec 31 23:59:60 + S
Leap 2008 Dec 31 23:59:60 + S
Leap 2012 Jun 30 23:59:60 + S
Leap 2015 Jun 30 23:59:60 + S
Leap 2016 Dec 31 23:59:60 + S
";
        let file = tzdata::parse(source.as_bytes()).unwrap();
        let records = leap_records(&file.leaps).unwrap();

        // RFC 8536, Appendix B.1.
        let want: &[(i64, i32)] = &[
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
        let got: Vec<(i64, i32)> =
            records.iter().map(|leap| (leap.occur, leap.corr)).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn leap_records_reject_rolling() {
        let file =
            tzdata::parse(b"Leap 1972 Jun 30 23:59:60 + R\n").unwrap();
        let err = leap_records(&file.leaps).unwrap_err();
        assert!(err.is_unsupported_rule_form());
    }
}
