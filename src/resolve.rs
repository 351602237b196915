/*!
The transition resolver: from parsed zone and rule lines to ordered lists
of UT transition instants.

A named zone is a chain of zone lines: the main line followed by its
continuations, each segment governed by its own standard offset and rule
selection and bounded by its UNTIL column. The resolver walks one chain
year by year, selecting the rules active in each year, translating their
clock readings to UT, carrying the effective UT offset across transitions,
and splicing the segments together so that there is no gap: when a segment
expires, an explicit transition into the next segment's standard time is
emitted at the expiry instant.

The subset resolved here covers named rule sets, permanent-standard-time
segments and fixed-save segments. Anything else produces an
`UnsupportedRuleForm` error for that zone only.
*/

use crate::{
    civil,
    error::{err, Error},
    tzdata::{File, RuleLine, TimeForm, Year, ZoneLine, ZoneRules},
};

/// The resolver refuses to walk past this year. Reaching it means rule
/// selection failed to converge.
const MAX_WALK_YEAR: i32 = 9999;

/// A local time type as the resolver sees it: the full UT offset, the DST
/// flag and the formatted designation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalType {
    /// Seconds to add to UT to get local time, daylight saving included.
    pub utoff: i64,
    /// Whether this local time is daylight saving time.
    pub is_dst: bool,
    /// The formatted abbreviation, e.g. `CET` or `CEST` or `+0530`.
    pub designation: String,
}

/// A change of local time type effective at a specific UT instant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    /// The UT instant at which the new local time type takes effect.
    pub at: i64,
    /// Seconds to add to UT on or after this instant.
    pub utoff: i64,
    /// Whether the new local time is daylight saving time.
    pub is_dst: bool,
    /// The formatted abbreviation on or after this instant.
    pub designation: String,
    /// The name of the rule set whose rule caused this transition, when
    /// one did; segment handovers have none.
    pub rule_name: Option<String>,
}

impl Transition {
    pub(crate) fn local_type(&self) -> LocalType {
        LocalType {
            utoff: self.utoff,
            is_dst: self.is_dst,
            designation: self.designation.clone(),
        }
    }
}

/// The fully resolved form of one named zone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledZone {
    /// The zone's name, e.g. `Europe/Zurich`.
    pub name: String,
    /// The local time type in effect before the first transition.
    pub initial: LocalType,
    /// The transitions, with strictly ascending instants.
    pub transitions: Vec<Transition>,
    /// When the final zone line carries an UNTIL column, the UT instant at
    /// which the zone's description ends.
    pub expires_at: Option<i64>,
    /// The footer TZ string. Currently a minimal placeholder derived from
    /// the initial type; generating real POSIX rules for arbitrary zones
    /// is out of scope.
    pub tz_string: String,
}

/// One named zone's lines: the main line followed by its continuations.
#[derive(Clone, Debug)]
pub struct ZoneGroup<'f> {
    /// The zone's name, from the main line.
    pub name: &'f str,
    /// The main line and its continuations, in order.
    pub lines: Vec<&'f ZoneLine>,
}

/// Groups a file's zone lines into per-zone chains, in order of
/// appearance.
pub fn zone_groups(file: &File) -> Result<Vec<ZoneGroup<'_>>, Error> {
    let mut groups: Vec<ZoneGroup<'_>> = vec![];
    for line in &file.zones {
        if line.continuation {
            let Some(group) = groups.last_mut() else {
                return Err(err!(
                    "zone continuation line without a preceding zone line"
                ));
            };
            group.lines.push(line);
        } else {
            let Some(name) = line.name.as_deref() else {
                return Err(err!("zone line without a name"));
            };
            groups.push(ZoneGroup { name, lines: vec![line] });
        }
    }
    Ok(groups)
}

/// Resolves one zone group to its transitions.
pub fn resolve_zone(
    file: &File,
    group: &ZoneGroup<'_>,
) -> Result<CompiledZone, Error> {
    let mut walker = Walker {
        file,
        name: group.name,
        transitions: vec![],
        initial: None,
        active_offset: 0,
        handover: None,
    };
    for (i, line) in group.lines.iter().enumerate() {
        walker.walk_line(i, line)?;
    }

    let initial = match walker.initial {
        Some(initial) => initial,
        // A zone whose very first segment never reaches standard time;
        // fall back to the first segment's standard type.
        None => line_standard_type(group.lines[0])?,
    };
    let tz_string = placeholder_tz_string(&initial);
    Ok(CompiledZone {
        name: group.name.to_string(),
        initial,
        transitions: walker.transitions,
        expires_at: walker.handover,
        tz_string,
    })
}

/// The in-progress state of one zone group's walk.
struct Walker<'f> {
    file: &'f File,
    name: &'f str,
    transitions: Vec<Transition>,
    /// The first standard-time local type observed in the first segment.
    initial: Option<LocalType>,
    /// The UT offset in effect just before the next transition. Starts at
    /// zero and carries across segments.
    active_offset: i64,
    /// The UT instant at which the previous segment expired, if it did.
    handover: Option<i64>,
}

impl<'f> Walker<'f> {
    fn walk_line(&mut self, i: usize, line: &ZoneLine) -> Result<(), Error> {
        let std_offset = line.offset.seconds();
        match line.rules {
            ZoneRules::Standard | ZoneRules::Fixed(_) => {
                let local = line_standard_type(line)?;
                trace!(
                    "zone {}: segment {i} is fixed at utoff {}",
                    self.name,
                    local.utoff,
                );
                if i == 0 {
                    self.initial = Some(local.clone());
                } else if let Some(at) = self.handover {
                    self.push(Transition {
                        at,
                        utoff: local.utoff,
                        is_dst: local.is_dst,
                        designation: local.designation,
                        rule_name: None,
                    });
                }
                self.active_offset = local.utoff;
                self.handover = line.until.as_ref().map(|until| {
                    civil::earliest_instant(until) - self.active_offset
                        + std_offset
                });
                Ok(())
            }
            ZoneRules::Named(ref rules_name) => {
                self.walk_named_line(i, line, rules_name)
            }
        }
    }

    fn walk_named_line(
        &mut self,
        i: usize,
        line: &ZoneLine,
        rules_name: &str,
    ) -> Result<(), Error> {
        let std_offset = line.offset.seconds();
        let rules = find_rules(&self.file.rules, rules_name)?;

        // Entering a continuation segment is itself a transition, into the
        // segment's standard time, at the instant the previous segment
        // expired.
        if i > 0 {
            if let Some(at) = self.handover {
                let local = LocalType {
                    utoff: std_offset,
                    is_dst: false,
                    designation: format_designation(
                        &line.format,
                        "",
                        false,
                        std_offset,
                    )?,
                };
                self.push(Transition {
                    at,
                    utoff: local.utoff,
                    is_dst: local.is_dst,
                    designation: local.designation,
                    rule_name: None,
                });
                self.active_offset = std_offset;
            }
        }
        self.handover = None;

        let mut year = first_year(&rules)?;
        loop {
            if year > MAX_WALK_YEAR {
                return Err(Error::resolver_bound(year));
            }

            // Once past the UNTIL year no further rule can apply; the
            // segment expires at its boundary.
            if let Some(ref until) = line.until {
                if year > until.year {
                    let boundary = civil::earliest_instant(until)
                        - self.active_offset
                        + std_offset;
                    debug!(
                        "zone {}: segment {i} expires at {boundary}",
                        self.name,
                    );
                    self.handover = Some(boundary);
                    return Ok(());
                }
            }

            let active: Vec<&RuleLine> = rules
                .iter()
                .copied()
                .filter(|rule| {
                    rule.from <= Year::Concrete(year)
                        && Year::Concrete(year) <= rule.to
                })
                .collect();

            // The universal-time occurrence is the naive instant of the
            // rule's date and AT reading on the Gregorian calendar,
            // before any offset adjustment. Sorting by it fixes the
            // order in which this year's transitions apply their offset
            // adjustments; ties keep definition order.
            let mut candidates: Vec<(i64, &RuleLine)> = active
                .iter()
                .map(|rule| (ut_occurrence(rule, year), *rule))
                .collect();
            candidates.sort_by_key(|&(ut_occ, _)| ut_occ);
            trace!(
                "zone {}: segment {i} year {year}: {} candidates",
                self.name,
                candidates.len(),
            );

            for (ut_occ, rule) in candidates {
                let occ = match rule.at.form {
                    TimeForm::Wall | TimeForm::DaylightSaving => {
                        ut_occ - self.active_offset
                    }
                    TimeForm::Standard => ut_occ - std_offset,
                    TimeForm::Universal => ut_occ,
                };
                let save = rule.save.duration.seconds();
                let is_dst = rule.save.form == TimeForm::DaylightSaving;
                self.active_offset = std_offset + save;

                if let Some(ref until) = line.until {
                    let boundary = civil::earliest_instant(until)
                        - self.active_offset
                        + std_offset;
                    if occ > boundary {
                        debug!(
                            "zone {}: segment {i} expires at {boundary} \
                             before rule {} applies",
                            self.name, rule.name,
                        );
                        self.handover = Some(boundary);
                        return Ok(());
                    }
                }

                // Occurrences at or before the last emitted instant
                // belong to years before this segment took over.
                if self
                    .transitions
                    .last()
                    .map_or(false, |last| occ <= last.at)
                {
                    continue;
                }

                let transition = Transition {
                    at: occ,
                    utoff: self.active_offset,
                    is_dst,
                    designation: format_designation(
                        &line.format,
                        &rule.letter,
                        is_dst,
                        self.active_offset,
                    )?,
                    rule_name: Some(rule.name.clone()),
                };
                if i == 0 && !is_dst && self.initial.is_none() {
                    self.initial = Some(transition.local_type());
                }
                self.push(transition);
            }

            if line.until.is_none() {
                let pending = rules.iter().any(|rule| {
                    matches!(rule.from.concrete(), Some(from) if from > year)
                });
                if !pending
                    && !active.is_empty()
                    && active.iter().all(|rule| rule.to == Year::Future)
                {
                    // Every remaining rule repeats forever; the rest of
                    // the schedule is periodic and the walk is done.
                    debug!(
                        "zone {}: segment {i} final after year {year}",
                        self.name,
                    );
                    return Ok(());
                }
                if rules
                    .iter()
                    .all(|rule| rule.to <= Year::Concrete(year))
                {
                    // No rule can ever apply again.
                    debug!(
                        "zone {}: segment {i} rules exhausted after year \
                         {year}",
                        self.name,
                    );
                    return Ok(());
                }
            }

            year += 1;
        }
    }

    fn push(&mut self, transition: Transition) {
        if let Some(last) = self.transitions.last_mut() {
            // A segment handover can land exactly on the preceding
            // transition's instant; the later type wins.
            if last.at == transition.at {
                *last = transition;
                return;
            }
            debug_assert!(last.at < transition.at);
        }
        self.transitions.push(transition);
    }
}

/// Returns the synthesized standard local type of a fixed segment: the
/// zone's offset plus any fixed save amount.
fn line_standard_type(line: &ZoneLine) -> Result<LocalType, Error> {
    let std_offset = line.offset.seconds();
    let (save, is_dst) = match line.rules {
        ZoneRules::Fixed(time) => (
            time.duration.seconds(),
            time.form == TimeForm::DaylightSaving,
        ),
        _ => (0, false),
    };
    Ok(LocalType {
        utoff: std_offset + save,
        is_dst,
        designation: format_designation(
            &line.format,
            "",
            is_dst,
            std_offset + save,
        )?,
    })
}

/// Returns all rule lines of the given rule set, in definition order.
fn find_rules<'f>(
    rules: &'f [RuleLine],
    name: &str,
) -> Result<Vec<&'f RuleLine>, Error> {
    let found: Vec<&RuleLine> =
        rules.iter().filter(|rule| rule.name == name).collect();
    if found.is_empty() {
        return Err(Error::unknown_rule_name(name));
    }
    Ok(found)
}

/// Returns the year the walk of a rule set starts in: the smallest
/// concrete FROM year. Rules whose FROM is the indefinite past are taken
/// to apply from the first year we observe the zone, so they do not
/// constrain the start.
fn first_year(rules: &[&RuleLine]) -> Result<i32, Error> {
    rules
        .iter()
        .filter_map(|rule| rule.from.concrete())
        .min()
        .ok_or_else(|| {
            Error::unsupported(
                "rule set has no concrete FROM year to start from",
            )
        })
}

/// Computes a rule's universal-time occurrence in the given year: the
/// Unix seconds of its expanded date and AT reading, before any offset
/// adjustment.
fn ut_occurrence(rule: &RuleLine, year: i32) -> i64 {
    let (year, month, day) = civil::day_of_month(year, rule.month, &rule.day);
    civil::unix_seconds_of(year, month, day, rule.at.duration.seconds())
}

/// Formats a zone's FORMAT column into a concrete designation.
///
/// `%s` is replaced by the rule's LETTER, a `STD/DST` pair is selected by
/// the DST flag, and `%z` becomes the numeric UT offset in the shortest
/// lossless of `±hh`, `±hhmm` and `±hhmmss`.
pub(crate) fn format_designation(
    format: &str,
    letter: &str,
    is_dst: bool,
    utoff: i64,
) -> Result<String, Error> {
    if let Some((std, dst)) = format.split_once('/') {
        return Ok(if is_dst { dst } else { std }.to_string());
    }
    if let Some(at) = format.find('%') {
        return match format.as_bytes().get(at + 1) {
            Some(b's') => Ok(format.replacen("%s", letter, 1)),
            Some(b'z') => {
                Ok(format.replacen("%z", &numeric_designation(utoff), 1))
            }
            _ => Err(Error::unsupported(format!(
                "FORMAT {format:?} contains an unrecognized % directive",
            ))),
        };
    }
    Ok(format.to_string())
}

fn numeric_designation(utoff: i64) -> String {
    let sign = if utoff < 0 { '-' } else { '+' };
    let abs = utoff.unsigned_abs();
    let (h, m, s) = (abs / 3600, abs / 60 % 60, abs % 60);
    if s != 0 {
        format!("{sign}{h:02}{m:02}{s:02}")
    } else if m != 0 {
        format!("{sign}{h:02}{m:02}")
    } else {
        format!("{sign}{h:02}")
    }
}

/// Derives the minimal placeholder TZ string from a zone's initial type:
/// the designation followed by the POSIX-sign (west positive) whole-hour
/// offset, when that is expressible. Anything else yields an empty
/// string, meaning the information is not available.
fn placeholder_tz_string(initial: &LocalType) -> String {
    if initial.is_dst
        || initial.designation.len() < 3
        || !initial.designation.bytes().all(|byte| byte.is_ascii_alphabetic())
        || initial.utoff % 3600 != 0
    {
        return String::new();
    }
    format!("{}{}", initial.designation, -(initial.utoff / 3600))
}
