/*!
The line-oriented parser for tz source files.

Parsing is strictly local: each line becomes one record, with the single
exception of the "continuation expected" state that a zone line with an
UNTIL column switches on. Errors are anchored to their 1-based line number,
and all bad fields of a single rule or zone line are reported together
rather than one at a time.
*/

use crate::{
    civil::{Month, Weekday},
    error::{err, Error, ErrorContext},
    tzdata::{
        Day, Duration, ExpiresLine, File, Hms, LeapCorrection, LeapLine,
        LeapMode, LinkLine, RuleLine, Time, TimeForm, Until, UntilParts,
        Year, ZoneLine, ZoneRules,
    },
};

/// Parses tz source bytes into a [`File`].
///
/// The input must be UTF-8. Parsing stops at the first malformed line;
/// within a rule or zone line, every malformed field is reported.
pub fn parse(data: &[u8]) -> Result<File, Error> {
    let mut file = File::default();
    let mut continuation_expected = false;
    for (i, raw) in data.split(|&byte| byte == b'\n').enumerate() {
        let number = (i as u64) + 1;
        let Ok(line) = core::str::from_utf8(raw) else {
            return Err(err!("invalid UTF-8").context(Error::parse_line(
                number,
                &String::from_utf8_lossy(raw),
            )));
        };
        let fields = split_fields(line)
            .with_context(|| Error::parse_line(number, line))?;
        if fields.is_empty() {
            // Blank after comment stripping.
            continue;
        }
        let keyword = fields[0];
        if keyword == "Zone" {
            let zone = parse_zone_line(&fields)
                .with_context(|| err!("parse zone"))
                .with_context(|| Error::parse_line(number, line))?;
            continuation_expected = zone.until.is_some();
            file.zones.push(zone);
        } else if continuation_expected && !is_keyword(keyword) {
            let zone = parse_zone_continuation_line(&fields)
                .with_context(|| err!("parse zone continuation"))
                .with_context(|| Error::parse_line(number, line))?;
            continuation_expected = zone.until.is_some();
            file.zones.push(zone);
        } else if keyword == "Rule" {
            continuation_expected = false;
            let rule = parse_rule_line(&fields)
                .with_context(|| err!("parse rule"))
                .with_context(|| Error::parse_line(number, line))?;
            file.rules.push(rule);
        } else if keyword == "Link" {
            continuation_expected = false;
            let link = parse_link_line(&fields)
                .with_context(|| err!("parse link"))
                .with_context(|| Error::parse_line(number, line))?;
            file.links.push(link);
        } else if keyword == "Leap" {
            continuation_expected = false;
            let leap = parse_leap_line(&fields)
                .with_context(|| err!("parse leap"))
                .with_context(|| Error::parse_line(number, line))?;
            file.leaps.push(leap);
        } else if keyword == "Expires" {
            continuation_expected = false;
            let expires = parse_expires_line(&fields)
                .with_context(|| err!("parse expires"))
                .with_context(|| Error::parse_line(number, line))?;
            file.expires.push(expires);
        } else {
            return Err(err!("unexpected line")
                .context(Error::parse_line(number, line)));
        }
    }
    Ok(file)
}

fn is_keyword(field: &str) -> bool {
    matches!(field, "Rule" | "Zone" | "Link" | "Leap" | "Expires")
}

/// Splits a line into fields.
///
/// Fields are separated by one or more whitespace characters (space, form
/// feed, carriage return, newline, tab, vertical tab). Whitespace and `#`
/// enclosed in double quotes belong to their field; the quotes themselves
/// are kept and stripped later by the individual field parsers, since some
/// columns distinguish quoted from unquoted values. An unquoted `#` starts
/// a comment running to the end of the line.
fn split_fields(line: &str) -> Result<Vec<&str>, Error> {
    let bytes = line.as_bytes();
    let mut fields = vec![];
    let mut start: Option<usize> = None;
    let mut in_quotes = false;
    for (i, &byte) in bytes.iter().enumerate() {
        if in_quotes {
            if byte == b'"' {
                in_quotes = false;
            }
            continue;
        }
        match byte {
            b'"' => {
                in_quotes = true;
                if start.is_none() {
                    start = Some(i);
                }
            }
            b'#' => {
                if let Some(at) = start.take() {
                    fields.push(&line[at..i]);
                }
                return finish_fields(fields, in_quotes);
            }
            b' ' | b'\t' | 0x0B | 0x0C | b'\r' => {
                if let Some(at) = start.take() {
                    fields.push(&line[at..i]);
                }
            }
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }
    if let Some(at) = start {
        fields.push(&line[at..]);
    }
    finish_fields(fields, in_quotes)
}

fn finish_fields(
    fields: Vec<&str>,
    in_quotes: bool,
) -> Result<Vec<&str>, Error> {
    if in_quotes {
        return Err(err!("unterminated quote"));
    }
    Ok(fields)
}

/// Runs one field parser, pushing a labeled error onto `errs` on failure.
fn field<T>(
    errs: &mut Vec<Error>,
    label: &str,
    text: &str,
    result: Result<T, Error>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errs.push(error.context(err!("{label} {text:?}")));
            None
        }
    }
}

/// Parses a rule line.
///
/// ```text
/// Rule  NAME  FROM  TO    -  IN   ON       AT     SAVE   LETTER/S
/// ```
///
/// The fifth column is the long-deprecated TYPE column, which must be `-`
/// in modern tzdata and is ignored here, as it is by `zic`.
fn parse_rule_line(fields: &[&str]) -> Result<RuleLine, Error> {
    if fields.len() != 10 {
        return Err(err!("expected 10 fields, got {}", fields.len()));
    }
    let mut errs = vec![];
    let name = field(&mut errs, "NAME", fields[1], parse_rule_name(fields[1]));
    let from = field(&mut errs, "FROM", fields[2], parse_rule_from(fields[2]));
    let to = field(
        &mut errs,
        "TO",
        fields[3],
        parse_rule_to(fields[3], from.unwrap_or(Year::Concrete(0))),
    );
    let month = field(&mut errs, "IN", fields[5], parse_month(fields[5]));
    let day = field(&mut errs, "ON", fields[6], parse_on(fields[6]));
    let at = field(&mut errs, "AT", fields[7], parse_rule_at(fields[7]));
    let save = field(&mut errs, "SAVE", fields[8], parse_rule_save(fields[8]));
    let letter =
        field(&mut errs, "LETTER/S", fields[9], parse_letters(fields[9]));
    if let Some(error) = Error::join(errs) {
        return Err(error);
    }
    // OK because a `None` in any field pushed an error above.
    Ok(RuleLine {
        name: name.unwrap(),
        from: from.unwrap(),
        to: to.unwrap(),
        month: month.unwrap(),
        day: day.unwrap(),
        at: at.unwrap(),
        save: save.unwrap(),
        letter: letter.unwrap(),
    })
}

/// Parses a zone line.
///
/// ```text
/// Zone  NAME        STDOFF  RULES   FORMAT  [UNTIL]
/// ```
fn parse_zone_line(fields: &[&str]) -> Result<ZoneLine, Error> {
    if fields.len() < 5 {
        return Err(err!("expected at least 5 fields, got {}", fields.len()));
    }
    if fields.len() > 9 {
        return Err(err!("expected at most 9 fields, got {}", fields.len()));
    }
    let mut errs = vec![];
    let name = field(&mut errs, "NAME", fields[1], parse_zone_name(fields[1]));
    let offset =
        field(&mut errs, "STDOFF", fields[2], parse_time_of_day(fields[2]));
    let rules =
        field(&mut errs, "RULES", fields[3], parse_zone_rules(fields[3]));
    let format =
        field(&mut errs, "FORMAT", fields[4], parse_zone_format(fields[4]));
    let until = if fields.len() > 5 {
        let text = fields[5..].join(" ");
        field(&mut errs, "UNTIL", &text, parse_until(&fields[5..])).map(Some)
    } else {
        Some(None)
    };
    if let Some(error) = Error::join(errs) {
        return Err(error);
    }
    // OK because a `None` in any field pushed an error above.
    Ok(ZoneLine {
        continuation: false,
        name: Some(name.unwrap()),
        offset: offset.unwrap(),
        rules: rules.unwrap(),
        format: format.unwrap(),
        until: until.unwrap(),
    })
}

/// Parses a zone continuation line: the same columns as a zone line with
/// the `Zone` keyword and the name omitted.
fn parse_zone_continuation_line(fields: &[&str]) -> Result<ZoneLine, Error> {
    if fields.len() < 3 {
        return Err(err!("expected at least 3 fields, got {}", fields.len()));
    }
    if fields.len() > 7 {
        return Err(err!("expected at most 7 fields, got {}", fields.len()));
    }
    let mut errs = vec![];
    let offset =
        field(&mut errs, "STDOFF", fields[0], parse_time_of_day(fields[0]));
    let rules =
        field(&mut errs, "RULES", fields[1], parse_zone_rules(fields[1]));
    let format =
        field(&mut errs, "FORMAT", fields[2], parse_zone_format(fields[2]));
    let until = if fields.len() > 3 {
        let text = fields[3..].join(" ");
        field(&mut errs, "UNTIL", &text, parse_until(&fields[3..])).map(Some)
    } else {
        Some(None)
    };
    if let Some(error) = Error::join(errs) {
        return Err(error);
    }
    // OK because a `None` in any field pushed an error above.
    Ok(ZoneLine {
        continuation: true,
        name: None,
        offset: offset.unwrap(),
        rules: rules.unwrap(),
        format: format.unwrap(),
        until: until.unwrap(),
    })
}

/// Parses a link line.
///
/// ```text
/// Link  TARGET           LINK-NAME
/// Link  Europe/Istanbul  Asia/Istanbul
/// ```
fn parse_link_line(fields: &[&str]) -> Result<LinkLine, Error> {
    if fields.len() != 3 {
        return Err(err!("expected 3 fields, got {}", fields.len()));
    }
    Ok(LinkLine {
        target: fields[1].to_string(),
        link_name: fields[2].to_string(),
    })
}

/// Parses a leap line.
///
/// ```text
/// Leap  YEAR  MONTH  DAY  HH:MM:SS  CORR  R/S
/// Leap  2016  Dec    31   23:59:60  +     S
/// ```
fn parse_leap_line(fields: &[&str]) -> Result<LeapLine, Error> {
    if fields.len() != 7 {
        return Err(err!("expected 7 fields, got {}", fields.len()));
    }
    let mut errs = vec![];
    let year = field(&mut errs, "YEAR", fields[1], parse_int::<i32>(fields[1]));
    let month = field(&mut errs, "MONTH", fields[2], parse_month(fields[2]));
    let day = field(&mut errs, "DAY", fields[3], parse_int::<i32>(fields[3]));
    let time = field(&mut errs, "HH:MM:SS", fields[4], parse_hms(fields[4]));
    let corr = field(&mut errs, "CORR", fields[5], parse_leap_corr(fields[5]));
    let mode = field(&mut errs, "R/S", fields[6], parse_leap_mode(fields[6]));
    if let Some(error) = Error::join(errs) {
        return Err(error);
    }
    // OK because a `None` in any field pushed an error above.
    Ok(LeapLine {
        year: year.unwrap(),
        month: month.unwrap(),
        day: day.unwrap(),
        time: time.unwrap(),
        corr: corr.unwrap(),
        mode: mode.unwrap(),
    })
}

/// Parses an expires line.
///
/// ```text
/// Expires  YEAR  MONTH  DAY  HH:MM:SS
/// ```
fn parse_expires_line(fields: &[&str]) -> Result<ExpiresLine, Error> {
    if fields.len() != 5 {
        return Err(err!("expected 5 fields, got {}", fields.len()));
    }
    let mut errs = vec![];
    let year = field(&mut errs, "YEAR", fields[1], parse_int::<i32>(fields[1]));
    let month = field(&mut errs, "MONTH", fields[2], parse_month(fields[2]));
    let day = field(&mut errs, "DAY", fields[3], parse_int::<i32>(fields[3]));
    let time = field(&mut errs, "HH:MM:SS", fields[4], parse_hms(fields[4]));
    if let Some(error) = Error::join(errs) {
        return Err(error);
    }
    // OK because a `None` in any field pushed an error above.
    Ok(ExpiresLine {
        year: year.unwrap(),
        month: month.unwrap(),
        day: day.unwrap(),
        time: time.unwrap(),
    })
}

/// Parses the NAME column of a rule line.
///
/// The name must start with a character that is neither an ASCII digit nor
/// `-` nor `+`, and an unquoted name may not contain characters from the
/// reserved set below.
fn parse_rule_name(text: &str) -> Result<String, Error> {
    const RESERVED: &str = "!$%&'()*,/:;<=>?@[\\]^`{|}~";

    if text.is_empty() {
        return Err(err!("empty name"));
    }
    let first = text.as_bytes()[0];
    if first.is_ascii_digit() {
        return Err(err!("name starts with a digit"));
    }
    if first == b'-' || first == b'+' {
        return Err(err!("name starts with a sign"));
    }
    let (unquoted, was_quoted) = unquote(text);
    if !was_quoted && text.contains(|ch| RESERVED.contains(ch)) {
        return Err(err!("name contains a reserved character"));
    }
    Ok(unquoted.to_string())
}

/// Parses the NAME column of a zone line. The name should not contain a
/// file name component `.` or `..`.
fn parse_zone_name(text: &str) -> Result<String, Error> {
    if text.is_empty() {
        return Err(err!("empty name"));
    }
    if text.contains('.') {
        return Err(err!("name contains a dot"));
    }
    Ok(text.to_string())
}

/// Parses the RULES column of a zone line: `-` for permanent standard
/// time, an amount of daylight saving in SAVE format, or the name of a
/// rule set.
fn parse_zone_rules(text: &str) -> Result<ZoneRules, Error> {
    if text == "-" {
        return Ok(ZoneRules::Standard);
    }
    if let Ok(time) = parse_rule_save(text) {
        return Ok(ZoneRules::Fixed(time));
    }
    // Assume it's a name. Whether a rule set with this name exists is not
    // known here; the resolver checks.
    Ok(ZoneRules::Named(text.to_string()))
}

/// Parses the FORMAT column of a zone line.
fn parse_zone_format(text: &str) -> Result<String, Error> {
    if text.is_empty() {
        return Err(err!("empty format"));
    }
    let (unquoted, _) = unquote(text);
    Ok(unquoted.to_string())
}

/// Parses the UNTIL column of a zone line: one to four fields
/// `YEAR [MONTH [DAY [TIME]]]` in the same syntax as the IN, ON and AT
/// columns of a rule line.
fn parse_until(parts: &[&str]) -> Result<Until, Error> {
    if parts.len() > 4 {
        return Err(err!("too many fields: {}", parts.len()));
    }
    let year = parse_int::<i32>(parts[0])
        .with_context(|| err!("year {:?}", parts[0]))?;
    let mut until = Until {
        parts: UntilParts::Year,
        year,
        month: Month::January,
        day: Day::Num(1),
        time: Time::default(),
    };
    if parts.len() > 1 {
        until.month = parse_month(parts[1])
            .with_context(|| err!("month {:?}", parts[1]))?;
        until.parts = UntilParts::Month;
    }
    if parts.len() > 2 {
        until.day =
            parse_on(parts[2]).with_context(|| err!("day {:?}", parts[2]))?;
        until.parts = UntilParts::Day;
    }
    if parts.len() > 3 {
        until.time = parse_rule_at(parts[3])
            .with_context(|| err!("time {:?}", parts[3]))?;
        until.parts = UntilParts::Time;
    }
    Ok(until)
}

/// Parses the FROM column of a rule line: a signed integer year, or an
/// abbreviation of `minimum` or `maximum`.
fn parse_rule_from(text: &str) -> Result<Year, Error> {
    if is_abbrev(text, "minimum", "mi") {
        return Ok(Year::Past);
    }
    if is_abbrev(text, "maximum", "ma") {
        return Ok(Year::Future);
    }
    parse_int::<i32>(text).map(Year::Concrete)
}

/// Parses the TO column of a rule line. In addition to the FROM forms, the
/// word `only` (or an abbreviation) repeats the FROM value.
fn parse_rule_to(text: &str, from: Year) -> Result<Year, Error> {
    if is_abbrev(text, "only", "o") {
        return Ok(from);
    }
    parse_rule_from(text)
}

/// Parses a month name, abbreviated to no fewer than three letters,
/// case-insensitively.
fn parse_month(text: &str) -> Result<Month, Error> {
    const MONTHS: &[(&str, Month)] = &[
        ("january", Month::January),
        ("february", Month::February),
        ("march", Month::March),
        ("april", Month::April),
        ("may", Month::May),
        ("june", Month::June),
        ("july", Month::July),
        ("august", Month::August),
        ("september", Month::September),
        ("october", Month::October),
        ("november", Month::November),
        ("december", Month::December),
    ];

    if text.len() < 3 {
        return Err(err!("month name needs at least three letters"));
    }
    let lower = text.to_ascii_lowercase();
    for &(long, month) in MONTHS {
        if is_abbrev(&lower, long, &long[..3]) {
            return Ok(month);
        }
    }
    Err(err!("unrecognized month name"))
}

/// Parses a weekday name, abbreviated down to its shortest unambiguous
/// prefix, case-insensitively.
fn parse_weekday(text: &str) -> Result<Weekday, Error> {
    const WEEKDAYS: &[(&str, &str, Weekday)] = &[
        ("sunday", "su", Weekday::Sunday),
        ("monday", "m", Weekday::Monday),
        ("tuesday", "tu", Weekday::Tuesday),
        ("wednesday", "w", Weekday::Wednesday),
        ("thursday", "th", Weekday::Thursday),
        ("friday", "f", Weekday::Friday),
        ("saturday", "sa", Weekday::Saturday),
    ];

    let lower = text.to_ascii_lowercase();
    for &(long, min, weekday) in WEEKDAYS {
        if is_abbrev(&lower, long, min) {
            return Ok(weekday);
        }
    }
    Err(err!("unrecognized weekday name"))
}

/// Parses the ON column of a rule line: a plain day of the month,
/// `last<weekday>`, `<weekday>>=<n>` or `<weekday><=<n>`.
fn parse_on(text: &str) -> Result<Day, Error> {
    if let Ok(n) = text.parse::<i32>() {
        return Ok(Day::Num(n));
    }
    if let Some(rest) = text.strip_prefix("last") {
        return parse_weekday(rest).map(Day::Last);
    }
    if text.contains('=') {
        let (weekday, n, before) = match text.split_once("<=") {
            Some((weekday, n)) => (weekday, n, true),
            None => match text.split_once(">=") {
                Some((weekday, n)) => (weekday, n, false),
                None => {
                    return Err(err!(
                        "expected weekday<=dayofmonth or weekday>=dayofmonth"
                    ))
                }
            },
        };
        if weekday.is_empty() || n.is_empty() {
            return Err(err!(
                "expected weekday<=dayofmonth or weekday>=dayofmonth"
            ));
        }
        let weekday = parse_weekday(weekday)
            .with_context(|| err!("left of comparison {weekday:?}"))?;
        let n = parse_int::<i32>(n)
            .with_context(|| err!("right of comparison {n:?}"))?;
        return Ok(if before {
            Day::Before(weekday, n)
        } else {
            Day::After(weekday, n)
        });
    }
    Err(err!("unrecognized day form"))
}

/// Parses the AT column of a rule line: a time of day with an optional
/// suffix indicating wall clock (`w`, the default), standard time (`s`) or
/// universal time (`u`, `g` or `z`).
fn parse_rule_at(text: &str) -> Result<Time, Error> {
    let (duration, suffix) =
        parse_time_with_suffix(text, &['w', 's', 'u', 'g', 'z'])?;
    let form = match suffix {
        Some('w') | None => TimeForm::Wall,
        Some('s') => TimeForm::Standard,
        Some('u') | Some('g') | Some('z') => TimeForm::Universal,
        Some(_) => unreachable!("suffix restricted by the list above"),
    };
    Ok(Time { duration, form })
}

/// Parses the SAVE column of a rule line: a time of day with an optional
/// suffix indicating standard time (`s`) or daylight saving (`d`). When
/// the suffix is omitted it defaults to standard for a zero amount and
/// daylight saving otherwise.
fn parse_rule_save(text: &str) -> Result<Time, Error> {
    let (duration, suffix) = parse_time_with_suffix(text, &['s', 'd'])?;
    let form = match suffix {
        Some('s') => TimeForm::Standard,
        Some('d') => TimeForm::DaylightSaving,
        None if duration.is_zero() => TimeForm::Standard,
        None => TimeForm::DaylightSaving,
        Some(_) => unreachable!("suffix restricted by the list above"),
    };
    Ok(Time { duration, form })
}

/// Parses the LETTER/S column of a rule line. `-` means the variable part
/// is empty.
fn parse_letters(text: &str) -> Result<String, Error> {
    if text.is_empty() {
        return Err(err!("empty letter"));
    }
    let (unquoted, _) = unquote(text);
    if unquoted == "-" {
        return Ok(String::new());
    }
    Ok(unquoted.to_string())
}

/// Parses a time of day of the form `[-]H[:M[:S[.fff]]]`, with `-` alone
/// meaning zero. Hours are unbounded (`260:00` is 260 hours) and the value
/// may be negative.
fn parse_time_of_day(text: &str) -> Result<Duration, Error> {
    if text == "-" {
        return Ok(Duration::ZERO);
    }
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut parts = text.split(':');
    // There is always a first part, even for an empty string.
    let hours = parse_int::<i64>(parts.next().unwrap())
        .with_context(|| err!("invalid hours"))?;
    let minutes = match parts.next() {
        Some(part) => parse_int::<i64>(part)
            .with_context(|| err!("invalid minutes"))?,
        None => 0,
    };
    let (seconds, millis) = match parts.next() {
        Some(part) => {
            let (seconds, fraction) = match part.split_once('.') {
                Some((seconds, fraction)) => (seconds, Some(fraction)),
                None => (part, None),
            };
            let seconds = parse_int::<i64>(seconds)
                .with_context(|| err!("invalid seconds"))?;
            let millis = match fraction {
                Some(fraction) => {
                    // Truncate or zero-pad to exactly three digits.
                    let mut digits: String =
                        fraction.chars().take(3).collect();
                    while digits.len() < 3 {
                        digits.push('0');
                    }
                    parse_int::<i64>(&digits).with_context(|| {
                        err!("invalid fractional seconds")
                    })?
                }
                None => 0,
            };
            (seconds, millis)
        }
        None => (0, 0),
    };
    let duration = Duration::from_millis(
        (hours * 3600 + minutes * 60 + seconds) * 1000 + millis,
    );
    Ok(if negative { -duration } else { duration })
}

/// Parses a time of day followed by an optional single-letter suffix from
/// the given set.
fn parse_time_with_suffix(
    text: &str,
    suffixes: &[char],
) -> Result<(Duration, Option<char>), Error> {
    if let Some(last) = text.chars().last() {
        if suffixes.contains(&last) {
            let duration = parse_time_of_day(&text[..text.len() - 1])?;
            return Ok((duration, Some(last)));
        }
    }
    Ok((parse_time_of_day(text)?, None))
}

/// Parses a strict `HH:MM:SS` clock reading.
fn parse_hms(text: &str) -> Result<Hms, Error> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(err!("expected 3 parts, got {}", parts.len()));
    }
    let hour =
        parse_int::<i32>(parts[0]).with_context(|| err!("invalid hours"))?;
    let minute =
        parse_int::<i32>(parts[1]).with_context(|| err!("invalid minutes"))?;
    let second =
        parse_int::<i32>(parts[2]).with_context(|| err!("invalid seconds"))?;
    Ok(Hms { hour, minute, second })
}

/// Parses the CORR column of a leap line.
fn parse_leap_corr(text: &str) -> Result<LeapCorrection, Error> {
    match text {
        "+" => Ok(LeapCorrection::Added),
        "-" => Ok(LeapCorrection::Skipped),
        _ => Err(err!("invalid leap correction")),
    }
}

/// Parses the R/S column of a leap line.
fn parse_leap_mode(text: &str) -> Result<LeapMode, Error> {
    let lower = text.to_ascii_lowercase();
    if is_abbrev(&lower, "rolling", "r") {
        return Ok(LeapMode::Rolling);
    }
    if is_abbrev(&lower, "stationary", "s") {
        return Ok(LeapMode::Stationary);
    }
    Err(err!("invalid leap mode"))
}

/// Removes surrounding double quotes from a string. Returns the stripped
/// string and whether it was quoted.
fn unquote(text: &str) -> (&str, bool) {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"'
    {
        (&text[1..text.len() - 1], true)
    } else {
        (text, false)
    }
}

/// Returns true if `text` is a valid abbreviation of `long`: it must be no
/// shorter than `min` and a prefix of `long`.
fn is_abbrev(text: &str, long: &str, min: &str) -> bool {
    text.starts_with(min) && long.starts_with(text)
}

fn parse_int<T>(text: &str) -> Result<T, Error>
where
    T: core::str::FromStr<Err = core::num::ParseIntError>,
{
    text.parse::<T>().map_err(|error| err!("{error}"))
}
