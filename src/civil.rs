/*!
Proleptic Gregorian calendar arithmetic.

Everything in this module is a pure function: no host locale, no host time
zone database and no clock is ever consulted. That matters because this
crate *produces* time zone data, so it cannot lean on a time zone facility
the way general purpose datetime code would.

Unix second conversion follows the classic scheme of counting days from an
"absolute" epoch far enough in the past that day counts are non-negative,
accumulating 400/100/4/1-year cycles, and shifting to the 1970 epoch at the
end.
*/

use crate::tzdata::{Day, Until, UntilParts};

/// A month of the Gregorian calendar.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Month {
    January = 1,
    February = 2,
    March = 3,
    April = 4,
    May = 5,
    June = 6,
    July = 7,
    August = 8,
    September = 9,
    October = 10,
    November = 11,
    December = 12,
}

impl Month {
    /// Returns this month's number, in the range `1..=12`.
    pub fn number(self) -> i32 {
        self as i32
    }

    /// Returns the month for the given number, if it is in `1..=12`.
    pub fn from_number(number: i32) -> Option<Month> {
        use self::Month::*;

        Some(match number {
            1 => January,
            2 => February,
            3 => March,
            4 => April,
            5 => May,
            6 => June,
            7 => July,
            8 => August,
            9 => September,
            10 => October,
            11 => November,
            12 => December,
            _ => return None,
        })
    }
}

/// A day of the week, numbered `0=Sunday` through `6=Saturday`.
///
/// The numbering matches the convention used by the tz source grammar's
/// weekday expansion (and Zeller's congruence as adjusted below).
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// Returns this weekday's number, in the range `0..=6` with `0=Sunday`.
    pub fn number(self) -> i32 {
        self as i32
    }

    /// Returns the weekday for the given number, if it is in `0..=6`.
    pub fn from_number(number: i32) -> Option<Weekday> {
        use self::Weekday::*;

        Some(match number {
            0 => Sunday,
            1 => Monday,
            2 => Tuesday,
            3 => Wednesday,
            4 => Thursday,
            5 => Friday,
            6 => Saturday,
            _ => return None,
        })
    }
}

/// Returns true if the given year is a leap year in the proleptic Gregorian
/// calendar.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days in the given month.
pub fn days_in_month(month: Month, year: i32) -> i32 {
    use self::Month::*;

    match month {
        February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        April | June | September | November => 30,
        _ => 31,
    }
}

/// Returns the weekday of the given date via Zeller's congruence, adjusted
/// so that `0=Sunday`.
///
/// Euclidean division keeps the congruence valid for negative (proleptic)
/// years.
pub fn weekday_of(year: i32, month: Month, day: i32) -> Weekday {
    let (mut m, mut y) = (i64::from(month.number()), i64::from(year));
    if m < 3 {
        m += 12;
        y -= 1;
    }
    let k = y.rem_euclid(100);
    let j = (y - k) / 100;
    let h = (i64::from(day) + (13 * (m + 1)) / 5 + k + k / 4 + j / 4 + 5 * j)
        .rem_euclid(7);
    // Zeller yields 0=Saturday. Shift to 0=Sunday.
    Weekday::from_number(((h + 6) % 7) as i32).unwrap()
}

/// Resolves a [`Day`] specification against a year and month, producing a
/// concrete `(year, month, day)` date.
///
/// The `After` form may overflow into the following month (and year), and
/// the `Before` form may underflow into the preceding month (and year), as
/// the source grammar requires: `Oct Sun>=31` stands for the first Sunday
/// on or after October 31 even if that Sunday falls in November.
pub fn day_of_month(year: i32, month: Month, day: &Day) -> (i32, Month, i32) {
    match *day {
        Day::Num(n) => (year, month, n),
        Day::Last(weekday) => {
            let last = days_in_month(month, year);
            let got = weekday_of(year, month, last).number();
            let offset = (got - weekday.number()).rem_euclid(7);
            (year, month, last - offset)
        }
        Day::After(weekday, n) => {
            let got = weekday_of(year, month, n).number();
            let diff = (weekday.number() - got).rem_euclid(7);
            let mut day = n + diff;
            let in_month = days_in_month(month, year);
            if day > in_month {
                day -= in_month;
                let next = month.number() + 1;
                if next > 12 {
                    return (year + 1, Month::January, day);
                }
                return (year, Month::from_number(next).unwrap(), day);
            }
            (year, month, day)
        }
        Day::Before(weekday, n) => {
            let got = weekday_of(year, month, n).number();
            let diff = (got - weekday.number()).rem_euclid(7);
            let mut day = n - diff;
            if day < 1 {
                let (year, month) = match month.number() - 1 {
                    0 => (year - 1, Month::December),
                    prev => (year, Month::from_number(prev).unwrap()),
                };
                day += days_in_month(month, year);
                return (year, month, day);
            }
            (year, month, day)
        }
    }
}

const SECONDS_PER_DAY: u64 = 86400;
const DAYS_PER_400_YEARS: u64 = 365 * 400 + 97;
const DAYS_PER_100_YEARS: u64 = 365 * 100 + 24;
const DAYS_PER_4_YEARS: u64 = 365 * 4 + 1;

/// The year of the "absolute" epoch. Chosen (as in many C libraries and the
/// Go standard library, from which these constants are taken) so that all
/// interesting day counts are non-negative and the year is a multiple of
/// 400 away from year 1.
const ABSOLUTE_ZERO_YEAR: i64 = -292277022399;

/// Seconds from the absolute epoch to the internal epoch (January 1, year
/// 1), plus seconds from the internal epoch to the Unix epoch. The sum of
/// the two shifts an absolute second count to Unix seconds. The additions
/// below deliberately wrap: the cast from `u64` and this offset are exact
/// inverses modulo 2^64.
const ABSOLUTE_TO_INTERNAL: i64 = -9223371966579724800;
const INTERNAL_TO_UNIX: i64 =
    -(1969 * 365 + 1969 / 4 - 1969 / 100 + 1969 / 400) * 86400;
const ABSOLUTE_TO_UNIX: i64 = ABSOLUTE_TO_INTERNAL + INTERNAL_TO_UNIX;

/// Cumulative day counts at the start of each month, for non-leap years.
const DAYS_BEFORE_MONTH: [u64; 13] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];

/// Returns the number of days from the absolute epoch to the start of the
/// given year.
fn days_since_absolute_epoch(year: i32) -> u64 {
    let mut y = (i64::from(year) - ABSOLUTE_ZERO_YEAR) as u64;

    // Add in days from 400-year cycles.
    let mut n = y / 400;
    y -= 400 * n;
    let mut d = DAYS_PER_400_YEARS * n;

    // Add in 100-year cycles.
    n = y / 100;
    y -= 100 * n;
    d += DAYS_PER_100_YEARS * n;

    // Add in 4-year cycles.
    n = y / 4;
    y -= 4 * n;
    d += DAYS_PER_4_YEARS * n;

    // Add in non-leap years.
    d += 365 * y;

    d
}

/// Converts the given date and time to Unix seconds, i.e. seconds since
/// `1970-01-01 00:00:00` UT, ignoring leap seconds and assuming the
/// proleptic Gregorian calendar.
///
/// The hour, minute and second values are not required to be in their
/// usual ranges: `24:00` and `23:59:60` and negative times of day all work
/// out arithmetically, which is exactly what the tz source grammar needs.
pub fn unix_seconds(
    year: i32,
    month: Month,
    day: i32,
    hour: i64,
    minute: i64,
    second: i64,
) -> i64 {
    unix_seconds_of(year, month, day, hour * 3600 + minute * 60 + second)
}

/// Like [`unix_seconds`], but takes the time of day as a single signed
/// count of seconds since midnight.
pub(crate) fn unix_seconds_of(
    year: i32,
    month: Month,
    day: i32,
    seconds_of_day: i64,
) -> i64 {
    let mut d = days_since_absolute_epoch(year)
        .wrapping_add(DAYS_BEFORE_MONTH[(month.number() - 1) as usize])
        .wrapping_add((i64::from(day) - 1) as u64);
    if month > Month::February && is_leap_year(year) {
        d += 1;
    }
    let abs = d
        .wrapping_mul(SECONDS_PER_DAY)
        .wrapping_add(seconds_of_day as u64);
    (abs as i64).wrapping_add(ABSOLUTE_TO_UNIX)
}

/// Converts Unix seconds back to `(year, month, day, hour, minute,
/// second)`, the inverse of [`unix_seconds`] over in-range dates.
pub fn date_time(unix: i64) -> (i32, Month, i32, i64, i64, i64) {
    let abs = unix.wrapping_sub(ABSOLUTE_TO_UNIX) as u64;

    let seconds_of_day = abs % SECONDS_PER_DAY;
    let hour = (seconds_of_day / 3600) as i64;
    let minute = (seconds_of_day / 60 % 60) as i64;
    let second = (seconds_of_day % 60) as i64;

    let mut d = abs / SECONDS_PER_DAY;

    // Peel off 400-year cycles.
    let mut n = d / DAYS_PER_400_YEARS;
    let mut y = 400 * n;
    d -= DAYS_PER_400_YEARS * n;

    // Peel off 100-year cycles. The fourth cycle of 100 years belongs to
    // the leap 400th year, so cap n at 3.
    n = d / DAYS_PER_100_YEARS;
    n -= n >> 2;
    y += 100 * n;
    d -= DAYS_PER_100_YEARS * n;

    // Peel off 4-year cycles.
    n = d / DAYS_PER_4_YEARS;
    y += 4 * n;
    d -= DAYS_PER_4_YEARS * n;

    // Peel off non-leap years, capping at 3 for the same reason as above.
    n = d / 365;
    n -= n >> 2;
    y += n;
    d -= 365 * n;

    let year = (y as i64 + ABSOLUTE_ZERO_YEAR) as i32;

    let mut yday = d;
    if is_leap_year(year) {
        if yday == 31 + 29 - 1 {
            return (year, Month::February, 29, hour, minute, second);
        }
        if yday > 31 + 29 - 1 {
            yday -= 1;
        }
    }
    let mut month = Month::January;
    for number in (1..=12).rev() {
        if DAYS_BEFORE_MONTH[(number - 1) as usize] <= yday {
            month = Month::from_number(number).unwrap();
            break;
        }
    }
    let day = (yday - DAYS_BEFORE_MONTH[(month.number() - 1) as usize]) + 1;
    (year, month, day as i32, hour, minute, second)
}

/// Returns the earliest Unix second consistent with the given UNTIL
/// specification, before any UT offset adjustment.
///
/// Missing trailing parts default to their earliest possible value: January
/// for the month, the first for the day and `00:00` for the time of day.
/// Symbolic day forms are resolved against the (possibly defaulted) year
/// and month.
pub fn earliest_instant(until: &Until) -> i64 {
    let month = if until.parts >= UntilParts::Month {
        until.month
    } else {
        Month::January
    };
    let (year, month, day) = if until.parts >= UntilParts::Day {
        day_of_month(until.year, month, &until.day)
    } else {
        (until.year, month, 1)
    };
    let seconds_of_day = if until.parts >= UntilParts::Time {
        until.time.duration.seconds()
    } else {
        0
    };
    unix_seconds_of(year, month, day, seconds_of_day)
}
