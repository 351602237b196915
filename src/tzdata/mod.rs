/*!
The textual tz database source model and its parser.

A tz source file (`europe`, `northamerica`, `leapseconds`, …) is a sequence
of rule, zone (plus continuation), link, leap and expires lines. [`parse`]
turns raw bytes into a [`File`] holding those lines in arrival order, with
no cross-line semantics applied: resolving rule references, expanding
symbolic days and computing transitions all happen downstream, in
[`crate::resolve`].

The grammar implemented here is the one described by `zic(8)`: fields split
on whitespace, double quotes protect whitespace and `#` within a field, an
unquoted `#` starts a comment, keywords and month/weekday names may be
abbreviated to their shortest unambiguous prefix.
*/

use crate::civil::{Month, Weekday};

mod parse;

pub use self::parse::parse;

/// The result of parsing a tzdata or leapsecond file.
///
/// Each sequence preserves the order of appearance in the source. The model
/// is shared between the two file types: data files populate `rules`,
/// `zones` and `links` while leapsecond files populate `leaps` and
/// `expires`.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct File {
    /// All `Rule` lines.
    pub rules: Vec<RuleLine>,
    /// All `Zone` lines, continuations included.
    pub zones: Vec<ZoneLine>,
    /// All `Link` lines.
    pub links: Vec<LinkLine>,
    /// All `Leap` lines.
    pub leaps: Vec<LeapLine>,
    /// All `Expires` lines.
    pub expires: Vec<ExpiresLine>,
}

/// A year in the proleptic Gregorian calendar, as written in the FROM and
/// TO columns of a rule line.
///
/// The `minimum` and `maximum` keywords map to the `Past` and `Future`
/// sentinels. The derived ordering puts `Past` below every concrete year
/// and `Future` above, so range checks read naturally.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Year {
    /// The indefinite past (`minimum`).
    Past,
    /// A concrete year. Year 0 precedes year 1.
    Concrete(i32),
    /// The indefinite future (`maximum`).
    Future,
}

impl Year {
    /// Returns the concrete year, if there is one.
    pub fn concrete(self) -> Option<i32> {
        match self {
            Year::Concrete(year) => Some(year),
            _ => None,
        }
    }
}

impl core::fmt::Display for Year {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Year::Past => f.write_str("<indefinite past>"),
            Year::Concrete(year) => write!(f, "{year}"),
            Year::Future => f.write_str("<indefinite future>"),
        }
    }
}

/// A signed duration with millisecond precision.
///
/// The source grammar permits arbitrary fractional seconds; following the
/// tenth-of-nanosecond rounding performed upstream, fractions are truncated
/// to three digits here. Most durations in real tzdata are whole minutes,
/// but a handful of pre-standard-time offsets (Zurich's `0:29:45.50` Bern
/// Mean Time, for example) do carry fractions.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub struct Duration {
    millis: i64,
}

impl Duration {
    /// The zero duration.
    pub const ZERO: Duration = Duration { millis: 0 };

    /// Creates a duration from a number of milliseconds.
    pub fn from_millis(millis: i64) -> Duration {
        Duration { millis }
    }

    /// Creates a duration from a number of whole seconds.
    pub fn from_seconds(seconds: i64) -> Duration {
        Duration { millis: seconds * 1000 }
    }

    /// Creates a duration from hours, minutes and seconds. All components
    /// should carry the same sign.
    pub fn from_hms(hours: i64, minutes: i64, seconds: i64) -> Duration {
        Duration::from_seconds(hours * 3600 + minutes * 60 + seconds)
    }

    /// Returns the number of whole seconds, truncating toward zero.
    pub fn seconds(self) -> i64 {
        self.millis / 1000
    }

    /// Returns the millisecond part left after [`Duration::seconds`].
    pub fn subsec_millis(self) -> i64 {
        self.millis % 1000
    }

    /// Returns the total number of milliseconds.
    pub fn total_millis(self) -> i64 {
        self.millis
    }

    /// Returns true if this duration is zero.
    pub fn is_zero(self) -> bool {
        self.millis == 0
    }
}

impl core::ops::Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration { millis: -self.millis }
    }
}

/// The form of a clock reading: which clock the reading is relative to.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TimeForm {
    /// Local wall-clock time, including any daylight saving offset.
    #[default]
    Wall,
    /// Local standard time, excluding daylight saving.
    Standard,
    /// The reading itself denotes a daylight saving amount. Only produced
    /// for SAVE columns.
    DaylightSaving,
    /// Universal time.
    Universal,
}

/// A clock reading: a duration since 00:00 (the start of a calendar day)
/// paired with the clock it is relative to.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Time {
    /// The duration since 00:00. May be negative or exceed 24 hours.
    pub duration: Duration,
    /// The clock the duration is relative to.
    pub form: TimeForm,
}

impl Time {
    /// Creates a wall-clock time.
    pub fn wall(duration: Duration) -> Time {
        Time { duration, form: TimeForm::Wall }
    }

    /// Creates a standard time.
    pub fn standard(duration: Duration) -> Time {
        Time { duration, form: TimeForm::Standard }
    }

    /// Creates a daylight saving amount.
    pub fn daylight_saving(duration: Duration) -> Time {
        Time { duration, form: TimeForm::DaylightSaving }
    }

    /// Creates a universal time.
    pub fn universal(duration: Duration) -> Time {
        Time { duration, form: TimeForm::Universal }
    }
}

/// A day specification from the ON column of a rule line (or the day part
/// of a zone's UNTIL column).
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Day {
    /// A literal day of the month, e.g. `5`.
    Num(i32),
    /// The last given weekday of the month, e.g. `lastSun`.
    Last(Weekday),
    /// The first given weekday on or after the given day, e.g. `Sun>=8`.
    After(Weekday, i32),
    /// The last given weekday on or before the given day, e.g. `Sun<=25`.
    Before(Weekday, i32),
}

/// A single `Rule` line.
///
/// ```text
/// # Rule  NAME  FROM  TO    -  IN   ON       AT     SAVE   LETTER/S
/// Rule    US    1967  1973  -  Apr  lastSun  2:00w  1:00d  D
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleLine {
    /// The NAME column: the rule set this line belongs to.
    pub name: String,
    /// The FROM column: the first year in which the rule applies.
    pub from: Year,
    /// The TO column: the final year in which the rule applies. The `only`
    /// keyword is resolved to `from` at parse time.
    pub to: Year,
    /// The IN column: the month in which the rule takes effect.
    pub month: Month,
    /// The ON column: the day on which the rule takes effect.
    pub day: Day,
    /// The AT column: the clock time at which the rule takes effect.
    pub at: Time,
    /// The SAVE column: the amount added to local standard time while the
    /// rule is in effect.
    pub save: Time,
    /// The LETTER/S column: the variable part of the zone abbreviation.
    /// Empty when the column is `-`.
    pub letter: String,
}

/// The RULES column of a zone line.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ZoneRules {
    /// `-`: standard time always applies.
    Standard,
    /// A rule set name. Whether a rule set with this name exists is not
    /// known until resolution.
    Named(String),
    /// A fixed amount of daylight saving, in SAVE column format.
    Fixed(Time),
}

/// Which trailing parts of an UNTIL column were actually written.
///
/// The grammar guarantees a monotone prefix: a day can only be given when a
/// month is, and so on. The derived ordering encodes exactly that, so
/// "is the day defined" is spelled `parts >= UntilParts::Day`. Missing
/// trailing parts default to their earliest possible value.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum UntilParts {
    /// Only the year was written.
    Year,
    /// The year and month were written.
    Month,
    /// The year, month and day were written.
    Day,
    /// All four parts were written.
    Time,
}

/// The UNTIL column of a zone line, when present.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Until {
    /// Which parts were actually written.
    pub parts: UntilParts,
    /// The year. Always written.
    pub year: i32,
    /// The month. Meaningful when `parts >= UntilParts::Month`.
    pub month: Month,
    /// The day. Meaningful when `parts >= UntilParts::Day`.
    pub day: Day,
    /// The clock time. Meaningful when `parts >= UntilParts::Time`.
    pub time: Time,
}

/// A single `Zone` line or zone continuation line.
///
/// ```text
/// # Zone  NAME        STDOFF  RULES   FORMAT  [UNTIL]
/// Zone    Asia/Amman  2:00    Jordan  EE%sT   2017 Oct 27 01:00
/// ```
///
/// A zone line whose UNTIL column is present is followed by a continuation
/// line: the same columns with the `Zone` keyword and the name omitted.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ZoneLine {
    /// True if this is a continuation line.
    pub continuation: bool,
    /// The NAME column. `None` for continuation lines.
    pub name: Option<String>,
    /// The STDOFF column: the amount of time to add to UT to get standard
    /// time, without any daylight saving adjustment.
    pub offset: Duration,
    /// The RULES column.
    pub rules: ZoneRules,
    /// The FORMAT column: the template for time zone abbreviations. May
    /// contain `%s`, `%z` or a `/` separating standard and daylight
    /// abbreviations.
    pub format: String,
    /// The UNTIL column, if present.
    pub until: Option<Until>,
}

/// A single `Link` line: an alias from `link_name` to `target`.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkLine {
    /// The TARGET column: the name of a zone (or of another link).
    pub target: String,
    /// The LINK-NAME column: the alternative name for the target zone.
    pub link_name: String,
}

/// A clock reading in `HH:MM:SS` form, as used by leap and expires lines.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Hms {
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

/// The correction direction of a leap second.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LeapCorrection {
    /// `+`: a second was added.
    Added,
    /// `-`: a second was skipped.
    Skipped,
}

/// How the time fields of a leap line are to be interpreted.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LeapMode {
    /// `S`: the given time is UTC.
    Stationary,
    /// `R`: the given time is local wall-clock time. Rolling leap seconds
    /// never caught on in practice; they date from when it was unclear
    /// whether ball-drop countdowns would observe the leap at local
    /// midnight or at midnight UTC.
    Rolling,
}

/// A single `Leap` line from a leapsecond file.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeapLine {
    /// The YEAR column.
    pub year: i32,
    /// The MONTH column.
    pub month: Month,
    /// The DAY column.
    pub day: i32,
    /// The HH:MM:SS column.
    pub time: Hms,
    /// The CORR column.
    pub corr: LeapCorrection,
    /// The R/S column.
    pub mode: LeapMode,
}

/// A single `Expires` line from a leapsecond file: the moment the leap
/// second table stops being authoritative.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpiresLine {
    /// The YEAR column.
    pub year: i32,
    /// The MONTH column.
    pub month: Month,
    /// The DAY column.
    pub day: i32,
    /// The HH:MM:SS column.
    pub time: Hms,
}
