// percept_core/src/nmea.rs

//! NMEA-0183 sentence synthesis for the simulated GNSS receiver.
//!
//! Only the three sentences a typical consumer needs for a position fix are
//! produced: `$GPRMC`, `$GPGGA` and `$GPGSA`.

use crate::error::SensorError;
use crate::geodesy::GeodeticFix;
use chrono::{DateTime, Datelike, Timelike, Utc};
use nalgebra::Vector3;
use serde::Deserialize;

/// Metres per second to international knots.
pub const MPS_TO_KNOTS: f64 = 1.943_844;

/// Number of satellite ID fields in a `$GPGSA` sentence.
pub const GSA_SATELLITE_SLOTS: usize = 12;

// =========================================================================
// == Receiver Metadata ==
// =========================================================================

/// RMC field 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RmcStatus {
    #[default]
    Valid,
    Warning,
}

impl RmcStatus {
    pub fn code(self) -> char {
        match self {
            Self::Valid => 'A',
            Self::Warning => 'V',
        }
    }
}

/// RMC positioning-mode indicator (NMEA 2.3+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PositioningMode {
    #[default]
    NotValid,
    Autonomous,
    Differential,
    Estimated,
    Manual,
    Simulator,
}

impl PositioningMode {
    pub fn code(self) -> char {
        match self {
            Self::NotValid => 'N',
            Self::Autonomous => 'A',
            Self::Differential => 'D',
            Self::Estimated => 'E',
            Self::Manual => 'M',
            Self::Simulator => 'S',
        }
    }
}

/// GGA fix quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum FixQuality {
    NoFix,
    #[default]
    Autonomous,
    Differential,
}

impl FixQuality {
    pub fn code(self) -> u8 {
        match self {
            Self::NoFix => 0,
            Self::Autonomous => 1,
            Self::Differential => 2,
        }
    }
}

/// GSA selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SelectionMode {
    Manual,
    #[default]
    Automatic,
}

impl SelectionMode {
    pub fn code(self) -> char {
        match self {
            Self::Manual => 'M',
            Self::Automatic => 'A',
        }
    }
}

/// GSA fix dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum FixDimension {
    NoFix,
    TwoD,
    #[default]
    ThreeD,
}

impl FixDimension {
    pub fn code(self) -> u8 {
        match self {
            Self::NoFix => 1,
            Self::TwoD => 2,
            Self::ThreeD => 3,
        }
    }
}

/// Static receiver configuration: the reference point of the local tangent
/// plane plus the quality metadata echoed in every sentence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GnssConfig {
    pub reference: GeodeticFix,
    pub hdop: f64,
    pub pdop: f64,
    pub vdop: f64,
    pub satellite_count: u8,
    /// PRNs listed in `$GPGSA`. Only the first twelve are transmitted.
    pub satellite_ids: Vec<u8>,
    /// Metres.
    pub geoid_height: f64,
    pub rmc_status: RmcStatus,
    pub positioning_mode: PositioningMode,
    pub fix_quality: FixQuality,
    pub selection_mode: SelectionMode,
    pub fix_dimension: FixDimension,
}

impl Default for GnssConfig {
    fn default() -> Self {
        Self {
            reference: GeodeticFix::new(35.710_202_065_753_01, 139.810_700_396_915_42, 3.0),
            hdop: 1.0,
            pdop: 1.0,
            vdop: 1.0,
            satellite_count: 8,
            satellite_ids: Vec::new(),
            geoid_height: 36.7071,
            rmc_status: RmcStatus::Valid,
            positioning_mode: PositioningMode::NotValid,
            fix_quality: FixQuality::Autonomous,
            selection_mode: SelectionMode::Automatic,
            fix_dimension: FixDimension::ThreeD,
        }
    }
}

impl GnssConfig {
    pub fn validate(&self) -> Result<(), SensorError> {
        for (name, dop) in [("hdop", self.hdop), ("pdop", self.pdop), ("vdop", self.vdop)] {
            if !dop.is_finite() || dop < 0.0 {
                return Err(SensorError::invalid(format!("{name} must be finite and >= 0")));
            }
        }
        if !self.geoid_height.is_finite() {
            return Err(SensorError::invalid("geoid_height must be finite"));
        }
        if self.satellite_count > 99 || self.satellite_ids.iter().any(|&id| id > 99) {
            return Err(SensorError::invalid("satellite counts and IDs are two-digit fields"));
        }
        Ok(())
    }
}

// =========================================================================
// == Derived Message Fields ==
// =========================================================================

/// Everything needed to render one set of sentences.
#[derive(Debug, Clone, PartialEq)]
pub struct GnssMessageSet {
    pub config: GnssConfig,
    pub utc: DateTime<Utc>,
    pub fix: GeodeticFix,
    pub speed_knots: f64,
    /// Degrees clockwise from true north, in [0, 360).
    pub course_deg: f64,
}

impl GnssMessageSet {
    /// Derives speed and course from a world-frame (ENU) velocity.
    pub fn assemble(
        config: GnssConfig,
        fix: GeodeticFix,
        velocity_world: &Vector3<f64>,
        utc: DateTime<Utc>,
    ) -> Self {
        let (east, north) = (velocity_world.x, velocity_world.y);
        let speed = east.hypot(north);
        Self {
            config,
            utc,
            fix: fix.normalized(),
            speed_knots: if speed.is_finite() { speed * MPS_TO_KNOTS } else { 0.0 },
            course_deg: course_over_ground(east, north),
        }
    }
}

/// Course over ground in degrees, normalised into [0, 360). A body with no
/// horizontal motion reports 0 whatever the signs of its zero components.
pub fn course_over_ground(east: f64, north: f64) -> f64 {
    if east.hypot(north) == 0.0 {
        return 0.0;
    }
    let course = east.atan2(north).to_degrees();
    if !course.is_finite() {
        return 0.0;
    }
    // `+ 0.0` turns a negative zero into a positive one.
    let course = course.rem_euclid(360.0) + 0.0;
    if course >= 360.0 {
        0.0
    } else {
        course
    }
}

// =========================================================================
// == Sentence Rendering ==
// =========================================================================

/// The three rendered sentences, each including `$` and `*HH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnssSentences {
    pub rmc: String,
    pub gga: String,
    pub gsa: String,
}

impl GnssSentences {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [self.rmc.as_str(), self.gga.as_str(), self.gsa.as_str()].into_iter()
    }

    /// CRLF-terminated, in RMC, GGA, GSA order.
    pub fn to_wire(&self) -> String {
        self.iter().fold(String::new(), |mut out, s| {
            out.push_str(s);
            out.push_str("\r\n");
            out
        })
    }
}

pub fn encode_all(set: &GnssMessageSet) -> GnssSentences {
    GnssSentences {
        rmc: rmc(set),
        gga: gga(set),
        gsa: gsa(set),
    }
}

pub fn rmc(set: &GnssMessageSet) -> String {
    let (lat, ns) = latitude_field(set.fix.latitude);
    let (lon, ew) = longitude_field(set.fix.longitude);
    let body = format!(
        "GPRMC,{},{},{},{},{},{},{:.2},{:.2},{},,,{}",
        time_field(&set.utc),
        set.config.rmc_status.code(),
        lat,
        ns,
        lon,
        ew,
        set.speed_knots,
        rounded_course(set.course_deg),
        date_field(&set.utc),
        set.config.positioning_mode.code(),
    );
    frame(&body)
}

pub fn gga(set: &GnssMessageSet) -> String {
    let (lat, ns) = latitude_field(set.fix.latitude);
    let (lon, ew) = longitude_field(set.fix.longitude);
    let body = format!(
        "GPGGA,{},{},{},{},{},{},{:02},{:.1},{:.2},M,{:.2},M,,",
        time_field(&set.utc),
        lat,
        ns,
        lon,
        ew,
        set.config.fix_quality.code(),
        set.config.satellite_count,
        set.config.hdop,
        set.fix.altitude,
        set.config.geoid_height,
    );
    frame(&body)
}

pub fn gsa(set: &GnssMessageSet) -> String {
    let mut body = format!(
        "GPGSA,{},{}",
        set.config.selection_mode.code(),
        set.config.fix_dimension.code()
    );
    let slots: Vec<String> = (0..GSA_SATELLITE_SLOTS)
        .map(|slot| {
            set.config
                .satellite_ids
                .get(slot)
                .map(|id| format!("{id:02}"))
                .unwrap_or_default()
        })
        .collect();
    body.push(',');
    body.push_str(&slots.join(","));
    body.push_str(&format!(
        ",{:.1},{:.1},{:.1}",
        set.config.pdop, set.config.hdop, set.config.vdop
    ));
    frame(&body)
}

// =========================================================================
// == Framing ==
// =========================================================================

/// XOR of every byte of `body` (the text between `$` and `*`).
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// `$<body>*HH`.
pub fn frame(body: &str) -> String {
    format!("${}*{:02X}", body, checksum(body))
}

/// Checks that a framed sentence carries the checksum of its own body.
/// A trailing CRLF is ignored.
pub fn verify(sentence: &str) -> Result<(), SensorError> {
    let sentence = sentence.trim_end_matches(['\r', '\n']);
    let malformed = |why: &str| SensorError::MalformedSentence(format!("{why}: {sentence:?}"));

    let inner = sentence
        .strip_prefix('$')
        .ok_or_else(|| malformed("missing '$'"))?;
    let (body, hex) = inner
        .rsplit_once('*')
        .ok_or_else(|| malformed("missing '*'"))?;
    if hex.len() != 2 {
        return Err(malformed("checksum must be two hex digits"));
    }
    let expected = u8::from_str_radix(hex, 16).map_err(|_| malformed("checksum is not hex"))?;
    let actual = checksum(body);
    if actual != expected {
        return Err(malformed(&format!(
            "checksum mismatch (expected {expected:02X}, computed {actual:02X})"
        )));
    }
    Ok(())
}

// =========================================================================
// == Field Formatting ==
// =========================================================================

const MINUTE_SCALE: u64 = 100_000;
const DEGREE_SCALE: u64 = 60 * MINUTE_SCALE;

/// `d..dmm.mmmmm` with `width` degree digits. Rounding happens once, on the
/// total number of 1e-5 minutes, so minutes never print as 60.
fn degrees_minutes(value: f64, width: usize) -> String {
    let total = (value.abs() * DEGREE_SCALE as f64).round() as u64;
    let degrees = total / DEGREE_SCALE;
    let rem = total % DEGREE_SCALE;
    format!(
        "{:0width$}{:02}.{:05}",
        degrees,
        rem / MINUTE_SCALE,
        rem % MINUTE_SCALE,
        width = width
    )
}

fn latitude_field(latitude: f64) -> (String, char) {
    let latitude = latitude.clamp(-90.0, 90.0);
    let hemisphere = if latitude < 0.0 { 'S' } else { 'N' };
    (degrees_minutes(latitude, 2), hemisphere)
}

fn longitude_field(longitude: f64) -> (String, char) {
    let longitude = crate::geodesy::wrap_longitude(longitude);
    let hemisphere = if longitude < 0.0 { 'W' } else { 'E' };
    (degrees_minutes(longitude, 3), hemisphere)
}

fn rounded_course(course: f64) -> f64 {
    let c = (course * 100.0).round() / 100.0 + 0.0;
    if c >= 360.0 {
        0.0
    } else {
        c
    }
}

fn time_field(utc: &DateTime<Utc>) -> String {
    // Leap-second nanoseconds run past 1e9.
    let centis = (utc.nanosecond() / 10_000_000).min(99);
    format!(
        "{:02}{:02}{:02}.{:02}",
        utc.hour(),
        utc.minute(),
        utc.second(),
        centis
    )
}

fn date_field(utc: &DateTime<Utc>) -> String {
    format!(
        "{:02}{:02}{:02}",
        utc.day(),
        utc.month(),
        utc.year().rem_euclid(100)
    )
}
