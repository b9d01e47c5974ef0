use std::fmt;
use std::ops::{Add, Sub};

use super::{FrameRate, TimecodeError};

/// A position on a 24-hour timecode clock, stored as a zero-based frame
/// count at a given [`FrameRate`].
///
/// Arithmetic wraps around midnight, so subtracting past zero lands at the
/// end of the previous day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timecode {
    rate: FrameRate,
    frame: u64,
    fractional: bool,
}

impl Timecode {
    pub fn from_frames(rate: FrameRate, frame: u64) -> Self {
        Self {
            rate,
            frame: frame % rate.frames_per_day(),
            fractional: false,
        }
    }

    /// Whole frames elapsed after `seconds`, truncated.
    pub fn from_seconds(rate: FrameRate, seconds: f64) -> Self {
        let frame = (seconds.max(0.0) * rate.timebase() as f64) as u64;
        Self::from_frames(rate, frame)
    }

    /// Parses `HH:MM:SS:FF`, drop-frame `HH:MM:SS;FF`, millisecond
    /// `HH:MM:SS.mmm` (at `ms` rate) or fractional-second `HH:MM:SS.sss`.
    pub fn parse(rate: FrameRate, text: &str) -> Result<Self, TimecodeError> {
        let text = text.trim();
        let fields = text
            .split([':', ';', '.'])
            .map(|f| f.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| TimecodeError::Malformed(text.to_string()))?;
        let [hours, minutes, seconds, mut frames] = <[u64; 4]>::try_from(fields.as_slice())
            .map_err(|_| TimecodeError::Malformed(text.to_string()))?;

        let fractional = !rate.is_millisecond() && text.matches('.').count() == 1;
        if fractional {
            let fraction = text.rsplit_once('.').map(|(_, f)| f).unwrap_or("0");
            let seconds_fraction = format!("0.{fraction}")
                .parse::<f64>()
                .map_err(|_| TimecodeError::Malformed(text.to_string()))?;
            frames = (seconds_fraction * rate.fps()).round() as u64;
        }

        let out_of_range = |reason: &str| TimecodeError::OutOfRange {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        if hours >= 24 {
            return Err(out_of_range("hours must be below 24"));
        }
        if minutes >= 60 || seconds >= 60 {
            return Err(out_of_range("minutes and seconds must be below 60"));
        }
        let timebase = rate.timebase() as u64;
        if !fractional && frames >= timebase {
            return Err(out_of_range("frame field exceeds the frame rate"));
        }
        let dropped = rate.dropped_per_minute();
        if minutes % 10 != 0 && seconds == 0 && frames < dropped {
            return Err(out_of_range("label is skipped by drop-frame counting"));
        }

        let total_minutes = 60 * hours + minutes;
        let frame = timebase * 3600 * hours + timebase * 60 * minutes + timebase * seconds + frames
            - dropped * (total_minutes - total_minutes / 10);

        Ok(Self {
            rate,
            frame: frame % rate.frames_per_day(),
            fractional,
        })
    }

    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Zero-based frame count since midnight.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_fractional(&self) -> bool {
        self.fractional
    }

    /// Switches printing to fractional seconds (`HH:MM:SS.sss`).
    pub fn with_fractional(mut self, fractional: bool) -> Self {
        self.fractional = fractional;
        self
    }

    pub fn seconds(&self) -> f64 {
        self.frame as f64 / self.rate.fps()
    }

    /// Shifts by `delta` frames, wrapping around the 24-hour clock.
    pub fn offset(self, delta: i64) -> Self {
        let day = self.rate.frames_per_day() as i64;
        Self {
            frame: (self.frame as i64 + delta).rem_euclid(day) as u64,
            ..self
        }
    }

    /// `(hours, minutes, seconds, frames)` as displayed.
    pub fn components(&self) -> (u64, u64, u64, u64) {
        let mut n = self.frame % self.rate.frames_per_day();

        if self.rate.is_drop_frame() {
            let dropped = self.rate.dropped_per_minute();
            let ten_minutes = n / self.rate.frames_per_ten_minutes();
            let remainder = n % self.rate.frames_per_ten_minutes();
            n += dropped * 9 * ten_minutes;
            if remainder > dropped {
                n += dropped * ((remainder - dropped) / self.rate.frames_per_minute());
            }
        }

        let timebase = self.rate.timebase() as u64;
        let frames = n % timebase;
        let seconds = (n / timebase) % 60;
        let minutes = (n / timebase / 60) % 60;
        let hours = n / timebase / 3600;
        (hours, minutes, seconds, frames)
    }

    pub fn delimiter(&self) -> char {
        if self.rate.is_drop_frame() {
            ';'
        } else if self.rate.is_millisecond() || self.fractional {
            '.'
        } else {
            ':'
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, seconds, frames) = self.components();
        if self.fractional && !self.rate.is_millisecond() {
            let fraction =
                (frames as f64 / self.rate.timebase() as f64 * 1000.0).round() / 1000.0;
            return write!(
                f,
                "{hours:02}:{minutes:02}:{:06.3}",
                seconds as f64 + fraction
            );
        }
        if self.rate.is_millisecond() {
            return write!(f, "{hours:02}:{minutes:02}:{seconds:02}.{frames:03}");
        }
        write!(
            f,
            "{hours:02}:{minutes:02}:{seconds:02}{}{frames:02}",
            self.delimiter()
        )
    }
}

impl Add<i64> for Timecode {
    type Output = Timecode;

    fn add(self, frames: i64) -> Timecode {
        self.offset(frames)
    }
}

impl Sub<i64> for Timecode {
    type Output = Timecode;

    fn sub(self, frames: i64) -> Timecode {
        self.offset(-frames)
    }
}
