use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::TimecodeError;

const MAX_DECIMALS: u32 = 6;

/// A frame rate as an exact rational plus the counting convention used when
/// expressing frames as broadcast timecode.
///
/// 29.97 and 59.94 count with drop-frame numbering; 23.98/23.976 count as
/// 24 non-drop; `ms` (or 1000) counts milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RateSpec")]
pub struct FrameRate {
    num: u32,
    den: u32,
    timebase: u32,
    drop_frame: bool,
    millisecond: bool,
}

impl FrameRate {
    /// Integer non-drop rate.
    pub fn integer(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            num: fps,
            den: 1,
            timebase: fps,
            drop_frame: false,
            millisecond: fps == 1000,
        }
    }

    pub const MILLISECONDS: FrameRate = FrameRate {
        num: 1000,
        den: 1,
        timebase: 1000,
        drop_frame: false,
        millisecond: true,
    };

    pub fn from_rational(num: u32, den: u32) -> Result<Self, TimecodeError> {
        if num == 0 || den == 0 {
            return Err(TimecodeError::InvalidRate(format!("{num}/{den}")));
        }
        let g = gcd(num, den);
        let (num, den) = (num / g, den / g);

        let hundredths = ((num as f64 / den as f64) * 100.0).round() as u64;
        let (timebase, drop_frame, millisecond) = match hundredths {
            2997 => (30, true, false),
            5994 => (60, true, false),
            2398 => (24, false, false),
            100_000 => (1000, false, true),
            _ => {
                let tb = (num as f64 / den as f64).round() as u32;
                if tb == 0 {
                    return Err(TimecodeError::InvalidRate(format!("{num}/{den}")));
                }
                (tb, false, false)
            }
        };

        Ok(Self {
            num,
            den,
            timebase,
            drop_frame,
            millisecond,
        })
    }

    pub fn fps(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Whole frames per timecode second.
    pub fn timebase(&self) -> u32 {
        self.timebase
    }

    pub fn is_drop_frame(&self) -> bool {
        self.drop_frame
    }

    pub fn is_millisecond(&self) -> bool {
        self.millisecond
    }

    /// Frame labels skipped at each minute boundary (except every tenth).
    pub fn dropped_per_minute(&self) -> u64 {
        if self.drop_frame {
            (self.fps() * 0.066666).round() as u64
        } else {
            0
        }
    }

    pub fn frames_per_minute(&self) -> u64 {
        self.timebase as u64 * 60 - self.dropped_per_minute()
    }

    pub fn frames_per_ten_minutes(&self) -> u64 {
        self.timebase as u64 * 600 - self.dropped_per_minute() * 9
    }

    pub fn frames_per_hour(&self) -> u64 {
        self.frames_per_ten_minutes() * 6
    }

    pub fn frames_per_day(&self) -> u64 {
        self.frames_per_hour() * 24
    }
}

impl FromStr for FrameRate {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("ms") {
            return Ok(Self::MILLISECONDS);
        }
        if let Some((num, den)) = text.split_once('/') {
            let num = num
                .trim()
                .parse::<u32>()
                .map_err(|_| TimecodeError::InvalidRate(text.to_string()))?;
            let den = den
                .trim()
                .parse::<u32>()
                .map_err(|_| TimecodeError::InvalidRate(text.to_string()))?;
            return Self::from_rational(num, den);
        }
        let (num, den) = parse_decimal(text)?;
        Self::from_rational(num, den)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            return write!(f, "{}", self.num);
        }
        match decimal_places(self.den) {
            Some(places) => {
                let scale = 10u64.pow(places);
                let scaled = self.num as u64 * (scale / self.den as u64);
                write!(
                    f,
                    "{}.{:0width$}",
                    scaled / scale,
                    scaled % scale,
                    width = places as usize
                )
            }
            None => write!(f, "{}/{}", self.num, self.den),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RateSpec {
    Int(u32),
    Float(f64),
    Text(String),
}

impl TryFrom<RateSpec> for FrameRate {
    type Error = TimecodeError;

    fn try_from(spec: RateSpec) -> Result<Self, Self::Error> {
        match spec {
            RateSpec::Int(n) => FrameRate::from_rational(n, 1),
            RateSpec::Float(v) => v.to_string().parse(),
            RateSpec::Text(s) => s.parse(),
        }
    }
}

fn parse_decimal(text: &str) -> Result<(u32, u32), TimecodeError> {
    let invalid = || TimecodeError::InvalidRate(text.to_string());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    if frac_part.len() > MAX_DECIMALS as usize
        || !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
        || int_part.is_empty()
    {
        return Err(invalid());
    }
    let den = 10u32.pow(frac_part.len() as u32);
    let digits = format!("{int_part}{frac_part}");
    let num = digits.parse::<u32>().map_err(|_| invalid())?;
    Ok((num, den))
}

/// Smallest power of ten the denominator divides, if any.
fn decimal_places(den: u32) -> Option<u32> {
    (1..=MAX_DECIMALS).find(|&p| 10u32.pow(p) % den == 0)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
