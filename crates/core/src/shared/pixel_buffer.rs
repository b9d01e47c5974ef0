use std::io::{self, Write};

/// Numeric type of each sample handed to the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleType {
    U8,
    U16,
}

impl SampleType {
    /// More than 8 bits per channel needs 16-bit samples.
    pub fn for_bit_depth(bit_depth: u32) -> Self {
        if bit_depth > 8 {
            SampleType::U16
        } else {
            SampleType::U8
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::U16 => 2,
        }
    }

    pub fn max_value(self) -> f32 {
        match self {
            SampleType::U8 => u8::MAX as f32,
            SampleType::U16 => u16::MAX as f32,
        }
    }

    /// Raw-video pixel format name for interleaved RGB of this sample type.
    pub fn raw_pixel_format(self) -> &'static str {
        match self {
            SampleType::U8 => "rgb24",
            SampleType::U16 => "rgb48le",
        }
    }
}

/// Geometry and sample layout negotiated with the encoder at launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameShape {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub sample_type: SampleType,
}

impl FrameShape {
    pub fn rgb(width: u32, height: u32, sample_type: SampleType) -> Self {
        Self {
            width,
            height,
            channels: 3,
            sample_type,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.width as usize
            * self.height as usize
            * self.channels as usize
            * self.sample_type.bytes_per_sample()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

/// A finished frame: interleaved samples in row-major order, ready to be
/// written to the encoder as raw video.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    samples: Samples,
    width: u32,
    height: u32,
    channels: u8,
    frame_number: Option<i64>,
}

impl PixelBuffer {
    pub fn from_u8(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        frame_number: Option<i64>,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            samples: Samples::U8(data),
            width,
            height,
            channels,
            frame_number,
        }
    }

    pub fn from_u16(
        data: Vec<u16>,
        width: u32,
        height: u32,
        channels: u8,
        frame_number: Option<i64>,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            samples: Samples::U16(data),
            width,
            height,
            channels,
            frame_number,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn frame_number(&self) -> Option<i64> {
        self.frame_number
    }

    pub fn sample_type(&self) -> SampleType {
        match self.samples {
            Samples::U8(_) => SampleType::U8,
            Samples::U16(_) => SampleType::U16,
        }
    }

    pub fn shape(&self) -> FrameShape {
        FrameShape {
            width: self.width,
            height: self.height,
            channels: self.channels,
            sample_type: self.sample_type(),
        }
    }

    /// Sample at `(row, col, channel)` widened to `u16`.
    pub fn sample(&self, row: u32, col: u32, channel: u8) -> u16 {
        let idx = ((row as usize * self.width as usize) + col as usize) * self.channels as usize
            + channel as usize;
        match &self.samples {
            Samples::U8(data) => u16::from(data[idx]),
            Samples::U16(data) => data[idx],
        }
    }

    /// Serialises the samples as headerless raw video (16-bit samples are
    /// little-endian, matching `rgb48le`).
    pub fn write_raw(&self, out: &mut dyn Write) -> io::Result<()> {
        match &self.samples {
            Samples::U8(data) => out.write_all(data),
            Samples::U16(data) => {
                let mut bytes = Vec::with_capacity(data.len() * 2);
                for sample in data {
                    bytes.extend_from_slice(&sample.to_le_bytes());
                }
                out.write_all(&bytes)
            }
        }
    }
}
