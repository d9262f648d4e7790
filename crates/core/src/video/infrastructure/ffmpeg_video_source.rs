use std::fmt;
use std::path::PathBuf;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_source::VideoSource;

/// ffmpeg input formats that address capture devices rather than files.
const CAPTURE_FORMATS: &[&str] = &["v4l2", "avfoundation", "dshow", "gdigrab", "x11grab"];

/// Where frames come from: a capture device or a media file.
///
/// `DefaultCamera` is resolved to a platform backend only when the source is
/// opened, so an unsupported platform surfaces as a camera failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoSourceSpec {
    DefaultCamera(u32),
    Device { format: String, name: String },
    File(PathBuf),
}

impl VideoSourceSpec {
    /// Parses a source argument.
    ///
    /// - `camera` / `camera:N`: the platform's default capture backend, device N.
    /// - `<format>:<name>` with a known capture format, e.g. `v4l2:/dev/video2`.
    /// - `/dev/videoN`: a V4L2 device.
    /// - anything else: a file path.
    pub fn parse(arg: &str) -> Result<Self, String> {
        if arg == "camera" {
            return Ok(VideoSourceSpec::DefaultCamera(0));
        }
        if let Some(index) = arg.strip_prefix("camera:") {
            let index: u32 = index
                .parse()
                .map_err(|_| format!("invalid camera index in {arg:?}"))?;
            return Ok(VideoSourceSpec::DefaultCamera(index));
        }
        if let Some((format, name)) = arg.split_once(':') {
            if CAPTURE_FORMATS.contains(&format) {
                if name.is_empty() {
                    return Err(format!("missing device name in {arg:?}"));
                }
                return Ok(VideoSourceSpec::Device {
                    format: format.to_string(),
                    name: name.to_string(),
                });
            }
        }
        if arg.starts_with("/dev/video") {
            return Ok(VideoSourceSpec::Device {
                format: "v4l2".to_string(),
                name: arg.to_string(),
            });
        }
        Ok(VideoSourceSpec::File(PathBuf::from(arg)))
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, VideoSourceSpec::File(_))
    }
}

impl fmt::Display for VideoSourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSourceSpec::DefaultCamera(index) => write!(f, "camera:{index}"),
            VideoSourceSpec::Device { format, name } => write!(f, "{format}:{name}"),
            VideoSourceSpec::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Capture backend and device name for camera `index` on this platform.
fn default_camera(index: u32) -> Result<(String, String), String> {
    #[cfg(target_os = "linux")]
    {
        Ok(("v4l2".to_string(), format!("/dev/video{index}")))
    }
    #[cfg(target_os = "macos")]
    {
        Ok(("avfoundation".to_string(), index.to_string()))
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        let _ = index;
        Err("no default camera on this platform; use dshow:video=<device name>".to_string())
    }
}

/// Decodes frames on demand via ffmpeg-next (libavformat + libavcodec),
/// converting each one to packed RGB24.
pub struct FfmpegVideoSource {
    spec: VideoSourceSpec,
    state: Option<DecodeState>,
    sequence: usize,
}

struct DecodeState {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: Option<Scaler>,
    stream_index: usize,
    flushing: bool,
    done: bool,
}

/// A scaler plus the input geometry it was built for, so it can be rebuilt
/// when a device renegotiates its resolution mid-stream.
struct Scaler {
    context: scaling::Context,
    input: (Pixel, u32, u32),
}

// Safety: FfmpegVideoSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegVideoSource {}

impl FfmpegVideoSource {
    pub fn new(spec: VideoSourceSpec) -> Self {
        Self {
            spec,
            state: None,
            sequence: 0,
        }
    }

    fn open_input(&self) -> Result<ffmpeg_next::format::context::Input, Box<dyn std::error::Error>> {
        match &self.spec {
            VideoSourceSpec::File(path) => Ok(ffmpeg_next::format::input(path)?),
            VideoSourceSpec::Device { format, name } => open_device(format, name),
            VideoSourceSpec::DefaultCamera(index) => {
                let (format, name) = default_camera(*index)?;
                log::debug!("camera:{index} resolved to {format}:{name}");
                open_device(&format, &name)
            }
        }
    }
}

fn open_device(
    format: &str,
    name: &str,
) -> Result<ffmpeg_next::format::context::Input, Box<dyn std::error::Error>> {
    ffmpeg_next::device::register_all();
    let input_format = ffmpeg_next::device::input::video()
        .find(|f| f.name() == format)
        .ok_or_else(|| format!("capture backend {format} is not available"))?;
    let ctx = ffmpeg_next::format::open_with(
        name,
        &ffmpeg_next::format::Format::Input(input_format),
        ffmpeg_next::Dictionary::new(),
    )?;
    match ctx {
        ffmpeg_next::format::context::Context::Input(input) => Ok(input),
        ffmpeg_next::format::context::Context::Output(_) => {
            Err(format!("{format}:{name} opened as an output").into())
        }
    }
}

impl VideoSource for FfmpegVideoSource {
    fn open(&mut self) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = self.open_input()?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source: self.spec.to_string(),
            live: self.spec.is_live(),
        };

        self.state = Some(DecodeState {
            ictx,
            decoder,
            scaler: None,
            stream_index,
            flushing: false,
            done: false,
        });
        self.sequence = 0;

        Ok(metadata)
    }

    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let Some(state) = self.state.as_mut() else {
            return Some(Err("FfmpegVideoSource: not opened".into()));
        };

        let result = state.next_rgb(self.sequence)?;
        if result.is_ok() {
            self.sequence += 1;
        }
        Some(result)
    }

    fn close(&mut self) {
        self.state = None;
    }
}

impl DecodeState {
    fn next_rgb(&mut self, sequence: usize) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive(sequence) {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive(sequence) {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.stream_index {
                continue;
            }

            if let Err(e) = self.decoder.send_packet(&packet) {
                log::debug!("Dropping undecodable packet: {e}");
                continue;
            }

            if let Some(result) = self.try_receive(sequence) {
                return Some(result);
            }
        }
    }

    fn try_receive(&mut self, sequence: usize) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }
        Some(self.convert(&decoded, sequence))
    }

    fn convert(
        &mut self,
        decoded: &ffmpeg_next::util::frame::video::Video,
        sequence: usize,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let (width, height) = (decoded.width(), decoded.height());
        let input = (decoded.format(), width, height);

        let stale = self.scaler.as_ref().map_or(true, |s| s.input != input);
        if stale {
            if self.scaler.is_some() {
                log::info!("Video source resolution changed to {width}x{height}");
            }
            let context = scaling::Context::get(
                decoded.format(),
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                scaling::Flags::BILINEAR,
            )?;
            self.scaler = Some(Scaler { context, input });
        }

        let scaler = self.scaler.as_mut().ok_or("scaler unavailable")?;
        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        scaler.context.run(decoded, &mut rgb)?;

        Ok(Frame::new(packed_rgb(&rgb, width, height), width, height, sequence))
    }
}

/// Copies an RGB24 ffmpeg frame into a tightly packed buffer, dropping the
/// per-row stride padding.
fn packed_rgb(rgb: &ffmpeg_next::util::frame::video::Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * Frame::CHANNELS;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}
