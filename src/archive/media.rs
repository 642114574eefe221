//! Header probes for the background image and the song audio.

use std::io::Cursor;

use image::ImageReader;
use lofty::{prelude::*, probe::Probe};
use log::warn;

use crate::model::{AssetDescriptor, AudioDescriptor, BackgroundDescriptor};

/// Reads the image dimensions, handing the asset back when the header is unreadable.
pub(super) fn probe_background(
    asset: AssetDescriptor,
) -> Result<BackgroundDescriptor, AssetDescriptor> {
    let dimensions = ImageReader::new(Cursor::new(asset.data()))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(ImageReader::into_dimensions);
    match dimensions {
        Ok((width, height)) => Ok(BackgroundDescriptor {
            asset,
            width,
            height,
        }),
        Err(error) => {
            warn!("'{}' is not a readable image: {error}", asset.name);
            Err(asset)
        }
    }
}

/// Reads the track length. An unreadable container leaves length and bitrate unknown.
pub(super) fn probe_audio(asset: AssetDescriptor) -> AudioDescriptor {
    let duration_seconds = match Probe::new(Cursor::new(asset.data()))
        .guess_file_type()
        .map_err(lofty::error::LoftyError::from)
        .and_then(Probe::read)
    {
        Ok(tagged) => Some(tagged.properties().duration().as_secs_f64()),
        Err(error) => {
            warn!("could not read the length of '{}': {error}", asset.name);
            None
        }
    };
    let bitrate_kbps = duration_seconds.and_then(|seconds| bitrate_kbps(asset.size_bytes, seconds));
    AudioDescriptor {
        asset,
        duration_seconds,
        bitrate_kbps,
    }
}

/// Average bitrate over the whole entry, rounded to one decimal.
fn bitrate_kbps(size_bytes: u64, duration_seconds: f64) -> Option<f64> {
    (duration_seconds > 0.0).then(|| {
        let kbps = size_bytes as f64 * 8.0 / duration_seconds / 1000.0;
        (kbps * 10.0).round() / 10.0
    })
}
