use std::{io::ErrorKind, path::Path};

use chrono::Utc;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};

use crate::error::Error;

pub const UPLOAD_URL_PREFIX: &str = "/static/uploads";
const DEFAULT_AUDIO_EXTENSION: &str = "webm";

/// Writes a voice clip under `dir` and returns the generated file name.
pub async fn save_audio(
    dir: &Path,
    filename: Option<&str>,
    data: &[u8],
) -> Result<String, Error> {
    fs::create_dir_all(dir).await?;

    write_clip(
        dir,
        Utc::now().timestamp_millis(),
        &audio_extension(filename),
        data,
    )
    .await
}

/// Never replaces an existing clip: names taken within the same millisecond
/// get a counter suffix.
async fn write_clip(
    dir: &Path,
    stamp: i64,
    extension: &str,
    data: &[u8],
) -> Result<String, Error> {
    let mut suffix = 0u32;

    loop {
        let name = match suffix {
            0 => format!("voice_{}.{}", stamp, extension),
            n => format!("voice_{}_{}.{}", stamp, n, extension),
        };

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
            .await
        {
            Ok(mut file) => {
                file.write_all(data).await?;
                file.flush().await?;
                return Ok(name);
            },
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(Error::Io(e)),
        }
    }
}

pub fn audio_url(name: &str) -> String {
    format!("{}/{}", UPLOAD_URL_PREFIX, name)
}

fn audio_extension(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= 8
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| String::from(DEFAULT_AUDIO_EXTENSION))
}
