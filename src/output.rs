use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::app::{ProgressEvent, ProgressSink, RenderAdapter};
use crate::domain::VisMode;
use crate::error::VisError;
use crate::reshape::Visualization;

#[derive(Debug, Clone, Serialize)]
pub struct RenderedView<'a> {
    pub mode: VisMode,
    pub title: &'static str,
    pub visualization: &'a Visualization,
}

#[derive(Debug, Clone, Default)]
pub struct JsonOutput {
    out_dir: Option<Utf8PathBuf>,
}

impl JsonOutput {
    pub fn stdout() -> Self {
        Self { out_dir: None }
    }

    pub fn to_dir(out_dir: Utf8PathBuf) -> Self {
        Self {
            out_dir: Some(out_dir),
        }
    }

    pub fn path_for(&self, mode: VisMode) -> Option<Utf8PathBuf> {
        self.out_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", mode.as_str())))
    }

    pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl RenderAdapter for JsonOutput {
    fn render(&self, mode: VisMode, view: &Visualization) -> Result<(), VisError> {
        let rendered = RenderedView {
            mode,
            title: mode.title(),
            visualization: view,
        };
        match self.path_for(mode) {
            Some(path) => {
                let bytes = serde_json::to_vec_pretty(&rendered)
                    .map_err(|err| VisError::Output(err.to_string()))?;
                write_atomic(&path, &bytes)?;
                info!(%mode, path = %path, "wrote visualization");
                Ok(())
            }
            None => Self::print_json(&rendered).map_err(|err| VisError::Output(err.to_string())),
        }
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => debug!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message),
            None => debug!("{}", event.message),
        }
    }
}

pub fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> Result<(), VisError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| VisError::Output(err.to_string()))?;
    let mut temp =
        NamedTempFile::new_in(parent).map_err(|err| VisError::Output(err.to_string()))?;
    temp.write_all(bytes)
        .map_err(|err| VisError::Output(err.to_string()))?;
    temp.persist(path)
        .map_err(|err| VisError::Output(err.error.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SingleSeries;

    #[test]
    fn writes_one_file_per_mode() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = Utf8PathBuf::from_path_buf(dir.path().join("out")).unwrap();
        let output = JsonOutput::to_dir(out_dir.clone());
        let view = Visualization::Series(SingleSeries::default());
        output.render(VisMode::Bar, &view).unwrap();

        let written = fs::read_to_string(out_dir.join("bar.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["mode"], "bar");
        assert_eq!(value["visualization"]["kind"], "series");
    }

    #[test]
    fn stdout_has_no_path() {
        assert!(JsonOutput::stdout().path_for(VisMode::Graph).is_none());
    }
}
