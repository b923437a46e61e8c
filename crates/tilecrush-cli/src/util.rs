use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use tilecrush_engine::{Board, EngineConfig};

/// Destination for JSON results: stdout unless a path is given.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File(BufWriter<File>, PathBuf),
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => {
                let file = File::create(&path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Output::File(BufWriter::new(file), path)
            }
            None => Output::Stdout(io::stdout().lock()),
        };
        output
            .write_json(value)
            .with_context(|| format!("Failed to write JSON to {}", output.display_path()))
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File(_, path) => path.display().to_string(),
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Output::Stdout(writer) => writer,
            Output::File(writer, _) => writer,
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let writer = self.writer();
        serde_json::to_writer_pretty(&mut *writer, value)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read and validate an engine configuration JSON file
pub fn read_config_file<P>(path: P) -> anyhow::Result<EngineConfig>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let config: EngineConfig = read_json_file("config", path)?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Read a board in text form, one row per line
pub fn read_board_file<P>(path: P) -> anyhow::Result<Board>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file: {}", path.display()))?;
    text.parse()
        .with_context(|| format!("Failed to parse board file: {}", path.display()))
}
