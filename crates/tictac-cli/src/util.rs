use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use tictac_dataset::sample::Dataset;
use tictac_engine::Player;
use tictac_training::{bundle::WeightBundle, mlp::Mlp, policy::NetworkOracle};

/// Destination for JSON results: a file when a path is given, stdout otherwise.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File { writer: BufWriter<File>, path: PathBuf },
}

impl Output {
    pub fn save_json<T>(value: &T, path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        Self::create(path)?.write_json(value)
    }

    pub fn create(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(io::stdout().lock()));
        };
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn describe(&self) -> String {
        match self {
            Self::Stdout(_) => "stdout".to_owned(),
            Self::File { path, .. } => path.display().to_string(),
        }
    }

    /// Writes `value` as pretty JSON followed by a newline, then flushes.
    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let result = serde_json::to_writer_pretty(&mut *self, value)
            .map_err(anyhow::Error::from)
            .and_then(|()| {
                writeln!(self)?;
                self.flush()?;
                Ok(())
            });
        result.with_context(|| format!("Failed to write JSON to {}", self.describe()))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File { writer, .. } => writer.flush(),
        }
    }
}

/// Reads and deserializes a JSON file; `kind` names the file in error messages.
pub fn read_json_file<T, P>(kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open {kind} file: {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {kind} file: {}", path.display()))
}

pub fn read_dataset_file<P>(path: P) -> anyhow::Result<Dataset>
where
    P: AsRef<Path>,
{
    read_json_file("dataset", path)
}

/// Loads a weight bundle and checks its shapes.
pub fn read_weights_file<P>(path: P) -> anyhow::Result<Mlp>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bundle: WeightBundle = read_json_file("weights", path)?;
    let mlp = Mlp::from_bundle(&bundle, 0.0)
        .with_context(|| format!("Invalid weights file: {}", path.display()))?;
    log::debug!("loaded network with {} hidden units", mlp.hidden_size());
    Ok(mlp)
}

pub fn load_network<P>(path: P, seed: Option<u64>) -> anyhow::Result<NetworkOracle<Pcg32>>
where
    P: AsRef<Path>,
{
    Ok(NetworkOracle::new(read_weights_file(path)?, build_rng(seed)))
}

/// A seeded generator when `seed` is given, otherwise one seeded from the thread RNG.
pub fn build_rng(seed: Option<u64>) -> Pcg32 {
    match seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Side {
    #[default]
    X,
    O,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::X => Player::X,
            Side::O => Player::O,
        }
    }
}
