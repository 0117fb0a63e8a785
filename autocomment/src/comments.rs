use {
    rand::{seq::IndexedRandom, Rng},
    std::{
        io,
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("failed to read comments: {0}")]
    Read(#[from] io::Error),
    #[error("no comments in {0:?}")]
    Empty(PathBuf),
}

/// A line-delimited comment file.
///
/// The file is read again on every use so it can be edited while the
/// automation is running.
#[derive(Debug, Clone)]
pub struct CommentSource {
    path: PathBuf,
}

impl CommentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all non-blank lines, untrimmed.
    pub fn load(&self) -> Result<Vec<String>, CommentError> {
        let text = fs_err::read_to_string(&self.path)?;
        Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Reads the file and picks one comment uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, CommentError> {
        self.load()?
            .choose(rng)
            .cloned()
            .ok_or_else(|| CommentError::Empty(self.path.clone()))
    }
}
