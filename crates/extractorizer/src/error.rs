#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("The outline is not usable for chapter splitting (rerun with --force to split anyway)\n{0}")]
    UnsuitableOutline(String),

    #[error("Level {level} not found (available levels: {available:?})")]
    LevelNotFound { level: u32, available: Vec<u32> },
}
