pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid SVG markup: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("no <svg> element found")]
    MissingSvg,

    #[error("live and cloned trees diverge at {path}")]
    StructureMismatch { path: String },
}
