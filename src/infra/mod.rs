pub mod fs_artifact_reader;

pub use fs_artifact_reader::FsArtifactReader;
